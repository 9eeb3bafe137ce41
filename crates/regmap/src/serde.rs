//! JSON-deserializable register map description.
//!
//! A map is a table of named block types plus the name of the root type.
//! Each type lists its fields; a field with a `type` is a nested block of that
//! type, anything else is a plain register of `size` bytes:
//!
//! ```json
//! {
//!   "root": "Chip_reg",
//!   "types": {
//!     "Block_g": [ { "name": "state", "offset": 0, "size": 4 } ],
//!     "Chip_reg": [
//!       { "name": "block", "offset": 0, "dims": [3], "size": 4, "type": "Block_g" }
//!     ]
//!   }
//! }
//! ```
//!
//! Types are built bottom-up and every use of a type gets its own copy of the
//! child directory.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    directory::RegisterDirectory,
    errors::{BuildError, LoadError},
    field::FieldDescriptor,
};

/// Top-level register map: block types by name and the root type.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RegisterMapDef {
    /// Name of the chip-level type.
    pub root: String,
    /// Field lists of every block type.
    pub types: BTreeMap<String, Vec<FieldDef>>,
}

/// Description of a single field of a block type.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FieldDef {
    pub name: String,
    /// Byte offset from the start of the owning block.
    pub offset: u64,
    /// Array extents, outermost first. Empty or absent for scalars.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dims: Vec<u64>,
    /// Size in bytes of one element (register width, or nested block size).
    pub size: u64,
    /// Block type of the element; absent for plain registers.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
}

impl RegisterMapDef {
    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Builds the directory tree rooted at [RegisterMapDef::root].
    pub fn build(&self) -> Result<RegisterDirectory, BuildError> {
        debug!(root = %self.root, types = self.types.len(), "building register map");

        let mut builder = Builder {
            types: &self.types,
            built: HashMap::new(),
            in_progress: Vec::new(),
        };

        builder.build(&self.root, "root")
    }
}

impl TryFrom<RegisterMapDef> for RegisterDirectory {
    type Error = BuildError;

    fn try_from(value: RegisterMapDef) -> Result<Self, Self::Error> {
        value.build()
    }
}

/// Loads a register map from its JSON description.
pub fn load_json(json: &str) -> Result<RegisterDirectory, LoadError> {
    Ok(RegisterMapDef::from_json(json)?.build()?)
}

struct Builder<'a> {
    types: &'a BTreeMap<String, Vec<FieldDef>>,
    /// Types already built, cloned for every further use.
    built: HashMap<&'a str, RegisterDirectory>,
    /// Types currently being built, innermost last.
    in_progress: Vec<&'a str>,
}

impl<'a> Builder<'a> {
    /// Builds `type_name`, referenced by `field` of the enclosing type.
    fn build(&mut self, type_name: &'a str, field: &str) -> Result<RegisterDirectory, BuildError> {
        if let Some(directory) = self.built.get(type_name) {
            return Ok(directory.clone());
        }

        if self.in_progress.contains(&type_name) {
            return Err(BuildError::RecursiveType {
                type_name: type_name.to_string(),
            });
        }

        let types = self.types;
        let Some(defs) = types.get(type_name) else {
            return Err(BuildError::UnknownType {
                field: field.to_string(),
                type_name: type_name.to_string(),
            });
        };

        self.in_progress.push(type_name);

        let mut fields = Vec::with_capacity(defs.len());
        for def in defs {
            let child = match &def.type_name {
                Some(child_type) => Some(self.build(child_type, &def.name)?),
                None => None,
            };

            fields.push(FieldDescriptor::new(
                def.name.clone(),
                def.offset,
                def.dims.clone(),
                def.size,
                child,
            )?);
        }

        self.in_progress.pop();

        let directory = RegisterDirectory::new(type_name, fields)?;
        self.built.insert(type_name, directory.clone());

        Ok(directory)
    }
}
