//! WASM bindings for the `regmap` register directory.
//!
//! A register map is loaded from its JSON description (the shape documented
//! in `regmap::serde`) and can then be queried from JavaScript:
//!
//! ```text
//! // const map = new WasmRegisterMap(mapJson);
//! // const r = map.resolve("tm_top.tm_caa_top.block[5].state");
//! // // r is { offset: 1053008n, element_size: 4n, dimensions: [] }
//! // for (const leaf of map.leaves()) console.log(leaf.path, leaf.offset);
//! ```
//!
//! Errors are returned as strings carrying the error's `Display` text, e.g.
//! ``no such register `bogus` in `Tm_caa_top` ``.

mod convert;

use regmap::{RegisterDirectory, serde::RegisterMapDef};
use wasm_bindgen::prelude::*;

/// Register map owned by JavaScript.
#[wasm_bindgen]
pub struct WasmRegisterMap {
    root: RegisterDirectory,
}

#[wasm_bindgen]
impl WasmRegisterMap {
    /// Loads and builds a register map from its JSON description.
    #[wasm_bindgen(constructor)]
    pub fn new(map_json: &str) -> Result<WasmRegisterMap, JsValue> {
        let root = regmap::serde::load_json(map_json).map_err(convert::error_to_js)?;
        Ok(WasmRegisterMap { root })
    }

    /// Builds a register map from an already-parsed JS object of the same shape.
    #[wasm_bindgen(js_name = fromObject)]
    pub fn from_object(def: JsValue) -> Result<WasmRegisterMap, JsValue> {
        let def: RegisterMapDef =
            serde_wasm_bindgen::from_value(def).map_err(convert::error_to_js)?;
        let root = def.build().map_err(convert::error_to_js)?;
        Ok(WasmRegisterMap { root })
    }

    /// Name of the root block type.
    #[wasm_bindgen(getter)]
    pub fn name(&self) -> String {
        self.root.name().to_string()
    }

    /// Resolves a dotted path to `{ offset, element_size, dimensions }`.
    pub fn resolve(&self, path: &str) -> Result<JsValue, JsValue> {
        let resolved = self.root.resolve_path(path).map_err(convert::error_to_js)?;
        convert::to_js(&convert::ResolvedOut::from(resolved))
    }

    /// Every register instance as `{ path, offset, size }`, depth-first.
    pub fn leaves(&self) -> Result<JsValue, JsValue> {
        let leaves = self
            .root
            .leaves()
            .map(|leaf| leaf.map(convert::LeafOut::from))
            .collect::<Result<Vec<_>, _>>()
            .map_err(convert::error_to_js)?;

        convert::to_js(&leaves)
    }

    /// Checks the map for overlapping fields and oversized blocks.
    pub fn validate(&self) -> Result<(), JsValue> {
        self.root.validate_layout().map_err(convert::error_to_js)
    }
}
