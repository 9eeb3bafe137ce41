//! Process-wide publication of the chip-level register directory.
//!
//! The root is built once at startup and installed here; afterwards any
//! thread may read it without synchronization.

use std::sync::OnceLock;

use tracing::debug;

use crate::{directory::RegisterDirectory, errors::RegistryError};

static ROOT: OnceLock<RegisterDirectory> = OnceLock::new();

/// Publishes `root` for the rest of the process. Only the first call succeeds.
pub fn install(root: RegisterDirectory) -> Result<&'static RegisterDirectory, RegistryError> {
    let mut fresh = false;
    let installed = ROOT.get_or_init(|| {
        fresh = true;
        root
    });

    if !fresh {
        return Err(RegistryError::AlreadyInstalled);
    }

    debug!(root = %installed.name(), "installed register directory");
    Ok(installed)
}

/// The installed root, if any.
pub fn get() -> Option<&'static RegisterDirectory> {
    ROOT.get()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldDescriptor;

    // The only test touching the global, since it can be installed once per process.
    #[test]
    fn test_install_once() {
        let root = RegisterDirectory::new(
            "Chip_reg",
            vec![FieldDescriptor::terminal("scratch_reg", 0, vec![], 4).unwrap()],
        )
        .unwrap();

        let installed = install(root.clone()).unwrap();
        assert_eq!(installed.name(), "Chip_reg");
        assert!(std::ptr::eq(get().unwrap(), installed));

        assert_eq!(install(root), Err(RegistryError::AlreadyInstalled));
        assert_eq!(get().unwrap().resolve_path("scratch_reg").unwrap().offset, 0);
    }
}
