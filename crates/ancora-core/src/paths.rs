use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// File constants
// ---------------------------------------------------------------------------

pub const CONFIG_FILE: &str = "ancora.yaml";
pub const REGISTRY_FILE: &str = "usuarios.txt";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

/// Resolve a configured path against `root` unless it is already absolute.
pub fn resolve(root: &Path, configured: &Path) -> PathBuf {
    if configured.is_absolute() {
        configured.to_path_buf()
    } else {
        root.join(configured)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_keeps_absolute_paths() {
        let root = Path::new("/srv/ancora");
        assert_eq!(
            resolve(root, Path::new("/etc/usuarios.txt")),
            PathBuf::from("/etc/usuarios.txt")
        );
        assert_eq!(
            resolve(root, Path::new(REGISTRY_FILE)),
            PathBuf::from("/srv/ancora/usuarios.txt")
        );
    }
}
