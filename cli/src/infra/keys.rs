//! Infrastructure implementation of the `KeyFileStore` port.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::application::ports::KeyFileStore;

/// Writes private keys as `<dir>/<name>.pem`.
pub struct LocalKeyStore {
    dir: PathBuf,
}

impl LocalKeyStore {
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl KeyFileStore for LocalKeyStore {
    fn key_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.pem"))
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn write_private_key(&self, path: &Path, material: &str) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating directory {}", parent.display()))?;
        }

        let mut options = std::fs::OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o400);
        }
        let mut file = options
            .open(path)
            .with_context(|| format!("creating key file {}", path.display()))?;
        file.write_all(material.as_bytes())
            .with_context(|| format!("writing key file {}", path.display()))?;

        // The umask may have widened the creation mode.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o400))
                .with_context(|| format!("setting permissions on {}", path.display()))?;
        }
        Ok(())
    }
}

/// Make a key file readable and writable by its owner only (mode 0600).
///
/// OpenSSH refuses keys with wider permissions.
///
/// # Errors
///
/// Returns an error if the permissions cannot be changed.
pub fn restrict_to_owner(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))
            .with_context(|| format!("setting permissions on {}", path.display()))?;
    }
    #[cfg(not(unix))]
    let _ = path;
    Ok(())
}
