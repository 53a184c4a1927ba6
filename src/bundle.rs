//! Feature bundle provisioning.
//!
//! A bundle is a self-contained directory of installable metadata plus an
//! entry script. Provisioning copies the whole bundle into the target's
//! feature directory, preserving relative structure and executable bits.
//! Re-provisioning replaces the destination entirely; old and new contents
//! are never merged. The built-in bundles ship embedded in the binary; tests
//! and custom installations can provision from a directory instead.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{DevforgeError, Result};

struct EmbeddedFile {
    path: &'static str,
    content: &'static str,
    executable: bool,
}

const EMBEDDED_BUNDLES: &[(&str, &[EmbeddedFile])] = &[
    (
        "proxy",
        &[
            EmbeddedFile {
                path: "devcontainer-feature.json",
                content: include_str!("../features/proxy/devcontainer-feature.json"),
                executable: false,
            },
            EmbeddedFile {
                path: "install.sh",
                content: include_str!("../features/proxy/install.sh"),
                executable: true,
            },
        ],
    ),
    (
        "claude-code",
        &[
            EmbeddedFile {
                path: "devcontainer-feature.json",
                content: include_str!("../features/claude-code/devcontainer-feature.json"),
                executable: false,
            },
            EmbeddedFile {
                path: "install.sh",
                content: include_str!("../features/claude-code/install.sh"),
                executable: true,
            },
        ],
    ),
    (
        "plugin-manager",
        &[
            EmbeddedFile {
                path: "devcontainer-feature.json",
                content: include_str!("../features/plugin-manager/devcontainer-feature.json"),
                executable: false,
            },
            EmbeddedFile {
                path: "install.sh",
                content: include_str!("../features/plugin-manager/install.sh"),
                executable: true,
            },
        ],
    ),
];

/// Where bundles are copied from.
pub enum BundleSource {
    /// Built-in bundles compiled into the binary.
    Embedded,
    /// A directory containing one subdirectory per bundle.
    Dir(PathBuf),
}

pub struct BundleProvisioner {
    source: BundleSource,
}

impl BundleProvisioner {
    pub fn embedded() -> Self {
        Self {
            source: BundleSource::Embedded,
        }
    }

    pub fn from_dir(root: impl Into<PathBuf>) -> Self {
        Self {
            source: BundleSource::Dir(root.into()),
        }
    }

    /// Check a bundle exists without copying anything. Used by dry runs,
    /// which still fail on a missing bundle.
    pub fn verify(&self, name: &str) -> Result<()> {
        let present = match &self.source {
            BundleSource::Embedded => EMBEDDED_BUNDLES.iter().any(|(id, _)| *id == name),
            BundleSource::Dir(root) => root.join(name).is_dir(),
        };
        if present {
            Ok(())
        } else {
            Err(DevforgeError::FeatureBundleMissing(name.to_string()))
        }
    }

    /// Copy the named bundle into `dest_root/<name>`, replacing any existing
    /// contents wholesale.
    pub fn provision(&self, name: &str, dest_root: &Path) -> Result<PathBuf> {
        self.verify(name)?;
        let dest = dest_root.join(name);

        if dest.exists() {
            fs::remove_dir_all(&dest)?;
        }

        match &self.source {
            BundleSource::Embedded => {
                let (_, files) = EMBEDDED_BUNDLES
                    .iter()
                    .find(|(id, _)| *id == name)
                    .expect("verified above");
                for file in *files {
                    let path = dest.join(file.path);
                    if let Some(parent) = path.parent() {
                        fs::create_dir_all(parent)?;
                    }
                    fs::write(&path, file.content)?;
                    if file.executable {
                        set_executable(&path)?;
                    }
                }
            }
            BundleSource::Dir(root) => {
                copy_dir_recursive(&root.join(name), &dest)?;
            }
        }

        Ok(dest)
    }
}

/// Copy a directory tree. `fs::copy` carries permission bits, so entry
/// scripts stay executable.
pub fn copy_dir_recursive(src: &Path, dst: &Path) -> Result<()> {
    fs::create_dir_all(dst)?;

    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let path = entry.path();
        let dest_path = dst.join(entry.file_name());

        if path.is_dir() {
            copy_dir_recursive(&path, &dest_path)?;
        } else {
            fs::copy(&path, &dest_path)?;
        }
    }

    Ok(())
}

#[cfg(unix)]
fn set_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let mut perms = fs::metadata(path)?.permissions();
    perms.set_mode(perms.mode() | 0o755);
    fs::set_permissions(path, perms)?;
    Ok(())
}

#[cfg(not(unix))]
fn set_executable(_path: &Path) -> Result<()> {
    Ok(())
}
