//! Throwaway provisioning scripts for tests.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// An executable `/bin/sh` script living in its own temporary directory.
///
/// The directory (and script) are removed when this is dropped.
pub struct TestScript {
    dir: TempDir,
    path: PathBuf,
}

impl TestScript {
    /// Write `body` after a `#!/bin/sh` line and mark the file executable.
    pub fn new(body: &str) -> std::io::Result<Self> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("provision-script");

        {
            let mut file = fs::File::create(&path)?;
            writeln!(file, "#!/bin/sh")?;
            writeln!(file, "{body}")?;
            file.sync_all()?;
        }
        set_mode(&path, 0o755)?;

        Ok(Self { dir, path })
    }

    /// A script file that exists but is not executable.
    pub fn not_executable(body: &str) -> std::io::Result<Self> {
        let script = Self::new(body)?;
        set_mode(&script.path, 0o644)?;
        Ok(script)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The temporary directory holding the script; scripts may write
    /// marker files here.
    pub fn dir(&self) -> &Path {
        self.dir.path()
    }
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> std::io::Result<()> {
    Ok(())
}
