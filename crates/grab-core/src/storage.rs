//! Staging files and atomic finalize.
//!
//! Every transfer lands in a hidden temp file inside the destination
//! directory. Only a verified artifact is renamed onto its final name; a
//! dropped [`StagedFile`] deletes itself, so failures and cancellation never
//! leave anything under the expected name.

use std::fs::File;
use std::io;
use std::path::Path;

use tempfile::NamedTempFile;

/// Prefix for staging files, kept hidden on Unix.
pub const TEMP_PREFIX: &str = ".grab-";
/// Suffix for staging files.
pub const TEMP_SUFFIX: &str = ".part";

/// Temp file in the destination directory holding an in-flight transfer.
#[derive(Debug)]
pub struct StagedFile {
    file: NamedTempFile,
}

impl StagedFile {
    /// Creates an empty staging file in `dir`.
    ///
    /// On Unix the file is opened with mode `0o666` so the process umask
    /// decides the final permissions, as for any newly created file.
    pub fn create_in(dir: &Path) -> io::Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(TEMP_PREFIX).suffix(TEMP_SUFFIX);
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            builder.permissions(std::fs::Permissions::from_mode(0o666));
        }
        let file = builder.tempfile_in(dir)?;
        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn as_file_mut(&mut self) -> &mut File {
        self.file.as_file_mut()
    }

    /// Applies an explicit mode, syncs, and renames onto `final_path`.
    /// An existing file at `final_path` is replaced.
    pub fn finalize(self, final_path: &Path, mode: Option<u32>) -> io::Result<()> {
        if let Some(mode) = mode {
            set_mode(self.file.as_file(), mode)?;
        }
        self.file.as_file().sync_all()?;
        self.file.persist(final_path).map_err(|e| e.error)?;
        Ok(())
    }
}

#[cfg(unix)]
fn set_mode(file: &File, mode: u32) -> io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    file.set_permissions(std::fs::Permissions::from_mode(mode))
}

#[cfg(not(unix))]
fn set_mode(file: &File, mode: u32) -> io::Result<()> {
    // Only the write bits have a meaning here.
    let mut perms = file.metadata()?.permissions();
    perms.set_readonly(mode & 0o222 == 0);
    file.set_permissions(perms)
}
