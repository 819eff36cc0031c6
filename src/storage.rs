//! Upload and output file storage.
//!
//! Files are named `<unix-millis>-<seq><ext>`; the process-wide sequence counter closes the
//! collision window between two uploads landing in the same millisecond. Raw uploads are scoped
//! to their request: the [`TempUpload`] guard deletes them when the request ends, success or
//! failure. Processed outputs are retained; they are the product of the service and cleaning
//! them up is an operator decision.

use std::{
    fs, io,
    path::{Path, PathBuf},
    sync::atomic::{AtomicU64, Ordering},
    time::{SystemTime, UNIX_EPOCH},
};

/// A directory holding uploaded originals and processed outputs.
pub struct Storage {
    dir: PathBuf,
    seq: AtomicU64,
}

impl Storage {
    /// Opens the storage directory, creating it (and its parents) if necessary.
    pub fn create<P: Into<PathBuf>>(dir: P) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            seq: AtomicU64::new(0),
        })
    }

    /// Returns the storage directory path.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn next_name(&self, prefix: &str, ext: &str) -> String {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        format!("{prefix}{millis}-{seq}{ext}")
    }

    /// Writes an uploaded original to disk, returning a guard that deletes it again on drop.
    ///
    /// The file keeps the extension of `original_name`, if it has one.
    pub fn store_upload(&self, original_name: Option<&str>, data: &[u8]) -> io::Result<TempUpload> {
        let ext = original_name
            .and_then(|name| Path::new(name).extension())
            .and_then(|ext| ext.to_str())
            .map(|ext| format!(".{ext}"))
            .unwrap_or_default();

        let path = self.dir.join(self.next_name("", &ext));
        fs::write(&path, data)?;
        Ok(TempUpload { path })
    }

    /// Writes a processed PNG to disk and returns its path. Outputs are retained.
    pub fn store_output(&self, data: &[u8]) -> io::Result<PathBuf> {
        let path = self.dir.join(self.next_name("processed-", ".png"));
        fs::write(&path, data)?;
        Ok(path)
    }
}

/// A stored upload that lives only as long as its request.
///
/// Dropping the guard removes the file from disk.
pub struct TempUpload {
    path: PathBuf,
}

impl TempUpload {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for TempUpload {
    fn drop(&mut self) {
        if let Err(err) = fs::remove_file(&self.path) {
            log::warn!("failed to remove upload `{}`: {err}", self.path.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_storage(label: &str) -> Storage {
        let dir = std::env::temp_dir().join(format!(
            "narigudo-storage-{label}-{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        Storage::create(dir).unwrap()
    }

    #[test]
    fn upload_is_removed_on_drop() {
        let storage = test_storage("drop");

        let upload = storage.store_upload(Some("photo.jpg"), b"fake data").unwrap();
        let path = upload.path().to_path_buf();
        assert!(path.exists());
        assert_eq!(path.extension().unwrap(), "jpg");

        drop(upload);
        assert!(!path.exists());
    }

    #[test]
    fn upload_without_extension() {
        let storage = test_storage("noext");
        let upload = storage.store_upload(None, b"data").unwrap();
        assert!(upload.path().extension().is_none());
    }

    #[test]
    fn outputs_are_retained_and_unique() {
        let storage = test_storage("outputs");

        let a = storage.store_output(b"png a").unwrap();
        let b = storage.store_output(b"png b").unwrap();
        assert_ne!(a, b);
        assert!(a.exists() && b.exists());
        assert!(a
            .file_name()
            .unwrap()
            .to_str()
            .unwrap()
            .starts_with("processed-"));
        assert_eq!(fs::read(&b).unwrap(), b"png b");
    }
}
