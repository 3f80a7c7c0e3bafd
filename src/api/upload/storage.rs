use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Local file store standing behind the same path contract the
/// object-storage bucket uses: every user may only write under
/// `profile_pictures/{uid}` and `white_cards/{uid}`.
pub struct UploadStore {
    root: PathBuf,
    base_url: String,
}

const ALLOWED_PREFIXES: [&str; 2] = ["profile_pictures", "white_cards"];

impl UploadStore {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        UploadStore {
            root: root.into(),
            base_url: base_url.into(),
        }
    }

    /// A storage path is acceptable when it is a clean relative path
    /// whose first segment is a permitted bucket folder and whose
    /// second segment is the caller's own uid.
    pub fn allowed_path(path: &str, uid: &str) -> bool {
        if path.is_empty() || path.starts_with('/') || path.contains('\\') {
            return false;
        }
        if path.split('/').any(|seg| seg.is_empty() || seg == "." || seg == "..") {
            return false;
        }

        let mut segments = path.split('/');
        let bucket = segments.next().unwrap_or_default();
        let owner = segments.next().unwrap_or_default();
        ALLOWED_PREFIXES.contains(&bucket) && owner == uid
    }

    /// Copy an uploaded temp file to its storage path and return the
    /// public URL it will be served from.
    pub fn store(&self, rel_path: &str, temp: &Path) -> io::Result<String> {
        let dest = self.root.join(rel_path);
        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(temp, &dest)?;

        Ok(format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            rel_path
        ))
    }
}
