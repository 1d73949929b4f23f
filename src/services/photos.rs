/// Best-effort local copy of entry photos
///
/// Copies run on background tasks. A failed copy is logged and otherwise
/// ignored; the entry it belongs to is already saved by then.

use std::path::{Path, PathBuf};

use tokio::task::JoinHandle;

use crate::domain::{AddictionId, EntryId, UserId};

const DEFAULT_EXTENSION: &str = "jpg";

#[derive(Debug, Clone)]
pub struct PhotoMirror {
    root: PathBuf,
}

impl PhotoMirror {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Where the copy of `source` for this entry ends up
    pub fn destination(
        &self,
        source: &Path,
        user_id: &UserId,
        addiction_id: &AddictionId,
        entry_id: &EntryId,
    ) -> PathBuf {
        let extension = source
            .extension()
            .and_then(|ext| ext.to_str())
            .filter(|ext| !ext.is_empty())
            .unwrap_or(DEFAULT_EXTENSION)
            .to_lowercase();

        self.root
            .join(user_id.to_string())
            .join(addiction_id.to_string())
            .join(format!("{}.{}", entry_id, extension))
    }

    /// Start copying `source` to `destination` in the background
    pub fn mirror(&self, source: PathBuf, destination: PathBuf) -> JoinHandle<()> {
        tokio::spawn(async move {
            if let Err(e) = copy_photo(&source, &destination).await {
                tracing::warn!(
                    "Failed to mirror photo {} to {}: {}",
                    source.display(),
                    destination.display(),
                    e
                );
                return;
            }
            tracing::debug!("Mirrored photo to {}", destination.display());
        })
    }
}

async fn copy_photo(source: &Path, destination: &Path) -> std::io::Result<()> {
    if let Some(parent) = destination.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::copy(source, destination).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_destination_layout() {
        let mirror = PhotoMirror::new(PathBuf::from("/photos"));
        let user = UserId::new();
        let addiction = AddictionId::new();
        let entry = EntryId::new();

        let dest = mirror.destination(Path::new("/tmp/IMG_01.PNG"), &user, &addiction, &entry);
        assert_eq!(
            dest,
            PathBuf::from(format!("/photos/{}/{}/{}.png", user, addiction, entry))
        );

        let dest = mirror.destination(Path::new("/tmp/capture"), &user, &addiction, &entry);
        assert!(dest.to_string_lossy().ends_with(".jpg"));
    }

    #[tokio::test]
    async fn test_mirror_copies_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("shot.jpg");
        std::fs::write(&source, b"jpeg bytes").unwrap();

        let mirror = PhotoMirror::new(dir.path().join("photos"));
        let dest = mirror.destination(&source, &UserId::new(), &AddictionId::new(), &EntryId::new());
        mirror.mirror(source, dest.clone()).await.unwrap();

        assert_eq!(std::fs::read(&dest).unwrap(), b"jpeg bytes");
    }

    #[tokio::test]
    async fn test_missing_source_is_swallowed() {
        let dir = tempfile::tempdir().unwrap();
        let mirror = PhotoMirror::new(dir.path().to_path_buf());
        let dest = dir.path().join("out.jpg");

        mirror
            .mirror(dir.path().join("does-not-exist.jpg"), dest.clone())
            .await
            .unwrap();
        assert!(!dest.exists());
    }
}
