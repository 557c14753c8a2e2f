use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, AppResult};

pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Name clashes tolerated within one millisecond before giving up.
const MAX_NAME_ATTEMPTS: u32 = 32;

/// URL prefix the gallery directory is served under.
pub const GALLERY_ROUTE: &str = "/gallery";

/// Reject anything that is not an image or is larger than [`MAX_IMAGE_BYTES`].
pub fn validate_image(content_type: Option<&str>, size: usize) -> AppResult<()> {
    match content_type {
        Some(ct) if ct.starts_with("image/") => {}
        _ => return Err(AppError::Upload("Only image files are allowed!".to_string())),
    }

    if size > MAX_IMAGE_BYTES {
        return Err(AppError::Upload(format!(
            "Image exceeds the {} MB limit",
            MAX_IMAGE_BYTES / (1024 * 1024)
        )));
    }

    Ok(())
}

/// `<unix millis><original extension>`, e.g. `1714550400000.jpg`. A non-zero
/// `attempt` adds a `-<attempt>` suffix before the extension.
pub fn gallery_filename(original_name: Option<&str>, timestamp_millis: i64, attempt: u32) -> String {
    let ext = original_name
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{}", ext))
        .unwrap_or_default();

    if attempt == 0 {
        format!("{}{}", timestamp_millis, ext)
    } else {
        format!("{}-{}{}", timestamp_millis, attempt, ext)
    }
}

/// Write `contents` to a fresh file in `dir` and return its file name and path.
/// Existing files are never overwritten.
pub async fn store_image(
    dir: &Path,
    original_name: Option<&str>,
    contents: &[u8],
) -> AppResult<(String, PathBuf)> {
    store_image_at(dir, original_name, contents, Utc::now().timestamp_millis()).await
}

async fn store_image_at(
    dir: &Path,
    original_name: Option<&str>,
    contents: &[u8],
    timestamp_millis: i64,
) -> AppResult<(String, PathBuf)> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to prepare gallery: {}", e)))?;

    for attempt in 0..MAX_NAME_ATTEMPTS {
        let filename = gallery_filename(original_name, timestamp_millis, attempt);
        let path = dir.join(&filename);

        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path).await {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => continue,
            Err(e) => {
                return Err(AppError::Internal(format!("Failed to store image: {}", e)));
            }
        };

        let written = match file.write_all(contents).await {
            Ok(()) => file.flush().await,
            Err(e) => Err(e),
        };
        if let Err(e) = written {
            drop(file);
            if let Err(cleanup_err) = tokio::fs::remove_file(&path).await {
                tracing::warn!(path = %path.display(), error = %cleanup_err, "Failed to remove partial image");
            }
            return Err(AppError::Internal(format!("Failed to store image: {}", e)));
        }

        return Ok((filename, path));
    }

    Err(AppError::Internal(
        "Failed to store image: no free file name".to_string(),
    ))
}

pub fn gallery_url(filename: &str) -> String {
    format!("{}/{}", GALLERY_ROUTE, filename)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filename_keeps_extension() {
        assert_eq!(gallery_filename(Some("civic.JPG"), 1700000000000, 0), "1700000000000.JPG");
        assert_eq!(gallery_filename(Some("a.b.png"), 42, 0), "42.png");
        assert_eq!(gallery_filename(Some("noext"), 42, 0), "42");
        assert_eq!(gallery_filename(None, 42, 0), "42");
        assert_eq!(gallery_filename(Some("civic.png"), 42, 3), "42-3.png");
    }

    #[tokio::test]
    async fn test_same_millisecond_uploads_get_distinct_files() {
        let dir = tempfile::tempdir().unwrap();

        let (first, first_path) = store_image_at(dir.path(), Some("a.png"), b"first", 42)
            .await
            .unwrap();
        let (second, second_path) = store_image_at(dir.path(), Some("b.png"), b"second", 42)
            .await
            .unwrap();

        assert_eq!(first, "42.png");
        assert_eq!(second, "42-1.png");
        assert_eq!(std::fs::read(first_path).unwrap(), b"first");
        assert_eq!(std::fs::read(second_path).unwrap(), b"second");
    }

    #[test]
    fn test_gallery_url() {
        assert_eq!(gallery_url("42.png"), "/gallery/42.png");
    }

    #[test]
    fn test_validate_image() {
        assert!(validate_image(Some("image/png"), 1024).is_ok());
        assert!(validate_image(Some("image/jpeg"), MAX_IMAGE_BYTES).is_ok());
        assert!(matches!(
            validate_image(Some("application/pdf"), 10),
            Err(AppError::Upload(_))
        ));
        assert!(matches!(validate_image(None, 10), Err(AppError::Upload(_))));
        assert!(matches!(
            validate_image(Some("image/png"), MAX_IMAGE_BYTES + 1),
            Err(AppError::Upload(_))
        ));
    }
}
