//! Artifact publication — atomic replace at the fixed output path.

use std::fs;
use std::io::{Error, ErrorKind};
use std::path::Path;
use tracing::info;

/// Publish artifact bytes at `path`, replacing any prior artifact.
///
/// Writes to a temp sibling and renames over the target, so a concurrent
/// reader observes either the previous complete artifact or the new one,
/// never a partial file. Empty artifacts are rejected before anything
/// touches disk. No history is kept.
pub fn publish(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    if bytes.is_empty() {
        return Err(Error::new(
            ErrorKind::InvalidData,
            "refusing to publish an empty artifact",
        ));
    }
    let tmp = path.with_extension("png.tmp");
    fs::write(&tmp, bytes)?;
    fs::rename(&tmp, path)?;
    info!("published {} bytes to {}", bytes.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_publish_writes_exact_bytes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("latest.png");
        publish(&path, b"artifact-bytes").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"artifact-bytes");
    }

    #[test]
    fn test_publish_replaces_prior_artifact() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("latest.png");
        publish(&path, b"first").unwrap();
        publish(&path, b"second").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"second");
    }

    #[test]
    fn test_publish_rejects_empty_artifact() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("latest.png");
        assert!(publish(&path, b"").is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_publish_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("latest.png");
        publish(&path, b"bytes").unwrap();
        assert!(!dir.path().join("latest.png.tmp").exists());
        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_polling_reader_never_observes_partial_artifact() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("latest.png");
        let a = vec![b'a'; 64 * 1024];
        let b = vec![b'b'; 64 * 1024];
        publish(&path, &a).unwrap();

        let reader_path = path.clone();
        let reader = std::thread::spawn(move || {
            for _ in 0..500 {
                let bytes = fs::read(&reader_path).unwrap();
                assert_eq!(bytes.len(), 64 * 1024, "partial artifact observed");
                assert!(
                    bytes.iter().all(|&c| c == bytes[0]),
                    "mixed artifact bytes observed"
                );
            }
        });

        for i in 0..200 {
            let payload = if i % 2 == 0 { &b } else { &a };
            publish(&path, payload).unwrap();
        }
        reader.join().unwrap();
    }

    #[test]
    fn test_failed_publish_keeps_prior_artifact() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("latest.png");
        publish(&path, b"prior").unwrap();
        assert!(publish(&path, b"").is_err());
        assert_eq!(fs::read(&path).unwrap(), b"prior");
    }
}
