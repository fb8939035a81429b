use std::io::Write;
use std::path::Path;

use serde::Deserialize;

use super::{ArtifactBundle, ArtifactError, BUNDLE_FORMAT_VERSION};

const TEMP_SUFFIX: &str = ".tmp";

#[derive(Deserialize)]
struct VersionProbe {
    format_version: u32,
}

/// Read and validate the bundle at `path`.
///
/// The format version is checked before the rest of the document is
/// parsed, so bundles from newer releases fail with `UnsupportedVersion`
/// rather than a parse error.
pub fn load(path: &Path) -> Result<ArtifactBundle, ArtifactError> {
    let bytes = std::fs::read(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            ArtifactError::Missing {
                path: path.to_path_buf(),
            }
        } else {
            ArtifactError::Read {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;
    let probe: VersionProbe =
        serde_json::from_slice(&bytes).map_err(|source| ArtifactError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    if probe.format_version != BUNDLE_FORMAT_VERSION {
        return Err(ArtifactError::UnsupportedVersion {
            found: probe.format_version,
            expected: BUNDLE_FORMAT_VERSION,
        });
    }
    let bundle: ArtifactBundle =
        serde_json::from_slice(&bytes).map_err(|source| ArtifactError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    bundle.validate()?;
    tracing::info!(
        "Loaded model artifact {} ({} trees, {} features)",
        path.display(),
        bundle.model.trees.len(),
        bundle.feature_names.len()
    );
    Ok(bundle)
}

/// Validate `bundle` and write it to `path` atomically, creating parent
/// directories as needed.
pub fn save(bundle: &ArtifactBundle, path: &Path) -> Result<(), ArtifactError> {
    bundle.validate()?;
    let data = serde_json::to_vec(bundle).map_err(ArtifactError::Serialize)?;
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(|source| ArtifactError::Write {
        path: dir.to_path_buf(),
        source,
    })?;
    atomic_write(dir, path, &data)?;
    tracing::info!("Wrote model artifact {} ({} bytes)", path.display(), data.len());
    Ok(())
}

/// Write `data` to a hidden temp file next to `path`, fsync it, then rename
/// it into place. An interrupted save leaves the previous bundle intact.
fn atomic_write(dir: &Path, path: &Path, data: &[u8]) -> Result<(), ArtifactError> {
    let write_err = |path: &Path, source: std::io::Error| ArtifactError::Write {
        path: path.to_path_buf(),
        source,
    };
    let file_name = path
        .file_name()
        .ok_or_else(|| write_err(path, std::io::Error::other("artifact path has no file name")))?;
    let prefix = format!(".{}.", file_name.to_string_lossy());
    let mut temp = tempfile::Builder::new()
        .prefix(&prefix)
        .suffix(TEMP_SUFFIX)
        .tempfile_in(dir)
        .map_err(|source| write_err(dir, source))?;
    temp.write_all(data)
        .and_then(|()| temp.as_file().sync_all())
        .map_err(|source| write_err(temp.path(), source))?;
    temp.persist(path)
        .map_err(|persist| write_err(path, persist.error))?;
    sync_dir(dir)
}

#[cfg(unix)]
fn sync_dir(dir: &Path) -> Result<(), ArtifactError> {
    std::fs::File::open(dir)
        .and_then(|handle| handle.sync_all())
        .map_err(|source| ArtifactError::Write {
            path: dir.to_path_buf(),
            source,
        })
}

#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> Result<(), ArtifactError> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::fixture_bundle;

    #[test]
    fn save_then_load_returns_same_bundle() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("model.json");
        let bundle = fixture_bundle();
        save(&bundle, &path).unwrap();
        assert_eq!(load(&path).unwrap(), bundle);

        assert!(temp_files(path.parent().unwrap()).is_empty());
    }

    fn temp_files(dir: &Path) -> Vec<String> {
        std::fs::read_dir(dir)
            .unwrap()
            .filter_map(Result::ok)
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .filter(|name| name.ends_with(TEMP_SUFFIX))
            .collect()
    }

    #[test]
    fn save_replaces_existing_bundle_in_place() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        std::fs::write(&path, b"stale").unwrap();
        save(&fixture_bundle(), &path).unwrap();
        assert_eq!(load(&path).unwrap(), fixture_bundle());
        assert!(temp_files(dir.path()).is_empty());
        let names: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(names.len(), 1);
    }

    #[test]
    fn path_without_file_name_is_write_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = atomic_write(dir.path(), Path::new("/"), b"{}").unwrap_err();
        assert!(matches!(err, ArtifactError::Write { .. }));
    }

    #[test]
    fn saving_twice_writes_identical_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.json");
        let b = dir.path().join("b.json");
        save(&fixture_bundle(), &a).unwrap();
        save(&fixture_bundle(), &b).unwrap();
        assert_eq!(std::fs::read(a).unwrap(), std::fs::read(b).unwrap());
    }

    #[test]
    fn missing_file_is_named_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ArtifactError::Missing { .. }));
    }

    #[test]
    fn future_version_is_rejected_before_parsing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        std::fs::write(&path, r#"{"format_version": 7, "something": "new"}"#).unwrap();
        assert!(matches!(
            load(&path).unwrap_err(),
            ArtifactError::UnsupportedVersion {
                found: 7,
                expected: 1
            }
        ));
    }

    #[test]
    fn garbage_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        std::fs::write(&path, b"not json").unwrap();
        assert!(matches!(
            load(&path).unwrap_err(),
            ArtifactError::Parse { .. }
        ));
    }

    #[test]
    fn invalid_bundle_is_not_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        let mut bundle = fixture_bundle();
        bundle.feature_names.pop();
        assert!(save(&bundle, &path).is_err());
        assert!(!path.exists());
    }
}
