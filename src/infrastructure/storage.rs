use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::domain::error::{AppError, Result};

pub fn ensure_output_dir(output_dir: &Path) -> std::io::Result<PathBuf> {
    ensure_dir(output_dir)?;
    Ok(output_dir.to_path_buf())
}

/// Create `dir/file_name` and hand it to `write`. Fails instead of
/// overwriting when the file already exists; a partial file is removed.
pub fn write_new_file<F>(dir: &Path, file_name: &str, write: F) -> Result<PathBuf>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<()>,
{
    ensure_dir(dir).map_err(|e| {
        AppError::IoError(format!(
            "Failed to create output dir {}: {}",
            dir.display(),
            e
        ))
    })?;

    let path = dir.join(file_name);
    let file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&path)
        .map_err(|e| {
            AppError::IoError(format!("Failed to create {}: {}", path.display(), e))
        })?;

    let mut writer = BufWriter::new(file);
    let written = write(&mut writer).and_then(|_| {
        writer
            .flush()
            .map_err(|e| AppError::IoError(format!("Failed to flush {}: {}", path.display(), e)))
    });

    if let Err(err) = written {
        drop(writer);
        let _ = fs::remove_file(&path);
        return Err(err);
    }
    Ok(path)
}

fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn scratch_dir() -> PathBuf {
        std::env::temp_dir().join(format!("rfm_storage_{}", Uuid::new_v4()))
    }

    #[test]
    fn creates_missing_dir_and_file() {
        let dir = scratch_dir().join("nested");
        let path = write_new_file(&dir, "a.csv", |w| {
            w.write_all(b"x\n")?;
            Ok(())
        })
        .unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "x\n");
        fs::remove_dir_all(dir.parent().unwrap()).ok();
    }

    #[test]
    fn never_overwrites_existing_file() {
        let dir = scratch_dir();
        write_new_file(&dir, "a.csv", |w| {
            w.write_all(b"first")?;
            Ok(())
        })
        .unwrap();

        let err = write_new_file(&dir, "a.csv", |w| {
            w.write_all(b"second")?;
            Ok(())
        })
        .unwrap_err();

        assert_eq!(err.kind(), "io");
        assert_eq!(fs::read_to_string(dir.join("a.csv")).unwrap(), "first");
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn failed_write_leaves_no_file() {
        let dir = scratch_dir();
        let err = write_new_file(&dir, "broken.csv", |_| {
            Err(AppError::IoError("simulated".to_string()))
        })
        .unwrap_err();
        assert_eq!(err.message(), "simulated");
        assert!(!dir.join("broken.csv").exists());
        fs::remove_dir_all(dir).ok();
    }
}
