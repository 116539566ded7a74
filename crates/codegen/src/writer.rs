use crudforge_core::CoreError;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Outcome of writing a single generated file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteStatus {
    Created,
    Updated,
    Unchanged,
    /// Left alone because the file already existed
    Skipped,
}

pub struct CodeWriter;

impl CodeWriter {
    pub fn new() -> Self {
        Self
    }

    /// Fails when `path` exists and overwriting was not requested
    pub fn ensure_writable(&self, path: &Path, overwrite: bool) -> Result<(), CoreError> {
        if path.exists() && !overwrite {
            return Err(CoreError::target_already_exists(path.display().to_string()));
        }
        Ok(())
    }

    pub fn write(&self, path: &Path, content: &str) -> Result<WriteStatus, CoreError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let status = if path.exists() {
            let existing = fs::read_to_string(path)?;
            if existing == content {
                tracing::debug!("Unchanged {}", path.display());
                return Ok(WriteStatus::Unchanged);
            }
            WriteStatus::Updated
        } else {
            WriteStatus::Created
        };

        fs::write(path, content)?;
        tracing::info!("{:?} {}", status, path.display());
        Ok(status)
    }

    /// Write only when the file does not exist yet
    pub fn write_if_absent(&self, path: &Path, content: &str) -> Result<WriteStatus, CoreError> {
        if path.exists() {
            tracing::debug!("Keeping existing {}", path.display());
            return Ok(WriteStatus::Skipped);
        }
        self.write(path, content)
    }
}

impl Default for CodeWriter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_creates_parent_directories() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("src/controllers/order_controller.rs");

        let status = CodeWriter::new().write(&path, "fn index() {}").unwrap();

        assert_eq!(status, WriteStatus::Created);
        assert_eq!(fs::read_to_string(&path).unwrap(), "fn index() {}");
    }

    #[test]
    fn test_write_reports_unchanged_and_updated() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("routing.yaml");
        let writer = CodeWriter::new();

        writer.write(&path, "a").unwrap();
        assert_eq!(writer.write(&path, "a").unwrap(), WriteStatus::Unchanged);
        assert_eq!(writer.write(&path, "b").unwrap(), WriteStatus::Updated);
        assert_eq!(fs::read_to_string(&path).unwrap(), "b");
    }

    #[test]
    fn test_write_if_absent_keeps_existing_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("order_controller_test.rs");
        fs::write(&path, "// hand written").unwrap();

        let status = CodeWriter::new().write_if_absent(&path, "// generated").unwrap();

        assert_eq!(status, WriteStatus::Skipped);
        assert_eq!(fs::read_to_string(&path).unwrap(), "// hand written");
    }

    #[test]
    fn test_ensure_writable() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("order_controller.rs");
        let writer = CodeWriter::new();

        assert!(writer.ensure_writable(&path, false).is_ok());

        fs::write(&path, "").unwrap();
        assert!(writer.ensure_writable(&path, false).unwrap_err().is_target_already_exists());
        assert!(writer.ensure_writable(&path, true).is_ok());
    }
}
