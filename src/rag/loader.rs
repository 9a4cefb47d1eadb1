//! Document loading from a directory tree.
//!
//! Files are selected by matching their path relative to the source directory
//! against a glob (`**/*.pdf` by default). PDFs go through `pdf-extract`;
//! anything else that matches is read as UTF-8 text.
//!
//! Documents are identified by their path relative to the source directory,
//! so `data`, `./data` and an absolute path to it yield the same ids.

use crate::types::{AppError, Result, SourceDocument};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Documents read from the source directory plus the files that were skipped.
#[derive(Debug, Default)]
pub struct LoadedDocuments {
    pub documents: Vec<SourceDocument>,
    pub skipped: Vec<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct DocumentLoader {
    directory: PathBuf,
    pattern: glob::Pattern,
}

impl DocumentLoader {
    pub fn new(directory: impl Into<PathBuf>, glob: &str) -> Result<Self> {
        let pattern = glob::Pattern::new(glob)
            .map_err(|e| AppError::InvalidInput(format!("Invalid glob pattern '{}': {}", glob, e)))?;
        Ok(Self {
            directory: directory.into(),
            pattern,
        })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Load every matching file.
    ///
    /// A missing or unreadable directory is an error. Individual files that
    /// cannot be extracted, or that contain no text, are skipped.
    pub async fn load(&self) -> Result<LoadedDocuments> {
        let loader = self.clone();
        tokio::task::spawn_blocking(move || loader.load_blocking())
            .await
            .map_err(|e| AppError::Internal(format!("Document loading task failed: {}", e)))?
    }

    fn load_blocking(&self) -> Result<LoadedDocuments> {
        let metadata = std::fs::metadata(&self.directory).map_err(|e| {
            AppError::Io(format!("{}: {}", self.directory.display(), e))
        })?;
        if !metadata.is_dir() {
            return Err(AppError::Io(format!(
                "{} is not a directory",
                self.directory.display()
            )));
        }

        let mut loaded = LoadedDocuments::default();

        for entry in WalkDir::new(&self.directory).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) if e.depth() == 0 => {
                    return Err(AppError::Io(format!(
                        "{}: {}",
                        self.directory.display(),
                        e
                    )));
                }
                Err(e) => {
                    warn!(error = %e, "Skipping unreadable directory entry");
                    if let Some(path) = e.path() {
                        loaded.skipped.push(path.to_path_buf());
                    }
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let relative = path.strip_prefix(&self.directory).unwrap_or(path);
            if !self.pattern.matches_path(relative) {
                continue;
            }

            match extract_text(path) {
                Ok(text) if !text.trim().is_empty() => {
                    debug!(path = %path.display(), chars = text.len(), "Loaded document");
                    loaded.documents.push(SourceDocument {
                        source: relative.to_path_buf(),
                        text,
                    });
                }
                Ok(_) => {
                    warn!(path = %path.display(), "Skipping document with no extractable text");
                    loaded.skipped.push(path.to_path_buf());
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Skipping document that failed extraction");
                    loaded.skipped.push(path.to_path_buf());
                }
            }
        }

        Ok(loaded)
    }
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

fn extract_text(path: &Path) -> Result<String> {
    if !is_pdf(path) {
        return Ok(std::fs::read_to_string(path)?);
    }

    // pdf-extract panics on some malformed files.
    let owned = path.to_path_buf();
    match std::panic::catch_unwind(move || pdf_extract::extract_text(&owned)) {
        Ok(Ok(text)) => Ok(text),
        Ok(Err(e)) => Err(AppError::Io(format!("PDF extraction failed: {}", e))),
        Err(_) => Err(AppError::Io("PDF extraction panicked".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &Path, name: &str, content: &str) {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    #[tokio::test]
    async fn test_empty_directory_loads_nothing() {
        let dir = TempDir::new().unwrap();
        let loader = DocumentLoader::new(dir.path(), "**/*.pdf").unwrap();

        let loaded = loader.load().await.unwrap();
        assert!(loaded.documents.is_empty());
        assert!(loaded.skipped.is_empty());
    }

    #[tokio::test]
    async fn test_missing_directory_is_io_error() {
        let loader = DocumentLoader::new("/definitely/not/a/real/dir", "**/*.pdf").unwrap();
        assert!(matches!(loader.load().await, Err(AppError::Io(_))));
    }

    #[tokio::test]
    async fn test_file_path_is_io_error() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "notes.txt", "hello");
        let loader = DocumentLoader::new(dir.path().join("notes.txt"), "*").unwrap();
        assert!(matches!(loader.load().await, Err(AppError::Io(_))));
    }

    #[tokio::test]
    async fn test_glob_selects_nested_text_files() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a.txt", "The capital of France is Paris.");
        write(dir.path(), "nested/b.txt", "Mumbai is in Maharashtra.");
        write(dir.path(), "ignored.md", "Not matched.");

        let loader = DocumentLoader::new(dir.path(), "**/*.txt").unwrap();
        let loaded = loader.load().await.unwrap();

        let mut names: Vec<_> = loaded
            .documents
            .iter()
            .map(|d| d.source.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        names.sort();
        assert_eq!(names, vec!["a.txt", "b.txt"]);
    }

    #[tokio::test]
    async fn test_sources_are_relative_to_directory() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "nested/b.txt", "Mumbai is in Maharashtra.");

        let plain = DocumentLoader::new(dir.path(), "**/*.txt").unwrap();
        let dotted = DocumentLoader::new(dir.path().join("."), "**/*.txt").unwrap();
        let plain = plain.load().await.unwrap();
        let dotted = dotted.load().await.unwrap();

        assert_eq!(plain.documents[0].source, PathBuf::from("nested/b.txt"));
        assert_eq!(plain.documents[0].source_id(), "nested/b.txt");
        assert_eq!(dotted.documents[0].source_id(), plain.documents[0].source_id());
    }

    #[tokio::test]
    async fn test_blank_and_broken_files_are_skipped() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "good.txt", "Some content.");
        write(dir.path(), "blank.txt", "   \n");
        write(dir.path(), "broken.pdf", "this is not a pdf");

        let loader = DocumentLoader::new(dir.path(), "*").unwrap();
        let loaded = loader.load().await.unwrap();

        assert_eq!(loaded.documents.len(), 1);
        assert_eq!(loaded.skipped.len(), 2);
    }

    #[test]
    fn test_invalid_glob_rejected() {
        assert!(matches!(
            DocumentLoader::new("data", "[.pdf"),
            Err(AppError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_pdf_extension_detection() {
        assert!(is_pdf(Path::new("a/b/Report.PDF")));
        assert!(!is_pdf(Path::new("notes.txt")));
        assert!(!is_pdf(Path::new("pdf")));
    }
}
