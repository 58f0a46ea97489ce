// file: src/pipeline/scanner.rs
// description: directory walking and pdf discovery with filtering
// reference: https://docs.rs/walkdir

use crate::config::IngestConfig;
use crate::error::Result;
use crate::utils::Validator;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

pub struct PdfScanner {
    config: IngestConfig,
}

#[derive(Debug, Clone)]
pub struct ScannedFile {
    pub path: PathBuf,
    pub relative_path: String,
    pub file_name: String,
    pub size: u64,
}

impl PdfScanner {
    pub fn new(config: IngestConfig) -> Self {
        Self { config }
    }

    /// PDFs under `root`, sorted by relative path.
    pub fn scan_directory(&self, root: &Path) -> Result<Vec<ScannedFile>> {
        Validator::validate_directory(root)?;
        info!("Scanning directory: {}", root.display());

        let max_size = (self.config.max_file_size_mb as u64) * 1024 * 1024;
        let mut files = Vec::new();

        for entry in WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            if !Validator::is_pdf_path(path) {
                continue;
            }

            if self.should_skip(path) {
                debug!("Skipping file: {}", path.display());
                continue;
            }

            let Ok(metadata) = entry.metadata() else {
                continue;
            };

            let size = metadata.len();
            if size > max_size {
                debug!(
                    "Skipping large file ({} MB): {}",
                    size / 1024 / 1024,
                    path.display()
                );
                continue;
            }

            files.push(ScannedFile {
                path: path.to_path_buf(),
                relative_path: path
                    .strip_prefix(root)
                    .unwrap_or(path)
                    .to_string_lossy()
                    .to_string(),
                file_name: entry.file_name().to_string_lossy().to_string(),
                size,
            });
        }

        files.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
        info!("Found {} pdf files", files.len());
        Ok(files)
    }

    fn should_skip(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy();

        self.config.skip_patterns.iter().any(|pattern| {
            if let Some(suffix) = pattern.strip_prefix('*') {
                path_str.ends_with(suffix)
            } else if let Some(dir) = pattern.strip_suffix("/*") {
                path.components()
                    .any(|component| component.as_os_str().to_string_lossy() == dir)
            } else {
                path_str.contains(pattern.as_str())
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    fn config(skip_patterns: Vec<&str>, max_file_size_mb: usize) -> IngestConfig {
        IngestConfig {
            parallel_workers: 1,
            skip_patterns: skip_patterns.into_iter().map(String::from).collect(),
            max_file_size_mb,
        }
    }

    #[test]
    fn test_scan_finds_only_pdfs() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("lote")).unwrap();
        fs::write(temp.path().join("b.pdf"), b"%PDF").unwrap();
        fs::write(temp.path().join("lote/a.PDF"), b"%PDF").unwrap();
        fs::write(temp.path().join("notas.txt"), b"x").unwrap();

        let files = PdfScanner::new(config(vec![], 10))
            .scan_directory(temp.path())
            .unwrap();
        let names: Vec<&str> = files.iter().map(|f| f.file_name.as_str()).collect();

        assert_eq!(names, vec!["b.pdf", "a.PDF"]);
        assert_eq!(files[1].size, 4);
    }

    #[test]
    fn test_skip_patterns() {
        let scanner = PdfScanner::new(config(vec!["*.tmp.pdf", ".git/*"], 10));

        assert!(scanner.should_skip(Path::new("borrador.tmp.pdf")));
        assert!(scanner.should_skip(Path::new("repo/.git/objects/x.pdf")));
        assert!(!scanner.should_skip(Path::new("manual.pdf")));
    }

    #[test]
    fn test_large_files_skipped() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("big.pdf"), vec![0u8; 2 * 1024 * 1024]).unwrap();
        fs::write(temp.path().join("small.pdf"), b"%PDF").unwrap();

        let files = PdfScanner::new(config(vec![], 1))
            .scan_directory(temp.path())
            .unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].file_name, "small.pdf");
    }

    #[test]
    fn test_missing_directory() {
        let scanner = PdfScanner::new(config(vec![], 1));
        assert!(scanner.scan_directory(Path::new("/nonexistent/pdfs")).is_err());
    }
}
