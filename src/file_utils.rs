use anyhow::{anyhow, Context, Result};
use log::debug;
use std::fmt::Debug;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

// @module: File and directory utilities

// @const: Extensions picked up when a directory is given as input
pub const SUBTITLE_EXTENSIONS: [&str; 5] = ["srt", "vtt", "ass", "ssa", "txt"];

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_file()
    }

    // @checks: Directory existence
    pub fn dir_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_dir()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {}", path.display()))?;
        }
        Ok(())
    }

    /// Find subtitle files under a directory, sorted by path
    pub fn find_subtitle_files<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
        let mut result = Vec::new();

        for entry in WalkDir::new(dir.as_ref()).follow_links(true) {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let matches = path
                .extension()
                .map(|ext| ext.to_string_lossy().to_lowercase())
                .is_some_and(|ext| SUBTITLE_EXTENSIONS.contains(&ext.as_str()));
            if matches {
                result.push(path.to_path_buf());
            }
        }

        result.sort();
        Ok(result)
    }

    // @reads: Raw bytes, decoding happens later
    pub fn read_bytes<P: AsRef<Path>>(path: P) -> Result<Vec<u8>> {
        let path = path.as_ref();
        fs::read(path).with_context(|| format!("Failed to read file: {}", path.display()))
    }

    // @returns: File name for display, falls back to the full path
    pub fn display_name<P: AsRef<Path>>(path: P) -> String {
        let path = path.as_ref();
        path.file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string())
    }
}

/// Destination for exported subtitle text
pub trait FileSink: Send + Sync + Debug {
    /// Store `text` under `file_name`, returning where it went
    fn write(&self, file_name: &str, text: &str) -> Result<PathBuf>;
}

// @struct: Writes exported files into one directory
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
    force_overwrite: bool,
}

impl DirectorySink {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            force_overwrite: false,
        }
    }

    pub fn with_force_overwrite(mut self, force_overwrite: bool) -> Self {
        self.force_overwrite = force_overwrite;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl FileSink for DirectorySink {
    fn write(&self, file_name: &str, text: &str) -> Result<PathBuf> {
        FileManager::ensure_dir(&self.dir)?;

        let path = self.dir.join(file_name);
        if path.exists() && !self.force_overwrite {
            return Err(anyhow!(
                "Output file already exists: {} (use --force-overwrite to replace it)",
                path.display()
            ));
        }

        fs::write(&path, text)
            .with_context(|| format!("Failed to write file: {}", path.display()))?;
        debug!("Wrote {} bytes to {}", text.len(), path.display());
        Ok(path)
    }
}
