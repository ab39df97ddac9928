//! Upload and output directory management.
//!
//! The service keeps exactly one uploaded file and the SQL files of the most
//! recent successful run. Both directories are replaced wholesale: an upload
//! clears the upload directory, a generation run writes into a staging
//! directory next to the output directory and swaps it in only once the run
//! has produced at least one file.
//!
//! # Locking
//!
//! Mutating operations must hold the guard returned by [`Workspace::lock`] so
//! an upload never swaps the file out from under a running generation.

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tokio::{
    fs,
    sync::{Mutex, MutexGuard},
};

use crate::{
    error::AppError,
    models::result::OutputFile,
    services::tabular::{Format, sanitize_filename},
};

#[derive(Debug)]
pub struct Workspace {
    upload_dir: PathBuf,
    output_dir: PathBuf,
    staging_dir: PathBuf,
    lock: Mutex<()>,
}

/// The file the next generation run reads from.
#[derive(Debug, Clone)]
pub struct Upload {
    pub filename: String,
    pub path: PathBuf,
    pub format: Format,
}

impl Workspace {
    pub fn new(upload_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        let output_dir = output_dir.into();
        Self {
            upload_dir: upload_dir.into(),
            staging_dir: sibling(&output_dir, "staging"),
            output_dir,
            lock: Mutex::new(()),
        }
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Create both directories if they do not exist yet.
    pub async fn prepare(&self) -> Result<(), AppError> {
        fs::create_dir_all(&self.upload_dir).await?;
        fs::create_dir_all(&self.output_dir).await?;
        Ok(())
    }

    /// Serialize uploads and generation runs.
    pub async fn lock(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().await
    }

    /// Replace the current upload with `contents`.
    ///
    /// # Errors
    ///
    /// - `NoSelectedFile`: the client sent an empty filename
    /// - `FileTypeNotAllowed`: not a `.csv` / `.tsv` file after sanitizing
    pub async fn store_upload(&self, original_name: &str, contents: &[u8]) -> Result<Upload, AppError> {
        if original_name.trim().is_empty() {
            return Err(AppError::NoSelectedFile);
        }
        let filename = sanitize_filename(original_name);
        let format = Format::from_filename(&filename).ok_or(AppError::FileTypeNotAllowed)?;

        reset_dir(&self.upload_dir).await?;
        let path = self.upload_dir.join(&filename);
        fs::write(&path, contents).await?;

        tracing::info!(file = %filename, bytes = contents.len(), "upload stored");
        Ok(Upload {
            filename,
            path,
            format,
        })
    }

    /// Locate the uploaded file.
    ///
    /// With a `requested` name, that file must exist. Without one, the first
    /// supported file in the upload directory is used.
    pub async fn current_upload(&self, requested: Option<&str>) -> Result<Upload, AppError> {
        if let Some(requested) = requested.map(str::trim).filter(|r| !r.is_empty()) {
            let filename = sanitize_filename(requested);
            let format = Format::from_filename(&filename)
                .ok_or_else(|| AppError::FileNotFound(requested.to_string()))?;
            let path = self.upload_dir.join(&filename);
            if filename != requested || !fs::try_exists(&path).await? {
                return Err(AppError::FileNotFound(requested.to_string()));
            }
            return Ok(Upload {
                filename,
                path,
                format,
            });
        }

        let mut names = Vec::new();
        let mut entries = fs::read_dir(&self.upload_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_file() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();

        names
            .into_iter()
            .find_map(|filename| {
                let format = Format::from_filename(&filename)?;
                Some(Upload {
                    path: self.upload_dir.join(&filename),
                    filename,
                    format,
                })
            })
            .ok_or(AppError::NoUpload)
    }

    /// Start a fresh, empty staging directory for the next run.
    pub async fn begin_staging(&self) -> Result<PathBuf, AppError> {
        reset_dir(&self.staging_dir).await?;
        Ok(self.staging_dir.clone())
    }

    /// Replace the output directory with the staged run.
    ///
    /// The previous output is moved aside first and restored if the staged
    /// directory cannot take its place.
    pub async fn publish_staging(&self) -> Result<(), AppError> {
        let retired = sibling(&self.output_dir, "retired");
        remove_dir_if_present(&retired).await?;
        let had_output = fs::try_exists(&self.output_dir).await?;
        if had_output {
            fs::rename(&self.output_dir, &retired).await?;
        }

        if let Err(err) = fs::rename(&self.staging_dir, &self.output_dir).await {
            if had_output {
                fs::rename(&retired, &self.output_dir).await?;
            }
            return Err(err.into());
        }

        remove_dir_if_present(&retired).await
    }

    /// Drop a staged run, leaving the published output untouched.
    pub async fn discard_staging(&self) -> Result<(), AppError> {
        remove_dir_if_present(&self.staging_dir).await
    }

    /// Resolve a client-supplied output filename to a path.
    ///
    /// Anything that is not a plain `.sql` name inside the output directory
    /// is reported as not found.
    pub async fn output_file(&self, name: &str) -> Result<PathBuf, AppError> {
        let not_found = || AppError::FileNotFound(name.to_string());
        if sanitize_filename(name) != name || !name.ends_with(".sql") {
            return Err(not_found());
        }
        let path = self.output_dir.join(name);
        if !fs::try_exists(&path).await? {
            return Err(not_found());
        }
        Ok(path)
    }

    /// Names and paths of the generated `.sql` files, sorted by name.
    pub async fn output_paths(&self) -> Result<Vec<(String, PathBuf)>, AppError> {
        let mut files = Vec::new();
        let mut entries = fs::read_dir(&self.output_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.ends_with(".sql") && entry.file_type().await?.is_file() {
                files.push((name, entry.path()));
            }
        }
        files.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(files)
    }

    /// Generated `.sql` files sorted by name, with size, line count and checksum.
    pub async fn list_outputs(&self) -> Result<Vec<OutputFile>, AppError> {
        let mut files = Vec::new();
        for (name, path) in self.output_paths().await? {
            let contents = fs::read(&path).await?;
            files.push(OutputFile {
                size: contents.len() as u64,
                lines: count_lines(&contents),
                sha256: hex::encode(Sha256::digest(&contents)),
                name,
            });
        }
        Ok(files)
    }
}

/// Lines as a text reader would yield them: a trailing fragment without a
/// newline still counts.
fn count_lines(contents: &[u8]) -> usize {
    let newlines = contents.iter().filter(|b| **b == b'\n').count();
    newlines + usize::from(!contents.is_empty() && !contents.ends_with(b"\n"))
}

/// `output` -> `output.staging`, next to the original.
fn sibling(dir: &Path, suffix: &str) -> PathBuf {
    let mut name = dir
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "output".into());
    name.push(".");
    name.push(suffix);
    dir.with_file_name(name)
}

async fn remove_dir_if_present(dir: &Path) -> Result<(), AppError> {
    match fs::remove_dir_all(dir).await {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(err) => Err(err.into()),
    }
}

async fn reset_dir(dir: &Path) -> Result<(), AppError> {
    remove_dir_if_present(dir).await?;
    fs::create_dir_all(dir).await?;
    Ok(())
}
