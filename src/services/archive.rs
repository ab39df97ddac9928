//! Zip packaging for `GET /download_all`.

use std::path::PathBuf;

use async_zip::{Compression, ZipEntryBuilder, base::write::ZipFileWriter};

use crate::error::AppError;

/// Name offered to the browser for the bundled download.
pub const ARCHIVE_NAME: &str = "sql_statements.zip";

/// Build an in-memory deflate archive of `files`.
///
/// Each entry is stored under its bare file name. Output files are bounded by
/// the batch size, so buffering them whole is fine.
pub async fn zip_files(files: &[(String, PathBuf)]) -> Result<Vec<u8>, AppError> {
    let mut writer = ZipFileWriter::new(Vec::<u8>::new());
    for (name, path) in files {
        let data = tokio::fs::read(path).await?;
        let entry = ZipEntryBuilder::new(name.clone().into(), Compression::Deflate);
        writer.write_entry_whole(entry, &data).await?;
    }
    Ok(writer.close().await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn archive_contains_every_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut files = Vec::new();
        for name in ["a_part_001.sql", "a_part_002.sql"] {
            let path = dir.path().join(name);
            std::fs::write(&path, "USE mms;\n\nUPDATE mms.T SET A = 1 WHERE B = 2;\n").unwrap();
            files.push((name.to_string(), path));
        }

        let bytes = zip_files(&files).await.unwrap();

        assert!(bytes.starts_with(b"PK\x03\x04"));
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("a_part_001.sql"));
        assert!(text.contains("a_part_002.sql"));
    }
}
