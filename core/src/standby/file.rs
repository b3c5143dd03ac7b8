use std::path::PathBuf;

use async_trait::async_trait;

use super::StandbySource;
use crate::error::SourceError;
use crate::stream::{ErrReader, InputStream};

/// Standby source that opens a file at activation time, so a file that only
/// appears once it is clear no data was piped in still works. The descriptor
/// is released when the returned stream is dropped, on every exit path.
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl StandbySource for FileSource {
    fn name(&self) -> &str {
        "file"
    }

    async fn activate(&self) -> Option<InputStream> {
        match tokio::fs::File::open(&self.path).await {
            Ok(file) => Some(Box::new(file)),
            Err(source) => {
                tracing::debug!(
                    path = %self.path.display(),
                    error = %source,
                    "standby file failed to open"
                );
                Some(Box::new(ErrReader::from_source(SourceError::Open {
                    path: self.path.clone(),
                    source,
                })))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tokio::io::AsyncReadExt;

    #[tokio::test]
    async fn streams_the_file_content() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"standby file: test\n").unwrap();

        let source = FileSource::new(file.path());
        let mut stream = source.activate().await.unwrap();
        let mut out = Vec::new();
        stream.read_to_end(&mut out).await.unwrap();
        assert_eq!(out, b"standby file: test\n".to_vec());
    }

    #[tokio::test]
    async fn missing_file_reports_the_open_failure() {
        let dir = tempfile::tempdir().unwrap();
        let source = FileSource::new(dir.path().join("does-not-exist"));
        let mut stream = source.activate().await.unwrap();
        let err = stream.read_to_end(&mut Vec::new()).await.unwrap_err();
        assert!(err.to_string().contains("open file"));
    }
}
