use std::io;

use async_trait::async_trait;

use super::StandbySource;
use crate::stream::InputStream;

/// Standby source over a fixed in-memory value. No failure mode.
pub struct TextSource {
    value: String,
}

impl TextSource {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

#[async_trait]
impl StandbySource for TextSource {
    fn name(&self) -> &str {
        "string"
    }

    async fn activate(&self) -> Option<InputStream> {
        Some(Box::new(io::Cursor::new(self.value.clone().into_bytes())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;

    #[tokio::test]
    async fn yields_the_value_on_every_activation() {
        let source = TextSource::new("standby data\n");
        for _ in 0..2 {
            let mut stream = source.activate().await.unwrap();
            let mut out = Vec::new();
            stream.read_to_end(&mut out).await.unwrap();
            assert_eq!(out, b"standby data\n".to_vec());
        }
    }
}
