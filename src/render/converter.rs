use async_trait::async_trait;

use crate::errors::InternalError;

/// Converts rendered markup into a durable binary document.
///
/// May be slow or remote. Callers must invoke it at most once per export
/// attempt; a failed conversion fails the attempt before anything persists.
#[async_trait]
pub trait DocumentConverter: Send + Sync {
    async fn convert(&self, markup: &str) -> Result<Vec<u8>, InternalError>;
}

/// Converter that stores the markup itself as the document.
///
/// The production PDF engine sits behind the same trait; archiving the
/// rendered HTML keeps the version pipeline byte-stable without it.
pub struct HtmlDocumentConverter;

impl HtmlDocumentConverter {
    pub const CONTENT_TYPE: &'static str = "text/html; charset=utf-8";
}

#[async_trait]
impl DocumentConverter for HtmlDocumentConverter {
    async fn convert(&self, markup: &str) -> Result<Vec<u8>, InternalError> {
        Ok(markup.as_bytes().to_vec())
    }
}
