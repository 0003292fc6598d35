use std::sync::Arc;

use shared::domain::ACCEPTED_MEDIA_TYPE;

use crate::error::InvalidDocument;

/// What the user is told when a picked file is not an accepted document.
pub const INVALID_DOCUMENT_NOTICE: &str = "Please upload a valid PDF file.";

/// A file the user picked, with whatever media type the picker declared for it.
#[derive(Debug, Clone)]
pub struct DocumentCandidate {
    pub name: String,
    pub media_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl DocumentCandidate {
    pub fn new(name: impl Into<String>, media_type: Option<&str>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            media_type: media_type.map(str::to_string),
            bytes,
        }
    }
}

/// A validated document. Cloning shares the underlying bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRef {
    name: Arc<str>,
    media_type: Arc<str>,
    bytes: Arc<[u8]>,
}

impl DocumentRef {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[derive(Debug)]
pub struct DocumentHolder {
    accepted_media_type: String,
    current: Option<DocumentRef>,
}

impl Default for DocumentHolder {
    fn default() -> Self {
        Self::new(ACCEPTED_MEDIA_TYPE)
    }
}

impl DocumentHolder {
    pub fn new(accepted_media_type: impl Into<String>) -> Self {
        let accepted_media_type: String = accepted_media_type.into();
        Self {
            accepted_media_type: accepted_media_type.trim().to_ascii_lowercase(),
            current: None,
        }
    }

    pub fn accepted_media_type(&self) -> &str {
        &self.accepted_media_type
    }

    /// Validates the declared media type and, on success, replaces the held document.
    /// A rejected candidate leaves the holder untouched.
    pub fn select(&mut self, candidate: DocumentCandidate) -> Result<DocumentRef, InvalidDocument> {
        let matches = candidate
            .media_type
            .as_deref()
            .map(|declared| declared.trim().eq_ignore_ascii_case(&self.accepted_media_type))
            .unwrap_or(false);
        if !matches {
            return Err(InvalidDocument {
                name: candidate.name,
                declared: candidate.media_type,
                expected: self.accepted_media_type.clone(),
            });
        }

        let document = DocumentRef {
            name: candidate.name.into(),
            media_type: self.accepted_media_type.as_str().into(),
            bytes: candidate.bytes.into(),
        };
        self.current = Some(document.clone());
        Ok(document)
    }

    pub fn current(&self) -> Option<DocumentRef> {
        self.current.clone()
    }
}

#[cfg(test)]
#[path = "tests/document_tests.rs"]
mod tests;
