//! Multipart upload bodies.

use std::fmt;

use reqwest::multipart::{Form, Part};

/// A multipart form that can be sent more than once.
///
/// `reqwest`'s own form is consumed on send; this type keeps owned parts so
/// the client can rebuild the body when it retries after a token refresh.
#[derive(Clone, Default)]
pub struct UploadForm {
    parts: Vec<(String, UploadPart)>,
}

#[derive(Clone)]
enum UploadPart {
    Text(String),
    File {
        file_name: String,
        mime: Option<String>,
        bytes: Vec<u8>,
    },
}

impl UploadForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a text field.
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push((name.into(), UploadPart::Text(value.into())));
        self
    }

    /// Add a file field. The MIME type is left for the server to infer.
    pub fn file(
        mut self,
        name: impl Into<String>,
        file_name: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
    ) -> Self {
        self.parts.push((
            name.into(),
            UploadPart::File {
                file_name: file_name.into(),
                mime: None,
                bytes: bytes.into(),
            },
        ));
        self
    }

    /// Add a file field with an explicit MIME type, e.g. `image/jpeg`.
    pub fn file_with_mime(
        mut self,
        name: impl Into<String>,
        file_name: impl Into<String>,
        bytes: impl Into<Vec<u8>>,
        mime: impl Into<String>,
    ) -> Self {
        self.parts.push((
            name.into(),
            UploadPart::File {
                file_name: file_name.into(),
                mime: Some(mime.into()),
                bytes: bytes.into(),
            },
        ));
        self
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Build a fresh `reqwest` form. Fails only on an unparsable MIME type.
    pub(crate) fn to_multipart(&self) -> Result<Form, reqwest::Error> {
        let mut form = Form::new();
        for (name, part) in &self.parts {
            form = match part {
                UploadPart::Text(value) => form.text(name.clone(), value.clone()),
                UploadPart::File {
                    file_name,
                    mime,
                    bytes,
                } => {
                    let mut file = Part::bytes(bytes.clone()).file_name(file_name.clone());
                    if let Some(mime) = mime {
                        file = file.mime_str(mime)?;
                    }
                    form.part(name.clone(), file)
                }
            };
        }
        Ok(form)
    }
}

impl fmt::Debug for UploadPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadPart::Text(value) => f.debug_tuple("Text").field(value).finish(),
            UploadPart::File {
                file_name,
                mime,
                bytes,
            } => f
                .debug_struct("File")
                .field("file_name", file_name)
                .field("mime", mime)
                .field("len", &bytes.len())
                .finish(),
        }
    }
}

impl fmt::Debug for UploadForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.parts.iter().map(|(name, part)| (name, part)))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_repeatedly() {
        let form = UploadForm::new()
            .text("wallet_id", "w1")
            .file_with_mime("receipt", "receipt.jpg", vec![0xFF, 0xD8, 0xFF], "image/jpeg");

        assert_eq!(form.len(), 2);
        assert!(form.to_multipart().is_ok());
        assert!(form.to_multipart().is_ok());
    }

    #[test]
    fn rejects_bad_mime() {
        let form = UploadForm::new().file_with_mime("receipt", "r.bin", vec![1], "not a mime");
        assert!(form.to_multipart().is_err());
    }

    #[test]
    fn debug_hides_file_bytes() {
        let form = UploadForm::new().file("receipt", "r.png", vec![42; 1024]);
        let debug = format!("{:?}", form);
        assert!(debug.contains("r.png"));
        assert!(debug.contains("1024"));
        assert!(!debug.contains("42, 42"));
    }
}
