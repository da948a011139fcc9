//! Multipart form parsing for handlers that accept an image upload.

use axum::{body::Bytes, extract::Multipart};
use std::collections::HashMap;

use super::error::ApiError;
use crate::storage::sanitize_filename;
use crate::AppState;

/// An uploaded file part
#[derive(Debug)]
pub struct UploadedFile {
    pub filename: String,
    pub bytes: Bytes,
}

/// Text fields of a multipart form plus at most one file part
#[derive(Debug, Default)]
pub struct FormData {
    fields: HashMap<String, String>,
    file: Option<UploadedFile>,
}

impl FormData {
    /// Drain a multipart body. The part named `file_field` is kept as the
    /// upload (an empty part counts as no upload); every other part is text.
    pub async fn read(mut multipart: Multipart, file_field: &str) -> Result<Self, ApiError> {
        let mut form = FormData::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::bad_request(e.body_text()))?
        {
            let name = field.name().unwrap_or_default().to_string();

            if name == file_field {
                let filename = field.file_name().unwrap_or("image").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(e.body_text()))?;
                if !bytes.is_empty() {
                    form.file = Some(UploadedFile { filename, bytes });
                }
            } else {
                let value = field
                    .text()
                    .await
                    .map_err(|e| ApiError::bad_request(e.body_text()))?;
                form.fields.insert(name, value);
            }
        }

        Ok(form)
    }

    /// Trimmed text value; blank counts as absent
    pub fn text(&self, name: &str) -> Option<String> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    /// Trimmed text value, empty when absent
    pub fn required(&self, name: &str) -> String {
        self.text(name).unwrap_or_default()
    }

    /// Checkbox-style boolean
    pub fn flag(&self, name: &str) -> bool {
        matches!(
            self.fields.get(name).map(|v| v.trim()),
            Some("true" | "on" | "1")
        )
    }

    pub fn take_file(&mut self) -> Option<UploadedFile> {
        self.file.take()
    }
}

/// Store an upload as `<kind>-<user>-<millis>-<original name>` and return its public path
pub async fn store_upload(
    state: &AppState,
    kind: &str,
    user_id: &str,
    file: UploadedFile,
) -> Result<String, ApiError> {
    let name = sanitize_filename(&file.filename)?;
    let filename = format!(
        "{}-{}-{}-{}",
        kind,
        user_id,
        chrono::Utc::now().timestamp_millis(),
        name
    );
    Ok(state.blobs.write(&file.bytes, &filename).await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(pairs: &[(&str, &str)]) -> FormData {
        FormData {
            fields: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            file: None,
        }
    }

    #[test]
    fn test_text_trims_and_drops_blank() {
        let form = form(&[("title", "  Hello "), ("excerpt", "   ")]);
        assert_eq!(form.text("title").as_deref(), Some("Hello"));
        assert_eq!(form.text("excerpt"), None);
        assert_eq!(form.text("missing"), None);
        assert_eq!(form.required("missing"), "");
    }

    #[test]
    fn test_flag() {
        let form = form(&[("a", "true"), ("b", "on"), ("c", "false"), ("d", "1")]);
        assert!(form.flag("a"));
        assert!(form.flag("b"));
        assert!(!form.flag("c"));
        assert!(form.flag("d"));
        assert!(!form.flag("missing"));
    }
}
