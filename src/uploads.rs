use std::collections::HashMap;

use axum::extract::{Multipart, multipart::MultipartError};
use axum::http::StatusCode;

use crate::error::{AppError, AppResult, ValidationErrors};

/// A file part received in a multipart request, held in memory until it is
/// forwarded to the object store.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl UploadedFile {
    /// Only non-empty `image/*` files up to `max_bytes` are accepted.
    pub fn validate_image(&self, field: &str, max_bytes: usize) -> AppResult<()> {
        if self.data.is_empty() {
            return Err(AppError::field(field, "file is empty"));
        }
        if self.data.len() > max_bytes {
            return Err(AppError::PayloadTooLarge(max_bytes));
        }
        if !self.content_type.starts_with("image/") {
            return Err(AppError::field(field, "must be an image"));
        }
        Ok(())
    }
}

/// Create binds require the resource's mandatory fields; update binds treat every
/// field as optional.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Update,
}

/// MultipartForm
///
/// A fully-buffered `multipart/form-data` body: text fields by name plus file parts by
/// name. Content endpoints bind their create/update forms through this.
#[derive(Debug, Default)]
pub struct MultipartForm {
    fields: HashMap<String, String>,
    files: HashMap<String, UploadedFile>,
}

impl MultipartForm {
    /// `max_upload_bytes` is only used to report a body that outgrew the request limit.
    pub async fn from_multipart(
        mut multipart: Multipart,
        max_upload_bytes: usize,
    ) -> AppResult<Self> {
        let mut form = MultipartForm::default();
        let to_error = |err: MultipartError| multipart_error(err, max_upload_bytes);

        while let Some(field) = multipart.next_field().await.map_err(to_error)? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            match field.file_name().map(str::to_string) {
                Some(file_name) => {
                    let content_type = field
                        .content_type()
                        .unwrap_or("application/octet-stream")
                        .to_string();
                    let data = field.bytes().await.map_err(to_error)?.to_vec();
                    // Browsers send an empty, unnamed part for an untouched file input.
                    if file_name.is_empty() && data.is_empty() {
                        continue;
                    }
                    form.files.insert(
                        name,
                        UploadedFile {
                            file_name,
                            content_type,
                            data,
                        },
                    );
                }
                None => {
                    let value = field.text().await.map_err(to_error)?;
                    form.fields.insert(name, value);
                }
            }
        }

        Ok(form)
    }

    /// Trimmed value of a text field; blank counts as absent.
    pub fn text(&self, name: &str) -> Option<String> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    }

    /// For partial updates: `None` when the field was not sent, `Some(None)` when it was
    /// sent blank (clear the value), `Some(Some(v))` otherwise.
    pub fn nullable_text(&self, name: &str) -> Option<Option<String>> {
        self.fields.get(name).map(|_| self.text(name))
    }

    /// Like `text`, but records "is required" in `errors` when absent.
    pub fn required_text(&self, name: &str, errors: &mut ValidationErrors) -> Option<String> {
        let value = self.text(name);
        if value.is_none() {
            errors.add(name, "is required");
        }
        value
    }

    /// `required_text` when creating, `text` when updating.
    pub fn text_for(
        &self,
        name: &str,
        mode: FormMode,
        errors: &mut ValidationErrors,
    ) -> Option<String> {
        match mode {
            FormMode::Create => self.required_text(name, errors),
            FormMode::Update => self.text(name),
        }
    }

    /// Accepts `true/false`, `1/0`, `on/off`, `yes/no`.
    pub fn bool(&self, name: &str, errors: &mut ValidationErrors) -> Option<bool> {
        let raw = self.text(name)?;
        match raw.to_ascii_lowercase().as_str() {
            "true" | "1" | "on" | "yes" => Some(true),
            "false" | "0" | "off" | "no" => Some(false),
            _ => {
                errors.add(name, "must be a boolean");
                None
            }
        }
    }

    pub fn i32(&self, name: &str, errors: &mut ValidationErrors) -> Option<i32> {
        let raw = self.text(name)?;
        match raw.parse() {
            Ok(v) => Some(v),
            Err(_) => {
                errors.add(name, "must be an integer");
                None
            }
        }
    }

    pub fn take_file(&mut self, name: &str) -> Option<UploadedFile> {
        self.files.remove(name)
    }

    #[cfg(test)]
    pub(crate) fn from_parts(
        fields: &[(&str, &str)],
        files: Vec<(&str, UploadedFile)>,
    ) -> Self {
        Self {
            fields: fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            files: files.into_iter().map(|(k, f)| (k.to_string(), f)).collect(),
        }
    }
}

fn multipart_error(err: MultipartError, max_upload_bytes: usize) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(max_upload_bytes)
    } else {
        AppError::BadRequest(err.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(bytes: usize, content_type: &str) -> UploadedFile {
        UploadedFile {
            file_name: "photo.png".into(),
            content_type: content_type.into(),
            data: vec![7; bytes],
        }
    }

    #[test]
    fn text_trims_and_drops_blank() {
        let form = MultipartForm::from_parts(&[("title", "  Exam week "), ("body", "  ")], vec![]);
        assert_eq!(form.text("title").as_deref(), Some("Exam week"));
        assert_eq!(form.text("body"), None);
        assert_eq!(form.text("missing"), None);
    }

    #[test]
    fn nullable_text_distinguishes_absent_from_blank() {
        let form = MultipartForm::from_parts(&[("coach", " "), ("schedule", "Fri")], vec![]);
        assert_eq!(form.nullable_text("coach"), Some(None));
        assert_eq!(form.nullable_text("schedule"), Some(Some("Fri".into())));
        assert_eq!(form.nullable_text("description"), None);
    }

    #[test]
    fn required_text_records_missing_field() {
        let form = MultipartForm::from_parts(&[], vec![]);
        let mut errors = ValidationErrors::new();
        assert_eq!(form.required_text("title", &mut errors), None);
        assert_eq!(errors.get("title"), Some("is required"));
    }

    #[test]
    fn text_for_requires_only_on_create() {
        let form = MultipartForm::from_parts(&[("title", " ")], vec![]);
        let mut errors = ValidationErrors::new();
        assert_eq!(form.text_for("title", FormMode::Update, &mut errors), None);
        assert!(errors.is_empty());
        assert_eq!(form.text_for("title", FormMode::Create, &mut errors), None);
        assert_eq!(errors.get("title"), Some("is required"));
    }

    #[test]
    fn bool_and_int_parsing() {
        let form = MultipartForm::from_parts(
            &[("a", "on"), ("b", "0"), ("c", "maybe"), ("grade", "7"), ("bad", "x")],
            vec![],
        );
        let mut errors = ValidationErrors::new();
        assert_eq!(form.bool("a", &mut errors), Some(true));
        assert_eq!(form.bool("b", &mut errors), Some(false));
        assert_eq!(form.bool("c", &mut errors), None);
        assert_eq!(form.i32("grade", &mut errors), Some(7));
        assert_eq!(form.i32("bad", &mut errors), None);
        assert_eq!(errors.get("c"), Some("must be a boolean"));
        assert_eq!(errors.get("bad"), Some("must be an integer"));
    }

    #[test]
    fn image_validation() {
        assert!(image(10, "image/png").validate_image("image", 100).is_ok());
        assert!(matches!(
            image(0, "image/png").validate_image("image", 100),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            image(101, "image/png").validate_image("image", 100),
            Err(AppError::PayloadTooLarge(100))
        ));
        assert!(matches!(
            image(10, "application/pdf").validate_image("image", 100),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn take_file_removes_it() {
        let mut form = MultipartForm::from_parts(&[], vec![("image", image(3, "image/jpeg"))]);
        assert!(form.take_file("image").is_some());
        assert!(form.take_file("image").is_none());
    }
}
