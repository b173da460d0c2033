//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use validator::Validate;

use sharecode_core::error::AppError;
use sharecode_core::result::AppResult;
use sharecode_entity::share::{ExpirationPolicy, FileRecord, NewShareEntry};

/// `POST /api/store` body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateShareRequest {
    /// Uploaded files.
    #[serde(rename = "Files", default)]
    #[validate(length(min = 1, message = "Files must contain at least one file"))]
    #[validate(nested)]
    pub files: Vec<FileUpload>,
    /// Lifetime in seconds. Older clients send it as `ExpirationDays`.
    #[serde(rename = "ExpiresIn", alias = "ExpirationDays", default)]
    pub expires_in: Option<i64>,
    /// Remove the entry on its first retrieval.
    #[serde(rename = "OneTimeCode", default)]
    pub one_time_code: bool,
}

/// One file in a create request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct FileUpload {
    /// Original filename, stored as given.
    #[serde(rename = "Name")]
    pub name: String,
    /// Size in bytes. The browser client sends a decimal string.
    #[serde(rename = "Size")]
    pub size: SizeField,
    /// Blob store key.
    #[serde(rename = "Key")]
    #[validate(length(min = 1, message = "File key is required"))]
    pub key: String,
}

/// A byte count sent either as a JSON number or a decimal string.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SizeField {
    /// `"1024"`
    Text(String),
    /// `1024`
    Number(u64),
}

impl SizeField {
    /// The byte count, rejecting anything that is not a non-negative integer.
    pub fn bytes(&self) -> AppResult<u64> {
        match self {
            Self::Number(n) => Ok(*n),
            Self::Text(s) => s
                .trim()
                .parse::<u64>()
                .map_err(|_| AppError::validation(format!("Invalid file size '{s}'"))),
        }
    }
}

impl CreateShareRequest {
    /// Convert into the registry's input.
    pub fn into_new_entry(self) -> AppResult<NewShareEntry> {
        let files = self
            .files
            .into_iter()
            .map(|f| Ok(FileRecord::new(f.name, f.size.bytes()?, f.key)))
            .collect::<AppResult<Vec<_>>>()?;

        Ok(NewShareEntry {
            files,
            expiration: self.expires_in.map(ExpirationPolicy::seconds),
            one_time_code: self.one_time_code,
        })
    }
}

/// Query string for `GET` and `DELETE /api/store`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShareCodeQuery {
    /// The share code.
    pub code: Option<String>,
    /// Inspect a one-time entry without consuming it.
    #[serde(default)]
    pub probe: bool,
}

impl ShareCodeQuery {
    /// The non-blank code, or a validation error.
    pub fn require_code(&self) -> AppResult<&str> {
        match self.code.as_deref().map(str::trim) {
            Some(code) if !code.is_empty() => Ok(code),
            _ => Err(AppError::validation("Share code is required")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parses_browser_payload() {
        let req: CreateShareRequest = serde_json::from_value(json!({
            "Files": [{ "Name": "a.txt", "Size": "100", "Key": "k1" }],
            "ExpirationDays": 3600,
        }))
        .unwrap();
        assert!(req.validate().is_ok());

        let new = req.into_new_entry().unwrap();
        assert_eq!(new.files, vec![FileRecord::new("a.txt", 100, "k1")]);
        assert_eq!(new.expiration, Some(ExpirationPolicy::seconds(3600)));
        assert!(!new.one_time_code);
    }

    #[test]
    fn test_numeric_size_accepted() {
        let size: SizeField = serde_json::from_value(json!(42)).unwrap();
        assert_eq!(size.bytes().unwrap(), 42);
    }

    #[test]
    fn test_bad_size_is_validation_error() {
        let size = SizeField::Text("12kb".into());
        let err = size.bytes().unwrap_err();
        assert_eq!(err.kind, sharecode_core::error::ErrorKind::Validation);
    }

    #[test]
    fn test_missing_files_fails_validation() {
        let req: CreateShareRequest = serde_json::from_value(json!({})).unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_blank_key_fails_validation() {
        let req: CreateShareRequest = serde_json::from_value(json!({
            "Files": [{ "Name": "a.txt", "Size": "1", "Key": "" }],
        }))
        .unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_empty_name_is_kept() {
        let req: CreateShareRequest = serde_json::from_value(json!({
            "Files": [{ "Name": "", "Size": "1", "Key": "k1" }],
        }))
        .unwrap();
        assert!(req.validate().is_ok());
        assert_eq!(req.into_new_entry().unwrap().files[0].name, "");
    }

    #[test]
    fn test_require_code() {
        let query = ShareCodeQuery {
            code: Some("  ".into()),
            probe: false,
        };
        assert!(query.require_code().is_err());

        let query = ShareCodeQuery {
            code: Some("AB12CD".into()),
            probe: false,
        };
        assert_eq!(query.require_code().unwrap(), "AB12CD");
    }
}
