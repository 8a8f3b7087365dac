//! Typed errors for the backend API.
//!
//! Every non-success HTTP response is decoded exactly once, at the network
//! boundary, into a [`Rejection`] with an explicit kind, a human-readable
//! message, and any field-keyed validation errors the backend returned.
//! Callers never poke at raw response bodies.

use std::collections::BTreeMap;

use thiserror::Error;

/// Errors that can occur when talking to the backend API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP transport failed (connection refused, timeout, TLS, ...).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not the JSON shape we expected.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// The backend rejected the request.
    #[error("{0}")]
    Rejected(Rejection),
}

impl ApiError {
    /// True when the backend rejected the credential or token.
    ///
    /// The session layer treats this as "force logged out".
    #[must_use]
    pub const fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            Self::Rejected(Rejection {
                kind: RejectionKind::Unauthorized,
                ..
            })
        )
    }

    /// Human-readable message suitable for inline rendering.
    ///
    /// Falls back to a generic message for transport and parse failures,
    /// which carry detail useful in logs but not to end users.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Rejected(rejection) => rejection.message.clone(),
            Self::Http(_) | Self::Parse(_) => "Something went wrong, please try again".to_owned(),
        }
    }

    /// Field-keyed validation errors, if the backend returned any.
    #[must_use]
    pub fn field_errors(&self) -> Option<&BTreeMap<String, Vec<String>>> {
        match self {
            Self::Rejected(rejection) if !rejection.field_errors.is_empty() => {
                Some(&rejection.field_errors)
            }
            _ => None,
        }
    }
}

/// A decoded backend rejection.
#[derive(Debug, Clone)]
pub struct Rejection {
    /// Broad category derived from the HTTP status.
    pub kind: RejectionKind,
    /// Human-readable message extracted from the response payload, with a
    /// generic default when the payload carries none.
    pub message: String,
    /// Validation errors keyed by field name (registration payloads and the
    /// like). Empty for non-validation rejections.
    pub field_errors: BTreeMap<String, Vec<String>>,
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.field_errors.is_empty() {
            write!(f, "{}", self.message)
        } else {
            let fields: Vec<_> = self
                .field_errors
                .iter()
                .map(|(field, messages)| format!("{field}: {}", messages.join(", ")))
                .collect();
            write!(f, "{} ({})", self.message, fields.join("; "))
        }
    }
}

/// Category of a backend rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionKind {
    /// 401 - bad credentials or an invalid/expired token.
    Unauthorized,
    /// 403 - authenticated but not allowed (e.g. non-staff hitting admin).
    Forbidden,
    /// 404 - resource does not exist.
    NotFound,
    /// 400 - the backend refused the input.
    Validation,
    /// 5xx - the backend itself failed.
    Backend,
    /// Anything else.
    Other,
}

impl RejectionKind {
    const fn from_status(status: reqwest::StatusCode) -> Self {
        match status.as_u16() {
            400 => Self::Validation,
            401 => Self::Unauthorized,
            403 => Self::Forbidden,
            404 => Self::NotFound,
            500..=599 => Self::Backend,
            _ => Self::Other,
        }
    }

    const fn default_message(self) -> &'static str {
        match self {
            Self::Unauthorized => "Authentication required",
            Self::Forbidden => "You do not have permission to do that",
            Self::NotFound => "Not found",
            Self::Validation => "Request was rejected",
            Self::Backend | Self::Other => "Something went wrong, please try again",
        }
    }
}

/// Decode a non-success response body into a [`Rejection`].
///
/// The backend emits three error shapes:
/// - `{"error": "..."}` from hand-written views (cart, orders)
/// - `{"detail": "..."}` from the framework's auth machinery
/// - `{"field": ["msg", ...], ...}` validation payloads keyed by field
///
/// Anything unparseable falls back to the status-derived default message.
#[must_use]
pub fn decode_rejection(status: reqwest::StatusCode, body: &str) -> Rejection {
    let kind = RejectionKind::from_status(status);

    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return Rejection {
            kind,
            message: kind.default_message().to_owned(),
            field_errors: BTreeMap::new(),
        };
    };

    if let Some(message) = value
        .get("error")
        .or_else(|| value.get("detail"))
        .and_then(serde_json::Value::as_str)
    {
        return Rejection {
            kind,
            message: message.to_owned(),
            field_errors: BTreeMap::new(),
        };
    }

    // Field-keyed validation payload: every value is a list of messages.
    let mut field_errors = BTreeMap::new();
    if let Some(object) = value.as_object() {
        for (field, messages) in object {
            if let Some(list) = messages.as_array() {
                let messages: Vec<String> = list
                    .iter()
                    .filter_map(serde_json::Value::as_str)
                    .map(str::to_owned)
                    .collect();
                if !messages.is_empty() {
                    field_errors.insert(field.clone(), messages);
                }
            }
        }
    }

    let message = if field_errors.is_empty() {
        kind.default_message().to_owned()
    } else {
        "Please correct the highlighted fields".to_owned()
    };

    Rejection {
        kind,
        message,
        field_errors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn test_decode_error_key() {
        let rejection = decode_rejection(
            StatusCode::BAD_REQUEST,
            r#"{"error": "Insufficient stock. Only 3 items available"}"#,
        );
        assert_eq!(rejection.kind, RejectionKind::Validation);
        assert_eq!(rejection.message, "Insufficient stock. Only 3 items available");
        assert!(rejection.field_errors.is_empty());
    }

    #[test]
    fn test_decode_detail_key() {
        let rejection =
            decode_rejection(StatusCode::UNAUTHORIZED, r#"{"detail": "Invalid token."}"#);
        assert_eq!(rejection.kind, RejectionKind::Unauthorized);
        assert_eq!(rejection.message, "Invalid token.");
    }

    #[test]
    fn test_decode_field_keyed_validation() {
        let rejection = decode_rejection(
            StatusCode::BAD_REQUEST,
            r#"{"username": ["A user with that username already exists."], "email": ["Enter a valid email address."]}"#,
        );
        assert_eq!(rejection.kind, RejectionKind::Validation);
        assert_eq!(rejection.field_errors.len(), 2);
        assert_eq!(
            rejection.field_errors.get("username"),
            Some(&vec!["A user with that username already exists.".to_owned()])
        );
    }

    #[test]
    fn test_decode_unparseable_body() {
        let rejection = decode_rejection(StatusCode::BAD_GATEWAY, "<html>nginx</html>");
        assert_eq!(rejection.kind, RejectionKind::Backend);
        assert_eq!(rejection.message, "Something went wrong, please try again");
    }

    #[test]
    fn test_decode_empty_object() {
        let rejection = decode_rejection(StatusCode::NOT_FOUND, "{}");
        assert_eq!(rejection.kind, RejectionKind::NotFound);
        assert_eq!(rejection.message, "Not found");
    }

    #[test]
    fn test_is_unauthorized() {
        let err = ApiError::Rejected(decode_rejection(StatusCode::UNAUTHORIZED, "{}"));
        assert!(err.is_unauthorized());

        let err = ApiError::Rejected(decode_rejection(StatusCode::BAD_REQUEST, "{}"));
        assert!(!err.is_unauthorized());
    }

    #[test]
    fn test_rejection_display_with_fields() {
        let rejection = decode_rejection(
            StatusCode::BAD_REQUEST,
            r#"{"password": ["This field is required."]}"#,
        );
        let rendered = rejection.to_string();
        assert!(rendered.contains("password: This field is required."));
    }
}
