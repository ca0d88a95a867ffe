use std::fmt;

use serde::{Deserialize, Serialize};

// -- Error taxonomy --

/// Machine-readable failure classification carried in the [`Response`]
/// envelope. Serialized as SCREAMING_SNAKE_CASE strings on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    InvalidEmail,
    DuplicateEmail,
    InvalidRole,
    NotFound,
    Timeout,
    NetworkError,
    /// Backend-supplied code outside the client taxonomy, passed through
    /// untouched.
    #[serde(untagged)]
    Other(String),
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::InvalidEmail => "INVALID_EMAIL",
            ErrorCode::DuplicateEmail => "DUPLICATE_EMAIL",
            ErrorCode::InvalidRole => "INVALID_ROLE",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::Timeout => "TIMEOUT",
            ErrorCode::NetworkError => "NETWORK_ERROR",
            ErrorCode::Other(code) => code,
        };
        f.write_str(s)
    }
}

// -- Envelope --

/// Uniform result wrapper returned by every roster operation. Expected
/// failures (validation, timeout, transport) come back through this
/// envelope, never as an `Err`. Callers must check `success` before
/// trusting `data`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Response<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<ErrorCode>,
}

impl<T> Response<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: String::new(),
            error_code: None,
        }
    }

    pub fn ok_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: message.into(),
            error_code: None,
        }
    }

    pub fn failure(error_code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: message.into(),
            error_code: Some(error_code),
        }
    }

    /// Carry this envelope over to a different payload type, dropping any
    /// `data`. Used to propagate a failure from a pre-check whose payload
    /// type differs from the operation's.
    pub fn recast<U>(self) -> Response<U> {
        Response {
            success: self.success,
            data: None,
            message: self.message,
            error_code: self.error_code,
        }
    }
}

// -- User operations --

/// Draft of a user as it arrives from an untrusted boundary (a form, a
/// config file). `role` stays a raw string here; validation parses it
/// against the closed role set before anything is dispatched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub role: String,
}

/// Fields to change on an existing user. `None` means unchanged; the wire
/// payload carries only the supplied fields. `id` and `created_at` are
/// structurally absent — a patch cannot touch them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl UserPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.role.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_code_uses_screaming_snake_case() {
        assert_eq!(
            serde_json::to_string(&ErrorCode::InvalidEmail).unwrap(),
            "\"INVALID_EMAIL\""
        );
        let parsed: ErrorCode = serde_json::from_str("\"NOT_FOUND\"").unwrap();
        assert_eq!(parsed, ErrorCode::NotFound);
    }

    #[test]
    fn unknown_error_code_passes_through() {
        let parsed: ErrorCode = serde_json::from_str("\"RATE_LIMITED\"").unwrap();
        assert_eq!(parsed, ErrorCode::Other("RATE_LIMITED".to_string()));
        assert_eq!(serde_json::to_string(&parsed).unwrap(), "\"RATE_LIMITED\"");
    }

    #[test]
    fn failure_envelope_has_no_data() {
        let resp: Response<u32> = Response::failure(ErrorCode::Timeout, "took too long");
        assert!(!resp.success);
        assert_eq!(resp.data, None);
        assert_eq!(resp.error_code, Some(ErrorCode::Timeout));

        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json.get("errorCode").unwrap(), "TIMEOUT");
        assert!(json.get("data").is_none());
    }

    #[test]
    fn ok_with_message_keeps_both() {
        let resp = Response::ok_with_message(true, "deleted");
        assert!(resp.success);
        assert_eq!(resp.data, Some(true));
        assert_eq!(resp.message, "deleted");
    }

    #[test]
    fn envelope_deserializes_with_absent_optional_fields() {
        let resp: Response<Vec<u32>> =
            serde_json::from_str(r#"{"success": true, "data": [1, 2]}"#).unwrap();
        assert!(resp.success);
        assert_eq!(resp.data, Some(vec![1, 2]));
        assert_eq!(resp.message, "");
        assert_eq!(resp.error_code, None);
    }

    #[test]
    fn recast_keeps_failure_details() {
        let resp: Response<String> = Response::failure(ErrorCode::NotFound, "no such user");
        let recast: Response<bool> = resp.recast();
        assert!(!recast.success);
        assert_eq!(recast.message, "no such user");
        assert_eq!(recast.error_code, Some(ErrorCode::NotFound));
    }

    #[test]
    fn patch_serializes_only_supplied_fields() {
        let patch = UserPatch {
            name: Some("Ada".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_value(&patch).unwrap();
        assert_eq!(json.get("name").unwrap(), "Ada");
        assert!(json.get("email").is_none());
        assert!(json.get("role").is_none());
    }
}
