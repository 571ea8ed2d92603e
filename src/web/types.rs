//! Request and response types of the `web` module and their parsing implementations.
//!
//! A subscription request carries its email either as JSON (`{"email": "..."}`) or as form
//! fields (url-encoded or multipart). Decoding never fails: a body that cannot be decoded,
//! a missing `email` field and a non-string `email` all produce the same empty candidate,
//! which is then rejected by validation.

use axum::{
    body::Bytes,
    extract::{FromRequest, Multipart, Request},
    http::{
        header::{CACHE_CONTROL, CONTENT_TYPE, USER_AGENT},
        HeaderValue, StatusCode,
    },
    response::{IntoResponse, Response},
    Json,
};
use lazy_regex::regex_is_match;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_with::skip_serializing_none;

use super::ClientError;

const EMAIL_FIELD: &str = "email";
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

// ###################################
// ->   STRUCTS
// ###################################
/// Everything the subscribe route needs from an inbound request.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SubscribeRequest {
    /// `None` when nothing could be extracted, for whatever reason.
    pub candidate: Option<String>,
    /// Raw `user-agent` header, empty if absent.
    pub user_agent_hint: String,
}

/// Validated, normalized subscriber email
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidEmail(String);

impl AsRef<str> for ValidEmail {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl ValidEmail {
    /// Accepts `local@domain.tld` shaped strings: one or more characters that are neither
    /// whitespace (see [`is_address_whitespace`]) nor `@`, an `@`, then the same class on
    /// both sides of a literal dot. Intentionally permissive, not RFC 5322.
    pub fn parse<S>(value: S) -> Result<Self, DataParsingError>
    where
        S: AsRef<str>,
    {
        let value = value.as_ref();

        if regex_is_match!(
            r"^[^\t\n\x0B\f\r \x{A0}\x{1680}\x{2000}-\x{200A}\x{2028}\x{2029}\x{202F}\x{205F}\x{3000}\x{FEFF}@]+@[^\t\n\x0B\f\r \x{A0}\x{1680}\x{2000}-\x{200A}\x{2028}\x{2029}\x{202F}\x{205F}\x{3000}\x{FEFF}@]+\.[^\t\n\x0B\f\r \x{A0}\x{1680}\x{2000}-\x{200A}\x{2028}\x{2029}\x{202F}\x{205F}\x{3000}\x{FEFF}@]+$",
            value
        ) {
            Ok(ValidEmail(value.to_owned()))
        } else {
            Err(DataParsingError::EmailInvalid)
        }
    }

    /// Normalizes an extracted candidate (empty if none) and validates it.
    pub fn from_candidate(candidate: Option<&str>) -> Result<Self, DataParsingError> {
        Self::parse(normalize(candidate))
    }
}

/// Trims surrounding whitespace and lower-cases the candidate. `None` becomes `""`.
pub fn normalize(candidate: Option<&str>) -> String {
    candidate
        .unwrap_or_default()
        .trim_matches(is_address_whitespace)
        .to_lowercase()
}

/// Whitespace as far as addresses are concerned: the Unicode space separators, the line
/// terminators and the BOM. Unlike `char::is_whitespace` it includes U+FEFF and leaves
/// U+0085 alone. Keep in sync with the character class in [`ValidEmail::parse`].
pub fn is_address_whitespace(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n'
            | '\u{0b}'
            | '\u{0c}'
            | '\r'
            | ' '
            | '\u{a0}'
            | '\u{1680}'
            | '\u{2000}'..='\u{200a}'
            | '\u{2028}'
            | '\u{2029}'
            | '\u{202f}'
            | '\u{205f}'
            | '\u{3000}'
            | '\u{feff}'
    )
}

/// The uniform JSON acknowledgment: `{"success": true}` or
/// `{"success": false, "error": "<kind>"}`. Never cached by intermediaries.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiAck {
    pub success: bool,
    pub error: Option<String>,
}

impl ApiAck {
    pub fn accepted() -> Self {
        Self {
            success: true,
            error: None,
        }
    }

    pub fn rejected(client_error: &ClientError) -> Self {
        Self {
            success: false,
            error: Some(client_error.to_string()),
        }
    }

    /// Builds the response with the given status, a JSON content type and `cache-control: no-store`.
    pub fn into_response_with(self, status: StatusCode) -> Response {
        (
            status,
            [(CACHE_CONTROL, HeaderValue::from_static("no-store"))],
            Json(self),
        )
            .into_response()
    }
}

impl IntoResponse for ApiAck {
    fn into_response(self) -> Response {
        self.into_response_with(StatusCode::OK)
    }
}

// ###################################
// ->   EXTRACTOR
// ###################################
impl<S> FromRequest<S> for SubscribeRequest
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let user_agent_hint = req
            .headers()
            .get(USER_AGENT)
            .map(|ua| String::from_utf8_lossy(ua.as_bytes()).into_owned())
            .unwrap_or_default();
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|ct| ct.to_str().ok())
            .unwrap_or_default()
            .to_string();

        let candidate = if content_type.contains("application/json") {
            match Bytes::from_request(req, state).await {
                Ok(body) => email_from_json(&body),
                Err(_) => None,
            }
        } else if content_type.contains("multipart/form-data") {
            match Multipart::from_request(req, state).await {
                Ok(multipart) => email_from_multipart(multipart).await,
                Err(_) => None,
            }
        } else {
            match Bytes::from_request(req, state).await {
                Ok(body) => email_from_urlencoded(&body),
                Err(_) => None,
            }
        };

        Ok(SubscribeRequest {
            candidate,
            user_agent_hint,
        })
    }
}

/// Only a JSON object with a string `email` member yields a candidate.
/// A leading UTF-8 BOM is skipped.
pub fn email_from_json(body: &[u8]) -> Option<String> {
    let body = body.strip_prefix(UTF8_BOM).unwrap_or(body);
    match serde_json::from_slice::<Value>(body).ok()? {
        Value::Object(mut map) => match map.remove(EMAIL_FIELD)? {
            Value::String(email) => Some(email),
            _ => None,
        },
        _ => None,
    }
}

/// The first `email` field of an `application/x-www-form-urlencoded` body.
pub fn email_from_urlencoded(body: &[u8]) -> Option<String> {
    serde_urlencoded::from_bytes::<Vec<(String, String)>>(body)
        .ok()?
        .into_iter()
        .find_map(|(name, value)| (name == EMAIL_FIELD).then_some(value))
}

/// The first `email` field of a multipart body, as long as it is a plain text field.
/// A file upload under that name does not count as a candidate.
async fn email_from_multipart(mut multipart: Multipart) -> Option<String> {
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() != Some(EMAIL_FIELD) {
            continue;
        }
        if field.file_name().is_some() {
            return None;
        }
        return field.text().await.ok();
    }
    None
}

// ###################################
// ->   ERROR
// ###################################
#[derive(Debug, thiserror::Error)]
pub enum DataParsingError {
    #[error("email invalid")]
    EmailInvalid,
}
