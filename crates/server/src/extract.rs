//! Request extractors that report failures in the JSON error shape.
use axum::async_trait;
use axum::body::Bytes;
use axum::extract::{FromRequest, FromRequestParts, Path, Request};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;
use tracing::debug;

use models::validate::{MISSING, UNKNOWN};

use crate::errors::JsonApiError;

/// JSON body whose decode errors come back keyed by field:
/// `{"errors": {"vin": ["Missing data for required field."]}}`.
pub struct ValidJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = JsonApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| JsonApiError::bad_request(e.body_text()))?;
        if bytes.is_empty() {
            return Err(JsonApiError::bad_request("No input data provided."));
        }
        parse_body(&bytes).map(ValidJson)
    }
}

/// Like [`ValidJson`] but an empty body yields `T::default()`.
pub struct OptionalJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for OptionalJson<T>
where
    T: DeserializeOwned + Default,
    S: Send + Sync,
{
    type Rejection = JsonApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| JsonApiError::bad_request(e.body_text()))?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(OptionalJson(T::default()));
        }
        parse_body(&bytes).map(OptionalJson)
    }
}

pub fn parse_body<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, JsonApiError> {
    serde_json::from_slice(bytes).map_err(|e| {
        let text = e.to_string();
        debug!(error = %text, "body rejected");
        if let Some(field) = backticked(&text, "missing field `") {
            JsonApiError::field(field, MISSING)
        } else if let Some(field) = backticked(&text, "unknown field `") {
            JsonApiError::field(field, UNKNOWN)
        } else {
            JsonApiError::field("_schema", text)
        }
    })
}

fn backticked<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let start = text.find(prefix)? + prefix.len();
    let len = text[start..].find('`')?;
    Some(&text[start..start + len])
}

/// Path parameters; a non-numeric id is a 400 naming the resource.
pub struct ValidPath<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for ValidPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = JsonApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<T>::from_request_parts(parts, state).await {
            Ok(Path(value)) => Ok(ValidPath(value)),
            Err(rej) => {
                debug!(error = %rej.body_text(), "path rejected");
                Err(JsonApiError::bad_request(invalid_id_message(parts.uri.path())))
            }
        }
    }
}

fn invalid_id_message(path: &str) -> &'static str {
    match path.trim_start_matches('/').split('/').next().unwrap_or_default() {
        "service-tickets" => "Invalid ticket id",
        "customers" => "Invalid customer id",
        "mechanics" => "Invalid mechanic id",
        "part-descriptions" => "Invalid part description id",
        "serialized_parts" => "Invalid serialized part id",
        _ => "Invalid id",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    #[serde(deny_unknown_fields)]
    struct Body {
        #[allow(dead_code)]
        vin: String,
    }

    #[test]
    fn missing_and_unknown_fields_are_keyed() {
        let e = parse_body::<Body>(br#"{}"#).err().unwrap();
        assert_eq!(e.errors.unwrap()["vin"], vec![MISSING.to_string()]);

        let e = parse_body::<Body>(br#"{"vin":"x","color":"red"}"#).err().unwrap();
        assert_eq!(e.errors.unwrap()["color"], vec![UNKNOWN.to_string()]);
    }

    #[test]
    fn type_errors_fall_back_to_schema_key() {
        let e = parse_body::<Body>(br#"{"vin": 5}"#).err().unwrap();
        assert!(e.errors.unwrap().contains_key("_schema"));
    }

    #[test]
    fn id_messages_follow_resource() {
        assert_eq!(invalid_id_message("/service-tickets/abc"), "Invalid ticket id");
        assert_eq!(invalid_id_message("/customers/x"), "Invalid customer id");
        assert_eq!(invalid_id_message("/nope"), "Invalid id");
    }
}
