use std::time::Duration;

use axum::{body::Bytes, extract::Multipart};
use reqwest::Client;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::{config::AppConfig, error::ServiceError};

pub const UPLOAD_FIELD: &str = "file";
pub const NOT_RESPONDING: &str = "Analysis service is not responding.";

/// One record submitted for assessment. The downstream service owns the schema.
pub type Entity = Map<String, Value>;

/// Shape of an uploaded entity file: a lone object or a batch of them.
#[derive(Debug, Clone, PartialEq)]
pub enum EntityUpload {
    Batch(Vec<Entity>),
    Single(Entity),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssessmentRequest {
    pub entities: Vec<Entity>,
}

impl EntityUpload {
    pub fn decode(bytes: &[u8]) -> Result<Self, ServiceError> {
        let text = std::str::from_utf8(bytes)
            .map_err(|err| ServiceError::MalformedInput(format!("file is not UTF-8: {err}")))?;
        let value: Value = serde_json::from_str(text)
            .map_err(|err| ServiceError::MalformedInput(err.to_string()))?;

        match value {
            Value::Object(entity) => Ok(EntityUpload::Single(entity)),
            Value::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    Value::Object(entity) => Ok(entity),
                    _ => Err(unexpected_shape()),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(EntityUpload::Batch),
            _ => Err(unexpected_shape()),
        }
    }

    pub fn into_entities(self) -> Vec<Entity> {
        match self {
            EntityUpload::Batch(entities) => entities,
            EntityUpload::Single(entity) => vec![entity],
        }
    }
}

fn unexpected_shape() -> ServiceError {
    ServiceError::MalformedInput("expected an entity object or an array of entity objects".into())
}

impl From<EntityUpload> for AssessmentRequest {
    fn from(upload: EntityUpload) -> Self {
        Self {
            entities: upload.into_entities(),
        }
    }
}

/// Pulls the uploaded file out of the `file` part of a multipart form.
///
/// Browsers send an empty `file` part when no file was chosen; that counts as
/// no upload.
pub async fn read_upload(mut multipart: Multipart) -> Result<Bytes, ServiceError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(UPLOAD_FIELD) || field.file_name() == Some("") {
            continue;
        }
        let bytes = field.bytes().await?;
        if !bytes.is_empty() {
            return Ok(bytes);
        }
    }
    Err(ServiceError::MissingInput)
}

/// Forwards entity batches to the downstream analysis service.
#[derive(Clone)]
pub struct AssessmentProxy {
    client: Client,
    url: String,
    timeout: Duration,
}

impl AssessmentProxy {
    pub fn new(config: &AppConfig) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(config.assessment_timeout).build()?;
        Ok(Self {
            client,
            url: config.assessment_url.clone(),
            timeout: config.assessment_timeout,
        })
    }

    pub async fn proxy_assessment(&self, upload: EntityUpload) -> Result<Value, ServiceError> {
        let request = AssessmentRequest::from(upload);
        info!(count = request.entities.len(), url = %self.url, "forwarding assessment batch");

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|err| self.transport_failure(err))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| self.transport_failure(err))?;

        if !status.is_success() {
            warn!(%status, "analysis service returned an error");
            return Err(ServiceError::Downstream(details_from_body(&body)));
        }

        serde_json::from_slice(&body).map_err(|err| {
            warn!(error = %err, "analysis service returned a non-JSON body");
            ServiceError::Downstream(Value::String(format!(
                "Analysis service returned an invalid response: {err}"
            )))
        })
    }

    fn transport_failure(&self, err: reqwest::Error) -> ServiceError {
        if err.is_timeout() {
            warn!(timeout_secs = self.timeout.as_secs(), "analysis service timed out");
            ServiceError::Downstream(Value::String(format!(
                "Analysis service timed out after {} seconds and is not responding.",
                self.timeout.as_secs()
            )))
        } else {
            warn!(error = %err, "analysis service unreachable");
            ServiceError::Downstream(Value::String(NOT_RESPONDING.into()))
        }
    }
}

fn details_from_body(body: &[u8]) -> Value {
    if body.is_empty() {
        return Value::String(NOT_RESPONDING.into());
    }
    serde_json::from_slice(body)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(body).into_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn single_object_is_wrapped() {
        let upload = EntityUpload::decode(br#"{"id": "A"}"#).unwrap();
        assert!(matches!(upload, EntityUpload::Single(_)));

        let request = AssessmentRequest::from(upload);
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"entities": [{"id": "A"}]})
        );
    }

    #[test]
    fn array_is_forwarded_in_order() {
        let upload = EntityUpload::decode(br#"[{"id":"A"},{"id":"B"}]"#).unwrap();
        let request = AssessmentRequest::from(upload);
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"entities": [{"id": "A"}, {"id": "B"}]})
        );
    }

    #[test]
    fn entity_keys_and_large_numbers_survive() {
        let raw = br#"{"zeta": 1, "alpha": 123456789012345678901234567890}"#;
        let request = AssessmentRequest::from(EntityUpload::decode(raw).unwrap());
        assert_eq!(
            serde_json::to_string(&request).unwrap(),
            r#"{"entities":[{"zeta":1,"alpha":123456789012345678901234567890}]}"#
        );
    }

    #[test]
    fn array_with_scalar_is_malformed_input() {
        let err = EntityUpload::decode(br#"[{"id":"A"}, 7]"#).unwrap_err();
        assert!(matches!(err, ServiceError::MalformedInput(_)));
    }

    #[test]
    fn broken_json_is_malformed_input() {
        let err = EntityUpload::decode(b"{\"id\": ").unwrap_err();
        assert!(matches!(err, ServiceError::MalformedInput(_)));
    }

    #[test]
    fn scalar_json_is_malformed_input() {
        let err = EntityUpload::decode(b"42").unwrap_err();
        assert!(matches!(err, ServiceError::MalformedInput(_)));
    }

    #[test]
    fn non_utf8_is_malformed_input() {
        let err = EntityUpload::decode(&[0xc3, 0x28]).unwrap_err();
        assert!(matches!(err, ServiceError::MalformedInput(_)));
    }

    #[test]
    fn error_body_details() {
        assert_eq!(details_from_body(b""), json!(NOT_RESPONDING));
        assert_eq!(
            details_from_body(br#"{"detail":"bad entity"}"#),
            json!({"detail": "bad entity"})
        );
        assert_eq!(
            details_from_body(b"Internal Server Error"),
            json!("Internal Server Error")
        );
    }
}
