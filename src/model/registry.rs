use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::{
    config::AppConfig,
    error::ServiceError,
    model::{
        InvocationRequest, InvocationResponse, Message,
        bedrock::{BedrockInvoker, ModelInvoker},
    },
};

/// Process-wide model client handle.
///
/// Either holds a usable client for the whole process lifetime or none at
/// all; initialization is attempted exactly once.
#[derive(Clone)]
pub struct ModelRegistry {
    client: Option<Arc<dyn ModelInvoker>>,
}

impl ModelRegistry {
    pub fn new(client: Arc<dyn ModelInvoker>) -> Self {
        Self {
            client: Some(client),
        }
    }

    pub fn unavailable() -> Self {
        Self { client: None }
    }

    /// Connects to the hosted model. Failure degrades the chat path instead of
    /// aborting startup.
    pub async fn initialize(config: &AppConfig) -> Self {
        match BedrockInvoker::connect(config).await {
            Ok(invoker) => Self::new(Arc::new(invoker)),
            Err(err) => {
                error!(
                    error = %err,
                    region = %config.region,
                    "model client initialization failed; chat disabled"
                );
                Self::unavailable()
            }
        }
    }

    pub fn is_available(&self) -> bool {
        self.client.is_some()
    }

    pub async fn invoke_chat(&self, conversation: &[Message]) -> Result<String, ServiceError> {
        let client = self.client.as_ref().ok_or(ServiceError::ClientUnavailable)?;
        let last = conversation.last().ok_or_else(|| {
            ServiceError::BadRequest("conversation must contain at least one message".into())
        })?;

        let request = InvocationRequest::for_prompt(&last.content);
        let body = serde_json::to_vec(&request).map_err(|err| {
            error!(error = %err, "failed to encode model request");
            ServiceError::Invocation
        })?;

        debug!(prompt_len = last.content.len(), turns = conversation.len(), "invoking model");

        let raw = client.invoke(body).await.map_err(|err| {
            error!(error = %err, "model invocation failed");
            ServiceError::Invocation
        })?;

        decode_reply(&raw)
    }
}

fn decode_reply(raw: &[u8]) -> Result<String, ServiceError> {
    let text = std::str::from_utf8(raw).map_err(|err| {
        error!(error = %err, "model response is not UTF-8");
        ServiceError::Invocation
    })?;
    let response: InvocationResponse = serde_json::from_str(text).map_err(|err| {
        error!(error = %err, "model response is not valid JSON");
        ServiceError::Invocation
    })?;

    response.first_output().ok_or_else(|| {
        warn!("model response contained no candidate output");
        ServiceError::Invocation
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Role;

    struct Canned(&'static str);

    #[async_trait::async_trait]
    impl ModelInvoker for Canned {
        async fn invoke(&self, _body: Vec<u8>) -> anyhow::Result<Vec<u8>> {
            Ok(self.0.as_bytes().to_vec())
        }
    }

    fn user(content: &str) -> Message {
        Message {
            role: Role::User,
            content: content.into(),
        }
    }

    #[tokio::test]
    async fn missing_client_short_circuits() {
        let registry = ModelRegistry::unavailable();
        let err = registry.invoke_chat(&[user("hi")]).await.unwrap_err();
        assert!(matches!(err, ServiceError::ClientUnavailable));
    }

    #[tokio::test]
    async fn empty_conversation_is_rejected() {
        let registry = ModelRegistry::new(Arc::new(Canned("{}")));
        let err = registry.invoke_chat(&[]).await.unwrap_err();
        assert!(matches!(err, ServiceError::BadRequest(_)));
    }

    #[tokio::test]
    async fn garbage_response_is_invocation_failure() {
        let registry = ModelRegistry::new(Arc::new(Canned("not json")));
        let err = registry.invoke_chat(&[user("hi")]).await.unwrap_err();
        assert!(matches!(err, ServiceError::Invocation));
    }

    #[test]
    fn decodes_first_candidate() {
        let reply = decode_reply(br#"{"results":[{"outputText":" Hello there. "}]}"#).unwrap();
        assert_eq!(reply, "Hello there.");
    }

    #[test]
    fn invalid_utf8_is_invocation_failure() {
        assert!(matches!(
            decode_reply(&[0xff, 0xfe, 0x00]),
            Err(ServiceError::Invocation)
        ));
    }
}
