use async_trait::async_trait;
use aws_credential_types::provider::ProvideCredentials;
use aws_sdk_bedrockruntime::{Client, config::Region, error::DisplayErrorContext, primitives::Blob};
use tracing::info;

use crate::config::AppConfig;

/// A single request/response round trip to a hosted text-generation model.
///
/// The production handle talks to the Bedrock runtime; tests plug in a stub.
#[async_trait]
pub trait ModelInvoker: Send + Sync {
    async fn invoke(&self, body: Vec<u8>) -> anyhow::Result<Vec<u8>>;
}

pub struct BedrockInvoker {
    client: Client,
    model_id: String,
}

impl BedrockInvoker {
    /// Builds the runtime client for the configured region and resolves
    /// credentials eagerly, so a missing identity is detected at startup.
    pub async fn connect(config: &AppConfig) -> anyhow::Result<Self> {
        let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .load()
            .await;

        let provider = sdk_config
            .credentials_provider()
            .ok_or_else(|| anyhow::anyhow!("no credentials provider configured"))?;
        provider
            .provide_credentials()
            .await
            .map_err(|err| anyhow::anyhow!("could not resolve credentials: {err}"))?;

        info!(region = %config.region, model_id = %config.model_id, "model client initialized");

        Ok(Self {
            client: Client::new(&sdk_config),
            model_id: config.model_id.clone(),
        })
    }
}

#[async_trait]
impl ModelInvoker for BedrockInvoker {
    async fn invoke(&self, body: Vec<u8>) -> anyhow::Result<Vec<u8>> {
        let output = self
            .client
            .invoke_model()
            .model_id(&self.model_id)
            .content_type("application/json")
            .accept("application/json")
            .body(Blob::new(body))
            .send()
            .await
            .map_err(|err| anyhow::anyhow!("{}", DisplayErrorContext(&err)))?;

        Ok(output.body.into_inner())
    }
}
