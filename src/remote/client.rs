//! Backend client for chat and document exchanges.

use super::RemoteExchange;
use super::error::ExchangeError;
use super::http::HttpClient;
use super::types::{
    AssistantReply, ChatBody, ChatResponseBody, ContextMessage, DocumentBody,
    DocumentResponseBody, UploadResult,
};
use crate::auth::CredentialProvider;
use crate::config::Config;
use async_trait::async_trait;
use base64::Engine;
use std::sync::Arc;
use tracing::{debug, info};

const CHAT_PATH: &str = "/api/chat";
const UPLOAD_PATH: &str = "/api/documents/upload-document";

pub struct BackendClient {
    http: HttpClient,
    credentials: Arc<dyn CredentialProvider>,
    model: String,
    max_tokens: u32,
}

impl BackendClient {
    pub fn new(config: &Config, credentials: Arc<dyn CredentialProvider>) -> Self {
        Self {
            http: HttpClient::new(
                config.api_base_url.clone(),
                config.request_timeout(),
                config.connect_timeout(),
            ),
            credentials,
            model: config.model.clone(),
            max_tokens: config.max_tokens,
        }
    }

    fn token(&self) -> Result<String, ExchangeError> {
        self.credentials
            .bearer_token()
            .ok_or(ExchangeError::Unauthenticated)
    }
}

#[async_trait]
impl RemoteExchange for BackendClient {
    async fn exchange_chat(
        &self,
        context: &[ContextMessage],
    ) -> Result<AssistantReply, ExchangeError> {
        let token = self.token()?;
        let body = ChatBody {
            messages: context,
            model: &self.model,
            max_tokens: self.max_tokens,
        };

        debug!(messages = context.len(), model = %self.model, "Sending chat exchange");
        let response: ChatResponseBody = self.http.post_json(CHAT_PATH, &token, &body).await?;
        let reply = AssistantReply::from(response);
        info!(
            model = reply.model.as_deref().unwrap_or("unknown"),
            total_tokens = reply.usage.total_tokens,
            memory_enabled = reply.memory_enabled,
            "Chat exchange completed"
        );
        Ok(reply)
    }

    async fn exchange_document(
        &self,
        bytes: &[u8],
        mime_type: &str,
    ) -> Result<UploadResult, ExchangeError> {
        let token = self.token()?;
        let body = DocumentBody {
            image_base64: base64::engine::general_purpose::STANDARD.encode(bytes),
            mime_type,
        };

        debug!(bytes = bytes.len(), mime_type, "Sending document upload");
        let response: DocumentResponseBody =
            self.http.post_json(UPLOAD_PATH, &token, &body).await?;
        let result = UploadResult::from(response);
        info!(
            document_id = result.document_id.as_deref().unwrap_or("none"),
            phi_deidentified = result.phi_deidentified,
            "Document upload completed"
        );
        Ok(result)
    }
}
