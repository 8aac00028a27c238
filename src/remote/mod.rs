//! Boundary to the remote chat and document-processing backend.
//!
//! # Example
//!
//! ```ignore
//! use medesense::remote::{BackendClient, RemoteExchange};
//!
//! let client = BackendClient::new(&config, credentials);
//! let reply = client.exchange_chat(&context).await?;
//! ```

mod client;
mod error;
mod http;
mod types;

pub use client::BackendClient;
pub use error::{ExchangeError, rejection_reason};
pub use http::HttpClient;
pub use types::{AssistantReply, ContextMessage, ContextRole, TokenUsage, UploadResult};

use async_trait::async_trait;

/// One request/response cycle with the backend.
///
/// Each call makes at most one attempt. A missing credential fails with
/// [`ExchangeError::Unauthenticated`] before any network traffic.
#[async_trait]
pub trait RemoteExchange: Send + Sync {
    async fn exchange_chat(
        &self,
        context: &[ContextMessage],
    ) -> Result<AssistantReply, ExchangeError>;

    async fn exchange_document(
        &self,
        bytes: &[u8],
        mime_type: &str,
    ) -> Result<UploadResult, ExchangeError>;
}
