use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("Attachment error: {0}")]
    Attachment(#[from] crate::attachment::StageError),

    #[error("History error: {0}")]
    History(#[from] crate::history::HistoryError),

    #[error("Exchange error: {0}")]
    Exchange(#[from] crate::remote::ExchangeError),

    #[error("Credential error: {0}")]
    Credentials(#[from] anyhow::Error),
}

impl From<crate::attachment::ValidationError> for Error {
    fn from(err: crate::attachment::ValidationError) -> Self {
        Self::Attachment(err.into())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
