use thiserror::Error;
use tokio_tungstenite::tungstenite;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("invalid request header: {0}")]
    InvalidHeader(String),

    #[error("failed to connect to {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: tungstenite::Error,
    },

    #[error("gave up after {attempts} reconnect attempts")]
    ReconnectExhausted { attempts: u32 },
}

pub type Result<T> = std::result::Result<T, SdkError>;
