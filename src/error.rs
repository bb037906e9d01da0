use thiserror::Error;

#[derive(Error, Debug)]
pub enum BoardError {
    #[error("Network error: {0}")]
    Transport(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    /// A fetch completed after the list moved on to a newer request.
    #[error("Discarded stale response (generation {generation})")]
    StaleResponse { generation: u64 },

    #[error("Config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for BoardError {
    fn from(err: reqwest::Error) -> Self {
        BoardError::Transport(err.to_string())
    }
}

impl From<toml::de::Error> for BoardError {
    fn from(err: toml::de::Error) -> Self {
        BoardError::Config(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, BoardError>;
