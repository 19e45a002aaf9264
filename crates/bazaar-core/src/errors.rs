/// Core error type.
///
/// Adapter crates map their specific errors into this type so the session
/// engine can handle failures consistently (user-facing message, state kept
/// for retry).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("catalog error: {0}")]
    Catalog(String),

    #[error("gateway error: {0}")]
    Gateway(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
