/// Service-level error type.
///
/// Engine failures on user input are not errors here: they come back as
/// [`crate::sequence::Outcome::Reject`]. This type covers configuration,
/// I/O and failures reported by the ports.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("external error: {0}")]
    External(String),
}

pub type Result<T> = std::result::Result<T, Error>;
