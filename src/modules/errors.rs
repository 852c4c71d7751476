use thiserror::Error;

/// Why a pipeline handler could not claim a signal it looked at.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    #[error("malformed signal: {0}")]
    MalformedSignal(String),
    #[error("unknown deep link host: {0}")]
    UnknownDeepLink(String),
    #[error("invalid url: {0}")]
    InvalidUrl(String),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("no session with id {0}")]
    UnknownSession(String),
    #[error("engine rejected the request: {0}")]
    Engine(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccountError {
    #[error("network unreachable: {0}")]
    Network(String),
    #[error("authentication expired")]
    AuthExpired,
    #[error("account manager is not initialized")]
    NotInitialized,
}
