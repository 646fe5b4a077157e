use serial_link::LinkError;
use thiserror::Error;

/// Errors surfaced by a single command/response exchange
///
/// The driver sorts these into two groups: failures of the link itself
/// (the board went quiet, usually because it fell out of UART mode) and
/// failures of the conversation (the board answered, but not in the shape
/// the protocol promises). Only the first group is worth a reset.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// Nothing arrived within the read timeout
    #[error("Device did not respond")]
    NoResponse,

    /// The transport failed for a reason other than a timeout
    #[error("Link error: {0}")]
    Link(LinkError),

    /// The reply had the wrong length or was missing a delimiter
    ///
    /// This indicates a parsing assumption was violated rather than a dropped
    /// link, so it is never retried.
    #[error("Protocol mismatch: {0}")]
    ProtocolMismatch(String),

    /// The device answered with an explicit refusal (e.g. `NoFile`)
    #[error("Device rejected command: {0}")]
    DeviceRejected(String),
}

impl ApiError {
    /// Whether resetting the board and resending could plausibly help
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ApiError::NoResponse | ApiError::Link(_))
    }

    pub(crate) fn mismatch(what: &str, line: &[u8]) -> Self {
        ApiError::ProtocolMismatch(format!("{}: {:?}", what, String::from_utf8_lossy(line)))
    }
}

/// Type alias for results that can return an ApiError
pub type Result<T> = std::result::Result<T, ApiError>;

/// Convert from LinkError to ApiError
impl From<LinkError> for ApiError {
    fn from(error: LinkError) -> Self {
        match error {
            LinkError::Timeout => ApiError::NoResponse,
            other => ApiError::Link(other),
        }
    }
}
