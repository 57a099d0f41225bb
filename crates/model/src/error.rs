use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

/// The kind of error that occurred.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
pub enum ErrorKind {
    /// The credential is missing, invalid or not allowed to use the model.
    Authentication,
    /// The model provider is rate limited.
    RateLimitExceeded,
    /// The provider could not be reached, or the connection broke while
    /// the response was streaming.
    Network,
    /// Any other errors.
    Other,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Authentication => write!(f, "Authentication failed"),
            ErrorKind::RateLimitExceeded => write!(f, "Rate limit exceeded"),
            ErrorKind::Network => write!(f, "Network error"),
            ErrorKind::Other => write!(f, "Provider error"),
        }
    }
}
