use std::fmt;

/// Errors raised while binding controllers to a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiError {
    /// A controller's anchor element exists but an element it depends on does not.
    MissingElement { id: String },
    Config(String),
    Template(String),
}

impl UiError {
    pub fn missing(id: &str) -> Self {
        UiError::MissingElement { id: id.to_string() }
    }
}

impl fmt::Display for UiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UiError::MissingElement { id } => write!(f, "missing element #{}", id),
            UiError::Config(msg) => write!(f, "config error: {}", msg),
            UiError::Template(msg) => write!(f, "template error: {}", msg),
        }
    }
}

impl std::error::Error for UiError {}

/// Failure talking to the subscription endpoint (network, HTTP status or JSON).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportError(pub String);

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for TransportError {}
