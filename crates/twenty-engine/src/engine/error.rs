#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// Direction text other than up/down/left/right (any case).
    InvalidDirection(String),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::InvalidDirection(s) => write!(f, "invalid direction: {s:?}"),
        }
    }
}

impl std::error::Error for EngineError {}
