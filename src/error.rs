/// Failure categories surfaced by the identification pipeline.
///
/// The kind decides the process exit code and lets callers tell configuration
/// mistakes (rejected before any computation) apart from data inconsistencies
/// and numeric failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad nonlinearity degree, lag, or weighting count.
    InvalidConfiguration,
    /// Sequence lengths inconsistent with each other or with the configured lags.
    DimensionMismatch,
    /// Structure selection retained zero terms.
    EmptyModel,
    /// A linear system could not be solved well-conditioned. Fatal only when
    /// every candidate of a sweep failed; single-candidate failures are
    /// recorded and penalized instead.
    RankDeficient,
}

#[derive(Clone)]
pub struct AppError {
    kind: ErrorKind,
    message: String,
}

impl AppError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidConfiguration, message)
    }

    pub fn dimension_mismatch(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::DimensionMismatch, message)
    }

    pub fn empty_model(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::EmptyModel, message)
    }

    pub fn rank_deficient(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RankDeficient, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn exit_code(&self) -> u8 {
        match self.kind {
            ErrorKind::InvalidConfiguration => 2,
            ErrorKind::DimensionMismatch => 3,
            ErrorKind::EmptyModel => 4,
            ErrorKind::RankDeficient => 5,
        }
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("kind", &self.kind)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
