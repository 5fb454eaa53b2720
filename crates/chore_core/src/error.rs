use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AppError {
    #[error("invalid_input - {0}")]
    InvalidInput(String),
    #[error("invalid_data - {0}")]
    InvalidData(String),
    #[error("invalid_schedule - {0}")]
    InvalidSchedule(String),
    #[error("invalid_assignment - {0}")]
    InvalidAssignment(String),
    #[error("io_error - {0}")]
    Io(String),
}

impl AppError {
    pub fn invalid_input<M: Into<String>>(message: M) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn invalid_data<M: Into<String>>(message: M) -> Self {
        Self::InvalidData(message.into())
    }

    /// Malformed recurrence configuration. Never retried or defaulted.
    pub fn invalid_schedule<M: Into<String>>(message: M) -> Self {
        Self::InvalidSchedule(message.into())
    }

    pub fn invalid_assignment<M: Into<String>>(message: M) -> Self {
        Self::InvalidAssignment(message.into())
    }

    pub fn io<M: Into<String>>(message: M) -> Self {
        Self::Io(message.into())
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::InvalidData(_) => "invalid_data",
            Self::InvalidSchedule(_) => "invalid_schedule",
            Self::InvalidAssignment(_) => "invalid_assignment",
            Self::Io(_) => "io_error",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::InvalidInput(message)
            | Self::InvalidData(message)
            | Self::InvalidSchedule(message)
            | Self::InvalidAssignment(message)
            | Self::Io(message) => message,
        }
    }
}
