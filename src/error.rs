//! Application-level error carrying the process exit code.
//!
//! Exit codes:
//! - `2`: input problems (arguments, missing files/columns, unknown selection)
//! - `3`: data problems (empty tables, segment chains that cannot be walked,
//!   poles missing from the coordinate table)
//! - `4`: computation problems (reading beyond the end of the segment)

use crate::predict::PredictError;

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
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
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

impl From<PredictError> for AppError {
    fn from(err: PredictError) -> Self {
        let exit_code = match &err {
            PredictError::InvalidParameter { .. } => 2,
            PredictError::InvalidSegment(_) | PredictError::Lookup { .. } => 3,
            PredictError::OutOfRange { .. } => 4,
        };
        let hint = match &err {
            PredictError::OutOfRange { .. } => " Re-check the OTDR reading and the selected segment.",
            PredictError::InvalidSegment(_) | PredictError::Lookup { .. } => " Segment data is incomplete.",
            PredictError::InvalidParameter { .. } => "",
        };
        AppError::new(exit_code, format!("{err}{hint}"))
    }
}
