//! Extension trait implemented by every crate-level error enum.

use std::any::Any;
use std::error::Error;

use crate::status_code::StatusCode;

/// Common behaviour for plugsync errors.
pub trait ErrorExt: Error {
    /// Classify the error.
    fn status_code(&self) -> StatusCode {
        StatusCode::Unknown
    }

    /// Returns the error as [`Any`] so callers can downcast.
    fn as_any(&self) -> &dyn Any;

    /// Whether re-invoking the same operation may succeed.
    fn is_retryable(&self) -> bool {
        self.status_code().is_retryable()
    }

    /// Message safe to show to an end user.
    ///
    /// Internal errors hide their details behind the numeric status code.
    fn output_msg(&self) -> String {
        match self.status_code() {
            StatusCode::Unknown | StatusCode::Internal => {
                format!("Internal error: {}", self.status_code() as i32)
            }
            _ => self.to_string(),
        }
    }
}

/// An error carrying only a message and a status code.
#[derive(Debug)]
pub struct PlainError {
    msg: String,
    status_code: StatusCode,
}

impl PlainError {
    pub fn new(msg: impl Into<String>, status_code: StatusCode) -> Self {
        Self {
            msg: msg.into(),
            status_code,
        }
    }
}

impl std::fmt::Display for PlainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.msg)
    }
}

impl Error for PlainError {}

impl ErrorExt for PlainError {
    fn status_code(&self) -> StatusCode {
        self.status_code
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
#[path = "ext.test.rs"]
mod tests;
