// Configuration errors raised while generators are being built.

/// A generator was configured with arguments it cannot honour.
///
/// Raised while a generator is being built, never during a draw.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("InvalidArgument: {message}")]
pub struct InvalidArgument {
    message: String,
}

impl InvalidArgument {
    pub fn new(message: impl Into<String>) -> InvalidArgument {
        InvalidArgument {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Fail with `InvalidArgument` unless `condition` holds.
pub fn check_argument(condition: bool, message: impl FnOnce() -> String) -> Result<(), InvalidArgument> {
    if condition {
        Ok(())
    } else {
        Err(InvalidArgument::new(message()))
    }
}
