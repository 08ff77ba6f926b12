//! Central error types for thumbmirror.
//!
//! Initialization failures are fatal to the component that reports them;
//! everything else is reported per tick and retried.

use thiserror::Error;

/// Main error type for mirror and overlay operations.
#[derive(Error, Debug)]
pub enum MirrorError {
    /// Source window handle does not resolve to a live window
    #[error("Invalid source window: {0}")]
    InvalidSource(String),

    /// Compositor refused the thumbnail link
    #[error("Thumbnail registration failed: {0}")]
    Registration(String),

    /// Drawing backend objects could not be created
    #[error("Device initialization failed: {0}")]
    DeviceInit(String),

    /// Drawing backend became unusable mid-session (recoverable)
    #[error("Device lost: {0}")]
    DeviceLost(String),

    /// Native window creation or manipulation failed
    #[error("Window error: {0}")]
    Window(String),

    /// A rectangle had zero width or height
    #[error("Degenerate geometry: {0}")]
    DegenerateGeometry(String),

    /// A required resource (host, link, surface) is not present
    #[error("Not initialized: {0}")]
    NotInitialized(&'static str),

    /// Configuration could not be read or parsed
    #[error("Config error: {0}")]
    Config(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for MirrorError {
    fn from(err: serde_json::Error) -> Self {
        MirrorError::Config(err.to_string())
    }
}

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error, converting it to MirrorError::Other.
    fn context(self, msg: &str) -> MirrorResult<T>;
}

impl<T, E: std::fmt::Display> ResultExt<T> for Result<T, E> {
    fn context(self, msg: &str) -> MirrorResult<T> {
        self.map_err(|e| MirrorError::Other(format!("{}: {}", msg, e)))
    }
}

/// Extension trait for adding context to Option types.
pub trait OptionExt<T> {
    /// Convert None to MirrorError::Other with the given message.
    fn context(self, msg: &str) -> MirrorResult<T>;

    /// Convert None to MirrorError::Other with a lazily evaluated message.
    fn with_context<F: FnOnce() -> String>(self, f: F) -> MirrorResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn context(self, msg: &str) -> MirrorResult<T> {
        self.ok_or_else(|| MirrorError::Other(msg.to_string()))
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> MirrorResult<T> {
        self.ok_or_else(|| MirrorError::Other(f()))
    }
}

/// Type alias for Results using MirrorError.
pub type MirrorResult<T> = Result<T, MirrorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MirrorError::InvalidSource("0x0".to_string());
        assert_eq!(err.to_string(), "Invalid source window: 0x0");

        let err = MirrorError::NotInitialized("thumbnail link");
        assert_eq!(err.to_string(), "Not initialized: thumbnail link");
    }

    #[test]
    fn test_initialization_errors() {
        let reg = MirrorError::Registration("E_INVALIDARG".to_string());
        assert!(reg.to_string().contains("Thumbnail registration"));

        let dev = MirrorError::DeviceInit("no D2D factory".to_string());
        assert!(dev.to_string().contains("Device initialization"));

        let lost = MirrorError::DeviceLost("recreate target".to_string());
        assert!(lost.to_string().contains("Device lost"));
    }

    #[test]
    fn test_from_json_error() {
        let json_err = serde_json::from_str::<u32>("not json").unwrap_err();
        let err: MirrorError = json_err.into();
        assert!(matches!(err, MirrorError::Config(_)));
    }

    #[test]
    fn test_result_ext_context() {
        let result: Result<(), &str> = Err("original error");
        let with_context = result.context("operation failed");

        let msg = with_context.unwrap_err().to_string();
        assert!(msg.contains("operation failed"));
        assert!(msg.contains("original error"));
    }

    #[test]
    fn test_option_ext() {
        let missing: Option<i32> = None;
        let err = missing.context("value was missing").unwrap_err();
        assert!(err.to_string().contains("value was missing"));

        let present = Some(42).context("should not appear");
        assert_eq!(present.unwrap(), 42);
    }
}
