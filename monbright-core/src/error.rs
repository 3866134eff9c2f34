//! Error types for the monitor controller.

use crate::vcp::VcpFeature;

/// Errors raised while parsing a monitor capability string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CapabilityError {
    /// A character that is neither a hex digit, whitespace nor a parenthesis.
    #[error("Unexpected character {found:?} at offset {offset}")]
    UnexpectedChar {
        /// The offending character.
        found: char,
        /// Byte offset into the capability string.
        offset: usize,
    },

    /// The string ended before the keyword's parentheses were balanced.
    #[error("Unterminated {keyword}( group")]
    Unterminated {
        /// The keyword whose argument list was left open.
        keyword: &'static str,
    },

    /// A top-level feature code did not fit into an integer.
    #[error("Invalid feature code: {0}")]
    InvalidCode(#[from] std::num::ParseIntError),
}

/// Errors reported by a [`MonitorChannel`](crate::MonitorChannel).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChannelError {
    /// An operating system call failed.
    #[error("{operation} failed (error code: {code})")]
    Os {
        /// The failing call.
        operation: &'static str,
        /// The OS error code.
        code: u32,
    },

    /// The channel cannot reach the monitor at all.
    #[error("Monitor unavailable: {0}")]
    Unavailable(String),
}

/// A feature read or write that failed on one monitor.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{feature} on {monitor}: {source}")]
pub struct FeatureFailure {
    /// Name of the monitor that failed.
    pub monitor: String,
    /// The feature being accessed.
    pub feature: VcpFeature,
    /// The underlying channel error.
    pub source: ChannelError,
}

/// Errors that can occur when using the monitor controller.
#[derive(Debug, thiserror::Error)]
pub enum ControllerError {
    /// A capability string could not be parsed.
    #[error("Malformed capability string: {0}")]
    Capability(#[from] CapabilityError),

    /// A channel operation failed.
    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    /// One or more monitors rejected a write. Every other monitor was updated.
    #[error("{} monitor write(s) failed", .0.len())]
    WriteFailed(Vec<FeatureFailure>),

    /// One or more monitors could not be read back. Every other monitor was refreshed.
    #[error("{} monitor read(s) failed", .0.len())]
    ReadFailed(Vec<FeatureFailure>),

    /// A logical level was NaN or infinite. Nothing was written.
    #[error("Invalid level: {0}")]
    InvalidLevel(f64),
}
