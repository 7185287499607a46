// ABOUTME: SSH transport error types.
// ABOUTME: Covers session lifecycle, authentication, host key verification and channel failures.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("already connected")]
    AlreadyConnected,

    #[error("not connected")]
    NotConnected,

    #[error("invalid auth method: {0}")]
    InvalidAuthMethod(String),

    #[error("failed to resolve auth method: {0}")]
    AuthResolution(String),

    #[error("failed to build host key callback: {0}")]
    HostKeyCallback(String),

    #[error("connection failed: {0}")]
    Connection(String),

    #[error("authentication failed: no valid credentials")]
    AuthenticationFailed,

    #[error("SSH agent not available: {0}")]
    AgentUnavailable(String),

    #[error("failed to load key from {path}: {reason}")]
    KeyLoadFailed { path: PathBuf, reason: String },

    #[error("failed to open session channel: {0}")]
    SessionOpen(String),

    #[error("failed to start remote command: {0}")]
    CommandStart(String),

    #[error("failed to close connection: {0}")]
    Close(String),

    #[error("channel closed unexpectedly without exit status")]
    ChannelClosed,

    #[error("SSH protocol error: {0}")]
    Protocol(#[from] russh::Error),

    #[error("SSH key error: {0}")]
    Key(#[from] russh::keys::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
