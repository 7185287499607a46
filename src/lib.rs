// ABOUTME: Library root for git-ssh-transport.
// ABOUTME: The CLI binary is in main.rs.

pub mod config;
pub mod error;
pub mod ssh;
pub mod transport;
