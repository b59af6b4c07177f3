//! Remote Command Channels
//!
//! Implementations of [`crate::domain::ports::RemoteCommandChannel`]:
//! - ssh: the OpenSSH client, optionally wrapped in sshpass

pub mod ssh;

#[cfg(test)]
pub(crate) mod scripted;

pub use ssh::*;
