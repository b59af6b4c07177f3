//! NetApp Direct - iSCSI volume driver for ONTAP 7-mode
//!
//! Maps block-storage intents (create/delete volume, snapshot, clone,
//! attach/detach) onto ordered command sequences issued over the storage
//! system's administrative shell, and judges each step by matching the
//! text it prints.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                 Orchestration framework (caller)                  │
//! └───────────────────────────────┬──────────────────────────────────┘
//!                                 │ VolumeDriver
//! ┌───────────────────────────────┴──────────────────────────────────┐
//! │                 NetAppDirectDriver (orchestrator)                 │
//! │  ┌──────────────┐  ┌──────────────┐  ┌─────────┐  ┌────────────┐  │
//! │  │   Command    │  │   Result     │  │ Output  │  │  LUN path  │  │
//! │  │   Builder    │  │   Verifier   │  │ Parsers │  │  Resolver  │  │
//! │  └──────────────┘  └──────────────┘  └─────────┘  └────────────┘  │
//! └───────────────────────────────┬──────────────────────────────────┘
//!                                 │ RemoteCommandChannel
//! ┌───────────────────────────────┴──────────────────────────────────┐
//! │                 SshChannel (ssh / sshpass + ssh)                  │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`driver`]: Operation orchestrator, configuration and metrics
//! - [`protocol`]: Command templates, success predicates, output grammars
//! - [`transport`]: Remote command channels
//! - [`domain`]: Core domain types and traits
//! - [`error`]: Error types and handling

pub mod domain;
pub mod driver;
pub mod error;
pub mod protocol;
pub mod transport;

// Re-export commonly used types
pub use domain::ports::{
    CommandOutput, ConnectionInfo, Connector, ExportInfo, IscsiTargetProperties,
    RemoteCommandChannel, Snapshot, Volume, VolumeDriver,
};

pub use driver::{DriverConfig, DriverMetrics, NetAppDirectDriver};

pub use error::{Error, ErrorKind, Result};

pub use protocol::{ArrayCommand, LunId, LunPath, LunPathResolver, SuccessPredicate};

pub use transport::SshChannel;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
