//! Domain Ports - Core trait definitions for the driver
//!
//! These traits define the boundaries between the driver logic and external systems.
//! The remote shell sits behind [`RemoteCommandChannel`]; the enclosing
//! orchestration framework talks to the driver through [`VolumeDriver`].

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

// =============================================================================
// Volume Types
// =============================================================================

/// A block volume as handed over by the orchestration framework
///
/// `name` must already be shell-safe; it is interpolated verbatim into
/// command lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Volume {
    /// Framework-level identifier
    pub id: String,
    /// Name, unique within the storage pool
    pub name: String,
    /// Size in whole gigabytes
    pub size_gb: u64,
}

impl Volume {
    pub fn new(id: impl Into<String>, name: impl Into<String>, size_gb: u64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            size_gb,
        }
    }
}

/// A snapshot of a volume, stored on the array as a LUN of its own
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Snapshot name; used as the LUN name
    pub name: String,
    /// Name of the source volume
    pub volume_name: String,
}

impl Snapshot {
    pub fn new(name: impl Into<String>, volume_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            volume_name: volume_name.into(),
        }
    }
}

/// Attaching host description, supplied per call and never stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connector {
    /// iSCSI initiator name of the attaching host
    pub initiator: String,
    /// Host name
    pub host: Option<String>,
}

impl Connector {
    pub fn new(initiator: impl Into<String>) -> Self {
        Self {
            initiator: initiator.into(),
            host: None,
        }
    }
}

// =============================================================================
// Command Output
// =============================================================================

/// Raw text returned by one remote command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn new(stdout: impl Into<String>, stderr: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: stderr.into(),
        }
    }

    /// Output with both streams empty
    pub fn empty() -> Self {
        Self::default()
    }
}

// =============================================================================
// Export / Connection Descriptors
// =============================================================================

/// Result of `create_export`
///
/// `provider_location` is opaque metadata, not a connectable address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportInfo {
    pub provider_location: String,
}

/// iSCSI target properties returned by `initialize_connection`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IscsiTargetProperties {
    /// Always false: the target is described statically, not discovered
    pub target_discovered: bool,
    /// Portal as `ip:port`
    pub target_portal: String,
    /// Target node name (IQN)
    pub target_iqn: String,
    /// LUN number within the igroup mapping
    pub target_lun: u32,
    /// Framework volume id
    pub volume_id: String,
}

/// Connection descriptor handed back to the orchestration framework
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionInfo {
    pub driver_volume_type: String,
    pub data: IscsiTargetProperties,
}

impl ConnectionInfo {
    /// Protocol tag for every connection this driver produces
    pub const ISCSI: &'static str = "iscsi";

    pub fn iscsi(data: IscsiTargetProperties) -> Self {
        Self {
            driver_volume_type: Self::ISCSI.to_string(),
            data,
        }
    }
}

// =============================================================================
// Remote Command Channel Port
// =============================================================================

/// Port for executing one text command on the array's administrative shell
///
/// Implementations own connection setup, authentication and timeouts.
/// Transport failures are reported as errors; anything the array printed is
/// returned verbatim.
#[async_trait]
pub trait RemoteCommandChannel: Send + Sync {
    /// Run a single command and return its raw output streams
    async fn execute(&self, command: &str) -> Result<CommandOutput>;

    /// Human-readable endpoint description for logs
    fn endpoint(&self) -> String;
}

// =============================================================================
// Volume Driver Port
// =============================================================================

/// Port the orchestration framework calls into
#[async_trait]
pub trait VolumeDriver: Send + Sync {
    /// Create a LUN for the volume and map it to the igroup
    async fn create_volume(&self, volume: &Volume) -> Result<()>;

    /// Unmap and destroy the volume's LUN
    async fn delete_volume(&self, volume: &Volume) -> Result<()>;

    /// Clone the source volume's LUN into a snapshot LUN
    async fn create_snapshot(&self, snapshot: &Snapshot) -> Result<()>;

    /// Remove a snapshot LUN
    async fn delete_snapshot(&self, snapshot: &Snapshot) -> Result<()>;

    /// Clone a snapshot LUN into a new volume and resize it
    async fn create_volume_from_snapshot(&self, volume: &Volume, snapshot: &Snapshot)
        -> Result<()>;

    /// Look up provisional export metadata for a new volume
    async fn create_export(&self, volume: &Volume) -> Result<ExportInfo>;

    async fn ensure_export(&self, volume: &Volume) -> Result<()>;

    async fn remove_export(&self, volume: &Volume) -> Result<()>;

    /// Grant the connector access and describe the iSCSI target
    async fn initialize_connection(
        &self,
        volume: &Volume,
        connector: &Connector,
    ) -> Result<ConnectionInfo>;

    /// Revoke the connector's access
    async fn terminate_connection(&self, volume: &Volume, connector: &Connector) -> Result<()>;

    /// Always fails with [`crate::error::Error::NotSupported`]
    async fn check_for_export(&self, volume_id: &str) -> Result<()>;
}
