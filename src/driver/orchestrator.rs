//! NetApp Direct Driver - Operation Orchestrator
//!
//! Implements every [`VolumeDriver`] operation as a short, fixed sequence of
//! array commands:
//! - create volume: `lun create` then `lun map`
//! - delete volume / snapshot: `lun unmap` then `lun destroy`
//! - snapshot / volume from snapshot: `clone start`, `lun map` (+ `lun resize`)
//! - connections: `igroup add` / `igroup remove` plus target lookups
//!
//! Commands are issued one at a time. The first failing step aborts the
//! operation; earlier steps are not rolled back.

use crate::domain::ports::{
    CommandOutput, ConnectionInfo, Connector, ExportInfo, IscsiTargetProperties,
    RemoteCommandChannel, Snapshot, Volume, VolumeDriver,
};
use crate::driver::config::DriverConfig;
use crate::driver::metrics::DriverMetrics;
use crate::error::{Error, Result};
use crate::protocol::{
    ensure_succeeded, parse_lun_id, parse_node_name, ArrayCommand, LunId, LunPath,
    LunPathResolver, ParseError, SuccessPredicate,
};
use async_trait::async_trait;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Confirmation printed by `clone start` once the clone is running
pub const CLONE_STARTED: &str = "Clone operation started successfully";

/// Text the array prints when unmapping a LUN that has no mapping
pub const NOT_MAPPED: &str = "not mapped";

// =============================================================================
// NetApp Direct Driver
// =============================================================================

/// iSCSI volume driver for ONTAP 7-mode systems
pub struct NetAppDirectDriver {
    channel: Arc<dyn RemoteCommandChannel>,
    resolver: LunPathResolver,
    igroup: String,
    portal: String,
    metrics: DriverMetrics,
}

impl fmt::Debug for NetAppDirectDriver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NetAppDirectDriver")
            .field("endpoint", &self.channel.endpoint())
            .field("resolver", &self.resolver)
            .field("igroup", &self.igroup)
            .field("portal", &self.portal)
            .finish_non_exhaustive()
    }
}

impl NetAppDirectDriver {
    /// Create a driver over an already constructed channel
    pub fn new(config: &DriverConfig, channel: Arc<dyn RemoteCommandChannel>) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            channel,
            resolver: LunPathResolver::new(config.volpool_name.clone()),
            igroup: config.igroup_name.clone(),
            portal: config.portal()?,
            metrics: DriverMetrics::new()?,
        })
    }

    pub fn metrics(&self) -> &DriverMetrics {
        &self.metrics
    }

    pub fn igroup(&self) -> &str {
        &self.igroup
    }

    /// Portal as `ip:port`
    pub fn portal(&self) -> &str {
        &self.portal
    }

    pub fn lun_path(&self, name: &str) -> LunPath {
        self.resolver.lun_path(name)
    }

    // -------------------------------------------------------------------------
    // Command execution
    // -------------------------------------------------------------------------

    /// Issue one command; transport errors pass through untouched
    async fn run(&self, command: &ArrayCommand<'_>) -> Result<(String, CommandOutput)> {
        let text = command.to_string();
        debug!("Issuing on {}: {}", self.channel.endpoint(), text);

        let started = Instant::now();
        let result = self.channel.execute(&text).await;
        self.metrics.record_command(command.verb(), started.elapsed());

        let output = result.map_err(|e| {
            self.metrics.record_failure(e.kind());
            e
        })?;
        debug!(
            "Command '{}' returned stdout={:?} stderr={:?}",
            text, output.stdout, output.stderr
        );

        Ok((text, output))
    }

    /// Issue one command and verify its output
    async fn ensure(
        &self,
        command: &ArrayCommand<'_>,
        message: &str,
        predicate: SuccessPredicate,
    ) -> Result<CommandOutput> {
        let (text, output) = self.run(command).await?;
        ensure_succeeded(&text, &output, message, predicate).map_err(|e| {
            self.metrics.record_failure(e.kind());
            e
        })?;
        Ok(output)
    }

    fn parse_failure(&self, command: String, output: &CommandOutput, err: ParseError) -> Error {
        let err = Error::Parse {
            command,
            reason: err.to_string(),
            output: output.stdout.clone(),
        };
        error!("{}", err);
        self.metrics.record_failure(err.kind());
        err
    }

    /// Record the outcome of a logical operation
    async fn observe<T, F>(&self, operation: &'static str, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        let result = fut.await;
        self.metrics.record_operation(operation, result.is_ok());
        if let Err(e) = &result {
            debug!("{} failed: {}", operation, e.kind());
        }
        result
    }

    // -------------------------------------------------------------------------
    // Steps shared by several operations
    // -------------------------------------------------------------------------

    async fn map_lun(&self, lun: &LunPath) -> Result<()> {
        self.ensure(
            &ArrayCommand::LunMap {
                lun,
                igroup: &self.igroup,
            },
            "Error while mapping lun",
            SuccessPredicate::BothEmpty,
        )
        .await?;
        Ok(())
    }

    /// Unmap then destroy the LUN named `name`
    async fn destroy_lun(&self, name: &str) -> Result<()> {
        let lun = self.resolver.lun_path(name);
        info!("Destroying LUN {}", lun);

        let output = self
            .ensure(
                &ArrayCommand::LunUnmap {
                    lun: &lun,
                    igroup: &self.igroup,
                },
                "Error while unmapping lun",
                SuccessPredicate::EmptyOrMentions(NOT_MAPPED),
            )
            .await?;
        if !output.stdout.is_empty() || !output.stderr.is_empty() {
            warn!(
                "LUN {} was not mapped to {}, continuing with destroy",
                lun, self.igroup
            );
        }

        self.ensure(
            &ArrayCommand::LunDestroy { lun: &lun },
            "Error while destroying lun",
            SuccessPredicate::BothEmpty,
        )
        .await?;
        Ok(())
    }

    /// Start a clone and map the destination
    ///
    /// Only the start of the clone is confirmed; the array copies data in
    /// the background and the destination is mapped before the copy ends.
    async fn clone_lun(&self, source: &LunPath, destination: &LunPath) -> Result<()> {
        info!("Cloning LUN {} to {}", source, destination);

        self.ensure(
            &ArrayCommand::CloneStart {
                source,
                destination,
            },
            "error while cloning volume",
            SuccessPredicate::StdoutContains(CLONE_STARTED),
        )
        .await?;
        self.map_lun(destination).await
    }

    async fn resize_lun(&self, lun: &LunPath, size_gb: u64) -> Result<()> {
        info!("Resizing LUN {} to {} GB", lun, size_gb);

        self.ensure(
            &ArrayCommand::LunResize { lun, size_gb },
            "Resize failed",
            SuccessPredicate::BothEmpty,
        )
        .await?;
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Lookups
    // -------------------------------------------------------------------------

    /// Current LUN id of the volume named `name` in the igroup mapping
    pub async fn lun_id(&self, name: &str) -> Result<LunId> {
        let lun = self.resolver.lun_path(name);
        let output = self
            .ensure(
                &ArrayCommand::LunShowMapping { lun: &lun },
                "LUN Mapping failed",
                SuccessPredicate::StderrEmpty,
            )
            .await?;

        parse_lun_id(&lun, &self.igroup, &output.stdout).map_err(|e| {
            self.parse_failure(ArrayCommand::LunShowMapping { lun: &lun }.to_string(), &output, e)
        })
    }

    /// iSCSI target node name of the storage system
    pub async fn node_name(&self) -> Result<String> {
        let output = self
            .ensure(
                &ArrayCommand::IscsiNodeName,
                "getting node name failed",
                SuccessPredicate::StderrEmpty,
            )
            .await?;

        parse_node_name(&output.stdout)
            .map_err(|e| self.parse_failure(ArrayCommand::IscsiNodeName.to_string(), &output, e))
    }
}

#[async_trait]
impl VolumeDriver for NetAppDirectDriver {
    async fn create_volume(&self, volume: &Volume) -> Result<()> {
        self.observe("create_volume", async {
            let lun = self.resolver.lun_path(&volume.name);
            info!("Creating LUN {} ({} GB)", lun, volume.size_gb);

            // stdout may carry "lun create: created a LUN of size ..."
            self.ensure(
                &ArrayCommand::LunCreate {
                    lun: &lun,
                    size_gb: volume.size_gb,
                },
                "Error while creating lun",
                SuccessPredicate::StderrEmpty,
            )
            .await?;
            self.map_lun(&lun).await
        })
        .await
    }

    async fn delete_volume(&self, volume: &Volume) -> Result<()> {
        self.observe("delete_volume", self.destroy_lun(&volume.name))
            .await
    }

    async fn create_snapshot(&self, snapshot: &Snapshot) -> Result<()> {
        self.observe("create_snapshot", async {
            let source = self.resolver.lun_path(&snapshot.volume_name);
            let destination = self.resolver.lun_path(&snapshot.name);
            self.clone_lun(&source, &destination).await
        })
        .await
    }

    async fn delete_snapshot(&self, snapshot: &Snapshot) -> Result<()> {
        self.observe("delete_snapshot", self.destroy_lun(&snapshot.name))
            .await
    }

    async fn create_volume_from_snapshot(
        &self,
        volume: &Volume,
        snapshot: &Snapshot,
    ) -> Result<()> {
        self.observe("create_volume_from_snapshot", async {
            let source = self.resolver.lun_path(&snapshot.name);
            let destination = self.resolver.lun_path(&volume.name);
            self.clone_lun(&source, &destination).await?;
            self.resize_lun(&destination, volume.size_gb).await
        })
        .await
    }

    async fn create_export(&self, volume: &Volume) -> Result<ExportInfo> {
        self.observe("create_export", async {
            let lun_id = self.lun_id(&volume.name).await?;
            debug!("Provisional LUN id for {}: {}", volume.name, lun_id);
            Ok(ExportInfo {
                provider_location: lun_id.to_string(),
            })
        })
        .await
    }

    async fn ensure_export(&self, volume: &Volume) -> Result<()> {
        debug!("ensure_export for {} is a no-op", volume.name);
        Ok(())
    }

    async fn remove_export(&self, volume: &Volume) -> Result<()> {
        debug!("remove_export for {} is a no-op", volume.name);
        Ok(())
    }

    async fn initialize_connection(
        &self,
        volume: &Volume,
        connector: &Connector,
    ) -> Result<ConnectionInfo> {
        self.observe("initialize_connection", async {
            info!(
                "Adding initiator {} to igroup {}",
                connector.initiator, self.igroup
            );
            self.ensure(
                &ArrayCommand::IgroupAdd {
                    igroup: &self.igroup,
                    initiator: &connector.initiator,
                },
                "error initializing connection",
                SuccessPredicate::BothEmpty,
            )
            .await?;

            let target_iqn = self.node_name().await?;
            let target_lun = self.lun_id(&volume.name).await?;

            Ok(ConnectionInfo::iscsi(IscsiTargetProperties {
                target_discovered: false,
                target_portal: self.portal.clone(),
                target_iqn,
                target_lun: target_lun.0,
                volume_id: volume.id.clone(),
            }))
        })
        .await
    }

    async fn terminate_connection(&self, volume: &Volume, connector: &Connector) -> Result<()> {
        self.observe("terminate_connection", async {
            info!(
                "Removing initiator {} from igroup {} (volume {})",
                connector.initiator, self.igroup, volume.name
            );
            self.ensure(
                &ArrayCommand::IgroupRemove {
                    igroup: &self.igroup,
                    initiator: &connector.initiator,
                },
                "error terminating connection",
                SuccessPredicate::BothEmpty,
            )
            .await?;
            Ok(())
        })
        .await
    }

    async fn check_for_export(&self, volume_id: &str) -> Result<()> {
        debug!("check_for_export requested for {}", volume_id);
        Err(Error::NotSupported {
            operation: "check_for_export".to_string(),
        })
    }
}
