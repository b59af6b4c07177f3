//! NetApp Direct CLI
//!
//! Runs a single driver operation against an ONTAP 7-mode storage system
//! over SSH. Structured results are printed as JSON on stdout; logs go to
//! stderr.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{error, info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use netapp_direct::{
    Connector, DriverConfig, NetAppDirectDriver, Result, Snapshot, SshChannel, Volume,
    VolumeDriver,
};

// =============================================================================
// CLI Arguments
// =============================================================================

/// NetApp Direct - iSCSI volume operations for ONTAP 7-mode storage systems
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// YAML configuration file
    #[arg(long, env = "NETAPP_CONFIG")]
    config: Option<PathBuf>,

    /// Administrative host or IP of the storage system
    #[arg(long, env = "NETAPP_HOST")]
    host: Option<String>,

    /// Administrative user name
    #[arg(long, env = "NETAPP_LOGIN")]
    login: Option<String>,

    /// Administrative password (uses sshpass when set)
    #[arg(long, env = "NETAPP_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// SSH port of the administrative interface
    #[arg(long, env = "NETAPP_SSH_PORT")]
    ssh_port: Option<u16>,

    /// Storage system volume holding the LUNs
    #[arg(long, env = "NETAPP_VOLPOOL")]
    volpool: Option<String>,

    /// Igroup the LUNs are mapped to
    #[arg(long, env = "NETAPP_IGROUP")]
    igroup: Option<String>,

    /// iSCSI portal IP (defaults to the administrative host)
    #[arg(long, env = "NETAPP_PORTAL_IP")]
    portal_ip: Option<String>,

    /// iSCSI portal port
    #[arg(long, env = "NETAPP_PORTAL_PORT")]
    portal_port: Option<u16>,

    /// Per-command timeout in seconds
    #[arg(long, env = "NETAPP_COMMAND_TIMEOUT")]
    command_timeout_secs: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Output logs as JSON
    #[arg(long, env = "LOG_JSON")]
    log_json: bool,

    /// Print driver metrics in Prometheus text format after the operation
    #[arg(long)]
    metrics: bool,

    #[command(subcommand)]
    operation: Operation,
}

#[derive(Subcommand, Debug)]
enum Operation {
    /// Create a LUN and map it to the igroup
    CreateVolume {
        #[arg(long)]
        name: String,
        /// Size in GB
        #[arg(long)]
        size: u64,
    },
    /// Unmap and destroy a LUN
    DeleteVolume {
        #[arg(long)]
        name: String,
    },
    /// Clone a volume's LUN into a snapshot LUN
    CreateSnapshot {
        #[arg(long)]
        volume_name: String,
        #[arg(long)]
        name: String,
    },
    /// Unmap and destroy a snapshot LUN
    DeleteSnapshot {
        #[arg(long)]
        name: String,
        /// Source volume; only recorded, the LUN is found by name
        #[arg(long)]
        volume_name: Option<String>,
    },
    /// Clone a snapshot LUN into a new volume and resize it
    CreateVolumeFromSnapshot {
        #[arg(long)]
        name: String,
        /// Size in GB
        #[arg(long)]
        size: u64,
        #[arg(long)]
        snapshot: String,
    },
    /// Look up the provisional export location of a volume
    CreateExport {
        #[arg(long)]
        name: String,
    },
    /// Grant an initiator access and print the iSCSI target description
    InitializeConnection {
        #[arg(long)]
        name: String,
        /// Framework volume id (defaults to the name)
        #[arg(long)]
        volume_id: Option<String>,
        #[arg(long)]
        initiator: String,
        #[arg(long)]
        host: Option<String>,
    },
    /// Revoke an initiator's access
    TerminateConnection {
        #[arg(long)]
        name: String,
        #[arg(long)]
        initiator: String,
        #[arg(long)]
        host: Option<String>,
    },
}

// =============================================================================
// Main
// =============================================================================

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    init_logging(&args);

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let config = load_config(&args)?;
    info!(
        "NetApp Direct {} targeting {} (pool {}, igroup {})",
        netapp_direct::VERSION,
        config.host.as_deref().unwrap_or("<unset>"),
        config.volpool_name,
        config.igroup_name
    );

    let channel = Arc::new(SshChannel::from_config(&config)?);
    let driver = NetAppDirectDriver::new(&config, channel)?;

    let result = execute(&driver, args.operation).await;

    if args.metrics {
        print!("{}", driver.metrics().encode()?);
    }

    result
}

async fn execute(driver: &NetAppDirectDriver, operation: Operation) -> Result<()> {
    match operation {
        Operation::CreateVolume { name, size } => {
            driver.create_volume(&Volume::new(name.clone(), name, size)).await
        }
        Operation::DeleteVolume { name } => {
            driver.delete_volume(&Volume::new(name.clone(), name, 0)).await
        }
        Operation::CreateSnapshot { volume_name, name } => {
            driver.create_snapshot(&Snapshot::new(name, volume_name)).await
        }
        Operation::DeleteSnapshot { name, volume_name } => {
            let snapshot = Snapshot::new(name, volume_name.unwrap_or_default());
            driver.delete_snapshot(&snapshot).await
        }
        Operation::CreateVolumeFromSnapshot {
            name,
            size,
            snapshot,
        } => {
            let volume = Volume::new(name.clone(), name, size);
            // The source volume name is irrelevant when cloning from a snapshot
            let snapshot = Snapshot::new(snapshot, String::new());
            driver.create_volume_from_snapshot(&volume, &snapshot).await
        }
        Operation::CreateExport { name } => {
            let export = driver
                .create_export(&Volume::new(name.clone(), name, 0))
                .await?;
            println!("{}", serde_json::to_string_pretty(&export)?);
            Ok(())
        }
        Operation::InitializeConnection {
            name,
            volume_id,
            initiator,
            host,
        } => {
            let volume = Volume::new(volume_id.unwrap_or_else(|| name.clone()), name, 0);
            let connector = Connector { initiator, host };
            let info = driver.initialize_connection(&volume, &connector).await?;
            println!("{}", serde_json::to_string_pretty(&info)?);
            Ok(())
        }
        Operation::TerminateConnection {
            name,
            initiator,
            host,
        } => {
            let volume = Volume::new(name.clone(), name, 0);
            let connector = Connector { initiator, host };
            driver.terminate_connection(&volume, &connector).await
        }
    }
}

// =============================================================================
// Configuration
// =============================================================================

fn load_config(args: &Args) -> Result<DriverConfig> {
    let mut config = match &args.config {
        Some(path) => DriverConfig::from_yaml_file(path)?,
        None => DriverConfig::default(),
    };

    if let Some(host) = &args.host {
        config.host = Some(host.clone());
    }
    if let Some(login) = &args.login {
        config.login = Some(login.clone());
    }
    if let Some(password) = &args.password {
        config.password = Some(password.clone());
    }
    if let Some(port) = args.ssh_port {
        config.ssh_port = port;
    }
    if let Some(volpool) = &args.volpool {
        config.volpool_name = volpool.clone();
    }
    if let Some(igroup) = &args.igroup {
        config.igroup_name = igroup.clone();
    }
    if let Some(portal_ip) = &args.portal_ip {
        config.iscsi_portal_ip = Some(portal_ip.clone());
    }
    if let Some(port) = args.portal_port {
        config.iscsi_portal_port = port;
    }
    if let Some(timeout) = args.command_timeout_secs {
        config.command_timeout_secs = timeout;
    }

    config.validate()?;
    Ok(config)
}

// =============================================================================
// Logging Setup
// =============================================================================

fn init_logging(args: &Args) {
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    if args.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}
