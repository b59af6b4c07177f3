//! SSH Command Channel
//!
//! Runs each array command through the system `ssh` client. When a password
//! is configured the client is wrapped in `sshpass -e`, which reads the
//! password from the `SSHPASS` environment variable so it never shows up in
//! the process list.

use crate::domain::ports::{CommandOutput, RemoteCommandChannel};
use crate::driver::config::DriverConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::fmt;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, warn};

/// Exit status `ssh` reserves for its own failures
const SSH_FAILURE_STATUS: i32 = 255;

/// sshpass: wrong password (5) and unknown host key (6)
const SSHPASS_FAILURE_STATUSES: [i32; 2] = [5, 6];

// =============================================================================
// Invocation
// =============================================================================

/// Fully resolved process invocation for one command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
}

// =============================================================================
// SSH Channel
// =============================================================================

/// [`RemoteCommandChannel`] backed by the OpenSSH client
#[derive(Clone)]
pub struct SshChannel {
    ssh_program: String,
    sshpass_program: String,
    host: String,
    port: u16,
    login: Option<String>,
    password: Option<String>,
    timeout: Duration,
}

impl fmt::Debug for SshChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SshChannel")
            .field("ssh_program", &self.ssh_program)
            .field("sshpass_program", &self.sshpass_program)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("login", &self.login)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl SshChannel {
    /// Build a channel from the driver configuration; `host` is required
    pub fn from_config(config: &DriverConfig) -> Result<Self> {
        let host = config
            .host
            .clone()
            .filter(|h| !h.is_empty())
            .ok_or_else(|| Error::Configuration("host is required for the SSH channel".into()))?;

        if config.command_timeout_secs == 0 {
            return Err(Error::Configuration(
                "command_timeout_secs must be non-zero".into(),
            ));
        }

        Ok(Self {
            ssh_program: "ssh".to_string(),
            sshpass_program: "sshpass".to_string(),
            host,
            port: config.ssh_port,
            login: config.login.clone(),
            password: config.password.clone(),
            timeout: Duration::from_secs(config.command_timeout_secs),
        })
    }

    /// Use a different `ssh` binary
    pub fn with_ssh_program(mut self, program: impl Into<String>) -> Self {
        self.ssh_program = program.into();
        self
    }

    /// Use a different `sshpass` binary
    pub fn with_sshpass_program(mut self, program: impl Into<String>) -> Self {
        self.sshpass_program = program.into();
        self
    }

    /// `login@host`, or just the host when no login is configured
    pub fn destination(&self) -> String {
        match &self.login {
            Some(login) if !login.is_empty() => format!("{}@{}", login, self.host),
            _ => self.host.clone(),
        }
    }

    /// Process invocation that runs `command` on the array
    pub fn invocation(&self, command: &str) -> Invocation {
        let mut args = Vec::new();
        let mut env = Vec::new();

        let program = match &self.password {
            Some(password) => {
                env.push(("SSHPASS".to_string(), password.clone()));
                args.push("-e".to_string());
                args.push(self.ssh_program.clone());
                self.sshpass_program.clone()
            }
            None => self.ssh_program.clone(),
        };

        args.push("-p".to_string());
        args.push(self.port.to_string());
        args.push("-o".to_string());
        args.push(format!("ConnectTimeout={}", self.timeout.as_secs()));
        if self.password.is_none() {
            // Key-based auth only; never fall back to an interactive prompt
            args.push("-o".to_string());
            args.push("BatchMode=yes".to_string());
        }
        args.push(self.destination());
        args.push(command.to_string());

        Invocation { program, args, env }
    }

    fn transport_error(&self, reason: impl Into<String>) -> Error {
        Error::Transport {
            endpoint: self.endpoint(),
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl RemoteCommandChannel for SshChannel {
    async fn execute(&self, command: &str) -> Result<CommandOutput> {
        let invocation = self.invocation(command);
        debug!("Running '{}' via {}", command, invocation.program);

        let mut process = Command::new(&invocation.program);
        process
            .args(&invocation.args)
            .envs(invocation.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .kill_on_drop(true);

        let output = match tokio::time::timeout(self.timeout, process.output()).await {
            Ok(result) => result.map_err(|e| {
                self.transport_error(format!("failed to run {}: {}", invocation.program, e))
            })?,
            Err(_) => {
                warn!("Command '{}' on {} timed out", command, self.endpoint());
                return Err(Error::Timeout {
                    command: command.to_string(),
                    seconds: self.timeout.as_secs(),
                });
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        match output.status.code() {
            Some(SSH_FAILURE_STATUS) => {
                return Err(self.transport_error(stderr.trim().to_string()));
            }
            Some(code)
                if self.password.is_some() && SSHPASS_FAILURE_STATUSES.contains(&code) =>
            {
                return Err(self.transport_error(format!(
                    "sshpass exited with status {}: {}",
                    code,
                    stderr.trim()
                )));
            }
            None => {
                return Err(self.transport_error("ssh terminated by signal"));
            }
            Some(_) => {}
        }

        Ok(CommandOutput { stdout, stderr })
    }

    fn endpoint(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
