//! Driver configuration
//!
//! Fixed at construction time and never mutated afterwards.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Default storage pool holding the LUNs
pub const DEFAULT_VOLPOOL: &str = "vol0";
/// Default igroup the LUNs are mapped to
pub const DEFAULT_IGROUP: &str = "openstack";
/// Default iSCSI portal port
pub const DEFAULT_PORTAL_PORT: u16 = 3260;

/// Configuration for the NetApp direct driver
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Storage system volume that holds the LUNs
    pub volpool_name: String,
    /// Igroup name on the storage system
    pub igroup_name: String,
    /// Administrative user name
    pub login: Option<String>,
    /// Administrative password
    pub password: Option<String>,
    /// Administrative host or IP
    pub host: Option<String>,
    /// SSH port of the administrative interface
    pub ssh_port: u16,
    /// iSCSI portal IP; falls back to `host`
    pub iscsi_portal_ip: Option<String>,
    /// iSCSI portal port
    pub iscsi_portal_port: u16,
    /// Per-command timeout enforced by the channel
    pub command_timeout_secs: u64,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            volpool_name: DEFAULT_VOLPOOL.to_string(),
            igroup_name: DEFAULT_IGROUP.to_string(),
            login: None,
            password: None,
            host: None,
            ssh_port: 22,
            iscsi_portal_ip: None,
            iscsi_portal_port: DEFAULT_PORTAL_PORT,
            command_timeout_secs: 60,
        }
    }
}

impl fmt::Debug for DriverConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DriverConfig")
            .field("volpool_name", &self.volpool_name)
            .field("igroup_name", &self.igroup_name)
            .field("login", &self.login)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("host", &self.host)
            .field("ssh_port", &self.ssh_port)
            .field("iscsi_portal_ip", &self.iscsi_portal_ip)
            .field("iscsi_portal_port", &self.iscsi_portal_port)
            .field("command_timeout_secs", &self.command_timeout_secs)
            .finish()
    }
}

impl DriverConfig {
    /// Load configuration from a YAML file; missing keys take defaults
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_yaml_str(&text)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    /// Portal IP, falling back to the administrative host
    pub fn portal_ip(&self) -> Option<&str> {
        self.iscsi_portal_ip
            .as_deref()
            .or(self.host.as_deref())
            .filter(|ip| !ip.is_empty())
    }

    /// Portal as `ip:port`
    pub fn portal(&self) -> Result<String> {
        let ip = self.portal_ip().ok_or_else(|| {
            Error::Configuration(
                "no iSCSI portal address: set iscsi_portal_ip or host".to_string(),
            )
        })?;
        Ok(format!("{}:{}", ip, self.iscsi_portal_port))
    }

    /// Check everything the driver relies on when building commands
    pub fn validate(&self) -> Result<()> {
        validate_token("volpool_name", &self.volpool_name)?;
        validate_token("igroup_name", &self.igroup_name)?;
        if self.iscsi_portal_port == 0 {
            return Err(Error::Configuration(
                "iscsi_portal_port must be non-zero".to_string(),
            ));
        }
        self.portal()?;
        Ok(())
    }
}

fn validate_token(field: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(Error::Configuration(format!("{} must not be empty", field)));
    }
    if value.chars().any(|c| c.is_whitespace() || c == '/') {
        return Err(Error::Configuration(format!(
            "{} '{}' must not contain whitespace or '/'",
            field, value
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = DriverConfig::default();
        assert_eq!(config.volpool_name, "vol0");
        assert_eq!(config.igroup_name, "openstack");
        assert_eq!(config.iscsi_portal_port, 3260);
        assert_eq!(config.ssh_port, 22);
        assert!(config.portal_ip().is_none());
    }

    #[test]
    fn test_portal_falls_back_to_host() {
        let mut config = DriverConfig {
            host: Some("192.168.133.3".into()),
            ..Default::default()
        };
        assert_eq!(config.portal().unwrap(), "192.168.133.3:3260");

        config.iscsi_portal_ip = Some("10.1.1.5".into());
        config.iscsi_portal_port = 3261;
        assert_eq!(config.portal().unwrap(), "10.1.1.5:3261");
    }

    #[test]
    fn test_validate() {
        let config = DriverConfig::default();
        assert_matches!(config.validate(), Err(Error::Configuration(_)));

        let mut config = DriverConfig {
            host: Some("filer01".into()),
            ..Default::default()
        };
        assert!(config.validate().is_ok());

        config.volpool_name = "vol 0".into();
        assert_matches!(config.validate(), Err(Error::Configuration(_)));

        config.volpool_name = "vol0/sub".into();
        assert_matches!(config.validate(), Err(Error::Configuration(_)));

        config.volpool_name = "vol0".into();
        config.igroup_name = String::new();
        assert_matches!(config.validate(), Err(Error::Configuration(_)));

        config.igroup_name = "open/stack".into();
        assert_matches!(config.validate(), Err(Error::Configuration(_)));
    }

    #[test]
    fn test_debug_redacts_password() {
        let config = DriverConfig {
            password: Some("netapp".into()),
            ..Default::default()
        };
        let text = format!("{:?}", config);
        assert!(text.contains("<redacted>"));
        assert!(!text.contains("netapp"));
    }

    #[test]
    fn test_load_yaml_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "volpool_name: cinder\nhost: 192.168.133.3\nlogin: root\niscsi_portal_port: 3262"
        )
        .unwrap();

        let config = DriverConfig::from_yaml_file(file.path()).unwrap();
        assert_eq!(config.volpool_name, "cinder");
        assert_eq!(config.igroup_name, "openstack");
        assert_eq!(config.login.as_deref(), Some("root"));
        assert_eq!(config.portal().unwrap(), "192.168.133.3:3262");
    }

    #[test]
    fn test_load_yaml_rejects_bad_types() {
        assert_matches!(
            DriverConfig::from_yaml_str("iscsi_portal_port: not-a-port"),
            Err(Error::YamlParse(_))
        );
    }
}
