//! Command Builder
//!
//! Renders each array operation into the exact ONTAP 7-mode command line.
//! Rendering is pure; nothing here touches the channel.

use crate::protocol::naming::LunPath;
use std::fmt;

/// One command understood by the array's administrative shell
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArrayCommand<'a> {
    /// `lun create -s <size>g -t linux <lun_path>`
    LunCreate { lun: &'a LunPath, size_gb: u64 },
    /// `lun map <lun_path> <igroup>`
    LunMap { lun: &'a LunPath, igroup: &'a str },
    /// `lun unmap <lun_path> <igroup>`
    LunUnmap { lun: &'a LunPath, igroup: &'a str },
    /// `lun destroy <lun_path>`
    LunDestroy { lun: &'a LunPath },
    /// `lun resize <lun_path> <size>g`
    LunResize { lun: &'a LunPath, size_gb: u64 },
    /// `lun show -m <lun_path>`
    LunShowMapping { lun: &'a LunPath },
    /// `clone start <source_path> <dest_path>`
    CloneStart {
        source: &'a LunPath,
        destination: &'a LunPath,
    },
    /// `iscsi nodename`
    IscsiNodeName,
    /// `igroup add -f <igroup> <initiator>`
    IgroupAdd { igroup: &'a str, initiator: &'a str },
    /// `igroup remove -f <igroup> <initiator>`
    IgroupRemove { igroup: &'a str, initiator: &'a str },
}

impl ArrayCommand<'_> {
    /// Short label identifying the command family, used for logs and metrics
    pub fn verb(&self) -> &'static str {
        match self {
            ArrayCommand::LunCreate { .. } => "lun create",
            ArrayCommand::LunMap { .. } => "lun map",
            ArrayCommand::LunUnmap { .. } => "lun unmap",
            ArrayCommand::LunDestroy { .. } => "lun destroy",
            ArrayCommand::LunResize { .. } => "lun resize",
            ArrayCommand::LunShowMapping { .. } => "lun show",
            ArrayCommand::CloneStart { .. } => "clone start",
            ArrayCommand::IscsiNodeName => "iscsi nodename",
            ArrayCommand::IgroupAdd { .. } => "igroup add",
            ArrayCommand::IgroupRemove { .. } => "igroup remove",
        }
    }
}

impl fmt::Display for ArrayCommand<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArrayCommand::LunCreate { lun, size_gb } => {
                write!(f, "lun create -s {}g -t linux {}", size_gb, lun)
            }
            ArrayCommand::LunMap { lun, igroup } => write!(f, "lun map {} {}", lun, igroup),
            ArrayCommand::LunUnmap { lun, igroup } => write!(f, "lun unmap {} {}", lun, igroup),
            ArrayCommand::LunDestroy { lun } => write!(f, "lun destroy {}", lun),
            ArrayCommand::LunResize { lun, size_gb } => {
                write!(f, "lun resize {} {}g", lun, size_gb)
            }
            ArrayCommand::LunShowMapping { lun } => write!(f, "lun show -m {}", lun),
            ArrayCommand::CloneStart {
                source,
                destination,
            } => write!(f, "clone start {} {}", source, destination),
            ArrayCommand::IscsiNodeName => f.write_str("iscsi nodename"),
            ArrayCommand::IgroupAdd { igroup, initiator } => {
                write!(f, "igroup add -f {} {}", igroup, initiator)
            }
            ArrayCommand::IgroupRemove { igroup, initiator } => {
                write!(f, "igroup remove -f {} {}", igroup, initiator)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::naming::LunPathResolver;

    #[test]
    fn test_lun_command_templates() {
        let resolver = LunPathResolver::new("vol0");
        let lun = resolver.lun_path("volume-000001");

        assert_eq!(
            ArrayCommand::LunCreate { lun: &lun, size_gb: 1 }.to_string(),
            "lun create -s 1g -t linux /vol/vol0/volume-000001"
        );
        assert_eq!(
            ArrayCommand::LunMap { lun: &lun, igroup: "openstack" }.to_string(),
            "lun map /vol/vol0/volume-000001 openstack"
        );
        assert_eq!(
            ArrayCommand::LunUnmap { lun: &lun, igroup: "openstack" }.to_string(),
            "lun unmap /vol/vol0/volume-000001 openstack"
        );
        assert_eq!(
            ArrayCommand::LunDestroy { lun: &lun }.to_string(),
            "lun destroy /vol/vol0/volume-000001"
        );
        assert_eq!(
            ArrayCommand::LunResize { lun: &lun, size_gb: 20 }.to_string(),
            "lun resize /vol/vol0/volume-000001 20g"
        );
        assert_eq!(
            ArrayCommand::LunShowMapping { lun: &lun }.to_string(),
            "lun show -m /vol/vol0/volume-000001"
        );
    }

    #[test]
    fn test_clone_and_igroup_templates() {
        let resolver = LunPathResolver::new("vol0");
        let source = resolver.lun_path("v1");
        let destination = resolver.lun_path("s1");

        assert_eq!(
            ArrayCommand::CloneStart {
                source: &source,
                destination: &destination,
            }
            .to_string(),
            "clone start /vol/vol0/v1 /vol/vol0/s1"
        );
        assert_eq!(ArrayCommand::IscsiNodeName.to_string(), "iscsi nodename");

        let initiator = "iqn.1993-08.org.debian:01:222";
        assert_eq!(
            ArrayCommand::IgroupAdd { igroup: "openstack", initiator }.to_string(),
            "igroup add -f openstack iqn.1993-08.org.debian:01:222"
        );
        assert_eq!(
            ArrayCommand::IgroupRemove { igroup: "openstack", initiator }.to_string(),
            "igroup remove -f openstack iqn.1993-08.org.debian:01:222"
        );
    }

    #[test]
    fn test_verbs() {
        let lun = LunPathResolver::new("vol0").lun_path("v1");
        assert_eq!(ArrayCommand::LunShowMapping { lun: &lun }.verb(), "lun show");
        assert_eq!(ArrayCommand::IscsiNodeName.verb(), "iscsi nodename");
    }
}
