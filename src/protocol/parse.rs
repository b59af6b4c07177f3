//! Output parsers for show-style commands
//!
//! Each parser documents the grammar it accepts and returns a typed
//! [`ParseError`] for anything else. Callers attach the command context.
//!
//! `lun show -m <path>` (ONTAP 7-mode):
//!
//! ```text
//! LUN path                            Mapped to          LUN ID  Protocol
//! -----------------------------------------------------------------------
//! /vol/vol0/volume-000001             openstack               0     iSCSI
//! ```
//!
//! A LUN mapped to several igroups prints one row per igroup; rows after
//! the first leave the path column blank and start with whitespace:
//!
//! ```text
//! /vol/vol0/volume-000001             esx_hosts               5     iSCSI
//!                                     openstack               0     iSCSI
//! ```
//!
//! A row starting with a non-blank token opens the block for that path;
//! indented rows belong to the most recent block. The LUN id is taken from
//! the row of the requested path whose igroup column equals the requested
//! igroup and whose protocol is `iSCSI`.
//!
//! `iscsi nodename`:
//!
//! ```text
//! iSCSI target nodename: iqn.1992-08.com.netapp:sn.84167939
//! ```

use crate::protocol::naming::LunPath;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// `<path> <igroup> <id> <protocol>`
static MAPPING_ROW_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\S+)\s+(\S+)\s+(\S+)\s+(\S+)\s*$").expect("mapping row pattern is valid")
});

/// `<blank path> <igroup> <id> <protocol>`
static CONTINUATION_ROW_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s+(\S+)\s+(\S+)\s+(\S+)\s*$").expect("continuation row pattern is valid")
});

static NODE_NAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"iSCSI target nodename:(.*)").expect("node name pattern is valid"));

/// Why a command's output could not be parsed
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("expected {expected} in output")]
    Missing { expected: String },

    #[error("invalid {field} value '{value}'")]
    InvalidValue { field: &'static str, value: String },
}

/// LUN number as reported in the igroup mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LunId(pub u32);

impl fmt::Display for LunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Extract the LUN id `lun` is mapped as in `igroup` from `lun show -m` output
pub fn parse_lun_id(lun: &LunPath, igroup: &str, output: &str) -> Result<LunId, ParseError> {
    let mut in_block = false;

    for line in output.lines() {
        if line.trim().is_empty() {
            continue;
        }

        let columns = if line.starts_with(char::is_whitespace) {
            if !in_block {
                continue;
            }
            CONTINUATION_ROW_PATTERN
                .captures(line)
                .map(|c| (c.get(1), c.get(2), c.get(3)))
        } else {
            let row = MAPPING_ROW_PATTERN.captures(line);
            let path = line.split_whitespace().next().unwrap_or_default();
            in_block = path == lun.as_str();
            if !in_block {
                continue;
            }
            row.map(|c| (c.get(2), c.get(3), c.get(4)))
        };

        let (Some(group), Some(id), Some(protocol)) = columns.unwrap_or((None, None, None)) else {
            continue;
        };
        if group.as_str() != igroup || protocol.as_str() != "iSCSI" {
            continue;
        }

        let raw = id.as_str();
        return raw.parse::<u32>().map(LunId).map_err(|_| ParseError::InvalidValue {
            field: "LUN id",
            value: raw.to_string(),
        });
    }

    Err(ParseError::Missing {
        expected: format!("an iSCSI mapping of {} to igroup {}", lun, igroup),
    })
}

/// Extract the target node name from `iscsi nodename` output
pub fn parse_node_name(output: &str) -> Result<String, ParseError> {
    let captures = NODE_NAME_PATTERN
        .captures(output)
        .ok_or_else(|| ParseError::Missing {
            expected: "'iSCSI target nodename:' prefix".to_string(),
        })?;

    let node_name = captures[1].trim();
    if node_name.is_empty() {
        return Err(ParseError::InvalidValue {
            field: "node name",
            value: String::new(),
        });
    }

    Ok(node_name.to_string())
}
