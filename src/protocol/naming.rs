//! LUN path resolution
//!
//! Every volume and snapshot lives at `/vol/<pool>/<name>` on the array.
//! Names are taken verbatim: no case folding, no escaping, no uniqueness
//! checks.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Absolute LUN path on the storage system
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LunPath(String);

impl LunPath {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LunPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for LunPath {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Maps logical names onto LUN paths inside one storage pool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LunPathResolver {
    pool: String,
}

impl LunPathResolver {
    pub fn new(pool: impl Into<String>) -> Self {
        Self { pool: pool.into() }
    }

    /// Storage pool name
    pub fn pool(&self) -> &str {
        &self.pool
    }

    /// `/vol/<pool>/<name>`
    pub fn lun_path(&self, name: &str) -> LunPath {
        LunPath(format!("/vol/{}/{}", self.pool, name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lun_path_format() {
        let resolver = LunPathResolver::new("vol0");
        assert_eq!(resolver.lun_path("volume-000001").as_str(), "/vol/vol0/volume-000001");
        assert_eq!(resolver.pool(), "vol0");
    }

    #[test]
    fn test_names_are_not_normalized() {
        let resolver = LunPathResolver::new("Pool_A");
        assert_eq!(resolver.lun_path("Snap-1").to_string(), "/vol/Pool_A/Snap-1");
        assert_ne!(resolver.lun_path("snap-1"), resolver.lun_path("Snap-1"));
    }
}
