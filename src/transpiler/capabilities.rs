//! Server capability descriptor read by the compiler.

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

use crate::error::{DialectError, DialectResult};

/// `major.minor.patch` of the server, as reported by `version()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ServerVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl ServerVersion {
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }
}

/// First server version with `ALTER TABLE ... DELETE`.
pub const ALTER_DELETE_MIN_VERSION: ServerVersion = ServerVersion::new(1, 1, 54388);

impl FromStr for ServerVersion {
    type Err = DialectError;

    /// Accepts `21.8`, `21.8.13` and `21.8.13.1`; extra components are ignored.
    fn from_str(s: &str) -> DialectResult<Self> {
        let parts = s
            .trim()
            .split('.')
            .take(3)
            .map(|p| p.parse::<u32>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| DialectError::Config(format!("Invalid server version '{}'", s)))?;
        match parts.as_slice() {
            [major, minor] => Ok(Self::new(*major, *minor, 0)),
            [major, minor, patch] => Ok(Self::new(*major, *minor, *patch)),
            _ => Err(DialectError::Config(format!("Invalid server version '{}'", s))),
        }
    }
}

impl fmt::Display for ServerVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// What the connected server supports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    pub supports_delete: bool,
    pub server_version: Option<ServerVersion>,
}

impl Default for Capabilities {
    /// Unknown server: assume a modern one.
    fn default() -> Self {
        Self {
            supports_delete: true,
            server_version: None,
        }
    }
}

impl Capabilities {
    pub fn for_server_version(version: ServerVersion) -> Self {
        Self {
            supports_delete: version >= ALTER_DELETE_MIN_VERSION,
            server_version: Some(version),
        }
    }
}

/// Capabilities shared by every compilation on one connection.
///
/// Compilations read a [`snapshot`](Self::snapshot); [`negotiate`](Self::negotiate)
/// takes the write lock, so an update never interleaves with a read.
#[derive(Debug, Clone, Default)]
pub struct SharedCapabilities {
    inner: Arc<RwLock<Capabilities>>,
}

impl SharedCapabilities {
    pub fn new(capabilities: Capabilities) -> Self {
        Self {
            inner: Arc::new(RwLock::new(capabilities)),
        }
    }

    pub fn snapshot(&self) -> Capabilities {
        match self.inner.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Replace the capabilities after learning the server version.
    pub fn negotiate(&self, version: ServerVersion) {
        self.update(|caps| *caps = Capabilities::for_server_version(version));
        tracing::info!(%version, "negotiated server capabilities");
    }

    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut Capabilities),
    {
        match self.inner.write() {
            Ok(mut guard) => f(&mut *guard),
            Err(poisoned) => f(&mut *poisoned.into_inner()),
        }
    }
}
