use std::path::{Path, PathBuf};

use log::{error, info};
use serde::{Deserialize, Serialize};

use crate::{
    models::BootRecord,
    utils::{join_host_port, null_as_default},
    Error, Result,
};

/// Service configuration, loaded once at startup from a JSON descriptor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServiceConfig {
    /// bind_host is the address the API listens on.
    /// An empty string listens on every IPv4 interface.
    #[serde(rename = "bind-host", default)]
    pub bind_host: String,

    /// bind_port is the TCP port the API listens on.
    #[serde(rename = "bind-port")]
    pub bind_port: u16,

    /// repository is the directory static resources are served from.
    /// Nothing outside of it is ever served.
    #[serde(rename = "repository")]
    pub repository: PathBuf,

    /// servers holds the boot configuration of every known machine,
    /// looked up in the order given here.
    #[serde(rename = "servers", default, deserialize_with = "null_as_default")]
    pub servers: Vec<BootRecord>,
}

impl ServiceConfig {
    /// Read and parse the descriptor at `path`.
    /// Distinguishes an unreadable file from a malformed one.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path).map_err(|source| {
            error!("unable to read config {}: {source}", path.display());
            Error::LoadConfig {
                path: path.to_path_buf(),
                source,
            }
        })?;
        let config = serde_json::from_str::<ServiceConfig>(&data).map_err(|source| {
            error!("unable to parse config {}: {source}", path.display());
            Error::ParseConfig {
                path: path.to_path_buf(),
                source,
            }
        })?;
        info!(r#"Config "{}" loaded."#, path.display());
        Ok(config)
    }

    pub fn from_json(s: &str) -> serde_json::Result<Self> {
        serde_json::from_str(s)
    }

    /// Address to hand to the listener, e.g. `127.0.0.1:8080`.
    pub fn bind_address(&self) -> String {
        join_host_port(&self.bind_host, self.bind_port)
    }
}
