use serde::{Deserialize, Serialize};

use super::cmdline::{Cmdline, CmdlineValue};
use crate::utils::{null_as_default, Json};

/// Boot configuration of one machine expected to network-boot.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BootRecord {
    /// Hardware address the machine presents, matched case-insensitively.
    /// Required: true
    #[serde(rename = "mac")]
    pub hardware_address: String,

    /// Repository-relative or absolute path to the kernel image.
    /// Required: true
    #[serde(rename = "kernel")]
    pub kernel: String,

    /// Paths to the initrd images, in load order.
    #[serde(rename = "initrd", default, deserialize_with = "null_as_default")]
    pub initrd: Vec<String>,

    /// Kernel command line parameters, handed to the chainloader verbatim.
    #[serde(rename = "cmdline", default, deserialize_with = "null_as_default")]
    pub cmdline: Cmdline,
}

impl<'a> Json<'a> for BootRecord {
    type Item = BootRecord;
}

impl BootRecord {
    pub fn new<S, K>(hardware_address: S, kernel: K) -> Self
    where
        S: Into<String>,
        K: Into<String>,
    {
        Self {
            hardware_address: hardware_address.into(),
            kernel: kernel.into(),
            initrd: Vec::new(),
            cmdline: Cmdline::new(),
        }
    }

    pub fn with_initrd<S>(mut self, path: S) -> Self
    where
        S: Into<String>,
    {
        self.initrd.push(path.into());
        self
    }

    pub fn with_param<S, V>(mut self, name: S, value: V) -> Self
    where
        S: Into<String>,
        V: Into<CmdlineValue>,
    {
        self.cmdline.insert(name.into(), value.into());
        self
    }

    /// Whether this record answers for `hardware_address`.
    /// Comparison folds case on both sides and performs no other normalization.
    pub fn matches(&self, hardware_address: &str) -> bool {
        let fold = |s: &str| s.chars().flat_map(char::to_lowercase).collect::<String>();
        fold(&self.hardware_address) == fold(hardware_address)
    }
}
