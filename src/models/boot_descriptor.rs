use serde::{Deserialize, Serialize};

use super::{boot_record::BootRecord, cmdline::Cmdline};
use crate::utils::Json;

/// Boot descriptor handed to the chainloader.
/// Carries everything of a [`BootRecord`] but the hardware address.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BootDescriptor {
    #[serde(rename = "kernel")]
    pub kernel: String,

    #[serde(rename = "initrd")]
    pub initrd: Vec<String>,

    #[serde(rename = "cmdline")]
    pub cmdline: Cmdline,
}

impl<'a> Json<'a> for BootDescriptor {
    type Item = BootDescriptor;
}

impl From<&BootRecord> for BootDescriptor {
    fn from(record: &BootRecord) -> Self {
        Self {
            kernel: record.kernel.clone(),
            initrd: record.initrd.clone(),
            cmdline: record.cmdline.clone(),
        }
    }
}
