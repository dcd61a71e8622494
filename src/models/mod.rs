pub mod boot_descriptor;
pub mod boot_record;
pub mod cmdline;
pub mod error;

pub use boot_descriptor::BootDescriptor;
pub use boot_record::BootRecord;
pub use cmdline::{Cmdline, CmdlineValue};
pub use error::ErrorBody;
