pub mod config;
pub mod error;
pub mod models;
pub mod resource;
pub mod server;
pub mod service;
pub mod store;
pub mod utils;

pub use crate::config::ServiceConfig;
pub use crate::error::{Error, Result};
pub use crate::server::{Server, ServerOptions, Shutdown, ShutdownSignal};
pub use crate::service::BootService;
