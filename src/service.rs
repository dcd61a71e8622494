use std::path::PathBuf;

use log::warn;

use crate::{
    config::ServiceConfig, models::BootDescriptor, resource::ResourceResolver,
    store::ConfigStore, Result,
};

/// Answers boot lookups and resource lookups.
/// Holds only immutable state and is shared by every connection.
#[derive(Debug, Clone)]
pub struct BootService {
    store: ConfigStore,
    resources: ResourceResolver,
}

impl BootService {
    pub fn new(config: ServiceConfig) -> Self {
        let store = ConfigStore::new(config.servers);
        for mac in store.duplicates() {
            warn!(r#"server "{mac}" is defined more than once, only the first definition is used."#);
        }
        Self {
            store,
            resources: ResourceResolver::new(config.repository),
        }
    }

    pub fn from_parts(store: ConfigStore, resources: ResourceResolver) -> Self {
        Self { store, resources }
    }

    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    pub fn resources(&self) -> &ResourceResolver {
        &self.resources
    }

    /// Boot descriptor of the machine with `hardware_address`.
    pub fn boot_descriptor(&self, hardware_address: &str) -> Result<BootDescriptor> {
        self.store
            .resolve(hardware_address)
            .map(BootDescriptor::from)
    }

    /// Path of the repository file named by `resource`.
    pub async fn resource(&self, resource: &str) -> Result<PathBuf> {
        self.resources.resolve(resource).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{models::BootRecord, Error};

    fn service(root: &std::path::Path) -> BootService {
        BootService::new(ServiceConfig {
            bind_host: "127.0.0.1".into(),
            bind_port: 0,
            repository: root.to_path_buf(),
            servers: vec![BootRecord::new("AA:BB:CC:DD:EE:FF", "vmlinuz")
                .with_initrd("initrd.img")
                .with_param("console", "ttyS0")],
        })
    }

    #[test]
    fn test_boot_descriptor() {
        let repo = tempfile::tempdir().unwrap();
        let service = service(repo.path());
        let descriptor = service.boot_descriptor("aa:bb:cc:dd:ee:ff").unwrap();
        assert_eq!(descriptor.kernel, "vmlinuz");
        assert_eq!(descriptor.initrd, vec!["initrd.img"]);
        assert_eq!(descriptor.cmdline["console"].as_str(), Some("ttyS0"));

        assert!(matches!(
            service.boot_descriptor("00:00:00:00:00:00"),
            Err(Error::ServerNotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_resource() {
        let repo = tempfile::tempdir().unwrap();
        std::fs::write(repo.path().join("vmlinuz"), b"kernel").unwrap();
        let service = service(repo.path());
        assert!(service.resource("vmlinuz").await.is_ok());
        assert!(matches!(
            service.resource("initrd.img").await,
            Err(Error::ResourceNotFound(_))
        ));
    }
}
