use std::path::{Component, Path, PathBuf};

use log::{info, warn};

use crate::{Error, Result};

/// Maps request paths onto files below the repository root.
#[derive(Debug, Clone)]
pub struct ResourceResolver {
    // root as configured, used to report paths back to clients
    root: PathBuf,
    // root with symlinks resolved, used for the containment check
    canonical_root: PathBuf,
}

impl ResourceResolver {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        let root = root.into();
        let canonical_root = std::fs::canonicalize(&root).unwrap_or_else(|e| {
            warn!("repository {} is not accessible: {e}", root.display());
            root.clone()
        });
        Self {
            root,
            canonical_root,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve `resource` to a regular file inside the repository.
    ///
    /// Anything that is missing, is not a regular file, or would end up
    /// outside the repository (`..`, absolute paths, symlinks pointing out)
    /// is reported as not found with the joined path.
    pub async fn resolve(&self, resource: &str) -> Result<PathBuf> {
        info!(r#"requesting resource "{resource}"."#);
        let requested = self.root.join(resource.trim_start_matches('/'));
        let not_found = || Error::ResourceNotFound(requested.clone());

        if !is_confined(resource) {
            warn!(r#"resource "{resource}" leaves the repository."#);
            return Err(not_found());
        }

        let canonical = match tokio::fs::canonicalize(&requested).await {
            Ok(p) => p,
            Err(_) => {
                warn!("resource does not exist.");
                return Err(not_found());
            }
        };
        if !canonical.starts_with(&self.canonical_root) {
            warn!(
                "resource {} resolves outside the repository.",
                requested.display()
            );
            return Err(not_found());
        }
        match tokio::fs::metadata(&canonical).await {
            Ok(meta) if meta.is_file() => {
                info!("resource found.");
                Ok(canonical)
            }
            _ => {
                warn!("resource is not a regular file.");
                Err(not_found())
            }
        }
    }
}

/// Whether a relative request path stays below the directory it is joined to.
/// Leading slashes are ignored; `.` is allowed, `..` never is.
fn is_confined(resource: &str) -> bool {
    let relative = Path::new(resource.trim_start_matches('/'));
    relative
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn repository() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("images")).unwrap();
        fs::write(dir.path().join("images/vmlinuz"), b"kernel").unwrap();
        fs::write(dir.path().join("images/initrd.img"), b"initrd").unwrap();
        fs::write(dir.path().join("boot.ipxe"), b"#!ipxe").unwrap();
        dir
    }

    #[test]
    fn test_is_confined() {
        assert!(is_confined("images/vmlinuz"));
        assert!(is_confined("/images/vmlinuz"));
        assert!(is_confined("./images/vmlinuz"));
        assert!(!is_confined("../etc/passwd"));
        assert!(!is_confined("../../etc/passwd"));
        assert!(!is_confined("images/../../etc/passwd"));
        assert!(!is_confined("images/.."));
    }

    #[tokio::test]
    async fn test_resolve_existing() {
        crate::utils::init();
        let repo = repository();
        let resolver = ResourceResolver::new(repo.path());
        let root = fs::canonicalize(repo.path()).unwrap();

        let kernel = resolver.resolve("images/vmlinuz").await.unwrap();
        let initrd = resolver.resolve("images/initrd.img").await.unwrap();
        assert_ne!(kernel, initrd);
        assert!(kernel.starts_with(&root));
        assert!(initrd.starts_with(&root));
        assert_eq!(fs::read(&kernel).unwrap(), b"kernel");
        assert!(resolver.resolve("boot.ipxe").await.is_ok());
    }

    #[tokio::test]
    async fn test_resolve_missing_names_joined_path() {
        let repo = repository();
        let resolver = ResourceResolver::new(repo.path());
        let err = resolver.resolve("images/missing.img").await.unwrap_err();
        match err {
            Error::ResourceNotFound(path) => {
                assert_eq!(path, repo.path().join("images/missing.img"))
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[tokio::test]
    async fn test_resolve_directory_is_not_served() {
        let repo = repository();
        let resolver = ResourceResolver::new(repo.path());
        assert!(resolver.resolve("images").await.is_err());
        assert!(resolver.resolve("").await.is_err());
    }

    #[tokio::test]
    async fn test_resolve_traversal() {
        let outer = tempfile::tempdir().unwrap();
        fs::write(outer.path().join("secret"), b"secret").unwrap();
        let root = outer.path().join("repo");
        fs::create_dir_all(root.join("images")).unwrap();
        let resolver = ResourceResolver::new(&root);

        for attempt in [
            "../secret",
            "images/../../secret",
            "../../etc/passwd",
            "/../secret",
        ] {
            let err = resolver.resolve(attempt).await.unwrap_err();
            assert!(err.is_not_found(), "{attempt} was not refused");
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_resolve_symlink_escape() {
        let outer = tempfile::tempdir().unwrap();
        fs::write(outer.path().join("secret"), b"secret").unwrap();
        let root = outer.path().join("repo");
        fs::create_dir_all(&root).unwrap();
        std::os::unix::fs::symlink(outer.path().join("secret"), root.join("link")).unwrap();
        std::os::unix::fs::symlink(outer.path(), root.join("up")).unwrap();
        let resolver = ResourceResolver::new(&root);

        assert!(resolver.resolve("link").await.is_err());
        assert!(resolver.resolve("up/secret").await.is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_resolve_symlink_inside() {
        let repo = repository();
        std::os::unix::fs::symlink(
            repo.path().join("images/vmlinuz"),
            repo.path().join("vmlinuz-latest"),
        )
        .unwrap();
        let resolver = ResourceResolver::new(repo.path());
        let path = resolver.resolve("vmlinuz-latest").await.unwrap();
        assert_eq!(fs::read(path).unwrap(), b"kernel");
    }
}
