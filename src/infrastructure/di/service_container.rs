//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::application::services::FormatService;
use crate::config::Settings;
use crate::infrastructure::error::{InfraError, InfraResult};
use crate::infrastructure::traits::{FileSystem, RealFileSystem, StdStreams, Stdio};

/// Container holding all application services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    /// Standard streams for `-` paths
    pub stdio: Arc<dyn Stdio>,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        Self::with_deps(settings, Arc::new(RealFileSystem), Arc::new(StdStreams))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(settings: Settings, fs: Arc<dyn FileSystem>, stdio: Arc<dyn Stdio>) -> Self {
        Self {
            settings: Arc::new(settings),
            fs,
            stdio,
        }
    }

    /// Document service sharing the container's dependencies.
    pub fn format_service(&self) -> FormatService {
        FormatService::new(
            Arc::clone(&self.fs),
            Arc::clone(&self.stdio),
            Arc::clone(&self.settings),
        )
    }

    /// Writes the commented settings template to `path`, creating its directory.
    pub fn install_config_template(&self, path: &Path) -> InfraResult<()> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            self.fs
                .create_dir_all(dir)
                .map_err(|e| InfraError::io("create", dir, e))?;
        }
        self.fs
            .write(path, Settings::template().as_bytes())
            .map_err(|e| InfraError::io("write", path, e))?;
        debug!(path = %path.display(), "installed config template");
        Ok(())
    }
}
