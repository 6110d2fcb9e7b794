use std::collections::HashSet;

use super::dump::DumpSource;
use super::traits::DeviceSource;
use super::types::DeviceRecord;
use super::uapi::UapiSource;
use crate::config::{Backend, ControlConfig};
use crate::error::{ControlError, ControlResult};

/// Handle over every configured device backend
pub struct Client {
    sources: Vec<Box<dyn DeviceSource>>,
}

impl Client {
    /// Open the backends selected by `config`
    pub async fn open(config: &ControlConfig) -> ControlResult<Self> {
        let mut sources: Vec<Box<dyn DeviceSource>> = Vec::new();

        if config.backend.uses_userspace() {
            sources.push(Box::new(UapiSource::open(&config.socket_dir).await?));
        }

        if config.backend.uses_kernel() {
            match DumpSource::open(&config.wg_binary).await {
                Ok(source) => sources.push(Box::new(source)),
                // Kernel devices are optional when auto-detecting.
                Err(e) if config.backend == Backend::Auto => {
                    tracing::debug!("Kernel backend unavailable: {}", e);
                }
                Err(e) => return Err(e),
            }
        }

        tracing::debug!(
            "Opened control client with backends: {}",
            sources
                .iter()
                .map(|s| s.name())
                .collect::<Vec<_>>()
                .join(", ")
        );

        Ok(Self { sources })
    }

    /// Build a client from explicit backends, consulted in order
    pub fn with_sources(sources: Vec<Box<dyn DeviceSource>>) -> Self {
        Self { sources }
    }

    /// List devices from every backend; a name already seen is skipped
    pub async fn devices(&self) -> ControlResult<Vec<DeviceRecord>> {
        let mut seen = HashSet::new();
        let mut devices = Vec::new();

        for source in &self.sources {
            for device in source.devices().await? {
                if seen.insert(device.name.clone()) {
                    devices.push(device);
                } else {
                    tracing::trace!(
                        "Skipping {} from {} backend (already listed)",
                        device.name,
                        source.name()
                    );
                }
            }
        }

        Ok(devices)
    }

    /// Fetch one device from the first backend that owns it
    pub async fn device(&self, name: &str) -> ControlResult<DeviceRecord> {
        for source in &self.sources {
            match source.device(name).await {
                Ok(device) => return Ok(device),
                Err(e) if e.is_not_found() => {
                    tracing::trace!("{} not found via {} backend", name, source.name());
                }
                Err(e) => return Err(e),
            }
        }

        Err(ControlError::DeviceNotFound(name.to_string()))
    }

    /// Close every backend, logging failures
    pub async fn close(self) {
        for source in &self.sources {
            if let Err(e) = source.close().await {
                tracing::warn!("Failed to close {} backend: {}", source.name(), e);
            }
        }
        tracing::debug!("Control client closed");
    }
}
