//! Backend connector
//!
//! Single owner of the live store handle. `connect` resolves the configured
//! topology once and opens it through the driver; every other component
//! borrows a clone of the handle through [`BackendConnector::handle`].

use super::errors::{CacheError, CacheResult};
use super::topology::ResolvedTopology;
use super::traits::{BackendDriver, CacheStore};
use crate::config::BackendConfig;
use parking_lot::RwLock;
use tracing::{debug, info, warn};

pub struct BackendConnector<D: BackendDriver> {
    config: BackendConfig,
    driver: D,
    handle: RwLock<Option<D::Store>>,
}

impl<D: BackendDriver> std::fmt::Debug for BackendConnector<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConnector")
            .field("topology", &self.config.kind())
            .field("connected", &self.is_connected())
            .finish()
    }
}

impl<D: BackendDriver> BackendConnector<D> {
    pub fn new(config: BackendConfig, driver: D) -> Self {
        Self {
            config,
            driver,
            handle: RwLock::new(None),
        }
    }

    /// Configured topology kind
    pub fn topology_name(&self) -> &'static str {
        self.config.kind()
    }

    pub fn is_connected(&self) -> bool {
        self.handle.read().is_some()
    }

    /// Resolve the topology and open a connection
    ///
    /// Configuration problems fail before the driver is asked to open
    /// anything. Connecting again replaces the current handle.
    pub async fn connect(&self) -> CacheResult<()> {
        let topology = ResolvedTopology::resolve(&self.config)?;
        let store = self.driver.open(&topology).await?;
        let provider = store.provider_name();

        let previous = self.handle.write().replace(store);
        if previous.is_some() {
            warn!(
                topology = topology.name(),
                "Query result cache was already connected, replacing existing connection"
            );
        }

        info!(
            topology = topology.name(),
            provider = provider,
            endpoints = %topology.redacted_endpoints().join(","),
            "Query result cache connected"
        );
        Ok(())
    }

    /// Close the connection
    ///
    /// A no-op when not connected. If closing fails the handle is kept so the
    /// caller can retry.
    pub async fn disconnect(&self) -> CacheResult<()> {
        let taken = self.handle.write().take();
        let Some(store) = taken else {
            debug!("Query result cache disconnect requested while not connected");
            return Ok(());
        };

        if let Err(e) = store.quit().await {
            let mut guard = self.handle.write();
            if guard.is_none() {
                *guard = Some(store);
            }
            return Err(e);
        }

        info!(
            topology = self.topology_name(),
            "Query result cache disconnected"
        );
        Ok(())
    }

    /// Clone of the live handle, or `NotConnected`
    pub fn handle(&self) -> CacheResult<D::Store> {
        self.handle.read().clone().ok_or(CacheError::NotConnected)
    }
}
