//! Shared test doubles for the query result cache
//!
//! `MemoryDriver` opens `MemoryStore`s that share one in-process map and one
//! call log, so tests can assert on exactly which backend calls were made.

#![allow(dead_code)]

use parking_lot::Mutex;
use query_result_cache::cache::{
    BackendDriver, CacheError, CacheResult, CacheStore, ManualClock, QueryResultCache,
    QueryResultCacheEngine, ResolvedTopology,
};
use query_result_cache::config::BackendConfig;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Every backend call made through a `MemoryStore`
#[derive(Debug, Default)]
pub struct CallLog {
    pub gets: AtomicUsize,
    pub sets: AtomicUsize,
    pub deletes: AtomicUsize,
    pub flushes: AtomicUsize,
    pub quits: AtomicUsize,
    pub pings: AtomicUsize,
    pub ttls: Mutex<Vec<Duration>>,
    pub delete_batches: Mutex<Vec<Vec<String>>>,
}

impl CallLog {
    pub fn total(&self) -> usize {
        self.gets.load(Ordering::SeqCst)
            + self.sets.load(Ordering::SeqCst)
            + self.deletes.load(Ordering::SeqCst)
            + self.flushes.load(Ordering::SeqCst)
            + self.quits.load(Ordering::SeqCst)
            + self.pings.load(Ordering::SeqCst)
    }
}

/// In-process store that records calls and can be told to fail
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    data: Arc<Mutex<HashMap<String, String>>>,
    calls: Arc<CallLog>,
    fail_operations: Arc<AtomicBool>,
    fail_quit: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn calls(&self) -> &CallLog {
        &self.calls
    }

    /// Write a raw value, bypassing the cache and the call log
    pub fn insert_raw(&self, key: &str, value: &str) {
        self.data.lock().insert(key.to_string(), value.to_string());
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.data.lock().get(key).cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.data.lock().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.data.lock().len()
    }

    pub fn fail_operations(&self, fail: bool) {
        self.fail_operations.store(fail, Ordering::SeqCst);
    }

    pub fn fail_quit(&self, fail: bool) {
        self.fail_quit.store(fail, Ordering::SeqCst);
    }

    fn check(&self, command: &str) -> CacheResult<()> {
        if self.fail_operations.load(Ordering::SeqCst) {
            return Err(CacheError::Backend(format!("{command} failed: injected failure")));
        }
        Ok(())
    }
}

impl CacheStore for MemoryStore {
    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        self.calls.gets.fetch_add(1, Ordering::SeqCst);
        self.check("GET")?;
        Ok(self.data.lock().get(key).cloned())
    }

    async fn set_with_expiry(&self, key: &str, value: &str, ttl: Duration) -> CacheResult<()> {
        self.calls.sets.fetch_add(1, Ordering::SeqCst);
        self.check("SET")?;
        self.calls.ttls.lock().push(ttl);
        self.data.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn delete_many(&self, keys: &[String]) -> CacheResult<u64> {
        self.calls.deletes.fetch_add(1, Ordering::SeqCst);
        self.check("DEL")?;
        self.calls.delete_batches.lock().push(keys.to_vec());
        let mut data = self.data.lock();
        Ok(keys.iter().filter(|key| data.remove(*key).is_some()).count() as u64)
    }

    async fn flush(&self) -> CacheResult<()> {
        self.calls.flushes.fetch_add(1, Ordering::SeqCst);
        self.check("FLUSHDB")?;
        self.data.lock().clear();
        Ok(())
    }

    async fn quit(&self) -> CacheResult<()> {
        self.calls.quits.fetch_add(1, Ordering::SeqCst);
        if self.fail_quit.load(Ordering::SeqCst) {
            return Err(CacheError::Disconnect("QUIT failed: injected failure".to_string()));
        }
        Ok(())
    }

    async fn health_check(&self) -> CacheResult<bool> {
        self.calls.pings.fetch_add(1, Ordering::SeqCst);
        self.check("PING")?;
        Ok(true)
    }

    fn provider_name(&self) -> &'static str {
        "memory"
    }
}

/// Driver handing out clones of one shared `MemoryStore`
#[derive(Debug, Clone, Default)]
pub struct MemoryDriver {
    store: MemoryStore,
    opens: Arc<AtomicUsize>,
    opened_topologies: Arc<Mutex<Vec<&'static str>>>,
    fail_open: Arc<AtomicBool>,
    missing_driver: Arc<AtomicBool>,
}

impl MemoryDriver {
    pub fn store(&self) -> &MemoryStore {
        &self.store
    }

    pub fn opens(&self) -> usize {
        self.opens.load(Ordering::SeqCst)
    }

    pub fn opened_topologies(&self) -> Vec<&'static str> {
        self.opened_topologies.lock().clone()
    }

    pub fn fail_open(&self, fail: bool) {
        self.fail_open.store(fail, Ordering::SeqCst);
    }

    /// Behave like a build without the client for every topology
    pub fn without_driver(&self, missing: bool) {
        self.missing_driver.store(missing, Ordering::SeqCst);
    }
}

impl BackendDriver for MemoryDriver {
    type Store = MemoryStore;

    async fn open(&self, topology: &ResolvedTopology) -> CacheResult<MemoryStore> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        if self.missing_driver.load(Ordering::SeqCst) {
            return Err(CacheError::MissingDependency {
                topology: topology.name(),
                feature: "memory-driver",
            });
        }
        if self.fail_open.load(Ordering::SeqCst) {
            return Err(CacheError::Connection("connection refused".to_string()));
        }
        self.opened_topologies.lock().push(topology.name());
        Ok(self.store.clone())
    }
}

/// Fixed starting instant for deterministic clocks
pub const T0: i64 = 1_700_000_000_000;

/// Engine over a fresh memory driver and a manual clock, not yet connected
pub fn memory_engine() -> (
    QueryResultCacheEngine<MemoryDriver>,
    MemoryDriver,
    Arc<ManualClock>,
) {
    memory_engine_with(BackendConfig::default())
}

pub fn memory_engine_with(
    backend: BackendConfig,
) -> (
    QueryResultCacheEngine<MemoryDriver>,
    MemoryDriver,
    Arc<ManualClock>,
) {
    let driver = MemoryDriver::default();
    let clock = Arc::new(ManualClock::new(T0));
    let engine =
        QueryResultCacheEngine::with_driver(backend, driver.clone()).with_clock(clock.clone());
    (engine, driver, clock)
}

/// Connected engine over a fresh memory driver
pub async fn connected_memory_engine() -> (
    QueryResultCacheEngine<MemoryDriver>,
    MemoryDriver,
    Arc<ManualClock>,
) {
    let (engine, driver, clock) = memory_engine();
    engine.connect().await.expect("memory driver connects");
    (engine, driver, clock)
}
