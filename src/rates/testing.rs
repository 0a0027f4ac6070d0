//! In-memory rate source and store fakes for tests.
//!
//! `ScriptedSource` records every pivot it is asked for, which lets tests assert that
//! the cache suppressed network traffic and that the fetch cascade ran in order.

use crate::rates::{CachedRates, RateMatrix, RateSource, RateStore};
use crate::Result;
use anyhow::bail;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// A `RateSource` that answers from a scripted pivot -> matrix map and records calls.
/// Pivots with no scripted response fail, standing in for network or tier errors.
#[derive(Default)]
pub(crate) struct ScriptedSource {
    responses: Mutex<HashMap<String, RateMatrix>>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl ScriptedSource {
    pub(crate) fn respond(&self, pivot: &str, matrix: RateMatrix) {
        self.responses
            .lock()
            .unwrap()
            .insert(pivot.to_string(), matrix);
    }

    /// The pivots requested so far, in order.
    pub(crate) fn calls(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.calls)
    }
}

#[async_trait::async_trait]
impl RateSource for ScriptedSource {
    async fn latest(&self, pivot: &str) -> Result<RateMatrix> {
        self.calls.lock().unwrap().push(pivot.to_string());
        match self.responses.lock().unwrap().get(pivot) {
            Some(matrix) => Ok(matrix.clone()),
            None => bail!("scripted failure for pivot {pivot}"),
        }
    }
}

/// A `RateStore` backed by a `HashMap`.
#[derive(Default)]
pub(crate) struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, CachedRates>>>,
}

impl MemoryStore {
    /// Seed an entry with an explicit fetch time, for freshness tests.
    pub(crate) async fn seed(&self, matrix: RateMatrix, fetched_at_ms: i64) {
        self.entries.lock().unwrap().insert(
            matrix.pivot().to_string(),
            CachedRates {
                matrix,
                fetched_at_ms,
            },
        );
    }

    pub(crate) fn entries(&self) -> Arc<Mutex<HashMap<String, CachedRates>>> {
        Arc::clone(&self.entries)
    }
}

#[async_trait::async_trait]
impl RateStore for MemoryStore {
    async fn get(&self, pivot: &str) -> Result<Option<CachedRates>> {
        Ok(self.entries.lock().unwrap().get(pivot).cloned())
    }

    async fn put(&self, matrix: &RateMatrix, fetched_at_ms: i64) -> Result<()> {
        self.entries.lock().unwrap().insert(
            matrix.pivot().to_string(),
            CachedRates {
                matrix: matrix.clone(),
                fetched_at_ms,
            },
        );
        Ok(())
    }
}
