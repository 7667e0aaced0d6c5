//! Many tracked objects over one shared road network.
//!
//! Each object owns its own [`PredictiveForest`]; the network is built once
//! and only read. Different objects can be observed from different threads
//! at the same time, while calls for the same object are serialized by that
//! object's mutex. The object map lock is only held to look up or insert a
//! forest handle, never while a forest is being updated or read.

use crate::config::Config;
use crate::error::{ForestError, Result};
use crate::forest::{ForestStats, PredictionMode, PredictiveForest};
use crate::network::RoadNetwork;
use parking_lot::{Mutex, RwLock};
use reachforest_types::{NodeId, ObjectId, Region};
use rustc_hash::FxHashMap;
use std::sync::Arc;

#[derive(Debug)]
pub struct ObjectTracker {
    network: Arc<RoadNetwork>,
    config: Config,
    forests: RwLock<FxHashMap<ObjectId, Arc<Mutex<PredictiveForest>>>>,
}

impl ObjectTracker {
    /// Create a tracker, validating `config` first.
    pub fn new(network: Arc<RoadNetwork>, config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            network,
            config,
            forests: RwLock::new(FxHashMap::default()),
        })
    }

    pub fn network(&self) -> &Arc<RoadNetwork> {
        &self.network
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Feed a new region for `object`, creating its forest on first sight.
    pub fn observe(&self, object: ObjectId, region: Region) -> Result<PredictionMode> {
        if !region.is_valid() {
            return Err(ForestError::InvalidInput(format!(
                "invalid region for object {object}: {region:?}"
            )));
        }

        let forest = match self.forest(object) {
            Some(forest) => forest,
            None => self
                .forests
                .write()
                .entry(object)
                .or_insert_with(|| {
                    log::debug!("Tracking object {object}");
                    Arc::new(Mutex::new(PredictiveForest::new(
                        self.network.clone(),
                        &self.config,
                    )))
                })
                .clone(),
        };
        // The map lock is already released here, only this object's mutex is held
        let mut guard = forest.lock();
        guard.predict(region)
    }

    /// Observe a raw position using the configured neighbor radius.
    pub fn observe_at(&self, object: ObjectId, lat: f64, lon: f64) -> Result<PredictionMode> {
        self.observe(object, Region::around(lat, lon, self.config.neighbor_radius_km))
    }

    /// Stop tracking `object`. Returns whether it was tracked.
    pub fn forget(&self, object: ObjectId) -> bool {
        self.forests.write().remove(&object).is_some()
    }

    /// Clear `object`'s forest and history but keep tracking it.
    pub fn reset(&self, object: ObjectId) -> bool {
        self.with_forest_mut(object, PredictiveForest::clear).is_some()
    }

    /// Probability of `node` for `object`, 0 when either is unknown.
    pub fn probability(&self, object: ObjectId, node: NodeId) -> f64 {
        self.with_forest(object, |forest| forest.probability(node))
            .unwrap_or(0.0)
    }

    /// One-step probability of `node` for `object`.
    pub fn next_step(&self, object: ObjectId, node: NodeId) -> Option<f64> {
        self.with_forest(object, |forest| forest.next_step(node))
            .flatten()
    }

    /// Current roots of `object`'s forest, empty when untracked.
    pub fn roots(&self, object: ObjectId) -> Vec<NodeId> {
        self.with_forest(object, PredictiveForest::root_ids)
            .unwrap_or_default()
    }

    pub fn stats(&self, object: ObjectId) -> Option<ForestStats> {
        self.with_forest(object, PredictiveForest::stats)
    }

    /// Number of tracked objects.
    pub fn tracked(&self) -> usize {
        self.forests.read().len()
    }

    /// Run `f` on `object`'s forest while holding its lock.
    pub fn with_forest<R>(
        &self,
        object: ObjectId,
        f: impl FnOnce(&PredictiveForest) -> R,
    ) -> Option<R> {
        let forest = self.forest(object)?;
        let guard = forest.lock();
        Some(f(&guard))
    }

    fn with_forest_mut<R>(
        &self,
        object: ObjectId,
        f: impl FnOnce(&mut PredictiveForest) -> R,
    ) -> Option<R> {
        let forest = self.forest(object)?;
        let mut guard = forest.lock();
        Some(f(&mut guard))
    }

    fn forest(&self, object: ObjectId) -> Option<Arc<Mutex<PredictiveForest>>> {
        self.forests.read().get(&object).cloned()
    }
}
