//! Grading scales offered by the service, loaded once per session.

use std::collections::HashSet;

use shared::domain::{GradingScale, ScaleKey};
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryStatus {
    Loading,
    Ready,
    Unavailable(String),
}

#[derive(Debug, Clone)]
pub struct ScaleRegistry {
    scales: Vec<GradingScale>,
    status: RegistryStatus,
}

impl Default for ScaleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ScaleRegistry {
    pub fn new() -> Self {
        Self {
            scales: Vec::new(),
            status: RegistryStatus::Loading,
        }
    }

    /// Records the outcome of the startup load. Returns `false` when a load
    /// outcome was already recorded, in which case nothing changes.
    pub fn record_load(&mut self, outcome: Result<Vec<GradingScale>, String>) -> bool {
        if self.status != RegistryStatus::Loading {
            warn!("scale registry: ignoring repeated load outcome");
            return false;
        }
        match outcome {
            Ok(scales) => {
                let mut seen = HashSet::new();
                self.scales = scales
                    .into_iter()
                    .filter(|scale| {
                        let fresh = seen.insert(scale.key.clone());
                        if !fresh {
                            warn!(key = %scale.key, "scale registry: duplicate scale key dropped");
                        }
                        fresh
                    })
                    .collect();
                self.status = RegistryStatus::Ready;
            }
            Err(message) => {
                self.scales.clear();
                self.status = RegistryStatus::Unavailable(message);
            }
        }
        true
    }

    pub fn status(&self) -> &RegistryStatus {
        &self.status
    }

    pub fn is_ready(&self) -> bool {
        self.status == RegistryStatus::Ready
    }

    pub fn get(&self, key: &ScaleKey) -> Option<&GradingScale> {
        self.scales.iter().find(|scale| &scale.key == key)
    }

    /// Scales in the order the service listed them.
    pub fn all(&self) -> &[GradingScale] {
        &self.scales
    }
}
