//! Registered registration approaches.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use track4d_core::{Result, Track4dError};

use crate::engine::{EngineSettings, LandmarkRbfEngine, RegistrationEngine, TranslationIcpEngine};

/// How an approach uses the landmark set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Strategy {
    /// The landmarks guide the fit; they are control points.
    MarkerGuided,
    /// The fit uses geometry only; the landmarks are held out.
    MarkerFree,
}

impl Strategy {
    /// Whether the engine is given the landmark set before fitting.
    pub fn uses_landmarks(self) -> bool {
        matches!(self, Self::MarkerGuided)
    }
}

/// Builds an engine from its settings.
pub type EngineFactory = fn(EngineSettings) -> Box<dyn RegistrationEngine>;

/// A named registration approach.
#[derive(Clone)]
pub struct Approach {
    pub name: String,
    pub strategy: Strategy,
    pub enable_rigid: bool,
    pub enable_nonrigid: bool,
    factory: EngineFactory,
}

impl Approach {
    /// Creates an approach.
    pub fn new(
        name: impl Into<String>,
        strategy: Strategy,
        enable_rigid: bool,
        enable_nonrigid: bool,
        factory: EngineFactory,
    ) -> Self {
        Self {
            name: name.into(),
            strategy,
            enable_rigid,
            enable_nonrigid,
            factory,
        }
    }

    /// Builds a fresh engine for a sequence sampled at `sampling_rate`.
    pub fn build_engine(&self, sampling_rate: f64) -> Box<dyn RegistrationEngine> {
        (self.factory)(EngineSettings {
            sampling_rate,
            enable_rigid: self.enable_rigid,
            enable_nonrigid: self.enable_nonrigid,
        })
    }
}

impl std::fmt::Debug for Approach {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Approach")
            .field("name", &self.name)
            .field("strategy", &self.strategy)
            .field("enable_rigid", &self.enable_rigid)
            .field("enable_nonrigid", &self.enable_nonrigid)
            .finish_non_exhaustive()
    }
}

/// Table of the approaches a run can select by name.
#[derive(Debug, Clone, Default)]
pub struct ApproachTable {
    approaches: BTreeMap<String, Approach>,
}

impl ApproachTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a table holding the built-in approaches.
    ///
    /// - `rbf`: marker-guided Gaussian RBF interpolation of landmark motion
    /// - `icp`: marker-free translation ICP with local residual correction
    pub fn with_defaults() -> Self {
        let mut table = Self::new();
        table.register(Approach::new(
            "rbf",
            Strategy::MarkerGuided,
            false,
            true,
            |settings| Box::new(LandmarkRbfEngine::new(settings)),
        ));
        table.register(Approach::new(
            "icp",
            Strategy::MarkerFree,
            true,
            true,
            |settings| Box::new(TranslationIcpEngine::new(settings)),
        ));
        table
    }

    /// Registers an approach, replacing any approach of the same name.
    pub fn register(&mut self, approach: Approach) {
        log::debug!("registered approach '{}' ({:?})", approach.name, approach.strategy);
        self.approaches.insert(approach.name.clone(), approach);
    }

    /// Looks up an approach by name.
    pub fn resolve(&self, name: &str) -> Result<&Approach> {
        self.approaches
            .get(name)
            .ok_or_else(|| Track4dError::UnknownApproach(name.to_string()))
    }

    /// Names of every registered approach, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.approaches.keys().map(String::as_str)
    }
}
