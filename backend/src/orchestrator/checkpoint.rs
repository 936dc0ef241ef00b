//! Checkpoint - Save/Load World State
//!
//! Serializes a complete world (agents, ledger, metrics history, config and
//! generator position) so a run can be paused and resumed. Resuming from a
//! checkpoint and stepping gives the same result as never having stopped.
//!
//! # Critical Invariants
//!
//! - **Determinism**: the generator position travels with the state
//! - **Config Matching**: a checkpoint only loads against the config it was
//!   taken with (SHA-256 of the canonical config JSON)
//! - **Exact Floats**: `serde_json` is built with `float_roundtrip`

use crate::models::config::ExperimentConfig;
use crate::models::state::WorldState;
use crate::orchestrator::SimulationError;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

/// Serialized form of a saved run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Tick of the saved state
    pub tick: u64,

    /// SHA256 hash of the state's config (for validation)
    pub config_hash: String,

    pub state: WorldState,
}

/// SHA-256 fingerprint of an experiment config, as lowercase hex
///
/// The config goes through `serde_json::Value` first. Its objects keep keys
/// sorted (the workspace does not enable `preserve_order`), so equal configs
/// always produce the same bytes whatever their map insertion order.
pub fn compute_config_hash(config: &ExperimentConfig) -> Result<String, SimulationError> {
    let canonical = serde_json::to_value(config)
        .and_then(|value| serde_json::to_vec(&value))
        .map_err(|e| {
            SimulationError::Serialization(format!("config {} not hashable: {}", config.id, e))
        })?;

    Ok(format!("{:x}", Sha256::digest(&canonical)))
}

/// Serialize `state` into a checkpoint document
pub fn save(state: &WorldState) -> Result<String, SimulationError> {
    let checkpoint = Checkpoint {
        tick: state.tick(),
        config_hash: compute_config_hash(state.config())?,
        state: state.clone(),
    };
    let json = serde_json::to_string(&checkpoint)
        .map_err(|e| SimulationError::Serialization(format!("Checkpoint save failed: {}", e)))?;
    debug!(tick = checkpoint.tick, bytes = json.len(), "checkpoint saved");
    Ok(json)
}

/// Restore a state, checking the checkpoint against its own config
pub fn load(json: &str) -> Result<WorldState, SimulationError> {
    let checkpoint: Checkpoint = serde_json::from_str(json)
        .map_err(|e| SimulationError::Serialization(format!("Checkpoint load failed: {}", e)))?;
    validate_checkpoint(&checkpoint)?;
    Ok(checkpoint.state)
}

/// Restore a state that must have been taken with `config`
///
/// # Errors
///
/// `SimulationError::ConfigMismatch` if the checkpoint was taken with a
/// different configuration.
pub fn load_for(json: &str, config: &ExperimentConfig) -> Result<WorldState, SimulationError> {
    let state = load(json)?;
    let expected = compute_config_hash(state.config())?;
    let found = compute_config_hash(config)?;
    if expected != found {
        return Err(SimulationError::ConfigMismatch { expected, found });
    }
    Ok(state)
}

/// Check the envelope agrees with the state it carries
pub fn validate_checkpoint(checkpoint: &Checkpoint) -> Result<(), SimulationError> {
    let actual_hash = compute_config_hash(checkpoint.state.config())?;
    if actual_hash != checkpoint.config_hash {
        return Err(SimulationError::ConfigMismatch {
            expected: checkpoint.config_hash.clone(),
            found: actual_hash,
        });
    }

    if checkpoint.tick != checkpoint.state.tick() {
        return Err(SimulationError::Serialization(format!(
            "Checkpoint tick {} does not match state tick {}",
            checkpoint.tick,
            checkpoint.state.tick()
        )));
    }

    let mismatched_id = checkpoint
        .state
        .agents()
        .iter()
        .find(|(key, agent)| key.as_str() != agent.id());
    if let Some((key, agent)) = mismatched_id {
        return Err(SimulationError::Serialization(format!(
            "Agent stored under '{}' has id '{}'",
            key,
            agent.id()
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::init::initialize;

    #[test]
    fn test_config_hash_is_stable_hex() {
        let config = ExperimentConfig::default();
        let hash = compute_config_hash(&config).unwrap();

        assert_eq!(hash, compute_config_hash(&config.clone()).unwrap());
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_config_hash_ignores_institution_listing_order() {
        let a = ExperimentConfig::bare("order", 1)
            .with_institution("wealth_tax")
            .with_institution("income_tax_flat");
        let b = ExperimentConfig::bare("order", 1)
            .with_institution("income_tax_flat")
            .with_institution("wealth_tax");

        assert_eq!(compute_config_hash(&a).unwrap(), compute_config_hash(&b).unwrap());
    }

    #[test]
    fn test_config_hash_tracks_seed() {
        let config1 = ExperimentConfig::default();
        let mut config2 = ExperimentConfig::default();
        config2.seed += 1;

        assert_ne!(
            compute_config_hash(&config1).unwrap(),
            compute_config_hash(&config2).unwrap()
        );
    }

    #[test]
    fn test_tampered_config_rejected() {
        let state = initialize(ExperimentConfig::default()).unwrap();
        let json = save(&state).unwrap();

        let mut value: serde_json::Value = serde_json::from_str(&json).unwrap();
        value["state"]["config"]["seed"] = serde_json::json!(1);
        let tampered = serde_json::to_string(&value).unwrap();

        assert!(matches!(
            load(&tampered),
            Err(SimulationError::ConfigMismatch { .. })
        ));
    }

    #[test]
    fn test_garbage_is_serialization_error() {
        assert!(matches!(
            load("not json"),
            Err(SimulationError::Serialization(_))
        ));
    }
}
