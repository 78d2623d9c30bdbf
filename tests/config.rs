mod common;

use reactive_ecs::engine::config::{ECSConfig, StageDedup};
use reactive_ecs::engine::error::{ECSError, ECSResult};
use reactive_ecs::engine::manager::ECSManager;

use common::*;

#[test]
fn default_config_deduplicates_and_warns() {
    let config = ECSConfig::default();
    assert_eq!(config.stage_dedup, StageDedup::Deduplicate);
    assert!(config.usage_hints);
    assert_eq!(ECSManager::new().config(), &config);
}

#[test]
fn toml_overrides_and_missing_keys() -> ECSResult<()> {
    let config = ECSConfig::from_toml_str("stage_dedup = \"per_scene\"\n")?;
    assert_eq!(config.stage_dedup, StageDedup::PerScene);
    assert!(config.usage_hints);

    let quiet = ECSConfig::from_toml_str("usage_hints = false")?;
    assert_eq!(quiet, ECSConfig::new().with_usage_hints(false));

    assert_eq!(ECSConfig::from_toml_str("")?, ECSConfig::default());
    Ok(())
}

#[test]
fn malformed_toml_is_a_config_error() {
    let err = ECSConfig::from_toml_str("stage_dedup = \"sometimes\"").unwrap_err();
    assert!(matches!(err, ECSError::Config(_)));
}

#[test]
fn silenced_hints_are_still_counted() -> ECSResult<()> {
    init_tracing();
    let mut ecs = ECSManager::with_config(ECSConfig::new().with_usage_hints(false));
    let health = define_health(&mut ecs)?;
    let hp = ecs.instantiate(health)?;

    ecs.single_owner(hp)?;
    assert_eq!(ecs.usage_hints(), 1);
    Ok(())
}
