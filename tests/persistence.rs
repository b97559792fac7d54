//! Persistence and recovery tests for voxroute.
//!
//! These tests verify that the pattern file and the assistant config survive
//! a save/reload cycle, and that a damaged pattern file is replaced with the
//! default table instead of failing startup.

use voxroute::config::AssistantConfig;
use voxroute::error::{ConfigError, PatternError};
use voxroute::nlu::{IntentEngine, IntentTable, PatternStore};
use voxroute::orchestrator::{Orchestrator, TurnStatus};
use voxroute::plugin::KeywordMatching;

#[test]
fn pattern_file_round_trips_exactly() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("patterns.json");
    let store = PatternStore::new(&path);

    let mut table = IntentTable::defaults();
    table.add_pattern("deploy", "배포").unwrap();
    store.save(&table).unwrap();
    let first = std::fs::read_to_string(&path).unwrap();

    let reloaded = store.try_load().unwrap();
    assert_eq!(reloaded, table);

    store.save(&reloaded).unwrap();
    let second = std::fs::read_to_string(&path).unwrap();
    assert_eq!(first, second);
}

#[test]
fn intent_order_survives_reload() {
    let dir = tempfile::TempDir::new().unwrap();
    let store = PatternStore::new(dir.path().join("patterns.json"));

    let mut table = IntentTable::new();
    for id in ["zulu", "alpha", "mike"] {
        table.add_pattern(id, id).unwrap();
    }
    store.save(&table).unwrap();

    let ids: Vec<String> = store
        .try_load()
        .unwrap()
        .iter()
        .map(|i| i.id.clone())
        .collect();
    assert_eq!(ids, ["zulu", "alpha", "mike"]);
}

#[test]
fn missing_pattern_file_is_seeded_with_defaults() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("nested").join("patterns.json");
    let store = PatternStore::new(&path);

    let table = store.load();
    assert_eq!(table, IntentTable::defaults());
    assert!(path.exists());
    assert_eq!(store.try_load().unwrap(), IntentTable::defaults());
}

#[test]
fn corrupt_pattern_file_is_replaced() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("patterns.json");
    std::fs::write(&path, "{ not json").unwrap();
    let store = PatternStore::new(&path);

    assert!(matches!(store.try_load(), Err(PatternError::Parse { .. })));

    let table = store.load();
    assert_eq!(table, IntentTable::defaults());
    assert_eq!(store.try_load().unwrap(), IntentTable::defaults());
}

#[test]
fn learned_patterns_survive_restart() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("patterns.json");

    {
        let mut engine = IntentEngine::with_store(PatternStore::new(&path), Some(0));
        engine.learn("sync", "올려줘").unwrap();
        engine.learn("weather", "날씨").unwrap();
    }

    let engine = IntentEngine::with_store(PatternStore::new(&path), Some(0));
    assert_eq!(engine.classify("올려줘").intent.as_deref(), Some("sync"));
    assert_eq!(engine.classify("날씨").intent.as_deref(), Some("weather"));
    let weather = engine.table().get("weather").unwrap();
    assert_eq!(weather.response_templates.len(), 1);
}

#[test]
fn invalid_learned_pattern_is_not_persisted() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("patterns.json");

    let mut engine = IntentEngine::with_store(PatternStore::new(&path), Some(0));
    let err = engine.learn("sync", "(unclosed").unwrap_err();
    assert!(matches!(err, PatternError::InvalidRegex { .. }));

    let on_disk = PatternStore::new(&path).try_load().unwrap();
    assert_eq!(on_disk, IntentTable::defaults());
}

#[test]
fn config_round_trips_through_toml() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("voxroute").join("config.toml");

    let config = AssistantConfig {
        confidence_threshold: 0.6,
        context_capacity: 8,
        response_seed: Some(99),
        keyword_matching: KeywordMatching::WordBoundary,
        ..Default::default()
    };
    config.save(&path).unwrap();

    let loaded = AssistantConfig::load(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn missing_config_yields_defaults() {
    let dir = tempfile::TempDir::new().unwrap();
    let config = AssistantConfig::load_or_default(&dir.path().join("absent.toml")).unwrap();
    assert_eq!(config, AssistantConfig::default());
}

#[test]
fn out_of_range_config_is_rejected() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "confidence_threshold = 1.5\n").unwrap();

    let err = AssistantConfig::load(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { .. }));
}

#[test]
fn assembled_assistant_seeds_its_pattern_file() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("patterns.json");
    let config = AssistantConfig {
        project_root: dir.path().to_path_buf(),
        response_seed: Some(1),
        ..Default::default()
    };

    let mut assistant = Orchestrator::from_config(&config, &path);
    assert!(path.exists());

    let turn = assistant.handle("상태 어때").unwrap();
    assert_eq!(turn.status, TurnStatus::Success);
    assert_eq!(turn.command.as_ref().unwrap().command_id, "status");
}
