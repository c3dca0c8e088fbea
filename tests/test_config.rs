use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

use space_shooter::config::*;
use space_shooter::entities::ItemKind;
use space_shooter::error::GameError;

const TABLE: &str = r#"
stage_duration = 20.0

[stages.1.spawn]
meteor_interval = 0.8
item_interval = 4.0

[stages.1.spawn.item_weights]
shield = 2.0
Laser = 1.0
rocket = 5.0

[stages.2.spawn]
meteor_interval = 0.5
enemy_interval = 3.0

[stages.2.boss]
max_hp = 120
fire_interval = 2.5
bullet_pairs = 3
"#;

// ── Built-in table ────────────────────────────────────────────────────────────

#[test]
fn default_table_has_six_boss_stages() {
    let table = StageTable::default();
    assert_eq!(table.max_stage(), 6);
    assert_eq!(table.stage_duration(), DEFAULT_STAGE_DURATION);
    assert!((1..=6).all(|s| table.has_boss(s)));
    assert_eq!(table.boss_config(1).unwrap().max_hp, 40);
    assert_eq!(table.boss_config(6).unwrap().bullet_pairs, 4);
    assert!(table.get(1).unwrap().spawn.enemy_interval.is_none());
    assert_eq!(table.get(6).unwrap().spawn.enemy_interval, Some(3.0));
}

#[test]
fn missing_stage_falls_back_to_defaults() {
    let table = StageTable::default();
    let resolved = table.spawn_config(99);
    assert!(resolved.is_default());
    assert_eq!(resolved.into_inner(), SpawnConfig::default());

    assert!(!table.spawn_config(2).is_default());
    assert!(table.get(0).is_none());
}

// ── Spawn records ─────────────────────────────────────────────────────────────

#[test]
fn weights_drop_non_positive_entries() {
    let config = SpawnConfig::default()
        .with_weights(&[(ItemKind::Shield, 0.0), (ItemKind::Laser, -1.0), (ItemKind::Speed, 2.0)]);
    assert_eq!(config.item_weights, vec![(ItemKind::Speed, 2.0)]);
}

#[test]
fn empty_weights_fall_back_to_single_drone() {
    let config = SpawnConfig::default().with_weights(&[]);
    assert_eq!(config.item_weights, vec![(ItemKind::Single, 1.0)]);
}

// ── TOML ──────────────────────────────────────────────────────────────────────

#[test]
fn parses_stage_table_from_toml() {
    let table = StageTable::from_toml_str(TABLE).unwrap();
    assert_eq!(table.max_stage(), 2);
    assert_eq!(table.stage_duration(), 20.0);

    let first = table.get(1).unwrap();
    assert_eq!(first.spawn.meteor_interval, 0.8);
    assert!(first.boss.is_none());
    // BTreeMap order; the unknown "rocket" entry is skipped.
    assert_eq!(
        first.spawn.item_weights,
        vec![(ItemKind::Laser, 1.0), (ItemKind::Shield, 2.0)]
    );

    let second = table.get(2).unwrap();
    assert_eq!(second.spawn.item_interval, SpawnConfig::default().item_interval);
    assert_eq!(second.spawn.enemy_interval, Some(3.0));
    assert_eq!(
        second.boss,
        Some(BossConfig { max_hp: 120, fire_interval: 2.5, bullet_pairs: 3 })
    );
}

#[test]
fn duration_defaults_when_omitted() {
    let table = StageTable::from_toml_str("[stages.1.spawn]\nmeteor_interval = 1.0\n").unwrap();
    assert_eq!(table.stage_duration(), DEFAULT_STAGE_DURATION);
}

#[test]
fn gap_in_stage_numbers_is_rejected() {
    let text = "[stages.1.spawn]\n[stages.3.spawn]\n";
    let err = StageTable::from_toml_str(text).unwrap_err();
    assert!(matches!(err, GameError::InvalidStageTable(_)));
}

#[test]
fn non_numeric_stage_key_is_rejected() {
    let err = StageTable::from_toml_str("[stages.first.spawn]\n").unwrap_err();
    assert!(matches!(err, GameError::InvalidStageTable(_)));
}

#[test]
fn malformed_toml_is_a_parse_error() {
    let err = StageTable::from_toml_str("stages = [").unwrap_err();
    assert!(matches!(err, GameError::ConfigParse(_)));
}

#[test]
fn missing_file_reports_path() {
    let err = StageTable::load(Path::new("/definitely/not/here.toml")).unwrap_err();
    match err {
        GameError::ConfigIo { path, .. } => assert_eq!(path, Path::new("/definitely/not/here.toml")),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn table_needs_stages_and_positive_duration() {
    assert!(StageTable::new(Vec::new(), 30.0).is_err());
    let stage = StageConfig { spawn: SpawnConfig::default(), boss: None };
    assert!(StageTable::new(vec![stage.clone()], 0.0).is_err());

    let mut numbered = BTreeMap::new();
    numbered.insert(2, stage);
    assert!(StageTable::from_numbered(numbered, 30.0).is_err());
}

// ── Item names ────────────────────────────────────────────────────────────────

#[test]
fn item_kinds_parse_case_insensitively() {
    assert_eq!(ItemKind::from_str("Buckshot").unwrap(), ItemKind::Buckshot);
    assert_eq!(ItemKind::from_str(" speed ").unwrap(), ItemKind::Speed);
    assert!(matches!(
        ItemKind::from_str("rocket"),
        Err(GameError::UnknownItemKind(_))
    ));
    assert_eq!(ItemKind::Double.to_string(), "double");
}
