//! Shipped battle descriptions under data/.

use melee_core::config::BattleConfig;

fn data_path(name: &str) -> String {
    format!("{}/../data/{name}", env!("CARGO_MANIFEST_DIR"))
}

#[test]
fn skirmish_file_matches_builtin_preset() {
    let cfg = BattleConfig::load(&data_path("skirmish.json")).expect("load skirmish");
    assert_eq!(cfg, BattleConfig::skirmish());
}

#[test]
fn ragdoll_file_loads_and_validates() {
    let cfg = BattleConfig::load(&data_path("ragdoll.json")).expect("load ragdoll");
    assert_eq!(cfg.man.count, 100);
    assert_eq!(cfg.gorilla.count, 1);
    assert_eq!(cfg.gorilla.stats.max_hp, 220.0);
    assert!((cfg.man.stats.cooldown_secs() - 0.6).abs() < 1e-12);
}

#[test]
fn missing_file_is_an_error() {
    let err = BattleConfig::load(&data_path("nope.json")).unwrap_err();
    assert!(err.to_string().contains("Cannot read"), "{err}");
}
