use dupedetector::config::{Config, ConfigError};
use dupedetector::duplicates::KeepStrategy;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

#[test]
fn test_config_load_defaults() {
    // Use figment directly without Env to avoid interference from other tests
    let figment = Figment::from(Serialized::defaults(Config::default()));
    let config: Config = figment.extract().unwrap();
    assert_eq!(config, Config::default());
    assert_eq!(config.workers, 0);
}

#[test]
fn test_config_load_from_toml() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");

    let toml_content = r#"
min_size = 4096
exclude = ["target", ".git"]
keep = "oldest"
workers = 8
trash_dir = "/tmp/dupes"
paranoid = true
"#;
    fs::write(&config_path, toml_content).unwrap();

    let config = Config::load(Some(&config_path)).unwrap();

    assert_eq!(config.min_size, 4096);
    assert_eq!(config.exclude, vec!["target", ".git"]);
    assert_eq!(config.keep_strategy().unwrap(), KeepStrategy::Oldest);
    assert_eq!(config.workers, 8);
    assert_eq!(config.trash_dir, PathBuf::from("/tmp/dupes"));
    assert!(config.paranoid);
}

#[test]
fn test_partial_toml_keeps_other_defaults() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "keep = \"newest\"\n").unwrap();

    let figment =
        Figment::from(Serialized::defaults(Config::default())).merge(Toml::file(&config_path));
    let config: Config = figment.extract().unwrap();

    assert_eq!(config.keep, "newest");
    assert_eq!(config.min_size, 1024);
    assert_eq!(config.exclude, Config::default().exclude);
}

#[test]
fn test_env_overrides_toml() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "keep = \"oldest\"\n").unwrap();

    // A prefix of its own so parallel tests reading DUPEDETECTOR_* are unaffected.
    std::env::set_var("DUPEDETECTOR_TEST_ENV_KEEP", "longest");
    let figment = Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(&config_path))
        .merge(Env::prefixed("DUPEDETECTOR_TEST_ENV_"));
    let config: Config = figment.extract().unwrap();
    std::env::remove_var("DUPEDETECTOR_TEST_ENV_KEEP");

    assert_eq!(config.keep_strategy().unwrap(), KeepStrategy::Longest);
}

#[test]
fn test_unknown_keep_strategy_is_fatal() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "keep = \"largest\"\n").unwrap();

    let config = Config::load(Some(&config_path)).unwrap();
    assert!(matches!(
        config.keep_strategy(),
        Err(ConfigError::UnknownKeepStrategy(_))
    ));
}

#[test]
fn test_malformed_toml_is_error() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "min_size = \"lots\"\n").unwrap();

    assert!(matches!(
        Config::load(Some(&config_path)),
        Err(ConfigError::Load(_))
    ));
}
