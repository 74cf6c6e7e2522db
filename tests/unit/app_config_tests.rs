/*!
 * Tests for configuration loading and saving
 */

use anyhow::Result;
use serde_json::json;

use subtrans::app_config::{Config, Engine, OutputFormat};
use subtrans::errors::ConfigError;
use subtrans::formats::FormatKind;
use crate::common;

#[test]
fn test_saveThenLoad_shouldPreserveSettingsAndUnknownKeys() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("subtrans.json");

    let mut config = Config::default();
    config.default_target_language = "fr".to_string();
    config.translation_engine = Engine::LMStudio;
    config.set("ui_theme", json!("dark"))?;
    config.save(&path)?;

    let loaded = Config::try_load(&path)?;
    assert_eq!(loaded, config);
    assert_eq!(loaded.get("ui_theme"), Some(json!("dark")));
    Ok(())
}

#[test]
fn test_load_withMissingFile_shouldReturnDefaults() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let config = Config::load(temp_dir.path().join("absent.json"));
    assert_eq!(config, Config::default());
    Ok(())
}

#[test]
fn test_load_withMalformedFile_shouldFallBackToDefaults() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "broken.json", "{ not json")?;

    assert!(matches!(Config::try_load(&path), Err(ConfigError::Parse { .. })));
    assert_eq!(Config::load(&path), Config::default());
    Ok(())
}

#[test]
fn test_load_withPartialFile_shouldMergeOverDefaults() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(
        temp_dir.path(),
        "partial.json",
        r#"{"default_target_language": "de", "output_format": "vtt", "max_retries": 5}"#,
    )?;

    let config = Config::load(&path);
    assert_eq!(config.default_target_language, "de");
    assert_eq!(config.output_format, OutputFormat::Vtt);
    assert_eq!(config.output_format.format_kind(), Some(FormatKind::Vtt));
    assert_eq!(config.max_retries, 5);
    assert_eq!(config.concurrent_files, Config::default().concurrent_files);
    Ok(())
}

#[test]
fn test_validate_withAutoTarget_shouldFail() {
    let config = Config {
        default_target_language: "auto".to_string(),
        ..Config::default()
    };
    assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
}

#[test]
fn test_validate_withOpenAiAndNoKey_shouldFail() {
    let mut config = Config {
        translation_engine: Engine::OpenAI,
        ..Config::default()
    };
    assert!(config.validate().is_err());

    config.openai_api_key = "sk-test".to_string();
    assert!(config.validate().is_ok());
}

#[test]
fn test_resetToDefaults_shouldDropOverrides() {
    let mut config = Config {
        default_target_language: "es".to_string(),
        create_backup: false,
        ..Config::default()
    };
    config.reset_to_defaults();
    assert_eq!(config, Config::default());
}

#[test]
fn test_engine_fromStr_shouldAcceptKnownNames() {
    assert_eq!("ollama".parse::<Engine>().unwrap(), Engine::Ollama);
    assert_eq!("lmstudio".parse::<Engine>().unwrap(), Engine::LMStudio);
    assert!("anthropic".parse::<Engine>().is_err());
}
