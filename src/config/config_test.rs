use std::{error::Error, time::Duration};

use crate::config::{Config, LoadError};

#[test]
fn test_empty_document_uses_defaults() -> Result<(), Box<dyn Error>> {
    let config = Config::from_yaml("{}".to_string())?;
    assert_eq!(config, Config::default());
    assert_eq!(config.poll_timeout(), Duration::from_millis(1000));
    assert_eq!(config.macro_delay(), Duration::from_millis(150));
    assert!(config.rumble);
    assert!(!config.hotplug);
    Ok(())
}

#[test]
fn test_partial_document() -> Result<(), Box<dyn Error>> {
    let yaml = r#"
hotplug: true
macro_delay_ms: 200
input_dir: /tmp/input
"#;
    let config = Config::from_yaml(yaml.to_string())?;
    assert!(config.hotplug);
    assert_eq!(config.macro_delay(), Duration::from_millis(200));
    assert_eq!(config.input_dir, "/tmp/input");
    assert_eq!(config.hidraw_dir, "/dev");
    assert_eq!(config.poll_timeout_ms, 1000);
    Ok(())
}

#[test]
fn test_invalid_document() {
    let result = Config::from_yaml("poll_timeout_ms: soon".to_string());
    assert!(matches!(result, Err(LoadError::DeserializeError(_))));
}

#[test]
fn test_missing_file() {
    let result = Config::load(Some("/nonexistent/padbridge.yaml"));
    assert!(matches!(result, Err(LoadError::IoError(_))));
}
