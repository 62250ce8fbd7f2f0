//! Integration tests for loading configuration from YAML files

use recipe_api::config::{AppConfig, StorageBackend};
use recipe_api::core::error::ConfigError;
use recipe_api::server::ServerBuilder;
use std::io::Write;
use tempfile::NamedTempFile;

fn write_config(yaml: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(yaml.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn test_load_full_file() {
    let file = write_config(
        r#"
server:
  host: 127.0.0.1
  port: 8088
  api_prefix: /api/v2
pagination:
  page: 1
  limit: 25
  sort: title
  sort_type: dsc
auth:
  jwt_secret: file-secret
  token_ttl_minutes: 30
storage:
  backend: mongodb
  uri: mongodb://db:27017
  database: kitchen
"#,
    );

    let config = AppConfig::from_yaml_file(file.path().to_str().unwrap()).unwrap();

    assert_eq!(config.bind_address(), "127.0.0.1:8088");
    assert_eq!(config.server.api_prefix, "/api/v2");
    assert_eq!(config.pagination.limit, 25);
    assert_eq!(config.pagination.sort, "title");
    assert_eq!(config.pagination.sort_type, "dsc");
    assert_eq!(config.auth.token_ttl_minutes, 30);
    assert_eq!(config.storage.backend, StorageBackend::Mongodb);
    assert_eq!(config.storage.uri.as_deref(), Some("mongodb://db:27017"));
    assert_eq!(config.storage.database, "kitchen");
    assert!(config.validate().is_ok());
}

#[test]
fn test_sparse_file_keeps_defaults() {
    let file = write_config("pagination:\n  limit: 5\n");

    let config = AppConfig::from_yaml_file(file.path().to_str().unwrap()).unwrap();

    assert_eq!(config.pagination.limit, 5);
    assert_eq!(config.pagination.page, 1);
    assert_eq!(config.pagination.sort, "createdAt");
    assert_eq!(config.server.port, 3000);
    assert_eq!(config.storage.backend, StorageBackend::InMemory);
}

#[test]
fn test_parse_error_names_the_file() {
    let file = write_config("server: [unclosed\n");
    let path = file.path().to_str().unwrap().to_string();

    match AppConfig::from_yaml_file(&path) {
        Err(ConfigError::ParseError { file: Some(f), .. }) => assert_eq!(f, path),
        other => panic!("expected a parse error, got {:?}", other),
    }
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.yaml");

    let result = AppConfig::from_yaml_file(path.to_str().unwrap());
    assert!(matches!(result, Err(ConfigError::IoError { .. })));
}

#[test]
fn test_file_values_then_overrides_then_validation() {
    let file = write_config("auth:\n  jwt_secret: from-file\npagination:\n  limit: 7\n");
    let mut config = AppConfig::from_yaml_file(file.path().to_str().unwrap()).unwrap();

    config
        .apply_overrides(|key| match key {
            "PORT" => Some("9000".to_string()),
            "JWT_SECRET" => Some("from-env".to_string()),
            _ => None,
        })
        .unwrap();

    assert_eq!(config.server.port, 9000);
    assert_eq!(config.auth.jwt_secret, "from-env");
    assert_eq!(config.pagination.limit, 7);
    assert!(config.validate().is_ok());
}

#[test]
fn test_invalid_file_values_fail_validation() {
    let file = write_config("auth:\n  jwt_secret: s\npagination:\n  limit: 0\n");
    let config = AppConfig::from_yaml_file(file.path().to_str().unwrap()).unwrap();

    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidValue { .. })
    ));
}

#[test]
fn test_relative_api_prefix_is_rejected() {
    let file = write_config("server:\n  api_prefix: api\nauth:\n  jwt_secret: s\n");
    let config = AppConfig::from_yaml_file(file.path().to_str().unwrap()).unwrap();

    assert!(config.validate().is_err());
}

#[test]
fn test_token_ttl_out_of_range_is_rejected() {
    for ttl in ["9223372036854775807", "-600", "0"] {
        let file = write_config(&format!(
            "auth:\n  jwt_secret: s\n  token_ttl_minutes: {}\n",
            ttl
        ));
        let config = AppConfig::from_yaml_file(file.path().to_str().unwrap()).unwrap();

        match config.validate() {
            Err(ConfigError::InvalidValue { field, .. }) => {
                assert_eq!(field, "auth.token_ttl_minutes")
            }
            other => panic!("ttl {} should be rejected, got {:?}", ttl, other),
        }
        assert!(ServerBuilder::new().with_config(config).build().is_err());
    }
}
