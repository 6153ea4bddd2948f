use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

use mapchat::backend::HttpBackend;
use mapchat::config::BackendConfig;

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}

/// HTTP backend pointed at a mock server
#[allow(dead_code)]
pub fn backend_for(base_url: &str) -> HttpBackend {
    let config = BackendConfig {
        base_url: base_url.to_string(),
        timeout_seconds: 5,
        ..Default::default()
    };
    HttpBackend::new(&config).expect("failed to build backend")
}
