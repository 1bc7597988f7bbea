use cfgd_logger::{LevelFilter, Logger};
use serial_test::serial;
use std::time::Duration;

#[test]
#[serial]
fn file_layer_creates_directory_and_log_file() {
    let tmp = tempfile::tempdir().expect("temp dir");
    let dir = tmp.path().join("logs");

    let logger = Logger::builder()
        .name("cfgd-file-test")
        .console(false)
        .file(&dir)
        .json(true)
        .level(LevelFilter::INFO)
        .init()
        .expect("logger should initialize");

    tracing::info!(config = "alpha", "property changed");
    std::thread::sleep(Duration::from_millis(50));

    assert!(logger.has_file_output());
    assert!(dir.exists(), "log directory should be created");

    drop(logger);
    let has_log = std::fs::read_dir(&dir)
        .expect("read log dir")
        .flatten()
        .any(|entry| entry.path().extension().and_then(|e| e.to_str()) == Some("log"));
    assert!(has_log, "a .log file should exist");
}
