mod common;

use common::{entries, new_log, run, test_case};
use std::fs;
use trellis::{
    config::{Config, Order, Parallel},
    errors::Error,
};

fn write_config(dir: &tempfile::TempDir, body: &str) {
    let contents = format!("ver = \"{}\"\n{}", env!("CARGO_PKG_VERSION"), body);
    fs::write(dir.path().join("trellis.toml"), contents).unwrap();
}

#[test]
fn reads_configuration_from_directory() {
    let dir = tempfile::tempdir().unwrap();
    write_config(
        &dir,
        "include = \"Calc\"\n\
         order = \"reverse-name\"\n\
         parallel = \"methods\"\n\
         jobs = 2\n",
    );
    let config = Config::from_path(dir.path()).unwrap();
    assert_eq!(config.order, Order::ReverseName);
    assert_eq!(config.parallel, Parallel::Methods);
    assert_eq!(config.jobs, Some(2));
}

#[test]
fn configured_request_filters_and_orders() {
    let dir = tempfile::tempdir().unwrap();
    write_config(&dir, "exclude = \"slow\"\norder = \"name\"\n");
    let config = Config::from_path(dir.path()).unwrap();

    let log = new_log();
    let request = config
        .request(vec![
            test_case("Calc", &["mul", "add", "slow_div"], &log),
            test_case("Alpha", &["b", "a"], &log),
        ])
        .unwrap();
    let result = run(request.get_runner());

    assert_eq!(entries(&log), ["a", "b", "add", "mul"]);
    assert_eq!(result.run_count(), 4);
}

#[test]
fn missing_file_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let err = Config::from_path(dir.path()).unwrap_err();
    match err {
        Error::Config(msg) => assert!(msg.contains("is missing"), "{}", msg),
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn malformed_file_names_the_path() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("trellis.toml"), "ver = [").unwrap();
    let err = Config::from_path(dir.path()).unwrap_err();
    assert!(err.to_string().contains("Failed to parse"), "{}", err);
}
