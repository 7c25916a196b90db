use factcheck::cli::Args;
use factcheck::config::{Config, FileConfig, DEFAULT_OPENAI_BASE_URL};
use factcheck::models::Provider;
use std::collections::HashMap;
use std::fs;
use tempfile::TempDir;

fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |name| map.get(name).cloned()
}

#[test]
fn test_defaults_without_any_source() {
    let config = Config::resolve(&Args::default(), &FileConfig::default(), env(&[])).unwrap();

    assert_eq!(config.provider, Provider::OpenAi);
    assert_eq!(config.model, "gpt-4o");
    assert_eq!(config.max_iterations, 25);
    assert_eq!(config.stream_timeout, 120);
    assert_eq!(config.endpoints.openai, DEFAULT_OPENAI_BASE_URL);
    assert!(config.keys.openai.is_none());
    assert!(!config.verbose);
}

#[test]
fn test_file_values_apply_and_env_overrides_them() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("factcheck.yaml");
    fs::write(
        &path,
        "model:\n  provider: gemini\n  default_model: gemini-2.5-flash\nagent:\n  max_iterations: 10\napi:\n  tavily_base_url: http://localhost:8080/\n",
    )
    .unwrap();
    let file = FileConfig::load_from(&path).unwrap();

    let from_file = Config::resolve(&Args::default(), &file, env(&[])).unwrap();
    assert_eq!(from_file.provider, Provider::Gemini);
    assert_eq!(from_file.model, "gemini-2.5-flash");
    assert_eq!(from_file.max_iterations, 10);
    assert_eq!(from_file.endpoints.tavily, "http://localhost:8080");

    let from_env = Config::resolve(
        &Args::default(),
        &file,
        env(&[("FACTCHECK_MODEL", "gemini-2.5-pro"), ("FACTCHECK_MAX_ITERATIONS", "4")]),
    )
    .unwrap();
    assert_eq!(from_env.model, "gemini-2.5-pro");
    assert_eq!(from_env.max_iterations, 4);
}

#[test]
fn test_cli_args_win() {
    let args = Args {
        provider: Some(Provider::OpenAi),
        model: Some("gpt-4-turbo".into()),
        max_iterations: Some(7),
        verbose: true,
        ..Default::default()
    };
    let config = Config::resolve(
        &args,
        &FileConfig::default(),
        env(&[
            ("FACTCHECK_PROVIDER", "gemini"),
            ("FACTCHECK_MODEL", "gemini-2.5-pro"),
            ("FACTCHECK_MAX_ITERATIONS", "3"),
        ]),
    )
    .unwrap();

    assert_eq!(config.provider, Provider::OpenAi);
    assert_eq!(config.model, "gpt-4-turbo");
    assert_eq!(config.max_iterations, 7);
    assert!(config.verbose);
}

#[test]
fn test_keys_come_from_environment_and_blank_means_unset() {
    let config = Config::resolve(
        &Args::default(),
        &FileConfig::default(),
        env(&[("OPENAI_API_KEY", "sk-1"), ("TAVILY_API_KEY", "  ")]),
    )
    .unwrap();

    assert_eq!(config.keys.openai.as_deref(), Some("sk-1"));
    assert!(config.keys.tavily.is_none());
    assert!(!format!("{:?}", config.keys).contains("sk-1"));
}

#[test]
fn test_invalid_provider_and_zero_iterations_are_rejected() {
    assert!(Config::resolve(
        &Args::default(),
        &FileConfig::default(),
        env(&[("FACTCHECK_PROVIDER", "anthropic")])
    )
    .is_err());

    let args = Args {
        max_iterations: Some(0),
        ..Default::default()
    };
    assert!(Config::resolve(&args, &FileConfig::default(), env(&[])).is_err());

    let err = Config::resolve(
        &Args::default(),
        &FileConfig::default(),
        env(&[("FACTCHECK_MAX_ITERATIONS", "lots")]),
    )
    .unwrap_err();
    assert!(format!("{:#}", err).contains("FACTCHECK_MAX_ITERATIONS"));
}

#[test]
fn test_stream_timeout_must_be_positive_number() {
    let zero_env = Config::resolve(
        &Args::default(),
        &FileConfig::default(),
        env(&[("FACTCHECK_STREAM_TIMEOUT", "0")]),
    );
    assert!(zero_env.is_err());

    let mut file = FileConfig::default();
    file.api.stream_timeout = Some(0);
    assert!(Config::resolve(&Args::default(), &file, env(&[])).is_err());

    let err = Config::resolve(
        &Args::default(),
        &FileConfig::default(),
        env(&[("FACTCHECK_STREAM_TIMEOUT", "soon")]),
    )
    .unwrap_err();
    assert!(format!("{:#}", err).contains("FACTCHECK_STREAM_TIMEOUT"));

    let ok = Config::resolve(
        &Args::default(),
        &FileConfig::default(),
        env(&[("FACTCHECK_STREAM_TIMEOUT", "30")]),
    )
    .unwrap();
    assert_eq!(ok.stream_timeout, 30);
}

#[test]
fn test_base_url_expands_env_vars() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("factcheck.json");
    fs::write(&path, r#"{"api": {"serpapi_base_url": "http://${SERP_HOST}/"}}"#).unwrap();
    let file = FileConfig::load_from(&path).unwrap();

    let config = Config::resolve(&Args::default(), &file, env(&[("SERP_HOST", "mock:9000")])).unwrap();

    assert_eq!(config.endpoints.serpapi, "http://mock:9000");
}

#[test]
fn test_example_config_round_trips_and_refuses_overwrite() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("factcheck.yaml");

    FileConfig::write_example(&path).unwrap();
    let loaded = FileConfig::load_from(&path).unwrap();
    assert_eq!(loaded.model.provider, Some(Provider::OpenAi));
    assert_eq!(loaded.agent.max_iterations, Some(25));

    assert!(FileConfig::write_example(&path).is_err());
}

#[test]
fn test_malformed_file_reports_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bad.yaml");
    fs::write(&path, "model: [unclosed").unwrap();

    let err = FileConfig::load_from(&path).unwrap_err();
    assert!(format!("{:#}", err).contains("bad.yaml"));
}
