use super::*;

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["ermap"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn parses_warehouses_without_personnel() {
    let cli = Cli::try_parse_from(["ermap", "warehouses"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Warehouses { personnel: None })
    ));
}

#[test]
fn parses_warehouses_with_personnel() {
    let cli = Cli::try_parse_from(["ermap", "warehouses", "--personnel", "25"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Warehouses {
            personnel: Some(25)
        })
    ));
}

#[test]
fn parses_distances_with_retry_override() {
    let cli = Cli::try_parse_from([
        "ermap",
        "distances",
        "--from",
        "104.06,30.65",
        "--max-retries",
        "5",
    ])
    .unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Distances {
            ref from,
            max_retries: Some(5)
        }) if from == "104.06,30.65"
    ));
}

#[test]
fn distances_requires_origin() {
    assert!(Cli::try_parse_from(["ermap", "distances"]).is_err());
}

#[test]
fn parses_matrix_output() {
    let cli = Cli::try_parse_from(["ermap", "matrix", "--output", "out.json"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Matrix { output: Some(ref p) }) if p == &PathBuf::from("out.json")
    ));
}

#[test]
fn parses_full_plan() {
    let cli = Cli::try_parse_from([
        "ermap",
        "plan",
        "--incident",
        "春熙路",
        "--departure",
        "成都市消防救援支队",
        "--personnel",
        "20",
        "--vehicles",
        "4",
        "--description",
        "商场三楼起火",
    ])
    .unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Plan {
            ref incident,
            personnel: 20,
            vehicles: 4,
            output: None,
            ..
        }) if incident == "春熙路"
    ));
}

#[test]
fn plan_rejects_non_numeric_personnel() {
    let result = Cli::try_parse_from([
        "ermap",
        "plan",
        "--incident",
        "a",
        "--departure",
        "b",
        "--personnel",
        "many",
        "--vehicles",
        "1",
        "--description",
        "x",
    ]);
    assert!(result.is_err());
}

fn config_with(max_retries: u32, backoff_ms: u64, deadline_secs: u64) -> ermap_core::AppConfig {
    ermap_core::AppConfig {
        env: ermap_core::Environment::Test,
        log_level: "info".to_string(),
        warehouses_path: PathBuf::from("data/warehouses.json"),
        llm_api_base: "http://localhost".to_string(),
        llm_api_key: None,
        llm_model: "m".to_string(),
        mcp_url: None,
        request_timeout_secs: 5,
        oracle_max_retries: max_retries,
        oracle_backoff_ms: backoff_ms,
        oracle_deadline_secs: deadline_secs,
    }
}

#[test]
fn pipeline_options_follow_config() {
    let options = distances::pipeline_options(&config_with(3, 250, 0), None);
    assert_eq!(options.max_retries, 3);
    assert_eq!(options.backoff, std::time::Duration::from_millis(250));
    assert!(options.deadline.is_none());
}

#[test]
fn retry_flag_and_deadline_override() {
    let options = distances::pipeline_options(&config_with(3, 1000, 90), Some(7));
    assert_eq!(options.max_retries, 7);
    assert_eq!(options.deadline, Some(std::time::Duration::from_secs(90)));
}

#[test]
fn failure_detail_shows_error_and_raw_reply() {
    let from = ermap_distance::Endpoint::place("春熙路", "104.08,30.66");
    let to = ermap_distance::Endpoint::place("锦江仓库", "104.09,30.65");
    let result = ermap_distance::DistanceResult::failed(
        from,
        to,
        Some(3.0),
        None,
        ermap_distance::ExtractionStatus::Partial,
        3,
        "两地相距约3公里".to_string(),
        Some("connection reset".to_string()),
    );

    assert_eq!(
        distances::failure_detail(&result),
        "[partial] 尝试3次, connection reset | 原始回复: 两地相距约3公里"
    );
}
