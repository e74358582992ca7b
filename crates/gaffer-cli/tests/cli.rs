// Subcommands end to end against a mock upstream.

use clap::Parser;
use gaffer_cli::args::Cli;
use gaffer_cli::run::run;
use gaffer_core::config::{ApiConfig, CacheConfig, Config, RetryConfig, SquadConfig};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ===========================================================================
// Helpers
// ===========================================================================

fn fixture(name: &str) -> String {
    let path = format!(
        "{}/../gaffer-core/tests/fixtures/{name}",
        env!("CARGO_MANIFEST_DIR")
    );
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("read {path}: {e}"))
}

async fn upstream() -> MockServer {
    let server = MockServer::start().await;
    for (route, file) in [
        ("/bootstrap-static/", "bootstrap.json"),
        ("/fixtures/", "fixtures.json"),
    ] {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_raw(fixture(file), "application/json"))
            .mount(&server)
            .await;
    }
    server
}

fn config(server: &MockServer) -> Config {
    Config {
        api: ApiConfig {
            base_url: format!("{}/", server.uri()),
            user_agent: "gaffer-tests".into(),
            timeout_secs: 5,
            max_requests_per_minute: 30,
        },
        cache: CacheConfig {
            flush_interval_secs: 30,
        },
        retry: RetryConfig {
            max_attempts: 1,
            backoff_ms: 0,
        },
        squad: SquadConfig {
            budget: 1000,
            max_per_team: 3,
            low_cost_threshold: 45,
            squad_horizon: 3,
            free_hit_horizon: 1,
            differential_max_ownership: 10.0,
        },
    }
}

async fn run_args(server: &MockServer, args: &[&str]) -> String {
    let cli = Cli::try_parse_from(std::iter::once("gaffer").chain(args.iter().copied())).unwrap();
    let mut buf = Vec::new();
    run(&cli, &config(server), &mut buf).await.unwrap();
    String::from_utf8(buf).unwrap()
}

// ===========================================================================
// Tests
// ===========================================================================

#[tokio::test]
async fn best_value_table_lists_cheapest_scorers_first() {
    let server = upstream().await;
    let text = run_args(&server, &["best-value", "-n", "2"]).await;
    let lines: Vec<&str> = text.lines().collect();
    assert!(lines[0].starts_with("ID"));
    // Raya: 14 pts at 5.5, then Saliba: 12 pts at 6.0.
    assert!(lines[2].starts_with("1 "), "{text}");
    assert!(lines[3].starts_with("2 "), "{text}");
    assert_eq!(lines.len(), 4);
}

#[tokio::test]
async fn top_stat_json_reports_leader() {
    let server = upstream().await;
    let text = run_args(&server, &["top-stat", "goals_scored", "--format", "json"]).await;
    let rows: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(rows.as_array().map(Vec::len), Some(1));
    assert_eq!(rows[0]["id"], 3);
    assert_eq!(rows[0]["value"], 2);
    assert_eq!(rows[0]["team"], "LIV");
}

#[tokio::test]
async fn top_stat_csv_with_position_filter() {
    let server = upstream().await;
    let text = run_args(
        &server,
        &["top-stat", "assists", "--position", "FWD", "--format", "csv"],
    )
    .await;
    let mut lines = text.lines();
    assert_eq!(lines.next(), Some("id,name,team,position,stat,value"));
    assert_eq!(lines.next(), Some("4,Ekitike,LIV,FWD,assists,1"));
    assert_eq!(lines.next(), None);
}

#[tokio::test]
async fn negative_best_value_count_lists_nobody() {
    let server = upstream().await;
    let text = run_args(&server, &["best-value", "-n", "-1"]).await;
    assert!(text.contains("(no results)"), "{text}");
    assert!(!text.contains("Raya"), "{text}");
}
