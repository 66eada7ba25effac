//! End-to-end tests against the real HTTP server.
//!
//! Each test writes a small data directory, starts the server on a free
//! port and talks to it with `reqwest`.

use data_connector::config::Config;
use data_connector::server::run_server;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

// ─── Helpers ────────────────────────────────────────────────────────

fn write_fixtures(dir: &Path) {
    fs::create_dir_all(dir).unwrap();

    let customers: Vec<Value> = (1..=12)
        .map(|i| {
            json!({
                "customer_id": i,
                "name": format!("Customer {}", i),
                "email": format!("customer{}@example.com", i),
                "created_at": format!("2026-01-{:02}T10:00:00", i),
                "status": if i % 4 == 0 { "inactive" } else { "active" }
            })
        })
        .collect();

    let priorities = ["high", "medium", "low"];
    let tickets: Vec<Value> = (1..=9)
        .map(|i| {
            json!({
                "ticket_id": i,
                "customer_id": (i % 3) + 1,
                "subject": "Login issue",
                "priority": priorities[i % 3],
                "created_at": format!("2026-02-{:02}T08:00:00Z", i),
                "status": if i % 2 == 0 { "closed" } else { "open" }
            })
        })
        .collect();

    let analytics: Vec<Value> = (1..=20)
        .map(|d| {
            json!({
                "metric": "daily_active_users",
                "date": format!("2026-01-{:02}", d + 10),
                "value": 100 + d * 10
            })
        })
        .chain((1..=15).map(|d| {
            json!({
                "metric": "daily_active_users",
                "date": format!("2026-02-{:02}", d),
                "value": 400 + d
            })
        }))
        .collect();

    fs::write(dir.join("customers.json"), serde_json::to_string(&customers).unwrap()).unwrap();
    fs::write(dir.join("support_tickets.json"), serde_json::to_string(&tickets).unwrap()).unwrap();
    fs::write(dir.join("analytics.json"), serde_json::to_string(&analytics).unwrap()).unwrap();
}

fn test_config(data_dir: &Path, port: u16, debug: bool) -> Config {
    let content = format!(
        r#"
[data]
dir = "{}"

[limits]
max_results = 10
default_page_size = 10

[voice]
default_mode = true

[server]
bind = "127.0.0.1:{}"
debug = {}
"#,
        data_dir.display(),
        port,
        debug
    );
    Config::from_toml(&content).unwrap()
}

fn find_free_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().port()
}

async fn wait_for_server(port: u16) {
    let client = reqwest::Client::new();
    let url = format!("http://127.0.0.1:{}/health", port);
    for _ in 0..50 {
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        if let Ok(resp) = client.get(&url).send().await {
            if resp.status().is_success() {
                return;
            }
        }
    }
    panic!("Server did not become ready within 5 seconds");
}

/// Starts a server over fixture data and returns its base URL. The temp
/// dir must outlive the test.
async fn start_server(with_fixtures: bool) -> (TempDir, String) {
    let tmp = TempDir::new().unwrap();
    let data_dir = tmp.path().join("data");
    if with_fixtures {
        write_fixtures(&data_dir);
    }
    let port = find_free_port();
    let cfg = test_config(&data_dir, port, false);

    tokio::spawn(async move {
        run_server(&cfg).await.ok();
    });
    wait_for_server(port).await;

    (tmp, format!("http://127.0.0.1:{}", port))
}

async fn get_json(url: &str) -> (u16, Value) {
    let resp = reqwest::get(url).await.unwrap();
    let status = resp.status().as_u16();
    (status, resp.json().await.unwrap())
}

fn field<'a>(records: &'a Value, key: &str) -> Vec<&'a Value> {
    records
        .as_array()
        .unwrap()
        .iter()
        .map(|r| &r[key])
        .collect()
}

// ─── Scenarios ──────────────────────────────────────────────────────

#[tokio::test]
async fn test_active_customers_with_summary() {
    let (_tmp, base) = start_server(true).await;
    let (status, body) = get_json(&format!("{}/data/crm?status=active", base)).await;

    assert_eq!(status, 200);
    assert_eq!(body["success"], true);
    assert_eq!(body["metadata"]["total_results"], 9);
    assert_eq!(body["metadata"]["data_type"], "tabular");
    assert!(field(&body["data"], "status").iter().all(|s| *s == "active"));

    let summary = body["metadata"]["voice_context"]["summary"].as_str().unwrap();
    assert!(summary.contains("active"), "{}", summary);
    assert!(summary.contains("inactive"), "{}", summary);
    assert_eq!(body["metadata"]["filters_applied"], json!({"status": "active"}));
}

#[tokio::test]
async fn test_open_high_priority_tickets() {
    let (_tmp, base) = start_server(true).await;
    let (status, body) =
        get_json(&format!("{}/data/support?status=open&priority=high", base)).await;

    assert_eq!(status, 200);
    let data = body["data"].as_array().unwrap();
    assert!(!data.is_empty());
    for t in data {
        assert_eq!(t["status"], "open");
        assert_eq!(t["priority"], "high");
    }
}

#[tokio::test]
async fn test_default_ticket_order_is_high_first() {
    let (_tmp, base) = start_server(true).await;
    let (_, body) = get_json(&format!("{}/data/support?page_size=9", base)).await;
    let priorities: Vec<&str> = field(&body["data"], "priority")
        .iter()
        .map(|p| p.as_str().unwrap())
        .collect();
    assert_eq!(priorities[..3], ["high", "high", "high"]);
    assert_eq!(priorities[6..], ["low", "low", "low"]);
}

#[tokio::test]
async fn test_analytics_date_range() {
    let (_tmp, base) = start_server(true).await;
    let url = format!(
        "{}/data/analytics?date_from=2026-02-01&date_to=2026-02-10&page_size=10",
        base
    );
    let (status, body) = get_json(&url).await;

    assert_eq!(status, 200);
    assert_eq!(body["metadata"]["total_results"], 10);
    assert_eq!(body["metadata"]["data_type"], "time_series");
    for d in field(&body["data"], "date") {
        let d = d.as_str().unwrap();
        assert!(("2026-02-01"..="2026-02-10").contains(&d), "out of range: {}", d);
    }
}

#[tokio::test]
async fn test_pagination_page_size_three() {
    let (_tmp, base) = start_server(true).await;
    let (status, body) = get_json(&format!("{}/data/crm?page=1&page_size=3", base)).await;

    assert_eq!(status, 200);
    assert_eq!(body["data"].as_array().unwrap().len(), 3);
    let pagination = &body["metadata"]["pagination"];
    assert_eq!(pagination["has_next"], true);
    assert_eq!(pagination["has_previous"], false);
    assert_eq!(pagination["total_pages"], 4);
    assert_eq!(body["metadata"]["message"], "Showing 3 of 12 results (page 1/4).");
}

#[tokio::test]
async fn test_unknown_source_lists_valid_names() {
    let (_tmp, base) = start_server(true).await;
    let (status, body) = get_json(&format!("{}/data/invalid_source", base)).await;

    assert_eq!(status, 404);
    assert_eq!(body["error"]["code"], "not_found");
    let message = body["error"]["message"].as_str().unwrap();
    for name in ["crm", "support", "analytics"] {
        assert!(message.contains(name), "{}", message);
    }
}

#[tokio::test]
async fn test_voice_mode_toggle() {
    let (_tmp, base) = start_server(true).await;

    let (_, off) = get_json(&format!("{}/data/crm?voice_mode=false", base)).await;
    assert!(off["metadata"]["voice_context"].is_null());

    let (_, on) = get_json(&format!("{}/data/crm?voice_mode=true", base)).await;
    assert!(on["metadata"]["voice_context"]["summary"].is_string());

    // Still present when nothing matches.
    let (_, empty) = get_json(&format!("{}/data/crm?voice_mode=true&search=nobody", base)).await;
    assert_eq!(empty["metadata"]["total_results"], 0);
    assert_eq!(
        empty["metadata"]["voice_context"]["summary"],
        "No crm records found."
    );
}

// ─── Boundary behavior ──────────────────────────────────────────────

#[tokio::test]
async fn test_invalid_paging_rejected() {
    let (_tmp, base) = start_server(true).await;
    for query in ["page=0", "page_size=0", "page_size=101", "page=abc", "customer_id=x"] {
        let (status, body) = get_json(&format!("{}/data/crm?{}", base, query)).await;
        assert_eq!(status, 422, "query {}", query);
        assert_eq!(body["error"]["code"], "invalid_params");
    }
}

#[tokio::test]
async fn test_undeclared_params_are_dropped() {
    let (_tmp, base) = start_server(true).await;
    let (status, body) = get_json(&format!("{}/data/analytics?status=open&customer_id=2", base)).await;
    assert_eq!(status, 200);
    assert_eq!(body["metadata"]["total_results"], 35);
    assert_eq!(body["metadata"]["filters_applied"], json!({}));
}

#[tokio::test]
async fn test_missing_data_degrades_to_empty() {
    let (_tmp, base) = start_server(false).await;
    let (status, body) = get_json(&format!("{}/data/support", base)).await;

    assert_eq!(status, 200);
    assert_eq!(body["data"], json!([]));
    assert_eq!(body["metadata"]["data_type"], "empty");
    assert_eq!(body["metadata"]["pagination"]["total_pages"], 1);
    assert_eq!(body["metadata"]["message"], "No results found.");
}

#[tokio::test]
async fn test_health_reports_sources() {
    let (_tmp, base) = start_server(true).await;
    let (status, body) = get_json(&format!("{}/health", base)).await;

    assert_eq!(status, 200);
    assert_eq!(body["status"], "healthy");
    assert!(body["version"].is_string());
    assert!(body["uptime_seconds"].is_u64());
    assert_eq!(body["data_sources"]["crm"]["available"], true);
    assert_eq!(body["data_sources"]["crm"]["record_count"], 12);
    assert_eq!(body["data_sources"]["analytics"]["record_count"], 35);
}

#[tokio::test]
async fn test_list_sources() {
    let (_tmp, base) = start_server(true).await;
    let (_, body) = get_json(&format!("{}/data/sources", base)).await;
    let names: Vec<&str> = field(&body["sources"], "name")
        .iter()
        .map(|n| n.as_str().unwrap())
        .collect();
    assert_eq!(names, ["crm", "support", "analytics"]);
    assert_eq!(body["sources"][2]["data_type"], "time_series");
}

#[tokio::test]
async fn test_function_schemas() {
    let (_tmp, base) = start_server(true).await;
    let (status, body) = get_json(&format!("{}/schema/functions", base)).await;

    assert_eq!(status, 200);
    let functions = body["functions"].as_array().unwrap();
    assert_eq!(functions.len(), 3);
    assert_eq!(functions[0]["name"], "query_crm");
    assert_eq!(functions[1]["name"], "query_support");
    assert_eq!(functions[2]["name"], "query_analytics");

    let support = &functions[1]["parameters"];
    assert_eq!(support["type"], "object");
    assert_eq!(support["properties"]["priority"]["enum"], json!(["high", "medium", "low"]));
    assert_eq!(support["properties"]["sort_by"]["default"], "priority");
    assert_eq!(support["required"], json!([]));
}

#[tokio::test]
async fn test_function_call() {
    let (_tmp, base) = start_server(true).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}/functions/query_support", base))
        .json(&json!({"status": "OPEN", "customer_id": 2, "voice_mode": false}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert!(body["metadata"]["voice_context"].is_null());
    assert_eq!(body["metadata"]["filters_applied"]["status"], "open");
    for t in body["data"].as_array().unwrap() {
        assert_eq!(t["status"], "open");
        assert_eq!(t["customer_id"], 2);
    }

    let resp = client
        .post(format!("{}/functions/query_support", base))
        .json(&json!({"priority": "urgent"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 422);

    let resp = client
        .post(format!("{}/functions/query_billing", base))
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn test_cors_headers() {
    let (_tmp, base) = start_server(true).await;
    let resp = reqwest::Client::new()
        .get(format!("{}/data/sources", base))
        .header("Origin", "http://example.com")
        .send()
        .await
        .unwrap();
    assert_eq!(
        resp.headers()
            .get("access-control-allow-origin")
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
}
