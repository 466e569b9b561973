use std::net::SocketAddr;

use reqwest::StatusCode;
use serde_json::{json, Value};
use tokio::net::TcpListener;

use configs::AppConfig;

struct TestApp {
    base_url: String,
}

async fn start_server() -> anyhow::Result<TestApp> {
    let db = models::db::connect_memory().await?;
    models::db::run_migrations(&db).await?;
    let mut cfg = AppConfig::default();
    cfg.auth.jwt_secret = "e2e-test-secret-0123456789".into();
    cfg.rate_limit.enabled = false;
    let app = server::build_app(db, &cfg);

    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr: SocketAddr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(TestApp { base_url: format!("http://{addr}") })
}

#[tokio::test]
async fn health_metrics_and_docs() -> anyhow::Result<()> {
    let app = start_server().await?;
    let client = reqwest::Client::new();

    let res = client.get(format!("{}/health", app.base_url)).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await?, json!({ "status": "ok" }));

    let res = client.get(format!("{}/metrics", app.base_url)).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.text().await?.contains("auto_shop_http_requests_total"));

    let res = client.get(format!("{}/api-docs/openapi.json", app.base_url)).send().await?;
    assert_eq!(res.status(), StatusCode::OK);
    let doc: Value = res.json().await?;
    assert!(doc["paths"]["/service-tickets/"].is_object());
    Ok(())
}

#[tokio::test]
async fn mechanic_signs_up_and_sees_assigned_tickets() -> anyhow::Result<()> {
    let app = start_server().await?;
    let client = reqwest::Client::new();
    let url = |p: &str| format!("{}{}", app.base_url, p);

    let res = client
        .post(url("/mechanics/"))
        .json(&json!({ "name": "Max Wrench", "email": "max@shop.example", "password": "wrench-123", "phone": "555-0199", "salary": 52000.0 }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);
    let mechanic_id = res.json::<Value>().await?["mechanic"]["id"].as_i64().unwrap_or_default();

    let res = client
        .post(url("/customers/"))
        .json(&json!({ "name": "Ann Driver", "email": "ann@shop.example", "password": "drive-123", "phone": "555-0100" }))
        .send()
        .await?;
    let customer_id = res.json::<Value>().await?["customer"]["id"].as_i64().unwrap_or_default();

    let login: Value = client
        .post(url("/mechanics/login"))
        .json(&json!({ "email": "max@shop.example", "password": "wrench-123" }))
        .send()
        .await?
        .json()
        .await?;
    let token = login["token"].as_str().unwrap_or_default().to_string();

    let res = client
        .post(url("/service-tickets/"))
        .bearer_auth(&token)
        .json(&json!({ "customer_id": customer_id, "vin": "1HGCM82633A004352", "service_date": "2024-03-01",
                       "service_desc": "Brake inspection", "mechanic_ids": [mechanic_id] }))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CREATED);

    let mine: Value = client.get(url("/mechanics/my-tickets")).bearer_auth(&token).send().await?.json().await?;
    assert_eq!(mine["tickets"].as_array().map(Vec::len), Some(1));

    let popular: Value = client.get(url("/mechanics/popular")).send().await?.json().await?;
    assert_eq!(popular[0]["id"].as_i64(), Some(mechanic_id));
    assert_eq!(popular[0]["ticket_count"], 1);
    Ok(())
}
