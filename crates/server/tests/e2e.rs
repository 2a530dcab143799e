use std::net::SocketAddr;
use std::path::PathBuf;

use axum::Router;
use configs::{AppConfig, WriteMode};
use reqwest::StatusCode as HttpStatusCode;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use uuid::Uuid;

struct TestApp {
    base_url: String,
    store_path: PathBuf,
}

impl Drop for TestApp {
    fn drop(&mut self) {
        if let Some(dir) = self.store_path.parent() {
            let _ = std::fs::remove_dir_all(dir);
        }
    }
}

async fn start_server(write_mode: WriteMode) -> anyhow::Result<TestApp> {
    // Use an isolated store file per test run
    let store_path = std::env::temp_dir()
        .join(format!("user_registry_e2e_{}", Uuid::new_v4()))
        .join("users.json");
    let mut cfg = AppConfig::default();
    cfg.store.path = store_path.clone();
    cfg.store.write_mode = write_mode;
    cfg.normalize_and_validate()?;

    let app: Router = server::startup::build_app(&cfg);
    let listener = TcpListener::bind((std::net::Ipv4Addr::LOCALHOST, 0)).await?;
    let addr: SocketAddr = listener.local_addr()?;
    let base_url = format!("http://{}:{}", addr.ip(), addr.port());

    tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await { eprintln!("server error: {}", e); }
    });

    Ok(TestApp { base_url, store_path })
}

fn client() -> reqwest::Client {
    reqwest::Client::new()
}

async fn read_store(app: &TestApp) -> anyhow::Result<Value> {
    let raw = tokio::fs::read(&app.store_path).await?;
    Ok(serde_json::from_slice(&raw)?)
}

#[tokio::test]
async fn e2e_public_health() -> anyhow::Result<()> {
    let app = start_server(WriteMode::Atomic).await?;
    let res = client().get(format!("{}/health", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let body = res.json::<Value>().await?;
    assert_eq!(body["status"], "ok");
    Ok(())
}

#[tokio::test]
async fn e2e_crud_persists_legacy_document_layout() -> anyhow::Result<()> {
    for mode in [WriteMode::Atomic, WriteMode::Truncate] {
        let app = start_server(mode).await?;
        let c = client();
        let users = format!("{}/api/v1/users", app.base_url);

        let res = c.post(&users).json(&json!({"display_name": "Alice", "email": "alice@email.com"})).send().await?;
        assert_eq!(res.status(), HttpStatusCode::CREATED);
        let res = c.post(&users).json(&json!({"display_name": "Bob", "email": "bob@email.com"})).send().await?;
        assert_eq!(res.json::<Value>().await?["id"], 2);

        let doc = read_store(&app).await?;
        assert_eq!(doc["increment"], 2);
        assert_eq!(doc["list"]["1"]["display_name"], "Alice");
        assert_eq!(doc["list"]["2"]["email"], "bob@email.com");
        assert!(doc["list"]["1"]["created_at"].is_string());

        let res = c.patch(format!("{users}/1")).json(&json!({"email": "alice@new.com"})).send().await?;
        assert_eq!(res.status(), HttpStatusCode::NO_CONTENT);
        let res = c.delete(format!("{users}/2")).send().await?;
        assert_eq!(res.status(), HttpStatusCode::NO_CONTENT);

        let doc = read_store(&app).await?;
        assert_eq!(doc["increment"], 2);
        assert_eq!(doc["list"]["1"]["email"], "alice@new.com");
        assert_eq!(doc["list"]["1"]["display_name"], "Alice");
        assert!(doc["list"].get("2").is_none());

        let res = c.get(format!("{users}/2")).send().await?;
        assert_eq!(res.status(), HttpStatusCode::NOT_FOUND);
    }
    Ok(())
}

#[tokio::test]
async fn e2e_concurrent_creates_all_persist() -> anyhow::Result<()> {
    let app = start_server(WriteMode::Atomic).await?;
    let users = format!("{}/api/v1/users", app.base_url);

    let mut handles = Vec::new();
    for i in 0..20 {
        let url = users.clone();
        handles.push(tokio::spawn(async move {
            client()
                .post(url)
                .json(&json!({"display_name": format!("user{i}"), "email": format!("u{i}@email.com")}))
                .send()
                .await
                .map(|r| r.status())
        }));
    }
    for h in handles {
        assert_eq!(h.await??, HttpStatusCode::CREATED);
    }

    let listed = client().get(&users).send().await?.json::<Vec<Value>>().await?;
    assert_eq!(listed.len(), 20);
    let doc = read_store(&app).await?;
    assert_eq!(doc["increment"], 20);
    Ok(())
}

#[tokio::test]
async fn e2e_reads_existing_store_file() -> anyhow::Result<()> {
    let app = start_server(WriteMode::Atomic).await?;
    if let Some(dir) = app.store_path.parent() {
        tokio::fs::create_dir_all(dir).await?;
    }
    tokio::fs::write(
        &app.store_path,
        r#"{"increment":7,"list":{"7":{"created_at":"2022-03-04T05:06:07Z","display_name":"Dave","email":"dave@email.com"}}}"#,
    )
    .await?;

    let res = client().get(format!("{}/api/v1/users/7", app.base_url)).send().await?;
    assert_eq!(res.status(), HttpStatusCode::OK);
    let body = res.json::<Value>().await?;
    assert_eq!(body["id"], 7);
    assert_eq!(body["display_name"], "Dave");
    assert_eq!(body["created_at"], "2022-03-04T05:06:07Z");

    let res = client()
        .post(format!("{}/api/v1/users", app.base_url))
        .json(&json!({"display_name": "Erin", "email": "erin@email.com"}))
        .send()
        .await?;
    assert_eq!(res.json::<Value>().await?["id"], 8);
    Ok(())
}
