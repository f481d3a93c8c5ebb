use std::fs;
use std::sync::Arc;
use student_store::engine::FileStore;
use student_store::sdk::Client;
use student_store::server::build_router;
use student_store::{Error, StudentFields, StudentReader, StudentWriter};
use reqwest::StatusCode;
use serde_json::{json, Value};
use tempfile::TempDir;
use tokio::net::TcpListener;

struct TestApp {
    base_url: String,
    dir: TempDir,
}

async fn start_server() -> TestApp {
    start_server_with_cap(100).await
}

async fn start_server_with_cap(max_connections: usize) -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let static_dir = dir.path().join("static");
    fs::create_dir_all(&static_dir).unwrap();
    fs::write(static_dir.join("index.html"), "<h1>Students</h1>").unwrap();
    fs::write(static_dir.join("app.js"), "console.log('students');").unwrap();

    let store = FileStore::open(dir.path().join("students.json")).unwrap();
    let app = build_router(Arc::new(store), &static_dir, max_connections);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    TestApp {
        base_url: format!("http://{}", addr),
        dir,
    }
}

#[tokio::test]
async fn test_client_crud() {
    let app = start_server().await;
    let client = Client::connect(&app.base_url).await.unwrap();

    assert!(client.list().await.unwrap().is_empty());

    let created = client.create(StudentFields::new("1", "Alice").with_age("21")).await.unwrap();
    assert_eq!(created.id, "1");
    assert_eq!(created.age, "21");

    let dup = client.create(StudentFields::new("1", "Bob")).await;
    assert!(matches!(dup, Err(Error::Conflict(id)) if id == "1"));

    let invalid = client.create(StudentFields::new(" ", "Bob")).await;
    assert!(matches!(invalid, Err(Error::Validation(msg)) if msg == "id and name required"));

    let updated = client
        .update("1", StudentFields { marks: Some("90".into()), ..StudentFields::default() })
        .await
        .unwrap();
    assert_eq!(updated.name, "Alice");
    assert_eq!(updated.age, "21");
    assert_eq!(updated.marks, "90");

    let removed = client.delete("1").await.unwrap();
    assert_eq!(removed, updated);
    assert!(matches!(client.get("1").await, Err(Error::NotFound(id)) if id == "1"));
    assert!(matches!(client.delete("1").await, Err(Error::NotFound(_))));
}

#[tokio::test]
async fn test_http_status_codes() {
    let app = start_server().await;
    let http = reqwest::Client::new();
    let students = format!("{}/api/students", app.base_url);

    let res = http.post(&students).json(&json!({"id": "1", "name": "Alice"})).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    assert_eq!(res.json::<Value>().await.unwrap(), json!(["1", "Alice", "", "", ""]));

    let res = http.post(&students).json(&json!({"id": "1", "name": "Bob"})).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::CONFLICT);
    assert_eq!(res.json::<Value>().await.unwrap(), json!({"error": "Student ID already exists"}));

    let res = http.post(&students).json(&json!({"id": "2"})).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(res.json::<Value>().await.unwrap(), json!({"error": "id and name required"}));

    let res = http.post(&students).body("not json").send().await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(res.json::<Value>().await.unwrap(), json!({"error": "Invalid JSON"}));

    let res = http.post(&students).json(&json!(["3", "Carol"])).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(res.json::<Value>().await.unwrap(), json!({"error": "id and name required"}));

    let res = http.put(format!("{}/1", students)).json(&json!({})).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = http.put(format!("{}/1", students)).json(&json!(["1", "X"])).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(res.json::<Value>().await.unwrap(), json!({"error": "Invalid JSON"}));

    let res = http.put(format!("{}/99", students)).json(&json!({"name": "X"})).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(res.json::<Value>().await.unwrap(), json!({"error": "not found"}));

    let res = http.put(format!("{}/1", students)).json(&json!({"marks": 88})).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await.unwrap(), json!(["1", "Alice", "", "", "88"]));

    let res = http.get(format!("{}/99", students)).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = http.delete(format!("{}/1", students)).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = http.get(&students).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await.unwrap(), json!([]));
}

#[tokio::test]
async fn test_mutations_reach_disk() {
    let app = start_server().await;
    let client = Client::connect(&app.base_url).await.unwrap();

    client.create(StudentFields::new("1", "Alice")).await.unwrap();
    client.create(StudentFields::new("2", "Bob").with_course("Art")).await.unwrap();

    let raw: Value = serde_json::from_slice(&fs::read(app.dir.path().join("students.json")).unwrap()).unwrap();
    assert_eq!(raw, json!([["1", "Alice", "", "", ""], ["2", "Bob", "", "Art", ""]]));
}

#[tokio::test]
async fn test_corrupt_file_lists_empty() {
    let app = start_server().await;
    fs::write(app.dir.path().join("students.json"), "\"not an array\"").unwrap();

    let res = reqwest::get(format!("{}/api/students", app.base_url)).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await.unwrap(), json!([]));
}

#[tokio::test]
async fn test_static_frontend() {
    let app = start_server().await;

    let res = reqwest::get(format!("{}/app.js", app.base_url)).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text().await.unwrap(), "console.log('students');");

    let res = reqwest::get(format!("{}/", app.base_url)).await.unwrap();
    assert_eq!(res.text().await.unwrap(), "<h1>Students</h1>");

    let res = reqwest::get(format!("{}/some/client/route", app.base_url)).await.unwrap();
    assert_eq!(res.text().await.unwrap(), "<h1>Students</h1>");
}

#[tokio::test]
async fn test_requests_over_cap_are_rejected() {
    let app = start_server_with_cap(0).await;

    let res = reqwest::get(format!("{}/api/students", app.base_url)).await.unwrap();
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(res.json::<Value>().await.unwrap(), json!({"error": "server busy"}));

    let res = reqwest::get(format!("{}/", app.base_url)).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
}
