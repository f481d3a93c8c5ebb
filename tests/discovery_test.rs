use std::fs;
use student_store::sdk;
use student_store::{StudentFields, StudentReader, StudentWriter};
use serde_json::{json, Value};
use tokio::net::TcpListener;

#[tokio::test]
async fn test_unreachable_server_falls_back_to_embedded() {
    // Bind then drop a listener so the port is known to be closed.
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap().port()
    };
    std::env::set_var(sdk::discovery::ADDR_ENV, format!("127.0.0.1:{}", port));

    let dir = tempfile::tempdir().unwrap();
    let data_file = dir.path().join("students.json");
    let store = sdk::new(data_file.to_str().unwrap()).await.unwrap();

    assert!(store.list().await.unwrap().is_empty());
    store.create(StudentFields::new("1", "Alice")).await.unwrap();
    assert_eq!(store.get("1").await.unwrap().name, "Alice");

    let raw: Value = serde_json::from_slice(&fs::read(&data_file).unwrap()).unwrap();
    assert_eq!(raw, json!([["1", "Alice", "", "", ""]]));
}
