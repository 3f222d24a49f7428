//! HTTP transport integration tests.
//!
//! Starts an axum server and exercises it with reqwest.

use std::sync::Arc;

use people_store::{http, People, Person, PersonStore};
use reqwest::StatusCode;
use serde_json::json;
use tempfile::TempDir;

use crate::support::{on_disk, temp_store};

/// Bind to port 0 and return the actual address.
async fn start_server(store: Arc<PersonStore>) -> String {
    let app = http::router(store);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

async fn server() -> (TempDir, Arc<PersonStore>, String) {
    let (dir, store) = temp_store();
    let store = Arc::new(store);
    let base = start_server(store.clone()).await;
    (dir, store, base)
}

#[tokio::test]
async fn create_then_list() {
    let (_dir, store, base) = server().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/person/"))
        .json(&json!({ "id": 1, "name": "Ana", "age": 30 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    assert!(resp.text().await.unwrap().is_empty());

    let resp = client.get(format!("{base}/person/")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(
        body,
        json!({ "people": [{ "id": 1, "name": "Ana", "age": 30 }] })
    );
    assert_eq!(on_disk(store.path()).len(), 1);
}

#[tokio::test]
async fn list_empty_store() {
    let (_dir, _store, base) = server().await;

    let resp = reqwest::get(format!("{base}/person/")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body: People = resp.json().await.unwrap();
    assert!(body.is_empty());
}

#[tokio::test]
async fn create_rejects_non_positive_id() {
    let (_dir, store, base) = server().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/person/"))
        .json(&json!({ "id": 0, "name": "X", "age": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(resp.text().await.unwrap().contains("positive integer"));
    assert!(store.list().unwrap().is_empty());
}

#[tokio::test]
async fn create_rejects_duplicate_id() {
    let (_dir, store, base) = server().await;
    store.create(Person::new(1, "Ana", 30)).unwrap();
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/person/"))
        .json(&json!({ "id": 1, "name": "Bob", "age": 25 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(store.get(1).unwrap().name, "Ana");
}

#[tokio::test]
async fn malformed_body_is_bad_request() {
    let (_dir, _store, base) = server().await;
    let client = reqwest::Client::new();

    for (method, body) in [
        (reqwest::Method::POST, "{not json"),
        (reqwest::Method::PUT, "{not json"),
        (reqwest::Method::POST, r#"{"id":"one","name":"X","age":1}"#),
    ] {
        let resp = client
            .request(method.clone(), format!("{base}/person/"))
            .body(body)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{method} {body}");
    }
}

#[tokio::test]
async fn get_by_id() {
    let (_dir, store, base) = server().await;
    store.create(Person::new(5, "Eve", 50)).unwrap();

    let resp = reqwest::get(format!("{base}/person/5")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let person: Person = resp.json().await.unwrap();
    assert_eq!(person, Person::new(5, "Eve", 50));
}

#[tokio::test]
async fn get_missing_is_404_with_text() {
    let (_dir, _store, base) = server().await;

    let resp = reqwest::get(format!("{base}/person/999")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(resp.text().await.unwrap().contains("not found"));
}

#[tokio::test]
async fn get_with_non_integer_id_is_bad_request() {
    let (_dir, _store, base) = server().await;

    let resp = reqwest::get(format!("{base}/person/abc")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn update_existing_and_missing() {
    let (_dir, store, base) = server().await;
    store.create(Person::new(2, "Old", 20)).unwrap();
    let client = reqwest::Client::new();

    let resp = client
        .put(format!("{base}/person/"))
        .json(&json!({ "id": 2, "name": "New", "age": 99 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(store.get(2).unwrap(), Person::new(2, "New", 99));
    assert_eq!(on_disk(store.path()).people, vec![Person::new(2, "New", 99)]);

    let resp = client
        .put(format!("{base}/person/"))
        .json(&json!({ "id": 3, "name": "Ghost", "age": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = client
        .put(format!("{base}/person/"))
        .json(&json!({ "id": -2, "name": "Neg", "age": 1 }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn delete_routes() {
    let (_dir, store, base) = server().await;
    store.create(Person::new(1, "A", 1)).unwrap();
    store.create(Person::new(2, "B", 2)).unwrap();
    store.create(Person::new(3, "C", 3)).unwrap();
    let client = reqwest::Client::new();

    let resp = client.delete(format!("{base}/person/2")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let ids: Vec<i64> = store.list().unwrap().iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![1, 3]);

    let resp = client.delete(format!("{base}/person/2")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = client.delete(format!("{base}/person/")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(resp.text().await.unwrap().contains("Id must be provided"));

    let resp = client.delete(format!("{base}/person/x")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn concurrent_posts_are_all_stored() {
    let (_dir, store, base) = server().await;
    let client = reqwest::Client::new();

    let requests = (1..=20).map(|id| {
        let client = client.clone();
        let url = format!("{base}/person/");
        tokio::spawn(async move {
            client
                .post(url)
                .json(&json!({ "id": id, "name": "P", "age": id }))
                .send()
                .await
                .unwrap()
                .status()
        })
    });
    for request in requests.collect::<Vec<_>>() {
        assert_eq!(request.await.unwrap(), StatusCode::CREATED);
    }

    assert_eq!(store.len().unwrap(), 20);
    assert_eq!(on_disk(store.path()), store.list().unwrap());
}

#[tokio::test]
async fn extra_path_segments_are_bad_request() {
    let (_dir, store, base) = server().await;
    store.create(Person::new(1, "Ana", 30)).unwrap();
    let client = reqwest::Client::new();

    for path in ["/person/1/", "/person/1/x"] {
        let resp = client.get(format!("{base}{path}")).send().await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "GET {path}");
        assert!(resp.text().await.unwrap().contains("must be an integer"));
    }

    let resp = client
        .delete(format!("{base}/person/1/x"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(store.get(1).unwrap().name, "Ana");
}

#[tokio::test]
async fn bare_person_path_redirects() {
    let (_dir, store, base) = server().await;
    store.create(Person::new(1, "Ana", 30)).unwrap();

    let no_redirects = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();
    let resp = no_redirects.get(format!("{base}/person")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::MOVED_PERMANENTLY);
    assert_eq!(resp.headers()[reqwest::header::LOCATION], "/person/");

    let resp = reqwest::get(format!("{base}/person")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: People = resp.json().await.unwrap();
    assert_eq!(body.people, vec![Person::new(1, "Ana", 30)]);
}

#[tokio::test]
async fn unrelated_paths_are_not_found() {
    let (_dir, _store, base) = server().await;

    let resp = reqwest::get(format!("{base}/people/")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
