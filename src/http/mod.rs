//! HTTP transport for the person store.
//!
//! Requires the `http` feature. Uses axum for routing.
//!
//! ## Routes
//!
//! - `POST /person/` create. Body = person JSON, id must be positive. 201 on success.
//! - `GET /person/` list everything as `{ "people": [...] }`.
//! - `GET /person/:id` fetch one person, 404 if missing.
//! - `PUT /person/` replace the person with the body's id. 200 on success.
//! - `DELETE /person/:id` remove one person. 200 on success.
//!
//! Failures answer with a plain-text message. Everything except a missing
//! person on `GET /person/:id` is a 400.
//!
//! `/person` is redirected to `/person/` with a 301. Any other path under
//! `/person/` (e.g. `/person/1/` or `/person/1/x`) has no valid id and is a 400.
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use people_store::{http, PersonStore};
//!
//! let store = Arc::new(PersonStore::open("person.json")?);
//!
//! // Get the router to compose with other axum routes
//! let app = http::router(store.clone());
//!
//! // Or serve directly
//! http::serve(store, "0.0.0.0:8080").await?;
//! ```

mod error;

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{header, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use tracing::{debug, info};

use crate::person::{People, Person};
use crate::store::{PersonStore, StoreError};

pub use error::ApiError;

/// Build an axum `Router` serving the `/person/` routes from `store`.
pub fn router(store: Arc<PersonStore>) -> Router {
    Router::new()
        .route(
            "/person/",
            get(list_people)
                .post(create_person)
                .put(update_person)
                .delete(delete_without_id),
        )
        .route("/person/:id", get(get_person).delete(delete_person))
        .fallback(fallback)
        .with_state(store)
}

/// Serve the store over HTTP at the given address (e.g. `"0.0.0.0:8080"`).
pub async fn serve(store: Arc<PersonStore>, addr: &str) -> Result<(), std::io::Error> {
    let app = router(store);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "listening");
    axum::serve(listener, app).await
}

/// `POST /person/`
async fn create_person(
    State(store): State<Arc<PersonStore>>,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let person = person_from_body(&body)?;
    debug!(id = person.id, "create request");
    store.create(person)?;
    Ok(StatusCode::CREATED)
}

/// `GET /person/`
async fn list_people(State(store): State<Arc<PersonStore>>) -> Result<Json<People>, ApiError> {
    Ok(Json(store.list()?))
}

/// `GET /person/:id`
async fn get_person(
    State(store): State<Arc<PersonStore>>,
    Path(id): Path<String>,
) -> Result<Json<Person>, ApiError> {
    let id = id_from_path(&id)?;
    let person = store.get(id).map_err(|err| match err {
        StoreError::NotFound(id) => ApiError::PersonNotFound(id),
        other => ApiError::Store(other),
    })?;
    Ok(Json(person))
}

/// `PUT /person/`
async fn update_person(
    State(store): State<Arc<PersonStore>>,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let person = person_from_body(&body)?;
    debug!(id = person.id, "update request");
    store.update(person)?;
    Ok(StatusCode::OK)
}

/// `DELETE /person/:id`
async fn delete_person(
    State(store): State<Arc<PersonStore>>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = id_from_path(&id)?;
    debug!(id, "delete request");
    store.delete(id)?;
    Ok(StatusCode::OK)
}

/// `DELETE /person/`
async fn delete_without_id() -> ApiError {
    ApiError::MissingId
}

/// Unrouted paths: redirect `/person`, reject bad ids under `/person/`.
async fn fallback(uri: Uri) -> Response {
    let path = uri.path();
    if path == "/person" {
        let location = match uri.query() {
            Some(query) => format!("/person/?{query}"),
            None => "/person/".to_string(),
        };
        return (StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, location)]).into_response();
    }

    match path.strip_prefix("/person/").map(id_from_path) {
        Some(Err(err)) => err.into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Decode a person body and require a positive id.
fn person_from_body(body: &[u8]) -> Result<Person, ApiError> {
    let person: Person = serde_json::from_slice(body)?;
    if person.id <= 0 {
        return Err(ApiError::InvalidId(
            "Id should be a positive integer".to_string(),
        ));
    }
    Ok(person)
}

fn id_from_path(raw: &str) -> Result<i64, ApiError> {
    raw.parse()
        .map_err(|_| ApiError::InvalidId(format!("person id must be an integer, got {:?}", raw)))
}
