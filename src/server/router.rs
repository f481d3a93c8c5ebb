use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::future::Future;
use axum::{
    body::Bytes,
    extract::{Path as UrlPath, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::get,
    Json,
};
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::Semaphore;
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use log::{info, error};
use crate::{Result, Student, StudentFields, StudentReader, StudentStore, StudentWriter};
use crate::server::ApiError;

/// Shared state handed to every request handler.
#[derive(Clone)]
pub struct AppState {
    store: Arc<dyn StudentStore>,
    semaphore: Arc<Semaphore>,
}

/// The HTTP front of a [`StudentStore`].
///
/// Serves the JSON API under `/api/students` and every other path from a static
/// directory, falling back to its `index.html`.
pub struct Router {
    store: Arc<dyn StudentStore>,
    static_dir: PathBuf,
    max_connections: usize,
}

impl Router {
    pub fn new(store: Arc<dyn StudentStore>, static_dir: impl Into<PathBuf>) -> Self {
        Self {
            store,
            static_dir: static_dir.into(),
            max_connections: 100,
        }
    }

    /// Caps the number of requests handled at once; extra requests get `503`.
    pub fn max_connections(mut self, max: usize) -> Self {
        self.max_connections = max;
        self
    }

    /// Builds the axum application.
    pub fn app(&self) -> axum::Router {
        build_router(self.store.clone(), &self.static_dir, self.max_connections)
    }

    /// Serves until `shutdown` resolves, then waits for in-flight requests.
    pub async fn listen<F>(&self, addr: &str, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(addr).await?;
        let local: SocketAddr = listener.local_addr()?;
        info!("Student Store listening on http://{}", local);

        axum::serve(listener, self.app())
            .with_graceful_shutdown(shutdown)
            .await?;
        Ok(())
    }
}

pub fn build_router(store: Arc<dyn StudentStore>, static_dir: &Path, max_connections: usize) -> axum::Router {
    let state = AppState {
        store,
        semaphore: Arc::new(Semaphore::new(max_connections)),
    };
    let frontend = ServeDir::new(static_dir).fallback(ServeFile::new(static_dir.join("index.html")));

    axum::Router::new()
        .route("/api/students", get(list_students).post(create_student))
        .route(
            "/api/students/:id",
            get(get_student).put(update_student).delete(delete_student),
        )
        .route_layer(middleware::from_fn_with_state(state.clone(), limit_connections))
        .with_state(state)
        .fallback_service(frontend)
        .layer(CorsLayer::very_permissive())
}

async fn limit_connections(State(state): State<AppState>, request: Request, next: Next) -> Response {
    let _permit = match state.semaphore.try_acquire() {
        Ok(p) => p,
        Err(_) => {
            error!("Server busy: too many concurrent requests. Rejecting...");
            return ApiError::new(StatusCode::SERVICE_UNAVAILABLE, "server busy").into_response();
        }
    };
    next.run(request).await
}

fn invalid_json() -> ApiError {
    ApiError::new(StatusCode::BAD_REQUEST, "Invalid JSON")
}

/// Parses a request body, rejecting bodies that are not JSON or hold an
/// empty value (`null`, `false`, `0`, `""`, `[]`, `{}`).
fn parse_payload(body: &[u8]) -> std::result::Result<Value, ApiError> {
    let payload: Value = serde_json::from_slice(body).map_err(|_| invalid_json())?;
    let empty = match &payload {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    };
    if empty {
        return Err(invalid_json());
    }
    Ok(payload)
}

/// The supplied fields of an object payload; `None` for any other JSON value.
fn fields_from(payload: Value) -> Option<StudentFields> {
    match payload {
        Value::Object(_) => serde_json::from_value(payload).ok(),
        _ => None,
    }
}

async fn list_students(State(state): State<AppState>) -> std::result::Result<Json<Vec<Student>>, ApiError> {
    Ok(Json(state.store.list().await?))
}

async fn create_student(
    State(state): State<AppState>,
    body: Bytes,
) -> std::result::Result<(StatusCode, Json<Student>), ApiError> {
    // A payload that is not an object supplies no fields, so it fails validation.
    let fields = fields_from(parse_payload(&body)?).unwrap_or_default();
    let student = state.store.create(fields).await?;
    Ok((StatusCode::CREATED, Json(student)))
}

async fn get_student(
    State(state): State<AppState>,
    UrlPath(id): UrlPath<String>,
) -> std::result::Result<Json<Student>, ApiError> {
    Ok(Json(state.store.get(&id).await?))
}

async fn update_student(
    State(state): State<AppState>,
    UrlPath(id): UrlPath<String>,
    body: Bytes,
) -> std::result::Result<Json<Student>, ApiError> {
    let fields = fields_from(parse_payload(&body)?).ok_or_else(invalid_json)?;
    Ok(Json(state.store.update(&id, fields).await?))
}

async fn delete_student(
    State(state): State<AppState>,
    UrlPath(id): UrlPath<String>,
) -> std::result::Result<Json<Student>, ApiError> {
    Ok(Json(state.store.delete(&id).await?))
}
