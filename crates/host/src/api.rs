//! REST API server for game-host
//!
//! Exposes the virtual namespace over HTTP. The caller's identity comes from
//! the `user` query parameter; authentication is the front-end proxy's job.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use game_host_protocol::{Credential, FileType};
use game_host_vfs::{
    load_specification, resolve_path, walk_tree, Item, ItemError, ItemVector, RootItem,
    ServiceRoot, Session, ToolKind, TreeNode,
};
use serde::Deserialize;
use tracing::{debug, warn};

// Shared state
#[derive(Clone)]
pub struct AppState {
    pub root: Arc<ServiceRoot>,
}

impl AppState {
    pub fn new(root: ServiceRoot) -> Self {
        Self {
            root: Arc::new(root),
        }
    }

    /// Session for a request; no user means admin
    fn session(&self, user: Option<&str>) -> Session {
        Session::new(
            Arc::clone(&self.root),
            Credential::from_user_id(user.unwrap_or_default()),
        )
    }
}

/// Query parameters of `/files` and `/tree`
#[derive(Debug, Default, Deserialize)]
pub struct NodeQuery {
    pub user: Option<String>,
    pub depth: Option<usize>,
}

/// Query parameters of `/spec`
#[derive(Debug, Default, Deserialize)]
pub struct SpecQuery {
    pub user: Option<String>,
    pub files: Option<String>,
}

// Routes
pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_check))
        .route("/files", get(get_root))
        .route("/files/*path", get(get_path))
        .route("/tree", get(tree_root))
        .route("/tree/*path", get(tree_path))
        .route("/spec/:kind/:tool", get(get_specification))
}

/// Router with state attached, ready to serve
pub fn app(state: AppState) -> Router {
    api_router().with_state(state)
}

/// Error response: `{"error": message}` with a status per error category
#[derive(Debug)]
pub struct ApiError(pub ItemError);

impl From<ItemError> for ApiError {
    fn from(e: ItemError) -> Self {
        Self(e)
    }
}

pub const fn status_for(error: &ItemError) -> StatusCode {
    match error {
        ItemError::NotFound(_) => StatusCode::NOT_FOUND,
        ItemError::PermissionDenied(_) => StatusCode::FORBIDDEN,
        ItemError::InvalidOperation(_) => StatusCode::BAD_REQUEST,
        ItemError::Remote(_) => StatusCode::BAD_GATEWAY,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        if status.is_server_error() {
            warn!(error = %self.0, "request failed");
        } else {
            debug!(error = %self.0, %status, "request rejected");
        }
        (status, Json(serde_json::json!({ "error": self.0.to_string() }))).into_response()
    }
}

// Handlers

async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}

async fn get_root(
    State(state): State<AppState>,
    Query(query): Query<NodeQuery>,
) -> Result<Response, ApiError> {
    let session = state.session(query.user.as_deref());
    respond(&RootItem, &session).await
}

async fn get_path(
    State(state): State<AppState>,
    Path(path): Path<String>,
    Query(query): Query<NodeQuery>,
) -> Result<Response, ApiError> {
    let session = state.session(query.user.as_deref());
    let mut trace = ItemVector::new();
    let item = resolve_path(&RootItem, &session, &path, &mut trace).await?;
    respond(item, &session).await
}

/// File → bytes, Directory → child metadata, anything else → own metadata
async fn respond(item: &dyn Item, session: &Session) -> Result<Response, ApiError> {
    let info = item.info(session).await?;
    let response = match info.kind {
        FileType::File => {
            let data = item.content(session).await?;
            ([(header::CONTENT_TYPE, "application/octet-stream")], data).into_response()
        }
        FileType::Directory => {
            let mut children = Vec::new();
            for child in item.list_content(session).await? {
                children.push(child.info(session).await?);
            }
            Json(children).into_response()
        }
        FileType::Unknown => Json(info).into_response(),
    };
    Ok(response)
}

async fn tree_root(
    State(state): State<AppState>,
    Query(query): Query<NodeQuery>,
) -> Result<Json<TreeNode>, ApiError> {
    tree(&state, None, &query).await
}

async fn tree_path(
    State(state): State<AppState>,
    Path(path): Path<String>,
    Query(query): Query<NodeQuery>,
) -> Result<Json<TreeNode>, ApiError> {
    tree(&state, Some(&path), &query).await
}

async fn tree(
    state: &AppState,
    path: Option<&str>,
    query: &NodeQuery,
) -> Result<Json<TreeNode>, ApiError> {
    let session = state.session(query.user.as_deref());
    let max_depth = session.options().max_depth;
    let depth = query.depth.map_or(max_depth, |d| d.min(max_depth));

    let mut trace = ItemVector::new();
    let item: &dyn Item = match path {
        Some(path) => resolve_path(&RootItem, &session, path, &mut trace).await?,
        None => &RootItem,
    };
    Ok(Json(walk_tree(item, &session, depth).await?))
}

async fn get_specification(
    State(state): State<AppState>,
    Path((kind, tool)): Path<(String, String)>,
    Query(query): Query<SpecQuery>,
) -> Result<Json<BTreeMap<String, String>>, ApiError> {
    let kind = ToolKind::from_segment(&kind)
        .ok_or_else(|| ItemError::not_found(format!("no tool kind '{kind}'")))?;
    let session = state.session(query.user.as_deref());
    let names: Vec<&str> = query
        .files
        .as_deref()
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .collect();

    let files = load_specification(&session, kind, &tool, &names).await?;
    Ok(Json(
        files
            .into_iter()
            .map(|(name, data)| (name, base64_encode(&data)))
            .collect(),
    ))
}

/// Specification files are binary; JSON carries them as base64
fn base64_encode(data: &[u8]) -> String {
    use base64::{engine::general_purpose::STANDARD, Engine};
    STANDARD.encode(data)
}
