use anyhow::Result;
use std::{
    sync::{Arc, Mutex},
    time::{Duration, Instant},
};

use tracing::{debug, error};

use crate::inventory::{AddRequest, InventoryError, InventoryRepository, Record};

use axum_extra::extract::cookie::{Cookie, SameSite};

use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{response, HeaderValue, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use super::auth::{AuthManager, AuthStore, AuthTokenValue, Permission, UserId};
use super::session::Session;
use super::{log_requests, state::*, ServerConfig};

#[derive(Serialize)]
struct ServerStats {
    pub uptime: String,
    pub hash: String,
    pub session_token: Option<String>,
}

fn format_uptime(duration: Duration) -> String {
    let total_seconds = duration.as_secs();

    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
}

#[derive(Deserialize, Debug)]
struct LoginBody {
    pub user_id: UserId,
    pub password: String,
}

#[derive(Serialize)]
struct LoginSuccessResponse {
    token: String,
}

#[derive(Deserialize, Debug)]
struct ListQuery {
    pub search: Option<String>,
}

#[derive(Serialize)]
struct DeleteResponse {
    removed: usize,
}

async fn home(session: Option<Session>, State(state): State<ServerState>) -> impl IntoResponse {
    let stats = ServerStats {
        uptime: format_uptime(state.start_time.elapsed()),
        hash: state.hash.clone(),
        session_token: session.map(|s| s.token),
    };
    Json(stats)
}

async fn get_inventory(
    State(inventory): State<GuardedInventory>,
    Query(query): Query<ListQuery>,
) -> Response {
    let inventory = inventory.lock().unwrap();
    let records = match query.search {
        Some(term) => inventory.search(&term),
        None => inventory.list(),
    };
    Json(records).into_response()
}

async fn get_artist_albums(
    State(inventory): State<GuardedInventory>,
    Path(artist): Path<String>,
) -> Response {
    let albums = inventory.lock().unwrap().albums_by_artist(&artist);
    Json(albums).into_response()
}

async fn post_record(
    session: Session,
    State(inventory): State<GuardedInventory>,
    Json(body): Json<AddRequest>,
) -> Response {
    if !session.has_permission(Permission::EditInventory) {
        return StatusCode::FORBIDDEN.into_response();
    }
    debug!("post_record() called by {} with {:?}", session.user_id, body);
    match inventory.lock().unwrap().add_or_append(body) {
        Ok(outcome) => (StatusCode::CREATED, Json(outcome)).into_response(),
        Err(err) => inventory_error_response(err),
    }
}

async fn put_record(
    session: Session,
    State(inventory): State<GuardedInventory>,
    Path(serial): Path<u64>,
    Json(record): Json<Record>,
) -> Response {
    if !session.has_permission(Permission::EditInventory) {
        return StatusCode::FORBIDDEN.into_response();
    }
    match inventory.lock().unwrap().update_record(serial, record) {
        Ok(()) => StatusCode::OK.into_response(),
        Err(err) => inventory_error_response(err),
    }
}

async fn delete_record(
    session: Session,
    State(inventory): State<GuardedInventory>,
    Path(serial): Path<u64>,
) -> Response {
    if !session.has_permission(Permission::EditInventory) {
        return StatusCode::FORBIDDEN.into_response();
    }
    match inventory.lock().unwrap().delete_record(serial) {
        Ok(removed) => Json(DeleteResponse { removed }).into_response(),
        Err(err) => inventory_error_response(err),
    }
}

async fn sort_inventory(session: Session, State(inventory): State<GuardedInventory>) -> Response {
    if !session.has_permission(Permission::EditInventory) {
        return StatusCode::FORBIDDEN.into_response();
    }
    match inventory.lock().unwrap().sort() {
        Ok(records) => Json(records).into_response(),
        Err(err) => inventory_error_response(err),
    }
}

fn inventory_error_response(err: InventoryError) -> Response {
    match err {
        InventoryError::NotFound(_) => (StatusCode::NOT_FOUND, err.to_string()).into_response(),
        InventoryError::SerialConflict(_) => {
            (StatusCode::CONFLICT, err.to_string()).into_response()
        }
        InventoryError::Storage(err) => {
            error!("Inventory storage failure: {}", err);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

async fn login(
    State(auth_manager): State<GuardedAuthManager>,
    Json(body): Json<LoginBody>,
) -> Response {
    let mut locked_manager = auth_manager.lock().unwrap();
    if let Some(credentials) = locked_manager.get_user_credentials(&body.user_id) {
        if let Ok(true) =
            credentials
                .hasher
                .verify(&body.password, &credentials.hash, &credentials.salt)
        {
            return match locked_manager.generate_auth_token(&credentials) {
                Ok(auth_token) => {
                    let response_body = LoginSuccessResponse {
                        token: auth_token.value.0.clone(),
                    };
                    let response_body = serde_json::to_string(&response_body).unwrap();

                    let cookie_value = HeaderValue::from_str(&format!(
                        "session_token={}; Path=/; HttpOnly",
                        auth_token.value.0.clone()
                    ))
                    .unwrap();
                    response::Builder::new()
                        .status(StatusCode::CREATED)
                        .header(axum::http::header::SET_COOKIE, cookie_value)
                        .body(Body::from(response_body))
                        .unwrap()
                }
                Err(err) => {
                    error!("Error with auth token generation: {}", err);
                    StatusCode::INTERNAL_SERVER_ERROR.into_response()
                }
            };
        }
    }
    StatusCode::FORBIDDEN.into_response()
}

async fn logout(State(auth_manager): State<GuardedAuthManager>, session: Session) -> Response {
    let mut locked_manager = auth_manager.lock().unwrap();
    match locked_manager.delete_auth_token(&session.user_id, &AuthTokenValue(session.token)) {
        Ok(()) => {
            let cookie_value = Cookie::build(Cookie::new("session_token", ""))
                .path("/")
                .expires(time::OffsetDateTime::now_utc() - time::Duration::days(1)) // Expire it in the past
                .same_site(SameSite::Lax)
                .build();

            response::Builder::new()
                .status(StatusCode::OK)
                .header(axum::http::header::SET_COOKIE, cookie_value.to_string())
                .body(Body::empty())
                .unwrap()
        }
        Err(_) => StatusCode::BAD_REQUEST.into_response(),
    }
}

impl ServerState {
    fn new(
        config: ServerConfig,
        repository: InventoryRepository,
        auth_manager: AuthManager,
    ) -> ServerState {
        ServerState {
            config,
            start_time: Instant::now(),
            inventory: Arc::new(Mutex::new(repository)),
            auth_manager: Arc::new(Mutex::new(auth_manager)),
            hash: "123456".to_owned(),
        }
    }
}

pub fn make_app(
    config: ServerConfig,
    repository: InventoryRepository,
    auth_store: Box<dyn AuthStore>,
) -> Result<Router> {
    let auth_manager = AuthManager::initialize(auth_store)?;
    let state = ServerState::new(config, repository, auth_manager);

    let auth_routes: Router = Router::new()
        .route("/login", post(login))
        .route("/logout", get(logout))
        .with_state(state.clone());

    let inventory_routes: Router = Router::new()
        .route("/", get(get_inventory))
        .route("/", post(post_record))
        .route("/{serial}", put(put_record))
        .route("/{serial}", delete(delete_record))
        .route("/artist/{artist}", get(get_artist_albums))
        .route("/sort", post(sort_inventory))
        .with_state(state.clone());

    let mut app: Router = Router::new()
        .route("/", get(home))
        .with_state(state.clone())
        .nest("/v1/auth", auth_routes)
        .nest("/v1/inventory", inventory_routes);

    app = app.layer(middleware::from_fn_with_state(state, log_requests));

    Ok(app)
}

pub async fn run_server(
    repository: InventoryRepository,
    auth_store: Box<dyn AuthStore>,
    requests_logging_level: super::RequestsLoggingLevel,
    port: u16,
) -> Result<()> {
    let config = ServerConfig {
        port,
        requests_logging_level,
    };
    let app = make_app(config, repository, auth_store)?;

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", port)).await?;

    Ok(axum::serve(listener, app).await?)
}
