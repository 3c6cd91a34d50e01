use std::sync::{Arc, Mutex};

use anyhow::Context;
use axum::{
    Json, Router,
    extract::{Query, Request, State},
    http::{HeaderValue, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use serde::{Deserialize, Serialize};
use tower_http::limit::RequestBodyLimitLayer;

use larder_core::db::ConstraintViolation;
use larder_core::models::{parse_date, validate_quantity};
use larder_core::service::PantryService;

const BODY_LIMIT: usize = 1024 * 1024; // 1 MB

#[derive(Clone)]
struct AppState {
    svc: Arc<Mutex<PantryService>>,
}

impl AppState {
    fn lock(&self) -> std::sync::MutexGuard<'_, PantryService> {
        self.svc
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

// --- Request / Response types ---

#[derive(Deserialize)]
struct AddUserRequest {
    username: Option<String>,
    email: Option<String>,
    password: Option<String>,
}

#[derive(Deserialize)]
struct AddRecipeRequest {
    name: Option<String>,
    instructions: Option<String>,
    user_id: Option<i64>,
}

#[derive(Deserialize)]
struct AddPantryItemRequest {
    name: Option<String>,
    quantity: Option<i64>,
    expiry_date: Option<String>,
    user_id: Option<i64>,
}

#[derive(Deserialize)]
struct AddFavoriteRequest {
    user_id: Option<i64>,
    recipe_id: Option<i64>,
}

#[derive(Deserialize)]
struct EmailQuery {
    email: Option<String>,
}

#[derive(Deserialize)]
struct NameQuery {
    name: Option<String>,
}

#[derive(Deserialize)]
struct UserIdQuery {
    user_id: Option<i64>,
}

#[derive(Deserialize)]
struct ItemIdQuery {
    item_id: Option<i64>,
}

#[derive(Deserialize)]
struct FavoriteIdQuery {
    favorite_id: Option<i64>,
}

#[derive(Serialize)]
struct UserProfile {
    username: String,
    email: String,
}

#[derive(Serialize)]
struct RecipeSummary {
    name: String,
    instructions: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

// --- Error handling ---

enum ApiError {
    BadRequest(String),
    NotFound(String),
    Conflict(String),
    Internal(anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Self::Conflict(msg) => (StatusCode::CONFLICT, msg),
            Self::Internal(err) => {
                eprintln!("Internal server error: {err:#}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<ConstraintViolation>() {
            Ok(violation) => Self::Conflict(violation.to_string()),
            Err(other) => Self::Internal(other),
        }
    }
}

/// Missing or empty required parameter → 400, matching the handler contract.
fn require_param(value: Option<String>, name: &str) -> Result<String, ApiError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ApiError::BadRequest(format!(
            "{name} parameter is required"
        ))),
    }
}

fn require_field<T>(value: Option<T>, name: &str) -> Result<T, ApiError> {
    value.ok_or_else(|| ApiError::BadRequest(format!("{name} field is required")))
}

fn require_text_field(value: Option<String>, name: &str) -> Result<String, ApiError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ApiError::BadRequest(format!("{name} field is required"))),
    }
}

// --- Middleware ---

async fn security_headers(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert(
        "x-content-type-options",
        HeaderValue::from_static("nosniff"),
    );
    headers.insert("x-frame-options", HeaderValue::from_static("DENY"));
    headers.insert(
        "content-security-policy",
        HeaderValue::from_static("default-src 'none'"),
    );
    response
}

// --- User handlers ---

async fn search_user_by_email(
    State(state): State<AppState>,
    Query(params): Query<EmailQuery>,
) -> Result<Json<UserProfile>, ApiError> {
    let email = require_param(params.email, "email")?;
    let user = {
        let svc = state.lock();
        svc.search_user_by_email(&email).context("database error")?
    };
    let user =
        user.ok_or_else(|| ApiError::NotFound(format!("No user found with email '{email}'")))?;
    Ok(Json(UserProfile {
        username: user.username,
        email: user.email,
    }))
}

async fn delete_user_by_email(
    State(state): State<AppState>,
    Query(params): Query<EmailQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let email = require_param(params.email, "email")?;
    let deleted = {
        let svc = state.lock();
        svc.delete_user_by_email(&email).context("database error")?
    };
    if deleted {
        Ok(Json(
            serde_json::json!({ "message": "User deleted successfully" }),
        ))
    } else {
        Err(ApiError::NotFound(format!(
            "No user found with email '{email}' to delete"
        )))
    }
}

async fn add_user(
    State(state): State<AppState>,
    Json(req): Json<AddUserRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let username = require_text_field(req.username, "username")?;
    let email = require_text_field(req.email, "email")?;
    let password = require_text_field(req.password, "password")?;

    let user = {
        let svc = state.lock();
        svc.register_user(&username, &email, &password)?
    };

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "message": "User added successfully",
            "user_id": user.id,
        })),
    ))
}

// --- Recipe handlers ---

async fn search_recipe_by_name(
    State(state): State<AppState>,
    Query(params): Query<NameQuery>,
) -> Result<Json<RecipeSummary>, ApiError> {
    let name = require_param(params.name, "name")?;
    let recipe = {
        let svc = state.lock();
        svc.search_recipe_by_name(&name).context("database error")?
    };
    let recipe =
        recipe.ok_or_else(|| ApiError::NotFound(format!("No recipe found with name '{name}'")))?;
    Ok(Json(RecipeSummary {
        name: recipe.name,
        instructions: recipe.instructions,
    }))
}

async fn delete_recipe_by_name(
    State(state): State<AppState>,
    Query(params): Query<NameQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let name = require_param(params.name, "name")?;
    let deleted = {
        let svc = state.lock();
        svc.delete_recipe_by_name(&name).context("database error")?
    };
    if deleted {
        Ok(Json(
            serde_json::json!({ "message": "Recipe deleted successfully" }),
        ))
    } else {
        Err(ApiError::NotFound(format!(
            "No recipe found with name '{name}' to delete"
        )))
    }
}

async fn add_recipe(
    State(state): State<AppState>,
    Json(req): Json<AddRecipeRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let name = require_text_field(req.name, "name")?;
    let instructions = require_text_field(req.instructions, "instructions")?;
    let user_id = require_field(req.user_id, "user_id")?;

    let recipe = {
        let svc = state.lock();
        svc.add_recipe(&name, &instructions, user_id)?
    };

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "message": "Recipe added successfully",
            "recipe_id": recipe.id,
        })),
    ))
}

// --- Pantry item handlers ---

async fn add_pantry_item(
    State(state): State<AppState>,
    Json(req): Json<AddPantryItemRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let name = require_text_field(req.name, "name")?;
    let expiry_raw = require_text_field(req.expiry_date, "expiry_date")?;
    let user_id = require_field(req.user_id, "user_id")?;
    let quantity = req.quantity.unwrap_or(1);
    validate_quantity(quantity).map_err(|e| ApiError::BadRequest(format!("{e}")))?;

    let expiry_date =
        parse_date(&expiry_raw).map_err(|e| ApiError::BadRequest(format!("{e}")))?;

    let item = {
        let svc = state.lock();
        svc.add_pantry_item(&name, quantity, expiry_date, user_id)?
    };

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "message": "Pantry item added successfully",
            "item_id": item.id,
        })),
    ))
}

async fn delete_pantry_item(
    State(state): State<AppState>,
    Query(params): Query<ItemIdQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let item_id = require_field(params.item_id, "item_id")
        .map_err(|_| ApiError::BadRequest("item_id parameter is required".to_string()))?;
    let deleted = {
        let svc = state.lock();
        svc.delete_pantry_item(item_id).context("database error")?
    };
    if deleted {
        Ok(Json(
            serde_json::json!({ "message": "Pantry item deleted successfully" }),
        ))
    } else {
        Err(ApiError::NotFound(format!(
            "No pantry item found with id {item_id}"
        )))
    }
}

async fn search_pantry_item_by_name(
    State(state): State<AppState>,
    Query(params): Query<NameQuery>,
) -> Result<Json<Vec<larder_core::models::PantryItem>>, ApiError> {
    let name = require_param(params.name, "name")?;
    let items = {
        let svc = state.lock();
        svc.search_pantry_items(&name).context("database error")?
    };
    // Empty result is a 200 with an empty list, like the other collection endpoints
    Ok(Json(items))
}

async fn get_pantry_items_by_user(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Vec<larder_core::models::PantryItem>>, ApiError> {
    let user_id = require_field(params.user_id, "user_id")
        .map_err(|_| ApiError::BadRequest("user_id parameter is required".to_string()))?;
    let items = {
        let svc = state.lock();
        svc.pantry_items_for_user(user_id).context("database error")?
    };
    Ok(Json(items))
}

// --- Favorite handlers ---

async fn add_favorite(
    State(state): State<AppState>,
    Json(req): Json<AddFavoriteRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let user_id = require_field(req.user_id, "user_id")?;
    let recipe_id = require_field(req.recipe_id, "recipe_id")?;

    let favorite = {
        let svc = state.lock();
        svc.add_favorite(user_id, recipe_id)?
    };

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "message": "Favorite added successfully",
            "favorite_id": favorite.id,
        })),
    ))
}

async fn get_favorites_by_user(
    State(state): State<AppState>,
    Query(params): Query<UserIdQuery>,
) -> Result<Json<Vec<larder_core::models::Favorite>>, ApiError> {
    let user_id = require_field(params.user_id, "user_id")
        .map_err(|_| ApiError::BadRequest("user_id parameter is required".to_string()))?;
    let favorites = {
        let svc = state.lock();
        svc.favorites_for_user(user_id).context("database error")?
    };
    Ok(Json(favorites))
}

async fn delete_favorite(
    State(state): State<AppState>,
    Query(params): Query<FavoriteIdQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let favorite_id = require_field(params.favorite_id, "favorite_id")
        .map_err(|_| ApiError::BadRequest("favorite_id parameter is required".to_string()))?;
    let deleted = {
        let svc = state.lock();
        svc.delete_favorite(favorite_id).context("database error")?
    };
    if deleted {
        Ok(Json(
            serde_json::json!({ "message": "Favorite deleted successfully" }),
        ))
    } else {
        Err(ApiError::NotFound(format!(
            "No favorite found with id {favorite_id}"
        )))
    }
}

// --- Router builder ---

fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/search_user_by_email", get(search_user_by_email))
        .route("/api/delete_user_by_email", delete(delete_user_by_email))
        .route("/api/add_user", post(add_user))
        .route("/api/search_recipe_by_name", get(search_recipe_by_name))
        .route("/api/delete_recipe_by_name", delete(delete_recipe_by_name))
        .route("/api/add_recipe", post(add_recipe))
        .route("/api/add_pantry_item", post(add_pantry_item))
        .route("/api/delete_pantry_item", delete(delete_pantry_item))
        .route(
            "/api/search_pantry_item_by_name",
            get(search_pantry_item_by_name),
        )
        .route("/api/get_pantry_items_by_user", get(get_pantry_items_by_user))
        .route("/api/add_favorite", post(add_favorite))
        .route("/api/get_favorites_by_user", get(get_favorites_by_user))
        .route("/api/delete_favorite", delete(delete_favorite))
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT))
        .layer(middleware::from_fn(security_headers))
        .with_state(state)
}

// --- Server startup ---

pub async fn start_server(service: PantryService, port: u16, bind: &str) -> anyhow::Result<()> {
    let state = AppState {
        svc: Arc::new(Mutex::new(service)),
    };

    let app = build_router(state);

    if bind != "127.0.0.1" && bind != "localhost" {
        eprintln!(
            "Warning: Listening on {bind}. Any device on your network can access this API."
        );
    }

    let listener = tokio::net::TcpListener::bind(format!("{bind}:{port}")).await?;
    eprintln!("Listening on http://{bind}:{port}");
    axum::serve(listener, app).await?;

    Ok(())
}
