use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use givebox_core::categories::{Category, NewCategory};
use givebox_core::AccessPolicy;

use crate::{
    auth::CurrentUser,
    error::{ApiError, ApiJson, ApiResult},
    main_lib::AppState,
};

async fn list_categories(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Category>>> {
    let categories = state.category_service.get_all_categories()?;
    Ok(Json(categories))
}

async fn get_category(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Category>> {
    let category = state.category_service.get_category(&id)?;
    Ok(Json(category))
}

async fn create_category(
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
    body: Result<ApiJson<NewCategory>, ApiError>,
) -> ApiResult<(StatusCode, Json<Category>)> {
    let admin = AccessPolicy::require_admin(user.principal(), &state.admin_users)?;
    let ApiJson(new_category) = body?;
    let category = state.category_service.create_category(new_category).await?;
    tracing::info!(category = %category.id, admin = %admin.username, "category created");
    Ok((StatusCode::CREATED, Json(category)))
}

async fn delete_category(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
    user: CurrentUser,
) -> ApiResult<StatusCode> {
    let admin = AccessPolicy::require_admin(user.principal(), &state.admin_users)?;
    state.category_service.delete_category(id.clone()).await?;
    tracing::info!(category = %id, admin = %admin.username, "category deleted");
    Ok(StatusCode::NO_CONTENT)
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/categories", get(list_categories).post(create_category))
        .route(
            "/categories/{id}",
            get(get_category).delete(delete_category),
        )
}
