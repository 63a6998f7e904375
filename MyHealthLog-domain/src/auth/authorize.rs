use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use my_health_log_data::repository::UserRepository;
use serde_json::json;
use tracing::{debug, error};

use crate::auth::logging::log_access_denied;
use crate::auth::AuthUser;

/// Middleware admitting only administrators.
///
/// Must run after `auth_middleware`. The admin flag is read from the
/// database on every request so a demotion takes effect immediately.
pub async fn require_admin(
    State(users): State<Arc<dyn UserRepository>>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let request_path = req.uri().path().to_string();

    let Some(caller) = req.extensions().get::<AuthUser>().copied() else {
        error!("No authenticated user found in request extensions for path: {}", request_path);
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "message": "服务器内部错误" })),
        )
            .into_response();
    };

    match users.find_by_id(caller.user_id).await {
        Ok(Some(user)) if user.is_admin => {
            debug!("User {} authorized for admin resource {}", caller.user_id, request_path);
            next.run(req).await
        }
        Ok(_) => {
            log_access_denied(&caller.user_id.to_string(), &request_path, "administrator role required");
            (
                StatusCode::FORBIDDEN,
                Json(json!({ "message": "访问被拒绝：需要管理员权限。" })),
            )
                .into_response()
        }
        Err(e) => {
            error!("Failed to load user {} for admin check: {}", caller.user_id, e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "message": "服务器内部错误" })),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{middleware, routing::get, Extension, Router};
    use my_health_log_data::models::user::NewUser;
    use my_health_log_data::repository::InMemoryStorage;
    use tower::ServiceExt;

    async fn secret() -> &'static str {
        "ok"
    }

    async fn app_for(storage: InMemoryStorage, user_id: i64) -> Router {
        let users: Arc<dyn UserRepository> = Arc::new(storage);
        Router::new()
            .route("/admin", get(secret))
            .route_layer(middleware::from_fn_with_state(users, require_admin))
            .layer(Extension(AuthUser { user_id }))
    }

    async fn seed(storage: &InMemoryStorage, name: &str, admin: bool) -> i64 {
        let user = storage
            .create(NewUser {
                username: name.to_string(),
                email: None,
                password_hash: None,
                provider: None,
            })
            .await
            .unwrap();
        storage.set_admin(user.id, admin).await.unwrap();
        user.id
    }

    fn get_admin() -> Request<Body> {
        Request::builder().uri("/admin").body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_admin_is_admitted() {
        let storage = InMemoryStorage::new();
        let id = seed(&storage, "root", true).await;
        let response = app_for(storage, id).await.oneshot(get_admin()).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_regular_and_unknown_users_are_forbidden() {
        let storage = InMemoryStorage::new();
        let id = seed(&storage, "alice", false).await;
        let response = app_for(storage.clone(), id).await.oneshot(get_admin()).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let response = app_for(storage, 999).await.oneshot(get_admin()).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
