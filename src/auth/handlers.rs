use axum::{
    extract::State,
    http::StatusCode,
    routing::{any, get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tracing::{error, info, instrument, warn};

use crate::{
    auth::{
        dto::{AuthResponse, LoginRequest, PublicUser, RegisterRequest},
        extractors::CurrentUser,
        repo::is_unique_violation,
        repo_types::User,
        services::{
            generate_authentication_token, hash_password, is_valid_email, normalize_email,
            verify_password, MIN_PASSWORD_LEN,
        },
    },
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(register))
        .route("/users/sign_in", post(sign_in))
        .route("/authentication_failure", any(authentication_failure))
}

pub fn me_routes() -> Router<AppState> {
    Router::new().route("/me", get(get_me).delete(delete_me))
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(mut payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), (StatusCode, String)> {
    payload.email = normalize_email(&payload.email);
    payload.name = payload.name.trim().to_string();

    if payload.name.is_empty() {
        warn!("blank name");
        return Err((StatusCode::UNPROCESSABLE_ENTITY, "Name can't be blank".into()));
    }

    if !is_valid_email(&payload.email) {
        warn!(email = %payload.email, "invalid email");
        return Err((StatusCode::UNPROCESSABLE_ENTITY, "Invalid email".into()));
    }

    if payload.password.len() < MIN_PASSWORD_LEN {
        warn!("password too short");
        return Err((StatusCode::UNPROCESSABLE_ENTITY, "Password too short".into()));
    }

    // Ensure email is not taken
    match User::find_by_email(&state.db, &payload.email).await {
        Ok(None) => {}
        Ok(Some(_)) => {
            warn!(email = %payload.email, "email already registered");
            return Err((StatusCode::CONFLICT, "Email already registered".into()));
        }
        Err(e) => {
            error!(error = %e, "find_by_email failed");
            return Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()));
        }
    }

    let hash = match hash_password(&payload.password) {
        Ok(h) => h,
        Err(e) => {
            error!(error = %e, "hash_password failed");
            return Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()));
        }
    };

    let token = generate_authentication_token();
    let user = match User::create(&state.db, &payload.name, &payload.email, &hash, &token).await {
        Ok(u) => u,
        Err(e) if is_unique_violation(&e) => {
            warn!(email = %payload.email, "email registered concurrently");
            return Err((StatusCode::CONFLICT, "Email already registered".into()));
        }
        Err(e) => {
            error!(error = %e, "create user failed");
            return Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()));
        }
    };

    info!(user_id = user.id, email = %user.email, "user registered");
    Ok((StatusCode::CREATED, Json(user.into())))
}

#[instrument(skip(state, payload))]
pub async fn sign_in(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, (StatusCode, String)> {
    payload.email = normalize_email(&payload.email);

    let user = match User::find_by_email(&state.db, &payload.email).await {
        Ok(Some(u)) => u,
        Ok(None) => {
            warn!(email = %payload.email, "sign in unknown email");
            return Err((StatusCode::UNAUTHORIZED, "Invalid credentials".into()));
        }
        Err(e) => {
            error!(error = %e, "find_by_email failed");
            return Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()));
        }
    };

    let ok = match verify_password(&payload.password, &user.password_hash) {
        Ok(v) => v,
        Err(e) => {
            error!(error = %e, "verify_password failed");
            return Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()));
        }
    };

    if !ok {
        warn!(email = %payload.email, user_id = user.id, "sign in invalid password");
        return Err((StatusCode::UNAUTHORIZED, "Invalid credentials".into()));
    }

    info!(user_id = user.id, email = %user.email, "user signed in");
    Ok(Json(user.into()))
}

#[instrument(skip(state))]
pub async fn get_me(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
) -> Result<Json<PublicUser>, (StatusCode, String)> {
    match User::find_by_id(&state.db, caller.id).await {
        Ok(Some(user)) => Ok(Json(user.into())),
        Ok(None) => Err((StatusCode::UNAUTHORIZED, "User not found".into())),
        Err(e) => {
            error!(error = %e, user_id = caller.id, "load user failed");
            Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}

#[instrument(skip(state))]
pub async fn delete_me(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
) -> Result<Json<Value>, (StatusCode, String)> {
    match User::delete(&state.db, caller.id).await {
        Ok(true) => {
            info!(user_id = caller.id, "user deleted");
            Ok(Json(json!({})))
        }
        Ok(false) => Err((StatusCode::NOT_FOUND, "User not found".into())),
        Err(e) => {
            error!(error = %e, user_id = caller.id, "delete user failed");
            Err((StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}

pub async fn authentication_failure() -> (StatusCode, Json<Value>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": "You need to sign in or sign up before continuing." })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        app::build_app,
        testing::{MemoryFavourites, StaticIdentities},
    };
    use axum::{body::Body, http::Request};
    use http_body_util::BodyExt;
    use std::sync::Arc;
    use tower::ServiceExt;

    #[test]
    fn public_user_hides_credentials() {
        let user = User {
            id: 7,
            name: "test".into(),
            email: "test@example.com".into(),
            password_hash: "$argon2id$secret".into(),
            authentication_token: "tok".into(),
            created_at: time::OffsetDateTime::now_utc(),
        };

        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2"));
        assert!(!json.contains("authentication_token"));

        let public = serde_json::to_value(PublicUser::from(user)).unwrap();
        assert_eq!(public, json!({ "id": 7, "name": "test", "email": "test@example.com" }));
    }

    #[tokio::test]
    async fn authentication_failure_answers_401_json() {
        let state = AppState::fake(
            Arc::new(MemoryFavourites::new(&[], &[])),
            Arc::new(StaticIdentities::default()),
        );
        let app = build_app(state);

        // redirected PATCH/DELETE requests may keep their method
        for method in ["GET", "POST", "PATCH", "DELETE"] {
            let response = app
                .clone()
                .oneshot(
                    Request::builder()
                        .method(method)
                        .uri("/api/v1/authentication_failure")
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();

            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{method}");
            let body = response.into_body().collect().await.unwrap().to_bytes();
            let value: Value = serde_json::from_slice(&body).unwrap();
            assert!(value["error"].is_string());
        }
    }

    #[tokio::test]
    async fn me_without_credentials_redirects() {
        let state = AppState::fake(
            Arc::new(MemoryFavourites::new(&[], &[])),
            Arc::new(StaticIdentities::default()),
        );
        let response = build_app(state)
            .oneshot(Request::builder().uri("/api/v1/me").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(
            response.headers()[axum::http::header::LOCATION],
            "/api/v1/authentication_failure"
        );
    }
}
