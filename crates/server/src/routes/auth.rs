//! Authentication routes.
//!
//! Signup, login, and the passcode-based password recovery flow. The
//! forgot-password endpoint answers identically whether or not the address
//! names an account.

use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use serde::{Deserialize, Serialize};

use denfit_core::UserProfile;

use crate::error::Result;
use crate::services::auth::{AuthService, token};
use crate::services::mail::templates;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
        .route("/auth/forgot-password", post(forgot_password))
        .route("/auth/verify-passcode", post(verify_passcode))
        .route("/auth/reset-password", post(reset_password))
}

#[derive(Debug, Deserialize)]
struct SignupRequest {
    name: String,
    email: String,
    password: String,
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Debug, Serialize)]
struct AuthResponse {
    token: String,
    user: UserProfile,
}

#[derive(Debug, Serialize)]
struct MessageResponse {
    message: String,
}

#[derive(Debug, Serialize)]
struct ResetResponse {
    message: String,
    token: String,
    user: UserProfile,
}

/// POST /auth/signup
async fn signup(
    State(state): State<AppState>,
    Json(body): Json<SignupRequest>,
) -> Result<(StatusCode, Json<AuthResponse>)> {
    let auth = AuthService::new(state.pool());
    let user = auth.signup(&body.name, &body.email, &body.password).await?;
    let token = token::issue_token(user.id, &state.config().jwt_secret)?;

    tracing::info!(user = %user.id, "Account created");

    let (subject, text) = templates::welcome(&user.name);
    state
        .mailer()
        .send_in_background(user.email.clone(), subject, text);

    let profile = user.profile()?;
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            token,
            user: profile,
        }),
    ))
}

/// POST /auth/login
async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    let auth = AuthService::new(state.pool());
    let user = auth.login(&body.email, &body.password).await?;
    let token = token::issue_token(user.id, &state.config().jwt_secret)?;

    let (subject, text) = templates::login_notification(&user.name);
    state
        .mailer()
        .send_in_background(user.email.clone(), subject, text);

    let profile = user.profile()?;
    Ok(Json(AuthResponse {
        token,
        user: profile,
    }))
}

#[derive(Debug, Deserialize)]
struct ForgotPasswordRequest {
    email: String,
}

/// POST /auth/forgot-password
async fn forgot_password(
    State(state): State<AppState>,
    Json(body): Json<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>> {
    let auth = AuthService::new(state.pool());

    if let Some((user, passcode)) = auth.start_password_reset(&body.email).await? {
        let (subject, text) = templates::reset_passcode(&user.name, &passcode);
        state
            .mailer()
            .send_in_background(user.email.clone(), subject, text);
    }

    // Same response whether or not the account exists.
    Ok(Json(MessageResponse {
        message: "If an account exists for that email, a passcode has been sent.".to_string(),
    }))
}

#[derive(Debug, Deserialize)]
struct VerifyPasscodeRequest {
    email: String,
    passcode: String,
}

/// POST /auth/verify-passcode
async fn verify_passcode(
    State(state): State<AppState>,
    Json(body): Json<VerifyPasscodeRequest>,
) -> Result<Json<MessageResponse>> {
    let auth = AuthService::new(state.pool());
    auth.verify_passcode(&body.email, &body.passcode).await?;

    Ok(Json(MessageResponse {
        message: "Passcode verified".to_string(),
    }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResetPasswordRequest {
    email: String,
    passcode: String,
    new_password: String,
}

/// POST /auth/reset-password
async fn reset_password(
    State(state): State<AppState>,
    Json(body): Json<ResetPasswordRequest>,
) -> Result<Json<ResetResponse>> {
    let auth = AuthService::new(state.pool());
    let user = auth
        .reset_password(&body.email, &body.passcode, &body.new_password)
        .await?;
    let token = token::issue_token(user.id, &state.config().jwt_secret)?;

    tracing::info!(user = %user.id, "Password reset");

    let profile = user.profile()?;
    Ok(Json(ResetResponse {
        message: "Password reset successful".to_string(),
        token,
        user: profile,
    }))
}
