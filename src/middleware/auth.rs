//! Bearer-token authentication
//!
//! Verifies the JWT on every protected request and injects the resulting
//! [`ActorContext`] into the request extensions. Handlers take it with
//! `Extension<ActorContext>` and pass it explicitly into the services.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
    Extension,
};

use crate::{
    models::ActorContext,
    state::AppState,
    utils::{
        errors::AppError,
        jwt::{actor_from_claims, extract_token_from_header, verify_token},
    },
};

/// JWT authentication middleware
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("Authorization token required".to_string()))?;

    let token = extract_token_from_header(auth_header)?;
    let claims = verify_token(token, &state.jwt)?;
    let actor = actor_from_claims(&claims)?;

    request.extensions_mut().insert(actor);

    Ok(next.run(request).await)
}

/// Admin guard, layered inside [`auth_middleware`]
pub async fn admin_only_middleware(
    Extension(actor): Extension<ActorContext>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if !actor.is_admin() {
        return Err(AppError::Forbidden("Administrator permissions required".to_string()));
    }

    Ok(next.run(request).await)
}
