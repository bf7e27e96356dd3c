use rocket::http::Status;
use rocket::request::{FromRequest, Outcome, Request};
use rocket::State;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::models::user::User;
use crate::store::Store;

use super::constant_time_eq;

/// Header the auth gateway sets once it has verified the caller's session.
pub const USER_HEADER: &str = "X-User-Id";

// ── Authenticated user guard ──

/// Guard: any signed-in platform user.
pub struct AuthenticatedUser {
    pub user: User,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AuthenticatedUser {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        match resolve_user(request).await {
            Some(user) => Outcome::Success(AuthenticatedUser { user }),
            None => Outcome::Forward(Status::Unauthorized),
        }
    }
}

// ── Role-specific guards ──

/// Guard: requires role = admin
pub struct AdminUser {
    pub user: User,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AdminUser {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        match resolve_user(request).await {
            Some(user) if user.is_admin() => Outcome::Success(AdminUser { user }),
            Some(_) => Outcome::Forward(Status::Forbidden),
            None => Outcome::Forward(Status::Unauthorized),
        }
    }
}

/// Guard: requires role = club
pub struct ClubUser {
    pub user: User,
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for ClubUser {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        match resolve_user(request).await {
            Some(user) if user.is_club() => Outcome::Success(ClubUser { user }),
            Some(_) => Outcome::Forward(Status::Forbidden),
            None => Outcome::Forward(Status::Unauthorized),
        }
    }
}

async fn resolve_user(request: &Request<'_>) -> Option<User> {
    let store = request
        .guard::<&State<Arc<dyn Store>>>()
        .await
        .succeeded()?;
    let id: i64 = request.headers().get_one(USER_HEADER)?.trim().parse().ok()?;
    match store.user_get(id) {
        Ok(user) => user,
        Err(e) => {
            log::error!("user lookup failed: {}", e);
            None
        }
    }
}

// ── Scheduled-function caller ──

/// Guard: `Authorization: Bearer <service secret>`, compared exactly. An
/// unset secret rejects every caller.
pub struct ServiceCaller;

#[rocket::async_trait]
impl<'r> FromRequest<'r> for ServiceCaller {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let secret = match request.guard::<&State<AppConfig>>().await {
            Outcome::Success(config) => config.functions.service_secret.clone(),
            _ => String::new(),
        };
        let token = request
            .headers()
            .get_one("Authorization")
            .and_then(|h| h.strip_prefix("Bearer "));
        match token {
            Some(token) if is_service_token(token, &secret) => Outcome::Success(ServiceCaller),
            _ => {
                log::warn!(
                    "[functions] rejected call to {} from {}",
                    request.uri().path(),
                    request
                        .client_ip()
                        .map(|ip| ip.to_string())
                        .unwrap_or_else(|| "unknown".to_string())
                );
                Outcome::Error((Status::Unauthorized, ()))
            }
        }
    }
}

pub fn is_service_token(token: &str, secret: &str) -> bool {
    !secret.is_empty() && constant_time_eq(token.as_bytes(), secret.as_bytes())
}
