use crate::auth::{CurrentUser, SESSION_COOKIE, parse_session_cookie_value};
use crate::config::{Config, SessionConfig};
use crate::database::postgres_repository::PostgresRepository;
use crate::database::preferences::PreferencesRepository;
use crate::database::user::{dummy_verify, verify_password};
use crate::error::app_error::AppError;
use crate::error::json::JsonBody;
use crate::models::user::{ChangePasswordRequest, LoginRequest, RegisterRequest, User, UserResponse};
use chrono::{Duration, Utc};
use rocket::http::{Cookie, CookieJar, SameSite, Status};
use rocket::serde::json::Json;
use rocket::time::Duration as CookieDuration;
use rocket::{State, get, post};
use rocket_okapi::openapi;
use sqlx::PgPool;
use tracing::{info, warn};
use validator::Validate;

pub fn build_auth_cookie(value: String, session: &SessionConfig) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, value))
        .path("/")
        .http_only(true)
        .secure(session.cookie_secure)
        .same_site(SameSite::Lax)
        .max_age(CookieDuration::hours(session.ttl_hours))
        .build()
}

async fn start_session(repo: &PostgresRepository, cookies: &CookieJar<'_>, user: &User, session: &SessionConfig) -> Result<(), AppError> {
    let expires_at = Utc::now() + Duration::hours(session.ttl_hours);
    let created = repo.create_session(&user.id, expires_at).await?;
    cookies.add_private(build_auth_cookie(created.cookie_value(), session));
    Ok(())
}

/// Create an account and log it in
#[openapi(tag = "Users")]
#[post("/register", data = "<payload>")]
pub async fn register(
    pool: &State<PgPool>,
    config: &State<Config>,
    cookies: &CookieJar<'_>,
    payload: JsonBody<RegisterRequest>,
) -> Result<(Status, Json<UserResponse>), AppError> {
    payload.validate()?;

    let repo = PostgresRepository::new(pool.inner().clone());
    let email = payload.email.trim().to_lowercase();
    let user = repo.create_user(payload.name.as_deref(), &email, &payload.password).await?;
    repo.get_or_create_preferences(&user.id).await?;
    start_session(&repo, cookies, &user, &config.session).await?;

    info!(user_id = %user.id, "Registered user");
    Ok((Status::Created, Json(UserResponse::from(&user))))
}

/// Log in with email and password
#[openapi(tag = "Users")]
#[post("/login", data = "<payload>")]
pub async fn login(
    pool: &State<PgPool>,
    config: &State<Config>,
    cookies: &CookieJar<'_>,
    payload: JsonBody<LoginRequest>,
) -> Result<Json<UserResponse>, AppError> {
    payload.validate()?;

    let repo = PostgresRepository::new(pool.inner().clone());
    let Some(user) = repo.get_user_by_email(&payload.email).await? else {
        dummy_verify(&payload.password);
        warn!("Login attempt for unknown email");
        return Err(AppError::InvalidCredentials);
    };

    if let Err(err) = verify_password(&user, &payload.password) {
        warn!(user_id = %user.id, "Login attempt with wrong password");
        return Err(err);
    }

    start_session(&repo, cookies, &user, &config.session).await?;
    info!(user_id = %user.id, "User logged in");
    Ok(Json(UserResponse::from(&user)))
}

/// End the current session
#[openapi(tag = "Users")]
#[post("/logout")]
pub async fn logout(pool: &State<PgPool>, cookies: &CookieJar<'_>) -> Result<Status, AppError> {
    if let Some((session_id, user_id)) = cookies.get_private(SESSION_COOKIE).and_then(|c| parse_session_cookie_value(c.value())) {
        let repo = PostgresRepository::new(pool.inner().clone());
        repo.delete_session(&session_id, &user_id).await?;
    }

    cookies.remove_private(Cookie::build(SESSION_COOKIE).path("/").build());
    Ok(Status::Ok)
}

/// The logged-in user
#[openapi(tag = "Users")]
#[get("/me")]
pub async fn me(pool: &State<PgPool>, current_user: CurrentUser) -> Result<Json<UserResponse>, AppError> {
    let repo = PostgresRepository::new(pool.inner().clone());
    let user = repo.get_user_by_id(&current_user.id).await?.ok_or(AppError::UserNotFound)?;
    Ok(Json(UserResponse::from(&user)))
}

/// Change the password of the logged-in user
#[openapi(tag = "Users")]
#[post("/change-password", data = "<payload>")]
pub async fn change_password(pool: &State<PgPool>, current_user: CurrentUser, payload: JsonBody<ChangePasswordRequest>) -> Result<Status, AppError> {
    payload.validate()?;

    let repo = PostgresRepository::new(pool.inner().clone());
    repo.change_password(&current_user.id, &payload.current_password, &payload.new_password).await?;

    info!(user_id = %current_user.id, "Password changed");
    Ok(Status::Ok)
}

pub fn routes() -> (Vec<rocket::Route>, okapi::openapi3::OpenApi) {
    rocket_okapi::openapi_get_routes_spec![register, login, logout, me, change_password]
}

#[cfg(test)]
mod tests {
    use super::build_auth_cookie;
    use crate::config::SessionConfig;
    use crate::{Config, build_rocket};
    use rocket::http::{ContentType, SameSite, Status};
    use rocket::local::asynchronous::Client;

    #[test]
    fn auth_cookie_follows_session_config() {
        let session = SessionConfig {
            ttl_hours: 2,
            cookie_secure: false,
        };
        let cookie = build_auth_cookie("a:b".to_string(), &session);
        assert_eq!(cookie.name(), "user");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(false));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.max_age().map(|age| age.whole_hours()), Some(2));
    }

    #[rocket::async_test]
    #[ignore = "requires database"]
    async fn me_without_session_is_unauthorized() {
        let mut config = Config::default();
        config.session.cookie_secure = false;

        let client = Client::tracked(build_rocket(config)).await.expect("valid rocket instance");
        let response = client.get("/api/v1/users/me").dispatch().await;

        assert_eq!(response.status(), Status::Unauthorized);
    }

    #[rocket::async_test]
    #[ignore = "requires database"]
    async fn register_rejects_short_password() {
        let mut config = Config::default();
        config.session.cookie_secure = false;

        let client = Client::tracked(build_rocket(config)).await.expect("valid rocket instance");
        let response = client
            .post("/api/v1/users/register")
            .header(ContentType::JSON)
            .body(r#"{"email":"ada@example.com","password":"short"}"#)
            .dispatch()
            .await;

        assert_eq!(response.status(), Status::BadRequest);
    }
}
