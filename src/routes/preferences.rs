use crate::auth::CurrentUser;
use crate::database::postgres_repository::PostgresRepository;
use crate::database::preferences::PreferencesRepository;
use crate::error::app_error::AppError;
use crate::error::json::JsonBody;
use crate::models::preferences::{PreferencesRequest, PreferencesResponse};
use rocket::serde::json::Json;
use rocket::{State, get, put};
use rocket_okapi::openapi;
use sqlx::PgPool;
use validator::Validate;

/// Current user's preferences, created with defaults on first access
#[openapi(tag = "Preferences")]
#[get("/")]
pub async fn get_preferences(pool: &State<PgPool>, current_user: CurrentUser) -> Result<Json<PreferencesResponse>, AppError> {
    let repo = PostgresRepository::new(pool.inner().clone());
    let preferences = repo.get_or_create_preferences(&current_user.id).await?;
    Ok(Json(PreferencesResponse::from(&preferences)))
}

/// Change the base currency used for converted totals
#[openapi(tag = "Preferences")]
#[put("/", data = "<payload>")]
pub async fn put_preferences(
    pool: &State<PgPool>,
    current_user: CurrentUser,
    payload: JsonBody<PreferencesRequest>,
) -> Result<Json<PreferencesResponse>, AppError> {
    payload.validate()?;

    let repo = PostgresRepository::new(pool.inner().clone());
    let preferences = repo.update_base_currency(&payload.base_currency, &current_user.id).await?;
    Ok(Json(PreferencesResponse::from(&preferences)))
}

pub fn routes() -> (Vec<rocket::Route>, okapi::openapi3::OpenApi) {
    rocket_okapi::openapi_get_routes_spec![get_preferences, put_preferences]
}

#[cfg(test)]
mod tests {
    use crate::{Config, build_rocket};
    use rocket::http::Status;
    use rocket::local::asynchronous::Client;

    #[rocket::async_test]
    #[ignore = "requires database"]
    async fn preferences_require_session() {
        let client = Client::tracked(build_rocket(Config::default())).await.expect("valid rocket instance");
        let response = client.get("/api/v1/preferences").dispatch().await;
        assert_eq!(response.status(), Status::Unauthorized);
    }
}
