use crate::auth::CurrentUser;
use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::error::json::JsonBody;
use crate::models::currency::{CurrencyRequest, CurrencyResponse};
use crate::service::currency::CurrencyService;
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::{State, delete, get, post};
use rocket_okapi::openapi;
use sqlx::PgPool;
use validator::Validate;

/// Currencies available to the user: visible defaults plus custom ones
#[openapi(tag = "Currencies")]
#[get("/")]
pub async fn list_currencies(pool: &State<PgPool>, current_user: CurrentUser) -> Result<Json<Vec<CurrencyResponse>>, AppError> {
    let repo = PostgresRepository::new(pool.inner().clone());
    let currencies = CurrencyService::new(&repo).list_currencies(&current_user.id).await?;
    Ok(Json(currencies))
}

/// Add a custom currency
#[openapi(tag = "Currencies")]
#[post("/", data = "<payload>")]
pub async fn create_currency(
    pool: &State<PgPool>,
    current_user: CurrentUser,
    payload: JsonBody<CurrencyRequest>,
) -> Result<(Status, Json<CurrencyResponse>), AppError> {
    payload.validate()?;

    let repo = PostgresRepository::new(pool.inner().clone());
    let currency = CurrencyService::new(&repo).create_currency(&payload, &current_user.id).await?;
    Ok((Status::Created, Json(currency)))
}

/// Delete a custom currency, or hide a default one
///
/// Fails with 409 while any transaction or transfer uses the currency.
#[openapi(tag = "Currencies")]
#[delete("/<code>")]
pub async fn delete_currency(pool: &State<PgPool>, current_user: CurrentUser, code: &str) -> Result<Status, AppError> {
    let repo = PostgresRepository::new(pool.inner().clone());
    CurrencyService::new(&repo).remove_currency(code, &current_user.id).await?;
    Ok(Status::NoContent)
}

pub fn routes() -> (Vec<rocket::Route>, okapi::openapi3::OpenApi) {
    rocket_okapi::openapi_get_routes_spec![list_currencies, create_currency, delete_currency]
}
