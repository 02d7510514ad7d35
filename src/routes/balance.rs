use crate::auth::CurrentUser;
use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::models::balance::{BucketBalancesResponse, ConvertedTotal, OverallBalancesResponse};
use crate::service::balance::BalanceService;
use rocket::serde::json::Json;
use rocket::{State, get};
use rocket_okapi::openapi;
use sqlx::PgPool;

/// Non-zero balances per currency for each of the three buckets
#[openapi(tag = "Balances")]
#[get("/buckets")]
pub async fn get_bucket_balances(pool: &State<PgPool>, current_user: CurrentUser) -> Result<Json<BucketBalancesResponse>, AppError> {
    let repo = PostgresRepository::new(pool.inner().clone());
    let buckets = BalanceService::new(&repo).bucket_balances(&current_user.id).await?;
    Ok(Json(BucketBalancesResponse { buckets }))
}

/// Non-zero balances per currency across all buckets
#[openapi(tag = "Balances")]
#[get("/overall")]
pub async fn get_overall_balances(pool: &State<PgPool>, current_user: CurrentUser) -> Result<Json<OverallBalancesResponse>, AppError> {
    let repo = PostgresRepository::new(pool.inner().clone());
    let balances = BalanceService::new(&repo).overall_balances(&current_user.id).await?;
    Ok(Json(OverallBalancesResponse { balances }))
}

/// All visible balances folded into the base currency
///
/// Currencies with no known exchange rate are added 1:1 and listed in
/// `unconverted_currencies`.
#[openapi(tag = "Balances")]
#[get("/converted")]
pub async fn get_converted_total(pool: &State<PgPool>, current_user: CurrentUser) -> Result<Json<ConvertedTotal>, AppError> {
    let repo = PostgresRepository::new(pool.inner().clone());
    let total = BalanceService::new(&repo).converted_total(&current_user.id).await?;
    Ok(Json(total))
}

pub fn routes() -> (Vec<rocket::Route>, okapi::openapi3::OpenApi) {
    rocket_okapi::openapi_get_routes_spec![get_bucket_balances, get_overall_balances, get_converted_total]
}
