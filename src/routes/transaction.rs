use crate::auth::CurrentUser;
use crate::database::postgres_repository::PostgresRepository;
use crate::database::transaction::TransactionRepository;
use crate::error::app_error::AppError;
use crate::error::json::JsonBody;
use crate::models::bucket::TransactionType;
use crate::models::currency::normalize_currency_code;
use crate::models::transaction::{TransactionFilter, TransactionRequest, TransactionResponse, TransactionUpdateRequest};
use crate::routes::{parse_date_bound, parse_id, parse_optional_bucket};
use chrono::Utc;
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::{FromForm, State, delete, get, post, put};
use rocket_okapi::openapi;
use schemars::JsonSchema;
use sqlx::PgPool;
use std::str::FromStr;
use tracing::info;
use validator::Validate;

/// Record an income or expense
#[openapi(tag = "Transactions")]
#[post("/", data = "<payload>")]
pub async fn create_transaction(
    pool: &State<PgPool>,
    current_user: CurrentUser,
    payload: JsonBody<TransactionRequest>,
) -> Result<(Status, Json<TransactionResponse>), AppError> {
    payload.validate()?;

    let repo = PostgresRepository::new(pool.inner().clone());
    let transaction = repo.create_transaction(&payload.to_new_transaction(Utc::now()), &current_user.id).await?;

    info!(
        user_id = %current_user.id,
        transaction_id = %transaction.id,
        bucket = %transaction.bucket,
        "Created transaction"
    );
    Ok((Status::Created, Json(TransactionResponse::from(&transaction))))
}

/// Query string accepted by the transaction list. Every field is optional.
#[derive(Debug, Default, FromForm, JsonSchema)]
pub struct TransactionQuery {
    pub bucket: Option<String>,
    pub category_id: Option<String>,
    pub currency_code: Option<String>,
    #[field(name = "type")]
    #[schemars(rename = "type")]
    pub transaction_type: Option<String>,
    /// `YYYY-MM-DD` or RFC 3339, inclusive.
    pub start_date: Option<String>,
    /// `YYYY-MM-DD` or RFC 3339, inclusive.
    pub end_date: Option<String>,
}

fn filter_from_query(query: &TransactionQuery) -> Result<TransactionFilter, AppError> {
    Ok(TransactionFilter {
        bucket: parse_optional_bucket(query.bucket.as_deref())?,
        category_id: query.category_id.as_deref().map(|id| parse_id(id, "category")).transpose()?,
        currency_code: query.currency_code.as_deref().map(normalize_currency_code).filter(|code| !code.is_empty()),
        transaction_type: query
            .transaction_type
            .as_deref()
            .filter(|value| !value.trim().is_empty())
            .map(TransactionType::from_str)
            .transpose()?,
        start: parse_date_bound(query.start_date.as_deref(), false)?,
        end: parse_date_bound(query.end_date.as_deref(), true)?,
    })
}

/// List transactions, newest first
#[openapi(tag = "Transactions")]
#[get("/?<query..>")]
pub async fn list_transactions(pool: &State<PgPool>, current_user: CurrentUser, query: TransactionQuery) -> Result<Json<Vec<TransactionResponse>>, AppError> {
    let filter = filter_from_query(&query)?;

    let repo = PostgresRepository::new(pool.inner().clone());
    let transactions = repo.list_transactions(&filter, &current_user.id).await?;
    Ok(Json(transactions.iter().map(TransactionResponse::from).collect()))
}

#[openapi(tag = "Transactions")]
#[get("/<id>")]
pub async fn get_transaction(pool: &State<PgPool>, current_user: CurrentUser, id: &str) -> Result<Json<TransactionResponse>, AppError> {
    let id = parse_id(id, "transaction")?;

    let repo = PostgresRepository::new(pool.inner().clone());
    match repo.get_transaction_by_id(&id, &current_user.id).await? {
        Some(transaction) => Ok(Json(TransactionResponse::from(&transaction))),
        None => Err(AppError::NotFound("Transaction not found".to_string())),
    }
}

/// Update any subset of a transaction's fields
#[openapi(tag = "Transactions")]
#[put("/<id>", data = "<payload>")]
pub async fn put_transaction(
    pool: &State<PgPool>,
    current_user: CurrentUser,
    id: &str,
    payload: JsonBody<TransactionUpdateRequest>,
) -> Result<Json<TransactionResponse>, AppError> {
    payload.validate()?;
    let id = parse_id(id, "transaction")?;

    let repo = PostgresRepository::new(pool.inner().clone());
    let existing = repo
        .get_transaction_by_id(&id, &current_user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Transaction not found".to_string()))?;

    let transaction = repo.update_transaction(&id, &payload.apply_to(&existing), &current_user.id).await?;
    Ok(Json(TransactionResponse::from(&transaction)))
}

#[openapi(tag = "Transactions")]
#[delete("/<id>")]
pub async fn delete_transaction(pool: &State<PgPool>, current_user: CurrentUser, id: &str) -> Result<Status, AppError> {
    let id = parse_id(id, "transaction")?;

    let repo = PostgresRepository::new(pool.inner().clone());
    repo.delete_transaction(&id, &current_user.id).await?;
    Ok(Status::NoContent)
}

pub fn routes() -> (Vec<rocket::Route>, okapi::openapi3::OpenApi) {
    rocket_okapi::openapi_get_routes_spec![create_transaction, list_transactions, get_transaction, put_transaction, delete_transaction]
}
