use crate::auth::CurrentUser;
use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::error::json::JsonBody;
use crate::models::income_split::{IncomeSplitRequest, IncomeSplitResponse};
use crate::models::transaction::TransactionResponse;
use crate::service::income_split::IncomeSplitService;
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::{State, post};
use rocket_okapi::openapi;
use sqlx::PgPool;
use validator::Validate;

/// Split an income evenly across the three buckets
///
/// Creates one income transaction per bucket, in bucket order. The parts
/// differ by at most one minor unit and add up to the original amount.
#[openapi(tag = "Income split")]
#[post("/", data = "<payload>")]
pub async fn split_income(
    pool: &State<PgPool>,
    current_user: CurrentUser,
    payload: JsonBody<IncomeSplitRequest>,
) -> Result<(Status, Json<IncomeSplitResponse>), AppError> {
    payload.validate()?;

    let repo = PostgresRepository::new(pool.inner().clone());
    let transactions = IncomeSplitService::new(&repo).split_income(&payload, &current_user.id).await?;

    Ok((
        Status::Created,
        Json(IncomeSplitResponse {
            transactions: transactions.iter().map(TransactionResponse::from).collect(),
        }),
    ))
}

pub fn routes() -> (Vec<rocket::Route>, okapi::openapi3::OpenApi) {
    rocket_okapi::openapi_get_routes_spec![split_income]
}
