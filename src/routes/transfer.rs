use crate::auth::CurrentUser;
use crate::database::postgres_repository::PostgresRepository;
use crate::database::transfer::TransferRepository;
use crate::error::app_error::AppError;
use crate::error::json::JsonBody;
use crate::models::transfer::{TransferRequest, TransferResponse};
use crate::routes::{parse_id, parse_optional_bucket};
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::{State, delete, get, post};
use rocket_okapi::openapi;
use sqlx::PgPool;
use tracing::info;
use validator::Validate;

/// Move money between two currencies inside a bucket
///
/// Both amounts are stored as given. `manual_rate` only feeds the exchange
/// rate used for converted totals.
#[openapi(tag = "Transfers")]
#[post("/", data = "<payload>")]
pub async fn create_transfer(
    pool: &State<PgPool>,
    current_user: CurrentUser,
    payload: JsonBody<TransferRequest>,
) -> Result<(Status, Json<TransferResponse>), AppError> {
    payload.validate()?;

    let repo = PostgresRepository::new(pool.inner().clone());
    let transfer = repo.create_transfer(&payload, &current_user.id).await?;

    info!(
        user_id = %current_user.id,
        transfer_id = %transfer.id,
        from = %transfer.from_currency,
        to = %transfer.to_currency,
        "Created transfer"
    );
    Ok((Status::Created, Json(TransferResponse::from(&transfer))))
}

#[openapi(tag = "Transfers")]
#[get("/?<bucket>")]
pub async fn list_transfers(pool: &State<PgPool>, current_user: CurrentUser, bucket: Option<String>) -> Result<Json<Vec<TransferResponse>>, AppError> {
    let bucket = parse_optional_bucket(bucket.as_deref())?;

    let repo = PostgresRepository::new(pool.inner().clone());
    let transfers = repo.list_transfers(bucket, &current_user.id).await?;
    Ok(Json(transfers.iter().map(TransferResponse::from).collect()))
}

#[openapi(tag = "Transfers")]
#[delete("/<id>")]
pub async fn delete_transfer(pool: &State<PgPool>, current_user: CurrentUser, id: &str) -> Result<Status, AppError> {
    let id = parse_id(id, "transfer")?;

    let repo = PostgresRepository::new(pool.inner().clone());
    repo.delete_transfer(&id, &current_user.id).await?;
    Ok(Status::NoContent)
}

pub fn routes() -> (Vec<rocket::Route>, okapi::openapi3::OpenApi) {
    rocket_okapi::openapi_get_routes_spec![create_transfer, list_transfers, delete_transfer]
}
