use crate::auth::CurrentUser;
use crate::database::category::CategoryRepository;
use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::error::json::JsonBody;
use crate::models::category::{CategoryRequest, CategoryResponse, CategoryUpdateRequest};
use crate::routes::{parse_id, parse_optional_bucket};
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::{State, delete, get, post, put};
use rocket_okapi::openapi;
use sqlx::PgPool;
use validator::Validate;

/// Create a category in a bucket
#[openapi(tag = "Categories")]
#[post("/", data = "<payload>")]
pub async fn create_category(
    pool: &State<PgPool>,
    current_user: CurrentUser,
    payload: JsonBody<CategoryRequest>,
) -> Result<(Status, Json<CategoryResponse>), AppError> {
    payload.validate()?;

    let repo = PostgresRepository::new(pool.inner().clone());
    let category = repo.create_category(&payload, &current_user.id).await?;
    Ok((Status::Created, Json(CategoryResponse::from(&category))))
}

/// List categories, optionally restricted to one bucket
#[openapi(tag = "Categories")]
#[get("/?<bucket>")]
pub async fn list_categories(pool: &State<PgPool>, current_user: CurrentUser, bucket: Option<String>) -> Result<Json<Vec<CategoryResponse>>, AppError> {
    let bucket = parse_optional_bucket(bucket.as_deref())?;

    let repo = PostgresRepository::new(pool.inner().clone());
    let categories = repo.list_categories(bucket, &current_user.id).await?;
    Ok(Json(categories.iter().map(CategoryResponse::from).collect()))
}

#[openapi(tag = "Categories")]
#[get("/<id>")]
pub async fn get_category(pool: &State<PgPool>, current_user: CurrentUser, id: &str) -> Result<Json<CategoryResponse>, AppError> {
    let id = parse_id(id, "category")?;

    let repo = PostgresRepository::new(pool.inner().clone());
    match repo.get_category_by_id(&id, &current_user.id).await? {
        Some(category) => Ok(Json(CategoryResponse::from(&category))),
        None => Err(AppError::NotFound("Category not found".to_string())),
    }
}

/// Rename a category or move it to another bucket
#[openapi(tag = "Categories")]
#[put("/<id>", data = "<payload>")]
pub async fn put_category(
    pool: &State<PgPool>,
    current_user: CurrentUser,
    id: &str,
    payload: JsonBody<CategoryUpdateRequest>,
) -> Result<Json<CategoryResponse>, AppError> {
    payload.validate()?;
    let id = parse_id(id, "category")?;

    let repo = PostgresRepository::new(pool.inner().clone());
    let category = repo.update_category(&id, &payload, &current_user.id).await?;
    Ok(Json(CategoryResponse::from(&category)))
}

/// Delete a category that no transaction uses
#[openapi(tag = "Categories")]
#[delete("/<id>")]
pub async fn delete_category(pool: &State<PgPool>, current_user: CurrentUser, id: &str) -> Result<Status, AppError> {
    let id = parse_id(id, "category")?;

    let repo = PostgresRepository::new(pool.inner().clone());
    repo.delete_category(&id, &current_user.id).await?;
    Ok(Status::NoContent)
}

pub fn routes() -> (Vec<rocket::Route>, okapi::openapi3::OpenApi) {
    rocket_okapi::openapi_get_routes_spec![create_category, list_categories, get_category, put_category, delete_category]
}

#[cfg(test)]
mod tests {
    use crate::{Config, build_rocket};
    use rocket::http::Status;
    use rocket::local::asynchronous::Client;

    #[rocket::async_test]
    #[ignore = "requires database"]
    async fn list_categories_requires_session() {
        let client = Client::tracked(build_rocket(Config::default())).await.expect("valid rocket instance");
        let response = client.get("/api/v1/categories?bucket=personal").dispatch().await;
        assert_eq!(response.status(), Status::Unauthorized);
    }
}
