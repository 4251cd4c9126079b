use std::sync::Arc;

use actix_web::{error, get, web, HttpResponse};
use chrono::FixedOffset;

use crate::costs::{self, AddCostRequest};
use crate::error::{ApiError, ValidationError};
use crate::report::{self, ReportQuery};
use crate::store::Store;
use crate::users::{self, CreateUserRequest};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub local_offset: FixedOffset,
}

async fn add_cost(
    state: web::Data<AppState>,
    json: web::Json<AddCostRequest>,
) -> Result<HttpResponse, ApiError> {
    let cost = costs::add_cost(state.store.as_ref(), state.local_offset, json.into_inner()).await?;
    Ok(HttpResponse::Created().json(cost))
}

#[get("/report")]
async fn get_report(
    state: web::Data<AppState>,
    query: web::Query<ReportQuery>,
) -> Result<HttpResponse, ApiError> {
    let report =
        report::monthly_report(state.store.as_ref(), state.local_offset, query.into_inner())
            .await?;
    Ok(HttpResponse::Ok().json(report))
}

async fn add_user(
    state: web::Data<AppState>,
    json: web::Json<CreateUserRequest>,
) -> Result<HttpResponse, ApiError> {
    let user = users::create_user(state.store.as_ref(), json.into_inner()).await?;
    Ok(HttpResponse::Created().json(user))
}

#[get("/about")]
async fn about() -> HttpResponse {
    HttpResponse::Ok().json(users::developers())
}

#[get("/users/{id}")]
async fn get_user(state: web::Data<AppState>, id: web::Path<String>) -> Result<HttpResponse, ApiError> {
    let profile = users::user_details(state.store.as_ref(), &id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(profile))
}

// Short form of `/users/{id}`; must be registered after every other GET route.
#[get("/{id}")]
async fn get_user_short(
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let profile = users::user_details(state.store.as_ref(), &id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(profile))
}

pub async fn not_found() -> Result<HttpResponse, ApiError> {
    Err(ApiError::RouteNotFound)
}

async fn method_not_allowed() -> Result<HttpResponse, ApiError> {
    Err(ApiError::MethodNotAllowed)
}

fn malformed(err: impl std::fmt::Display) -> error::Error {
    ApiError::from(ValidationError::MalformedRequest(err.to_string())).into()
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .app_data(web::JsonConfig::default().error_handler(|err, _| malformed(err)))
            .app_data(web::QueryConfig::default().error_handler(|err, _| malformed(err)))
            // Plain resources rather than route macros: the macros guard the
            // whole resource, which would let `GET /add` fall through to `/{id}`.
            .service(
                web::resource("/add")
                    .route(web::post().to(add_cost))
                    .default_service(web::to(method_not_allowed)),
            )
            .service(get_report)
            .service(
                web::resource("/adduser")
                    .route(web::post().to(add_user))
                    .default_service(web::to(method_not_allowed)),
            )
            .service(about)
            .service(get_user)
            .service(get_user_short)
            .default_service(web::to(not_found)),
    );
}
