use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::SubscriptionService;
use actix_web::{HttpResponse, web};
use uuid::Uuid;

fn parse_subscription_id(raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw)
        .map_err(|_| AppError::ValidationError("Invalid subscription ID format".to_string()))
}

#[utoipa::path(
    get,
    path = "/subscriptions",
    tag = "subscriptions",
    params(SubscriptionListQuery),
    responses(
        (status = 200, description = "Subscriptions, newest first", body = SubscriptionListResponse),
        (status = 400, description = "Invalid user ID", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    )
)]
pub async fn list_subscriptions(
    subscription_service: web::Data<SubscriptionService>,
    query: web::Query<SubscriptionListQuery>,
) -> AppResult<HttpResponse> {
    let filter = query.into_inner().into_filter()?;
    let subscriptions = subscription_service.list(&filter).await?;
    Ok(HttpResponse::Ok().json(SubscriptionListResponse { subscriptions }))
}

#[utoipa::path(
    post,
    path = "/subscriptions",
    tag = "subscriptions",
    request_body = CreateSubscriptionRequest,
    responses(
        (status = 201, description = "Subscription created", body = SubscriptionResponse),
        (status = 400, description = "Invalid request body", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    )
)]
pub async fn create_subscription(
    subscription_service: web::Data<SubscriptionService>,
    request: web::Json<CreateSubscriptionRequest>,
) -> AppResult<HttpResponse> {
    let new = NewSubscription::try_from(request.into_inner())?;
    let subscription = subscription_service.create(new).await?;
    Ok(HttpResponse::Created().json(SubscriptionResponse { subscription }))
}

#[utoipa::path(
    get,
    path = "/subscriptions/{id}",
    tag = "subscriptions",
    params(("id" = String, Path, description = "Subscription ID")),
    responses(
        (status = 200, description = "Subscription", body = SubscriptionResponse),
        (status = 400, description = "Invalid subscription ID", body = ErrorResponse),
        (status = 404, description = "No such subscription", body = ErrorResponse)
    )
)]
pub async fn get_subscription(
    subscription_service: web::Data<SubscriptionService>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_subscription_id(&path)?;
    let subscription = subscription_service.get(id).await?;
    Ok(HttpResponse::Ok().json(SubscriptionResponse { subscription }))
}

#[utoipa::path(
    put,
    path = "/subscriptions/{id}",
    tag = "subscriptions",
    params(("id" = String, Path, description = "Subscription ID")),
    request_body = UpdateSubscriptionRequest,
    responses(
        (status = 200, description = "Updated subscription", body = SubscriptionResponse),
        (status = 400, description = "Invalid ID or request body", body = ErrorResponse),
        (status = 404, description = "No such subscription", body = ErrorResponse)
    )
)]
pub async fn update_subscription(
    subscription_service: web::Data<SubscriptionService>,
    path: web::Path<String>,
    request: web::Json<UpdateSubscriptionRequest>,
) -> AppResult<HttpResponse> {
    let id = parse_subscription_id(&path)?;
    let patch = SubscriptionPatch::try_from(request.into_inner())?;
    let subscription = subscription_service.update(id, patch).await?;
    Ok(HttpResponse::Ok().json(SubscriptionResponse { subscription }))
}

#[utoipa::path(
    delete,
    path = "/subscriptions/{id}",
    tag = "subscriptions",
    params(("id" = String, Path, description = "Subscription ID")),
    responses(
        (status = 204, description = "Subscription deleted"),
        (status = 400, description = "Invalid subscription ID", body = ErrorResponse),
        (status = 404, description = "No such subscription", body = ErrorResponse)
    )
)]
pub async fn delete_subscription(
    subscription_service: web::Data<SubscriptionService>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let id = parse_subscription_id(&path)?;
    subscription_service.delete(id).await?;
    Ok(HttpResponse::NoContent().finish())
}

#[utoipa::path(
    get,
    path = "/subscriptions/total",
    tag = "subscriptions",
    params(TotalCostQuery),
    responses(
        (status = 200, description = "Total cost of matching subscriptions", body = TotalCostResponse),
        (status = 400, description = "Invalid user ID or month", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    )
)]
pub async fn get_total_cost(
    subscription_service: web::Data<SubscriptionService>,
    query: web::Query<TotalCostQuery>,
) -> AppResult<HttpResponse> {
    let (filter, window) = query.into_inner().into_parts()?;
    let total_cost = subscription_service.total_cost(&filter, &window).await?;
    Ok(HttpResponse::Ok().json(TotalCostResponse { total_cost }))
}

pub fn subscription_config(cfg: &mut web::ServiceConfig) {
    // `/total` must be registered ahead of `/{id}`
    cfg.service(
        web::scope("/subscriptions")
            .route("", web::get().to(list_subscriptions))
            .route("", web::post().to(create_subscription))
            .route("/total", web::get().to(get_total_cost))
            .route("/{id}", web::get().to(get_subscription))
            .route("/{id}", web::put().to(update_subscription))
            .route("/{id}", web::delete().to(delete_subscription)),
    );
}
