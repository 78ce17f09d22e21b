use actix_web::web;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::handlers;
use crate::models::*;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::subscription::list_subscriptions,
        handlers::subscription::create_subscription,
        handlers::subscription::get_subscription,
        handlers::subscription::update_subscription,
        handlers::subscription::delete_subscription,
        handlers::subscription::get_total_cost,
    ),
    components(
        schemas(
            Subscription,
            CreateSubscriptionRequest,
            UpdateSubscriptionRequest,
            SubscriptionResponse,
            SubscriptionListResponse,
            TotalCostResponse,
            ApiError,
            ErrorResponse,
        )
    ),
    tags(
        (name = "subscriptions", description = "Subscription records and cost aggregation"),
    ),
    info(
        title = "Subscription Service API",
        version = "1.0.0",
        description = "REST service aggregating users' online subscriptions"
    ),
    servers(
        (url = "/api/v1", description = "Local server")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_every_route() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();
        for expected in ["/subscriptions", "/subscriptions/{id}", "/subscriptions/total"] {
            assert!(
                paths.iter().any(|p| p.as_str() == expected),
                "missing {expected} in {paths:?}"
            );
        }
    }
}
