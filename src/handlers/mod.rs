pub mod subscription;

pub use subscription::subscription_config;

use crate::error::AppError;
use actix_web::web;

/// Body deserialization failures are client errors in the common error shape.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        AppError::ValidationError(format!("Invalid request body: {err}")).into()
    })
}

pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        AppError::ValidationError(format!("Invalid query: {err}")).into()
    })
}
