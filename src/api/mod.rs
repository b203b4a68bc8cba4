//! HTTP surface of the report service.
//!
//! - `handlers` - report, printer and version endpoints
//! - `model` - response bodies
//! - `auth` - client IP allowlist
//! - `pool` - bounded worker pool for blocking jobs

pub mod auth;
pub mod handlers;
pub mod model;
pub mod pool;

use actix_web::error::{InternalError, JsonPayloadError};
use actix_web::{web, HttpResponse};

pub use model::{ReportResponse, Response, Status};

/// Report templates travel base64 encoded in the body.
pub const MAX_BODY_SIZE: usize = 64 * 1024 * 1024;

pub const BODY_ERROR: &str = "Request body error. Possible empty or json wrong format.";
pub const BODY_WRONG_TYPE: &str = "Request body wrong type.";

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .service(web::resource("/report").route(web::post().to(handlers::generate_report)))
        .service(web::resource("/cut").route(web::get().to(handlers::cut_paper)))
        .service(
            web::resource("/cutandopen").route(web::get().to(handlers::cut_and_open_cash_drawer)),
        )
        .service(web::resource("/cashdrawer").route(web::get().to(handlers::open_cash_drawer)))
        .service(web::resource("/version").route(web::get().to(handlers::version)));
}

/// Body errors answer with a `ReportResponse` and status 500.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(MAX_BODY_SIZE)
        .error_handler(|err, _req| {
            let message = match &err {
                JsonPayloadError::ContentType => BODY_WRONG_TYPE,
                _ => BODY_ERROR,
            };
            log::warn!("Invalid request body: {}", err);
            let response =
                HttpResponse::InternalServerError().json(ReportResponse::error(message, None));
            InternalError::from_response(err, response).into()
        })
}
