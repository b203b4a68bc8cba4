use actix_web::{web, HttpRequest, HttpResponse};
use log::{debug, error};
use std::sync::Arc;
use std::time::Instant;

use super::auth::{is_request_authorized, NOT_AUTHORIZED};
use super::model::{ReportResponse, Response};
use crate::generator::{Generator, ReportOutput};
use crate::printer::{Printer, PrinterError};
use crate::request::ReportRequest;
use crate::state::AppState;

pub const ACTION_NOT_FOUND: &str = "Action not found";

#[utoipa::path(
    post,
    path = "/report",
    tag = "Reports",
    request_body = ReportRequest,
    responses(
        (status = 200, description = "Report generated, base64 encoded", body = ReportResponse),
        (status = 400, description = "Generation failed or client refused", body = ReportResponse),
        (status = 500, description = "Malformed request body", body = ReportResponse),
        (status = 503, description = "Report queue full", body = ReportResponse)
    )
)]
pub async fn generate_report(
    req: HttpRequest,
    body: web::Json<ReportRequest>,
    state: web::Data<AppState>,
) -> HttpResponse {
    debug!("New report request");
    let started = Instant::now();

    if !is_request_authorized(&req, &state.config.allowed_ips) {
        debug!("Client not authorized, respond with http status code 400");
        return HttpResponse::BadRequest()
            .json(ReportResponse::error(NOT_AUTHORIZED, Some(started.elapsed())));
    }

    let request = body.into_inner();
    let context = state.context.clone();
    let result = state
        .pool
        .execute(move || Generator::new(context).generate(&request))
        .await;

    match result {
        Ok(Ok(output)) => {
            let report = match output {
                ReportOutput::Document(report) => Some(report),
                ReportOutput::NoContent => None,
            };
            let response = ReportResponse::ok(report, started.elapsed());
            debug!("Report generated elapsed time: {:?}", response.duration);
            HttpResponse::Ok().json(response)
        }
        Ok(Err(e)) => HttpResponse::BadRequest()
            .json(ReportResponse::error(e.to_string(), Some(started.elapsed()))),
        Err(e) => {
            error!("{}", e);
            HttpResponse::ServiceUnavailable()
                .json(ReportResponse::error(e.to_string(), Some(started.elapsed())))
        }
    }
}

#[utoipa::path(
    get,
    path = "/cut",
    tag = "Printer",
    responses(
        (status = 200, description = "Paper cut", body = Response),
        (status = 400, description = "Printer error or client not authorized", body = Response)
    )
)]
pub async fn cut_paper(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    debug!("New cut paper request");
    printer_command(&req, &state, |printer| printer.cut_paper()).await
}

#[utoipa::path(
    get,
    path = "/cutandopen",
    tag = "Printer",
    responses(
        (status = 200, description = "Paper cut and cash drawer opened", body = Response),
        (status = 400, description = "Printer error or client not authorized", body = Response)
    )
)]
pub async fn cut_and_open_cash_drawer(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> HttpResponse {
    debug!("New cut paper and open cash drawer request");
    printer_command(&req, &state, |printer| printer.cut_and_cash_drawer()).await
}

#[utoipa::path(
    get,
    path = "/cashdrawer",
    tag = "Printer",
    responses(
        (status = 200, description = "Cash drawer opened", body = Response),
        (status = 400, description = "Printer error or client not authorized", body = Response)
    )
)]
pub async fn open_cash_drawer(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    debug!("New open cash drawer request");
    printer_command(&req, &state, |printer| printer.cash_drawer()).await
}

#[utoipa::path(
    get,
    path = "/version",
    tag = "Reports",
    responses(
        (status = 200, description = "Service version", body = Response),
        (status = 400, description = "Client not authorized", body = Response)
    )
)]
pub async fn version(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    debug!("Get version");
    let started = Instant::now();

    if !is_request_authorized(&req, &state.config.allowed_ips) {
        return HttpResponse::BadRequest()
            .json(Response::error(NOT_AUTHORIZED, started.elapsed()));
    }

    HttpResponse::Ok().json(Response::ok(
        Some(env!("CARGO_PKG_VERSION").to_string()),
        started.elapsed(),
    ))
}

pub async fn not_found() -> HttpResponse {
    debug!("Request for an action that does not exist");
    HttpResponse::NotFound().json(ReportResponse::error(ACTION_NOT_FOUND, None))
}

async fn printer_command<F>(
    req: &HttpRequest,
    state: &web::Data<AppState>,
    command: F,
) -> HttpResponse
where
    F: FnOnce(&Printer) -> Result<(), PrinterError> + Send + 'static,
{
    let started = Instant::now();

    if !is_request_authorized(req, &state.config.allowed_ips) {
        debug!("Client not authorized, respond with http status code 400");
        return HttpResponse::BadRequest()
            .json(Response::error(NOT_AUTHORIZED, started.elapsed()));
    }

    let printer: Arc<Printer> = match state.printer() {
        Some(printer) => printer.clone(),
        None => {
            let e = PrinterError::NotConfigured;
            error!("{}", e);
            return HttpResponse::BadRequest()
                .json(Response::error(e.to_string(), started.elapsed()));
        }
    };

    match state.pool.execute(move || command(&printer)).await {
        Ok(Ok(())) => HttpResponse::Ok().json(Response::ok(None, started.elapsed())),
        Ok(Err(e)) => {
            error!("{}", e);
            HttpResponse::BadRequest().json(Response::error(e.to_string(), started.elapsed()))
        }
        Err(e) => {
            error!("{}", e);
            HttpResponse::ServiceUnavailable()
                .json(Response::error(e.to_string(), started.elapsed()))
        }
    }
}
