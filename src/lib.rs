use actix_cors::Cors;
use actix_web::middleware::Compress;
use actix_web::{web, App, HttpServer};
use actix_web_prometheus::PrometheusMetricsBuilder;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod api;
pub mod config;
pub mod generator;
pub mod printer;
pub mod request;
pub mod state;

pub use crate::config::AppConfig;
pub use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::api::handlers::generate_report,
        crate::api::handlers::cut_paper,
        crate::api::handlers::cut_and_open_cash_drawer,
        crate::api::handlers::open_cash_drawer,
        crate::api::handlers::version
    ),
    components(
        schemas(
            request::ReportRequest,
            request::ReportFormat,
            request::ReportResource,
            request::Parameter,
            request::Database,
            request::HttpMethod,
            request::HttpSource,
            request::JsonFile,
            request::XmlFile,
            request::Sign,
            request::SignLevel,
            request::CertificateType,
            request::SignRectangle,
            request::Metadata,
            request::PdfProperties,
            api::ReportResponse,
            api::Response,
            api::Status,
        )
    ),
    tags(
        (name = "Reports", description = "Report generation endpoints."),
        (name = "Printer", description = "Receipt printer commands.")
    )
)]
pub struct ApiDoc;

pub async fn run() -> std::io::Result<()> {
    dotenvy::dotenv().ok(); // Load .env file
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            log::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    let host = config.host.clone();
    let port = config.port;
    log::info!(
        "Report engine '{}', {} workers, queue of {}",
        config.engine_command,
        config.workers,
        config.queue
    );
    if let Some(printer) = &config.printer {
        log::info!("Printer '{}' configured", printer.name);
    }
    let app_state = web::Data::new(AppState::new_with_config(config));

    let prometheus = PrometheusMetricsBuilder::new("reports_api")
        .endpoint("/metrics")
        .build()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;

    log::info!("Starting server at http://{}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allowed_methods(vec!["GET", "POST", "OPTIONS"])
            .allow_any_header()
            .max_age(3600);

        App::new()
            .wrap(Compress::default())
            .wrap(prometheus.clone())
            .wrap(cors)
            .app_data(app_state.clone())
            .configure(api::config)
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}")
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .default_service(web::to(api::handlers::not_found))
    })
    .keep_alive(actix_web::http::KeepAlive::Os)
    .bind((host.as_str(), port))?
    .run()
    .await
}
