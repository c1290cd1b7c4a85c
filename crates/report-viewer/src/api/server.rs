use crate::api::routes::page::get_page;
use crate::api::routes::resources::get_resource;
use crate::source::{ReportSource, ResourceName};
use actix_web::middleware::{self, NormalizePath, TrailingSlash};
use actix_web::{
    web::{self, get, Data},
    App, HttpResponse, HttpServer,
};
use log::{info, warn};
use serde_json::json;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn ReportSource>,
}

async fn health_check(app_state: Data<AppState>) -> HttpResponse {
    // Healthy as long as the month listing is reachable
    match app_state.source.fetch(ResourceName::Months).await {
        Ok(_) => HttpResponse::Ok().json(json!({
            "status": "ok",
            "service": "report-viewer"
        })),
        Err(e) => {
            warn!("Health check: {e}");
            HttpResponse::ServiceUnavailable().json(json!({
                "status": "error",
                "service": "report-viewer",
                "message": e.to_string()
            }))
        }
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", get().to(get_page))
        .route("/health", get().to(health_check))
        .route("/{file}", get().to(get_resource));
}

pub async fn start_server(
    host: &str,
    port: u16,
    source: Arc<dyn ReportSource>,
) -> std::io::Result<()> {
    info!("Starting server at http://{host}:{port}");

    let app_state = AppState { source };

    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .wrap(NormalizePath::new(TrailingSlash::Trim))
            .app_data(Data::new(app_state.clone()))
            .configure(configure)
            .default_service(web::route().to(|| async {
                HttpResponse::NotFound().json(json!({
                    "success": false,
                    "error": "Resource not found"
                }))
            }))
    })
    .bind((host, port))?
    .run()
    .await
}
