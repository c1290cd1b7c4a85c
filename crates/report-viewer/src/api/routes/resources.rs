use crate::api::server::AppState;
use crate::source::{ResourceName, SourceError};
use actix_web::{web, web::Data, HttpResponse};
use log::error;
use serde_json::json;

/// Serves `months.json`, `report.json` and `report_<YYYYMM>.json` unchanged.
pub async fn get_resource(data: Data<AppState>, file: web::Path<String>) -> HttpResponse {
    let Some(resource) = ResourceName::from_file_name(&file) else {
        return HttpResponse::NotFound().json(json!({
            "success": false,
            "error": "Resource not found"
        }));
    };

    match data.source.fetch(resource).await {
        Ok(body) => HttpResponse::Ok()
            .content_type("application/json")
            .body(body),
        Err(SourceError::NotFound(_)) => HttpResponse::NotFound().json(json!({
            "success": false,
            "error": format!("{resource} not found")
        })),
        Err(e) => {
            error!("Failed to serve {resource}: {e}");
            HttpResponse::BadGateway().json(json!({
                "success": false,
                "error": e.to_string()
            }))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MockReportSource;
    use actix_web::test;
    use actix_web::web::get;
    use actix_web::App;
    use shared::models::MonthKey;
    use std::sync::Arc;

    #[actix_web::test]
    async fn test_serves_resources_unchanged() {
        let source = MockReportSource::new()
            .with(ResourceName::Months, "[202401, 202402]")
            .with(
                ResourceName::MonthReport(MonthKey::from(202401)),
                "{\"month\": 202401}",
            );
        let app = test::init_service(
            App::new()
                .app_data(Data::new(AppState {
                    source: Arc::new(source),
                }))
                .route("/{file}", get().to(get_resource)),
        )
        .await;

        let req = test::TestRequest::get().uri("/months.json").to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
        assert_eq!(test::read_body(resp).await, "[202401, 202402]");

        let req = test::TestRequest::get()
            .uri("/report_202401.json")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
        assert_eq!(test::read_body(resp).await, "{\"month\": 202401}");
    }

    #[actix_web::test]
    async fn test_unknown_and_missing_resources() {
        let app = test::init_service(
            App::new()
                .app_data(Data::new(AppState {
                    source: Arc::new(MockReportSource::new()),
                }))
                .route("/{file}", get().to(get_resource)),
        )
        .await;

        for uri in ["/report.json", "/report_202402.json", "/secrets.txt"] {
            let req = test::TestRequest::get().uri(uri).to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), actix_web::http::StatusCode::NOT_FOUND, "{uri}");
        }
    }
}
