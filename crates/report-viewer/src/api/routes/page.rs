use crate::api::server::AppState;
use crate::months::{load_months, load_report, select_month};
use crate::page::{render_page, PageQuery, PageState};
use crate::table::ReportTable;
use actix_web::{web, web::Data, HttpResponse};
use chrono::Local;
use html_escape::encode_text;
use log::error;
use shared::models::MonthKey;

const HTML: &str = "text/html; charset=utf-8";

/// Renders the report page for the month and view state in the query string.
///
/// Each month switch is a new navigation, so a superseded load is dropped along
/// with its request and never reaches the page the browser shows.
pub async fn get_page(data: Data<AppState>, query: web::Query<PageQuery>) -> HttpResponse {
    let state = PageState::from(query.into_inner());
    let source = data.source.as_ref();

    let months = load_months(source).await;
    let current = MonthKey::from_date(&Local::now());
    let selected = select_month(state.month, &months, current);

    let report = match load_report(source, selected).await {
        Ok(report) => report,
        Err(e) => {
            error!("No report to show: {e}");
            return HttpResponse::BadGateway().content_type(HTML).body(format!(
                "<!DOCTYPE html><html><body><p>Report unavailable: {}</p></body></html>",
                encode_text(&e.to_string())
            ));
        }
    };
    let mut table = ReportTable::new(report.cores.clone());
    state.apply(&mut table);

    match render_page(&state, &months, selected, &report, &table) {
        Ok(html) => HttpResponse::Ok().content_type(HTML).body(html),
        Err(e) => {
            error!("Failed to render page: {e}");
            HttpResponse::InternalServerError().finish()
        }
    }
}
