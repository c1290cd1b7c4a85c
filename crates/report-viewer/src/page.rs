use crate::table::ReportTable;
use chrono::Local;
use html_escape::{encode_double_quoted_attribute, encode_text};
use serde::Deserialize;
use shared::models::{MonthKey, MonthlyReport};
use std::fmt::Write;
use url::form_urlencoded;

const SORT_TOTAL: &str = "total";

/// Raw query parameters of the page.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    pub month: Option<String>,
    pub q: Option<String>,
    pub sort: Option<String>,
    pub open: Option<String>,
}

/// View state carried in the page URL, so every control is a plain link or form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageState {
    pub month: Option<MonthKey>,
    pub query: String,
    pub sort_by_total: bool,
    pub open: Vec<u64>,
}

impl From<PageQuery> for PageState {
    fn from(query: PageQuery) -> Self {
        let mut open: Vec<u64> = Vec::new();
        for id in query.open.as_deref().unwrap_or_default().split(',') {
            if let Ok(id) = id.trim().parse() {
                if !open.contains(&id) {
                    open.push(id);
                }
            }
        }

        Self {
            month: query.month.and_then(|m| m.trim().parse().ok()),
            query: query.q.unwrap_or_default().trim().to_string(),
            sort_by_total: query.sort.as_deref() == Some(SORT_TOTAL),
            open,
        }
    }
}

impl PageState {
    pub fn href(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        if let Some(month) = self.month {
            serializer.append_pair("month", &month.to_string());
        }
        if !self.query.is_empty() {
            serializer.append_pair("q", &self.query);
        }
        if self.sort_by_total {
            serializer.append_pair("sort", SORT_TOTAL);
        }
        if !self.open.is_empty() {
            let open: Vec<String> = self.open.iter().map(u64::to_string).collect();
            serializer.append_pair("open", &open.join(","));
        }
        format!("?{}", serializer.finish())
    }

    pub fn with_toggled(&self, core_id: u64) -> Self {
        let mut next = self.clone();
        if let Some(pos) = next.open.iter().position(|id| *id == core_id) {
            next.open.remove(pos);
        } else {
            next.open.push(core_id);
        }
        next
    }

    pub fn sorted_by_total(&self) -> Self {
        Self {
            sort_by_total: true,
            ..self.clone()
        }
    }

    pub fn without_query(&self) -> Self {
        Self {
            query: String::new(),
            ..self.clone()
        }
    }

    /// Replays the state onto a freshly loaded table.
    pub fn apply(&self, table: &mut ReportTable) {
        table.set_filter(&self.query);
        if self.sort_by_total {
            table.sort_by_total_desc();
        }
        for core_id in &self.open {
            table.toggle_detail(*core_id);
        }
    }
}

pub fn meta_line(report: &MonthlyReport) -> String {
    format!(
        "Month {} · {}",
        report.month,
        report
            .generated_at
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S")
    )
}

fn write_month_selector(
    out: &mut String,
    months: &[MonthKey],
    selected: Option<MonthKey>,
) -> std::fmt::Result {
    writeln!(out, "<form method=\"get\" class=\"months\">")?;
    writeln!(
        out,
        "<select id=\"month\" name=\"month\" onchange=\"this.form.submit()\">"
    )?;
    for month in months {
        let marker = if Some(*month) == selected {
            " selected"
        } else {
            ""
        };
        writeln!(out, "<option value=\"{month}\"{marker}>{month}</option>")?;
    }
    writeln!(out, "</select>")?;
    writeln!(out, "<noscript><button type=\"submit\">Show</button></noscript>")?;
    writeln!(out, "</form>")
}

fn write_search(out: &mut String, state: &PageState) -> std::fmt::Result {
    writeln!(out, "<form method=\"get\" class=\"search\">")?;
    if let Some(month) = state.month {
        writeln!(out, "<input type=\"hidden\" name=\"month\" value=\"{month}\">")?;
    }
    if state.sort_by_total {
        writeln!(out, "<input type=\"hidden\" name=\"sort\" value=\"{SORT_TOTAL}\">")?;
    }
    writeln!(
        out,
        "<input id=\"search\" name=\"q\" placeholder=\"coreId\" value=\"{}\">",
        encode_double_quoted_attribute(&state.query)
    )?;
    writeln!(out, "<button type=\"submit\">Search</button>")?;
    if !state.query.is_empty() {
        writeln!(
            out,
            "<a id=\"clear\" href=\"{}\">Clear</a>",
            encode_double_quoted_attribute(&state.without_query().href())
        )?;
    }
    writeln!(
        out,
        "<a id=\"sortTotal\" href=\"{}\">Sort by total</a>",
        encode_double_quoted_attribute(&state.sorted_by_total().href())
    )?;
    writeln!(out, "</form>")
}

/// Full HTML page for one loaded report and the table built from it.
pub fn render_page(
    state: &PageState,
    months: &[MonthKey],
    selected: Option<MonthKey>,
    report: &MonthlyReport,
    table: &ReportTable,
) -> Result<String, std::fmt::Error> {
    let mut out = String::new();
    writeln!(out, "<!DOCTYPE html>")?;
    writeln!(out, "<html>")?;
    writeln!(out, "<head>")?;
    writeln!(out, "<meta charset=\"utf-8\">")?;
    writeln!(out, "<title>Audit Points Report</title>")?;
    writeln!(
        out,
        "<style>table{{border-collapse:collapse}}td,th{{padding:2px 8px;border:1px solid #ccc}}tr.detail table{{margin:4px 0}}</style>"
    )?;
    writeln!(out, "</head>")?;
    writeln!(out, "<body>")?;
    writeln!(out, "<h1>Audit Points Report</h1>")?;

    write_month_selector(&mut out, months, selected)?;
    writeln!(
        out,
        "<div id=\"meta\">{}</div>",
        encode_text(&meta_line(report))
    )?;
    write_search(&mut out, state)?;

    let rows = table.render_html(|core_id| state.with_toggled(core_id).href())?;
    out.push_str(&rows);

    writeln!(out, "</body>")?;
    writeln!(out, "</html>")?;
    Ok(out)
}
