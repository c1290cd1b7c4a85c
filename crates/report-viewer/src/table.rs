use html_escape::encode_double_quoted_attribute;
use shared::models::{CoreSummary, DailyRecord};
use std::collections::HashSet;
use std::fmt::Write;

const COLUMNS: usize = 6;

/// Rows of one monthly report plus the viewer's filter and open detail rows.
#[derive(Debug, Clone, Default)]
pub struct ReportTable {
    rows: Vec<CoreSummary>,
    filter: String,
    expanded: HashSet<u64>,
}

impl ReportTable {
    pub fn new(rows: Vec<CoreSummary>) -> Self {
        Self {
            rows,
            ..Default::default()
        }
    }

    pub fn set_filter(&mut self, query: &str) {
        self.filter = query.trim().to_string();
    }

    /// Rows whose core id contains the filter text, in current order.
    pub fn visible_rows(&self) -> Vec<&CoreSummary> {
        self.rows
            .iter()
            .filter(|row| {
                self.filter.is_empty() || row.core_id.to_string().contains(&self.filter)
            })
            .collect()
    }

    /// Stable sort by total points, highest first. The filter stays in effect.
    pub fn sort_by_total_desc(&mut self) {
        self.rows.sort_by(|a, b| b.total_points.cmp(&a.total_points));
    }

    /// Opens or closes the detail row of a core. Returns whether it is now open.
    pub fn toggle_detail(&mut self, core_id: u64) -> bool {
        if self.expanded.remove(&core_id) {
            false
        } else {
            self.expanded.insert(core_id);
            true
        }
    }

    pub fn is_expanded(&self, core_id: u64) -> bool {
        self.expanded.contains(&core_id)
    }

    /// Renders the table, linking each core's detail control to `toggle_href(core_id)`.
    pub fn render_html(
        &self,
        toggle_href: impl Fn(u64) -> String,
    ) -> Result<String, std::fmt::Error> {
        let mut out = String::new();
        writeln!(out, "<table id=\"main\">")?;
        writeln!(
            out,
            "<thead><tr><th>coreId</th><th>total</th><th>miner</th><th>witness</th><th>days</th><th></th></tr></thead>"
        )?;
        writeln!(out, "<tbody>")?;

        for row in self.visible_rows() {
            let open = self.is_expanded(row.core_id);
            writeln!(
                out,
                "<tr class=\"core\"><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td><a class=\"toggle\" href=\"{}\">{}</a></td></tr>",
                row.core_id,
                row.total_points,
                row.miner_total,
                row.witness_total,
                row.days,
                encode_double_quoted_attribute(&toggle_href(row.core_id)),
                if open { "Hide" } else { "Detail" }
            )?;
            if open {
                write_detail(&mut out, &row.details)?;
            }
        }

        writeln!(out, "</tbody>")?;
        writeln!(out, "</table>")?;
        Ok(out)
    }
}

fn liveness_glyph(live: bool) -> &'static str {
    if live {
        "✔"
    } else {
        "✘"
    }
}

fn write_detail(out: &mut String, details: &[DailyRecord]) -> std::fmt::Result {
    writeln!(out, "<tr class=\"detail\"><td colspan=\"{COLUMNS}\"><table class=\"sub\">")?;
    writeln!(
        out,
        "<thead><tr><th>date</th><th>minerLive</th><th>witnessLive</th><th>minerPoints</th><th>witnessPoints</th><th>total</th></tr></thead>"
    )?;
    writeln!(out, "<tbody>")?;
    for day in details {
        writeln!(
            out,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            day.date,
            liveness_glyph(day.miner_liveness),
            liveness_glyph(day.witness_liveness),
            day.miner_points,
            day.witness_points,
            day.total_points
        )?;
    }
    writeln!(out, "</tbody></table></td></tr>")
}
