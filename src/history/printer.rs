use super::model::HistoryRecord;
use super::page::HistoryPage;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, Table};

/// 以表格形式渲染一页历史记录
pub fn render_page(page: &HistoryPage) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec![
        "ID", "Time", "Method", "URL", "Status", "Duration", "Size",
    ]);

    for record in &page.data {
        table.add_row(vec![
            Cell::new(record.id),
            Cell::new(record.created_at.format("%Y-%m-%d %H:%M:%S")),
            Cell::new(&record.method),
            Cell::new(&record.url).add_attribute(Attribute::Dim),
            status_cell(record),
            Cell::new(format_optional(record.response_time_millis, "ms")),
            Cell::new(format_optional(record.response_size_bytes, " B")),
        ]);
    }

    let p = &page.pagination;
    format!(
        "{}\nPage {}/{} ({} total{})",
        table,
        p.page,
        p.total_pages.max(1),
        p.total,
        if p.has_more { ", more available" } else { "" }
    )
}

fn status_cell(record: &HistoryRecord) -> Cell {
    match record.response_status {
        Some(0) => Cell::new("ERR").fg(Color::Red),
        Some(status) if status < 400 => Cell::new(status).fg(Color::Green),
        Some(status) => Cell::new(status).fg(Color::Red),
        None => Cell::new("-"),
    }
}

fn format_optional(value: Option<u64>, unit: &str) -> String {
    value
        .map(|v| format!("{}{}", v, unit))
        .unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::model::NewHistoryRecord;
    use crate::history::page::{PageRequest, Pagination};
    use chrono::Utc;

    fn record(id: u64, status: Option<u16>) -> HistoryRecord {
        NewHistoryRecord {
            url: format!("https://example.com/{}", id),
            method: "GET".to_string(),
            headers: None,
            query_params: None,
            request_body: None,
            response_status: status,
            response_time_millis: Some(15),
            response_size_bytes: None,
            response_preview: String::new(),
            response_body: String::new(),
            created_at: Utc::now(),
        }
        .with_id(id)
    }

    #[test]
    fn test_render_page() {
        let page = HistoryPage {
            data: vec![record(2, Some(0)), record(1, Some(200))],
            pagination: Pagination::new(PageRequest::new(1, 2), 2, 3),
        };

        let output = render_page(&page);
        assert!(output.contains("https://example.com/2"));
        assert!(output.contains("ERR"));
        assert!(output.contains("15ms"));
        assert!(output.contains("Page 1/2 (3 total, more available)"));
    }
}
