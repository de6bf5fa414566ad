use crate::Result;
use crate::ReqdeckError;
use crate::history::model::HistoryRecord;
use crate::history::page::PageRequest;
use crate::history::storage::HistoryStorage;
use inquire::Select;

/// Selection strategy for re-sending a recorded request
pub enum SelectionStrategy {
    Interactive,
    Id(u64),
}

/// Pick one history record based on the given strategy
pub fn select_record(storage: &HistoryStorage, strategy: SelectionStrategy) -> Result<HistoryRecord> {
    match strategy {
        SelectionStrategy::Interactive => select_interactive(storage),
        SelectionStrategy::Id(id) => storage.get(id),
    }
}

/// Interactively select a record from the newest page using a TUI
fn select_interactive(storage: &HistoryStorage) -> Result<HistoryRecord> {
    let page = storage.list(PageRequest::new(1, 50))?;

    if page.data.is_empty() {
        return Err(ReqdeckError::Other("History is empty".to_string()));
    }

    #[derive(Clone)]
    struct RecordOption {
        index: usize,
        display: String,
    }

    impl std::fmt::Display for RecordOption {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{}", self.display)
        }
    }

    let options: Vec<RecordOption> = page
        .data
        .iter()
        .enumerate()
        .map(|(index, record)| RecordOption {
            index,
            display: format_record_for_display(record),
        })
        .collect();

    let selected = Select::new("Select a request to replay:", options)
        .with_page_size(15)
        .with_help_message("Enter to confirm, type to filter")
        .prompt()
        .map_err(|e| ReqdeckError::Other(format!("Interaction canceled or failed: {}", e)))?;

    Ok(page.data[selected.index].clone())
}

fn format_record_for_display(record: &HistoryRecord) -> String {
    let time = record.created_at.format("%Y-%m-%d %H:%M:%S");
    let status = record
        .response_status
        .map(|s| s.to_string())
        .unwrap_or_else(|| "-".to_string());
    format!(
        "#{} [{}] {} {} ({})",
        record.id, status, record.method, record.url, time
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::model::NewHistoryRecord;
    use chrono::Utc;
    use tempfile::TempDir;

    fn create_dummy_entry(url: &str) -> NewHistoryRecord {
        NewHistoryRecord {
            url: url.to_string(),
            method: "GET".to_string(),
            headers: None,
            query_params: None,
            request_body: None,
            response_status: Some(200),
            response_time_millis: Some(100),
            response_size_bytes: Some(0),
            response_preview: String::new(),
            response_body: String::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_format_display() {
        let record = create_dummy_entry("https://example.com").with_id(7);
        let display = format_record_for_display(&record);
        assert!(display.starts_with("#7 [200] GET https://example.com"));
    }

    #[test]
    fn test_select_by_id() {
        let temp_dir = TempDir::new().unwrap();
        let storage = HistoryStorage::new(temp_dir.path());

        storage.append(create_dummy_entry("u1")).unwrap();
        storage.append(create_dummy_entry("u2")).unwrap();

        let selected = select_record(&storage, SelectionStrategy::Id(2)).unwrap();
        assert_eq!(selected.url, "u2");

        assert!(matches!(
            select_record(&storage, SelectionStrategy::Id(9)),
            Err(ReqdeckError::NotFound(9))
        ));
    }
}
