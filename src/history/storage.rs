use super::model::{HistoryRecord, NewHistoryRecord};
use super::page::{HistoryPage, PageRequest, Pagination};
use crate::{ReqdeckError, Result};
use fs2::FileExt;
use serde::Deserialize;
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Seek, SeekFrom, Write};
use std::path::PathBuf;
use tracing::warn;

const HISTORY_FILE: &str = "history.jsonl";
// Last assigned id, so ids are never reused after a delete
const SEQUENCE_FILE: &str = "history.seq";

/// JSON Lines 格式的历史记录存储
///
/// 每行一条 `HistoryRecord`，写入按 ID 递增顺序追加。
#[derive(Debug, Clone)]
pub struct HistoryStorage {
    dir: PathBuf,
}

#[derive(Deserialize)]
struct RecordId {
    id: u64,
}

impl HistoryStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn log_path(&self) -> PathBuf {
        self.dir.join(HISTORY_FILE)
    }

    fn sequence_path(&self) -> PathBuf {
        self.dir.join(SEQUENCE_FILE)
    }

    /// Ensure directory exists
    fn ensure_dir(&self) -> Result<()> {
        if !self.dir.exists() {
            fs::create_dir_all(&self.dir).map_err(ReqdeckError::storage)?;
        }
        Ok(())
    }

    /// 追加一条记录并分配 ID
    ///
    /// # Concurrency Strategy
    /// ID 分配和写入都在 `fs2::lock_exclusive` 持有期间完成，
    /// 多个任务或进程同时写入时 ID 依然唯一且递增。
    pub fn append(&self, entry: NewHistoryRecord) -> Result<HistoryRecord> {
        self.ensure_dir()?;

        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(self.log_path())
            .map_err(ReqdeckError::storage)?;

        file.lock_exclusive().map_err(ReqdeckError::storage)?;

        let id = self.next_id(&file)?;
        let record = entry.with_id(id);
        let json = serde_json::to_string(&record).map_err(ReqdeckError::storage)?;

        fs::write(self.sequence_path(), id.to_string()).map_err(ReqdeckError::storage)?;
        writeln!(file, "{}", json).map_err(ReqdeckError::storage)?;

        Ok(record)
    }

    /// 读取下一个 ID，必须在持有排他锁时调用
    fn next_id(&self, locked_log: &File) -> Result<u64> {
        let last = match fs::read_to_string(self.sequence_path()) {
            Ok(content) => content.trim().parse::<u64>().ok(),
            Err(_) => None,
        };

        let last = match last {
            Some(last) => last,
            // 序列文件缺失或损坏时，从日志中恢复
            None => parse_records(BufReader::new(locked_log))?
                .iter()
                .map(|r| r.id)
                .max()
                .unwrap_or(0),
        };

        Ok(last + 1)
    }

    /// 分页列出记录，按 createdAt 倒序（相同时按 ID 倒序）
    pub fn list(&self, page: PageRequest) -> Result<HistoryPage> {
        let mut records = self.read_all()?;
        let total = records.len();

        records.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });

        let data: Vec<HistoryRecord> = records
            .into_iter()
            .skip(page.offset())
            .take(page.limit())
            .collect();
        let pagination = Pagination::new(page, data.len(), total);

        Ok(HistoryPage { data, pagination })
    }

    pub fn get(&self, id: u64) -> Result<HistoryRecord> {
        self.read_all()?
            .into_iter()
            .find(|r| r.id == id)
            .ok_or(ReqdeckError::NotFound(id))
    }

    pub fn count(&self) -> Result<usize> {
        Ok(self.read_all()?.len())
    }

    /// 删除指定 ID 的记录，不存在时返回 `NotFound`
    ///
    /// 在排他锁内截断并重写日志文件
    pub fn delete(&self, id: u64) -> Result<()> {
        let log_path = self.log_path();
        if !log_path.exists() {
            return Err(ReqdeckError::NotFound(id));
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&log_path)
            .map_err(ReqdeckError::storage)?;

        file.lock_exclusive().map_err(ReqdeckError::storage)?;

        let reader = BufReader::new(&file);
        let mut kept = Vec::new();
        let mut found = false;
        for line in reader.lines() {
            let line = line.map_err(ReqdeckError::storage)?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<RecordId>(&line) {
                Ok(record) if record.id == id => found = true,
                _ => kept.push(line),
            }
        }

        if !found {
            return Err(ReqdeckError::NotFound(id));
        }

        let mut file = file;
        file.set_len(0).map_err(ReqdeckError::storage)?;
        file.seek(SeekFrom::Start(0))
            .map_err(ReqdeckError::storage)?;

        let mut writer = BufWriter::new(file);
        for line in kept {
            writeln!(writer, "{}", line).map_err(ReqdeckError::storage)?;
        }
        writer.flush().map_err(ReqdeckError::storage)?;

        Ok(())
    }

    fn read_all(&self) -> Result<Vec<HistoryRecord>> {
        let log_path = self.log_path();
        if !log_path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&log_path).map_err(ReqdeckError::storage)?;
        // 共享锁：避免读到写入者写了一半的行
        file.lock_shared().map_err(ReqdeckError::storage)?;

        parse_records(BufReader::new(&file))
        // Unlock on drop
    }
}

fn parse_records<R: BufRead>(reader: R) -> Result<Vec<HistoryRecord>> {
    let mut records = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(ReqdeckError::storage)?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<HistoryRecord>(&line) {
            Ok(record) => records.push(record),
            Err(e) => warn!("Skipping malformed history line {}: {}", index + 1, e),
        }
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use tempfile::TempDir;

    fn dummy_entry(url: &str) -> NewHistoryRecord {
        NewHistoryRecord {
            url: url.to_string(),
            method: "GET".to_string(),
            headers: None,
            query_params: None,
            request_body: None,
            response_status: Some(200),
            response_time_millis: Some(12),
            response_size_bytes: Some(2),
            response_preview: "{}".to_string(),
            response_body: "{}".to_string(),
            created_at: Utc::now(),
        }
    }

    fn storage() -> (TempDir, HistoryStorage) {
        let temp_dir = TempDir::new().unwrap();
        let storage = HistoryStorage::new(temp_dir.path().join("history"));
        (temp_dir, storage)
    }

    #[test]
    fn test_append_assigns_increasing_ids() {
        let (_dir, storage) = storage();

        let first = storage.append(dummy_entry("u1")).unwrap();
        let second = storage.append(dummy_entry("u2")).unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(storage.count().unwrap(), 2);
    }

    #[test]
    fn test_empty_store() {
        let (_dir, storage) = storage();
        let page = storage.list(PageRequest::default()).unwrap();
        assert!(page.data.is_empty());
        assert_eq!(page.pagination.total, 0);
        assert_eq!(storage.count().unwrap(), 0);
    }

    #[test]
    fn test_ids_not_reused_after_delete() {
        let (_dir, storage) = storage();

        storage.append(dummy_entry("u1")).unwrap();
        let second = storage.append(dummy_entry("u2")).unwrap();
        storage.delete(second.id).unwrap();

        let third = storage.append(dummy_entry("u3")).unwrap();
        assert_eq!(third.id, 3);
    }

    #[test]
    fn test_next_id_recovers_without_sequence_file() {
        let (_dir, storage) = storage();

        storage.append(dummy_entry("u1")).unwrap();
        storage.append(dummy_entry("u2")).unwrap();
        fs::remove_file(storage.sequence_path()).unwrap();

        let record = storage.append(dummy_entry("u3")).unwrap();
        assert_eq!(record.id, 3);
    }

    #[test]
    fn test_list_newest_first() {
        let (_dir, storage) = storage();
        let base = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

        for (i, url) in ["t1", "t2", "t3"].iter().enumerate() {
            let mut entry = dummy_entry(url);
            entry.created_at = base + Duration::seconds(i as i64);
            storage.append(entry).unwrap();
        }

        let page = storage.list(PageRequest::default()).unwrap();
        let urls: Vec<&str> = page.data.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(urls, vec!["t3", "t2", "t1"]);
    }

    #[test]
    fn test_list_ties_broken_by_id() {
        let (_dir, storage) = storage();
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

        for url in ["a", "b"] {
            let mut entry = dummy_entry(url);
            entry.created_at = at;
            storage.append(entry).unwrap();
        }

        let page = storage.list(PageRequest::default()).unwrap();
        assert_eq!(page.data[0].url, "b");
        assert_eq!(page.data[1].url, "a");
    }

    #[test]
    fn test_pagination_over_45_records() {
        let (_dir, storage) = storage();
        for i in 0..45 {
            storage.append(dummy_entry(&format!("u{}", i))).unwrap();
        }

        let first = storage.list(PageRequest::new(1, 20)).unwrap();
        assert_eq!(first.data.len(), 20);
        assert!(first.pagination.has_more);
        assert_eq!(first.pagination.total_pages, 3);
        assert_eq!(first.pagination.total, 45);

        let last = storage.list(PageRequest::new(3, 20)).unwrap();
        assert_eq!(last.data.len(), 5);
        assert!(!last.pagination.has_more);

        let beyond = storage.list(PageRequest::new(4, 20)).unwrap();
        assert!(beyond.data.is_empty());
        assert!(!beyond.pagination.has_more);
    }

    #[test]
    fn test_get_and_delete() {
        let (_dir, storage) = storage();
        let record = storage.append(dummy_entry("keep")).unwrap();
        let doomed = storage.append(dummy_entry("remove")).unwrap();

        assert_eq!(storage.get(doomed.id).unwrap().url, "remove");
        storage.delete(doomed.id).unwrap();

        assert!(matches!(
            storage.get(doomed.id),
            Err(ReqdeckError::NotFound(_))
        ));
        assert_eq!(storage.get(record.id).unwrap(), record);
        assert_eq!(storage.count().unwrap(), 1);
    }

    #[test]
    fn test_delete_missing_keeps_count() {
        let (_dir, storage) = storage();
        assert!(matches!(storage.delete(1), Err(ReqdeckError::NotFound(1))));

        storage.append(dummy_entry("u1")).unwrap();
        storage.append(dummy_entry("u2")).unwrap();

        assert!(matches!(
            storage.delete(99),
            Err(ReqdeckError::NotFound(99))
        ));
        assert_eq!(storage.count().unwrap(), 2);
    }

    #[test]
    fn test_malformed_lines_are_skipped() {
        let (_dir, storage) = storage();
        storage.append(dummy_entry("u1")).unwrap();

        let mut file = OpenOptions::new()
            .append(true)
            .open(storage.log_path())
            .unwrap();
        writeln!(file, "not json").unwrap();
        drop(file);

        storage.append(dummy_entry("u2")).unwrap();
        assert_eq!(storage.count().unwrap(), 2);
    }

    #[test]
    fn test_unwritable_dir_is_storage_error() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("file");
        fs::write(&blocker, "x").unwrap();

        let storage = HistoryStorage::new(blocker.join("history"));
        let result = storage.append(dummy_entry("u1"));
        assert!(matches!(result, Err(ReqdeckError::StorageError(_))));
    }
}
