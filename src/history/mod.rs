pub mod model;
pub mod page;
pub mod printer;
pub mod recorder;
pub mod selector;
pub mod storage;

pub use model::{HistoryRecord, NewHistoryRecord};
pub use page::{HistoryPage, PageRequest, Pagination};
pub use recorder::TruncationLimits;
pub use storage::HistoryStorage;

use crate::{ReqdeckError, Result};

/// 解析用户传入的历史记录 ID
pub fn parse_id(raw: Option<&str>) -> Result<u64> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ReqdeckError::validation("ID is required"))?;

    match raw.parse::<u64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ReqdeckError::validation(format!(
            "Invalid history id: {}",
            raw
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id(Some("42")).unwrap(), 42);
        assert_eq!(parse_id(Some(" 7 ")).unwrap(), 7);

        for bad in [None, Some(""), Some("  "), Some("abc"), Some("0"), Some("-1")] {
            assert!(matches!(
                parse_id(bad),
                Err(ReqdeckError::ValidationError(_))
            ));
        }
    }
}
