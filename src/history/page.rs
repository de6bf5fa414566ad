use serde::{Deserialize, Serialize};

use crate::history::model::HistoryRecord;

pub const DEFAULT_PAGE_SIZE: usize = 20;
pub const MAX_PAGE_SIZE: usize = 100;

/// 已归一化的分页参数：page >= 1，limit ∈ [1, MAX_PAGE_SIZE]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: usize,
    limit: usize,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// 负数和 0 的 page 归为 1，limit 截断到 [1, 100]
    pub fn new(page: i64, limit: i64) -> Self {
        Self {
            page: page.max(1) as usize,
            limit: limit.clamp(1, MAX_PAGE_SIZE as i64) as usize,
        }
    }

    /// 从查询字符串解析；缺失或非数字时使用默认值
    pub fn from_query(page: Option<&str>, limit: Option<&str>) -> Self {
        let page = parse_number(page).unwrap_or(1);
        let limit = parse_number(limit).unwrap_or(DEFAULT_PAGE_SIZE as i64);
        Self::new(page, limit)
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn offset(&self) -> usize {
        (self.page - 1).saturating_mul(self.limit)
    }
}

fn parse_number(value: Option<&str>) -> Option<i64> {
    value.and_then(|v| v.trim().parse::<i64>().ok())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: usize,
    pub limit: usize,
    pub total: usize,
    pub total_pages: usize,
    pub has_more: bool,
}

impl Pagination {
    pub fn new(request: PageRequest, returned: usize, total: usize) -> Self {
        Self {
            page: request.page(),
            limit: request.limit(),
            total,
            total_pages: total.div_ceil(request.limit()),
            has_more: request.offset().saturating_add(returned) < total,
        }
    }
}

/// 一页历史记录（按创建时间倒序）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryPage {
    pub data: Vec<HistoryRecord>,
    pub pagination: Pagination,
}
