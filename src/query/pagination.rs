/// LIMIT/OFFSET window of a query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Pagination {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl Pagination {
    /// Create pagination with a 1-indexed page number and per-page count
    pub fn page(page: u32, per_page: u32) -> Self {
        let offset = if page > 1 {
            Some((page - 1).saturating_mul(per_page))
        } else {
            None
        };
        Self {
            limit: Some(per_page),
            offset,
        }
    }

    /// Create pagination with only limit
    pub fn limit_only(limit: u32) -> Self {
        Self {
            limit: Some(limit),
            offset: None,
        }
    }

    /// Create pagination from an optional offset and limit
    pub fn window(offset: Option<u32>, limit: Option<u32>) -> Option<Self> {
        if offset.is_none() && limit.is_none() {
            None
        } else {
            Some(Self { limit, offset })
        }
    }

    pub fn to_sql(&self) -> String {
        let mut sql = String::new();

        if let Some(limit) = self.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }

        if let Some(offset) = self.offset {
            sql.push_str(&format!(" OFFSET {offset}"));
        }

        sql
    }

    /// Apply the window to an in-memory sequence
    pub fn apply<T>(&self, items: Vec<T>) -> Vec<T> {
        let skip = self.offset.unwrap_or(0) as usize;
        let take = self.limit.map_or(usize::MAX, |limit| limit as usize);
        items.into_iter().skip(skip).take(take).collect()
    }
}
