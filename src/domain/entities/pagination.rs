use serde::Serialize;

pub const DEFAULT_PAGE_LIMIT: u32 = 20;
pub const MAX_PAGE_LIMIT: u32 = 100;

/// 1-based page window parsed leniently from query strings. Malformed or
/// out-of-range values fall back to defaults instead of failing the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Pagination { page: 1, limit: DEFAULT_PAGE_LIMIT }
    }
}

impl Pagination {
    pub fn new(page: u32, limit: u32) -> Self {
        Pagination {
            page: page.max(1),
            limit: limit.clamp(1, MAX_PAGE_LIMIT),
        }
    }

    pub fn from_params(page: Option<&str>, limit: Option<&str>) -> Self {
        let page = page
            .and_then(|v| v.trim().parse::<u32>().ok())
            .filter(|p| *p > 0)
            .unwrap_or(1);
        let limit = limit
            .and_then(|v| v.trim().parse::<u32>().ok())
            .filter(|l| *l > 0)
            .unwrap_or(DEFAULT_PAGE_LIMIT);
        Self::new(page, limit)
    }

    pub fn offset(&self) -> i64 {
        (self.page.saturating_sub(1) as i64) * (self.limit as i64)
    }

    pub fn pages(&self, total: i64) -> i64 {
        if total <= 0 {
            return 0;
        }
        let limit = self.limit as i64;
        (total + limit - 1) / limit
    }

    /// Applies the window to an already sorted slice.
    pub fn slice<T: Clone>(&self, items: &[T]) -> Vec<T> {
        let start = usize::try_from(self.offset()).unwrap_or(usize::MAX);
        items
            .iter()
            .skip(start)
            .take(self.limit as usize)
            .cloned()
            .collect()
    }
}

#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub success: bool,
    pub count: usize,
    pub total: i64,
    pub page: u32,
    pub pages: i64,
    pub data: Vec<T>,
}

impl<T> Paginated<T> {
    pub fn new(data: Vec<T>, total: i64, pagination: Pagination) -> Self {
        Paginated {
            success: true,
            count: data.len(),
            total,
            page: pagination.page,
            pages: pagination.pages(total),
            data,
        }
    }

    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Paginated<U> {
        Paginated {
            success: self.success,
            count: self.count,
            total: self.total,
            page: self.page,
            pages: self.pages,
            data: self.data.into_iter().map(f).collect(),
        }
    }
}

/// `{ _id, count }` bucket as returned by the category/type summaries.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CountBucket {
    #[serde(rename = "_id")]
    pub key: String,
    pub count: i64,
}

/// Prepends the catch-all bucket and orders the rest by count, largest first.
pub fn with_total_bucket(all_label: &str, total: i64, mut buckets: Vec<CountBucket>) -> Vec<CountBucket> {
    buckets.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key)));
    let mut out = Vec::with_capacity(buckets.len() + 1);
    out.push(CountBucket { key: all_label.to_string(), count: total });
    out.extend(buckets);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lenient_parsing_falls_back_to_defaults() {
        assert_eq!(Pagination::from_params(None, None), Pagination::default());
        assert_eq!(Pagination::from_params(Some("abc"), Some("-3")), Pagination::default());
        assert_eq!(Pagination::from_params(Some("0"), Some("0")), Pagination::default());
        assert_eq!(Pagination::from_params(Some("2"), Some("500")), Pagination::new(2, MAX_PAGE_LIMIT));
    }

    #[test]
    fn count_and_pages_invariant_holds() {
        let items: Vec<u32> = (0..23).collect();
        let total = items.len() as i64;

        for limit in 1..=30u32 {
            for page in 1..=30u32 {
                let p = Pagination::new(page, limit);
                let window = p.slice(&items);
                let expected = (limit as i64).min((total - p.offset()).max(0));
                assert_eq!(window.len() as i64, expected, "page {page} limit {limit}");
                assert_eq!(p.pages(total), (total + limit as i64 - 1) / limit as i64);
            }
        }
    }

    #[test]
    fn empty_collections_have_zero_pages() {
        let page = Paginated::<u32>::new(Vec::new(), 0, Pagination::default());
        assert_eq!(page.count, 0);
        assert_eq!(page.pages, 0);
    }

    #[test]
    fn total_bucket_leads() {
        let buckets = vec![
            CountBucket { key: "AI".into(), count: 1 },
            CountBucket { key: "Full-Stack".into(), count: 4 },
        ];
        let out = with_total_bucket("All", 5, buckets);
        assert_eq!(out[0], CountBucket { key: "All".into(), count: 5 });
        assert_eq!(out[1].key, "Full-Stack");
        assert_eq!(out[2].key, "AI");
    }
}
