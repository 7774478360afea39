use std::str::FromStr;

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 10_000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            other => Err(format!("Invalid sortOrder '{other}', expected 'asc' or 'desc'")),
        }
    }
}

/// One-based page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    limit: u32,
}

impl PageRequest {
    /// # Errors
    /// Returns a message when `page` is zero or `limit` is outside `1..=MAX_PAGE_SIZE`.
    pub fn new(page: Option<u32>, limit: Option<u32>) -> Result<Self, String> {
        let page = page.unwrap_or(1);
        let limit = limit.unwrap_or(DEFAULT_PAGE_SIZE);
        if page == 0 {
            return Err("page must be a positive integer".to_string());
        }
        if limit == 0 || limit > MAX_PAGE_SIZE {
            return Err(format!("limit must be between 1 and {MAX_PAGE_SIZE}"));
        }
        Ok(Self { page, limit })
    }

    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    #[must_use]
    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: 1, limit: DEFAULT_PAGE_SIZE }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationMeta {
    pub total: i64,
    pub page: u32,
    pub limit: u32,
    pub last_page: i64,
}

impl PaginationMeta {
    #[must_use]
    pub fn new(request: PageRequest, total: i64) -> Self {
        let limit = i64::from(request.limit);
        Self { total, page: request.page, limit: request.limit, last_page: (total + limit - 1) / limit }
    }
}

#[derive(Debug, Clone)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub meta: PaginationMeta,
}

/// Splits a comma-joined query value, dropping empty segments.
///
/// # Errors
/// Returns the parse error of the first invalid segment.
pub fn parse_list<T: FromStr>(raw: Option<&str>) -> Result<Vec<T>, T::Err> {
    raw.map_or_else(
        || Ok(Vec::new()),
        |raw| raw.split(',').map(str::trim).filter(|s| !s.is_empty()).map(str::parse).collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_defaults() {
        let page = PageRequest::new(None, None).unwrap();
        assert_eq!(page.page(), 1);
        assert_eq!(page.limit(), DEFAULT_PAGE_SIZE);
        assert_eq!(page.offset(), 0);
    }

    #[test]
    fn test_page_bounds() {
        assert!(PageRequest::new(Some(0), None).is_err());
        assert!(PageRequest::new(None, Some(0)).is_err());
        assert!(PageRequest::new(None, Some(MAX_PAGE_SIZE + 1)).is_err());
        assert_eq!(PageRequest::new(Some(3), Some(25)).unwrap().offset(), 50);
    }

    #[test]
    fn test_last_page_rounds_up() {
        let request = PageRequest::new(Some(1), Some(10)).unwrap();
        assert_eq!(PaginationMeta::new(request, 0).last_page, 0);
        assert_eq!(PaginationMeta::new(request, 10).last_page, 1);
        assert_eq!(PaginationMeta::new(request, 11).last_page, 2);
    }

    #[test]
    fn test_parse_list_skips_empty_segments() {
        let parsed: Vec<String> = parse_list(Some("US,,GB, ")).unwrap();
        assert_eq!(parsed, vec!["US".to_string(), "GB".to_string()]);

        let empty: Vec<String> = parse_list(None).unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_sort_order_parsing() {
        assert_eq!("desc".parse::<SortOrder>().unwrap(), SortOrder::Desc);
        assert!("DESC".parse::<SortOrder>().is_err());
    }
}
