// Page/limit arithmetic for collection listings

use thiserror::Error;

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 10;

/// Largest skip a document store accepts (`i64::MAX`).
pub const MAX_SKIP: u64 = i64::MAX as u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PaginationError {
    /// Names the offending query parameter ("page" or "limit")
    #[error("{}", invalid_message(.0))]
    InvalidParameter(&'static str),
}

fn invalid_message(name: &str) -> &'static str {
    match name {
        "page" => "Invalid page number",
        _ => "Invalid limit",
    }
}

/// A validated page request. `page` is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub limit: u64,
}

impl PageRequest {
    pub fn new(page: u64, limit: u64) -> Result<Self, PaginationError> {
        if page < 1 {
            return Err(PaginationError::InvalidParameter("page"));
        }
        if limit == 0 {
            return Err(PaginationError::InvalidParameter("limit"));
        }
        // skip is sent to the store as a signed 64-bit integer
        match (page - 1).checked_mul(limit) {
            Some(skip) if skip <= MAX_SKIP => {}
            _ => return Err(PaginationError::InvalidParameter("page")),
        }
        Ok(Self { page, limit })
    }

    /// Parses raw query values. An absent parameter takes its default; a present
    /// but empty one is invalid.
    pub fn parse(page: Option<&str>, limit: Option<&str>) -> Result<Self, PaginationError> {
        let page = match page {
            None => DEFAULT_PAGE,
            Some(raw) => parse_positive(raw).ok_or(PaginationError::InvalidParameter("page"))?,
        };
        let limit = match limit {
            None => DEFAULT_LIMIT,
            Some(raw) => parse_positive(raw).ok_or(PaginationError::InvalidParameter("limit"))?,
        };
        Self::new(page, limit)
    }

    /// Number of leading documents to bypass.
    pub fn skip(&self) -> u64 {
        (self.page - 1) * self.limit
    }

    /// `ceil(total_count / limit)`; zero documents means zero pages.
    pub fn total_pages(&self, total_count: u64) -> u64 {
        total_count.div_ceil(self.limit)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

/// Accepts an optionally signed decimal integer and keeps it only if > 0.
fn parse_positive(raw: &str) -> Option<u64> {
    let value: i64 = raw.parse().ok()?;
    u64::try_from(value).ok().filter(|v| *v > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_absent() {
        let req = PageRequest::parse(None, None).unwrap();
        assert_eq!(req, PageRequest { page: 1, limit: 10 });
        assert_eq!(req.skip(), 0);
    }

    #[test]
    fn skip_is_page_offset_times_limit() {
        let req = PageRequest::parse(Some("3"), Some("25")).unwrap();
        assert_eq!(req.skip(), 50);
        let req = PageRequest::parse(Some("+2"), Some("5")).unwrap();
        assert_eq!(req.skip(), 5);
    }

    #[test]
    fn rejects_non_positive_or_non_numeric_page() {
        for raw in ["0", "-1", "abc", "", "1.5", " 1"] {
            assert_eq!(
                PageRequest::parse(Some(raw), None),
                Err(PaginationError::InvalidParameter("page")),
                "page={raw:?}"
            );
        }
    }

    #[test]
    fn rejects_non_positive_or_non_numeric_limit() {
        for raw in ["0", "-10", "ten", ""] {
            assert_eq!(
                PageRequest::parse(None, Some(raw)),
                Err(PaginationError::InvalidParameter("limit")),
                "limit={raw:?}"
            );
        }
    }

    #[test]
    fn page_is_checked_before_limit() {
        assert_eq!(
            PageRequest::parse(Some("x"), Some("y")),
            Err(PaginationError::InvalidParameter("page"))
        );
    }

    #[test]
    fn total_pages_is_ceiling() {
        let req = PageRequest::new(1, 10).unwrap();
        assert_eq!(req.total_pages(0), 0);
        assert_eq!(req.total_pages(1), 1);
        assert_eq!(req.total_pages(10), 1);
        assert_eq!(req.total_pages(11), 2);
        assert_eq!(req.total_pages(100), 10);

        let one = PageRequest::new(1, 1).unwrap();
        assert_eq!(one.total_pages(7), 7);
    }

    #[test]
    fn total_pages_zero_only_for_empty_collection() {
        for limit in [1u64, 2, 3, 10, 1000] {
            let req = PageRequest::new(1, limit).unwrap();
            for count in 0u64..50 {
                let pages = req.total_pages(count);
                assert_eq!(pages == 0, count == 0);
                assert!(pages * limit >= count);
                if count > 0 {
                    assert!((pages - 1) * limit < count);
                }
            }
        }
    }

    #[test]
    fn overflowing_skip_is_rejected() {
        assert_eq!(
            PageRequest::parse(Some(&i64::MAX.to_string()), Some("100")),
            Err(PaginationError::InvalidParameter("page"))
        );
    }

    #[test]
    fn skip_is_bounded_by_signed_range() {
        let last = PageRequest::new(MAX_SKIP + 1, 1).unwrap();
        assert_eq!(last.skip(), i64::MAX as u64);
        assert_eq!(
            PageRequest::new(MAX_SKIP + 2, 1),
            Err(PaginationError::InvalidParameter("page"))
        );

        // (2^61 + 1 - 1) * 4 = 2^63
        assert_eq!(
            PageRequest::parse(Some("2305843009213693953"), Some("4")),
            Err(PaginationError::InvalidParameter("page"))
        );
        let below = PageRequest::parse(Some("2305843009213693952"), Some("4")).unwrap();
        assert_eq!(below.skip(), (1u64 << 63) - 4);
    }

    #[test]
    fn messages() {
        assert_eq!(PaginationError::InvalidParameter("page").to_string(), "Invalid page number");
        assert_eq!(PaginationError::InvalidParameter("limit").to_string(), "Invalid limit");
    }
}
