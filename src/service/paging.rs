//! Page/size parsing shared by the list endpoints.

/// A 1-based page with a bounded size.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest {
    pub page: i64,
    pub size: i64,
}

impl PageRequest {
    /// Missing, unparsable or zero values fall back to the defaults; results are clamped to
    /// `page >= 1` and `1 <= size <= max_size`.
    pub fn parse(page: Option<&str>, size: Option<&str>, default_size: i64, max_size: i64) -> Self {
        let page = parse_nonzero(page).unwrap_or(1).max(1);
        let size = parse_nonzero(size).unwrap_or(default_size).clamp(1, max_size);
        PageRequest { page, size }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.size)
    }
}

/// A single bounded count such as `limit`.
pub fn parse_limit(raw: Option<&str>, default: i64, max: i64) -> i64 {
    parse_nonzero(raw).unwrap_or(default).clamp(1, max)
}

fn parse_nonzero(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|s| s.trim().parse::<i64>().ok()).filter(|n| *n != 0)
}
