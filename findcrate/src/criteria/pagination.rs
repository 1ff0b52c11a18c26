/// Default page size when no pagination is requested.
pub const DEFAULT_PAGE_SIZE: u64 = 10;

/// Parse a React Admin `[start, end]` range (inclusive). Falls back to `[0, 9]`.
#[must_use]
pub fn parse_range(range_str: Option<&str>) -> (u64, u64) {
    range_str.map_or((0, DEFAULT_PAGE_SIZE - 1), |r| {
        serde_json::from_str::<[u64; 2]>(r)
            .map(|range| (range[0], range[1]))
            .unwrap_or((0, DEFAULT_PAGE_SIZE - 1))
    })
}

/// Resolve `(offset, limit)` from either `page`/`per_page` (1-based pages) or
/// a `range`, in that order of preference.
#[must_use]
pub fn parse_pagination(
    page: Option<u64>,
    per_page: Option<u64>,
    range: Option<&str>,
) -> (u64, u64) {
    if let (Some(page), Some(per_page)) = (page, per_page) {
        let offset = page.saturating_sub(1).saturating_mul(per_page);
        (offset, per_page)
    } else if range.is_some() {
        let (start, end) = parse_range(range);
        let limit = end.saturating_sub(start).saturating_add(1);
        (start, limit)
    } else {
        (0, DEFAULT_PAGE_SIZE)
    }
}
