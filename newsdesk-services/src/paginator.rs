//! Page slicing over a cached result set

/// One page of an ordered list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<'a, T> {
    pub items: &'a [T],
    pub current_page: usize,
    pub total_pages: usize,
}

/// Slice `[(page-1)*limit, page*limit)` out of `items`, clipped to bounds.
///
/// `total_pages` is at least 1, and a page past the end is empty rather than
/// an error. `page` and `limit` of zero are treated as 1.
pub fn paginate<T>(items: &[T], page: usize, limit: usize) -> Page<'_, T> {
    let page = page.max(1);
    let limit = limit.max(1);
    let total_pages = items.len().div_ceil(limit).max(1);

    let start = (page - 1).saturating_mul(limit).min(items.len());
    let end = start.saturating_add(limit).min(items.len());

    Page {
        items: &items[start..end],
        current_page: page,
        total_pages,
    }
}
