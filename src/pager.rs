/// A request window against a paginated endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: u32,
    pub offset: u32,
}

/// Windows of `page_size` starting at `start` until `total` is covered.
///
/// The last window may run past `total`; the API truncates it. Returns nothing
/// when `total <= start`. A zero `page_size` also yields nothing.
pub fn make_pages(total: u32, start: u32, page_size: u32) -> Vec<Page> {
    if page_size == 0 {
        return Vec::new();
    }
    (start..total)
        .step_by(page_size as usize)
        .map(|offset| Page {
            limit: page_size,
            offset,
        })
        .collect()
}
