use serde::Serialize;

use crate::core::config::Settings;

#[derive(Debug, Serialize)]
pub(crate) struct PaginatedResponse<T> {
    pub(crate) items: Vec<T>,
    pub(crate) total: i64,
    pub(crate) page: u64,
    pub(crate) total_pages: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PageWindow {
    pub(crate) page: u64,
    pub(crate) page_size: u64,
    pub(crate) skip: i64,
    pub(crate) limit: i64,
}

/// Resolve requested paging against configured defaults. Pages are
/// zero-based: the skip is `page * page_size`.
pub(crate) fn resolve_window(
    page: Option<u64>,
    page_size: Option<u64>,
    settings: &Settings,
) -> PageWindow {
    let engagement = settings.engagement();
    let page = page.unwrap_or(0);
    let page_size = page_size
        .unwrap_or(engagement.default_page_size)
        .clamp(1, engagement.max_page_size);

    PageWindow {
        page,
        page_size,
        skip: (page * page_size) as i64,
        limit: page_size as i64,
    }
}

pub(crate) fn total_pages(total: i64, page_size: u64) -> u64 {
    if total <= 0 {
        return 0;
    }
    (total as u64).div_ceil(page_size)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_skip_is_page_times_size() {
        std::env::set_var("SECRET_KEY", "test-secret");
        let settings = Settings::load().expect("settings");

        let window = resolve_window(Some(3), Some(10), &settings);
        assert_eq!(window.skip, 30);
        assert_eq!(window.limit, 10);

        let default = resolve_window(None, None, &settings);
        assert_eq!(default.page, 0);
        assert_eq!(default.skip, 0);
    }

    #[test]
    fn page_size_is_clamped_to_configured_max() {
        std::env::set_var("SECRET_KEY", "test-secret");
        let settings = Settings::load().expect("settings");

        let window = resolve_window(Some(0), Some(10_000), &settings);
        assert_eq!(window.page_size, settings.engagement().max_page_size);

        let floor = resolve_window(Some(0), Some(0), &settings);
        assert_eq!(floor.page_size, 1);
    }

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(total_pages(0, 20), 0);
        assert_eq!(total_pages(1, 20), 1);
        assert_eq!(total_pages(20, 20), 1);
        assert_eq!(total_pages(21, 20), 2);
    }
}
