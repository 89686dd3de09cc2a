use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageItem {
    Page(u32),
    Ellipsis,
}

/// Page links to show: the first two and last two pages, `current ± radius`,
/// and an ellipsis wherever pages were collapsed.
pub fn visible_pages(current: u32, total: u32, radius: u32) -> Vec<PageItem> {
    if total == 0 {
        return Vec::new();
    }
    let last = total - 1;

    let mut pages = BTreeSet::new();
    pages.extend([0, 1, last.saturating_sub(1), last]);
    pages.extend(current.saturating_sub(radius)..=current.saturating_add(radius).min(last));

    let mut items = Vec::with_capacity(pages.len() + 2);
    let mut previous: Option<u32> = None;
    for page in pages.into_iter().filter(|p| *p <= last) {
        if let Some(prev) = previous {
            if page > prev + 1 {
                items.push(PageItem::Ellipsis);
            }
        }
        items.push(PageItem::Page(page));
        previous = Some(page);
    }
    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use PageItem::{Ellipsis, Page};

    #[test]
    fn middle_page_collapses_both_sides() {
        assert_eq!(
            visible_pages(10, 20, 2),
            vec![
                Page(0), Page(1), Ellipsis,
                Page(8), Page(9), Page(10), Page(11), Page(12),
                Ellipsis, Page(18), Page(19),
            ]
        );
    }

    #[test]
    fn near_start_has_no_leading_ellipsis() {
        assert_eq!(
            visible_pages(1, 10, 2),
            vec![Page(0), Page(1), Page(2), Page(3), Ellipsis, Page(8), Page(9)]
        );
    }

    #[test]
    fn small_totals_never_show_out_of_range_pages() {
        assert_eq!(visible_pages(0, 1, 2), vec![Page(0)]);
        assert_eq!(visible_pages(0, 2, 2), vec![Page(0), Page(1)]);
        assert!(visible_pages(0, 0, 2).is_empty());
    }

    #[test]
    fn radius_is_configurable() {
        assert_eq!(
            visible_pages(5, 11, 0),
            vec![Page(0), Page(1), Ellipsis, Page(5), Ellipsis, Page(9), Page(10)]
        );
    }
}
