use std::fmt;

use crate::clients::RowsQuery;
use crate::error::{AppError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

impl std::str::FromStr for SortDirection {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(AppError::InvalidInput(format!("unknown sort direction: {}", other))),
        }
    }
}

/// What the rows are ordered by.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortField {
    /// A spreadsheet column, stored under `data.<column>` on the backend.
    Column(String),
    /// Position of the sheet in the workbook.
    SheetIndex,
}

impl SortField {
    pub fn parse(raw: &str) -> Self {
        if raw == "sheetIndex" {
            SortField::SheetIndex
        } else {
            SortField::Column(raw.to_string())
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortField::Column(column) => write!(f, "data.{}", column),
            SortField::SheetIndex => f.write_str("sheetIndex"),
        }
    }
}

/// A fetch the viewport wants issued. `seq` identifies it so a late answer
/// to an older request can be told apart from the current one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowRequest {
    pub seq: u64,
    pub query: RowsQuery,
}

/// Page, size, sort and keyword over one sheet's rows.
#[derive(Debug, Clone)]
pub struct Viewport {
    current_page: u32,
    page_size: u32,
    sort_field: Option<SortField>,
    sort_direction: SortDirection,
    search_keyword: String,
    total_pages: u32,
    page_sizes: Vec<u32>,
    default_page_size: u32,
    next_seq: u64,
    latest_seq: Option<u64>,
}

impl Viewport {
    pub fn new(page_sizes: Vec<u32>, default_page_size: u32) -> Self {
        Self {
            current_page: 0,
            page_size: default_page_size,
            sort_field: None,
            sort_direction: SortDirection::Asc,
            search_keyword: String::new(),
            total_pages: 0,
            page_sizes,
            default_page_size,
            next_seq: 0,
            latest_seq: None,
        }
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn page_sizes(&self) -> &[u32] {
        &self.page_sizes
    }

    pub fn sort_field(&self) -> Option<&SortField> {
        self.sort_field.as_ref()
    }

    pub fn sort_direction(&self) -> SortDirection {
        self.sort_direction
    }

    pub fn search_keyword(&self) -> &str {
        &self.search_keyword
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    pub fn set_total_pages(&mut self, total_pages: u32) {
        self.total_pages = total_pages;
    }

    /// Back to first page, default size, unsorted, no keyword. Sequence
    /// numbers keep counting so answers for the old sheet stay stale.
    pub fn reset(&mut self) {
        self.current_page = 0;
        self.page_size = self.default_page_size;
        self.sort_field = None;
        self.sort_direction = SortDirection::Asc;
        self.search_keyword.clear();
        self.total_pages = 0;
    }

    /// Issues a request for the current state.
    pub fn request(&mut self) -> RowRequest {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.latest_seq = Some(seq);

        let sort = self
            .sort_field
            .as_ref()
            .map(|field| format!("{},{}", field, self.sort_direction.as_str()));
        let keyword = Some(self.search_keyword.trim())
            .filter(|k| !k.is_empty())
            .map(str::to_string);

        RowRequest {
            seq,
            query: RowsQuery {
                page: self.current_page,
                size: self.page_size,
                keyword,
                sort,
            },
        }
    }

    pub fn is_latest(&self, seq: u64) -> bool {
        self.latest_seq == Some(seq)
    }

    pub fn set_page_size(&mut self, size: u32) -> Result<RowRequest> {
        if !self.page_sizes.contains(&size) {
            return Err(AppError::InvalidInput(format!(
                "page size must be one of {:?}",
                self.page_sizes
            )));
        }
        self.page_size = size;
        self.current_page = 0;
        Ok(self.request())
    }

    pub fn set_sort(&mut self, field: Option<SortField>, direction: SortDirection) -> RowRequest {
        self.sort_field = field;
        self.sort_direction = direction;
        self.current_page = 0;
        self.request()
    }

    pub fn set_keyword(&mut self, keyword: &str) -> RowRequest {
        self.search_keyword = keyword.to_string();
        self.current_page = 0;
        self.request()
    }

    /// `None` when `page` lies outside `0..total_pages`.
    pub fn go_to_page(&mut self, page: i64) -> Option<RowRequest> {
        if page < 0 || page >= i64::from(self.total_pages) {
            return None;
        }
        self.current_page = page as u32;
        Some(self.request())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport_on_page(page: i64, total_pages: u32) -> Viewport {
        let mut vp = Viewport::new(vec![25, 50, 100, 200], 50);
        vp.set_total_pages(total_pages);
        vp.go_to_page(page).unwrap();
        vp
    }

    #[test]
    fn page_size_change_resets_to_first_page() {
        let mut vp = viewport_on_page(3, 10);
        let req = vp.set_page_size(100).unwrap();
        assert_eq!(vp.current_page(), 0);
        assert_eq!(req.query.page, 0);
        assert_eq!(req.query.size, 100);
    }

    #[test]
    fn unknown_page_size_is_rejected_without_fetch() {
        let mut vp = viewport_on_page(3, 10);
        let before = vp.request().seq;
        assert!(vp.set_page_size(30).is_err());
        assert_eq!(vp.current_page(), 3);
        assert!(vp.is_latest(before));
    }

    #[test]
    fn sort_change_resets_page_and_formats_field() {
        let mut vp = viewport_on_page(4, 10);
        let req = vp.set_sort(Some(SortField::Column("Order Date".into())), SortDirection::Desc);
        assert_eq!(vp.current_page(), 0);
        assert_eq!(req.query.sort.as_deref(), Some("data.Order Date,desc"));

        let req = vp.set_sort(Some(SortField::SheetIndex), SortDirection::Asc);
        assert_eq!(req.query.sort.as_deref(), Some("sheetIndex,asc"));

        let req = vp.set_sort(None, SortDirection::Asc);
        assert_eq!(req.query.sort, None);
    }

    #[test]
    fn keyword_change_resets_page() {
        let mut vp = viewport_on_page(2, 5);
        let req = vp.set_keyword("  acme ");
        assert_eq!(vp.current_page(), 0);
        assert_eq!(req.query.keyword.as_deref(), Some("acme"));
        assert_eq!(vp.set_keyword("   ").query.keyword, None);
    }

    #[test]
    fn go_to_page_outside_range_is_a_no_op() {
        let mut vp = viewport_on_page(1, 3);
        let latest = vp.request().seq;

        assert_eq!(vp.go_to_page(-1), None);
        assert_eq!(vp.go_to_page(3), None);
        assert_eq!(vp.current_page(), 1);
        assert!(vp.is_latest(latest));

        let req = vp.go_to_page(2).unwrap();
        assert_eq!(req.query.page, 2);
        assert_eq!(req.seq, latest + 1);
    }

    #[test]
    fn go_to_page_with_no_pages_never_fetches() {
        let mut vp = Viewport::new(vec![50], 50);
        assert_eq!(vp.go_to_page(0), None);
    }

    #[test]
    fn only_newest_request_is_latest() {
        let mut vp = Viewport::new(vec![50], 50);
        let first = vp.request();
        let second = vp.set_keyword("x");
        assert!(!vp.is_latest(first.seq));
        assert!(vp.is_latest(second.seq));
    }

    #[test]
    fn reset_restores_defaults() {
        let mut vp = viewport_on_page(2, 5);
        vp.set_page_size(200).unwrap();
        vp.set_sort(Some(SortField::SheetIndex), SortDirection::Desc);
        vp.set_keyword("abc");
        vp.reset();

        assert_eq!(vp.current_page(), 0);
        assert_eq!(vp.page_size(), 50);
        assert_eq!(vp.sort_field(), None);
        assert_eq!(vp.sort_direction(), SortDirection::Asc);
        assert_eq!(vp.search_keyword(), "");
        assert_eq!(vp.total_pages(), 0);
    }
}
