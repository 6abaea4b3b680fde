// foodgram-core/src/domain/pagination.rs

//! Page-number pagination: `page` and `limit` in, `{count, next, previous,
//! results}` out.

use super::error::{DomainError, DomainResult, ValidationErrors};
use serde::Serialize;

pub const DEFAULT_PAGE_SIZE: u32 = 6;
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
  pub page: u32,
  pub limit: u32,
}

impl PageRequest {
  /// Applies defaults and bounds to raw query values.
  pub fn from_query(page: Option<u32>, limit: Option<u32>, default_limit: u32) -> DomainResult<Self> {
    let page = page.unwrap_or(1);
    let limit = limit.unwrap_or(default_limit);
    let mut errors = ValidationErrors::new();
    if page == 0 {
      errors.add("page", "Page numbers start at 1.");
    }
    if limit == 0 {
      errors.add("limit", "Limit must be a positive number.");
    }
    errors.into_result(Self {
      page,
      limit: limit.min(MAX_PAGE_SIZE),
    })
  }

  pub fn offset(&self) -> i64 {
    (i64::from(self.page) - 1) * i64::from(self.limit)
  }

  pub fn limit_i64(&self) -> i64 {
    i64::from(self.limit)
  }

  /// Page 1 is always valid, even when empty; any later page must start
  /// inside the result set.
  pub fn ensure_in_range(&self, count: i64) -> DomainResult<()> {
    if self.page > 1 && self.offset() >= count {
      return Err(DomainError::Validation(ValidationErrors::single(
        "page",
        "No results found for the requested page.",
      )));
    }
    Ok(())
  }

  pub fn has_next(&self, count: i64) -> bool {
    self.offset() + self.limit_i64() < count
  }

  pub fn has_previous(&self) -> bool {
    self.page > 1
  }
}

#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
  pub count: i64,
  pub next: Option<String>,
  pub previous: Option<String>,
  pub results: Vec<T>,
}

impl<T> Page<T> {
  /// `link_for(page, limit)` renders the absolute URL of a neighbour page.
  pub fn new(results: Vec<T>, count: i64, request: PageRequest, link_for: impl Fn(u32, u32) -> String) -> Self {
    let next = request
      .has_next(count)
      .then(|| link_for(request.page + 1, request.limit));
    let previous = request
      .has_previous()
      .then(|| link_for(request.page - 1, request.limit));
    Self {
      count,
      next,
      previous,
      results,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn link(page: u32, limit: u32) -> String {
    format!("/api/recipes?page={page}&limit={limit}")
  }

  #[test]
  fn defaults_and_cap() {
    let req = PageRequest::from_query(None, Some(1_000), DEFAULT_PAGE_SIZE).unwrap();
    assert_eq!(req, PageRequest { page: 1, limit: MAX_PAGE_SIZE });
    let req = PageRequest::from_query(Some(3), None, DEFAULT_PAGE_SIZE).unwrap();
    assert_eq!(req.offset(), 12);
  }

  #[test]
  fn zero_values_are_rejected() {
    let err = PageRequest::from_query(Some(0), Some(0), DEFAULT_PAGE_SIZE).unwrap_err();
    match err {
      DomainError::Validation(errors) => assert_eq!(errors.fields().len(), 2),
      other => panic!("expected validation error, got {other:?}"),
    }
  }

  #[test]
  fn page_past_the_end_is_rejected_but_first_page_is_not() {
    let first = PageRequest { page: 1, limit: 6 };
    assert!(first.ensure_in_range(0).is_ok());
    let third = PageRequest { page: 3, limit: 6 };
    assert!(third.ensure_in_range(12).is_err());
    assert!(third.ensure_in_range(13).is_ok());
  }

  #[test]
  fn links_point_to_neighbours() {
    let page = Page::new(vec![1, 2], 14, PageRequest { page: 2, limit: 6 }, link);
    assert_eq!(page.next.as_deref(), Some("/api/recipes?page=3&limit=6"));
    assert_eq!(page.previous.as_deref(), Some("/api/recipes?page=1&limit=6"));

    let last = Page::new(vec![1, 2], 14, PageRequest { page: 3, limit: 6 }, link);
    assert!(last.next.is_none());
  }
}
