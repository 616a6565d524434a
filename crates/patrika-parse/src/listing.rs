//! Search-result (listing) pages.
//!
//! A listing page links each decision as `/full_detail/<n>` and paginates
//! through `advance_search/...<offset>` links, twenty results per page.

use crate::html;

/// Results per listing page; pagination offsets step by this.
pub const PAGE_SIZE: u32 = 20;

const DETAIL_MARKER: &str = "/full_detail/";
const PAGINATION_MARKER: &str = "advance_search";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Listing {
  /// Detail hrefs as written on the page, de-duplicated, in page order.
  pub detail_links: Vec<String>,
  pub pagination:   Option<Pagination>,
}

/// The page ceiling advertised by a listing's pagination links.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
  /// Pagination href with its trailing offset removed.
  pub prefix:     String,
  /// Greatest offset linked.
  pub max_offset: u32,
}

impl Pagination {
  /// Number of pages, counting the first.
  pub fn page_count(&self) -> u32 { self.max_offset / PAGE_SIZE + 1 }

  /// Href of page `page` (1-based). Page 1 is the search itself and has no
  /// pagination href.
  pub fn page_href(&self, page: u32) -> Option<String> {
    (2..=self.page_count())
      .contains(&page)
      .then(|| format!("{}{}", self.prefix, (page - 1) * PAGE_SIZE))
  }
}

pub fn parse_listing(page: &str) -> Listing {
  let mut listing = Listing::default();

  for href in html::hrefs(page) {
    if href.contains(DETAIL_MARKER) {
      if !listing.detail_links.contains(&href) {
        listing.detail_links.push(href);
      }
      continue;
    }
    if !href.contains(PAGINATION_MARKER) {
      continue;
    }
    let Some((prefix, offset)) = split_offset(&href) else { continue };
    // Only links sharing the first link's prefix count.
    let p = listing.pagination.get_or_insert_with(|| Pagination {
      prefix:     prefix.to_owned(),
      max_offset: offset,
    });
    if p.prefix == prefix {
      p.max_offset = p.max_offset.max(offset);
    }
  }

  listing
}

/// Split `.../advance_search/...=40` into (`.../advance_search/...=`, 40).
fn split_offset(href: &str) -> Option<(&str, u32)> {
  let digits = href.len() - href.trim_end_matches(|c: char| c.is_ascii_digit()).len();
  if digits == 0 {
    return None;
  }
  let (prefix, offset) = href.split_at(href.len() - digits);
  Some((prefix, offset.parse().ok()?))
}

#[cfg(test)]
mod tests {
  use super::*;

  const PAGE: &str = r##"
    <a href="#">x</a><a href="https://nkp.gov.np/full_detail/101">a</a>
    <a href="#">x</a><a href="https://nkp.gov.np/full_detail/102">b</a>
    <a href="https://nkp.gov.np/full_detail/101">a again</a>
    <a href="javascript:void(0)">1</a>
    <a href="https://nkp.gov.np/advance_search/case_type=5&amp;per_page=20">2</a>
    <a href="https://nkp.gov.np/advance_search/case_type=5&amp;per_page=60">4</a>
    <a href="https://nkp.gov.np/advance_search/case_type=5&amp;per_page=40">3</a>
  "##;

  #[test]
  fn detail_links_are_deduplicated_in_order() {
    let listing = parse_listing(PAGE);
    assert_eq!(listing.detail_links, vec![
      "https://nkp.gov.np/full_detail/101",
      "https://nkp.gov.np/full_detail/102",
    ]);
  }

  #[test]
  fn pagination_uses_the_greatest_offset() {
    let p = parse_listing(PAGE).pagination.unwrap();
    assert_eq!(p.max_offset, 60);
    assert_eq!(p.page_count(), 4);
    assert_eq!(p.page_href(1), None);
    assert_eq!(
      p.page_href(2).as_deref(),
      Some("https://nkp.gov.np/advance_search/case_type=5&per_page=20")
    );
    assert_eq!(
      p.page_href(4).as_deref(),
      Some("https://nkp.gov.np/advance_search/case_type=5&per_page=60")
    );
    assert_eq!(p.page_href(5), None);
  }

  #[test]
  fn single_page_listing_has_no_pagination() {
    let listing = parse_listing(r#"<a href="/full_detail/7">x</a>"#);
    assert_eq!(listing.detail_links, vec!["/full_detail/7"]);
    assert!(listing.pagination.is_none());
  }

  #[test]
  fn empty_listing() {
    assert_eq!(parse_listing("<p>कुनै नतिजा भेटिएन</p>"), Listing::default());
  }
}
