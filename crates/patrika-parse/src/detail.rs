//! Detail-page parsing.
//!
//! The page furniture (title, edition box, post meta) is the same in every
//! era; only the body under `div#faisala_detail` needs the era's rules.

use patrika_core::{case::CaseFields, layout::Layout, numerals};
use tracing::debug;

use crate::{
  html,
  rules::EraRules,
  walk,
  Error, Result,
};

/// Block-level elements whose text makes up the decision body.
const BODY_BLOCKS: &[&str] = &["h1", "p", "li"];

/// What a detail page yields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCase {
  pub fields:       CaseFields,
  /// The साल the page files itself under; may differ from the listing's.
  pub edition_year: Option<i32>,
}

/// Parse a detail page with the rules of `layout`.
///
/// Missing fields are not errors. A page with no extractable field at all is
/// [`Error::NoContent`].
pub fn parse(layout: Layout, page: &str, source_url: &str) -> Result<ParsedCase> {
  let mut fields = CaseFields {
    decision_number: decision_number(page),
    volume: edition_field(page, "भाग"),
    month: edition_field(page, "महिना"),
    issue: edition_field(page, "अंक"),
    decision_date: decision_date(page),
    ..Default::default()
  };
  let edition_year = edition_field(page, "साल").and_then(|y| numerals::parse_year(&y).ok());

  match html::element_with_id(page, "div", "faisala_detail") {
    Some(body) => {
      let blocks: Vec<String> = html::blocks(body.inner, BODY_BLOCKS)
        .iter()
        .map(|b| numerals::to_ascii_digits(b))
        .collect();
      walk::walk(EraRules::for_layout(layout), &blocks, &mut fields);
    }
    None => debug!(url = source_url, "page has no decision body"),
  }

  fields.normalize();
  if fields.is_empty() {
    return Err(Error::NoContent { url: source_url.to_owned() });
  }

  debug!(
    url = source_url,
    %layout,
    judges = fields.judges.len(),
    paragraphs = fields.case_details.len(),
    "parsed detail page"
  );
  Ok(ParsedCase { fields, edition_year })
}

/// Third whitespace token of `h1.post-title` (`निर्णय नं. ९५४२`).
fn decision_number(page: &str) -> Option<String> {
  let title = html::element_with_class(page, "h1", "post-title")?.text();
  title.split_whitespace().nth(2).map(str::to_owned)
}

/// Value of the `div#edition-info` span whose label contains `label`.
fn edition_field(page: &str, label: &str) -> Option<String> {
  let info = html::element_with_id(page, "div", "edition-info")?;
  html::elements(info.inner, "span")
    .into_iter()
    .find(|span| span.text().contains(label))
    .and_then(|span| html::elements(span.inner, "strong").into_iter().next())
    .map(|strong| strong.text())
    .filter(|v| !v.is_empty())
}

/// First token after `फैसला मिति` in `div.post-meta`.
fn decision_date(page: &str) -> Option<String> {
  let meta = html::element_with_class(page, "div", "post-meta")?.text();
  let (_, rest) = meta.split_once("फैसला मिति")?;
  rest
    .trim_start_matches(|c: char| c.is_whitespace() || c == ':')
    .split_whitespace()
    .next()
    .map(str::to_owned)
}
