//! URLs of the Nepal Kanun Patrika site.

use patrika_core::case::CaseType;
use url::Url;

use crate::Result;

/// Label of the search form's submit button; the site expects it verbatim.
const SUBMIT: &str = "खोज्\u{200d}नुहोस्";

#[derive(Debug, Clone)]
pub struct Site {
  base: Url,
}

impl Site {
  pub fn new(base_url: &str) -> Result<Self> {
    let mut base = Url::parse(base_url)?;
    if !base.path().ends_with('/') {
      let path = format!("{}/", base.path());
      base.set_path(&path);
    }
    Ok(Self { base })
  }

  pub fn base(&self) -> &Url { &self.base }

  /// The search URL listing every decision of one case type published in
  /// `year`. Every other filter is left blank.
  pub fn search_url(&self, case_type: CaseType, year: i32) -> String {
    let mut url = self.base.clone();
    url
      .query_pairs_mut()
      .append_pair("mudda_number", "")
      .append_pair("faisala_date_from", "")
      .append_pair("faisala_date_to", "")
      .append_pair("mudda_type", &case_type.number().to_string())
      .append_pair("mudda_name", "")
      .append_pair("badi", "")
      .append_pair("pratibadi", "")
      .append_pair("judge", "")
      .append_pair("ijlas_type", "")
      .append_pair("nirnaya_number", "")
      .append_pair("faisala_type", "")
      .append_pair("keywords", "")
      .append_pair("edition", "")
      .append_pair("year", &year.to_string())
      .append_pair("month", "")
      .append_pair("volume", "")
      .append_pair("Submit", SUBMIT);
    url.into()
  }

  /// Resolve an href found on a page against the site root.
  pub fn resolve(&self, href: &str) -> Result<String> {
    Ok(self.base.join(href.trim())?.into())
  }

  /// The detail page a saved snapshot sequence was fetched from.
  pub fn detail_url(&self, sequence: &str) -> Result<String> {
    Ok(self.base.join(&format!("full_detail/{sequence}"))?.into())
  }
}
