//! On-disk snapshots of fetched pages.
//!
//! Every page the scraper downloads is written under the snapshot directory
//! before it is parsed, so a run can be repeated offline and parser changes
//! can be checked against saved pages. File names encode
//! `{case type number}_{year}_{sequence}.html`.

use std::path::{Path, PathBuf};

use patrika_core::case::CaseType;
use tracing::debug;

use crate::{Error, Result};

const EXTENSION: &str = "html";

// ─── Keys ────────────────────────────────────────────────────────────────────

/// Identifies one saved page.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SnapshotKey {
  pub case_type: CaseType,
  pub year:      i32,
  /// Detail pages use the link's trailing number; listing pages use `p{n}`.
  pub sequence:  String,
}

impl SnapshotKey {
  pub fn detail(case_type: CaseType, year: i32, url: &str) -> Self {
    Self { case_type, year, sequence: link_sequence(url) }
  }

  pub fn listing(case_type: CaseType, year: i32, page: u32) -> Self {
    Self { case_type, year, sequence: format!("p{page}") }
  }

  pub fn is_listing(&self) -> bool {
    self
      .sequence
      .strip_prefix('p')
      .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
  }

  pub fn file_name(&self) -> String {
    format!(
      "{}_{}_{}.{EXTENSION}",
      self.case_type.number(),
      self.year,
      self.sequence
    )
  }

  /// Inverse of [`Self::file_name`]. `None` for anything not shaped like one.
  pub fn from_file_name(name: &str) -> Option<Self> {
    let stem = name.strip_suffix(EXTENSION)?.strip_suffix('.')?;
    let mut parts = stem.splitn(3, '_');
    let case_type = CaseType::from_number(parts.next()?.parse().ok()?)?;
    let year = parts.next()?.parse().ok()?;
    let sequence = parts.next().filter(|s| !s.is_empty())?.to_string();
    Some(Self { case_type, year, sequence })
  }
}

/// The trailing run of digits in `url`, else its last path segment made
/// file-name safe, else `index`.
fn link_sequence(url: &str) -> String {
  let trimmed = url
    .split(['?', '#'])
    .next()
    .unwrap_or_default()
    .trim_end_matches('/');
  let digits = trimmed.len()
    - trimmed
      .bytes()
      .rev()
      .take_while(|b| b.is_ascii_digit())
      .count();
  if digits < trimmed.len() {
    return trimmed[digits..].to_string();
  }

  let segment = trimmed.rsplit('/').next().unwrap_or_default();
  let safe: String = segment
    .chars()
    .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
    .collect();
  if safe.trim_matches('_').is_empty() {
    "index".to_string()
  } else {
    safe
  }
}

// ─── Store ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct SnapshotStore {
  dir: PathBuf,
}

impl SnapshotStore {
  /// Open (creating if needed) the snapshot directory.
  pub async fn open(dir: impl AsRef<Path>) -> Result<Self> {
    let dir = dir.as_ref().to_path_buf();
    match tokio::fs::metadata(&dir).await {
      Ok(meta) if !meta.is_dir() => return Err(Error::NotADirectory(dir)),
      Ok(_) => {}
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
        tokio::fs::create_dir_all(&dir).await?;
      }
      Err(e) => return Err(e.into()),
    }
    Ok(Self { dir })
  }

  pub fn dir(&self) -> &Path { &self.dir }

  pub fn path(&self, key: &SnapshotKey) -> PathBuf {
    self.dir.join(key.file_name())
  }

  pub async fn has(&self, key: &SnapshotKey) -> Result<bool> {
    Ok(tokio::fs::try_exists(self.path(key)).await?)
  }

  pub async fn read(&self, key: &SnapshotKey) -> Result<Vec<u8>> {
    let path = self.path(key);
    match tokio::fs::read(&path).await {
      Ok(bytes) => Ok(bytes),
      Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
        Err(Error::SnapshotNotFound(path))
      }
      Err(e) => Err(e.into()),
    }
  }

  /// Write `body` for `key`, replacing any earlier copy. Readers see either
  /// the old file or the new one.
  pub async fn write(&self, key: &SnapshotKey, body: &[u8]) -> Result<PathBuf> {
    let path = self.path(key);
    let tmp = self.dir.join(format!(".{}.tmp", key.file_name()));
    tokio::fs::write(&tmp, body).await?;
    tokio::fs::rename(&tmp, &path).await?;
    debug!(path = %path.display(), bytes = body.len(), "snapshot written");
    Ok(path)
  }

  /// Saved detail pages, optionally filtered, in key order.
  pub async fn list(
    &self,
    case_type: Option<CaseType>,
    year: Option<i32>,
  ) -> Result<Vec<SnapshotKey>> {
    let mut keys = Vec::new();
    let mut entries = tokio::fs::read_dir(&self.dir).await?;
    while let Some(entry) = entries.next_entry().await? {
      let Some(key) = entry.file_name().to_str().and_then(SnapshotKey::from_file_name)
      else {
        continue;
      };
      if key.is_listing()
        || case_type.is_some_and(|t| t != key.case_type)
        || year.is_some_and(|y| y != key.year)
      {
        continue;
      }
      keys.push(key);
    }
    keys.sort();
    Ok(keys)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn detail_keys_use_the_trailing_number() {
    let key = SnapshotKey::detail(
      CaseType::Writ,
      2073,
      "https://nkp.gov.np/full_detail/9542",
    );
    assert_eq!(key.sequence, "9542");
    assert_eq!(key.file_name(), "5_2073_9542.html");
    assert!(!key.is_listing());

    let slash = SnapshotKey::detail(CaseType::Writ, 2073, "/full_detail/77/");
    assert_eq!(slash.sequence, "77");
  }

  #[test]
  fn detail_keys_without_a_number_fall_back_to_the_segment() {
    let key =
      SnapshotKey::detail(CaseType::Petition, 2060, "/full_detail/abc.def?x=1");
    assert_eq!(key.sequence, "abc_def");
    assert_eq!(SnapshotKey::detail(CaseType::Petition, 2060, "/").sequence, "index");
  }

  #[test]
  fn listing_keys_are_recognised() {
    let key = SnapshotKey::listing(CaseType::PrivateCivil, 2050, 3);
    assert_eq!(key.file_name(), "1_2050_p3.html");
    assert!(key.is_listing());
    assert_eq!(SnapshotKey::from_file_name("1_2050_p3.html"), Some(key));
  }

  #[test]
  fn foreign_file_names_are_ignored() {
    assert_eq!(SnapshotKey::from_file_name("notes.txt"), None);
    assert_eq!(SnapshotKey::from_file_name("9_2073_1.html"), None);
    assert_eq!(SnapshotKey::from_file_name("5_two_1.html"), None);
    assert_eq!(SnapshotKey::from_file_name("5_2073_.html"), None);
  }

  #[tokio::test]
  async fn write_read_and_list() {
    let dir = tempfile::tempdir().unwrap();
    let store = SnapshotStore::open(dir.path().join("pages")).await.unwrap();

    let writ = SnapshotKey::detail(CaseType::Writ, 2073, "/full_detail/2");
    let civil = SnapshotKey::detail(CaseType::PrivateCivil, 2073, "/full_detail/1");
    let listing = SnapshotKey::listing(CaseType::Writ, 2073, 1);

    assert!(!store.has(&writ).await.unwrap());
    let path = store.write(&writ, b"<html>writ</html>").await.unwrap();
    assert_eq!(path, store.path(&writ));
    store.write(&civil, b"<html>civil</html>").await.unwrap();
    store.write(&listing, b"<html>list</html>").await.unwrap();
    store.write(&writ, b"<html>writ v2</html>").await.unwrap();

    assert!(store.has(&writ).await.unwrap());
    assert_eq!(store.read(&writ).await.unwrap(), b"<html>writ v2</html>");

    assert_eq!(store.list(None, None).await.unwrap(), vec![
      civil.clone(),
      writ.clone()
    ]);
    assert_eq!(store.list(Some(CaseType::Writ), None).await.unwrap(), vec![
      writ
    ]);
    assert!(store.list(None, Some(2050)).await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn reading_a_missing_snapshot_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let store = SnapshotStore::open(dir.path()).await.unwrap();
    let key = SnapshotKey::detail(CaseType::Writ, 2073, "/full_detail/5");
    assert!(matches!(
      store.read(&key).await,
      Err(Error::SnapshotNotFound(p)) if p == store.path(&key)
    ));
  }

  #[tokio::test]
  async fn opening_a_file_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("plain");
    std::fs::write(&file, "x").unwrap();
    assert!(matches!(
      SnapshotStore::open(&file).await,
      Err(Error::NotADirectory(_))
    ));
  }
}
