//! Low-level HTML string helpers.
//!
//! Deliberately naive, tailored to the markup the Patrika site emits. Tag
//! and attribute names match case-insensitively; the lowercase copy used for
//! matching only folds ASCII, so byte offsets line up with the input.

/// A located element: its opening tag and the markup between it and the
/// matching close tag (or the end of input when the element is unclosed).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Element<'a> {
  pub open:  &'a str,
  pub inner: &'a str,
  /// Byte offset just past the element in the searched string.
  pub end:   usize,
}

impl Element<'_> {
  pub fn attr(&self, name: &str) -> Option<&str> { attr_value(self.open, name) }

  /// Visible text, normalised.
  pub fn text(&self) -> String { text(self.inner) }
}

/// ASCII-only lowercasing; preserves byte offsets.
pub fn lower(s: &str) -> String { s.to_ascii_lowercase() }

/// Offset of the next `<name` opening tag at or after `from` in the
/// lowercased haystack `lc`. `<name` must be followed by whitespace, `>` or
/// `/` so that `<p` never matches `<pre`.
fn find_open(lc: &str, name: &str, from: usize) -> Option<usize> {
  let pat = format!("<{name}");
  let mut at = from;
  loop {
    let rel = lc.get(at..)?.find(&pat)?;
    let start = at + rel;
    let after = start + pat.len();
    match lc.as_bytes().get(after) {
      Some(b) if b.is_ascii_whitespace() || *b == b'>' || *b == b'/' => {
        return Some(start);
      }
      None => return None,
      _ => at = after,
    }
  }
}

/// Offset of the next `</name` closing tag at or after `from`.
fn find_close(lc: &str, name: &str, from: usize) -> Option<usize> {
  let pat = format!("</{name}");
  let mut at = from;
  loop {
    let start = at + lc.get(at..)?.find(&pat)?;
    let after = start + pat.len();
    match lc.as_bytes().get(after) {
      Some(b) if b.is_ascii_whitespace() || *b == b'>' => return Some(start),
      None => return None,
      _ => at = after,
    }
  }
}

/// Offset of the `</name>` that closes an element whose content starts at
/// `from`, honouring nested elements of the same name.
/// Returns `(close_start, close_end)`.
fn matching_close(lc: &str, name: &str, from: usize) -> Option<(usize, usize)> {
  let mut depth = 1usize;
  let mut at = from;
  loop {
    let next_close = find_close(lc, name, at)?;
    match find_open(lc, name, at) {
      Some(open) if open < next_close => {
        depth += 1;
        at = open + name.len() + 1;
      }
      _ => {
        depth -= 1;
        let close_end = lc[next_close..].find('>').map_or(lc.len(), |i| next_close + i + 1);
        if depth == 0 {
          return Some((next_close, close_end));
        }
        at = close_end;
      }
    }
  }
}

/// The element whose opening tag starts at `start`.
fn element_at<'a>(s: &'a str, lc: &str, name: &str, start: usize) -> Option<Element<'a>> {
  let open_end = start + s[start..].find('>')? + 1;
  let open = &s[start..open_end];
  if open.ends_with("/>") {
    return Some(Element { open, inner: "", end: open_end });
  }
  Some(match matching_close(lc, name, open_end) {
    Some((close_start, close_end)) => Element {
      open,
      inner: &s[open_end..close_start],
      end: close_end,
    },
    None => Element { open, inner: &s[open_end..], end: s.len() },
  })
}

/// Every `name` element in document order, including nested ones.
pub fn elements<'a>(s: &'a str, name: &str) -> Vec<Element<'a>> {
  let lc = lower(s);
  let name = lower(name);
  let mut out = Vec::new();
  let mut at = 0;
  while let Some(start) = find_open(&lc, &name, at) {
    match element_at(s, &lc, &name, start) {
      Some(el) => out.push(el),
      None => break,
    }
    at = start + name.len() + 1;
  }
  out
}

/// First `name` element whose attribute `attr` satisfies `pred`.
pub fn find_element<'a>(
  s: &'a str,
  name: &str,
  attr: &str,
  pred: impl Fn(&str) -> bool,
) -> Option<Element<'a>> {
  let lc = lower(s);
  let name = lower(name);
  let mut at = 0;
  while let Some(start) = find_open(&lc, &name, at) {
    let el = element_at(s, &lc, &name, start)?;
    if el.attr(attr).is_some_and(&pred) {
      return Some(el);
    }
    at = start + name.len() + 1;
  }
  None
}

/// First `name` element with the given id. The site pads some ids with
/// whitespace, so the comparison trims.
pub fn element_with_id<'a>(s: &'a str, name: &str, id: &str) -> Option<Element<'a>> {
  find_element(s, name, "id", |v| v.trim() == id)
}

/// First `name` element carrying `class` among its classes.
pub fn element_with_class<'a>(s: &'a str, name: &str, class: &str) -> Option<Element<'a>> {
  find_element(s, name, "class", |v| v.split_whitespace().any(|c| c == class))
}

/// Normalised text of each block-level element in `names`, in document
/// order. A block that is never closed ends at the next block opening.
/// Blocks nested in an emitted block are part of its text, not separate
/// entries. Empty blocks are dropped.
pub fn blocks(s: &str, names: &[&str]) -> Vec<String> {
  let lc = lower(s);
  let next_block = |from: usize| {
    names
      .iter()
      .filter_map(|n| find_open(&lc, n, from).map(|at| (at, *n)))
      .min_by_key(|(at, _)| *at)
  };

  let mut out = Vec::new();
  let mut at = 0;
  while let Some((start, name)) = next_block(at) {
    let Some(open_end) = s[start..].find('>').map(|i| start + i + 1) else {
      break;
    };
    let (inner_end, end) = match matching_close(&lc, name, open_end) {
      Some((close_start, close_end)) => (close_start, close_end),
      None => {
        let stop = next_block(open_end).map_or(s.len(), |(n, _)| n);
        (stop, stop)
      }
    };
    let block = text(&s[open_end..inner_end]);
    if !block.is_empty() {
      out.push(block);
    }
    at = end;
  }
  out
}

/// `href` of every anchor, entity-decoded, in document order.
pub fn hrefs(s: &str) -> Vec<String> {
  let lc = lower(s);
  let mut out = Vec::new();
  let mut at = 0;
  while let Some(start) = find_open(&lc, "a", at) {
    let Some(open_end) = s[start..].find('>').map(|i| start + i + 1) else {
      break;
    };
    if let Some(href) = attr_value(&s[start..open_end], "href") {
      out.push(decode_entities(href.trim()));
    }
    at = open_end;
  }
  out
}

/// Value of attribute `name` inside an opening tag. Handles double-quoted,
/// single-quoted and bare values.
pub fn attr_value<'a>(open_tag: &'a str, name: &str) -> Option<&'a str> {
  let lc = lower(open_tag);
  let name = lower(name);
  let bytes = lc.as_bytes();
  let mut at = 0;
  while let Some(rel) = lc[at..].find(&name) {
    let start = at + rel;
    at = start + name.len();
    let preceded = start > 0 && bytes[start - 1].is_ascii_whitespace();
    if !preceded {
      continue;
    }
    let rest = lc[at..].trim_start();
    let Some(rest) = rest.strip_prefix('=') else { continue };
    let value_at = lc.len() - rest.trim_start().len();
    let value = &open_tag[value_at..];
    return Some(match value.chars().next() {
      Some(q @ ('"' | '\'')) => {
        let body = &value[1..];
        &body[..body.find(q).unwrap_or(body.len())]
      }
      _ => {
        let stop = value
          .find(|c: char| c.is_whitespace() || c == '>')
          .unwrap_or(value.len());
        value[..stop].trim_end_matches('/')
      }
    });
  }
  None
}

/// Visible text of a fragment: tags removed, entities decoded, whitespace
/// collapsed.
pub fn text(fragment: &str) -> String {
  normalize_ws(&decode_entities(&strip_tags(fragment)))
}

/// Remove all tags `<...>`. Each tag becomes a space so text in adjacent
/// blocks does not run together.
pub fn strip_tags(s: &str) -> String {
  let mut out = String::with_capacity(s.len());
  let mut in_tag = false;
  for ch in s.chars() {
    match ch {
      '<' => in_tag = true,
      '>' if in_tag => {
        in_tag = false;
        out.push(' ');
      }
      _ if !in_tag => out.push(ch),
      _ => {}
    }
  }
  out
}

/// Decode the named entities the site uses plus numeric references.
/// Unknown entities pass through unchanged.
pub fn decode_entities(s: &str) -> String {
  let mut out = String::with_capacity(s.len());
  let mut rest = s;
  while let Some(amp) = rest.find('&') {
    out.push_str(&rest[..amp]);
    let tail = &rest[amp..];
    let decoded = tail
      .find(';')
      .filter(|&semi| semi <= 10)
      .and_then(|semi| entity(&tail[1..semi]).map(|c| (c, semi)));
    match decoded {
      Some((c, semi)) => {
        out.push(c);
        rest = &tail[semi + 1..];
      }
      None => {
        out.push('&');
        rest = &tail[1..];
      }
    }
  }
  out.push_str(rest);
  out
}

fn entity(name: &str) -> Option<char> {
  match name {
    "nbsp" => Some(' '),
    "amp" => Some('&'),
    "lt" => Some('<'),
    "gt" => Some('>'),
    "quot" => Some('"'),
    "apos" => Some('\''),
    "zwj" => Some('\u{200d}'),
    "zwnj" => Some('\u{200c}'),
    _ => {
      let num = name.strip_prefix('#')?;
      let code = match num.strip_prefix(['x', 'X']) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => num.parse().ok()?,
      };
      char::from_u32(code)
    }
  }
}

/// Collapse sequences of whitespace into a single space and trim.
pub fn normalize_ws(s: &str) -> String {
  s.split_whitespace().collect::<Vec<_>>().join(" ")
}
