//! The extraction walker shared by every era.
//!
//! A decision body is a flat run of text blocks. The walker makes one pass
//! over it in four stages (court, judges, parties, body), consulting the
//! era's [`EraRules`] at each step. Stages never move backwards; a stage that
//! finds nothing leaves the cursor where it was.

use patrika_core::case::CaseFields;

use crate::rules::{EraRules, Side};

/// Page titles repeated inside the body; never a court name.
const DECISION_NO: &str = "निर्णय नं.";

/// In grouped layouts, how far past an unlabelled line to look for the
/// applicant that makes it the case number of a new group.
const GROUP_LOOKAHEAD: usize = 2;

pub(crate) fn walk(rules: &EraRules, blocks: &[String], fields: &mut CaseFields) {
  let mut walker = Walker { rules, blocks, pos: 0, fields };
  walker.court();
  walker.judges();
  walker.parties();
  walker.body();
}

struct Walker<'a> {
  rules:  &'a EraRules,
  blocks: &'a [String],
  pos:    usize,
  fields: &'a mut CaseFields,
}

impl<'a> Walker<'a> {
  fn peek(&self) -> Option<&'a str> {
    self.blocks.get(self.pos).map(String::as_str)
  }

  // ── Court ─────────────────────────────────────────────────────────────────

  fn court(&mut self) {
    let blocks = self.blocks;
    for (i, line) in blocks.iter().enumerate() {
      if self.rules.is_body_marker(line) {
        return;
      }
      if self.rules.split_court_heading && self.rules.is_bare_court(line) {
        self.fields.court = self.heading_above(i);
        self.pos = i + 1;
        return;
      }
      if self.rules.is_court(line) {
        let mut court = line.clone();
        self.pos = i + 1;
        if self.rules.split_court_heading {
          if let Some(next) = blocks.get(i + 1).filter(|n| !self.is_header_line(n)) {
            court.push(' ');
            court.push_str(next);
            self.pos = i + 2;
          }
        }
        self.fields.court = Some(court);
        return;
      }
      if self.rules.is_judge(line) {
        self.fields.court = self.heading_above(i);
        self.pos = i;
        return;
      }
    }
  }

  /// The line above `i`, when it can be a court name.
  fn heading_above(&self, i: usize) -> Option<String> {
    let above = self.blocks.get(i.checked_sub(1)?)?;
    (!above.contains(DECISION_NO) && !self.rules.is_judge(above))
      .then(|| above.clone())
  }

  /// Lines that belong to a later header stage. Court lines are not among
  /// them, so a two-block court heading joins up.
  fn is_header_line(&self, line: &str) -> bool {
    let r = self.rules;
    line.contains(DECISION_NO)
      || r.is_judge(line)
      || r.party(line).is_some()
      || r.is_subject(line)
      || r.is_order_date(line)
      || r.has_case_code(line)
      || r.is_body_marker(line)
  }

  // ── Judges ────────────────────────────────────────────────────────────────

  fn judges(&mut self) {
    while let Some(line) = self.peek() {
      if !self.rules.is_judge(line) || self.rules.is_body_marker(line) {
        break;
      }
      self.fields.judges.push(line.to_owned());
      self.pos += 1;
    }

    if !self.rules.order_date_closes_judges {
      return;
    }

    // Everything up to the order date is bench or case number. Without an
    // order date nothing here is committed.
    let mut judges = Vec::new();
    let mut case_numbers = Vec::new();
    let mut at = self.pos;
    while let Some(line) = self.blocks.get(at) {
      if self.rules.is_order_date(line) {
        self.fields.judges.append(&mut judges);
        self.fields.case_numbers.append(&mut case_numbers);
        self.fields.order_date = Some(line.clone());
        self.pos = at + 1;
        return;
      }
      if self.rules.is_body_marker(line)
        || self.rules.is_subject(line)
        || self.rules.party(line).is_some()
      {
        return;
      }
      if self.rules.is_judge(line) {
        judges.push(line.clone());
      } else {
        case_numbers.push(line.clone());
      }
      at += 1;
    }
  }

  // ── Parties ───────────────────────────────────────────────────────────────

  fn parties(&mut self) {
    let rules = self.rules;
    let mut after_opponent = false;

    while let Some(line) = self.peek() {
      if rules.is_body_marker(line) {
        return;
      }
      if self.fields.order_date.is_none() && rules.is_order_date(line) {
        self.fields.order_date = Some(line.to_owned());
        self.pos += 1;
        continue;
      }
      if self.fields.subject.is_none() && rules.is_subject(line) {
        self.fields.subject = Some(line.to_owned());
        self.pos += 1;
        continue;
      }
      if rules.is_versus(line) {
        self.pos += 1;
        continue;
      }

      if let Some((side, bare)) = rules.party(line) {
        // Once the opponents are in, only label-led opponent lines extend
        // the header; anything else is body text mentioning a party.
        if after_opponent
          && (side == Side::Applicant || rules.party_offset(line) != Some(0))
        {
          return;
        }
        self.pos += 1;
        let name = if bare {
          match self.peek().filter(|next| !rules.is_body_marker(next)) {
            Some(next) => {
              self.pos += 1;
              next
            }
            None => continue,
          }
        } else {
          line
        };
        match side {
          Side::Applicant => self.fields.applicants.push(name.to_owned()),
          Side::Opponent => {
            self.fields.opponents.push(name.to_owned());
            after_opponent = true;
          }
        }
        continue;
      }

      // An unlabelled line: a case number, or the end of the header.
      if after_opponent {
        if rules.grouped_parties && self.applicant_within(GROUP_LOOKAHEAD) {
          self.fields.case_numbers.push(line.to_owned());
          self.pos += 1;
          after_opponent = false;
          continue;
        }
        return;
      }
      if !self.party_ahead() {
        return;
      }
      if rules.grouped_parties
        || self.fields.case_numbers.is_empty()
        || rules.has_case_code(line)
      {
        self.fields.case_numbers.push(line.to_owned());
      }
      self.pos += 1;
    }
  }

  /// Header lines after the current one.
  fn following(&self) -> impl Iterator<Item = &'a String> {
    let rules = self.rules;
    self
      .blocks
      .iter()
      .skip(self.pos + 1)
      .take_while(move |line| !rules.is_body_marker(line))
  }

  fn party_ahead(&self) -> bool {
    self.following().any(|line| self.rules.party(line).is_some())
  }

  fn applicant_within(&self, n: usize) -> bool {
    self
      .following()
      .take(n)
      .any(|line| matches!(self.rules.party(line), Some((Side::Applicant, _))))
  }

  // ── Body ──────────────────────────────────────────────────────────────────

  fn body(&mut self) {
    let all = self.blocks;
    let blocks = &all[self.pos..];
    let mut pending: Vec<&str> = Vec::new();
    let mut in_verdict = false;

    for line in blocks {
      if in_verdict {
        self.fields.verdict.push(line.clone());
      } else if self.rules.is_verdict_heading(line) {
        flush(&mut pending, &mut self.fields.case_details);
        in_verdict = true;
        self.fields.verdict.push(line.clone());
      } else if self.rules.is_paragraph_marker(line) {
        flush(&mut pending, &mut self.fields.case_details);
        self.fields.case_details.push(line.clone());
      } else {
        pending.push(line);
      }
    }
    flush(&mut pending, &mut self.fields.case_details);
  }
}

/// Join the text gathered since the last marker into one paragraph.
fn flush(pending: &mut Vec<&str>, details: &mut Vec<String>) {
  if !pending.is_empty() {
    details.push(pending.join(" "));
    pending.clear();
  }
}
