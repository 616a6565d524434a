//! Per-era rule tables.
//!
//! Each [`Layout`] maps to one static [`EraRules`]. The tables hold the
//! keywords the header walker looks for and the few structural switches that
//! differ between redesigns. Keywords are written in normalised form: ASCII
//! digits, single spaces.

use patrika_core::layout::Layout;

/// Which side of the dispute a party line names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
  Applicant,
  Opponent,
}

#[derive(Debug)]
pub struct EraRules {
  /// Court or bench heading markers (contains-match).
  pub court:      &'static [&'static str],
  /// Judge line markers (contains-match).
  pub judges:     &'static [&'static str],
  pub applicant:  &'static [&'static str],
  pub opponent:   &'static [&'static str],
  /// Bare separators between the two sides; skipped.
  pub versus:     &'static [&'static str],
  /// Subject line prefixes.
  pub subject:    &'static [&'static str],
  /// Order-date line prefixes; the line must also mention a date.
  pub order:      &'static [&'static str],
  /// Registry codes embedded in case numbers (`073-WO-0123`).
  pub case_codes: &'static [&'static str],
  /// Prefixes of the markers that close a body paragraph.
  pub paragraph:  &'static [&'static str],

  /// The court name may be split over two blocks, or sit above a bare
  /// bench label.
  pub split_court_heading:      bool,
  /// Everything between the judges and the order date is a case number.
  pub order_date_closes_judges: bool,
  /// Parties come in repeated (case number, applicants, opponents) groups.
  pub grouped_parties:          bool,
}

// ─── Shared keyword lists ────────────────────────────────────────────────────

const BENCH: &[&str] = &["इजलास", "इजालास", "इजलाश", "बेञ्च"];

const COURT: &[&str] = &["अदालत", "इजलास", "इजालास", "इजलाश", "बेञ्च"];

const JUDGES: &[&str] = &[
  "न्यायाधीश",
  "माननीय",
  "न्यायधीश",
  "न्यायाधीस",
  "न्ययाधीश",
  "न्यायाधिश",
  "न्यायाधी",
  "नयायाधीश",
];

const APPLICANT: &[&str] = &[
  "निवेदक",
  "वादी",
  "पुनरावेदक",
  "निबेदक",
  "पुनरावदेक",
  "निवेदिका",
  "निवेदीका",
  "निवदेक",
  "पुनरावेदन",
  "पुनरवेदिका",
  "पुनरावेदिका",
  "बादि",
  "पुनराबेदक",
  "अपीलाट",
  "अपिलाट",
  "उजुरवाला",
];

const OPPONENT: &[&str] = &[
  "विपक्षी",
  "प्रतिवादी",
  "प्रत्यर्थी",
  "बिपक्षी",
  "पिपक्षी",
  "प्रत्यार्थी",
  "प्रत्यथी",
  "विपक्ष",
  "रेस्पोण्डेण्ट",
  "रेस्पोन्डेन्ट",
];

const VERSUS: &[&str] = &["विरूद्ध", "बिरूद्ध", "विरुद्ध", "बिरुद्ध"];

/// Before 2045 the versus line names the opposing side itself.
const OPPONENT_WITH_VERSUS: &[&str] = &[
  "विपक्षी",
  "प्रतिवादी",
  "प्रत्यर्थी",
  "बिपक्षी",
  "पिपक्षी",
  "प्रत्यार्थी",
  "विपक्ष",
  "रेस्पोण्डेण्ट",
  "रेस्पोन्डेन्ट",
  "विरूद्ध",
  "बिरूद्ध",
  "विरुद्ध",
];

const SUBJECT: &[&str] =
  &["विषय", "बिषय", "मुद्दा", "मूद्दा", "मुद्द", "मद्दा", "मुद्धा"];

const ORDER: &[&str] = &["आदेश", "फैसला", "फैसलमा", "निर्णय", "फै सला"];

const CASE_CODES: &[&str] = &[
  "AP", "FN", "RE", "RI", "LE", "RV", "NF", "CI", "CR", "RC", "SA", "MS", "ND",
  "RB", "CF", "DF", "RF", "WO", "WH", "WS", "WF", "WC", "CC", "EC",
];

const PARAGRAPH: &[&str] = &[
  "प्रकरण नं.",
  "(प्रकरण नं",
  "(प्रकारण नं.",
  "9प्रकरण नं।",
  "(प्रकरण",
  "(प्र नं.",
  "( प्र. नं",
  "(प्र.नं",
  "(प्र. नं",
  "( प्रकरण नं.",
  "( प्रकरणन",
  "( प्र.नं.",
  "( प्र . नं .",
  "(प्ररकण नं.",
  "(प्रकराण नं.",
];

/// Early volumes never use the unbracketed form.
const PARAGRAPH_EARLY: &[&str] = &[
  "(प्रकरण नं",
  "(प्रकारण नं.",
  "9प्रकरण नं।",
  "(प्रकरण",
  "(प्र नं.",
  "( प्र. नं",
  "(प्र.नं",
  "(प्र. नं",
  "( प्रकरण नं.",
  "( प्रकरणन",
  "( प्र.नं.",
  "( प्र . नं .",
  "(प्ररकण नं.",
  "(प्रकराण नं.",
];

/// Headings that open the operative order.
const VERDICT_HEADINGS: &[&str] = &["फैसला", "आदेश", "फैसलाः"];

const DATE_WORDS: &[&str] = &["मिति", "मिती"];

// ─── Era tables ──────────────────────────────────────────────────────────────

static ERA_2015: EraRules = EraRules {
  court:      BENCH,
  judges:     JUDGES,
  applicant:  APPLICANT,
  opponent:   OPPONENT_WITH_VERSUS,
  versus:     &[],
  subject:    SUBJECT,
  order:      ORDER,
  case_codes: &[],
  paragraph:  PARAGRAPH_EARLY,

  split_court_heading:      true,
  order_date_closes_judges: false,
  grouped_parties:          false,
};

static ERA_2045: EraRules = EraRules {
  court:      COURT,
  judges:     JUDGES,
  applicant:  APPLICANT,
  opponent:   OPPONENT,
  versus:     VERSUS,
  subject:    SUBJECT,
  order:      ORDER,
  case_codes: CASE_CODES,
  paragraph:  PARAGRAPH,

  split_court_heading:      true,
  order_date_closes_judges: false,
  grouped_parties:          false,
};

static ERA_2051: EraRules = EraRules {
  court:      &["इजलास", "इजालास"],
  judges:     JUDGES,
  applicant:  APPLICANT,
  opponent:   OPPONENT,
  versus:     VERSUS,
  subject:    SUBJECT,
  order:      ORDER,
  case_codes: &[],
  paragraph:  PARAGRAPH,

  split_court_heading:      false,
  order_date_closes_judges: true,
  grouped_parties:          false,
};

static ERA_2062: EraRules = EraRules {
  court:      COURT,
  judges:     JUDGES,
  applicant:  APPLICANT,
  opponent:   OPPONENT,
  versus:     VERSUS,
  subject:    SUBJECT,
  order:      ORDER,
  case_codes: CASE_CODES,
  paragraph:  PARAGRAPH,

  split_court_heading:      true,
  order_date_closes_judges: false,
  grouped_parties:          false,
};

static ERA_2073: EraRules = EraRules {
  court:      COURT,
  judges:     JUDGES,
  applicant:  APPLICANT,
  opponent:   OPPONENT,
  versus:     VERSUS,
  subject:    SUBJECT,
  order:      ORDER,
  case_codes: CASE_CODES,
  paragraph:  PARAGRAPH,

  split_court_heading:      false,
  order_date_closes_judges: true,
  grouped_parties:          true,
};

impl EraRules {
  pub fn for_layout(layout: Layout) -> &'static EraRules {
    match layout {
      Layout::Era2015 => &ERA_2015,
      Layout::Era2045 => &ERA_2045,
      Layout::Era2051 => &ERA_2051,
      Layout::Era2062 => &ERA_2062,
      Layout::Era2073 => &ERA_2073,
    }
  }

  pub fn is_court(&self, line: &str) -> bool { contains_any(line, self.court) }

  /// A line that is nothing but a bench label (`इजलास`).
  pub fn is_bare_court(&self, line: &str) -> bool {
    matches_any(label(line), self.court)
  }

  pub fn is_judge(&self, line: &str) -> bool { contains_any(line, self.judges) }

  pub fn is_subject(&self, line: &str) -> bool {
    starts_with_any(line, self.subject)
  }

  pub fn is_order_date(&self, line: &str) -> bool {
    starts_with_any(line, self.order) && contains_any(line, DATE_WORDS)
  }

  pub fn is_versus(&self, line: &str) -> bool {
    matches_any(label(line), self.versus)
  }

  /// Whether a whitespace-, dash- or slash-separated token is a registry
  /// code.
  pub fn has_case_code(&self, line: &str) -> bool {
    line
      .split(|c: char| c.is_whitespace() || c == '-' || c == '/')
      .any(|tok| matches_any(tok, self.case_codes))
  }

  /// Classify a party line. The keyword that occurs earliest wins, so
  /// `प्रतिवादी` beats the `वादी` inside it; on a tie the longer keyword
  /// wins.
  /// The flag is true when the line is only the label and the name sits in
  /// the next block.
  pub fn party(&self, line: &str) -> Option<(Side, bool)> {
    let mut best: Option<(usize, &str, Side)> = None;
    for (side, keywords) in
      [(Side::Applicant, self.applicant), (Side::Opponent, self.opponent)]
    {
      for &kw in keywords {
        let Some(at) = line.find(kw) else { continue };
        let better = match best {
          None => true,
          Some((best_at, best_kw, _)) => {
            at < best_at || (at == best_at && kw.len() > best_kw.len())
          }
        };
        if better {
          best = Some((at, kw, side));
        }
      }
    }
    best.map(|(_, kw, side)| (side, label(line) == kw))
  }

  /// Where the matched party keyword starts; `Some(0)` for label-led lines.
  pub fn party_offset(&self, line: &str) -> Option<usize> {
    self
      .applicant
      .iter()
      .chain(self.opponent)
      .filter_map(|kw| line.find(kw))
      .min()
  }

  pub fn is_paragraph_marker(&self, line: &str) -> bool {
    line.contains('§') || starts_with_any(line, self.paragraph)
  }

  pub fn is_verdict_heading(&self, line: &str) -> bool {
    matches_any(line.trim(), VERDICT_HEADINGS)
  }

  /// First block of the decision body proper.
  pub fn is_body_marker(&self, line: &str) -> bool {
    self.is_paragraph_marker(line) || self.is_verdict_heading(line)
  }
}

/// Strip the trailing colon (ASCII or visarga) a label may carry.
fn label(line: &str) -> &str {
  line.trim().trim_end_matches([':', 'ः', ' '])
}

fn matches_any(s: &str, keywords: &[&str]) -> bool {
  keywords.iter().any(|kw| *kw == s)
}

fn contains_any(line: &str, keywords: &[&str]) -> bool {
  keywords.iter().any(|kw| line.contains(kw))
}

fn starts_with_any(line: &str, keywords: &[&str]) -> bool {
  keywords.iter().any(|kw| line.starts_with(kw))
}
