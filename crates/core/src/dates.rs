//! Free-text date detection, shared by filename parsing and content parsing.

use chrono::NaiveDate;
use regex::{Captures, Regex};
use std::sync::LazyLock;

/// Finds a calendar date somewhere in a piece of text.
pub trait DateParser: Send + Sync {
    /// The first date in `text` and the exact substring it was read from.
    fn parse(&self, text: &str) -> Option<(NaiveDate, String)>;
}

const MONTHS: [(&str, u32); 26] = [
    ("january", 1),
    ("januar", 1),
    ("february", 2),
    ("februar", 2),
    ("march", 3),
    ("märz", 3),
    ("maerz", 3),
    ("april", 4),
    ("may", 5),
    ("mai", 5),
    ("june", 6),
    ("juni", 6),
    ("july", 7),
    ("juli", 7),
    ("august", 8),
    ("september", 9),
    ("october", 10),
    ("oktober", 10),
    ("november", 11),
    ("december", 12),
    ("dezember", 12),
    ("jan", 1),
    ("feb", 2),
    ("mar", 3),
    ("apr", 4),
    ("aug", 8),
];

const MONTH_ABBREVIATIONS: [(&str, u32); 8] = [
    ("jun", 6),
    ("jul", 7),
    ("sept", 9),
    ("sep", 9),
    ("oct", 10),
    ("okt", 10),
    ("nov", 11),
    ("dec", 12),
];

fn month_number(name: &str) -> Option<u32> {
    let name = name.to_lowercase();
    MONTHS
        .iter()
        .chain(MONTH_ABBREVIATIONS.iter())
        .find(|(n, _)| *n == name)
        .map(|(_, m)| *m)
}

fn month_alternation() -> String {
    let mut names: Vec<&str> = MONTHS
        .iter()
        .chain(MONTH_ABBREVIATIONS.iter())
        .map(|(n, _)| *n)
        .collect();
    // longest first so "march" wins over "mar"
    names.sort_by_key(|n| std::cmp::Reverse(n.chars().count()));
    names.join("|")
}

#[derive(Clone, Copy)]
enum Layout {
    Ymd,
    Dmy,
    DayMonthNameYear,
    MonthNameDayYear,
}

struct Pattern {
    regex: Regex,
    layout: Layout,
}

static PATTERNS: LazyLock<Vec<Pattern>> = LazyLock::new(|| {
    let months = month_alternation();
    let compile = |re: &str, layout| Pattern {
        regex: Regex::new(re).unwrap(),
        layout,
    };
    vec![
        compile(
            r"((\d{4})[-_./](\d{1,2})[-_./](\d{1,2}))",
            Layout::Ymd,
        ),
        compile(
            r"((\d{1,2})[./](\d{1,2})[./](\d{4}))",
            Layout::Dmy,
        ),
        compile(r"((\d{4})(\d{2})(\d{2}))", Layout::Ymd),
        compile(
            format!(r"(?i)\b((\d{{1,2}})\.?\s+({months})\.?\s+(\d{{4}}))\b").as_str(),
            Layout::DayMonthNameYear,
        ),
        compile(
            format!(r"(?i)\b(({months})\.?\s+(\d{{1,2}})(?:st|nd|rd|th)?,?\s+(\d{{4}}))\b").as_str(),
            Layout::MonthNameDayYear,
        ),
    ]
});

/// Default parser: numeric ISO/European/compact layouts and written month
/// names in English and German. Years outside 1900..=2100 are ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextDateParser;

impl TextDateParser {
    fn date_from(caps: &Captures<'_>, layout: Layout) -> Option<NaiveDate> {
        let num = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u32>().ok());
        let (year, month, day) = match layout {
            Layout::Ymd => (num(2)?, num(3)?, num(4)?),
            Layout::Dmy => (num(4)?, num(3)?, num(2)?),
            Layout::DayMonthNameYear => (num(4)?, month_number(caps.get(3)?.as_str())?, num(2)?),
            Layout::MonthNameDayYear => (num(4)?, month_number(caps.get(2)?.as_str())?, num(3)?),
        };
        if !(1900..=2100).contains(&year) {
            return None;
        }
        NaiveDate::from_ymd_opt(year as i32, month, day)
    }

    /// First valid date of `pattern` in `text`. Candidates touching another
    /// digit are skipped, and the scan resumes one character after a
    /// rejected candidate so overlapping ones are still tried.
    fn first_in(pattern: &Pattern, text: &str) -> Option<(usize, NaiveDate, String)> {
        let mut from = 0;
        while let Some(caps) = pattern.regex.captures_at(text, from) {
            let whole = caps.get(1)?;
            let detached = !text[..whole.start()].ends_with(|c: char| c.is_ascii_digit())
                && !text[whole.end()..].starts_with(|c: char| c.is_ascii_digit());
            if detached {
                if let Some(date) = Self::date_from(&caps, pattern.layout) {
                    return Some((whole.start(), date, whole.as_str().to_string()));
                }
            }
            from = whole.start() + text[whole.start()..].chars().next()?.len_utf8();
        }
        None
    }
}

impl DateParser for TextDateParser {
    fn parse(&self, text: &str) -> Option<(NaiveDate, String)> {
        let mut best: Option<(usize, NaiveDate, String)> = None;
        for pattern in PATTERNS.iter() {
            if let Some(candidate) = Self::first_in(pattern, text) {
                let earlier = best
                    .as_ref()
                    .map(|(start, _, _)| candidate.0 < *start)
                    .unwrap_or(true);
                if earlier {
                    best = Some(candidate);
                }
            }
        }
        best.map(|(_, date, raw)| (date, raw))
    }
}
