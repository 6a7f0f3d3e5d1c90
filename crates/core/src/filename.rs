//! Canonical document filenames:
//! `<yyyy-MM-dd>--<description>__<tag1>_<tag2>.pdf`, tags sorted.
//!
//! The same shape decides whether a document is finished: a filename is
//! tagged when it has both separators and no placeholder token.

use crate::dates::{DateParser, TextDateParser};
use crate::models::TaggingStatus;
use chrono::{NaiveDate, Utc};
use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

pub const DATE_PLACEHOLDER: &str = "PDFARCHIVER-TEMP-DATE";
pub const DESCRIPTION_PLACEHOLDER: &str = "PDF-ARCHIVER-TEMP-DESCRIPTION-";
pub const TAG_PLACEHOLDER: &str = "PDFARCHIVERTEMPTAG";

const DATE_SEPARATOR: &str = "--";
const TAG_SEPARATOR: &str = "__";

static FILENAME_DATE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^([\d-]+?)--").unwrap());
static DESCRIPTION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"--([\w-]+?)__").unwrap());

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedFilename {
    pub date: Option<NaiveDate>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
}

pub fn parse(filename: &str) -> ParsedFilename {
    parse_with(filename, &TextDateParser)
}

/// Split a filename into date, description and tags. Whatever does not
/// follow the canonical shape is recovered on a best-effort basis.
pub fn parse_with(filename: &str, dates: &dyn DateParser) -> ParsedFilename {
    let (date, raw_date) = match filename_date(filename) {
        Some((date, raw)) => (Some(date), raw),
        None => match dates.parse(filename) {
            Some((date, raw)) => (Some(date), raw),
            None => (None, String::new()),
        },
    };

    let description = match DESCRIPTION.captures(filename).and_then(|c| c.get(1)) {
        Some(m) => Some(m.as_str().to_string()),
        None => {
            let lower = strip_extension(filename).to_lowercase();
            let head = lower.split(TAG_SEPARATOR).next().unwrap_or_default();
            let without_date = if raw_date.is_empty() {
                head.to_string()
            } else {
                head.replacen(&raw_date.to_lowercase(), "", 1)
            };
            let mut cleaned = String::with_capacity(without_date.len());
            for c in without_date.chars().map(|c| if c == '_' { '-' } else { c }) {
                if c == '-' && cleaned.ends_with('-') {
                    continue;
                }
                cleaned.push(c);
            }
            let cleaned = cleaned.trim_matches(|c| c == '-' || c == ' ');
            (!cleaned.is_empty()).then(|| cleaned.to_string())
        }
    };

    let tags = strip_extension(filename)
        .rsplit_once(TAG_SEPARATOR)
        .map(|(_, tail)| {
            tail.split('_')
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .filter(|tags| !tags.is_empty());

    ParsedFilename {
        date,
        description,
        tags,
    }
}

/// Build the canonical filename. A missing description becomes a unique
/// placeholder and an empty tag set the tag placeholder, so the result stays
/// untagged until real values are supplied.
///
/// [`parse`] reads the description back unchanged only when it is a slug of
/// word characters and `-`; anything else comes back through the lowercase
/// fallback. Callers slugify first (see [`slugify`]).
pub fn create_filename(
    date: NaiveDate,
    description: Option<&str>,
    tags: &BTreeSet<String>,
) -> String {
    let description = match description {
        Some(d) if !d.is_empty() => d.to_string(),
        _ => format!("{DESCRIPTION_PLACEHOLDER}{}", Utc::now().timestamp_micros()),
    };
    let tags = if tags.is_empty() {
        TAG_PLACEHOLDER.to_string()
    } else {
        tags.iter().map(String::as_str).collect::<Vec<_>>().join("_")
    };
    format!(
        "{}{DATE_SEPARATOR}{description}{TAG_SEPARATOR}{tags}.pdf",
        date.format("%Y-%m-%d")
    )
}

pub fn tagging_status(filename: &str) -> TaggingStatus {
    let shaped = filename.contains(DATE_SEPARATOR) && filename.contains(TAG_SEPARATOR);
    let placeholder = [DATE_PLACEHOLDER, DESCRIPTION_PLACEHOLDER, TAG_PLACEHOLDER]
        .iter()
        .any(|p| filename.contains(p));
    if shaped && !placeholder {
        TaggingStatus::Tagged
    } else {
        TaggingStatus::Untagged
    }
}

/// Whether the filename starts with a parseable `yyyy-MM-dd--` date.
pub fn has_filename_date(filename: &str) -> bool {
    filename_date(filename).is_some()
}

fn filename_date(filename: &str) -> Option<(NaiveDate, String)> {
    let raw = FILENAME_DATE.captures(filename)?.get(1)?.as_str();
    let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()?;
    Some((date, raw.to_string()))
}

/// Drop a trailing `.ext` (1-5 alphanumeric characters).
fn strip_extension(name: &str) -> &str {
    match name.rsplit_once('.') {
        Some((stem, ext))
            if !stem.is_empty()
                && (1..=5).contains(&ext.len())
                && ext.chars().all(|c| c.is_ascii_alphanumeric()) =>
        {
            stem
        }
        _ => name,
    }
}

/// Reduce text to ASCII letters and digits, joining the remaining words with
/// `separator`. German umlauts are transliterated, other Latin diacritics
/// dropped.
pub fn slugify(text: &str, separator: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_separator = false;
    for ch in text.chars() {
        for c in transliterate(ch).chars() {
            if c.is_ascii_alphanumeric() {
                if pending_separator && !out.is_empty() {
                    out.push_str(separator);
                }
                pending_separator = false;
                out.push(c);
            } else {
                pending_separator = true;
            }
        }
    }
    out
}

fn transliterate(ch: char) -> String {
    let mapped = match ch {
        'ß' => "ss",
        'Ä' => "Ae",
        'Ö' => "Oe",
        'Ü' => "Ue",
        'ä' => "ae",
        'ö' => "oe",
        'ü' => "ue",
        'à' | 'á' | 'â' | 'ã' | 'å' => "a",
        'À' | 'Á' | 'Â' | 'Ã' | 'Å' => "A",
        'ç' => "c",
        'Ç' => "C",
        'è' | 'é' | 'ê' | 'ë' => "e",
        'È' | 'É' | 'Ê' | 'Ë' => "E",
        'ì' | 'í' | 'î' | 'ï' => "i",
        'Ì' | 'Í' | 'Î' | 'Ï' => "I",
        'ñ' => "n",
        'Ñ' => "N",
        'ò' | 'ó' | 'ô' | 'õ' | 'ø' => "o",
        'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ø' => "O",
        'ù' | 'ú' | 'û' => "u",
        'Ù' | 'Ú' | 'Û' => "U",
        'ý' | 'ÿ' => "y",
        'Ý' => "Y",
        _ => return ch.to_string(),
    };
    mapped.to_string()
}
