//! Parser for templated `hg annotate` output.
//!
//! The annotate template (see `blame::ANNOTATE_TEMPLATE`) prints one record per
//! source line:
//!
//! ```text
//! <node|short> US <user|email> US <date|isodatesec>
//! ```
//!
//! where US is the ASCII unit separator. Author names can hold any printable
//! text, the separator cannot appear in them in practice.
//!
//! Line numbers come from record order. Mercurial's own `{lineno}` is the
//! line's position in the revision that introduced it, not in the annotated
//! file, so it is not requested.
//!
//! Any record that does not fit fails the whole file: a visible failure is
//! preferable to a line attributed to the wrong revision.

use chrono::{DateTime, FixedOffset, NaiveDate};

use crate::error::ParseError;
use crate::models::BlameLine;

pub const FIELD_SEPARATOR: char = '\u{1f}';

/// Length of `{node|short}`
pub const SHORT_HASH_LEN: usize = 12;

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S %z";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse the full stdout of one annotate run.
pub fn parse_blame(raw: &str) -> Result<Vec<BlameLine>, ParseError> {
    raw.lines()
        .enumerate()
        .map(|(idx, record)| parse_record(idx + 1, record))
        .collect()
}

fn parse_record(position: usize, record: &str) -> Result<BlameLine, ParseError> {
    // lines() leaves a lone '\r' on a final record that has no '\n'
    let record = record.strip_suffix('\r').unwrap_or(record);
    let fail = |reason: String| ParseError {
        record: position,
        reason,
        raw: record.to_string(),
    };

    let fields: Vec<&str> = record.split(FIELD_SEPARATOR).collect();
    let [revision, author, date] = fields.as_slice() else {
        return Err(fail(format!("expected 3 fields, found {}", fields.len())));
    };

    if revision.len() != SHORT_HASH_LEN || !revision.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(fail(format!("invalid changeset hash {:?}", revision)));
    }

    let timestamp = parse_date(date.trim()).ok_or_else(|| fail(format!("unparseable date {:?}", date)))?;
    let line_number = u32::try_from(position).map_err(|_| fail("too many lines".to_string()))?;

    Ok(BlameLine {
        line_number,
        revision: revision.to_string(),
        author: author.to_string(),
        timestamp,
    })
}

/// Date with time and offset first, plain date (midnight UTC) as fallback.
pub fn parse_date(value: &str) -> Option<DateTime<FixedOffset>> {
    if let Ok(datetime) = DateTime::parse_from_str(value, DATETIME_FORMAT) {
        return Some(datetime);
    }

    let date = NaiveDate::parse_from_str(value, DATE_FORMAT).ok()?;
    let utc = FixedOffset::east_opt(0)?;
    date.and_hms_opt(0, 0, 0)?.and_local_timezone(utc).single()
}
