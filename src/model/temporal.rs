// Parser and formatter for the compact `YYMMDD_HHMM` date/time token.
//
// Token forms:
//   260219_1430    exact   (at that time)
//   ~260219_1430   until   (deadline, up to that time)
//   260219_1430~   from    (open start, from that time on)
//
// Years are always 2000 + YY.
use crate::error::FormatError;
use chrono::{Datelike, Local, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;
use std::str::FromStr;
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Length of the undecorated body, `YYMMDD_HHMM`.
pub const TOKEN_LEN: usize = 11;
pub const DECORATION: char = '~';
const SEPARATOR: u8 = b'_';
const SEPARATOR_POS: usize = 6;
const CENTURY: i32 = 2000;

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    EnumString,
    Display,
    AsRefStr,
    EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum DateTimeType {
    #[default]
    Exact,
    Until,
    From,
}

/// A naive local instant plus the way it should be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Temporal {
    pub instant: NaiveDateTime,
    pub kind: DateTimeType,
}

impl Temporal {
    pub fn new(instant: NaiveDateTime, kind: DateTimeType) -> Self {
        Self { instant, kind }
    }

    pub fn exact(instant: NaiveDateTime) -> Self {
        Self::new(instant, DateTimeType::Exact)
    }

    pub fn parse(raw: &str) -> Result<Self, FormatError> {
        let (instant, kind) = parse_datetime(raw)?;
        Ok(Self { instant, kind })
    }

    pub fn with_kind(self, kind: DateTimeType) -> Self {
        Self { kind, ..self }
    }

    pub fn date(&self) -> NaiveDate {
        self.instant.date()
    }

    pub fn date_key(&self) -> String {
        date_to_key(self.instant.date())
    }

    /// Short `HH:MM` rendering with the same decoration as the full token.
    pub fn display_time(&self) -> String {
        format_time_display(&self.instant, self.kind)
    }

    pub fn to_token(&self) -> String {
        format_datetime(&self.instant, self.kind)
    }
}

impl fmt::Display for Temporal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_token())
    }
}

impl FromStr for Temporal {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Parses a token into `(instant, type)`.
///
/// Surrounding whitespace is ignored. A token decorated on both ends is
/// rejected instead of being resolved to either variant.
pub fn parse_datetime(raw: &str) -> Result<(NaiveDateTime, DateTimeType), FormatError> {
    let trimmed = raw.trim();
    let (body, kind) = split_decoration(trimmed).ok_or_else(|| FormatError::DoubleDecoration {
        raw: raw.to_string(),
    })?;

    let bytes = body.as_bytes();
    if bytes.len() != TOKEN_LEN || bytes[SEPARATOR_POS] != SEPARATOR {
        return Err(FormatError::Shape {
            raw: raw.to_string(),
        });
    }

    let field = |range: Range<usize>| two_digits(&bytes[range]);
    let (Some(yy), Some(mm), Some(dd), Some(hh), Some(mi)) = (
        field(0..2),
        field(2..4),
        field(4..6),
        field(7..9),
        field(9..11),
    ) else {
        return Err(FormatError::NonDigit {
            raw: raw.to_string(),
        });
    };

    // Calendar construction doubles as the range check (month, leap days, 24h clock).
    let date = NaiveDate::from_ymd_opt(CENTURY + yy as i32, mm, dd);
    let time = NaiveTime::from_hms_opt(hh, mi, 0);
    match (date, time) {
        (Some(d), Some(t)) => Ok((d.and_time(t), kind)),
        _ => Err(FormatError::OutOfRange {
            raw: raw.to_string(),
        }),
    }
}

/// Formats an instant as a token. Inverse of [`parse_datetime`].
pub fn format_datetime(instant: &NaiveDateTime, kind: DateTimeType) -> String {
    let body = format!(
        "{:02}{:02}{:02}_{:02}{:02}",
        (instant.year() - CENTURY).rem_euclid(100),
        instant.month(),
        instant.day(),
        instant.hour(),
        instant.minute()
    );
    decorate(body, kind)
}

/// `HH:MM` for list views, decorated like the full token.
pub fn format_time_display(instant: &NaiveDateTime, kind: DateTimeType) -> String {
    decorate(instant.format("%H:%M").to_string(), kind)
}

/// `YYMMDD` lookup key for a calendar day.
pub fn date_to_key(date: NaiveDate) -> String {
    format!(
        "{:02}{:02}{:02}",
        (date.year() - CENTURY).rem_euclid(100),
        date.month(),
        date.day()
    )
}

/// Pulls the `YYMMDD` part out of a raw token without parsing it.
///
/// Both decorations are stripped first, and nothing after the date portion is
/// inspected, so a broken time part still yields a key.
pub fn extract_date_key(raw: &str) -> String {
    let s = raw.trim();
    let s = s.strip_prefix(DECORATION).unwrap_or(s);
    let s = s.strip_suffix(DECORATION).unwrap_or(s);
    s.chars().take(6).collect()
}

/// Current local wall-clock time as an exact token.
pub fn now_token() -> String {
    format_datetime(&now_minute(), DateTimeType::Exact)
}

/// Current local time truncated to the minute, the token's resolution.
pub fn now_minute() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(now)
}

fn decorate(body: String, kind: DateTimeType) -> String {
    match kind {
        DateTimeType::Exact => body,
        DateTimeType::Until => format!("{DECORATION}{body}"),
        DateTimeType::From => format!("{body}{DECORATION}"),
    }
}

/// Returns the undecorated body and the variant it selects,
/// or `None` when both ends are decorated.
fn split_decoration(s: &str) -> Option<(&str, DateTimeType)> {
    match (s.strip_prefix(DECORATION), s.strip_suffix(DECORATION)) {
        (Some(_), Some(_)) if s.len() > 1 => None,
        (Some(body), _) => Some((body, DateTimeType::Until)),
        (None, Some(body)) => Some((body, DateTimeType::From)),
        (None, None) => Some((s, DateTimeType::Exact)),
    }
}

fn two_digits(bytes: &[u8]) -> Option<u32> {
    match bytes {
        [a, b] if a.is_ascii_digit() && b.is_ascii_digit() => {
            Some(u32::from(a - b'0') * 10 + u32::from(b - b'0'))
        }
        _ => None,
    }
}
