// Schedule record and its on-disk representation.
use crate::error::FormatError;
use crate::model::temporal::{
    DateTimeType, Temporal, extract_date_key, format_datetime, now_minute, parse_datetime,
};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Number of hex characters kept from a v4 UUID for record ids.
const ID_LEN: usize = 8;

pub fn new_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(ID_LEN);
    id
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    pub id: String,
    pub temporal: Temporal,
    pub title: String,
    pub memo: String,
    pub created_at: NaiveDateTime,
}

impl Schedule {
    /// Creates a fresh record with a new id, stamped with the current time.
    ///
    /// Callers are expected to have run validation on the raw input first.
    pub fn new(temporal: Temporal, title: &str, memo: &str) -> Self {
        Self {
            id: new_id(),
            temporal,
            title: title.to_string(),
            memo: memo.to_string(),
            created_at: now_minute(),
        }
    }

    /// Builds the replacement for `self`: same id and creation stamp, new fields.
    pub fn replaced_with(&self, temporal: Temporal, title: &str, memo: &str) -> Self {
        Self {
            id: self.id.clone(),
            temporal,
            title: title.to_string(),
            memo: memo.to_string(),
            created_at: self.created_at,
        }
    }

    pub fn date_key(&self) -> String {
        self.temporal.date_key()
    }

    pub fn date(&self) -> NaiveDate {
        self.temporal.date()
    }

    pub fn instant(&self) -> NaiveDateTime {
        self.temporal.instant
    }

    pub fn kind(&self) -> DateTimeType {
        self.temporal.kind
    }

    /// The raw token as it is persisted (`~260219_1430`, ...).
    pub fn date_time(&self) -> String {
        self.temporal.to_token()
    }

    pub fn created_at_token(&self) -> String {
        format_datetime(&self.created_at, DateTimeType::Exact)
    }

    /// Case-insensitive substring match against title or memo.
    /// `needle` must already be lowercase.
    pub fn matches_lowercase(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle) || self.memo.to_lowercase().contains(needle)
    }

    pub fn to_record(&self) -> ScheduleRecord {
        ScheduleRecord::from(self)
    }
}

/// Serialized form of a [`Schedule`].
///
/// The struct is the allow-list of persisted fields: serde drops any other key
/// on read, and writes always emit exactly these fields in this order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRecord {
    pub id: String,
    pub date_time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_time_type: Option<DateTimeType>,
    pub title: String,
    #[serde(default)]
    pub memo: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl ScheduleRecord {
    /// Date key straight from the stored token, usable even if the token is broken.
    pub fn date_key(&self) -> String {
        extract_date_key(&self.date_time)
    }
}

impl From<&Schedule> for ScheduleRecord {
    fn from(s: &Schedule) -> Self {
        Self {
            id: s.id.clone(),
            date_time: s.date_time(),
            date_time_type: Some(s.kind()),
            title: s.title.clone(),
            memo: s.memo.clone(),
            created_at: Some(s.created_at_token()),
        }
    }
}

impl TryFrom<ScheduleRecord> for Schedule {
    type Error = FormatError;

    /// The explicit `date_time_type` field wins over the token's decoration;
    /// the decoration only decides when the field is absent.
    /// A missing `created_at` falls back to the record's own instant, so
    /// repeated loads of the same file stay equal.
    fn try_from(r: ScheduleRecord) -> Result<Self, Self::Error> {
        let (instant, decorated_kind) = parse_datetime(&r.date_time)?;
        let kind = r.date_time_type.unwrap_or(decorated_kind);
        let created_at = match r.created_at.as_deref() {
            Some(raw) => parse_datetime(raw)?.0,
            None => instant,
        };
        Ok(Self {
            id: r.id,
            temporal: Temporal::new(instant, kind),
            title: r.title,
            memo: r.memo,
            created_at,
        })
    }
}
