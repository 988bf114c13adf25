// Field-level validation of raw schedule input.
use crate::error::ValidationError;
use crate::model::item::Schedule;
use crate::model::temporal::{DateTimeType, Temporal, parse_datetime};
use serde::Deserialize;

/// Unvalidated input as it arrives from a form or the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RawFields {
    pub title: Option<String>,
    pub date_time: Option<String>,
    pub date_time_type: Option<String>,
    pub memo: Option<String>,
}

impl From<&Schedule> for RawFields {
    fn from(s: &Schedule) -> Self {
        Self {
            title: Some(s.title.clone()),
            date_time: Some(s.date_time()),
            date_time_type: Some(s.kind().to_string()),
            memo: Some(s.memo.clone()),
        }
    }
}

/// Checks raw input and returns every problem found; an empty list means valid.
///
/// Each rule is evaluated on its own, so blank title, blank date and a bad
/// type produce three messages from a single call.
pub fn validate(fields: &RawFields) -> Vec<String> {
    let mut errors = Vec::new();

    if fields.title.as_deref().is_none_or(|t| t.trim().is_empty()) {
        errors.push("title required".to_string());
    }

    match fields.date_time.as_deref().map(str::trim) {
        None | Some("") => errors.push("date/time required".to_string()),
        Some(raw) => {
            if let Err(e) = parse_datetime(raw) {
                errors.push(format!("date/time format error: {}", e));
            }
        }
    }

    if let Some(kind) = fields.date_time_type.as_deref()
        && kind.parse::<DateTimeType>().is_err()
    {
        errors.push(format!("invalid date_time_type: {}", kind));
    }

    errors
}

impl RawFields {
    /// Validates and builds a brand new record.
    pub fn into_schedule(&self) -> Result<Schedule, ValidationError> {
        let (temporal, title, memo) = self.checked()?;
        Ok(Schedule::new(temporal, title, memo))
    }

    /// Validates and builds the replacement for `existing`, keeping its id and
    /// creation stamp.
    pub fn apply_to(&self, existing: &Schedule) -> Result<Schedule, ValidationError> {
        let (temporal, title, memo) = self.checked()?;
        Ok(existing.replaced_with(temporal, title, memo))
    }

    fn checked(&self) -> Result<(Temporal, &str, &str), ValidationError> {
        let errors = validate(self);
        if !errors.is_empty() {
            return Err(ValidationError(errors));
        }

        let raw = self.date_time.as_deref().unwrap_or_default();
        let mut temporal = Temporal::parse(raw).map_err(|e| ValidationError(vec![e.to_string()]))?;
        if let Some(kind) = self.date_time_type.as_deref() {
            let kind = kind
                .parse::<DateTimeType>()
                .map_err(|_| ValidationError(vec![format!("invalid date_time_type: {}", kind)]))?;
            temporal = temporal.with_kind(kind);
        }

        Ok((
            temporal,
            self.title.as_deref().unwrap_or_default().trim(),
            self.memo.as_deref().unwrap_or_default().trim(),
        ))
    }
}
