// File: src/store.rs
//
// Read-only views over a schedule collection plus pure replace/remove.
// Nothing here keeps state: the caller owns the collection and persists
// whatever these functions return.
use crate::error::NotFoundError;
use crate::model::Schedule;
use crate::model::temporal::date_to_key;
use chrono::NaiveDate;
use std::collections::BTreeSet;

/// Records falling on `day`, earliest first.
///
/// The sort is stable, so records with the same instant keep collection order.
pub fn filter_by_date(schedules: &[Schedule], day: NaiveDate) -> Vec<Schedule> {
    let key = date_to_key(day);
    let mut matched: Vec<Schedule> = schedules
        .iter()
        .filter(|s| s.date_key() == key)
        .cloned()
        .collect();
    matched.sort_by_key(|s| s.instant());
    log::debug!("{} schedule(s) on {}", matched.len(), key);
    matched
}

/// Distinct `YYMMDD` keys that carry at least one record (calendar markers).
pub fn dates_with_schedules(schedules: &[Schedule]) -> BTreeSet<String> {
    schedules.iter().map(Schedule::date_key).collect()
}

/// Case-insensitive substring search over title and memo, in collection order.
/// An empty query matches everything.
pub fn search(schedules: &[Schedule], query: &str) -> Vec<Schedule> {
    let needle = query.to_lowercase();
    let results: Vec<Schedule> = schedules
        .iter()
        .filter(|s| s.matches_lowercase(&needle))
        .cloned()
        .collect();
    log::debug!("search {:?}: {} hit(s)", query, results.len());
    results
}

pub fn find<'a>(schedules: &'a [Schedule], id: &str) -> Result<&'a Schedule, NotFoundError> {
    schedules.iter().find(|s| s.id == id).ok_or_else(|| NotFoundError {
        id: id.to_string(),
    })
}

/// Returns a new collection where every record sharing `record.id` is swapped
/// out, so duplicate ids are treated the same way `remove` treats them.
///
/// The input is never touched; on `NotFoundError` the caller simply keeps its
/// current collection.
pub fn replace(schedules: &[Schedule], record: Schedule) -> Result<Vec<Schedule>, NotFoundError> {
    find(schedules, &record.id)?;
    Ok(schedules
        .iter()
        .map(|s| if s.id == record.id { record.clone() } else { s.clone() })
        .collect())
}

/// Returns a new collection without any record identified by `id`.
pub fn remove(schedules: &[Schedule], id: &str) -> Result<Vec<Schedule>, NotFoundError> {
    find(schedules, id)?;
    Ok(schedules.iter().filter(|s| s.id != id).cloned().collect())
}
