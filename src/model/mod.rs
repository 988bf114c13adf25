// File: ./src/model/mod.rs
pub mod item;
pub mod temporal;
pub mod validation;

pub use item::{Schedule, ScheduleRecord};
pub use temporal::{DateTimeType, Temporal};
pub use validation::{RawFields, validate};
