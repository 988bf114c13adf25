// File: ./src/cli.rs
//! Command-line front end: argument parsing, help text and command dispatch.
//!
//! Each mutating command follows the same cycle: load the full collection,
//! validate input, build the new collection with the pure helpers in
//! [`crate::store`], then save it whole.

use crate::config::Config;
use crate::context::AppContext;
use crate::error::NotFoundError;
use crate::model::temporal::parse_datetime;
use crate::model::{RawFields, Schedule};
use crate::storage::{BackupStatus, LocalStorage, SaveOutcome};
use crate::store;
use anyhow::{Result, anyhow, bail};
use chrono::{Duration, Local, NaiveDate};
use std::collections::{HashMap, VecDeque};
use std::io::Write;
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub root: Option<PathBuf>,
    pub verbose: bool,
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Records on one day; `None` means today.
    Day(Option<NaiveDate>),
    Dates,
    Search(String),
    Add(RawFields),
    /// Only the `Some` fields of `changes` are replaced.
    Edit {
        id: String,
        changes: RawFields,
    },
    Remove(String),
    Restore,
    ConfigList,
    ConfigGet(String),
    ConfigSet(String, String),
    Help,
}

/// Parses the arguments that follow the binary name.
pub fn parse_args<I, S>(args: I) -> Result<Invocation>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut args: VecDeque<String> = args.into_iter().map(Into::into).collect();
    let mut root = None;
    let mut verbose = false;

    while let Some(flag) = args.front().cloned() {
        match flag.as_str() {
            "-r" | "--root" => {
                args.pop_front();
                let path = args
                    .pop_front()
                    .ok_or_else(|| anyhow!("--root requires a path"))?;
                root = Some(PathBuf::from(path));
            }
            "-v" | "--verbose" => {
                args.pop_front();
                verbose = true;
            }
            _ => break,
        }
    }

    let command = match args.pop_front().as_deref() {
        None => Command::Day(None),
        Some("help" | "-h" | "--help") => Command::Help,
        Some("day") => Command::Day(args.pop_front().map(|d| parse_day(&d)).transpose()?),
        Some("dates") => Command::Dates,
        Some("search") => Command::Search(args.drain(..).collect::<Vec<_>>().join(" ")),
        Some("add") => {
            let date_time = required(&mut args, "add <token> <title>")?;
            let title = required(&mut args, "add <token> <title>")?;
            let mut opts = parse_options(&mut args, &["--memo", "--type"])?;
            Command::Add(RawFields {
                title: Some(title),
                date_time: Some(date_time),
                date_time_type: opts.remove("--type"),
                memo: opts.remove("--memo"),
            })
        }
        Some("edit") => {
            let id = required(&mut args, "edit <id>")?;
            let mut opts = parse_options(&mut args, &["--at", "--title", "--memo", "--type"])?;
            Command::Edit {
                id,
                changes: RawFields {
                    title: opts.remove("--title"),
                    date_time: opts.remove("--at"),
                    date_time_type: opts.remove("--type"),
                    memo: opts.remove("--memo"),
                },
            }
        }
        Some("remove" | "rm") => Command::Remove(required(&mut args, "remove <id>")?),
        Some("restore") => Command::Restore,
        Some("config") => match args.pop_front().as_deref() {
            None | Some("list") => Command::ConfigList,
            Some("get") => Command::ConfigGet(required(&mut args, "config get <key>")?),
            Some("set") => {
                let key = required(&mut args, "config set <key> <value>")?;
                let value = required(&mut args, "config set <key> <value>")?;
                Command::ConfigSet(key, value)
            }
            Some(other) => bail!("Unknown config action: {}", other),
        },
        Some(other) => bail!("Unknown command: {}", other),
    };

    if let Some(extra) = args.front() {
        bail!("Unexpected argument: {}", extra);
    }

    Ok(Invocation {
        root,
        verbose,
        command,
    })
}

/// Accepts `YYMMDD`, `today` or `tomorrow`.
pub fn parse_day(raw: &str) -> Result<NaiveDate> {
    let today = Local::now().date_naive();
    match raw {
        "today" => Ok(today),
        "tomorrow" => Ok(today + Duration::days(1)),
        _ if raw.contains('~') => bail!("Invalid day '{}' (expected YYMMDD)", raw),
        _ => {
            let (instant, _) = parse_datetime(&format!("{}_0000", raw))
                .map_err(|_| anyhow!("Invalid day '{}' (expected YYMMDD)", raw))?;
            Ok(instant.date())
        }
    }
}

fn required(args: &mut VecDeque<String>, usage: &str) -> Result<String> {
    args.pop_front()
        .ok_or_else(|| anyhow!("Missing argument. Usage: daymark {}", usage))
}

fn parse_options(
    args: &mut VecDeque<String>,
    allowed: &[&str],
) -> Result<HashMap<String, String>> {
    let mut opts = HashMap::new();
    while let Some(flag) = args.pop_front() {
        if !allowed.contains(&flag.as_str()) {
            bail!("Unknown option: {}", flag);
        }
        let value = args
            .pop_front()
            .ok_or_else(|| anyhow!("{} requires a value", flag))?;
        opts.insert(flag, value);
    }
    Ok(opts)
}

/// Overlays the `Some` fields of `changes` on top of `base`.
fn merge_fields(mut base: RawFields, changes: RawFields) -> RawFields {
    if changes.title.is_some() {
        base.title = changes.title;
    }
    if changes.date_time.is_some() {
        base.date_time = changes.date_time;
        // A new token without an explicit type carries its own decoration.
        base.date_time_type = None;
    }
    if changes.date_time_type.is_some() {
        base.date_time_type = changes.date_time_type;
    }
    if changes.memo.is_some() {
        base.memo = changes.memo;
    }
    base
}

/// Executes one command against the data directory of `ctx`.
pub fn run(ctx: &dyn AppContext, command: Command, out: &mut dyn Write) -> Result<()> {
    match command {
        Command::Help => write!(out, "{}", help_text("daymark"))?,
        Command::Day(day) => {
            let day = day.unwrap_or_else(|| Local::now().date_naive());
            let schedules = LocalStorage::load(ctx)?;
            let on_day = store::filter_by_date(&schedules, day);
            writeln!(
                out,
                "{}: {} schedule(s)",
                day.format("%Y-%m-%d %a"),
                on_day.len()
            )?;
            for s in &on_day {
                writeln!(out, "  {:<7} {}  [{}]", s.temporal.display_time(), s.title, s.id)?;
                if !s.memo.is_empty() {
                    writeln!(out, "          {}", s.memo)?;
                }
            }
        }
        Command::Dates => {
            let schedules = LocalStorage::load(ctx)?;
            for key in store::dates_with_schedules(&schedules) {
                writeln!(out, "{}", key)?;
            }
        }
        Command::Search(query) => {
            let schedules = LocalStorage::load(ctx)?;
            let hits = store::search(&schedules, &query);
            if hits.is_empty() {
                writeln!(out, "No match for '{}'", query)?;
            }
            for s in &hits {
                writeln!(out, "{:<13} {}  [{}]", s.date_time(), s.title, s.id)?;
            }
        }
        Command::Add(fields) => {
            let mut schedules = LocalStorage::load(ctx)?;
            let schedule = fields.into_schedule()?;
            let done = format!("Added {}", schedule.id);
            schedules.push(schedule);
            persist(ctx, &schedules, &done, out)?;
        }
        Command::Edit { id, changes } => {
            let schedules = LocalStorage::load(ctx)?;
            let edited = match store::find(&schedules, &id) {
                Ok(existing) => {
                    merge_fields(RawFields::from(existing), changes).apply_to(existing)?
                }
                Err(e) => return report_missing(&e, out),
            };
            match store::replace(&schedules, edited) {
                Ok(updated) => persist(ctx, &updated, &format!("Updated {}", id), out)?,
                Err(e) => report_missing(&e, out)?,
            }
        }
        Command::Remove(id) => {
            let schedules = LocalStorage::load(ctx)?;
            match store::remove(&schedules, &id) {
                Ok(updated) => persist(ctx, &updated, &format!("Removed {}", id), out)?,
                Err(e) => report_missing(&e, out)?,
            }
        }
        Command::Restore => {
            let outcome = LocalStorage::restore_backup(ctx)?;
            report_backup(&outcome, out)?;
            let restored = LocalStorage::load(ctx)?;
            writeln!(out, "Restored {} schedule(s) from backup", restored.len())?;
        }
        Command::ConfigList => {
            let config = Config::load(ctx)?;
            for (key, value) in config.iter() {
                writeln!(out, "{} = {}", key, value)?;
            }
        }
        Command::ConfigGet(key) => {
            let config = Config::load(ctx)?;
            match config.get(&key) {
                Some(value) => writeln!(out, "{}", value)?,
                None => writeln!(out, "'{}' is not set", key)?,
            }
        }
        Command::ConfigSet(key, value) => {
            let mut config = Config::load(ctx)?;
            config.set_from_str(&key, &value);
            config.save(ctx)?;
            writeln!(out, "{} = {}", key, config.get(&key).cloned().unwrap_or_default())?;
        }
    }
    Ok(())
}

fn persist(
    ctx: &dyn AppContext,
    schedules: &[Schedule],
    done: &str,
    out: &mut dyn Write,
) -> Result<()> {
    let outcome = LocalStorage::save(ctx, schedules)?;
    report_backup(&outcome, out)?;
    writeln!(out, "{}", done)?;
    Ok(())
}

fn report_missing(err: &NotFoundError, out: &mut dyn Write) -> Result<()> {
    writeln!(out, "{}; nothing changed", err)?;
    Ok(())
}

fn report_backup(outcome: &SaveOutcome, out: &mut dyn Write) -> Result<()> {
    if let BackupStatus::Failed(reason) = &outcome.backup {
        writeln!(out, "warning: backup not written ({}); save succeeded", reason)?;
    }
    Ok(())
}

pub fn help_text(binary_name: &str) -> String {
    format!(
        "\
Daymark v{version} - a small schedule tracker

USAGE:
    {bin} [--root <path>] [-v] [command]

COMMANDS:
    day [YYMMDD|today|tomorrow]     List a day's schedules, earliest first (default: today)
    dates                           List every day that has schedules
    search <text>                   Case-insensitive search in titles and memos
    add <token> <title> [--memo <text>] [--type <exact|until|from>]
    edit <id> [--at <token>] [--title <text>] [--memo <text>] [--type <kind>]
    remove <id>                     Delete a schedule
    restore                         Swap the live file with its backup generation
    config [list]                   Show all settings
    config get <key>
    config set <key> <value>
    help                            Show this help message

OPTIONS:
    -r, --root <path>     Use a different directory for data.
    -v, --verbose         Log debug output to stderr.

DATE/TIME TOKENS:
    260219_1430     at 2026-02-19 14:30
    ~260219_1430    until 2026-02-19 14:30
    260219_1430~    from 2026-02-19 14:30

EXAMPLES:
    {bin} add 260219_0900 Standup --memo \"room B\"
    {bin} add ~260220_1700 \"Submit report\"
    {bin} day 260219
",
        version = env!("CARGO_PKG_VERSION"),
        bin = binary_name
    )
}

pub fn print_help(binary_name: &str) {
    print!("{}", help_text(binary_name));
}
