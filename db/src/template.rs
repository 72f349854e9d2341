//! Naming and content of freshly generated migration scripts.
//!
//! Generated files are called `<yyyyMMddHHmmss>-<name>.sql` using UTC time,
//! e.g. `20201021180150-add_table_users.sql`, so sorting file names sorts
//! scripts chronologically.

use chrono::{DateTime, NaiveDateTime, TimeDelta, Timelike, Utc};

use crate::source::SCRIPT_EXTENSION;

/// `chrono` format of the file name prefix.
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

const TIMESTAMP_LEN: usize = 14;

/// Builds the file name for `script_name` generated at `timestamp`.
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use toolbox_db::script_file_name;
///
/// let at = Utc.with_ymd_and_hms(2020, 10, 21, 18, 1, 50).unwrap();
/// assert_eq!(script_file_name(at, " add_table_users "), "20201021180150-add_table_users.sql");
/// ```
pub fn script_file_name(timestamp: DateTime<Utc>, script_name: &str) -> String {
    format!(
        "{}-{}.{SCRIPT_EXTENSION}",
        timestamp.format(TIMESTAMP_FORMAT),
        script_name.trim()
    )
}

/// Renders the empty Up/Down template for `script_name`.
pub fn script_template(script_name: &str) -> String {
    let name = script_name.trim();
    format!("-- +migrate Up\n-- {name}\n\n\n-- +migrate Down\n-- {name}\n")
}

/// Extracts the timestamp prefix of a generated script file name.
///
/// Returns `None` for names that do not start with a valid
/// `yyyyMMddHHmmss-` prefix.
pub fn parse_timestamp_prefix(file_name: &str) -> Option<DateTime<Utc>> {
    let prefix = file_name.get(..TIMESTAMP_LEN)?;
    if file_name.as_bytes().get(TIMESTAMP_LEN) != Some(&b'-') {
        return None;
    }
    NaiveDateTime::parse_from_str(prefix, TIMESTAMP_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

/// Picks the timestamp for the next generated script.
///
/// The result is `now` truncated to whole seconds, pushed forward to one
/// second after `latest` when needed, so every generated prefix is strictly
/// greater than any prefix already issued.
///
/// ```
/// use chrono::{TimeZone, Utc};
/// use toolbox_db::next_script_timestamp;
///
/// let now = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
/// assert_eq!(next_script_timestamp(now, None), now);
/// assert_eq!(
///     next_script_timestamp(now, Some(now)),
///     Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 1).unwrap()
/// );
/// ```
pub fn next_script_timestamp(now: DateTime<Utc>, latest: Option<DateTime<Utc>>) -> DateTime<Utc> {
    let now = now.with_nanosecond(0).unwrap_or(now);
    match latest {
        Some(latest) if latest >= now => latest + TimeDelta::seconds(1),
        _ => now,
    }
}

/// Checks that `script_name` can be embedded in a file name.
///
/// Returns the trimmed name, or `None` if it is empty or contains a path
/// separator.
pub fn sanitize_script_name(script_name: &str) -> Option<&str> {
    let name = script_name.trim();
    if name.is_empty() || name.contains(['/', '\\']) || name == "." || name == ".." {
        None
    } else {
        Some(name)
    }
}
