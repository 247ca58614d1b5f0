//! "Today" in the user's timezone.

use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

pub fn parse_tz(tz: &str) -> Result<Tz> {
    tz.parse()
        .map_err(|_| anyhow::anyhow!("invalid timezone: {tz}"))
}

/// Calendar date of `now` as seen in `tz`.
pub fn local_date(now: DateTime<Utc>, tz: Tz) -> NaiveDate {
    now.with_timezone(&tz).date_naive()
}

/// Source of "today"; the shell reads it before every command.
pub type Clock = Box<dyn Fn() -> NaiveDate>;

pub fn zone_clock(tz: &str) -> Result<Clock> {
    let tz = parse_tz(tz)?;
    Ok(Box::new(move || local_date(Utc::now(), tz)))
}
