//! Timestamp and date fields.
//!
//! With a `time_layout` option the cell is parsed and rendered with that
//! chrono strftime pattern. A `time_zone` option names the IANA zone that
//! local wall-clock text is interpreted in when reading, and that values are
//! converted into before rendering. Text carrying its own offset (`%z`)
//! keeps it. Without a zone, wall-clock text is read as UTC.
//!
//! Without a layout every type falls back to its standard text form:
//! RFC 3339 for zoned timestamps and ISO 8601 for naive ones.

use std::fmt::{self, Write as _};

use chrono::{
    DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, TimeZone, Utc,
    format::ParseErrorKind,
};
use chrono_tz::Tz;

use crate::{error::ConversionError, field::Field, options::FieldOptions};

const RFC3339: &str = "RFC 3339";
const ISO8601: &str = "ISO 8601";
const NAIVE_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

pub(crate) fn resolve_zone(name: &str) -> Result<Tz, ConversionError> {
    name.parse::<Tz>()
        .map_err(|_| ConversionError::UnknownTimeZone(name.to_string()))
}

fn time_error(text: &str, layout: &str, source: chrono::ParseError) -> ConversionError {
    ConversionError::Time {
        value: text.to_string(),
        layout: layout.to_string(),
        source,
    }
}

/// Parses `text` with `layout`, filling in what the layout leaves out:
/// midnight for date-only layouts and `zone` (or UTC) when no offset is
/// present.
fn parse_with_layout(
    text: &str,
    layout: &str,
    zone: Option<&str>,
) -> Result<DateTime<FixedOffset>, ConversionError> {
    let zone = zone.map(resolve_zone).transpose()?;

    match DateTime::parse_from_str(text, layout) {
        Ok(parsed) => return Ok(parsed),
        Err(err) if err.kind() != ParseErrorKind::NotEnough => {
            return Err(time_error(text, layout, err));
        }
        Err(_) => {}
    }

    let local = match NaiveDateTime::parse_from_str(text, layout) {
        Ok(parsed) => parsed,
        Err(err) if err.kind() == ParseErrorKind::NotEnough => {
            NaiveDate::parse_from_str(text, layout)
                .map_err(|err| time_error(text, layout, err))?
                .and_time(NaiveTime::MIN)
        }
        Err(err) => return Err(time_error(text, layout, err)),
    };

    // A repeated wall-clock hour resolves to its first occurrence.
    match zone {
        Some(tz) => tz
            .from_local_datetime(&local)
            .earliest()
            .map(|resolved| resolved.fixed_offset())
            .ok_or_else(|| ConversionError::NonexistentTime(text.to_string(), tz.name().to_string())),
        None => Ok(local.and_utc().fixed_offset()),
    }
}

fn format_with_layout<Z>(
    value: &DateTime<Z>,
    layout: &str,
    zone: Option<&str>,
) -> Result<String, ConversionError>
where
    Z: TimeZone,
    Z::Offset: fmt::Display,
{
    let mut out = String::new();
    let written = match zone {
        Some(name) => {
            let tz = resolve_zone(name)?;
            write!(out, "{}", value.with_timezone(&tz).format(layout))
        }
        None => write!(out, "{}", value.format(layout)),
    };
    written.map_err(|_| ConversionError::InvalidLayout(layout.to_string()))?;
    Ok(out)
}

impl Field for DateTime<FixedOffset> {
    fn decode(text: &str, options: &FieldOptions) -> Result<Self, ConversionError> {
        match options.layout() {
            Some(layout) => parse_with_layout(text, layout, options.zone()),
            None => DateTime::parse_from_rfc3339(text).map_err(|err| time_error(text, RFC3339, err)),
        }
    }

    fn encode(&self, options: &FieldOptions) -> Result<String, ConversionError> {
        match options.layout() {
            Some(layout) => format_with_layout(self, layout, options.zone()),
            None => Ok(self.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
        }
    }
}

impl Field for DateTime<Utc> {
    fn decode(text: &str, options: &FieldOptions) -> Result<Self, ConversionError> {
        DateTime::<FixedOffset>::decode(text, options).map(|parsed| parsed.with_timezone(&Utc))
    }

    fn encode(&self, options: &FieldOptions) -> Result<String, ConversionError> {
        match options.layout() {
            Some(layout) => format_with_layout(self, layout, options.zone()),
            None => Ok(self.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
        }
    }
}

/// Naive timestamps are UTC instants without the zone attached.
impl Field for NaiveDateTime {
    fn decode(text: &str, options: &FieldOptions) -> Result<Self, ConversionError> {
        match options.layout() {
            Some(layout) => parse_with_layout(text, layout, options.zone()).map(|dt| dt.naive_utc()),
            None => text
                .parse::<NaiveDateTime>()
                .map_err(|err| time_error(text, ISO8601, err)),
        }
    }

    fn encode(&self, options: &FieldOptions) -> Result<String, ConversionError> {
        match options.layout() {
            Some(layout) => format_with_layout(&self.and_utc(), layout, options.zone()),
            None => Ok(self.format(NAIVE_DATETIME_FORMAT).to_string()),
        }
    }
}

/// Dates are calendar days; the zone only decides which day a timestamp with
/// an explicit offset falls on.
impl Field for NaiveDate {
    fn decode(text: &str, options: &FieldOptions) -> Result<Self, ConversionError> {
        match options.layout() {
            Some(layout) => parse_with_layout(text, layout, options.zone()).map(|dt| dt.date_naive()),
            None => text
                .parse::<NaiveDate>()
                .map_err(|err| time_error(text, ISO8601, err)),
        }
    }

    fn encode(&self, options: &FieldOptions) -> Result<String, ConversionError> {
        match options.layout() {
            Some(layout) => {
                if let Some(name) = options.zone() {
                    resolve_zone(name)?;
                }
                let mut out = String::new();
                write!(out, "{}", self.format(layout))
                    .map_err(|_| ConversionError::InvalidLayout(layout.to_string()))?;
                Ok(out)
            }
            None => Ok(self.to_string()),
        }
    }
}
