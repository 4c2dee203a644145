// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Human-facing complaint ticket numbers.
//!
//! A ticket number is `{year}/{sequence}` where the sequence restarts at 1
//! every calendar year and is rendered zero-padded to four digits. Larger
//! sequences keep their natural width.

use crate::error::DomainError;
use chrono::Datelike;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Earliest year a ticket may carry.
pub const MIN_TICKET_YEAR: i32 = 2000;
/// Latest year a ticket may carry.
pub const MAX_TICKET_YEAR: i32 = 9999;

/// Business time zone used when none is configured.
pub const DEFAULT_TIME_ZONE: &str = "Europe/Istanbul";

/// A sequential complaint ticket number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TicketNumber {
    year: u16,
    sequence: u32,
}

impl TicketNumber {
    /// Creates a ticket number.
    ///
    /// # Arguments
    ///
    /// * `year` - The calendar year the ticket was issued in
    /// * `sequence` - The one-based position within that year
    ///
    /// # Errors
    ///
    /// Returns an error if the year is outside 2000..=9999 or the sequence is zero.
    pub fn new(year: i32, sequence: u32) -> Result<Self, DomainError> {
        if !(MIN_TICKET_YEAR..=MAX_TICKET_YEAR).contains(&year) {
            return Err(DomainError::InvalidTicketYear(year));
        }
        if sequence == 0 {
            return Err(DomainError::InvalidTicketNumber(format!("{year}/0")));
        }
        let year: u16 =
            u16::try_from(year).map_err(|_| DomainError::InvalidTicketYear(year))?;
        Ok(Self { year, sequence })
    }

    /// Parses the display form `YYYY/NNNN`.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a four-digit year, a slash and
    /// a positive sequence of at least four digits.
    pub fn parse(text: &str) -> Result<Self, DomainError> {
        let invalid = || DomainError::InvalidTicketNumber(text.to_string());

        let (year_part, sequence_part) = text.split_once('/').ok_or_else(invalid)?;
        if year_part.len() != 4
            || sequence_part.len() < 4
            || !year_part.chars().all(|c| c.is_ascii_digit())
            || !sequence_part.chars().all(|c| c.is_ascii_digit())
        {
            return Err(invalid());
        }

        let year: i32 = year_part.parse().map_err(|_| invalid())?;
        let sequence: u32 = sequence_part.parse().map_err(|_| invalid())?;
        Self::new(year, sequence)
    }

    /// Returns the ticket year.
    #[must_use]
    pub const fn year(&self) -> u16 {
        self.year
    }

    /// Returns the sequence within the year.
    #[must_use]
    pub const fn sequence(&self) -> u32 {
        self.sequence
    }
}

impl std::fmt::Display for TicketNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{:04}", self.year, self.sequence)
    }
}

/// Resolves an IANA time zone name.
///
/// # Errors
///
/// Returns an error if the name is not a known zone.
pub fn parse_time_zone(name: &str) -> Result<Tz, DomainError> {
    name.parse::<Tz>()
        .map_err(|_| DomainError::UnknownTimeZone(name.to_string()))
}

/// Computes the ticket year of an instant in the business time zone.
///
/// Near midnight on 31 December the UTC year and the local year differ;
/// the local year wins.
///
/// # Errors
///
/// Returns an error if the instant cannot be represented or falls outside
/// the supported ticket years.
pub fn ticket_year(instant: OffsetDateTime, zone: Tz) -> Result<i32, DomainError> {
    let utc: chrono::DateTime<chrono::Utc> =
        chrono::DateTime::from_timestamp(instant.unix_timestamp(), instant.nanosecond())
            .ok_or_else(|| DomainError::DateParseError {
                date_string: instant.to_string(),
                error: String::from("instant out of range"),
            })?;
    let year: i32 = utc.with_timezone(&zone).year();
    if !(MIN_TICKET_YEAR..=MAX_TICKET_YEAR).contains(&year) {
        return Err(DomainError::InvalidTicketYear(year));
    }
    Ok(year)
}
