// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Contact details: country dialing rules, phone numbers and email addresses.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Countries whose phone numbers the desk can store and format.
///
/// Each country carries a dial code and a display mask where `#`
/// stands for one digit of the national number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Country {
    /// Türkiye.
    #[default]
    TR,
    /// Germany.
    DE,
    /// France.
    FR,
    /// United Kingdom.
    UK,
    /// United States.
    US,
    /// Netherlands.
    NL,
    /// Italy.
    IT,
    /// Spain.
    ES,
    /// Russia.
    RU,
    /// Azerbaijan.
    AZ,
}

impl Country {
    /// Every supported country.
    pub const ALL: [Self; 10] = [
        Self::TR,
        Self::DE,
        Self::FR,
        Self::UK,
        Self::US,
        Self::NL,
        Self::IT,
        Self::ES,
        Self::RU,
        Self::AZ,
    ];

    /// Converts this country to its two-letter code.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::TR => "TR",
            Self::DE => "DE",
            Self::FR => "FR",
            Self::UK => "UK",
            Self::US => "US",
            Self::NL => "NL",
            Self::IT => "IT",
            Self::ES => "ES",
            Self::RU => "RU",
            Self::AZ => "AZ",
        }
    }

    /// International dialing prefix.
    #[must_use]
    pub const fn dial_code(&self) -> &'static str {
        match self {
            Self::TR => "+90",
            Self::DE => "+49",
            Self::FR => "+33",
            Self::UK => "+44",
            Self::US => "+1",
            Self::NL => "+31",
            Self::IT => "+39",
            Self::ES => "+34",
            Self::RU => "+7",
            Self::AZ => "+994",
        }
    }

    /// Display mask for the national number.
    #[must_use]
    pub const fn mask(&self) -> &'static str {
        match self {
            Self::TR => "(###) ### ## ##",
            Self::DE | Self::IT => "### #######",
            Self::FR => "# ## ## ## ##",
            Self::UK => "#### ######",
            Self::US => "(###) ###-####",
            Self::NL => "## ########",
            Self::ES => "### ### ###",
            Self::RU => "(###) ###-##-##",
            Self::AZ => "(##) ### ## ##",
        }
    }

    /// Number of national digits the mask expects.
    #[must_use]
    pub fn digit_count(&self) -> usize {
        self.mask().chars().filter(|c| *c == '#').count()
    }
}

impl FromStr for Country {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|country| country.as_str() == s)
            .ok_or_else(|| DomainError::UnknownCountry(s.to_string()))
    }
}

/// A phone number stored as country plus national digits.
///
/// The formatted form is always derived from the raw digits, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PhoneNumber {
    country: Country,
    digits: String,
}

impl PhoneNumber {
    /// Parses free-form input into a phone number for the given country.
    ///
    /// Every non-digit character is discarded. A leading national trunk
    /// `0` is dropped when the remaining digits fit the mask exactly.
    ///
    /// # Errors
    ///
    /// Returns an error if the digit count does not match the country's mask.
    pub fn parse(country: Country, input: &str) -> Result<Self, DomainError> {
        let mut digits: String = input.chars().filter(char::is_ascii_digit).collect();
        let expected: usize = country.digit_count();

        if digits.len() == expected + 1 && digits.starts_with('0') {
            digits.remove(0);
        }

        if digits.len() != expected {
            return Err(DomainError::InvalidPhoneNumber {
                country: country.as_str().to_string(),
                reason: format!("expected {expected} digits, found {}", digits.len()),
            });
        }

        Ok(Self { country, digits })
    }

    /// Returns the country.
    #[must_use]
    pub const fn country(&self) -> Country {
        self.country
    }

    /// Returns the raw national digits.
    #[must_use]
    pub fn digits(&self) -> &str {
        &self.digits
    }

    /// Renders the number as `+<dial> <masked digits>`.
    #[must_use]
    pub fn formatted(&self) -> String {
        let mut digits = self.digits.chars();
        let masked: String = self
            .country
            .mask()
            .chars()
            .map(|c| {
                if c == '#' {
                    digits.next().unwrap_or(' ')
                } else {
                    c
                }
            })
            .collect();
        format!("{} {}", self.country.dial_code(), masked.trim_end())
    }
}

impl std::fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.formatted())
    }
}

/// An email address.
///
/// Validation is structural only: one `@`, a non-empty local part and a
/// dotted domain without empty labels. The value is stored lowercased.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EmailAddress {
    value: String,
}

impl EmailAddress {
    /// Parses and normalizes an email address.
    ///
    /// # Errors
    ///
    /// Returns an error if the address is structurally invalid.
    pub fn parse(input: &str) -> Result<Self, DomainError> {
        let trimmed: &str = input.trim();
        let invalid = || DomainError::InvalidEmail(trimmed.to_string());

        if trimmed.len() > 254 || trimmed.chars().any(char::is_whitespace) {
            return Err(invalid());
        }

        let (local, domain) = trimmed.split_once('@').ok_or_else(invalid)?;
        if local.is_empty() || domain.contains('@') || !domain.contains('.') {
            return Err(invalid());
        }
        if domain
            .split('.')
            .any(|label| label.is_empty() || label.starts_with('-') || label.ends_with('-'))
        {
            return Err(invalid());
        }

        Ok(Self {
            value: trimmed.to_lowercase(),
        })
    }

    /// Returns the normalized address.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

impl std::fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.value)
    }
}
