use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::error::AppError;

const ADDRESS_HEX_LEN: usize = 40;

/// A validated L1 account address: `0x` followed by 40 hex characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Address(String);

impl Address {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_valid(raw: &str) -> bool {
        raw.strip_prefix("0x").is_some_and(|hex| {
            hex.len() == ADDRESS_HEX_LEN && hex.chars().all(|c| c.is_ascii_hexdigit())
        })
    }
}

impl FromStr for Address {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if Self::is_valid(trimmed) {
            Ok(Self(trimmed.to_string()))
        } else {
            Err(AppError::InvalidAddress(trimmed.to_string()))
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Splits free text on line breaks and keeps only valid addresses, in order.
pub fn parse_address_list(raw: &str) -> Vec<Address> {
    raw.lines().filter_map(|line| line.parse().ok()).collect()
}

/// Active address list plus the refresh counter that invalidates every card.
#[derive(Debug, Default, Clone)]
pub struct AddressList {
    input: String,
    addresses: Vec<Address>,
    refresh: u64,
}

impl AddressList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the active list and bumps the refresh counter, even when the
    /// list is unchanged. Returns the new counter value.
    pub fn submit(&mut self, raw: &str) -> u64 {
        self.input = raw.to_string();
        self.addresses = parse_address_list(raw);
        self.refresh += 1;
        self.refresh
    }

    /// Resubmits the last text as-is.
    pub fn resubmit(&mut self) -> u64 {
        let input = std::mem::take(&mut self.input);
        self.submit(&input)
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn addresses(&self) -> &[Address] {
        &self.addresses
    }

    pub fn refresh(&self) -> u64 {
        self.refresh
    }
}
