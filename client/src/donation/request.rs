use std::str::FromStr;

use alloy_primitives::{utils::parse_units, U256};
use rust_decimal::Decimal;

use crate::{utils::error::ErrorKind, Error, Result};

/// Longest cause accepted, in characters, after trimming.
pub const MAX_CAUSE_LENGTH: usize = 200;

/// Donation input that passed every local check.
///
/// Building one never touches the wallet, so bad input is rejected before
/// any prompt appears.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DonationRequest {
    /// Display units, trimmed, with a bare leading or trailing point
    /// completed (`.5` becomes `0.5`).
    pub amount: String,
    /// `amount` in the currency's smallest unit.
    pub base_units: U256,
    /// Trimmed cause.
    pub cause: String,
}

impl DonationRequest {
    /// Validates the amount first, then the cause.
    pub fn parse(amount: &str, cause: &str, decimals: u8) -> Result<Self> {
        let (amount, base_units) = parse_amount(amount, decimals)?;
        let cause = parse_cause(cause)?;

        Ok(Self {
            amount,
            base_units,
            cause,
        })
    }
}

/// Plain decimal notation only: digits with at most one point. Signs,
/// exponents and digit separators are rejected.
fn parse_amount(amount: &str, decimals: u8) -> Result<(String, U256)> {
    let invalid = || {
        Error::donation(
            ErrorKind::InvalidAmount,
            "Please enter a positive donation amount.",
        )
    };

    let amount = amount.trim();
    let (whole, fraction) = amount.split_once('.').unwrap_or((amount, ""));
    let is_digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
    if (whole.is_empty() && fraction.is_empty()) || !is_digits(whole) || !is_digits(fraction) {
        return Err(invalid());
    }
    let amount = match (whole.is_empty(), fraction.is_empty()) {
        (true, _) => format!("0.{fraction}"),
        (false, true) => whole.to_owned(),
        (false, false) => amount.to_owned(),
    };

    let value = Decimal::from_str(&amount).map_err(|_| invalid())?;
    if value.is_zero() || value.is_sign_negative() {
        return Err(invalid());
    }

    if value.scale() > u32::from(decimals) {
        return Err(Error::donation(
            ErrorKind::InvalidAmount,
            format!("Amounts can have at most {decimals} decimal places."),
        ));
    }

    let base_units = parse_units(&amount, decimals)
        .map_err(|_| invalid())?
        .get_absolute();
    if base_units.is_zero() {
        return Err(invalid());
    }

    Ok((amount, base_units))
}

fn parse_cause(cause: &str) -> Result<String> {
    let cause = cause.trim();
    if cause.is_empty() {
        return Err(Error::donation(
            ErrorKind::EmptyCause,
            "Please describe the cause you're donating to.",
        ));
    }

    if cause.chars().count() > MAX_CAUSE_LENGTH {
        return Err(Error::donation(
            ErrorKind::CauseTooLong,
            format!("Please keep the cause description under {MAX_CAUSE_LENGTH} characters."),
        ));
    }

    Ok(cause.to_owned())
}
