//! Raw-amount <-> decimal-string conversion
//!
//! Token amounts cross the API boundary as human decimal strings ("10.5")
//! and travel internally as raw smallest-unit `U256`. Conversions work in
//! the digit-string domain so no power-of-ten intermediate can overflow
//! and no float ever touches a submitted amount. Excess fractional digits
//! are truncated, never rounded.

use ethereum_types::U256;

use crate::error::AmmError;

/// Parse a decimal amount string into raw smallest units.
pub fn parse_units(amount: &str, decimals: u8) -> Result<U256, AmmError> {
    let trimmed = amount.trim();
    let invalid = || AmmError::InvalidAmount(amount.to_string());

    if trimmed.is_empty() || trimmed.starts_with('+') || trimmed.starts_with('-') {
        return Err(invalid());
    }

    let (int_part, frac_part) = match trimmed.split_once('.') {
        Some((i, f)) => (i, f),
        None => (trimmed, ""),
    };
    if int_part.is_empty() && frac_part.is_empty() {
        return Err(invalid());
    }
    if !int_part.chars().all(|c| c.is_ascii_digit())
        || !frac_part.chars().all(|c| c.is_ascii_digit())
    {
        return Err(invalid());
    }

    let decimals = decimals as usize;
    let mut digits = String::with_capacity(int_part.len() + decimals);
    digits.push_str(int_part);
    let frac_kept = &frac_part[..frac_part.len().min(decimals)];
    digits.push_str(frac_kept);
    for _ in frac_kept.len()..decimals {
        digits.push('0');
    }
    if digits.is_empty() {
        // decimals == 0 and only fractional digits were supplied
        return Ok(U256::zero());
    }

    U256::from_dec_str(&digits).map_err(|_| invalid())
}

/// Render a raw amount as an exact decimal string, trailing zeros trimmed.
pub fn format_units(amount: U256, decimals: u8) -> String {
    let digits = amount.to_string();
    let decimals = decimals as usize;
    if decimals == 0 {
        return digits;
    }

    let (int_part, frac_part) = if digits.len() > decimals {
        let split = digits.len() - decimals;
        (digits[..split].to_string(), digits[split..].to_string())
    } else {
        let mut frac = "0".repeat(decimals - digits.len());
        frac.push_str(&digits);
        ("0".to_string(), frac)
    };

    let frac_trimmed = frac_part.trim_end_matches('0');
    if frac_trimmed.is_empty() {
        int_part
    } else {
        format!("{int_part}.{frac_trimmed}")
    }
}

/// Render with at most `max_dp` fractional digits (truncating), for
/// reserve and balance readouts.
pub fn format_units_dp(amount: U256, decimals: u8, max_dp: usize) -> String {
    let exact = format_units(amount, decimals);
    match exact.split_once('.') {
        Some((int_part, frac)) if frac.len() > max_dp => {
            let kept = frac[..max_dp].trim_end_matches('0');
            if kept.is_empty() {
                int_part.to_string()
            } else {
                format!("{int_part}.{kept}")
            }
        }
        _ => exact,
    }
}

/// Lossy display-unit value for plotting and rate readouts. Never use the
/// result in submitted amounts.
pub fn to_display(amount: U256, decimals: u8) -> f64 {
    amount.to_string().parse::<f64>().unwrap_or(f64::INFINITY) / 10f64.powi(decimals as i32)
}
