// Display formatting for balances, USD values and profit/loss

use crate::models::PlTone;
use num_format::{Locale, ToFormattedString};
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

fn fixed(decimal: Decimal, digits: u32) -> String {
    let rounded = decimal.round_dp_with_strategy(digits, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.*}", digits as usize, rounded)
}

/// Round the shortest decimal form of `value` to `digits` places, ties away
/// from zero, the way locale number formatting does
fn round_shortest(value: f64, digits: u32) -> String {
    match Decimal::from_str(&value.to_string()) {
        Ok(decimal) => fixed(decimal, digits),
        Err(_) => format!("{:.*}", digits as usize, value),
    }
}

/// Round the exact binary value of `value` to `digits` places, ties away from zero
fn round_exact(value: f64, digits: u32) -> String {
    match Decimal::from_f64_retain(value) {
        Some(decimal) => fixed(decimal, digits),
        None => format!("{:.*}", digits as usize, value),
    }
}

/// Group the integer part of a plain decimal string with `,` and trim
/// trailing fraction zeros down to `min_fraction` digits
fn group_thousands(number: &str, min_fraction: usize) -> String {
    let (sign, unsigned) = match number.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", number),
    };
    let (int_part, frac_part) = unsigned.split_once('.').unwrap_or((unsigned, ""));

    let grouped = match int_part.parse::<u128>() {
        Ok(int) => int.to_formatted_string(&Locale::en),
        Err(_) => int_part.to_string(),
    };
    let trimmed = frac_part.trim_end_matches('0');
    let frac = if trimmed.len() < min_fraction {
        &frac_part[..min_fraction.min(frac_part.len())]
    } else {
        trimmed
    };

    if frac.is_empty() {
        format!("{}{}", sign, grouped)
    } else {
        format!("{}{}.{}", sign, grouped, frac)
    }
}

/// Drop trailing fractional zeros, and the point itself if nothing is left
fn trim_fraction(fixed: String) -> String {
    if !fixed.contains('.') {
        return fixed;
    }
    fixed.trim_end_matches('0').trim_end_matches('.').to_string()
}

/// Token balance: `0`, `< 0.0001`, or grouped with up to 4 fraction digits
pub fn format_balance(balance: f64) -> String {
    if balance == 0.0 {
        return "0".to_string();
    }
    if balance < 0.0001 {
        return "< 0.0001".to_string();
    }
    group_thousands(&round_shortest(balance, 4), 0)
}

/// USD amount: `$0.00`, up to 8 or 6 significant fraction digits for dust,
/// otherwise exactly 2 fraction digits, grouped
pub fn format_usd(value: f64) -> String {
    if value == 0.0 {
        return "$0.00".to_string();
    }
    if value < 0.0001 {
        return format!("${}", trim_fraction(round_exact(value, 8)));
    }
    if value < 0.01 {
        return format!("${}", trim_fraction(round_exact(value, 6)));
    }
    format!("${}", group_thousands(&round_shortest(value, 2), 2))
}

/// Profit/loss of the current price against a cost basis, in percent.
/// Defined only for a positive cost and a known, non-zero price.
pub fn calculate_pl(price: Option<f64>, cost: f64) -> Option<f64> {
    match price {
        Some(price) if cost > 0.0 && price != 0.0 && price.is_finite() => {
            Some((price - cost) / cost * 100.0)
        }
        _ => None,
    }
}

/// Sign-prefixed two-decimal percentage plus a styling tone; `-` when unavailable
pub fn format_pl(pl_percent: Option<f64>) -> (String, PlTone) {
    match pl_percent {
        None => ("-".to_string(), PlTone::Neutral),
        Some(pl) if pl >= 0.0 => (format!("+{}%", round_shortest(pl, 2)), PlTone::Positive),
        Some(pl) => (format!("{}%", round_shortest(pl, 2)), PlTone::Negative),
    }
}

/// `0x06a9...d486`
pub fn short_address(address: &str) -> String {
    if address.len() <= 10 {
        return address.to_string();
    }
    format!("{}...{}", &address[..6], &address[address.len() - 4..])
}
