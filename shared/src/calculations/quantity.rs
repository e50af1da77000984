//! Free-text quantity parsing

use rust_decimal::Decimal;
use std::str::FromStr;

fn digits_from(bytes: &[u8], start: usize) -> usize {
    bytes
        .get(start..)
        .map(|rest| rest.iter().take_while(|b| b.is_ascii_digit()).count())
        .unwrap_or(0)
}

/// Split the leading number off `text` into `(mantissa, exponent)`.
///
/// Matches `[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?` at the start; an `e`
/// without digits after it is not part of the number.
fn numeric_prefix(text: &str) -> Option<(&str, Option<&str>)> {
    let bytes = text.as_bytes();
    let sign = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));

    let whole = digits_from(bytes, sign);
    let mut end = sign + whole;
    if bytes.get(end) == Some(&b'.') {
        let fraction = digits_from(bytes, end + 1);
        if whole == 0 && fraction == 0 {
            return None;
        }
        end += 1 + fraction;
    } else if whole == 0 {
        return None;
    }

    let mantissa = &text[..end];
    if !matches!(bytes.get(end), Some(b'e' | b'E')) {
        return Some((mantissa, None));
    }

    let exp_sign = usize::from(matches!(bytes.get(end + 1), Some(b'+' | b'-')));
    let exp_digits = digits_from(bytes, end + 1 + exp_sign);
    if exp_digits == 0 {
        return Some((mantissa, None));
    }
    Some((mantissa, Some(&text[end + 1..end + 1 + exp_sign + exp_digits])))
}

/// Parse a quantity typed into a form field.
///
/// Reads the longest leading number, so `"25g"` is 25 and `"1_000"` is 1.
/// Leading whitespace is ignored and scientific notation (`"1.25e1"`) is
/// accepted. Returns `None` when the text does not start with a number or
/// the number does not fit a `Decimal`.
pub fn try_parse_qty(text: &str) -> Option<Decimal> {
    let (mantissa, exponent) = numeric_prefix(text.trim_start())?;

    let unsigned = mantissa.trim_start_matches(['+', '-']);
    let negative = mantissa.starts_with('-');
    let unsigned = unsigned.strip_suffix('.').unwrap_or(unsigned);
    let normalized = format!(
        "{}{}{}",
        if negative { "-" } else { "" },
        if unsigned.starts_with('.') { "0" } else { "" },
        unsigned
    );

    match exponent {
        None => Decimal::from_str(&normalized).ok(),
        Some(exp) => {
            let exp = exp.strip_prefix('+').unwrap_or(exp);
            Decimal::from_scientific(&format!("{}e{}", normalized, exp)).ok()
        }
    }
}

/// Parse a quantity, reading anything unparseable as zero.
///
/// Live calculations run while fields are blank or half-typed, so this
/// never fails and never rejects negatives.
pub fn parse_qty(text: &str) -> Decimal {
    try_parse_qty(text).unwrap_or(Decimal::ZERO)
}
