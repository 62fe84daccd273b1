//! Value-to-text conversion for display slots.
//!
//! Two fallback conventions live side by side because they back different
//! surfaces:
//!
//! - **Dash fallback** ([`number`]) for the metrics surface: a missing or
//!   non-finite value renders as [`PLACEHOLDER`].
//! - **Zero fallback** ([`currency`], [`percent`], [`fixed`]) for the balance
//!   surface: a missing or non-finite value renders as zero.
//!
//! Output always uses en-US conventions (`,` grouping, `.` decimal point,
//! `$` currency) regardless of the host locale.

/// Shown in place of a missing value on dash-fallback surfaces.
pub const PLACEHOLDER: &str = "—";

/// Default maximum fraction digits for [`number_default`].
pub const DEFAULT_FRACTION_DIGITS: usize = 2;

/// Grouped number with at most `max_fraction_digits` decimals, trailing
/// zeros trimmed. Missing or non-finite values give [`PLACEHOLDER`].
pub fn number(value: Option<f64>, max_fraction_digits: usize) -> String {
    match value.filter(|v| v.is_finite()) {
        Some(v) => {
            let (negative, body) = grouped(v, max_fraction_digits, true);
            signed(negative, "", &body)
        }
        None => PLACEHOLDER.to_string(),
    }
}

/// [`number`] with two fraction digits.
pub fn number_default(value: Option<f64>) -> String {
    number(value, DEFAULT_FRACTION_DIGITS)
}

/// Two-decimal dollar amount; missing is `$0.00`.
pub fn currency(value: Option<f64>) -> String {
    let (negative, body) = grouped(or_zero(value), 2, false);
    signed(negative, "$", &body)
}

/// One-decimal percentage of a value the caller already scaled to percent.
///
/// `percent(Some(55.5))` is `"55.5%"`; a 0..1 ratio must be multiplied by
/// 100 first. Missing is `0.0%`.
pub fn percent(value: Option<f64>) -> String {
    let (negative, body) = grouped(or_zero(value), 1, false);
    format!("{}%", signed(negative, "", &body))
}

/// Fixed-precision grouped number; missing is zero.
pub fn fixed(value: Option<f64>, digits: usize) -> String {
    let (negative, body) = grouped(or_zero(value), digits, false);
    signed(negative, "", &body)
}

/// Text slot value with dash fallback for missing or blank text.
pub fn text(value: Option<&str>) -> String {
    match value.map(str::trim) {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => PLACEHOLDER.to_string(),
    }
}

fn or_zero(value: Option<f64>) -> f64 {
    value.filter(|v| v.is_finite()).unwrap_or(0.0)
}

fn signed(negative: bool, symbol: &str, body: &str) -> String {
    if negative {
        format!("-{}{}", symbol, body)
    } else {
        format!("{}{}", symbol, body)
    }
}

/// Round to `digits` decimals and group the integer part.
///
/// Returns the sign separately so currency can put it before the symbol.
/// A value that rounds to zero is never negative.
fn grouped(value: f64, digits: usize, trim: bool) -> (bool, String) {
    let rendered = format!("{:.*}", digits, value.abs());
    let (int_part, frac_part) = rendered.split_once('.').unwrap_or((rendered.as_str(), ""));
    let frac = if trim {
        frac_part.trim_end_matches('0')
    } else {
        frac_part
    };

    let is_zero = rendered.bytes().all(|b| b == b'0' || b == b'.');
    let negative = value < 0.0 && !is_zero;

    let mut body = group_thousands(int_part);
    if !frac.is_empty() {
        body.push('.');
        body.push_str(frac);
    }
    (negative, body)
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
