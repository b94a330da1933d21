//! Display formatting for computed values

/// Glyph shown for any non-finite result
pub const INFINITY_GLYPH: &str = "∞";

/// Maximum number of fractional digits on the display
pub const MAX_FRACTION_DIGITS: usize = 10;

/// `2^(MAX_FRACTION_DIGITS + 1)`; `x` sits exactly halfway between two
/// display values when `x * TIE_SCALE` is an odd integer
const TIE_SCALE: f64 = 2048.0;

/// Formats a value for the display
///
/// Rounds to [`MAX_FRACTION_DIGITS`] fractional digits, exact halves away
/// from zero, then strips trailing zeros and a trailing decimal point. NaN and infinities render as
/// [`INFINITY_GLYPH`]. A value that rounds to zero renders as `"0"`, never
/// `"-0"`.
#[must_use]
pub fn format_number(n: f64) -> String {
    if !n.is_finite() {
        return INFINITY_GLYPH.to_string();
    }
    let fixed = match round_tie_away(n.abs()) {
        Some(digits) if n < 0.0 => format!("-{digits}"),
        Some(digits) => digits,
        None => format!("{:.*}", MAX_FRACTION_DIGITS, n),
    };
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    match trimmed {
        "-0" | "" => "0".to_string(),
        s => s.to_string(),
    }
}

/// Fixed-point digits of an exact tie, rounded up; `None` if not a tie
///
/// `std` formatting rounds ties to even, which would show `1/2048` as
/// `0.0004882812`.
fn round_tie_away(abs: f64) -> Option<String> {
    let scaled = abs * TIE_SCALE;
    if scaled.fract() != 0.0 || scaled % 2.0 != 1.0 {
        return None;
    }
    // abs * 10^digits == scaled * 5^digits / 2, an odd number of halves
    let digits = MAX_FRACTION_DIGITS as u32;
    let units = (scaled as u128 * 5u128.pow(digits) + 1) / 2;
    let unit = 10u128.pow(digits);
    Some(format!(
        "{}.{:0width$}",
        units / unit,
        units % unit,
        width = MAX_FRACTION_DIGITS
    ))
}

/// Parses display text back into a value
///
/// The infinity glyph (and anything else unparsable) reads as NaN, so it
/// propagates through further arithmetic and renders as the glyph again.
#[must_use]
pub fn parse_display(text: &str) -> f64 {
    text.trim().parse().unwrap_or(f64::NAN)
}
