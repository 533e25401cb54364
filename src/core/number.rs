//! Purpose: Whole-string numeric literal conversion used by the `parseNumber` rule.
//! Exports: `parse_numeric_literal`.
//! Role: Decides whether a string leaf is a number, and which one.
//! Invariants: `None` means "not a number"; a `Some` result is never NaN.
//! Invariants: The token `NaN` and any trailing non-numeric text are rejected.
//! Notes: Surrounding whitespace is tolerated and a blank string converts to zero;
//! the engine protects the exact empty string before this is reached.

/// Converts the entire `input` to a number, or returns `None`.
///
/// Accepted after trimming whitespace:
/// - nothing at all (converts to `0`)
/// - `0x`, `0o`, `0b` prefixed unsigned integers (either letter case)
/// - an optional sign followed by `Infinity` or a decimal literal with
///   optional fraction and exponent
pub fn parse_numeric_literal(input: &str) -> Option<f64> {
    let trimmed = input.trim_matches(is_literal_whitespace);
    if trimmed.is_empty() {
        return Some(0.0);
    }

    if let Some((radix, digits)) = split_radix_prefix(trimmed) {
        return parse_radix_digits(digits, radix);
    }

    let (negative, unsigned) = match trimmed.as_bytes()[0] {
        b'-' => (true, &trimmed[1..]),
        b'+' => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let magnitude = if unsigned == "Infinity" {
        f64::INFINITY
    } else if is_decimal_literal(unsigned) {
        unsigned.parse::<f64>().ok()?
    } else {
        return None;
    };

    Some(if negative { -magnitude } else { magnitude })
}

fn is_literal_whitespace(ch: char) -> bool {
    matches!(
        ch,
        '\u{0009}'
            | '\u{000A}'
            | '\u{000B}'
            | '\u{000C}'
            | '\u{000D}'
            | '\u{0020}'
            | '\u{00A0}'
            | '\u{1680}'
            | '\u{2000}'..='\u{200A}'
            | '\u{2028}'
            | '\u{2029}'
            | '\u{202F}'
            | '\u{205F}'
            | '\u{3000}'
            | '\u{FEFF}'
    )
}

fn split_radix_prefix(text: &str) -> Option<(u32, &str)> {
    let bytes = text.as_bytes();
    if bytes.len() < 2 || bytes[0] != b'0' {
        return None;
    }
    let radix = match bytes[1] {
        b'x' | b'X' => 16,
        b'o' | b'O' => 8,
        b'b' | b'B' => 2,
        _ => return None,
    };
    Some((radix, &text[2..]))
}

fn parse_radix_digits(digits: &str, radix: u32) -> Option<f64> {
    if digits.is_empty() {
        return None;
    }
    let mut exact: Option<u128> = Some(0);
    let mut approx = 0.0_f64;
    for ch in digits.chars() {
        let digit = ch.to_digit(radix)?;
        exact = exact
            .and_then(|acc| acc.checked_mul(u128::from(radix)))
            .and_then(|acc| acc.checked_add(u128::from(digit)));
        approx = approx * f64::from(radix) + f64::from(digit);
    }
    // u128 -> f64 rounds once; the float accumulator is only used past u128.
    Some(exact.map_or(approx, |value| value as f64))
}

/// `digits [ "." digits ] [ ("e" | "E") [sign] digits ]` with at least one
/// mantissa digit on either side of the point.
fn is_decimal_literal(text: &str) -> bool {
    let bytes = text.as_bytes();
    let mut idx = 0;

    let int_start = idx;
    while idx < bytes.len() && bytes[idx].is_ascii_digit() {
        idx += 1;
    }
    let mut mantissa_digits = idx - int_start;

    if idx < bytes.len() && bytes[idx] == b'.' {
        idx += 1;
        let frac_start = idx;
        while idx < bytes.len() && bytes[idx].is_ascii_digit() {
            idx += 1;
        }
        mantissa_digits += idx - frac_start;
    }

    if mantissa_digits == 0 {
        return false;
    }

    if idx < bytes.len() && matches!(bytes[idx], b'e' | b'E') {
        idx += 1;
        if idx < bytes.len() && matches!(bytes[idx], b'+' | b'-') {
            idx += 1;
        }
        let exp_start = idx;
        while idx < bytes.len() && bytes[idx].is_ascii_digit() {
            idx += 1;
        }
        if idx == exp_start {
            return false;
        }
    }

    idx == bytes.len()
}

#[cfg(test)]
mod tests {
    use super::parse_numeric_literal;

    #[test]
    fn integers_and_decimals() {
        assert_eq!(parse_numeric_literal("123"), Some(123.0));
        assert_eq!(parse_numeric_literal("0"), Some(0.0));
        assert_eq!(parse_numeric_literal("-123"), Some(-123.0));
        assert_eq!(parse_numeric_literal("+7"), Some(7.0));
        assert_eq!(parse_numeric_literal("123.45"), Some(123.45));
        assert_eq!(parse_numeric_literal("-123.45"), Some(-123.45));
        assert_eq!(parse_numeric_literal("0.123"), Some(0.123));
        assert_eq!(parse_numeric_literal(".5"), Some(0.5));
        assert_eq!(parse_numeric_literal("5."), Some(5.0));
    }

    #[test]
    fn exponents() {
        assert_eq!(parse_numeric_literal("1e3"), Some(1000.0));
        assert_eq!(parse_numeric_literal("2.5E-1"), Some(0.25));
        assert_eq!(parse_numeric_literal("1e+2"), Some(100.0));
        assert_eq!(parse_numeric_literal("1e400"), Some(f64::INFINITY));
        assert_eq!(parse_numeric_literal("1e"), None);
        assert_eq!(parse_numeric_literal("e5"), None);
        assert_eq!(parse_numeric_literal("1e5.5"), None);
    }

    #[test]
    fn infinity_tokens_are_case_sensitive() {
        assert_eq!(parse_numeric_literal("Infinity"), Some(f64::INFINITY));
        assert_eq!(parse_numeric_literal("+Infinity"), Some(f64::INFINITY));
        assert_eq!(parse_numeric_literal("-Infinity"), Some(f64::NEG_INFINITY));
        assert_eq!(parse_numeric_literal("infinity"), None);
        assert_eq!(parse_numeric_literal("inf"), None);
        assert_eq!(parse_numeric_literal("-inf"), None);
    }

    #[test]
    fn nan_is_never_a_number() {
        assert_eq!(parse_numeric_literal("NaN"), None);
        assert_eq!(parse_numeric_literal("nan"), None);
        assert_eq!(parse_numeric_literal("-NaN"), None);
    }

    #[test]
    fn trailing_or_embedded_garbage_is_rejected() {
        assert_eq!(parse_numeric_literal("123abc"), None);
        assert_eq!(parse_numeric_literal("abc123"), None);
        assert_eq!(parse_numeric_literal("12.34.56"), None);
        assert_eq!(parse_numeric_literal("1_000"), None);
        assert_eq!(parse_numeric_literal("1 2"), None);
        assert_eq!(parse_numeric_literal("."), None);
        assert_eq!(parse_numeric_literal("-"), None);
        assert_eq!(parse_numeric_literal("--1"), None);
    }

    #[test]
    fn surrounding_whitespace_is_tolerated() {
        assert_eq!(parse_numeric_literal(" 123"), Some(123.0));
        assert_eq!(parse_numeric_literal("123 "), Some(123.0));
        assert_eq!(parse_numeric_literal("\t42\n"), Some(42.0));
        assert_eq!(parse_numeric_literal("\u{00A0}8\u{FEFF}"), Some(8.0));
        assert_eq!(parse_numeric_literal("   "), Some(0.0));
    }

    #[test]
    fn radix_prefixes() {
        assert_eq!(parse_numeric_literal("0x1A"), Some(26.0));
        assert_eq!(parse_numeric_literal("0XfF"), Some(255.0));
        assert_eq!(parse_numeric_literal("0o17"), Some(15.0));
        assert_eq!(parse_numeric_literal("0b101"), Some(5.0));
        assert_eq!(parse_numeric_literal("0x"), None);
        assert_eq!(parse_numeric_literal("0b102"), None);
        assert_eq!(parse_numeric_literal("-0x10"), None);
        assert_eq!(parse_numeric_literal("0x1.5"), None);
    }

    #[test]
    fn negative_zero_keeps_its_sign() {
        let value = parse_numeric_literal("-0").expect("number");
        assert_eq!(value, 0.0);
        assert!(value.is_sign_negative());
    }

    #[test]
    fn leading_zeros_are_decimal() {
        assert_eq!(parse_numeric_literal("007"), Some(7.0));
        assert_eq!(parse_numeric_literal("010"), Some(10.0));
    }
}
