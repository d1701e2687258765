//! Exact rational values, the only type a stack can hold.
//!
//! Every value is a [`BigRational`], which is always kept in lowest terms with a
//! positive denominator. Comparison and ordering therefore work on the canonical
//! form, so `2/1`, `4/2` and `2` are the same value (and the same stack id).
use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};

/// A stack value.
pub type Value = BigRational;

/// Parse a rational literal.
///
/// Accepted forms are `[+-]digits`, `[+-]digits/digits` and decimals such as
/// `1.25`, `.5` or `5.`, where the integer and decimal forms may carry an
/// exponent (`1e3`, `2.5E-2`). Digit groups may be separated by single
/// underscores (`1_000`). Surrounding whitespace and whitespace around the `/`
/// are ignored. Returns [`None`] for anything else, including a zero
/// denominator.
pub fn parse_value(text: &str) -> Option<Value> {
    let text = text.trim();
    let (negative, body) = split_sign(text);

    let value = if let Some((numer, denom)) = body.split_once('/') {
        let numer = parse_digits(numer.trim_end())?;
        let denom = parse_digits(denom.trim_start())?;
        if denom.is_zero() {
            return None;
        }
        BigRational::new(numer, denom)
    } else {
        match body.split_once(['e', 'E']) {
            Some((mantissa, exponent)) => scale_by_exponent(parse_decimal(mantissa)?, exponent)?,
            None => parse_decimal(body)?,
        }
    };

    Some(if negative { -value } else { value })
}

fn split_sign(text: &str) -> (bool, &str) {
    match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    }
}

fn parse_decimal(text: &str) -> Option<Value> {
    let Some((whole, fraction)) = text.split_once('.') else {
        return Some(BigRational::from_integer(parse_digits(text)?));
    };
    if whole.is_empty() && fraction.is_empty() {
        return None;
    }
    let whole = if whole.is_empty() { BigInt::zero() } else { parse_digits(whole)? };
    let fraction_digits = if fraction.is_empty() { BigInt::zero() } else { parse_digits(fraction)? };
    let places = fraction.bytes().filter(u8::is_ascii_digit).count();
    let scale = num_traits::pow(BigInt::from(10u8), places);
    Some(BigRational::new(whole * &scale + fraction_digits, scale))
}

fn scale_by_exponent(value: Value, exponent: &str) -> Option<Value> {
    let (negative, digits) = split_sign(exponent);
    let places = parse_digits(digits)?.to_u32()?;
    let scale = BigRational::from_integer(num_traits::pow(BigInt::from(10u8), places as usize));
    Some(if negative { value / scale } else { value * scale })
}

/// ASCII digits, optionally in groups joined by single underscores.
fn parse_digits(text: &str) -> Option<BigInt> {
    let well_formed = text.split('_').all(|group| !group.is_empty() && group.bytes().all(|b| b.is_ascii_digit()));
    if !well_formed {
        return None;
    }
    text.replace('_', "").parse().ok()
}

/// The canonical text of a value: an integer when the denominator is 1,
/// `num/den` otherwise.
pub fn render(value: &Value) -> String {
    if value.denom().is_one() {
        value.numer().to_string()
    } else {
        format!("{}/{}", value.numer(), value.denom())
    }
}

/// `floor(a / b)`, or [`None`] if `b` is zero.
pub fn floor_div(a: &Value, b: &Value) -> Option<Value> {
    if b.is_zero() {
        return None;
    }
    let quotient = a / b;
    Some(BigRational::from_integer(quotient.numer().div_floor(quotient.denom())))
}

/// `a - b * floor(a / b)`. The result has the sign of `b`.
pub fn floor_mod(a: &Value, b: &Value) -> Option<Value> {
    let quotient = floor_div(a, b)?;
    Some(a - b * quotient)
}

/// The value as an `i64`, if it is an integer within range.
pub fn to_exact_i64(value: &Value) -> Option<i64> {
    if !value.is_integer() {
        return None;
    }
    value.numer().to_i64()
}

/// The value truncated toward zero, as an `i64` if it fits.
pub fn to_truncated_i64(value: &Value) -> Option<i64> {
    (value.numer() / value.denom()).to_i64()
}

/// The character whose code point is the value truncated toward zero.
pub fn to_char(value: &Value) -> Option<char> {
    let code = value.numer() / value.denom();
    if code.is_negative() {
        return None;
    }
    code.to_u32().and_then(char::from_u32)
}

/// The code point of `c` as a value.
pub fn from_char(c: char) -> Value {
    BigRational::from_integer(BigInt::from(c as u32))
}

/// An integer value.
pub fn from_i64(value: i64) -> Value {
    BigRational::from_integer(BigInt::from(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ratio(numer: i64, denom: i64) -> Value {
        BigRational::new(BigInt::from(numer), BigInt::from(denom))
    }

    #[test]
    fn test_parse_integers() {
        assert_eq!(parse_value("0"), Some(from_i64(0)));
        assert_eq!(parse_value("42"), Some(from_i64(42)));
        assert_eq!(parse_value("-7"), Some(from_i64(-7)));
        assert_eq!(parse_value("+7"), Some(from_i64(7)));
        assert_eq!(parse_value("  12\n"), Some(from_i64(12)));

        let huge = parse_value("123456789012345678901234567890").unwrap();
        assert_eq!(render(&huge), "123456789012345678901234567890");
    }

    #[test]
    fn test_parse_fractions() {
        assert_eq!(parse_value("1/3"), Some(ratio(1, 3)));
        assert_eq!(parse_value("-2/4"), Some(ratio(-1, 2)));
        assert_eq!(parse_value("6/3"), Some(from_i64(2)));
        assert_eq!(parse_value("2/1"), parse_value("2"));
        assert_eq!(parse_value("1/0"), None);
        assert_eq!(parse_value("1/-2"), None);
        assert_eq!(parse_value("/2"), None);
        assert_eq!(parse_value("1/"), None);
    }

    #[test]
    fn test_parse_decimals() {
        assert_eq!(parse_value("1.25"), Some(ratio(5, 4)));
        assert_eq!(parse_value(".5"), Some(ratio(1, 2)));
        assert_eq!(parse_value("5."), Some(from_i64(5)));
        assert_eq!(parse_value("-0.1"), Some(ratio(-1, 10)));
        assert_eq!(parse_value("."), None);
        assert_eq!(parse_value("1.2.3"), None);
    }

    #[test]
    fn test_parse_exponents() {
        assert_eq!(parse_value("1e3"), Some(from_i64(1000)));
        assert_eq!(parse_value("1.5E-2"), Some(ratio(3, 200)));
        assert_eq!(parse_value("-2e+1"), Some(from_i64(-20)));
        assert_eq!(parse_value("5.e0"), Some(from_i64(5)));
        assert_eq!(parse_value(".5e1"), Some(from_i64(5)));
        assert_eq!(parse_value("1e"), None);
        assert_eq!(parse_value(".e1"), None);
        assert_eq!(parse_value("1e2e3"), None);
        assert_eq!(parse_value("1e1.5"), None);
        assert_eq!(parse_value("1/2e3"), None);
        assert_eq!(parse_value("1e99999999999"), None);
    }

    #[test]
    fn test_parse_underscores_and_spaced_slash() {
        assert_eq!(parse_value("1_000"), Some(from_i64(1000)));
        assert_eq!(parse_value("0.000_1"), Some(ratio(1, 10000)));
        assert_eq!(parse_value("1_0/2_0"), Some(ratio(1, 2)));
        assert_eq!(parse_value("1e1_0"), parse_value("10000000000"));
        assert_eq!(parse_value("_1"), None);
        assert_eq!(parse_value("1_"), None);
        assert_eq!(parse_value("1._5"), None);

        assert_eq!(parse_value("3 / 4"), Some(ratio(3, 4)));
        assert_eq!(parse_value(" -1\t/\t2 "), Some(ratio(-1, 2)));
        assert_eq!(parse_value("- 1/2"), None);
    }

    #[test]
    fn test_parse_words() {
        for word in ["", "+", "-", "/", "//", "%", "dup", "end", "1a", "0x10", "e3", "- 1", "_", "1__0"] {
            assert_eq!(parse_value(word), None, "{word:?}");
        }
    }

    #[test]
    fn test_render() {
        assert_eq!(render(&from_i64(7)), "7");
        assert_eq!(render(&from_i64(-7)), "-7");
        assert_eq!(render(&ratio(1, 3)), "1/3");
        assert_eq!(render(&ratio(2, -6)), "-1/3");
    }

    #[test]
    fn test_floor_div_and_mod() {
        assert_eq!(floor_div(&from_i64(7), &from_i64(2)), Some(from_i64(3)));
        assert_eq!(floor_div(&from_i64(-7), &from_i64(2)), Some(from_i64(-4)));
        assert_eq!(floor_div(&ratio(7, 2), &ratio(1, 3)), Some(from_i64(10)));
        assert_eq!(floor_div(&from_i64(1), &from_i64(0)), None);

        assert_eq!(floor_mod(&from_i64(7), &from_i64(3)), Some(from_i64(1)));
        assert_eq!(floor_mod(&from_i64(-7), &from_i64(3)), Some(from_i64(2)));
        assert_eq!(floor_mod(&from_i64(7), &from_i64(-3)), Some(from_i64(-2)));
        assert_eq!(floor_mod(&ratio(7, 2), &from_i64(1)), Some(ratio(1, 2)));
        assert_eq!(floor_mod(&from_i64(1), &from_i64(0)), None);
    }

    #[test]
    fn test_integer_conversions() {
        assert_eq!(to_exact_i64(&from_i64(-3)), Some(-3));
        assert_eq!(to_exact_i64(&ratio(1, 2)), None);
        assert_eq!(to_exact_i64(&parse_value("99999999999999999999").unwrap()), None);

        assert_eq!(to_truncated_i64(&ratio(7, 2)), Some(3));
        assert_eq!(to_truncated_i64(&ratio(-7, 2)), Some(-3));

        assert_eq!(to_char(&from_i64(65)), Some('A'));
        assert_eq!(to_char(&ratio(131, 2)), Some('A'));
        assert_eq!(to_char(&from_i64(-1)), None);
        assert_eq!(to_char(&from_i64(0xD800)), None);
        assert_eq!(from_char('é'), from_i64(233));
    }
}
