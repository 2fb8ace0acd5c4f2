// Fixed-point remainder arithmetic for `multipleOf`

use serde_json::Number;

/// Largest number of fractional digits handled exactly.
///
/// Operands needing more digits, or whose aligned mantissas overflow `i128`,
/// fall back to a floating-point quotient test.
pub const MAX_SCALE: u32 = 28;

const FALLBACK_TOLERANCE: f64 = 1e-9;

/// A decimal number `mantissa * 10^-scale`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Decimal {
    mantissa: i128,
    scale: u32,
}

impl Decimal {
    /// Parse JSON number text such as `-12`, `0.0075` or `1e-5`
    fn parse(text: &str) -> Option<Self> {
        let (body, exponent) = match text.find(['e', 'E']) {
            Some(pos) => (&text[..pos], text[pos + 1..].parse::<i32>().ok()?),
            None => (text, 0),
        };
        let (negative, body) = match body.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, body),
        };
        let (int_part, frac_part) = body.split_once('.').unwrap_or((body, ""));
        if int_part.is_empty()
            || !int_part
                .chars()
                .chain(frac_part.chars())
                .all(|c| c.is_ascii_digit())
        {
            return None;
        }

        let frac_part = frac_part.trim_end_matches('0');
        let mut mantissa: i128 = 0;
        for digit in int_part.bytes().chain(frac_part.bytes()) {
            mantissa = mantissa.checked_mul(10)?.checked_add(i128::from(digit - b'0'))?;
        }

        let mut scale = i64::try_from(frac_part.len()).ok()? - i64::from(exponent);
        if scale < 0 {
            mantissa = mantissa.checked_mul(10i128.checked_pow(u32::try_from(-scale).ok()?)?)?;
            scale = 0;
        }
        let scale = u32::try_from(scale).ok()?;
        if scale > MAX_SCALE {
            return None;
        }
        Some(Self {
            mantissa: if negative { -mantissa } else { mantissa },
            scale,
        })
    }

    /// Mantissa rescaled to `scale` fractional digits
    fn rescaled(self, scale: u32) -> Option<i128> {
        self.mantissa.checked_mul(10i128.checked_pow(scale - self.scale)?)
    }
}

/// Whether `value` is an integer multiple of `divisor`.
///
/// Zero is a multiple of everything. A non-positive or non-finite divisor
/// never divides anything else.
pub fn is_multiple_of(value: &Number, divisor: f64) -> bool {
    let Some(as_float) = value.as_f64() else {
        return false;
    };
    if as_float == 0.0 {
        return true;
    }
    if !(divisor.is_finite() && divisor > 0.0) {
        return false;
    }
    match exact_remainder_is_zero(value, divisor) {
        Some(result) => result,
        None => float_quotient_is_integral(as_float, divisor),
    }
}

fn exact_remainder_is_zero(value: &Number, divisor: f64) -> Option<bool> {
    let divisor_text = Number::from_f64(divisor)?.to_string();
    let value = Decimal::parse(&value.to_string())?;
    let divisor = Decimal::parse(&divisor_text)?;
    let scale = value.scale.max(divisor.scale);
    let dividend = value.rescaled(scale)?;
    let divisor = divisor.rescaled(scale)?;
    if divisor == 0 {
        return None;
    }
    Some(dividend % divisor == 0)
}

fn float_quotient_is_integral(value: f64, divisor: f64) -> bool {
    let quotient = value / divisor;
    if !quotient.is_finite() {
        return false;
    }
    (quotient - quotient.round()).abs() <= FALLBACK_TOLERANCE * quotient.abs().max(1.0)
}
