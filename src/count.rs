use crate::error::{Result, ScrapeError};

/// Parses a displayed count such as `"1,234"`, `"12.3K"` or `"4M"` into an
/// exact integer.
///
/// `M` is checked before `K`. With a suffix the period is a decimal point,
/// without one it is a grouping separator like the comma.
pub fn parse_count(text: &str) -> Result<u64> {
    let token = text.trim();
    let stripped = token.replace(',', "");

    let (digits, factor) = if stripped.contains('M') {
        (stripped.trim_end_matches('M'), 1_000_000_u64)
    } else if stripped.contains('K') {
        (stripped.trim_end_matches('K'), 1_000_u64)
    } else {
        (stripped.as_str(), 1_u64)
    };

    if factor == 1 {
        let whole = digits.replace('.', "");
        return parse_digits(token, &whole);
    }

    let (whole, fraction) = digits.split_once('.').unwrap_or((digits, ""));
    let whole = parse_digits(token, whole)?;
    let scaled = whole
        .checked_mul(factor)
        .ok_or_else(|| ScrapeError::parse("count", token, "value overflows u64"))?;
    if fraction.is_empty() {
        return Ok(scaled);
    }

    let mut fraction_value = 0_u64;
    let mut unit = factor;
    for ch in fraction.chars() {
        let digit = ch
            .to_digit(10)
            .ok_or_else(|| ScrapeError::parse("count", token, "fraction is not numeric"))?;
        unit /= 10;
        fraction_value += u64::from(digit) * unit;
    }

    scaled
        .checked_add(fraction_value)
        .ok_or_else(|| ScrapeError::parse("count", token, "value overflows u64"))
}

fn parse_digits(token: &str, digits: &str) -> Result<u64> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ScrapeError::parse(
            "count",
            token,
            "expected digits with an optional K/M suffix",
        ));
    }
    digits
        .parse::<u64>()
        .map_err(|err| ScrapeError::parse("count", token, err))
}
