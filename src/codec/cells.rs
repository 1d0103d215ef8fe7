//! Tolerant parsing of numbers typed into cells.
//!
//! Workbooks come back from spreadsheet applications in whatever locale the
//! user had: thousands separators, decimal commas and trailing percent signs
//! all occur. `n.a.`, `-` and blank cells mean "not provided".

use nom::{
    branch::alt,
    character::complete::{char, digit1, multispace0, one_of},
    combinator::{all_consuming, opt, recognize},
    multi::many1,
    sequence::{delimited, pair, preceded},
    IResult, Parser,
};

const NOT_PROVIDED: [&str; 7] = ["", "-", "–", "n.a.", "n.a", "n/a", "na"];

/// Sign, digit groups with separators, exponent, percent suffix.
struct RawNumber<'a> {
    negative: bool,
    body: &'a str,
    exponent: Option<&'a str>,
}

fn body(input: &str) -> IResult<&str, &str> {
    recognize(many1(alt((digit1, recognize(one_of(",.' \u{a0}")))))).parse(input)
}

fn exponent(input: &str) -> IResult<&str, &str> {
    preceded(
        one_of("eE"),
        recognize(pair(opt(one_of("+-")), digit1)),
    )
    .parse(input)
}

fn raw_number(input: &str) -> IResult<&str, RawNumber<'_>> {
    let (input, sign) = opt(one_of("+-")).parse(input)?;
    let (input, body) = body(input)?;
    let (input, exponent) = opt(exponent).parse(input)?;
    let (input, _) = delimited(multispace0, opt(char('%')), multispace0).parse(input)?;
    Ok((
        input,
        RawNumber {
            negative: sign == Some('-'),
            body,
            exponent,
        },
    ))
}

/// Decides which separator is the decimal mark and strips the rest.
fn canonical_digits(body: &str) -> Option<String> {
    let body: String = body
        .chars()
        .filter(|c| !matches!(c, ' ' | '\u{a0}' | '\''))
        .collect();
    if !body.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    let commas = body.matches(',').count();
    let dots = body.matches('.').count();
    let decimal = match (commas, dots) {
        (0, 0) => None,
        (_, 0) if commas > 1 => None,
        (0, _) if dots > 1 => None,
        (1, 0) => {
            // "1,234" is a thousands group, "1,5" and "0,123" are decimals
            let (int, frac) = body.split_once(',')?;
            let grouped = frac.len() == 3 && !int.is_empty() && int != "0" && int != "-0";
            (!grouped).then_some(',')
        }
        (0, 1) => Some('.'),
        _ => {
            let last_comma = body.rfind(',');
            let last_dot = body.rfind('.');
            if last_comma > last_dot {
                Some(',')
            } else {
                Some('.')
            }
        }
    };

    let mut out = String::with_capacity(body.len());
    for c in body.chars() {
        match c {
            d if d.is_ascii_digit() => out.push(d),
            sep if Some(sep) == decimal => out.push('.'),
            _ => {}
        }
    }
    Some(out)
}

/// Parses a cell's text as a number. `None` for "not provided" markers and
/// for text that is not a number.
pub fn parse_number(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    if NOT_PROVIDED.contains(&trimmed.to_lowercase().as_str()) {
        return None;
    }
    let (_, raw) = all_consuming(raw_number).parse(trimmed).ok()?;
    let mut canonical = canonical_digits(raw.body)?;
    if let Some(exp) = raw.exponent {
        canonical.push('e');
        canonical.push_str(exp);
    }
    let value: f64 = canonical.parse().ok()?;
    let value = if raw.negative { -value } else { value };
    value.is_finite().then_some(value)
}

/// Whether the text is one of the "not provided" markers.
pub fn is_not_provided(text: &str) -> bool {
    NOT_PROVIDED.contains(&text.trim().to_lowercase().as_str())
}

/// Coerces form input to a number, treating anything unparseable as 0.
pub fn coerce_number(text: &str) -> f64 {
    parse_number(text).unwrap_or(0.0)
}

/// Reads `yes`/`no` style flags.
pub fn parse_flag(text: &str) -> Option<bool> {
    match text.trim().to_lowercase().as_str() {
        "yes" | "y" | "true" | "x" | "1" | "applicable" => Some(true),
        "no" | "n" | "false" | "0" | "not applicable" => Some(false),
        _ => None,
    }
}

fn allocation(part: &str) -> Option<(String, f64)> {
    let (id, quantity) = part.rsplit_once('=')?;
    let id = id.trim();
    if id.is_empty() {
        return None;
    }
    Some((id.to_string(), parse_number(quantity)?))
}

/// Parses `process = quantity` pairs separated by `;`, e.g.
/// `Line 1 = 400; p2 = 600`. The process is everything before the last `=`.
/// Parts that do not read as a pair come back in the second list.
pub fn parse_allocations(text: &str) -> (Vec<(String, f64)>, Vec<String>) {
    let mut parsed = Vec::new();
    let mut rejected = Vec::new();
    for part in text.split(';').map(str::trim).filter(|p| !p.is_empty()) {
        match allocation(part) {
            Some(pair) => parsed.push(pair),
            None => rejected.push(part.to_string()),
        }
    }
    (parsed, rejected)
}
