//! String format checks for the `format` keyword
//!
//! Supported formats: `date-time`, `email`, `hostname`, `ipv4`, `ipv6` and
//! `uri`. Unknown format names are not errors; [`check`] returns `None`
//! for them and the validator treats the keyword as an annotation.

use chrono::NaiveDateTime;
use std::net::Ipv6Addr;
use url::Url;

/// Check `value` against the named format; `None` for unknown formats
pub fn check(format: &str, value: &str) -> Option<bool> {
    let valid = match format {
        "date-time" => is_valid_datetime(value),
        "email" => is_valid_email(value),
        "hostname" => is_valid_hostname(value),
        "ipv4" => is_valid_ipv4(value),
        "ipv6" => is_valid_ipv6(value),
        "uri" => is_valid_uri(value),
        _ => return None,
    };
    Some(valid)
}

/// Fixed-width UTC timestamp `yyyy-MM-ddTHH:mm:ss.fffZ`
pub fn is_valid_datetime(value: &str) -> bool {
    const SHAPE: &[u8; 24] = b"dddd-dd-ddTdd:dd:dd.dddZ";
    let bytes = value.as_bytes();
    if bytes.len() != SHAPE.len() {
        return false;
    }
    let shaped = bytes.iter().zip(SHAPE).all(|(b, s)| match s {
        b'd' => b.is_ascii_digit(),
        _ => b == s,
    });
    shaped && NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.3fZ").is_ok()
}

/// `local@domain` with a dot-atom local part and a hostname domain
pub fn is_valid_email(value: &str) -> bool {
    let Some((local, domain)) = value.rsplit_once('@') else {
        return false;
    };
    if local.is_empty() || local.len() > 64 {
        return false;
    }
    let local_ok = local.split('.').all(|atom| {
        !atom.is_empty()
            && atom
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || "!#$%&'*+-/=?^_`{|}~".contains(c))
    });
    if !local_ok {
        return false;
    }
    match domain.strip_prefix('[').and_then(|d| d.strip_suffix(']')) {
        Some(literal) => is_valid_ipv4(literal),
        None => domain.contains('.') && is_valid_hostname(domain),
    }
}

/// RFC 1123 hostname: dot-separated labels of letters, digits and inner
/// hyphens, each at most 63 characters, 255 in total
pub fn is_valid_hostname(value: &str) -> bool {
    if value.is_empty() || value.len() > 255 {
        return false;
    }
    let value = value.strip_suffix('.').unwrap_or(value);
    value.split('.').all(|label| {
        let bytes = label.as_bytes();
        match (bytes.first(), bytes.last()) {
            (Some(first), Some(last)) => {
                bytes.len() <= 63
                    && first.is_ascii_alphanumeric()
                    && last.is_ascii_alphanumeric()
                    && bytes.iter().all(|b| b.is_ascii_alphanumeric() || *b == b'-')
            }
            _ => false,
        }
    })
}

/// Four dot-separated decimal octets, each in 0..=255
pub fn is_valid_ipv4(value: &str) -> bool {
    let parts: Vec<&str> = value.split('.').collect();
    parts.len() == 4
        && parts.iter().all(|part| {
            !part.is_empty()
                && part.len() <= 3
                && part.bytes().all(|b| b.is_ascii_digit())
                && part.parse::<u16>().is_ok_and(|n| n <= 255)
        })
}

/// An IPv6 address literal
pub fn is_valid_ipv6(value: &str) -> bool {
    value.parse::<Ipv6Addr>().is_ok()
}

/// An absolute URI made only of characters RFC 3986 allows
pub fn is_valid_uri(value: &str) -> bool {
    const ALLOWED: &str = "-._~:/?#[]@!$&'()*+,;=%";
    value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || ALLOWED.contains(c))
        && Url::parse(value).is_ok()
}
