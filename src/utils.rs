use std::borrow::Cow;

use encoding_rs::WINDOWS_1252;

/// Parses sizes like `1MiB`, `512k` or `4096`. Unknown input yields 0.
pub fn parse_size(s: &str) -> u64 {
    let s = s.trim().to_lowercase();
    let units = [
        ("gib", 1024u64.pow(3)),
        ("mib", 1024u64.pow(2)),
        ("kib", 1024),
        ("gb", 1000u64.pow(3)),
        ("mb", 1000u64.pow(2)),
        ("kb", 1000),
        ("g", 1000u64.pow(3)),
        ("m", 1000u64.pow(2)),
        ("k", 1000),
        ("b", 1),
    ];

    for (unit, mult) in units {
        if let Some(number) = s.strip_suffix(unit) {
            if let Ok(val) = number.trim().parse::<f64>() {
                return (val * mult as f64) as u64;
            }
        }
    }
    s.parse().unwrap_or(0)
}

/// Renders raw line bytes as text: UTF-8 when valid, otherwise Windows-1252
/// so that each byte stays one character wide.
pub fn decode_best_effort(bytes: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(bytes) {
        Ok(s) => Cow::Borrowed(s),
        Err(_) => {
            let (res, _) = WINDOWS_1252.decode_without_bom_handling(bytes);
            res
        }
    }
}

/// Number of decimal digits needed to print `n`.
pub fn digit_width(n: usize) -> usize {
    n.checked_ilog10().map_or(1, |d| d as usize + 1)
}
