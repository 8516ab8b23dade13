//! Canonical scalar formatting for diagnostic messages.
//!
//! Numbers round-trip the literal the parser supplied rather than going
//! through a fixed-precision formatter (so `34.1304948234793` stays exactly
//! that, and `100` stays `"100"`, never `"100.0"`). Shared by C6 constraint
//! messages, C4, and a handful of element validators.

/// Renders an integer as its canonical decimal string.
pub fn canonical_integer(value: i64) -> String {
    value.to_string()
}

/// Renders a float as its canonical decimal string: as many digits as a
/// normal round-trippable `f64` representation needs, with no trailing `.0`
/// for whole numbers (matching how blueprint authors typically write floats
/// in source), and no forced trailing zeros.
pub fn canonical_float(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        // `{}` on f64 already produces the shortest round-trippable form.
        format!("{value}")
    }
}

/// Produces "1 character" vs "2 characters" (and analogous nouns) the way
/// a constraint message needs for `min_length`/`max_length` text.
pub fn pluralize(count: usize, noun: &str) -> String {
    if count == 1 {
        format!("1 {noun}")
    } else {
        format!("{count} {noun}s")
    }
}
