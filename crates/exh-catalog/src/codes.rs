//! INEGI code normalization.
//!
//! Senders transmit geographic codes either as integers (`5`, `30`) or as
//! padded strings (`"05"`, `"030"`). Both normalize to the padded form.

/// Width of an INEGI estado code.
pub const ESTADO_WIDTH: usize = 2;

/// Width of an INEGI municipio code.
pub const MUNICIPIO_WIDTH: usize = 3;

/// Zero-pad an estado code to two digits.
///
/// Returns `None` for empty, non-numeric or over-long input.
pub fn pad_estado(code: &str) -> Option<String> {
    pad(code, ESTADO_WIDTH)
}

/// Zero-pad a municipio code to three digits.
///
/// Returns `None` for empty, non-numeric or over-long input.
pub fn pad_municipio(code: &str) -> Option<String> {
    pad(code, MUNICIPIO_WIDTH)
}

fn pad(code: &str, width: usize) -> Option<String> {
    let trimmed = code.trim();
    if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    // Leading zeros beyond the width are tolerated ("0005" is estado 05).
    let significant = trimmed.trim_start_matches('0');
    if significant.len() > width {
        return None;
    }
    Some(format!("{significant:0>width$}"))
}
