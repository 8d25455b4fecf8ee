use lazy_static::lazy_static;
use regex::Regex;

use crate::error::AppError;
use crate::result::Result;

lazy_static! {
    // Whole-message telemetry voltage, e.g. "V12.5"
    static ref VOLTAGE_STRICT: Regex = Regex::new(r"^V(\d+(?:\.\d+)?)$").unwrap();
    // Free-text status voltage, e.g. "reading 42 volts"
    static ref VOLTAGE_LOOSE: Regex = Regex::new(r"(?i)(\d+)\s*volts").unwrap();
}

/// Decodes an AFSK bitstream of '0'/'1' characters into ASCII text.
///
/// The stream is split into consecutive 8-bit groups, each interpreted as
/// an unsigned byte and mapped to its character code. A trailing partial
/// group or a non-binary character rejects the whole payload.
pub fn decode(bitstream: &str) -> Result<String> {
    if bitstream.len() % 8 != 0 {
        return Err(AppError::MalformedPayload(format!(
            "bitstream length {} is not a multiple of 8",
            bitstream.len()
        )));
    }
    let bytes = bitstream.as_bytes();
    let mut text = String::with_capacity(bytes.len() / 8);
    for chunk in bytes.chunks(8) {
        let group = std::str::from_utf8(chunk)
            .map_err(|_| AppError::MalformedPayload("bitstream is not ASCII".to_string()))?;
        let code = u8::from_str_radix(group, 2).map_err(|_| {
            AppError::MalformedPayload(format!("invalid binary group: {group}"))
        })?;
        text.push(code as char);
    }
    Ok(text)
}

/// Matches a decoded telemetry message of the form `V<number>`.
pub fn extract_voltage_strict(text: &str) -> Option<f64> {
    VOLTAGE_STRICT
        .captures(text)
        .and_then(|caps| caps[1].parse().ok())
}

/// Matches an integer followed by the word "volts" inside free status text.
pub fn extract_voltage_loose(text: &str) -> Option<f64> {
    VOLTAGE_LOOSE
        .captures(text)
        .and_then(|caps| caps[1].parse().ok())
}
