//! LM-63 Serialization

use gonio::common::*;
use gonio::error::*;
use gonio::photometric::*;
use itertools::Itertools;

/// First line of every file.
pub const LM63_VERSION: &str = "IESNA:LM-63-2002";

/// Longest allowed label line.
pub const MAX_LABEL_LENGTH: usize = 256;

/// Number of values written per line.
pub const VALUES_PER_LINE: usize = 10;

/// Line terminator.
pub const LINE_ENDING: &str = "\r\n";

/// Photometric type C.
pub const PHOTOMETRIC_TYPE_C: u32 = 1;

/// Dimensions are in meters.
pub const UNITS_METERS: u32 = 2;

/// Free text written to the label block.
#[derive(Clone, Debug, PartialEq)]
pub struct Lm63Header {
    /// `[TEST]` value.
    pub test: String,

    /// `[MANUFAC]` value.
    pub manufacturer: String,

    /// Optional `[LUMCAT]` value.
    pub catalog: Option<String>,

    /// Optional `[LAMP]` value.
    pub lamp: Option<String>,

    /// `[OTHER]` lines.
    pub other: Vec<String>,

    /// Input watts written to the lumens line.
    pub input_watts: Float,
}

impl Default for Lm63Header {
    fn default() -> Self {
        Self {
            test: String::from("Simulated goniophotometer measurement"),
            manufacturer: String::from("ies-gonio"),
            catalog: None,
            lamp: None,
            other: vec![],
            input_watts: 0.0,
        }
    }
}

/// Renders photometric data as LM-63 text. The output depends only on the
/// inputs, so identical data always produces identical bytes.
///
/// * `data`   - Calibrated photometric data.
/// * `header` - Label block contents.
pub fn to_lm63(data: &PhotometricData, header: &Lm63Header) -> Result<String> {
    data.check()?;

    let mut lines: Vec<String> = vec![LM63_VERSION.to_string()];

    lines.push(label("TEST", &header.test));
    lines.push(label("MANUFAC", &header.manufacturer));
    lines.push(label("LUMINAIRE", &data.fixture_name));
    if let Some(catalog) = &header.catalog {
        lines.push(label("LUMCAT", catalog));
    }
    if let Some(lamp) = &header.lamp {
        lines.push(label("LAMP", lamp));
    }
    for other in header.other.iter() {
        lines.push(label("OTHER", other));
    }

    lines.push(String::from("TILT=NONE"));
    lines.push(format!(
        "{} {} {PHOTOMETRIC_TYPE_C} {UNITS_METERS} 0 0 0",
        data.vertical_angles.len(),
        data.horizontal_angles.len()
    ));
    lines.push(format!(
        "{:.2} 1.00 {:.3} 1.00 1 {:.2}",
        data.total_lumens, data.distance_meters, header.input_watts
    ));

    lines.extend(wrap(&data.vertical_angles, format_angle));
    lines.extend(wrap(&data.horizontal_angles, format_angle));
    for row in data.candela.iter() {
        lines.extend(wrap(row, |v| format!("{v:>10.3}")));
    }

    let mut out = lines.join(LINE_ENDING);
    out.push_str(LINE_ENDING);
    Ok(out)
}

/// Formats a `[KEYWORD] value` line with line breaks removed, truncated to
/// the maximum label length.
fn label(keyword: &str, value: &str) -> String {
    let value = value.replace(['\r', '\n'], " ");
    let line = format!("[{keyword}] {}", value.trim());
    line.chars().take(MAX_LABEL_LENGTH).collect()
}

/// Formats an angle with two decimals, or up to six when two would round it.
fn format_angle(v: &Float) -> String {
    let exact = format!("{v:.6}");
    let trimmed = exact.trim_end_matches('0');
    match trimmed.split_once('.') {
        Some((_, frac)) if frac.len() > 2 => trimmed.to_string(),
        _ => format!("{v:.2}"),
    }
}

/// Formats values `VALUES_PER_LINE` at a time, separated by single spaces.
fn wrap<F>(values: &[Float], fmt: F) -> Vec<String>
where
    F: Fn(&Float) -> String,
{
    values
        .chunks(VALUES_PER_LINE)
        .map(|chunk| chunk.iter().map(&fmt).join(" "))
        .collect()
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------
