//! One-shot rendering of command-line values through a stream.

use textstream_core::{FmtFlags, StreamConfig, StringStream};

use crate::error::HarnessError;

/// A value parsed from text: integers stay integers, anything with a
/// fraction or exponent becomes a float, `true`/`false` stay booleans.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RenderValue {
    Signed(i64),
    Unsigned(u64),
    Float(f64),
    Bool(bool),
}

impl RenderValue {
    pub fn parse(text: &str) -> Result<Self, HarnessError> {
        let bad = || HarnessError::BadValue(text.to_string());
        match text {
            "true" => return Ok(Self::Bool(true)),
            "false" => return Ok(Self::Bool(false)),
            _ => {}
        }
        let unsigned = text.trim_start_matches(['-', '+']);
        if text.contains(['.', 'e', 'E'])
            || unsigned.eq_ignore_ascii_case("inf")
            || unsigned.eq_ignore_ascii_case("nan")
        {
            return text.parse().map(Self::Float).map_err(|_| bad());
        }
        if text.starts_with('-') {
            text.parse().map(Self::Signed).map_err(|_| bad())
        } else {
            text.parse().map(Self::Unsigned).map_err(|_| bad())
        }
    }
}

/// Settings for [`render_values`].
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub base: u8,
    pub width: u16,
    pub precision: u16,
    pub flags: FmtFlags,
    /// Written between values.
    pub separator: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        let config = StreamConfig::default();
        Self {
            base: config.base,
            width: config.width,
            precision: config.precision,
            flags: config.flags,
            separator: String::from(" "),
        }
    }
}

/// Write every value into one stream and return the committed text.
pub fn render_values(options: &RenderOptions, values: &[String]) -> Result<String, HarnessError> {
    let mut os = StringStream::new();
    os.set_base(options.base)?;
    os.set_width(options.width)
        .set_precision(options.precision)
        .set_flags(options.flags);

    for (i, text) in values.iter().enumerate() {
        if i > 0 {
            os.write_value(options.separator.as_str())?;
        }
        match RenderValue::parse(text)? {
            RenderValue::Signed(v) => os.write_value(&v)?,
            RenderValue::Unsigned(v) => os.write_value(&v)?,
            RenderValue::Float(v) => os.write_value(&v)?,
            RenderValue::Bool(v) => os.write_value(&v)?,
        };
    }
    Ok(os.into_string()?)
}
