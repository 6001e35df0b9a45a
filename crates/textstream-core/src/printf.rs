//! printf formatting engine.
//!
//! Parses C format directives and renders typed arguments into a caller
//! supplied byte slice with `snprintf` semantics: output past the end of the
//! slice is dropped, and the returned length is what the complete output
//! needs. Callers detect truncation by comparing the two.
//!
//! Reference: ISO C11 7.21.6.1, C23 `%b`.
//!
//! Design invariant: all formatting is bounded. Width and precision are
//! clamped to [`MAX_FIELD`] at parse time, so a single directive can never
//! expand past `MAX_FIELD + 64` bytes plus the float digits themselves.

use thiserror::Error;

/// Upper bound applied to parsed widths and precisions.
pub const MAX_FIELD: usize = 1 << 16;

// ---------------------------------------------------------------------------
// Format spec types
// ---------------------------------------------------------------------------

/// Flags parsed from a printf format directive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FormatFlags {
    pub left_justify: bool, // '-'
    pub force_sign: bool,   // '+'
    pub space_sign: bool,   // ' '
    pub alt_form: bool,     // '#'
    pub zero_pad: bool,     // '0'
}

/// Width specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Width {
    None,
    Fixed(usize),
    FromArg, // '*'
}

/// Precision specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precision {
    None,
    Fixed(usize),
    FromArg, // '.*'
}

/// Length modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthMod {
    None,
    Hh,   // 'hh'
    H,    // 'h'
    L,    // 'l'
    Ll,   // 'll'
    Z,    // 'z'
    T,    // 't'
    J,    // 'j'
    BigL, // 'L'
}

impl LengthMod {
    /// Bit width integer arguments are narrowed to under this modifier.
    #[must_use]
    pub const fn int_bits(self) -> u32 {
        match self {
            Self::Hh => 8,
            Self::H => 16,
            Self::None => 32,
            Self::Z | Self::T => usize::BITS,
            Self::L | Self::Ll | Self::J | Self::BigL => 64,
        }
    }
}

/// A parsed printf format specifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatSpec {
    pub flags: FormatFlags,
    pub width: Width,
    pub precision: Precision,
    pub length: LengthMod,
    pub conversion: u8,
}

// ---------------------------------------------------------------------------
// Arguments
// ---------------------------------------------------------------------------

/// Typed argument value for formatting.
///
/// This is the Rust stand-in for a C `va_list` entry: each variant is one
/// promoted argument class.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FormatArg<'a> {
    SignedInt(i64),
    UnsignedInt(u64),
    Float(f64),
    Char(u8),
    Str(&'a [u8]),
    Pointer(usize),
}

macro_rules! impl_from_arg {
    ($variant:ident as $wide:ty: $($t:ty)*) => ($(
        impl From<$t> for FormatArg<'_> {
            fn from(v: $t) -> Self {
                FormatArg::$variant(v as $wide)
            }
        }
    )*);
}

impl_from_arg!(SignedInt as i64: i8 i16 i32 i64 isize);
impl_from_arg!(UnsignedInt as u64: u8 u16 u32 u64 usize);
impl_from_arg!(Float as f64: f32 f64);

impl<'a> From<&'a str> for FormatArg<'a> {
    fn from(s: &'a str) -> Self {
        FormatArg::Str(s.as_bytes())
    }
}

impl<'a> From<&'a String> for FormatArg<'a> {
    fn from(s: &'a String) -> Self {
        FormatArg::Str(s.as_bytes())
    }
}

impl<'a> From<&'a [u8]> for FormatArg<'a> {
    fn from(s: &'a [u8]) -> Self {
        FormatArg::Str(s)
    }
}

impl<T> From<*const T> for FormatArg<'_> {
    fn from(p: *const T) -> Self {
        FormatArg::Pointer(p as usize)
    }
}

impl<T> From<*mut T> for FormatArg<'_> {
    fn from(p: *mut T) -> Self {
        FormatArg::Pointer(p as usize)
    }
}

/// Errors raised while applying a template to its arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("directive needs argument #{index} but only {index} were supplied")]
    MissingArgument { index: usize },
    #[error("argument #{index} cannot be rendered by %{conversion}")]
    ArgumentMismatch { index: usize, conversion: char },
    #[error("conversion %{0} is not supported")]
    UnsupportedConversion(char),
}

// ---------------------------------------------------------------------------
// Segment: parsed pieces of a format string
// ---------------------------------------------------------------------------

/// A segment of a parsed format string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatSegment<'a> {
    /// Literal bytes to emit verbatim.
    Literal(&'a [u8]),
    /// A `%%` escape (emit a single '%').
    Percent,
    /// A conversion specifier requiring an argument.
    Spec(FormatSpec),
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

/// Byte cursor over one directive.
struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl Cursor<'_> {
    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    /// Consume `b` if it is next.
    fn eat(&mut self, b: u8) -> bool {
        let hit = self.peek() == Some(b);
        self.pos += usize::from(hit);
        hit
    }

    /// Consume a run of ASCII digits, if any.
    fn digits(&mut self) -> Option<usize> {
        let start = self.pos;
        while self.peek().is_some_and(|b| b.is_ascii_digit()) {
            self.pos += 1;
        }
        (self.pos > start).then(|| parse_decimal(&self.bytes[start..self.pos]))
    }
}

/// Length modifiers, longest spelling first.
const LENGTH_MODS: [(&[u8], LengthMod); 8] = [
    (b"hh", LengthMod::Hh),
    (b"h", LengthMod::H),
    (b"ll", LengthMod::Ll),
    (b"l", LengthMod::L),
    (b"z", LengthMod::Z),
    (b"t", LengthMod::T),
    (b"j", LengthMod::J),
    (b"L", LengthMod::BigL),
];

const CONVERSIONS: &[u8] = b"diuxXobBscpnfFeEgG";

/// Parse one directive. `fmt` starts just past the `%`.
///
/// Returns the spec and the number of bytes it spans, or `None` when the
/// directive is malformed or names an unknown conversion.
pub fn parse_format_spec(fmt: &[u8]) -> Option<(FormatSpec, usize)> {
    let mut cur = Cursor { bytes: fmt, pos: 0 };

    let mut flags = FormatFlags::default();
    loop {
        let slot = match cur.peek() {
            Some(b'-') => &mut flags.left_justify,
            Some(b'+') => &mut flags.force_sign,
            Some(b' ') => &mut flags.space_sign,
            Some(b'#') => &mut flags.alt_form,
            Some(b'0') => &mut flags.zero_pad,
            _ => break,
        };
        *slot = true;
        cur.pos += 1;
    }
    // '+' beats ' ', '-' beats '0'.
    flags.space_sign &= !flags.force_sign;
    flags.zero_pad &= !flags.left_justify;

    let width = if cur.eat(b'*') {
        Width::FromArg
    } else {
        cur.digits().map_or(Width::None, Width::Fixed)
    };

    let precision = if !cur.eat(b'.') {
        Precision::None
    } else if cur.eat(b'*') {
        Precision::FromArg
    } else {
        Precision::Fixed(cur.digits().unwrap_or(0))
    };

    let rest = &fmt[cur.pos..];
    let length = match LENGTH_MODS.iter().find(|(spelling, _)| rest.starts_with(spelling)) {
        Some(&(spelling, length)) => {
            cur.pos += spelling.len();
            length
        }
        None => LengthMod::None,
    };

    let conversion = cur.peek().filter(|c| CONVERSIONS.contains(c))?;
    cur.pos += 1;

    Some((
        FormatSpec {
            flags,
            width,
            precision,
            length,
            conversion,
        },
        cur.pos,
    ))
}

/// Split a printf format string into segments.
///
/// Yields `FormatSegment::Literal` for literal runs and `FormatSegment::Spec`
/// for each `%`-directive. `%%` yields `FormatSegment::Percent`.
pub fn parse_format_string(fmt: &[u8]) -> Vec<FormatSegment<'_>> {
    let mut segments = Vec::new();
    let mut rest = fmt;

    while !rest.is_empty() {
        let Some(pct) = rest.iter().position(|&b| b == b'%') else {
            segments.push(FormatSegment::Literal(rest));
            break;
        };
        if pct > 0 {
            segments.push(FormatSegment::Literal(&rest[..pct]));
        }
        let directive = &rest[pct + 1..];
        if directive.first() == Some(&b'%') {
            segments.push(FormatSegment::Percent);
            rest = &directive[1..];
            continue;
        }
        match parse_format_spec(directive) {
            Some((spec, consumed)) => {
                segments.push(FormatSegment::Spec(spec));
                rest = &directive[consumed..];
            }
            None => {
                // A lone or malformed '%' is copied through.
                segments.push(FormatSegment::Literal(&rest[pct..=pct]));
                rest = directive;
            }
        }
    }
    segments
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Format `args` through `fmt` into `dst`.
///
/// Writes at most `dst.len()` bytes and returns the number of bytes the full
/// output requires. No terminator is written. Extra arguments are ignored.
pub fn snprintf(dst: &mut [u8], fmt: &[u8], args: &[FormatArg<'_>]) -> Result<usize, FormatError> {
    let mut out = Emitter::new(dst);
    let mut next_arg = 0;

    for segment in parse_format_string(fmt) {
        match segment {
            FormatSegment::Literal(bytes) => out.extend(bytes),
            FormatSegment::Percent => out.push(b'%'),
            FormatSegment::Spec(mut spec) => {
                resolve_star_args(&mut spec, args, &mut next_arg)?;
                let index = next_arg;
                let arg = *args
                    .get(index)
                    .ok_or(FormatError::MissingArgument { index })?;
                next_arg += 1;
                render_arg(&spec, arg, index, &mut out)?;
            }
        }
    }
    Ok(out.len)
}

/// Format into a freshly allocated vector.
pub fn sprintf(fmt: &[u8], args: &[FormatArg<'_>]) -> Result<Vec<u8>, FormatError> {
    let needed = snprintf(&mut [], fmt, args)?;
    let mut buf = vec![0u8; needed];
    snprintf(&mut buf, fmt, args)?;
    Ok(buf)
}

/// Upper-bound guess of the output size for `fmt` and `args`.
///
/// Exact for literal text, strings and integers within their width and
/// precision; floats with very large magnitudes may exceed it, which callers
/// handle by retrying with the length [`snprintf`] reports.
#[must_use]
pub fn estimate_len(fmt: &[u8], args: &[FormatArg<'_>]) -> usize {
    let mut total = 0usize;
    let mut strings = args.iter().filter_map(|arg| match arg {
        FormatArg::Str(s) => Some(s.len()),
        _ => None,
    });
    for segment in parse_format_string(fmt) {
        let extra = match segment {
            FormatSegment::Literal(bytes) => bytes.len(),
            FormatSegment::Percent => 1,
            FormatSegment::Spec(spec) => {
                let width = match spec.width {
                    Width::Fixed(w) => w,
                    _ => 0,
                };
                let precision = match spec.precision {
                    Precision::Fixed(p) => p,
                    _ => 0,
                };
                let body = if spec.conversion == b's' {
                    strings.next().unwrap_or(0)
                } else {
                    64
                };
                width + precision + body
            }
        };
        total = total.saturating_add(extra);
    }
    total
}

// ---------------------------------------------------------------------------
// Argument plumbing
// ---------------------------------------------------------------------------

fn resolve_star_args(
    spec: &mut FormatSpec,
    args: &[FormatArg<'_>],
    next_arg: &mut usize,
) -> Result<(), FormatError> {
    if spec.width == Width::FromArg {
        let w = star_value(args, next_arg, spec.conversion)?;
        if w < 0 {
            spec.flags.left_justify = true;
            spec.flags.zero_pad = false;
        }
        spec.width = Width::Fixed((w.unsigned_abs() as usize).min(MAX_FIELD));
    }
    if spec.precision == Precision::FromArg {
        let p = star_value(args, next_arg, spec.conversion)?;
        spec.precision = if p < 0 {
            Precision::None
        } else {
            Precision::Fixed((p as usize).min(MAX_FIELD))
        };
    }
    Ok(())
}

fn star_value(
    args: &[FormatArg<'_>],
    next_arg: &mut usize,
    conversion: u8,
) -> Result<i64, FormatError> {
    let index = *next_arg;
    let value = match args.get(index) {
        Some(FormatArg::SignedInt(v)) => *v as i32 as i64,
        Some(FormatArg::UnsignedInt(v)) => *v as i32 as i64,
        Some(_) => {
            return Err(FormatError::ArgumentMismatch {
                index,
                conversion: char::from(conversion),
            });
        }
        None => return Err(FormatError::MissingArgument { index }),
    };
    *next_arg += 1;
    Ok(value)
}

fn render_arg(
    spec: &FormatSpec,
    arg: FormatArg<'_>,
    index: usize,
    out: &mut Emitter<'_>,
) -> Result<(), FormatError> {
    let mismatch = FormatError::ArgumentMismatch {
        index,
        conversion: char::from(spec.conversion),
    };
    match spec.conversion {
        b'd' | b'i' => {
            let value = match arg {
                FormatArg::SignedInt(v) => v,
                FormatArg::UnsignedInt(v) => v as i64,
                FormatArg::Char(c) => i64::from(c),
                _ => return Err(mismatch),
            };
            format_signed(narrow_signed(value, spec.length), spec, out);
        }
        b'u' | b'x' | b'X' | b'o' | b'b' | b'B' => {
            let value = match arg {
                FormatArg::SignedInt(v) => v as u64,
                FormatArg::UnsignedInt(v) => v,
                FormatArg::Char(c) => u64::from(c),
                FormatArg::Pointer(p) => p as u64,
                _ => return Err(mismatch),
            };
            format_unsigned(narrow_unsigned(value, spec.length), spec, out);
        }
        b'f' | b'F' | b'e' | b'E' | b'g' | b'G' => match arg {
            FormatArg::Float(v) => format_float(v, spec, out),
            _ => return Err(mismatch),
        },
        b'c' => {
            let c = match arg {
                FormatArg::Char(c) => c,
                FormatArg::SignedInt(v) => v as u8,
                FormatArg::UnsignedInt(v) => v as u8,
                _ => return Err(mismatch),
            };
            format_char(c, spec, out);
        }
        b's' => match arg {
            FormatArg::Str(s) => format_str(s, spec, out),
            _ => return Err(mismatch),
        },
        b'p' => {
            let addr = match arg {
                FormatArg::Pointer(p) => p,
                FormatArg::UnsignedInt(v) => v as usize,
                _ => return Err(mismatch),
            };
            format_pointer(addr, spec, out);
        }
        other => return Err(FormatError::UnsupportedConversion(char::from(other))),
    }
    Ok(())
}

fn narrow_signed(value: i64, length: LengthMod) -> i64 {
    match length.int_bits() {
        8 => value as i8 as i64,
        16 => value as i16 as i64,
        32 => value as i32 as i64,
        _ => value,
    }
}

fn narrow_unsigned(value: u64, length: LengthMod) -> u64 {
    match length.int_bits() {
        bits @ (8 | 16 | 32) => value & ((1u64 << bits) - 1),
        _ => value,
    }
}

// ---------------------------------------------------------------------------
// Output sink
// ---------------------------------------------------------------------------

/// Bounded writer: bytes past the end of `dst` are counted but dropped.
struct Emitter<'a> {
    dst: &'a mut [u8],
    len: usize,
}

impl<'a> Emitter<'a> {
    fn new(dst: &'a mut [u8]) -> Self {
        Self { dst, len: 0 }
    }

    fn push(&mut self, byte: u8) {
        if let Some(slot) = self.dst.get_mut(self.len) {
            *slot = byte;
        }
        self.len += 1;
    }

    fn extend(&mut self, bytes: &[u8]) {
        let start = self.len.min(self.dst.len());
        let end = (self.len + bytes.len()).min(self.dst.len());
        self.dst[start..end].copy_from_slice(&bytes[..end - start]);
        self.len += bytes.len();
    }

    fn pad(&mut self, byte: u8, count: usize) {
        for _ in 0..count {
            self.push(byte);
        }
    }
}

// ---------------------------------------------------------------------------
// Renderers
// ---------------------------------------------------------------------------

/// Sign byte for a value, if one is printed.
fn sign_byte(negative: bool, flags: FormatFlags) -> Option<u8> {
    match (negative, flags.force_sign, flags.space_sign) {
        (true, _, _) => Some(b'-'),
        (false, true, _) => Some(b'+'),
        (false, false, true) => Some(b' '),
        _ => None,
    }
}

/// Emit `body` padded with spaces to the field width.
fn justified(
    spec: &FormatSpec,
    body_len: usize,
    out: &mut Emitter<'_>,
    body: impl FnOnce(&mut Emitter<'_>),
) {
    let pad = field_width(spec).saturating_sub(body_len);
    let left = spec.flags.left_justify;
    if !left {
        out.pad(b' ', pad);
    }
    body(out);
    if left {
        out.pad(b' ', pad);
    }
}

fn format_signed(value: i64, spec: &FormatSpec, out: &mut Emitter<'_>) {
    let sign = sign_byte(value < 0, spec.flags);
    emit_integer(value.unsigned_abs(), sign, b"", spec, out);
}

fn format_unsigned(value: u64, spec: &FormatSpec, out: &mut Emitter<'_>) {
    let radix = Radix::of(spec.conversion);
    let prefix = if value != 0 && spec.flags.alt_form {
        radix.prefix
    } else {
        b""
    };
    emit_integer(value, None, prefix, spec, out);
}

fn emit_integer(
    magnitude: u64,
    sign: Option<u8>,
    prefix: &[u8],
    spec: &FormatSpec,
    out: &mut Emitter<'_>,
) {
    let digits = Digits::new(magnitude, Radix::of(spec.conversion));

    // Precision 0 with value 0 emits no digits.
    let suppress_zero = magnitude == 0 && spec.precision == Precision::Fixed(0);
    let shown = if suppress_zero { &[][..] } else { digits.as_bytes() };
    let mut leading_zeros = match spec.precision {
        Precision::Fixed(p) => p.saturating_sub(shown.len()),
        _ => 0,
    };
    // Octal alt form only forces a leading zero when one is not already there.
    if spec.conversion == b'o' && spec.flags.alt_form && leading_zeros > 0 {
        leading_zeros -= 1;
    }

    let content = usize::from(sign.is_some()) + prefix.len() + leading_zeros + shown.len();
    // An explicit precision disables the '0' flag for integers.
    let zero_fill = spec.flags.zero_pad && spec.precision == Precision::None;
    emit_numeric(
        spec,
        content,
        zero_fill,
        out,
        |out| {
            out.extend(sign.as_slice());
            out.extend(prefix);
        },
        |out| {
            out.pad(b'0', leading_zeros);
            out.extend(shown);
        },
    );
}

/// Lay out a number: `head` is sign and prefix, `tail` the digits. With
/// `zero_fill` the padding goes between the two as zeros.
fn emit_numeric(
    spec: &FormatSpec,
    content: usize,
    zero_fill: bool,
    out: &mut Emitter<'_>,
    head: impl FnOnce(&mut Emitter<'_>),
    tail: impl FnOnce(&mut Emitter<'_>),
) {
    if zero_fill && !spec.flags.left_justify {
        let pad = field_width(spec).saturating_sub(content);
        head(out);
        out.pad(b'0', pad);
        tail(out);
    } else {
        justified(spec, content, out, |out| {
            head(out);
            tail(out);
        });
    }
}

/// Supports `%f`/`%F`, `%e`/`%E`, and `%g`/`%G`. Digit generation uses the
/// exact decimal conversion of `core::fmt`, then applies C layout rules.
fn format_float(value: f64, spec: &FormatSpec, out: &mut Emitter<'_>) {
    let precision = match spec.precision {
        Precision::Fixed(p) => p,
        _ => 6,
    };
    let uppercase = spec.conversion.is_ascii_uppercase();
    let sign = sign_byte(value.is_sign_negative() && !value.is_nan(), spec.flags);

    let body = if !value.is_finite() {
        let word = if value.is_nan() { "nan" } else { "inf" };
        if uppercase {
            word.to_ascii_uppercase()
        } else {
            word.to_string()
        }
    } else {
        let abs = value.abs();
        let alt = spec.flags.alt_form;
        match spec.conversion.to_ascii_lowercase() {
            b'e' => format_e(abs, precision, uppercase, alt),
            b'g' => format_g(abs, precision, uppercase, alt),
            _ => format_f(abs, precision, alt),
        }
    };

    let content = usize::from(sign.is_some()) + body.len();
    let zero_fill = spec.flags.zero_pad && value.is_finite();
    emit_numeric(
        spec,
        content,
        zero_fill,
        out,
        |out| out.extend(sign.as_slice()),
        |out| out.extend(body.as_bytes()),
    );
}

fn format_str(s: &[u8], spec: &FormatSpec, out: &mut Emitter<'_>) {
    let shown = match spec.precision {
        Precision::Fixed(p) => &s[..s.len().min(p)],
        _ => s,
    };
    justified(spec, shown.len(), out, |out| out.extend(shown));
}

fn format_char(c: u8, spec: &FormatSpec, out: &mut Emitter<'_>) {
    justified(spec, 1, out, |out| out.push(c));
}

fn format_pointer(addr: usize, spec: &FormatSpec, out: &mut Emitter<'_>) {
    if addr == 0 {
        return format_str(b"(nil)", spec, out);
    }
    let digits = Digits::new(addr as u64, Radix::of(b'x'));
    let hex = digits.as_bytes();
    justified(spec, 2 + hex.len(), out, |out| {
        out.extend(b"0x");
        out.extend(hex);
    });
}

// ---------------------------------------------------------------------------
// Internal helpers
// ---------------------------------------------------------------------------

fn parse_decimal(digits: &[u8]) -> usize {
    digits
        .iter()
        .fold(0_usize, |acc, &d| acc.saturating_mul(10).saturating_add(usize::from(d - b'0')))
        .min(MAX_FIELD)
}

fn field_width(spec: &FormatSpec) -> usize {
    match spec.width {
        Width::Fixed(w) => w,
        _ => 0,
    }
}

/// Digit set of an integer conversion.
#[derive(Clone, Copy)]
struct Radix {
    base: u64,
    alphabet: &'static [u8; 16],
    /// Printed under `#` for non-zero values.
    prefix: &'static [u8],
}

impl Radix {
    const LOWER: &'static [u8; 16] = b"0123456789abcdef";
    const UPPER: &'static [u8; 16] = b"0123456789ABCDEF";

    fn of(conversion: u8) -> Self {
        let (base, alphabet, prefix): (u64, _, &'static [u8]) = match conversion {
            b'o' => (8, Self::LOWER, b"0"),
            b'x' => (16, Self::LOWER, b"0x"),
            b'X' => (16, Self::UPPER, b"0X"),
            b'b' => (2, Self::LOWER, b"0b"),
            b'B' => (2, Self::LOWER, b"0B"),
            _ => (10, Self::LOWER, b""),
        };
        Self {
            base,
            alphabet,
            prefix,
        }
    }
}

/// An integer rendered right-aligned into a fixed buffer.
struct Digits {
    buf: [u8; 64],
    start: usize,
}

impl Digits {
    fn new(mut value: u64, radix: Radix) -> Self {
        let mut buf = [0u8; 64];
        let mut start = buf.len();
        loop {
            start -= 1;
            buf[start] = radix.alphabet[(value % radix.base) as usize];
            value /= radix.base;
            if value == 0 {
                break;
            }
        }
        Self { buf, start }
    }

    fn as_bytes(&self) -> &[u8] {
        &self.buf[self.start..]
    }
}

/// `%f`: fixed-point decimal.
fn format_f(value: f64, precision: usize, alt_form: bool) -> String {
    let mut s = format!("{value:.precision$}");
    if precision == 0 && alt_form {
        s.push('.');
    }
    s
}

/// `%e`: `d.ddde±XX`, at least two exponent digits.
fn format_e(value: f64, precision: usize, uppercase: bool, alt_form: bool) -> String {
    let raw = format!("{value:.precision$e}");
    let (mantissa, exp) = raw.split_once('e').unwrap_or((raw.as_str(), "0"));
    let exp: i32 = exp.parse().unwrap_or(0);
    let e_char = if uppercase { 'E' } else { 'e' };
    let sign = if exp < 0 { '-' } else { '+' };
    let dot = if precision == 0 && alt_form { "." } else { "" };
    format!("{mantissa}{dot}{e_char}{sign}{:02}", exp.unsigned_abs())
}

/// `%g`: `%e` or `%f` depending on the decimal exponent after rounding.
fn format_g(value: f64, precision: usize, uppercase: bool, alt_form: bool) -> String {
    let p = precision.max(1);
    let exp = if value == 0.0 {
        0
    } else {
        let raw = format!("{value:.prec$e}", prec = p - 1);
        raw.split_once('e')
            .and_then(|(_, e)| e.parse::<i64>().ok())
            .unwrap_or(0)
    };

    let mut s = if exp >= -4 && exp < p as i64 {
        let frac_digits = (p as i64 - 1 - exp).max(0) as usize;
        format_f(value, frac_digits, alt_form)
    } else {
        format_e(value, p - 1, uppercase, alt_form)
    };
    if !alt_form {
        match s.find(['e', 'E']) {
            Some(e_pos) => {
                let exp_part = s.split_off(e_pos);
                strip_trailing_zeros(&mut s);
                s.push_str(&exp_part);
            }
            None => strip_trailing_zeros(&mut s),
        }
    }
    s
}

/// Drop zeros after the decimal point, and the point if nothing is left.
fn strip_trailing_zeros(s: &mut String) {
    if s.contains('.') {
        let kept = s.trim_end_matches('0').trim_end_matches('.').len();
        s.truncate(kept);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
