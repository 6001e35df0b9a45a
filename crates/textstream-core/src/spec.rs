//! Conversion-spec builder.
//!
//! Turns the stream's sticky formatting state plus a value's static type into
//! a printf directive such as `%-8.3lf` or `%#llx`. The directive is built in
//! a fixed scratch area; [`MAX_SPEC_LEN`] is the longest directive any
//! supported type can produce and is checked against the scratch size at
//! compile time.

use crate::error::StreamError;
use crate::flags::FmtFlags;
use crate::printf::FormatArg;

/// Bytes available for one conversion directive.
pub const SPEC_SCRATCH_LEN: usize = 24;

/// `%` + `-+#` + five width digits + `.` + five precision digits + two
/// length letters + conversion letter.
pub const MAX_SPEC_LEN: usize = 1 + 3 + 5 + 1 + 5 + 2 + 1;

const _: () = assert!(MAX_SPEC_LEN <= SPEC_SCRATCH_LEN);

/// Semantic class of a formatted value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Signed,
    Unsigned,
    Float,
}

impl ValueKind {
    #[must_use]
    pub const fn is_integer(self) -> bool {
        !matches!(self, Self::Float)
    }
}

/// Primitive types rendered through the printf engine.
///
/// `TYPESTRING` is the length modifier plus the base-10 conversion letter for
/// the type; the builder swaps the letter for other bases.
pub trait PrintfType: Copy {
    const TYPESTRING: &'static str;
    const KIND: ValueKind;

    fn to_arg(self) -> FormatArg<'static>;
}

macro_rules! impl_printf_type {
    ($($t:ty => $typestring:literal, $kind:ident;)*) => ($(
        impl PrintfType for $t {
            const TYPESTRING: &'static str = $typestring;
            const KIND: ValueKind = ValueKind::$kind;

            fn to_arg(self) -> FormatArg<'static> {
                FormatArg::from(self)
            }
        }
    )*);
}

impl_printf_type! {
    i8 => "hhd", Signed;
    i16 => "hd", Signed;
    i32 => "d", Signed;
    i64 => "lld", Signed;
    isize => "zd", Signed;
    u16 => "hu", Unsigned;
    u32 => "u", Unsigned;
    u64 => "llu", Unsigned;
    usize => "zu", Unsigned;
    f32 => "f", Float;
    f64 => "lf", Float;
}

/// Fixed-size buffer holding one built directive.
#[derive(Debug, Clone, Copy)]
pub struct SpecScratch {
    bytes: [u8; SPEC_SCRATCH_LEN],
    len: usize,
}

impl SpecScratch {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            bytes: [0; SPEC_SCRATCH_LEN],
            len: 0,
        }
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    fn push(&mut self, byte: u8) -> Result<(), StreamError> {
        let slot = self
            .bytes
            .get_mut(self.len)
            .ok_or(StreamError::SpecOverflow {
                needed: self.len + 1,
            })?;
        *slot = byte;
        self.len += 1;
        Ok(())
    }

    fn push_all(&mut self, bytes: &[u8]) -> Result<(), StreamError> {
        bytes.iter().try_for_each(|&b| self.push(b))
    }

    fn push_dec(&mut self, mut n: u16) -> Result<(), StreamError> {
        let mut digits = [0u8; 5];
        let mut start = digits.len();
        loop {
            start -= 1;
            digits[start] = b'0' + (n % 10) as u8;
            n /= 10;
            if n == 0 {
                break;
            }
        }
        self.push_all(&digits[start..])
    }
}

impl Default for SpecScratch {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of everything that shapes one value's directive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversionSpec {
    pub kind: ValueKind,
    pub typestring: &'static str,
    pub base: u8,
    pub width: u16,
    pub precision: u16,
    pub flags: FmtFlags,
}

impl ConversionSpec {
    /// Spec for a value of type `T` under the given stream state.
    #[must_use]
    pub fn for_type<T: PrintfType>(base: u8, width: u16, precision: u16, flags: FmtFlags) -> Self {
        Self {
            kind: T::KIND,
            typestring: T::TYPESTRING,
            base,
            width,
            precision,
            flags,
        }
    }

    /// Final conversion letter after applying base and case flags.
    #[must_use]
    pub fn conversion(&self) -> u8 {
        let upper = self.flags.contains(FmtFlags::UPPERCASE);
        match self.kind {
            ValueKind::Float if self.flags.contains(FmtFlags::SCIENTIFIC) => {
                if upper { b'E' } else { b'e' }
            }
            ValueKind::Float => {
                if upper { b'F' } else { b'f' }
            }
            ValueKind::Signed | ValueKind::Unsigned => match self.base {
                16 if upper => b'X',
                16 => b'x',
                8 => b'o',
                2 if upper => b'B',
                2 => b'b',
                _ => self.typestring.as_bytes().last().copied().unwrap_or(b'd'),
            },
        }
    }

    /// Render the directive into a scratch buffer.
    pub fn build(&self) -> Result<SpecScratch, StreamError> {
        let mut out = SpecScratch::new();
        out.push(b'%')?;
        if self.width > 0 && self.flags.contains(FmtFlags::LEFT) {
            out.push(b'-')?;
        }
        if self.flags.contains(FmtFlags::SHOWPOS) {
            out.push(b'+')?;
        }
        if self.kind.is_integer()
            && self.flags.contains(FmtFlags::SHOWBASE)
            && matches!(self.base, 2 | 8 | 16)
        {
            out.push(b'#')?;
        }
        if self.width > 0 {
            out.push_dec(self.width)?;
        }
        if !self.kind.is_integer() {
            out.push(b'.')?;
            out.push_dec(self.precision)?;
        }
        let typestring = self.typestring.as_bytes();
        if let Some((_, length)) = typestring.split_last() {
            out.push_all(length)?;
        }
        out.push(self.conversion())?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn built<T: PrintfType>(base: u8, width: u16, precision: u16, flags: FmtFlags) -> String {
        let spec = ConversionSpec::for_type::<T>(base, width, precision, flags);
        String::from_utf8(spec.build().unwrap().as_bytes().to_vec()).unwrap()
    }

    #[test]
    fn decimal_integers_use_their_typestring() {
        assert_eq!(built::<i32>(10, 0, 6, FmtFlags::empty()), "%d");
        assert_eq!(built::<u32>(10, 0, 6, FmtFlags::empty()), "%u");
        assert_eq!(built::<i64>(10, 0, 6, FmtFlags::empty()), "%lld");
        assert_eq!(built::<u16>(10, 0, 6, FmtFlags::empty()), "%hu");
        assert_eq!(built::<usize>(10, 0, 6, FmtFlags::empty()), "%zu");
    }

    #[test]
    fn base_swaps_conversion_letter() {
        assert_eq!(built::<u32>(16, 0, 6, FmtFlags::empty()), "%x");
        assert_eq!(built::<u64>(16, 0, 6, FmtFlags::UPPERCASE), "%llX");
        assert_eq!(built::<i32>(8, 0, 6, FmtFlags::empty()), "%o");
        assert_eq!(built::<i8>(2, 0, 6, FmtFlags::empty()), "%hhb");
        assert_eq!(built::<i32>(7, 0, 6, FmtFlags::empty()), "%d");
    }

    #[test]
    fn width_and_flags_precede_length() {
        assert_eq!(built::<i32>(10, 8, 6, FmtFlags::LEFT), "%-8d");
        assert_eq!(built::<i32>(10, 0, 6, FmtFlags::LEFT), "%d");
        assert_eq!(built::<i32>(10, 4, 6, FmtFlags::SHOWPOS), "%+4d");
        assert_eq!(built::<u32>(16, 0, 6, FmtFlags::SHOWBASE), "%#x");
        assert_eq!(built::<u32>(10, 0, 6, FmtFlags::SHOWBASE), "%u");
    }

    #[test]
    fn floats_carry_precision() {
        assert_eq!(built::<f64>(10, 0, 6, FmtFlags::empty()), "%.6lf");
        assert_eq!(built::<f32>(16, 10, 2, FmtFlags::empty()), "%10.2f");
        assert_eq!(built::<f64>(10, 0, 3, FmtFlags::SCIENTIFIC), "%.3le");
        assert_eq!(
            built::<f64>(10, 0, 3, FmtFlags::SCIENTIFIC | FmtFlags::UPPERCASE),
            "%.3lE"
        );
    }

    #[test]
    fn worst_case_fits_scratch() {
        let flags = FmtFlags::LEFT | FmtFlags::SHOWPOS | FmtFlags::SHOWBASE;
        let longest_int = built::<u64>(16, u16::MAX, u16::MAX, flags);
        assert_eq!(longest_int, "%-+#65535llx");
        let longest_float = built::<f64>(10, u16::MAX, u16::MAX, flags);
        assert_eq!(longest_float, "%-+65535.65535lf");
        assert!(longest_float.len() <= MAX_SPEC_LEN);
    }
}
