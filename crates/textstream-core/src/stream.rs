//! The output stream.
//!
//! [`OutputStream`] keeps a write position separate from its buffer's logical
//! length. Writes land at the position, overwriting in place and extending
//! the buffer when they run past its end. [`OutputStream::flush`] makes the
//! position the committed length, so [`OutputStream::str`] always shows
//! exactly what has been committed.
//!
//! Invariants:
//! - `pos <= capacity()` at all times
//! - after `flush`, `len() == pos`
//! - a failed call leaves `pos`, `len()` and the buffer bytes as they were

use core::fmt;

use crate::buffer::{LinkedBuffer, OwnedBuffer, TextBuffer};
use crate::config::StreamConfig;
use crate::dispatch::TextWrite;
use crate::error::StreamError;
use crate::flags::FmtFlags;
use crate::metrics::{StreamMetrics, global_metrics};
use crate::printf::{self, FormatArg};
use crate::spec::{ConversionSpec, PrintfType};

/// Byte used for any gap the stream has to fill (seek past the end, flush
/// after such a seek). Never NUL, so committed text stays NUL-free.
pub const GAP_FILL: u8 = b' ';

/// Origin for [`OutputStream::seekp`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekDir {
    Begin,
    Current,
    /// The buffer's current logical length.
    End,
}

/// Text output stream over a [`TextBuffer`].
#[derive(Debug)]
pub struct OutputStream<B: TextBuffer> {
    buffer: B,
    pos: usize,
    flags: FmtFlags,
    width: u16,
    precision: u16,
    base: u8,
}

/// Stream that owns a growable buffer.
pub type StringStream = OutputStream<OwnedBuffer>;

/// Stream over caller-supplied memory of fixed size.
pub type LinkedStream<'a> = OutputStream<LinkedBuffer<'a>>;

impl StringStream {
    /// Empty stream with default formatting.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(StreamConfig::default())
    }

    #[must_use]
    pub fn with_config(config: StreamConfig) -> Self {
        let buffer = OwnedBuffer::with_capacity(config.initial_capacity, config.growth);
        Self::from_buffer(buffer, &config)
    }

    /// Stream seeded with `text`. The position starts at 0, so writes
    /// overwrite the seed from its first byte.
    #[must_use]
    pub fn with_text(text: &str) -> Self {
        let config = StreamConfig::default();
        let buffer = OwnedBuffer::from_vec(text.as_bytes().to_vec(), config.growth);
        Self::from_buffer(buffer, &config)
    }

    /// Replace the contents with `text` and move the position to its end.
    pub fn set_str(&mut self, text: &str) -> &mut Self {
        self.buffer.assign(text.as_bytes());
        self.pos = text.len();
        self
    }

    /// Flush and hand back the committed bytes.
    #[must_use]
    pub fn into_bytes(mut self) -> Vec<u8> {
        self.flush();
        self.buffer.into_vec()
    }

    /// Flush and hand back the committed text.
    pub fn into_string(self) -> Result<String, StreamError> {
        String::from_utf8(self.into_bytes()).map_err(|_| StreamError::InvalidUtf8)
    }
}

impl Default for StringStream {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> LinkedStream<'a> {
    /// Stream writing into `mem`. Writes that would need more than
    /// `mem.len()` bytes fail with [`StreamError::CapacityExceeded`].
    #[must_use]
    pub fn linked(mem: &'a mut [u8]) -> Self {
        Self::linked_with_config(mem, StreamConfig::default())
    }

    #[must_use]
    pub fn linked_with_config(mem: &'a mut [u8], config: StreamConfig) -> Self {
        Self::from_buffer(LinkedBuffer::new(mem), &config)
    }

    /// Flush and give the memory back, along with the committed length.
    #[must_use]
    pub fn into_inner(mut self) -> (&'a mut [u8], usize) {
        self.flush();
        let len = self.pos;
        (self.buffer.into_inner(), len)
    }
}

impl<B: TextBuffer> OutputStream<B> {
    /// Wrap an existing buffer; the position starts at 0.
    #[must_use]
    pub fn from_buffer(buffer: B, config: &StreamConfig) -> Self {
        Self {
            buffer,
            pos: 0,
            flags: config.flags,
            width: config.width,
            precision: config.precision,
            base: if (2..=36).contains(&config.base) {
                config.base
            } else {
                10
            },
        }
    }

    // -----------------------------------------------------------------------
    // Cursor and sizes
    // -----------------------------------------------------------------------

    /// Current write position.
    #[must_use]
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Logical length of the buffer, committed or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.buffer.capacity()
    }

    /// Largest length the buffer can ever reach.
    #[must_use]
    pub fn max_size(&self) -> usize {
        self.buffer.limit()
    }

    /// Bytes writable at the position without growing.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.buffer.capacity().saturating_sub(self.pos)
    }

    /// Raw logical contents, including bytes past the position that a flush
    /// would drop.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.buffer.as_bytes()
    }

    #[must_use]
    pub fn buffer(&self) -> &B {
        &self.buffer
    }

    /// Move the position. The target must land in `[0, capacity()]`.
    ///
    /// Seeking past the logical end is allowed; the gap is filled with
    /// [`GAP_FILL`] once something is written or flushed there.
    pub fn seekp(&mut self, offset: i64, dir: SeekDir) -> Result<&mut Self, StreamError> {
        let origin = match dir {
            SeekDir::Begin => 0,
            SeekDir::Current => self.pos,
            SeekDir::End => self.buffer.len(),
        };
        let capacity = self.buffer.capacity();
        let target = i64::try_from(origin)
            .ok()
            .and_then(|o| o.checked_add(offset))
            .ok_or(StreamError::SeekOutOfRange {
                target: i64::MAX,
                capacity,
            })?;
        match usize::try_from(target) {
            Ok(t) if t <= capacity => {
                self.pos = t;
                Ok(self)
            }
            _ => Err(StreamError::SeekOutOfRange { target, capacity }),
        }
    }

    /// Ensure `n` bytes can be written at the position, growing an owned
    /// buffer if needed. Returns the bytes writable afterwards.
    pub fn overflow(&mut self, n: usize) -> Result<usize, StreamError> {
        let end = self.checked_end(n)?;
        self.buffer.reserve(end);
        Ok(self.remaining())
    }

    /// Commit everything up to the position; bytes past it are dropped.
    pub fn flush(&mut self) -> &mut Self {
        self.buffer.resize(self.pos, GAP_FILL);
        StreamMetrics::inc(&global_metrics().flushes);
        self
    }

    /// Flush, then return the committed bytes.
    pub fn committed(&mut self) -> &[u8] {
        self.flush();
        self.buffer.as_bytes()
    }

    /// Flush, then return the committed text.
    pub fn str(&mut self) -> Result<&str, StreamError> {
        Ok(core::str::from_utf8(self.committed())?)
    }

    // -----------------------------------------------------------------------
    // Formatting state
    // -----------------------------------------------------------------------

    #[must_use]
    pub fn base(&self) -> u8 {
        self.base
    }

    #[must_use]
    pub fn width(&self) -> u16 {
        self.width
    }

    #[must_use]
    pub fn precision(&self) -> u16 {
        self.precision
    }

    #[must_use]
    pub fn flags(&self) -> FmtFlags {
        self.flags
    }

    /// Numeric base for integers. Bases 2, 8 and 16 have printf conversions;
    /// any other accepted base renders in decimal.
    pub fn set_base(&mut self, base: u8) -> Result<&mut Self, StreamError> {
        if !(2..=36).contains(&base) {
            return Err(StreamError::InvalidBase(base));
        }
        self.base = base;
        Ok(self)
    }

    /// Minimum field width for numbers. Sticky until changed.
    pub fn set_width(&mut self, width: u16) -> &mut Self {
        self.width = width;
        self
    }

    /// Digits after the decimal separator. Sticky until changed.
    pub fn set_precision(&mut self, precision: u16) -> &mut Self {
        self.precision = precision;
        self
    }

    pub fn set_flags(&mut self, flags: FmtFlags) -> &mut Self {
        self.flags.insert(flags);
        self
    }

    pub fn unset_flags(&mut self, flags: FmtFlags) -> &mut Self {
        self.flags.remove(flags);
        self
    }

    /// Accepted for interface compatibility; output is not localized.
    pub fn set_decimal_separator(&mut self, _separator: char) -> &mut Self {
        self
    }

    /// Accepted for interface compatibility; output is not localized.
    pub fn set_thousand_separator(&mut self, _separator: char) -> &mut Self {
        self
    }

    /// Apply a flag value written through the stream: base selectors set the
    /// base, `LEFT`/`RIGHT` replace each other, anything else is added.
    pub fn apply_flags(&mut self, flags: FmtFlags) -> &mut Self {
        if let Some(base) = flags.as_base() {
            self.base = base;
        } else if flags == FmtFlags::LEFT {
            self.flags.insert(FmtFlags::LEFT);
            self.flags.remove(FmtFlags::RIGHT);
        } else if flags == FmtFlags::RIGHT {
            self.flags.insert(FmtFlags::RIGHT);
            self.flags.remove(FmtFlags::LEFT);
        } else {
            self.flags.insert(flags);
        }
        self
    }

    // -----------------------------------------------------------------------
    // Writes
    // -----------------------------------------------------------------------

    /// Write raw bytes at the position. All or nothing: a linked stream
    /// without room for every byte writes none of them.
    pub fn write(&mut self, bytes: &[u8]) -> Result<&mut Self, StreamError> {
        let end = self.checked_end(bytes.len())?;
        self.extend_to(end);
        self.buffer.as_bytes_mut()[self.pos..end].copy_from_slice(bytes);
        self.pos = end;
        StreamMetrics::add(&global_metrics().bytes_written, bytes.len());
        Ok(self)
    }

    /// Write a typed value through its [`TextWrite`] implementation.
    pub fn write_value<T: TextWrite + ?Sized>(&mut self, value: &T) -> Result<&mut Self, StreamError> {
        StreamMetrics::inc(&global_metrics().values_written);
        value.text_write(self)?;
        Ok(self)
    }

    /// Write one character, UTF-8 encoded.
    pub fn put(&mut self, c: char) -> Result<&mut Self, StreamError> {
        self.write_value(&c)
    }

    /// Text path: like [`write`](Self::write) but refuses NUL bytes.
    pub fn write_text(&mut self, bytes: &[u8]) -> Result<&mut Self, StreamError> {
        if let Some(i) = bytes.iter().position(|&b| b == 0) {
            StreamMetrics::inc(&global_metrics().nul_rejections);
            return Err(StreamError::NulInText {
                offset: self.pos + i,
            });
        }
        self.write(bytes)
    }

    /// Render `value` with the directive built from the current state.
    pub fn write_number<T: PrintfType>(&mut self, value: T) -> Result<&mut Self, StreamError> {
        let spec = ConversionSpec::for_type::<T>(self.base, self.width, self.precision, self.flags);
        let directive = spec.build()?;
        self.vformat(directive.as_bytes(), &[value.to_arg()])?;
        Ok(self)
    }

    /// Apply a printf template at the position. Returns the bytes written.
    pub fn format(&mut self, fmt: &str, args: &[FormatArg<'_>]) -> Result<usize, StreamError> {
        self.vformat(fmt.as_bytes(), args)
    }

    /// Byte-template form of [`format`](Self::format).
    ///
    /// The first attempt formats into a window sized by
    /// [`printf::estimate_len`]. If the engine reports it needs more, the
    /// window grows to the exact size and the call is repeated once.
    pub fn vformat(&mut self, fmt: &[u8], args: &[FormatArg<'_>]) -> Result<usize, StreamError> {
        StreamMetrics::inc(&global_metrics().format_calls);
        let committed = self.buffer.len();
        let start = self.pos;

        let guess = printf::estimate_len(fmt, args);
        let window_end = start.saturating_add(guess).min(self.buffer.limit());
        // Committed bytes under the window; the engine writes partial output
        // before it can fail.
        let mut shadow = Shadow::capture(self.buffer.as_bytes(), start, window_end);
        self.extend_to(window_end);

        let first = printf::snprintf(&mut self.buffer.as_bytes_mut()[start..window_end], fmt, args);
        let mut needed = match first {
            Ok(n) => n,
            Err(err) => return Err(self.roll_back(committed, &shadow, err.into())),
        };

        if needed > window_end - start {
            StreamMetrics::inc(&global_metrics().format_retries);
            let end = match self.checked_end(needed) {
                Ok(end) => end,
                Err(err) => return Err(self.roll_back(committed, &shadow, err)),
            };
            shadow.widen(&self.buffer.as_bytes()[..committed], end);
            self.extend_to(end);
            let second = printf::snprintf(&mut self.buffer.as_bytes_mut()[start..end], fmt, args);
            needed = match second {
                Ok(n) => n,
                Err(err) => return Err(self.roll_back(committed, &shadow, err.into())),
            };
        }

        self.pos = start + needed;
        self.buffer.resize(committed.max(self.pos), GAP_FILL);
        StreamMetrics::add(&global_metrics().bytes_written, needed);
        Ok(needed)
    }

    // -----------------------------------------------------------------------
    // Internal
    // -----------------------------------------------------------------------

    /// `pos + n`, or the capacity error a linked buffer raises.
    fn checked_end(&self, n: usize) -> Result<usize, StreamError> {
        let limit = self.buffer.limit();
        match self.pos.checked_add(n) {
            Some(end) if end <= limit => Ok(end),
            _ => {
                StreamMetrics::inc(&global_metrics().capacity_violations);
                Err(StreamError::CapacityExceeded {
                    position: self.pos,
                    requested: n,
                    capacity: limit,
                })
            }
        }
    }

    /// Undo a failed format: put back the shadowed bytes and the length.
    fn roll_back(&mut self, committed: usize, shadow: &Shadow, err: StreamError) -> StreamError {
        self.buffer.resize(committed, GAP_FILL);
        let bytes = self.buffer.as_bytes_mut();
        bytes[shadow.start..shadow.start + shadow.saved.len()].copy_from_slice(&shadow.saved);
        err
    }

    /// Grow the logical length to `end` if it is shorter.
    fn extend_to(&mut self, end: usize) {
        if end > self.buffer.len() {
            self.buffer.resize(end, GAP_FILL);
        }
    }
}

/// Copy of the committed bytes a format window overlaps.
struct Shadow {
    start: usize,
    saved: Vec<u8>,
}

impl Shadow {
    fn capture(committed: &[u8], start: usize, end: usize) -> Self {
        let start = start.min(committed.len());
        let end = end.clamp(start, committed.len());
        Self {
            start,
            saved: committed[start..end].to_vec(),
        }
    }

    /// Extend the copy so it covers the window up to `end`.
    fn widen(&mut self, committed: &[u8], end: usize) {
        let covered = self.start + self.saved.len();
        let end = end.clamp(covered, committed.len().max(covered));
        self.saved.extend_from_slice(&committed[covered..end]);
    }
}

impl<B: TextBuffer> fmt::Write for OutputStream<B> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.write_text(s.as_bytes()).map(|_| ()).map_err(|_| fmt::Error)
    }
}

/// Apply a printf template to a stream, converting each argument with
/// [`FormatArg::from`].
///
/// ```
/// use textstream_core::{StringStream, sformat};
///
/// let mut os = StringStream::new();
/// sformat!(os, "%s=%04d", "id", 42).unwrap();
/// assert_eq!(os.str().unwrap(), "id=0042");
/// ```
#[macro_export]
macro_rules! sformat {
    ($os:expr, $fmt:expr $(, $arg:expr)* $(,)?) => {
        $os.format($fmt, &[$($crate::printf::FormatArg::from($arg)),*])
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::{Endl, Ends};

    #[test]
    fn seeded_stream_starts_at_zero() {
        let os = StringStream::with_text("abc");
        assert_eq!(os.pos(), 0);
        assert_eq!(os.len(), 3);
    }

    #[test]
    fn raw_write_grows_owned_buffer() {
        let mut os = StringStream::new();
        os.write(b"hello").unwrap().write(b" world").unwrap();
        assert_eq!(os.str().unwrap(), "hello world");
    }

    #[test]
    fn overflow_reports_room_without_changing_length() {
        let mut os = StringStream::new();
        let room = os.overflow(100).unwrap();
        assert!(room >= 100);
        assert_eq!(os.len(), 0);
    }

    #[test]
    fn flush_truncates_to_position() {
        let mut os = StringStream::with_text("abcdef");
        os.seekp(2, SeekDir::Begin).unwrap();
        os.flush();
        assert_eq!(os.as_bytes(), b"ab");
    }

    #[test]
    fn seek_relative_to_current_and_end() {
        let mut os = StringStream::new();
        os.write(b"0123456789").unwrap();
        os.seekp(-4, SeekDir::Current).unwrap();
        assert_eq!(os.pos(), 6);
        os.seekp(-1, SeekDir::End).unwrap();
        assert_eq!(os.pos(), 9);
    }

    #[test]
    fn seek_outside_capacity_fails() {
        let mut os = StringStream::new();
        let err = os.seekp(-1, SeekDir::Begin).unwrap_err();
        assert!(matches!(err, StreamError::SeekOutOfRange { target: -1, .. }));
        let cap = os.capacity() as i64;
        assert!(os.seekp(cap + 1, SeekDir::Begin).is_err());
        assert_eq!(os.pos(), 0);
    }

    #[test]
    fn seek_past_end_fills_gap_with_spaces() {
        let mut os = StringStream::new();
        os.overflow(16).unwrap();
        os.write(b"ab").unwrap();
        os.seekp(2, SeekDir::Current).unwrap();
        os.write(b"cd").unwrap();
        assert_eq!(os.str().unwrap(), "ab  cd");
    }

    #[test]
    fn set_base_rejects_out_of_range() {
        let mut os = StringStream::new();
        assert_eq!(os.set_base(1).unwrap_err(), StreamError::InvalidBase(1));
        assert_eq!(os.set_base(37).unwrap_err(), StreamError::InvalidBase(37));
        assert!(os.set_base(36).is_ok());
    }

    #[test]
    fn vformat_retries_when_guess_is_short() {
        let mut os = StringStream::new();
        // 1e300 needs ~300 integer digits, far past the per-directive guess.
        let n = os.format("%f", &[FormatArg::Float(1e300)]).unwrap();
        assert_eq!(n, os.pos());
        let text = os.str().unwrap();
        assert!(text.starts_with("1000000000"));
        assert!(text.ends_with(".000000"));
    }

    #[test]
    fn vformat_restores_length_on_error() {
        let mut os = StringStream::with_text("keep");
        os.seekp(4, SeekDir::Begin).unwrap();
        assert!(os.format("%d %d", &[FormatArg::SignedInt(1)]).is_err());
        assert_eq!(os.as_bytes(), b"keep");
        assert_eq!(os.pos(), 4);
    }

    #[test]
    fn failed_format_inside_committed_text_keeps_bytes() {
        let mut os = StringStream::with_text("abcdef");
        let err = os.format("%d %d", &[FormatArg::SignedInt(7)]).unwrap_err();
        assert!(matches!(err, StreamError::Format(_)));
        assert_eq!(os.as_bytes(), b"abcdef");
        assert_eq!(os.pos(), 0);
    }

    #[test]
    fn failed_retry_on_linked_stream_keeps_bytes() {
        let mut mem = [0u8; 8];
        let mut os = LinkedStream::linked(&mut mem);
        os.write(b"abcdefgh").unwrap();
        os.seekp(2, SeekDir::Begin).unwrap();
        let err = os.format("%s", &[FormatArg::from("XXXXXXXXXX")]).unwrap_err();
        assert!(matches!(err, StreamError::CapacityExceeded { position: 2, .. }));
        assert_eq!(os.as_bytes(), b"abcdefgh");
        assert_eq!(os.pos(), 2);
    }

    #[test]
    fn shadow_widens_only_over_committed_bytes() {
        let mut shadow = Shadow::capture(b"abcdef", 2, 4);
        assert_eq!(shadow.saved, b"cd");
        shadow.widen(b"abcdef", 100);
        assert_eq!(shadow.saved, b"cdef");
        let past_end = Shadow::capture(b"ab", 5, 9);
        assert_eq!((past_end.start, past_end.saved.len()), (2, 0));
    }

    #[test]
    fn set_str_positions_at_end() {
        let mut os = StringStream::new();
        os.set_str("abc");
        os.write(b"d").unwrap();
        assert_eq!(os.str().unwrap(), "abcd");
    }

    #[test]
    fn fmt_write_rejects_nul() {
        use core::fmt::Write;
        let mut os = StringStream::new();
        write!(os, "{}-{}", 1, "x").unwrap();
        assert!(write!(os, "a\0b").is_err());
        assert_eq!(os.str().unwrap(), "1-x");
    }

    #[test]
    fn sformat_macro_converts_arguments() {
        let mut os = StringStream::new();
        let name = String::from("pi");
        sformat!(os, "%s=%.2f", &name, 3.14159).unwrap();
        assert_eq!(os.str().unwrap(), "pi=3.14");
    }

    #[test]
    fn into_inner_returns_committed_length() {
        let mut mem = [0u8; 16];
        let mut os = LinkedStream::linked(&mut mem);
        os.write_value(&12).unwrap().write_value(&Endl).unwrap();
        let (mem, len) = os.into_inner();
        assert_eq!(&mem[..len], b"12\n");
    }

    #[test]
    fn ends_emits_nul_through_raw_path() {
        let mut os = StringStream::new();
        os.write_value("ab").unwrap().write_value(&Ends).unwrap();
        assert_eq!(os.committed(), b"ab\0");
    }
}
