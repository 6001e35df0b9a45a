//! Compile-time dispatch of values to their text rendering.
//!
//! Every type that can be written to a stream implements [`TextWrite`].
//! Numbers go through the printf engine with a directive built from the
//! stream's state; text is copied after a NUL check; manipulators act on the
//! stream itself. User types implement [`TextWrite`] by writing their fields.

use crate::buffer::TextBuffer;
use crate::error::StreamError;
use crate::flags::FmtFlags;
use crate::stream::OutputStream;

/// A value that knows how to render itself into an [`OutputStream`].
pub trait TextWrite {
    fn text_write<B: TextBuffer>(&self, os: &mut OutputStream<B>) -> Result<(), StreamError>;
}

macro_rules! impl_text_write_number {
    ($($t:ty),* $(,)?) => ($(
        impl TextWrite for $t {
            fn text_write<B: TextBuffer>(&self, os: &mut OutputStream<B>) -> Result<(), StreamError> {
                os.write_number(*self).map(|_| ())
            }
        }
    )*);
}

impl_text_write_number!(i16, i32, i64, isize, u16, u32, u64, usize, f32, f64);

// Signed bytes are numbers (`-7i8` writes "-7"); only `u8` is a raw text byte.
impl_text_write_number!(i8);

/// A single byte, written as-is.
impl TextWrite for u8 {
    fn text_write<B: TextBuffer>(&self, os: &mut OutputStream<B>) -> Result<(), StreamError> {
        os.write_text(core::slice::from_ref(self)).map(|_| ())
    }
}

impl TextWrite for char {
    fn text_write<B: TextBuffer>(&self, os: &mut OutputStream<B>) -> Result<(), StreamError> {
        let mut utf8 = [0u8; 4];
        os.write_text(self.encode_utf8(&mut utf8).as_bytes())
            .map(|_| ())
    }
}

impl TextWrite for bool {
    fn text_write<B: TextBuffer>(&self, os: &mut OutputStream<B>) -> Result<(), StreamError> {
        let text: &[u8] = if *self { b"true" } else { b"false" };
        os.write_text(text).map(|_| ())
    }
}

impl TextWrite for str {
    fn text_write<B: TextBuffer>(&self, os: &mut OutputStream<B>) -> Result<(), StreamError> {
        os.write_text(self.as_bytes()).map(|_| ())
    }
}

impl TextWrite for String {
    fn text_write<B: TextBuffer>(&self, os: &mut OutputStream<B>) -> Result<(), StreamError> {
        self.as_str().text_write(os)
    }
}

impl TextWrite for [u8] {
    fn text_write<B: TextBuffer>(&self, os: &mut OutputStream<B>) -> Result<(), StreamError> {
        os.write_text(self).map(|_| ())
    }
}

impl TextWrite for Vec<u8> {
    fn text_write<B: TextBuffer>(&self, os: &mut OutputStream<B>) -> Result<(), StreamError> {
        self.as_slice().text_write(os)
    }
}

impl<T: TextWrite + ?Sized> TextWrite for &T {
    fn text_write<B: TextBuffer>(&self, os: &mut OutputStream<B>) -> Result<(), StreamError> {
        (**self).text_write(os)
    }
}

impl<T: TextWrite + ?Sized> TextWrite for Box<T> {
    fn text_write<B: TextBuffer>(&self, os: &mut OutputStream<B>) -> Result<(), StreamError> {
        (**self).text_write(os)
    }
}

/// Pointers render as their address, as an unsigned machine word.
impl<T: ?Sized> TextWrite for *const T {
    fn text_write<B: TextBuffer>(&self, os: &mut OutputStream<B>) -> Result<(), StreamError> {
        os.write_number(self.cast::<()>() as usize).map(|_| ())
    }
}

impl<T: ?Sized> TextWrite for *mut T {
    fn text_write<B: TextBuffer>(&self, os: &mut OutputStream<B>) -> Result<(), StreamError> {
        self.cast_const().text_write(os)
    }
}

/// Writing flags changes the stream's state instead of producing text.
impl TextWrite for FmtFlags {
    fn text_write<B: TextBuffer>(&self, os: &mut OutputStream<B>) -> Result<(), StreamError> {
        os.apply_flags(*self);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Manipulators
// ---------------------------------------------------------------------------

/// Write a newline, then flush.
#[derive(Debug, Clone, Copy, Default)]
pub struct Endl;

/// Commit everything up to the position.
#[derive(Debug, Clone, Copy, Default)]
pub struct Flush;

/// Write a single NUL byte, bypassing the text-path check.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ends;

impl TextWrite for Endl {
    fn text_write<B: TextBuffer>(&self, os: &mut OutputStream<B>) -> Result<(), StreamError> {
        os.write(b"\n")?;
        os.flush();
        Ok(())
    }
}

impl TextWrite for Flush {
    fn text_write<B: TextBuffer>(&self, os: &mut OutputStream<B>) -> Result<(), StreamError> {
        os.flush();
        Ok(())
    }
}

impl TextWrite for Ends {
    fn text_write<B: TextBuffer>(&self, os: &mut OutputStream<B>) -> Result<(), StreamError> {
        os.write(&[0]).map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::StringStream;

    fn render<T: TextWrite + ?Sized>(value: &T) -> String {
        let mut os = StringStream::new();
        os.write_value(value).unwrap();
        os.into_string().unwrap()
    }

    #[test]
    fn numbers_render_in_decimal_by_default() {
        assert_eq!(render(&42i32), "42");
        assert_eq!(render(&-7i8), "-7");
        assert_eq!(render(&u64::MAX), "18446744073709551615");
        assert_eq!(render(&i64::MIN), "-9223372036854775808");
        assert_eq!(render(&1.5f64), "1.500000");
        assert_eq!(render(&0.25f32), "0.250000");
    }

    #[test]
    fn signed_byte_is_a_number_unsigned_byte_is_text() {
        assert_eq!(render(&65i8), "65");
        assert_eq!(render(&65u8), "A");
        assert_eq!(render(&i8::MIN), "-128");
    }

    #[test]
    fn text_values() {
        assert_eq!(render(&b'A'), "A");
        assert_eq!(render(&'é'), "é");
        assert_eq!(render(&true), "true");
        assert_eq!(render(&false), "false");
        assert_eq!(render("str"), "str");
        assert_eq!(render(&String::from("owned")), "owned");
        assert_eq!(render(&b"bytes"[..]), "bytes");
        assert_eq!(render(&Box::new(5u32)), "5");
    }

    #[test]
    fn nul_text_is_rejected() {
        let mut os = StringStream::new();
        assert_eq!(
            os.write_value(&0u8).unwrap_err(),
            StreamError::NulInText { offset: 0 }
        );
        assert!(os.write_value(&'\0').is_err());
        assert!(os.write_value("a\0").is_err());
        assert!(os.write_value(&vec![b'x', 0]).is_err());
        assert_eq!(os.len(), 0);
    }

    #[test]
    fn pointer_renders_address() {
        let ptr = 0x1000usize as *const u8;
        assert_eq!(render(&ptr), "4096");
        let null: *mut u32 = core::ptr::null_mut();
        assert_eq!(render(&null), "0");
    }

    #[test]
    fn flag_values_update_state() {
        let mut os = StringStream::new();
        os.write_value(&FmtFlags::HEX).unwrap();
        assert_eq!(os.base(), 16);
        os.write_value(&FmtFlags::LEFT).unwrap();
        os.write_value(&FmtFlags::RIGHT).unwrap();
        assert!(os.flags().contains(FmtFlags::RIGHT));
        assert!(!os.flags().contains(FmtFlags::LEFT));
        os.write_value(&FmtFlags::SHOWBASE).unwrap();
        os.write_value(&255u32).unwrap();
        assert_eq!(os.str().unwrap(), "0xff");
    }

    #[test]
    fn endl_commits_line() {
        let mut os = StringStream::with_text("stale tail");
        os.write_value("ok").unwrap().write_value(&Endl).unwrap();
        assert_eq!(os.as_bytes(), b"ok\n");
    }

    #[test]
    fn flush_manipulator_commits() {
        let mut os = StringStream::with_text("abcdef");
        os.write_value("xy").unwrap().write_value(&Flush).unwrap();
        assert_eq!(os.as_bytes(), b"xy");
    }

    struct Point {
        x: i32,
        y: i32,
    }

    impl TextWrite for Point {
        fn text_write<B: TextBuffer>(&self, os: &mut OutputStream<B>) -> Result<(), StreamError> {
            os.write_value(&'(')?
                .write_value(&self.x)?
                .write_value(", ")?
                .write_value(&self.y)?
                .write_value(&')')?;
            Ok(())
        }
    }

    #[test]
    fn user_types_compose() {
        assert_eq!(render(&Point { x: 3, y: -4 }), "(3, -4)");
        let boxed: Box<Point> = Box::new(Point { x: 1, y: 2 });
        assert_eq!(render(&boxed), "(1, 2)");
    }
}
