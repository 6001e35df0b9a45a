use textstream_core::{
    Endl, Ends, FmtFlags, FormatArg, GrowthPolicy, LinkedStream, PrintfType, SeekDir,
    StreamConfig, StreamError, StringStream, TextWrite, global_metrics,
};

fn written<T: TextWrite>(base: u8, value: T) -> String {
    let mut os = StringStream::new();
    os.set_base(base).unwrap();
    os.write_value(&value).unwrap();
    os.into_string().unwrap()
}

fn expected_in_base<T>(base: u8, value: T) -> String
where
    T: std::fmt::Display + std::fmt::LowerHex + std::fmt::Octal + std::fmt::Binary,
{
    match base {
        16 => format!("{value:x}"),
        8 => format!("{value:o}"),
        2 => format!("{value:b}"),
        _ => format!("{value}"),
    }
}

fn check_integer_roundtrip<T>(values: &[T])
where
    T: PrintfType
        + TextWrite
        + std::fmt::Debug
        + std::fmt::Display
        + std::fmt::LowerHex
        + std::fmt::Octal
        + std::fmt::Binary,
{
    for &value in values {
        for base in [2u8, 8, 10, 16] {
            assert_eq!(
                written(base, value),
                expected_in_base(base, value),
                "value {value:?} in base {base}"
            );
        }
    }
}

#[test]
fn integers_roundtrip_through_every_printf_base() {
    check_integer_roundtrip(&[0i8, 1, -1, i8::MIN, i8::MAX]);
    check_integer_roundtrip(&[0i16, 300, -300, i16::MIN, i16::MAX]);
    check_integer_roundtrip(&[0i32, 255, -255, i32::MIN, i32::MAX]);
    check_integer_roundtrip(&[0i64, 1 << 40, -(1 << 40), i64::MIN, i64::MAX]);
    check_integer_roundtrip(&[0isize, 4096, -4096, isize::MIN, isize::MAX]);
    check_integer_roundtrip(&[0u16, 255, u16::MAX]);
    check_integer_roundtrip(&[0u32, 255, 4096, u32::MAX]);
    check_integer_roundtrip(&[0u64, 1 << 63, u64::MAX]);
    check_integer_roundtrip(&[0usize, 4096, usize::MAX]);
}

#[test]
fn hex_then_endl_commits_line() {
    let mut os = StringStream::new();
    os.set_base(16).unwrap();
    os.write_value(&4096).unwrap();
    assert_eq!(os.str().unwrap(), "1000");
    os.write_value(&Endl).unwrap();
    assert_eq!(os.str().unwrap(), "1000\n");
    assert_eq!(os.len(), os.pos());
}

#[test]
fn unsigned_255_in_hex() {
    assert_eq!(written(16, 255u32), "ff");
}

#[test]
fn endl_appends_one_newline_and_flushes() {
    let mut os = StringStream::with_text("0123456789");
    os.write(b"ab").unwrap();
    let before = os.pos();
    os.write_value(&Endl).unwrap();
    assert_eq!(os.pos(), before + 1);
    assert_eq!(os.len(), os.pos());
    assert_eq!(os.as_bytes(), b"ab\n");
}

#[test]
fn growth_preserves_written_prefix() {
    let mut os = StringStream::with_config(StreamConfig {
        growth: GrowthPolicy::Doubling,
        ..StreamConfig::default()
    });
    let mut expected = Vec::new();
    for i in 0..2000u32 {
        let chunk = format!("{i};");
        let capacity_before = os.capacity();
        os.write(chunk.as_bytes()).unwrap();
        expected.extend_from_slice(chunk.as_bytes());
        if os.capacity() != capacity_before {
            assert_eq!(&os.as_bytes()[..expected.len()], expected.as_slice());
        }
    }
    assert_eq!(os.committed(), expected.as_slice());
}

#[test]
fn page_aligned_growth_rounds_capacity() {
    let mut os = StringStream::with_config(StreamConfig {
        growth: GrowthPolicy::PageAligned,
        ..StreamConfig::default()
    });
    os.write(b"x").unwrap();
    assert_eq!(os.capacity() % 4096, 0);
    os.write(&[b'y'; 5000]).unwrap();
    assert_eq!(os.capacity() % 4096, 0);
    assert_eq!(os.len(), 5001);
}

#[test]
fn linked_stream_never_writes_outside_its_memory() {
    let mut mem = [b'#'; 12];
    let (head, tail) = mem.split_at_mut(8);
    {
        let mut os = LinkedStream::linked(head);
        os.write(b"abcdef").unwrap();

        let err = os.write(b"ghij").unwrap_err();
        assert_eq!(
            err,
            StreamError::CapacityExceeded {
                position: 6,
                requested: 4,
                capacity: 8,
            }
        );
        assert_eq!(os.pos(), 6);

        // Needs 8 bytes with only 2 left: the retry path must refuse to grow.
        let err = os.write_value(&12_345_678i32).unwrap_err();
        assert!(matches!(err, StreamError::CapacityExceeded { .. }));
        assert_eq!(os.pos(), 6);
        assert_eq!(os.len(), 6);

        assert!(os.overflow(3).is_err());
        assert_eq!(os.overflow(2).unwrap(), 2);
        assert_eq!(os.committed(), b"abcdef");
    }
    assert_eq!(tail, b"####");
}

#[test]
fn linked_stream_fills_exactly_to_capacity() {
    let mut mem = [0u8; 4];
    let mut os = LinkedStream::linked(&mut mem);
    os.write_value(&1234u32).unwrap();
    assert_eq!(os.remaining(), 0);
    assert!(os.write_value(&'x').is_err());
    let (mem, len) = os.into_inner();
    assert_eq!(&mem[..len], b"1234");
}

#[test]
fn seek_back_then_flush_drops_trailing_bytes() {
    let mut os = StringStream::new();
    os.write_value("hello world").unwrap();
    os.seekp(5, SeekDir::Begin).unwrap();
    os.flush();
    assert_eq!(os.str().unwrap(), "hello");
}

#[test]
fn overwrite_within_seeded_text_is_in_place() {
    let mut os = StringStream::with_text("abc");
    os.seekp(1, SeekDir::Begin).unwrap();
    os.put('X').unwrap();
    assert_eq!(os.as_bytes(), b"aXc");
    os.flush();
    assert_eq!(os.as_bytes(), b"aX");
}

#[test]
fn nul_rejected_on_text_path_but_ends_emits_it() {
    let mut os = StringStream::new();
    os.write_value("ab").unwrap();
    let err = os.write_value("c\0d").unwrap_err();
    assert_eq!(err, StreamError::NulInText { offset: 3 });
    assert_eq!(os.pos(), 2);

    os.write_value(&Ends).unwrap().write_value("z").unwrap();
    let committed = os.committed();
    assert_eq!(committed, b"ab\0z");
    assert_eq!(committed.iter().position(|&b| b == 0), Some(2));
}

#[test]
fn width_precision_and_flags_shape_numbers() {
    let mut os = StringStream::new();
    os.set_width(6);
    os.write_value(&42).unwrap().write_value(&'|').unwrap();
    os.set_flags(FmtFlags::LEFT);
    os.write_value(&42).unwrap().write_value(&'|').unwrap();
    os.unset_flags(FmtFlags::LEFT).set_width(0).set_precision(2);
    os.write_value(&3.14159).unwrap().write_value(&'|').unwrap();
    os.set_flags(FmtFlags::SHOWPOS);
    os.write_value(&7i64).unwrap().write_value(&'|').unwrap();
    os.unset_flags(FmtFlags::SHOWPOS)
        .set_flags(FmtFlags::SCIENTIFIC | FmtFlags::UPPERCASE);
    os.write_value(&12345.0f64).unwrap();
    assert_eq!(os.str().unwrap(), "    42|42    |3.14|+7|1.23E+04");
}

#[test]
fn separators_are_accepted_and_ignored() {
    let mut os = StringStream::new();
    os.set_decimal_separator(',').set_thousand_separator('.');
    os.set_precision(1);
    os.write_value(&1234.5).unwrap();
    assert_eq!(os.str().unwrap(), "1234.5");
}

#[test]
fn uncommon_base_falls_back_to_decimal() {
    assert_eq!(written(7, 100u32), "100");
    assert_eq!(written(36, -5i32), "-5");
}

#[test]
fn large_float_takes_retry_path() {
    let before = global_metrics().snapshot();
    let mut os = StringStream::new();
    os.set_precision(0);
    os.write_value(&1e200f64).unwrap();
    let delta = global_metrics().snapshot().since(&before);
    assert!(delta.format_retries >= 1);
    let text = os.into_string().unwrap();
    assert_eq!(text.len(), 201);
    assert!(text.starts_with('1'));
}

#[test]
fn format_template_with_mixed_arguments() {
    let mut os = StringStream::new();
    os.write_value("[").unwrap();
    let n = os
        .format(
            "%s:%05d:%x:%c",
            &[
                FormatArg::from("k"),
                FormatArg::from(42),
                FormatArg::from(255u32),
                FormatArg::Char(b'!'),
            ],
        )
        .unwrap();
    assert_eq!(n, 12);
    os.write_value("]").unwrap();
    assert_eq!(os.str().unwrap(), "[k:00042:ff:!]");
}

#[test]
fn format_errors_leave_stream_untouched() {
    let mut os = StringStream::new();
    os.write_value("abc").unwrap();
    let err = os.format("%s", &[FormatArg::from(1)]).unwrap_err();
    assert!(matches!(err, StreamError::Format(_)));
    assert_eq!(os.pos(), 3);
    assert_eq!(os.str().unwrap(), "abc");
}

#[test]
fn failed_format_after_seek_back_keeps_committed_bytes() {
    let mut os = StringStream::with_text("abcdef");
    os.seekp(1, SeekDir::Begin).unwrap();
    let err = os
        .format("%s-%d", &[FormatArg::from("zz"), FormatArg::from("no")])
        .unwrap_err();
    assert!(matches!(err, StreamError::Format(_)));
    assert_eq!(os.as_bytes(), b"abcdef");
    assert_eq!(os.pos(), 1);
    os.seekp(0, SeekDir::End).unwrap();
    assert_eq!(os.str().unwrap(), "abcdef");
}

#[test]
fn linked_number_past_capacity_inside_committed_text_keeps_bytes() {
    let mut mem = *b"########";
    let mut os = LinkedStream::linked(&mut mem);
    os.write(b"abcdefgh").unwrap();
    os.seekp(6, SeekDir::Begin).unwrap();
    let err = os.write_value(&123_456u32).unwrap_err();
    assert!(matches!(
        err,
        StreamError::CapacityExceeded {
            position: 6,
            requested: 6,
            capacity: 8
        }
    ));
    assert_eq!(os.as_bytes(), b"abcdefgh");
    os.seekp(0, SeekDir::End).unwrap();
    let (mem, len) = os.into_inner();
    assert_eq!(&mem[..len], b"abcdefgh");
}

struct Temperature {
    celsius: f64,
    station: &'static str,
}

impl TextWrite for Temperature {
    fn text_write<B: textstream_core::TextBuffer>(
        &self,
        os: &mut textstream_core::OutputStream<B>,
    ) -> Result<(), StreamError> {
        let saved = os.precision();
        os.write_value(self.station)?.write_value("=")?;
        os.set_precision(1);
        let result = os.write_value(&self.celsius).map(|_| ());
        os.set_precision(saved);
        result
    }
}

#[test]
fn user_defined_types_delegate_back_into_stream() {
    let mut mem = [0u8; 32];
    let mut os = LinkedStream::linked(&mut mem);
    let readings = [
        Temperature {
            celsius: 21.24,
            station: "north",
        },
        Temperature {
            celsius: -3.5,
            station: "south",
        },
    ];
    for reading in &readings {
        os.write_value(reading).unwrap().write_value(&Endl).unwrap();
    }
    assert_eq!(os.str().unwrap(), "north=21.2\nsouth=-3.5\n");
    assert_eq!(os.precision(), 6);
}

#[test]
fn seek_beyond_capacity_is_rejected() {
    let mut mem = [0u8; 8];
    let mut os = LinkedStream::linked(&mut mem);
    assert!(os.seekp(8, SeekDir::Begin).is_ok());
    let err = os.seekp(1, SeekDir::Current).unwrap_err();
    assert_eq!(
        err,
        StreamError::SeekOutOfRange {
            target: 9,
            capacity: 8
        }
    );
    assert_eq!(os.pos(), 8);
}
