#![no_main]
use libfuzzer_sys::fuzz_target;
use textstream_core::{
    Endl, Ends, FmtFlags, FormatArg, LinkedStream, OutputStream, SeekDir, StringStream, TextBuffer,
};

/// Format with an argument list that is short for odd `arg`; a failure must
/// leave the bytes and the position as they were.
fn format_or_keep<B: TextBuffer>(os: &mut OutputStream<B>, arg: u8) {
    let before = (os.as_bytes().to_vec(), os.pos());
    let args = [FormatArg::UnsignedInt(u64::from(arg)); 1];
    let used = if arg % 2 == 0 { &args[..] } else { &args[..0] };
    if os.format("%x|", used).is_err() {
        assert_eq!((os.as_bytes().to_vec(), os.pos()), before);
    }
}

// Each input byte pair selects an operation and its operand. The cursor
// must stay within capacity, a failed format changes nothing and a flush
// must always make len == pos.
fuzz_target!(|data: &[u8]| {
    let mut owned = StringStream::new();
    let mut mem = [0u8; 64];
    let mut linked = LinkedStream::linked(&mut mem);

    for pair in data.chunks(2) {
        let (op, arg) = (pair[0], pair.get(1).copied().unwrap_or(0));
        macro_rules! both {
            ($os:ident => $body:expr) => {{
                {
                    let $os = &mut owned;
                    let _ = $body;
                }
                {
                    let $os = &mut linked;
                    let _ = $body;
                }
            }};
        }
        match op % 13 {
            0 => both!(os => os.write_value(&i32::from(arg as i8))),
            1 => both!(os => os.write_value(&(f64::from(arg) / 7.0))),
            2 => both!(os => os.write(&[arg])),
            3 => both!(os => os.write_value(&arg)),
            4 => both!(os => os.set_base(arg % 40)),
            5 => both!(os => os.set_width(u16::from(arg))),
            6 => both!(os => os.set_precision(u16::from(arg % 32))),
            7 => both!(os => os.seekp(i64::from(arg as i8), SeekDir::Current)),
            8 => both!(os => os.write_value(&Endl)),
            9 => both!(os => os.write_value(&Ends)),
            10 => both!(os => os.write_value(&FmtFlags::from_bits_retain(u32::from(arg) << 2))),
            11 => both!(os => format_or_keep(os, arg)),
            _ => both!(os => os.flush()),
        }
        assert!(owned.pos() <= owned.capacity());
        assert!(linked.pos() <= linked.capacity());
    }

    owned.flush();
    linked.flush();
    assert_eq!(owned.len(), owned.pos());
    assert_eq!(linked.len(), linked.pos());
});
