#![no_main]
use libfuzzer_sys::fuzz_target;
use textstream_core::{FormatArg, LinkedStream, StringStream, printf};

// Arbitrary templates against a fixed argument list: the engine must never
// panic, the reported length must match an unbounded render, and a linked
// stream must either hold the whole output or reject it untouched.
fuzz_target!(|data: &[u8]| {
    let args = [
        FormatArg::SignedInt(-42),
        FormatArg::UnsignedInt(u64::MAX),
        FormatArg::Float(3.25),
        FormatArg::Str(b"fuzz"),
        FormatArg::Char(b'z'),
        FormatArg::Pointer(0x1000),
    ];

    let mut small = [0u8; 32];
    let Ok(needed) = printf::snprintf(&mut small, data, &args) else {
        return;
    };
    if let Ok(full) = printf::sprintf(data, &args) {
        assert_eq!(full.len(), needed);
        let shown = needed.min(small.len());
        assert_eq!(&small[..shown], &full[..shown]);
    }

    let mut os = StringStream::new();
    if let Ok(n) = os.vformat(data, &args) {
        assert_eq!(n, needed);
        assert_eq!(os.pos(), needed);
    }

    let mut mem = [0u8; 48];
    let mut linked = LinkedStream::linked(&mut mem);
    match linked.vformat(data, &args) {
        Ok(n) => assert!(n <= 48 && linked.pos() == n),
        Err(_) => assert_eq!(linked.len(), 0),
    }
});
