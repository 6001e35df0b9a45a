//! Stream formatting flags.

use bitflags::bitflags;

bitflags! {
    /// Formatting flags carried by a stream.
    ///
    /// Bits outside the named set are retained so callers can stash their own
    /// markers; the stream ignores them.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FmtFlags: u32 {
        /// Pad numbers on the right.
        const LEFT = 0x0001;
        /// Pad numbers on the left (the default).
        const RIGHT = 0x0002;
        /// Prefix non-negative numbers with '+'.
        const SHOWPOS = 0x0004;
        /// Prefix hex, octal and binary numbers with their radix marker.
        const SHOWBASE = 0x0008;
        /// Upper-case hex digits and float exponents.
        const UPPERCASE = 0x0010;
        /// Render floats as `d.ddde±XX`.
        const SCIENTIFIC = 0x0020;
        /// Render floats as `ddd.ddd` (the default).
        const FIXED = 0x0040;
        /// Select base 10.
        const DEC = 0x0100;
        /// Select base 8.
        const OCT = 0x0200;
        /// Select base 16.
        const HEX = 0x0400;
        /// Select base 2.
        const BIN = 0x0800;

        const _ = !0;
    }
}

impl FmtFlags {
    /// Base selected by a base-manipulator value, if it is exactly one.
    #[must_use]
    pub fn as_base(self) -> Option<u8> {
        if self == Self::DEC {
            Some(10)
        } else if self == Self::OCT {
            Some(8)
        } else if self == Self::HEX {
            Some(16)
        } else if self == Self::BIN {
            Some(2)
        } else {
            None
        }
    }
}
