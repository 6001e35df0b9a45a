//! # textstream-core
//!
//! In-memory text output streams with printf-style numeric formatting.
//!
//! A stream writes at a position inside a buffer that is either owned and
//! growable ([`StringStream`]) or borrowed with a fixed size
//! ([`LinkedStream`]). Values are dispatched statically through
//! [`TextWrite`]; numbers are rendered by the bundled printf engine using a
//! directive built from the stream's base, width, precision and flags.
//!
//! ```
//! use textstream_core::{Endl, FmtFlags, StringStream};
//!
//! let mut os = StringStream::new();
//! os.write_value(&FmtFlags::HEX).unwrap()
//!     .write_value(&255u32).unwrap()
//!     .write_value(&Endl).unwrap();
//! assert_eq!(os.str().unwrap(), "ff\n");
//! ```
//!
//! No `unsafe` code is permitted at the crate level.

#![forbid(unsafe_code)]

pub mod buffer;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod flags;
pub mod metrics;
pub mod printf;
pub mod spec;
pub mod stream;

pub use buffer::{LinkedBuffer, OwnedBuffer, TextBuffer};
pub use config::{GrowthPolicy, StreamConfig};
pub use dispatch::{Endl, Ends, Flush, TextWrite};
pub use error::StreamError;
pub use flags::FmtFlags;
pub use metrics::{MetricsSnapshot, StreamMetrics, global_metrics};
pub use printf::{FormatArg, FormatError};
pub use spec::{ConversionSpec, PrintfType, ValueKind};
pub use stream::{LinkedStream, OutputStream, SeekDir, StringStream};
