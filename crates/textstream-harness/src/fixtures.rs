//! Fixture loading and management.
//!
//! A fixture case is a sequence of stream operations plus the committed text
//! expected afterwards. When `expected_error` is set, the case passes only if
//! some operation fails with that error kind and the committed text at that
//! moment still matches `expected`.

use std::path::Path;

use serde::{Deserialize, Serialize};
use textstream_core::{FmtFlags, FormatArg, SeekDir};

use crate::error::HarnessError;

/// Signed integer type a fixture value is written as.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignedKind {
    I8,
    I16,
    #[default]
    I32,
    I64,
    Isize,
}

/// Unsigned integer type a fixture value is written as.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnsignedKind {
    U16,
    #[default]
    U32,
    U64,
    Usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FloatKind {
    F32,
    #[default]
    F64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeekOrigin {
    Begin,
    Current,
    End,
}

impl From<SeekOrigin> for SeekDir {
    fn from(origin: SeekOrigin) -> Self {
        match origin {
            SeekOrigin::Begin => SeekDir::Begin,
            SeekOrigin::Current => SeekDir::Current,
            SeekOrigin::End => SeekDir::End,
        }
    }
}

/// Argument to a `format` operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FixtureArg {
    Int(i64),
    Uint(u64),
    Float(f64),
    Str(String),
    /// Single byte for `%c`.
    Byte(u8),
}

impl FixtureArg {
    #[must_use]
    pub fn to_format_arg(&self) -> FormatArg<'_> {
        match self {
            Self::Int(v) => FormatArg::SignedInt(*v),
            Self::Uint(v) => FormatArg::UnsignedInt(*v),
            Self::Float(v) => FormatArg::Float(*v),
            Self::Str(s) => FormatArg::Str(s.as_bytes()),
            Self::Byte(b) => FormatArg::Char(*b),
        }
    }
}

/// One stream operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Op {
    /// Text path; NUL bytes are rejected.
    Text { text: String },
    /// Raw byte path.
    Bytes { bytes: Vec<u8> },
    Byte { value: u8 },
    Signed {
        value: i64,
        #[serde(default)]
        kind: SignedKind,
    },
    Unsigned {
        value: u64,
        #[serde(default)]
        kind: UnsignedKind,
    },
    Float {
        value: f64,
        #[serde(default)]
        kind: FloatKind,
    },
    Bool { value: bool },
    Put { value: char },
    Pointer { address: usize },
    SetBase { base: u8 },
    SetWidth { width: u16 },
    SetPrecision { precision: u16 },
    /// Flag names as in [`FmtFlags`], case-insensitive.
    SetFlags { flags: Vec<String> },
    UnsetFlags { flags: Vec<String> },
    /// Write flags through the stream, as `write_value(&flags)` would.
    ApplyFlags { flags: Vec<String> },
    Seekp { offset: i64, dir: SeekOrigin },
    Overflow { n: usize },
    Format {
        template: String,
        #[serde(default)]
        args: Vec<FixtureArg>,
    },
    SetStr { text: String },
    Flush,
    Endl,
    Ends,
}

/// Parse flag names into a combined [`FmtFlags`] value.
pub fn parse_flags(names: &[String]) -> Result<FmtFlags, HarnessError> {
    names.iter().try_fold(FmtFlags::empty(), |acc, name| {
        FmtFlags::from_name(&name.to_ascii_uppercase())
            .map(|flag| acc | flag)
            .ok_or_else(|| HarnessError::UnknownFlag(name.clone()))
    })
}

/// A single fixture test case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureCase {
    /// Case identifier.
    pub name: String,
    /// Behavior reference, e.g. "cursor/flush".
    pub section: String,
    /// Initial text for an owned stream (position 0).
    #[serde(default)]
    pub seed: Option<String>,
    /// When set, run against a linked stream over this many bytes.
    #[serde(default)]
    pub linked_capacity: Option<usize>,
    pub ops: Vec<Op>,
    /// Committed text after the ops (or at the failing op).
    pub expected: String,
    #[serde(default)]
    pub expected_error: Option<String>,
    /// Whole logical buffer before the final commit, for cases where bytes
    /// past the position matter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_raw: Option<String>,
}

/// A collection of fixture cases for one behavior family.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureSet {
    /// Schema version.
    pub version: String,
    pub family: String,
    pub cases: Vec<FixtureCase>,
}

impl FixtureSet {
    /// Load fixture set from JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize fixture set to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load fixture set from a file path.
    pub fn from_file(path: &Path) -> Result<Self, HarnessError> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_json(&content)?)
    }
}

/// All `*.json` files in `dir`, sorted by path.
pub fn fixture_paths(dir: &Path) -> Result<Vec<std::path::PathBuf>, HarnessError> {
    let mut paths: Vec<_> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|path| path.extension().and_then(|s| s.to_str()) == Some("json"))
        .collect();
    paths.sort();
    Ok(paths)
}
