//! Test execution engine.

use textstream_core::{
    Endl, Ends, Flush, LinkedStream, OutputStream, StringStream, TextBuffer, global_metrics,
};

use crate::diff;
use crate::error::HarnessError;
use crate::fixtures::{FixtureCase, FixtureSet, FloatKind, Op, SignedKind, UnsignedKind, parse_flags};
use crate::verify::VerificationResult;

/// Runs a fixture set and collects verification results.
pub struct TestRunner {
    /// Name of the test campaign.
    pub campaign: String,
}

impl TestRunner {
    #[must_use]
    pub fn new(campaign: impl Into<String>) -> Self {
        Self {
            campaign: campaign.into(),
        }
    }

    /// Run all fixtures in a set and return results.
    pub fn run(&self, fixture_set: &FixtureSet) -> Vec<VerificationResult> {
        fixture_set.cases.iter().map(run_case).collect()
    }
}

/// Committed text plus the error that stopped the case, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaseOutcome {
    /// Logical buffer as it stood before the final commit.
    pub raw: String,
    pub committed: String,
    pub error: Option<String>,
}

/// Replay `case` on a fresh stream.
#[must_use]
pub fn execute_case(case: &FixtureCase) -> CaseOutcome {
    match case.linked_capacity {
        Some(capacity) => {
            let mut mem = vec![0u8; capacity];
            let mut os = LinkedStream::linked(&mut mem);
            let seeded = match case.seed.as_deref() {
                Some(seed) => os
                    .write(seed.as_bytes())
                    .and_then(|os| os.seekp(0, textstream_core::SeekDir::Begin))
                    .map(|_| ())
                    .map_err(HarnessError::from),
                None => Ok(()),
            };
            let result = seeded.and_then(|()| apply_ops(&mut os, &case.ops));
            finish(&mut os, result)
        }
        None => {
            let mut os = match case.seed.as_deref() {
                Some(seed) => StringStream::with_text(seed),
                None => StringStream::new(),
            };
            let result = apply_ops(&mut os, &case.ops);
            finish(&mut os, result)
        }
    }
}

fn finish<B: TextBuffer>(os: &mut OutputStream<B>, result: Result<(), HarnessError>) -> CaseOutcome {
    CaseOutcome {
        raw: String::from_utf8_lossy(os.as_bytes()).into_owned(),
        committed: String::from_utf8_lossy(os.committed()).into_owned(),
        error: result.err().map(|err| err.kind().to_string()),
    }
}

fn run_case(case: &FixtureCase) -> VerificationResult {
    let before = global_metrics().snapshot();
    let outcome = execute_case(case);
    let bytes_written = global_metrics().snapshot().since(&before).bytes_written;

    let text_matches = outcome.committed == case.expected;
    let raw_matches = case
        .expected_raw
        .as_ref()
        .is_none_or(|raw| *raw == outcome.raw);
    let error_matches = outcome.error == case.expected_error;
    let passed = text_matches && raw_matches && error_matches;

    let diff = if passed {
        None
    } else if !text_matches {
        Some(diff::render_diff(&case.expected, &outcome.committed))
    } else if let (false, Some(raw)) = (raw_matches, &case.expected_raw) {
        Some(format!("raw buffer:\n{}", diff::render_diff(raw, &outcome.raw)))
    } else {
        Some(format!(
            "error mismatch: expected={:?}, actual={:?}",
            case.expected_error, outcome.error
        ))
    };

    VerificationResult {
        case_name: case.name.clone(),
        section: case.section.clone(),
        stream: String::from(if case.linked_capacity.is_some() {
            "linked"
        } else {
            "owned"
        }),
        passed,
        expected: case.expected.clone(),
        actual: outcome.committed,
        expected_error: case.expected_error.clone(),
        actual_error: outcome.error,
        bytes_written,
        diff,
    }
}

/// Apply `ops` in order, stopping at the first failure.
pub fn apply_ops<B: TextBuffer>(os: &mut OutputStream<B>, ops: &[Op]) -> Result<(), HarnessError> {
    for op in ops {
        apply_op(os, op)?;
    }
    Ok(())
}

fn apply_op<B: TextBuffer>(os: &mut OutputStream<B>, op: &Op) -> Result<(), HarnessError> {
    match op {
        Op::Text { text } => {
            os.write_value(text.as_str())?;
        }
        Op::Bytes { bytes } => {
            os.write(bytes)?;
        }
        Op::Byte { value } => {
            os.write_value(value)?;
        }
        Op::Signed { value, kind } => write_signed(os, *value, *kind)?,
        Op::Unsigned { value, kind } => write_unsigned(os, *value, *kind)?,
        Op::Float { value, kind } => match kind {
            FloatKind::F32 => {
                os.write_value(&(*value as f32))?;
            }
            FloatKind::F64 => {
                os.write_value(value)?;
            }
        },
        Op::Bool { value } => {
            os.write_value(value)?;
        }
        Op::Put { value } => {
            os.put(*value)?;
        }
        Op::Pointer { address } => {
            os.write_value(&(*address as *const u8))?;
        }
        Op::SetBase { base } => {
            os.set_base(*base)?;
        }
        Op::SetWidth { width } => {
            os.set_width(*width);
        }
        Op::SetPrecision { precision } => {
            os.set_precision(*precision);
        }
        Op::SetFlags { flags } => {
            os.set_flags(parse_flags(flags)?);
        }
        Op::UnsetFlags { flags } => {
            os.unset_flags(parse_flags(flags)?);
        }
        Op::ApplyFlags { flags } => {
            os.write_value(&parse_flags(flags)?)?;
        }
        Op::Seekp { offset, dir } => {
            os.seekp(*offset, (*dir).into())?;
        }
        Op::Overflow { n } => {
            os.overflow(*n)?;
        }
        Op::Format { template, args } => {
            let args: Vec<_> = args.iter().map(|arg| arg.to_format_arg()).collect();
            os.format(template, &args)?;
        }
        Op::SetStr { text } => {
            // Owned-only operation; on other buffers it is emulated by
            // rewriting from the start.
            os.seekp(0, textstream_core::SeekDir::Begin)?;
            os.flush();
            os.write_value(text.as_str())?;
        }
        Op::Flush => {
            os.write_value(&Flush)?;
        }
        Op::Endl => {
            os.write_value(&Endl)?;
        }
        Op::Ends => {
            os.write_value(&Ends)?;
        }
    }
    Ok(())
}

fn write_signed<B: TextBuffer>(
    os: &mut OutputStream<B>,
    value: i64,
    kind: SignedKind,
) -> Result<(), HarnessError> {
    let out_of_range = || HarnessError::BadValue(value.to_string());
    match kind {
        SignedKind::I8 => os.write_value(&i8::try_from(value).map_err(|_| out_of_range())?)?,
        SignedKind::I16 => os.write_value(&i16::try_from(value).map_err(|_| out_of_range())?)?,
        SignedKind::I32 => os.write_value(&i32::try_from(value).map_err(|_| out_of_range())?)?,
        SignedKind::I64 => os.write_value(&value)?,
        SignedKind::Isize => os.write_value(&isize::try_from(value).map_err(|_| out_of_range())?)?,
    };
    Ok(())
}

fn write_unsigned<B: TextBuffer>(
    os: &mut OutputStream<B>,
    value: u64,
    kind: UnsignedKind,
) -> Result<(), HarnessError> {
    let out_of_range = || HarnessError::BadValue(value.to_string());
    match kind {
        UnsignedKind::U16 => os.write_value(&u16::try_from(value).map_err(|_| out_of_range())?)?,
        UnsignedKind::U32 => os.write_value(&u32::try_from(value).map_err(|_| out_of_range())?)?,
        UnsignedKind::U64 => os.write_value(&value)?,
        UnsignedKind::Usize => os.write_value(&usize::try_from(value).map_err(|_| out_of_range())?)?,
    };
    Ok(())
}
