//! Flow construction errors.

use mica_ir::Span;

/// Internal consistency violation in an instruction stream.
///
/// The builder never produces these for well-formed input; seeing one
/// means a lowering rule emitted a broken jump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FlowError {
    #[error("deferred offset #{offset} was never resolved")]
    Unresolved { offset: u32 },

    #[error("deferred offset #{offset} was resolved more than once")]
    ResolvedTwice { offset: u32 },

    #[error("deferred offset #{offset} does not belong to this stream")]
    UnknownOffset { offset: u32 },

    #[error("jump at {at} targets {target}, past the end of the stream ({len})")]
    TargetOutOfRange { at: u32, target: u32, len: u32 },

    #[error("stack underflow at {at}")]
    StackUnderflow { at: u32 },

    #[error("stack depth at {at} is {found} on one path and {expected} on another")]
    InconsistentStack { at: u32, expected: u32, found: u32 },
}

/// Why a flow could not be built.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    /// The expression tree contains a construct with no lowering.
    #[error("unsupported {kind}")]
    Unsupported { kind: &'static str, span: Span },

    #[error("malformed instruction stream: {0}")]
    Malformed(#[from] FlowError),
}

impl BuildError {
    pub fn span(&self) -> Option<Span> {
        match self {
            BuildError::Unsupported { span, .. } => Some(*span),
            BuildError::Malformed(_) => None,
        }
    }
}
