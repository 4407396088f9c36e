use thiserror::Error;

/// Errors produced while compiling a pattern.
///
/// Offsets count chars, not bytes, from the start of the pattern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error("syntax error at {offset}: unbalanced parenthesis")]
    UnbalancedParen { offset: usize },

    #[error("syntax error at {offset}: nothing to repeat")]
    InvalidRepetitionTarget { offset: usize },

    #[error("syntax error at {offset}: invalid character class")]
    InvalidCharacterClass { offset: usize },

    #[error("syntax error at {offset}: invalid escape sequence")]
    InvalidEscape { offset: usize },

    #[error("syntax error at {offset}: invalid repetition bound")]
    InvalidRepetitionBound { offset: usize },

    #[error("syntax error at {offset}: unknown group kind")]
    UnknownGroupKind { offset: usize },

    #[error("pattern nests deeper than {limit} levels")]
    NestTooDeep { limit: u32 },

    #[error("compiled pattern exceeds {limit} states")]
    TooLarge { limit: usize },
}

impl CompileError {
    /// Char offset of a syntax error, if the error has one.
    pub fn offset(&self) -> Option<usize> {
        match *self {
            CompileError::UnbalancedParen { offset }
            | CompileError::InvalidRepetitionTarget { offset }
            | CompileError::InvalidCharacterClass { offset }
            | CompileError::InvalidEscape { offset }
            | CompileError::InvalidRepetitionBound { offset }
            | CompileError::UnknownGroupKind { offset } => Some(offset),
            CompileError::NestTooDeep { .. } | CompileError::TooLarge { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(
            CompileError::UnbalancedParen { offset: 3 }.to_string(),
            "syntax error at 3: unbalanced parenthesis"
        );
        assert_eq!(
            CompileError::InvalidRepetitionTarget { offset: 0 }.to_string(),
            "syntax error at 0: nothing to repeat"
        );
        assert_eq!(
            CompileError::TooLarge { limit: 10 }.to_string(),
            "compiled pattern exceeds 10 states"
        );
    }

    #[test]
    fn test_offset() {
        assert_eq!(CompileError::InvalidEscape { offset: 7 }.offset(), Some(7));
        assert_eq!(CompileError::NestTooDeep { limit: 2 }.offset(), None);
    }
}
