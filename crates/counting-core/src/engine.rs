//! Message text to number to sequence outcome.
//!
//! raw text -> [`normalize`] -> [`evaluate`] -> [`CountState::observe`]

use crate::eval::{evaluate, EvalError};
use crate::normalize::normalize;
use crate::numeral::MalformedNumeral;
use crate::sequence::{CountState, Outcome, RejectReason};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Malformed(#[from] MalformedNumeral),

    #[error(transparent)]
    Eval(#[from] EvalError),
}

impl EngineError {
    pub fn reason(&self) -> RejectReason {
        match self {
            EngineError::Malformed(_) => RejectReason::MalformedNumeral,
            EngineError::Eval(EvalError::UnsupportedExpression(_)) => {
                RejectReason::UnsupportedExpression
            }
            EngineError::Eval(EvalError::NotANumber) => RejectReason::NotANumber,
        }
    }
}

/// Read a message as a single number.
pub fn read_number(text: &str) -> Result<f64, EngineError> {
    let normalized = normalize(text)?;
    Ok(evaluate(&normalized)?)
}

/// Read `text` and apply it to `state`.
///
/// Unreadable text yields [`Outcome::Reject`] and leaves `state` untouched.
pub fn judge(text: &str, state: &mut CountState) -> Outcome {
    match read_number(text) {
        Ok(value) => state.observe(value),
        Err(e) => Outcome::Reject { reason: e.reason() },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(text: &str, count: u64) -> (Outcome, u64) {
        let mut s = CountState::new(count);
        let out = judge(text, &mut s);
        (out, s.count)
    }

    #[test]
    fn arabic_indic_digits_continue_the_count() {
        assert_eq!(run("١٢٣", 122), (Outcome::Advance { count: 123 }, 123));
    }

    #[test]
    fn styled_and_spelled_numerals() {
        assert_eq!(run("𝟏𝟎", 9).0, Outcome::Advance { count: 10 });
        assert_eq!(run("１０", 9).0, Outcome::Advance { count: 10 });
        assert_eq!(run("Ⅹ", 9).0, Outcome::Advance { count: 10 });
        assert_eq!(run("十", 9).0, Outcome::Advance { count: 10 });
        assert_eq!(run("१०", 9).0, Outcome::Advance { count: 10 });
    }

    #[test]
    fn expressions_count_by_their_value() {
        assert_eq!(run("2×3", 5).0, Outcome::Advance { count: 6 });
        assert_eq!(run("(٢+٤)÷٢", 2).0, Outcome::Advance { count: 3 });
        assert_eq!(run("½+½", 0).0, Outcome::Advance { count: 1 });
    }

    #[test]
    fn fractions_do_not_match_integer_counts() {
        assert_eq!(
            run("1/2", 0),
            (
                Outcome::Reset {
                    expected: 1,
                    got: 0.5
                },
                0
            )
        );
        assert_eq!(
            run("½", 0).0,
            Outcome::Reset {
                expected: 1,
                got: 0.5
            }
        );
    }

    #[test]
    fn mixed_scripts_are_rejected_without_touching_state() {
        assert_eq!(
            run("४٢", 41),
            (
                Outcome::Reject {
                    reason: RejectReason::MalformedNumeral
                },
                41
            )
        );
    }

    #[test]
    fn failure_kinds_are_distinguished() {
        assert_eq!(
            run("hello", 3).0,
            Outcome::Reject {
                reason: RejectReason::NotANumber
            }
        );
        assert_eq!(
            run("(4 5)", 3).0,
            Outcome::Reject {
                reason: RejectReason::UnsupportedExpression
            }
        );
        assert_eq!(
            run("print(4)", 3).0,
            Outcome::Reject {
                reason: RejectReason::NotANumber
            }
        );
    }

    #[test]
    fn read_number_is_deterministic() {
        for s in ["٣×٣", "Ⅻ", "abc", "४٢", "1/0"] {
            assert_eq!(read_number(s), read_number(s));
        }
    }
}
