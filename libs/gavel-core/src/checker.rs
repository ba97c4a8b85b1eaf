/// Output Checker - Type-Aware, Tolerant Stream Comparison
///
/// **Core Responsibility:**
/// Decide whether a candidate output stream matches the expected answer,
/// line by line and token by token, under the declared token kinds.
///
/// **Critical Properties:**
/// - Knows nothing about sandboxes or jobs
/// - Pure over its inputs: identical streams always produce identical verdicts
/// - A fault in the answer is a hard error; a fault in the candidate is a
///   wrong answer
use crate::token::TokenKind;
use std::io::{self, BufRead};
use thiserror::Error;

/// Tolerance applied to floating point token comparison
pub const EPSILON: f64 = 1e-8;

/// Hard errors: defects in the expected answer, never the candidate's fault
#[derive(Debug, Error)]
pub enum CheckError {
    #[error("answer line has {found} tokens but {declared} types are declared")]
    TokenCountMismatch { declared: usize, found: usize },

    #[error("failed to parse floating point token \"{token}\" in answer")]
    MalformedAnswerFloat {
        token: String,
        #[source]
        source: std::num::ParseFloatError,
    },

    #[error("error while reading answer stream")]
    AnswerIo(#[from] io::Error),
}

/// Two-stage tolerant equality for floating point tokens.
///
/// Absolute precision is checked first; operands within `epsilon` of zero
/// are then rejected outright, since dividing by them would blow up the
/// relative check; finally relative precision is accepted against either
/// operand as the divisor.
pub fn approximately_equal(x: f64, y: f64, epsilon: f64) -> bool {
    // Absolute precision.
    if (x - y).abs() <= epsilon {
        return true;
    }

    // Is x or y too close to zero?
    if x.abs() <= epsilon || y.abs() <= epsilon {
        return false;
    }

    // Relative precision, against either operand.
    ((x - y) / x).abs() <= epsilon || ((x - y) / y).abs() <= epsilon
}

/// Compare the candidate `output` stream against the expected `answer`
/// stream under the declared token `kinds`.
///
/// Returns `Ok(true)` on a match, `Ok(false)` on any normal wrong-answer
/// outcome (token mismatch, length mismatch, unparsable candidate float,
/// candidate I/O failure, leftover lines on either side), and `Err` only
/// for defects in the answer itself.
pub fn check<A: BufRead, O: BufRead>(
    answer: A,
    output: O,
    kinds: &[TokenKind],
) -> Result<bool, CheckError> {
    let mut answer_lines = answer.lines();
    let mut output_lines = output.lines();

    loop {
        let (answer_line, output_line) = match (answer_lines.next(), output_lines.next()) {
            // Both exhausted together: everything matched.
            (None, None) => return Ok(true),
            // Answer stream fault: the judge's problem, not the candidate's.
            (Some(Err(e)), _) => return Err(CheckError::AnswerIo(e)),
            // Candidate stream fault: a wrong answer, not a system error.
            (_, Some(Err(_))) => return Ok(false),
            // Leftover lines on either side.
            (Some(Ok(_)), None) | (None, Some(Ok(_))) => return Ok(false),
            (Some(Ok(a)), Some(Ok(o))) => (a, o),
        };

        let answer_tokens: Vec<&str> = answer_line.split(' ').collect();
        let output_tokens: Vec<&str> = output_line.split(' ').collect();

        if answer_tokens.len() != kinds.len() {
            return Err(CheckError::TokenCountMismatch {
                declared: kinds.len(),
                found: answer_tokens.len(),
            });
        }

        if answer_tokens.len() != output_tokens.len() {
            return Ok(false);
        }

        for (i, kind) in kinds.iter().enumerate() {
            match kind {
                TokenKind::Str | TokenKind::Int => {
                    if answer_tokens[i] != output_tokens[i] {
                        return Ok(false);
                    }
                }
                TokenKind::Float => {
                    let expected: f64 = answer_tokens[i].parse().map_err(|source| {
                        CheckError::MalformedAnswerFloat {
                            token: answer_tokens[i].to_string(),
                            source,
                        }
                    })?;

                    let actual: f64 = match output_tokens[i].parse() {
                        Ok(value) => value,
                        Err(_) => return Ok(false),
                    };

                    if !approximately_equal(expected, actual, EPSILON) {
                        return Ok(false);
                    }
                }
            }
        }
    }
}
