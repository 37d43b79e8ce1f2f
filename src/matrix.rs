//! Declarative flag matrix
//!
//! A matrix is a list of steps applied to a running set of variants that
//! starts as the single empty variant:
//!
//! ```toml
//! [[matrix]]
//! op = "one_of"
//! values = ["-u0", "-u1", "-u2"]
//!
//! [[matrix]]
//! op = "append"
//! token = "-k -j"
//!
//! [[matrix]]
//! op = "prefixes"
//! values = ["-t", "-i"]
//! ```

use crate::combinator::{self, CombinatorError, FlagSet, Variant};
use serde::Deserialize;

/// Mode flags for nbadet; exactly one is always active
const NBADET_MODES: &[&str] = &["-u0", "-u1", "-u2"];

/// Appended to every mode
const NBADET_ALWAYS: &str = "-k -j";

/// Optimisations, switched on cumulatively.
/// -c does not work with -o, and -c,-p are always bad, so neither is here.
const NBADET_OPTIMISATIONS: &[&str] = &["-t", "-i", "-r", "-m", "-o", "-q", "-n -a -b", "-d -e"];

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum MatrixStep {
    /// Cross the matrix with a choice of exactly one value
    OneOf { values: Vec<String> },
    /// Cross the matrix with every prefix of `values`
    Prefixes { values: Vec<String> },
    /// Add a fixed token to every variant
    Append { token: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matrix {
    steps: Vec<MatrixStep>,
}

impl Matrix {
    pub fn new(steps: Vec<MatrixStep>) -> Self {
        Self { steps }
    }

    /// Evaluate the steps in order
    pub fn variants(&self) -> Result<Vec<Variant>, CombinatorError> {
        let mut current = vec![Variant::default()];

        for (i, step) in self.steps.iter().enumerate() {
            let step_no = i + 1;
            current = match step {
                MatrixStep::OneOf { values } => {
                    let choice = FlagSet::new(values.iter().cloned())
                        .one_of()
                        .map_err(|e| match e {
                            CombinatorError::EmptyChoice => {
                                CombinatorError::EmptyOneOf { step: step_no }
                            }
                            other => other,
                        })?;
                    combinator::product(&current, &choice)
                }
                MatrixStep::Prefixes { values } => {
                    let prefixes = FlagSet::new(values.iter().cloned()).prefixes();
                    combinator::product(&current, &prefixes)
                }
                MatrixStep::Append { token } => {
                    if token.trim().is_empty() {
                        return Err(CombinatorError::EmptyToken { step: step_no });
                    }
                    combinator::append(current, token)
                }
            };
        }

        if current.is_empty() {
            return Err(CombinatorError::NoVariants);
        }

        Ok(current)
    }
}

impl Default for Matrix {
    /// `one_of(-u0,-u1,-u2).append("-k -j") × prefixes(optimisations)`
    fn default() -> Self {
        let owned = |flags: &[&str]| flags.iter().map(|s| s.to_string()).collect();

        Self::new(vec![
            MatrixStep::OneOf {
                values: owned(NBADET_MODES),
            },
            MatrixStep::Append {
                token: NBADET_ALWAYS.to_string(),
            },
            MatrixStep::Prefixes {
                values: owned(NBADET_OPTIMISATIONS),
            },
        ])
    }
}
