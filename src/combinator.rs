//! Argument-set combinators
//!
//! Builds the list of flag combinations to test from a few declarative
//! pieces, e.g. `product(&one_of(["-u0", "-u1"])?, &prefixes(["-t", "-i"]))`.
//!
//! Everything here is pure: the same inputs always produce the same
//! variants in the same order. Tokens are never quoted or split, so a token
//! like `"-k -j"` renders verbatim.

use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CombinatorError {
    #[error("one_of needs at least one value")]
    EmptyChoice,

    #[error("matrix step {step}: one_of needs at least one value")]
    EmptyOneOf { step: usize },

    #[error("matrix step {step}: append needs a non-empty token")]
    EmptyToken { step: usize },

    #[error("matrix produces no variants")]
    NoVariants,
}

/// One concrete combination of flags under test
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Variant {
    tokens: Vec<String>,
}

impl Variant {
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tokens: tokens.into_iter().map(Into::into).collect(),
        }
    }

    #[cfg(test)]
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Space-joined flags, e.g. `-u0 -t -i`
    pub fn render(&self) -> String {
        self.tokens.join(" ")
    }

    fn concat(&self, rhs: &Variant) -> Variant {
        let mut tokens = Vec::with_capacity(self.len() + rhs.len());
        tokens.extend_from_slice(&self.tokens);
        tokens.extend_from_slice(&rhs.tokens);
        Variant { tokens }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// An ordered family of related flags
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagSet {
    flags: Vec<String>,
}

impl FlagSet {
    pub fn new<I, S>(flags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            flags: flags.into_iter().map(Into::into).collect(),
        }
    }

    /// Pick exactly one flag from the set
    pub fn one_of(&self) -> Result<Vec<Variant>, CombinatorError> {
        one_of(self.flags.iter().cloned())
    }

    /// Every leading run of the set, shortest first
    pub fn prefixes(&self) -> Vec<Variant> {
        prefixes(self.flags.iter().cloned())
    }
}

/// One single-token variant per value, in input order.
/// Errors on empty input.
pub fn one_of<I, S>(values: I) -> Result<Vec<Variant>, CombinatorError>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let variants: Vec<Variant> = values
        .into_iter()
        .map(|value| Variant::new([value]))
        .collect();

    if variants.is_empty() {
        return Err(CombinatorError::EmptyChoice);
    }

    Ok(variants)
}

/// All n+1 prefixes of `values`: `[]`, `[v0]`, `[v0, v1]`, ...
pub fn prefixes<I, S>(values: I) -> Vec<Variant>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let values: Vec<String> = values.into_iter().map(Into::into).collect();

    (0..=values.len())
        .map(|len| Variant::new(values[..len].iter().cloned()))
        .collect()
}

/// Cartesian product, `a`-major: every `b` is tried under `a[0]` first.
pub fn product(a: &[Variant], b: &[Variant]) -> Vec<Variant> {
    a.iter()
        .flat_map(|lhs| b.iter().map(move |rhs| lhs.concat(rhs)))
        .collect()
}

/// Push `token` onto the end of every variant
pub fn append(set: Vec<Variant>, token: &str) -> Vec<Variant> {
    set.into_iter()
        .map(|mut variant| {
            variant.tokens.push(token.to_string());
            variant
        })
        .collect()
}

/// Space-joined flags for every variant, order preserved
pub fn render(variants: &[Variant]) -> Vec<String> {
    variants.iter().map(Variant::render).collect()
}
