//! Errors raised while extracting values from a matched line.

use thiserror::Error;

/// A matched line did not have the expected shape.
///
/// These never escape the parser: the line loop logs them and moves on.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LineError {
    #[error("missing token {index} (line has {len} tokens)")]
    MissingToken { index: usize, len: usize },

    #[error("token {index} is not a number: '{value}'")]
    InvalidNumber { index: usize, value: String },

    #[error("sum of tokens {first}..{last} overflows")]
    Overflow { first: usize, last: usize },
}

/// A derived metric could not be computed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DerivedError {
    #[error("missing input '{0}'")]
    MissingInput(&'static str),

    #[error("buffer_pool_pages_total is zero")]
    ZeroPagesTotal,

    #[error("overflow computing '{0}'")]
    Overflow(&'static str),
}
