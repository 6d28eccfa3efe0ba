//! Line tokenizer for the InnoDB status report.

use super::error::LineError;

/// Characters trimmed from both edges of every token.
const DECORATION: &[char] = &[',', ';', '[', ']'];

/// Splits a trimmed line on runs of spaces and strips `,;[]` decoration.
///
/// Tokens that are empty after stripping (a lone `,` for example) are kept:
/// rules address values by position, so dropping them would shift indices.
pub fn tokenize(line: &str) -> Vec<&str> {
    line.split(' ')
        .filter(|piece| !piece.is_empty())
        .map(|piece| piece.trim_matches(DECORATION))
        .collect()
}

/// A trimmed report line together with its tokens.
#[derive(Debug)]
pub struct Line<'a> {
    pub text: &'a str,
    pub tokens: Vec<&'a str>,
}

impl<'a> Line<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            tokens: tokenize(text),
        }
    }

    pub fn starts_with(&self, prefix: &str) -> bool {
        self.text.starts_with(prefix)
    }

    /// True if `needle` occurs somewhere after the first character.
    pub fn has_infix(&self, needle: &str) -> bool {
        self.text.find(needle).is_some_and(|pos| pos > 0)
    }

    pub fn token(&self, index: usize) -> Result<&'a str, LineError> {
        self.tokens
            .get(index)
            .copied()
            .ok_or(LineError::MissingToken {
                index,
                len: self.tokens.len(),
            })
    }

    pub fn int(&self, index: usize) -> Result<i64, LineError> {
        let token = self.token(index)?;
        token.parse().map_err(|_| LineError::InvalidNumber {
            index,
            value: token.to_string(),
        })
    }

    pub fn float(&self, index: usize) -> Result<f64, LineError> {
        let token = self.token(index)?;
        token.parse().map_err(|_| LineError::InvalidNumber {
            index,
            value: token.to_string(),
        })
    }

    /// Sums the integer tokens in `range`.
    pub fn sum(&self, mut range: std::ops::Range<usize>) -> Result<i64, LineError> {
        let overflow = LineError::Overflow {
            first: range.start,
            last: range.end.saturating_sub(1),
        };
        range.try_fold(0i64, |total, i| {
            total.checked_add(self.int(i)?).ok_or_else(|| overflow.clone())
        })
    }

    /// True if every token in `range` exists and consists of ASCII digits only.
    pub fn all_digits(&self, range: std::ops::Range<usize>) -> bool {
        self.tokens.get(range).is_some_and(|slice| {
            slice
                .iter()
                .all(|t| !t.is_empty() && t.bytes().all(|b| b.is_ascii_digit()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_strips_decoration() {
        let tokens = tokenize("Mutex spin waits 79626940, rounds 157459864, OS waits 698719");
        assert_eq!(
            tokens,
            vec!["Mutex", "spin", "waits", "79626940", "rounds", "157459864", "OS", "waits", "698719"]
        );
    }

    #[test]
    fn test_tokenize_keeps_empty_positions() {
        let tokens = tokenize("Pending normal aio reads: [0, 0, 0, 0] , aio writes: [0, 0, 0, 0] ,");
        assert_eq!(tokens.len(), 16);
        assert_eq!(&tokens[4..8], &["0", "0", "0", "0"]);
        assert_eq!(tokens[8], "");
        assert_eq!(tokens[15], "");
    }

    #[test]
    fn test_tokenize_collapses_space_runs() {
        let tokens = tokenize("Log flushed up to   272588624");
        assert_eq!(tokens, vec!["Log", "flushed", "up", "to", "272588624"]);
    }

    #[test]
    fn test_tokenize_empty_line() {
        assert!(tokenize("").is_empty());
    }

    #[test]
    fn test_line_has_infix_ignores_position_zero() {
        let line = Line::new("ACTIVE 5 sec");
        assert!(!line.has_infix("ACTIVE"));
        let line = Line::new("---TRANSACTION 1234, ACTIVE 5 sec");
        assert!(line.has_infix("ACTIVE"));
    }

    #[test]
    fn test_line_int_errors() {
        let line = Line::new("History list length abc");
        assert_eq!(
            line.int(3),
            Err(LineError::InvalidNumber {
                index: 3,
                value: "abc".to_string()
            })
        );
        assert_eq!(line.int(7), Err(LineError::MissingToken { index: 7, len: 4 }));
    }

    #[test]
    fn test_line_all_digits() {
        let line = Line::new("Pending normal aio reads: 0 [0, 0] , aio writes: 0 [0, 0] ,");
        assert!(line.all_digits(4..7));
        assert!(!line.all_digits(4..8));
        assert!(!line.all_digits(12..20));
    }

    #[test]
    fn test_line_sum_overflow() {
        let line = Line::new("Pending normal aio reads: [9223372036854775807, 1, 0, 0] , aio writes: [0, 0, 0, 0] ,");
        assert_eq!(line.sum(11..15), Ok(0));
        assert_eq!(line.sum(4..8), Err(LineError::Overflow { first: 4, last: 7 }));
    }
}
