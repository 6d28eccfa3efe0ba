//! `Pending normal aio reads:` line shapes.
//!
//! Server versions print the pending AIO counters in several layouts. The
//! token count (plus a digit check for the two 16-token layouts) selects
//! the shape:
//!
//! ```text
//!  8  Pending normal aio reads: 0, aio writes: 0,
//! 14  Pending normal aio reads: 0 [0, 0] , aio writes: 0 [0, 0] ,
//! 16  Pending normal aio reads: [0, 0, 0, 0] , aio writes: [0, 0, 0, 0] ,
//! 16  Pending normal aio reads: 0 [0, 0, 0, 0] , aio writes: 0 [0, 0] ,
//! 18  Pending normal aio reads: 0 [0, 0, 0, 0] , aio writes: 0 [0, 0, 0, 0] ,
//! 22  Pending normal aio reads: 0 [0, 0, 0, 0, 0, 0, 0, 0] , aio writes: 0 [0, 0, 0, 0] ,
//! ```

use tracing::warn;

use super::context::ParseContext;
use super::error::LineError;
use super::tokenizer::Line;
use crate::models::InnodbMetrics;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AioShape {
    /// Totals only.
    Flat,
    /// Totals followed by two per-thread slots each.
    PairSlots,
    /// Four per-thread slots each, no totals.
    FourSlots,
    /// Totals, four read slots and two write slots.
    FourAndTwoSlots,
    /// Totals, four slots each.
    FourAndFourSlots,
    /// Totals, eight read slots and four write slots.
    EightAndFourSlots,
    /// 16 tokens matching neither 16-token layout.
    Unrecognized,
}

impl AioShape {
    /// Picks the shape for a tokenized line. `None` for token counts that no
    /// known server version produces.
    pub fn classify(line: &Line<'_>) -> Option<Self> {
        match line.tokens.len() {
            8 => Some(AioShape::Flat),
            14 => Some(AioShape::PairSlots),
            16 if line.all_digits(4..8) && line.all_digits(11..15) => Some(AioShape::FourSlots),
            16 if line.all_digits(4..9) && line.all_digits(12..15) => {
                Some(AioShape::FourAndTwoSlots)
            }
            16 => Some(AioShape::Unrecognized),
            18 => Some(AioShape::FourAndFourSlots),
            22 => Some(AioShape::EightAndFourSlots),
            _ => None,
        }
    }

    /// Returns `(reads, writes)` for the shape, or `None` if the shape
    /// carries no usable values.
    pub fn pending(self, line: &Line<'_>) -> Result<Option<(i64, i64)>, LineError> {
        let counts = match self {
            AioShape::Flat => (line.int(4)?, line.int(7)?),
            AioShape::PairSlots => (line.int(4)?, line.int(10)?),
            AioShape::FourSlots => (line.sum(4..8)?, line.sum(11..15)?),
            AioShape::FourAndTwoSlots | AioShape::FourAndFourSlots => {
                (line.int(4)?, line.int(12)?)
            }
            AioShape::EightAndFourSlots => (line.int(4)?, line.int(16)?),
            AioShape::Unrecognized => return Ok(None),
        };
        Ok(Some(counts))
    }
}

pub(super) fn extract_pending_normal_aio(
    line: &Line<'_>,
    _ctx: &mut ParseContext,
    metrics: &mut InnodbMetrics,
) -> Result<(), LineError> {
    let Some(shape) = AioShape::classify(line) else {
        return Ok(());
    };

    match shape.pending(line)? {
        Some((reads, writes)) => {
            metrics.set("pending_normal_aio_reads", reads);
            metrics.set("pending_normal_aio_writes", writes);
        }
        None => warn!("Can't parse result line {}", line.text),
    }
    Ok(())
}
