//! Axis-aligned bounding rectangles and merging of matched block runs.

use serde::{Deserialize, Serialize};

use crate::document::TextBlock;
use crate::error::{LocateError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct BBox {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl From<[f64; 4]> for BBox {
    fn from([x0, y0, x1, y1]: [f64; 4]) -> Self {
        BBox { x0, y0, x1, y1 }
    }
}

impl From<BBox> for [f64; 4] {
    fn from(b: BBox) -> Self {
        [b.x0, b.y0, b.x1, b.y1]
    }
}

impl BBox {
    pub fn union(&self, other: &BBox) -> BBox {
        BBox {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }
}

/// Merge a matched run of blocks into the smallest enclosing rectangle.
/// The precise rectangle is produced only when every block in the run
/// carries one. Empty input is a caller error.
pub fn merge(blocks: &[TextBlock]) -> Result<(BBox, Option<BBox>)> {
    let mut iter = blocks.iter();
    let first = iter
        .next()
        .ok_or_else(|| LocateError::InvalidGeometry("cannot merge an empty block run".into()))?;

    let mut merged = first.bbox;
    let mut precise = first.bbox_precise;
    for block in iter {
        merged = merged.union(&block.bbox);
        precise = match (precise, block.bbox_precise) {
            (Some(a), Some(b)) => Some(a.union(&b)),
            _ => None,
        };
    }
    debug_assert!(merged.x0 <= merged.x1 && merged.y0 <= merged.y1);
    Ok((merged, precise))
}
