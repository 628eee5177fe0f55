//! Value comparison of literal nodes.

use crate::arena::{Arena, NodeId};
use crate::kind::NodeKind;
use crate::values::{CompareMode, CompareResult, Float64, string_to_float64};

impl Arena {
    /// Compares two literal nodes.
    ///
    /// Booleans order `false < true`. Literals of the same kind compare by
    /// value. Mixed kinds are `Unordered` in strict mode; otherwise `null`
    /// equals `undefined` and everything else is compared as a number.
    /// Smart mode treats nearly equal floats as equal.
    ///
    /// Anything but a literal yields [`CompareResult::Error`].
    #[must_use]
    pub fn compare(&self, lhs: NodeId, rhs: NodeId, mode: CompareMode) -> CompareResult {
        if !self.is_literal(lhs) || !self.is_literal(rhs) {
            return CompareResult::Error;
        }
        let (lk, rk) = (self.kind(lhs), self.kind(rhs));

        match (lk, rk) {
            (NodeKind::False, NodeKind::False) | (NodeKind::True, NodeKind::True) => {
                return CompareResult::Equal;
            }
            (NodeKind::False, NodeKind::True) => return CompareResult::Less,
            (NodeKind::True, NodeKind::False) => return CompareResult::Greater,
            _ => {}
        }

        if lk == rk {
            let (l, r) = (self.data(lhs), self.data(rhs));
            return match lk {
                NodeKind::Float64 => {
                    if mode == CompareMode::Smart && l.float.nearly_equal(r.float) {
                        CompareResult::Equal
                    } else {
                        l.float.compare(r.float)
                    }
                }
                NodeKind::Int64 => l.int.compare(r.int),
                NodeKind::String => match l.string.cmp(&r.string) {
                    std::cmp::Ordering::Less => CompareResult::Less,
                    std::cmp::Ordering::Equal => CompareResult::Equal,
                    std::cmp::Ordering::Greater => CompareResult::Greater,
                },
                // null and undefined
                _ => CompareResult::Equal,
            };
        }

        if mode == CompareMode::Strict {
            return CompareResult::Unordered;
        }

        if matches!(
            (lk, rk),
            (NodeKind::Null, NodeKind::Undefined) | (NodeKind::Undefined, NodeKind::Null)
        ) {
            return CompareResult::Equal;
        }

        let (lf, rf) = (self.literal_as_float(lhs), self.literal_as_float(rhs));
        if mode == CompareMode::Smart && lf.nearly_equal(rf) {
            return CompareResult::Equal;
        }
        lf.compare(rf)
    }

    #[allow(clippy::cast_precision_loss)]
    fn literal_as_float(&self, id: NodeId) -> Float64 {
        let data = self.data(id);
        match data.kind {
            NodeKind::Int64 => Float64::new(data.int.get() as f64),
            NodeKind::Float64 => data.float,
            NodeKind::True => Float64::new(1.0),
            NodeKind::String => Float64::new(string_to_float64(&data.string)),
            NodeKind::Undefined => Float64::new(f64::NAN),
            _ => Float64::new(0.0),
        }
    }
}
