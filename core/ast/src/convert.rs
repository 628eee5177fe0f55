//! Kind predicates and in-place conversions.
//!
//! Conversions return `Ok(false)` when the node kind cannot be converted and
//! leave the node untouched. Errors are only raised for locked or discarded
//! nodes.

use crate::arena::{Arena, NodeId};
use crate::errors::NodeError;
use crate::kind::NodeKind;
use crate::values::{Float64, Int64, string_is_float64, string_is_int64, string_is_number};
use crate::values::{string_is_true, string_to_float64, string_to_int64};

/// Formats a finite float the way scripts print numbers: no exponent, at most
/// six decimals, no trailing zeros.
#[allow(clippy::float_cmp)]
fn float_to_string(value: Float64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    let raw = value.get();
    if raw == 0.0 {
        return "0".to_string();
    }
    if value.is_negative_infinity() {
        return "-Infinity".to_string();
    }
    if value.is_positive_infinity() {
        return "Infinity".to_string();
    }
    let mut s = format!("{raw:.6}");
    if s.contains('.') {
        let trimmed = s.trim_end_matches('0').trim_end_matches('.').len();
        s.truncate(trimmed);
    }
    s
}

impl Arena {
    #[must_use]
    pub fn is_number(&self, id: NodeId) -> bool {
        matches!(self.kind(id), NodeKind::Int64 | NodeKind::Float64)
    }

    /// Whether the value would become `NaN` when converted to a number.
    #[must_use]
    pub fn is_nan(&self, id: NodeId) -> bool {
        match self.kind(id) {
            NodeKind::String => !string_is_number(&self.data(id).string),
            NodeKind::Int64
            | NodeKind::Float64
            | NodeKind::True
            | NodeKind::False
            | NodeKind::Null => false,
            _ => true,
        }
    }

    #[must_use]
    pub fn is_int64(&self, id: NodeId) -> bool {
        self.kind(id) == NodeKind::Int64
    }

    #[must_use]
    pub fn is_float64(&self, id: NodeId) -> bool {
        self.kind(id) == NodeKind::Float64
    }

    #[must_use]
    pub fn is_boolean(&self, id: NodeId) -> bool {
        matches!(self.kind(id), NodeKind::True | NodeKind::False)
    }

    #[must_use]
    pub fn is_true(&self, id: NodeId) -> bool {
        self.kind(id) == NodeKind::True
    }

    #[must_use]
    pub fn is_false(&self, id: NodeId) -> bool {
        self.kind(id) == NodeKind::False
    }

    #[must_use]
    pub fn is_string(&self, id: NodeId) -> bool {
        self.kind(id) == NodeKind::String
    }

    #[must_use]
    pub fn is_undefined(&self, id: NodeId) -> bool {
        self.kind(id) == NodeKind::Undefined
    }

    #[must_use]
    pub fn is_null(&self, id: NodeId) -> bool {
        self.kind(id) == NodeKind::Null
    }

    #[must_use]
    pub fn is_identifier(&self, id: NodeId) -> bool {
        matches!(self.kind(id), NodeKind::Identifier | NodeKind::Videntifier)
    }

    #[must_use]
    pub fn is_literal(&self, id: NodeId) -> bool {
        matches!(
            self.kind(id),
            NodeKind::False
                | NodeKind::Float64
                | NodeKind::Int64
                | NodeKind::Null
                | NodeKind::String
                | NodeKind::True
                | NodeKind::Undefined
        )
    }

    /// Whether evaluating the subtree may change program state.
    #[must_use]
    pub fn has_side_effects(&self, id: NodeId) -> bool {
        let kind = self.kind(id);
        if matches!(
            kind,
            NodeKind::Assignment
                | NodeKind::AssignmentAdd
                | NodeKind::AssignmentBitwiseAnd
                | NodeKind::AssignmentBitwiseOr
                | NodeKind::AssignmentBitwiseXor
                | NodeKind::AssignmentDivide
                | NodeKind::AssignmentLogicalAnd
                | NodeKind::AssignmentLogicalOr
                | NodeKind::AssignmentLogicalXor
                | NodeKind::AssignmentMaximum
                | NodeKind::AssignmentMinimum
                | NodeKind::AssignmentModulo
                | NodeKind::AssignmentMultiply
                | NodeKind::AssignmentPower
                | NodeKind::AssignmentRotateLeft
                | NodeKind::AssignmentRotateRight
                | NodeKind::AssignmentShiftLeft
                | NodeKind::AssignmentShiftRight
                | NodeKind::AssignmentShiftRightUnsigned
                | NodeKind::AssignmentSubtract
                | NodeKind::Call
                | NodeKind::Decrement
                | NodeKind::Delete
                | NodeKind::Increment
                | NodeKind::New
                | NodeKind::PostDecrement
                | NodeKind::PostIncrement
        ) {
            return true;
        }
        self.children(id)
            .iter()
            .any(|child| self.has_side_effects(*child))
    }

    /// The boolean kind the node would convert to, or `UNDEFINED` when it is
    /// not a literal.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn to_boolean_type_only(&self, id: NodeId) -> NodeKind {
        let data = self.data(id);
        match data.kind {
            kind @ (NodeKind::True | NodeKind::False) => kind,
            NodeKind::Null | NodeKind::Undefined => NodeKind::False,
            NodeKind::Int64 => truth(data.int.get() != 0),
            NodeKind::Float64 => truth(data.float.get() != 0.0 && !data.float.is_nan()),
            NodeKind::String => truth(string_is_true(&data.string)),
            _ => NodeKind::Undefined,
        }
    }

    /// # Errors
    ///
    /// Lock or dead-node errors only.
    pub fn to_unknown(&mut self, id: NodeId) -> Result<(), NodeError> {
        self.modifying(id)?;
        self.recast(id, NodeKind::Unknown);
        Ok(())
    }

    /// `CALL` to `AS`.
    ///
    /// # Errors
    ///
    /// Lock or dead-node errors only.
    pub fn to_as(&mut self, id: NodeId) -> Result<bool, NodeError> {
        self.convert(id, |arena, kind| {
            (kind == NodeKind::Call).then(|| arena.recast(id, NodeKind::As))
        })
    }

    /// # Errors
    ///
    /// Lock or dead-node errors only.
    pub fn to_boolean(&mut self, id: NodeId) -> Result<bool, NodeError> {
        self.modifying(id)?;
        match self.to_boolean_type_only(id) {
            NodeKind::Undefined => Ok(false),
            kind => {
                self.recast(id, kind);
                Ok(true)
            }
        }
    }

    /// Member getters and assignment setters become calls.
    ///
    /// # Errors
    ///
    /// Lock or dead-node errors only.
    pub fn to_call(&mut self, id: NodeId) -> Result<bool, NodeError> {
        self.convert(id, |arena, kind| {
            matches!(kind, NodeKind::Member | NodeKind::Assignment)
                .then(|| arena.recast(id, NodeKind::Call))
        })
    }

    /// Turns `private`, `protected` and `public` keywords back into plain
    /// identifiers.
    ///
    /// # Errors
    ///
    /// Lock or dead-node errors only.
    pub fn to_identifier(&mut self, id: NodeId) -> Result<bool, NodeError> {
        self.convert(id, |arena, kind| {
            let name = match kind {
                NodeKind::Identifier => return Some(()),
                NodeKind::Private => "private",
                NodeKind::Protected => "protected",
                NodeKind::Public => "public",
                _ => return None,
            };
            arena.recast(id, NodeKind::Identifier);
            arena.nodes[id.index()].string = name.to_string();
            Some(())
        })
    }

    /// # Errors
    ///
    /// Lock or dead-node errors only.
    #[allow(clippy::cast_possible_truncation)]
    pub fn to_int64(&mut self, id: NodeId) -> Result<bool, NodeError> {
        self.convert(id, |arena, kind| {
            let data = &arena.nodes[id.index()];
            let value = match kind {
                NodeKind::Int64 => return Some(()),
                NodeKind::Float64 => {
                    let f = data.float;
                    if f.is_nan() || f.is_infinity() {
                        0
                    } else {
                        f.get() as i64
                    }
                }
                NodeKind::True => 1,
                NodeKind::Null | NodeKind::False | NodeKind::Undefined => 0,
                NodeKind::String => {
                    if string_is_int64(&data.string) {
                        string_to_int64(&data.string)
                    } else if string_is_float64(&data.string) {
                        string_to_float64(&data.string) as i64
                    } else {
                        0
                    }
                }
                _ => return None,
            };
            arena.nodes[id.index()].int = Int64::new(value);
            arena.recast(id, NodeKind::Int64);
            Some(())
        })
    }

    /// # Errors
    ///
    /// Lock or dead-node errors only.
    pub fn to_float64(&mut self, id: NodeId) -> Result<bool, NodeError> {
        self.convert(id, |arena, kind| {
            let data = &arena.nodes[id.index()];
            let value = match kind {
                NodeKind::Float64 => return Some(()),
                #[allow(clippy::cast_precision_loss)]
                NodeKind::Int64 => data.int.get() as f64,
                NodeKind::True => 1.0,
                NodeKind::Null | NodeKind::False => 0.0,
                NodeKind::String => string_to_float64(&data.string),
                NodeKind::Undefined => f64::NAN,
                _ => return None,
            };
            arena.nodes[id.index()].float = Float64::new(value);
            arena.recast(id, NodeKind::Float64);
            Some(())
        })
    }

    /// `IDENTIFIER` to `LABEL`.
    ///
    /// # Errors
    ///
    /// Lock or dead-node errors only.
    pub fn to_label(&mut self, id: NodeId) -> Result<bool, NodeError> {
        self.convert(id, |arena, kind| {
            (kind == NodeKind::Identifier).then(|| arena.recast(id, NodeKind::Label))
        })
    }

    /// Booleans and `null` become integers; strings and `undefined` become
    /// floats.
    ///
    /// # Errors
    ///
    /// Lock or dead-node errors only.
    pub fn to_number(&mut self, id: NodeId) -> Result<bool, NodeError> {
        self.convert(id, |arena, kind| {
            match kind {
                NodeKind::Int64 | NodeKind::Float64 => {}
                NodeKind::True | NodeKind::Null | NodeKind::False => {
                    arena.nodes[id.index()].int = Int64::new(i64::from(kind == NodeKind::True));
                    arena.recast(id, NodeKind::Int64);
                }
                NodeKind::Undefined => {
                    arena.nodes[id.index()].float = Float64::new(f64::NAN);
                    arena.recast(id, NodeKind::Float64);
                }
                NodeKind::String => {
                    let value = string_to_float64(&arena.nodes[id.index()].string);
                    arena.nodes[id.index()].float = Float64::new(value);
                    arena.recast(id, NodeKind::Float64);
                }
                _ => return None,
            }
            Some(())
        })
    }

    /// # Errors
    ///
    /// Lock or dead-node errors only.
    pub fn to_string(&mut self, id: NodeId) -> Result<bool, NodeError> {
        self.convert(id, |arena, kind| {
            let data = &arena.nodes[id.index()];
            let text = match kind {
                NodeKind::String => return Some(()),
                NodeKind::Identifier => data.string.clone(),
                NodeKind::Undefined => "undefined".to_string(),
                NodeKind::Null => "null".to_string(),
                NodeKind::True => "true".to_string(),
                NodeKind::False => "false".to_string(),
                NodeKind::Int64 => data.int.get().to_string(),
                NodeKind::Float64 => float_to_string(data.float),
                _ => return None,
            };
            arena.nodes[id.index()].string = text;
            arena.recast(id, NodeKind::String);
            Some(())
        })
    }

    /// `IDENTIFIER` to `VIDENTIFIER`.
    ///
    /// # Errors
    ///
    /// Lock or dead-node errors only.
    pub fn to_videntifier(&mut self, id: NodeId) -> Result<bool, NodeError> {
        self.convert(id, |arena, kind| {
            (kind == NodeKind::Identifier).then(|| arena.recast(id, NodeKind::Videntifier))
        })
    }

    /// `VARIABLE` to `VAR_ATTRIBUTES`.
    ///
    /// # Errors
    ///
    /// Lock or dead-node errors only.
    pub fn to_var_attributes(&mut self, id: NodeId) -> Result<bool, NodeError> {
        self.convert(id, |arena, kind| {
            (kind == NodeKind::Variable).then(|| arena.recast(id, NodeKind::VarAttributes))
        })
    }

    fn convert(
        &mut self,
        id: NodeId,
        apply: impl FnOnce(&mut Arena, NodeKind) -> Option<()>,
    ) -> Result<bool, NodeError> {
        self.modifying(id)?;
        let kind = self.kind(id);
        Ok(apply(self, kind).is_some())
    }
}

fn truth(value: bool) -> NodeKind {
    if value { NodeKind::True } else { NodeKind::False }
}
