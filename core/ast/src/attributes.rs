//! Declaration attributes (`public`, `static`, `native`, ...).
//!
//! Unlike flags, most attributes are legal on any node except `PROGRAM`.
//! Several groups are mutually exclusive; [`AttributeSet::exclusive_conflict`]
//! reports which group a new attribute would clash with.

use std::fmt::{self, Display, Formatter};

use crate::kind::NodeKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Attribute {
    Public,
    Private,
    Protected,
    Internal,
    Transient,
    Volatile,
    Static,
    Abstract,
    Virtual,
    Array,
    Inline,
    RequireElse,
    EnsureThen,
    Native,
    Deprecated,
    Unsafe,
    Constructor,
    Final,
    Enumerable,
    True,
    False,
    Unused,
    Dynamic,
    Foreach,
    Nobreak,
    Autobreak,
    Type,
    Defined,
}

const MEMBER_VISIBILITY: &str = "public, private, and protected";
const FUNCTION_TYPE: &str = "abstract, constructor, inline, native, static, and virtual";
const FUNCTION_CONTRACT: &str = "require else and ensure then";
const SWITCH_TYPE: &str = "foreach, nobreak, and autobreak";
const CONDITIONAL_COMPILATION: &str = "true and false";

impl Attribute {
    pub const ALL: &'static [Attribute] = &[
        Attribute::Public,
        Attribute::Private,
        Attribute::Protected,
        Attribute::Internal,
        Attribute::Transient,
        Attribute::Volatile,
        Attribute::Static,
        Attribute::Abstract,
        Attribute::Virtual,
        Attribute::Array,
        Attribute::Inline,
        Attribute::RequireElse,
        Attribute::EnsureThen,
        Attribute::Native,
        Attribute::Deprecated,
        Attribute::Unsafe,
        Attribute::Constructor,
        Attribute::Final,
        Attribute::Enumerable,
        Attribute::True,
        Attribute::False,
        Attribute::Unused,
        Attribute::Dynamic,
        Attribute::Foreach,
        Attribute::Nobreak,
        Attribute::Autobreak,
        Attribute::Type,
        Attribute::Defined,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Attribute::Public => "PUBLIC",
            Attribute::Private => "PRIVATE",
            Attribute::Protected => "PROTECTED",
            Attribute::Internal => "INTERNAL",
            Attribute::Transient => "TRANSIENT",
            Attribute::Volatile => "VOLATILE",
            Attribute::Static => "STATIC",
            Attribute::Abstract => "ABSTRACT",
            Attribute::Virtual => "VIRTUAL",
            Attribute::Array => "ARRAY",
            Attribute::Inline => "INLINE",
            Attribute::RequireElse => "REQUIRE_ELSE",
            Attribute::EnsureThen => "ENSURE_THEN",
            Attribute::Native => "NATIVE",
            Attribute::Deprecated => "DEPRECATED",
            Attribute::Unsafe => "UNSAFE",
            Attribute::Constructor => "CONSTRUCTOR",
            Attribute::Final => "FINAL",
            Attribute::Enumerable => "ENUMERABLE",
            Attribute::True => "TRUE",
            Attribute::False => "FALSE",
            Attribute::Unused => "UNUSED",
            Attribute::Dynamic => "DYNAMIC",
            Attribute::Foreach => "FOREACH",
            Attribute::Nobreak => "NOBREAK",
            Attribute::Autobreak => "AUTOBREAK",
            Attribute::Type => "TYPE",
            Attribute::Defined => "DEFINED",
        }
    }

    /// Whether a node of `kind` may carry this attribute.
    #[must_use]
    pub fn accepts(self, kind: NodeKind) -> bool {
        match self {
            Attribute::Defined => true,
            Attribute::Type => is_expression(kind),
            _ => kind != NodeKind::Program,
        }
    }

    fn bit(self) -> u32 {
        1_u32 << (self as u8)
    }
}

impl Display for Attribute {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Kinds that can appear in an expression and therefore carry a `TYPE`.
fn is_expression(kind: NodeKind) -> bool {
    matches!(
        kind,
        NodeKind::Add
            | NodeKind::Array
            | NodeKind::ArrayLiteral
            | NodeKind::As
            | NodeKind::Assignment
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
            | NodeKind::BitwiseAnd
            | NodeKind::BitwiseNot
            | NodeKind::BitwiseOr
            | NodeKind::BitwiseXor
            | NodeKind::Call
            | NodeKind::Conditional
            | NodeKind::Decrement
            | NodeKind::Delete
            | NodeKind::Divide
            | NodeKind::Equal
            | NodeKind::False
            | NodeKind::Float64
            | NodeKind::Function
            | NodeKind::Greater
            | NodeKind::GreaterEqual
            | NodeKind::Identifier
            | NodeKind::In
            | NodeKind::Increment
            | NodeKind::Instanceof
            | NodeKind::Int64
            | NodeKind::Is
            | NodeKind::Less
            | NodeKind::LessEqual
            | NodeKind::List
            | NodeKind::LogicalAnd
            | NodeKind::LogicalNot
            | NodeKind::LogicalOr
            | NodeKind::LogicalXor
            | NodeKind::Match
            | NodeKind::Maximum
            | NodeKind::Member
            | NodeKind::Minimum
            | NodeKind::Modulo
            | NodeKind::Multiply
            | NodeKind::Name
            | NodeKind::New
            | NodeKind::NotEqual
            | NodeKind::Null
            | NodeKind::ObjectLiteral
            | NodeKind::PostDecrement
            | NodeKind::PostIncrement
            | NodeKind::Power
            | NodeKind::Private
            | NodeKind::Public
            | NodeKind::Range
            | NodeKind::RotateLeft
            | NodeKind::RotateRight
            | NodeKind::Scope
            | NodeKind::ShiftLeft
            | NodeKind::ShiftRight
            | NodeKind::ShiftRightUnsigned
            | NodeKind::StrictlyEqual
            | NodeKind::StrictlyNotEqual
            | NodeKind::String
            | NodeKind::Subtract
            | NodeKind::Super
            | NodeKind::This
            | NodeKind::True
            | NodeKind::Typeof
            | NodeKind::Undefined
            | NodeKind::Videntifier
            | NodeKind::Void
    )
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct AttributeSet(u32);

impl AttributeSet {
    #[must_use]
    pub fn contains(self, attribute: Attribute) -> bool {
        self.0 & attribute.bit() != 0
    }

    pub fn set(&mut self, attribute: Attribute, value: bool) {
        if value {
            self.0 |= attribute.bit();
        } else {
            self.0 &= !attribute.bit();
        }
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub fn any(self, attributes: &[Attribute]) -> bool {
        attributes.iter().any(|a| self.contains(*a))
    }

    pub fn iter(self) -> impl Iterator<Item = Attribute> {
        Attribute::ALL
            .iter()
            .copied()
            .filter(move |a| self.contains(*a))
    }

    #[must_use]
    pub fn retain_legal(self, kind: NodeKind) -> AttributeSet {
        let mut result = AttributeSet::default();
        for attribute in self.iter().filter(|a| a.accepts(kind)) {
            result.set(attribute, true);
        }
        result
    }

    /// Name of the exclusive group `attribute` would conflict with if it
    /// were added to this set, `None` when it can be added.
    #[must_use]
    pub fn exclusive_conflict(self, attribute: Attribute) -> Option<&'static str> {
        use Attribute as A;
        let (conflict, group) = match attribute {
            A::RequireElse => (self.contains(A::EnsureThen), FUNCTION_CONTRACT),
            A::EnsureThen => (self.contains(A::RequireElse), FUNCTION_CONTRACT),
            A::Public => (self.any(&[A::Private, A::Protected]), MEMBER_VISIBILITY),
            A::Private => (self.any(&[A::Public, A::Protected]), MEMBER_VISIBILITY),
            A::Protected => (self.any(&[A::Public, A::Private]), MEMBER_VISIBILITY),
            A::Abstract => (
                self.any(&[A::Static, A::Constructor, A::Virtual, A::Native, A::Inline]),
                FUNCTION_TYPE,
            ),
            A::Constructor => (
                self.any(&[A::Static, A::Virtual, A::Inline, A::Abstract]),
                FUNCTION_TYPE,
            ),
            A::Inline => (
                self.any(&[A::Abstract, A::Constructor, A::Native, A::Virtual]),
                FUNCTION_TYPE,
            ),
            A::Native => (self.any(&[A::Abstract, A::Inline]), FUNCTION_TYPE),
            A::Static => (
                self.any(&[A::Abstract, A::Constructor, A::Virtual]),
                FUNCTION_TYPE,
            ),
            A::Virtual => (
                self.any(&[A::Static, A::Constructor, A::Abstract, A::Inline]),
                FUNCTION_TYPE,
            ),
            A::Foreach => (self.any(&[A::Nobreak, A::Autobreak]), SWITCH_TYPE),
            A::Nobreak => (self.any(&[A::Foreach, A::Autobreak]), SWITCH_TYPE),
            A::Autobreak => (self.any(&[A::Foreach, A::Nobreak]), SWITCH_TYPE),
            A::True => (self.contains(A::False), CONDITIONAL_COMPILATION),
            A::False => (self.contains(A::True), CONDITIONAL_COMPILATION),
            A::Array
            | A::Defined
            | A::Deprecated
            | A::Dynamic
            | A::Enumerable
            | A::Final
            | A::Internal
            | A::Transient
            | A::Type
            | A::Unsafe
            | A::Unused
            | A::Volatile => return None,
        };
        conflict.then_some(group)
    }
}

/// Text of the error reported when an exclusive attribute is rejected.
#[must_use]
pub fn exclusive_attributes_message(group: &str) -> String {
    format!("Attributes {group} are mutually exclusive. Only one of them can be used.")
}

#[cfg(test)]
mod tests {
    use super::*;

    mod legality {
        use super::*;

        #[test]
        fn program_only_takes_type_and_defined() {
            assert!(!Attribute::Public.accepts(NodeKind::Program));
            assert!(Attribute::Defined.accepts(NodeKind::Program));
            assert!(!Attribute::Type.accepts(NodeKind::Program));
            assert!(Attribute::Public.accepts(NodeKind::Function));
        }

        #[test]
        fn type_is_for_expressions() {
            assert!(Attribute::Type.accepts(NodeKind::Identifier));
            assert!(Attribute::Type.accepts(NodeKind::Call));
            assert!(!Attribute::Type.accepts(NodeKind::DirectiveList));
            assert!(!Attribute::Type.accepts(NodeKind::Class));
        }
    }

    mod exclusive {
        use super::*;

        #[test]
        fn visibility_is_exclusive() {
            let mut set = AttributeSet::default();
            set.set(Attribute::Public, true);
            assert_eq!(
                set.exclusive_conflict(Attribute::Private),
                Some("public, private, and protected")
            );
            assert_eq!(set.exclusive_conflict(Attribute::Internal), None);
        }

        #[test]
        fn native_allows_static_but_not_inline() {
            let mut set = AttributeSet::default();
            set.set(Attribute::Native, true);
            assert_eq!(set.exclusive_conflict(Attribute::Static), None);
            assert!(set.exclusive_conflict(Attribute::Inline).is_some());
            assert!(set.exclusive_conflict(Attribute::Abstract).is_some());
        }

        #[test]
        fn message_names_the_group() {
            assert_eq!(
                exclusive_attributes_message(CONDITIONAL_COMPILATION),
                "Attributes true and false are mutually exclusive. Only one of them can be used."
            );
        }
    }
}
