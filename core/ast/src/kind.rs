//! Node kinds.
//!
//! The numeric values are stable: punctuation kinds use the character they
//! stand for and keywords start at 1001. The name table is sorted by value so
//! lookups can use a binary search.

use std::fmt::{self, Display, Formatter};
use std::sync::Once;

macro_rules! node_kinds {
    ($($variant:ident = $value:literal => $name:literal,)*) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(i32)]
        pub enum NodeKind {
            $($variant = $value,)*
        }

        static NODE_KIND_NAMES: &[(NodeKind, &str)] = &[
            $((NodeKind::$variant, $name),)*
        ];
    };
}

node_kinds! {
    Eof = -1 => "EOF",
    Unknown = 0 => "UNKNOWN",
    LogicalNot = 33 => "LOGICAL_NOT",
    Modulo = 37 => "MODULO",
    BitwiseAnd = 38 => "BITWISE_AND",
    OpenParenthesis = 40 => "OPEN_PARENTHESIS",
    CloseParenthesis = 41 => "CLOSE_PARENTHESIS",
    Multiply = 42 => "MULTIPLY",
    Add = 43 => "ADD",
    Comma = 44 => "COMMA",
    Subtract = 45 => "SUBTRACT",
    Member = 46 => "MEMBER",
    Divide = 47 => "DIVIDE",
    Colon = 58 => "COLON",
    Semicolon = 59 => "SEMICOLON",
    Less = 60 => "LESS",
    Assignment = 61 => "ASSIGNMENT",
    Greater = 62 => "GREATER",
    Conditional = 63 => "CONDITIONAL",
    OpenSquareBracket = 91 => "OPEN_SQUARE_BRACKET",
    CloseSquareBracket = 93 => "CLOSE_SQUARE_BRACKET",
    BitwiseXor = 94 => "BITWISE_XOR",
    OpenCurvlyBracket = 123 => "OPEN_CURVLY_BRACKET",
    BitwiseOr = 124 => "BITWISE_OR",
    CloseCurvlyBracket = 125 => "CLOSE_CURVLY_BRACKET",
    BitwiseNot = 126 => "BITWISE_NOT",
    Abstract = 1001 => "ABSTRACT",
    Array = 1002 => "ARRAY",
    ArrayLiteral = 1003 => "ARRAY_LITERAL",
    As = 1004 => "AS",
    AssignmentAdd = 1005 => "ASSIGNMENT_ADD",
    AssignmentBitwiseAnd = 1006 => "ASSIGNMENT_BITWISE_AND",
    AssignmentBitwiseOr = 1007 => "ASSIGNMENT_BITWISE_OR",
    AssignmentBitwiseXor = 1008 => "ASSIGNMENT_BITWISE_XOR",
    AssignmentDivide = 1009 => "ASSIGNMENT_DIVIDE",
    AssignmentLogicalAnd = 1010 => "ASSIGNMENT_LOGICAL_AND",
    AssignmentLogicalOr = 1011 => "ASSIGNMENT_LOGICAL_OR",
    AssignmentLogicalXor = 1012 => "ASSIGNMENT_LOGICAL_XOR",
    AssignmentMaximum = 1013 => "ASSIGNMENT_MAXIMUM",
    AssignmentMinimum = 1014 => "ASSIGNMENT_MINIMUM",
    AssignmentModulo = 1015 => "ASSIGNMENT_MODULO",
    AssignmentMultiply = 1016 => "ASSIGNMENT_MULTIPLY",
    AssignmentPower = 1017 => "ASSIGNMENT_POWER",
    AssignmentRotateLeft = 1018 => "ASSIGNMENT_ROTATE_LEFT",
    AssignmentRotateRight = 1019 => "ASSIGNMENT_ROTATE_RIGHT",
    AssignmentShiftLeft = 1020 => "ASSIGNMENT_SHIFT_LEFT",
    AssignmentShiftRight = 1021 => "ASSIGNMENT_SHIFT_RIGHT",
    AssignmentShiftRightUnsigned = 1022 => "ASSIGNMENT_SHIFT_RIGHT_UNSIGNED",
    AssignmentSubtract = 1023 => "ASSIGNMENT_SUBTRACT",
    Attributes = 1024 => "ATTRIBUTES",
    Auto = 1025 => "AUTO",
    Boolean = 1026 => "BOOLEAN",
    Break = 1027 => "BREAK",
    Byte = 1028 => "BYTE",
    Call = 1029 => "CALL",
    Case = 1030 => "CASE",
    Catch = 1031 => "CATCH",
    Char = 1032 => "CHAR",
    Class = 1033 => "CLASS",
    Compare = 1034 => "COMPARE",
    Const = 1035 => "CONST",
    Continue = 1036 => "CONTINUE",
    Debugger = 1037 => "DEBUGGER",
    Decrement = 1038 => "DECREMENT",
    Default = 1039 => "DEFAULT",
    Delete = 1040 => "DELETE",
    DirectiveList = 1041 => "DIRECTIVE_LIST",
    Do = 1042 => "DO",
    Double = 1043 => "DOUBLE",
    Else = 1044 => "ELSE",
    Empty = 1045 => "EMPTY",
    Ensure = 1046 => "ENSURE",
    Enum = 1047 => "ENUM",
    Equal = 1048 => "EQUAL",
    Exclude = 1049 => "EXCLUDE",
    Extends = 1050 => "EXTENDS",
    Export = 1051 => "EXPORT",
    False = 1052 => "FALSE",
    Final = 1053 => "FINAL",
    Finally = 1054 => "FINALLY",
    Float = 1055 => "FLOAT",
    Float64 = 1056 => "FLOAT64",
    For = 1057 => "FOR",
    Function = 1058 => "FUNCTION",
    Goto = 1059 => "GOTO",
    GreaterEqual = 1060 => "GREATER_EQUAL",
    Identifier = 1061 => "IDENTIFIER",
    If = 1062 => "IF",
    Implements = 1063 => "IMPLEMENTS",
    Import = 1064 => "IMPORT",
    In = 1065 => "IN",
    Include = 1066 => "INCLUDE",
    Increment = 1067 => "INCREMENT",
    Inline = 1068 => "INLINE",
    Instanceof = 1069 => "INSTANCEOF",
    Int64 = 1070 => "INT64",
    Interface = 1071 => "INTERFACE",
    Invariant = 1072 => "INVARIANT",
    Is = 1073 => "IS",
    Label = 1074 => "LABEL",
    LessEqual = 1075 => "LESS_EQUAL",
    List = 1076 => "LIST",
    LogicalAnd = 1077 => "LOGICAL_AND",
    LogicalOr = 1078 => "LOGICAL_OR",
    LogicalXor = 1079 => "LOGICAL_XOR",
    Long = 1080 => "LONG",
    Match = 1081 => "MATCH",
    Maximum = 1082 => "MAXIMUM",
    Minimum = 1083 => "MINIMUM",
    Name = 1084 => "NAME",
    Namespace = 1085 => "NAMESPACE",
    Native = 1086 => "NATIVE",
    New = 1087 => "NEW",
    NotEqual = 1088 => "NOT_EQUAL",
    NotMatch = 1089 => "NOT_MATCH",
    Null = 1090 => "NULL",
    ObjectLiteral = 1091 => "OBJECT_LITERAL",
    Package = 1092 => "PACKAGE",
    Param = 1093 => "PARAM",
    Parameters = 1094 => "PARAMETERS",
    ParamMatch = 1095 => "PARAM_MATCH",
    PostDecrement = 1096 => "POST_DECREMENT",
    PostIncrement = 1097 => "POST_INCREMENT",
    Power = 1098 => "POWER",
    Private = 1099 => "PRIVATE",
    Program = 1100 => "PROGRAM",
    Protected = 1101 => "PROTECTED",
    Public = 1102 => "PUBLIC",
    Range = 1103 => "RANGE",
    RegularExpression = 1104 => "REGULAR_EXPRESSION",
    Require = 1105 => "REQUIRE",
    Rest = 1106 => "REST",
    Return = 1107 => "RETURN",
    Root = 1108 => "ROOT",
    RotateLeft = 1109 => "ROTATE_LEFT",
    RotateRight = 1110 => "ROTATE_RIGHT",
    Scope = 1111 => "SCOPE",
    Set = 1112 => "SET",
    ShiftLeft = 1113 => "SHIFT_LEFT",
    ShiftRight = 1114 => "SHIFT_RIGHT",
    ShiftRightUnsigned = 1115 => "SHIFT_RIGHT_UNSIGNED",
    Short = 1116 => "SHORT",
    SmartMatch = 1117 => "SMART_MATCH",
    Static = 1118 => "STATIC",
    StrictlyEqual = 1119 => "STRICTLY_EQUAL",
    StrictlyNotEqual = 1120 => "STRICTLY_NOT_EQUAL",
    String = 1121 => "STRING",
    Super = 1122 => "SUPER",
    Switch = 1123 => "SWITCH",
    Synchronized = 1124 => "SYNCHRONIZED",
    Then = 1125 => "THEN",
    This = 1126 => "THIS",
    Throw = 1127 => "THROW",
    Throws = 1128 => "THROWS",
    Transient = 1129 => "TRANSIENT",
    True = 1130 => "TRUE",
    Try = 1131 => "TRY",
    Type = 1132 => "TYPE",
    Typeof = 1133 => "TYPEOF",
    Undefined = 1134 => "UNDEFINED",
    Use = 1135 => "USE",
    Var = 1136 => "VAR",
    Variable = 1137 => "VARIABLE",
    VarAttributes = 1138 => "VAR_ATTRIBUTES",
    Videntifier = 1139 => "VIDENTIFIER",
    Void = 1140 => "VOID",
    Volatile = 1141 => "VOLATILE",
    While = 1142 => "WHILE",
    With = 1143 => "WITH",
    Yield = 1144 => "YIELD",
}

static OPERATOR_NAMES: &[(NodeKind, &str)] = &[
    (NodeKind::LogicalNot, "!"),
    (NodeKind::Modulo, "%"),
    (NodeKind::BitwiseAnd, "&"),
    (NodeKind::Multiply, "*"),
    (NodeKind::Add, "+"),
    (NodeKind::Subtract, "-"),
    (NodeKind::Divide, "/"),
    (NodeKind::Less, "<"),
    (NodeKind::Assignment, "="),
    (NodeKind::Greater, ">"),
    (NodeKind::BitwiseXor, "^"),
    (NodeKind::BitwiseOr, "|"),
    (NodeKind::BitwiseNot, "~"),
    (NodeKind::AssignmentAdd, "+="),
    (NodeKind::AssignmentBitwiseAnd, "&="),
    (NodeKind::AssignmentBitwiseOr, "|="),
    (NodeKind::AssignmentBitwiseXor, "^="),
    (NodeKind::AssignmentDivide, "/="),
    (NodeKind::AssignmentLogicalAnd, "&&="),
    (NodeKind::AssignmentLogicalOr, "||="),
    (NodeKind::AssignmentLogicalXor, "^^="),
    (NodeKind::AssignmentMaximum, ">?="),
    (NodeKind::AssignmentMinimum, "<?="),
    (NodeKind::AssignmentModulo, "%="),
    (NodeKind::AssignmentMultiply, "*="),
    (NodeKind::AssignmentPower, "**="),
    (NodeKind::AssignmentRotateLeft, "<%="),
    (NodeKind::AssignmentRotateRight, ">%="),
    (NodeKind::AssignmentShiftLeft, "<<="),
    (NodeKind::AssignmentShiftRight, ">>="),
    (NodeKind::AssignmentShiftRightUnsigned, ">>>="),
    (NodeKind::AssignmentSubtract, "-="),
    (NodeKind::Call, "()"),
    (NodeKind::Compare, "<=>"),
    (NodeKind::Decrement, "--x"),
    (NodeKind::Equal, "=="),
    (NodeKind::GreaterEqual, ">="),
    (NodeKind::Increment, "++x"),
    (NodeKind::LessEqual, "<="),
    (NodeKind::LogicalAnd, "&&"),
    (NodeKind::LogicalOr, "||"),
    (NodeKind::LogicalXor, "^^"),
    (NodeKind::Match, "~="),
    (NodeKind::Maximum, ">?"),
    (NodeKind::Minimum, "<?"),
    (NodeKind::NotEqual, "!="),
    (NodeKind::NotMatch, "!~"),
    (NodeKind::PostDecrement, "x--"),
    (NodeKind::PostIncrement, "x++"),
    (NodeKind::Power, "**"),
    (NodeKind::RotateLeft, "<%"),
    (NodeKind::RotateRight, ">%"),
    (NodeKind::ShiftLeft, "<<"),
    (NodeKind::ShiftRight, ">>"),
    (NodeKind::ShiftRightUnsigned, ">>>"),
    (NodeKind::SmartMatch, "~~"),
    (NodeKind::StrictlyEqual, "==="),
    (NodeKind::StrictlyNotEqual, "!=="),
];

static SORT_CHECK: Once = Once::new();

/// Both tables are binary searched; make sure nobody broke their order.
fn check_tables_sorted() {
    if cfg!(debug_assertions) {
        SORT_CHECK.call_once(|| {
            for table in [NODE_KIND_NAMES, OPERATOR_NAMES] {
                for pair in table.windows(2) {
                    assert!(
                        pair[0].0 < pair[1].0,
                        "node kind table not sorted at {} / {}",
                        pair[0].1,
                        pair[1].1
                    );
                }
            }
        });
    }
}

fn search(table: &'static [(NodeKind, &'static str)], kind: NodeKind) -> Option<&'static str> {
    check_tables_sorted();
    table
        .binary_search_by(|(k, _)| k.cmp(&kind))
        .ok()
        .map(|idx| table[idx].1)
}

impl NodeKind {
    #[must_use]
    pub fn value(self) -> i32 {
        self as i32
    }

    /// Upper-case name of the kind, such as `"DIRECTIVE_LIST"`.
    #[must_use]
    pub fn name(self) -> &'static str {
        search(NODE_KIND_NAMES, self).unwrap_or("<undefined type>")
    }

    #[must_use]
    pub fn from_value(value: i32) -> Option<NodeKind> {
        check_tables_sorted();
        NODE_KIND_NAMES
            .binary_search_by(|(k, _)| k.value().cmp(&value))
            .ok()
            .map(|idx| NODE_KIND_NAMES[idx].0)
    }

    /// Every kind, in value order.
    pub fn all() -> impl Iterator<Item = NodeKind> {
        NODE_KIND_NAMES.iter().map(|(k, _)| *k)
    }

    /// Source spelling of an operator kind; `None` for anything else.
    #[must_use]
    pub fn operator_to_string(self) -> Option<&'static str> {
        search(OPERATOR_NAMES, self)
    }

    /// Reverse of [`NodeKind::operator_to_string`]. Also accepts `<>` for
    /// `!=` and `:=` for `=`.
    #[must_use]
    pub fn string_to_operator(op: &str) -> Option<NodeKind> {
        if let Some((kind, _)) = OPERATOR_NAMES.iter().find(|(_, name)| *name == op) {
            return Some(*kind);
        }
        match op {
            "<>" => Some(NodeKind::NotEqual),
            ":=" => Some(NodeKind::Assignment),
            _ => None,
        }
    }

    /// The character a punctuation kind stands for, if it is printable.
    #[must_use]
    pub fn punctuation(self) -> Option<char> {
        u8::try_from(self.value())
            .ok()
            .filter(|c| c.is_ascii_graphic())
            .map(char::from)
    }

    /// Whether a node of this kind may own children.
    #[must_use]
    pub fn can_be_parent(self) -> bool {
        !matches!(
            self,
            NodeKind::Abstract
                | NodeKind::Auto
                | NodeKind::Boolean
                | NodeKind::Break
                | NodeKind::Byte
                | NodeKind::Char
                | NodeKind::CloseCurvlyBracket
                | NodeKind::CloseParenthesis
                | NodeKind::CloseSquareBracket
                | NodeKind::Colon
                | NodeKind::Comma
                | NodeKind::Const
                | NodeKind::Continue
                | NodeKind::Default
                | NodeKind::Double
                | NodeKind::Else
                | NodeKind::Empty
                | NodeKind::Eof
                | NodeKind::False
                | NodeKind::Final
                | NodeKind::Float
                | NodeKind::Float64
                | NodeKind::Goto
                | NodeKind::Identifier
                | NodeKind::Inline
                | NodeKind::Int64
                | NodeKind::Long
                | NodeKind::Native
                | NodeKind::Null
                | NodeKind::OpenCurvlyBracket
                | NodeKind::OpenParenthesis
                | NodeKind::OpenSquareBracket
                | NodeKind::Private
                | NodeKind::Protected
                | NodeKind::Public
                | NodeKind::RegularExpression
                | NodeKind::Rest
                | NodeKind::Semicolon
                | NodeKind::Short
                | NodeKind::Static
                | NodeKind::String
                | NodeKind::Then
                | NodeKind::This
                | NodeKind::Transient
                | NodeKind::True
                | NodeKind::Undefined
                | NodeKind::Videntifier
                | NodeKind::Void
                | NodeKind::Volatile
        )
    }

    /// Whether a node of this kind may be attached under a parent. Lexer
    /// tokens and the root never are.
    #[must_use]
    pub fn can_be_child(self) -> bool {
        !matches!(
            self,
            NodeKind::CloseCurvlyBracket
                | NodeKind::CloseParenthesis
                | NodeKind::CloseSquareBracket
                | NodeKind::Colon
                | NodeKind::Comma
                | NodeKind::Else
                | NodeKind::Then
                | NodeKind::Eof
                | NodeKind::OpenCurvlyBracket
                | NodeKind::OpenParenthesis
                | NodeKind::OpenSquareBracket
                | NodeKind::Root
                | NodeKind::Semicolon
        )
    }
}

impl Display for NodeKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
