//! Per-kind boolean flags.
//!
//! Flags only make sense on a handful of node kinds; [`Flag::accepts`]
//! is the legality table checked before every read or write.

use std::fmt::{self, Display, Formatter};

use crate::kind::NodeKind;

macro_rules! flags {
    ($($variant:ident => ($name:literal, $label:literal),)*) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(u8)]
        pub enum Flag {
            $($variant,)*
        }

        impl Flag {
            pub const ALL: &'static [Flag] = &[$(Flag::$variant,)*];

            /// Full name, e.g. `NODE_FUNCTION_FLAG_GETTER`.
            #[must_use]
            pub fn name(self) -> &'static str {
                match self {
                    $(Flag::$variant => $name,)*
                }
            }

            /// Short label used when displaying a node.
            #[must_use]
            pub fn label(self) -> &'static str {
                match self {
                    $(Flag::$variant => $label,)*
                }
            }
        }
    };
}

flags! {
    CatchTyped => ("NODE_CATCH_FLAG_TYPED", "TYPED"),

    DirectiveListNewVariables => ("NODE_DIRECTIVE_LIST_FLAG_NEW_VARIABLES", "NEW-VARIABLES"),

    EnumClass => ("NODE_ENUM_FLAG_CLASS", "CLASS"),
    EnumInuse => ("NODE_ENUM_FLAG_INUSE", "INUSE"),

    ForConst => ("NODE_FOR_FLAG_CONST", "CONST"),
    ForForeach => ("NODE_FOR_FLAG_FOREACH", "FOREACH"),
    ForIn => ("NODE_FOR_FLAG_IN", "IN"),

    FunctionGetter => ("NODE_FUNCTION_FLAG_GETTER", "GETTER"),
    FunctionSetter => ("NODE_FUNCTION_FLAG_SETTER", "SETTER"),
    FunctionOut => ("NODE_FUNCTION_FLAG_OUT", "OUT"),
    FunctionVoid => ("NODE_FUNCTION_FLAG_VOID", "VOID"),
    FunctionNever => ("NODE_FUNCTION_FLAG_NEVER", "NEVER"),
    FunctionNoparams => ("NODE_FUNCTION_FLAG_NOPARAMS", "NOPARAMS"),
    FunctionOperator => ("NODE_FUNCTION_FLAG_OPERATOR", "OPERATOR"),

    IdentifierWith => ("NODE_IDENTIFIER_FLAG_WITH", "WITH"),
    IdentifierTyped => ("NODE_IDENTIFIER_FLAG_TYPED", "TYPED"),

    ImportImplements => ("NODE_IMPORT_FLAG_IMPLEMENTS", "IMPLEMENTS"),

    PackageFoundLabels => ("NODE_PACKAGE_FLAG_FOUND_LABELS", "FOUND-LABELS"),
    PackageReferenced => ("NODE_PACKAGE_FLAG_REFERENCED", "REFERENCED"),

    ParamConst => ("NODE_PARAM_FLAG_CONST", "CONST"),
    ParamIn => ("NODE_PARAM_FLAG_IN", "IN"),
    ParamOut => ("NODE_PARAM_FLAG_OUT", "OUT"),
    ParamNamed => ("NODE_PARAM_FLAG_NAMED", "NAMED"),
    ParamRest => ("NODE_PARAM_FLAG_REST", "REST"),
    ParamUnchecked => ("NODE_PARAM_FLAG_UNCHECKED", "UNCHECKED"),
    ParamUnprototyped => ("NODE_PARAM_FLAG_UNPROTOTYPED", "UNPROTOTYPED"),
    ParamReferenced => ("NODE_PARAM_FLAG_REFERENCED", "REFERENCED"),
    ParamParamref => ("NODE_PARAM_FLAG_PARAMREF", "PARAMREF"),
    ParamCatch => ("NODE_PARAM_FLAG_CATCH", "CATCH"),

    ParamMatchUnprototyped => ("NODE_PARAM_MATCH_FLAG_UNPROTOTYPED", "UNPROTOTYPED"),

    SwitchDefault => ("NODE_SWITCH_FLAG_DEFAULT", "DEFAULT"),

    TypeModulo => ("NODE_TYPE_FLAG_MODULO", "MODULO"),

    VariableConst => ("NODE_VARIABLE_FLAG_CONST", "CONST"),
    VariableFinal => ("NODE_VARIABLE_FLAG_FINAL", "FINAL"),
    VariableLocal => ("NODE_VARIABLE_FLAG_LOCAL", "LOCAL"),
    VariableMember => ("NODE_VARIABLE_FLAG_MEMBER", "MEMBER"),
    VariableAttributes => ("NODE_VARIABLE_FLAG_ATTRIBUTES", "ATTRIBUTES"),
    VariableEnum => ("NODE_VARIABLE_FLAG_ENUM", "ENUM"),
    VariableCompiled => ("NODE_VARIABLE_FLAG_COMPILED", "COMPILED"),
    VariableInuse => ("NODE_VARIABLE_FLAG_INUSE", "INUSE"),
    VariableAttrs => ("NODE_VARIABLE_FLAG_ATTRS", "ATTRS"),
    VariableDefined => ("NODE_VARIABLE_FLAG_DEFINED", "DEFINED"),
    VariableDefining => ("NODE_VARIABLE_FLAG_DEFINING", "DEFINING"),
    VariableToadd => ("NODE_VARIABLE_FLAG_TOADD", "TOADD"),
}

impl Flag {
    /// Whether a node of `kind` may carry this flag.
    #[must_use]
    #[allow(clippy::enum_glob_use)]
    pub fn accepts(self, kind: NodeKind) -> bool {
        use Flag::*;
        match self {
            CatchTyped => kind == NodeKind::Catch,
            DirectiveListNewVariables => kind == NodeKind::DirectiveList,
            EnumClass | EnumInuse => kind == NodeKind::Enum,
            ForConst | ForForeach | ForIn => kind == NodeKind::For,
            FunctionGetter | FunctionSetter | FunctionOut | FunctionVoid | FunctionNever
            | FunctionNoparams | FunctionOperator => kind == NodeKind::Function,
            IdentifierWith | IdentifierTyped => matches!(
                kind,
                NodeKind::Class
                    | NodeKind::Interface
                    | NodeKind::Identifier
                    | NodeKind::Videntifier
                    | NodeKind::String
            ),
            ImportImplements => kind == NodeKind::Import,
            PackageFoundLabels | PackageReferenced => kind == NodeKind::Package,
            ParamConst | ParamIn | ParamOut | ParamNamed | ParamRest | ParamUnchecked
            | ParamUnprototyped | ParamReferenced | ParamParamref | ParamCatch => {
                kind == NodeKind::Param
            }
            ParamMatchUnprototyped => kind == NodeKind::ParamMatch,
            SwitchDefault => kind == NodeKind::Switch,
            TypeModulo => kind == NodeKind::Type,
            VariableConst | VariableFinal | VariableLocal | VariableMember
            | VariableAttributes | VariableEnum | VariableCompiled | VariableInuse
            | VariableAttrs | VariableDefined | VariableDefining | VariableToadd => {
                matches!(kind, NodeKind::Variable | NodeKind::VarAttributes)
            }
        }
    }

    fn bit(self) -> u64 {
        1_u64 << (self as u8)
    }
}

impl Display for Flag {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct FlagSet(u64);

impl FlagSet {
    #[must_use]
    pub fn contains(self, flag: Flag) -> bool {
        self.0 & flag.bit() != 0
    }

    pub fn set(&mut self, flag: Flag, value: bool) {
        if value {
            self.0 |= flag.bit();
        } else {
            self.0 &= !flag.bit();
        }
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Flags that are set, in declaration order.
    pub fn iter(self) -> impl Iterator<Item = Flag> {
        Flag::ALL.iter().copied().filter(move |f| self.contains(*f))
    }

    /// Drops every flag `kind` does not accept.
    #[must_use]
    pub fn retain_legal(self, kind: NodeKind) -> FlagSet {
        let mut result = FlagSet::default();
        for flag in self.iter().filter(|f| f.accepts(kind)) {
            result.set(flag, true);
        }
        result
    }
}
