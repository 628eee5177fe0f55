//! Diagnostics emitted while building and resolving trees.
//!
//! A [`Message`] carries a level, an [`ErrorCode`], the [`Position`] it
//! refers to and a human readable text. Messages go through
//! [`Diagnostics`], which filters them by level, counts errors and
//! warnings and hands the survivors to a [`MessageSink`].

use std::cell::RefCell;
use std::fmt::{self, Display, Formatter};
use std::rc::Rc;

use crate::position::Position;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum MessageLevel {
    Off,
    Fatal,
    #[default]
    Error,
    Warning,
    Info,
    Debug,
    Trace,
}

impl MessageLevel {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            MessageLevel::Off => "off",
            MessageLevel::Fatal => "fatal",
            MessageLevel::Error => "error",
            MessageLevel::Warning => "warning",
            MessageLevel::Info => "info",
            MessageLevel::Debug => "debug",
            MessageLevel::Trace => "trace",
        }
    }
}

impl Display for MessageLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

macro_rules! error_codes {
    ($($variant:ident => $name:literal,)*) => {
        /// Error codes attached to every message.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum ErrorCode {
            $($variant,)*
        }

        impl ErrorCode {
            #[must_use]
            pub fn as_str(self) -> &'static str {
                match self {
                    $(ErrorCode::$variant => $name,)*
                }
            }
        }
    };
}

error_codes! {
    None => "NONE",
    Abstract => "ABSTRACT",
    BadNumericType => "BAD_NUMERIC_TYPE",
    BadPragma => "BAD_PRAGMA",
    CannotCompile => "CANNOT_COMPILE",
    CannotMatch => "CANNOT_MATCH",
    CannotOverload => "CANNOT_OVERLOAD",
    CannotOverwriteConst => "CANNOT_OVERWRITE_CONST",
    CaseLabel => "CASE_LABEL",
    ColonExpected => "COLON_EXPECTED",
    CommaExpected => "COMMA_EXPECTED",
    CurvlyBracketsExpected => "CURVLY_BRACKETS_EXPECTED",
    DefaultLabel => "DEFAULT_LABEL",
    DivideByZero => "DIVIDE_BY_ZERO",
    Duplicates => "DUPLICATES",
    Dynamic => "DYNAMIC",
    ExpressionExpected => "EXPRESSION_EXPECTED",
    Final => "FINAL",
    ImproperStatement => "IMPROPER_STATEMENT",
    InaccessibleStatement => "INACCESSIBLE_STATEMENT",
    Incompatible => "INCOMPATIBLE",
    IncompatiblePragmaArgument => "INCOMPATIBLE_PRAGMA_ARGUMENT",
    Installation => "INSTALLATION",
    InstanceExpected => "INSTANCE_EXPECTED",
    InternalError => "INTERNAL_ERROR",
    Native => "NATIVE",
    InvalidArrayFunction => "INVALID_ARRAY_FUNCTION",
    InvalidAttributes => "INVALID_ATTRIBUTES",
    InvalidCatch => "INVALID_CATCH",
    InvalidClass => "INVALID_CLASS",
    InvalidConditional => "INVALID_CONDITIONAL",
    InvalidDefinition => "INVALID_DEFINITION",
    InvalidDo => "INVALID_DO",
    InvalidEnum => "INVALID_ENUM",
    InvalidExpression => "INVALID_EXPRESSION",
    InvalidField => "INVALID_FIELD",
    InvalidFieldName => "INVALID_FIELD_NAME",
    InvalidFrame => "INVALID_FRAME",
    InvalidFunction => "INVALID_FUNCTION",
    InvalidGoto => "INVALID_GOTO",
    InvalidImport => "INVALID_IMPORT",
    InvalidInputStream => "INVALID_INPUT_STREAM",
    InvalidKeyword => "INVALID_KEYWORD",
    InvalidLabel => "INVALID_LABEL",
    InvalidNamespace => "INVALID_NAMESPACE",
    InvalidNode => "INVALID_NODE",
    InvalidNumber => "INVALID_NUMBER",
    InvalidOperator => "INVALID_OPERATOR",
    InvalidPackageName => "INVALID_PACKAGE_NAME",
    InvalidParameters => "INVALID_PARAMETERS",
    InvalidRest => "INVALID_REST",
    InvalidReturnType => "INVALID_RETURN_TYPE",
    InvalidScope => "INVALID_SCOPE",
    InvalidTry => "INVALID_TRY",
    InvalidType => "INVALID_TYPE",
    InvalidUnicodeEscapeSequence => "INVALID_UNICODE_ESCAPE_SEQUENCE",
    InvalidVariable => "INVALID_VARIABLE",
    IoError => "IO_ERROR",
    LabelNotFound => "LABEL_NOT_FOUND",
    LoopingReference => "LOOPING_REFERENCE",
    MismatchFuncVar => "MISMATCH_FUNC_VAR",
    MisssingVariableName => "MISSSING_VARIABLE_NAME",
    NeedConst => "NEED_CONST",
    NotAllowed => "NOT_ALLOWED",
    NotAllowedInStrictMode => "NOT_ALLOWED_IN_STRICT_MODE",
    NotFound => "NOT_FOUND",
    NotSupported => "NOT_SUPPORTED",
    ObjectMemberDefinedTwice => "OBJECT_MEMBER_DEFINED_TWICE",
    ParenthesisExpected => "PARENTHESIS_EXPECTED",
    PragmaFailed => "PRAGMA_FAILED",
    SemicolonExpected => "SEMICOLON_EXPECTED",
    SquareBracketsExpected => "SQUARE_BRACKETS_EXPECTED",
    StringExpected => "STRING_EXPECTED",
    Static => "STATIC",
    TypeNotLinked => "TYPE_NOT_LINKED",
    UnknownEscapeSequence => "UNKNOWN_ESCAPE_SEQUENCE",
    UnknownOperator => "UNKNOWN_OPERATOR",
    UnterminatedString => "UNTERMINATED_STRING",
    UnexpectedEof => "UNEXPECTED_EOF",
    UnexpectedPunctuation => "UNEXPECTED_PUNCTUATION",
    UnexpectedToken => "UNEXPECTED_TOKEN",
    UnexpectedDatabase => "UNEXPECTED_DATABASE",
    UnexpectedRc => "UNEXPECTED_RC",
}

impl Display for ErrorCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub level: MessageLevel,
    pub code: ErrorCode,
    pub position: Position,
    pub text: String,
}

impl Message {
    #[must_use]
    pub fn new(
        level: MessageLevel,
        code: ErrorCode,
        position: &Position,
        text: impl Into<String>,
    ) -> Self {
        Self {
            level,
            code,
            position: position.clone(),
            text: text.into(),
        }
    }
}

impl Display for Message {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} {}", self.level, self.position, self.text)
    }
}

/// Receiver of the messages that pass the [`Diagnostics`] filter.
pub trait MessageSink {
    fn output(&mut self, message: &Message);
}

/// Keeps every message in memory. Used by tests and by callers that want to
/// inspect the diagnostics after a compilation.
#[derive(Debug, Default, Clone)]
pub struct CollectingSink {
    messages: Vec<Message>,
}

impl CollectingSink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    #[must_use]
    pub fn error_count(&self) -> usize {
        self.messages
            .iter()
            .filter(|m| matches!(m.level, MessageLevel::Fatal | MessageLevel::Error))
            .count()
    }

    #[must_use]
    pub fn warning_count(&self) -> usize {
        self.messages
            .iter()
            .filter(|m| m.level == MessageLevel::Warning)
            .count()
    }

    /// True when one of the messages carries `code`.
    #[must_use]
    pub fn has_code(&self, code: ErrorCode) -> bool {
        self.messages.iter().any(|m| m.code == code)
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}

impl MessageSink for CollectingSink {
    fn output(&mut self, message: &Message) {
        self.messages.push(message.clone());
    }
}

/// Forwards messages to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl MessageSink for TracingSink {
    fn output(&mut self, message: &Message) {
        let code = message.code.as_str();
        match message.level {
            MessageLevel::Off => {}
            MessageLevel::Fatal | MessageLevel::Error => {
                tracing::error!(code, position = %message.position, "{}", message.text);
            }
            MessageLevel::Warning => {
                tracing::warn!(code, position = %message.position, "{}", message.text);
            }
            MessageLevel::Info => {
                tracing::info!(code, position = %message.position, "{}", message.text);
            }
            MessageLevel::Debug => {
                tracing::debug!(code, position = %message.position, "{}", message.text);
            }
            MessageLevel::Trace => {
                tracing::trace!(code, position = %message.position, "{}", message.text);
            }
        }
    }
}

impl<T: MessageSink + ?Sized> MessageSink for Box<T> {
    fn output(&mut self, message: &Message) {
        (**self).output(message);
    }
}

/// Lets the caller keep a handle on a sink owned by [`Diagnostics`].
impl<T: MessageSink> MessageSink for Rc<RefCell<T>> {
    fn output(&mut self, message: &Message) {
        self.borrow_mut().output(message);
    }
}

/// Filters, counts and dispatches messages to a sink.
pub struct Diagnostics {
    sink: Box<dyn MessageSink>,
    maximum_level: MessageLevel,
    error_count: usize,
    warning_count: usize,
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new(Box::new(TracingSink))
    }
}

impl Diagnostics {
    #[must_use]
    pub fn new(sink: Box<dyn MessageSink>) -> Self {
        Self {
            sink,
            maximum_level: MessageLevel::Info,
            error_count: 0,
            warning_count: 0,
        }
    }

    pub fn set_maximum_level(&mut self, level: MessageLevel) {
        self.maximum_level = level;
    }

    #[must_use]
    pub fn maximum_level(&self) -> MessageLevel {
        self.maximum_level
    }

    /// Emits a message unless its level is `Off`, above the maximum level or
    /// its text is empty. Missing file and function names are replaced with
    /// `unknown-file` and `unknown-func`.
    pub fn emit(
        &mut self,
        level: MessageLevel,
        code: ErrorCode,
        position: &Position,
        text: impl Into<String>,
    ) {
        let text = text.into();
        if level == MessageLevel::Off || level > self.maximum_level || text.is_empty() {
            return;
        }
        let mut message = Message::new(level, code, position, text);
        if message.position.filename().is_empty() {
            message.position.set_filename("unknown-file");
        }
        if message.position.function().is_empty() {
            message.position.set_function("unknown-func");
        }
        match level {
            MessageLevel::Fatal | MessageLevel::Error => self.error_count += 1,
            MessageLevel::Warning => self.warning_count += 1,
            _ => {}
        }
        self.sink.output(&message);
    }

    pub fn fatal(&mut self, code: ErrorCode, position: &Position, text: impl Into<String>) {
        self.emit(MessageLevel::Fatal, code, position, text);
    }

    pub fn error(&mut self, code: ErrorCode, position: &Position, text: impl Into<String>) {
        self.emit(MessageLevel::Error, code, position, text);
    }

    pub fn warning(&mut self, code: ErrorCode, position: &Position, text: impl Into<String>) {
        self.emit(MessageLevel::Warning, code, position, text);
    }

    #[must_use]
    pub fn error_count(&self) -> usize {
        self.error_count
    }

    #[must_use]
    pub fn warning_count(&self) -> usize {
        self.warning_count
    }
}

impl fmt::Debug for Diagnostics {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Diagnostics")
            .field("maximum_level", &self.maximum_level)
            .field("error_count", &self.error_count)
            .field("warning_count", &self.warning_count)
            .finish_non_exhaustive()
    }
}
