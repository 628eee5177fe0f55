use std::fmt::{self, Display, Formatter};

use crate::errors::NodeError;

pub type Counter = i32;

pub const DEFAULT_COUNTER: Counter = 1;

/// Location of a node in its source file.
///
/// The page, page line and paragraph counters are relative; `line` is the
/// absolute line number and is never reset by a page break.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Position {
    filename: String,
    function: String,
    page: Counter,
    page_line: Counter,
    paragraph: Counter,
    line: Counter,
}

impl Default for Position {
    fn default() -> Self {
        Self {
            filename: String::new(),
            function: String::new(),
            page: DEFAULT_COUNTER,
            page_line: DEFAULT_COUNTER,
            paragraph: DEFAULT_COUNTER,
            line: DEFAULT_COUNTER,
        }
    }
}

impl Position {
    #[must_use]
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            ..Self::default()
        }
    }

    pub fn set_filename(&mut self, filename: impl Into<String>) {
        self.filename = filename.into();
    }

    pub fn set_function(&mut self, function: impl Into<String>) {
        self.function = function.into();
    }

    /// Rebases every counter; the absolute line becomes `line`.
    ///
    /// # Errors
    ///
    /// Returns [`NodeError::InvalidLine`] when `line` is less than 1. The
    /// position is left untouched in that case.
    pub fn reset_counters(&mut self, line: Counter) -> Result<(), NodeError> {
        if line < 1 {
            return Err(NodeError::InvalidLine { line });
        }
        self.page = DEFAULT_COUNTER;
        self.page_line = DEFAULT_COUNTER;
        self.paragraph = DEFAULT_COUNTER;
        self.line = line;
        Ok(())
    }

    pub fn new_page(&mut self) {
        self.page += 1;
        self.page_line = DEFAULT_COUNTER;
        self.paragraph = DEFAULT_COUNTER;
    }

    pub fn new_paragraph(&mut self) {
        self.paragraph += 1;
    }

    pub fn new_line(&mut self) {
        self.page_line += 1;
        self.line += 1;
    }

    #[must_use]
    pub fn filename(&self) -> &str {
        &self.filename
    }

    #[must_use]
    pub fn function(&self) -> &str {
        &self.function
    }

    #[must_use]
    pub fn page(&self) -> Counter {
        self.page
    }

    #[must_use]
    pub fn page_line(&self) -> Counter {
        self.page_line
    }

    #[must_use]
    pub fn paragraph(&self) -> Counter {
        self.paragraph
    }

    #[must_use]
    pub fn line(&self) -> Counter {
        self.line
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.filename.is_empty() {
            write!(f, "line {}:", self.line)
        } else {
            write!(f, "{}:{}:", self.filename, self.line)
        }
    }
}
