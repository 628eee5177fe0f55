//! Human readable dump of a subtree, one node per line.
//!
//! ```text
//! #0: 02.  1041: DIRECTIVE_LIST: (line 1:)
//! #1: 03-   1061: IDENTIFIER: 'a' (line 1:)
//! ```
//!
//! Children are prefixed with `-`, variables with `=` and labels with `:`.

use std::fmt::{self, Display, Formatter, Write};

use crate::arena::{Arena, NodeId};
use crate::kind::NodeKind;

/// Borrowing wrapper returned by [`Arena::display`].
pub struct NodeDisplay<'a> {
    arena: &'a Arena,
    id: NodeId,
}

impl Arena {
    #[must_use]
    pub fn display(&self, id: NodeId) -> NodeDisplay<'_> {
        NodeDisplay { arena: self, id }
    }
}

fn write_str_payload(f: &mut impl Write, s: &str) -> fmt::Result {
    f.write_str(": '")?;
    for c in s.chars() {
        let code = u32::from(c);
        if code < 0x20 {
            f.write_char('^')?;
            f.write_char(char::from(b'@' + u8::try_from(code).unwrap_or(0)))?;
        } else if code < 0x7F {
            if c == '\'' {
                f.write_str("\\'")?;
            } else {
                f.write_char(c)?;
            }
        } else if code < 0x100 {
            write!(f, "\\x{code:x}")?;
        } else if code < 0x10000 {
            write!(f, "\\u{code:04x}")?;
        } else {
            write!(f, "\\U{code:08x}")?;
        }
    }
    f.write_char('\'')
}

impl NodeDisplay<'_> {
    fn write_data(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let data = self.arena.data(self.id);
        let kind = data.kind;
        write!(f, "{:04}: {}", kind.value(), kind.name())?;
        if let Some(c) = kind.punctuation() {
            write!(f, " = '{c}'")?;
        }

        let flags = |f: &mut Formatter<'_>| {
            data.flags
                .iter()
                .filter(|flag| flag.accepts(kind))
                .try_for_each(|flag| write!(f, " {}", flag.label()))
        };
        match kind {
            NodeKind::Break
            | NodeKind::Continue
            | NodeKind::Goto
            | NodeKind::Interface
            | NodeKind::Label
            | NodeKind::Namespace
            | NodeKind::RegularExpression => write_str_payload(f, &data.string)?,
            NodeKind::Catch
            | NodeKind::DirectiveList
            | NodeKind::For
            | NodeKind::ParamMatch
            | NodeKind::Switch
            | NodeKind::Type => {
                f.write_char(':')?;
                flags(f)?;
            }
            NodeKind::Enum
            | NodeKind::Class
            | NodeKind::Identifier
            | NodeKind::String
            | NodeKind::Videntifier
            | NodeKind::Import
            | NodeKind::Package
            | NodeKind::Function
            | NodeKind::Variable
            | NodeKind::VarAttributes => {
                write_str_payload(f, &data.string)?;
                flags(f)?;
            }
            NodeKind::Param => {
                write_str_payload(f, &data.string)?;
                f.write_char(':')?;
                flags(f)?;
            }
            NodeKind::Int64 => {
                let value = data.int.get();
                write!(f, ": {value}, 0x{value:016x}")?;
            }
            NodeKind::Float64 => write!(f, ": {}", data.float)?,
            _ => {}
        }
        Ok(())
    }

    fn write_node(&self, f: &mut Formatter<'_>, indent: usize, c: char) -> fmt::Result {
        let arena = self.arena;
        let id = self.id;
        write!(f, "{id}: {indent:02}{c}{:indent$}", "")?;
        self.write_data(f)?;

        let links = [
            (" Instance: ", arena.instance(id)),
            (" Type Node: ", arena.type_node(id)),
            (" Attribute Node: ", arena.attribute_node(id)),
            (" Goto Exit: ", arena.goto_exit(id)),
            (" Goto Enter: ", arena.goto_enter(id)),
        ];
        for (label, link) in links {
            if let Some(link) = link {
                write!(f, "{label}{link}")?;
            }
        }

        let attributes = arena.attributes(id);
        if !attributes.is_empty() {
            f.write_str(" attrs:")?;
            for attribute in attributes.iter() {
                write!(f, " {}", attribute.name())?;
            }
        }

        write!(f, " ({})", arena.position(id))?;
        let locks = arena.lock_count(id);
        if locks > 0 {
            write!(f, " Locked: {locks}")?;
        }
        writeln!(f)?;

        let data = arena.data(id);
        for child in &data.children {
            arena.display(*child).write_node(f, indent + 1, '-')?;
        }
        for variable in data.variables.iter().filter(|v| arena.is_alive(**v)) {
            arena.display(*variable).write_node(f, indent + 1, '=')?;
        }
        let mut labels: Vec<_> = data
            .labels
            .iter()
            .filter(|(_, label)| arena.is_alive(**label))
            .collect();
        labels.sort_by(|a, b| a.0.cmp(b.0));
        for (_, label) in labels {
            arena.display(*label).write_node(f, indent + 1, ':')?;
        }
        Ok(())
    }
}

impl Display for NodeDisplay<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        self.write_node(f, 2, '.')
    }
}
