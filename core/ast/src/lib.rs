#![warn(clippy::pedantic)]
//! Node tree of the as2js compiler.
//!
//! Every node of a compilation lives in one [`Arena`] and is addressed by a
//! [`NodeId`]. Structure, payloads, links and locks are all accessed through
//! the arena.

pub mod arena;
pub mod attributes;
mod compare;
mod convert;
pub mod display;
pub mod errors;
pub mod flags;
pub mod kind;
pub mod lock;
pub mod message;
pub mod position;
mod tree;
pub mod values;

pub use arena::{Arena, MATCH_HIGHEST_DEPTH, MATCH_LOWEST_DEPTH, MATCH_NOT_FOUND, NodeId};
pub use attributes::{Attribute, AttributeSet};
pub use errors::NodeError;
pub use flags::{Flag, FlagSet};
pub use kind::NodeKind;
pub use lock::NodeLock;
pub use message::{
    CollectingSink, Diagnostics, ErrorCode, Message, MessageLevel, MessageSink, TracingSink,
};
pub use position::Position;
pub use values::{CompareMode, CompareResult, Float64, Int64};
