//! Seams to the outside world: where module sources come from and how they
//! become node trees.

use std::path::Path;

use as2js_ast::{Arena, NodeId};
use rustc_hash::FxHashMap;

/// Supplies the source of a module by filename.
///
/// When no retriever is installed, or it returns `None`, the compiler reads
/// the file from disk.
pub trait InputRetriever {
    fn retrieve(&mut self, filename: &str) -> Option<String>;
}

impl InputRetriever for FxHashMap<String, String> {
    fn retrieve(&mut self, filename: &str) -> Option<String> {
        self.get(filename).cloned()
    }
}

impl<F> InputRetriever for F
where
    F: FnMut(&str) -> Option<String>,
{
    fn retrieve(&mut self, filename: &str) -> Option<String> {
        self(filename)
    }
}

/// Turns a module source into a `PROGRAM` tree inside `arena`.
///
/// `Ok(None)` means the source was rejected (the parser reported why);
/// `Err` means the parser itself failed.
pub trait ModuleParser {
    /// # Errors
    ///
    /// Any failure of the parser other than a rejected source.
    fn parse(
        &mut self,
        arena: &mut Arena,
        source: &str,
        filename: &str,
    ) -> anyhow::Result<Option<NodeId>>;
}

impl<F> ModuleParser for F
where
    F: FnMut(&mut Arena, &str, &str) -> anyhow::Result<Option<NodeId>>,
{
    fn parse(
        &mut self,
        arena: &mut Arena,
        source: &str,
        filename: &str,
    ) -> anyhow::Result<Option<NodeId>> {
        self(arena, source, filename)
    }
}

/// Whether `name` is a script module scanned for packages.
pub(crate) fn is_package_script(name: &str) -> bool {
    Path::new(name).extension().is_some_and(|ext| ext == "js") && name != "as2js_init.js"
}
