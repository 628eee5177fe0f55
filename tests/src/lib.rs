//! End to end scenarios of the as2js node tree, package database and name
//! resolution, driven through the public API of the crates.

#[cfg(test)]
mod utils;

#[cfg(test)]
mod ast;
#[cfg(test)]
mod compiler;
#[cfg(test)]
mod db;
