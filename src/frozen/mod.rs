//! Immutable containers
//!
//! Mapping, sequence and set types that never change after construction.
//!
//! # Design Principles
//!
//! - No in-place mutation through any public API
//! - Clones share storage (`Arc`), so passing containers around is cheap
//! - Every "update" returns a new container and leaves the receiver untouched
//! - Copy-on-write: the new container copies the shallow backing store once

mod list;
mod map;
mod set;

pub use list::FrozenList;
pub use map::FrozenMap;
pub use set::FrozenSet;
