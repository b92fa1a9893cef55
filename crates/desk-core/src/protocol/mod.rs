//! Protocol module: the desk command vocabulary and the cache-dump parser.

pub mod command;
pub mod neighbor;

pub use command::{CommandParseError, DeskCommand};
pub use neighbor::{scan_neighbor_dump, NeighborScan};
