mod arena;
mod bulk;
mod handle;
mod node;
mod raw_osrbtree_map;

pub(crate) use arena::Arena;
pub(crate) use handle::Handle;
pub(crate) use node::{Node, Side};
pub(crate) use raw_osrbtree_map::{RawOSRBTreeMap, Search, step};
