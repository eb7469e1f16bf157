//! # cfg-domtree
//!
//! Semi-NCA dominator and post-dominator trees over caller-owned
//! control-flow graphs, with incremental (DSNCA) updates for single-edge
//! insertions and deletions.
//!
//! A caller implements [`Cfg`] over its own block storage; this crate never
//! owns blocks or instructions. [`DomTree`] and [`PostDomTree`] are the same
//! generic tree parameterized over traversal direction.

pub mod cfg;
pub mod dfs;
pub mod dynamic;
pub mod error;
pub mod oracle;
pub mod rename;
pub mod snca;
pub mod testing;
pub mod tree;

pub use cfg::{BBNumber, Cfg, ENTRY_BLOCK, NO_BLOCK};
pub use error::{DomTreeError, DomTreeResult};
pub use tree::{DomTree, DomTreeNode, DominatedIter, GenericDomTree, PostDomTree, VerificationLevel};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const AUTHOR: &str = env!("CARGO_PKG_AUTHORS");
