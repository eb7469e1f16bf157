//! Error types.
//!
//! The core algorithms in this crate have exactly one recoverable failure
//! mode -- everything else (preorder monotonicity violations, illegal
//! edge-0 in a forward DFS, queries against an unreachable block, NCA
//! non-convergence) indicates caller misuse or a bug in this crate, and is
//! reported with `assert!`/`debug_assert!` rather than a `Result`.

#[derive(thiserror::Error)]
pub enum DomTreeError {
    /// Tried to build a dominator tree for a CFG with no blocks.
    #[error("cannot build a dominator tree for an empty CFG")]
    EmptyCfg,
}

pub type DomTreeResult<T = ()> = Result<T, DomTreeError>;

// Derives `Display` via `thiserror` but implements `Debug` by delegating
// to it, so `unwrap()`/`expect()` panics print the readable message
// instead of the derived enum layout.
impl std::fmt::Debug for DomTreeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(self, f)
    }
}
