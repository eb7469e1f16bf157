//! Iterative dual-numbering DFS over a [`Cfg`].
//!
//! Produces preorder/postorder numbers and a DFS-tree parent table, in both
//! regular (forward, from block `1`) and post-dominator (reverse graph, from
//! a virtual exit whose predecessors are every block with no successors)
//! modes. The traversal is iterative: an explicit stack stands in for the
//! call stack so depth is bounded only by available memory, not by native
//! stack size, since CFGs can be arbitrarily deep.

use crate::cfg::{BBNumber, Cfg, NO_BLOCK};

/// A 1-based preorder or postorder DFS number. `0` means "unreachable" when
/// stored in a block-indexed array.
pub type DfsNumber = u32;

#[derive(Debug, Clone, Copy)]
struct StackEntry {
    block: BBNumber,
    /// Preorder number of the parent that pushed this entry, or `None` if
    /// this entry is (so far) a DFS-tree root candidate (the real root, or a
    /// post-dom root reached directly from the virtual exit).
    parent_pre: Option<DfsNumber>,
    children_pushed: bool,
}

/// DFS numbering of a CFG (or its reverse, for post-dominance), plus the
/// DFS-tree parent-preorder table that [`crate::snca`] compresses over.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DfsTree {
    /// `to_pre[b]`: preorder number of block `b`, or `0` if unreachable.
    /// Indexed `0..=n_blocks`; index `0` is unused.
    to_pre: Vec<DfsNumber>,
    /// `from_pre[p]`: block with preorder number `p`. Indexed `0..=
    /// n_reachable`; index `0` is unused.
    from_pre: Vec<BBNumber>,
    /// `to_post[b]`: postorder number of block `b`, or `0` if unreachable.
    to_post: Vec<DfsNumber>,
    /// `from_post[p]`: block with postorder number `p`.
    from_post: Vec<BBNumber>,
    /// `to_parent_pre[p]`: preorder number of the DFS-tree parent of node
    /// `p`. DFS-tree roots self-loop: `to_parent_pre[p] == p`.
    to_parent_pre: Vec<DfsNumber>,
    /// Reused scratch stack for iterative traversal.
    #[cfg_attr(feature = "serde", serde(skip))]
    scratch: Vec<StackEntry>,
    is_post_dom: bool,
}

impl DfsTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_post_dom(&self) -> bool {
        self.is_post_dom
    }

    /// Number of blocks reachable from the start node(s), i.e. the highest
    /// assigned preorder number.
    pub fn n_reachable(&self) -> usize {
        self.from_pre.len().saturating_sub(1)
    }

    pub fn to_pre(&self, block: BBNumber) -> DfsNumber {
        self.to_pre.get(block as usize).copied().unwrap_or(0)
    }
    pub fn from_pre(&self, pre: DfsNumber) -> BBNumber {
        self.from_pre[pre as usize]
    }
    pub fn to_post(&self, block: BBNumber) -> DfsNumber {
        self.to_post.get(block as usize).copied().unwrap_or(0)
    }
    pub fn from_post(&self, post: DfsNumber) -> BBNumber {
        self.from_post[post as usize]
    }
    pub fn parent_pre(&self, pre: DfsNumber) -> DfsNumber {
        self.to_parent_pre[pre as usize]
    }
    pub fn is_root(&self, pre: DfsNumber) -> bool {
        self.to_parent_pre[pre as usize] == pre
    }
    pub fn is_reachable(&self, block: BBNumber) -> bool {
        self.to_pre(block) != 0
    }

    /// Neighbors to traverse from `block` in this DFS's direction:
    /// successors in forward mode, predecessors in post-dominator mode.
    fn neighbors<'c>(&self, cfg: &'c dyn Cfg, block: BBNumber) -> &'c [BBNumber] {
        if self.is_post_dom { cfg.preds(block) } else { cfg.succs(block) }
    }

    /// Runs (or re-runs) a forward DFS rooted at block `1`.
    pub fn run_forward(&mut self, cfg: &dyn Cfg) {
        self.reset(cfg, false);
        self.seed(crate::cfg::ENTRY_BLOCK, None);
        self.drain(cfg);
        self.truncate_to_reachable();
    }

    /// Runs (or re-runs) a post-dominator DFS over the reverse graph, rooted
    /// at a virtual exit whose children are every block with an empty
    /// successor list.
    pub fn run_post_dom(&mut self, cfg: &dyn Cfg) {
        self.reset(cfg, true);
        for block in 1..=cfg.n_blocks() as BBNumber {
            if cfg.succs(block).is_empty() {
                self.seed(block, None);
            }
        }
        self.drain(cfg);
        self.truncate_to_reachable();
    }

    fn reset(&mut self, cfg: &dyn Cfg, is_post_dom: bool) {
        let n = cfg.n_blocks();
        self.is_post_dom = is_post_dom;
        self.to_pre.clear();
        self.to_pre.resize(n + 1, 0);
        self.to_post.clear();
        self.to_post.resize(n + 1, 0);
        self.from_pre.clear();
        self.from_pre.push(NO_BLOCK);
        self.from_post.clear();
        self.from_post.push(NO_BLOCK);
        self.to_parent_pre.clear();
        self.to_parent_pre.push(0);
        self.scratch.clear();
    }

    fn seed(&mut self, block: BBNumber, parent_pre: Option<DfsNumber>) {
        self.scratch.push(StackEntry { block, parent_pre, children_pushed: false });
    }

    fn drain(&mut self, cfg: &dyn Cfg) {
        while let Some(top) = self.scratch.pop() {
            if !top.children_pushed {
                if self.to_pre(top.block) != 0 {
                    // Already numbered via a different path (cross/forward edge).
                    continue;
                }
                let pre = self.from_pre.len() as DfsNumber;
                self.to_pre[top.block as usize] = pre;
                self.from_pre.push(top.block);
                self.to_parent_pre.push(parent_pre_for(pre, top.parent_pre));

                self.scratch.push(StackEntry {
                    block: top.block,
                    parent_pre: top.parent_pre,
                    children_pushed: true,
                });

                let neighbors = self.neighbors(cfg, top.block);
                for &next in neighbors {
                    if next == NO_BLOCK {
                        assert!(
                            self.is_post_dom,
                            "edge value 0 (virtual/absent edge) is only legal in post-dominator traversal"
                        );
                        continue;
                    }
                    self.seed(next, Some(pre));
                }
            } else {
                let post = self.from_post.len() as DfsNumber;
                self.to_post[top.block as usize] = post;
                self.from_post.push(top.block);
            }
        }
    }

    /// Applies an external block renumbering (`rename_bb[old] = new`, `-1`
    /// for a deleted block) to this DFS tree. Preorder/postorder numbers and
    /// the DFS-tree parent table are untouched -- renaming never changes
    /// traversal structure -- only the block-number values stored in
    /// `to_pre` (rebuilt) and `from_pre` (remapped in place) move.
    pub(crate) fn remap_blocks(&mut self, rename_bb: &[i64], new_n_blocks: usize) {
        let mut new_to_pre = vec![0 as DfsNumber; new_n_blocks + 1];
        for old_block in 1..self.to_pre.len() as BBNumber {
            let pre = self.to_pre[old_block as usize];
            if pre == 0 {
                continue;
            }
            let new_block = rename_bb[old_block as usize];
            if new_block < 0 {
                continue;
            }
            new_to_pre[new_block as usize] = pre;
        }
        self.to_pre = new_to_pre;

        for old_block_slot in self.from_pre.iter_mut().skip(1) {
            let new_block = rename_bb[*old_block_slot as usize];
            debug_assert!(
                new_block >= 0,
                "rename_nodes deleted a block that is still reachable in the DFS tree"
            );
            *old_block_slot = new_block as BBNumber;
        }
    }

    fn truncate_to_reachable(&mut self) {
        // from_pre/from_post/to_parent_pre already contain exactly the
        // reachable nodes (plus the unused index 0); nothing further to do,
        // but keep this as an explicit step so the invariant is visible and
        // re-running DFS after it shrinks doesn't leave stale tail entries.
        debug_assert_eq!(self.from_pre.len(), self.from_post.len());
        debug_assert_eq!(self.from_pre.len(), self.to_parent_pre.len());
    }
}

fn parent_pre_for(own_pre: DfsNumber, parent_pre: Option<DfsNumber>) -> DfsNumber {
    parent_pre.unwrap_or(own_pre)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::VecCfg;

    #[test]
    fn diamond_forward_dfs() {
        let cfg = VecCfg::from_edges(4, &[(1, 2), (1, 3), (2, 4), (3, 4)]);
        let mut dfs = DfsTree::new();
        dfs.run_forward(&cfg);
        assert_eq!(dfs.n_reachable(), 4);
        assert_eq!(dfs.to_pre(1), 1);
        assert!(dfs.is_root(1));
        assert!(dfs.is_reachable(4));
    }

    #[test]
    fn unreachable_block_is_not_numbered() {
        let cfg = VecCfg::from_edges(3, &[(1, 2)]);
        let mut dfs = DfsTree::new();
        dfs.run_forward(&cfg);
        assert_eq!(dfs.n_reachable(), 2);
        assert_eq!(dfs.to_pre(3), 0);
        assert!(!dfs.is_reachable(3));
    }

    #[test]
    fn post_dom_dfs_starts_at_exits() {
        let cfg = VecCfg::from_edges(4, &[(1, 2), (1, 3), (2, 4), (3, 4)]);
        let mut dfs = DfsTree::new();
        dfs.run_post_dom(&cfg);
        assert_eq!(dfs.to_pre(4), 1);
        assert!(dfs.is_root(1));
        assert_eq!(dfs.n_reachable(), 4);
    }
}
