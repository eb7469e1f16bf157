//! Dominator-tree construction, node/level maintenance, and the query layer.
//!
//! [`GenericDomTree`] is parameterized over whether it is a forward
//! dominator tree or a post-dominator tree via a `const bool` generic
//! rather than a type parameter, since the only thing that varies here is
//! traversal direction, not behavior attached to a relation type.

use crate::{
    cfg::{BBNumber, Cfg, ENTRY_BLOCK, NO_BLOCK},
    dfs::{DfsNumber, DfsTree},
    error::{DomTreeError, DomTreeResult},
    snca::Snca,
};

/// A node in the dominator tree, indexed by block number.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DomTreeNode {
    /// `1` at the root(s); a non-root's level is its immediate dominator's
    /// level plus one.
    pub level: u32,
    /// Blocks immediately dominated by this node, ascending by block number.
    pub children: Vec<BBNumber>,
}

/// A dominator tree (`POST_DOM == false`) or post-dominator tree
/// (`POST_DOM == true`) over a [`Cfg`] snapshot.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GenericDomTree<const POST_DOM: bool> {
    pub(crate) dfs: DfsTree,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub(crate) snca: Snca,
    /// Immediate dominator of each reachable node, as a preorder number.
    /// A DFS-tree root stores its own preorder number (self-loop).
    pub(crate) idoms_pre: Vec<DfsNumber>,
    /// `idoms_bb[b]`: immediate dominator of block `b`, or `0` for a root or
    /// an unreachable block.
    pub(crate) idoms_bb: Vec<BBNumber>,
    /// Block-indexed dominator-tree nodes.
    pub(crate) nodes: Vec<DomTreeNode>,
}

/// A forward dominator tree, rooted at block `1`.
pub type DomTree = GenericDomTree<false>;
/// A post-dominator tree, rooted at every exit block (via a virtual exit
/// node that never appears in the public API).
pub type PostDomTree = GenericDomTree<true>;

impl DomTree {
    /// Builds a post-dominator tree for `cfg`. Equivalent to
    /// `PostDomTree::build`; kept as an associated function on `DomTree` too
    /// since callers otherwise building only forward trees often reach for
    /// this name first.
    pub fn build_postdom(cfg: &dyn Cfg) -> DomTreeResult<PostDomTree> {
        PostDomTree::build(cfg)
    }
}

impl<const POST_DOM: bool> GenericDomTree<POST_DOM> {
    /// Builds a fresh tree from `cfg`. Runs DFS, then full SNCA, then the
    /// tree builder.
    pub fn build(cfg: &dyn Cfg) -> DomTreeResult<Self> {
        if cfg.n_blocks() == 0 {
            return Err(DomTreeError::EmptyCfg);
        }
        let mut tree = Self::default();
        tree.rebuild(cfg);
        Ok(tree)
    }

    pub(crate) fn is_forward_root_block(block: BBNumber) -> bool {
        !POST_DOM && block == ENTRY_BLOCK
    }

    /// Full rebuild: DFS, full SNCA, tree/level rebuild.
    pub(crate) fn rebuild(&mut self, cfg: &dyn Cfg) {
        log::debug!("dominator tree: full rebuild ({} blocks)", cfg.n_blocks());
        if POST_DOM {
            self.dfs.run_post_dom(cfg);
        } else {
            self.dfs.run_forward(cfg);
        }
        let n = self.dfs.n_reachable() as DfsNumber;
        self.idoms_pre.clear();
        self.idoms_pre.resize(n as usize + 1, 0);
        self.snca.run(&self.dfs, cfg, n);
        self.compute_idoms_pre(n);
        self.compute_idoms_bb(cfg.n_blocks());
        self.compute_nodes(cfg.n_blocks());
    }

    /// Recomputes `idoms_pre[1..=max_pre]` from the current (possibly just
    /// partially-recomputed) semidominators. Preorders above `max_pre` are
    /// left untouched, matching the SNCA recomputation they were paired
    /// with.
    pub(crate) fn compute_idoms_pre(&mut self, max_pre: DfsNumber) {
        for v in 1..=max_pre {
            self.idoms_pre[v as usize] = self.dfs.parent_pre(v);
        }
        let floor: DfsNumber = if POST_DOM { 1 } else { 2 };
        for w in floor..=max_pre {
            let w_semi = self.snca.semi(w);
            let mut idom = self.idoms_pre[w as usize];
            while idom > w_semi {
                idom = self.idoms_pre[idom as usize];
            }
            self.idoms_pre[w as usize] = idom;
        }
    }

    pub(crate) fn compute_idoms_bb(&mut self, n_blocks: usize) {
        self.idoms_bb.clear();
        self.idoms_bb.resize(n_blocks + 1, NO_BLOCK);
        for block in 1..=n_blocks as BBNumber {
            let pre = self.dfs.to_pre(block);
            if pre == 0 || self.dfs.is_root(pre) {
                self.idoms_bb[block as usize] = NO_BLOCK;
                continue;
            }
            let idom_pre = self.idoms_pre[pre as usize];
            self.idoms_bb[block as usize] =
                if idom_pre == 0 { NO_BLOCK } else { self.dfs.from_pre(idom_pre) };
        }
    }

    pub(crate) fn compute_nodes(&mut self, n_blocks: usize) {
        self.nodes.clear();
        self.nodes.resize(n_blocks + 1, DomTreeNode::default());
        for block in 1..=n_blocks as BBNumber {
            let idom = self.idoms_bb[block as usize];
            if idom != NO_BLOCK {
                self.nodes[idom as usize].children.push(block);
            }
        }
        self.assign_levels(n_blocks);
    }

    fn assign_levels(&mut self, n_blocks: usize) {
        let mut worklist: Vec<BBNumber> = (1..=n_blocks as BBNumber)
            .filter(|&b| self.dfs.is_reachable(b) && self.idoms_bb[b as usize] == NO_BLOCK)
            .collect();
        for &root in &worklist {
            self.nodes[root as usize].level = 1;
        }
        let mut head = 0;
        while head < worklist.len() {
            let block = worklist[head];
            head += 1;
            let level = self.nodes[block as usize].level;
            let children = self.nodes[block as usize].children.clone();
            for child in children {
                self.nodes[child as usize].level = level + 1;
                worklist.push(child);
            }
        }
    }

    pub fn n_blocks(&self) -> usize {
        self.idoms_bb.len().saturating_sub(1)
    }

    /// A copy of the block-indexed immediate-dominator table, for tests that
    /// need to compare a tree's state across an incremental update.
    pub fn idoms_bb_snapshot(&self) -> Vec<BBNumber> {
        self.idoms_bb.clone()
    }

    pub fn level(&self, block: BBNumber) -> u32 {
        self.nodes[block as usize].level
    }

    pub fn idom(&self, block: BBNumber) -> BBNumber {
        self.idoms_bb[block as usize]
    }

    pub fn children(&self, block: BBNumber) -> &[BBNumber] {
        &self.nodes[block as usize].children
    }

    /// `b != 1 && to_pre[b] == 0` for a forward tree; analogously,
    /// unreachable from any exit, for a post-dominator tree.
    pub fn bb_unreachable(&self, block: BBNumber) -> bool {
        if Self::is_forward_root_block(block) {
            return false;
        }
        !self.dfs.is_reachable(block)
    }

    /// `dominates(a, b)` (or, on a [`PostDomTree`], `postdominates(a, b)`):
    /// true when `a == b`, or when walking up from `b` by exactly
    /// `level(b) - level(a)` steps of `idom` lands on `a`.
    pub fn dominates(&self, a: BBNumber, b: BBNumber) -> bool {
        if a == b {
            return true;
        }
        debug_assert!(!self.bb_unreachable(a) && !self.bb_unreachable(b));
        let level_a = self.level(a);
        let level_b = self.level(b);
        if level_a > level_b {
            return false;
        }
        let mut cur = b;
        for _ in 0..(level_b - level_a) {
            cur = self.idom(cur);
        }
        cur == a
    }

    /// Returns `0` if either argument is `0`; otherwise the deepest common
    /// ancestor in the tree.
    pub fn nearest_common_dominator(&self, a: BBNumber, b: BBNumber) -> BBNumber {
        if a == NO_BLOCK || b == NO_BLOCK {
            return NO_BLOCK;
        }
        let (mut x, mut y) = (a, b);
        while self.level(x) > self.level(y) {
            x = self.idom(x);
        }
        while self.level(y) > self.level(x) {
            y = self.idom(y);
        }
        while x != y {
            x = self.idom(x);
            y = self.idom(y);
            assert!(x != NO_BLOCK && y != NO_BLOCK, "dominator walk failed to converge at a root");
        }
        x
    }

    /// Every block transitively dominated by `root`, including `root`
    /// itself, each exactly once. Order is unspecified beyond that.
    pub fn dominated(&self, root: BBNumber) -> DominatedIter<'_, POST_DOM> {
        DominatedIter { tree: self, worklist: vec![root] }
    }

    /// Level of verification performed by [`Self::verify`].
    pub fn verification_level(&self) -> VerificationLevel {
        VerificationLevel::Fast
    }
}

/// How thoroughly [`GenericDomTree::verify`] checks a tree against a
/// from-scratch rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationLevel {
    /// Compare block-indexed idoms against a fresh rebuild. O(n) besides the
    /// rebuild itself.
    Fast,
    /// `Fast`, plus recheck every level and every parent/children
    /// consistency pair. O(n) besides the rebuild.
    Full,
}

impl<const POST_DOM: bool> GenericDomTree<POST_DOM> {
    /// Rebuilds a throwaway tree from `cfg` and compares it against `self`.
    /// Intended for tests and debug assertions, not the hot path.
    pub fn verify(&self, cfg: &dyn Cfg, level: VerificationLevel) -> bool {
        let fresh = match Self::build(cfg) {
            Ok(fresh) => fresh,
            Err(_) => return self.idoms_bb.iter().all(|&b| b == NO_BLOCK),
        };
        if self.idoms_bb != fresh.idoms_bb {
            return false;
        }
        if level == VerificationLevel::Full {
            for block in 1..self.nodes.len() as BBNumber {
                if self.nodes[block as usize].level != fresh.nodes[block as usize].level {
                    return false;
                }
                let mut ours = self.nodes[block as usize].children.clone();
                let mut theirs = fresh.nodes[block as usize].children.clone();
                ours.sort_unstable();
                theirs.sort_unstable();
                if ours != theirs {
                    return false;
                }
            }
        }
        true
    }
}

impl PostDomTree {
    /// Alias for [`GenericDomTree::dominates`] with the name the spec uses
    /// for post-dominance queries.
    pub fn postdominates(&self, a: BBNumber, b: BBNumber) -> bool {
        self.dominates(a, b)
    }
}

pub struct DominatedIter<'t, const POST_DOM: bool> {
    tree: &'t GenericDomTree<POST_DOM>,
    worklist: Vec<BBNumber>,
}

impl<const POST_DOM: bool> Iterator for DominatedIter<'_, POST_DOM> {
    type Item = BBNumber;

    fn next(&mut self) -> Option<BBNumber> {
        let block = self.worklist.pop()?;
        self.worklist.extend_from_slice(self.tree.children(block));
        Some(block)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::VecCfg;

    #[test]
    fn diamond() {
        let cfg = VecCfg::from_edges(4, &[(1, 2), (1, 3), (2, 4), (3, 4)]);
        let tree = DomTree::build(&cfg).unwrap();
        assert_eq!(tree.idom(1), 0);
        assert_eq!(tree.idom(2), 1);
        assert_eq!(tree.idom(3), 1);
        assert_eq!(tree.idom(4), 1);
        assert_eq!(tree.level(1), 1);
        assert_eq!(tree.level(2), 2);
        assert_eq!(tree.level(3), 2);
        assert_eq!(tree.level(4), 2);
    }

    #[test]
    fn chain_with_side_branch() {
        let cfg = VecCfg::from_edges(6, &[(1, 2), (2, 3), (1, 4), (4, 5), (5, 6), (6, 3)]);
        let tree = DomTree::build(&cfg).unwrap();
        assert_eq!(tree.idom(3), 1);
    }

    #[test]
    fn unreachable_block() {
        let cfg = VecCfg::from_edges(3, &[(1, 2)]);
        let tree = DomTree::build(&cfg).unwrap();
        assert_eq!(tree.idom(1), 0);
        assert_eq!(tree.idom(2), 1);
        assert_eq!(tree.idom(3), 0);
        assert!(tree.bb_unreachable(3));
        assert!(!tree.dominates(1, 3));
    }

    #[test]
    fn post_dominator_diamond() {
        let cfg = VecCfg::from_edges(4, &[(1, 2), (1, 3), (2, 4), (3, 4)]);
        let tree = PostDomTree::build(&cfg).unwrap();
        assert_eq!(tree.idom(1), 4);
        assert_eq!(tree.idom(2), 4);
        assert_eq!(tree.idom(3), 4);
        assert_eq!(tree.idom(4), 0);
    }

    #[test]
    fn dominated_enumerates_subtree() {
        let cfg = VecCfg::from_edges(4, &[(1, 2), (1, 3), (2, 4), (3, 4)]);
        let tree = DomTree::build(&cfg).unwrap();
        let mut all: Vec<_> = tree.dominated(1).collect();
        all.sort_unstable();
        assert_eq!(all, vec![1, 2, 3, 4]);
    }

    #[test]
    fn verify_matches_fresh_build() {
        let cfg = VecCfg::from_edges(6, &[(1, 2), (2, 3), (1, 4), (4, 5), (5, 6), (6, 3)]);
        let tree = DomTree::build(&cfg).unwrap();
        assert!(tree.verify(&cfg, VerificationLevel::Full));
    }
}
