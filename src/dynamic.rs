//! Dynamic Semi-NCA (DSNCA): incremental edge insertion and deletion.
//!
//! Implements the classification rules from the Georgiadis dynamic-
//! dominators paper, the same one `0xMiden-compiler/hir/src/ir/dominance/
//! nca.rs` names in its own doc comment, keeping this crate's plain
//! preorder-indexed array representation rather than that crate's
//! batch-update machinery.
//!
//! Incremental updates are implemented for forward dominator trees only; a
//! [`PostDomTree`] always takes the full-rebuild path on a CFG edit.

use crate::{
    cfg::Cfg,
    dfs::DfsNumber,
    tree::{DomTree, GenericDomTree, PostDomTree},
};

impl DomTree {
    /// Inserts edge `from -> to` into the already-updated `cfg` and brings
    /// the tree up to date. No-op if `from` is unreachable.
    pub fn insert_edge(&mut self, cfg: &dyn Cfg, from: u32, to: u32) {
        if !self.dfs.is_reachable(from) {
            return;
        }
        let from_pre = self.dfs.to_pre(from);
        let to_pre = self.dfs.to_pre(to);

        let needs_rebuild = to_pre == 0
            || (from_pre < to_pre && self.dfs.to_post(from) < self.dfs.to_post(to));

        if needs_rebuild {
            log::debug!("insert_edge({from}, {to}): DFS tree invalidated, full rebuild");
            self.rebuild(cfg);
            return;
        }

        log::debug!("insert_edge({from}, {to}): DFS tree intact, partial SNCA to preorder {to_pre}");
        self.snca.run(&self.dfs, cfg, to_pre);
        self.compute_idoms_pre(to_pre);
        self.finish_update(cfg.n_blocks());
    }

    /// Removes edge `from -> to` from the already-updated `cfg` and brings
    /// the tree up to date. No-op if `from` is unreachable.
    pub fn delete_edge(&mut self, cfg: &dyn Cfg, from: u32, to: u32) {
        if !self.dfs.is_reachable(from) {
            return;
        }
        let from_pre = self.dfs.to_pre(from);
        let to_pre = self.dfs.to_pre(to);

        if self.dfs.parent_pre(to_pre) == from_pre {
            log::debug!("delete_edge({from}, {to}): removed the DFS-tree parent edge, full rebuild");
            self.rebuild(cfg);
            return;
        }

        if self.on_semidominator_path(from_pre, to_pre) {
            log::debug!("delete_edge({from}, {to}): on semidominator path, partial SNCA to preorder {to_pre}");
            self.snca.run(&self.dfs, cfg, to_pre);
            self.compute_idoms_pre(to_pre);
            self.finish_update(cfg.n_blocks());
            return;
        }

        log::debug!("delete_edge({from}, {to}): tree unaffected");
    }

    /// Walks `cur <- semi(cur)` starting from `from_pre`, while `cur >=
    /// semi(to_pre)`. Returns true iff `cur` ever equals `semi(to_pre)`.
    /// Preorder numbers along semidominator chains decrease monotonically,
    /// so falling below `semi(to_pre)` proves non-membership.
    fn on_semidominator_path(&self, from_pre: DfsNumber, to_pre: DfsNumber) -> bool {
        let target = self.snca.semi(to_pre);
        let mut cur = from_pre;
        while cur >= target {
            if cur == target {
                return true;
            }
            cur = self.snca.semi(cur);
        }
        false
    }

    fn finish_update(&mut self, n_blocks: usize) {
        self.compute_idoms_bb_and_nodes(n_blocks);
    }
}

impl<const POST_DOM: bool> GenericDomTree<POST_DOM> {
    // Shared by the two partial-update paths above; mirrors the tail of
    // `rebuild` without repeating the DFS/full-SNCA steps.
    pub(crate) fn compute_idoms_bb_and_nodes(&mut self, n_blocks: usize) {
        self.compute_idoms_bb(n_blocks);
        self.compute_nodes(n_blocks);
    }
}

// PostDomTree deliberately has no insert_edge/delete_edge: a CFG edit on a
// PostDomTree always means calling `PostDomTree::build` again.
#[allow(dead_code)]
fn _post_dom_incremental_updates_are_out_of_scope(_: &PostDomTree) {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::VecCfg;

    #[test]
    fn insertion_fast_path_keeps_idoms() {
        let mut cfg = VecCfg::from_edges(4, &[(1, 2), (1, 3), (2, 4), (3, 4)]);
        let mut tree = DomTree::build(&cfg).unwrap();
        cfg.add_edge(2, 3);
        tree.insert_edge(&cfg, 2, 3);
        assert_eq!(tree.idom(1), 0);
        assert_eq!(tree.idom(2), 1);
        assert_eq!(tree.idom(3), 1);
        assert_eq!(tree.idom(4), 1);
        assert!(tree.verify(&cfg, crate::tree::VerificationLevel::Full));
    }

    #[test]
    fn deletion_of_dfs_parent_edge_rebuilds() {
        let mut cfg = VecCfg::from_edges(4, &[(1, 2), (1, 3), (2, 4), (3, 4)]);
        let mut tree = DomTree::build(&cfg).unwrap();
        cfg.remove_edge(1, 2);
        tree.delete_edge(&cfg, 1, 2);
        assert_eq!(tree.idom(2), 0);
        assert!(tree.bb_unreachable(2));
        assert!(tree.verify(&cfg, crate::tree::VerificationLevel::Full));
    }

    #[test]
    fn redundant_edge_round_trips_to_the_same_tree() {
        // 2 -> 4 is redundant (1 -> 4 already dominates 4 directly); adding
        // it then removing it again should leave the tree exactly as it was.
        let mut cfg = VecCfg::from_edges(6, &[(1, 2), (2, 3), (1, 4), (4, 5), (5, 6), (6, 3)]);
        let mut tree = DomTree::build(&cfg).unwrap();
        cfg.add_edge(2, 4);
        tree.insert_edge(&cfg, 2, 4);
        let snapshot = tree.idoms_bb_snapshot();
        cfg.remove_edge(2, 4);
        tree.delete_edge(&cfg, 2, 4);
        assert_eq!(tree.idoms_bb_snapshot(), snapshot);
    }
}
