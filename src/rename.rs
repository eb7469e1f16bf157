//! `rename_nodes`: rewrites block-indexed state after external block
//! renumbering (block merging, dead-block GC, or any other renumbering a
//! caller performs on its own block storage between tree updates).
//!
//! Follows the `old -> new` index map idiom (`-1` for "removed") common to
//! entity-GC passes, applied here to every block-indexed array in one pass.
//! The tree's preorder-indexed state (the DFS-tree parent chain, SNCA's
//! `semi`/`label`) is untouched: renaming never changes DFS-tree shape, so
//! semidominators and levels survive as-is.

use crate::{
    cfg::{BBNumber, NO_BLOCK},
    tree::{DomTreeNode, GenericDomTree},
};

impl<const POST_DOM: bool> GenericDomTree<POST_DOM> {
    /// Applies `rename_bb[old] = new` (`-1` deletes) to this tree.
    /// `rename_bb` must have length `self.n_blocks() + 1` (index `0`
    /// unused). A deleted block must not still be an immediate dominator or
    /// reachable DFS-tree member of a surviving block; violating that is a
    /// caller bug and only checked with `debug_assert!`.
    ///
    /// Block-indexed arrays are resized to `max(rename_bb)`; preorder-
    /// indexed state is left as-is.
    pub fn rename_nodes(&mut self, rename_bb: &[i64]) {
        let old_n = self.n_blocks();
        debug_assert_eq!(rename_bb.len(), old_n + 1);
        let new_n = rename_bb
            .iter()
            .skip(1)
            .filter(|&&new_b| new_b >= 0)
            .map(|&new_b| new_b as usize)
            .max()
            .unwrap_or(0);

        self.dfs.remap_blocks(rename_bb, new_n);

        let mut new_idoms_bb = vec![NO_BLOCK; new_n + 1];
        let mut new_nodes = vec![DomTreeNode::default(); new_n + 1];

        for old_b in 1..=old_n as BBNumber {
            let new_b = rename_bb[old_b as usize];
            if new_b < 0 {
                continue;
            }
            let new_b = new_b as BBNumber;

            let old_idom = self.idoms_bb[old_b as usize];
            new_idoms_bb[new_b as usize] = if old_idom == NO_BLOCK {
                NO_BLOCK
            } else {
                let mapped = rename_bb[old_idom as usize];
                debug_assert!(
                    mapped >= 0,
                    "rename_nodes deleted a block that is still an immediate dominator"
                );
                mapped as BBNumber
            };
            new_nodes[new_b as usize].level = self.nodes[old_b as usize].level;
        }

        // Children lists are derived from idoms_bb rather than remapped
        // directly, the same way `compute_nodes` builds them from scratch.
        for new_b in 1..=new_n as BBNumber {
            let idom = new_idoms_bb[new_b as usize];
            if idom != NO_BLOCK {
                new_nodes[idom as usize].children.push(new_b);
            }
        }
        for node in &mut new_nodes {
            node.children.sort_unstable();
        }

        self.idoms_bb = new_idoms_bb;
        self.nodes = new_nodes;
    }
}

#[cfg(test)]
mod tests {
    use crate::{testing::VecCfg, tree::DomTree};

    #[test]
    fn rename_is_a_bijection_on_kept_blocks() {
        let cfg = VecCfg::from_edges(4, &[(1, 2), (1, 3), (2, 4), (3, 4)]);
        let mut tree = DomTree::build(&cfg).unwrap();
        // Swap blocks 2 and 3, keep 1 and 4 fixed.
        let rename_bb = vec![-1, 1, 3, 2, 4];
        tree.rename_nodes(&rename_bb);
        assert_eq!(tree.idom(1), 0);
        assert_eq!(tree.idom(2), 1); // was block 3
        assert_eq!(tree.idom(3), 1); // was block 2
        assert_eq!(tree.idom(4), 1);
        assert_eq!(tree.level(2), 2);
        assert_eq!(tree.level(3), 2);
    }

    #[test]
    fn rename_can_delete_an_unreachable_block() {
        let cfg = VecCfg::from_edges(3, &[(1, 2)]);
        let mut tree = DomTree::build(&cfg).unwrap();
        assert!(tree.bb_unreachable(3));
        let rename_bb = vec![-1, 1, 2, -1];
        tree.rename_nodes(&rename_bb);
        assert_eq!(tree.n_blocks(), 2);
        assert_eq!(tree.idom(2), 1);
    }
}
