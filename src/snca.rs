//! Semi-NCA semidominator computation with path compression.
//!
//! Implements spec section 4.2: preorder-indexed semidominator/label pairs,
//! an ancestor array initialized from the DFS-tree parent table, and two
//! compression strategies sharing one contract -- "propagate the minimum
//! label along the ancestor chain from `v` up to (not crossing) `last_linked`,
//! then shortcut" -- selected by ancestor-array size rather than per-call
//! chain depth, per spec section 4.2 and section 9's recursion note.

use crate::{
    cfg::Cfg,
    dfs::{DfsNumber, DfsTree},
};

/// Any value strictly greater than any legal preorder number. Never `0`,
/// which is reserved for "unreachable".
const INFINITY: DfsNumber = DfsNumber::MAX;

/// Above this many tracked ancestors, `compress` switches from the
/// recursive strategy to the explicit-worklist one (spec section 9: "the
/// small-ancestor path-compression variant *may* recurse because its depth
/// is bounded by 32").
const RECURSIVE_COMPRESSION_LIMIT: usize = 32;

#[derive(Debug, Clone, Copy)]
struct SncaData {
    semi: DfsNumber,
    label: DfsNumber,
}

/// Preorder-indexed semidominator/label state plus the mutable ancestor
/// array path compression shortcuts.
#[derive(Debug, Clone, Default)]
pub struct Snca {
    state: Vec<SncaData>,
    ancestors: Vec<DfsNumber>,
}

impl Snca {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn semi(&self, pre: DfsNumber) -> DfsNumber {
        self.state[pre as usize].semi
    }
    pub fn label(&self, pre: DfsNumber) -> DfsNumber {
        self.state[pre as usize].label
    }

    /// Runs (or partially re-runs) the semidominator pass. When `max_pre ==
    /// dfs.n_reachable()` this is a full computation; smaller values confine
    /// recomputation to preorder numbers `1..=max_pre` (the DSNCA fast path).
    pub fn run(&mut self, dfs: &DfsTree, cfg: &dyn Cfg, max_pre: DfsNumber) {
        let n = dfs.n_reachable();
        self.init(dfs, n, max_pre);

        let floor = if dfs.is_post_dom() { 1 } else { 2 };
        for w in (floor..=max_pre).rev() {
            let mut semi_w = self.ancestors[w as usize];
            let last_linked = w + 1;
            for &v in semidom_predecessors(dfs, cfg, w) {
                if v == 0 {
                    continue;
                }
                let v_pre = dfs.to_pre(v);
                if v_pre == 0 {
                    continue;
                }
                if v_pre >= last_linked {
                    self.compress(v_pre, last_linked);
                }
                let candidate = self.state[v_pre as usize].label;
                if candidate < semi_w {
                    semi_w = candidate;
                }
            }
            self.state[w as usize] = SncaData { semi: semi_w, label: semi_w };
        }
    }

    fn init(&mut self, dfs: &DfsTree, n: usize, max_pre: DfsNumber) {
        // Deliberately not cleared: entries at preorder numbers `>= max_pre`
        // must retain whatever a prior run computed for them, so the freeze
        // branch below has something real to freeze.
        self.state.resize(n + 1, SncaData { semi: 0, label: 0 });
        self.ancestors.resize(n + 1, 0);

        for w in 1..=n as DfsNumber {
            self.ancestors[w as usize] = dfs.parent_pre(w);
            if w < max_pre {
                self.state[w as usize] = SncaData { semi: INFINITY, label: w };
            } else {
                // Freeze the previously-computed label at its final value.
                // Path compression triggered by nodes processed in this run
                // could otherwise leave a stale label inconsistent with the
                // current processing order.
                let semi = self.state[w as usize].semi;
                self.state[w as usize] = SncaData { semi, label: semi };
            }
        }
    }

    /// Propagates the minimum label along the ancestor chain from `v` up to
    /// (but not crossing) `last_linked`, then shortcuts `ancestors[v]`.
    fn compress(&mut self, v: DfsNumber, last_linked: DfsNumber) {
        if self.ancestors.len() <= RECURSIVE_COMPRESSION_LIMIT {
            self.compress_recursive(v, last_linked);
        } else {
            self.compress_worklist(v, last_linked);
        }
    }

    fn compress_recursive(&mut self, v: DfsNumber, last_linked: DfsNumber) {
        let parent = self.ancestors[v as usize];
        debug_assert!(parent != 0, "preorder numbers are 1-based; ancestor of an unreachable node");
        if self.ancestors[parent as usize] >= last_linked {
            self.compress_recursive(parent, last_linked);
        }
        if self.state[parent as usize].label < self.state[v as usize].label {
            self.state[v as usize].label = self.state[parent as usize].label;
        }
        self.ancestors[v as usize] = self.ancestors[parent as usize];
    }

    fn compress_worklist(&mut self, v: DfsNumber, last_linked: DfsNumber) {
        // Every node whose body the recursive variant would execute, in the
        // order it would recurse into them: `v`, then `ancestors[v]` as long
        // as *its* parent also still needs compressing, and so on.
        let mut chain = smallvec::SmallVec::<[DfsNumber; 32]>::new();
        chain.push(v);
        let mut cur = v;
        while self.ancestors[self.ancestors[cur as usize] as usize] >= last_linked {
            cur = self.ancestors[cur as usize];
            chain.push(cur);
        }
        // Unwind from the deepest ancestor back to `v`, mirroring the order
        // the recursive variant's calls return in.
        while let Some(node) = chain.pop() {
            let parent = self.ancestors[node as usize];
            if self.state[parent as usize].label < self.state[node as usize].label {
                self.state[node as usize].label = self.state[parent as usize].label;
            }
            self.ancestors[node as usize] = self.ancestors[parent as usize];
        }
    }
}

/// Reverse-graph predecessors of `w` used by the semidominator pass: CFG
/// predecessors of `w` for a forward tree, CFG successors of `w` for a
/// post-dominator tree (the reverse graph's predecessors of `w` are exactly
/// the original graph's successors of `w`).
fn semidom_predecessors<'c>(dfs: &DfsTree, cfg: &'c dyn Cfg, w: DfsNumber) -> &'c [u32] {
    let block = dfs.from_pre(w);
    if dfs.is_post_dom() { cfg.succs(block) } else { cfg.preds(block) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::VecCfg;

    #[test]
    fn both_compression_variants_agree() {
        // A chain long enough to force the worklist variant, plus a cross
        // edge that exercises path compression.
        let mut edges = vec![];
        for i in 1..40u32 {
            edges.push((i, i + 1));
        }
        edges.push((1, 40));
        let cfg = VecCfg::from_edges(40, &edges);
        let mut dfs = DfsTree::new();
        dfs.run_forward(&cfg);
        let mut snca = Snca::new();
        let n = dfs.n_reachable() as DfsNumber;
        snca.run(&dfs, &cfg, n);
        // Node 40 has both the long chain and the direct edge from 1 as
        // predecessors; its semidominator must be block 1's preorder.
        let pre_40 = dfs.to_pre(40);
        assert_eq!(snca.semi(pre_40), dfs.to_pre(1));
    }

    #[test]
    fn diamond_semidominator_uses_preorder_not_raw_block_number() {
        // Successors are pushed onto a LIFO scratch stack, so DFS visits
        // 1, then 3 (the second successor, popped first), then 4, then
        // backtracks to 2 -- block numbers and preorder numbers disagree
        // here on purpose, to catch indexing `state`/`ancestors` by a raw
        // block number instead of `dfs.to_pre(block)`.
        let cfg = VecCfg::from_edges(4, &[(1, 2), (1, 3), (2, 4), (3, 4)]);
        let mut dfs = DfsTree::new();
        dfs.run_forward(&cfg);
        let mut snca = Snca::new();
        let n = dfs.n_reachable() as DfsNumber;
        snca.run(&dfs, &cfg, n);
        let pre_4 = dfs.to_pre(4);
        assert_eq!(snca.semi(pre_4), dfs.to_pre(1));
    }
}
