//! A minimal [`Cfg`] fixture for this crate's own tests and for downstream
//! consumers' tests: an edge list turned into adjacency vectors up front.

use crate::cfg::{BBNumber, Cfg};

/// A `Vec<Vec<BBNumber>>`-backed CFG, built from an edge list. Blocks are
/// numbered `1..=n_blocks`; `add_edge`/`remove_edge` support writing tests
/// for the incremental update paths in [`crate::dynamic`].
#[derive(Debug, Clone)]
pub struct VecCfg {
    preds: Vec<Vec<BBNumber>>,
    succs: Vec<Vec<BBNumber>>,
}

impl VecCfg {
    /// Builds a CFG with `n_blocks` blocks (numbered `1..=n_blocks`) and the
    /// given `(from, to)` edges.
    pub fn from_edges(n_blocks: usize, edges: &[(BBNumber, BBNumber)]) -> Self {
        let mut cfg = Self {
            preds: vec![Vec::new(); n_blocks + 1],
            succs: vec![Vec::new(); n_blocks + 1],
        };
        for &(from, to) in edges {
            cfg.add_edge(from, to);
        }
        cfg
    }

    /// Adds edge `from -> to`. Panics if either endpoint is out of range.
    pub fn add_edge(&mut self, from: BBNumber, to: BBNumber) {
        self.succs[from as usize].push(to);
        self.preds[to as usize].push(from);
    }

    /// Removes one instance of edge `from -> to`. Panics if the edge is not
    /// present.
    pub fn remove_edge(&mut self, from: BBNumber, to: BBNumber) {
        let succ_pos = self.succs[from as usize]
            .iter()
            .position(|&b| b == to)
            .expect("remove_edge: no such successor");
        self.succs[from as usize].remove(succ_pos);
        let pred_pos = self.preds[to as usize]
            .iter()
            .position(|&b| b == from)
            .expect("remove_edge: no such predecessor");
        self.preds[to as usize].remove(pred_pos);
    }
}

impl Cfg for VecCfg {
    fn n_blocks(&self) -> usize {
        self.preds.len() - 1
    }

    fn preds(&self, block: BBNumber) -> &[BBNumber] {
        &self.preds[block as usize]
    }

    fn succs(&self, block: BBNumber) -> &[BBNumber] {
        &self.succs[block as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_and_remove_edge_round_trip() {
        let mut cfg = VecCfg::from_edges(2, &[(1, 2)]);
        assert_eq!(cfg.succs(1), &[2]);
        cfg.add_edge(1, 2);
        assert_eq!(cfg.succs(1), &[2, 2]);
        cfg.remove_edge(1, 2);
        assert_eq!(cfg.succs(1), &[2]);
    }
}
