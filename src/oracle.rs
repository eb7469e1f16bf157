//! Naive O(n^2) iterative dataflow dominator computation.
//!
//! Not used by [`crate::tree`] at all, only by tests that cross-check
//! SNCA's output against the textbook fixpoint definition ("`Dom(n) = {n}
//! ∪ (∩ Dom(p) for p a predecessor of n)`, iterated to a fixpoint, no
//! reverse-postorder ordering trick"). Reimplemented from scratch as a
//! brute-force bitset checker, independent of the SNCA code path it
//! verifies.

use crate::cfg::{BBNumber, Cfg, ENTRY_BLOCK, NO_BLOCK};

/// Computes the immediate-dominator table for `cfg` by naive fixpoint
/// iteration, for cross-checking against [`crate::tree::GenericDomTree`].
/// `post_dom` selects the post-dominator relation (over the reverse graph,
/// rooted at every block with no successors) instead of the forward one.
///
/// Returns a block-indexed table (length `cfg.n_blocks() + 1`, index `0`
/// unused) with the same convention as `GenericDomTree::idom`: `0` for a
/// root or an unreachable block.
pub fn naive_idoms(cfg: &dyn Cfg, post_dom: bool) -> Vec<BBNumber> {
    let n = cfg.n_blocks();
    let roots = roots(cfg, post_dom);
    let reachable = reachable_set(cfg, post_dom, &roots);

    // dom[b] is the set of blocks dominating b, represented as a bitmap
    // over 1..=n. Roots dominate only themselves; everything else starts
    // optimistic (dominated by every reachable block) and is only ever
    // narrowed.
    let mut dom: Vec<Vec<bool>> = vec![vec![false; n + 1]; n + 1];
    for block in 1..=n as BBNumber {
        if !reachable[block as usize] {
            continue;
        }
        if roots.contains(&block) {
            dom[block as usize][block as usize] = true;
        } else {
            for other in 1..=n as BBNumber {
                dom[block as usize][other as usize] = reachable[other as usize];
            }
        }
    }

    let mut changed = true;
    while changed {
        changed = false;
        for block in 1..=n as BBNumber {
            if !reachable[block as usize] || roots.contains(&block) {
                continue;
            }
            let mut new_set: Option<Vec<bool>> = None;
            for &pred in dom_predecessors(cfg, post_dom, block) {
                if pred == NO_BLOCK || !reachable[pred as usize] {
                    continue;
                }
                new_set = Some(match new_set {
                    None => dom[pred as usize].clone(),
                    Some(acc) => intersect(&acc, &dom[pred as usize]),
                });
            }
            let mut new_set = new_set.unwrap_or_else(|| vec![false; n + 1]);
            new_set[block as usize] = true;
            if new_set != dom[block as usize] {
                dom[block as usize] = new_set;
                changed = true;
            }
        }
    }

    let mut idoms = vec![NO_BLOCK; n + 1];
    for block in 1..=n as BBNumber {
        if !reachable[block as usize] || roots.contains(&block) {
            continue;
        }
        // The dominator chain of `block` is totally ordered by set
        // inclusion; the immediate dominator is the strict dominator whose
        // own dominator set is the largest (closest to `block`).
        let mut best: Option<(BBNumber, usize)> = None;
        for candidate in 1..=n as BBNumber {
            if candidate == block || !dom[block as usize][candidate as usize] {
                continue;
            }
            let size = dom[candidate as usize].iter().filter(|&&b| b).count();
            if best.map(|(_, best_size)| size > best_size).unwrap_or(true) {
                best = Some((candidate, size));
            }
        }
        idoms[block as usize] = best.map(|(b, _)| b).unwrap_or(NO_BLOCK);
    }
    idoms
}

fn roots(cfg: &dyn Cfg, post_dom: bool) -> Vec<BBNumber> {
    if !post_dom {
        return vec![ENTRY_BLOCK];
    }
    (1..=cfg.n_blocks() as BBNumber)
        .filter(|&b| cfg.succs(b).is_empty())
        .collect()
}

fn reachable_set(cfg: &dyn Cfg, post_dom: bool, roots: &[BBNumber]) -> Vec<bool> {
    let n = cfg.n_blocks();
    let mut seen = vec![false; n + 1];
    let mut stack: Vec<BBNumber> = roots.to_vec();
    for &r in roots {
        seen[r as usize] = true;
    }
    while let Some(block) = stack.pop() {
        for &next in traversal_neighbors(cfg, post_dom, block) {
            if next != NO_BLOCK && !seen[next as usize] {
                seen[next as usize] = true;
                stack.push(next);
            }
        }
    }
    seen
}

/// Direction used to discover reachability: successors for a forward tree,
/// predecessors for a post-dominator tree (matching [`crate::dfs::DfsTree`]).
fn traversal_neighbors(cfg: &dyn Cfg, post_dom: bool, block: BBNumber) -> &[BBNumber] {
    if post_dom { cfg.preds(block) } else { cfg.succs(block) }
}

/// Direction used in the dominance equation itself: predecessors for a
/// forward tree, successors for a post-dominator tree (matching
/// [`crate::snca::Snca`]'s `semidom_predecessors`).
fn dom_predecessors(cfg: &dyn Cfg, post_dom: bool, block: BBNumber) -> &[BBNumber] {
    if post_dom { cfg.succs(block) } else { cfg.preds(block) }
}

fn intersect(a: &[bool], b: &[bool]) -> Vec<bool> {
    a.iter().zip(b).map(|(&x, &y)| x && y).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::VecCfg;

    #[test]
    fn matches_hand_computed_diamond() {
        let cfg = VecCfg::from_edges(4, &[(1, 2), (1, 3), (2, 4), (3, 4)]);
        let idoms = naive_idoms(&cfg, false);
        assert_eq!(idoms, vec![0, 0, 1, 1, 1]);
    }

    #[test]
    fn unreachable_block_has_no_idom() {
        let cfg = VecCfg::from_edges(3, &[(1, 2)]);
        let idoms = naive_idoms(&cfg, false);
        assert_eq!(idoms[3], NO_BLOCK);
    }

    #[test]
    fn agrees_with_snca_on_chain_with_side_branch() {
        let cfg = VecCfg::from_edges(6, &[(1, 2), (2, 3), (1, 4), (4, 5), (5, 6), (6, 3)]);
        let tree = crate::tree::DomTree::build(&cfg).unwrap();
        let oracle = naive_idoms(&cfg, false);
        for block in 1..=6 {
            assert_eq!(tree.idom(block), oracle[block as usize], "block {block}");
        }
    }
}
