//! Max-tree construction by hierarchical flooding
//!
//! One FIFO queue per grey level. Flooding a level pops its pixels into the
//! node currently open at that level; a neighbor at a higher level is queued
//! there and that level is flooded to completion before the current pixel's
//! remaining neighbors are examined. When a level's queue runs dry its open
//! node closes, and its parent is the open node at the nearest lower level.
//!
//! The nesting is driven by an explicit stack of level frames, so stack use
//! does not depend on the image or on the number of grey levels.

use super::{LevelRange, MaxTree, NodeId, TreeNode};
use crate::error::{MorphError, MorphResult};
use cellseg_core::{Connectivity, Pix};
use std::collections::VecDeque;

const NOT_ANALYZED: u32 = u32::MAX;
const IN_QUEUE: u32 = u32::MAX - 1;

/// A level being flooded, with the pixel whose neighbors are being examined
#[derive(Debug, Clone, Copy)]
struct Frame {
    slot: usize,
    current: Option<(usize, usize)>,
}

impl Frame {
    fn new(slot: usize) -> Self {
        Self {
            slot,
            current: None,
        }
    }
}

struct Builder {
    slots: Vec<usize>,
    width: u32,
    height: u32,
    connectivity: Connectivity,
    min: u32,
    status: Vec<u32>,
    queues: Vec<VecDeque<usize>>,
    open: Vec<bool>,
    counts: Vec<u32>,
    pending: Vec<Vec<usize>>,
    nodes: Vec<Vec<TreeNode>>,
}

impl Builder {
    fn enqueue(&mut self, q: usize) {
        let slot = self.slots[q];
        self.queues[slot].push_back(q);
        self.status[q] = IN_QUEUE;
        self.open[slot] = true;
    }

    /// Close the open node at `slot` and return the slot of its parent.
    fn close(&mut self, slot: usize) -> Option<usize> {
        let index = self.counts[slot];
        self.counts[slot] += 1;
        self.open[slot] = false;

        let parent_slot = (0..slot).rev().find(|&m| self.open[m]);
        let parent = parent_slot.map(|m| NodeId {
            level: m as u32 + self.min,
            index: self.counts[m],
        });
        let id = NodeId {
            level: slot as u32 + self.min,
            index,
        };
        let pixels = std::mem::take(&mut self.pending[slot]);
        log::trace!(
            "maxtree: closed node {:?} ({} own pixels), parent {:?}",
            id,
            pixels.len(),
            parent
        );
        self.nodes[slot].push(TreeNode::new(id, parent, pixels));
        parent_slot
    }

    fn flood(&mut self, start: usize) {
        self.enqueue(start);
        let mut stack = vec![Frame::new(self.slots[start])];
        // Parent slot reported by the frame that just finished
        let mut finished: Option<Option<usize>> = None;

        while let Some(&frame) = stack.last() {
            let slot = frame.slot;

            if let Some(Some(m)) = finished.take().filter(|p| p.is_some_and(|m| m > slot)) {
                // The closed node hangs below a level between this one and
                // the child: flood that level before resuming
                stack.push(Frame::new(m));
                continue;
            }

            if let Some((p, next)) = frame.current {
                let mut descend = None;
                for (k, q) in self
                    .connectivity
                    .neighbor_indices(p, self.width, self.height)
                    .enumerate()
                    .skip(next)
                {
                    if self.status[q] != NOT_ANALYZED {
                        continue;
                    }
                    self.enqueue(q);
                    if self.slots[q] > slot {
                        descend = Some((self.slots[q], k + 1));
                        break;
                    }
                }
                if let Some(top) = stack.last_mut() {
                    top.current = descend.map(|(_, resume)| (p, resume));
                }
                if let Some((m, _)) = descend {
                    stack.push(Frame::new(m));
                }
                continue;
            }

            if let Some(p) = self.queues[slot].pop_front() {
                self.status[p] = self.counts[slot];
                self.pending[slot].push(p);
                if let Some(top) = stack.last_mut() {
                    top.current = Some((p, 0));
                }
                continue;
            }

            let parent = self.close(slot);
            stack.pop();
            finished = Some(parent);
        }
    }
}

impl MaxTree {
    /// Build the max-tree of a grey raster.
    ///
    /// Flooding starts from the first pixel, in raster order, of the lowest
    /// populated level. Node indices within a level follow the order in
    /// which nodes close. A uniform raster yields a single root owning every
    /// pixel.
    ///
    /// # Arguments
    ///
    /// * `pix` - 8 or 16 bpp grey raster
    /// * `connectivity` - Adjacency used for flooding and for every later
    ///   geodesic measurement on this tree
    ///
    /// # Errors
    ///
    /// Returns [`MorphError::UnsupportedDepth`] for any other depth.
    pub fn build(pix: &Pix, connectivity: Connectivity) -> MorphResult<MaxTree> {
        let depth = pix.depth();
        if !depth.is_gray() {
            return Err(MorphError::UnsupportedDepth {
                expected: "8 or 16 bpp grey",
                actual: depth.bits(),
            });
        }
        let (width, height) = (pix.width(), pix.height());
        let values = pix.values();
        let range = LevelRange::from_values(&values, depth);
        let min = range.min();
        let levels = range.level_count();

        let mut builder = Builder {
            slots: values.iter().map(|&v| (v - min) as usize).collect(),
            width,
            height,
            connectivity,
            min,
            status: vec![NOT_ANALYZED; values.len()],
            queues: vec![VecDeque::new(); levels],
            open: vec![false; levels],
            counts: vec![0; levels],
            pending: vec![Vec::new(); levels],
            nodes: vec![Vec::new(); levels],
        };
        if let Some(start) = values.iter().position(|&v| v == min) {
            builder.flood(start);
        }
        debug_assert!(builder.status.iter().all(|&s| s < IN_QUEUE));

        let mut nodes = builder.nodes;
        link_children(&mut nodes, min);
        accumulate_areas(&mut nodes, min);

        let tree = MaxTree {
            width,
            height,
            depth,
            connectivity,
            range,
            nodes,
            values,
            labels: builder.status,
        };
        log::debug!(
            "MaxTree::build: {}x{}, {:?}, levels {}..={}, {} nodes",
            width,
            height,
            connectivity,
            tree.range.min(),
            tree.range.max(),
            tree.node_count()
        );
        Ok(tree)
    }
}

fn link_children(nodes: &mut [Vec<TreeNode>], min: u32) {
    let links: Vec<(NodeId, NodeId)> = nodes
        .iter()
        .flatten()
        .filter_map(|n| n.parent.map(|p| (p, n.id)))
        .collect();
    for (parent, child) in links {
        let slot = (parent.level - min) as usize;
        nodes[slot][parent.index as usize].children.push(child);
    }
}

/// Children always sit at higher levels, so one sweep from the top level
/// down sees every child before its parent.
fn accumulate_areas(nodes: &mut [Vec<TreeNode>], min: u32) {
    for slot in (0..nodes.len()).rev() {
        for index in 0..nodes[slot].len() {
            let child_area: u64 = nodes[slot][index]
                .children
                .iter()
                .map(|c| nodes[(c.level - min) as usize][c.index as usize].area)
                .sum();
            let node = &mut nodes[slot][index];
            node.area = node.pixels.len() as u64 + child_area;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cellseg_core::PixelDepth;

    fn pix(width: u32, height: u32, values: &[u32]) -> Pix {
        Pix::from_values(width, height, PixelDepth::Bit8, values).unwrap()
    }

    #[test]
    fn test_uniform_single_root() {
        let tree = MaxTree::build(&pix(4, 3, &[7; 12]), Connectivity::EightWay).unwrap();
        assert_eq!(tree.node_count(), 1);
        let root = tree.roots()[0];
        assert_eq!(root, NodeId { level: 7, index: 0 });
        assert_eq!(tree.area(root).unwrap(), 12);
        assert!(tree.children(root).unwrap().is_empty());
        assert_eq!(tree.leaves(), vec![root]);
    }

    #[test]
    fn test_two_peaks_on_background() {
        #[rustfmt::skip]
        let values = [
            1, 1, 1, 1, 1,
            1, 5, 1, 9, 1,
            1, 1, 1, 9, 1,
        ];
        let tree = MaxTree::build(&pix(5, 3, &values), Connectivity::FourWay).unwrap();
        assert_eq!(tree.node_count(), 3);
        let root = tree.roots()[0];
        assert_eq!(root.level, 1);
        assert_eq!(tree.area(root).unwrap(), 15);
        assert_eq!(tree.children(root).unwrap().len(), 2);

        let peak = tree.node_of(3, 1).unwrap();
        assert_eq!(peak, tree.node_of(3, 2).unwrap());
        assert_eq!(tree.area(peak).unwrap(), 2);
        assert_eq!(tree.parent(peak).unwrap(), Some(root));
        assert_eq!(tree.area(tree.node_of(1, 1).unwrap()).unwrap(), 1);
    }

    #[test]
    fn test_nested_levels_chain() {
        // 2 inside 4 inside 6, a single chain
        #[rustfmt::skip]
        let values = [
            2, 2, 2, 2, 2,
            2, 4, 4, 4, 2,
            2, 4, 6, 4, 2,
            2, 4, 4, 4, 2,
            2, 2, 2, 2, 2,
        ];
        let tree = MaxTree::build(&pix(5, 5, &values), Connectivity::EightWay).unwrap();
        let top = tree.node_of(2, 2).unwrap();
        let mid = tree.parent(top).unwrap().unwrap();
        let base = tree.parent(mid).unwrap().unwrap();
        assert_eq!((top.level, mid.level, base.level), (6, 4, 2));
        assert_eq!(tree.area(mid).unwrap(), 9);
        assert_eq!(tree.area(base).unwrap(), 25);
        assert_eq!(tree.parent(base).unwrap(), None);
    }

    #[test]
    fn test_gap_levels_link_to_nearest_open() {
        // No pixel at levels 2..=7: the peak hangs directly off the base
        let tree = MaxTree::build(&pix(3, 1, &[1, 8, 1]), Connectivity::FourWay).unwrap();
        let peak = tree.node_of(1, 0).unwrap();
        assert_eq!(tree.parent(peak).unwrap(), tree.node_of(0, 0));
        assert_eq!(tree.level_range().level_count(), 8);
        assert_eq!(tree.level_range().count(1), 2);
    }

    #[test]
    fn test_connectivity_splits_diagonal() {
        #[rustfmt::skip]
        let values = [
            9, 0,
            0, 9,
        ];
        let four = MaxTree::build(&pix(2, 2, &values), Connectivity::FourWay).unwrap();
        let eight = MaxTree::build(&pix(2, 2, &values), Connectivity::EightWay).unwrap();
        assert_ne!(four.node_of(0, 0), four.node_of(1, 1));
        assert_eq!(eight.node_of(0, 0), eight.node_of(1, 1));
        assert_eq!(four.node_count(), 3);
        assert_eq!(eight.node_count(), 2);
    }

    #[test]
    fn test_rejects_binary() {
        let binary = Pix::new(4, 4, PixelDepth::Bit1).unwrap();
        assert!(matches!(
            MaxTree::build(&binary, Connectivity::EightWay),
            Err(MorphError::UnsupportedDepth { .. })
        ));
    }

    #[test]
    fn test_unknown_node() {
        let tree = MaxTree::build(&pix(2, 1, &[3, 4]), Connectivity::FourWay).unwrap();
        assert!(tree.node(NodeId { level: 2, index: 0 }).is_err());
        assert!(tree.node(NodeId { level: 4, index: 1 }).is_err());
        assert!(tree.node(NodeId { level: 4, index: 0 }).is_ok());
    }
}
