//! Geodesic length, width and circularity of tree nodes
//!
//! Measured over a node's full pixel set in four passes:
//!
//! 1. Border pixels (a neighbor off the component or off the image) and
//!    their centroid
//! 2. The border pixel farthest from that centroid, `start`
//! 3. A breadth-first front from `start` through the component; the number
//!    of layers is the geodesic length and the first pixel of the last layer
//!    is `end`
//! 4. Optionally, every `interval` steps along the front's path from `start`
//!    to `end`, the span of the component perpendicular to the direction
//!    `start -> sample`

use super::{MaxTree, NodeId};
use crate::error::MorphResult;
use cellseg_core::{Box, Connectivity, is_outside};
use std::collections::VecDeque;
use std::f64::consts::PI;

/// Geodesic attributes of a node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeodesicInfo {
    /// Breadth-first layers from `start` to the farthest pixel
    pub length: u32,
    /// Number of border pixels
    pub perimeter: u64,
    /// Border pixel farthest from the border centroid
    pub start: (u32, u32),
    /// Farthest pixel from `start` inside the component
    pub end: (u32, u32),
    /// Width sampling interval, 0 when widths were not sampled
    pub interval: u32,
    /// Mean sampled width
    pub mean_width: Option<f64>,
    /// Population variance of the sampled widths
    pub width_variance: Option<f64>,
    /// Largest sampled width
    pub max_width: Option<u32>,
}

/// Membership mask of a pixel set, local to its bounding box
struct Shape {
    bounds: Box,
    inside: Vec<bool>,
}

impl Shape {
    fn new(pixels: &[usize], bounds: Box, width: u32) -> Self {
        let mut inside = vec![false; bounds.area().max(0) as usize];
        for &p in pixels {
            let x = (p % width as usize) as i32;
            let y = (p / width as usize) as i32;
            inside[((y - bounds.y) * bounds.w + (x - bounds.x)) as usize] = true;
        }
        Self { bounds, inside }
    }

    #[inline]
    fn local(&self, x: i32, y: i32) -> Option<usize> {
        self.bounds
            .contains_point(x, y)
            .then(|| ((y - self.bounds.y) * self.bounds.w + (x - self.bounds.x)) as usize)
    }

    #[inline]
    fn contains(&self, x: i32, y: i32) -> bool {
        self.local(x, y).is_some_and(|i| self.inside[i])
    }

    fn coords(&self, local: usize) -> (i32, i32) {
        let w = self.bounds.w as usize;
        (
            self.bounds.x + (local % w) as i32,
            self.bounds.y + (local / w) as i32,
        )
    }
}

fn measure(
    shape: &Shape,
    connectivity: Connectivity,
    width: u32,
    height: u32,
    interval: u32,
) -> GeodesicInfo {
    let members: Vec<usize> = (0..shape.inside.len())
        .filter(|&i| shape.inside[i])
        .collect();

    // Border and its centroid
    let border: Vec<(i32, i32)> = members
        .iter()
        .map(|&i| shape.coords(i))
        .filter(|&(x, y)| {
            connectivity.offsets(y).iter().any(|&(dx, dy)| {
                let (nx, ny) = (x + dx, y + dy);
                is_outside(nx, ny, width, height) || !shape.contains(nx, ny)
            })
        })
        .collect();
    let n = border.len().max(1) as f64;
    let cx = border.iter().map(|&(x, _)| x as f64).sum::<f64>() / n;
    let cy = border.iter().map(|&(_, y)| y as f64).sum::<f64>() / n;

    let mut start = border
        .first()
        .copied()
        .unwrap_or((shape.bounds.x, shape.bounds.y));
    let mut best = -1.0;
    for &(x, y) in &border {
        let d = (x as f64 - cx).powi(2) + (y as f64 - cy).powi(2);
        if d > best {
            best = d;
            start = (x, y);
        }
    }

    // Breadth-first front from `start`
    let mut dist = vec![u32::MAX; shape.inside.len()];
    let mut pred = vec![usize::MAX; shape.inside.len()];
    let mut queue = VecDeque::new();
    let origin = shape.local(start.0, start.1).unwrap_or(0);
    dist[origin] = 0;
    queue.push_back(origin);
    let mut end = origin;
    while let Some(i) = queue.pop_front() {
        if dist[i] > dist[end] {
            end = i;
        }
        let (x, y) = shape.coords(i);
        for &(dx, dy) in connectivity.offsets(y) {
            let Some(j) = shape.local(x + dx, y + dy) else {
                continue;
            };
            if shape.inside[j] && dist[j] == u32::MAX {
                dist[j] = dist[i] + 1;
                pred[j] = i;
                queue.push_back(j);
            }
        }
    }
    let length = dist[end];

    // Widths across the path
    let mut widths = Vec::new();
    if interval > 0 && length > 0 {
        let mut path = vec![end];
        while let Some(&last) = path.last() {
            if pred[last] == usize::MAX {
                break;
            }
            path.push(pred[last]);
        }
        path.reverse();
        for &sample in path.iter().skip(interval as usize).step_by(interval as usize) {
            let (sx, sy) = shape.coords(sample);
            let (dx, dy) = ((sx - start.0) as f64, (sy - start.1) as f64);
            let norm = dx.hypot(dy);
            if norm == 0.0 {
                continue;
            }
            let (ux, uy) = (-dy / norm, dx / norm);
            let mut span = 1u32;
            for sign in [1.0, -1.0] {
                let mut last = (sx, sy);
                let mut t = 1.0;
                loop {
                    let px = (sx as f64 + sign * t * ux).round() as i32;
                    let py = (sy as f64 + sign * t * uy).round() as i32;
                    t += 1.0;
                    if (px, py) == last {
                        continue;
                    }
                    if !shape.contains(px, py) {
                        break;
                    }
                    last = (px, py);
                    span += 1;
                }
            }
            widths.push(span);
        }
    }

    let (mean_width, width_variance, max_width) = if widths.is_empty() {
        (None, None, None)
    } else {
        let count = widths.len() as f64;
        let mean = widths.iter().map(|&w| w as f64).sum::<f64>() / count;
        let variance = widths
            .iter()
            .map(|&w| (w as f64 - mean).powi(2))
            .sum::<f64>()
            / count;
        (Some(mean), Some(variance), widths.iter().copied().max())
    };

    let (ex, ey) = shape.coords(end);
    GeodesicInfo {
        length,
        perimeter: border.len() as u64,
        start: (start.0 as u32, start.1 as u32),
        end: (ex as u32, ey as u32),
        interval,
        mean_width,
        width_variance,
        max_width,
    }
}

impl MaxTree {
    /// Geodesic attributes of `id`.
    ///
    /// Computed on the first call and cached on the node; a later call with
    /// a different `interval` measures again and replaces the cache.
    ///
    /// # Arguments
    ///
    /// * `id` - Node to measure
    /// * `interval` - Path steps between width samples; 0 skips widths
    ///
    /// # Errors
    ///
    /// Returns [`MorphError::UnknownNode`](crate::MorphError::UnknownNode)
    /// if `id` is not in this tree.
    pub fn geodesic_length(&mut self, id: NodeId, interval: u32) -> MorphResult<GeodesicInfo> {
        if let Some(info) = self.node(id)?.geodesic.filter(|g| g.interval == interval) {
            return Ok(info);
        }
        let bounds = self.basic_info(id)?.bounds;
        let mut pixels = Vec::new();
        self.gather(id, &mut pixels)?;
        let shape = Shape::new(&pixels, bounds, self.width);
        let info = measure(&shape, self.connectivity, self.width, self.height, interval);
        log::trace!(
            "geodesic_length {:?}: length {}, perimeter {}",
            id,
            info.length,
            info.perimeter
        );
        self.node_mut(id)?.geodesic = Some(info);
        Ok(info)
    }

    /// Circularity `pi * length^2 / (4 * area)` of `id`.
    ///
    /// Close to 1 for a disc, larger for elongated shapes and 0 for a single
    /// pixel. `None` when the node has no area.
    pub fn circularity(&mut self, id: NodeId, interval: u32) -> MorphResult<Option<f64>> {
        let area = self.area(id)?;
        if area == 0 {
            return Ok(None);
        }
        let length = self.geodesic_length(id, interval)?.length as f64;
        Ok(Some(PI * length * length / (4.0 * area as f64)))
    }
}
