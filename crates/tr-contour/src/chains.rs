use image::{GrayImage, Luma};
use imageproc::region_labelling::connected_components;
use log::debug;
use tr_core::{ImageView, Point2i};

use crate::contour::{Contour, ContourExtractor, ContourKind};

const DX: [isize; 8] = [1, 1, 0, -1, -1, -1, 0, 1];
const DY: [isize; 8] = [0, -1, -1, -1, 0, 1, 1, 1];
const DIRS_C4: [u8; 4] = [0, 2, 4, 6];
const DIRS_C8: [u8; 8] = [0, 1, 2, 3, 4, 5, 6, 7];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connectivity {
    C4,
    C8,
}

/// Junction-aware chain tracer over skeleton pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SkeletonChains {
    pub connectivity: Connectivity,
    /// Components with fewer pixels are ignored.
    pub min_component_size: usize,
}

impl Default for SkeletonChains {
    fn default() -> Self {
        Self {
            connectivity: Connectivity::C8,
            min_component_size: 2,
        }
    }
}

impl ContourExtractor for SkeletonChains {
    fn extract(&self, raster: &ImageView<'_, u8>) -> Vec<Contour> {
        trace_skeleton_chains(raster, self)
    }
}

/// Splits a skeleton into chains between nodes and node-free loops.
///
/// Chains start at nodes in raster order and follow each unused link. A
/// node of degree 0 is emitted as a single-point chain. Loops are emitted
/// last and end on their starting point.
pub fn trace_skeleton_chains(skeleton: &ImageView<'_, u8>, cfg: &SkeletonChains) -> Vec<Contour> {
    let (width, height) = skeleton.dimensions();
    if width == 0 || height == 0 {
        return Vec::new();
    }
    let n = width * height;
    let connectivity = cfg.connectivity;
    let dirs = dirs_for(connectivity);

    let raw = skeleton.map(|&v| u8::from(v != 0)).into_vec();
    let active = build_active_mask(raw, width, height, connectivity, cfg.min_component_size);

    let mut deg = vec![0_u8; n];
    for p in 0..n {
        if active[p] == 0 {
            continue;
        }
        let d = dirs
            .iter()
            .filter(|&&dir| connected_neighbor(p, dir, &active, width, height, connectivity).is_some())
            .count();
        deg[p] = d as u8;
    }

    let is_node: Vec<bool> = (0..n).map(|p| active[p] != 0 && deg[p] != 2).collect();
    let grid = Grid {
        active: &active,
        is_node: &is_node,
        width,
        height,
        connectivity,
    };

    let mut contours = Vec::new();
    let mut used_link = vec![0_u8; n];

    for p in 0..n {
        if !is_node[p] {
            continue;
        }
        if deg[p] == 0 {
            contours.push(Contour::new(vec![point_at(p, width)], ContourKind::Chain));
            continue;
        }

        for &dir in dirs {
            let Some(first) = connected_neighbor(p, dir, &active, width, height, connectivity)
            else {
                continue;
            };
            if is_link_used(&used_link, p, dir) {
                continue;
            }

            let (points, _) = trace_chain(&grid, p, first, dir, &mut used_link);
            contours.push(Contour::new(points, ContourKind::Chain));
        }
    }

    // Components made only of degree-2 pixels have no node to start from.
    for p in 0..n {
        if active[p] == 0 {
            continue;
        }

        for &dir in dirs {
            let Some(next) = connected_neighbor(p, dir, &active, width, height, connectivity)
            else {
                continue;
            };
            if is_link_used(&used_link, p, dir) {
                continue;
            }

            let (points, closed) = trace_chain(&grid, p, next, dir, &mut used_link);
            let kind = if closed {
                ContourKind::Loop
            } else {
                ContourKind::Chain
            };
            contours.push(Contour::new(points, kind));
        }
    }

    debug!(
        "skeleton chains: {} contours from {} active pixels",
        contours.len(),
        active.iter().filter(|&&v| v != 0).count()
    );
    contours
}

struct Grid<'a> {
    active: &'a [u8],
    is_node: &'a [bool],
    width: usize,
    height: usize,
    connectivity: Connectivity,
}

fn trace_chain(
    grid: &Grid<'_>,
    start: usize,
    first: usize,
    start_dir: u8,
    used_link: &mut [u8],
) -> (Vec<Point2i>, bool) {
    let mut points = vec![point_at(start, grid.width)];

    let mut prev = start;
    let mut cur = first;
    let mut dir = start_dir;
    let mut is_closed = false;

    let max_steps = grid.active.len().max(1);
    for _ in 0..max_steps {
        mark_link_both(used_link, prev, dir, cur);
        points.push(point_at(cur, grid.width));

        if cur == start {
            is_closed = true;
            break;
        }
        if grid.is_node[cur] {
            break;
        }

        let Some((next_dir, next)) = find_next_neighbor(grid, cur, prev, used_link) else {
            break;
        };

        if next == start {
            mark_link_both(used_link, cur, next_dir, start);
            points.push(point_at(start, grid.width));
            is_closed = true;
            break;
        }

        prev = cur;
        cur = next;
        dir = next_dir;
    }

    (points, is_closed)
}

fn find_next_neighbor(
    grid: &Grid<'_>,
    cur: usize,
    prev: usize,
    used_link: &[u8],
) -> Option<(u8, usize)> {
    let mut fallback = None;
    for &dir in dirs_for(grid.connectivity) {
        let Some(nb) = connected_neighbor(
            cur,
            dir,
            grid.active,
            grid.width,
            grid.height,
            grid.connectivity,
        ) else {
            continue;
        };
        if nb == prev {
            continue;
        }

        if !is_link_used(used_link, cur, dir) {
            return Some((dir, nb));
        }

        if fallback.is_none() {
            fallback = Some((dir, nb));
        }
    }

    fallback
}

/// Clears pixels of components smaller than `min_component_size`. Pixels
/// are `0`/`1` on input and output.
fn build_active_mask(
    raw: Vec<u8>,
    width: usize,
    height: usize,
    connectivity: Connectivity,
    min_component_size: usize,
) -> Vec<u8> {
    if min_component_size <= 1 {
        return raw;
    }

    let gray = GrayImage::from_raw(width as u32, height as u32, raw).expect("dense buffer matches dimensions");
    let conn = match connectivity {
        Connectivity::C4 => imageproc::region_labelling::Connectivity::Four,
        Connectivity::C8 => imageproc::region_labelling::Connectivity::Eight,
    };
    let labels = connected_components(&gray, conn, Luma([0u8]));

    let mut sizes = Vec::new();
    for label in labels.pixels().map(|p| p[0] as usize) {
        if label >= sizes.len() {
            sizes.resize(label + 1, 0usize);
        }
        sizes[label] += 1;
    }

    labels
        .pixels()
        .map(|p| {
            let label = p[0] as usize;
            u8::from(label != 0 && sizes[label] >= min_component_size)
        })
        .collect()
}

#[inline]
fn point_at(p: usize, width: usize) -> Point2i {
    Point2i::new((p % width) as i32, (p / width) as i32)
}

#[inline]
fn dirs_for(connectivity: Connectivity) -> &'static [u8] {
    match connectivity {
        Connectivity::C4 => &DIRS_C4,
        Connectivity::C8 => &DIRS_C8,
    }
}

#[inline]
fn opposite_dir(dir: u8) -> u8 {
    (dir + 4) & 7
}

#[inline]
fn is_link_used(used_link: &[u8], p: usize, dir: u8) -> bool {
    (used_link[p] & (1_u8 << dir)) != 0
}

#[inline]
fn mark_link_both(used_link: &mut [u8], a: usize, dir_ab: u8, b: usize) {
    used_link[a] |= 1_u8 << dir_ab;
    used_link[b] |= 1_u8 << opposite_dir(dir_ab);
}

#[inline]
fn neighbor_index(p: usize, dir: u8, width: usize, height: usize) -> Option<usize> {
    let x = (p % width) as isize + DX[dir as usize];
    let y = (p / width) as isize + DY[dir as usize];
    index_if_in_bounds(x, y, width, height)
}

/// Neighbor in direction `dir` if it is set. Under 8-connectivity a diagonal
/// step is refused when either of its axis-aligned corners is set, so
/// staircase skeletons are not counted as junctions.
#[inline]
fn connected_neighbor(
    p: usize,
    dir: u8,
    occupancy: &[u8],
    width: usize,
    height: usize,
    connectivity: Connectivity,
) -> Option<usize> {
    let nb = neighbor_index(p, dir, width, height)?;
    if occupancy[nb] == 0 {
        return None;
    }

    if connectivity == Connectivity::C8 && is_diagonal_dir(dir) {
        let x = (p % width) as isize;
        let y = (p / width) as isize;
        let dx = DX[dir as usize];
        let dy = DY[dir as usize];

        let side_a = index_if_in_bounds(x + dx, y, width, height);
        let side_b = index_if_in_bounds(x, y + dy, width, height);
        if side_a.is_some_and(|i| occupancy[i] != 0) || side_b.is_some_and(|i| occupancy[i] != 0) {
            return None;
        }
    }

    Some(nb)
}

#[inline]
fn is_diagonal_dir(dir: u8) -> bool {
    DX[dir as usize] != 0 && DY[dir as usize] != 0
}

#[inline]
fn index_if_in_bounds(x: isize, y: isize, width: usize, height: usize) -> Option<usize> {
    if x < 0 || y < 0 {
        return None;
    }

    let (xu, yu) = (x as usize, y as usize);
    if xu >= width || yu >= height {
        return None;
    }

    Some(yu * width + xu)
}
