//! Raster-to-polygon conversion.
//!
//! Cells are grouped into maximal 4-connected components of equal value, and
//! each component is traced along cell edges into one polygon. Diagonal
//! neighbours are never joined, so two same-valued cells touching only at a
//! corner become two shapes.

use ahash::AHashMap;
use geo::{orient::{Direction, Orient}, Coord, LineString, Polygon};
use ndarray::{Array2, ArrayView2};
use smallvec::SmallVec;

use crate::affine::Affine;

/// One connected region of equal-valued cells.
#[derive(Debug, Clone)]
pub struct Shape<T> {
    pub value: T,
    /// Outline in world coordinates; exterior counter-clockwise, holes clockwise.
    pub polygon: Polygon<f64>,
    /// Number of cells in the region.
    pub cells: usize,
}

/// Vertex on the cell-corner lattice, `(col, row)`.
type Vertex = (i64, i64);

/// Directed cell edge, traversed with its cell on the right (y grows downward).
#[derive(Debug, Clone, Copy)]
struct Edge {
    from: Vertex,
    to: Vertex,
}

impl Edge {
    #[inline]
    fn dir(&self) -> (i64, i64) { (self.to.0 - self.from.0, self.to.1 - self.from.1) }
}

const UNLABELLED: u32 = u32::MAX;

/// Vectorize every labelled cell of `labels` into polygons.
///
/// `None` cells are background and never emitted. Shapes are returned in the
/// row-major order of their first cell, so output is deterministic.
pub fn polygonize<T: Copy + Eq>(labels: ArrayView2<'_, Option<T>>, transform: &Affine) -> Vec<Shape<T>> {
    let (components, seeds) = label_components(labels);
    let mut edges: Vec<Vec<Edge>> = vec![Vec::new(); seeds.len()];

    let (rows, cols) = labels.dim();
    let id_at = |r: i64, c: i64| -> u32 {
        if r < 0 || c < 0 || r >= rows as i64 || c >= cols as i64 { UNLABELLED }
        else { components[(r as usize, c as usize)] }
    };

    for ((r, c), &id) in components.indexed_iter() {
        if id == UNLABELLED { continue }
        let (r, c) = (r as i64, c as i64);
        let list = &mut edges[id as usize];
        if id_at(r - 1, c) != id { list.push(Edge { from: (c, r), to: (c + 1, r) }) }
        if id_at(r, c + 1) != id { list.push(Edge { from: (c + 1, r), to: (c + 1, r + 1) }) }
        if id_at(r + 1, c) != id { list.push(Edge { from: (c + 1, r + 1), to: (c, r + 1) }) }
        if id_at(r, c - 1) != id { list.push(Edge { from: (c, r + 1), to: (c, r) }) }
    }

    seeds.into_iter()
        .zip(edges)
        .map(|((value, cells), edges)| Shape {
            value,
            polygon: assemble(trace_rings(&edges), transform),
            cells,
        })
        .collect()
}

/// Flood-fill 4-connected components. Returns the component id grid and, per
/// component, its value and cell count.
fn label_components<T: Copy + Eq>(labels: ArrayView2<'_, Option<T>>) -> (Array2<u32>, Vec<(T, usize)>) {
    let (rows, cols) = labels.dim();
    let mut ids = Array2::from_elem((rows, cols), UNLABELLED);
    let mut seeds = Vec::new();
    let mut stack = Vec::new();

    for r in 0..rows {
        for c in 0..cols {
            let Some(value) = labels[(r, c)] else { continue };
            if ids[(r, c)] != UNLABELLED { continue }

            let id = seeds.len() as u32;
            let mut count = 0;
            ids[(r, c)] = id;
            stack.push((r, c));

            while let Some((r, c)) = stack.pop() {
                count += 1;
                let neighbours = [
                    (r.wrapping_sub(1), c),
                    (r + 1, c),
                    (r, c.wrapping_sub(1)),
                    (r, c + 1),
                ];
                for (nr, nc) in neighbours {
                    if nr >= rows || nc >= cols { continue }
                    if ids[(nr, nc)] == UNLABELLED && labels[(nr, nc)] == Some(value) {
                        ids[(nr, nc)] = id;
                        stack.push((nr, nc));
                    }
                }
            }
            seeds.push((value, count));
        }
    }

    (ids, seeds)
}

/// Chain boundary edges into closed rings of lattice vertices.
///
/// Where two edges leave the same vertex (two cells of the component meet
/// only at that corner) the trace turns left, which keeps every ring simple:
/// an enclosed hole pinched against the outline becomes its own ring touching
/// the exterior at one point.
fn trace_rings(edges: &[Edge]) -> Vec<Vec<Vertex>> {
    let mut outgoing: AHashMap<Vertex, SmallVec<[usize; 2]>> = AHashMap::with_capacity(edges.len());
    for (i, edge) in edges.iter().enumerate() {
        outgoing.entry(edge.from).or_default().push(i);
    }

    let next_edge = |current: usize| -> usize {
        let (dx, dy) = edges[current].dir();
        let candidates = &outgoing[&edges[current].to];
        if candidates.len() == 1 { return candidates[0] }
        let left = (dy, -dx);
        candidates.iter()
            .copied()
            .find(|&j| edges[j].dir() == left)
            .unwrap_or(candidates[0])
    };

    let mut used = vec![false; edges.len()];
    let mut rings = Vec::new();

    for start in 0..edges.len() {
        if used[start] { continue }
        let mut ring = vec![edges[start].from];
        let mut current = start;
        loop {
            used[current] = true;
            let next = next_edge(current);
            if next == start { break }
            ring.push(edges[current].to);
            current = next;
        }
        rings.push(simplify(ring));
    }

    rings
}

/// Drop vertices that sit in the middle of a straight run.
fn simplify(ring: Vec<Vertex>) -> Vec<Vertex> {
    let n = ring.len();
    (0..n)
        .filter(|&i| {
            let prev = ring[(i + n - 1) % n];
            let (cur, next) = (ring[i], ring[(i + 1) % n]);
            let d1 = ((cur.0 - prev.0).signum(), (cur.1 - prev.1).signum());
            let d2 = ((next.0 - cur.0).signum(), (next.1 - cur.1).signum());
            d1 != d2
        })
        .map(|i| ring[i])
        .collect()
}

/// Twice the signed area of an open ring (positive for outlines in y-down space).
fn signed_area2(ring: &[Vertex]) -> i64 {
    let n = ring.len();
    (0..n).map(|i| {
        let (a, b) = (ring[i], ring[(i + 1) % n]);
        a.0 * b.1 - b.0 * a.1
    }).sum()
}

/// Split rings into the outline and its holes and map them to world space.
fn assemble(mut rings: Vec<Vec<Vertex>>, transform: &Affine) -> Polygon<f64> {
    let outline = rings.iter()
        .enumerate()
        .max_by_key(|(_, ring)| signed_area2(ring))
        .map(|(i, _)| i)
        .unwrap_or(0);
    let exterior = rings.swap_remove(outline);

    let to_world = |ring: &[Vertex]| -> LineString<f64> {
        ring.iter()
            .map(|&(x, y)| transform.apply(x as f64, y as f64))
            .collect::<Vec<Coord<f64>>>()
            .into()
    };

    let holes = rings.iter().map(|ring| to_world(ring)).collect();
    Polygon::new(to_world(&exterior), holes).orient(Direction::Default)
}
