use std::f32::consts::FRAC_PI_2;

use anyhow::{anyhow, Result};
use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::font::GlyphOutline;
use crate::mesh::MeshData;

/// Parameters for turning a glyph outline into a solid mesh.
///
/// Defaults match the demo text geometry: depth 0.4, twelve curve
/// segments, a five-segment bevel flaring 0.03 units with zero thickness.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExtrudeOptions {
    pub depth: f32,
    pub curve_segments: u32,
    pub bevel_enabled: bool,
    pub bevel_thickness: f32,
    pub bevel_size: f32,
    pub bevel_segments: u32,
}

impl Default for ExtrudeOptions {
    fn default() -> Self {
        Self {
            depth: 0.4,
            curve_segments: 12,
            bevel_enabled: true,
            bevel_thickness: 0.0,
            bevel_size: 0.03,
            bevel_segments: 5,
        }
    }
}

/// Extrudes a flattened glyph outline into an indexed triangle mesh.
///
/// Front and back caps are triangulated with holes preserved; side walls
/// run between offset rings. Cap vertices are not shared with wall
/// vertices, so caps keep exact flat normals after
/// [`MeshData::compute_normals`].
pub fn extrude(outline: &GlyphOutline, options: &ExtrudeOptions) -> Result<MeshData> {
    if outline.is_empty() {
        return Err(anyhow!("glyph outline has no contours"));
    }

    let regions = classify_contours(&outline.contours)?;
    let rings = ring_profile(options);
    let (front_z, back_z) = match (rings.first(), rings.last()) {
        (Some(front), Some(back)) => (front.1, back.1),
        _ => return Err(anyhow!("extrusion produced no rings")),
    };

    let mut mesh = MeshData::default();

    for region in &regions {
        // Caps, front facing +z and back facing -z.
        let triangles = triangulate_region(region)?;
        for [a, b, c] in &triangles {
            let ia = mesh.push_vertex(a.extend(front_z));
            let ib = mesh.push_vertex(b.extend(front_z));
            let ic = mesh.push_vertex(c.extend(front_z));
            mesh.push_triangle(ia, ib, ic);
        }
        for [a, b, c] in &triangles {
            let ia = mesh.push_vertex(a.extend(back_z));
            let ib = mesh.push_vertex(b.extend(back_z));
            let ic = mesh.push_vertex(c.extend(back_z));
            mesh.push_triangle(ia, ic, ib);
        }

        // Walls for the outer contour and every hole.
        for contour in std::iter::once(&region.outer).chain(region.holes.iter()) {
            add_walls(&mut mesh, contour, &rings);
        }
    }

    mesh.compute_normals();
    Ok(mesh)
}

/// (outward offset, z) pairs describing the extrusion profile from the
/// front cap plane down to the back cap plane.
fn ring_profile(options: &ExtrudeOptions) -> Vec<(f32, f32)> {
    if !options.bevel_enabled || options.bevel_segments == 0 {
        return vec![(0.0, options.depth), (0.0, 0.0)];
    }

    let mut rings = Vec::new();
    let segments = options.bevel_segments;
    // Front cap plane sits bevel_thickness beyond the wall.
    rings.push((0.0, options.depth + options.bevel_thickness));
    for step in 1..=segments {
        let eased = (step as f32 / segments as f32 * FRAC_PI_2).sin();
        rings.push((
            options.bevel_size * eased,
            options.depth + options.bevel_thickness * (1.0 - eased),
        ));
    }
    // Straight wall.
    rings.push((options.bevel_size, 0.0));
    // Mirrored back bevel.
    for step in (0..segments).rev() {
        let eased = (step as f32 / segments as f32 * FRAC_PI_2).sin();
        rings.push((
            options.bevel_size * eased,
            -options.bevel_thickness * (1.0 - eased),
        ));
    }
    rings
}

fn add_walls(mesh: &mut MeshData, contour: &[Vec2], rings: &[(f32, f32)]) {
    let normals = vertex_normals(contour);
    let count = contour.len();

    let mut ring_starts = Vec::with_capacity(rings.len());
    for (offset, z) in rings {
        let start = mesh.vertex_count() as u32;
        for (point, normal) in contour.iter().zip(normals.iter()) {
            mesh.push_vertex((*point + *normal * *offset).extend(*z));
        }
        ring_starts.push(start);
    }

    for pair in ring_starts.windows(2) {
        let (upper, lower) = (pair[0], pair[1]);
        for i in 0..count {
            let j = (i + 1) % count;
            let a_i = upper + i as u32;
            let a_j = upper + j as u32;
            let b_i = lower + i as u32;
            let b_j = lower + j as u32;
            mesh.push_triangle(a_i, b_i, b_j);
            mesh.push_triangle(a_i, b_j, a_j);
        }
    }
}

/// Outward miter direction per contour vertex: the normalized average of
/// the adjacent edge normals. With outers wound CCW and holes CW this
/// points away from the solid on both kinds of contour.
fn vertex_normals(contour: &[Vec2]) -> Vec<Vec2> {
    let count = contour.len();
    let edge_normal = |i: usize| -> Vec2 {
        let d = contour[(i + 1) % count] - contour[i];
        Vec2::new(d.y, -d.x).normalize_or_zero()
    };
    (0..count)
        .map(|i| {
            let prev = edge_normal((i + count - 1) % count);
            let next = edge_normal(i);
            (prev + next).normalize_or_zero()
        })
        .collect()
}

/// One solid region: an outer contour (CCW) plus the holes it encloses
/// (CW).
#[derive(Debug, Clone)]
struct Region {
    outer: Vec<Vec2>,
    holes: Vec<Vec<Vec2>>,
}

/// Splits raw contours into solid regions, normalizing winding.
///
/// A contour is a hole when it sits inside an odd number of other
/// contours; font files disagree on winding conventions, so containment
/// is the only signal used.
fn classify_contours(contours: &[Vec<Vec2>]) -> Result<Vec<Region>> {
    let mut outers: Vec<Region> = Vec::new();
    let mut holes: Vec<Vec<Vec2>> = Vec::new();

    for (index, contour) in contours.iter().enumerate() {
        let probe = contour[0];
        let depth = contours
            .iter()
            .enumerate()
            .filter(|(other, _)| *other != index)
            .filter(|(_, other)| point_in_polygon(probe, other))
            .count();
        let mut contour = contour.clone();
        if depth % 2 == 0 {
            if signed_area(&contour) < 0.0 {
                contour.reverse();
            }
            outers.push(Region {
                outer: contour,
                holes: Vec::new(),
            });
        } else {
            if signed_area(&contour) > 0.0 {
                contour.reverse();
            }
            holes.push(contour);
        }
    }

    if outers.is_empty() {
        return Err(anyhow!("outline has holes but no outer contour"));
    }

    // Attach each hole to the smallest outer that contains it.
    for hole in holes {
        let probe = hole[0];
        let owner = outers
            .iter_mut()
            .filter(|region| point_in_polygon(probe, &region.outer))
            .min_by(|a, b| {
                signed_area(&a.outer)
                    .abs()
                    .total_cmp(&signed_area(&b.outer).abs())
            });
        match owner {
            Some(region) => region.holes.push(hole),
            None => return Err(anyhow!("hole contour lies outside every outer contour")),
        }
    }

    Ok(outers)
}

fn triangulate_region(region: &Region) -> Result<Vec<[Vec2; 3]>> {
    let merged = merge_holes(region)?;
    ear_clip(merged)
}

/// Joins every hole into the outer contour with a bridge edge, producing
/// one simple CCW polygon (with doubled bridge vertices).
fn merge_holes(region: &Region) -> Result<Vec<Vec2>> {
    let mut polygon = region.outer.clone();
    let mut holes = region.holes.clone();
    // Bridge rightmost holes first so earlier bridges cannot block later
    // ones.
    holes.sort_by(|a, b| max_x(b).total_cmp(&max_x(a)));
    for hole in &holes {
        polygon = bridge_hole(polygon, hole)?;
    }
    Ok(polygon)
}

fn max_x(contour: &[Vec2]) -> f32 {
    contour
        .iter()
        .map(|p| p.x)
        .fold(f32::NEG_INFINITY, f32::max)
}

fn bridge_hole(outer: Vec<Vec2>, hole: &[Vec2]) -> Result<Vec<Vec2>> {
    // Rightmost hole vertex.
    let (m_index, &m) = hole
        .iter()
        .enumerate()
        .max_by(|(_, a), (_, b)| a.x.total_cmp(&b.x))
        .ok_or_else(|| anyhow!("empty hole contour"))?;

    // Closest intersection of the +x ray from m with the outer polygon.
    let count = outer.len();
    let mut best: Option<(f32, usize)> = None;
    for i in 0..count {
        let a = outer[i];
        let b = outer[(i + 1) % count];
        // Edge must cross the horizontal line through m.
        if (a.y > m.y) == (b.y > m.y) {
            continue;
        }
        let t = (m.y - a.y) / (b.y - a.y);
        let x = a.x + t * (b.x - a.x);
        if x >= m.x && best.map_or(true, |(bx, _)| x < bx) {
            best = Some((x, i));
        }
    }
    let (hit_x, edge) = best.ok_or_else(|| anyhow!("hole is not enclosed by its contour"))?;
    let hit = Vec2::new(hit_x, m.y);

    // Candidate connection vertex: the endpoint of the intersected edge
    // with the larger x. A reflex outer vertex inside triangle (m, hit,
    // candidate) would occlude the bridge; take the occluder closest in
    // angle to the ray instead.
    let a = outer[edge];
    let b = outer[(edge + 1) % count];
    let mut candidate = if a.x > b.x { edge } else { (edge + 1) % count };
    let mut best_metric = f32::INFINITY;
    for (i, p) in outer.iter().enumerate() {
        if i == candidate || p.x < m.x {
            continue;
        }
        if !is_reflex(&outer, i) {
            continue;
        }
        if point_in_triangle(*p, m, hit, outer[candidate]) {
            let to = *p - m;
            let metric = (to.y / to.x.max(1e-6)).abs();
            if metric < best_metric {
                best_metric = metric;
                candidate = i;
            }
        }
    }

    // Splice: outer[..=candidate], the hole walked from m all the way
    // around, then duplicates of m and the candidate to close both loops.
    let mut merged = Vec::with_capacity(outer.len() + hole.len() + 2);
    merged.extend_from_slice(&outer[..=candidate]);
    for k in 0..hole.len() {
        merged.push(hole[(m_index + k) % hole.len()]);
    }
    merged.push(m);
    merged.push(outer[candidate]);
    merged.extend_from_slice(&outer[candidate + 1..]);
    Ok(merged)
}

fn ear_clip(mut polygon: Vec<Vec2>) -> Result<Vec<[Vec2; 3]>> {
    let mut triangles = Vec::new();
    while polygon.len() > 3 {
        let count = polygon.len();
        let mut clipped = false;
        for i in 0..count {
            let prev = polygon[(i + count - 1) % count];
            let curr = polygon[i];
            let next = polygon[(i + 1) % count];
            if cross2(curr - prev, next - curr) <= 1e-12 {
                continue; // reflex or collinear corner
            }
            let blocked = polygon.iter().enumerate().any(|(j, p)| {
                let adjacent =
                    j == i || j == (i + count - 1) % count || j == (i + 1) % count;
                !adjacent && point_in_triangle(*p, prev, curr, next)
            });
            if blocked {
                continue;
            }
            triangles.push([prev, curr, next]);
            polygon.remove(i);
            clipped = true;
            break;
        }
        if !clipped {
            // Numerically degenerate remainder (collinear bridge slivers).
            // Drop the flattest corner and keep going.
            let flattest = (0..polygon.len())
                .min_by(|&a, &b| corner_area(&polygon, a).total_cmp(&corner_area(&polygon, b)))
                .ok_or_else(|| anyhow!("triangulation ran out of vertices"))?;
            polygon.remove(flattest);
            if polygon.len() < 3 {
                break;
            }
        }
    }
    if polygon.len() == 3 {
        triangles.push([polygon[0], polygon[1], polygon[2]]);
    }
    if triangles.is_empty() {
        return Err(anyhow!("contour could not be triangulated"));
    }
    Ok(triangles)
}

/// Reflex corner test for a CCW polygon.
fn is_reflex(polygon: &[Vec2], i: usize) -> bool {
    let count = polygon.len();
    let prev = polygon[(i + count - 1) % count];
    let curr = polygon[i];
    let next = polygon[(i + 1) % count];
    cross2(curr - prev, next - curr) < 0.0
}

fn corner_area(polygon: &[Vec2], i: usize) -> f32 {
    let count = polygon.len();
    let prev = polygon[(i + count - 1) % count];
    let curr = polygon[i];
    let next = polygon[(i + 1) % count];
    cross2(curr - prev, next - curr).abs()
}

fn cross2(a: Vec2, b: Vec2) -> f32 {
    a.x * b.y - a.y * b.x
}

fn signed_area(contour: &[Vec2]) -> f32 {
    let mut area = 0.0;
    for i in 0..contour.len() {
        let a = contour[i];
        let b = contour[(i + 1) % contour.len()];
        area += cross2(a, b);
    }
    area * 0.5
}

fn point_in_polygon(point: Vec2, contour: &[Vec2]) -> bool {
    let mut inside = false;
    let count = contour.len();
    for i in 0..count {
        let a = contour[i];
        let b = contour[(i + 1) % count];
        if (a.y > point.y) != (b.y > point.y) {
            let t = (point.y - a.y) / (b.y - a.y);
            if point.x < a.x + t * (b.x - a.x) {
                inside = !inside;
            }
        }
    }
    inside
}

/// Strict interior test; boundary points (shared bridge vertices) do not
/// count.
fn point_in_triangle(p: Vec2, a: Vec2, b: Vec2, c: Vec2) -> bool {
    let d1 = cross2(b - a, p - a);
    let d2 = cross2(c - b, p - b);
    let d3 = cross2(a - c, p - c);
    let eps = 1e-9;
    (d1 > eps && d2 > eps && d3 > eps) || (d1 < -eps && d2 < -eps && d3 < -eps)
}
