//! Single-pass collision detection and impulse resolution.
//!
//! All contacts of one tick are resolved in a fixed enumeration order and
//! applied immediately, so a corrected position is visible to every later
//! check in the same pass. There is no iterative solver; this matches the
//! classic arcade engine behaviour and keeps the pipeline deterministic.
//!
//! Restitution composes multiplicatively: every contact bounces with
//! `a.b_coef * b.b_coef`.

use crate::stadium::{Disc, Plane, Segment, Stadium, Vertex};
use crate::types::{cross, CollisionFlag, Vec2};

/// Squared-magnitude threshold below which a contact direction is undefined
/// and the contact is skipped.
const EPSILON_SQ: f64 = 1e-24;

#[inline]
fn filters_allow(
    a_group: CollisionFlag,
    a_mask: CollisionFlag,
    b_group: CollisionFlag,
    b_mask: CollisionFlag,
) -> bool {
    a_group.intersects(b_mask) && b_group.intersects(a_mask)
}

/// Resolve every admissible contact for one tick.
///
/// Enumeration order per disc index `i`: disc pairs `(i, j)` with `j > i`,
/// then all segments, then all planes, then all vertices. Immovable discs
/// are never tested against boundary geometry.
pub fn resolve_collisions(stadium: &mut Stadium) {
    let Stadium { ref mut discs, ref segments, ref planes, ref vertexes, .. } = *stadium;

    for i in 0..discs.len() {
        for j in (i + 1)..discs.len() {
            let (a, b) = pair_mut(discs, i, j);
            resolve_disc_disc(a, b);
        }

        let disc = &mut discs[i];
        if disc.inv_mass == 0.0 {
            continue;
        }
        for segment in segments {
            resolve_disc_segment(disc, segment);
        }
        for plane in planes {
            resolve_disc_plane(disc, plane);
        }
        for vertex in vertexes {
            resolve_disc_vertex(disc, vertex);
        }
    }
}

fn pair_mut(discs: &mut [Disc], i: usize, j: usize) -> (&mut Disc, &mut Disc) {
    debug_assert!(i < j);
    let (head, tail) = discs.split_at_mut(j);
    (&mut head[i], &mut tail[0])
}

fn resolve_disc_disc(a: &mut Disc, b: &mut Disc) {
    if !filters_allow(a.c_group, a.c_mask, b.c_group, b.c_mask) {
        return;
    }
    let inv_mass_total = a.inv_mass + b.inv_mass;
    if inv_mass_total == 0.0 {
        return;
    }

    let delta = b.position - a.position;
    let contact_radius = a.radius + b.radius;
    let dist_sq = delta.norm_squared();
    if dist_sq >= contact_radius * contact_radius || dist_sq <= EPSILON_SQ {
        return;
    }
    let dist = dist_sq.sqrt();
    let normal = delta / dist;
    let penetration = contact_radius - dist;

    // Positional correction, split by inverse mass
    a.position -= normal * (penetration * (a.inv_mass / inv_mass_total));
    b.position += normal * (penetration * (b.inv_mass / inv_mass_total));

    // Velocity response along the contact normal
    let approach = (b.velocity - a.velocity).dot(&normal);
    if approach < 0.0 {
        let b_pair = a.b_coef * b.b_coef;
        let impulse = -(1.0 + b_pair) * approach / inv_mass_total;
        a.velocity -= normal * (impulse * a.inv_mass);
        b.velocity += normal * (impulse * b.inv_mass);
    }
}

/// Push a disc out along `normal` and reflect its approaching velocity.
/// The other body is immovable; only the disc moves.
fn apply_surface_response(disc: &mut Disc, normal: Vec2, penetration: f64, surface_b_coef: f64) {
    disc.position += normal * penetration;
    let approach = disc.velocity.dot(&normal);
    if approach < 0.0 {
        let b_pair = disc.b_coef * surface_b_coef;
        disc.velocity -= normal * ((1.0 + b_pair) * approach);
    }
}

/// Collide a disc with an immovable point (segment foot, arc endpoint,
/// vertex).
fn resolve_disc_point(disc: &mut Disc, point: Vec2, surface_b_coef: f64) {
    let delta = disc.position - point;
    let dist_sq = delta.norm_squared();
    if dist_sq >= disc.radius * disc.radius || dist_sq <= EPSILON_SQ {
        return;
    }
    let dist = dist_sq.sqrt();
    apply_surface_response(disc, delta / dist, disc.radius - dist, surface_b_coef);
}

fn resolve_disc_segment(disc: &mut Disc, segment: &Segment) {
    if !filters_allow(disc.c_group, disc.c_mask, segment.c_group, segment.c_mask) {
        return;
    }
    // One-sided segments only touch discs on the bias side.
    if segment.bias != 0.0 {
        let side = cross(&(disc.position - segment.p0), &(segment.p1 - segment.p0));
        if side * segment.bias <= 0.0 {
            return;
        }
    }

    match segment.arc() {
        None => {
            let chord = segment.p1 - segment.p0;
            let length_sq = chord.norm_squared();
            if length_sq <= EPSILON_SQ {
                return;
            }
            let t = ((disc.position - segment.p0).dot(&chord) / length_sq).clamp(0.0, 1.0);
            resolve_disc_point(disc, segment.p0 + chord * t, segment.b_coef);
        }
        Some(arc) => {
            let delta = disc.position - arc.center;
            let dist_sq = delta.norm_squared();
            if dist_sq <= EPSILON_SQ {
                return;
            }
            if within_arc_sweep(segment, arc.center, &delta) {
                let dist = dist_sq.sqrt();
                let gap = dist - arc.radius;
                if gap.abs() >= disc.radius {
                    return;
                }
                // Normal points from the curve toward the disc center:
                // outward when outside the circle, inward when inside.
                let normal = if gap >= 0.0 { delta / dist } else { -delta / dist };
                apply_surface_response(disc, normal, disc.radius - gap.abs(), segment.b_coef);
            } else {
                let nearest = nearest_endpoint(disc.position, segment.p0, segment.p1);
                resolve_disc_point(disc, nearest, segment.b_coef);
            }
        }
    }
}

/// Whether the ray from the arc center through `delta` falls inside the
/// arc's angular sweep. Positive curvature sweeps counterclockwise from p0
/// to p1; arcs over 180° use the complement (reflex) wedge.
fn within_arc_sweep(segment: &Segment, center: Vec2, delta: &Vec2) -> bool {
    let sign = segment.curve.signum();
    let v0 = segment.p0 - center;
    let v1 = segment.p1 - center;
    let from_start = sign * cross(&v0, delta);
    let to_end = sign * cross(delta, &v1);
    if segment.curve.abs() <= 180.0 {
        from_start >= 0.0 && to_end >= 0.0
    } else {
        from_start >= 0.0 || to_end >= 0.0
    }
}

fn nearest_endpoint(position: Vec2, p0: Vec2, p1: Vec2) -> Vec2 {
    if (position - p0).norm_squared() <= (position - p1).norm_squared() {
        p0
    } else {
        p1
    }
}

fn resolve_disc_plane(disc: &mut Disc, plane: &Plane) {
    if !filters_allow(disc.c_group, disc.c_mask, plane.c_group, plane.c_mask) {
        return;
    }
    let distance = disc.position.dot(&plane.normal) - plane.dist;
    if distance >= disc.radius {
        return;
    }
    apply_surface_response(disc, plane.normal, disc.radius - distance, plane.b_coef);
}

fn resolve_disc_vertex(disc: &mut Disc, vertex: &Vertex) {
    if !filters_allow(disc.c_group, disc.c_mask, vertex.c_group, vertex.c_mask) {
        return;
    }
    resolve_disc_point(disc, vertex.position, vertex.b_coef);
}
