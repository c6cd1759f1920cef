//! Disc motion integration.

use crate::stadium::Stadium;

/// Advance every mobile disc by one tick.
///
/// Order matters for determinism and is part of the engine contract:
/// gravity first, then position, then damping.
pub fn update_discs(stadium: &mut Stadium) {
    for disc in &mut stadium.discs {
        if disc.inv_mass == 0.0 {
            continue;
        }
        disc.velocity += disc.gravity;
        disc.position += disc.velocity;
        disc.velocity *= disc.damping;
    }
}
