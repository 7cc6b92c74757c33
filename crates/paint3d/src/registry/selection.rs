//! Selection utilities for choosing a [`RegistryEntry`] to paint with.
//!
//! - [pick_weighted_random]: draws proportionally to each enabled entry's probability.
//! - [pick_uniform_random]: draws uniformly among enabled entries.
//! - [pick_round_robin]: deterministic cycling over enabled entries in key order.
//!
//! Inputs are registry entries in key order as produced by
//! [crate::registry::ObjectRegistry]. When randomness is required, pass an RNG that
//! implements [rand::Rng].
use rand::Rng;

use crate::registry::RegistryEntry;
use crate::sampling::rand01;

pub fn pick_weighted_random<'a>(
    entries: &[&'a RegistryEntry],
    rng: &mut dyn Rng,
) -> Option<&'a RegistryEntry> {
    let placeable: Vec<_> = entries.iter().copied().filter(|e| e.enabled).collect();
    if placeable.is_empty() {
        return None;
    }

    let total_weight: f32 = placeable.iter().map(|e| e.probability.max(0.0)).sum();
    if total_weight <= 0.0 {
        return pick_uniform_random(&placeable, rng);
    }

    let mut roll = rand01(rng) * total_weight;
    for e in &placeable {
        let weight = e.probability.max(0.0);
        if weight <= 0.0 {
            continue;
        }
        roll -= weight;
        if roll <= 0.0 {
            return Some(*e);
        }
    }

    placeable.iter().rev().find(|e| e.probability > 0.0).copied()
}

pub fn pick_uniform_random<'a>(
    entries: &[&'a RegistryEntry],
    rng: &mut dyn Rng,
) -> Option<&'a RegistryEntry> {
    let placeable: Vec<_> = entries.iter().copied().filter(|e| e.enabled).collect();
    if placeable.is_empty() {
        return None;
    }
    let index = (rand01(rng) * placeable.len() as f32) as usize;
    placeable.get(index.min(placeable.len() - 1)).copied()
}

/// Pick the enabled entry at `cursor`, wrapping modulo the enabled count.
pub fn pick_round_robin<'a>(
    entries: &[&'a RegistryEntry],
    cursor: usize,
) -> Option<&'a RegistryEntry> {
    let placeable: Vec<_> = entries.iter().copied().filter(|e| e.enabled).collect();
    if placeable.is_empty() {
        return None;
    }
    placeable.get(cursor % placeable.len()).copied()
}
