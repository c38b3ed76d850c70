//! Weighted prize selection.
//!
//! Per-prize base chances are scaled by the resolved boost multiplier,
//! clamped into `[0, 1]`, normalised so they sum to 1, and then a single
//! uniform draw `u` picks the first prize (in stored order) whose
//! cumulative chance reaches `u`. When every effective chance is zero the
//! prizes are treated as equally likely.

use crate::random::RandomSource;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    #[error("No prizes to select from")]
    NoPrizes,
}

/// Outcome of one weighted draw.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    /// Index of the winning prize in the input order.
    pub index: usize,
    /// The uniform draw that decided the outcome.
    pub draw: f64,
    /// Normalised chance of every prize at the time of the draw.
    pub chances: Vec<f64>,
    /// `true` when the cumulative walk found no winner and the prize was
    /// picked uniformly among those with a positive chance instead. Should
    /// only ever happen through floating-point residue.
    pub used_fallback: bool,
}

/// Clamp a chance into `[0, 1]`; NaN counts as 0.
pub fn clamp_chance(chance: f64) -> f64 {
    if chance.is_nan() {
        0.0
    } else {
        chance.clamp(0.0, 1.0)
    }
}

/// `clamp(base * multiplier, 0, 1)` for every prize, without normalisation.
pub fn effective_chances(base_chances: &[f64], multiplier: f64) -> Vec<f64> {
    base_chances
        .iter()
        .map(|&c| clamp_chance(c * multiplier))
        .collect()
}

/// Effective chances normalised to sum to 1.
///
/// A zero total yields the uniform distribution `1 / n`. An empty input
/// yields an empty vector.
pub fn normalized_chances(base_chances: &[f64], multiplier: f64) -> Vec<f64> {
    let mut chances = effective_chances(base_chances, multiplier);
    if chances.is_empty() {
        return chances;
    }

    let sum: f64 = chances.iter().sum();
    if sum > 0.0 {
        for chance in &mut chances {
            *chance /= sum;
        }
    } else {
        let uniform = 1.0 / chances.len() as f64;
        chances.iter_mut().for_each(|c| *c = uniform);
    }
    chances
}

/// Walk `chances` in order and return the first index whose cumulative
/// chance is `>= draw`. Zero-chance entries never win.
pub fn pick_by_draw(chances: &[f64], draw: f64) -> Option<usize> {
    let mut cumulative = 0.0;
    for (index, &chance) in chances.iter().enumerate() {
        if chance <= 0.0 {
            continue;
        }
        cumulative += chance;
        if cumulative >= draw {
            return Some(index);
        }
    }
    None
}

/// Uniform pick among the prizes with a positive chance.
fn fallback_index(chances: &[f64], random: &dyn RandomSource) -> Result<usize, SelectionError> {
    let eligible: Vec<usize> = chances
        .iter()
        .enumerate()
        .filter(|(_, chance)| **chance > 0.0)
        .map(|(index, _)| index)
        .collect();
    if eligible.is_empty() {
        return Err(SelectionError::NoPrizes);
    }
    Ok(eligible[random.next_index(eligible.len())])
}

/// Select one prize from `base_chances` scaled by `multiplier`.
pub fn select_prize(
    base_chances: &[f64],
    multiplier: f64,
    random: &dyn RandomSource,
) -> Result<Selection, SelectionError> {
    if base_chances.is_empty() {
        return Err(SelectionError::NoPrizes);
    }

    let chances = normalized_chances(base_chances, multiplier);
    let draw = random.next_unit();

    let (index, used_fallback) = match pick_by_draw(&chances, draw) {
        Some(index) => (index, false),
        None => (fallback_index(&chances, random)?, true),
    };

    Ok(Selection {
        index,
        draw,
        chances,
        used_fallback,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
