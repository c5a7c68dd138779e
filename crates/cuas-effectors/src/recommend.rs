//! The composite effector-recommendation score (§4.5/C7).
//!
//! Pure function over an effector's public surface plus the target track's
//! position and classification; it takes no lock of its own and holds no
//! reference beyond the call. The engagement manager calls this once per
//! registered effector when auto-recommending, and exposes it directly for
//! an operator-driven "what would you pick" query.

use cuas_core::constants::{
    RECOMMEND_RF_UNCLASSIFIED_BONUS, RECOMMEND_WEIGHT_EFFECTIVENESS, RECOMMEND_WEIGHT_RANGE,
    RECOMMEND_WEIGHT_READY,
};
use cuas_core::enums::{Classification, EffectorType};
use cuas_core::types::GeoPosition;

use crate::contract::Effector;

/// Recommender score for one effector against one target position and
/// classification, in `[0, 1]`. Zero whenever the effector is not ready or
/// the target falls outside its effective range.
pub fn recommend_score(effector: &dyn Effector, target: GeoPosition, classification: Classification) -> f64 {
    if !effector.is_ready() {
        return 0.0;
    }
    let distance = effector.distance_to(target);
    let (min, max) = (effector.min_range_m(), effector.max_range_m());
    if distance < min || distance > max {
        return 0.0;
    }

    let midpoint = (min + max) / 2.0;
    let span = (max - min).max(1e-6);
    let range_score = (1.0 - (distance - midpoint).abs() / span).clamp(0.0, 1.0);

    let mut score = range_score * RECOMMEND_WEIGHT_RANGE
        + effector.effectiveness() * RECOMMEND_WEIGHT_EFFECTIVENESS
        + RECOMMEND_WEIGHT_READY;

    if effector.effector_type() == EffectorType::RfJammer
        && matches!(classification, Classification::Pending | Classification::Unknown)
    {
        score += RECOMMEND_RF_UNCLASSIFIED_BONUS;
    }

    score
}

/// Picks the highest-scoring effector from `candidates`, ties broken by
/// effector-id lexicographic order. Returns `None` if every candidate
/// scores zero (unready, or out of range for all of them).
pub fn recommend_best<'a>(
    candidates: impl IntoIterator<Item = &'a dyn Effector>,
    target: GeoPosition,
    classification: Classification,
) -> Option<(&'a dyn Effector, f64)> {
    let mut best: Option<(&dyn Effector, f64)> = None;
    for candidate in candidates {
        let score = recommend_score(candidate, target, classification);
        if score <= 0.0 {
            continue;
        }
        best = match best {
            None => Some((candidate, score)),
            Some((best_eff, best_score)) => {
                if score > best_score
                    || (score == best_score && candidate.id().0 < best_eff.id().0)
                {
                    Some((candidate, score))
                } else {
                    Some((best_eff, best_score))
                }
            }
        };
    }
    best
}
