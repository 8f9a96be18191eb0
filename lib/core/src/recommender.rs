//! Hybrid ranking: collaborative-filtering estimates scaled by content similarity.

use crate::{Embedding, EmbeddingTable, InteractionStore, ItemId, Predictor, UserId};
use ordered_float::OrderedFloat;
use std::cmp::Ordering;
use tracing::debug;

/// Number of items returned when the caller does not ask for a specific count
pub const DEFAULT_TOP_N: usize = 5;

/// An unseen item with its fused score
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub item_id: ItemId,
    /// Model estimate multiplied by the best similarity to the user's history
    pub score: f32,
}

impl Candidate {
    /// Total order: higher score first, then lower item id
    #[inline]
    fn rank_cmp(&self, other: &Candidate) -> Ordering {
        OrderedFloat(other.score)
            .cmp(&OrderedFloat(self.score))
            .then_with(|| self.item_id.cmp(&other.item_id))
    }
}

/// Borrowed view over one snapshot of the three collaborators.
///
/// Holds no state of its own, so a single instance may serve concurrent
/// requests as long as the borrowed tables stay untouched.
#[derive(Clone, Copy)]
pub struct Recommender<'a> {
    interactions: &'a InteractionStore,
    embeddings: &'a EmbeddingTable,
    model: &'a dyn Predictor,
}

impl<'a> Recommender<'a> {
    pub fn new(
        interactions: &'a InteractionStore,
        embeddings: &'a EmbeddingTable,
        model: &'a dyn Predictor,
    ) -> Self {
        Self {
            interactions,
            embeddings,
            model,
        }
    }

    /// Top `n` unseen item ids for the user, best first
    pub fn recommend(&self, user_id: UserId, n: usize) -> Vec<ItemId> {
        self.top_candidates(user_id, n)
            .into_iter()
            .map(|candidate| candidate.item_id)
            .collect()
    }

    /// Top `n` candidates with their scores, best first
    pub fn top_candidates(&self, user_id: UserId, n: usize) -> Vec<Candidate> {
        if n == 0 {
            return Vec::new();
        }

        let mut candidates = self.score_candidates(user_id);
        if candidates.len() > n {
            candidates.select_nth_unstable_by(n, Candidate::rank_cmp);
            candidates.truncate(n);
        }
        candidates.sort_unstable_by(Candidate::rank_cmp);

        debug!(
            user_id,
            returned = candidates.len(),
            "ranked recommendation candidates"
        );
        candidates
    }

    /// Every scorable unseen item, unordered
    pub fn score_candidates(&self, user_id: UserId) -> Vec<Candidate> {
        let history = self.seen_embeddings(user_id);
        if history.is_empty() {
            debug!(user_id, "no seen embeddings, ranking by model estimate only");
        }

        self.interactions
            .unseen_by(user_id)
            .into_iter()
            .filter_map(|item_id| {
                let embedding = self.embeddings.get(item_id)?;
                let similarity = max_similarity(embedding, &history);
                let score = self.model.predict(user_id, item_id) * similarity;
                // NaN has no meaningful rank
                (!score.is_nan()).then_some(Candidate { item_id, score })
            })
            .collect()
    }

    fn seen_embeddings(&self, user_id: UserId) -> Vec<&'a Embedding> {
        let embeddings = self.embeddings;
        self.interactions
            .seen_by(user_id)
            .map(|seen| {
                seen.iter()
                    .filter_map(|item_id| embeddings.get(*item_id))
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Best cosine similarity between a candidate and any history item.
/// An empty history leaves the model estimate unscaled.
#[inline]
fn max_similarity(candidate: &Embedding, history: &[&Embedding]) -> f32 {
    if history.is_empty() {
        return 1.0;
    }
    history
        .iter()
        .map(|seen| candidate.similarity(seen))
        .fold(f32::NEG_INFINITY, f32::max)
}

/// Rank unseen items for `user_id` and return at most `n` item ids
pub fn recommend(
    user_id: UserId,
    interactions: &InteractionStore,
    embeddings: &EmbeddingTable,
    model: &dyn Predictor,
    n: usize,
) -> Vec<ItemId> {
    Recommender::new(interactions, embeddings, model).recommend(user_id, n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EmbeddingRecord, Vector};

    fn table(rows: &[(ItemId, &[f32])]) -> EmbeddingTable {
        EmbeddingTable::from_records(rows.iter().map(|(item_id, v)| EmbeddingRecord {
            item_id: *item_id,
            vector: Vector::from_slice(v),
        }))
        .unwrap()
    }

    fn flat(score: f32) -> impl Fn(UserId, ItemId) -> f32 + Send + Sync {
        move |_, _| score
    }

    #[test]
    fn test_similarity_reorders_equal_estimates() {
        let interactions = InteractionStore::from_pairs([(1, 10), (1, 11)]);
        let embeddings = table(&[
            (10, &[1.0, 0.0]),
            (11, &[1.0, 0.0]),
            (12, &[0.0, 1.0]),
            (13, &[0.9, 0.1]),
        ]);
        let model = flat(0.8);

        let ranked = Recommender::new(&interactions, &embeddings, &model).top_candidates(1, 5);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].item_id, 13);
        assert!((ranked[0].score - 0.795_107).abs() < 1e-4);
        assert_eq!(ranked[1].item_id, 12);
        assert!(ranked[1].score.abs() < 1e-6);
    }

    #[test]
    fn test_max_not_mean_similarity() {
        // Item 20 matches one history item exactly, item 21 is halfway to both
        let interactions = InteractionStore::from_pairs([(1, 1), (1, 2), (2, 20), (2, 21)]);
        let embeddings = table(&[
            (1, &[1.0, 0.0]),
            (2, &[0.0, 1.0]),
            (20, &[1.0, 0.0]),
            (21, &[1.0, 1.0]),
        ]);
        let model = flat(1.0);
        assert_eq!(recommend(1, &interactions, &embeddings, &model, 5), vec![20, 21]);
    }

    #[test]
    fn test_ties_break_on_ascending_item_id() {
        let interactions = InteractionStore::from_pairs([(2, 7), (2, 3), (2, 5)]);
        let embeddings = table(&[(3, &[1.0]), (5, &[1.0]), (7, &[1.0])]);
        let model = flat(0.5);
        assert_eq!(recommend(1, &interactions, &embeddings, &model, 5), vec![3, 5, 7]);
    }

    #[test]
    fn test_cold_start_uses_model_only() {
        let interactions = InteractionStore::from_pairs([(2, 1), (2, 2), (2, 3)]);
        let embeddings = table(&[(1, &[1.0, 0.0]), (2, &[0.0, 1.0]), (3, &[1.0, 1.0])]);
        let model = |_: UserId, item: ItemId| -> f32 {
            match item {
                1 => 0.9,
                2 => 0.5,
                _ => 0.7,
            }
        };
        assert_eq!(recommend(1, &interactions, &embeddings, &model, 2), vec![1, 3]);
    }

    #[test]
    fn test_history_without_embeddings_falls_back() {
        let interactions = InteractionStore::from_pairs([(1, 100), (2, 1), (2, 2)]);
        let embeddings = table(&[(1, &[1.0, 0.0]), (2, &[0.0, 1.0])]);
        let model = |_: UserId, item: ItemId| -> f32 {
            if item == 2 {
                0.9
            } else {
                0.1
            }
        };

        let ranked = Recommender::new(&interactions, &embeddings, &model).top_candidates(1, 5);
        let ids: Vec<_> = ranked.iter().map(|c| c.item_id).collect();
        assert_eq!(ids, vec![2, 1]);
        assert!((ranked[0].score - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_items_without_embedding_skipped() {
        let interactions = InteractionStore::from_pairs([(1, 1), (2, 2), (2, 3)]);
        let embeddings = table(&[(1, &[1.0]), (3, &[1.0])]);
        let model = flat(1.0);
        assert_eq!(recommend(1, &interactions, &embeddings, &model, 5), vec![3]);
    }

    #[test]
    fn test_everything_seen_is_empty() {
        let interactions = InteractionStore::from_pairs([(1, 1), (1, 2), (2, 1)]);
        let embeddings = table(&[(1, &[1.0]), (2, &[1.0])]);
        let model = flat(1.0);
        assert!(recommend(1, &interactions, &embeddings, &model, 5).is_empty());
    }

    #[test]
    fn test_truncates_to_n_and_zero_n() {
        let interactions = InteractionStore::from_pairs((1..=20).map(|item| (2, item)));
        let rows: Vec<(ItemId, Vec<f32>)> = (1..=20).map(|item| (item, vec![1.0])).collect();
        let embeddings = EmbeddingTable::from_records(rows.into_iter().map(|(item_id, v)| {
            EmbeddingRecord {
                item_id,
                vector: Vector::new(v),
            }
        }))
        .unwrap();
        let model = |_: UserId, item: ItemId| item as f32;

        assert_eq!(
            recommend(1, &interactions, &embeddings, &model, 3),
            vec![20, 19, 18]
        );
        assert!(recommend(1, &interactions, &embeddings, &model, 0).is_empty());
        assert_eq!(recommend(1, &interactions, &embeddings, &model, 50).len(), 20);
    }

    #[test]
    fn test_nan_scores_dropped() {
        let interactions = InteractionStore::from_pairs([(2, 1), (2, 2)]);
        let embeddings = table(&[(1, &[1.0]), (2, &[1.0])]);
        let model = |_: UserId, item: ItemId| -> f32 {
            if item == 1 {
                f32::NAN
            } else {
                0.3
            }
        };
        assert_eq!(recommend(1, &interactions, &embeddings, &model, 5), vec![2]);
    }

    #[test]
    fn test_rank_cmp_orders_negative_scores_last() {
        let mut candidates = vec![
            Candidate {
                item_id: 1,
                score: -0.5,
            },
            Candidate {
                item_id: 2,
                score: 0.0,
            },
            Candidate {
                item_id: 3,
                score: 0.5,
            },
        ];
        candidates.sort_unstable_by(Candidate::rank_cmp);
        let ids: Vec<_> = candidates.iter().map(|c| c.item_id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }
}
