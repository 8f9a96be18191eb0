//! Scoring model contract and a latent-factor implementation.
//!
//! The recommender only sees [`Predictor`]. [`FactorModel`] is the concrete
//! model shipped as an artifact: user and item factor matrices produced by an
//! offline matrix factorization run (NMF or SVD style), optionally with
//! baseline biases.

use crate::{Error, ItemId, Result, UserId};
use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// Inference contract of a collaborative-filtering model.
///
/// Implementations must be pure: calling `predict` never mutates state, and
/// an unknown user or item yields a model-defined neutral estimate rather
/// than an error.
pub trait Predictor: Send + Sync {
    fn predict(&self, user_id: UserId, item_id: ItemId) -> f32;
}

impl<F> Predictor for F
where
    F: Fn(UserId, ItemId) -> f32 + Send + Sync,
{
    #[inline]
    fn predict(&self, user_id: UserId, item_id: ItemId) -> f32 {
        self(user_id, item_id)
    }
}

/// Inclusive bounds of the estimates a model may produce
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingScale {
    pub min: f32,
    pub max: f32,
}

impl RatingScale {
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    #[inline]
    pub fn clip(&self, value: f32) -> f32 {
        value.clamp(self.min, self.max)
    }
}

impl Default for RatingScale {
    fn default() -> Self {
        Self { min: 1.0, max: 5.0 }
    }
}

/// Trained latent-factor model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactorModel {
    pub global_mean: f32,
    #[serde(default)]
    pub rating_scale: RatingScale,
    #[serde(default)]
    pub biased: bool,
    pub user_factors: AHashMap<UserId, Vec<f32>>,
    pub item_factors: AHashMap<ItemId, Vec<f32>>,
    #[serde(default)]
    pub user_bias: AHashMap<UserId, f32>,
    #[serde(default)]
    pub item_bias: AHashMap<ItemId, f32>,
}

impl FactorModel {
    /// Number of latent factors, taken from the first factor vector
    pub fn n_factors(&self) -> usize {
        self.user_factors
            .values()
            .chain(self.item_factors.values())
            .next()
            .map_or(0, Vec::len)
    }

    /// Check shapes and values before the model is put into service
    pub fn validate(&self) -> Result<()> {
        let scale = self.rating_scale;
        if !(scale.min.is_finite() && scale.max.is_finite()) || scale.min > scale.max {
            return Err(Error::InvalidModel(format!(
                "invalid rating scale [{}, {}]",
                scale.min, scale.max
            )));
        }
        if !self.global_mean.is_finite() {
            return Err(Error::InvalidModel("global mean is not finite".to_string()));
        }

        let n_factors = self.n_factors();
        let factors = self
            .user_factors
            .iter()
            .map(|(id, f)| ("user", *id, f))
            .chain(self.item_factors.iter().map(|(id, f)| ("item", *id, f)));
        for (kind, id, f) in factors {
            if f.len() != n_factors {
                return Err(Error::InvalidModel(format!(
                    "{} {} has {} factors, expected {}",
                    kind,
                    id,
                    f.len(),
                    n_factors
                )));
            }
            if f.iter().any(|x| !x.is_finite()) {
                return Err(Error::InvalidModel(format!(
                    "{} {} has non-finite factors",
                    kind, id
                )));
            }
        }

        let biases = self.user_bias.values().chain(self.item_bias.values());
        if biases.into_iter().any(|b| !b.is_finite()) {
            return Err(Error::InvalidModel("non-finite bias".to_string()));
        }
        Ok(())
    }

    pub fn knows_user(&self, user_id: UserId) -> bool {
        self.user_factors.contains_key(&user_id)
    }

    pub fn knows_item(&self, item_id: ItemId) -> bool {
        self.item_factors.contains_key(&item_id)
    }

    fn estimate(&self, user_id: UserId, item_id: ItemId) -> f32 {
        let user = self.user_factors.get(&user_id);
        let item = self.item_factors.get(&item_id);

        match (user, item) {
            (Some(p), Some(q)) => {
                let dot: f32 = p.iter().zip(q).map(|(a, b)| a * b).sum();
                if self.biased {
                    dot + self.global_mean + self.bias_of_user(user_id) + self.bias_of_item(item_id)
                } else {
                    dot
                }
            }
            // Unknown user or item: fall back to the baseline
            _ if self.biased => {
                self.global_mean + self.bias_of_user(user_id) + self.bias_of_item(item_id)
            }
            _ => self.global_mean,
        }
    }

    fn bias_of_user(&self, user_id: UserId) -> f32 {
        self.user_bias.get(&user_id).copied().unwrap_or(0.0)
    }

    fn bias_of_item(&self, item_id: ItemId) -> f32 {
        self.item_bias.get(&item_id).copied().unwrap_or(0.0)
    }
}

impl Predictor for FactorModel {
    fn predict(&self, user_id: UserId, item_id: ItemId) -> f32 {
        self.rating_scale.clip(self.estimate(user_id, item_id))
    }
}
