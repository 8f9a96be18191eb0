//! # hybridrec API
//!
//! HTTP surface of the recommender, built on actix-web.

pub mod error;
pub mod rest;

pub use error::ApiError;
pub use rest::{ApiConfig, RecommendQuery, RecommendResponse, RestApi};
