use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const RATINGS_COLLECTION: &str = "ratings";
pub const MIN_RATING: i64 = 1;
pub const MAX_RATING: i64 = 5;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingQuery {
    pub post_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingSubmission {
    #[serde(default)]
    pub post_id: Option<String>,
    #[serde(default)]
    pub rating: Option<Value>,
}

impl RatingSubmission {
    /// Returns the post id and a rating in `[MIN_RATING, MAX_RATING]`.
    pub fn validate(&self) -> Result<(&str, i64), String> {
        let post_id = self
            .post_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| "Post ID is required".to_string())?;

        match self.rating.as_ref().and_then(Value::as_i64) {
            Some(rating) if (MIN_RATING..=MAX_RATING).contains(&rating) => Ok((post_id, rating)),
            _ => Err(format!(
                "rating must be an integer between {MIN_RATING} and {MAX_RATING}"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingSummary {
    pub user_rating: i64,
    pub average: f64,
    pub count: usize,
}

impl RatingSummary {
    pub fn new(ratings: &[i64], user_rating: Option<i64>) -> Self {
        Self {
            user_rating: user_rating.unwrap_or(0),
            average: average(ratings),
            count: ratings.len(),
        }
    }
}

/// Arithmetic mean rounded to one decimal place, 0 for no ratings.
pub fn average(ratings: &[i64]) -> f64 {
    if ratings.is_empty() {
        return 0.0;
    }
    let mean = ratings.iter().sum::<i64>() as f64 / ratings.len() as f64;
    (mean * 10.0).round() / 10.0
}
