//! Reviews

use jiff::Timestamp;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{products::ProductUuid, users::UserUuid, uuids::TypedUuid};

/// Review UUID
pub type ReviewUuid = TypedUuid<Review>;

/// Lowest accepted rating.
pub const MIN_RATING: u8 = 1;

/// Highest accepted rating.
pub const MAX_RATING: u8 = 5;

/// Errors building a review.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ReviewError {
    /// Rating outside `1..=5`.
    #[error("rating must be between {MIN_RATING} and {MAX_RATING}, got {0}")]
    InvalidRating(u8),

    /// Empty review text.
    #[error("review body cannot be empty")]
    EmptyBody,
}

impl ReviewError {
    /// Stable error code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidRating(_) => "review_invalid_rating",
            Self::EmptyBody => "review_empty_body",
        }
    }
}

/// Product review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    /// Review UUID
    pub uuid: ReviewUuid,

    /// Reviewed product
    pub product_uuid: ProductUuid,

    /// Author
    pub user_uuid: UserUuid,

    /// Star rating
    pub rating: u8,

    /// Headline
    pub title: String,

    /// Review text
    pub body: String,

    /// Author bought the product
    pub verified_purchase: bool,

    /// Creation time
    pub created_at: Timestamp,
}

/// Review data supplied by the author.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReview {
    /// Reviewed product
    pub product_uuid: ProductUuid,

    /// Star rating
    pub rating: u8,

    /// Headline
    pub title: String,

    /// Review text
    pub body: String,
}

impl Review {
    /// Build a review, validating rating range and body.
    ///
    /// # Errors
    ///
    /// Returns [`ReviewError`] if the rating is out of range or the body is blank.
    pub fn new(
        review: NewReview,
        user_uuid: UserUuid,
        verified_purchase: bool,
        now: Timestamp,
    ) -> Result<Self, ReviewError> {
        if !(MIN_RATING..=MAX_RATING).contains(&review.rating) {
            return Err(ReviewError::InvalidRating(review.rating));
        }

        if review.body.trim().is_empty() {
            return Err(ReviewError::EmptyBody);
        }

        Ok(Self {
            uuid: ReviewUuid::new(),
            product_uuid: review.product_uuid,
            user_uuid,
            rating: review.rating,
            title: review.title.trim().to_string(),
            body: review.body.trim().to_string(),
            verified_purchase,
            created_at: now,
        })
    }
}

/// Aggregate rating for a product.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingSummary {
    /// Number of reviews
    pub count: u32,

    /// Mean rating rounded to one decimal place
    pub average: Decimal,
}

impl RatingSummary {
    /// Summarise a set of reviews.
    pub fn from_reviews<'a>(reviews: impl IntoIterator<Item = &'a Review>) -> Self {
        let (count, sum) = reviews
            .into_iter()
            .fold((0_u32, 0_u32), |(count, sum), review| {
                (count + 1, sum + u32::from(review.rating))
            });

        if count == 0 {
            return Self::default();
        }

        let average = (Decimal::from(sum) / Decimal::from(count))
            .round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero);

        Self { count, average }
    }
}
