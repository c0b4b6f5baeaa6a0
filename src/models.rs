use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// External catalog id. Opaque to this crate.
pub type MovieId = i64;

pub type CollectionId = i64;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    pub id: CollectionId,
    pub name: String,
    pub created_at: Timestamp,
}

/// A row of a movie-id listing, serialized as `{ "movie_id": 42 }`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovieEntry {
    pub movie_id: MovieId,
}

/// A star rating between 0 and 5 inclusive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct Rating(u8);

impl Rating {
    pub const MAX: u8 = 5;

    pub fn new(value: i64) -> AppResult<Self> {
        u8::try_from(value)
            .ok()
            .filter(|v| *v <= Self::MAX)
            .map(Self)
            .ok_or_else(|| AppError::bad_request("Valid rating (0-5) is required"))
    }

    pub fn get(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Rating {
    type Error = AppError;

    fn try_from(value: i64) -> AppResult<Self> {
        Self::new(value)
    }
}

impl From<Rating> for i64 {
    fn from(rating: Rating) -> Self {
        rating.0 as i64
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateCollectionRequest {
    pub name: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MovieIdRequest {
    #[serde(rename = "movieId")]
    pub movie_id: Option<MovieId>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NoteBody {
    pub note: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RatingBody {
    pub rating: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Success {
    pub success: bool,
}

impl Success {
    pub fn ok() -> Self {
        Self { success: true }
    }
}

/// Trims a collection name, rejecting names that end up empty.
pub fn collection_name(raw: &str) -> AppResult<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(AppError::bad_request("Name is required"));
    }
    Ok(name.to_string())
}

pub fn require_movie_id(movie_id: Option<MovieId>) -> AppResult<MovieId> {
    movie_id.filter(|id| *id > 0).ok_or_else(|| AppError::bad_request("Movie ID is required"))
}

pub fn now_ms() -> i64 {
    Timestamp::now().as_millisecond()
}

pub fn timestamp_from_ms(ms: i64) -> AppResult<Timestamp> {
    Ok(Timestamp::from_millisecond(ms)?)
}
