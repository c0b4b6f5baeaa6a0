pub mod collection;
pub mod collection_movie;
pub mod movie_note;
pub mod movie_rating;
pub mod wishlist_entry;
