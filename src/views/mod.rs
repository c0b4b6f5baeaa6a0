//! Per-view state for the front end.
//!
//! Each view owns its own state and talks to the outside world only through
//! the injected [`AnnotationStore`](crate::store::AnnotationStore) and
//! [`Catalog`](crate::catalog::Catalog) ports. Failures never escape a view;
//! they become a [`Notice`] the user can dismiss.

mod collections;
mod home;
mod movie_card;
mod wishlist;

pub use collections::CollectionsView;
pub use home::{HomeEvent, HomeState, HomeView};
pub use movie_card::MovieCard;
pub use wishlist::WishlistView;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// A transient message shown until dismissed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self { kind: NoticeKind::Success, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { kind: NoticeKind::Error, message: message.into() }
    }

    pub fn is_error(&self) -> bool {
        self.kind == NoticeKind::Error
    }
}
