pub mod catalog;
pub mod config;
pub mod db;
pub mod entities;
pub mod error;
pub mod models;
pub mod routes;
pub mod store;
pub mod views;

use std::sync::Arc;

use crate::store::AnnotationStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn AnnotationStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn AnnotationStore>) -> Self {
        Self { store }
    }
}
