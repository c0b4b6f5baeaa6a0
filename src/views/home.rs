use std::{sync::Arc, time::Duration};

use tokio::{
    sync::{mpsc, watch},
    time::Instant,
};
use tracing::{debug, warn};

use crate::catalog::{Catalog, Category, MAX_PAGES, MovieSummary};

const LIST_ERROR: &str = "Error fetching movies. Please try again later.";
const SEARCH_ERROR: &str = "Error searching movies. Please try again later.";

#[derive(Clone, Debug, PartialEq)]
pub struct HomeState {
    pub movies: Vec<MovieSummary>,
    pub loading: bool,
    pub error: Option<String>,
    pub category: Category,
    pub page: u32,
    pub total_pages: u32,
    pub search_query: String,
    pub is_searching: bool,
}

impl Default for HomeState {
    fn default() -> Self {
        Self {
            movies: Vec::new(),
            loading: true,
            error: None,
            category: Category::default(),
            page: 1,
            total_pages: 0,
            search_query: String::new(),
            is_searching: false,
        }
    }
}

impl HomeState {
    /// Heading above the grid, e.g. `Popular Movies`.
    pub fn title(&self) -> String {
        if self.is_searching {
            format!(
                "Search results for \"{}\" ({} movies found)",
                self.search_query,
                self.movies.len()
            )
        } else {
            format!("{} Movies", self.category.label())
        }
    }
}

/// User input the home view reacts to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum HomeEvent {
    SelectCategory(Category),
    SetPage(u32),
    SearchInput(String),
    ClearSearch,
}

/// Browsing and searching the catalog.
pub struct HomeView {
    catalog: Arc<dyn Catalog>,
    debounce: Duration,
    state: HomeState,
}

impl HomeView {
    pub fn new(catalog: Arc<dyn Catalog>, debounce: Duration) -> Self {
        Self { catalog, debounce, state: HomeState::default() }
    }

    pub fn state(&self) -> &HomeState {
        &self.state
    }

    pub async fn select_category(&mut self, category: Category) {
        self.state.search_query.clear();
        self.state.is_searching = false;
        self.state.category = category;
        self.state.page = 1;
        self.refresh().await;
    }

    pub async fn set_page(&mut self, page: u32) {
        self.state.page = page.clamp(1, MAX_PAGES);
        self.refresh().await;
    }

    /// Records new search text without querying the catalog.
    pub fn set_search_text(&mut self, query: impl Into<String>) {
        self.state.search_query = query.into();
        self.state.is_searching = !self.state.search_query.trim().is_empty();
        self.state.page = 1;
    }

    pub async fn clear_search(&mut self) {
        self.set_search_text(String::new());
        self.refresh().await;
    }

    /// Loads the current page of either the search results or the active category.
    pub async fn refresh(&mut self) {
        self.state.loading = true;
        self.state.error = None;

        let page = self.state.page;
        let (result, error_message) = if self.state.is_searching {
            (self.catalog.search(&self.state.search_query, page).await, SEARCH_ERROR)
        } else {
            (self.catalog.list(self.state.category, page).await, LIST_ERROR)
        };

        match result {
            Ok(resp) => {
                self.state.movies = resp.results;
                self.state.total_pages = resp.total_pages.min(MAX_PAGES);
            },
            Err(err) => {
                warn!(error = %err, page, "failed to load movies");
                self.state.error = Some(error_message.to_string());
            },
        }
        self.state.loading = false;
    }

    /// Drives the view from `events`, publishing every new state to `states`.
    ///
    /// Search input is debounced: a query is only issued once no further
    /// input arrived for the debounce interval. Returns when `events` closes.
    pub async fn run(mut self, mut events: mpsc::Receiver<HomeEvent>, states: watch::Sender<HomeState>) {
        self.refresh().await;
        states.send_replace(self.state.clone());

        let mut pending_search: Option<Instant> = None;

        loop {
            let event = match pending_search {
                Some(deadline) => tokio::select! {
                    event = events.recv() => event,
                    _ = tokio::time::sleep_until(deadline) => {
                        pending_search = None;
                        debug!(query = %self.state.search_query, "debounced search");
                        self.refresh().await;
                        states.send_replace(self.state.clone());
                        continue;
                    }
                },
                None => events.recv().await,
            };

            let Some(event) = event else { break };

            match event {
                HomeEvent::SearchInput(query) => {
                    self.set_search_text(query);
                    if self.state.is_searching {
                        pending_search = Some(Instant::now() + self.debounce);
                    } else {
                        pending_search = None;
                        self.refresh().await;
                    }
                },
                HomeEvent::SelectCategory(category) => {
                    pending_search = None;
                    self.select_category(category).await;
                },
                HomeEvent::SetPage(page) => {
                    pending_search = None;
                    self.set_page(page).await;
                },
                HomeEvent::ClearSearch => {
                    pending_search = None;
                    self.clear_search().await;
                },
            }

            states.send_replace(self.state.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::fakes::FakeCatalog;

    fn view(catalog: Arc<FakeCatalog>) -> HomeView {
        HomeView::new(catalog, Duration::from_millis(500))
    }

    #[tokio::test]
    async fn refresh_lists_active_category() {
        let catalog = Arc::new(FakeCatalog::with_movies(&[(1, "A"), (2, "B")]));
        let mut home = view(catalog.clone());

        home.refresh().await;

        assert_eq!(catalog.calls(), vec!["list:Popular:1"]);
        assert_eq!(home.state().movies.len(), 2);
        assert_eq!(home.state().total_pages, 3);
        assert!(!home.state().loading);
        assert_eq!(home.state().title(), "Popular Movies");
    }

    #[tokio::test]
    async fn selecting_category_clears_search_and_resets_page() {
        let catalog = Arc::new(FakeCatalog::with_movies(&[(1, "A")]));
        let mut home = view(catalog.clone());
        home.set_search_text("alien");
        home.set_page(2).await;

        home.select_category(Category::TopRated).await;

        assert_eq!(home.state().page, 1);
        assert!(!home.state().is_searching);
        assert!(home.state().search_query.is_empty());
        assert_eq!(catalog.calls(), vec!["search:alien:2", "list:Top Rated:1"]);
    }

    #[tokio::test]
    async fn blank_search_falls_back_to_category() {
        let catalog = Arc::new(FakeCatalog::with_movies(&[(1, "A")]));
        let mut home = view(catalog.clone());
        home.set_search_text("   ");
        home.refresh().await;

        assert!(!home.state().is_searching);
        assert_eq!(catalog.calls(), vec!["list:Popular:1"]);
    }

    #[tokio::test]
    async fn failures_become_an_error_state() {
        let catalog =
            Arc::new(FakeCatalog { fail_listing: true, ..FakeCatalog::with_movies(&[]) });
        let mut home = view(catalog);

        home.refresh().await;
        assert_eq!(home.state().error.as_deref(), Some(LIST_ERROR));

        home.set_search_text("x");
        home.refresh().await;
        assert_eq!(home.state().error.as_deref(), Some(SEARCH_ERROR));
        assert!(!home.state().loading);
    }

    #[tokio::test(start_paused = true)]
    async fn search_input_is_debounced() {
        let catalog = Arc::new(FakeCatalog::with_movies(&[(1, "Alien")]));
        let (tx, rx) = mpsc::channel(16);
        let (states_tx, mut states) = watch::channel(HomeState::default());
        let task = tokio::spawn(view(catalog.clone()).run(rx, states_tx));

        states.changed().await.unwrap();
        for partial in ["a", "al", "ali", "alie", "alien"] {
            tx.send(HomeEvent::SearchInput(partial.to_string())).await.unwrap();
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
        tokio::time::sleep(Duration::from_millis(600)).await;

        drop(tx);
        task.await.unwrap();

        assert_eq!(catalog.calls(), vec!["list:Popular:1", "search:alien:1"]);
        let last = states.borrow().clone();
        assert!(last.is_searching);
        assert_eq!(last.title(), "Search results for \"alien\" (1 movies found)");
    }

    #[tokio::test(start_paused = true)]
    async fn clearing_search_cancels_pending_query() {
        let catalog = Arc::new(FakeCatalog::with_movies(&[(1, "Alien")]));
        let (tx, rx) = mpsc::channel(16);
        let (states_tx, _states) = watch::channel(HomeState::default());
        let task = tokio::spawn(view(catalog.clone()).run(rx, states_tx));

        tx.send(HomeEvent::SearchInput("ali".into())).await.unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        tx.send(HomeEvent::ClearSearch).await.unwrap();
        tokio::time::sleep(Duration::from_millis(1_000)).await;

        drop(tx);
        task.await.unwrap();

        assert_eq!(catalog.calls(), vec!["list:Popular:1", "list:Popular:1"]);
    }
}
