//! Terminal front end: browse the catalog with your annotations on top.

use std::{sync::Arc, time::Duration};

use clap::{Parser, Subcommand, ValueEnum};
use cinenotes::{
    catalog::{Catalog, Category, MovieSummary, TmdbAuth, TmdbClient},
    config::Config,
    models::{CollectionId, MovieId, Rating},
    store::{AnnotationStore, LocalStore, RemoteStore},
    views::{CollectionsView, HomeView, MovieCard, Notice, WishlistView},
};

#[derive(Parser)]
#[command(name = "cinenotes-browse", about = "Browse movies with your notes, ratings and lists")]
struct Cli {
    /// Keep annotations in a file on this device instead of the annotation service.
    #[arg(long)]
    local: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, ValueEnum)]
enum CategoryArg {
    Popular,
    NowPlaying,
    Upcoming,
    TopRated,
}

impl From<CategoryArg> for Category {
    fn from(arg: CategoryArg) -> Self {
        match arg {
            CategoryArg::Popular => Category::Popular,
            CategoryArg::NowPlaying => Category::NowPlaying,
            CategoryArg::Upcoming => Category::Upcoming,
            CategoryArg::TopRated => Category::TopRated,
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// List a catalog category or search results.
    Home {
        #[arg(long, value_enum, default_value = "popular")]
        category: CategoryArg,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long)]
        search: Option<String>,
    },
    /// Show wishlisted movies.
    Wishlist,
    /// List collections, optionally opening one.
    Collections {
        #[arg(long)]
        open: Option<CollectionId>,
    },
    /// Create a collection.
    NewCollection { name: String },
    /// Delete a collection.
    DeleteCollection { id: CollectionId },
    /// Toggle a movie on the wishlist.
    Like { movie_id: MovieId },
    /// Rate a movie from 0 to 5.
    Rate { movie_id: MovieId, rating: i64 },
    /// Replace a movie's note.
    Note { movie_id: MovieId, note: String },
    /// Add a movie to a collection.
    Collect { collection_id: CollectionId, movie_id: MovieId },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".to_string()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    let http = reqwest::Client::builder()
        .user_agent("cinenotes/0.1")
        .timeout(Duration::from_secs(30))
        .build()?;

    let store: Arc<dyn AnnotationStore> = if cli.local {
        Arc::new(LocalStore::open(&config.local_store_path).await?)
    } else {
        Arc::new(RemoteStore::new(http.clone(), config.api_base_url.clone()))
    };

    let catalog: Arc<dyn Catalog> = Arc::new(TmdbClient::new(
        http,
        TmdbAuth::from_config(config.tmdb_access_token.clone(), config.tmdb_api_key.clone()),
        config.tmdb_base_url.clone(),
        config.tmdb_rps,
    ));

    match cli.command {
        Command::Home { category, page, search } => {
            let mut home = HomeView::new(catalog, config.search_debounce);
            match search {
                Some(query) => {
                    home.set_search_text(query);
                    home.set_page(page).await;
                },
                None => {
                    home.select_category(category.into()).await;
                    if page > 1 {
                        home.set_page(page).await;
                    }
                },
            }

            let state = home.state();
            if let Some(err) = &state.error {
                anyhow::bail!("{err}");
            }
            println!("{}", state.title());
            for movie in &state.movies {
                print_card(&store, movie.clone()).await?;
            }
            if state.total_pages > 1 {
                println!("Page {} of {}", state.page, state.total_pages);
            }
        },
        Command::Wishlist => {
            let mut view = WishlistView::new(store.clone(), catalog);
            view.load().await;
            report(view.notice.as_ref())?;
            if view.is_empty() {
                println!("Your wishlist is empty. Add some movies from the home page!");
            }
            for movie in view.movies {
                print_card(&store, movie.into()).await?;
            }
        },
        Command::Collections { open } => {
            let mut view = CollectionsView::new(store.clone(), catalog);
            view.load().await;
            if let Some(id) = open {
                view.select(id).await;
            }
            report(view.notice.as_ref())?;
            if view.collections.is_empty() {
                println!("No collections yet. Create one to get started!");
            }
            for c in &view.collections {
                println!("#{:<14} {}", c.id, c.name);
            }
            if let Some(selected) = &view.selected {
                println!("\nMovies in {}", selected.name);
                for movie in view.selected_movies.clone() {
                    print_card(&store, movie.into()).await?;
                }
            }
        },
        Command::NewCollection { name } => {
            let mut view = CollectionsView::new(store, catalog);
            view.new_name = name;
            view.create().await;
            report(view.notice.as_ref())?;
        },
        Command::DeleteCollection { id } => {
            let mut view = CollectionsView::new(store, catalog);
            view.delete(id).await;
            report(view.notice.as_ref())?;
        },
        Command::Like { movie_id } => {
            let mut card = card_for(store, &*catalog, movie_id).await?;
            card.toggle_like().await;
            report(card.notice.as_ref())?;
            println!("{}", if card.liked { "Added to wishlist" } else { "Removed from wishlist" });
        },
        Command::Rate { movie_id, rating } => {
            let rating = Rating::new(rating)?;
            let mut card = card_for(store, &*catalog, movie_id).await?;
            card.rate(rating).await;
            report(card.notice.as_ref())?;
        },
        Command::Note { movie_id, note } => {
            let mut card = card_for(store, &*catalog, movie_id).await?;
            card.open_note_dialog();
            card.edit_note(note);
            card.save_note().await;
            report(card.notice.as_ref())?;
        },
        Command::Collect { collection_id, movie_id } => {
            let mut card = card_for(store, &*catalog, movie_id).await?;
            card.open_collections_dialog();
            card.add_to_collection(collection_id).await;
            report(card.notice.as_ref())?;
        },
    }

    Ok(())
}

async fn card_for(
    store: Arc<dyn AnnotationStore>,
    catalog: &dyn Catalog,
    movie_id: MovieId,
) -> anyhow::Result<MovieCard> {
    let movie = catalog.details(movie_id).await?;
    let mut card = MovieCard::new(store, movie.into());
    card.load().await;
    // Actions toggle on the loaded overlay, so they must not run on a failed load.
    report(card.notice.as_ref())?;
    Ok(card)
}

async fn print_card(store: &Arc<dyn AnnotationStore>, movie: MovieSummary) -> anyhow::Result<()> {
    let mut card = MovieCard::new(store.clone(), movie);
    card.load().await;
    report(card.notice.as_ref())?;

    let stars: String =
        (0..Rating::MAX).map(|i| if i < card.rating.get() { '★' } else { '☆' }).collect();
    println!(
        "{} {:<8} {} ({}) {}{}",
        if card.liked { '♥' } else { ' ' },
        card.movie.id,
        card.movie.title,
        card.movie.release_year().unwrap_or("----"),
        stars,
        if card.has_note() { "  [has notes]" } else { "" },
    );
    Ok(())
}

fn report(notice: Option<&Notice>) -> anyhow::Result<()> {
    match notice {
        Some(n) if n.is_error() => anyhow::bail!("{}", n.message),
        Some(n) => {
            println!("{}", n.message);
            Ok(())
        },
        None => Ok(()),
    }
}
