use anyhow::Context;
use book_recommendation_service::{
    BookRecommendation, Config, RecommendOutcome, RecommendationModel, UserId,
};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> anyhow::Result<()> {
    // Load config
    let config = Config::from_env().context("Failed to load config")?;

    // Initialize tracing; RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.as_str()));
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    info!(
        "Starting book-recommendation-service (ratings={}, books={})",
        config.data.ratings_path, config.data.books_path
    );

    let model = RecommendationModel::from_config(&config)
        .context("Failed to build recommendation model")?;

    info!(
        ratings = model.store().ratings().len(),
        catalog = model.store().catalog_len(),
        filtered = model.filtered_ratings().len(),
        "Loaded sources"
    );
    if let Some(factors) = model.latent_factors() {
        info!(
            rank = factors.rank(),
            explained_variance_ratio = factors.explained_variance_ratio(),
            "Latent factors"
        );
    }

    let users = model.list_available_users();
    info!(available_users = users.len(), "Select a user to get recommendations");

    let selected = match (&config.user_id, users.first()) {
        (Some(id), _) => UserId::new(id.as_str()),
        (None, Some(first)) => first.clone(),
        (None, None) => {
            warn!("No users survived filtering, nothing to recommend");
            println!("No recommendations found.");
            return Ok(());
        }
    };

    println!("Recommended Books for user {}", selected);
    match model.recommend(&selected) {
        RecommendOutcome::Recommendations(books) => print_table(&books),
        outcome @ (RecommendOutcome::NotFound | RecommendOutcome::Empty) => {
            info!(user_id = %selected, outcome = outcome.as_str(), "No recommendations");
            println!("No recommendations found.");
        }
    }

    Ok(())
}

fn print_table(books: &[BookRecommendation]) {
    let title_width = books
        .iter()
        .map(|b| b.title.chars().count())
        .max()
        .unwrap_or(0)
        .max("Book-Title".len());

    println!("{:>2}  {:<width$}  Book-Author", "#", "Book-Title", width = title_width);
    for (i, book) in books.iter().enumerate() {
        println!(
            "{:>2}  {:<width$}  {}",
            i,
            book.title,
            book.author,
            width = title_width
        );
    }
}
