use std::time::Instant;

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};

use bookscout_catalog::{FallbackGateway, OpenLibraryGateway, SearchSession, SessionState};
use bookscout_core::error::{CoreError, ExitCode};
use bookscout_core::format::{
    CoverSize, cover_url, format_authors, format_pages, format_publisher, format_year,
    language_name, truncate_text,
};
use bookscout_core::{
    AppConfig, Book, BookFilter, Favorites, FilterOptions, JsonFileStore, LibraryStats,
    PageRange, Pagination, SearchHistory, SortKey,
};

mod browse;

type Session = SearchSession<FallbackGateway<OpenLibraryGateway>>;
type FavoriteStore = Favorites<JsonFileStore<Vec<Book>>>;
type HistoryStore = SearchHistory<JsonFileStore<Vec<String>>>;

// ─── CLI Definition ─────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "bookscout",
    about = "Search the Open Library catalog, bookmark favorites, browse offline samples",
    version,
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Output in JSON format. Also enabled by setting BOOKSCOUT_JSON=1.
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Search the catalog (omit the query to browse everything).
    Search {
        query: Option<String>,
        #[arg(long, default_value = "1")]
        page: u32,
        #[command(flatten)]
        view: ViewArgs,
    },

    /// Show details for a book by key (e.g. /works/OL47804W).
    Show { key: String },

    /// Favorites management.
    Fav {
        #[command(subcommand)]
        action: FavAction,
    },

    /// Show or clear recent searches.
    History {
        #[arg(long)]
        clear: bool,
    },

    /// Aggregate statistics for a search.
    Stats { query: Option<String> },

    /// Interactive search with debounced input.
    Browse,

    /// Config management.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Client-side filter and sort applied to the fetched page.
#[derive(clap::Args)]
struct ViewArgs {
    /// relevance, title, title-desc, newest, oldest, editions, pages
    #[arg(long, default_value = "relevance")]
    sort: String,
    /// First year of a decade, e.g. 1950.
    #[arg(long)]
    decade: Option<i32>,
    /// all, 0-200, 201-400, 401-600, 601+
    #[arg(long, default_value = "all")]
    pages: String,
    #[arg(long)]
    publisher: Option<String>,
    #[arg(long)]
    subject: Option<String>,
    /// ISO 639-2 code, e.g. eng, por.
    #[arg(long)]
    language: Option<String>,
}

impl ViewArgs {
    fn filter(&self) -> Result<BookFilter> {
        Ok(BookFilter {
            decade: self.decade,
            page_range: self.pages.parse::<PageRange>()?,
            publisher: self.publisher.clone(),
            subject: self.subject.clone(),
            language: self.language.clone(),
        })
    }

    fn apply(&self, books: &[Book]) -> Result<Vec<Book>> {
        let sort: SortKey = self.sort.parse()?;
        let mut out = self.filter()?.apply(books);
        sort.sort(&mut out);
        Ok(out)
    }
}

#[derive(Subcommand)]
enum FavAction {
    /// List favorites.
    List,
    /// Add or remove a book. Non-favorites are looked up with --query.
    Toggle {
        key: String,
        #[arg(long)]
        query: Option<String>,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the config file path.
    Path,
    /// Show the effective config.
    Show,
    /// Write the effective config to the config file.
    Init,
}

// ─── Main ────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let start = Instant::now();
    let cli = Cli::parse();
    let json_output = cli.json || std::env::var("BOOKSCOUT_JSON").as_deref() == Ok("1");
    let config = AppConfig::load()?;

    match cli.command {
        None => {
            browse::run(&config).await?;
        }

        // ── Search ─────────────────────────────────────────────────────────

        Some(Commands::Search { query, page, view }) => {
            let query = query.unwrap_or_default();
            let query = bookscout_catalog::debounce::query_or_wildcard(&query).to_string();
            let mut history = open_history(&config)?;
            if query != bookscout_core::WILDCARD_QUERY {
                history.add(&query)?;
            }

            let mut session = new_session(&config)?;
            session.go_to_page(page, &query).await;
            if page != 1 {
                let pagination = session.state().pagination;
                if !landed_on(&pagination, page) {
                    let total = pagination.total_pages();
                    if json_output {
                        print_json(&serde_json::json!({
                            "status": "error",
                            "error": "page_out_of_range",
                            "message": format!("page {page} is outside 1..={total}"),
                        }))?;
                    } else {
                        eprintln!("Page {page} is out of range (1..={total}).");
                    }
                    std::process::exit(ExitCode::InvalidArgs as i32);
                }
            }

            let state = session.state();
            let books = view.apply(&state.books)?;
            let favorites = open_favorites(&config)?;
            let dur = start.elapsed().as_millis();
            let status = if state.error.is_some() { "error" } else { "ok" };

            if json_output {
                print_json(&serde_json::json!({
                    "status": status,
                    "data": {
                        "items": books,
                        "query": state.query,
                        "offline": state.offline,
                        "error": state.error,
                        "pagination": {
                            "page": state.pagination.page,
                            "total_results": state.pagination.total_results,
                            "limit": state.pagination.limit,
                            "total_pages": state.pagination.total_pages(),
                        },
                        "filters": FilterOptions::from_books(&state.books),
                    },
                    "meta": { "duration_ms": dur }
                }))?;
            } else {
                print_results(state, &books, &favorites);
            }
        }

        // ── Show ───────────────────────────────────────────────────────────

        Some(Commands::Show { key }) => {
            let favorites = open_favorites(&config)?;
            let known = favorites
                .get(&key)
                .cloned()
                .or_else(|| {
                    bookscout_core::sample::sample_books()
                        .into_iter()
                        .find(|b| b.key == key)
                });
            let session = new_session(&config)?;
            let details = match session.source().inner().work_details(&key).await {
                Ok(d) => Some(d),
                Err(e) => {
                    tracing::warn!("could not load work {key}: {e}");
                    None
                }
            };
            if known.is_none() && details.is_none() {
                eprintln!("{}", CoreError::BookNotFound(key.clone()));
                std::process::exit(ExitCode::NotFound as i32);
            }
            let dur = start.elapsed().as_millis();

            if json_output {
                print_json(&serde_json::json!({
                    "status": "ok",
                    "data": {
                        "book": known,
                        "details": details,
                        "favorite": favorites.is_favorite(&key),
                    },
                    "meta": { "duration_ms": dur }
                }))?;
            } else {
                if let Some(book) = &known {
                    print_book(book, favorites.is_favorite(&key));
                }
                if let Some(details) = &details {
                    if known.is_none() {
                        println!("{}", details.title);
                    }
                    if let Some(date) = &details.first_publish_date {
                        println!("  First published: {date}");
                    }
                    if !details.subjects.is_empty() {
                        let subjects: Vec<&str> =
                            details.subjects.iter().take(8).map(String::as_str).collect();
                        println!("  Subjects:  {}", subjects.join(", "));
                    }
                    if let Some(desc) = &details.description {
                        println!();
                        println!("{}", truncate_text(desc, 600));
                    }
                }
            }
        }

        // ── Favorites ──────────────────────────────────────────────────────

        Some(Commands::Fav { action }) => match action {
            FavAction::List => {
                let favorites = open_favorites(&config)?;
                let dur = start.elapsed().as_millis();
                if json_output {
                    print_json(&serde_json::json!({
                        "status": "ok",
                        "data": { "items": favorites.list(), "total": favorites.len() },
                        "meta": { "duration_ms": dur }
                    }))?;
                } else if favorites.is_empty() {
                    println!("No favorites yet. Use `bookscout fav toggle <key>` to add one.");
                } else {
                    for book in favorites.list() {
                        print_row(None, book, true);
                    }
                }
            }
            FavAction::Toggle { key, query } => {
                let mut favorites = open_favorites(&config)?;
                let book = match favorites.get(&key) {
                    Some(book) => book.clone(),
                    None => {
                        let query = query.as_deref().unwrap_or(bookscout_core::WILDCARD_QUERY);
                        let mut session = new_session(&config)?;
                        let state = session.fetch(query, 1).await;
                        match state.books.iter().find(|b| b.key == key) {
                            Some(book) => book.clone(),
                            None => {
                                eprintln!("Book {key} not found in results for '{query}'.");
                                std::process::exit(ExitCode::NotFound as i32);
                            }
                        }
                    }
                };
                let now_favorite = favorites.toggle(&book)?;
                let dur = start.elapsed().as_millis();
                if json_output {
                    print_json(&serde_json::json!({
                        "status": "ok",
                        "data": { "key": book.key, "favorite": now_favorite },
                        "meta": { "duration_ms": dur }
                    }))?;
                } else if now_favorite {
                    println!("Added to favorites: {}", book.title);
                } else {
                    println!("Removed from favorites: {}", book.title);
                }
            }
        },

        // ── History ────────────────────────────────────────────────────────

        Some(Commands::History { clear }) => {
            let mut history = open_history(&config)?;
            if clear {
                history.clear()?;
            }
            let dur = start.elapsed().as_millis();
            if json_output {
                print_json(&serde_json::json!({
                    "status": "ok",
                    "data": { "items": history.terms(), "max_size": history.max_size() },
                    "meta": { "duration_ms": dur }
                }))?;
            } else if history.terms().is_empty() {
                println!("No recent searches.");
            } else {
                for (i, term) in history.terms().iter().enumerate() {
                    println!("{:>2}. {term}", i + 1);
                }
            }
        }

        // ── Stats ──────────────────────────────────────────────────────────

        Some(Commands::Stats { query }) => {
            let query = query.unwrap_or_default();
            let query = bookscout_catalog::debounce::query_or_wildcard(&query);
            let mut session = new_session(&config)?;
            let state = session.fetch(query, 1).await;
            if let Some(err) = &state.error {
                bail!("search failed: {err}");
            }
            let stats = LibraryStats::compute(&state.books);
            let dur = start.elapsed().as_millis();

            if json_output {
                print_json(&serde_json::json!({
                    "status": "ok",
                    "data": { "query": query, "offline": state.offline, "stats": stats },
                    "meta": { "duration_ms": dur }
                }))?;
            } else {
                print_stats(&stats, state.offline);
            }
        }

        Some(Commands::Browse) => {
            browse::run(&config).await?;
        }

        // ── Config ─────────────────────────────────────────────────────────

        Some(Commands::Config { action }) => match action {
            ConfigAction::Path => {
                println!("{}", AppConfig::config_path().display());
            }
            ConfigAction::Init => {
                config.save()?;
                println!("Wrote {}", AppConfig::config_path().display());
            }
            ConfigAction::Show => {
                if json_output {
                    print_json(&serde_json::to_value(&config)?)?;
                } else {
                    print!("{}", toml::to_string_pretty(&config)?);
                }
            }
        },
    }

    Ok(())
}

// ─── Helpers ────────────────────────────────────────────────────────────────

/// Whether a fetch for `requested` actually produced that page. The offline
/// sample always answers with page 1.
fn landed_on(pagination: &Pagination, requested: u32) -> bool {
    pagination.page == requested && pagination.contains(requested)
}

fn print_json(val: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(val)?);
    Ok(())
}

fn new_session(config: &AppConfig) -> Result<Session> {
    let gateway = OpenLibraryGateway::from_config(&config.catalog)?;
    Ok(SearchSession::with_page_size(
        FallbackGateway::new(gateway),
        config.catalog.page_size,
    ))
}

fn open_favorites(config: &AppConfig) -> Result<FavoriteStore> {
    Ok(Favorites::load(JsonFileStore::new(config.favorites_path()))?)
}

fn open_history(config: &AppConfig) -> Result<HistoryStore> {
    Ok(SearchHistory::load(
        JsonFileStore::new(config.history_path()),
        config.history.max_size,
    )?)
}

fn print_row(index: Option<usize>, book: &Book, favorite: bool) {
    let mark = if favorite { '*' } else { ' ' };
    let idx = index.map(|i| format!("{:>3}.", i + 1)).unwrap_or_default();
    println!(
        "{idx}{mark} {title:<40}  {authors:<28}  {year:<12}  {key}",
        title = truncate_text(&book.title, 38),
        authors = truncate_text(&format_authors(&book.authors), 26),
        year = format_year(book.first_publish_year),
        key = book.key,
    );
}

fn print_results(state: &SessionState, books: &[Book], favorites: &FavoriteStore) {
    if let Some(err) = &state.error {
        eprintln!("Error: {err}");
        return;
    }
    if state.offline && !state.books.is_empty() {
        println!("Offline mode: the catalog is unreachable, showing sample books.");
        println!();
    }
    if books.is_empty() {
        println!("No books found for: {}", state.query);
        return;
    }
    for (i, book) in books.iter().enumerate() {
        print_row(Some(i), book, favorites.is_favorite(&book.key));
    }
    let p = state.pagination;
    if p.total_pages() > 1 {
        println!();
        println!(
            "Page {} of {} • {} results",
            p.page,
            p.total_pages(),
            p.total_results
        );
    }
}

fn print_book(book: &Book, favorite: bool) {
    println!("{}{}", book.title, if favorite { "  [favorite]" } else { "" });
    println!("  Authors:   {}", format_authors(&book.authors));
    println!("  Year:      {}", format_year(book.first_publish_year));
    println!("  Pages:     {}", format_pages(book.median_pages));
    println!("  Publisher: {}", format_publisher(&book.publishers));
    println!("  Editions:  {}", book.edition_count);
    if !book.languages.is_empty() {
        let langs: Vec<&str> = book.languages.iter().map(|c| language_name(c)).collect();
        println!("  Languages: {}", langs.join(", "));
    }
    if let Some(url) = cover_url(book.cover_id, CoverSize::Large) {
        println!("  Cover:     {url}");
    }
    println!("  Key:       {}", book.key);
}

fn print_stats(stats: &LibraryStats, offline: bool) {
    if offline {
        println!("(offline sample data)");
    }
    println!("Search statistics:");
    println!("  Books on page:   {}", stats.total);
    println!("  With known year: {}", stats.with_year);
    if let (Some(oldest), Some(newest)) = (stats.oldest_year, stats.newest_year) {
        println!("  Years:           {oldest} – {newest}");
    }
    if let Some(avg) = stats.average_pages {
        println!("  Average pages:   {avg:.0}");
    }
    if !stats.top_authors.is_empty() {
        println!("  Top authors:");
        for (author, count) in &stats.top_authors {
            println!("    {count:>3}  {author}");
        }
    }
    if stats.decades.is_empty() {
        println!("  Not enough data for a decade chart.");
        return;
    }
    println!("  Books per decade:");
    let max = stats.decades.iter().map(|b| b.count).max().unwrap_or(1);
    for bucket in &stats.decades {
        let width = (bucket.count * 30).div_ceil(max);
        println!("    {:>6}  {:<30}  {}", bucket.label(), "#".repeat(width), bucket.count);
    }
}
