//! Interactive mode: typed queries are debounced, `:` lines are commands.

use std::io::BufRead;
use std::time::{Duration, Instant};

use anyhow::Result;
use tokio::sync::mpsc;

use bookscout_catalog::Debouncer;
use bookscout_catalog::debounce::query_or_wildcard;
use bookscout_core::{AppConfig, Book, SortKey, WILDCARD_QUERY};

use crate::{open_favorites, open_history, new_session, print_results};

const HELP: &str = "\
Type to search. Commands:
  :n / :p        next / previous page
  :g <page>      go to page
  :f <n>         toggle favorite for result n
  :s <sort>      relevance, title, title-desc, newest, oldest, editions, pages
  :h             recent searches
  :q             quit";

enum PageMove {
    Next,
    Prev,
    To(u32),
}

impl PageMove {
    fn target(self, current: u32) -> u32 {
        match self {
            Self::Next => current.saturating_add(1),
            Self::Prev => current.saturating_sub(1),
            Self::To(page) => page,
        }
    }
}

enum Command {
    Page(PageMove),
    Favorite(usize),
    Sort(SortKey),
    History,
    Help,
    Quit,
}

fn parse_command(line: &str) -> std::result::Result<Command, String> {
    let mut parts = line.trim_start_matches(':').split_whitespace();
    let cmd = parts.next().unwrap_or_default();
    let arg = parts.next();
    match (cmd, arg) {
        ("n", None) => Ok(Command::Page(PageMove::Next)),
        ("p", None) => Ok(Command::Page(PageMove::Prev)),
        ("g", Some(n)) => n
            .parse()
            .map(|p| Command::Page(PageMove::To(p)))
            .map_err(|_| format!("not a page number: {n}")),
        ("f", Some(n)) => match n.parse::<usize>() {
            Ok(i) if i >= 1 => Ok(Command::Favorite(i - 1)),
            _ => Err(format!("not a result number: {n}")),
        },
        ("s", Some(key)) => key.parse().map(Command::Sort).map_err(|e| format!("{e}")),
        ("h", None) => Ok(Command::History),
        ("?", None) | ("help", None) => Ok(Command::Help),
        ("q", None) | ("quit", None) => Ok(Command::Quit),
        _ => Err(format!("unknown command: {line} (:? for help)")),
    }
}

pub async fn run(config: &AppConfig) -> Result<()> {
    let mut session = new_session(config)?;
    let mut favorites = open_favorites(config)?;
    let mut history = open_history(config)?;
    let mut debouncer: Debouncer<String> =
        Debouncer::new(Duration::from_millis(config.search.debounce_ms));
    let mut sort = SortKey::Relevance;
    let mut displayed: Vec<Book> = Vec::new();

    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });

    println!("{HELP}");
    session.fetch(WILDCARD_QUERY, 1).await;
    render(&session, &favorites, sort, &mut displayed);

    loop {
        let deadline = debouncer.deadline();
        tokio::select! {
            line = rx.recv() => {
                let Some(line) = line else { break };
                let line = line.trim().to_string();
                if !line.starts_with(':') {
                    debouncer.submit(line);
                    continue;
                }
                let command = match parse_command(&line) {
                    Ok(c) => c,
                    Err(msg) => {
                        eprintln!("{msg}");
                        continue;
                    }
                };
                let query = session.state().query.clone();
                let pagination = session.state().pagination;
                match command {
                    Command::Quit => break,
                    Command::Help => println!("{HELP}"),
                    Command::History => {
                        for (i, term) in history.terms().iter().enumerate() {
                            println!("{:>2}. {term}", i + 1);
                        }
                    }
                    Command::Sort(key) => {
                        sort = key;
                        render(&session, &favorites, sort, &mut displayed);
                    }
                    Command::Favorite(i) => match displayed.get(i) {
                        Some(book) => {
                            let added = favorites.toggle(book)?;
                            let verb = if added { "Added" } else { "Removed" };
                            println!("{verb}: {}", book.title);
                        }
                        None => eprintln!("no result #{}", i + 1),
                    },
                    Command::Page(step) => {
                        let target = step.target(pagination.page);
                        if !pagination.contains(target) {
                            eprintln!("page {target} is out of range (1..={})", pagination.total_pages());
                            continue;
                        }
                        session.go_to_page(target, &query).await;
                        render(&session, &favorites, sort, &mut displayed);
                    }
                }
            }
            _ = sleep_until(deadline), if deadline.is_some() => {
                if let Some(input) = debouncer.poll_ready(Instant::now()) {
                    let query = query_or_wildcard(&input).to_string();
                    if query != WILDCARD_QUERY {
                        history.add(&query)?;
                    }
                    session.fetch(&query, 1).await;
                    render(&session, &favorites, sort, &mut displayed);
                }
            }
        }
    }

    Ok(())
}

async fn sleep_until(deadline: Option<Instant>) {
    if let Some(deadline) = deadline {
        tokio::time::sleep_until(tokio::time::Instant::from_std(deadline)).await;
    }
}

fn render(
    session: &crate::Session,
    favorites: &crate::FavoriteStore,
    sort: SortKey,
    displayed: &mut Vec<Book>,
) {
    let state = session.state();
    *displayed = sort.sorted(&state.books);
    println!();
    print_results(state, displayed, favorites);
}
