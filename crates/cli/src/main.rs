//! CLI for pagesel.
//!
//! Pipeline: load current page -> bulk select first N -> apply toggles -> render.

use clap::{Args, Parser, Subcommand};
use pagesel_core::{parse_count, Artwork, Identified, ItemId, Page, SelectionState};
use pagesel_provider::http::{DEFAULT_BASE_URL, DEFAULT_PAGE_SIZE};
use pagesel_provider::{BulkOutcome, BulkSelector, HttpPageLoader, MemoryPageLoader, PageLoader};
use std::time::Instant;

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser, Debug)]
#[command(name = "pagesel", version, about = "Cross-page selection over a paged collection")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Select the first N items starting at a page, fetching later pages as needed.
    Select {
        #[command(flatten)]
        source: Source,

        /// Page the selection starts from (1-based).
        #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        page: u32,

        /// How many items to select. Must be a positive integer.
        #[arg(short = 'n', long)]
        count: String,

        /// Stop after visiting this many pages.
        #[arg(long, default_value_t = pagesel_provider::bulk::DEFAULT_MAX_PAGES)]
        max_pages: u32,

        /// Ids to deselect after the bulk selection, as if unticked by hand.
        #[arg(long = "deselect", value_name = "ID")]
        deselect: Vec<u64>,

        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Print one page of the collection.
    Show {
        #[command(flatten)]
        source: Source,

        #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        page: u32,

        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

#[derive(Args, Debug)]
struct Source {
    #[arg(long, env = "PAGESEL_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    page_size: usize,

    /// Skip HTTP; page through this many generated artworks instead.
    #[arg(long, value_name = "TOTAL")]
    synthetic: Option<u64>,
}

struct SelectArgs {
    page: u32,
    count: i64,
    max_pages: u32,
    deselect: Vec<u64>,
    json: bool,
}

#[tokio::main]
async fn main() -> CliResult<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Select {
            source,
            page,
            count,
            max_pages,
            deselect,
            json,
        } => {
            // Rejected here, before anything is fetched.
            let count = parse_count(&count)?;
            let args = SelectArgs {
                page,
                count: i64::try_from(count)?,
                max_pages,
                deselect,
                json,
            };

            match source.synthetic {
                Some(total) => {
                    tracing::info!(total, "synthetic mode: paging in-memory artworks");
                    run_select(MemoryPageLoader::synthetic(total, source.page_size), args).await?
                }
                None => {
                    let loader =
                        HttpPageLoader::new(&source.base_url)?.with_page_size(source.page_size);
                    run_select(loader, args).await?
                }
            }
        }
        Commands::Show { source, page, json } => match source.synthetic {
            Some(total) => {
                run_show(MemoryPageLoader::synthetic(total, source.page_size), page, json).await?
            }
            None => {
                let loader =
                    HttpPageLoader::new(&source.base_url)?.with_page_size(source.page_size);
                run_show(loader, page, json).await?
            }
        },
    }

    Ok(())
}

async fn run_select<L>(loader: L, args: SelectArgs) -> CliResult<()>
where
    L: PageLoader<Item = Artwork>,
{
    let t0 = Instant::now();

    // 1. Load the page the user is looking at.
    let current = loader.fetch_page(args.page).await?;
    tracing::info!(
        page = args.page,
        items = current.len(),
        total = current.total,
        "loaded current page"
    );

    // 2. Bulk select, reusing the loaded page.
    let selector = BulkSelector::new(loader).with_max_pages(args.max_pages);
    let mut state = SelectionState::new();
    let outcome = selector
        .select_first_n(&mut state, args.count, &current, args.page)
        .await?;

    // 3. Manual toggles on top.
    for id in &args.deselect {
        state.set_selected(ItemId(*id), false);
    }

    tracing::info!(
        selection_count = state.selection_count(),
        elapsed_ms = t0.elapsed().as_millis(),
        "selection complete"
    );

    // 4. Re-derive the current page's display from the tracker.
    if args.json {
        println!("{}", serde_json::to_string_pretty(&select_summary(&current, &state, &outcome))?);
    } else {
        print!("{}", render_page(&current, &state));
        println!();
        println!("{}", describe_outcome(&outcome));
        println!("Selected: {} items", state.selection_count());
    }

    if let pagesel_provider::StopReason::FetchFailed(reason) = &outcome.stop {
        eprintln!("Bulk selection ended early: {reason}");
    }

    Ok(())
}

async fn run_show<L>(loader: L, page_index: u32, json: bool) -> CliResult<()>
where
    L: PageLoader<Item = Artwork>,
{
    let page = loader.fetch_page(page_index).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&page)?);
    } else {
        print!("{}", render_page(&page, &SelectionState::new()));
    }
    Ok(())
}

fn select_summary(
    page: &Page<Artwork>,
    state: &SelectionState,
    outcome: &BulkOutcome,
) -> serde_json::Value {
    let on_page: Vec<ItemId> = state
        .selected_on_page(&page.items)
        .into_iter()
        .map(Identified::id)
        .collect();

    serde_json::json!({
        "page_index": page.page_index,
        "total": page.total,
        "outcome": outcome,
        "selection_count": state.selection_count(),
        "selected_on_page": on_page,
        "page_all_selected": state.is_page_all_selected(&page.items),
    })
}

fn describe_outcome(outcome: &BulkOutcome) -> String {
    use pagesel_provider::StopReason;

    let why = match &outcome.stop {
        StopReason::Satisfied => "done".to_string(),
        StopReason::EndOfCollection => "reached end of collection".to_string(),
        StopReason::PageLimit => "hit the page cap".to_string(),
        StopReason::FetchFailed(reason) => format!("stopped early: {reason}"),
    };
    format!(
        "Bulk select: {}/{} selected over {} page(s), {why}",
        outcome.selected, outcome.requested, outcome.pages_visited
    )
}

fn render_page(page: &Page<Artwork>, state: &SelectionState) -> String {
    let mut out = String::new();
    let header = if state.is_page_all_selected(&page.items) {
        "[x]"
    } else {
        "[ ]"
    };
    out.push_str(&format!(
        "{header} Page {}/{} ({} items total)\n",
        page.page_index,
        page.total_pages(),
        page.total
    ));

    for art in &page.items {
        let mark = if state.is_selected(art.id) { "[x]" } else { "[ ]" };
        let title = art.title.as_deref().unwrap_or("(untitled)");
        let artist = art
            .artist_display
            .as_deref()
            .and_then(|a| a.lines().next())
            .unwrap_or("unknown artist");
        out.push_str(&format!("{mark} {:>8}  {title} | {artist}\n", art.id));
    }
    out
}
