//! Pageflip CLI - Make picture books from a folder of images

mod commands;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use pageflip_core::Category;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// A page move given as `FROM:TO`, both 1-based page numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageMove {
    pub from: usize,
    pub to: usize,
}

/// Parse and validate a `FROM:TO` page move
fn parse_move(s: &str) -> Result<PageMove, String> {
    let (from, to) = s
        .split_once(':')
        .ok_or_else(|| format!("'{}' is not of the form FROM:TO", s))?;
    let page = |p: &str| -> Result<usize, String> {
        let n: usize = p
            .trim()
            .parse()
            .map_err(|_| format!("'{}' is not a valid page number", p))?;
        if n < 1 {
            Err("page numbers start at 1".to_string())
        } else {
            Ok(n)
        }
    };
    Ok(PageMove {
        from: page(from)?,
        to: page(to)?,
    })
}

#[derive(Parser)]
#[command(name = "pageflip")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Where books and page images are kept, and who is asking
#[derive(Args, Debug, Clone)]
pub struct LibraryArgs {
    /// Data directory (database and uploaded objects)
    #[arg(long, default_value = "./pageflip_data")]
    pub data_dir: PathBuf,

    /// User id the books belong to
    #[arg(short, long)]
    pub user: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a book from image files, in the order given
    Create {
        #[command(flatten)]
        library: LibraryArgs,

        /// Book title
        #[arg(short, long)]
        title: String,

        /// Book description
        #[arg(short, long, default_value = "")]
        description: String,

        /// Category (general, children, photo, comic)
        #[arg(short, long, default_value = "general")]
        category: Category,

        /// Move a page before uploading, e.g. `--move 3:1` (repeatable)
        #[arg(short = 'm', long = "move", value_parser = parse_move)]
        moves: Vec<PageMove>,

        /// Base URL uploaded pages are served from
        #[arg(long, default_value = "http://127.0.0.1:3000/files")]
        public_url: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Page image files
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// List your books
    List {
        #[command(flatten)]
        library: LibraryArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Flip through a book's pages
    Show {
        #[command(flatten)]
        library: LibraryArgs,

        /// Book id
        id: i64,

        /// Show only this page (1-based)
        #[arg(short, long)]
        page: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose {
        "pageflip_cli=debug,pageflip_core=debug"
    } else {
        "pageflip_cli=info"
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(filter))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Create {
            library,
            title,
            description,
            category,
            moves,
            public_url,
            json,
            files,
        } => {
            let details = pageflip_core::BookDetails {
                title,
                description,
                category,
            };
            commands::create(&library, details, &files, &moves, &public_url, json).await
        }

        Commands::List { library, json } => commands::list(&library, json),

        Commands::Show { library, id, page } => commands::show(&library, id, page),
    }
}
