use std::{
    collections::HashSet,
    fs::{self, File},
    io,
    path::PathBuf,
    process,
};

use clap::{Args, Parser, Subcommand};
use genealogy_tui::{
    config::Config,
    error::Result,
    family::{build_tree_view, FamilyIndex, PersonId, TreeData, ViewFilter, ViewMode},
    tui::{self, InitialView},
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "genealogy-tui")]
#[command(about = "Terminal family-tree viewer")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse a tree snapshot interactively
    View {
        /// JSON snapshot with `people`, `families` and `children`
        file: PathBuf,
        #[command(flatten)]
        opts: ViewOptions,
    },
    /// Print the computed layout as JSON
    Layout {
        file: PathBuf,
        #[command(flatten)]
        opts: ViewOptions,
        /// Indent the output
        #[arg(long)]
        pretty: bool,
    },
}

#[derive(Args)]
struct ViewOptions {
    #[arg(long, value_enum, default_value_t = ViewMode::All)]
    mode: ViewMode,
    /// Person the ancestors/descendants modes start from
    #[arg(long)]
    focus: Option<PersonId>,
    /// Show only this person's branch
    #[arg(long)]
    root: Option<PersonId>,
    /// Collapse a person's descendants (repeatable); disables auto-collapse
    #[arg(long)]
    collapse: Vec<PersonId>,
    /// Settings file instead of the default location
    #[arg(long)]
    config: Option<PathBuf>,
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("genealogy_tui=info"))
}

/// The TUI owns the terminal, so logs go to the cache directory.
fn init_file_logging() {
    let Some(dir) = dirs::cache_dir().map(|dir| dir.join("genealogy-tui")) else {
        return;
    };
    let Ok(log_file) =
        fs::create_dir_all(&dir).and_then(|()| File::create(dir.join("genealogy-tui.log")))
    else {
        return;
    };
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(log_file)
        .with_ansi(true)
        .with_target(false)
        .pretty()
        .init();
}

fn init_stderr_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

async fn view(file: PathBuf, opts: ViewOptions) -> Result<()> {
    let config = Config::load(opts.config.as_deref())?;
    let data = TreeData::load(&file)?;
    let initial = InitialView {
        mode: opts.mode,
        focus: opts.focus,
        branch_root: opts.root,
        collapse: opts.collapse,
    };
    tui::run(data, config, initial).await
}

fn layout(file: PathBuf, opts: ViewOptions, pretty: bool) -> Result<()> {
    let config = Config::load(opts.config.as_deref())?;
    let data = TreeData::load(&file)?;

    let collapsed: HashSet<PersonId> = if opts.collapse.is_empty() {
        let index = FamilyIndex::build(&data);
        config.auto_collapse.initial_collapsed(&data, &index)
    } else {
        opts.collapse.into_iter().collect()
    };
    let filter = ViewFilter {
        mode: opts.mode,
        focus: opts.focus,
        branch_root: opts.root,
    };
    let view = build_tree_view(&data, &filter, &collapsed, &config.layout);

    let json = if pretty {
        serde_json::to_string_pretty(&view)?
    } else {
        serde_json::to_string(&view)?
    };
    println!("{json}");
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::View { file, opts } => {
            init_file_logging();
            view(file, opts).await
        }
        Commands::Layout { file, opts, pretty } => {
            init_stderr_logging();
            layout(file, opts, pretty)
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
