use anyhow::{Context as AnyhowContext, Result};
use clap::{Args, Parser, Subcommand};
use context_indexer::{init_workspace, OpenMode, Workspace};
use context_search::ContextAssembler;
use serde_json::json;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "context")]
#[command(about = "Workspace index and token-budgeted context for coding agents", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Workspace root (defaults to current directory)
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create .localai/ with default config, rules, and ignore files
    Init,

    /// Open the workspace and report index statistics
    Index(JsonArgs),

    /// Reconcile the persisted index with the file tree and report the delta
    Refresh(JsonArgs),

    /// Assemble context for a task instruction
    Build(BuildArgs),

    /// Search indexed symbol names
    Symbols(SymbolsArgs),

    /// List files related to a file
    Related(RelatedArgs),
}

#[derive(Args)]
struct JsonArgs {
    /// Emit JSON on stdout
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct BuildArgs {
    /// Natural-language task
    instruction: String,

    /// File currently being edited, relative to the root
    #[arg(long)]
    active: Option<String>,

    /// Overview and rules only, no per-file ranking
    #[arg(long)]
    minimal: bool,
}

#[derive(Args)]
struct SymbolsArgs {
    /// Case-insensitive substring of the symbol name
    query: String,

    /// Emit JSON on stdout
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct RelatedArgs {
    /// File path relative to the root
    file: String,

    /// Emit JSON on stdout
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let mut cli = Cli::parse();

    // Keep stdout clean for JSON consumers.
    let json_output = match &cli.command {
        Commands::Index(args) => args.json,
        Commands::Refresh(args) => args.json,
        Commands::Symbols(args) => args.json,
        Commands::Related(args) => args.json,
        Commands::Init | Commands::Build(_) => false,
    };
    if json_output {
        cli.quiet = true;
    }

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    match cli.command {
        Commands::Init => run_init(&cli.root),
        Commands::Index(args) => run_index(&cli.root, args),
        Commands::Refresh(args) => run_refresh(&cli.root, args),
        Commands::Build(args) => run_build(&cli.root, args),
        Commands::Symbols(args) => run_symbols(&cli.root, args),
        Commands::Related(args) => run_related(&cli.root, args),
    }
}

fn open_workspace(root: &Path) -> Result<Workspace> {
    let mut workspace = Workspace::new(root)
        .with_context(|| format!("Failed to open workspace {}", root.display()))?;
    workspace.open();
    Ok(workspace)
}

fn print_json(value: &serde_json::Value) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("Failed to serialize output")?
    );
    Ok(())
}

fn run_init(root: &Path) -> Result<()> {
    init_workspace(root).with_context(|| format!("Failed to initialize {}", root.display()))?;
    println!("Initialized {}", root.join(context_indexer::STATE_DIR).display());
    Ok(())
}

fn run_index(root: &Path, args: JsonArgs) -> Result<()> {
    let mut workspace = Workspace::new(root)
        .with_context(|| format!("Failed to open workspace {}", root.display()))?;
    let report = workspace.open();

    if args.json {
        return print_json(&json!({
            "root": workspace.root(),
            "project_types": workspace.project_types(),
            "report": report,
            "stats": workspace.stats(),
        }));
    }

    println!("{}", workspace.get_structure_summary(40));
    println!();
    println!(
        "Indexed {} files in {} ms ({} changed, {} removed)",
        report.files, report.elapsed_ms, report.changed, report.removed
    );
    Ok(())
}

fn run_refresh(root: &Path, args: JsonArgs) -> Result<()> {
    let mut workspace = Workspace::new(root)
        .with_context(|| format!("Failed to open workspace {}", root.display()))?;
    let report = workspace.open();

    if args.json {
        return print_json(&json!(report));
    }

    if report.mode == OpenMode::FullScan {
        println!("No index cache found; scanned from scratch");
    }
    println!(
        "{} files, {} changed, {} removed",
        report.files, report.changed, report.removed
    );
    Ok(())
}

fn run_build(root: &Path, args: BuildArgs) -> Result<()> {
    let workspace = open_workspace(root)?;
    let assembler = ContextAssembler::new(&workspace);
    let context = if args.minimal {
        assembler.build_minimal()
    } else {
        assembler.build(&args.instruction, args.active.as_deref())
    };
    println!("{context}");
    Ok(())
}

fn run_symbols(root: &Path, args: SymbolsArgs) -> Result<()> {
    let workspace = open_workspace(root)?;
    let hits = workspace.search_symbols(&args.query);

    if args.json {
        let hits: Vec<_> = hits
            .iter()
            .map(|(path, symbol)| json!({ "path": path, "symbol": symbol }))
            .collect();
        return print_json(&json!({ "query": args.query, "hits": hits }));
    }

    for (path, symbol) in &hits {
        println!("{path}\t{symbol}");
    }
    Ok(())
}

fn run_related(root: &Path, args: RelatedArgs) -> Result<()> {
    let workspace = open_workspace(root)?;
    if workspace.record(&args.file).is_none() {
        anyhow::bail!("{} is not indexed", args.file);
    }
    let related = workspace.find_related_files(&args.file);

    if args.json {
        return print_json(&json!({ "file": args.file, "related": related }));
    }
    for path in &related {
        println!("{path}");
    }
    Ok(())
}
