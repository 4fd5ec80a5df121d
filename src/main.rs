use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use sheet_dashboard::config::DashboardConfig;
use sheet_dashboard::io::SheetReader;
use sheet_dashboard::io::google::GoogleSheets;
use sheet_dashboard::io::workbook::WorkbookStore;
use sheet_dashboard::model::Identity;
use sheet_dashboard::session::{Dashboard, DashboardSnapshot};
use sheet_dashboard::{Result, SheetError};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(error) = run(cli).await {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    init_logging()?;
    match cli.command {
        Command::Show(args) => execute_show(args).await,
        Command::Export(args) => execute_export(args).await,
    }
}

fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| SheetError::Logging(err.to_string()))
}

async fn execute_show(args: ViewArgs) -> Result<()> {
    let config = DashboardConfig::load(&args.config)?;
    match args.store {
        StoreKind::Google => {
            let dashboard = open(GoogleSheets::new(&config)?, config, &args).await?;
            print_snapshot(&dashboard.snapshot().await);
        }
        StoreKind::Workbook => {
            let store = WorkbookStore::new(&args.workbook_dir);
            let dashboard = open(store, config, &args).await?;
            print_snapshot(&dashboard.snapshot().await);
        }
    }
    Ok(())
}

async fn execute_export(args: ExportArgs) -> Result<()> {
    let view = &args.view;
    let config = DashboardConfig::load(&view.config)?;
    let exported = match view.store {
        StoreKind::Google => {
            let token = args.access_token.as_deref().ok_or_else(|| {
                SheetError::NotAuthorized("--access-token is required for the google store".into())
            })?;
            let sheets = GoogleSheets::new(&config)?;
            let writer = sheets.authorize(token).await?;
            let dashboard = open(sheets, config, view).await?;
            dashboard.export(&writer).await?
        }
        StoreKind::Workbook => {
            let dashboard = open(WorkbookStore::new(&view.workbook_dir), config, view).await?;
            dashboard.export(dashboard.reader()).await?
        }
    };

    println!("Data exported successfully to the new spreadsheet!");
    println!("{} rows written. You can view it here: {}", exported.row_count, exported.url);
    Ok(())
}

/// Loads the sheet and replays the intents given on the command line.
async fn open<R: SheetReader>(
    reader: R,
    config: DashboardConfig,
    args: &ViewArgs,
) -> Result<Dashboard<R>> {
    let mut dashboard = Dashboard::new(reader, config)?;
    if let Some(path) = &args.identity {
        dashboard = dashboard.with_identity(load_identity(path)?);
    }

    dashboard.reload().await?;
    if let Some(term) = &args.search {
        dashboard.set_search_term(term).await;
    }
    for field in &args.sort {
        dashboard.sort_by(field).await;
    }
    Ok(dashboard)
}

fn load_identity(path: &Path) -> Result<Identity> {
    if !path.exists() {
        return Err(SheetError::MissingInput(path.to_path_buf()));
    }
    let data = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}

fn print_snapshot(snapshot: &DashboardSnapshot) {
    if let Some(greeting) = &snapshot.greeting {
        println!("{greeting}");
    }
    println!("{}", snapshot.columns.join("\t"));
    for record in &snapshot.records {
        let cells: Vec<&str> = snapshot
            .columns
            .iter()
            .map(|column| record.get(column).unwrap_or_default())
            .collect();
        println!("{}", cells.join("\t"));
    }
}

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Browse, search, sort and re-export spreadsheet data."
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the working view of the source sheet.
    Show(ViewArgs),
    /// Write the working view into a newly created spreadsheet.
    Export(ExportArgs),
}

#[derive(clap::Args)]
struct ViewArgs {
    /// JSON configuration file.
    #[arg(long)]
    config: PathBuf,

    /// Store the sheet is read from and exported to.
    #[arg(long, value_enum, default_value_t = StoreKind::Google)]
    store: StoreKind,

    /// Directory holding workbooks when using the workbook store.
    #[arg(long, default_value = ".")]
    workbook_dir: PathBuf,

    /// JSON file describing the signed-in user.
    #[arg(long)]
    identity: Option<PathBuf>,

    /// Keep only rows containing this text.
    #[arg(long)]
    search: Option<String>,

    /// Sort by this column; repeat to sort several times in order.
    #[arg(long)]
    sort: Vec<String>,
}

#[derive(clap::Args)]
struct ExportArgs {
    #[command(flatten)]
    view: ViewArgs,

    /// OAuth access token used to create the spreadsheet.
    #[arg(long)]
    access_token: Option<String>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum StoreKind {
    Google,
    Workbook,
}
