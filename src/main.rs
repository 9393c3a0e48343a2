mod api;
mod client;
mod config;
mod error;
mod filters;
mod output;
mod poller;
mod timefmt;

use crate::api::boards::{Board, BoardPanel, BoardView, BoardViewFilter};
use crate::api::burn_alerts::{BUDGET_RATE, BurnAlert, BurnAlertSlo, EXHAUSTION_TIME};
use crate::api::columns::Column;
use crate::api::datasets::{Dataset, DatasetSettings};
use crate::api::derived_columns::DerivedColumn;
use crate::api::marker_settings::MarkerSetting;
use crate::api::markers::Marker;
use crate::api::queries::Query;
use crate::api::query_annotations::QueryAnnotation;
use crate::api::query_results::DatasetResults;
use crate::api::slos::{Sli, Slo};
use crate::client::ApiClient;
use crate::config::{Overrides, Scope, resolve, save};
use crate::error::{ApiError, ApiResult};
use crate::filters::{calculations, parse_filter, parse_having, parse_order, typed_value, validate_time_window};
use crate::output::print_json;
use crate::poller::{PollOptions, wait_for_result};
use anyhow::{Context, Result, bail};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::process::ExitCode;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "hccli", version, about = "CLI for the Honeycomb API")]
struct Cli {
    #[arg(
        long,
        global = true,
        env = "HONEYCOMB_API_KEY",
        hide_env_values = true,
        help = "Honeycomb API key (otherwise read from config)"
    )]
    api_key: Option<String>,

    #[arg(
        long,
        global = true,
        env = "HONEYCOMB_API_URL",
        value_name = "URL",
        help = "Base URL for the API (defaults to https://api.honeycomb.io)"
    )]
    api_url: Option<String>,

    #[arg(
        long,
        value_name = "SECONDS",
        help = "HTTP request timeout in seconds (defaults to 30)"
    )]
    timeout: Option<u64>,

    #[arg(
        long,
        global = true,
        env = "HCCLI_LOG",
        value_name = "LEVEL",
        default_value = "warn",
        help = "Diagnostics written to stderr: trace, debug, info, warn or error"
    )]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Persist an API key to the chosen scope
    Configure {
        #[arg(long)]
        key: String,
        #[arg(
            long,
            value_name = "URL",
            help = "Optional base URL to store alongside the key"
        )]
        api_url: Option<String>,
        #[arg(
            long,
            value_enum,
            default_value_t = ScopeArg::User,
            help = "Where to write the config (local project dir or user config dir)"
        )]
        scope: ScopeArg,
    },
    /// Show current configuration (key masked)
    ConfigShow,
    /// Generate shell completion scripts
    Completion {
        #[arg(value_enum)]
        shell: CompletionShell,
    },

    /// Show the team, environment and permissions of the API key
    Auth,
    /// Show management key details (bearer auth)
    #[command(name = "auth-v2")]
    AuthV2,

    /// List all boards
    Boards,
    /// Get a board by ID
    GetBoard {
        #[arg(long)]
        id: String,
    },
    /// Create a flexible board
    CreateBoard {
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: Option<String>,
    },
    /// Replace a board's name, description and panels
    UpdateBoard(UpdateBoardArgs),
    /// Delete a board by ID
    DeleteBoard {
        #[arg(long)]
        id: String,
    },

    /// List the views of a board
    BoardViews {
        #[arg(long)]
        board_id: String,
    },
    /// Get a board view by ID
    GetBoardView {
        #[arg(long)]
        board_id: String,
        #[arg(long)]
        view_id: String,
    },
    /// Create a board view with a single filter
    CreateBoardView {
        #[arg(long)]
        board_id: String,
        #[command(flatten)]
        view: BoardViewArgs,
    },
    /// Replace a board view
    UpdateBoardView {
        #[arg(long)]
        board_id: String,
        #[arg(long)]
        view_id: String,
        #[command(flatten)]
        view: BoardViewArgs,
    },
    /// Delete a board view
    DeleteBoardView {
        #[arg(long)]
        board_id: String,
        #[arg(long)]
        view_id: String,
    },

    /// List columns in a dataset
    Columns {
        #[command(flatten)]
        dataset: DatasetArg,
    },
    /// Get a column by ID
    GetColumn {
        #[command(flatten)]
        dataset: DatasetArg,
        #[arg(long)]
        id: String,
    },
    /// Create a column
    CreateColumn {
        #[command(flatten)]
        dataset: DatasetArg,
        #[arg(long)]
        key_name: String,
        #[arg(long = "type", default_value = "string", help = "string, float, integer or boolean")]
        column_type: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, help = "Hide the column from autocomplete and raw data")]
        hidden: bool,
    },
    /// Update a column; only the flags given are sent
    UpdateColumn {
        #[command(flatten)]
        dataset: DatasetArg,
        #[arg(long)]
        id: String,
        #[arg(long = "type")]
        column_type: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, num_args = 0..=1, default_missing_value = "true")]
        hidden: Option<bool>,
    },
    /// Delete a column by ID
    DeleteColumn {
        #[command(flatten)]
        dataset: DatasetArg,
        #[arg(long)]
        id: String,
    },

    /// List derived columns in a dataset
    DerivedColumns {
        #[command(flatten)]
        dataset: DatasetArg,
    },
    /// Get a derived column by ID
    GetDerivedColumn {
        #[command(flatten)]
        dataset: DatasetArg,
        #[arg(long)]
        id: String,
    },
    /// Create a derived column
    CreateDerivedColumn {
        #[command(flatten)]
        dataset: DatasetArg,
        #[command(flatten)]
        column: DerivedColumnArgs,
    },
    /// Replace a derived column
    UpdateDerivedColumn {
        #[command(flatten)]
        dataset: DatasetArg,
        #[arg(long)]
        id: String,
        #[command(flatten)]
        column: DerivedColumnArgs,
    },
    /// Delete a derived column by ID
    DeleteDerivedColumn {
        #[command(flatten)]
        dataset: DatasetArg,
        #[arg(long)]
        id: String,
    },

    /// List datasets in the environment
    Datasets,
    /// Get a dataset by slug
    GetDataset {
        #[arg(long)]
        slug: String,
    },
    /// Create a dataset
    CreateDataset {
        #[arg(long)]
        name: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, value_parser = clap::value_parser!(u8).range(0..=10))]
        expand_json_depth: Option<u8>,
    },
    /// Update a dataset's description and settings
    UpdateDataset {
        #[arg(long)]
        slug: String,
        #[arg(long)]
        description: String,
        #[arg(long, value_parser = clap::value_parser!(u8).range(0..=10))]
        expand_json_depth: u8,
        #[arg(long, num_args = 0..=1, default_missing_value = "true")]
        delete_protected: Option<bool>,
    },
    /// Delete a dataset by slug
    DeleteDataset {
        #[arg(long)]
        slug: String,
    },

    /// List markers in a dataset
    Markers {
        #[command(flatten)]
        dataset: DatasetArg,
    },
    /// Create a marker
    CreateMarker {
        #[command(flatten)]
        dataset: DatasetArg,
        #[command(flatten)]
        marker: MarkerArgs,
    },
    /// Update a marker; only the flags given are sent
    UpdateMarker {
        #[command(flatten)]
        dataset: DatasetArg,
        #[arg(long)]
        id: String,
        #[command(flatten)]
        marker: MarkerArgs,
    },
    /// Delete a marker by ID
    DeleteMarker {
        #[command(flatten)]
        dataset: DatasetArg,
        #[arg(long)]
        id: String,
    },

    /// List marker settings in a dataset
    MarkerSettings {
        #[command(flatten)]
        dataset: DatasetArg,
    },
    /// Create a marker setting
    CreateMarkerSetting {
        #[command(flatten)]
        dataset: DatasetArg,
        #[command(flatten)]
        setting: MarkerSettingArgs,
    },
    /// Replace a marker setting
    UpdateMarkerSetting {
        #[command(flatten)]
        dataset: DatasetArg,
        #[arg(long)]
        id: String,
        #[command(flatten)]
        setting: MarkerSettingArgs,
    },
    /// Delete a marker setting by ID
    DeleteMarkerSetting {
        #[command(flatten)]
        dataset: DatasetArg,
        #[arg(long)]
        id: String,
    },

    /// Get a query by ID
    GetQuery {
        #[command(flatten)]
        dataset: DatasetArg,
        #[arg(long)]
        id: String,
    },
    /// Create a query specification
    CreateQuery(CreateQueryArgs),

    /// List query annotations in a dataset
    QueryAnnotations {
        #[command(flatten)]
        dataset: DatasetArg,
    },
    /// Get a query annotation by ID
    GetQueryAnnotation {
        #[command(flatten)]
        dataset: DatasetArg,
        #[arg(long)]
        id: String,
    },
    /// Name and describe a query
    CreateQueryAnnotation {
        #[command(flatten)]
        dataset: DatasetArg,
        #[command(flatten)]
        annotation: QueryAnnotationArgs,
    },
    /// Replace a query annotation
    UpdateQueryAnnotation {
        #[command(flatten)]
        dataset: DatasetArg,
        #[arg(long)]
        id: String,
        #[command(flatten)]
        annotation: QueryAnnotationArgs,
    },
    /// Delete a query annotation by ID
    DeleteQueryAnnotation {
        #[command(flatten)]
        dataset: DatasetArg,
        #[arg(long)]
        id: String,
    },

    /// Run a saved query and wait for its results
    CreateQueryResult {
        #[command(flatten)]
        dataset: DatasetArg,
        #[arg(long)]
        query_id: String,
        #[arg(
            long,
            value_name = "SECONDS",
            default_value_t = 2,
            help = "Seconds between polls (minimum 1)"
        )]
        poll_interval: u64,
        #[arg(
            long,
            value_name = "SECONDS",
            default_value_t = 60,
            help = "Give up waiting after this many seconds"
        )]
        timeout: u64,
    },
    /// Get a query result by ID
    GetQueryResult {
        #[command(flatten)]
        dataset: DatasetArg,
        #[arg(long)]
        id: String,
    },

    /// List SLOs in a dataset
    Slos {
        #[command(flatten)]
        dataset: DatasetArg,
    },
    /// Get an SLO by ID
    GetSlo {
        #[command(flatten)]
        dataset: DatasetArg,
        #[arg(long)]
        id: String,
        #[arg(long, help = "Include compliance and remaining budget")]
        detailed: bool,
    },
    /// Create an SLO
    CreateSlo {
        #[command(flatten)]
        dataset: DatasetArg,
        #[command(flatten)]
        slo: SloArgs,
    },
    /// Replace an SLO
    UpdateSlo {
        #[command(flatten)]
        dataset: DatasetArg,
        #[arg(long)]
        id: String,
        #[command(flatten)]
        slo: SloArgs,
    },
    /// Delete an SLO by ID
    DeleteSlo {
        #[command(flatten)]
        dataset: DatasetArg,
        #[arg(long)]
        id: String,
    },

    /// List burn alerts of an SLO
    BurnAlerts {
        #[command(flatten)]
        dataset: DatasetArg,
        #[arg(long)]
        slo_id: String,
    },
    /// Get a burn alert by ID
    GetBurnAlert {
        #[command(flatten)]
        dataset: DatasetArg,
        #[arg(long)]
        id: String,
    },
    /// Create a burn alert for an SLO
    #[command(after_help = BURN_ALERT_EXAMPLES)]
    CreateBurnAlert {
        #[command(flatten)]
        dataset: DatasetArg,
        #[arg(long)]
        slo_id: String,
        #[command(flatten)]
        alert: BurnAlertArgs,
    },
    /// Replace a burn alert
    UpdateBurnAlert {
        #[command(flatten)]
        dataset: DatasetArg,
        #[arg(long)]
        id: String,
        #[command(flatten)]
        alert: BurnAlertArgs,
    },
    /// Delete a burn alert by ID
    DeleteBurnAlert {
        #[command(flatten)]
        dataset: DatasetArg,
        #[arg(long)]
        id: String,
    },

    /// Print the Honeycomb UI URL of a trace
    GetTrace {
        #[arg(long)]
        trace_id: String,
        #[command(flatten)]
        dataset: DatasetArg,
    },
}

const BURN_ALERT_EXAMPLES: &str = "\
Examples:
  hccli create-burn-alert --dataset api --slo-id abc123 \\
    --exhaustion-minutes 120 \\
    --recipients-json '[{\"type\":\"email\",\"target\":\"alerts@example.com\"}]'

  hccli create-burn-alert --dataset api --slo-id abc123 \\
    --alert-type budget_rate \\
    --budget-rate-window-minutes 60 \\
    --budget-rate-decrease-per-million 10000 \\
    --recipients-json '[{\"id\":\"recipient-id\"}]'";

#[derive(Args, Debug, Clone)]
struct DatasetArg {
    #[arg(long = "dataset", help = "Dataset slug (use __all__ for environment-wide)")]
    slug: String,
}

#[derive(Args, Debug, Clone)]
struct UpdateBoardArgs {
    #[arg(long)]
    id: String,
    #[arg(long)]
    name: String,
    #[arg(long)]
    description: Option<String>,
    #[arg(long, help = "Add a single query panel for this query")]
    query_id: Option<String>,
    #[arg(long, requires = "query_id")]
    query_annotation_id: Option<String>,
    #[arg(long, value_enum, default_value_t = QueryStyle::Graph)]
    query_style: QueryStyle,
    #[arg(
        long,
        value_name = "JSON",
        help = "Full JSON array of panels; takes precedence over --query-id"
    )]
    panels_json: Option<String>,
}

#[derive(Args, Debug, Clone)]
struct BoardViewArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    filter_column: String,
    #[arg(long, help = "Filter operation, e.g. =, !=, >, exists")]
    filter_op: String,
    #[arg(long)]
    filter_value: Option<String>,
}

#[derive(Args, Debug, Clone)]
struct DerivedColumnArgs {
    #[arg(long)]
    alias: String,
    #[arg(long)]
    expression: String,
    #[arg(long)]
    description: Option<String>,
}

#[derive(Args, Debug, Clone)]
struct MarkerArgs {
    #[arg(long)]
    message: Option<String>,
    #[arg(long = "type")]
    marker_type: Option<String>,
    #[arg(long)]
    url: Option<String>,
    #[arg(long, help = "Unix seconds, RFC 3339, or YYYY-MM-DD[ HH:MM[:SS]] (UTC)")]
    start_time: Option<String>,
    #[arg(long, help = "Unix seconds, RFC 3339, or YYYY-MM-DD[ HH:MM[:SS]] (UTC)")]
    end_time: Option<String>,
}

#[derive(Args, Debug, Clone)]
struct MarkerSettingArgs {
    #[arg(long = "type")]
    marker_type: String,
    #[arg(long)]
    color: String,
}

#[derive(Args, Debug, Clone)]
struct QueryAnnotationArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    query_id: String,
    #[arg(long)]
    description: Option<String>,
}

#[derive(Args, Debug, Clone)]
struct CreateQueryArgs {
    #[command(flatten)]
    dataset: DatasetArg,
    #[arg(
        long,
        required = true,
        help = "Calculation (COUNT, AVG, P99, ...); repeat for multiple"
    )]
    calculation_op: Vec<String>,
    #[arg(
        long,
        help = "Column for each --calculation-op, in order (empty for none)"
    )]
    calculation_column: Vec<String>,
    #[arg(long, help = "Breakdown column; repeat for multiple")]
    breakdown: Vec<String>,
    #[arg(
        long,
        value_name = "COLUMN OP [VALUE]",
        help = "e.g. \"duration_ms > 100\" or \"user.id exists\"; repeat for multiple"
    )]
    filter: Vec<String>,
    #[arg(long, value_parser = ["AND", "OR"])]
    filter_combination: Option<String>,
    #[arg(
        long,
        value_name = "TARGET [asc|desc]",
        help = "Order by a column, an op, or OP(column); repeat for multiple"
    )]
    order: Vec<String>,
    #[arg(
        long,
        value_name = "OP[(COLUMN)] CMP VALUE",
        help = "e.g. \"COUNT > 10\"; repeat for multiple"
    )]
    having: Vec<String>,
    #[arg(long, help = "Seconds, \"4 hours\", or \"last day\"")]
    time_range: Option<String>,
    #[arg(long)]
    start_time: Option<String>,
    #[arg(long)]
    end_time: Option<String>,
    #[arg(long, value_name = "SECONDS")]
    granularity: Option<u64>,
    #[arg(long)]
    limit: Option<u64>,
}

#[derive(Args, Debug, Clone)]
struct SloArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    description: Option<String>,
    #[arg(long, help = "Alias of the derived column used as the SLI")]
    sli_alias: String,
    #[arg(long)]
    time_period_days: u32,
    #[arg(long, help = "e.g. 999000 = 99.9%")]
    target_per_million: u32,
    #[arg(long, value_name = "JSON", help = "e.g. '[{\"key\":\"team\",\"value\":\"blue\"}]'")]
    tags_json: Option<String>,
}

#[derive(Args, Debug, Clone)]
struct BurnAlertArgs {
    #[arg(long, value_enum, default_value_t = AlertType::ExhaustionTime)]
    alert_type: AlertType,
    #[arg(long)]
    description: Option<String>,
    #[arg(long, help = "Alert when the budget runs out within this many minutes")]
    exhaustion_minutes: Option<i64>,
    #[arg(long, help = "Window for budget_rate alerts (minimum 60)")]
    budget_rate_window_minutes: Option<i64>,
    #[arg(long, help = "Budget drop per million for budget_rate alerts (10000 = 1%)")]
    budget_rate_decrease_per_million: Option<i64>,
    #[arg(long, value_name = "JSON", help = "e.g. '[{\"id\":\"abc123\"}]'")]
    recipients_json: String,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CompletionShell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ScopeArg {
    Local,
    User,
}

impl From<ScopeArg> for Scope {
    fn from(value: ScopeArg) -> Self {
        match value {
            ScopeArg::Local => Scope::Local,
            ScopeArg::User => Scope::User,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum, PartialEq, Eq)]
enum QueryStyle {
    Graph,
    Table,
    Combo,
}

impl QueryStyle {
    fn as_str(self) -> &'static str {
        match self {
            QueryStyle::Graph => "graph",
            QueryStyle::Table => "table",
            QueryStyle::Combo => "combo",
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum, PartialEq, Eq)]
enum AlertType {
    #[value(name = "exhaustion_time")]
    ExhaustionTime,
    #[value(name = "budget_rate")]
    BudgetRate,
}

impl AlertType {
    fn as_str(self) -> &'static str {
        match self {
            AlertType::ExhaustionTime => EXHAUSTION_TIME,
            AlertType::BudgetRate => BUDGET_RATE,
        }
    }
}

#[derive(Debug, Serialize)]
struct TraceLink {
    trace_id: String,
    dataset: String,
    team: String,
    environment: String,
    url: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            if let Some(api) = e.downcast_ref::<ApiError>()
                && matches!(api.status(), Some(401 | 403))
            {
                eprintln!(
                    "hint: check the API key (--api-key, HONEYCOMB_API_KEY or `hccli configure`)"
                );
            }
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

async fn run(cli: Cli) -> Result<()> {
    let cwd = std::env::current_dir().context("reading current directory")?;

    match &cli.command {
        Commands::Configure {
            key,
            api_url,
            scope,
        } => {
            let mut existing = config::load_scope((*scope).into(), &cwd)?;
            existing.api_key = Some(key.clone());
            if let Some(url) = api_url.clone() {
                existing.api_url = Some(url);
            }
            let path = save((*scope).into(), &existing, &cwd)?;
            println!("Saved API key to {}", path.display());
            return Ok(());
        }
        Commands::ConfigShow => {
            let merged = config::load(&cwd)?;
            return print_json(&config::masked(&merged));
        }
        Commands::Completion { shell } => {
            use clap_complete::{generate, shells};
            let mut cmd = Cli::command();
            let bin = cmd.get_name().to_string();
            let out = &mut std::io::stdout();
            match shell {
                CompletionShell::Bash => generate(shells::Bash, &mut cmd, bin, out),
                CompletionShell::Zsh => generate(shells::Zsh, &mut cmd, bin, out),
                CompletionShell::Fish => generate(shells::Fish, &mut cmd, bin, out),
                CompletionShell::PowerShell => generate(shells::PowerShell, &mut cmd, bin, out),
            }
            return Ok(());
        }
        _ => {}
    }

    let effective = resolve(
        &cwd,
        Overrides {
            api_key: cli.api_key.clone(),
            api_url: cli.api_url.clone(),
            timeout_secs: cli.timeout,
        },
    )?;
    debug!(base_url = %effective.base_url, timeout = ?effective.timeout, "resolved client config");
    let client = ApiClient::new(&effective)?;

    dispatch(&client, cli.command).await
}

async fn dispatch(client: &ApiClient, command: Commands) -> Result<()> {
    match command {
        Commands::Auth => print_json(&client.get_auth().await?),
        Commands::AuthV2 => print_json(&client.get_auth_v2().await?),

        Commands::Boards => print_json(&client.list_boards().await?),
        Commands::GetBoard { id } => print_json(&client.get_board(&id).await?),
        Commands::CreateBoard { name, description } => {
            let board = Board {
                name,
                description,
                board_type: "flexible".into(),
                ..Board::default()
            };
            print_json(&client.create_board(&board).await?)
        }
        Commands::UpdateBoard(args) => {
            let board = board_update(&args)?;
            print_json(&client.update_board(&args.id, &board).await?)
        }
        Commands::DeleteBoard { id } => {
            client.delete_board(&id).await?;
            print_deleted(&id)
        }

        Commands::BoardViews { board_id } => {
            print_json(&client.list_board_views(&board_id).await?)
        }
        Commands::GetBoardView { board_id, view_id } => {
            print_json(&client.get_board_view(&board_id, &view_id).await?)
        }
        Commands::CreateBoardView { board_id, view } => {
            let view = board_view(view);
            print_json(&client.create_board_view(&board_id, &view).await?)
        }
        Commands::UpdateBoardView {
            board_id,
            view_id,
            view,
        } => {
            let view = board_view(view);
            print_json(&client.update_board_view(&board_id, &view_id, &view).await?)
        }
        Commands::DeleteBoardView { board_id, view_id } => {
            client.delete_board_view(&board_id, &view_id).await?;
            print_deleted(&view_id)
        }

        Commands::Columns { dataset } => print_json(&client.list_columns(&dataset.slug).await?),
        Commands::GetColumn { dataset, id } => {
            print_json(&client.get_column(&dataset.slug, &id).await?)
        }
        Commands::CreateColumn {
            dataset,
            key_name,
            column_type,
            description,
            hidden,
        } => {
            let column = Column {
                key_name,
                column_type: Some(column_type),
                description,
                hidden: Some(hidden),
                ..Column::default()
            };
            print_json(&client.create_column(&dataset.slug, &column).await?)
        }
        Commands::UpdateColumn {
            dataset,
            id,
            column_type,
            description,
            hidden,
        } => {
            let column = Column {
                column_type,
                description,
                hidden,
                ..Column::default()
            };
            print_json(&client.update_column(&dataset.slug, &id, &column).await?)
        }
        Commands::DeleteColumn { dataset, id } => {
            client.delete_column(&dataset.slug, &id).await?;
            print_deleted(&id)
        }

        Commands::DerivedColumns { dataset } => {
            print_json(&client.list_derived_columns(&dataset.slug).await?)
        }
        Commands::GetDerivedColumn { dataset, id } => {
            print_json(&client.get_derived_column(&dataset.slug, &id).await?)
        }
        Commands::CreateDerivedColumn { dataset, column } => {
            let column = derived_column(column);
            print_json(&client.create_derived_column(&dataset.slug, &column).await?)
        }
        Commands::UpdateDerivedColumn {
            dataset,
            id,
            column,
        } => {
            let column = derived_column(column);
            print_json(
                &client
                    .update_derived_column(&dataset.slug, &id, &column)
                    .await?,
            )
        }
        Commands::DeleteDerivedColumn { dataset, id } => {
            client.delete_derived_column(&dataset.slug, &id).await?;
            print_deleted(&id)
        }

        Commands::Datasets => print_json(&client.list_datasets().await?),
        Commands::GetDataset { slug } => print_json(&client.get_dataset(&slug).await?),
        Commands::CreateDataset {
            name,
            description,
            expand_json_depth,
        } => {
            let dataset = Dataset {
                name: Some(name),
                description,
                expand_json_depth,
                ..Dataset::default()
            };
            print_json(&client.create_dataset(&dataset).await?)
        }
        Commands::UpdateDataset {
            slug,
            description,
            expand_json_depth,
            delete_protected,
        } => {
            let dataset = Dataset {
                description: Some(description),
                expand_json_depth: Some(expand_json_depth),
                settings: delete_protected.map(|protected| DatasetSettings {
                    delete_protected: Some(protected),
                }),
                ..Dataset::default()
            };
            print_json(&client.update_dataset(&slug, &dataset).await?)
        }
        Commands::DeleteDataset { slug } => {
            client.delete_dataset(&slug).await?;
            print_deleted(&slug)
        }

        Commands::Markers { dataset } => print_json(&client.list_markers(&dataset.slug).await?),
        Commands::CreateMarker { dataset, marker } => {
            let marker = marker_from(marker)?;
            print_json(&client.create_marker(&dataset.slug, &marker).await?)
        }
        Commands::UpdateMarker {
            dataset,
            id,
            marker,
        } => {
            let marker = marker_from(marker)?;
            print_json(&client.update_marker(&dataset.slug, &id, &marker).await?)
        }
        Commands::DeleteMarker { dataset, id } => {
            client.delete_marker(&dataset.slug, &id).await?;
            print_deleted(&id)
        }

        Commands::MarkerSettings { dataset } => {
            print_json(&client.list_marker_settings(&dataset.slug).await?)
        }
        Commands::CreateMarkerSetting { dataset, setting } => {
            let setting = MarkerSetting::new(setting.marker_type, setting.color);
            print_json(&client.create_marker_setting(&dataset.slug, &setting).await?)
        }
        Commands::UpdateMarkerSetting {
            dataset,
            id,
            setting,
        } => {
            let setting = MarkerSetting::new(setting.marker_type, setting.color);
            print_json(
                &client
                    .update_marker_setting(&dataset.slug, &id, &setting)
                    .await?,
            )
        }
        Commands::DeleteMarkerSetting { dataset, id } => {
            client.delete_marker_setting(&dataset.slug, &id).await?;
            print_deleted(&id)
        }

        Commands::GetQuery { dataset, id } => {
            print_json(&client.get_query(&dataset.slug, &id).await?)
        }
        Commands::CreateQuery(args) => {
            let query = build_query(&args)?;
            print_json(&client.create_query(&args.dataset.slug, &query).await?)
        }

        Commands::QueryAnnotations { dataset } => {
            print_json(&client.list_query_annotations(&dataset.slug).await?)
        }
        Commands::GetQueryAnnotation { dataset, id } => {
            print_json(&client.get_query_annotation(&dataset.slug, &id).await?)
        }
        Commands::CreateQueryAnnotation {
            dataset,
            annotation,
        } => {
            let annotation = query_annotation(annotation);
            print_json(
                &client
                    .create_query_annotation(&dataset.slug, &annotation)
                    .await?,
            )
        }
        Commands::UpdateQueryAnnotation {
            dataset,
            id,
            annotation,
        } => {
            let annotation = query_annotation(annotation);
            print_json(
                &client
                    .update_query_annotation(&dataset.slug, &id, &annotation)
                    .await?,
            )
        }
        Commands::DeleteQueryAnnotation { dataset, id } => {
            client.delete_query_annotation(&dataset.slug, &id).await?;
            print_deleted(&id)
        }

        Commands::CreateQueryResult {
            dataset,
            query_id,
            poll_interval,
            timeout,
        } => {
            let submitted = client.create_query_result(&dataset.slug, &query_id).await?;
            debug!(result_id = %submitted.id, complete = submitted.complete, "query result submitted");

            let options = PollOptions::new(
                Duration::from_secs(poll_interval),
                Duration::from_secs(timeout),
            );
            let source = DatasetResults {
                client,
                dataset: &dataset.slug,
            };
            let cancel = CancellationToken::new();
            let interrupt = tokio::spawn(cancel_on_interrupt(cancel.clone()));
            let outcome = wait_for_result(&source, submitted, options, &cancel).await;
            interrupt.abort();

            let result = outcome?;
            if result.is_empty() {
                eprint!("{}", empty_results_hint(&dataset.slug));
            }
            print_json(&result)
        }
        Commands::GetQueryResult { dataset, id } => {
            print_json(&client.get_query_result(&dataset.slug, &id).await?)
        }

        Commands::Slos { dataset } => print_json(&client.list_slos(&dataset.slug).await?),
        Commands::GetSlo {
            dataset,
            id,
            detailed,
        } => print_json(&client.get_slo(&dataset.slug, &id, detailed).await?),
        Commands::CreateSlo { dataset, slo } => {
            let slo = slo_from(slo)?;
            print_json(&client.create_slo(&dataset.slug, &slo).await?)
        }
        Commands::UpdateSlo { dataset, id, slo } => {
            let slo = slo_from(slo)?;
            print_json(&client.update_slo(&dataset.slug, &id, &slo).await?)
        }
        Commands::DeleteSlo { dataset, id } => {
            client.delete_slo(&dataset.slug, &id).await?;
            print_deleted(&id)
        }

        Commands::BurnAlerts { dataset, slo_id } => {
            print_json(&client.list_burn_alerts(&dataset.slug, &slo_id).await?)
        }
        Commands::GetBurnAlert { dataset, id } => {
            print_json(&client.get_burn_alert(&dataset.slug, &id).await?)
        }
        Commands::CreateBurnAlert {
            dataset,
            slo_id,
            alert,
        } => {
            let mut alert = burn_alert(&alert)?;
            alert.slo = Some(BurnAlertSlo { id: slo_id });
            print_json(&client.create_burn_alert(&dataset.slug, &alert).await?)
        }
        Commands::UpdateBurnAlert { dataset, id, alert } => {
            let alert = burn_alert(&alert)?;
            print_json(&client.update_burn_alert(&dataset.slug, &id, &alert).await?)
        }
        Commands::DeleteBurnAlert { dataset, id } => {
            client.delete_burn_alert(&dataset.slug, &id).await?;
            print_deleted(&id)
        }

        Commands::GetTrace { trace_id, dataset } => {
            let auth = client.get_auth().await.context("fetching auth info")?;
            let url = trace_url(
                &auth.team.slug,
                &auth.environment.slug,
                &dataset.slug,
                &trace_id,
            );
            print_json(&TraceLink {
                trace_id,
                dataset: dataset.slug,
                team: auth.team.slug,
                environment: auth.environment.slug,
                url,
            })
        }

        Commands::Configure { .. } | Commands::ConfigShow | Commands::Completion { .. } => {
            bail!("local commands do not talk to the API")
        }
    }
}

async fn cancel_on_interrupt(cancel: CancellationToken) {
    if tokio::signal::ctrl_c().await.is_ok() {
        warn!("interrupted, no longer waiting for the query result");
        cancel.cancel();
    }
}

fn print_deleted(id: &str) -> Result<()> {
    print_json(&json!({"id": id, "deleted": true}))
}

fn parse_json_flag<T: DeserializeOwned>(flag: &str, raw: &str) -> Result<T> {
    serde_json::from_str(raw).with_context(|| format!("parsing {flag} as JSON"))
}

fn board_update(args: &UpdateBoardArgs) -> Result<Board> {
    let panels = match (&args.panels_json, &args.query_id) {
        (Some(raw), _) => parse_json_flag("--panels-json", raw)?,
        (None, Some(query_id)) => vec![BoardPanel::query(
            query_id.clone(),
            args.query_annotation_id.clone(),
            args.query_style.as_str().to_string(),
        )],
        (None, None) => Vec::new(),
    };
    Ok(Board {
        name: args.name.clone(),
        description: args.description.clone(),
        board_type: "flexible".into(),
        panels,
        ..Board::default()
    })
}

fn board_view(args: BoardViewArgs) -> BoardView {
    BoardView {
        id: None,
        name: args.name,
        filters: vec![BoardViewFilter {
            column: args.filter_column,
            operation: args.filter_op,
            value: args.filter_value.as_deref().map(typed_value),
        }],
    }
}

fn derived_column(args: DerivedColumnArgs) -> DerivedColumn {
    DerivedColumn {
        alias: args.alias,
        expression: args.expression,
        description: args.description,
        ..DerivedColumn::default()
    }
}

fn marker_from(args: MarkerArgs) -> Result<Marker> {
    let start_time = args
        .start_time
        .as_deref()
        .map(timefmt::parse_timestamp)
        .transpose()
        .context("parsing --start-time")?;
    let end_time = args
        .end_time
        .as_deref()
        .map(timefmt::parse_timestamp)
        .transpose()
        .context("parsing --end-time")?;
    Ok(Marker {
        start_time,
        end_time,
        message: args.message,
        marker_type: args.marker_type,
        url: args.url,
        ..Marker::default()
    })
}

fn query_annotation(args: QueryAnnotationArgs) -> QueryAnnotation {
    QueryAnnotation {
        name: args.name,
        description: args.description,
        query_id: args.query_id,
        ..QueryAnnotation::default()
    }
}

fn slo_from(args: SloArgs) -> Result<Slo> {
    let tags = match &args.tags_json {
        Some(raw) => parse_json_flag("--tags-json", raw)?,
        None => Vec::new(),
    };
    Ok(Slo {
        name: args.name,
        description: args.description,
        sli: Sli {
            alias: args.sli_alias,
        },
        time_period_days: args.time_period_days,
        target_per_million: args.target_per_million,
        tags,
        ..Slo::default()
    })
}

/// Only the threshold fields of the chosen alert type are set.
fn burn_alert(args: &BurnAlertArgs) -> Result<BurnAlert> {
    let recipients = parse_json_flag("--recipients-json", &args.recipients_json)?;
    let mut alert = BurnAlert {
        alert_type: Some(args.alert_type.as_str().to_string()),
        description: args.description.clone(),
        recipients,
        ..BurnAlert::default()
    };

    match args.alert_type {
        AlertType::ExhaustionTime => {
            let minutes = args.exhaustion_minutes.ok_or_else(|| {
                ApiError::validation("--exhaustion-minutes is required for exhaustion_time alerts")
            })?;
            alert.exhaustion_minutes = Some(minutes);
        }
        AlertType::BudgetRate => {
            let (Some(window), Some(decrease)) = (
                args.budget_rate_window_minutes,
                args.budget_rate_decrease_per_million,
            ) else {
                return Err(ApiError::validation(
                    "--budget-rate-window-minutes and --budget-rate-decrease-per-million are required for budget_rate alerts",
                )
                .into());
            };
            alert.budget_rate_window_minutes = Some(window);
            alert.budget_rate_decrease_threshold_per_million = Some(decrease);
        }
    }
    Ok(alert)
}

/// Validates and assembles a query. Fails before any request is made.
fn build_query(args: &CreateQueryArgs) -> Result<Query> {
    let calculations = calculations(&args.calculation_op, &args.calculation_column)?;
    let filters = args
        .filter
        .iter()
        .map(|raw| parse_filter(raw))
        .collect::<ApiResult<Vec<_>>>()?;
    let orders = args
        .order
        .iter()
        .map(|raw| parse_order(raw))
        .collect::<ApiResult<Vec<_>>>()?;
    let havings = args
        .having
        .iter()
        .map(|raw| parse_having(raw))
        .collect::<ApiResult<Vec<_>>>()?;

    let time_range = args
        .time_range
        .as_deref()
        .map(timefmt::parse_duration)
        .transpose()
        .context("parsing --time-range")?;
    let start_time = args
        .start_time
        .as_deref()
        .map(timefmt::parse_timestamp)
        .transpose()
        .context("parsing --start-time")?;
    let end_time = args
        .end_time
        .as_deref()
        .map(timefmt::parse_timestamp)
        .transpose()
        .context("parsing --end-time")?;
    validate_time_window(time_range, start_time, end_time)?;

    Ok(Query {
        calculations,
        breakdowns: args.breakdown.clone(),
        filters,
        filter_combination: args.filter_combination.clone(),
        orders,
        havings,
        time_range,
        start_time,
        end_time,
        granularity: args.granularity,
        limit: args.limit,
        ..Query::default()
    })
}

fn empty_results_hint(dataset: &str) -> String {
    format!(
        "Query returned 0 results.\n\
         \n\
         Possible reasons:\n\
         \x20 - No data in time range (try a larger --time-range)\n\
         \x20 - Filters are too restrictive\n\
         \x20 - Column names don't exist (verify with: hccli columns --dataset {dataset})\n\
         \n\
         Results with breakdowns are nested under .data.results[].data\n\
         \x20 Try: jq '.data.results[].data'\n"
    )
}

fn trace_url(team: &str, environment: &str, dataset: &str, trace_id: &str) -> String {
    format!(
        "https://ui.honeycomb.io/{team}/environments/{environment}/datasets/{dataset}/trace?trace_id={trace_id}"
    )
}
