use std::path::PathBuf;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use sqlchat::api::{ApiError, curl};
use sqlchat::config::{ConfigError, parse_schema_policy};
use sqlchat::download::{DownloadError, Downloader, FileDownloader};
use sqlchat::render::{self, ConsoleRenderer};
use sqlchat::session::message::MessageKind;
use sqlchat::{ClientConfig, HttpBackend, QueryBackend, QuerySession, SessionError};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Download(#[from] DownloadError),
    #[error("read input failed: {0}")]
    Input(#[from] std::io::Error),
    #[error("query failed")]
    QueryFailed,
}

#[derive(Parser, Debug)]
#[command(name = "sqlchat", about = "Ask a chat-to-SQL backend questions in plain language")]
struct Cli {
    #[arg(long, env = "SQLCHAT_BASE_URL")]
    base_url: Option<String>,

    /// `permissive` or `require_ready`
    #[arg(long)]
    schema_policy: Option<String>,

    /// Ignore chart images in responses.
    #[arg(long, default_value_t = false)]
    no_charts: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch and print the database schema.
    Schema,
    /// List available tables.
    Tables,
    /// Ask one question and print the result.
    Ask(AskArgs),
    /// Interactive session; `:export [name]` saves the last result, `:quit` exits.
    Chat(ChatArgs),
    /// Print the curl command equivalent to asking `query`.
    Curl { query: String },
}

#[derive(Args, Debug)]
struct AskArgs {
    query: String,

    /// Save the result as CSV, optionally under a custom name.
    #[arg(long, num_args = 0..=1, default_missing_value = "")]
    csv: Option<String>,

    /// Save the chart image, if the backend returns one.
    #[arg(long, num_args = 0..=1, default_missing_value = "chart.png")]
    chart: Option<String>,

    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
}

#[derive(Args, Debug)]
struct ChatArgs {
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = ClientConfig::from_env()?;
    if let Some(base_url) = cli.base_url {
        config.base_url = base_url.trim_end_matches('/').to_string();
    }
    if let Some(policy) = cli.schema_policy.as_deref() {
        config.schema_policy = parse_schema_policy(Some(policy))?;
    }
    if cli.no_charts {
        config.charts = false;
    }

    match cli.command {
        Command::Schema => run_schema(&config).await,
        Command::Tables => run_tables(&config).await,
        Command::Ask(args) => run_ask(&config, args).await,
        Command::Chat(args) => run_chat(&config, args).await,
        Command::Curl { query } => {
            println!("{}", curl::execute_command(&config.base_url, &query));
            Ok(())
        }
    }
}

fn new_session(config: &ClientConfig) -> Result<Arc<QuerySession>, CliError> {
    let backend = Arc::new(HttpBackend::new(config)?);
    Ok(Arc::new(QuerySession::new(backend, config)))
}

async fn run_schema(config: &ClientConfig) -> Result<(), CliError> {
    let session = new_session(config)?;
    let state = session.initialize().await?;
    let Some(schema) = state.schema() else {
        return Err(SessionError::SchemaUnavailable(state.reason()).into());
    };
    if let Some(description) = &schema.description {
        println!("{description}");
    }
    for table in schema.table_names() {
        println!("{table}: {}", schema.tables[table]);
    }
    Ok(())
}

async fn run_tables(config: &ClientConfig) -> Result<(), CliError> {
    let backend = HttpBackend::new(config)?;
    for table in backend.fetch_tables().await? {
        println!("{table}");
    }
    Ok(())
}

async fn run_ask(config: &ClientConfig, args: AskArgs) -> Result<(), CliError> {
    let session = new_session(config)?;
    session.subscribe(ConsoleRenderer { echo_user: false });
    session.initialize().await?;

    let reply = session.submit_query(&args.query).await?;
    if reply.kind() != MessageKind::SystemResult {
        return Err(CliError::QueryFailed);
    }

    let downloader = FileDownloader::new(&args.out_dir);
    if let Some(name) = args.csv.as_deref() {
        let export = session.export_csv(&reply, Some(name))?;
        let path = downloader.deliver_csv(&export).await?;
        eprintln!("saved {}", path.display());
    }
    if let (Some(name), Some(image)) = (args.chart.as_deref(), reply.result().and_then(|r| r.chart_image())) {
        let path = downloader.deliver(name, image).await?;
        eprintln!("saved {}", path.display());
    }
    Ok(())
}

async fn run_chat(config: &ClientConfig, args: ChatArgs) -> Result<(), CliError> {
    let session = new_session(config)?;
    session.subscribe(ConsoleRenderer { echo_user: false });

    // The schema loads in the background; permissive sessions accept
    // questions before it settles.
    let init = tokio::spawn({
        let session = session.clone();
        async move { session.initialize().await }
    });

    let downloader = FileDownloader::new(&args.out_dir);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        match line.split_once(' ').map_or((line, ""), |(cmd, rest)| (cmd, rest.trim())) {
            (":quit" | ":q", _) => break,
            (":export", name) => {
                let name = (!name.is_empty()).then_some(name);
                match session.export_last_csv(name) {
                    Ok(export) => {
                        let path = downloader.deliver_csv(&export).await?;
                        eprintln!("saved {}", path.display());
                    }
                    Err(e) => eprintln!("{e}"),
                }
            }
            (":history", _) => {
                for message in session.transcript() {
                    println!("{}\n", render::message(&message));
                }
            }
            _ => {
                if let Err(e) = session.submit_query(line).await {
                    eprintln!("{e}");
                }
            }
        }
    }

    init.abort();
    Ok(())
}
