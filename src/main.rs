mod catalog;
mod config;
mod crm_paths;
mod domain;
mod persistence;
mod seed;
mod status_policy;
mod store;
mod structured_logger;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use config::StoreConfig;
use domain::{
    BudgetStatus, DealId, NewDeal, NewProposal, Potential, PotentialProbability, ProposalContext,
    ProposalId, ProposalIdeas, ProposalStatus, StatusBoard, StoreServices,
};
use persistence::StorageSlot;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use store::{CrmStore, StoreCommand, StoreHandle, UpdateOutcome};
use structured_logger::StructuredLogger;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Environment variable holding the tracing filter directive.
const LOG_FILTER_ENV: &str = "CRM_MOBILE_LOG";

#[derive(Parser)]
#[command(name = "crm-mobile")]
#[command(about = "Local deal and proposal tracker for commercial teams")]
#[command(version)]
#[command(long_version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("CRM_MOBILE_GIT_SHA"), ")"))]
#[command(arg_required_else_help = true)]
struct Cli {
    /// Config file (defaults to ~/.crm-mobile/config.yaml, then built-in defaults)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Apply mutations immediately instead of simulating round-trip latency
    #[arg(long, global = true)]
    no_latency: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    #[command(flatten)]
    Store(StoreAction),
    /// Show reference catalogs
    #[command(subcommand)]
    Catalog(CatalogCommand),
    /// Delete the stored snapshot; the next start begins from scratch
    Reset,
}

/// Commands that run against an opened store.
#[derive(Subcommand)]
enum StoreAction {
    /// Mark the session as authenticated
    Login { user_id: String },
    /// Clear the session flag
    Logout,
    /// Show the session flag
    Whoami,
    /// Create and list deals
    #[command(subcommand)]
    Deal(DealCommand),
    /// Create, move, review and list proposals
    #[command(subcommand)]
    Proposal(ProposalCommand),
}

#[derive(Subcommand)]
enum DealCommand {
    Create(DealArgs),
    List,
}

#[derive(Args)]
struct DealArgs {
    #[arg(long)]
    name: String,
    #[arg(long)]
    company: String,
    #[arg(long)]
    contact: String,
    #[arg(long)]
    position: String,
    #[arg(long)]
    profit_center: String,
    #[arg(long)]
    source: String,
}

#[derive(Subcommand)]
enum ProposalCommand {
    Create(ProposalArgs),
    /// Move a proposal to a lifecycle status
    Status {
        id: String,
        status: ProposalStatus,
        budget_status: BudgetStatus,
        #[arg(long)]
        comment: Option<String>,
    },
    /// Approve a proposal under review
    Approve { id: String },
    /// Send a proposal back for adjustment
    Feedback { id: String, text: String },
    List {
        #[arg(long, value_enum)]
        board: Option<BoardArg>,
    },
}

#[derive(Args)]
struct ProposalArgs {
    #[arg(long)]
    deal_id: String,
    #[arg(long)]
    budget_status: Option<BudgetStatus>,
    #[arg(long, default_value = "")]
    business_context: String,
    #[arg(long, default_value = "")]
    client_needs: String,
    #[arg(long, default_value = "")]
    expected_results: String,
    /// Selected service (repeatable)
    #[arg(long = "idea")]
    ideas: Vec<String>,
    #[arg(long, default_value = "")]
    additional_ideas: String,
    #[arg(long, default_value = "")]
    implementation_ideas: String,
    #[arg(long, default_value = "medium")]
    potential: Potential,
    #[arg(long, value_parser = parse_estimated_value)]
    estimated_value: Option<f64>,
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    probability: Option<u8>,
    /// YYYY-MM-DD
    #[arg(long)]
    optimal_delivery_date: Option<NaiveDate>,
}

#[derive(Subcommand)]
enum CatalogCommand {
    ProfitCenters,
    Services,
    Sources,
}

#[derive(Clone, Copy, ValueEnum)]
enum BoardArg {
    InDevelopment,
    InReview,
    Completed,
}

impl From<BoardArg> for StatusBoard {
    fn from(arg: BoardArg) -> Self {
        match arg {
            BoardArg::InDevelopment => StatusBoard::InDevelopment,
            BoardArg::InReview => StatusBoard::InReview,
            BoardArg::Completed => StatusBoard::Completed,
        }
    }
}

/// A deal as listed, with its profit center resolved for display.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DealView<'a> {
    #[serde(flatten)]
    deal: &'a domain::Deal,
    profit_center_label: &'a str,
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_env(LOG_FILTER_ENV)
        .or_else(|_| EnvFilter::try_new("warn"))
        .unwrap_or_default();

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(env_filter)
        .init();
}

fn parse_estimated_value(raw: &str) -> Result<f64, String> {
    let value: f64 = raw.parse().map_err(|e| format!("{}", e))?;
    if value.is_finite() {
        Ok(value)
    } else {
        Err(format!("{} is not a finite number", raw))
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}

fn print_update(id: &str, outcome: UpdateOutcome) -> Result<()> {
    match outcome.proposal() {
        Some(proposal) => print_json(proposal),
        None => {
            eprintln!("[crm-mobile] No proposal with id {}; nothing changed", id);
            print_json(&serde_json::json!({ "id": id, "found": false }))
        }
    }
}

fn profit_center_label(value: &str) -> &str {
    if catalog::profit_center_id(value).is_some() {
        value
    } else {
        catalog::profit_center_name(value)
    }
}

fn open_store(config: &StoreConfig) -> Result<StoreHandle> {
    let slot = StorageSlot::for_key(&config.storage_key)?;

    let logger = if config.journal {
        let session_id = uuid::Uuid::new_v4().to_string();
        match StructuredLogger::new(&session_id, &crm_paths::logs_dir()?) {
            Ok(logger) => {
                tracing::debug!("Journaling to {}", logger.path().display());
                Some(Arc::new(logger))
            }
            Err(e) => {
                tracing::warn!("Journal disabled: {:#}", e);
                None
            }
        }
    } else {
        None
    };

    let (store, _snapshot_rx) = CrmStore::open(slot, config, StoreServices::default(), logger)
        .context("Failed to open store")?;
    Ok(StoreHandle::new(store, config.latency.clone()))
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let mut config = StoreConfig::resolve(cli.config.as_deref())?;
    if cli.no_latency {
        config = config.without_latency();
    }

    match cli.command {
        Command::Catalog(catalog_command) => run_catalog(catalog_command),
        Command::Reset => {
            let slot = StorageSlot::for_key(&config.storage_key)?;
            slot.clear()?;
            print_json(&serde_json::json!({ "cleared": slot.path() }))
        }
        Command::Store(action) => {
            let handle = open_store(&config)?;
            run_store_action(&handle, action).await
        }
    }
}

fn run_catalog(command: CatalogCommand) -> Result<()> {
    match command {
        CatalogCommand::ProfitCenters => print_json(catalog::PROFIT_CENTERS),
        CatalogCommand::Services => print_json(catalog::SERVICE_CATALOG),
        CatalogCommand::Sources => print_json(catalog::DEAL_SOURCES),
    }
}

async fn run_store_action(handle: &StoreHandle, action: StoreAction) -> Result<()> {
    match action {
        StoreAction::Login { user_id } => {
            handle.apply(StoreCommand::Login { user_id }).await?;
            print_session(handle)
        }
        StoreAction::Logout => {
            handle.apply(StoreCommand::Logout).await?;
            print_session(handle)
        }
        StoreAction::Whoami => print_session(handle),
        StoreAction::Deal(DealCommand::Create(args)) => {
            if !catalog::is_known_source(&args.source) {
                tracing::warn!("Source {:?} is not in the source catalog", args.source);
            }
            let deal = handle
                .create_deal(NewDeal {
                    name: args.name,
                    company: args.company,
                    contact: args.contact,
                    position: args.position,
                    profit_center: args.profit_center,
                    source: args.source,
                })
                .await?;
            print_json(&deal)
        }
        StoreAction::Deal(DealCommand::List) => {
            let snapshot = handle.snapshot();
            let views: Vec<DealView> = snapshot
                .deals()
                .iter()
                .map(|deal| DealView {
                    deal,
                    profit_center_label: profit_center_label(&deal.profit_center),
                })
                .collect();
            print_json(&views)
        }
        StoreAction::Proposal(proposal_command) => run_proposal(handle, proposal_command).await,
    }
}

async fn run_proposal(handle: &StoreHandle, command: ProposalCommand) -> Result<()> {
    match command {
        ProposalCommand::Create(args) => {
            let deal_id = DealId::from(args.deal_id);
            let deal_name = handle
                .snapshot()
                .deal(&deal_id)
                .map(|deal| deal.name.clone())
                .unwrap_or_default();

            for idea in args.ideas.iter().filter(|i| !catalog::is_catalog_service(i)) {
                tracing::warn!("Service {:?} is not in the service catalog", idea);
            }

            let proposal = handle
                .create_proposal(NewProposal {
                    deal_id,
                    deal_name,
                    status: None,
                    budget_status: args.budget_status,
                    context: ProposalContext {
                        business_context: args.business_context,
                        client_needs: args.client_needs,
                        expected_results: args.expected_results,
                    },
                    ideas: ProposalIdeas {
                        selected_ideas: args.ideas,
                        additional_ideas: args.additional_ideas,
                        implementation_ideas: args.implementation_ideas,
                    },
                    p_and_p: PotentialProbability {
                        potential: args.potential,
                        estimated_value: args.estimated_value,
                        probability: args.probability,
                        optimal_delivery_date: args.optimal_delivery_date,
                    },
                })
                .await?;
            print_json(&proposal)
        }
        ProposalCommand::Status {
            id,
            status,
            budget_status,
            comment,
        } => {
            let outcome = handle
                .update_proposal_status(ProposalId::from(id.as_str()), status, budget_status, comment)
                .await?;
            print_update(&id, outcome)
        }
        ProposalCommand::Approve { id } => {
            let outcome = handle.approve(ProposalId::from(id.as_str())).await?;
            print_update(&id, outcome)
        }
        ProposalCommand::Feedback { id, text } => {
            if text.trim().is_empty() {
                anyhow::bail!("Feedback text must not be empty");
            }
            let outcome = handle
                .send_feedback(ProposalId::from(id.as_str()), text)
                .await?;
            print_update(&id, outcome)
        }
        ProposalCommand::List { board } => {
            let snapshot = handle.snapshot();
            match board {
                Some(board) => print_json(&snapshot.board(board.into())),
                None => print_json(snapshot.proposals()),
            }
        }
    }
}

fn print_session(handle: &StoreHandle) -> Result<()> {
    let snapshot = handle.snapshot();
    print_json(&serde_json::json!({
        "isAuthenticated": snapshot.is_authenticated(),
        "userId": snapshot.user_id(),
    }))
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
