//! OPD Dashboard CLI
//!
//! Record outpatient visits and view the OPD overview from the terminal.
//!
//! Usage:
//!   opd-dashboard overview [--date YYYY-MM-DD] [--format table|json|csv]
//!   opd-dashboard add --name <name> --age <age> ... [--date YYYY-MM-DD]
//!   opd-dashboard generate <instruction>
//!   opd-dashboard init
//!   opd-dashboard interactive

mod interactive;
mod render;

use std::io;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use opd_dashboard_core::config::{resolve_config_path, AppConfig};
use opd_dashboard_core::models::{parse_date, EntryForm};
use opd_dashboard_core::session::Session;
use opd_dashboard_core::store::{open_store, RecordStore};
use opd_dashboard_core::DashboardError;
use opd_dashboard_llm::{generate_response, GenerateOutcome, OpenAiClient};
use tracing_subscriber::EnvFilter;

use crate::render::{format_page, OutputFormat};

#[derive(Parser)]
#[command(name = "opd-dashboard")]
#[command(author = "OPD Dashboard Team")]
#[command(version = "0.1.0")]
#[command(about = "OPD summary dashboard for an Ayurvedic clinic", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (default: $OPD_DASHBOARD_CONFIG or ./opd-dashboard.json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show metrics, distribution charts and the patient list
    Overview {
        /// Only include visits on this date (YYYY-MM-DD)
        #[arg(short, long)]
        date: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Add an OPD entry, then show the overview
    Add {
        /// OPD date (YYYY-MM-DD, default today)
        #[arg(short, long)]
        date: Option<String>,

        /// Patient name
        #[arg(short, long, default_value = "")]
        name: String,

        /// Age in years (0-120)
        #[arg(short, long, default_value = "0")]
        age: String,

        /// Male, Female or Other
        #[arg(short, long, default_value = "Male")]
        gender: String,

        /// Vata, Pitta, Kapha, Vata-Pitta, Pitta-Kapha or Vata-Kapha
        #[arg(short, long, default_value = "Vata")]
        prakriti: String,

        /// Main complaint
        #[arg(long, default_value = "")]
        complaint: String,

        /// Diagnosis (doctor entry)
        #[arg(long, default_value = "")]
        diagnosis: String,

        /// Follow-up required: Yes or No
        #[arg(long, default_value = "Yes")]
        follow_up: String,
    },

    /// Ask for an AI summary of all OPD data
    Generate {
        /// Instruction added to the summary task
        instruction: String,
    },

    /// Write the header row into an empty store
    Init,

    /// Interactive session with the entry and overview views
    Interactive,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config_path = resolve_config_path(cli.config);
    let config = AppConfig::load(&config_path)
        .with_context(|| format!("Failed to load config from {}", config_path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_filter)),
        )
        .with_writer(io::stderr)
        .init();

    tracing::debug!(path = %config_path.display(), "Loaded configuration");

    let store = open_store(&config.store).context("Failed to open record store")?;

    match cli.command {
        Commands::Overview { date, format } => {
            let mut session = Session::new();
            session.set_date_filter(date.as_deref().map(parse_date).transpose()?);
            print_overview(&session, &*store, format)?;
        }

        Commands::Add {
            date,
            name,
            age,
            gender,
            prakriti,
            complaint,
            diagnosis,
            follow_up,
        } => {
            let mut form = EntryForm::today();
            if let Some(date) = date {
                form.date = date;
            }
            form.patient_name = name;
            form.age = age;
            form.gender = gender;
            form.prakriti = prakriti;
            form.complaint = complaint;
            form.diagnosis = diagnosis;
            form.follow_up = follow_up;

            let mut session = Session::new();
            session.show_entry();
            match session.submit_entry(&*store, &form) {
                Ok(_) => println!("OPD entry added successfully"),
                Err(DashboardError::Validation(e)) => anyhow::bail!("Invalid entry: {}", e),
                Err(e) => return Err(e).context("Failed to save OPD entry"),
            }
            print_overview(&session, &*store, OutputFormat::Table)?;
        }

        Commands::Generate { instruction } => {
            let records = store.fetch_all().context("Failed to load OPD records")?;
            let client = OpenAiClient::new(&config.inference)?;
            match generate_response(&client, &records, &instruction)? {
                GenerateOutcome::Warning(warning) => eprintln!("Warning: {}", warning),
                GenerateOutcome::Response(text) => println!("{}", text),
            }
        }

        Commands::Init => {
            if store.ensure_header().context("Failed to initialize store")? {
                println!("Header row written.");
            } else {
                println!("Store already initialized.");
            }
        }

        Commands::Interactive => {
            let client = OpenAiClient::new(&config.inference)?;
            let stdin = io::stdin();
            interactive::run_session(&*store, &client, stdin.lock(), &mut io::stdout())?;
        }
    }

    Ok(())
}

fn print_overview(
    session: &Session,
    store: &dyn RecordStore,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let page = session
        .render_overview(store)
        .context("Failed to load OPD records")?;
    print!("{}", format_page(&page, session.date_filter(), format)?);
    Ok(())
}
