use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use sehamaroc_lib::config::{ConfigError, PortalConfig};
use sehamaroc_lib::i18n::Language;
use sehamaroc_lib::mock::{self, MockError};
use sehamaroc_lib::models::{ModelError, Role};
use sehamaroc_lib::portal::{Notice, PageError, Portal};
use sehamaroc_lib::session::{FileStorage, SessionError};
use sehamaroc_lib::views::auth::AuthView;
use sehamaroc_lib::views::patient_certificates::PatientCertificates;
use sehamaroc_lib::views::patient_requests::{PatientRequests, RequestDraft, ANY_DOCTOR};
use sehamaroc_lib::views::provider_certificates::ProviderCertificates;
use sehamaroc_lib::views::provider_patients::{PatientAction, ProviderPatients};
use sehamaroc_lib::views::{render_view, ViewName};

#[derive(Parser)]
#[command(name = "sehamaroc", version, about = "SehaMaroc patient and provider portal")]
struct Cli {
    /// Directory holding the persisted session
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    /// One base URL for all four services (mock backend, gateway)
    #[arg(long, global = true)]
    base_url: Option<String>,
    #[arg(long, global = true)]
    patient_url: Option<String>,
    #[arg(long, global = true)]
    provider_url: Option<String>,
    #[arg(long, global = true)]
    requests_url: Option<String>,
    #[arg(long, global = true)]
    providers_url: Option<String>,
    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Log in as a patient or a provider
    Login {
        #[arg(long)]
        role: Role,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Create a patient account
    Register {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    Logout,
    /// Show the stored session
    Whoami,
    /// Set the display language (en, fr, ar)
    Language { language: Language },
    /// Render a portal page as text
    View { name: ViewName },
    /// Patient requests
    Request {
        #[command(subcommand)]
        command: RequestCommand,
    },
    /// Provider patient management
    Patients {
        #[command(subcommand)]
        command: PatientsCommand,
    },
    /// Certificates
    Certificate {
        #[command(subcommand)]
        command: CertificateCommand,
    },
    /// Run the in-memory demo backend; pass its URL to other commands
    /// with --base-url
    MockServer {
        #[arg(long, default_value_t = 8080)]
        port: u16,
    },
}

#[derive(Subcommand)]
enum RequestCommand {
    /// Submit a new request
    New {
        #[arg(long = "type", default_value = "Consultation")]
        request_type: String,
        #[arg(long, default_value = "MED")]
        priority: String,
        #[arg(long)]
        subject: String,
        #[arg(long)]
        description: String,
        /// Preferred date, YYYY-MM-DD
        #[arg(long)]
        date: NaiveDate,
        /// Provider id, or "any"
        #[arg(long, default_value = ANY_DOCTOR)]
        doctor: String,
    },
}

#[derive(Subcommand)]
enum PatientsCommand {
    Assign { id: String },
    Unassign { id: String },
    Activate { id: String },
    Suspend {
        id: String,
        #[arg(long, default_value = "")]
        reason: String,
    },
}

#[derive(Subcommand)]
enum CertificateCommand {
    /// Save the printable PDF
    Print {
        id: String,
        #[arg(long)]
        out: PathBuf,
    },
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Page(#[from] PageError),
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Mock(#[from] MockError),
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

fn build_config(cli: &Cli) -> Result<PortalConfig, ConfigError> {
    let mut config = PortalConfig::from_env()?;
    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(base) = &cli.base_url {
        config.set_base_url(base)?;
    }
    let overrides = [
        ("patient", &cli.patient_url),
        ("provider", &cli.provider_url),
        ("requests", &cli.requests_url),
        ("providers", &cli.providers_url),
    ];
    for (field, value) in overrides {
        if let Some(url) = value {
            config.set_endpoint(field, url)?;
        }
    }
    Ok(config)
}

fn print_notice(notice: &Notice) {
    println!("{}: {}", notice.title, notice.description);
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = build_config(&cli)?;

    if let Command::MockServer { port } = cli.command {
        let addr = SocketAddr::from(([127, 0, 0, 1], port));
        println!("Mock backend on http://{addr} (demo password: {})", mock::DEMO_PASSWORD);
        println!("Point other commands at it with: --base-url http://{addr}");
        mock::serve(addr, async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;
        return Ok(());
    }

    let storage = FileStorage::new(config.storage_file());
    let mut portal = Portal::from_config(storage, &config)?;

    match cli.command {
        Command::Login { role, email, password } => {
            let outcome = AuthView::new().login(&portal, role, &email, &password).await?;
            print_notice(&outcome.notice);
            println!("Next: {}", outcome.redirect);
        }
        Command::Register { email, password } => {
            let outcome = AuthView::new()
                .register_patient(&portal, &email, &password, &password)
                .await?;
            print_notice(&outcome.notice);
            println!("Next: {}", outcome.redirect);
        }
        Command::Logout => {
            let route = AuthView::logout(&portal)?;
            println!("Logged out. Next: {route}");
        }
        Command::Whoami => match portal.current_session()? {
            Some(session) => {
                let status = session.user.account_status.map(|s| s.as_str()).unwrap_or("-");
                println!("{} ({}) status {status}", session.user.email, session.user.role.label());
            }
            None => println!("Not logged in"),
        },
        Command::Language { language } => {
            portal.set_language(language)?;
            println!("Language set to {language}");
        }
        Command::View { name } => {
            print!("{}", render_view(&portal, name).await?);
        }
        Command::Request {
            command:
                RequestCommand::New {
                    request_type,
                    priority,
                    subject,
                    description,
                    date,
                    doctor,
                },
        } => {
            let draft = RequestDraft {
                request_type,
                priority,
                subject,
                description,
                preferred_date: Some(date),
                doctor,
            };
            let mut view = PatientRequests::mount(&portal).await?;
            print_notice(&view.submit(&portal, &draft).await?);
            print!("{}", view.render(portal.language()));
        }
        Command::Patients { command } => {
            let (id, action) = match command {
                PatientsCommand::Assign { id } => (id, PatientAction::Assign),
                PatientsCommand::Unassign { id } => (id, PatientAction::Unassign),
                PatientsCommand::Activate { id } => (id, PatientAction::Activate),
                PatientsCommand::Suspend { id, reason } => (id, PatientAction::Suspend(reason)),
            };
            let mut view = ProviderPatients::mount(&portal).await?;
            print_notice(&view.apply(&portal, &id, action).await?);
            print!("{}", view.render(portal.language()));
        }
        Command::Certificate {
            command: CertificateCommand::Print { id, out },
        } => {
            let role = portal.current_session()?.map(|s| s.user.role);
            let pdf = match role {
                Some(Role::Provider) => ProviderCertificates::mount(&portal).await?.print(&portal, &id).await?,
                _ => PatientCertificates::mount(&portal).await?.print(&portal, &id).await?,
            };
            std::fs::write(&out, &pdf).map_err(|source| CliError::Write {
                path: out.clone(),
                source,
            })?;
            println!("Saved {} bytes to {}", pdf.len(), out.display());
        }
        Command::MockServer { .. } => {}
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    sehamaroc_lib::init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(CliError::Page(PageError::Redirect(route))) if route.is_login() => {
            eprintln!("Please log in first ({route})");
            ExitCode::FAILURE
        }
        Err(CliError::Page(PageError::Redirect(route))) => {
            eprintln!("This page is not available for the logged-in account ({route})");
            ExitCode::FAILURE
        }
        Err(CliError::Page(PageError::Notice(notice))) => {
            eprintln!("{}: {}", notice.title, notice.description);
            ExitCode::FAILURE
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
