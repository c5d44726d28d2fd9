pub mod commands;
pub mod context;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use crate::session::Route;
use context::Portal;

#[derive(Parser)]
#[command(name = "portal")]
#[command(about = "Student portal - browse students, subjects and absences from the academic records service")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in human-readable text format")]
    pub text: bool,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "API key login, logout and status")]
    Auth {
        #[command(subcommand)]
        cmd: commands::auth::AuthCommands,
    },

    #[command(about = "List, select and update students")]
    Students {
        #[command(subcommand)]
        cmd: commands::students::StudentCommands,
    },

    #[command(about = "Overview of the selected student")]
    Dashboard,

    #[command(about = "Subjects the selected student is enrolled in")]
    Subjects {
        #[arg(long, help = "Filter by subject name or code")]
        search: Option<String>,
    },

    #[command(about = "Absences of the selected student grouped by subject")]
    Absences {
        #[arg(long, help = "Filter by subject name")]
        search: Option<String>,
        #[arg(long, help = "Only show this subject (exact name)")]
        subject: Option<String>,
    },

    #[command(about = "Absence totals and attendance rate of the selected student")]
    Summary,

    #[command(about = "Profile of the selected student")]
    Profile,

    #[command(about = "Browse the subject catalog")]
    Catalog {
        #[command(subcommand)]
        cmd: commands::catalog::CatalogCommands,
    },

    #[command(about = "Enroll the selected student in a subject")]
    Enroll {
        #[arg(help = "Subject ID")]
        subject_id: u64,
    },

    #[command(about = "Drop a subject for the selected student")]
    Drop {
        #[arg(help = "Subject ID")]
        subject_id: u64,
    },

    #[command(about = "Record and list absences")]
    Absence {
        #[command(subcommand)]
        cmd: commands::absence::AbsenceCommands,
    },

    #[command(about = "Check that the academic service is reachable")]
    Health,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let portal = Portal::open(crate::config::config())?;

    let was_authenticated = portal.session.is_authenticated();
    let is_logout = matches!(
        cli.command,
        Commands::Auth { cmd: commands::auth::AuthCommands::Logout }
    );

    let result = dispatch(cli.command, &portal, output_format).await;

    // a 401 anywhere tears the session down and lands on the login route
    if was_authenticated && !is_logout && portal.session.navigator().current() == Route::Login {
        return Err(anyhow::anyhow!(
            "The API key was rejected by the service and has been cleared. Log in again with `portal auth login`"
        ));
    }
    result
}

async fn dispatch(command: Commands, portal: &Portal, output_format: OutputFormat) -> anyhow::Result<()> {
    match command {
        Commands::Auth { cmd } => commands::auth::handle(cmd, portal, output_format).await,
        Commands::Students { cmd } => commands::students::handle(cmd, portal, output_format).await,
        Commands::Dashboard => commands::views::dashboard(portal, output_format).await,
        Commands::Subjects { search } => commands::views::subjects(portal, search, output_format).await,
        Commands::Absences { search, subject } => {
            commands::views::absences(portal, search, subject, output_format).await
        }
        Commands::Summary => commands::views::summary(portal, output_format).await,
        Commands::Profile => commands::views::profile(portal, output_format).await,
        Commands::Catalog { cmd } => commands::catalog::handle(cmd, portal, output_format).await,
        Commands::Enroll { subject_id } => commands::catalog::enroll(portal, subject_id, output_format).await,
        Commands::Drop { subject_id } => commands::catalog::drop_subject(portal, subject_id, output_format).await,
        Commands::Absence { cmd } => commands::absence::handle(cmd, portal, output_format).await,
        Commands::Health => commands::health::handle(portal, output_format).await,
    }
}
