use clap::Subcommand;
use serde_json::json;

use crate::cli::context::Portal;
use crate::cli::utils::*;
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Store the API key used for every request")]
    Login {
        #[arg(help = "API key (defaults to PORTAL_API_KEY)")]
        api_key: Option<String>,
    },

    #[command(about = "Forget the API key and the selected student")]
    Logout,

    #[command(about = "Show current authentication status")]
    Status,
}

pub async fn handle(cmd: AuthCommands, portal: &Portal, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        AuthCommands::Login { api_key } => {
            let api_key = api_key
                .or_else(|| portal.config.backend.default_api_key.clone())
                .ok_or_else(|| anyhow::anyhow!("No API key given. Pass one or set PORTAL_API_KEY"))?;

            portal.session.login(&api_key)?;

            output_success(
                &output_format,
                "API key saved. Select a student with `portal students select <ID>`",
                Some(json!({ "route": portal.session.navigator().current().path() })),
            )
        }
        AuthCommands::Logout => {
            portal.session.logout()?;
            output_success(&output_format, "Logged out", None)
        }
        AuthCommands::Status => {
            let authenticated = portal.session.is_authenticated();
            let student = portal.session.student().current();

            match output_format {
                OutputFormat::Json => output_json(&json!({
                    "authenticated": authenticated,
                    "backend": portal.client.base_url().as_str(),
                    "route": portal.session.navigator().current().path(),
                    "student": student,
                })),
                OutputFormat::Text => {
                    println!("Backend: {}", portal.client.base_url());
                    if authenticated {
                        println!("Status: logged in");
                    } else {
                        println!("Status: not logged in");
                    }
                    match student {
                        Some(s) => println!("Student: {} ({})", s.name, s.id),
                        None => println!("Student: none selected"),
                    }
                    Ok(())
                }
            }
        }
    }
}
