use clap::Subcommand;
use serde_json::json;

use crate::cli::context::{numeric_id, Portal};
use crate::cli::utils::*;
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum CatalogCommands {
    #[command(about = "List all subjects offered")]
    List,

    #[command(about = "Show one subject")]
    Show {
        #[arg(help = "Subject ID")]
        id: String,
    },
}

pub async fn handle(cmd: CatalogCommands, portal: &Portal, output_format: OutputFormat) -> anyhow::Result<()> {
    portal.require_login()?;
    match cmd {
        CatalogCommands::List => {
            let subjects = portal.client.list_subjects().await?;
            if subjects.is_empty() {
                return output_empty_collection(&output_format, "subjects", "No subjects found");
            }

            match output_format {
                OutputFormat::Json => output_json(&json!({ "subjects": subjects })),
                OutputFormat::Text => {
                    println!("{:<6} {:<10} {:<30} {:<20} {:>7}", "ID", "CODE", "NAME", "INSTRUCTOR", "CREDITS");
                    println!("{}", "-".repeat(78));
                    for s in &subjects {
                        let credits = s.credits.map(|c| c.to_string()).unwrap_or_else(|| "-".to_string());
                        println!(
                            "{:<6} {:<10} {:<30} {:<20} {:>7}",
                            or_dash(s.id.as_deref()),
                            s.code,
                            s.name,
                            or_dash(s.instructor.as_deref()),
                            credits
                        );
                    }
                    Ok(())
                }
            }
        }
        CatalogCommands::Show { id } => {
            let subject = portal.client.get_subject(&id).await?;
            match output_format {
                OutputFormat::Json => output_json(&subject),
                OutputFormat::Text => {
                    println!("Subject: {} ({})", subject.name, subject.code);
                    println!("Instructor: {}", or_dash(subject.instructor.as_deref()));
                    if let Some(credits) = subject.credits {
                        println!("Credits: {}", credits);
                    }
                    if let Some(semester) = subject.semester {
                        println!("Semester: {}", semester);
                    }
                    println!("Location: {}", or_dash(subject.location.as_deref()));
                    println!("Schedule: {}", or_dash(subject.schedule.as_deref()));
                    Ok(())
                }
            }
        }
    }
}

pub async fn enroll(portal: &Portal, subject_id: u64, output_format: OutputFormat) -> anyhow::Result<()> {
    let student = portal.require_student()?;
    let echoed = portal.client.enroll(numeric_id(&student)?, subject_id).await?;

    output_success(
        &output_format,
        &format!("Enrolled {} in subject {}", student.name, subject_id),
        Some(json!({ "enrollment": echoed })),
    )
}

pub async fn drop_subject(portal: &Portal, subject_id: u64, output_format: OutputFormat) -> anyhow::Result<()> {
    let student = portal.require_student()?;
    portal.client.drop_enrollment(numeric_id(&student)?, subject_id).await?;

    output_success(
        &output_format,
        &format!("Dropped subject {} for {}", subject_id, student.name),
        None,
    )
}
