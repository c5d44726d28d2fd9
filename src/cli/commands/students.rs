use clap::Subcommand;
use serde_json::json;

use crate::cli::context::Portal;
use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::types::StudentUpdate;
use crate::views::StudentRoster;

#[derive(Subcommand)]
pub enum StudentCommands {
    #[command(about = "List all students")]
    List {
        #[arg(long, help = "Filter by name or student number")]
        search: Option<String>,
    },

    #[command(about = "Select the student the other views show")]
    Select {
        #[arg(help = "Student ID")]
        id: String,
    },

    #[command(about = "Show the selected student")]
    Current,

    #[command(about = "Update the selected student's record")]
    Update {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        major: Option<String>,
        #[arg(long)]
        semester: Option<u32>,
    },
}

pub async fn handle(cmd: StudentCommands, portal: &Portal, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        StudentCommands::List { search } => {
            portal.require_login()?;
            let roster = StudentRoster::new(portal.service());
            let students = roster.load().await?;
            let shown = StudentRoster::filter(&students, search.as_deref().unwrap_or(""));

            if shown.is_empty() {
                return output_empty_collection(&output_format, "students", "No students found");
            }

            let current = portal.session.student().current_id();
            match output_format {
                OutputFormat::Json => output_json(&json!({ "students": shown })),
                OutputFormat::Text => {
                    println!("{:<8} {:<28} {:<12} {:<20} {:>4} {:>5}", "ID", "NAME", "NUMBER", "MAJOR", "SEM", "GPA");
                    println!("{}", "-".repeat(82));
                    for s in shown {
                        let marker = if current.as_deref() == Some(s.id.as_str()) { "*" } else { " " };
                        println!(
                            "{}{:<7} {:<28} {:<12} {:<20} {:>4} {:>5.2}",
                            marker, s.id, s.name, s.student_id, s.major, s.semester, s.gpa
                        );
                    }
                    Ok(())
                }
            }
        }
        StudentCommands::Select { id } => {
            portal.require_login()?;
            let roster = StudentRoster::new(portal.service());
            let student = roster.select(&portal.session, &id).await?;

            output_success(
                &output_format,
                &format!("Selected {} ({})", student.name, student.id),
                Some(json!({ "student": student })),
            )
        }
        StudentCommands::Current => {
            let student = portal.session.student().current();
            match output_format {
                OutputFormat::Json => output_json(&json!({ "current_student": student })),
                OutputFormat::Text => {
                    match student {
                        Some(s) => {
                            println!("Current student: {} ({})", s.name, s.id);
                            println!("Number: {}", s.student_id);
                            println!("Email: {}", s.email);
                            println!("Major: {}, semester {}", s.major, s.semester);
                        }
                        None => println!("No current student set"),
                    }
                    Ok(())
                }
            }
        }
        StudentCommands::Update { name, email, major, semester } => {
            let selected = portal.require_student()?;
            let update = StudentUpdate { name, email, major, semester };
            if update.is_empty() {
                return Err(anyhow::anyhow!("Nothing to update. Pass at least one of --name, --email, --major, --semester"));
            }

            let updated = portal.client.update_student(&selected.id, &update).await?;
            // keep the stored copy in step with the service
            portal.session.select_student(updated.clone())?;

            output_success(
                &output_format,
                &format!("Updated {} ({})", updated.name, updated.id),
                Some(json!({ "student": updated })),
            )
        }
    }
}
