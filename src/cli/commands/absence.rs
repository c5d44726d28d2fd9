use chrono::NaiveDate;
use clap::Subcommand;
use serde_json::json;

use crate::cli::context::{numeric_id, Portal};
use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::types::NewAbsence;

#[derive(Subcommand)]
pub enum AbsenceCommands {
    #[command(about = "Record an absence for the selected student")]
    Record {
        #[arg(long, help = "Subject ID")]
        subject: u64,
        #[arg(long, help = "Date of the absence (YYYY-MM-DD)")]
        date: NaiveDate,
        #[arg(long, help = "Reason for the absence")]
        reason: String,
        #[arg(long, default_value = "", help = "Additional comment")]
        comment: String,
    },

    #[command(about = "List raw absence records of the selected student")]
    List {
        #[arg(long, help = "Only records for this subject ID")]
        subject: Option<String>,
    },
}

pub async fn handle(cmd: AbsenceCommands, portal: &Portal, output_format: OutputFormat) -> anyhow::Result<()> {
    let student = portal.require_student()?;
    match cmd {
        AbsenceCommands::Record { subject, date, reason, comment } => {
            if reason.trim().is_empty() {
                return Err(anyhow::anyhow!("A reason is required"));
            }
            let absence = NewAbsence {
                student_id: numeric_id(&student)?,
                subject_id: subject,
                date,
                reason,
                comment,
            };
            let record = portal.client.create_absence(&absence).await?;

            output_success(
                &output_format,
                &format!("Absence on {} recorded for {}", absence.date, student.name),
                Some(json!({ "absence": record })),
            )
        }
        AbsenceCommands::List { subject } => {
            let records = match subject.as_deref() {
                Some(subject_id) => portal.client.list_absences_for_subject(&student.id, subject_id).await?,
                None => portal.client.list_absences(&student.id).await?,
            };
            if records.is_empty() {
                return output_empty_collection(&output_format, "absences", "No absences recorded");
            }

            match output_format {
                OutputFormat::Json => output_json(&json!({ "absences": records })),
                OutputFormat::Text => {
                    println!("{:<8} {:<12} {:<30} {}", "ID", "DATE", "SUBJECT", "DETAIL");
                    println!("{}", "-".repeat(80));
                    for r in &records {
                        println!(
                            "{:<8} {:<12} {:<30} {}",
                            r.id,
                            r.date,
                            or_dash(r.subject_name.as_deref()),
                            r.detail()
                        );
                    }
                    Ok(())
                }
            }
        }
    }
}
