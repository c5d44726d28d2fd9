use serde::Serialize;

use crate::cli::context::Portal;
use crate::cli::utils::*;
use crate::cli::OutputFormat;
use crate::session::Route;
use crate::views::absences::AbsenceSummaryData;
use crate::views::subjects::MAX_ENROLLED_SUBJECTS;
use crate::views::{
    AbsenceSummaryView, AbsencesView, DashboardView, ProfileView, SubjectsView, ViewLoader, ViewOrchestrator, ViewState,
};

/// Load one student-keyed view for the selected student
async fn load<L: ViewLoader>(portal: &Portal, loader: L) -> anyhow::Result<ViewState<L::Output>> {
    portal.require_student()?;
    let view = ViewOrchestrator::new(loader, portal.service());
    Ok(view.sync(portal.session.student().current().as_ref()).await)
}

/// Idle after a 401 means the session is gone; the caller reports that
fn rejected<T>(portal: &Portal, state: &ViewState<T>) -> bool {
    matches!(state, ViewState::Idle) && portal.session.navigator().current() == Route::Login
}

fn show<T: Serialize>(
    portal: &Portal,
    output_format: &OutputFormat,
    name: &str,
    state: ViewState<T>,
    text: impl FnOnce(&T),
) -> anyhow::Result<()> {
    if rejected(portal, &state) {
        return Ok(());
    }
    output_view(output_format, name, &state, text)
}

pub async fn dashboard(portal: &Portal, output_format: OutputFormat) -> anyhow::Result<()> {
    let state = load(portal, DashboardView).await?;
    show(portal, &output_format, "dashboard", state, |data| {
        println!("Enrolled subjects: {}", data.total_subjects);
        println!("Total absences:    {}", data.total_absences());
        println!("Justified:         {}", data.total_justified());
        if !data.subject_names.is_empty() {
            println!();
            for name in &data.subject_names {
                println!("  - {}", name);
            }
        }
        if !data.absences.is_empty() {
            println!();
            println!("Recent absences:");
            for record in data.absences.iter().rev().take(5) {
                println!("  {} {}", record.date, or_dash(record.subject_name.as_deref()));
            }
        }
    })
}

pub async fn subjects(portal: &Portal, search: Option<String>, output_format: OutputFormat) -> anyhow::Result<()> {
    let state = load(portal, SubjectsView).await?;
    let search = search.unwrap_or_default();
    show(portal, &output_format, "subjects", state, |data| {
        let shown = data.filter(&search);
        if shown.is_empty() {
            println!("No enrolled subjects");
            return;
        }
        println!("{:<10} {:<30} {:<20} {:>7} {}", "CODE", "NAME", "INSTRUCTOR", "CREDITS", "SCHEDULE");
        println!("{}", "-".repeat(90));
        for e in shown {
            let s = &e.subject;
            let credits = s.credits.map(|c| c.to_string()).unwrap_or_else(|| "-".to_string());
            println!(
                "{:<10} {:<30} {:<20} {:>7} {}",
                s.code,
                s.name,
                or_dash(s.instructor.as_deref()),
                credits,
                or_dash(s.schedule.as_deref())
            );
        }
        if data.over_enrollment_limit() {
            println!();
            println!("Reminder: students may be enrolled in at most {} subjects", MAX_ENROLLED_SUBJECTS);
        }
    })
}

pub async fn absences(
    portal: &Portal,
    search: Option<String>,
    subject: Option<String>,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let state = load(portal, AbsencesView).await?;
    let search = search.unwrap_or_default();
    show(portal, &output_format, "absences", state, |data| {
        let groups = data.filtered(&search, subject.as_deref());
        if groups.is_empty() {
            println!("No absences recorded");
            return;
        }
        for group in groups {
            println!(
                "{} ({} absences, {} justified, {} sessions)",
                group.subject, group.totals.absences, group.totals.justified, group.totals.total
            );
            for record in &group.records {
                println!("  {:<12} {}", record.date, record.detail());
            }
        }
        println!();
        println!("Subjects: {}", data.subject_options().join(", "));
    })
}

pub async fn summary(portal: &Portal, output_format: OutputFormat) -> anyhow::Result<()> {
    let state = load(portal, AbsenceSummaryView).await?;
    show(portal, &output_format, "summary", state, |data: &AbsenceSummaryData| {
        println!("{:<30} {:>8} {:>9} {:>9}", "SUBJECT", "SESSIONS", "ABSENCES", "JUSTIFIED");
        println!("{}", "-".repeat(60));
        for (subject, totals) in &data.summary.by_subject {
            println!(
                "{:<30} {:>8} {:>9} {:>9}",
                subject, totals.total, totals.absences, totals.justified
            );
        }
        println!("{}", "-".repeat(60));
        println!(
            "{:<30} {:>8} {:>9} {:>9}",
            "TOTAL", data.totals.total, data.totals.absences, data.totals.justified
        );
        println!("Attendance rate: {:.1}%", data.attendance_rate);
    })
}

pub async fn profile(portal: &Portal, output_format: OutputFormat) -> anyhow::Result<()> {
    let state = load(portal, ProfileView).await?;
    show(portal, &output_format, "profile", state, |data| {
        let s = &data.student;
        println!("Name: {}", s.name);
        println!("Student number: {}", s.student_id);
        println!("Email: {}", s.email);
        println!("Major: {}", s.major);
        println!("Semester: {}", s.semester);
        println!("GPA: {:.2}", s.gpa);
        println!("Total credits: {}", s.total_credits);
        if let Some(date) = &s.enrollment_date {
            println!("Enrolled since: {}", date);
        }
        println!("Current subjects: {} ({} credits)", data.enrollments.len(), data.enrolled_credits);
    })
}
