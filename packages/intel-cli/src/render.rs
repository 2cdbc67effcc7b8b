//! Terminal output for candidates, reports and registry records.

use colored::{ColoredString, Colorize};
use project_discovery::{
    CandidateProject, Classification, ExtractedProject, ImportAction, ImportReport, ProjectRecord,
};

/// "SAR 1.5B", "SAR 400.0M", or "-" when unknown.
pub fn format_sar(value: Option<f64>) -> String {
    match value {
        Some(v) if v >= 1_000_000_000.0 => format!("SAR {:.1}B", v / 1_000_000_000.0),
        Some(v) if v >= 1_000_000.0 => format!("SAR {:.1}M", v / 1_000_000.0),
        Some(v) if v > 0.0 => format!("SAR {v:.0}"),
        _ => "-".to_string(),
    }
}

/// Pad or cut to exactly `width` characters.
fn cell(value: &str, width: usize) -> String {
    let count = value.chars().count();
    if count <= width {
        format!("{value}{}", " ".repeat(width - count))
    } else {
        let kept: String = value.chars().take(width.saturating_sub(1)).collect();
        format!("{kept}…")
    }
}

fn classification_badge(classification: Classification) -> ColoredString {
    let label = cell(classification.as_str(), 8);
    match classification {
        Classification::New => label.bright_green(),
        Classification::Backlog => label.yellow(),
        Classification::Review => label.bright_red(),
    }
}

pub fn print_candidates(candidates: &[CandidateProject]) {
    if candidates.is_empty() {
        println!("{}", "No staged candidates".dimmed());
        return;
    }

    println!(
        "{}",
        format!(
            "{:>3}  {}  {}  {}  {}  {}  {}",
            "#",
            cell("Class", 8),
            cell("Project", 36),
            cell("City", 14),
            cell("Value", 12),
            cell("Developer", 24),
            "Match"
        )
        .bold()
    );

    for (index, c) in candidates.iter().enumerate() {
        let name = if c.needs_review() {
            format!("{} ?", cell(&c.project_name, 34)).yellow()
        } else {
            cell(&c.project_name, 36).normal()
        };
        let matched = match &c.existing_project_id {
            Some(id) => format!("merge → {id}").cyan(),
            None => "new".green(),
        };
        println!(
            "{:>3}  {}  {}  {}  {}  {}  {}",
            index + 1,
            classification_badge(c.classification),
            name,
            cell(c.city.as_str(), 14),
            cell(&format_sar(c.estimated_value), 12),
            cell(&c.developer, 24),
            matched
        );
    }

    let review = candidates.iter().filter(|c| c.needs_review()).count();
    let duplicates = candidates.iter().filter(|c| c.is_duplicate).count();
    println!();
    println!(
        "{} staged, {} flagged for review, {} matching existing projects",
        candidates.len(),
        review.to_string().yellow(),
        duplicates.to_string().cyan()
    );
}

pub fn print_extraction(result: &ExtractedProject) {
    let row = |label: &str, value: &str, defaulted: bool| {
        let value = if defaulted {
            format!("{value} (default)").dimmed()
        } else {
            value.normal()
        };
        println!("  {} {}", cell(label, 14).bold(), value);
    };

    use project_discovery::CandidateField as F;
    row("Name", &result.name, result.is_defaulted(F::Name));
    row("Type", result.project_type.as_str(), result.is_defaulted(F::ProjectType));
    row("City", result.city.as_str(), result.is_defaulted(F::City));
    row("Region", &result.region, result.is_defaulted(F::City));
    row(
        "Value",
        &format_sar(result.known_value()),
        result.is_defaulted(F::EstimatedValue),
    );
    row("Developer", &result.developer, result.is_defaulted(F::Developer));
    row("Status", result.status.as_str(), result.is_defaulted(F::Status));
    for (label, value) in [
        ("Contractor", &result.contractor),
        ("Consultant", &result.consultant),
        ("Operator", &result.operator),
        ("Opening", &result.target_opening),
        ("Kitchen notes", &result.relevance_notes),
    ] {
        if let Some(value) = value {
            row(label, value, false);
        }
    }
    for person in &result.people {
        row("Person", &format!("{} ({})", person.name, person.role), false);
    }
    row("Confidence", &format!("{:.2}", result.confidence()), false);
    println!();
    println!("  {}", result.summary.dimmed());
}

pub fn print_report(report: &ImportReport) {
    for action in &report.actions {
        match action {
            ImportAction::Created {
                project_id,
                name,
                city,
                value_sar,
                ..
            } => println!(
                "{} {} ({}, {}) as {}",
                "created".bright_green().bold(),
                name,
                city,
                format_sar(Some(*value_sar)),
                project_id
            ),
            ImportAction::Merged {
                project_id,
                old_status,
                new_status,
                ..
            } => println!(
                "{} into {} ({} → {})",
                "merged ".cyan().bold(),
                project_id,
                old_status,
                new_status
            ),
            ImportAction::Skipped {
                candidate_id,
                reason,
            } => println!(
                "{} {}: {}",
                "skipped".yellow().bold(),
                candidate_id,
                reason
            ),
        }
    }
    println!(
        "\n{} created, {} merged, {} skipped",
        report.created(),
        report.merged(),
        report.skipped()
    );
}

pub fn print_projects(projects: &[ProjectRecord]) {
    println!(
        "{}",
        format!(
            "{}  {}  {}  {}  {}  {}",
            cell("Id", 20),
            cell("Project", 36),
            cell("City", 14),
            cell("Status", 10),
            cell("Value", 12),
            "Updated"
        )
        .bold()
    );
    for p in projects {
        println!(
            "{}  {}  {}  {}  {}  {}",
            cell(p.id.as_str(), 20),
            cell(&p.name, 36),
            cell(p.city.as_str(), 14),
            cell(p.status.as_str(), 10),
            cell(&format_sar(Some(p.estimated_value_sar)), 12),
            p.last_updated.format("%Y-%m-%d")
        );
    }
    println!("\n{} projects", projects.len());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_sar_scales() {
        assert_eq!(format_sar(Some(1_500_000_000.0)), "SAR 1.5B");
        assert_eq!(format_sar(Some(400_000_000.0)), "SAR 400.0M");
        assert_eq!(format_sar(Some(950.0)), "SAR 950");
        assert_eq!(format_sar(Some(0.0)), "-");
        assert_eq!(format_sar(None), "-");
    }

    #[test]
    fn test_cell_pads_and_truncates_by_chars() {
        assert_eq!(cell("Abha", 6), "Abha  ");
        assert_eq!(cell("مشروع فندق جديد", 5), "مشرو…");
        assert_eq!(cell("exact", 5), "exact");
    }
}
