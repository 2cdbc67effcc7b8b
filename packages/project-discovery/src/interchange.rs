//! CSV interchange for staged candidates.
//!
//! Export writes every staged candidate with all cells quoted. Import maps
//! spreadsheet headers onto candidate fields by keyword and stages each row
//! as a candidate that needs review.

use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeSet;
use std::io::{Read, Write};
use tracing::{debug, warn};

use crate::error::Result;
use crate::pipeline::extract::UNKNOWN_DEVELOPER;
use crate::types::candidate::{CandidateField, CandidateId, CandidateProject, Classification};
use crate::types::location::City;
use crate::types::project::{ProjectStatus, ProjectType};

lazy_static! {
    // Digits with grouping marks, then an optional magnitude word
    static ref AMOUNT: Regex = Regex::new(
        r"(?i)(\d[\d.,' \u{a0}]*\d|\d)\s*(billion|bn|b|million|mn|mil|m|thousand|k)?\b"
    ).unwrap();
}

pub const CANDIDATE_HEADER: [&str; 20] = [
    "id",
    "projectName",
    "type",
    "city",
    "region",
    "developer",
    "contractor",
    "consultant",
    "operator",
    "status",
    "expectedOpening",
    "estimatedValue",
    "classification",
    "isDuplicate",
    "existingProjectId",
    "sourceUrl",
    "sourceTitle",
    "publishDate",
    "kitchenNotes",
    "summary",
];

/// Write staged candidates as CSV.
pub fn write_candidates_csv(candidates: &[CandidateProject], writer: impl Write) -> Result<()> {
    let mut csv = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);

    csv.write_record(CANDIDATE_HEADER)?;
    for c in candidates {
        csv.write_record([
            c.id.to_string(),
            c.project_name.clone(),
            c.project_type.to_string(),
            c.city.to_string(),
            c.region.clone(),
            c.developer.clone(),
            c.contractor.clone().unwrap_or_default(),
            c.consultant.clone().unwrap_or_default(),
            c.operator.clone().unwrap_or_default(),
            c.status.to_string(),
            c.target_opening.clone().unwrap_or_default(),
            c.estimated_value.map(|v| format!("{v:.0}")).unwrap_or_default(),
            c.classification.to_string(),
            c.is_duplicate.to_string(),
            c.existing_project_id
                .as_ref()
                .map(|id| id.to_string())
                .unwrap_or_default(),
            c.source_url.clone(),
            c.source_title.clone(),
            c.publish_date.to_rfc3339(),
            c.kitchen_notes.clone().unwrap_or_default(),
            c.summary.clone(),
        ])?;
    }
    csv.flush()?;
    Ok(())
}

/// Candidate field a spreadsheet column feeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportField {
    Name,
    Developer,
    City,
    EstimatedValue,
    Status,
    Contractor,
    ExpectedCompletion,
}

/// Guess the field for each header; `None` means the column is ignored.
pub fn map_headers<S: AsRef<str>>(headers: &[S]) -> Vec<Option<ImportField>> {
    headers
        .iter()
        .map(|h| {
            let head = h.as_ref().trim().to_lowercase();
            if head.contains("name") || head.contains("project") {
                Some(ImportField::Name)
            } else if head.contains("dev") || head.contains("client") {
                Some(ImportField::Developer)
            } else if head.contains("city") {
                Some(ImportField::City)
            } else if head.contains("val") || head.contains("cost") {
                Some(ImportField::EstimatedValue)
            } else if head.contains("status") {
                Some(ImportField::Status)
            } else if head.contains("contractor") {
                Some(ImportField::Contractor)
            } else if head.contains("completion") || head.contains("opening") {
                Some(ImportField::ExpectedCompletion)
            } else {
                None
            }
        })
        .collect()
}

/// Rows turned into candidates, plus rows that had no project name.
#[derive(Debug, Clone)]
pub struct CsvImport {
    pub candidates: Vec<CandidateProject>,
    pub skipped_rows: Vec<usize>,
}

/// Read spreadsheet rows into Review candidates.
///
/// `source` names the file and becomes the candidates' source title.
pub fn read_candidates_csv(
    reader: impl Read,
    source: &str,
    now: DateTime<Utc>,
) -> Result<CsvImport> {
    let mut csv = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = csv.headers()?.iter().map(|h| h.to_string()).collect();
    let mapping = map_headers(&headers);
    debug!(?mapping, "mapped CSV headers");

    let mut candidates = Vec::new();
    let mut skipped_rows = Vec::new();

    for (index, row) in csv.records().enumerate() {
        let row = row?;
        let cell = |field: ImportField| {
            mapping
                .iter()
                .position(|m| *m == Some(field))
                .and_then(|i| row.get(i))
                .filter(|v| !v.is_empty())
        };

        // header is line 1
        let line = index + 2;
        let Some(name) = cell(ImportField::Name) else {
            warn!(line, source, "CSV row without project name skipped");
            skipped_rows.push(line);
            continue;
        };

        let mut defaulted = BTreeSet::from([CandidateField::ProjectType]);

        let city = match cell(ImportField::City).map(str::parse::<City>) {
            Some(Ok(city)) => city,
            _ => {
                defaulted.insert(CandidateField::City);
                City::default()
            }
        };
        let developer = match cell(ImportField::Developer) {
            Some(dev) => dev.to_string(),
            None => {
                defaulted.insert(CandidateField::Developer);
                UNKNOWN_DEVELOPER.to_string()
            }
        };
        let status = match cell(ImportField::Status).map(str::parse::<ProjectStatus>) {
            Some(Ok(status)) => status,
            _ => {
                defaulted.insert(CandidateField::Status);
                ProjectStatus::default()
            }
        };
        let estimated_value = cell(ImportField::EstimatedValue).and_then(|raw| {
            let value = parse_amount(raw);
            if value.is_none() {
                warn!(line, source, value = raw, "unreadable estimated value left as default");
            }
            value
        });
        if estimated_value.is_none() {
            defaulted.insert(CandidateField::EstimatedValue);
        }

        candidates.push(CandidateProject {
            id: CandidateId::new(),
            project_name: name.to_string(),
            project_type: ProjectType::default(),
            city,
            region: city.region().to_string(),
            developer,
            contractor: cell(ImportField::Contractor).map(str::to_string),
            consultant: None,
            operator: None,
            status,
            target_opening: cell(ImportField::ExpectedCompletion).map(str::to_string),
            estimated_value,
            source_url: "#".to_string(),
            source_title: source.to_string(),
            publish_date: now,
            summary: format!("Imported from {source}, row {line}"),
            classification: Classification::Review,
            is_duplicate: false,
            existing_project_id: None,
            kitchen_notes: None,
            extracted_people: Vec::new(),
            defaulted_fields: defaulted,
        });
    }

    debug!(rows = candidates.len(), skipped = skipped_rows.len(), "CSV import parsed");
    Ok(CsvImport {
        candidates,
        skipped_rows,
    })
}

/// SAR amount from a spreadsheet cell.
///
/// Accepts currency words, `1,200,000` and `1.200.000` grouping, decimal
/// commas and a trailing magnitude (`2.5M`, `1.2 bn`, `300k`).
fn parse_amount(raw: &str) -> Option<f64> {
    let caps = AMOUNT.captures(raw)?;
    let digits = caps[1].replace(|c: char| matches!(c, ' ' | '\'' | '\u{a0}'), "");
    let number = normalize_separators(&digits, caps.get(2).is_some())?;
    let multiplier = match caps.get(2).map(|m| m.as_str().to_lowercase()) {
        Some(m) if matches!(m.as_str(), "b" | "bn" | "billion") => 1_000_000_000.0,
        Some(m) if matches!(m.as_str(), "m" | "mn" | "mil" | "million") => 1_000_000.0,
        Some(_) => 1_000.0,
        None => 1.0,
    };
    number
        .parse::<f64>()
        .ok()
        .map(|v| v * multiplier)
        .filter(|v| *v > 0.0)
}

/// Rewrite grouping and decimal marks into a plain `1234.5` literal.
fn normalize_separators(number: &str, scaled: bool) -> Option<String> {
    let commas = number.matches(',').count();
    let dots = number.matches('.').count();

    let decimal = match (commas, dots) {
        (0, 0) => None,
        (_, 0) => single_decimal(number, ',', commas, false),
        (0, _) => single_decimal(number, '.', dots, !scaled),
        _ => {
            // both present: whichever comes last is the decimal mark
            let last_comma = number.rfind(',')?;
            let last_dot = number.rfind('.')?;
            Some(if last_comma > last_dot { ',' } else { '.' })
        }
    };

    Some(
        number
            .chars()
            .filter_map(|c| match c {
                ',' | '.' if Some(c) == decimal => Some('.'),
                ',' | '.' => None,
                c => Some(c),
            })
            .collect(),
    )
}

/// Decide whether a lone separator kind marks decimals.
///
/// Repeated marks are always grouping. A single mark followed by exactly
/// three digits is grouping too, except a dot on a scaled amount (`1.250M`).
fn single_decimal(number: &str, mark: char, count: usize, dot_groups: bool) -> Option<char> {
    if count > 1 {
        return None;
    }
    let tail = number.rsplit(mark).next().unwrap_or_default();
    let grouped = tail.len() == 3 && (mark == ',' || dot_groups);
    (!grouped).then_some(mark)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::candidate;

    #[test]
    fn test_header_mapping_heuristics() {
        let mapped = map_headers(&["Project Name", "Client", "City", "Cost (SAR)", "Notes"]);
        assert_eq!(
            mapped,
            vec![
                Some(ImportField::Name),
                Some(ImportField::Developer),
                Some(ImportField::City),
                Some(ImportField::EstimatedValue),
                None,
            ]
        );
    }

    #[test]
    fn test_read_rows_as_review_candidates() {
        let data = "Project,Developer,City,Value,Status\n\
                    Makkah Gate Hotel,Umm Al Qura,Makkah,\"1,200,000,000\",awarded\n\
                    ,Nobody,Riyadh,5,\n\
                    Abha Retreat,,Atlantis,,\n";

        let import = read_candidates_csv(data.as_bytes(), "leads.csv", Utc::now()).unwrap();

        assert_eq!(import.skipped_rows, vec![3]);
        assert_eq!(import.candidates.len(), 2);

        let first = &import.candidates[0];
        assert_eq!(first.project_name, "Makkah Gate Hotel");
        assert_eq!(first.city, City::Makkah);
        assert_eq!(first.estimated_value, Some(1_200_000_000.0));
        assert_eq!(first.status, ProjectStatus::Awarded);
        assert_eq!(first.classification, Classification::Review);
        assert!(!first.defaulted_fields.contains(&CandidateField::City));

        let second = &import.candidates[1];
        assert_eq!(second.city, City::Riyadh);
        assert_eq!(second.developer, UNKNOWN_DEVELOPER);
        assert!(second.defaulted_fields.contains(&CandidateField::City));
        assert!(second.defaulted_fields.contains(&CandidateField::Developer));
        assert!(second.needs_review());
    }

    #[test]
    fn test_amount_formats_from_spreadsheets() {
        assert_eq!(parse_amount("SAR 1,200,000,000"), Some(1_200_000_000.0));
        assert_eq!(parse_amount("1.200.000"), Some(1_200_000.0));
        assert_eq!(parse_amount("1.200.000,50"), Some(1_200_000.5));
        assert_eq!(parse_amount("1,250,000.75"), Some(1_250_000.75));
        assert_eq!(parse_amount("2.5M"), Some(2_500_000.0));
        assert_eq!(parse_amount("1.250M"), Some(1_250_000.0));
        assert_eq!(parse_amount("SAR 1.2 bn"), Some(1_200_000_000.0));
        assert_eq!(parse_amount("300k"), Some(300_000.0));
        assert_eq!(parse_amount("750 million"), Some(750_000_000.0));
        assert_eq!(parse_amount("4,5"), Some(4.5));
        assert_eq!(parse_amount("1 500 000"), Some(1_500_000.0));
        assert_eq!(parse_amount("TBC"), None);
        assert_eq!(parse_amount("0"), None);
    }

    #[test]
    fn test_unreadable_value_is_defaulted() {
        let data = "Project,Value\nRiyadh Park Hotel,on request\nJeddah Bay,2.5M\n";
        let import = read_candidates_csv(data.as_bytes(), "leads.csv", Utc::now()).unwrap();

        assert_eq!(import.candidates[0].estimated_value, None);
        assert!(import.candidates[0]
            .defaulted_fields
            .contains(&CandidateField::EstimatedValue));
        assert_eq!(import.candidates[1].estimated_value, Some(2_500_000.0));
    }

    #[test]
    fn test_export_quotes_every_cell() {
        let mut c = candidate("Tower \"A\"", City::Jeddah, "Al Khozama");
        c.estimated_value = Some(280_000_000.0);
        let mut out = Vec::new();
        write_candidates_csv(&[c], &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert!(lines.next().unwrap().starts_with("\"id\",\"projectName\""));
        let row = lines.next().unwrap();
        assert!(row.contains("\"Tower \"\"A\"\"\""));
        assert!(row.contains("\"280000000\""));
    }
}
