//! Rule-based entity extraction.
//!
//! Turns free article/page text into candidate fields using fixed keyword
//! tables (English then Arabic) and a handful of compiled patterns. Pure and
//! deterministic: the same input always yields the same [`ExtractedProject`],
//! and nothing here can fail. Fields that fall back to a default are recorded
//! in [`ExtractedProject::defaulted`].

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeSet;

use crate::types::candidate::{CandidateField, ExtractedPerson};
use crate::types::config::ExtractorConfig;
use crate::types::extraction::ExtractedProject;
use crate::types::location::City;
use crate::types::project::{ProjectStatus, ProjectType};

/// Name used when neither a title nor a name-like phrase is available.
pub const FALLBACK_NAME: &str = "New KSA Project";

/// Developer used when no developer phrase is found.
pub const UNKNOWN_DEVELOPER: &str = "Unknown Developer";

/// Giga-project families, checked before the plain city tables.
const PRIORITY_CITIES: &[(&[&str], City)] = &[
    (&["neom", "نيوم", "the line", "trojena"], City::Neom),
    (&["red sea", "البحر الأحمر", "amaala"], City::RedSea),
    (&["alula", "al-ula", "العلا"], City::AlUla),
];

/// City keywords in lookup order: English first, then Arabic.
const CITY_KEYWORDS: &[(&str, City)] = &[
    ("riyadh", City::Riyadh),
    ("jeddah", City::Jeddah),
    ("makkah", City::Makkah),
    ("mecca", City::Makkah),
    ("madinah", City::Madinah),
    ("medina", City::Madinah),
    ("dammam", City::Dammam),
    ("khobar", City::Khobar),
    ("tabuk", City::Neom),
    ("neom", City::Neom),
    ("trojena", City::Neom),
    ("oxagon", City::Neom),
    ("the line", City::Neom),
    ("red sea", City::RedSea),
    ("amaala", City::RedSea),
    ("alula", City::AlUla),
    ("al-ula", City::AlUla),
    ("abha", City::Abha),
    ("khamis", City::Abha),
    ("الرياض", City::Riyadh),
    ("جدة", City::Jeddah),
    ("مكة", City::Makkah),
    ("المدينة", City::Madinah),
    ("الدمام", City::Dammam),
    ("الخبر", City::Khobar),
    ("نيوم", City::Neom),
    ("تبوك", City::Neom),
    ("البحر الأحمر", City::RedSea),
    ("العلا", City::AlUla),
    ("أبها", City::Abha),
];

const TYPE_RULES: &[(&[&str], ProjectType)] = &[
    (&["hospital", "medical", "clinic", "مستشفى", "طبي"], ProjectType::Hospital),
    (&["resort", "retreat", "island", "منتجع"], ProjectType::Resort),
    (&["kitchen", "catering", "food", "مطبخ", "تموين"], ProjectType::CentralKitchen),
    (&["restaurant", "dining", "cafe", "مطعم", "مقهى"], ProjectType::Restaurant),
    (
        &["entertainment", "cinema", "theme park", "ترفيه", "سينما"],
        ProjectType::Entertainment,
    ),
];

const HOTEL_KEYWORDS: &[&str] = &["hotel", "فندق"];

const STATUS_RULES: &[(&[&str], ProjectStatus)] = &[
    (
        &["awarded", "signed", "construction start", "under construction", "ترسية", "إنشاء"],
        ProjectStatus::Ongoing,
    ),
    (
        &["completed", "opened", "operational", "انتهى", "افتتاح"],
        ProjectStatus::Completed,
    ),
    (&["tender", "bidding", "rfp", "مناقصة"], ProjectStatus::Tender),
];

const RELEVANCE_KEYWORDS: &[&str] = &[
    "kitchen",
    "laundry",
    "catering",
    "food service",
    "equipment",
    "cold room",
];

lazy_static! {
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();

    // Currency marker, amount, magnitude
    static ref MONEY: Regex = Regex::new(
        r"(?i)(SAR|SR|\$|USD|ريال)\s?(\d+(?:,\d{3})*(?:\.\d+)?)\s?(million|billion|bn|m|b|مليون|مليار)\b"
    ).unwrap();

    static ref TARGET_DATE: Regex = Regex::new(
        r"(?i)(?:opening|completion|target|launch)\s?(?:in|date|by)?\s?((?:Q[1-4]\s?)?202[4-9])"
    ).unwrap();

    static ref NAME_PHRASE: Regex = Regex::new(
        r"([A-Z][\w\s]+(?:Hotel|Resort|Hospital|City|Tower|Center|Complex|Project))"
    ).unwrap();

    static ref PERSON: Regex = Regex::new(
        r"\b([A-Z][a-z]+(?:\s[A-Z][a-z]+){1,2}),\s+(?:the\s+)?(CEO|Managing Director|Project Director|Procurement Director|Chairman|General Manager)\b"
    ).unwrap();

    static ref DEVELOPER: Regex = role_pattern(&["developer", "client", "owner", "developed by", "المطور"]);
    static ref CONTRACTOR: Regex = role_pattern(&["contractor", "awarded to", "construction by", "المقاول"]);
    static ref CONSULTANT: Regex = role_pattern(&["consultant", "architect", "designed by", "الاستشاري"]);
    static ref OPERATOR: Regex = role_pattern(&["operated by", "managed by", "brand", "hotel group", "المشغل"]);
}

/// Keyword (any case) + separator + one to five capitalized words.
fn role_pattern(keywords: &[&str]) -> Regex {
    let alternatives = keywords
        .iter()
        .map(|k| regex::escape(k))
        .collect::<Vec<_>>()
        .join("|");
    Regex::new(&format!(
        r"(?i:{alternatives})[:\s]+((?:[A-Z][a-zA-Z0-9&]+\s?){{1,5}})"
    ))
    .unwrap()
}

/// Extract with the default configuration.
pub fn extract(text: &str, title_hint: Option<&str>) -> ExtractedProject {
    Extractor::default().extract(text, title_hint)
}

/// Entity extractor with configurable windows and exchange rate.
#[derive(Debug, Clone, Default)]
pub struct Extractor {
    config: ExtractorConfig,
}

impl Extractor {
    pub fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Pull structured project fields out of `text`.
    ///
    /// A non-empty `title_hint` is used verbatim as the project name and also
    /// joins the keyword search window.
    pub fn extract(&self, text: &str, title_hint: Option<&str>) -> ExtractedProject {
        let clean = WHITESPACE.replace_all(text, " ").trim().to_string();
        let title = title_hint.map(str::trim).filter(|t| !t.is_empty());

        let body_window: String = clean
            .to_lowercase()
            .chars()
            .take(self.config.search_window_chars)
            .collect();
        let window = format!(
            "{} {}",
            title.map(str::to_lowercase).unwrap_or_default(),
            body_window
        );

        let mut defaulted = BTreeSet::new();

        let city = detect_city(&window).unwrap_or_else(|| {
            defaulted.insert(CandidateField::City);
            City::default()
        });

        let project_type = detect_type(&window).unwrap_or_else(|| {
            defaulted.insert(CandidateField::ProjectType);
            ProjectType::default()
        });

        let estimated_value = self.parse_value(&clean).unwrap_or_else(|| {
            defaulted.insert(CandidateField::EstimatedValue);
            0.0
        });

        let developer = capture_role(&DEVELOPER, &clean).unwrap_or_else(|| {
            defaulted.insert(CandidateField::Developer);
            UNKNOWN_DEVELOPER.to_string()
        });
        let contractor =
            capture_role(&CONTRACTOR, &clean).filter(|c| !c.to_lowercase().contains("contract"));
        let consultant = capture_role(&CONSULTANT, &clean);
        let operator = capture_role(&OPERATOR, &clean);

        let status = detect_status(&window).unwrap_or_else(|| {
            defaulted.insert(CandidateField::Status);
            ProjectStatus::default()
        });

        let target_opening = TARGET_DATE
            .captures(&clean)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string());

        let name = match title {
            Some(title) => title.to_string(),
            None => {
                let head: String = clean.chars().take(self.config.name_window_chars).collect();
                match NAME_PHRASE.captures(&head).and_then(|c| c.get(1)) {
                    Some(m) => m.as_str().trim().to_string(),
                    None => {
                        defaulted.insert(CandidateField::Name);
                        FALLBACK_NAME.to_string()
                    }
                }
            }
        };

        ExtractedProject {
            name,
            project_type,
            city,
            region: city.region().to_string(),
            estimated_value,
            developer,
            contractor,
            consultant,
            operator,
            status,
            target_opening,
            relevance_notes: relevance_notes(&window),
            people: extract_people(&clean),
            summary: summarize(&clean, self.config.summary_chars),
            defaulted,
        }
    }

    /// First monetary phrase converted to SAR.
    fn parse_value(&self, text: &str) -> Option<f64> {
        let caps = MONEY.captures(text)?;
        let currency = caps.get(1)?.as_str().to_lowercase();
        let amount: f64 = caps.get(2)?.as_str().replace(',', "").parse().ok()?;
        let multiplier = match caps.get(3)?.as_str().to_lowercase().as_str() {
            "billion" | "bn" | "b" | "مليار" => 1_000_000_000.0,
            _ => 1_000_000.0,
        };

        let mut value = amount * multiplier;
        if currency == "$" || currency == "usd" {
            value *= self.config.usd_to_sar;
        }
        Some(value)
    }
}

fn detect_city(window: &str) -> Option<City> {
    PRIORITY_CITIES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| window.contains(k)))
        .map(|(_, city)| *city)
        .or_else(|| {
            CITY_KEYWORDS
                .iter()
                .find(|(keyword, _)| window.contains(keyword))
                .map(|(_, city)| *city)
        })
}

fn detect_type(window: &str) -> Option<ProjectType> {
    TYPE_RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| window.contains(k)))
        .map(|(_, project_type)| *project_type)
        .or_else(|| {
            HOTEL_KEYWORDS
                .iter()
                .any(|k| window.contains(k))
                .then_some(ProjectType::Hotel)
        })
}

fn detect_status(window: &str) -> Option<ProjectStatus> {
    STATUS_RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|k| window.contains(k)))
        .map(|(_, status)| *status)
}

/// Only the first keyword occurrence is considered.
fn capture_role(pattern: &Regex, text: &str) -> Option<String> {
    pattern
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty())
}

fn relevance_notes(window: &str) -> Option<String> {
    let found: Vec<&str> = RELEVANCE_KEYWORDS
        .iter()
        .copied()
        .filter(|k| window.contains(k))
        .collect();

    if found.is_empty() {
        None
    } else {
        Some(format!("Detected keywords: {}", found.join(", ")))
    }
}

fn extract_people(text: &str) -> Vec<ExtractedPerson> {
    let mut people: Vec<ExtractedPerson> = Vec::new();
    for caps in PERSON.captures_iter(text) {
        let (Some(name), Some(role)) = (caps.get(1), caps.get(2)) else {
            continue;
        };
        if people.iter().any(|p| p.name == name.as_str()) {
            continue;
        }
        people.push(ExtractedPerson {
            name: name.as_str().to_string(),
            role: role.as_str().to_string(),
        });
    }
    people
}

/// At most `max_chars` characters, ending in "..." only when cut.
fn summarize(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{}...", kept.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_end_to_end_jeddah_hotel() {
        let result = extract(
            "SAR 400 million luxury hotel announced in Jeddah, developer PIF",
            None,
        );

        assert_eq!(result.city, City::Jeddah);
        assert_eq!(result.region, "Makkah");
        assert_eq!(result.project_type, ProjectType::Hotel);
        assert_eq!(result.estimated_value, 400_000_000.0);
        assert!(result.developer.contains("PIF"));
        assert_eq!(result.status, ProjectStatus::Tender);
        assert!(result.is_defaulted(CandidateField::Status));
        assert!(!result.is_defaulted(CandidateField::ProjectType));
        assert!(!result.is_defaulted(CandidateField::Developer));
    }

    #[test]
    fn test_giga_project_wins_over_city_keyword() {
        let result = extract("New hotel in Jeddah linked to NEOM", None);
        assert_eq!(result.city, City::Neom);
        assert_eq!(result.region, "Tabuk");
    }

    #[test]
    fn test_title_hint_joins_search_window() {
        let result = extract("A new resort is planned.", Some("Trojena Ski Village"));
        assert_eq!(result.city, City::Neom);
        assert_eq!(result.name, "Trojena Ski Village");
        assert!(!result.is_defaulted(CandidateField::Name));
    }

    #[test]
    fn test_arabic_city_keyword() {
        let result = extract("مشروع فندق جديد في الدمام", None);
        assert_eq!(result.city, City::Dammam);
        assert_eq!(result.region, "Eastern Province");
        assert_eq!(result.project_type, ProjectType::Hotel);
    }

    #[test]
    fn test_missing_city_defaults_to_riyadh() {
        let result = extract("A project was announced today.", None);
        assert_eq!(result.city, City::Riyadh);
        assert!(result.is_defaulted(CandidateField::City));
    }

    #[test]
    fn test_value_sar_million() {
        let result = extract("Budget of SAR 350 million was approved", None);
        assert_eq!(result.estimated_value, 350_000_000.0);
    }

    #[test]
    fn test_value_usd_converts_to_sar() {
        let result = extract("The $100M deal closed", None);
        assert_eq!(result.estimated_value, 375_000_000.0);
    }

    #[test]
    fn test_value_billion_with_separators() {
        let result = extract("A SAR 1,250.5 bn programme", None);
        assert_eq!(result.estimated_value, 1_250_500_000_000.0);
    }

    #[test]
    fn test_value_custom_exchange_rate() {
        let extractor = Extractor::new(ExtractorConfig::default().with_usd_to_sar(4.0));
        let result = extractor.extract("USD 2 million contract", None);
        assert_eq!(result.estimated_value, 8_000_000.0);
    }

    #[test]
    fn test_no_value_is_zero_and_defaulted() {
        let result = extract("No figures disclosed", None);
        assert_eq!(result.estimated_value, 0.0);
        assert_eq!(result.known_value(), None);
        assert!(result.is_defaulted(CandidateField::EstimatedValue));
    }

    #[test]
    fn test_type_priority_hospital_over_hotel() {
        let result = extract("Hotel and hospital complex", None);
        assert_eq!(result.project_type, ProjectType::Hospital);
    }

    #[test]
    fn test_type_without_hotel_keyword_is_defaulted() {
        let result = extract("Office park announced", None);
        assert_eq!(result.project_type, ProjectType::Hotel);
        assert!(result.is_defaulted(CandidateField::ProjectType));
    }

    #[test]
    fn test_roles_are_captured() {
        let text = "The contractor: Saudi Binladin Group was named. Consultant Dar Al Handasah \
                    will design it. The hotel will be operated by Marriott International.";
        let result = extract(text, None);
        assert_eq!(result.contractor.as_deref(), Some("Saudi Binladin Group"));
        assert_eq!(result.consultant.as_deref(), Some("Dar Al Handasah"));
        assert_eq!(result.operator.as_deref(), Some("Marriott International"));
    }

    #[test]
    fn test_contractor_mentioning_contract_is_rejected() {
        let result = extract("Main contractor Contracting Co was appointed", None);
        assert_eq!(result.contractor, None);
    }

    #[test]
    fn test_role_requires_capitalized_words() {
        let result = extract("the developer said nothing", None);
        assert_eq!(result.developer, UNKNOWN_DEVELOPER);
        assert!(result.is_defaulted(CandidateField::Developer));
    }

    #[test]
    fn test_status_ongoing_before_completed() {
        let result = extract("Contract awarded; the first phase completed", None);
        assert_eq!(result.status, ProjectStatus::Ongoing);
    }

    #[test]
    fn test_status_tender_keyword_is_matched() {
        let result = extract("RFP issued for kitchen works", None);
        assert_eq!(result.status, ProjectStatus::Tender);
        assert!(!result.is_defaulted(CandidateField::Status));
    }

    #[test]
    fn test_target_date_with_quarter() {
        let result = extract("Opening in Q3 2026 is expected", None);
        assert_eq!(result.target_opening.as_deref(), Some("Q3 2026"));
    }

    #[test]
    fn test_target_date_out_of_range_is_ignored() {
        let result = extract("Completion by 2035", None);
        assert_eq!(result.target_opening, None);
    }

    #[test]
    fn test_relevance_notes_list_keywords_in_order() {
        let result = extract("Laundry and kitchen equipment tender", None);
        assert_eq!(
            result.relevance_notes.as_deref(),
            Some("Detected keywords: kitchen, laundry, equipment")
        );
    }

    #[test]
    fn test_name_from_leading_phrase() {
        let result = extract("Grand Riyadh Tower is rising fast", None);
        assert_eq!(result.name, "Grand Riyadh Tower");
    }

    #[test]
    fn test_name_fallback_is_defaulted() {
        let result = extract("no capitalized names here", None);
        assert_eq!(result.name, FALLBACK_NAME);
        assert!(result.is_defaulted(CandidateField::Name));
    }

    #[test]
    fn test_people_with_role_titles() {
        let text = "John Pagano, CEO of the company, said work starts soon. \
                    Sara Al Amri, Procurement Director, confirmed.";
        let people = extract(text, None).people;
        assert_eq!(people.len(), 2);
        assert_eq!(people[0].name, "John Pagano");
        assert_eq!(people[0].role, "CEO");
        assert_eq!(people[1].name, "Sara Al Amri");
        assert_eq!(people[1].role, "Procurement Director");
    }

    #[test]
    fn test_summary_short_text_has_no_ellipsis() {
        let result = extract("  Short   text  ", None);
        assert_eq!(result.summary, "Short text");
    }

    #[test]
    fn test_summary_truncates_multibyte_text_safely() {
        let text = "فندق ".repeat(200);
        let result = extract(&text, None);
        assert!(result.summary.chars().count() <= 300);
        assert!(result.summary.ends_with("..."));
    }

    #[test]
    fn test_confidence_counts_matched_fields() {
        let result = extract("SAR 400 million luxury hotel announced in Jeddah, developer PIF", None);
        // name and status fell back
        assert!((result.confidence() - 4.0 / 6.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_extraction_is_deterministic() {
        let text = "Awarded: Red Sea resort, contractor Nesma Partners, SAR 2 billion";
        assert_eq!(extract(text, None), extract(text, None));
    }
}
