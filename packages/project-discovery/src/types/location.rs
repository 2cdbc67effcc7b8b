//! Fixed KSA locations tracked by the registry.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A tracked city or giga-project location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum City {
    Riyadh,
    Jeddah,
    Makkah,
    Madinah,
    Dammam,
    Khobar,
    #[serde(rename = "NEOM / Tabuk")]
    Neom,
    #[serde(rename = "Red Sea Project")]
    RedSea,
    #[serde(rename = "Al-Ula")]
    AlUla,
    Abha,
}

impl City {
    pub const ALL: [City; 10] = [
        City::Riyadh,
        City::Jeddah,
        City::Makkah,
        City::Madinah,
        City::Dammam,
        City::Khobar,
        City::Neom,
        City::RedSea,
        City::AlUla,
        City::Abha,
    ];

    /// Display name, identical to the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            City::Riyadh => "Riyadh",
            City::Jeddah => "Jeddah",
            City::Makkah => "Makkah",
            City::Madinah => "Madinah",
            City::Dammam => "Dammam",
            City::Khobar => "Khobar",
            City::Neom => "NEOM / Tabuk",
            City::RedSea => "Red Sea Project",
            City::AlUla => "Al-Ula",
            City::Abha => "Abha",
        }
    }

    /// Administrative region the location belongs to.
    pub fn region(&self) -> &'static str {
        match self {
            City::Riyadh => "Riyadh",
            City::Jeddah | City::Makkah => "Makkah",
            City::Madinah | City::AlUla => "Madinah",
            City::Dammam | City::Khobar => "Eastern Province",
            City::Neom | City::RedSea => "Tabuk",
            City::Abha => "Asir",
        }
    }
}

impl Default for City {
    fn default() -> Self {
        City::Riyadh
    }
}

impl fmt::Display for City {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognized city text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownCity(pub String);

impl fmt::Display for UnknownCity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown city: {}", self.0)
    }
}

impl std::error::Error for UnknownCity {}

impl FromStr for City {
    type Err = UnknownCity;

    /// Accepts display names plus the common spellings seen in spreadsheets.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        let city = match normalized.as_str() {
            "riyadh" => City::Riyadh,
            "jeddah" | "jiddah" => City::Jeddah,
            "makkah" | "mecca" => City::Makkah,
            "madinah" | "medina" => City::Madinah,
            "dammam" => City::Dammam,
            "khobar" | "al khobar" => City::Khobar,
            "neom" | "tabuk" | "neom / tabuk" => City::Neom,
            "red sea" | "red sea project" => City::RedSea,
            "al-ula" | "alula" | "al ula" => City::AlUla,
            "abha" => City::Abha,
            _ => return Err(UnknownCity(s.trim().to_string())),
        };
        Ok(city)
    }
}
