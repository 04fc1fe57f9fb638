//! Domain types for milonga programs and the orchestra catalog.
//!
//! All types are serializable via serde; plans are stored as YAML and
//! exported as JSON, so field names here are the on-disk schema.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Limits
// ---------------------------------------------------------------------------

/// Lowest energy a tanda can carry.
pub const MIN_ENERGY: f64 = 1.0;
/// Highest energy a tanda can carry.
pub const MAX_ENERGY: f64 = 10.0;

/// Fewest slots a program may have.
pub const MIN_SLOTS: usize = 4;
/// Most slots a program may have.
pub const MAX_SLOTS: usize = 30;
/// Slot count used when neither the caller nor the config picks one.
pub const DEFAULT_SLOTS: usize = 14;

/// Allowed tracks per tanda.
pub const TRACK_COUNTS: std::ops::RangeInclusive<u8> = 3..=4;

/// Clamp an energy value into `[MIN_ENERGY, MAX_ENERGY]`.
///
/// NaN is treated as the floor so a bad value can never escape the range.
pub fn clamp_energy(value: f64) -> f64 {
    if value.is_nan() {
        return MIN_ENERGY;
    }
    value.clamp(MIN_ENERGY, MAX_ENERGY)
}

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

macro_rules! string_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }
    };
}

string_newtype!(
    /// Stable catalog identifier of an orchestra (e.g. `di_sarli`).
    OrchestraId
);
string_newtype!(
    /// Identifier of a tanda record inside a program.
    TandaId
);
string_newtype!(
    /// Identifier of a milonga set.
    SetId
);
string_newtype!(
    /// File-safe name under which a program is stored.
    PlanName
);

impl TandaId {
    /// A fresh random identifier.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// First eight characters, enough to reference a tanda from the CLI.
    pub fn short(&self) -> &str {
        self.0.get(..8).unwrap_or(&self.0)
    }
}

impl SetId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Musical type of a tanda.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TandaType {
    #[default]
    Tango,
    Vals,
    Milonga,
}

impl TandaType {
    /// All types in display order.
    pub const ALL: [TandaType; 3] = [TandaType::Tango, TandaType::Vals, TandaType::Milonga];

    pub fn as_str(&self) -> &'static str {
        match self {
            TandaType::Tango => "tango",
            TandaType::Vals => "vals",
            TandaType::Milonga => "milonga",
        }
    }

    /// One-letter code used by the TTVTTM pattern and catalog sheets.
    pub fn letter(&self) -> char {
        match self {
            TandaType::Tango => 'T',
            TandaType::Vals => 'V',
            TandaType::Milonga => 'M',
        }
    }
}

impl fmt::Display for TandaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TandaType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tango" | "t" => Ok(TandaType::Tango),
            "vals" | "v" | "waltz" => Ok(TandaType::Vals),
            "milonga" | "m" => Ok(TandaType::Milonga),
            other => Err(format!(
                "unknown tanda type '{other}'; expected: tango, vals, milonga"
            )),
        }
    }
}

/// Stylistic category of an orchestra profile. Compatibility is an exact tag match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StyleCategory {
    HarderRhythmic,
    SofterRhythmic,
    Smooth,
    Lyrical,
    Dramatic,
    OldGuard,
    Transitional,
    ModernDance,
    NeoTango,
    Alternative,
}

impl StyleCategory {
    pub const ALL: [StyleCategory; 10] = [
        StyleCategory::HarderRhythmic,
        StyleCategory::SofterRhythmic,
        StyleCategory::Smooth,
        StyleCategory::Lyrical,
        StyleCategory::Dramatic,
        StyleCategory::OldGuard,
        StyleCategory::Transitional,
        StyleCategory::ModernDance,
        StyleCategory::NeoTango,
        StyleCategory::Alternative,
    ];

    /// The snake_case tag, as stored on disk.
    pub fn as_str(&self) -> &'static str {
        match self {
            StyleCategory::HarderRhythmic => "harder_rhythmic",
            StyleCategory::SofterRhythmic => "softer_rhythmic",
            StyleCategory::Smooth => "smooth",
            StyleCategory::Lyrical => "lyrical",
            StyleCategory::Dramatic => "dramatic",
            StyleCategory::OldGuard => "old_guard",
            StyleCategory::Transitional => "transitional",
            StyleCategory::ModernDance => "modern_dance",
            StyleCategory::NeoTango => "neo_tango",
            StyleCategory::Alternative => "alternative",
        }
    }

    /// Human label: `harder_rhythmic` → `Harder Rhythmic`.
    pub fn label(&self) -> String {
        style_label(self.as_str())
    }
}

impl fmt::Display for StyleCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StyleCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .to_ascii_lowercase()
            .chars()
            .map(|c| if c == ' ' || c == '-' { '_' } else { c })
            .collect();
        StyleCategory::ALL
            .into_iter()
            .find(|style| style.as_str() == normalized)
            .ok_or_else(|| format!("unknown style category '{s}'"))
    }
}

/// Title-case a snake_case tag.
pub fn style_label(tag: &str) -> String {
    tag.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Whether a tanda draws on one orchestra or blends several.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TandaMode {
    #[default]
    Standard,
    Mixed,
}

// ---------------------------------------------------------------------------
// Catalog structs
// ---------------------------------------------------------------------------

fn default_types() -> Vec<TandaType> {
    vec![TandaType::Tango]
}

/// One historical configuration of an orchestra (era, singer, sound).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrchestraProfile {
    /// Free-text year range, e.g. `1935-1945` or `1989-present`.
    pub era: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub era_label: Option<String>,
    pub style: StyleCategory,
    /// Base energy on the 1–10 scale before the type modifier.
    pub energy: f64,
    #[serde(default)]
    pub mood: String,
    pub danceability: u8,
    pub complexity: u8,
    #[serde(default = "default_types")]
    pub types: Vec<TandaType>,
    #[serde(default)]
    pub dj_notes: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub singer: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub key_singers: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl OrchestraProfile {
    /// True when this profile was recorded with `singer`, either as its
    /// headline singer or among its key singers. Case-insensitive.
    pub fn features_singer(&self, singer: &str) -> bool {
        let wanted = singer.trim();
        self.singer
            .iter()
            .chain(self.key_singers.iter())
            .any(|s| s.eq_ignore_ascii_case(wanted))
    }
}

/// An orchestra and its ordered profiles. The first profile is the default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Orchestra {
    pub id: OrchestraId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instrument: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active_years: Option<String>,
    pub profiles: Vec<OrchestraProfile>,
}

impl Orchestra {
    pub fn default_profile(&self) -> Option<&OrchestraProfile> {
        self.profiles.first()
    }
}

// ---------------------------------------------------------------------------
// Program structs
// ---------------------------------------------------------------------------

/// A unit of programming: 3–4 tracks of one type from one orchestra
/// (or, in mixed mode, several compatible ones).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tanda {
    pub id: TandaId,
    /// Primary orchestra. For mixed tandas, the first constituent.
    pub orchestra: OrchestraId,
    #[serde(default)]
    pub mode: TandaMode,
    /// Every constituent orchestra of a mixed tanda, primary included.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mix: Vec<OrchestraId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub singer: Option<String>,
    #[serde(rename = "type")]
    pub tanda_type: TandaType,
    pub track_count: u8,
    pub energy: f64,
    /// Slot index in the program timeline; `None` while in the library.
    #[serde(default)]
    pub position: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<StyleCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub era: Option<String>,
}

impl Tanda {
    pub fn is_mixed(&self) -> bool {
        self.mode == TandaMode::Mixed
    }

    pub fn is_placed(&self) -> bool {
        self.position.is_some()
    }

    /// Every orchestra this tanda draws on, primary first.
    pub fn orchestras(&self) -> Vec<&OrchestraId> {
        if self.mix.is_empty() {
            vec![&self.orchestra]
        } else {
            self.mix.iter().collect()
        }
    }

    /// Minutes this tanda occupies including the cortina after it.
    pub fn duration_minutes(&self) -> u32 {
        u32::from(self.track_count) * 3 + 1
    }
}

/// Everything needed to create a tanda except its id and position.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTanda {
    pub orchestra: OrchestraId,
    pub mode: TandaMode,
    pub mix: Vec<OrchestraId>,
    pub singer: Option<String>,
    pub tanda_type: TandaType,
    pub track_count: u8,
    pub energy: f64,
    pub style: Option<StyleCategory>,
    pub era: Option<String>,
}

impl NewTanda {
    pub fn into_tanda(self, id: TandaId) -> Tanda {
        Tanda {
            id,
            orchestra: self.orchestra,
            mode: self.mode,
            mix: self.mix,
            singer: self.singer,
            tanda_type: self.tanda_type,
            track_count: self.track_count,
            energy: clamp_energy(self.energy),
            position: None,
            style: self.style,
            era: self.era,
        }
    }
}

/// Metadata of one milonga evening.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MilongaSet {
    pub id: SetId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub venue: Option<String>,
    pub date: NaiveDate,
    #[serde(with = "hhmm")]
    pub start_time: NaiveTime,
    pub created_at: DateTime<Utc>,
}

/// `HH:MM` (de)serialization for start times; also accepts `HH:MM:SS`.
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(d)?;
        parse(&raw).map_err(serde::de::Error::custom)
    }

    pub fn parse(raw: &str) -> Result<NaiveTime, chrono::ParseError> {
        NaiveTime::parse_from_str(raw.trim(), "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(raw.trim(), "%H:%M:%S"))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newtype_display() {
        assert_eq!(OrchestraId::from("di_sarli").to_string(), "di_sarli");
        assert_eq!(PlanName::from("saturday").to_string(), "saturday");
    }

    #[test]
    fn tanda_type_parses_letters_and_names() {
        assert_eq!("V".parse::<TandaType>().unwrap(), TandaType::Vals);
        assert_eq!("Milonga".parse::<TandaType>().unwrap(), TandaType::Milonga);
        assert!("cumbia".parse::<TandaType>().is_err());
    }

    #[test]
    fn style_category_roundtrips_through_tag() {
        for style in StyleCategory::ALL {
            assert_eq!(style.as_str().parse::<StyleCategory>().unwrap(), style);
        }
        assert_eq!(
            "Harder Rhythmic".parse::<StyleCategory>().unwrap(),
            StyleCategory::HarderRhythmic
        );
    }

    #[test]
    fn style_label_title_cases() {
        assert_eq!(StyleCategory::OldGuard.label(), "Old Guard");
        assert_eq!(style_label("neo_tango"), "Neo Tango");
    }

    #[test]
    fn clamp_energy_bounds() {
        assert_eq!(clamp_energy(11.5), 10.0);
        assert_eq!(clamp_energy(0.0), 1.0);
        assert_eq!(clamp_energy(f64::NAN), 1.0);
        assert_eq!(clamp_energy(6.5), 6.5);
    }

    #[test]
    fn start_time_serializes_as_hhmm() {
        let set = MilongaSet {
            id: SetId::from("s1"),
            name: "Test".into(),
            venue: None,
            date: NaiveDate::from_ymd_opt(2026, 3, 7).unwrap(),
            start_time: NaiveTime::from_hms_opt(21, 0, 0).unwrap(),
            created_at: Utc::now(),
        };
        let yaml = serde_yaml::to_string(&set).expect("serialize");
        assert!(yaml.contains("start_time: '21:00'") || yaml.contains("start_time: 21:00"));
        let back: MilongaSet = serde_yaml::from_str(&yaml).expect("deserialize");
        assert_eq!(back.start_time, set.start_time);
    }

    #[test]
    fn tanda_duration_includes_cortina() {
        let tanda = NewTanda {
            orchestra: OrchestraId::from("canaro"),
            mode: TandaMode::Standard,
            mix: vec![],
            singer: None,
            tanda_type: TandaType::Tango,
            track_count: 4,
            energy: 12.0,
            style: None,
            era: None,
        }
        .into_tanda(TandaId::from("t1"));
        assert_eq!(tanda.duration_minutes(), 13);
        assert_eq!(tanda.energy, 10.0);
        assert_eq!(tanda.orchestras(), vec![&OrchestraId::from("canaro")]);
    }
}
