use serde::{Deserialize, Serialize};

/// How a transaction row received its annotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMethod {
    /// Departure on the same day as the transaction
    Exact,
    /// Departure recorded one day after the transaction
    NextDay,
    /// Departure on or before the transaction date
    OnOrBefore,
    /// More than one carrier among the candidates of a single rule
    Ambiguous,
}

impl MatchMethod {
    pub const ALL: [MatchMethod; 4] = [
        MatchMethod::Exact,
        MatchMethod::NextDay,
        MatchMethod::OnOrBefore,
        MatchMethod::Ambiguous,
    ];

    /// Text written into the method column for this outcome
    #[must_use]
    pub fn label(self, style: LabelStyle) -> &'static str {
        match (style, self) {
            (LabelStyle::Original, Self::Exact) => "TranDate=ออกLDT",
            (LabelStyle::Original, Self::NextDay) => "เพิ่มวัน",
            (LabelStyle::Original, Self::OnOrBefore) => "นับวันย้อนหลัง",
            (LabelStyle::Original, Self::Ambiguous) => "มีชื่อมากกว่า 1 ในวันเดียว",
            (LabelStyle::English, Self::Exact) => "same-day",
            (LabelStyle::English, Self::NextDay) => "next-day",
            (LabelStyle::English, Self::OnOrBefore) => "on-or-before",
            (LabelStyle::English, Self::Ambiguous) => AMBIGUITY_SENTINEL,
        }
    }

    /// Whether this outcome flags several carriers for one row
    #[must_use]
    pub fn is_ambiguous(self) -> bool {
        self == Self::Ambiguous
    }
}

impl std::fmt::Display for MatchMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exact => write!(f, "exact"),
            Self::NextDay => write!(f, "next_day"),
            Self::OnOrBefore => write!(f, "on_or_before"),
            Self::Ambiguous => write!(f, "ambiguous"),
        }
    }
}

/// English label used when a rule finds more than one carrier
pub const AMBIGUITY_SENTINEL: &str = "more-than-one-name-in-a-day";

/// Vocabulary for method labels in written output
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum LabelStyle {
    /// Thai labels as used by the dispatch office workbooks
    #[default]
    Original,
    /// Short English labels
    English,
}

impl std::str::FromStr for LabelStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "original" | "thai" => Ok(Self::Original),
            "english" | "en" => Ok(Self::English),
            other => Err(format!("unknown label style '{other}'")),
        }
    }
}

/// The three output fields set on a matched transaction row.
///
/// They only ever exist together, so a row either has an annotation or has none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    /// Single carrier name, or the comma-joined list when ambiguous
    pub carrier: String,
    /// Trip code(s), comma-joined in order of first occurrence
    pub trip_code: String,
    pub method: MatchMethod,
}
