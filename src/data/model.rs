use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::ops::RangeInclusive;

use serde::Serialize;

// ---------------------------------------------------------------------------
// NestedValue – one node of a parsed structured cell
// ---------------------------------------------------------------------------

/// Key/value content of a structured column (`features`, `owner`, ...).
pub type Mapping = BTreeMap<String, NestedValue>;

/// A dynamically-typed value parsed out of a mapping literal.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum NestedValue {
    Mapping(Mapping),
    List(Vec<NestedValue>),
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Null,
}

/// Plain display form. Strings print without quotes and scalars use the
/// literal spelling (`True`, `None`); this is also the form used for mapping
/// keys.
impl fmt::Display for NestedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NestedValue::String(s) => write!(f, "{s}"),
            NestedValue::Integer(i) => write!(f, "{i}"),
            NestedValue::Float(v) => write!(f, "{v:?}"),
            NestedValue::Bool(true) => write!(f, "True"),
            NestedValue::Bool(false) => write!(f, "False"),
            NestedValue::Null => write!(f, "None"),
            other => write!(f, "{}", other.to_literal()),
        }
    }
}

impl NestedValue {
    /// Interpret the value as an `f64` (integers widen).
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            NestedValue::Float(v) => Some(*v),
            NestedValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            NestedValue::Mapping(m) => Some(m),
            _ => None,
        }
    }

    /// Render in mapping-literal syntax, the inverse of
    /// [`parse_mapping`](super::literal::parse_mapping).
    pub fn to_literal(&self) -> String {
        let mut out = String::new();
        self.write_literal(&mut out);
        out
    }

    fn write_literal(&self, out: &mut String) {
        match self {
            NestedValue::Mapping(m) => write_mapping_literal(m, out),
            NestedValue::List(items) => {
                out.push('[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    item.write_literal(out);
                }
                out.push(']');
            }
            NestedValue::String(s) => write_quoted(s, out),
            NestedValue::Integer(i) => out.push_str(&i.to_string()),
            // Overflowing literals parse to infinity; write one back.
            NestedValue::Float(v) if v.is_infinite() => {
                out.push_str(if *v > 0.0 { "1e999" } else { "-1e999" })
            }
            // Debug keeps a trailing `.0` so the value re-parses as a float.
            NestedValue::Float(v) => out.push_str(&format!("{v:?}")),
            NestedValue::Bool(true) => out.push_str("True"),
            NestedValue::Bool(false) => out.push_str("False"),
            NestedValue::Null => out.push_str("None"),
        }
    }
}

/// Render a whole mapping as a literal. Keys are always written as strings.
pub fn mapping_to_literal(mapping: &Mapping) -> String {
    let mut out = String::new();
    write_mapping_literal(mapping, &mut out);
    out
}

fn write_mapping_literal(mapping: &Mapping, out: &mut String) {
    out.push('{');
    for (i, (key, value)) in mapping.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        write_quoted(key, out);
        out.push_str(": ");
        value.write_literal(out);
    }
    out.push('}');
}

fn write_quoted(s: &str, out: &mut String) {
    out.push('\'');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            other => out.push(other),
        }
    }
    out.push('\'');
}

// ---------------------------------------------------------------------------
// PropertyRecord – one cleaned row of the source table
// ---------------------------------------------------------------------------

/// Placeholder for a blank property type.
pub const UNKNOWN_PROPERTY_TYPE: &str = "Unknown";
/// Year assigned when `yearBuilt` is missing or unparseable. Not a real year.
pub const UNKNOWN_YEAR_BUILT: i32 = 1600;
/// Years the cleaner accepts as real; anything outside becomes
/// [`UNKNOWN_YEAR_BUILT`]. Keeps the span of year-keyed views small.
pub const PLAUSIBLE_YEARS_BUILT: RangeInclusive<i32> = UNKNOWN_YEAR_BUILT..=2100;

/// A single property (one row of the source table) after cleaning.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyRecord {
    /// Trimmed, never empty; blank input becomes [`UNKNOWN_PROPERTY_TYPE`].
    pub property_type: String,
    pub bedrooms: u32,
    pub bathrooms: f64,
    pub year_built: i32,
    pub square_footage: Option<f64>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub features: Mapping,
    pub tax_assessments: Mapping,
    pub property_taxes: Mapping,
    pub owner: Mapping,
    /// Columns the cleaner does not touch, verbatim: header → cell.
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

impl PropertyRecord {
    /// A record carrying only the cleaner's defaults.
    pub fn new(property_type: impl Into<String>) -> Self {
        PropertyRecord {
            property_type: property_type.into(),
            bedrooms: 0,
            bathrooms: 0.0,
            year_built: UNKNOWN_YEAR_BUILT,
            square_footage: None,
            latitude: None,
            longitude: None,
            features: Mapping::new(),
            tax_assessments: Mapping::new(),
            property_taxes: Mapping::new(),
            owner: Mapping::new(),
            extra: BTreeMap::new(),
        }
    }

    /// Both coordinates, when present.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        Some((self.latitude?, self.longitude?))
    }
}

// ---------------------------------------------------------------------------
// HousingDataset – the complete cleaned table
// ---------------------------------------------------------------------------

/// Counters collected while cleaning.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CleaningStats {
    /// Data rows read (header excluded).
    pub rows: usize,
    /// Cells replaced by a default value.
    pub anomalies: usize,
}

/// The full cleaned dataset. Immutable once built; reload builds a new one.
#[derive(Debug, Clone, Default)]
pub struct HousingDataset {
    /// All records, in file order.
    pub records: Vec<PropertyRecord>,
    /// Header of the source file, in file order.
    pub columns: Vec<String>,
    /// Sorted set of distinct property types.
    pub property_types: BTreeSet<String>,
    pub stats: CleaningStats,
}

impl HousingDataset {
    /// Build the type index from cleaned records.
    pub fn from_records(
        records: Vec<PropertyRecord>,
        columns: Vec<String>,
        stats: CleaningStats,
    ) -> Self {
        let property_types = records
            .iter()
            .map(|r| r.property_type.clone())
            .collect();
        HousingDataset {
            records,
            columns,
            property_types,
            stats,
        }
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
