use serde::{Deserialize, Serialize};
use std::fmt;

/// Id value that asks the store to generate a fresh key on insert
pub const UNASSIGNED_ID: i64 = 0;

/// One apartment listing in the local catalog
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Apartment {
    pub id: i64,
    /// Canonical storage name, also the lookup key for name searches
    pub name: String,
    pub address: String,
    /// Raw `"lat,lng"` text, may be empty or malformed
    pub coordinates: String,
    pub utilities: String,
}

impl Apartment {
    /// Build an apartment that has not been stored yet
    pub fn new(name: impl Into<String>, address: impl Into<String>, coordinates: impl Into<String>, utilities: impl Into<String>) -> Self {
        Self {
            id: UNASSIGNED_ID,
            name: name.into(),
            address: address.into(),
            coordinates: coordinates.into(),
            utilities: utilities.into(),
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = id;
        self
    }

    /// Parsed map position, `None` when the raw text is empty or malformed
    pub fn location(&self) -> Option<Coordinates> {
        Coordinates::parse(&self.coordinates)
    }
}

/// One unit configuration offered by an apartment
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FloorPlan {
    pub id: i64,
    pub apartment_id: i64,
    /// Square feet range, e.g. `"1024 - 1170"`
    pub size: RangeField,
    pub beds_bath: String,
    /// Monthly rent range, e.g. `"1576 - 1871"`
    pub rent: RangeField,
}

impl FloorPlan {
    pub fn new(apartment_id: i64, size: &str, beds_bath: impl Into<String>, rent: &str) -> Self {
        Self {
            id: UNASSIGNED_ID,
            apartment_id,
            size: RangeField::new(size),
            beds_bath: beds_bath.into(),
            rent: RangeField::new(rent),
        }
    }

    pub fn with_id(mut self, id: i64) -> Self {
        self.id = id;
        self
    }

    /// One-line description used by the detail view
    pub fn summary(&self) -> String {
        format!("{} - {} sqft - ${}", self.beds_bath, self.size, self.rent)
    }
}

/// A closed integer interval `[min, max]`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct NumericRange {
    pub min: i64,
    pub max: i64,
}

impl NumericRange {
    /// Parse `"<int> - <int>"`. Whitespace around either bound is ignored.
    ///
    /// Returns `None` unless both bounds parse and the lower one is not above
    /// the upper one.
    pub fn parse(text: &str) -> Option<Self> {
        match split_bounds(text) {
            (Some(min), Some(max)) if min <= max => Some(Self { min, max }),
            _ => None,
        }
    }
}

/// Bounds of `"<lower> - <upper>"`, split at the first `-`.
///
/// The lower bound only needs the text before the `-` to be an integer. The
/// upper bound is read only when the lower one parsed.
fn split_bounds(text: &str) -> (Option<i64>, Option<i64>) {
    let Some((lower, upper)) = text.split_once('-') else {
        return (None, None);
    };
    match lower.trim().parse::<i64>() {
        Ok(min) => (Some(min), upper.trim().parse::<i64>().ok()),
        Err(_) => (None, None),
    }
}

impl fmt::Display for NumericRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.min, self.max)
    }
}

/// A range-valued text column, parsed once when the value is created.
///
/// The raw text is kept so legacy values that never parsed can still be shown.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "String", into = "String")]
pub struct RangeField {
    raw: String,
    lower: Option<i64>,
    upper: Option<i64>,
}

impl RangeField {
    pub fn new(raw: &str) -> Self {
        Self::from(raw.to_string())
    }

    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Both bounds, when the whole text is a well-formed range
    pub fn range(&self) -> Option<NumericRange> {
        match (self.lower, self.upper) {
            (Some(min), Some(max)) if min <= max => Some(NumericRange { min, max }),
            _ => None,
        }
    }

    /// Leading integer before the `-`, used by the cheapest/smallest orderings
    pub fn lower(&self) -> Option<i64> {
        self.lower
    }

    pub fn upper(&self) -> Option<i64> {
        self.upper
    }
}

impl From<String> for RangeField {
    fn from(raw: String) -> Self {
        let (lower, upper) = split_bounds(&raw);
        Self { raw, lower, upper }
    }
}

impl From<RangeField> for String {
    fn from(field: RangeField) -> Self {
        field.raw
    }
}

impl fmt::Display for RangeField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.range() {
            Some(range) => range.fmt(f),
            None => f.write_str(&self.raw),
        }
    }
}

/// A map position parsed from `"lat,lng"` text
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn parse(text: &str) -> Option<Self> {
        let (lat, lng) = text.split_once(',')?;
        let latitude = lat.trim().parse::<f64>().ok()?;
        let longitude = lng.trim().parse::<f64>().ok()?;

        let in_range = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);
        in_range.then_some(Self { latitude, longitude })
    }
}

/// Ordering applied to the apartment list
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    AToZ,
    ZToA,
    Cheapest,
    MostExpensive,
    Smallest,
    Largest,
    #[default]
    None,
}

impl SortOrder {
    pub const ALL: [SortOrder; 7] = [
        SortOrder::AToZ,
        SortOrder::ZToA,
        SortOrder::Cheapest,
        SortOrder::MostExpensive,
        SortOrder::Smallest,
        SortOrder::Largest,
        SortOrder::None,
    ];

    /// Label shown in the sort picker
    pub fn label(&self) -> &'static str {
        match self {
            SortOrder::AToZ => "A to Z",
            SortOrder::ZToA => "Z to A",
            SortOrder::Cheapest => "Cheapest",
            SortOrder::MostExpensive => "Most expensive",
            SortOrder::Smallest => "Smallest",
            SortOrder::Largest => "Largest",
            SortOrder::None => "None",
        }
    }
}
