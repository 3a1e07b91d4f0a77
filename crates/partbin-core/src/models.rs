//! Data models for partbin
//!
//! Defines the component record stored in the inventory document, the
//! partial update applied by edits, and the built-in starter dataset.
//!
//! Field names follow the document format shared with other clients
//! (`partNumber`, not `part_number`), so the serde representation is
//! camelCase.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Records with fewer than this many parts on hand are flagged as low stock
pub const LOW_STOCK_THRESHOLD: u32 = 5;

/// Namespace for ids derived from the natural key of id-less records
const ID_NAMESPACE: Uuid = Uuid::from_u128(0x6f1c_2a4e_8d3b_4c70_9a15_e2b7_d0c4_5f38);

/// A single inventory entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    /// Surrogate key, assigned once when the record is created.
    ///
    /// Nil when the stored record had no id; [`crate::codec::decode_collection`]
    /// replaces it with [`Component::derived_id`].
    #[serde(default)]
    pub id: Uuid,
    /// Part designation, e.g. `AMS1117-3.3`
    pub name: String,
    /// Free-text classification
    #[serde(default)]
    pub category: String,
    /// Vendor or distributor SKU
    pub part_number: String,
    /// Storage bin identifier
    #[serde(default)]
    pub location: String,
    /// Footprint code, e.g. `SOT-223`
    #[serde(default)]
    pub package: String,
    /// Free-text electrical specification
    #[serde(default)]
    pub parameters: String,
    /// Quantity on hand
    pub stock: u32,
    /// Datasheet URL
    #[serde(default, with = "datasheet_field")]
    pub datasheet: Option<String>,
}

impl Component {
    /// Create a new record with a fresh id and zero stock
    pub fn new(name: impl Into<String>, part_number: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            category: String::new(),
            part_number: part_number.into(),
            location: String::new(),
            package: String::new(),
            parameters: String::new(),
            stock: 0,
            datasheet: None,
        }
    }

    /// Stable id for a record stored without one.
    ///
    /// `occurrence` counts earlier id-less records with the same natural
    /// key in the same document, so exact duplicates still get distinct ids.
    pub fn derived_id(name: &str, part_number: &str, occurrence: usize) -> Uuid {
        let seed = format!("{}\u{0}{}\u{0}{}", name, part_number, occurrence);
        Uuid::new_v5(&ID_NAMESPACE, seed.as_bytes())
    }

    /// The `(name, partNumber)` pair shown to users
    pub fn natural_key(&self) -> NaturalKey<'_> {
        NaturalKey {
            name: &self.name,
            part_number: &self.part_number,
        }
    }

    /// Whether stock is below [`LOW_STOCK_THRESHOLD`]
    pub fn is_low_stock(&self) -> bool {
        self.stock < LOW_STOCK_THRESHOLD
    }

    /// Case-insensitive match against name, category, part number and parameters
    pub fn matches(&self, query: &str) -> bool {
        let query = query.to_lowercase();
        [
            &self.name,
            &self.category,
            &self.part_number,
            &self.parameters,
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(&query))
    }
}

/// Display-level identity of a record.
///
/// Not unique: two records may share both fields. Lookups that must be
/// exact use [`Component::id`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NaturalKey<'a> {
    pub name: &'a str,
    pub part_number: &'a str,
}

impl fmt::Display for NaturalKey<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.part_number)
    }
}

/// Partial update for an existing record; `None` leaves a field untouched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComponentPatch {
    pub name: Option<String>,
    pub category: Option<String>,
    pub part_number: Option<String>,
    pub location: Option<String>,
    pub package: Option<String>,
    pub parameters: Option<String>,
    pub stock: Option<u32>,
    /// `Some(String::new())` clears the datasheet
    pub datasheet: Option<String>,
}

impl ComponentPatch {
    /// Whether applying this patch would change nothing
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Apply the patch in place. The id is never touched.
    pub fn apply(self, component: &mut Component) {
        if let Some(name) = self.name {
            component.name = name;
        }
        if let Some(category) = self.category {
            component.category = category;
        }
        if let Some(part_number) = self.part_number {
            component.part_number = part_number;
        }
        if let Some(location) = self.location {
            component.location = location;
        }
        if let Some(package) = self.package {
            component.package = package;
        }
        if let Some(parameters) = self.parameters {
            component.parameters = parameters;
        }
        if let Some(stock) = self.stock {
            component.stock = stock;
        }
        if let Some(datasheet) = self.datasheet {
            component.datasheet = if datasheet.is_empty() {
                None
            } else {
                Some(datasheet)
            };
        }
    }
}

/// Starter inventory used when neither the remote nor the local cache has data
pub fn default_components() -> Vec<Component> {
    let mut ldo = Component::new("AMS1117-3.3", "C347223");
    ldo.category = "线性稳压器(LDO)".to_string();
    ldo.location = "1".to_string();
    ldo.package = "SOT-223".to_string();
    ldo.parameters = "输出电压5V，输出电流1A，耐压12V".to_string();
    ldo.stock = 10;

    let mut inductor = Component::new("APH25201DT2K2M", "C5349606");
    inductor.category = "功率电感".to_string();
    inductor.location = "2".to_string();
    inductor.package = "1008".to_string();
    inductor.parameters = "电感值2.2uH，额定电流2.1A，饱和电流3A，精度±20%".to_string();
    inductor.stock = 5;

    vec![ldo, inductor]
}

/// Missing datasheets are written as `""`, matching documents from older
/// clients. Both `""` and `null` read back as `None`.
mod datasheet_field {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Option<String>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(value.as_deref().unwrap_or(""))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
        let value: Option<String> = Option::deserialize(deserializer)?;
        Ok(value.filter(|v| !v.is_empty()))
    }
}
