//! Core data models for ventilator telemetry records
//!
//! This module defines the value types produced by the frame parser and the
//! ingestion record shape handed to the store. Parsed records mirror the
//! JSON layout deployed gateways already consume: a `sections` object keyed
//! by single letters, plus named field groups that are populated only when
//! the corresponding section is present.

use chrono::{DateTime, Utc};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::constants::{DEVICE_TYPE_BIPAP, DEVICE_TYPE_CPAP};
use crate::{Error, Result};

/// A single data token from a telemetry frame
///
/// Tokens are float-parsed on ingestion; anything that fails float parsing
/// (mode words like `MANUALMODE`, garbled values on lossy links) survives
/// verbatim as a string. Untagged serde keeps the wire shape identical to
/// the deployed JSON: `12.2` or `"MANUALMODE"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TokenValue {
    /// Token that parsed as a 64-bit float
    Number(f64),
    /// Token kept verbatim after float parsing failed
    Text(String),
}

impl TokenValue {
    /// Parse a raw token: float if possible, verbatim string otherwise
    pub fn parse(raw: &str) -> Self {
        match raw.parse::<f64>() {
            Ok(value) => TokenValue::Number(value),
            Err(_) => TokenValue::Text(raw.to_string()),
        }
    }

    /// Numeric value, if this token parsed as a float
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            TokenValue::Number(value) => Some(*value),
            TokenValue::Text(_) => None,
        }
    }

    /// String value, if this token stayed textual
    pub fn as_str(&self) -> Option<&str> {
        match self {
            TokenValue::Number(_) => None,
            TokenValue::Text(text) => Some(text),
        }
    }

    /// Whether this token parsed as a float
    pub fn is_number(&self) -> bool {
        matches!(self, TokenValue::Number(_))
    }
}

impl From<f64> for TokenValue {
    fn from(value: f64) -> Self {
        TokenValue::Number(value)
    }
}

impl From<&str> for TokenValue {
    fn from(value: &str) -> Self {
        TokenValue::Text(value.to_string())
    }
}

impl fmt::Display for TokenValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenValue::Number(value) => write!(f, "{}", value),
            TokenValue::Text(text) => write!(f, "{}", text),
        }
    }
}

/// Insertion-ordered mapping from section letter to its data tokens
///
/// Sections iterate in first-encounter order; lookup is by letter. A
/// repeated letter replaces its data in place (last occurrence wins) without
/// changing the iteration position. Serializes as a JSON object keyed by
/// letter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SectionMap {
    entries: Vec<(char, Vec<TokenValue>)>,
}

impl SectionMap {
    /// Create an empty section map
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Insert a section, replacing the data of an existing letter in place
    pub fn insert(&mut self, letter: char, values: Vec<TokenValue>) {
        match self.entries.iter_mut().find(|(key, _)| *key == letter) {
            Some((_, existing)) => *existing = values,
            None => self.entries.push((letter, values)),
        }
    }

    /// Tokens of a section, if present
    pub fn get(&self, letter: char) -> Option<&[TokenValue]> {
        self.entries
            .iter()
            .find(|(key, _)| *key == letter)
            .map(|(_, values)| values.as_slice())
    }

    /// Whether the map holds a section under this letter
    pub fn contains(&self, letter: char) -> bool {
        self.get(letter).is_some()
    }

    /// A single token of a section by position, if present
    pub fn token(&self, letter: char, index: usize) -> Option<&TokenValue> {
        self.get(letter).and_then(|values| values.get(index))
    }

    /// Iterate sections in first-encounter order
    pub fn iter(&self) -> impl Iterator<Item = (char, &[TokenValue])> {
        self.entries
            .iter()
            .map(|(letter, values)| (*letter, values.as_slice()))
    }

    /// Number of sections
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the map holds no sections
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of tokens across all sections
    pub fn token_count(&self) -> usize {
        self.entries.iter().map(|(_, values)| values.len()).sum()
    }
}

impl Serialize for SectionMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (letter, values) in &self.entries {
            map.serialize_entry(&letter.to_string(), values)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for SectionMap {
    fn deserialize<D: Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Self, D::Error> {
        struct SectionMapVisitor;

        impl<'de> Visitor<'de> for SectionMapVisitor {
            type Value = SectionMap;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a map of section letters to token arrays")
            }

            fn visit_map<A: MapAccess<'de>>(
                self,
                mut access: A,
            ) -> std::result::Result<Self::Value, A::Error> {
                let mut sections = SectionMap::new();
                while let Some((key, values)) = access.next_entry::<String, Vec<TokenValue>>()? {
                    let mut chars = key.chars();
                    let letter = match (chars.next(), chars.next()) {
                        (Some(letter), None) => letter,
                        _ => {
                            return Err(serde::de::Error::custom(format!(
                                "section key must be a single letter, got '{}'",
                                key
                            )));
                        }
                    };
                    sections.insert(letter, values);
                }
                Ok(sections)
            }
        }

        deserializer.deserialize_map(SectionMapVisitor)
    }
}

/// Supported ventilator device classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeviceType {
    #[serde(rename = "CPAP")]
    Cpap,
    #[serde(rename = "BIPAP")]
    Bipap,
}

impl DeviceType {
    /// Wire label for this device type
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceType::Cpap => DEVICE_TYPE_CPAP,
            DeviceType::Bipap => DEVICE_TYPE_BIPAP,
        }
    }
}

impl fmt::Display for DeviceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DeviceType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            DEVICE_TYPE_CPAP => Ok(DeviceType::Cpap),
            DEVICE_TYPE_BIPAP => Ok(DeviceType::Bipap),
            other => Err(Error::unknown_device_type(other)),
        }
    }
}

/// Frame metadata from section S
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    pub date: Option<TokenValue>,
    pub time: Option<TokenValue>,
}

/// Pressure group (CPAP section G, BIPAP section A)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pressure {
    pub ipap: Option<TokenValue>,
    pub ramp: Option<TokenValue>,
}

/// Flow group (CPAP section H)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Flow {
    pub max_flow: Option<TokenValue>,
    pub min_flow: Option<TokenValue>,
    pub backup_rate: Option<TokenValue>,
    pub mode: Option<TokenValue>,
}

/// Ventilation group (BIPAP section B)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ventilation {
    pub ipap: Option<TokenValue>,
    pub epap: Option<TokenValue>,
    pub backup_rate: Option<TokenValue>,
    pub tidal_volume: Option<TokenValue>,
    pub insp_time: Option<TokenValue>,
    pub rise_time: Option<TokenValue>,
    pub trigger: Option<TokenValue>,
    pub mode: Option<TokenValue>,
}

/// Settings group (CPAP section I, BIPAP section F)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub humidity: Option<TokenValue>,
    pub temperature: Option<TokenValue>,
    pub tube_type: Option<TokenValue>,
    pub mask_type: Option<TokenValue>,
    pub trigger: Option<TokenValue>,
    pub cycle: Option<TokenValue>,
    pub mode: Option<TokenValue>,
}

/// Decoded telemetry frame
///
/// `sections` always preserves every section verbatim; the named groups are
/// read-only projections over it and are present only when the backing
/// section letter appeared in the frame. Fields missing within a present
/// section serialize as `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedRecord {
    pub sections: SectionMap,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub pressure: Option<Pressure>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub flow: Option<Flow>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ventilation: Option<Ventilation>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub section_c: Option<Vec<TokenValue>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub section_d: Option<Vec<TokenValue>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub section_e: Option<Vec<TokenValue>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub settings: Option<Settings>,
}

/// Where an ingested record entered the system
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    /// Relayed by the cloud broker (hardware gateways)
    Cloud,
    /// Uploaded by companion software
    Software,
    /// Direct API submission
    #[default]
    Direct,
}

impl DataSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataSource::Cloud => "cloud",
            DataSource::Software => "software",
            DataSource::Direct => "direct",
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataSource {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "cloud" => Ok(DataSource::Cloud),
            "software" => Ok(DataSource::Software),
            "direct" => Ok(DataSource::Direct),
            other => Err(Error::data_validation(format!(
                "Unknown data source '{}' (expected cloud, software or direct)",
                other
            ))),
        }
    }
}

/// One ingested telemetry reading, as handed to the record store
///
/// Carries the original frame alongside its decoding so a garbled field
/// never costs the raw capture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryRecord {
    pub device_type: DeviceType,
    pub device_id: String,
    pub device_status: i64,
    pub raw_data: String,
    pub parsed_data: ParsedRecord,
    pub data_source: DataSource,
    pub timestamp: DateTime<Utc>,
}

impl TelemetryRecord {
    /// Assemble a record stamped with the current time
    pub fn new(
        device_type: DeviceType,
        device_id: String,
        device_status: i64,
        raw_data: String,
        parsed_data: ParsedRecord,
        data_source: DataSource,
    ) -> Self {
        Self {
            device_type,
            device_id,
            device_status,
            raw_data,
            parsed_data,
            data_source,
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_value_parse() {
        assert_eq!(TokenValue::parse("12.2"), TokenValue::Number(12.2));
        assert_eq!(TokenValue::parse("-1.5"), TokenValue::Number(-1.5));
        assert_eq!(TokenValue::parse("141125"), TokenValue::Number(141125.0));
        assert_eq!(
            TokenValue::parse("MANUALMODE"),
            TokenValue::Text("MANUALMODE".to_string())
        );
        assert_eq!(TokenValue::parse(""), TokenValue::Text(String::new()));
    }

    #[test]
    fn test_token_value_untagged_serde() {
        let number = serde_json::to_string(&TokenValue::Number(12.2)).unwrap();
        assert_eq!(number, "12.2");

        let text = serde_json::to_string(&TokenValue::from("MANUALMODE")).unwrap();
        assert_eq!(text, "\"MANUALMODE\"");
    }

    #[test]
    fn test_section_map_order_and_last_wins() {
        let mut sections = SectionMap::new();
        sections.insert('S', vec![TokenValue::Number(1.0)]);
        sections.insert('G', vec![TokenValue::Number(2.0)]);
        sections.insert('S', vec![TokenValue::Number(3.0)]);

        // Last occurrence wins for data, first-encounter position for order
        assert_eq!(sections.len(), 2);
        assert_eq!(sections.get('S'), Some(&[TokenValue::Number(3.0)][..]));
        let letters: Vec<char> = sections.iter().map(|(letter, _)| letter).collect();
        assert_eq!(letters, vec!['S', 'G']);
    }

    #[test]
    fn test_section_map_serializes_as_object() {
        let mut sections = SectionMap::new();
        sections.insert('S', vec![TokenValue::Number(141125.0)]);
        sections.insert('G', vec![TokenValue::from("MANUALMODE")]);

        let json = serde_json::to_value(&sections).unwrap();
        assert_eq!(json["S"][0], serde_json::json!(141125.0));
        assert_eq!(json["G"][0], serde_json::json!("MANUALMODE"));
    }

    #[test]
    fn test_section_map_round_trip() {
        let mut sections = SectionMap::new();
        sections.insert('S', vec![TokenValue::Number(1.0), TokenValue::from("x")]);
        sections.insert('B', vec![]);

        let json = serde_json::to_string(&sections).unwrap();
        let back: SectionMap = serde_json::from_str(&json).unwrap();
        assert_eq!(back, sections);
    }

    #[test]
    fn test_device_type_labels() {
        assert_eq!("CPAP".parse::<DeviceType>().unwrap(), DeviceType::Cpap);
        assert_eq!("BIPAP".parse::<DeviceType>().unwrap(), DeviceType::Bipap);
        assert!(matches!(
            "cpap".parse::<DeviceType>(),
            Err(Error::UnknownDeviceType { .. })
        ));
        assert_eq!(serde_json::to_string(&DeviceType::Cpap).unwrap(), "\"CPAP\"");
    }

    #[test]
    fn test_parsed_record_omits_absent_groups() {
        let record = ParsedRecord::default();
        let json = serde_json::to_value(&record).unwrap();
        let object = json.as_object().unwrap();
        assert_eq!(object.len(), 1);
        assert!(object.contains_key("sections"));
    }

    #[test]
    fn test_present_group_serializes_missing_fields_as_null() {
        let record = ParsedRecord {
            metadata: Some(Metadata {
                date: Some(TokenValue::Number(141125.0)),
                time: None,
            }),
            ..Default::default()
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["metadata"]["date"], serde_json::json!(141125.0));
        assert!(json["metadata"]["time"].is_null());
    }

    #[test]
    fn test_data_source_wire_values() {
        assert_eq!(serde_json::to_string(&DataSource::Cloud).unwrap(), "\"cloud\"");
        assert_eq!(DataSource::default(), DataSource::Direct);
        assert_eq!("software".parse::<DataSource>().unwrap(), DataSource::Software);
        assert!("CLOUD".parse::<DataSource>().is_err());
    }
}
