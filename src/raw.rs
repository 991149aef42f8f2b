// (c) Copyright 2025 Mikołaj Kuranowski
// SPDX-License-Identifier: MIT

use serde::{Deserialize, Deserializer, Serialize};

use crate::model::Tags;

/// A node record, as extracted from map data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawNode {
    pub id: i64,
    pub lon: f64,
    pub lat: f64,

    #[serde(default, deserialize_with = "deserialize_tags")]
    pub tags: Tags,

    /// Number of raw edges starting or ending at this node.
    /// Filled in by the [loader](crate::loader) when absent in the source tables.
    #[serde(default)]
    pub adjacent_edge_count: Option<u32>,
}

/// A (possibly two-way) edge record, as extracted from map data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawEdge {
    pub start_id: i64,
    pub end_id: i64,

    #[serde(default)]
    pub highway_category: String,

    /// Speed limit in the "<number> <unit>" format, e.g. "35 mph".
    #[serde(default)]
    pub max_speed: Option<String>,

    #[serde(default)]
    pub lanes: Option<u32>,

    #[serde(default = "default_oneway")]
    pub oneway: bool,

    #[serde(default)]
    pub length_meters: Option<f64>,

    /// Polyline of `[lon, lat]` pairs.
    #[serde(default)]
    pub geometry: Vec<[f64; 2]>,
}

/// Both tables of a road-network extract.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTables {
    pub nodes: Vec<RawNode>,
    pub edges: Vec<RawEdge>,
}

fn default_oneway() -> bool {
    true
}

/// Accepts any scalar tag value (strings, numbers, booleans), storing it as a string.
/// Null values are dropped.
fn deserialize_tags<'de, D: Deserializer<'de>>(d: D) -> Result<Tags, D::Error> {
    let raw: Option<serde_json::Map<String, serde_json::Value>> = Option::deserialize(d)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(k, v)| match v {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) => Some((k, s)),
            other => Some((k, other.to_string())),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_defaults() {
        let n: RawNode = serde_json::from_str(r#"{"id": 5, "lon": 1.0, "lat": 2.0}"#).unwrap();
        assert_eq!(n.id, 5);
        assert!(n.tags.is_empty());
        assert_eq!(n.adjacent_edge_count, None);
    }

    #[test]
    fn node_tags_are_stringified() {
        let n: RawNode = serde_json::from_str(
            r#"{"id": 5, "lon": 1.0, "lat": 2.0, "tags": {"highway": "stop", "lanes": 2, "x": null, "y": true}}"#,
        )
        .unwrap();
        assert_eq!(n.tags.get("highway").map(String::as_str), Some("stop"));
        assert_eq!(n.tags.get("lanes").map(String::as_str), Some("2"));
        assert_eq!(n.tags.get("y").map(String::as_str), Some("true"));
        assert!(!n.tags.contains_key("x"));
    }

    #[test]
    fn node_null_tags() {
        let n: RawNode =
            serde_json::from_str(r#"{"id": 5, "lon": 1.0, "lat": 2.0, "tags": null}"#).unwrap();
        assert!(n.tags.is_empty());
    }

    #[test]
    fn edge_defaults() {
        let e: RawEdge = serde_json::from_str(r#"{"start_id": 1, "end_id": 2}"#).unwrap();
        assert!(e.oneway);
        assert_eq!(e.highway_category, "");
        assert_eq!(e.max_speed, None);
        assert_eq!(e.lanes, None);
        assert_eq!(e.length_meters, None);
        assert!(e.geometry.is_empty());
    }
}
