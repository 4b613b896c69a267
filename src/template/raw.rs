//! On-disk POC shape, deserialized verbatim before validation.

use serde::Deserialize;
use std::collections::BTreeMap;

/// A YAML field that may be written either as a scalar or as a list.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::One(v) => vec![v],
            OneOrMany::Many(v) => v,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawTemplate {
    pub id: Option<String>,
    pub info: Option<RawInfo>,
    #[serde(alias = "requests")]
    pub http: Option<Vec<RawStep>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawInfo {
    pub name: Option<String>,
    pub severity: Option<String>,
    pub category: Option<String>,
    pub author: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawStep {
    pub method: Option<OneOrMany<String>>,
    pub path: Option<OneOrMany<String>>,
    pub body: Option<OneOrMany<String>>,
    #[serde(rename = "Rheader")]
    pub header_lines: Option<OneOrMany<String>>,
    pub headers: Option<BTreeMap<String, serde_yaml::Value>>,
    #[serde(alias = "matchers-condition")]
    pub condition: Option<String>,
    #[serde(default)]
    pub matchers: Vec<RawMatcher>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawMatcher {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub part: Option<String>,
    pub words: Option<OneOrMany<String>>,
    pub status: Option<OneOrMany<u16>>,
    pub gt: Option<f64>,
    pub lt: Option<f64>,
    pub gte: Option<f64>,
    pub lte: Option<f64>,
}
