use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Rule severity, ordered by blocking strength.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(into = "String")]
pub enum Severity {
    Info,
    Warning,
    #[default]
    Error,
    Fatal,
}

impl Severity {
    pub const ALL: [Severity; 4] = [
        Severity::Fatal,
        Severity::Error,
        Severity::Warning,
        Severity::Info,
    ];

    pub fn is_blocking(self) -> bool {
        matches!(self, Severity::Error | Severity::Fatal)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
            Severity::Fatal => "fatal",
        }
    }
}

impl From<String> for Severity {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "info" => Severity::Info,
            "warning" | "warn" => Severity::Warning,
            "fatal" | "critical" => Severity::Fatal,
            // unknown severities are treated as blocking
            _ => Severity::Error,
        }
    }
}

// A null or missing severity falls back to the default.
impl<'de> Deserialize<'de> for Severity {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<String>::deserialize(deserializer)?
            .map(Severity::from)
            .unwrap_or_default())
    }
}

impl From<Severity> for String {
    fn from(value: Severity) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RuleType {
    Required,
    Unique,
    Range,
    Regex,
    Comparison,
    Readonly,
    Other(String),
}

impl RuleType {
    pub fn as_str(&self) -> &str {
        match self {
            RuleType::Required => "required",
            RuleType::Unique => "unique",
            RuleType::Range => "range",
            RuleType::Regex => "regex",
            RuleType::Comparison => "comparison",
            RuleType::Readonly => "readonly",
            RuleType::Other(name) => name,
        }
    }
}

impl From<String> for RuleType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "required" => RuleType::Required,
            "unique" => RuleType::Unique,
            "range" => RuleType::Range,
            "regex" => RuleType::Regex,
            "comparison" => RuleType::Comparison,
            "readonly" => RuleType::Readonly,
            _ => RuleType::Other(value),
        }
    }
}

impl From<RuleType> for String {
    fn from(value: RuleType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for RuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A business rule as stored by the server.
///
/// The client reads the rule type, target columns and severity; the rule is
/// serialized back exactly as it was received.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub rule_type: RuleType,
    pub columns: Vec<String>,
    pub severity: Severity,
    raw: serde_json::Value,
}

#[derive(Deserialize)]
struct RuleFields {
    #[serde(rename = "type")]
    rule_type: RuleType,
    #[serde(default, deserialize_with = "one_or_many")]
    column: Vec<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    columns: Vec<String>,
    #[serde(default)]
    severity: Severity,
}

impl Rule {
    /// A rule parameter the client does not interpret, such as `min` or `pattern`.
    pub fn param(&self, name: &str) -> Option<&serde_json::Value> {
        self.raw.get(name)
    }
}

impl TryFrom<serde_json::Value> for Rule {
    type Error = serde_json::Error;

    fn try_from(raw: serde_json::Value) -> Result<Self, Self::Error> {
        let fields = RuleFields::deserialize(&raw)?;
        let mut columns = fields.column;
        columns.extend(fields.columns);
        Ok(Self {
            rule_type: fields.rule_type,
            columns,
            severity: fields.severity,
            raw,
        })
    }
}

impl<'de> Deserialize<'de> for Rule {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = serde_json::Value::deserialize(deserializer)?;
        Rule::try_from(raw).map_err(serde::de::Error::custom)
    }
}

impl Serialize for Rule {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.raw.serialize(serializer)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RuleSet {
    #[serde(default)]
    pub schema: serde_json::Value,
    #[serde(default)]
    pub rules: Vec<Rule>,
}

impl RuleSet {
    pub fn readonly_columns(&self) -> BTreeSet<String> {
        self.columns_of(RuleType::Readonly)
    }

    pub fn required_columns(&self) -> BTreeSet<String> {
        self.columns_of(RuleType::Required)
    }

    pub fn is_editable(&self, column: &str) -> bool {
        !self.rules.iter().any(|rule| {
            rule.rule_type == RuleType::Readonly && rule.columns.iter().any(|c| c == column)
        })
    }

    fn columns_of(&self, rule_type: RuleType) -> BTreeSet<String> {
        self.rules
            .iter()
            .filter(|rule| rule.rule_type == rule_type)
            .flat_map(|rule| rule.columns.iter().cloned())
            .collect()
    }
}
