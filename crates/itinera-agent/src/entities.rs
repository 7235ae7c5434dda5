//! Structured-output schemas the workflow nodes request from the model.

use serde::{Deserialize, Deserializer};

/// Validator verdict for a user query.
#[derive(Debug, Clone, Deserialize)]
pub struct IsValid {
    /// The validity of the user's query. It can be 'True' or 'False'.
    pub is_valid: String,
    #[serde(default)]
    pub reason: Option<String>,
}

impl IsValid {
    pub fn verdict(&self) -> bool {
        self.is_valid.eq_ignore_ascii_case("true")
    }

    pub fn schema() -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "is_valid": {
                    "type": "string",
                    "description": "The validity of the user's query. It can be 'True' or 'False'."
                },
                "reason": {
                    "type": ["string", "null"],
                    "description": "Why the query is invalid, if it is."
                }
            },
            "required": ["is_valid"]
        })
    }
}

/// Trip parameters extracted from the transcript.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryExtractedInfo {
    /// The maximum price (optional). Models sometimes return this as a
    /// string; both forms are accepted.
    #[serde(default, deserialize_with = "budget_from_number_or_string")]
    pub budget: Option<f64>,
    pub origin: String,
    pub destination: String,
    pub start_date: String,
    pub end_date: String,
}

impl QueryExtractedInfo {
    pub fn schema() -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "budget": {
                    "type": ["number", "string", "null"],
                    "description": "The maximum price (optional). If not mentioned, set this to null."
                },
                "origin": {
                    "type": "string",
                    "description": "The origin city or location (e.g., 'New York', 'Medellin')"
                },
                "destination": {
                    "type": "string",
                    "description": "The destination city or location (e.g., 'Paris', 'Tokyo')"
                },
                "start_date": {
                    "type": "string",
                    "description": "The departure date. Format: YYYY-MM-DD"
                },
                "end_date": {
                    "type": "string",
                    "description": "The return date. Format: YYYY-MM-DD"
                }
            },
            "required": ["origin", "destination", "start_date", "end_date"]
        })
    }
}

fn budget_from_number_or_string<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    match value {
        None | Some(serde_json::Value::Null) => Ok(None),
        Some(serde_json::Value::Number(n)) => Ok(n.as_f64()),
        Some(serde_json::Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(serde_json::Value::String(s)) => s
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|e| serde::de::Error::custom(format!("budget: {e}"))),
        Some(other) => Err(serde::de::Error::custom(format!(
            "budget: expected number or string, got {other}"
        ))),
    }
}

/// Resolved IATA codes for origin and destination.
#[derive(Debug, Clone, Deserialize)]
pub struct LocationCodes {
    pub origin_code: String,
    pub destination_code: String,
}

impl LocationCodes {
    pub fn schema() -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "origin_code": {
                    "type": "string",
                    "description": "The IATA code of the origin city"
                },
                "destination_code": {
                    "type": "string",
                    "description": "The IATA code of the destination city"
                }
            },
            "required": ["origin_code", "destination_code"]
        })
    }
}

impl std::fmt::Display for LocationCodes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "origin_code={} destination_code={}",
            self.origin_code, self.destination_code
        )
    }
}

/// Serialized summary of the flight search.
#[derive(Debug, Clone, Deserialize)]
pub struct FlightResultsSummary {
    pub flight_results: String,
}

impl FlightResultsSummary {
    pub fn schema() -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "flight_results": {
                    "type": "string",
                    "description": "The results of the flight search"
                }
            },
            "required": ["flight_results"]
        })
    }
}
