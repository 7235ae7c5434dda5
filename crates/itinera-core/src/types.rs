use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for one in-flight conversation.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct ConversationId(pub String);

impl ConversationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for ConversationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConversationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Role in a conversation transcript.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Human,
    Ai,
    Tool,
}

/// A capability request embedded in a model response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub arguments: serde_json::Value,
}

/// A single entry in the conversation transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    /// Capability requests carried by an AI message, if any.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    /// For tool messages, the id of the originating tool call.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl ChatMessage {
    pub fn human(content: impl Into<String>) -> Self {
        Self {
            role: Role::Human,
            content: content.into(),
            tool_calls: vec![],
            tool_call_id: None,
            timestamp: Some(Utc::now()),
        }
    }

    pub fn ai(content: impl Into<String>) -> Self {
        Self {
            role: Role::Ai,
            content: content.into(),
            tool_calls: vec![],
            tool_call_id: None,
            timestamp: Some(Utc::now()),
        }
    }

    /// An AI message carrying capability requests for the tool loop.
    pub fn ai_with_tool_calls(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            role: Role::Ai,
            content: content.into(),
            tool_calls,
            tool_call_id: None,
            timestamp: Some(Utc::now()),
        }
    }

    /// A tool message tagged with the id of the call it answers.
    pub fn tool_result(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: Role::Tool,
            content: content.into(),
            tool_calls: vec![],
            tool_call_id: Some(tool_call_id.into()),
            timestamp: Some(Utc::now()),
        }
    }

    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

/// Result of a tool execution.
#[derive(Debug, Clone)]
pub struct ToolResult {
    pub content: String,
    pub is_error: bool,
}

impl ToolResult {
    pub fn success(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_error: false,
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_error: true,
        }
    }
}

/// Tool definition for binding to a model chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: serde_json::Value,
}

/// A location resolved by the location capability.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Location {
    pub name: String,
    pub iata_code: String,
    pub country: String,
}

/// A single flight segment within an itinerary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FlightSegment {
    pub departure_code: String,
    pub departure_time: String,
    pub arrival_code: String,
    pub arrival_time: String,
    pub carrier_code: String,
    pub flight_number: String,
    #[serde(default)]
    pub duration: String,
}

impl std::fmt::Display for FlightSegment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}{}: {} -> {} ({} - {})",
            self.carrier_code,
            self.flight_number,
            self.departure_code,
            self.arrival_code,
            self.departure_time,
            self.arrival_time
        )
    }
}

/// An outbound or return itinerary with one or more segments.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Itinerary {
    pub duration: String,
    pub segments: Vec<FlightSegment>,
}

impl std::fmt::Display for Itinerary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.segments.first() {
            Some(first) => {
                let hops = self
                    .segments
                    .iter()
                    .map(|s| s.arrival_code.as_str())
                    .collect::<Vec<_>>()
                    .join(" -> ");
                write!(
                    f,
                    "{} -> {} (Duration: {})",
                    first.departure_code, hops, self.duration
                )
            }
            None => write!(f, "Duration: {}", self.duration),
        }
    }
}

/// A complete flight offer: outbound and optional return itinerary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FlightOffer {
    pub offer_id: String,
    pub price: f64,
    pub currency: String,
    pub outbound: Itinerary,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_leg: Option<Itinerary>,
}

impl FlightOffer {
    /// Unique carrier codes across all segments, in first-seen order.
    pub fn airlines(&self) -> Vec<&str> {
        let mut carriers: Vec<&str> = Vec::new();
        let segments = self
            .outbound
            .segments
            .iter()
            .chain(self.return_leg.iter().flat_map(|i| i.segments.iter()));
        for seg in segments {
            if !carriers.contains(&seg.carrier_code.as_str()) {
                carriers.push(&seg.carrier_code);
            }
        }
        carriers
    }

    pub fn origin_code(&self) -> Option<&str> {
        self.outbound
            .segments
            .first()
            .map(|s| s.departure_code.as_str())
    }

    pub fn destination_code(&self) -> Option<&str> {
        match &self.return_leg {
            Some(ret) => ret.segments.last().map(|s| s.arrival_code.as_str()),
            None => self
                .outbound
                .segments
                .last()
                .map(|s| s.arrival_code.as_str()),
        }
    }
}

impl std::fmt::Display for FlightOffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Flight Offer {}", self.offer_id)?;
        writeln!(f, "  Price: {} {}", self.price, self.currency)?;
        writeln!(f, "  Outbound: {}", self.outbound)?;
        if let Some(ret) = &self.return_leg {
            writeln!(f, "  Return: {}", ret)?;
        }
        writeln!(f, "  Airlines: {}", self.airlines().join(", "))
    }
}

/// Parameters for the flight capability.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FlightQuery {
    pub origin_code: String,
    pub destination_code: String,
    pub start_date: String,
    pub end_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_price: Option<f64>,
    #[serde(default = "default_adults")]
    pub adults: u32,
}

fn default_adults() -> u32 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offer() -> FlightOffer {
        FlightOffer {
            offer_id: "1".into(),
            price: 850.0,
            currency: "USD".into(),
            outbound: Itinerary {
                duration: "PT8H".into(),
                segments: vec![FlightSegment {
                    departure_code: "JFK".into(),
                    departure_time: "2024-06-01T08:00".into(),
                    arrival_code: "CDG".into(),
                    arrival_time: "2024-06-01T20:00".into(),
                    carrier_code: "AF".into(),
                    flight_number: "007".into(),
                    duration: "PT8H".into(),
                }],
            },
            return_leg: Some(Itinerary {
                duration: "PT8H30M".into(),
                segments: vec![FlightSegment {
                    departure_code: "CDG".into(),
                    departure_time: "2024-06-10T10:00".into(),
                    arrival_code: "JFK".into(),
                    arrival_time: "2024-06-10T13:00".into(),
                    carrier_code: "DL".into(),
                    flight_number: "263".into(),
                    duration: "PT8H30M".into(),
                }],
            }),
        }
    }

    #[test]
    fn test_message_constructors() {
        let msg = ChatMessage::human("hello");
        assert_eq!(msg.role, Role::Human);
        assert!(!msg.has_tool_calls());

        let call = ToolCall {
            id: "call_1".into(),
            name: "location_search".into(),
            arguments: serde_json::json!({"city": "Paris"}),
        };
        let msg = ChatMessage::ai_with_tool_calls("", vec![call]);
        assert!(msg.has_tool_calls());

        let msg = ChatMessage::tool_result("call_1", "[]");
        assert_eq!(msg.role, Role::Tool);
        assert_eq!(msg.tool_call_id.as_deref(), Some("call_1"));
    }

    #[test]
    fn test_offer_accessors() {
        let offer = offer();
        assert_eq!(offer.origin_code(), Some("JFK"));
        assert_eq!(offer.destination_code(), Some("JFK"));
        assert_eq!(offer.airlines(), vec!["AF", "DL"]);
    }

    #[test]
    fn test_offer_display() {
        let text = offer().to_string();
        assert!(text.contains("Flight Offer 1"));
        assert!(text.contains("Price: 850 USD"));
        assert!(text.contains("Outbound: JFK -> CDG"));
        assert!(text.contains("Return: CDG -> JFK"));
        assert!(text.contains("Airlines: AF, DL"));
    }

    #[test]
    fn test_flight_query_adults_default() {
        let query: FlightQuery = serde_json::from_value(serde_json::json!({
            "origin_code": "JFK",
            "destination_code": "CDG",
            "start_date": "2024-06-01",
            "end_date": "2024-06-10"
        }))
        .unwrap();
        assert_eq!(query.adults, 1);
        assert_eq!(query.max_price, None);
    }
}
