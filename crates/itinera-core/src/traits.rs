use std::collections::HashMap;
use std::sync::Arc;

use futures::future::BoxFuture;

use crate::error::{ItineraError, Result};
use crate::types::{ChatMessage, FlightOffer, FlightQuery, Location, ToolDefinition, ToolResult};

/// Parameters for building a model chain.
#[derive(Debug, Clone)]
pub struct ChainRequest {
    /// Prompt template with `{{var}}` placeholders.
    pub prompt: String,
    /// Tools bound to the chain, if any.
    pub tools: Vec<ToolDefinition>,
    /// JSON schema of the structured output, if the node expects one.
    pub schema: Option<serde_json::Value>,
    pub temperature: f32,
}

impl ChainRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            tools: vec![],
            schema: None,
            temperature: 0.0,
        }
    }

    pub fn with_tools(mut self, tools: Vec<ToolDefinition>) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_schema(mut self, schema: serde_json::Value) -> Self {
        self.schema = Some(schema);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

/// What a chain invocation produced.
#[derive(Debug, Clone)]
pub enum ChainResponse {
    /// A free-form message, possibly carrying tool calls.
    Message(ChatMessage),
    /// A structured object matching the requested schema.
    Structured(serde_json::Value),
}

impl ChainResponse {
    /// Deserialize a structured response into its schema type.
    pub fn into_structured<T: serde::de::DeserializeOwned>(self) -> Result<T> {
        match self {
            ChainResponse::Structured(value) => serde_json::from_value(value)
                .map_err(|e| ItineraError::ChainParse(e.to_string())),
            ChainResponse::Message(_) => Err(ItineraError::ChainParse(
                "expected structured output, got a message".into(),
            )),
        }
    }

    /// Unwrap a free-form message response.
    pub fn into_message(self) -> Result<ChatMessage> {
        match self {
            ChainResponse::Message(msg) => Ok(msg),
            ChainResponse::Structured(_) => Err(ItineraError::ChainParse(
                "expected a message, got structured output".into(),
            )),
        }
    }
}

/// Model-chain collaborator — builds invocable chains from a request.
pub trait ChainProvider: Send + Sync + 'static {
    fn get_chain(&self, request: ChainRequest) -> BoxFuture<'_, Result<Arc<dyn Chain>>>;
}

/// An invocable chain bound to a prompt template.
pub trait Chain: Send + Sync + 'static {
    /// Invoke with the current transcript and node-specific variables.
    fn invoke(
        &self,
        messages: Vec<ChatMessage>,
        variables: HashMap<String, String>,
    ) -> BoxFuture<'_, Result<ChainResponse>>;
}

/// Tool — an external capability the model may request.
pub trait Tool: Send + Sync + 'static {
    /// Tool name (used in model tool calls).
    fn name(&self) -> &str;

    /// Human-readable description.
    fn description(&self) -> &str;

    /// JSON Schema for tool input.
    fn input_schema(&self) -> serde_json::Value;

    /// Execute the tool with given input.
    fn execute(&self, input: serde_json::Value) -> BoxFuture<'_, Result<ToolResult>>;

    /// Timeout in seconds for this tool.
    fn timeout_secs(&self) -> u64 {
        30
    }
}

/// Location data collaborator.
pub trait LocationDirectory: Send + Sync + 'static {
    /// Search locations by city keyword.
    fn search(&self, city: &str) -> BoxFuture<'_, Result<Vec<Location>>>;
}

/// Flight data collaborator.
pub trait FlightInventory: Send + Sync + 'static {
    /// Search flight offers matching the query.
    fn search(&self, query: &FlightQuery) -> BoxFuture<'_, Result<Vec<FlightOffer>>>;
}
