use std::sync::Arc;

use futures::future::BoxFuture;
use serde::Deserialize;
use tracing::{debug, info};

use itinera_core::error::{ItineraError, Result};
use itinera_core::traits::{LocationDirectory, Tool};
use itinera_core::types::ToolResult;

/// Tool wrapper for the location capability.
pub struct LocationSearchTool {
    directory: Arc<dyn LocationDirectory>,
}

#[derive(Deserialize)]
struct LocationSearchInput {
    city: String,
}

impl LocationSearchTool {
    pub fn new(directory: Arc<dyn LocationDirectory>) -> Self {
        Self { directory }
    }
}

impl Tool for LocationSearchTool {
    fn name(&self) -> &str {
        "location_search"
    }

    fn description(&self) -> &str {
        "Search for a location code based on a keyword. The keyword is the city name."
    }

    fn input_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "city": {
                    "type": "string",
                    "description": "The city to search for"
                }
            },
            "required": ["city"]
        })
    }

    fn execute(&self, input: serde_json::Value) -> BoxFuture<'_, Result<ToolResult>> {
        Box::pin(async move {
            let params: LocationSearchInput = serde_json::from_value(input)
                .map_err(|e| ItineraError::ToolValidation(e.to_string()))?;

            info!(city = %params.city, "Searching for location");
            let locations = self.directory.search(&params.city).await.map_err(|e| {
                ItineraError::ToolExecution {
                    tool: "location_search".into(),
                    message: e.to_string(),
                }
            })?;
            debug!(count = locations.len(), "Location search finished");

            Ok(ToolResult::success(serde_json::to_string(&locations)?))
        })
    }
}
