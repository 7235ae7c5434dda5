use std::sync::Arc;

use futures::future::BoxFuture;
use serde::Deserialize;
use tracing::{debug, info};

use itinera_core::error::{ItineraError, Result};
use itinera_core::traits::{FlightInventory, Tool};
use itinera_core::types::{FlightQuery, ToolResult};

/// Tool wrapper for the flight capability.
pub struct FlightSearchTool {
    inventory: Arc<dyn FlightInventory>,
}

#[derive(Deserialize)]
struct FlightSearchInput {
    origin_code: String,
    destination_code: String,
    start_date: String,
    end_date: String,
    #[serde(default)]
    max_price: Option<f64>,
    #[serde(default)]
    adults: Option<u32>,
}

impl FlightSearchTool {
    pub fn new(inventory: Arc<dyn FlightInventory>) -> Self {
        Self { inventory }
    }
}

impl Tool for FlightSearchTool {
    fn name(&self) -> &str {
        "flight_search"
    }

    fn description(&self) -> &str {
        "Search for a flight based on origin, destination, start date, end date, and max price"
    }

    fn input_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "origin_code": {
                    "type": "string",
                    "description": "The origin of the flight. Format: IATA code"
                },
                "destination_code": {
                    "type": "string",
                    "description": "The destination of the flight. Format: IATA code"
                },
                "start_date": {
                    "type": "string",
                    "description": "The start date of the flight. Format: YYYY-MM-DD"
                },
                "end_date": {
                    "type": "string",
                    "description": "The end date of the flight. Format: YYYY-MM-DD"
                },
                "max_price": {
                    "type": "number",
                    "description": "The max price of the flight. Format: USD. If not mentioned, set this to null."
                }
            },
            "required": ["origin_code", "destination_code", "start_date", "end_date"]
        })
    }

    fn execute(&self, input: serde_json::Value) -> BoxFuture<'_, Result<ToolResult>> {
        Box::pin(async move {
            let params: FlightSearchInput = serde_json::from_value(input)
                .map_err(|e| ItineraError::ToolValidation(e.to_string()))?;

            let query = FlightQuery {
                origin_code: params.origin_code,
                destination_code: params.destination_code,
                start_date: params.start_date,
                end_date: params.end_date,
                max_price: params.max_price,
                adults: params.adults.unwrap_or(1),
            };

            info!(
                origin = %query.origin_code,
                destination = %query.destination_code,
                start_date = %query.start_date,
                end_date = %query.end_date,
                "Searching for flights"
            );
            let offers = self.inventory.search(&query).await.map_err(|e| {
                ItineraError::ToolExecution {
                    tool: "flight_search".into(),
                    message: e.to_string(),
                }
            })?;
            debug!(count = offers.len(), "Flight search finished");

            let summaries = offers
                .iter()
                .map(|o| o.to_string())
                .collect::<Vec<_>>()
                .join("\n");
            Ok(ToolResult::success(summaries))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::StaticFlights;

    #[tokio::test]
    async fn test_filters_by_max_price() {
        let tool = FlightSearchTool::new(Arc::new(StaticFlights::with_defaults()));
        let result = tool
            .execute(serde_json::json!({
                "origin_code": "NYC",
                "destination_code": "PAR",
                "start_date": "2024-06-01",
                "end_date": "2024-06-10",
                "max_price": 1000.0
            }))
            .await
            .unwrap();
        assert!(!result.is_error);
        assert!(result.content.contains("Flight Offer"));
        // The 1200 USD offer is over budget and must not appear.
        assert!(!result.content.contains("1200"));
    }

    #[tokio::test]
    async fn test_missing_dates_rejected() {
        let tool = FlightSearchTool::new(Arc::new(StaticFlights::with_defaults()));
        let err = tool
            .execute(serde_json::json!({
                "origin_code": "NYC",
                "destination_code": "PAR"
            }))
            .await
            .unwrap_err();
        assert!(matches!(err, ItineraError::ToolValidation(_)));
    }
}
