//! In-memory collaborator implementations for tests and offline runs.

use futures::future::BoxFuture;

use itinera_core::error::Result;
use itinera_core::traits::{FlightInventory, LocationDirectory};
use itinera_core::types::{FlightOffer, FlightQuery, FlightSegment, Itinerary, Location};

/// A fixed location directory searched by city keyword or IATA code.
pub struct StaticLocations {
    locations: Vec<Location>,
}

impl StaticLocations {
    pub fn new(locations: Vec<Location>) -> Self {
        Self { locations }
    }

    pub fn with_defaults() -> Self {
        let city = |name: &str, iata_code: &str, country: &str| Location {
            name: name.to_string(),
            iata_code: iata_code.to_string(),
            country: country.to_string(),
        };
        Self::new(vec![
            city("New York", "NYC", "United States"),
            city("San Francisco", "SFO", "United States"),
            city("Paris", "PAR", "France"),
            city("London", "LON", "United Kingdom"),
            city("Tokyo", "TYO", "Japan"),
            city("Medellin", "MDE", "Colombia"),
        ])
    }
}

impl LocationDirectory for StaticLocations {
    fn search(&self, city: &str) -> BoxFuture<'_, Result<Vec<Location>>> {
        let keyword = city.to_lowercase();
        Box::pin(async move {
            Ok(self
                .locations
                .iter()
                .filter(|l| {
                    l.name.to_lowercase().contains(&keyword)
                        || l.iata_code.eq_ignore_ascii_case(&keyword)
                })
                .cloned()
                .collect())
        })
    }
}

/// A fixed flight inventory filtered by route and max price.
///
/// Dates are accepted but not matched; the fixture stands in for a real
/// inventory in tests, which pin routes rather than schedules.
pub struct StaticFlights {
    offers: Vec<FlightOffer>,
}

impl StaticFlights {
    pub fn new(offers: Vec<FlightOffer>) -> Self {
        Self { offers }
    }

    pub fn with_defaults() -> Self {
        let segment = |dep: &str, dep_time: &str, arr: &str, arr_time: &str, carrier: &str, number: &str| {
            FlightSegment {
                departure_code: dep.to_string(),
                departure_time: dep_time.to_string(),
                arrival_code: arr.to_string(),
                arrival_time: arr_time.to_string(),
                carrier_code: carrier.to_string(),
                flight_number: number.to_string(),
                duration: String::new(),
            }
        };
        Self::new(vec![
            FlightOffer {
                offer_id: "1".into(),
                price: 850.0,
                currency: "USD".into(),
                outbound: Itinerary {
                    duration: "PT7H30M".into(),
                    segments: vec![segment(
                        "NYC", "2024-06-01T08:00", "PAR", "2024-06-01T21:30", "AF", "007",
                    )],
                },
                return_leg: Some(Itinerary {
                    duration: "PT8H10M".into(),
                    segments: vec![segment(
                        "PAR", "2024-06-10T10:00", "NYC", "2024-06-10T12:10", "AF", "012",
                    )],
                }),
            },
            FlightOffer {
                offer_id: "2".into(),
                price: 1200.0,
                currency: "USD".into(),
                outbound: Itinerary {
                    duration: "PT7H05M".into(),
                    segments: vec![segment(
                        "NYC", "2024-06-01T18:00", "PAR", "2024-06-02T07:05", "DL", "263",
                    )],
                },
                return_leg: Some(Itinerary {
                    duration: "PT8H45M".into(),
                    segments: vec![segment(
                        "PAR", "2024-06-10T13:00", "NYC", "2024-06-10T15:45", "DL", "264",
                    )],
                }),
            },
        ])
    }
}

impl FlightInventory for StaticFlights {
    fn search(&self, query: &FlightQuery) -> BoxFuture<'_, Result<Vec<FlightOffer>>> {
        let query = query.clone();
        Box::pin(async move {
            Ok(self
                .offers
                .iter()
                .filter(|o| {
                    let outbound_arrival = o
                        .outbound
                        .segments
                        .last()
                        .map(|s| s.arrival_code.as_str());
                    o.origin_code() == Some(query.origin_code.as_str())
                        && outbound_arrival == Some(query.destination_code.as_str())
                        && query.max_price.map_or(true, |max| o.price <= max)
                })
                .cloned()
                .collect())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use itinera_core::traits::{FlightInventory, LocationDirectory};

    #[tokio::test]
    async fn test_location_lookup_by_name_and_code() {
        let directory = StaticLocations::with_defaults();
        let by_name = directory.search("new york").await.unwrap();
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].iata_code, "NYC");

        let by_code = directory.search("PAR").await.unwrap();
        assert_eq!(by_code[0].name, "Paris");

        let missing = directory.search("Atlantis").await.unwrap();
        assert!(missing.is_empty());
    }

    #[tokio::test]
    async fn test_flight_route_and_price_filter() {
        let inventory = StaticFlights::with_defaults();
        let query = FlightQuery {
            origin_code: "NYC".into(),
            destination_code: "PAR".into(),
            start_date: "2024-06-01".into(),
            end_date: "2024-06-10".into(),
            max_price: Some(1000.0),
            adults: 1,
        };
        let offers = inventory.search(&query).await.unwrap();
        assert_eq!(offers.len(), 1);
        assert_eq!(offers[0].offer_id, "1");

        let unlimited = inventory
            .search(&FlightQuery {
                max_price: None,
                ..query
            })
            .await
            .unwrap();
        assert_eq!(unlimited.len(), 2);
    }
}
