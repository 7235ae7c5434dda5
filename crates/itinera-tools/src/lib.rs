pub mod fixtures;
pub mod flight;
pub mod location;
pub mod registry;

pub use flight::FlightSearchTool;
pub use location::LocationSearchTool;
pub use registry::ToolRegistry;
