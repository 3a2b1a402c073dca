//! Weather lookup tool
//!
//! Returns a fixed report for any valid coordinate pair; there is no
//! upstream weather provider behind it.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::ToolError;
use crate::mcp::registry::{json_schema_number, json_schema_object, Tool};
use crate::mcp::types::{ToolDescriptor, ToolResult};
use crate::tools::parse_args;

#[derive(Debug, Deserialize)]
struct WeatherArgs {
    latitude: f64,
    longitude: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WeatherReport {
    latitude: f64,
    longitude: f64,
    description: &'static str,
    temperature_c: f64,
    wind_kph: u32,
}

/// `get_weather`: current weather by latitude/longitude
#[derive(Debug, Default)]
pub struct WeatherTool;

impl WeatherTool {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl Tool for WeatherTool {
    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor {
            name: "get_weather".to_string(),
            description: "Get current weather by latitude/longitude".to_string(),
            input_schema: json_schema_object(
                json!({
                    "latitude": json_schema_number("Latitude in degrees (-90 to 90)"),
                    "longitude": json_schema_number("Longitude in degrees (-180 to 180)"),
                }),
                &["latitude", "longitude"],
            ),
        }
    }

    async fn call(&self, arguments: Value) -> Result<ToolResult, ToolError> {
        let args: WeatherArgs = parse_args(arguments)?;

        if !(-90.0..=90.0).contains(&args.latitude) {
            return Err(ToolError::invalid_arguments(format!(
                "latitude out of range: {}",
                args.latitude
            )));
        }
        if !(-180.0..=180.0).contains(&args.longitude) {
            return Err(ToolError::invalid_arguments(format!(
                "longitude out of range: {}",
                args.longitude
            )));
        }

        let report = WeatherReport {
            latitude: args.latitude,
            longitude: args.longitude,
            description: "just so sunny",
            temperature_c: 7.2,
            wind_kph: 13,
        };

        Ok(ToolResult::text(serde_json::to_string(&report)?))
    }
}
