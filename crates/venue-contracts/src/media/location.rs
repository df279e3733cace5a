use std::fmt;

use serde::{Deserialize, Serialize};

/// Where the venue is: either free text or a coordinate pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LocationSpec {
    Address { value: String },
    Coordinates { latitude: f64, longitude: f64 },
}

impl LocationSpec {
    pub fn address(value: impl Into<String>) -> Self {
        Self::Address {
            value: value.into(),
        }
    }

    pub fn coordinates(latitude: f64, longitude: f64) -> Self {
        Self::Coordinates {
            latitude,
            longitude,
        }
    }
}

impl fmt::Display for LocationSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Address { value } => f.write_str(value),
            Self::Coordinates {
                latitude,
                longitude,
            } => write!(f, "{latitude}, {longitude}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::LocationSpec;

    #[test]
    fn coordinates_render_as_lat_comma_lon() {
        let location = LocationSpec::coordinates(40.7128, -74.006);
        assert_eq!(location.to_string(), "40.7128, -74.006");
    }

    #[test]
    fn address_renders_literally() {
        let location = LocationSpec::address("12 Harbour Rd, Hobart");
        assert_eq!(location.to_string(), "12 Harbour Rd, Hobart");
    }

    #[test]
    fn serde_uses_explicit_tag() -> anyhow::Result<()> {
        let value = serde_json::to_value(LocationSpec::coordinates(1.5, 2.0))?;
        assert_eq!(
            value,
            json!({"type": "coordinates", "latitude": 1.5, "longitude": 2.0})
        );
        let parsed: LocationSpec =
            serde_json::from_value(json!({"type": "address", "value": "Old Mill"}))?;
        assert_eq!(parsed, LocationSpec::address("Old Mill"));
        Ok(())
    }
}
