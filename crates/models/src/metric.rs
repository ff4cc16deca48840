use serde::{Deserialize, Serialize};

/// Name of a measured quantity (e.g. `temp`, `hum`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metric(String);

impl Metric {
    pub const TEMPERATURE: &'static str = "temp";
    pub const HUMIDITY: &'static str = "hum";
    pub const LUMINOSITY: &'static str = "lum";
    pub const PRESSURE: &'static str = "pres";

    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Metric {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Metric {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Metric {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl core::borrow::Borrow<str> for Metric {
    fn borrow(&self) -> &str {
        &self.0
    }
}
