//! Solax API Type Definitions
//!
//! Every supported firmware answers the real-time data request with the same
//! JSON envelope, although field spellings drift between generations:
//!
//! ```json
//! {"type": 15, "sn": "SXXXXXXXXX", "ver": "3.003.02", "Data": [2306, 12, ...], "Information": [...]}
//! ```
//!
//! Older X-Hybrid units send `"SN"` and `"version"`, and report `type` as a
//! string such as `"AL_SE"`.

use serde::Deserialize;

/// Real-time data envelope
#[derive(Debug, Deserialize)]
pub struct RealTimeResponse {
    #[serde(rename = "type")]
    pub inverter_type: InverterTypeCode,
    #[serde(rename = "sn", alias = "SN")]
    pub serial_number: String,
    #[serde(rename = "ver", alias = "version")]
    pub version: String,
    #[serde(rename = "Data")]
    pub data: Vec<f64>,
}

/// The `type` field is numeric on current firmware and a string on older units
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum InverterTypeCode {
    Code(i64),
    Name(String),
}

impl std::fmt::Display for InverterTypeCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Code(code) => write!(f, "{}", code),
            Self::Name(name) => f.write_str(name),
        }
    }
}
