//! Solax Inverter Models
//!
//! Each supported model is described by how it must be asked for real-time
//! data ([`Transport`]), which `type` code it reports, and a table mapping
//! sensor names to positions in the `Data` array.
//!
//! # Register Decoding
//!
//! Newer firmware reports raw 16-bit registers. A sensor may span several
//! registers (least significant word first), be a two's-complement signed
//! value, or carry a fixed decimal scale. Older firmware reports ready-made
//! floats, which pass through a single register with [`Scale::Raw`].

use crate::error::{ExporterError, Result};
use crate::solax::types::{InverterTypeCode, RealTimeResponse};
use crate::source::{DeviceIdentity, Reading, SensorCatalog};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Watt,
    KilowattHour,
    Volt,
    Ampere,
    Hertz,
    Celsius,
    Percent,
    None,
}

impl Unit {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Watt => "W",
            Self::KilowattHour => "kWh",
            Self::Volt => "V",
            Self::Ampere => "A",
            Self::Hertz => "Hz",
            Self::Celsius => "C",
            Self::Percent => "%",
            Self::None => "",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scale {
    Raw,
    Div10,
    Div100,
    Signed,
    SignedDiv100,
}

impl Scale {
    fn apply(self, raw: f64) -> f64 {
        match self {
            Self::Raw => raw,
            Self::Div10 => raw / 10.0,
            Self::Div100 => raw / 100.0,
            Self::Signed => to_signed(raw),
            Self::SignedDiv100 => to_signed(raw) / 100.0,
        }
    }
}

fn to_signed(raw: f64) -> f64 {
    if raw >= 32768.0 {
        raw - 65536.0
    } else {
        raw
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Sensor {
    pub name: &'static str,
    pub registers: &'static [usize],
    pub unit: Unit,
    pub scale: Scale,
}

impl Sensor {
    /// Decode this sensor from a `Data` array, `None` if a register is missing
    pub fn read(&self, data: &[f64]) -> Option<f64> {
        let mut value = 0.0;
        let mut stride = 1.0;
        for &register in self.registers {
            value += data.get(register)? * stride;
            stride *= 65536.0;
        }
        Some(self.scale.apply(value))
    }
}

const fn sensor(name: &'static str, registers: &'static [usize], unit: Unit) -> Sensor {
    scaled(name, registers, unit, Scale::Raw)
}

const fn scaled(
    name: &'static str,
    registers: &'static [usize],
    unit: Unit,
    scale: Scale,
) -> Sensor {
    Sensor {
        name,
        registers,
        unit,
        scale,
    }
}

/// How a model expects the real-time data request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    /// `POST /` with `optType=ReadRealTimeData&pwd=...` as a form body
    PostForm { forwarded_for: bool },
    /// `POST /?optType=ReadRealTimeData&pwd=...` with an empty body
    PostQuery,
    /// Plain `GET` of a fixed path
    Get { path: &'static str },
}

/// Which `type` values identify a model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeMatch {
    Code(i64),
    Name(&'static str),
    AnyName,
}

impl TypeMatch {
    fn matches(self, reported: &InverterTypeCode) -> bool {
        match (self, reported) {
            (Self::Code(expected), InverterTypeCode::Code(code)) => expected == *code,
            (Self::Name(expected), InverterTypeCode::Name(name)) => expected == name,
            (Self::AnyName, InverterTypeCode::Name(_)) => true,
            _ => false,
        }
    }
}

#[derive(Debug)]
pub struct InverterModel {
    pub name: &'static str,
    pub transport: Transport,
    pub type_match: TypeMatch,
    pub sensors: &'static [Sensor],
}

impl InverterModel {
    /// Sensor name -> unit for every sensor this model reports
    pub fn catalog(&self) -> SensorCatalog {
        self.sensors
            .iter()
            .map(|s| (s.name, s.unit.as_str()))
            .collect()
    }

    /// Turn a raw response into a [`Reading`].
    ///
    /// Rejects responses from a different model and `Data` arrays too short
    /// for the sensor table.
    pub fn decode(&self, response: RealTimeResponse) -> Result<Reading> {
        if !self.type_match.matches(&response.inverter_type) {
            return Err(ExporterError::InverterResponse(format!(
                "type {} is not a {}",
                response.inverter_type, self.name
            )));
        }

        let mut values = BTreeMap::new();
        for sensor in self.sensors {
            let value = sensor.read(&response.data).ok_or_else(|| {
                ExporterError::InverterResponse(format!(
                    "{} needs registers {:?} but Data has {} entries",
                    sensor.name,
                    sensor.registers,
                    response.data.len()
                ))
            })?;
            values.insert(sensor.name.to_string(), value);
        }

        Ok(Reading {
            identity: DeviceIdentity {
                serial_number: response.serial_number,
                inverter_type: response.inverter_type.to_string(),
                version: response.version,
            },
            values,
        })
    }
}

use Scale::{Div10, Div100, Signed, SignedDiv100};
use Unit::{Ampere, Celsius, Hertz, KilowattHour, Percent, Volt, Watt};

pub static X1_HYBRID_GEN4: InverterModel = InverterModel {
    name: "X1 Hybrid Gen4",
    transport: Transport::PostForm {
        forwarded_for: true,
    },
    type_match: TypeMatch::Code(15),
    sensors: &[
        scaled("AC Voltage", &[0], Volt, Div10),
        scaled("AC Current", &[1], Ampere, Div10),
        scaled("AC Power", &[2], Watt, Signed),
        scaled("Grid Frequency", &[3], Hertz, Div100),
        scaled("PV1 Voltage", &[4], Volt, Div10),
        scaled("PV2 Voltage", &[5], Volt, Div10),
        scaled("PV1 Current", &[6], Ampere, Div10),
        scaled("PV2 Current", &[7], Ampere, Div10),
        sensor("PV1 Power", &[8], Watt),
        sensor("PV2 Power", &[9], Watt),
        sensor("Run Mode", &[10], Unit::None),
        scaled("On-grid Total Yield", &[11, 12], KilowattHour, Div10),
        scaled("On-grid Daily Yield", &[13], KilowattHour, Div10),
        scaled("Battery Voltage", &[14], Volt, Div100),
        scaled("Battery Current", &[15], Ampere, SignedDiv100),
        scaled("Battery Power", &[16], Watt, Signed),
        sensor("Battery Temperature", &[17], Celsius),
        sensor("Battery SoC", &[18], Percent),
        scaled("Grid Power", &[32], Watt, Signed),
        scaled("Total Feed-in Energy", &[34, 35], KilowattHour, Div100),
        scaled("Total Consumption", &[36, 37], KilowattHour, Div100),
    ],
};

pub static X1_MINI_V34: InverterModel = InverterModel {
    name: "X1 Mini v3.4",
    transport: Transport::PostForm {
        forwarded_for: false,
    },
    type_match: TypeMatch::Code(4),
    sensors: &[
        scaled("Network Voltage", &[0], Volt, Div10),
        scaled("Output Current", &[1], Ampere, Div10),
        sensor("AC Power", &[2], Watt),
        scaled("PV1 Voltage", &[3], Volt, Div10),
        scaled("PV2 Voltage", &[4], Volt, Div10),
        scaled("PV1 Current", &[5], Ampere, Div10),
        scaled("PV2 Current", &[6], Ampere, Div10),
        sensor("PV1 Power", &[7], Watt),
        sensor("PV2 Power", &[8], Watt),
        scaled("Grid Frequency", &[9], Hertz, Div100),
        scaled("Total Energy", &[11], KilowattHour, Div10),
        scaled("Today's Energy", &[13], KilowattHour, Div10),
        scaled("Total Feed-in Energy", &[41], KilowattHour, Div10),
        scaled("Total Consumption", &[42], KilowattHour, Div10),
        scaled("Power Now", &[43], Watt, Div10),
    ],
};

pub static X3_V34: InverterModel = InverterModel {
    name: "X3 v3.4",
    transport: Transport::PostForm {
        forwarded_for: false,
    },
    type_match: TypeMatch::Code(5),
    sensors: &[
        scaled("Grid 1 Voltage", &[0], Volt, Div10),
        scaled("Grid 2 Voltage", &[1], Volt, Div10),
        scaled("Grid 3 Voltage", &[2], Volt, Div10),
        scaled("Grid 1 Current", &[3], Ampere, Div10),
        scaled("Grid 2 Current", &[4], Ampere, Div10),
        scaled("Grid 3 Current", &[5], Ampere, Div10),
        scaled("Grid 1 Power", &[6], Watt, Signed),
        scaled("Grid 2 Power", &[7], Watt, Signed),
        scaled("Grid 3 Power", &[8], Watt, Signed),
        scaled("PV1 Voltage", &[10], Volt, Div10),
        scaled("PV2 Voltage", &[11], Volt, Div10),
        scaled("PV1 Current", &[12], Ampere, Div10),
        scaled("PV2 Current", &[13], Ampere, Div10),
        sensor("PV1 Power", &[14], Watt),
        sensor("PV2 Power", &[15], Watt),
        scaled("Grid 1 Frequency", &[16], Hertz, Div100),
        scaled("Grid 2 Frequency", &[17], Hertz, Div100),
        scaled("Grid 3 Frequency", &[18], Hertz, Div100),
        scaled("Total Energy", &[19, 20], KilowattHour, Div10),
        scaled("Today's Energy", &[21], KilowattHour, Div10),
        sensor("Inverter Temperature", &[24], Celsius),
        scaled("Total Feed-in Energy", &[52, 53], KilowattHour, Div100),
        scaled("Total Consumption", &[54, 55], KilowattHour, Div100),
    ],
};

pub static X1_MINI: InverterModel = InverterModel {
    name: "X1 Mini",
    transport: Transport::PostQuery,
    type_match: TypeMatch::AnyName,
    sensors: &[
        sensor("PV1 Current", &[0], Ampere),
        sensor("PV2 Current", &[1], Ampere),
        sensor("PV1 Voltage", &[2], Volt),
        sensor("PV2 Voltage", &[3], Volt),
        sensor("Output Current", &[4], Ampere),
        sensor("Network Voltage", &[5], Volt),
        sensor("AC Power", &[6], Watt),
        sensor("Inverter Temperature", &[7], Celsius),
        sensor("Today's Energy", &[8], KilowattHour),
        sensor("Total Energy", &[9], KilowattHour),
        sensor("Exported Power", &[10], Watt),
        sensor("PV1 Power", &[11], Watt),
        sensor("PV2 Power", &[12], Watt),
        sensor("Total Feed-in Energy", &[41], KilowattHour),
        sensor("Total Consumption", &[42], KilowattHour),
        sensor("Power Now", &[43], Watt),
        sensor("Grid Frequency", &[50], Hertz),
    ],
};

pub static X_HYBRID: InverterModel = InverterModel {
    name: "X Hybrid",
    transport: Transport::Get {
        path: "/api/realTimeData.htm",
    },
    type_match: TypeMatch::Name("AL_SE"),
    sensors: &[
        sensor("PV1 Current", &[0], Ampere),
        sensor("PV2 Current", &[1], Ampere),
        sensor("PV1 Voltage", &[2], Volt),
        sensor("PV2 Voltage", &[3], Volt),
        sensor("Output Current", &[4], Ampere),
        sensor("Network Voltage", &[5], Volt),
        sensor("Power Now", &[6], Watt),
        sensor("Inverter Temperature", &[7], Celsius),
        sensor("Today's Energy", &[8], KilowattHour),
        sensor("Total Energy", &[9], KilowattHour),
        sensor("Exported Power", &[10], Watt),
        sensor("PV1 Power", &[11], Watt),
        sensor("PV2 Power", &[12], Watt),
        sensor("Battery Voltage", &[13], Volt),
        sensor("Battery Current", &[14], Ampere),
        sensor("Battery Power", &[15], Watt),
        sensor("Battery Temperature", &[16], Celsius),
        sensor("Battery Remaining Capacity", &[17], Percent),
        sensor("Month's Energy", &[19], KilowattHour),
        sensor("Grid Frequency", &[50], Hertz),
        sensor("EPS Voltage", &[53], Volt),
        sensor("EPS Current", &[54], Ampere),
        sensor("EPS Power", &[55], Watt),
        sensor("EPS Frequency", &[56], Hertz),
    ],
};

/// Every model probed during discovery
pub static MODELS: [&InverterModel; 5] = [
    &X1_HYBRID_GEN4,
    &X1_MINI_V34,
    &X3_V34,
    &X1_MINI,
    &X_HYBRID,
];
