pub(crate) mod collector;
pub mod producer;

pub use collector::{OutputSender, collect_samples};
pub use producer::{ReplayProducer, SampleProducer};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A snapshot of the vehicle state at one instant, as pushed by a live feed.
///
/// Every field is optional: feeds are allowed to omit values or send garbage, and the
/// consumers zero-fill whatever is missing instead of rejecting the sample.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetrySample {
    /// Vehicle speed, km/h
    #[serde(
        deserialize_with = "lenient_f32",
        skip_serializing_if = "Option::is_none"
    )]
    pub speed: Option<f32>,
    /// Throttle use, 0 to 100 %
    #[serde(
        deserialize_with = "lenient_f32",
        skip_serializing_if = "Option::is_none"
    )]
    pub throttle: Option<f32>,
    /// Brake use, 0 to 100 %
    #[serde(
        deserialize_with = "lenient_f32",
        skip_serializing_if = "Option::is_none"
    )]
    pub brake: Option<f32>,
    /// Current gear. Negative is reverse, 0 is neutral
    #[serde(
        deserialize_with = "lenient_i32",
        skip_serializing_if = "Option::is_none"
    )]
    pub gear: Option<i32>,
    /// Engine RPM
    #[serde(
        deserialize_with = "lenient_f32",
        skip_serializing_if = "Option::is_none"
    )]
    pub rpm: Option<f32>,
}

impl TelemetrySample {
    pub fn speed_or_zero(&self) -> f32 {
        self.speed.unwrap_or(0.)
    }

    pub fn throttle_or_zero(&self) -> f32 {
        self.throttle.unwrap_or(0.)
    }

    pub fn brake_or_zero(&self) -> f32 {
        self.brake.unwrap_or(0.)
    }

    pub fn gear_or_neutral(&self) -> i32 {
        self.gear.unwrap_or(0)
    }

    pub fn rpm_or_zero(&self) -> f32 {
        self.rpm.unwrap_or(0.)
    }
}

/// Messages emitted by a live feed.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub enum LiveOutput {
    Sample(Box<TelemetrySample>),
    /// The source restarted (new session, replay rewound). Consumers drop their history.
    FeedReset,
}

impl From<TelemetrySample> for LiveOutput {
    fn from(value: TelemetrySample) -> Self {
        LiveOutput::Sample(Box::new(value))
    }
}

fn lenient_number(value: Option<Value>) -> Option<f64> {
    let number = match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    number.is_finite().then_some(number)
}

fn lenient_f32<'de, D>(deserializer: D) -> Result<Option<f32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(lenient_number(value)
        .map(|n| n as f32)
        .filter(|n| n.is_finite()))
}

fn lenient_i32<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(lenient_number(value)
        .map(f64::trunc)
        .filter(|n| (i32::MIN as f64..=i32::MAX as f64).contains(n))
        .map(|n| n as i32))
}
