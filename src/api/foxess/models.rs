use serde::Deserialize;
use serde_with::serde_as;

/// Device metadata returned by `/op/v0/device/detail`.
#[serde_as]
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DeviceDetail {
    #[serde(rename = "deviceSN", default)]
    pub serial_number: String,

    /// Called «plant name» in the older cloud.
    #[serde(rename = "stationName", default)]
    pub plant_name: String,

    #[serde(rename = "moduleSN", default)]
    pub module_serial_number: String,

    #[serde(rename = "deviceType", default)]
    pub device_type: String,

    /// Connectivity status code: 1 – on-line, 2 – in alarm, 3 – off-line.
    #[serde_as(as = "Option<serde_with::PickFirst<(_, serde_with::DisplayFromStr)>>")]
    #[serde(rename = "status", default)]
    pub status: Option<i32>,

    #[serde(rename = "hasBattery", default)]
    pub has_battery: bool,
}

impl DeviceDetail {
    /// Whether the cloud can provide fresh telemetry for the device.
    ///
    /// Status 3 is reported for inverters that are asleep but still talk to the cloud.
    pub fn is_reachable(&self) -> bool {
        matches!(self.status, Some(1..=3))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct BatterySettings {
    #[serde(rename = "minSoc")]
    pub min_soc: Option<f64>,

    #[serde(rename = "minSocOnGrid")]
    pub min_soc_on_grid: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct RealTimeRawVariable {
    #[serde(rename = "variable")]
    pub name: String,

    #[serde(default)]
    pub value: serde_json::Value,

    pub unit: Option<String>,

    #[serde(rename = "name")]
    pub description: Option<String>,
}

impl RealTimeRawVariable {
    /// Numeric value of the channel, missing values count as zero.
    pub fn numeric_value(&self) -> Option<f64> {
        match &self.value {
            serde_json::Value::Null => Some(0.0),
            serde_json::Value::Number(number) => number.as_f64(),
            serde_json::Value::String(string) => string.trim().parse().ok(),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DeviceRealTimeData {
    #[serde(rename = "datas", default)]
    pub variables: Vec<RealTimeRawVariable>,
}

/// One variable of the monthly report: a value per day of the month.
#[derive(Debug, Deserialize)]
pub struct ReportVariable {
    #[serde(rename = "variable")]
    pub name: String,

    #[serde(default)]
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DailyGeneration {
    /// Cumulative generation since the midnight, kWh.
    pub today: Option<f64>,
}
