//! Sensor catalog: what the consumers read from a snapshot, and how.

use chrono::{DateTime, Local};

use crate::{metrics, snapshot::Snapshot};

#[derive(Copy, Clone, Debug, PartialEq, Eq, derive_more::Display)]
pub enum DeviceClass {
    #[display("current")]
    Current,

    #[display("power")]
    Power,

    #[display("voltage")]
    Voltage,

    #[display("frequency")]
    Frequency,

    #[display("temperature")]
    Temperature,

    #[display("reactive_power")]
    ReactivePower,

    #[display("energy")]
    Energy,

    #[display("battery")]
    Battery,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, derive_more::Display)]
pub enum Unit {
    #[display("A")]
    Ampere,

    #[display("kW")]
    Kilowatt,

    #[display("V")]
    Volt,

    #[display("Hz")]
    Hertz,

    #[display("°C")]
    Celsius,

    #[display("var")]
    VoltAmpereReactive,

    #[display("kWh")]
    KilowattHour,

    #[display("%")]
    Percent,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, derive_more::Display)]
pub enum StateClass {
    #[display("measurement")]
    Measurement,

    #[display("total_increasing")]
    TotalIncreasing,
}

/// Where the value comes from.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Source {
    /// Real-time channel.
    Raw(&'static str),

    /// Today's aggregate from the monthly report.
    Report(&'static str),

    DailyGeneration,
    MinSoc,
    MinSocOnGrid,
    SolarPower,
    SolarEnergy,
}

/// Post-processing step, applied in order.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Transform {
    Identity,

    /// kvar → var.
    Kilo,

    /// Tens of watt-hours → kilowatt-hours, non-positive values become zero.
    ResidualEnergy,

    Round3,

    /// Zero becomes unavailable.
    ZeroToUnavailable,
}

impl Transform {
    pub fn apply(self, value: f64) -> Option<f64> {
        match self {
            Self::Identity => Some(value),
            Self::Kilo => Some(metrics::reactive_power(value)),
            Self::ResidualEnergy => Some(metrics::residual_energy(value)),
            Self::Round3 => Some(metrics::round3(value)),
            Self::ZeroToUnavailable => metrics::energy_total(value),
        }
    }
}

#[derive(Copy, Clone, Debug)]
pub struct Sensor {
    /// Human-readable description, for example: «Load» or «Reactive Power».
    pub entity_type: &'static str,

    /// Overrides the unique name derived from the entity type.
    pub unique_name: Option<&'static str>,

    pub device_class: DeviceClass,
    pub unit: Unit,
    pub state_class: StateClass,
    pub source: Source,
    pub transforms: &'static [Transform],
}

impl Sensor {
    const fn measurement(
        entity_type: &'static str,
        device_class: DeviceClass,
        unit: Unit,
        source: Source,
    ) -> Self {
        Self {
            entity_type,
            unique_name: None,
            device_class,
            unit,
            state_class: StateClass::Measurement,
            source,
            transforms: &[Transform::Identity],
        }
    }

    const fn current(entity_type: &'static str, field: &'static str) -> Self {
        Self::measurement(entity_type, DeviceClass::Current, Unit::Ampere, Source::Raw(field))
    }

    const fn power(entity_type: &'static str, field: &'static str) -> Self {
        Self::measurement(entity_type, DeviceClass::Power, Unit::Kilowatt, Source::Raw(field))
    }

    const fn volt(entity_type: &'static str, field: &'static str) -> Self {
        Self::measurement(entity_type, DeviceClass::Voltage, Unit::Volt, Source::Raw(field))
    }

    const fn frequency(entity_type: &'static str, field: &'static str) -> Self {
        Self::measurement(entity_type, DeviceClass::Frequency, Unit::Hertz, Source::Raw(field))
    }

    const fn temperature(entity_type: &'static str, field: &'static str) -> Self {
        Self::measurement(entity_type, DeviceClass::Temperature, Unit::Celsius, Source::Raw(field))
    }

    const fn battery(entity_type: &'static str, source: Source) -> Self {
        Self::measurement(entity_type, DeviceClass::Battery, Unit::Percent, source)
    }

    /// Daily counter, unavailable while zero.
    const fn energy(entity_type: &'static str, source: Source) -> Self {
        Self {
            state_class: StateClass::TotalIncreasing,
            transforms: &[Transform::ZeroToUnavailable],
            ..Self::measurement(entity_type, DeviceClass::Energy, Unit::KilowattHour, source)
        }
    }

    const fn with_unique_name(self, unique_name: &'static str) -> Self {
        Self { unique_name: Some(unique_name), ..self }
    }

    const fn with_transforms(self, transforms: &'static [Transform]) -> Self {
        Self { transforms, ..self }
    }

    /// `{name} - {entity type}`.
    pub fn display_name(&self, name: &str) -> String {
        format!("{name} - {}", self.entity_type)
    }

    /// Device identifier followed by the unique name.
    pub fn unique_id(&self, device_id: &str) -> String {
        match self.unique_name {
            Some(unique_name) => format!("{device_id}{unique_name}"),
            None => format!("{device_id}{}", self.entity_type.to_lowercase().replace(' ', "-")),
        }
    }

    /// Current value, `None` means unavailable.
    pub fn read(&self, snapshot: &Snapshot) -> Option<f64> {
        if !snapshot.online {
            return None;
        }
        let value = match self.source {
            Source::Raw(field) => snapshot.raw(field),
            Source::Report(field) => snapshot.report(field),
            Source::DailyGeneration => snapshot.report_daily_generation.value,
            Source::MinSoc => snapshot.battery.min_soc,
            Source::MinSocOnGrid => snapshot.battery.min_soc_on_grid,
            Source::SolarPower => snapshot.solar_power(),
            Source::SolarEnergy => snapshot.solar_energy(),
        }?;
        self.transforms.iter().try_fold(value, |value, transform| transform.apply(value))
    }
}

pub const SENSORS: &[Sensor] = &[
    Sensor::current("PV1 Current", "pv1Current"),
    Sensor::power("PV1 Power", "pv1Power"),
    Sensor::volt("PV1 Volt", "pv1Volt"),
    Sensor::current("PV2 Current", "pv2Current"),
    Sensor::power("PV2 Power", "pv2Power"),
    Sensor::volt("PV2 Volt", "pv2Volt"),
    Sensor::current("PV3 Current", "pv3Current"),
    Sensor::power("PV3 Power", "pv3Power"),
    Sensor::volt("PV3 Volt", "pv3Volt"),
    Sensor::current("PV4 Current", "pv4Current"),
    Sensor::power("PV4 Power", "pv4Power"),
    Sensor::volt("PV4 Volt", "pv4Volt"),
    Sensor::power("PV Power", "pvPower"),
    Sensor::current("R Current", "RCurrent"),
    Sensor::frequency("R Freq", "RFreq"),
    Sensor::power("R Power", "RPower"),
    Sensor::power("Meter2 Power", "meterPower2"),
    Sensor::volt("R Volt", "RVolt"),
    Sensor::current("S Current", "SCurrent"),
    Sensor::frequency("S Freq", "SFreq"),
    Sensor::power("S Power", "SPower"),
    Sensor::volt("S Volt", "SVolt"),
    Sensor::current("T Current", "TCurrent"),
    Sensor::frequency("T Freq", "TFreq"),
    Sensor::power("T Power", "TPower"),
    Sensor::volt("T Volt", "TVolt"),
    Sensor::measurement(
        "Reactive Power",
        DeviceClass::ReactivePower,
        Unit::VoltAmpereReactive,
        Source::Raw("ReactivePower"),
    )
    .with_transforms(&[Transform::Kilo]),
    Sensor::temperature("bat Temperature", "batTemperature"),
    Sensor::temperature("ambient Temperature", "ambientTemperation"),
    Sensor::temperature("boost Temperature", "boostTemperation"),
    Sensor::temperature("inv Temperature", "invTemperation"),
    Sensor::battery("Bat SoC", Source::Raw("SoC")),
    Sensor::battery("Bat MinSoC", Source::MinSoc),
    Sensor::battery("Bat minSocOnGrid", Source::MinSocOnGrid),
    Sensor::measurement("Solar Power", DeviceClass::Power, Unit::Kilowatt, Source::SolarPower),
    Sensor::energy("Solar", Source::SolarEnergy).with_transforms(&[Transform::Identity]),
    Sensor::power("Generation Power", "generationPower").with_unique_name("-generation-power"),
    Sensor::power("Grid Consumption Power", "gridConsumptionPower"),
    Sensor::power("FeedIn Power", "feedinPower").with_unique_name("feedIn-power"),
    Sensor::power("Bat Discharge Power", "batDischargePower"),
    Sensor::power("Bat Charge Power", "batChargePower"),
    Sensor::power("Load Power", "loadsPower"),
    Sensor::energy("Energy Generated", Source::DailyGeneration),
    Sensor::energy("Grid Consumption", Source::Report("gridConsumption")),
    Sensor::energy("FeedIn", Source::Report("feedin")).with_unique_name("feedIn"),
    Sensor::energy("Bat Charge", Source::Report("chargeEnergyToTal")),
    Sensor::energy("Bat Discharge", Source::Report("dischargeEnergyToTal")),
    Sensor::energy("Load", Source::Report("loads"))
        .with_transforms(&[Transform::ZeroToUnavailable, Transform::Round3]),
    Sensor::measurement(
        "Residual Energy",
        DeviceClass::Energy,
        Unit::KilowattHour,
        Source::Raw("ResidualEnergy"),
    )
    .with_transforms(&[Transform::ResidualEnergy]),
];

/// Inverter connectivity as reported by the device detail.
#[derive(Copy, Clone, Debug, PartialEq, Eq, derive_more::Display)]
pub enum InverterStatus {
    #[display("on-line")]
    OnLine,

    #[display("in-alarm")]
    InAlarm,

    #[display("off-line")]
    OffLine,
}

impl InverterStatus {
    pub fn unique_id(device_id: &str) -> String {
        format!("{device_id}Inverter")
    }

    pub fn read(snapshot: &Snapshot) -> Option<Self> {
        if !snapshot.online {
            return None;
        }
        match snapshot.addressbook.status? {
            1 => Some(Self::OnLine),
            2 => Some(Self::InAlarm),
            _ => Some(Self::OffLine),
        }
    }
}

/// Extra attributes of the inverter sensor.
#[derive(Clone, Debug)]
pub struct InverterAttributes {
    pub device_serial_number: String,
    pub plant_name: String,
    pub module_serial_number: String,
    pub device_type: String,
    pub last_cloud_sync: DateTime<Local>,
}

impl InverterAttributes {
    pub fn read(snapshot: &Snapshot, now: DateTime<Local>) -> Option<Self> {
        if !snapshot.online || snapshot.addressbook.status.is_none() {
            return None;
        }
        let addressbook = &snapshot.addressbook;
        Some(Self {
            device_serial_number: addressbook.serial_number.clone(),
            plant_name: addressbook.plant_name.clone(),
            module_serial_number: addressbook.module_serial_number.clone(),
            device_type: addressbook.device_type.clone(),
            last_cloud_sync: now,
        })
    }
}
