//! Variable names requested from the cloud.

/// Real-time channels: currents, voltages, powers, temperatures, frequencies, and battery state.
///
/// Note the cloud's own spelling: `…Temperation`.
pub const REAL_TIME: &[&str] = &[
    "ambientTemperation",
    "batChargePower",
    "batCurrent",
    "batDischargePower",
    "batTemperature",
    "batVolt",
    "boostTemperation",
    "chargeTemperature",
    "dspTemperature",
    "epsCurrentR",
    "epsCurrentS",
    "epsCurrentT",
    "epsPower",
    "epsPowerR",
    "epsPowerS",
    "epsPowerT",
    "epsVoltR",
    "epsVoltS",
    "epsVoltT",
    "feedinPower",
    "generationPower",
    "gridConsumptionPower",
    "input",
    "invBatCurrent",
    "invBatPower",
    "invBatVolt",
    "invTemperation",
    "loadsPower",
    "loadsPowerR",
    "loadsPowerS",
    "loadsPowerT",
    "meterPower",
    "meterPower2",
    "meterPowerR",
    "meterPowerS",
    "meterPowerT",
    "PowerFactor",
    "pv1Current",
    "pv1Power",
    "pv1Volt",
    "pv2Current",
    "pv2Power",
    "pv2Volt",
    "pv3Current",
    "pv3Power",
    "pv3Volt",
    "pv4Current",
    "pv4Power",
    "pv4Volt",
    "pvPower",
    "RCurrent",
    "ReactivePower",
    "RFreq",
    "RPower",
    "RVolt",
    "SCurrent",
    "SFreq",
    "SoC",
    "SPower",
    "SVolt",
    "TCurrent",
    "TFreq",
    "TPower",
    "TVolt",
    "ResidualEnergy",
    "todayYield",
];

/// Daily energy aggregates requested in the monthly report.
pub const REPORT: &[&str] = &[
    "feedin",
    "generation",
    "gridConsumption",
    "chargeEnergyToTal",
    "dischargeEnergyToTal",
    "loads",
];
