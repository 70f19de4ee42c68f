use std::collections::BTreeMap;

use crate::{
    api::foxess::{
        BatterySettings,
        DailyGeneration,
        DeviceDetail,
        RealTimeRawVariable,
        ReportVariable,
    },
    metrics::{self, round3},
    prelude::*,
};

/// Merged result of the latest poll.
///
/// Failed calls never clear anything, stale values stay where they are.
/// Readers **must** check [`Snapshot::online`] before trusting any field.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    /// Real-time channels by variable name.
    pub raw: BTreeMap<String, f64>,

    /// Today's energy aggregates by variable name, kWh.
    pub report: BTreeMap<String, f64>,

    pub report_daily_generation: DailyGenerationReport,

    /// Cleared when the device has no battery.
    pub battery: BatterySettings,

    /// Device metadata.
    pub addressbook: DeviceDetail,

    /// Verdict for the latest tick.
    pub online: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DailyGenerationReport {
    /// Energy generated since the midnight, kWh.
    pub value: Option<f64>,
}

impl Snapshot {
    pub fn set_device_detail(&mut self, detail: DeviceDetail) {
        if detail.has_battery {
            debug!("the system has a battery");
        } else {
            debug!("the system has no battery");
        }
        self.addressbook = detail;
    }

    pub fn set_battery_settings(&mut self, settings: BatterySettings) {
        self.battery = settings;
    }

    pub fn clear_battery_settings(&mut self) {
        self.battery = BatterySettings::default();
    }

    pub fn merge_real_time_variables(&mut self, variables: Vec<RealTimeRawVariable>) {
        for variable in variables {
            if variable.value.is_null() {
                debug!(%variable.name, "no value, set to zero");
            }
            match variable.numeric_value() {
                Some(value) => {
                    self.raw.insert(variable.name, value);
                }
                None => {
                    warn!(%variable.name, ?variable.value, "non-numeric value, skipped");
                }
            }
        }
    }

    /// Pick today's entries from the monthly report.
    ///
    /// `day` is the 1-based day of the month.
    pub fn merge_monthly_report(&mut self, variables: Vec<ReportVariable>, day: u32) {
        for variable in variables {
            let value = round3(daily_value(&variable.name, &variable.values, day));
            debug!(%variable.name, value, "report");
            self.report.insert(variable.name, value);
        }
    }

    pub fn set_daily_generation(&mut self, generation: &DailyGeneration) {
        if generation.today.is_none() {
            debug!("today has no generation value, set to zero");
        }
        self.report_daily_generation.value = Some(generation.today.unwrap_or_default());
    }

    fn raw_or_zero(&self, name: &str) -> f64 {
        self.raw.get(name).copied().unwrap_or_default()
    }

    fn report_or_zero(&self, name: &str) -> f64 {
        self.report.get(name).copied().unwrap_or_default()
    }

    /// Raw channel, unavailable when offline.
    pub fn raw(&self, name: &str) -> Option<f64> {
        self.online.then(|| self.raw.get(name).copied()).flatten()
    }

    /// Report aggregate, unavailable when offline.
    pub fn report(&self, name: &str) -> Option<f64> {
        self.online.then(|| self.report.get(name).copied()).flatten()
    }

    /// Instant solar power reconstructed from the other flows, kW.
    pub fn solar_power(&self) -> Option<f64> {
        if !self.online || self.raw.is_empty() {
            return None;
        }
        Some(metrics::solar_balance(
            self.raw_or_zero("loadsPower"),
            self.raw_or_zero("batChargePower"),
            self.raw_or_zero("feedinPower"),
            self.raw_or_zero("gridConsumptionPower"),
            self.raw_or_zero("batDischargePower"),
        ))
    }

    /// Today's solar energy reconstructed from the report, kWh.
    pub fn solar_energy(&self) -> Option<f64> {
        if !self.online {
            return None;
        }
        Some(metrics::solar_balance(
            self.report_or_zero("loads"),
            self.report_or_zero("chargeEnergyToTal"),
            self.report_or_zero("feedin"),
            self.report_or_zero("gridConsumption"),
            self.report_or_zero("dischargeEnergyToTal"),
        ))
    }
}

/// Value of the specified day, holding the last non-null value of the scan
/// when the cloud has nothing for that day yet.
fn daily_value(name: &str, values: &[Option<f64>], day: u32) -> f64 {
    let Some(index) = usize::try_from(day).ok().and_then(|day| day.checked_sub(1)) else {
        return 0.0;
    };
    let scanned = &values[..values.len().min(index + 1)];
    let held = scanned.iter().rev().flatten().next().copied().unwrap_or_default();
    match scanned.get(index) {
        Some(Some(value)) => *value,
        Some(None) => {
            warn!(name, day, held, "null report entry, holding the last value");
            held
        }
        None => {
            warn!(
                name,
                day,
                held,
                n_values = values.len(),
                "no report entry, holding the last value",
            );
            held
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    fn online_with_raw(channels: &[(&str, f64)]) -> Snapshot {
        Snapshot {
            raw: channels.iter().map(|(name, value)| ((*name).to_string(), *value)).collect(),
            online: true,
            ..Snapshot::default()
        }
    }

    fn report_variables(json: &str) -> Result<Vec<ReportVariable>> {
        Ok(serde_json::from_str(json)?)
    }

    #[test]
    fn test_solar_power() {
        let snapshot = online_with_raw(&[
            ("loadsPower", 2.0),
            ("batChargePower", 1.0),
            ("feedinPower", 0.0),
            ("gridConsumptionPower", 0.5),
            ("batDischargePower", 0.0),
        ]);
        assert_abs_diff_eq!(snapshot.solar_power().unwrap(), 2.5);
    }

    #[test]
    fn test_solar_power_negative_clamped() {
        let snapshot = online_with_raw(&[
            ("loadsPower", 0.2),
            ("batChargePower", 0.0),
            ("feedinPower", 0.1),
            ("gridConsumptionPower", 10.0),
            ("batDischargePower", 0.0),
        ]);
        assert_abs_diff_eq!(snapshot.solar_power().unwrap(), 0.0);
    }

    #[test]
    fn test_solar_power_unavailable() {
        assert_eq!(Snapshot { online: true, ..Snapshot::default() }.solar_power(), None);
        let mut snapshot = online_with_raw(&[("loadsPower", 2.0)]);
        snapshot.online = false;
        assert_eq!(snapshot.solar_power(), None);
    }

    #[test]
    fn test_solar_energy_missing_fields_are_zero() {
        let mut snapshot = Snapshot { online: true, ..Snapshot::default() };
        snapshot.report.insert("loads".to_string(), 10.0);
        snapshot.report.insert("gridConsumption".to_string(), 3.5);
        assert_abs_diff_eq!(snapshot.solar_energy().unwrap(), 6.5);
    }

    #[test]
    fn test_set_daily_generation() {
        let mut snapshot = Snapshot { online: true, ..Snapshot::default() };
        snapshot.set_daily_generation(&DailyGeneration::default());
        assert_eq!(snapshot.report_daily_generation.value, Some(0.0));
        let generation = DailyGeneration { today: Some(7.1) };
        snapshot.set_daily_generation(&generation);
        assert_eq!(snapshot.report_daily_generation.value, Some(7.1));
    }

    #[test]
    fn test_merge_real_time_variables() -> Result {
        // language=JSON
        const DATAS: &str = r#"
            [
                {"variable": "pvPower", "unit": "kW", "name": "PVPower", "value": 3.21},
                {"variable": "SoC", "unit": "%", "name": "SoC", "value": null}
            ]
        "#;
        let mut snapshot = Snapshot::default();
        snapshot.raw.insert("RVolt".to_string(), 231.0);
        snapshot.merge_real_time_variables(serde_json::from_str(DATAS)?);
        assert_eq!(snapshot.raw["pvPower"], 3.21);
        assert_eq!(snapshot.raw["SoC"], 0.0);
        assert_eq!(snapshot.raw["RVolt"], 231.0, "merge must not clear other channels");
        Ok(())
    }

    #[test]
    fn test_merge_monthly_report_picks_today() -> Result {
        // language=JSON
        const RESULT: &str = r#"
            [
                {"variable": "feedin", "unit": "kWh", "values": [1.0, 2.0, 3.0004, 4.0]},
                {"variable": "loads", "unit": "kWh", "values": [5.0, 6.0, 7.0]}
            ]
        "#;
        let mut snapshot = Snapshot::default();
        snapshot.merge_monthly_report(report_variables(RESULT)?, 3);
        assert_abs_diff_eq!(snapshot.report["feedin"], 3.0);
        assert_abs_diff_eq!(snapshot.report["loads"], 7.0);
        Ok(())
    }

    #[test]
    fn test_merge_monthly_report_null_holds_last_value() -> Result {
        // language=JSON
        const RESULT: &str = r#"
            [
                {"variable": "generation", "unit": "kWh", "values": [1.5, 2.5, null, null]},
                {"variable": "loads", "unit": "kWh", "values": [null, null, null]}
            ]
        "#;
        let mut snapshot = Snapshot::default();
        snapshot.merge_monthly_report(report_variables(RESULT)?, 4);
        assert_abs_diff_eq!(snapshot.report["generation"], 2.5);
        assert_abs_diff_eq!(snapshot.report["loads"], 0.0);
        Ok(())
    }

    #[test]
    fn test_daily_value_edge_cases() {
        assert_abs_diff_eq!(daily_value("feedin", &[Some(1.0)], 0), 0.0);
        assert_abs_diff_eq!(daily_value("feedin", &[], 1), 0.0);
        assert_abs_diff_eq!(daily_value("feedin", &[Some(1.0), None, Some(9.0)], 2), 1.0);
    }

    #[test]
    fn test_clear_battery_settings() {
        let mut snapshot = Snapshot::default();
        snapshot.set_battery_settings(BatterySettings {
            min_soc: Some(10.0),
            min_soc_on_grid: Some(15.0),
        });
        snapshot.clear_battery_settings();
        assert_eq!(snapshot.battery.min_soc, None);
        assert_eq!(snapshot.battery.min_soc_on_grid, None);
    }
}
