//! In-memory cloud for the tests.

use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use tokio::time::sleep;

use super::{
    BatterySettings,
    DailyGeneration,
    DeviceDetail,
    FoxCloud,
    RealTimeRawVariable,
    ReportVariable,
};
use crate::prelude::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Endpoint {
    DeviceDetail,
    BatterySettings,
    RealTimeVariables,
    MonthlyReport,
    DailyGeneration,
}

pub const FULL_POLL: [Endpoint; 5] = [
    Endpoint::DeviceDetail,
    Endpoint::BatterySettings,
    Endpoint::RealTimeVariables,
    Endpoint::MonthlyReport,
    Endpoint::DailyGeneration,
];

#[derive(Default)]
struct State {
    detail: DeviceDetail,
    pv_power: f64,
    latency: Duration,
    failing: Vec<Endpoint>,
    calls: Vec<Endpoint>,
}

/// Records the calls, fails the endpoints it is told to.
#[derive(Clone, Default)]
pub struct FakeCloud(Arc<Mutex<State>>);

impl FakeCloud {
    /// Reachable device with the serial number `SN`.
    pub fn with_battery(has_battery: bool) -> Self {
        let cloud = Self::default();
        cloud.state().detail = DeviceDetail {
            serial_number: "SN".to_string(),
            status: Some(1),
            has_battery,
            ..DeviceDetail::default()
        };
        cloud
    }

    fn state(&self) -> std::sync::MutexGuard<'_, State> {
        self.0.lock().unwrap()
    }

    async fn record(&self, endpoint: Endpoint) -> Result {
        let latency = self.state().latency;
        if !latency.is_zero() {
            sleep(latency).await;
        }
        let mut state = self.state();
        state.calls.push(endpoint);
        ensure!(!state.failing.contains(&endpoint), "{endpoint:?} is down");
        Ok(())
    }

    pub fn fail(&self, endpoint: Endpoint) {
        self.state().failing.push(endpoint);
    }

    pub fn recover(&self) {
        self.state().failing.clear();
    }

    pub fn set_status(&self, status: Option<i32>) {
        self.state().detail.status = status;
    }

    pub fn set_pv_power(&self, pv_power: f64) {
        self.state().pv_power = pv_power;
    }

    /// Every call takes this long.
    pub fn set_latency(&self, latency: Duration) {
        self.state().latency = latency;
    }

    pub fn take_calls(&self) -> Vec<Endpoint> {
        std::mem::take(&mut self.state().calls)
    }
}

#[async_trait]
impl FoxCloud for FakeCloud {
    async fn get_device_detail(&self, _serial_number: &str) -> Result<DeviceDetail> {
        self.record(Endpoint::DeviceDetail).await?;
        Ok(self.state().detail.clone())
    }

    async fn get_battery_settings(&self, _serial_number: &str) -> Result<BatterySettings> {
        self.record(Endpoint::BatterySettings).await?;
        Ok(BatterySettings { min_soc: Some(10.0), min_soc_on_grid: Some(20.0) })
    }

    async fn get_real_time_variables(
        &self,
        _serial_number: &str,
    ) -> Result<Vec<RealTimeRawVariable>> {
        self.record(Endpoint::RealTimeVariables).await?;
        let pv_power = self.state().pv_power;
        Ok(serde_json::from_value(serde_json::json!([
            {"variable": "pvPower", "value": pv_power},
            {"variable": "loadsPower", "value": 2.0},
            {"variable": "batChargePower", "value": 1.0},
            {"variable": "feedinPower", "value": 0.0},
            {"variable": "gridConsumptionPower", "value": 0.5},
            {"variable": "batDischargePower", "value": null},
        ]))?)
    }

    async fn get_monthly_report(
        &self,
        _serial_number: &str,
        _year: i32,
        _month: u32,
    ) -> Result<Vec<ReportVariable>> {
        self.record(Endpoint::MonthlyReport).await?;
        Ok(serde_json::from_value(serde_json::json!([
            {"variable": "loads", "values": [3.0, 4.0, 5.0]},
            {"variable": "feedin", "values": [0.0, 0.0, 0.0]},
        ]))?)
    }

    async fn get_daily_generation(&self, _serial_number: &str) -> Result<DailyGeneration> {
        self.record(Endpoint::DailyGeneration).await?;
        Ok(DailyGeneration { today: Some(6.5) })
    }
}
