mod cycle;

use bon::Builder;
use chrono::{Datelike, NaiveDate};
use tokio::sync::watch;

pub use self::cycle::PollCycleState;
use crate::{api::foxess::FoxCloud, prelude::*, snapshot::Snapshot};

/// Cloud call whose failure ends the tick.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, derive_more::Display)]
pub enum Call {
    #[display("device detail")]
    DeviceDetail,

    #[display("real-time variables")]
    RealTimeVariables,

    #[display("monthly report")]
    MonthlyReport,

    #[display("daily generation")]
    DailyGeneration,
}

/// What a tick ended up with.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Tick {
    /// Nothing to do in this time slice.
    Idle,

    /// All the required calls succeeded.
    Online,

    /// The device detail says the inverter is not connected, real-time polling is skipped.
    Unreachable,

    /// The call failed, the cycle starts over on the next tick.
    Failed(Call),
}

/// Per-device polling state machine.
///
/// Calls within a tick are sequential: they share the process-wide rate limiter,
/// and the later ones depend on the device detail.
#[derive(Builder)]
pub struct Poller<C> {
    cloud: C,

    #[builder(into)]
    serial_number: String,

    /// Display name, used in the logs.
    #[builder(into)]
    name: String,

    #[builder(default)]
    cycle: PollCycleState,

    #[builder(skip)]
    snapshot: Snapshot,

    #[builder(skip = watch::Sender::new(Snapshot::default()))]
    publisher: watch::Sender<Snapshot>,
}

impl<C: FoxCloud> Poller<C> {
    /// Subscribe to the snapshots, a new one is published after every tick.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.publisher.subscribe()
    }

    #[cfg(test)]
    pub const fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    #[cfg(test)]
    pub const fn cycle(&self) -> PollCycleState {
        self.cycle
    }

    /// Run one time slice, `today` is the local date to pick the report values for.
    ///
    /// Never fails: failures are logged and reflected in the snapshot's `online` flag.
    #[instrument(skip_all, fields(name = %self.name))]
    pub async fn tick(&mut self, today: NaiveDate) -> Tick {
        self.cycle.advance();
        let is_active = self.cycle.is_active();
        let slot = self.cycle.slot();

        let tick = if is_active {
            debug!(slot, "polling…");
            self.poll(today).await.unwrap_or_else(Tick::Failed)
        } else {
            trace!(slot, "idle");
            Tick::Idle
        };

        if let Tick::Failed(call) = tick {
            self.snapshot.online = false;
            self.cycle.retry();
            debug!(%call, "starting over on the next tick");
        }
        if is_active && !self.snapshot.online {
            warn!("cloud timeout or the inverter is off-line, retrying in the next tick");
        }

        self.cycle.wrap();
        self.publisher.send_replace(self.snapshot.clone());
        tick
    }

    async fn poll(&mut self, today: NaiveDate) -> Result<Tick, Call> {
        if self.cycle.is_cycle_start() {
            let detail = self
                .cloud
                .get_device_detail(&self.serial_number)
                .await
                .map_err(failed(Call::DeviceDetail))?;
            self.snapshot.set_device_detail(detail);
        }

        if !self.snapshot.addressbook.is_reachable() {
            info!(status = ?self.snapshot.addressbook.status, "the inverter is not reachable");
            return Ok(Tick::Unreachable);
        }

        if self.cycle.is_cycle_start() {
            self.refresh_battery_settings().await;
        }

        let variables = self
            .cloud
            .get_real_time_variables(&self.serial_number)
            .await
            .map_err(failed(Call::RealTimeVariables))?;
        self.snapshot.merge_real_time_variables(variables);

        if self.cycle.is_report_due() {
            let report = self
                .cloud
                .get_monthly_report(&self.serial_number, today.year(), today.month())
                .await
                .map_err(failed(Call::MonthlyReport))?;
            self.snapshot.merge_monthly_report(report, today.day());

            if self.cycle.is_cycle_start() {
                let generation = self
                    .cloud
                    .get_daily_generation(&self.serial_number)
                    .await
                    .map_err(failed(Call::DailyGeneration))?;
                self.snapshot.set_daily_generation(&generation);
            }
        }

        self.snapshot.online = true;
        Ok(Tick::Online)
    }

    /// Best effort: a failure here does not affect the tick.
    async fn refresh_battery_settings(&mut self) {
        if !self.snapshot.addressbook.has_battery {
            self.snapshot.clear_battery_settings();
            return;
        }
        match self.cloud.get_battery_settings(&self.serial_number).await {
            Ok(settings) => self.snapshot.set_battery_settings(settings),
            Err(error) => warn!("failed to refresh the battery settings: {error:#}"),
        }
    }
}

fn failed(call: Call) -> impl FnOnce(Error) -> Call {
    move |error| {
        warn!(%call, "call failed: {error:#}");
        call
    }
}
