use std::{io, pin::pin, sync::Arc, time::Duration};

use bon::Builder;
use chrono::Local;
use clap::Parser;
use reqwest::Url;
use tokio::{
    signal,
    sync::watch,
    time::{MissedTickBehavior, interval},
};

use crate::{
    api::{foxess::FoxCloud, heartbeat},
    cli::foxess::FoxEssApiArgs,
    poller::{Call, Poller, Tick},
    prelude::*,
    sensors::{InverterAttributes, InverterStatus},
    snapshot::Snapshot,
    tables::build_sensors_table,
};

const MIN_POLLING_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Parser)]
pub struct PollArgs {
    #[clap(flatten)]
    fox_ess_api: FoxEssApiArgs,

    /// Device identifier, prefix of the sensor unique IDs.
    #[clap(long, env = "FOX_ESS_DEVICE_ID")]
    device_id: String,

    /// Display name, prefix of the sensor names.
    #[clap(long, env = "FOX_ESS_NAME", default_value = "FoxESS")]
    name: String,

    /// Tick period. Only every fifth tick calls the cloud.
    #[clap(long, env = "POLLING_INTERVAL", default_value = "1min")]
    polling_interval: humantime::Duration,

    #[clap(long = "heartbeat-url", env = "HEARTBEAT_URL")]
    heartbeat_url: Option<Url>,

    /// Print the sensor table after every tick.
    #[clap(long)]
    table: bool,
}

impl PollArgs {
    fn validate(&self) -> Result {
        self.fox_ess_api.validate()?;
        ensure!(!self.device_id.trim().is_empty(), "the device ID must not be empty");
        ensure!(
            *self.polling_interval >= MIN_POLLING_INTERVAL,
            "the polling interval must be at least one second",
        );
        Ok(())
    }

    pub async fn run(self) -> Result {
        self.validate()?;
        let cloud = self.fox_ess_api.new_client(Arc::default())?;
        let poller = Poller::builder()
            .cloud(cloud)
            .serial_number(self.fox_ess_api.serial_number.as_str())
            .name(self.name.as_str())
            .build();
        let consumer = tokio::spawn(
            Consumer::builder()
                .receiver(poller.subscribe())
                .name(self.name.clone())
                .device_id(self.device_id)
                .print_table(self.table)
                .build()
                .run(),
        );
        let result = Service::builder()
            .poller(poller)
            .heartbeat(heartbeat::Client::new(self.heartbeat_url))
            .interval(*self.polling_interval)
            .build()
            .run()
            .await;
        consumer.await.context("the consumer has crashed")?;
        result
    }
}

/// Tick loop of a single device.
#[derive(Builder)]
struct Service<C> {
    poller: Poller<C>,
    heartbeat: heartbeat::Client,

    interval: Duration,
}

impl<C: FoxCloud> Service<C> {
    /// Run until Ctrl-C.
    async fn run(self) -> Result {
        self.run_until(signal::ctrl_c()).await
    }

    /// Run until `shutdown` resolves, even in the middle of a tick.
    ///
    /// Fails only when the very first tick cannot fetch the device detail.
    async fn run_until(mut self, shutdown: impl Future<Output = io::Result<()>>) -> Result {
        info!(interval = ?self.interval, "polling…");
        let mut interval = interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut shutdown = pin!(shutdown);
        let mut is_startup = true;

        loop {
            let tick = tokio::select! {
                tick = async {
                    interval.tick().await;
                    self.poller.tick(Local::now().date_naive()).await
                } => tick,
                result = &mut shutdown => {
                    result.context("failed to listen for the shutdown signal")?;
                    info!("interrupted");
                    return Ok(());
                }
            };
            if is_startup {
                is_startup = false;
                ensure!(
                    tick != Tick::Failed(Call::DeviceDetail),
                    "failed to fetch the device detail on startup",
                );
            }
            if tick == Tick::Online {
                self.heartbeat.send().await;
            }
        }
    }
}

/// Reads the published snapshots, the way a sensor platform would.
#[derive(Builder)]
struct Consumer {
    receiver: watch::Receiver<Snapshot>,
    name: String,
    device_id: String,
    print_table: bool,
}

impl Consumer {
    /// Run until the poller is gone.
    async fn run(mut self) {
        while self.receiver.changed().await.is_ok() {
            let snapshot = self.receiver.borrow_and_update().clone();
            let status = InverterStatus::read(&snapshot);
            debug!(online = snapshot.online, status = ?status, "snapshot");
            if let Some(attributes) = InverterAttributes::read(&snapshot, Local::now()) {
                trace!(
                    %attributes.device_serial_number,
                    %attributes.plant_name,
                    %attributes.module_serial_number,
                    %attributes.device_type,
                    %attributes.last_cloud_sync,
                    "inverter",
                );
            }
            if self.print_table {
                println!("{}", build_sensors_table(&snapshot, &self.name, &self.device_id));
            }
        }
    }
}
