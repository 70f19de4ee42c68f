use std::sync::Arc;

use chrono::{Datelike, Local};
use clap::{Parser, Subcommand};

use crate::{
    api::foxess::FoxCloud,
    cli::foxess::FoxEssApiArgs,
    prelude::*,
    tables::{build_real_time_table, build_report_table},
};

#[derive(Parser)]
pub struct BurrowArgs {
    #[clap(flatten)]
    fox_ess_api: FoxEssApiArgs,

    #[command(subcommand)]
    command: BurrowCommand,
}

#[derive(Subcommand)]
enum BurrowCommand {
    /// Get the device detail.
    DeviceDetail,

    /// Get the minimal state-of-charge settings.
    BatterySettings,

    /// Get the real-time variables.
    Variables,

    /// Get this month's report.
    Report,

    /// Get the generation counters.
    Generation,
}

impl BurrowArgs {
    #[instrument(skip_all, fields(serial_number = %self.fox_ess_api.serial_number))]
    pub async fn run(self) -> Result {
        let fox_ess = self.fox_ess_api.new_client(Arc::default())?;
        let serial_number = &self.fox_ess_api.serial_number;

        match self.command {
            BurrowCommand::DeviceDetail => {
                let detail = fox_ess.get_device_detail(serial_number).await?;
                info!(detail.has_battery, is_reachable = detail.is_reachable(), "gotcha");
                println!("{detail:#?}");
            }
            BurrowCommand::BatterySettings => {
                let settings = fox_ess.get_battery_settings(serial_number).await?;
                info!("gotcha");
                println!("{settings:#?}");
            }
            BurrowCommand::Variables => {
                let variables = fox_ess.get_real_time_variables(serial_number).await?;
                info!(n_variables = variables.len(), "gotcha");
                println!("{}", build_real_time_table(&variables));
            }
            BurrowCommand::Report => {
                let today = Local::now().date_naive();
                let report =
                    fox_ess.get_monthly_report(serial_number, today.year(), today.month()).await?;
                info!(n_variables = report.len(), "gotcha");
                println!("{}", build_report_table(&report, today.day()));
            }
            BurrowCommand::Generation => {
                let generation = fox_ess.get_daily_generation(serial_number).await?;
                info!("gotcha");
                println!("{generation:#?}");
            }
        }

        Ok(())
    }
}
