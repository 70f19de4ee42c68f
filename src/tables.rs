use comfy_table::{Attribute, Cell, CellAlignment, Color, Table, modifiers, presets};

use crate::{
    api::foxess::{RealTimeRawVariable, ReportVariable},
    sensors::{InverterStatus, SENSORS, StateClass},
    snapshot::Snapshot,
};

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL_CONDENSED)
        .apply_modifier(modifiers::UTF8_ROUND_CORNERS)
        .enforce_styling();
    table
}

fn unavailable() -> Cell {
    Cell::new("unavailable").set_alignment(CellAlignment::Right).add_attribute(Attribute::Dim)
}

pub fn build_sensors_table(snapshot: &Snapshot, name: &str, device_id: &str) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Sensor", "Value", "Unit", "Class", "Unique ID"]);

    let status = InverterStatus::read(snapshot);
    table.add_row(vec![
        Cell::new(format!("{name} - Inverter")),
        status.map_or_else(unavailable, |status| {
            Cell::new(status).set_alignment(CellAlignment::Right).fg(match status {
                InverterStatus::OnLine => Color::Green,
                InverterStatus::InAlarm => Color::Red,
                InverterStatus::OffLine => Color::DarkYellow,
            })
        }),
        Cell::new(""),
        Cell::new(""),
        Cell::new(InverterStatus::unique_id(device_id)).add_attribute(Attribute::Dim),
    ]);

    for sensor in SENSORS {
        table.add_row(vec![
            Cell::new(sensor.display_name(name)),
            sensor.read(snapshot).map_or_else(unavailable, |value| {
                Cell::new(format!("{value:.3}")).set_alignment(CellAlignment::Right)
            }),
            Cell::new(sensor.unit),
            Cell::new(sensor.device_class).fg(match sensor.state_class {
                StateClass::Measurement => Color::Reset,
                StateClass::TotalIncreasing => Color::Cyan,
            }),
            Cell::new(sensor.unique_id(device_id)).add_attribute(Attribute::Dim),
        ]);
    }
    table
}

pub fn build_real_time_table(variables: &[RealTimeRawVariable]) -> Table {
    let mut table = new_table();
    table.set_header(vec!["Variable", "Description", "Value", "Unit"]);
    for variable in variables {
        table.add_row(vec![
            Cell::new(&variable.name),
            Cell::new(variable.description.as_deref().unwrap_or_default())
                .add_attribute(Attribute::Dim),
            Cell::new(&variable.value).set_alignment(CellAlignment::Right),
            Cell::new(variable.unit.as_deref().unwrap_or_default()),
        ]);
    }
    table
}

/// One row per day of the month, one column per variable.
pub fn build_report_table(variables: &[ReportVariable], today: u32) -> Table {
    let mut table = new_table();
    table.set_header(
        std::iter::once("Day").chain(variables.iter().map(|variable| variable.name.as_str())),
    );
    let n_days = variables.iter().map(|variable| variable.values.len()).max().unwrap_or_default();
    for (index, day) in (0..n_days).zip(1_u32..) {
        let mut row = vec![if day == today {
            Cell::new(day).add_attribute(Attribute::Bold)
        } else {
            Cell::new(day).add_attribute(Attribute::Dim)
        }];
        row.extend(variables.iter().map(|variable| {
            match variable.values.get(index).copied().flatten() {
                Some(value) => Cell::new(format!("{value:.3}")).set_alignment(CellAlignment::Right),
                None => Cell::new("null").add_attribute(Attribute::Dim),
            }
        }));
        table.add_row(row);
    }
    table
}
