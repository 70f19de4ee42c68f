//! Values the cloud does not report directly.

/// Round to 3 decimal places (watt-hour precision for kilowatt-hours).
pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Energy flow balance: whatever is consumed, stored, or exported
/// and not covered by the grid or the battery must have come from the panels.
///
/// Works for both power (kW) and energy (kWh). Clamped at zero, because the inputs are sampled
/// at slightly different moments and the balance may turn negative at night.
pub fn solar_balance(loads: f64, charge: f64, feed_in: f64, grid: f64, discharge: f64) -> f64 {
    round3((loads + charge + feed_in - grid - discharge).max(0.0))
}

/// Reactive power is reported in kvar.
pub fn reactive_power(kilovars: f64) -> f64 {
    kilovars * 1000.0
}

/// Residual energy is reported in tens of watt-hours, non-positive means «no data».
pub fn residual_energy(raw: f64) -> f64 {
    if raw > 0.0 { raw / 100.0 } else { 0.0 }
}

/// Daily counters only grow, so zero is indistinguishable from «not reported yet».
pub fn energy_total(value: f64) -> Option<f64> {
    (value != 0.0).then_some(value)
}
