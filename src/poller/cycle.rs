/// Forces the next tick to behave like a cold start.
const RETRY_SLOT: i32 = -1;

/// Only every fifth tick talks to the cloud.
const ACTIVE_EVERY: i32 = 5;

/// Half-cycle point: refresh the report once more.
const REPORT_SLOT: i32 = 15;

/// The cycle restarts after this slot.
const LAST_SLOT: i32 = 30;

/// Time slice of a device polling cycle.
///
/// Slot 0 fetches everything, every fifth slot refreshes the real-time variables,
/// slots 0 and 15 also fetch the report. The slow-changing data is fetched seldom
/// because the cloud limits the number of calls per day.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PollCycleState {
    slot: i32,
}

impl Default for PollCycleState {
    /// Start with a full poll right away.
    fn default() -> Self {
        Self { slot: RETRY_SLOT }
    }
}

impl PollCycleState {
    pub const fn slot(self) -> i32 {
        self.slot
    }

    pub const fn advance(&mut self) {
        self.slot += 1;
    }

    /// Whether the current tick makes any calls.
    pub const fn is_active(self) -> bool {
        self.slot % ACTIVE_EVERY == 0
    }

    /// Whether the device detail and battery settings must be refreshed.
    pub const fn is_cycle_start(self) -> bool {
        self.slot == 0
    }

    pub const fn is_report_due(self) -> bool {
        self.slot == 0 || self.slot == REPORT_SLOT
    }

    /// Start over with a full poll on the next tick.
    pub const fn retry(&mut self) {
        self.slot = RETRY_SLOT;
    }

    pub const fn wrap(&mut self) {
        if self.slot == LAST_SLOT {
            self.slot = RETRY_SLOT;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Run one tick worth of state changes and tell whether it was active.
    fn step(cycle: &mut PollCycleState) -> bool {
        cycle.advance();
        let is_active = cycle.is_active();
        cycle.wrap();
        is_active
    }

    #[test]
    fn test_starts_immediately() {
        let mut cycle = PollCycleState::default();
        cycle.advance();
        assert!(cycle.is_active());
        assert!(cycle.is_cycle_start());
        assert!(cycle.is_report_due());
    }

    #[test]
    fn test_active_every_fifth_tick() {
        let mut cycle = PollCycleState::default();
        let active: Vec<bool> = (0..11).map(|_| step(&mut cycle)).collect();
        assert_eq!(
            active,
            [true, false, false, false, false, true, false, false, false, false, true],
        );
    }

    #[test]
    fn test_full_cycle() {
        let mut cycle = PollCycleState::default();
        let active_slots: Vec<i32> = (0..32)
            .filter_map(|_| {
                cycle.advance();
                let slot = cycle.is_active().then_some(cycle.slot());
                cycle.wrap();
                slot
            })
            .collect();
        assert_eq!(active_slots, [0, 5, 10, 15, 20, 25, 30, 0]);
    }

    #[test]
    fn test_report_due() {
        let mut cycle = PollCycleState::default();
        let report_slots: Vec<i32> = (0..31)
            .filter_map(|_| {
                cycle.advance();
                let slot = (cycle.is_active() && cycle.is_report_due()).then_some(cycle.slot());
                cycle.wrap();
                slot
            })
            .collect();
        assert_eq!(report_slots, [0, 15]);
    }

    #[test]
    fn test_retry_restarts_cycle() {
        let mut cycle = PollCycleState::default();
        for _ in 0..13 {
            step(&mut cycle);
        }
        assert_eq!(cycle.slot(), 12);
        cycle.retry();
        cycle.advance();
        assert!(cycle.is_active());
        assert!(cycle.is_cycle_start());
    }
}
