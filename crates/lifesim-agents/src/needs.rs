//! Decaying needs: hunger, energy, hygiene, social, fun, bladder.
//!
//! Every agent carries one [`Need`] per [`NeedType`]. Needs start full and
//! lose `decay_rate` points per simulated hour; actions restore them
//! through [`NeedsSystem::fulfill`]. Two threshold bands classify a need:
//!
//! - **warning**: `value <= warning_threshold`
//! - **critical**: `value <= critical_threshold`
//!
//! A decay step that moves a need into a band emits a crossing event.
//! When a single step jumps over both bands only the critical crossing is
//! reported.

use std::collections::BTreeMap;

use lifesim_types::NeedType;
use tracing::debug;

use crate::config::{NeedConfig, NeedsConfig};
use crate::events::{EventHub, NeedsEvent, NeedsEventKind, Observer};

// ---------------------------------------------------------------------------
// Need
// ---------------------------------------------------------------------------

/// A single bounded, decaying need.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Need {
    /// Which need this is.
    pub need_type: NeedType,
    /// Bounds, thresholds, and decay rate.
    pub config: NeedConfig,
    /// Current value, always within `[config.min_value, config.max_value]`.
    value: f64,
}

impl Need {
    /// Create a full need.
    pub const fn new(need_type: NeedType, config: NeedConfig) -> Self {
        Self {
            need_type,
            config,
            value: config.max_value,
        }
    }

    /// Current value.
    pub const fn value(&self) -> f64 {
        self.value
    }

    /// Set the value, clamped into bounds.
    pub fn set_value(&mut self, value: f64) {
        self.value = self.clamp(value);
    }

    /// Whether the value is at or below the critical threshold.
    pub fn is_critical(&self) -> bool {
        self.value <= self.config.critical_threshold
    }

    /// Whether the value is at or below the warning threshold.
    pub fn is_warning(&self) -> bool {
        self.value <= self.config.warning_threshold
    }

    /// Position of the value within its range, from 0.0 (empty) to 1.0 (full).
    pub fn satisfaction(&self) -> f64 {
        let span = self.config.max_value - self.config.min_value;
        if span <= 0.0 {
            return 1.0;
        }
        (self.value - self.config.min_value) / span
    }

    /// Apply `dt` hours of linear decay.
    pub fn decay(&mut self, dt: f64) {
        let dt = dt.max(0.0);
        self.value = (self.value - self.config.decay_rate * dt).max(self.config.min_value);
    }

    /// Add `amount` (which may be negative) and return the change actually
    /// applied after clamping.
    pub fn fulfill(&mut self, amount: f64) -> f64 {
        let old = self.value;
        self.set_value(old + amount);
        self.value - old
    }

    fn clamp(&self, value: f64) -> f64 {
        if value.is_nan() {
            return self.value;
        }
        value.max(self.config.min_value).min(self.config.max_value)
    }
}

// ---------------------------------------------------------------------------
// NeedsSystem
// ---------------------------------------------------------------------------

/// The full set of needs of one agent.
#[derive(Debug)]
pub struct NeedsSystem {
    needs: BTreeMap<NeedType, Need>,
    events: EventHub<NeedsEvent>,
}

impl NeedsSystem {
    /// Create a system with every need full.
    pub fn new(config: &NeedsConfig) -> Self {
        let needs = config
            .iter()
            .map(|(need_type, need_config)| (need_type, Need::new(need_type, need_config)))
            .collect();
        Self {
            needs,
            events: EventHub::new(),
        }
    }

    /// Register an observer for one event kind.
    pub fn subscribe(&mut self, kind: NeedsEventKind, observer: Observer<NeedsEvent>) {
        self.events.subscribe(kind, observer);
    }

    /// Decay every need by `dt` hours.
    ///
    /// Returns the threshold crossings that occurred, in enumeration order.
    /// The same events are delivered to observers before this returns.
    pub fn update(&mut self, dt: f64) -> Vec<NeedsEvent> {
        let mut crossings = Vec::new();
        for need in self.needs.values_mut() {
            let was_critical = need.is_critical();
            let was_warning = need.is_warning();
            need.decay(dt);

            let event = if need.is_critical() && !was_critical {
                debug!(need = %need.need_type, value = need.value(), "need went critical");
                Some(NeedsEvent::CriticalCrossed(*need))
            } else if need.is_warning() && !was_warning {
                Some(NeedsEvent::WarningCrossed(*need))
            } else {
                None
            };
            if let Some(event) = event {
                self.events.emit(&event);
                crossings.push(event);
            }
        }
        crossings
    }

    /// Raise (or, with a negative amount, lower) a need.
    ///
    /// Returns the amount actually applied after clamping, or 0 if the need
    /// is not tracked.
    pub fn fulfill(&mut self, need_type: NeedType, amount: f64) -> f64 {
        let Some(need) = self.needs.get_mut(&need_type) else {
            return 0.0;
        };
        let applied = need.fulfill(amount);
        if applied > 0.0 {
            let event = NeedsEvent::Fulfilled {
                need: *need,
                amount: applied,
            };
            self.events.emit(&event);
        }
        applied
    }

    /// Current value of a need.
    pub fn value(&self, need_type: NeedType) -> Option<f64> {
        self.needs.get(&need_type).map(Need::value)
    }

    /// The full need record.
    pub fn get(&self, need_type: NeedType) -> Option<&Need> {
        self.needs.get(&need_type)
    }

    /// Set a need's value directly, clamped into bounds.
    pub fn set_value(&mut self, need_type: NeedType, value: f64) {
        if let Some(need) = self.needs.get_mut(&need_type) {
            need.set_value(value);
        }
    }

    /// Iterate over all needs in enumeration order.
    pub fn iter(&self) -> impl Iterator<Item = &Need> {
        self.needs.values()
    }

    /// Every need's current value.
    pub fn values(&self) -> BTreeMap<NeedType, f64> {
        self.needs
            .iter()
            .map(|(need_type, need)| (*need_type, need.value()))
            .collect()
    }

    /// Needs at or below their critical threshold, in enumeration order.
    pub fn critical_needs(&self) -> Vec<NeedType> {
        self.needs
            .values()
            .filter(|need| need.is_critical())
            .map(|need| need.need_type)
            .collect()
    }

    /// Needs at or below their warning threshold, in enumeration order.
    pub fn warning_needs(&self) -> Vec<NeedType> {
        self.needs
            .values()
            .filter(|need| need.is_warning())
            .map(|need| need.need_type)
            .collect()
    }

    /// The need with the lowest value. Ties go to the earlier need type.
    pub fn lowest_need(&self) -> Option<NeedType> {
        self.needs
            .values()
            .min_by(|a, b| a.value().total_cmp(&b.value()))
            .map(|need| need.need_type)
    }

    /// Mean satisfaction ratio over all needs, or 1.0 with no needs.
    pub fn satisfaction(&self) -> f64 {
        let count = u32::try_from(self.needs.len()).unwrap_or(u32::MAX);
        if count == 0 {
            return 1.0;
        }
        let total: f64 = self.needs.values().map(Need::satisfaction).sum();
        total / f64::from(count)
    }

    /// Need values keyed by need name.
    pub fn to_snapshot(&self) -> BTreeMap<String, f64> {
        self.needs
            .iter()
            .map(|(need_type, need)| (String::from(need_type.as_str()), need.value()))
            .collect()
    }

    /// Load values from a snapshot.
    ///
    /// Recognized keys are clamped into bounds; unrecognized keys are
    /// ignored and needs missing from the snapshot keep their value.
    pub fn restore(&mut self, snapshot: &BTreeMap<String, f64>) {
        for (name, value) in snapshot {
            if let Ok(need_type) = name.parse::<NeedType>() {
                self.set_value(need_type, *value);
            }
        }
    }
}

impl Default for NeedsSystem {
    fn default() -> Self {
        Self::new(&NeedsConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    const EPSILON: f64 = 1e-9;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < EPSILON
    }

    fn value(needs: &NeedsSystem, need: NeedType) -> f64 {
        needs.value(need).unwrap_or(f64::NAN)
    }

    #[test]
    fn needs_start_full() {
        let needs = NeedsSystem::default();
        for need in NeedType::ALL {
            assert!(approx(value(&needs, *need), 100.0));
        }
        assert!(approx(needs.satisfaction(), 1.0));
    }

    #[test]
    fn decay_is_linear_and_floored() {
        let mut needs = NeedsSystem::default();
        needs.update(2.0);
        assert!(approx(value(&needs, NeedType::Hunger), 84.0));
        assert!(approx(value(&needs, NeedType::Bladder), 80.0));

        needs.update(100.0);
        for need in NeedType::ALL {
            assert!(approx(value(&needs, *need), 0.0));
        }
    }

    #[test]
    fn negative_dt_is_treated_as_zero() {
        let mut needs = NeedsSystem::default();
        needs.set_value(NeedType::Fun, 50.0);
        needs.update(-3.0);
        assert!(approx(value(&needs, NeedType::Fun), 50.0));
    }

    #[test]
    fn fulfill_reports_clamped_amount() {
        let mut needs = NeedsSystem::default();
        needs.set_value(NeedType::Hunger, 90.0);
        let applied = needs.fulfill(NeedType::Hunger, 50.0);
        assert!(approx(applied, 10.0));
        assert!(approx(value(&needs, NeedType::Hunger), 100.0));
    }

    #[test]
    fn negative_fulfill_stays_in_bounds() {
        let mut needs = NeedsSystem::default();
        needs.set_value(NeedType::Energy, 5.0);
        let applied = needs.fulfill(NeedType::Energy, -20.0);
        assert!(approx(applied, -5.0));
        assert!(approx(value(&needs, NeedType::Energy), 0.0));
    }

    #[test]
    fn set_value_clamps() {
        let mut needs = NeedsSystem::default();
        needs.set_value(NeedType::Social, 150.0);
        assert!(approx(value(&needs, NeedType::Social), 100.0));
        needs.set_value(NeedType::Social, -10.0);
        assert!(approx(value(&needs, NeedType::Social), 0.0));
    }

    #[test]
    fn critical_crossing_fires_once() {
        let mut needs = NeedsSystem::default();
        needs.set_value(NeedType::Hunger, 25.0);
        let events = needs.update(1.0);
        assert_eq!(events.len(), 1);
        assert!(matches!(
            events.first(),
            Some(NeedsEvent::CriticalCrossed(need)) if need.need_type == NeedType::Hunger
        ));

        let events = needs.update(0.1);
        assert!(events.is_empty());
    }

    #[test]
    fn warning_crossing_reported_separately() {
        let mut needs = NeedsSystem::default();
        needs.set_value(NeedType::Fun, 45.0);
        let events = needs.update(1.0);
        assert!(matches!(
            events.as_slice(),
            [NeedsEvent::WarningCrossed(need)] if need.need_type == NeedType::Fun
        ));
    }

    #[test]
    fn observers_see_fulfillment() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut needs = NeedsSystem::default();
        let sink = Arc::clone(&seen);
        needs.subscribe(
            NeedsEventKind::Fulfilled,
            Box::new(move |event| {
                if let NeedsEvent::Fulfilled { need, amount } = event
                    && let Ok(mut log) = sink.lock()
                {
                    log.push((need.need_type, *amount));
                }
            }),
        );
        needs.set_value(NeedType::Hygiene, 70.0);
        needs.fulfill(NeedType::Hygiene, 20.0);
        needs.fulfill(NeedType::Hygiene, 50.0);
        // Already full: nothing applied, nothing emitted.
        needs.fulfill(NeedType::Hygiene, 5.0);

        let log = seen.lock().map(|l| l.clone()).unwrap_or_default();
        assert_eq!(log.len(), 2);
        assert!(log.iter().all(|(need, _)| *need == NeedType::Hygiene));
        assert!(log.get(1).is_some_and(|(_, amount)| approx(*amount, 10.0)));
    }

    #[test]
    fn threshold_queries() {
        let mut needs = NeedsSystem::default();
        needs.set_value(NeedType::Energy, 15.0);
        needs.set_value(NeedType::Fun, 35.0);
        assert_eq!(needs.critical_needs(), vec![NeedType::Energy]);
        assert_eq!(needs.warning_needs(), vec![NeedType::Energy, NeedType::Fun]);
        assert_eq!(needs.lowest_need(), Some(NeedType::Energy));
    }

    #[test]
    fn lowest_need_ties_go_to_enumeration_order() {
        let mut needs = NeedsSystem::default();
        needs.set_value(NeedType::Bladder, 30.0);
        needs.set_value(NeedType::Hygiene, 30.0);
        assert_eq!(needs.lowest_need(), Some(NeedType::Hygiene));
    }

    #[test]
    fn satisfaction_is_mean_ratio() {
        let mut needs = NeedsSystem::default();
        needs.set_value(NeedType::Hunger, 40.0);
        needs.set_value(NeedType::Energy, 80.0);
        // (0.4 + 0.8 + 4 * 1.0) / 6
        assert!(approx(needs.satisfaction(), 5.2 / 6.0));
    }

    #[test]
    fn snapshot_restore_ignores_unknown_and_missing() {
        let mut source = NeedsSystem::default();
        source.update(1.5);
        source.fulfill(NeedType::Hunger, 5.0);
        let mut snapshot = source.to_snapshot();
        snapshot.insert(String::from("thirst"), 12.0);
        snapshot.remove("fun");

        let mut target = NeedsSystem::default();
        target.set_value(NeedType::Fun, 33.0);
        target.restore(&snapshot);

        assert!(approx(value(&target, NeedType::Hunger), value(&source, NeedType::Hunger)));
        assert!(approx(value(&target, NeedType::Bladder), 85.0));
        assert!(approx(value(&target, NeedType::Fun), 33.0));
    }
}
