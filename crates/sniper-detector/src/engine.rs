//! Rule engine: runs every rule against every snapshot in a fixed order.

use crate::config::{SpreadConfig, WallConfig};
use crate::rule::SignalRule;
use crate::spread::SpreadSpikeRule;
use crate::wall::WallRule;
use chrono::{DateTime, Utc};
use sniper_core::{Alert, Snapshot};
use tracing::info;

/// Ordered set of stateful rules.
///
/// Evaluation is single-threaded per snapshot; rule state is never shared.
#[derive(Default)]
pub struct SignalEngine {
    rules: Vec<Box<dyn SignalRule>>,
}

impl SignalEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine with the wall rule followed by the spread-spike rule.
    pub fn with_default_rules(wall: WallConfig, spread: SpreadConfig) -> Self {
        let mut engine = Self::new();
        engine.add_rule(Box::new(WallRule::new(wall)));
        engine.add_rule(Box::new(SpreadSpikeRule::new(spread)));
        engine
    }

    /// Append a rule; rules run in insertion order.
    pub fn add_rule(&mut self, rule: Box<dyn SignalRule>) {
        self.rules.push(rule);
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }

    /// Evaluate all rules against `snapshot` at the current time.
    pub fn evaluate(&mut self, snapshot: &Snapshot) -> Vec<Alert> {
        self.evaluate_at(snapshot, Utc::now())
    }

    /// Evaluate all rules against `snapshot` observed at `now`.
    pub fn evaluate_at(&mut self, snapshot: &Snapshot, now: DateTime<Utc>) -> Vec<Alert> {
        let mut alerts = Vec::new();
        self.evaluate_each(snapshot, now, |_, alert| alerts.push(alert));
        alerts
    }

    /// Evaluate all rules, handing each alert to `on_alert` with the name of
    /// the rule that produced it.
    pub fn evaluate_each<F>(&mut self, snapshot: &Snapshot, now: DateTime<Utc>, mut on_alert: F)
    where
        F: FnMut(&'static str, Alert),
    {
        for rule in &mut self.rules {
            if let Some(alert) = rule.evaluate(snapshot, now) {
                info!(
                    rule = rule.name(),
                    symbol = snapshot.symbol(),
                    version = snapshot.version(),
                    title = %alert.title,
                    "Alert emitted"
                );
                on_alert(rule.name(), alert);
            }
        }
    }
}
