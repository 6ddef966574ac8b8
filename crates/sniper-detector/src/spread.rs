//! Spread-spike detection.
//!
//! The baseline is an EMA of the spread (weight 0.1 on the newest sample),
//! seeded by the first valid spread. A sample is a spike when it reaches
//! the absolute threshold or `multiplier` times the baseline as it stood
//! before the sample. The baseline moves on every valid sample, including
//! those suppressed by the cooldown.

use crate::config::SpreadConfig;
use crate::cooldown::Cooldown;
use crate::rule::SignalRule;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sniper_core::{Alert, Snapshot};
use tracing::debug;

fn ema_alpha() -> Decimal {
    Decimal::new(1, 1)
}

/// Spread-spike rule.
pub struct SpreadSpikeRule {
    config: SpreadConfig,
    cooldown: Cooldown,
    ema: Option<Decimal>,
}

impl SpreadSpikeRule {
    pub fn new(config: SpreadConfig) -> Self {
        let cooldown = Cooldown::from_secs(config.cooldown_secs);
        Self {
            config,
            cooldown,
            ema: None,
        }
    }

    /// Current baseline, None until the first valid spread.
    pub fn baseline(&self) -> Option<Decimal> {
        self.ema
    }

    fn update_baseline(&mut self, spread: Decimal) {
        let alpha = ema_alpha();
        let next = self.ema.and_then(|ema| {
            alpha
                .checked_mul(spread)?
                .checked_add((Decimal::ONE - alpha).checked_mul(ema)?)
        });
        self.ema = Some(next.unwrap_or(spread));
    }
}

impl SignalRule for SpreadSpikeRule {
    fn name(&self) -> &'static str {
        "spread"
    }

    fn evaluate(&mut self, snapshot: &Snapshot, now: DateTime<Utc>) -> Option<Alert> {
        let spread = snapshot.spread()?.inner();
        if spread <= Decimal::ZERO {
            return None;
        }

        let previous = self.ema;
        self.update_baseline(spread);

        // The seeding sample has nothing to compare against.
        let baseline = previous?;

        if self.cooldown.is_active(now) {
            return None;
        }

        let absolute_spike = spread >= self.config.absolute_threshold;
        // A scaled baseline beyond the Decimal range cannot be exceeded.
        let relative_spike = baseline
            .checked_mul(self.config.multiplier)
            .is_some_and(|limit| spread >= limit);
        if !absolute_spike && !relative_spike {
            return None;
        }

        self.cooldown.trigger(now);
        debug!(
            symbol = snapshot.symbol(),
            %spread,
            %baseline,
            absolute_spike,
            relative_spike,
            "Spread spike"
        );

        Some(Alert::at(
            format!("⚠️ Spread spike {}", snapshot.symbol()),
            format!("Spread: {:.2} USDT\nNormal: {:.2} USDT", spread, baseline),
            now,
        ))
    }
}
