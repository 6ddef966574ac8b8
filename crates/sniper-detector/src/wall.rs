//! Large resting order ("wall") detection.
//!
//! Per side, the wall is the first level from the best price outward whose
//! quantity meets `min_volume`. Walls farther than `max_distance_pct` from
//! their side's best price are ignored. Against the side's remembered wall:
//!
//! - nothing remembered: `APPEARED`
//! - different price: `MOVED`
//! - same price, quantity moved by at least 30%: `STRENGTHENED` / `WEAKENED`
//! - otherwise: no event
//!
//! Bids are evaluated first and an alerting bid side skips the ask side for
//! that snapshot. Both sides share one cooldown clock.

use crate::config::WallConfig;
use crate::cooldown::Cooldown;
use crate::rule::SignalRule;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sniper_core::{Alert, BookSide, Price, PriceLevel, Size, Snapshot};
use std::fmt;
use tracing::debug;

/// Quantity change (fraction of the remembered quantity) that counts as
/// strengthening or weakening.
fn qty_change_threshold() -> Decimal {
    Decimal::new(3, 1)
}

/// Classification of a wall observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WallEvent {
    Appeared,
    Moved,
    Strengthened,
    Weakened,
}

impl fmt::Display for WallEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WallEvent::Appeared => "APPEARED",
            WallEvent::Moved => "MOVED",
            WallEvent::Strengthened => "STRENGTHENED",
            WallEvent::Weakened => "WEAKENED",
        };
        f.write_str(s)
    }
}

/// Last observed wall on one side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct WallState {
    price: Price,
    quantity: Size,
}

/// Wall detection rule.
pub struct WallRule {
    config: WallConfig,
    cooldown: Cooldown,
    bid_wall: Option<WallState>,
    ask_wall: Option<WallState>,
}

impl WallRule {
    pub fn new(config: WallConfig) -> Self {
        let cooldown = Cooldown::from_secs(config.cooldown_secs);
        Self {
            config,
            cooldown,
            bid_wall: None,
            ask_wall: None,
        }
    }

    /// First level at or above the volume threshold.
    fn find_wall<'a>(&self, levels: &'a [PriceLevel]) -> Option<&'a PriceLevel> {
        levels
            .iter()
            .find(|level| level.quantity.inner() >= self.config.min_volume)
    }

    fn evaluate_side(
        &mut self,
        side: BookSide,
        wall: &PriceLevel,
        reference: Price,
        symbol: &str,
        now: DateTime<Utc>,
    ) -> Option<Alert> {
        let distance = wall.price.distance_pct(reference)?;
        if distance > self.config.max_distance_pct {
            return None;
        }

        if self.cooldown.is_active(now) {
            return None;
        }

        let current = WallState {
            price: wall.price,
            quantity: wall.quantity,
        };
        let state = match side {
            BookSide::Bid => &mut self.bid_wall,
            BookSide::Ask => &mut self.ask_wall,
        };
        let previous = state.replace(current);

        let event = classify(previous, current)?;
        debug!(%symbol, %side, %event, price = %wall.price, qty = %wall.quantity, "Wall event");
        Some(wall_alert(side, event, wall, symbol, now))
    }
}

impl SignalRule for WallRule {
    fn name(&self) -> &'static str {
        "wall"
    }

    fn evaluate(&mut self, snapshot: &Snapshot, now: DateTime<Utc>) -> Option<Alert> {
        let best_bid = snapshot.best_bid()?.price;
        let best_ask = snapshot.best_ask()?.price;

        let bid_wall = self.find_wall(snapshot.bids()).copied();
        let ask_wall = self.find_wall(snapshot.asks()).copied();

        let mut alert = None;

        if let Some(wall) = bid_wall {
            alert = self.evaluate_side(BookSide::Bid, &wall, best_bid, snapshot.symbol(), now);
        }

        if alert.is_none() {
            if let Some(wall) = ask_wall {
                alert = self.evaluate_side(BookSide::Ask, &wall, best_ask, snapshot.symbol(), now);
            }
        }

        if alert.is_some() {
            self.cooldown.trigger(now);
        }
        alert
    }
}

fn classify(previous: Option<WallState>, current: WallState) -> Option<WallEvent> {
    let Some(previous) = previous else {
        return Some(WallEvent::Appeared);
    };

    if previous.price != current.price {
        return Some(WallEvent::Moved);
    }

    let change = current.quantity.relative_change(previous.quantity)?;
    if change.abs() < qty_change_threshold() {
        return None;
    }

    if change.is_sign_positive() {
        Some(WallEvent::Strengthened)
    } else {
        Some(WallEvent::Weakened)
    }
}

fn wall_alert(
    side: BookSide,
    event: WallEvent,
    wall: &PriceLevel,
    symbol: &str,
    now: DateTime<Utc>,
) -> Alert {
    let label = match side {
        BookSide::Bid => "🟢 BID WALL",
        BookSide::Ask => "🔴 ASK WALL",
    };
    Alert::at(
        format!("{label} {event} {symbol}"),
        format!("Price: {}\nQty: {}", wall.price, wall.quantity),
        now,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use rust_decimal_macros::dec;

    fn level(price: Decimal, qty: Decimal) -> PriceLevel {
        PriceLevel::new(Price::new(price), Size::new(qty))
    }

    fn book(bids: Vec<PriceLevel>, asks: Vec<PriceLevel>) -> Snapshot {
        Snapshot::new("BTCUSDT", 1, bids, asks)
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap()
    }

    fn rule() -> WallRule {
        WallRule::new(WallConfig {
            min_volume: dec!(10),
            max_distance_pct: dec!(0.1),
            cooldown_secs: 120,
        })
    }

    fn scenario_book() -> Snapshot {
        book(
            vec![level(dec!(100.00), dec!(12)), level(dec!(99.99), dec!(1))],
            vec![level(dec!(100.01), dec!(1))],
        )
    }

    #[test]
    fn test_bid_wall_appeared() {
        let mut rule = rule();
        let alert = rule.evaluate(&scenario_book(), t0()).unwrap();

        assert_eq!(alert.title, "🟢 BID WALL APPEARED BTCUSDT");
        assert_eq!(alert.message, "Price: 100.00\nQty: 12");
        assert_eq!(alert.timestamp, t0());
    }

    #[test]
    fn test_identical_snapshot_in_cooldown_is_silent() {
        let mut rule = rule();
        assert!(rule.evaluate(&scenario_book(), t0()).is_some());
        assert!(rule
            .evaluate(&scenario_book(), t0() + Duration::seconds(30))
            .is_none());
    }

    #[test]
    fn test_strengthened_after_cooldown() {
        let mut rule = rule();
        rule.evaluate(&scenario_book(), t0());

        let stronger = book(
            vec![level(dec!(100.00), dec!(16)), level(dec!(99.99), dec!(1))],
            vec![level(dec!(100.01), dec!(1))],
        );
        let alert = rule
            .evaluate(&stronger, t0() + Duration::minutes(3))
            .unwrap();
        assert_eq!(alert.title, "🟢 BID WALL STRENGTHENED BTCUSDT");
        assert_eq!(alert.message, "Price: 100.00\nQty: 16");
    }

    #[test]
    fn test_weakened_and_small_change() {
        let mut rule = rule();
        rule.evaluate(&scenario_book(), t0());

        // 12 -> 11 is under 30%: no event, state still overwritten.
        let slight = book(
            vec![level(dec!(100.00), dec!(11))],
            vec![level(dec!(100.01), dec!(1))],
        );
        assert!(rule.evaluate(&slight, t0() + Duration::minutes(3)).is_none());
        assert_eq!(rule.bid_wall.unwrap().quantity.inner(), dec!(11));

        let weaker = book(
            vec![level(dec!(100.00), dec!(7.7))],
            vec![level(dec!(100.01), dec!(1))],
        );
        // 7.7 is below min_volume, so no wall at all.
        assert!(rule.evaluate(&weaker, t0() + Duration::minutes(4)).is_none());

        let mut rule_low = WallRule::new(WallConfig {
            min_volume: dec!(5),
            ..rule.config.clone()
        });
        rule_low.evaluate(&scenario_book(), t0());
        let alert = rule_low
            .evaluate(&weaker, t0() + Duration::minutes(3))
            .unwrap();
        assert_eq!(alert.title, "🟢 BID WALL WEAKENED BTCUSDT");
    }

    #[test]
    fn test_moved() {
        let mut rule = rule();
        rule.evaluate(&scenario_book(), t0());

        let moved = book(
            vec![level(dec!(100.00), dec!(1)), level(dec!(99.99), dec!(15))],
            vec![level(dec!(100.01), dec!(1))],
        );
        let alert = rule.evaluate(&moved, t0() + Duration::minutes(3)).unwrap();
        assert_eq!(alert.title, "🟢 BID WALL MOVED BTCUSDT");
        assert_eq!(alert.message, "Price: 99.99\nQty: 15");
    }

    #[test]
    fn test_bid_alert_short_circuits_ask() {
        let mut rule = rule();
        let both = book(
            vec![level(dec!(100.00), dec!(12))],
            vec![level(dec!(100.01), dec!(20))],
        );

        let alert = rule.evaluate(&both, t0()).unwrap();
        assert!(alert.title.starts_with("🟢 BID WALL"));
        assert!(rule.ask_wall.is_none());
    }

    #[test]
    fn test_ask_wall_when_bid_silent() {
        let mut rule = rule();
        let asks_only = book(
            vec![level(dec!(100.00), dec!(1))],
            vec![level(dec!(100.01), dec!(20))],
        );

        let alert = rule.evaluate(&asks_only, t0()).unwrap();
        assert_eq!(alert.title, "🔴 ASK WALL APPEARED BTCUSDT");
    }

    #[test]
    fn test_far_wall_is_ignored() {
        let mut rule = rule();
        let far = book(
            vec![level(dec!(100.00), dec!(1)), level(dec!(99.00), dec!(50))],
            vec![level(dec!(100.01), dec!(1))],
        );

        assert!(rule.evaluate(&far, t0()).is_none());
        assert!(rule.bid_wall.is_none());
    }

    #[test]
    fn test_cooldown_is_shared_across_sides() {
        let mut rule = rule();
        assert!(rule.evaluate(&scenario_book(), t0()).is_some());

        let with_ask_wall = book(
            vec![level(dec!(100.00), dec!(12))],
            vec![level(dec!(100.01), dec!(20))],
        );
        assert!(rule
            .evaluate(&with_ask_wall, t0() + Duration::seconds(30))
            .is_none());
        assert!(rule.ask_wall.is_none());

        let alert = rule
            .evaluate(&with_ask_wall, t0() + Duration::minutes(3))
            .unwrap();
        assert_eq!(alert.title, "🔴 ASK WALL APPEARED BTCUSDT");
    }

    #[test]
    fn test_extreme_prices_do_not_overflow() {
        let mut rule = rule();
        let extreme = book(
            vec![level(dec!(0.0000000001), dec!(1))],
            vec![
                level(dec!(0.0000000002), dec!(1)),
                level(dec!(10000000000000000000000), dec!(50)),
            ],
        );

        assert!(rule.evaluate(&extreme, t0()).is_none());
        assert!(rule.ask_wall.is_none());
    }

    #[test]
    fn test_one_sided_book_is_silent() {
        let mut rule = rule();
        let bids_only = book(vec![level(dec!(100.00), dec!(50))], vec![]);
        assert!(rule.evaluate(&bids_only, t0()).is_none());
        assert!(rule.evaluate(&book(vec![], vec![]), t0()).is_none());
    }
}
