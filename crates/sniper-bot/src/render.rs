//! Console order-book view.
//!
//! Frames are built as colored text lines from the current book, then drawn
//! in place on the alternate screen. When stdout is not a terminal the
//! lines are printed plainly.

use crossterm::{
    cursor::{Hide, MoveTo, Show},
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand, QueueableCommand,
};
use rust_decimal::Decimal;
use sniper_core::{BookSide, Price, PriceLevel};
use sniper_feed::OrderBook;
use std::io::{self, IsTerminal, Stdout, Write};

const INDEX_WIDTH: usize = 3;
const PRICE_WIDTH: usize = 11;
const QTY_WIDTH: usize = 10;
const BLOCK_WIDTH: usize = PRICE_WIDTH + 1 + QTY_WIDTH;
const RULE_WIDTH: usize = INDEX_WIDTH + 3 + BLOCK_WIDTH + 3 + BLOCK_WIDTH;

/// Levels listed under "TOP LIQUIDITY LEVELS".
const TOP_LEVELS: usize = 5;

/// A run of text in one color (None = terminal default).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub color: Option<Color>,
    pub text: String,
}

impl Segment {
    fn plain(text: impl Into<String>) -> Self {
        Self {
            color: None,
            text: text.into(),
        }
    }

    fn colored(color: Color, text: impl Into<String>) -> Self {
        Self {
            color: Some(color),
            text: text.into(),
        }
    }
}

pub type Line = Vec<Segment>;

/// A level ranked by closeness-weighted size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiquidityLevel {
    pub side: BookSide,
    pub level: PriceLevel,
    /// Distance from mid, in percent.
    pub distance_pct: Decimal,
    pub score: Decimal,
}

/// Top `n` levels across both sides by `qty / (distance_from_mid_pct + 0.0001)`.
pub fn top_liquidity(book: &OrderBook, n: usize) -> Vec<LiquidityLevel> {
    let Some(mid) = book.mid_price().filter(|mid| mid.is_positive()) else {
        return Vec::new();
    };
    let epsilon = Decimal::new(1, 4);

    let score = |side: BookSide, level: PriceLevel| {
        let distance_pct = level.price.distance_pct(mid)?;
        let score = level
            .quantity
            .inner()
            .checked_div(distance_pct.checked_add(epsilon)?)?;
        Some(LiquidityLevel {
            side,
            level,
            distance_pct,
            score,
        })
    };

    let mut ranked: Vec<LiquidityLevel> = book
        .bids()
        .filter_map(|level| score(BookSide::Bid, level))
        .chain(book.asks().filter_map(|level| score(BookSide::Ask, level)))
        .collect();
    ranked.sort_by(|a, b| b.score.cmp(&a.score));
    ranked.truncate(n);
    ranked
}

/// Build the full frame for `book`.
pub fn build_frame(book: &OrderBook) -> Vec<Line> {
    let mut lines = Vec::new();

    lines.push(vec![Segment::colored(
        Color::White,
        format!(
            "SYMBOL: {:<10}   VERSION: {}",
            book.symbol(),
            book.version().unwrap_or_default()
        ),
    )]);
    lines.push(Vec::new());

    let top = top_liquidity(book, TOP_LEVELS);
    if !top.is_empty() {
        lines.push(vec![Segment::colored(Color::Yellow, "TOP LIQUIDITY LEVELS")]);
        for entry in &top {
            let side = match entry.side {
                BookSide::Bid => "BID",
                BookSide::Ask => "ASK",
            };
            lines.push(vec![Segment::plain(format!(
                "{:<3} {:>10}  {:>8}  {:>6}%",
                side,
                format!("{:.2}", entry.level.price.inner()),
                format!("{:.3}", entry.level.quantity.inner()),
                format!("{:.3}", entry.distance_pct),
            ))]);
        }
        lines.push(Vec::new());
    }

    lines.extend(table_header());

    let bids = book.levels(BookSide::Bid);
    let asks = book.levels(BookSide::Ask);
    let bid_whale = whale_threshold(&bids);
    let ask_whale = whale_threshold(&asks);

    for i in 0..bids.len().max(asks.len()) {
        let mut line = vec![
            Segment::colored(Color::DarkGrey, format!("{:>INDEX_WIDTH$}", i + 1)),
            Segment::plain(" | "),
        ];
        line.push(level_cell(bids.get(i), i, bid_whale, Color::Cyan, Color::Green));
        line.push(Segment::plain(" | "));
        line.push(level_cell(asks.get(i), i, ask_whale, Color::Magenta, Color::Red));
        lines.push(line);
    }

    lines.push(Vec::new());
    lines.push(vec![Segment::colored(Color::White, "LEGEND")]);
    lines.push(vec![
        Segment::colored(Color::Cyan, "■ "),
        Segment::plain("Best Bid   "),
        Segment::colored(Color::Magenta, "■ "),
        Segment::plain("Best Ask   "),
        Segment::colored(Color::Yellow, "■ "),
        Segment::plain("Whale Wall (large liquidity)   "),
        Segment::colored(Color::Green, "■ "),
        Segment::plain("Bid   "),
        Segment::colored(Color::Red, "■ "),
        Segment::plain("Ask"),
    ]);

    lines
}

fn table_header() -> Vec<Line> {
    let rule = "-".repeat(RULE_WIDTH);
    let block_header = format!(
        "{} {}",
        center("PRICE", PRICE_WIDTH),
        center("QTY", QTY_WIDTH)
    );
    vec![
        vec![Segment::colored(
            Color::White,
            format!(
                "{} | {} | {}",
                " ".repeat(INDEX_WIDTH),
                center("BIDS", BLOCK_WIDTH),
                center("ASKS", BLOCK_WIDTH)
            ),
        )],
        vec![Segment::plain(rule.clone())],
        vec![Segment::colored(
            Color::White,
            format!("{:>INDEX_WIDTH$} | {block_header} | {block_header}", "#"),
        )],
        vec![Segment::plain(rule)],
    ]
}

/// Quantity at which a level counts as a whale: three times the side average.
///
/// None for an empty side or when the side total overflows.
fn whale_threshold(levels: &[PriceLevel]) -> Option<Decimal> {
    if levels.is_empty() {
        return None;
    }
    let total = levels
        .iter()
        .try_fold(Decimal::ZERO, |acc, l| acc.checked_add(l.quantity.inner()))?;
    total
        .checked_div(Decimal::from(levels.len()))?
        .checked_mul(Decimal::from(3))
}

fn level_cell(
    level: Option<&PriceLevel>,
    index: usize,
    whale: Option<Decimal>,
    best_color: Color,
    side_color: Color,
) -> Segment {
    let Some(level) = level else {
        return Segment::plain(" ".repeat(BLOCK_WIDTH));
    };

    let color = if whale.is_some_and(|w| level.quantity.inner() >= w) {
        Color::Yellow
    } else if index == 0 {
        best_color
    } else {
        side_color
    };

    Segment::colored(
        color,
        format!("{} {}", format_price(level.price), format_qty(level.quantity.inner())),
    )
}

fn format_price(price: Price) -> String {
    format!("{:>PRICE_WIDTH$}", format!("{:.2}", price.inner()))
}

fn format_qty(qty: Decimal) -> String {
    format!("{:>QTY_WIDTH$}", format!("{:.6}", qty))
}

fn center(text: &str, width: usize) -> String {
    format!("{text:^width$}")
}

/// Plain text of a line, without colors.
pub fn line_text(line: &Line) -> String {
    line.iter().map(|s| s.text.as_str()).collect()
}

/// Terminal renderer drawing frames in place.
pub struct ConsoleRenderer {
    stdout: Stdout,
    previous_line_count: usize,
    interactive: bool,
}

impl ConsoleRenderer {
    pub fn new() -> io::Result<Self> {
        let interactive = io::stdout().is_terminal();
        let mut stdout = io::stdout();

        if interactive {
            stdout.execute(EnterAlternateScreen)?;
            stdout.execute(Hide)?;
            stdout.execute(Clear(ClearType::All))?;
            stdout.execute(MoveTo(0, 0))?;
            stdout.flush()?;
        }

        Ok(Self {
            stdout,
            previous_line_count: 0,
            interactive,
        })
    }

    /// Redraw the view for `book`.
    pub fn render(&mut self, book: &OrderBook) -> io::Result<()> {
        let lines = build_frame(book);

        if !self.interactive {
            for line in &lines {
                writeln!(self.stdout, "{}", line_text(line))?;
            }
            return self.stdout.flush();
        }

        for (index, line) in lines.iter().enumerate() {
            let Ok(row) = u16::try_from(index) else {
                break;
            };
            self.stdout.queue(MoveTo(0, row))?;
            self.stdout.queue(Clear(ClearType::CurrentLine))?;
            for segment in line {
                match segment.color {
                    Some(color) => {
                        self.stdout.queue(SetForegroundColor(color))?;
                        self.stdout.queue(Print(&segment.text))?;
                        self.stdout.queue(ResetColor)?;
                    }
                    None => {
                        self.stdout.queue(Print(&segment.text))?;
                    }
                }
            }
        }

        for index in lines.len()..self.previous_line_count {
            let Ok(row) = u16::try_from(index) else {
                break;
            };
            self.stdout.queue(MoveTo(0, row))?;
            self.stdout.queue(Clear(ClearType::CurrentLine))?;
        }

        self.stdout.flush()?;
        self.previous_line_count = lines.len();
        Ok(())
    }
}

impl Drop for ConsoleRenderer {
    fn drop(&mut self) {
        if !self.interactive {
            return;
        }

        let _ = self.stdout.execute(Show);
        let _ = self.stdout.execute(LeaveAlternateScreen);
        let _ = self.stdout.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use sniper_core::{Size, Snapshot};

    fn level(price: Decimal, qty: Decimal) -> PriceLevel {
        PriceLevel::new(Price::new(price), Size::new(qty))
    }

    fn book() -> OrderBook {
        let mut book = OrderBook::new();
        book.apply(&Snapshot::new(
            "BTCUSDT",
            77,
            vec![
                level(dec!(100.00), dec!(1)),
                level(dec!(99.99), dec!(1)),
                level(dec!(99.98), dec!(1)),
                level(dec!(99.50), dec!(400)),
            ],
            vec![level(dec!(100.02), dec!(2)), level(dec!(100.03), dec!(1))],
        ));
        book
    }

    #[test]
    fn test_top_liquidity_ranking() {
        let top = top_liquidity(&book(), 3);
        assert_eq!(top.len(), 3);
        // Mid is 100.01; 99.50 is far out but dwarfs every other level.
        assert_eq!(top[0].level.price.inner(), dec!(99.50));
        assert_eq!(top[0].side, BookSide::Bid);
        assert!(top.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_top_liquidity_needs_both_sides() {
        let mut one_sided = OrderBook::new();
        one_sided.apply(&Snapshot::new(
            "BTCUSDT",
            1,
            vec![level(dec!(1), dec!(1))],
            vec![],
        ));
        assert!(top_liquidity(&one_sided, 5).is_empty());
    }

    #[test]
    fn test_frame_layout() {
        let frame = build_frame(&book());
        let text: Vec<String> = frame.iter().map(line_text).collect();

        assert_eq!(text[0], "SYMBOL: BTCUSDT      VERSION: 77");
        assert!(text.iter().any(|l| l == "TOP LIQUIDITY LEVELS"));

        let first_row = text
            .iter()
            .find(|l| l.starts_with("  1 | "))
            .unwrap();
        assert!(first_row.contains("100.00"));
        assert!(first_row.contains("100.02"));

        let bid_rows = text.iter().filter(|l| l.trim_start().starts_with(char::is_numeric)).count();
        assert!(bid_rows >= 4);
    }

    #[test]
    fn test_whale_and_best_colors() {
        let frame = build_frame(&book());
        let row = |n: usize| {
            frame
                .iter()
                .find(|line| line_text(line).starts_with(&format!("{n:>3} | ")))
                .unwrap()
                .clone()
        };

        // Segments: index, " | ", bid, " | ", ask
        assert_eq!(row(1)[2].color, Some(Color::Cyan));
        assert_eq!(row(1)[4].color, Some(Color::Magenta));
        assert_eq!(row(2)[2].color, Some(Color::Green));
        assert_eq!(row(4)[2].color, Some(Color::Yellow));
        assert_eq!(row(4)[4].text.trim(), "");
    }

    #[test]
    fn test_overflowing_side_total_has_no_whale() {
        let huge = vec![
            level(dec!(100.00), Decimal::MAX),
            level(dec!(99.99), Decimal::MAX),
        ];
        assert_eq!(whale_threshold(&huge), None);
        assert_eq!(whale_threshold(&[]), None);
        assert_eq!(
            whale_threshold(&[level(dec!(1), dec!(2)), level(dec!(2), dec!(4))]),
            Some(dec!(9))
        );

        let mut book = OrderBook::new();
        book.apply(&Snapshot::new(
            "BTCUSDT",
            1,
            huge,
            vec![level(dec!(100.01), dec!(1))],
        ));
        assert!(!build_frame(&book).is_empty());
    }

    #[test]
    fn test_empty_book_frame() {
        let frame = build_frame(&OrderBook::new());
        assert!(!frame.iter().any(|l| line_text(l) == "TOP LIQUIDITY LEVELS"));
        assert!(frame.iter().any(|l| line_text(l) == "LEGEND"));
    }
}
