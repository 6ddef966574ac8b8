//! MEXC limit-depth push decoding.
//!
//! A binary frame is a [`PushDataV3ApiWrapper`] whose body is one of
//! several push kinds; only `publicLimitDepths` (field 303) yields a
//! snapshot. Other bodies (deals, book ticker, ...) share the socket and are
//! reported as not applicable. Depth levels carry price and quantity as
//! decimal text.

use crate::error::{FeedError, FeedResult};
use crate::proto::{PublicLimitDepthV3ApiItem, PushDataV3ApiWrapper};
use prost::Message;
use sniper_core::{Price, PriceLevel, Size, Snapshot};
use tracing::trace;

/// Decoder from raw push frames to [`Snapshot`]s.
///
/// Stateless; every call is independent.
#[derive(Debug, Default, Clone, Copy)]
pub struct SnapshotDecoder;

impl SnapshotDecoder {
    pub fn new() -> Self {
        Self
    }

    /// Decode one binary frame.
    ///
    /// Returns `Ok(None)` when the frame is a well-formed push of some other
    /// kind, and an error when it is structurally invalid or carries
    /// unparseable numbers.
    pub fn decode(&self, frame: &[u8]) -> FeedResult<Option<Snapshot>> {
        let wrapper = PushDataV3ApiWrapper::decode(frame)?;

        let Some(depths) = wrapper.public_limit_depths else {
            trace!(channel = %wrapper.channel, "Push is not a limit-depth update");
            return Ok(None);
        };

        let symbol = match wrapper.symbol.filter(|s| !s.is_empty()) {
            Some(symbol) => symbol,
            None => symbol_from_channel(&wrapper.channel).unwrap_or_default(),
        };

        let version = depths
            .version
            .trim()
            .parse::<i64>()
            .map_err(|_| FeedError::InvalidVersion(depths.version.clone()))?;
        let bids = levels(&depths.bids)?;
        let asks = levels(&depths.asks)?;

        trace!(
            %symbol,
            version,
            send_time = ?wrapper.send_time,
            bids = bids.len(),
            asks = asks.len(),
            "Decoded depth push"
        );

        Ok(Some(Snapshot::new(symbol, version, bids, asks)))
    }
}

fn levels(items: &[PublicLimitDepthV3ApiItem]) -> FeedResult<Vec<PriceLevel>> {
    items
        .iter()
        .map(|item| {
            Ok(PriceLevel::new(
                Price::parse(&item.price)?,
                Size::parse(&item.quantity)?,
            ))
        })
        .collect()
}

/// `spot@public.limit.depth.v3.api.pb@BTCUSDT@20` -> `BTCUSDT`.
fn symbol_from_channel(channel: &str) -> Option<String> {
    let mut parts = channel.rsplit('@');
    let _depth = parts.next()?;
    parts.next().map(str::to_string)
}
