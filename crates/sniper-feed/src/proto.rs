//! MEXC push message definitions.
//!
//! Only the fields the decoder reads are declared; everything else on the
//! wire is skipped. The `body` oneof of the wrapper is reduced to its
//! limit-depth variant, so any other body decodes with
//! `public_limit_depths == None`.

/// `PushDataV3ApiWrapper`.
#[derive(Clone, PartialEq, prost::Message)]
pub struct PushDataV3ApiWrapper {
    #[prost(string, tag = "1")]
    pub channel: String,
    #[prost(string, optional, tag = "3")]
    pub symbol: Option<String>,
    #[prost(string, optional, tag = "4")]
    pub symbol_id: Option<String>,
    #[prost(int64, optional, tag = "5")]
    pub create_time: Option<i64>,
    #[prost(int64, optional, tag = "6")]
    pub send_time: Option<i64>,
    #[prost(message, optional, tag = "303")]
    pub public_limit_depths: Option<PublicLimitDepthsV3Api>,
}

/// `PublicLimitDepthsV3Api`.
#[derive(Clone, PartialEq, prost::Message)]
pub struct PublicLimitDepthsV3Api {
    #[prost(message, repeated, tag = "1")]
    pub asks: Vec<PublicLimitDepthV3ApiItem>,
    #[prost(message, repeated, tag = "2")]
    pub bids: Vec<PublicLimitDepthV3ApiItem>,
    #[prost(string, tag = "3")]
    pub event_type: String,
    /// Decimal text.
    #[prost(string, tag = "4")]
    pub version: String,
}

/// `PublicLimitDepthV3ApiItem`: price and quantity as decimal text.
#[derive(Clone, PartialEq, prost::Message)]
pub struct PublicLimitDepthV3ApiItem {
    #[prost(string, tag = "1")]
    pub price: String,
    #[prost(string, tag = "2")]
    pub quantity: String,
}
