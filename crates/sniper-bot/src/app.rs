//! Application wiring and main event loop.

use crate::config::{AppConfig, Secrets};
use crate::error::AppResult;
use crate::render::ConsoleRenderer;
use chrono::{DateTime, Utc};
use sniper_alert::{AlertDispatcher, DynAlertSink, TelegramSink};
use sniper_core::Alert;
use sniper_detector::SignalEngine;
use sniper_feed::{OrderBook, SnapshotDecoder};
use sniper_telemetry::Metrics;
use sniper_ws::{ConnectionEvent, MarketDataConnection};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Connection event queue depth.
const EVENT_CHANNEL_CAPACITY: usize = 1024;

/// Frame-processing pipeline: decode, store, render, evaluate, dispatch.
///
/// Runs on the task that receives connection events, one frame at a time
/// in receipt order. Alert delivery is spawned and never awaited here.
pub struct Pipeline {
    decoder: SnapshotDecoder,
    book: OrderBook,
    engine: SignalEngine,
    dispatcher: AlertDispatcher,
    renderer: Option<ConsoleRenderer>,
}

impl Pipeline {
    pub fn new(
        engine: SignalEngine,
        dispatcher: AlertDispatcher,
        renderer: Option<ConsoleRenderer>,
    ) -> Self {
        Self {
            decoder: SnapshotDecoder::new(),
            book: OrderBook::new(),
            engine,
            dispatcher,
            renderer,
        }
    }

    /// Current order book.
    pub fn book(&self) -> &OrderBook {
        &self.book
    }

    pub fn handle_event(&mut self, event: ConnectionEvent) {
        match event {
            ConnectionEvent::Connected { session } => {
                Metrics::ws_connected();
                if session > 1 {
                    Metrics::ws_reconnect();
                }
                info!(session, "Market feed connected");
            }
            ConnectionEvent::Frame(frame) => {
                self.process_frame(&frame, Utc::now());
            }
            ConnectionEvent::Disconnected { session } => {
                Metrics::ws_disconnected();
                warn!(session, "Market feed disconnected");
            }
        }
    }

    /// Process one binary frame observed at `now`.
    ///
    /// Returns the number of alerts dispatched. Undecodable frames are
    /// logged and dropped.
    pub fn process_frame(&mut self, frame: &[u8], now: DateTime<Utc>) -> usize {
        Metrics::frame_received();

        let snapshot = match self.decoder.decode(frame) {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => return 0,
            Err(e) => {
                Metrics::decode_failed();
                warn!(error = %e, len = frame.len(), "Dropping undecodable frame");
                return 0;
            }
        };

        self.book.apply(&snapshot);
        Metrics::snapshot_applied();

        if let Some(renderer) = self.renderer.as_mut() {
            if let Err(e) = renderer.render(&self.book) {
                debug!(error = %e, "Render failed");
            }
        }

        let dispatcher = &self.dispatcher;
        let mut dispatched = 0;
        self.engine.evaluate_each(&snapshot, now, |rule, alert| {
            Metrics::alert_emitted(rule);
            dispatcher.spawn_publish(alert);
            dispatched += 1;
        });
        dispatched
    }
}

/// Main application.
pub struct Application {
    config: AppConfig,
    secrets: Secrets,
}

impl Application {
    pub fn new(config: AppConfig, secrets: Secrets) -> AppResult<Self> {
        config.validate()?;
        Ok(Self { config, secrets })
    }

    /// Run until Ctrl-C.
    pub async fn run(self) -> AppResult<()> {
        let telegram = TelegramSink::new(
            &self.config.telegram,
            &self.secrets.bot_token,
            self.secrets.chat_id.clone(),
        )?;
        let dispatcher = AlertDispatcher::new(vec![Arc::new(telegram) as DynAlertSink]);

        let engine =
            SignalEngine::with_default_rules(self.config.wall.clone(), self.config.spread.clone());
        info!(rules = ?engine.rule_names(), "Signal engine configured");

        let renderer = if self.config.render.enabled {
            Some(ConsoleRenderer::new()?)
        } else {
            None
        };
        let mut pipeline = Pipeline::new(engine, dispatcher.clone(), renderer);

        let (event_tx, mut event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let connection = MarketDataConnection::new(self.config.connection_config(), event_tx);

        let subscriptions = connection.subscriptions();
        for market in &self.config.markets {
            subscriptions.subscribe(&market.symbol, market.depth);
        }

        info!(url = %self.config.ws_url, markets = self.config.markets.len(), "Starting application");
        dispatcher.spawn_publish(Alert::new("WhaleSniper online", "Market feed connected 🚀"));
        connection.connect();

        let shutdown = tokio::signal::ctrl_c();
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                biased;

                result = &mut shutdown => {
                    if let Err(e) = result {
                        warn!(error = %e, "Failed to listen for Ctrl-C, shutting down");
                    }
                    info!("Shutdown signal received");
                    break;
                }

                event = event_rx.recv() => match event {
                    Some(event) => pipeline.handle_event(event),
                    None => break,
                },
            }
        }

        connection.shutdown().await;
        Metrics::ws_disconnected();
        info!(
            reconnects = connection.reconnect_count(),
            version = ?pipeline.book().version(),
            "Shut down"
        );

        Ok(())
    }
}
