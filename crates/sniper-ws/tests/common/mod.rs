//! Shared helpers for sniper-ws integration tests.

pub mod mock_ws;
