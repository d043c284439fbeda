//! Fuzz target: `Dispatcher::route`
//!
//! The first input byte picks a topic (one of the two subscriptions or an
//! arbitrary one); the rest is the payload. Routing must never panic, and
//! any alert text it yields must fit the fixed buffer.
//!
//! cargo fuzz run fuzz_dispatch

#![no_main]

use libfuzzer_sys::fuzz_target;
use shockshadow::app::commands::{AppCommand, ALERT_TEXT_MAX};
use shockshadow::app::dispatch::Dispatcher;
use shockshadow::config::SystemConfig;
use shockshadow::shadow::topics::Topics;

const DELTA: &str = "$aws/things/fuzz/shadow/update/delta";

fuzz_target!(|data: &[u8]| {
    let Some((&selector, payload)) = data.split_first() else {
        return;
    };
    let dispatcher = Dispatcher::new(Topics::new(&SystemConfig::default(), "fuzz"));

    let topic = match selector % 3 {
        0 => "esp32/sub",
        1 => DELTA,
        _ => core::str::from_utf8(payload).unwrap_or("unrelated/topic"),
    };

    if let Ok(AppCommand::ShowAlert(text)) = dispatcher.route(topic, payload) {
        assert!(text.len() <= ALERT_TEXT_MAX, "alert text overflowed");
    }
});
