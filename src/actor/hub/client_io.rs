use std::sync::Weak;
use std::time::Duration;

use super::registry::ObserverId;
use super::{Channel, Hub};

/// Poll interval for inbound observer messages.
const READ_INTERVAL: Duration = Duration::from_millis(100);

/// Background thread reading observer messages (non-blocking poll).
///
/// Inbound messages are logged and otherwise ignored; peers that hung up are
/// disconnected through the hub. Exits once the hub is dropped.
pub(super) fn reader_loop<C: Channel>(hub: Weak<Hub<C>>) {
    loop {
        std::thread::sleep(READ_INTERVAL);

        let Some(hub) = hub.upgrade() else {
            break;
        };
        let messages = hub.poll_inbound();
        drop(hub);

        for (id, text) in messages {
            log_inbound(id, &text);
        }
    }
}

fn log_inbound(id: ObserverId, text: &str) {
    match serde_json::from_str::<serde_json::Value>(text) {
        Ok(value) => crate::log!("client"; "observer {}: {}", id, value),
        Err(e) => crate::debug!("client"; "observer {} sent invalid JSON: {}", id, e),
    }
}
