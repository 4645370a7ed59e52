//! Process state for sync mode.
//!
//! - `SHUTDOWN`: Has shutdown been requested? (Ctrl+C received)
//! - `SHUTDOWN_TX`: Signal sender for the actor system, registered once it runs

use std::sync::OnceLock;
use std::sync::atomic::{AtomicBool, Ordering};

use crossbeam::channel::Sender;

/// Shutdown has been requested (Ctrl+C received)
static SHUTDOWN: AtomicBool = AtomicBool::new(false);

/// Shutdown signal sender for actor system
static SHUTDOWN_TX: OnceLock<Sender<()>> = OnceLock::new();

/// Setup the global Ctrl+C handler. Call once at program start
///
/// - Before `register_shutdown()`: exit immediately, nothing to stop
/// - After `register_shutdown()`: notify actors (observers get a close frame)
/// - Second Ctrl+C: exit immediately
pub fn setup_shutdown_handler() -> anyhow::Result<()> {
    ctrlc::set_handler(|| {
        if SHUTDOWN.swap(true, Ordering::SeqCst) {
            std::process::exit(130);
        }

        match SHUTDOWN_TX.get() {
            Some(tx) => {
                crate::log!("serve"; "shutting down...");
                let _ = tx.send(());
            }
            None => std::process::exit(0),
        }
    })
    .map_err(|e| anyhow::anyhow!("failed to set Ctrl+C handler: {}", e))
}

/// Register the actor system's shutdown channel
pub fn register_shutdown(shutdown_tx: Sender<()>) {
    let _ = SHUTDOWN_TX.set(shutdown_tx);
}

/// Check if shutdown has been requested
pub fn is_shutdown() -> bool {
    SHUTDOWN.load(Ordering::Relaxed)
}
