//! WebSocket Server for Mod Sync
//!
//! Accepts TCP connections, runs each WebSocket handshake on its own thread,
//! and hands finished sockets to HubActor via its queue. The snapshot is
//! built and sent in the hub, in queue order.

use std::net::{SocketAddr, TcpListener, TcpStream};
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tungstenite::WebSocket;

use crate::actor::messages::HubMsg;

/// Accept poll interval while idle.
const ACCEPT_INTERVAL: Duration = Duration::from_millis(100);

/// Upper bound for a peer to finish the HTTP upgrade.
const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(5);

/// Upper bound for a blocking write (handshake response and snapshot).
const WRITE_TIMEOUT: Duration = Duration::from_secs(5);

/// Start the WebSocket acceptor thread.
///
/// Returns the bound address (useful with port 0 in tests).
pub fn start_ws_server(addr: SocketAddr, hub_tx: mpsc::Sender<HubMsg>) -> Result<SocketAddr> {
    let listener =
        TcpListener::bind(addr).with_context(|| format!("failed to bind WebSocket server on {addr}"))?;
    let local_addr = listener.local_addr()?;
    listener.set_nonblocking(true)?;

    std::thread::spawn(move || accept_loop(listener, hub_tx));

    Ok(local_addr)
}

fn accept_loop(listener: TcpListener, hub_tx: mpsc::Sender<HubMsg>) {
    loop {
        match listener.accept() {
            Ok((stream, addr)) => {
                crate::debug!("serve"; "client connected: {}", addr);

                // A slow peer only ever holds its own thread
                let tx = hub_tx.clone();
                std::thread::spawn(move || {
                    let Some(ws) = handshake(stream) else {
                        return;
                    };
                    if tx.blocking_send(HubMsg::Connect(ws)).is_err() {
                        crate::debug!("serve"; "hub gone, dropping {}", addr);
                    }
                });
            }
            Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                if hub_tx.is_closed() {
                    crate::debug!("serve"; "hub gone, acceptor stopping");
                    break;
                }
                std::thread::sleep(ACCEPT_INTERVAL);
            }
            Err(e) => {
                crate::log!("serve"; "accept error: {}", e);
                std::thread::sleep(ACCEPT_INTERVAL);
            }
        }
    }
}

/// Run the WebSocket handshake on a freshly accepted stream.
///
/// The stream stays blocking, with timeouts, until the hub has sent the
/// snapshot; the write timeout also bounds that send.
fn handshake(stream: TcpStream) -> Option<WebSocket<TcpStream>> {
    let peer = stream
        .peer_addr()
        .map(|addr| addr.to_string())
        .unwrap_or_else(|_| "unknown".into());

    let configured = stream
        .set_nonblocking(false)
        .and_then(|()| stream.set_read_timeout(Some(HANDSHAKE_TIMEOUT)))
        .and_then(|()| stream.set_write_timeout(Some(WRITE_TIMEOUT)));
    if let Err(e) = configured {
        crate::log!("ws"; "failed to configure {}: {}", peer, e);
        return None;
    }

    match tungstenite::accept(stream) {
        Ok(ws) => {
            crate::debug!("ws"; "handshake complete: {}", peer);
            Some(ws)
        }
        Err(e) => {
            crate::log!("ws"; "handshake failed ({}): {}", peer, e);
            None
        }
    }
}
