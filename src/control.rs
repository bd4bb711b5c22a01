/*
 *  control.rs
 *
 *  xclock - time bends, digits glitch
 *	(c) 2024-26 xclock contributors
 *
 *	UDP control transport: JSON datagrams in, JSON replies out
 *
 *	This program is free software: you can redistribute it and/or modify
 *	it under the terms of the GNU General Public License as published by
 *	the Free Software Foundation, either version 3 of the License, or
 *	(at your option) any later version.
 *
 *	This program is distributed in the hope that it will be useful,
 *	but WITHOUT ANY WARRANTY; without even the implied warranty of
 *	MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *	GNU General Public License for more details.
 *
 *	See <http://www.gnu.org/licenses/> to get a copy of the GNU General
 *	Public License.
 *
 */

use log::{debug, info, warn};
use serde::Deserialize;
use serde_json::{json, Value};
use std::io;
use std::net::SocketAddr;
use thiserror::Error;
use tokio::net::UdpSocket;

use crate::engine::Reply;
use crate::runtime::{EngineHandle, RuntimeError};

const MAX_DATAGRAM: usize = 8192;

#[derive(Debug, Error)]
pub enum ControlError {
    #[error("cannot bind control socket {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },
    #[error("control socket I/O error: {0}")]
    Io(#[from] io::Error),
    /// Datagram could not be decoded; never forwarded to the engine.
    #[error("undecodable command: {0}")]
    Decode(#[from] serde_json::Error),
}

/// One inbound command: `{"command": "/time", "args": [14, 30]}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ControlMessage {
    pub command: String,
    #[serde(default)]
    pub args: Vec<Value>,
}

pub fn decode(datagram: &[u8]) -> Result<ControlMessage, ControlError> {
    Ok(serde_json::from_slice(datagram)?)
}

fn reply_body(result: Result<Reply, RuntimeError>) -> Value {
    match result {
        Ok(Reply::Done) => json!({ "ok": true }),
        Ok(Reply::Status(status)) => json!(status),
        Err(e) => json!({ "ok": false, "error": e.to_string() }),
    }
}

pub async fn bind(host: &str, port: u16) -> Result<UdpSocket, ControlError> {
    let addr = format!("{host}:{port}");
    let socket = UdpSocket::bind(&addr)
        .await
        .map_err(|source| ControlError::Bind { addr: addr.clone(), source })?;
    info!("listening for commands on udp://{}", socket.local_addr()?);
    Ok(socket)
}

/// Answer datagrams until the socket fails or the engine goes away.
pub async fn serve(socket: UdpSocket, handle: EngineHandle) -> Result<(), ControlError> {
    let mut buf = vec![0u8; MAX_DATAGRAM];
    loop {
        let (len, peer) = socket.recv_from(&mut buf).await?;
        let body = match decode(&buf[..len]) {
            Ok(msg) => {
                debug!("{} -> {} {:?}", peer, msg.command, msg.args);
                let result = handle.command(&msg.command, msg.args).await;
                if matches!(result, Err(RuntimeError::Stopped)) {
                    respond(&socket, peer, &reply_body(result)).await;
                    return Ok(());
                }
                reply_body(result)
            }
            Err(e) => {
                warn!("dropping datagram from {}: {}", peer, e);
                json!({ "ok": false, "error": e.to_string() })
            }
        };
        respond(&socket, peer, &body).await;
    }
}

async fn respond(socket: &UdpSocket, peer: SocketAddr, body: &Value) {
    let bytes = body.to_string();
    if let Err(e) = socket.send_to(bytes.as_bytes(), peer).await {
        warn!("reply to {} failed: {}", peer, e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::ConsolePainter;
    use crate::engine::{Engine, EngineSettings, FixedAddress, ManualClock, SimulatedTime};
    use crate::runtime::spawn_engine;
    use chrono::NaiveTime;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::time::Duration;

    #[test]
    fn test_decode() {
        let msg = decode(br#"{"command":"/glitch_to","args":[14,30,5]}"#).unwrap();
        assert_eq!(msg.command, "/glitch_to");
        assert_eq!(msg.args.len(), 3);
        assert!(decode(br#"{"command":"normal"}"#).unwrap().args.is_empty());
        assert!(matches!(decode(b"time 14 30"), Err(ControlError::Decode(_))));
    }

    async fn roundtrip(client: &UdpSocket, server: SocketAddr, payload: &[u8]) -> Value {
        client.send_to(payload, server).await.unwrap();
        let mut buf = [0u8; MAX_DATAGRAM];
        let (len, _) = tokio::time::timeout(Duration::from_secs(2), client.recv_from(&mut buf))
            .await
            .unwrap()
            .unwrap();
        serde_json::from_slice(&buf[..len]).unwrap()
    }

    #[tokio::test]
    async fn test_serve_replies() {
        let engine = Engine::new(
            EngineSettings {
                start_time: Some(SimulatedTime::new(3, 4).unwrap()),
                ..EngineSettings::default()
            },
            Box::new(ManualClock::new(NaiveTime::MIN)),
            Box::new(FixedAddress("10.0.0.1".into())),
            StdRng::seed_from_u64(3),
        );
        let (handle, _task) = spawn_engine(engine, Box::new(ConsolePainter::new()));

        let server = bind("127.0.0.1", 0).await.unwrap();
        let server_addr = server.local_addr().unwrap();
        tokio::spawn(serve(server, handle.clone()));
        let client = UdpSocket::bind("127.0.0.1:0").await.unwrap();

        let ok = roundtrip(&client, server_addr, br#"{"command":"/time","args":[9,41]}"#).await;
        assert_eq!(ok, json!({ "ok": true }));

        let bad = roundtrip(&client, server_addr, br#"{"command":"bg","args":["nope"]}"#).await;
        assert_eq!(bad["ok"], json!(false));
        assert!(bad["error"].as_str().unwrap().contains("unknown color"));

        let garbage = roundtrip(&client, server_addr, b"\xff\x00").await;
        assert_eq!(garbage["ok"], json!(false));

        let status = roundtrip(&client, server_addr, br#"{"command":"status"}"#).await;
        assert_eq!(status["time"], json!({ "hour": 9, "minute": 41, "frozen": false }));

        handle.shutdown().await;
    }
}
