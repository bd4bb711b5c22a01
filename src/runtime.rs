/*
 *  runtime.rs
 *
 *  xclock - time bends, digits glitch
 *	(c) 2024-26 xclock contributors
 *
 *	Engine actor: owns the engine, serializes commands with the tick loop
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

use chrono::{DateTime, Local};
use log::{debug, info, trace, warn};
use serde::Serialize;
use serde_json::Value;
use std::time::Instant;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;

use crate::display::FramePainter;
use crate::engine::{Command, Engine, EngineError, EngineResult, Frame, Reply};
use crate::pacer::Pacer;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("engine task has stopped")]
    Stopped,
    #[error(transparent)]
    Rejected(#[from] EngineError),
}

#[derive(Debug)]
pub enum EngineRequest {
    Command {
        name: String,
        args: Vec<Value>,
        reply: oneshot::Sender<EngineResult<Reply>>,
    },
    Shutdown,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "result", rename_all = "lowercase")]
pub enum Outcome {
    Accepted,
    Rejected { reason: String },
}

/// One entry of the command log tap.
#[derive(Debug, Clone, Serialize)]
pub struct CommandEvent {
    pub at: DateTime<Local>,
    pub command: String,
    pub args: Vec<Value>,
    pub outcome: Outcome,
}

/// Cheap clonable access to a running engine.
#[derive(Clone)]
pub struct EngineHandle {
    tx: mpsc::Sender<EngineRequest>,
    events: broadcast::Sender<CommandEvent>,
    frames: watch::Receiver<Option<Frame>>,
}

impl EngineHandle {
    /// Send a command and wait for the engine's verdict.
    pub async fn command(&self, name: &str, args: Vec<Value>) -> Result<Reply, RuntimeError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(EngineRequest::Command { name: name.to_string(), args, reply })
            .await
            .map_err(|_| RuntimeError::Stopped)?;
        Ok(rx.await.map_err(|_| RuntimeError::Stopped)??)
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<CommandEvent> {
        self.events.subscribe()
    }

    /// Latest painted frame, `None` until the first tick.
    pub fn frames(&self) -> watch::Receiver<Option<Frame>> {
        self.frames.clone()
    }

    pub async fn shutdown(&self) {
        let _ = self.tx.send(EngineRequest::Shutdown).await;
    }
}

/// Spawn the actor. It keeps running until `shutdown` or until every handle
/// is dropped.
pub fn spawn_engine(
    engine: Engine,
    painter: Box<dyn FramePainter>,
) -> (EngineHandle, JoinHandle<()>) {
    // small, bounded queue
    let (tx, rx) = mpsc::channel::<EngineRequest>(32);
    let (events, _) = broadcast::channel::<CommandEvent>(64);
    let (frame_tx, frame_rx) = watch::channel::<Option<Frame>>(None);

    let task = tokio::spawn(run(engine, painter, rx, events.clone(), frame_tx));
    (EngineHandle { tx, events, frames: frame_rx }, task)
}

fn apply(engine: &mut Engine, name: &str, args: &[Value]) -> (EngineResult<Reply>, bool) {
    match Command::parse(name, args) {
        Ok(cmd) => {
            let query = cmd.is_query();
            (engine.apply(cmd), query)
        }
        Err(e) => (Err(e), false),
    }
}

fn publish(
    events: &broadcast::Sender<CommandEvent>,
    name: &str,
    args: &[Value],
    result: &EngineResult<Reply>,
) {
    let outcome = match result {
        Ok(_) => {
            info!("command accepted: {} {:?}", name, args);
            Outcome::Accepted
        }
        Err(e) => {
            warn!("command rejected: {} {:?}: {}", name, args, e);
            Outcome::Rejected { reason: e.to_string() }
        }
    };
    // no subscribers is fine
    let _ = events.send(CommandEvent {
        at: Local::now(),
        command: name.to_string(),
        args: args.to_vec(),
        outcome,
    });
}

async fn run(
    mut engine: Engine,
    mut painter: Box<dyn FramePainter>,
    mut rx: mpsc::Receiver<EngineRequest>,
    events: broadcast::Sender<CommandEvent>,
    frame_tx: watch::Sender<Option<Frame>>,
) {
    if let Err(e) = painter.init() {
        warn!("painter {} failed to initialise: {}", painter.name(), e);
    }
    info!(
        "engine running at {:?} per frame on painter {}",
        engine.frame_interval(),
        painter.name()
    );

    let mut pacer = Pacer::new(engine.frame_interval(), Instant::now());

    loop {
        let deadline = tokio::time::Instant::from_std(pacer.deadline());
        tokio::select! {
            biased;

            req = rx.recv() => {
                match req {
                    Some(EngineRequest::Command { name, args, reply }) => {
                        let (result, query) = apply(&mut engine, &name, &args);
                        if !query {
                            publish(&events, &name, &args, &result);
                        }
                        pacer.set_frame(engine.frame_interval());
                        let _ = reply.send(result);
                    }
                    Some(EngineRequest::Shutdown) | None => {
                        debug!("engine: shutdown");
                        break;
                    }
                }
            }

            _ = tokio::time::sleep_until(deadline) => {
                if pacer.should_tick(Instant::now()) {
                    let frame = engine.tick();
                    trace!("tick {}: {}", engine.frames(), frame);
                    if let Err(e) = painter.paint(&frame) {
                        warn!("painter {}: {}", painter.name(), e);
                    }
                    frame_tx.send_replace(Some(frame));
                }
            }
        }
    }

    if let Err(e) = painter.clear() {
        warn!("painter {} failed to clear: {}", painter.name(), e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::display::ConsolePainter;
    use crate::engine::{EngineSettings, FixedAddress, Glyph, ManualClock, SimulatedTime};
    use chrono::NaiveTime;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;
    use std::time::Duration;

    fn engine() -> Engine {
        let settings = EngineSettings {
            framerate: 0.01,
            start_time: Some(SimulatedTime::new(8, 0).unwrap()),
            ..EngineSettings::default()
        };
        Engine::new(
            settings,
            Box::new(ManualClock::new(NaiveTime::MIN)),
            Box::new(FixedAddress("10.1.2.3".into())),
            StdRng::seed_from_u64(1),
        )
    }

    #[tokio::test]
    async fn test_commands_reach_frames() {
        let (handle, task) = spawn_engine(engine(), Box::new(ConsolePainter::new()));
        handle.command("/time", vec![json!(14), json!(30)]).await.unwrap();

        let mut frames = handle.frames();
        let frame = tokio::time::timeout(Duration::from_secs(2), async {
            loop {
                frames.changed().await.unwrap();
                let f = frames.borrow_and_update().clone();
                if let Some(f) = f {
                    let want = [Glyph::Digit(1), Glyph::Digit(4), Glyph::Digit(3), Glyph::Digit(0)];
                    if f.glyphs() == Some(want) {
                        return f;
                    }
                }
            }
        })
        .await
        .unwrap();
        assert_eq!(frame.brightness, 100.0);

        handle.shutdown().await;
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_rejections_are_logged_events() {
        let (handle, task) = spawn_engine(engine(), Box::new(ConsolePainter::new()));
        let mut events = handle.subscribe_events();

        let err = handle.command("time", vec![json!(25), json!(0)]).await.unwrap_err();
        assert!(matches!(err, RuntimeError::Rejected(EngineError::InvalidArgument(_))));

        let event = events.recv().await.unwrap();
        assert_eq!(event.command, "time");
        assert!(matches!(event.outcome, Outcome::Rejected { .. }));

        // status is a query and stays out of the log
        let reply = handle.command("status", vec![]).await.unwrap();
        assert!(matches!(reply, Reply::Status(_)));
        handle.command("normal", vec![]).await.unwrap();
        assert_eq!(events.recv().await.unwrap().command, "normal");

        handle.shutdown().await;
        task.await.unwrap();
    }

    #[tokio::test]
    async fn test_stopped_engine() {
        let (handle, task) = spawn_engine(engine(), Box::new(ConsolePainter::new()));
        handle.shutdown().await;
        task.await.unwrap();
        assert!(matches!(handle.command("normal", vec![]).await, Err(RuntimeError::Stopped)));
    }
}
