//! Off-thread gameloop with copy-in, copy-out semantics.
//!
//! The worker receives a full JSON snapshot, runs the ticks on its own copy
//! and sends the resulting snapshot back. The live store is never touched
//! from the worker thread; [`worker_merge`] applies a result only if the
//! store has not moved on since the snapshot was taken.

use super::config::GameloopOptions;
use super::game_state::{GameState, Notification};
use super::store::GameStore;
use super::tick::{advance_rng, gameloop_run_ticks};
use crate::content::ContentRegistry;
use crate::error::{GameError, Result};
use serde::{Deserialize, Serialize};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkerRequest {
    GameloopTick {
        game_state: GameState,
        total_ticks: u64,
        options: GameloopOptions,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkerResponse {
    GameloopResult {
        game_state: GameState,
        /// Tick counter of the snapshot the run started from.
        base_tick: u64,
        notifications: Vec<Notification>,
    },
    GameloopError {
        message: String,
    },
}

/// Handles one serialized request and produces a serialized response.
/// Malformed input becomes a `GAMELOOP_ERROR` response rather than a panic.
pub fn worker_handle(request: &str, content: &ContentRegistry) -> String {
    let response = match serde_json::from_str::<WorkerRequest>(request) {
        Ok(WorkerRequest::GameloopTick {
            mut game_state,
            total_ticks,
            options,
        }) => {
            if options.paused || !game_state.meta.is_setup {
                WorkerResponse::GameloopError {
                    message: "gameloop is paused or the game is not set up".to_string(),
                }
            } else {
                let base_tick = game_state.now();
                let mut rng = advance_rng(&game_state.meta.game_id, base_tick);
                gameloop_run_ticks(&mut game_state, content, total_ticks, &mut rng);
                let notifications = game_state.drain_notifications();
                WorkerResponse::GameloopResult {
                    game_state,
                    base_tick,
                    notifications,
                }
            }
        }
        Err(e) => WorkerResponse::GameloopError {
            message: format!("bad request: {e}"),
        },
    };
    serde_json::to_string(&response).unwrap_or_else(|e| {
        tracing::error!("could not serialize worker response: {e}");
        format!(r#"{{"type":"GAMELOOP_ERROR","payload":{{"message":"{e}"}}}}"#)
    })
}

/// A background thread answering [`WorkerRequest`]s in order.
pub struct GameloopWorker {
    requests: Option<Sender<String>>,
    responses: Receiver<String>,
    handle: Option<JoinHandle<()>>,
}

impl GameloopWorker {
    pub fn spawn(content: Arc<ContentRegistry>) -> Self {
        let (request_tx, request_rx) = mpsc::channel::<String>();
        let (response_tx, response_rx) = mpsc::channel::<String>();
        let handle = thread::spawn(move || {
            for request in request_rx {
                let response = worker_handle(&request, &content);
                if response_tx.send(response).is_err() {
                    break;
                }
            }
            tracing::debug!("gameloop worker stopped");
        });
        Self {
            requests: Some(request_tx),
            responses: response_rx,
            handle: Some(handle),
        }
    }

    /// Sends a deep copy of `state` to the worker.
    pub fn submit(&self, state: &GameState, total_ticks: u64, options: &GameloopOptions) -> Result<()> {
        let request = WorkerRequest::GameloopTick {
            game_state: state.clone(),
            total_ticks,
            options: options.clone(),
        };
        let json = serde_json::to_string(&request)?;
        self.requests
            .as_ref()
            .ok_or_else(|| GameError::Worker("worker is shut down".to_string()))?
            .send(json)
            .map_err(|_| GameError::Worker("worker thread is gone".to_string()))
    }

    /// Blocks until the next response arrives.
    pub fn receive(&self) -> Result<WorkerResponse> {
        let json = self
            .responses
            .recv()
            .map_err(|_| GameError::Worker("worker thread is gone".to_string()))?;
        Ok(serde_json::from_str(&json)?)
    }

    /// The next response if one is ready.
    pub fn try_receive(&self) -> Result<Option<WorkerResponse>> {
        match self.responses.try_recv() {
            Ok(json) => Ok(Some(serde_json::from_str(&json)?)),
            Err(mpsc::TryRecvError::Empty) => Ok(None),
            Err(mpsc::TryRecvError::Disconnected) => {
                Err(GameError::Worker("worker thread is gone".to_string()))
            }
        }
    }
}

impl Drop for GameloopWorker {
    fn drop(&mut self) {
        self.requests.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::error!("gameloop worker panicked");
            }
        }
    }
}

/// Applies a worker result to the store. Returns false for a stale result,
/// one computed from a snapshot the store has since moved past.
pub fn worker_merge(store: &mut GameStore, response: WorkerResponse) -> Result<bool> {
    match response {
        WorkerResponse::GameloopResult {
            mut game_state,
            base_tick,
            notifications,
        } => {
            if store.get().now() != base_tick {
                tracing::warn!(
                    "discarding worker result from tick {base_tick}, store is at {}",
                    store.get().now()
                );
                return Ok(false);
            }
            // Messages queued in the store while the worker ran stay first.
            game_state.notifications = store.get().notifications.clone();
            for notification in notifications {
                game_state.notify(notification.kind, notification.message);
            }
            store.replace(game_state);
            Ok(true)
        }
        WorkerResponse::GameloopError { message } => Err(GameError::Worker(message)),
    }
}
