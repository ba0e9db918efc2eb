//! Test doubles shared by fetch and run tests.

use crate::coord::TileCoord;
use crate::provider::{ProviderError, TileSource};
use crate::store::{StoreError, TileStore};
use std::collections::{HashMap, VecDeque};
use std::io;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// One scripted reply from [`ScriptedSource`].
#[derive(Debug, Clone)]
pub enum Reply {
    Body(Vec<u8>),
    Error(ProviderError),
    /// Never completes; only the fetch timeout ends the attempt.
    Hang,
    /// Completes after the given delay.
    Delayed(Duration, Vec<u8>),
}

impl Reply {
    pub fn server_error() -> Self {
        Reply::Error(ProviderError::HttpStatus {
            status: 500,
            url: "https://tiles.test".to_string(),
        })
    }

    pub fn not_found() -> Self {
        Reply::Error(ProviderError::NotFound {
            url: "https://tiles.test".to_string(),
        })
    }
}

/// Tile source that plays back a script, then repeats a fallback reply.
#[derive(Debug)]
pub struct ScriptedSource {
    script: Mutex<VecDeque<Reply>>,
    fallback: Reply,
    calls: AtomicUsize,
    requested: Mutex<Vec<TileCoord>>,
}

impl ScriptedSource {
    pub fn new(script: Vec<Reply>, fallback: Reply) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback,
            calls: AtomicUsize::new(0),
            requested: Mutex::new(Vec::new()),
        }
    }

    /// Always answers with a small body.
    pub fn ok() -> Self {
        Self::new(Vec::new(), Reply::Body(b"tile".to_vec()))
    }

    pub fn always(reply: Reply) -> Self {
        Self::new(Vec::new(), reply)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requested(&self) -> Vec<TileCoord> {
        self.requested.lock().unwrap().clone()
    }

    fn next_reply(&self) -> Reply {
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone())
    }
}

impl TileSource for ScriptedSource {
    async fn fetch(&self, tile: TileCoord) -> Result<Vec<u8>, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requested.lock().unwrap().push(tile);
        match self.next_reply() {
            Reply::Body(body) => Ok(body),
            Reply::Error(e) => Err(e),
            Reply::Hang => std::future::pending().await,
            Reply::Delayed(delay, body) => {
                tokio::time::sleep(delay).await;
                Ok(body)
            }
        }
    }

    fn name(&self) -> &str {
        "Scripted"
    }

    fn url_template(&self) -> &str {
        "https://tiles.test/{z}/{x}/{y}.png"
    }
}

/// In-memory tile store. Avoids real file IO so paused-clock tests stay
/// deterministic.
#[derive(Debug, Default)]
pub struct MemoryTileStore {
    tiles: Mutex<HashMap<TileCoord, Vec<u8>>>,
    failing_writes: AtomicU32,
    writes: AtomicUsize,
}

impl MemoryTileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `count` writes fail.
    pub fn fail_next_writes(self, count: u32) -> Self {
        self.failing_writes.store(count, Ordering::SeqCst);
        self
    }

    pub fn with_tile(self, tile: TileCoord, data: &[u8]) -> Self {
        self.tiles.lock().unwrap().insert(tile, data.to_vec());
        self
    }

    pub fn get(&self, tile: TileCoord) -> Option<Vec<u8>> {
        self.tiles.lock().unwrap().get(&tile).cloned()
    }

    pub fn len(&self) -> usize {
        self.tiles.lock().unwrap().len()
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl TileStore for MemoryTileStore {
    async fn exists(&self, tile: TileCoord) -> bool {
        self.tiles.lock().unwrap().contains_key(&tile)
    }

    async fn write(&self, tile: TileCoord, data: &[u8]) -> Result<(), StoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let remaining = self.failing_writes.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failing_writes.store(remaining - 1, Ordering::SeqCst);
            return Err(StoreError::io(
                format!("memory/{}", tile),
                io::Error::new(io::ErrorKind::Other, "disk full"),
            ));
        }
        self.tiles.lock().unwrap().insert(tile, data.to_vec());
        Ok(())
    }

    fn layout_descriptor(&self) -> String {
        "memory/{z}/{x}/{y}".to_string()
    }
}
