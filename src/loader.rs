//! Process-wide cache of initialized translation pipelines, keyed by direction.
//!
//! Each direction owns a slot with an explicit load state. Initialization is
//! serialized per slot, so concurrent callers share a single run, and a
//! pipeline only becomes visible once every initialization stage succeeded.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{Mutex, RwLock};
use tracing::{error, info, warn};

use crate::direction::Direction;
use crate::error::{Result, BilingualError};
use crate::pipeline::{PipelineFactory, TranslationPipeline};

/// Shared handle to a ready pipeline
pub type PipelineHandle = Arc<dyn TranslationPipeline>;

/// Initialization stage, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadStage {
    Construct,
    SetupResources,
    LoadData,
    LoadModel,
}

impl fmt::Display for LoadStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Construct => "construction",
            Self::SetupResources => "resource setup",
            Self::LoadData => "data loading",
            Self::LoadModel => "model loading",
        };
        f.write_str(name)
    }
}

enum LoadState {
    Uninitialized,
    Initializing,
    Ready {
        pipeline: PipelineHandle,
        loaded_at: DateTime<Utc>,
    },
    Failed {
        stage: LoadStage,
        error: String,
        failed_at: DateTime<Utc>,
    },
}

/// Snapshot of a slot's state for reporting
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum LoadStatus {
    Uninitialized,
    Initializing,
    Ready {
        loaded_at: DateTime<Utc>,
    },
    Failed {
        stage: LoadStage,
        error: String,
        failed_at: DateTime<Utc>,
    },
}

impl LoadStatus {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready { .. })
    }
}

struct Slot {
    state: RwLock<LoadState>,
    init_lock: Mutex<()>,
}

impl Slot {
    fn new() -> Self {
        Self {
            state: RwLock::new(LoadState::Uninitialized),
            init_lock: Mutex::new(()),
        }
    }

    async fn ready(&self) -> Option<PipelineHandle> {
        match &*self.state.read().await {
            LoadState::Ready { pipeline, .. } => Some(Arc::clone(pipeline)),
            _ => None,
        }
    }
}

/// Puts a slot back to `Uninitialized` if the load driving it is dropped
/// before recording `Ready` or `Failed`.
struct InitializingGuard {
    slot: Arc<Slot>,
    direction: Direction,
    committed: bool,
}

impl InitializingGuard {
    fn new(slot: Arc<Slot>, direction: Direction) -> Self {
        Self { slot, direction, committed: false }
    }

    fn commit(mut self) {
        self.committed = true;
    }
}

impl Drop for InitializingGuard {
    fn drop(&mut self) {
        if self.committed {
            return;
        }

        warn!("Loading pipeline for {} was cancelled", self.direction);

        // Readers only hold the state lock briefly, so this rarely misses
        if let Ok(mut state) = self.slot.state.try_write() {
            if matches!(*state, LoadState::Initializing) {
                *state = LoadState::Uninitialized;
            }
            return;
        }

        let slot = Arc::clone(&self.slot);
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                // Holding the init lock means no load is in flight
                let _init = slot.init_lock.lock().await;
                let mut state = slot.state.write().await;
                if matches!(*state, LoadState::Initializing) {
                    *state = LoadState::Uninitialized;
                }
            });
        }
    }
}

pub struct PipelineLoader {
    factory: Arc<dyn PipelineFactory>,
    slots: HashMap<Direction, Arc<Slot>>,
}

impl PipelineLoader {
    pub fn new(factory: Arc<dyn PipelineFactory>) -> Self {
        let slots = Direction::ALL
            .iter()
            .map(|direction| (*direction, Arc::new(Slot::new())))
            .collect();

        Self { factory, slots }
    }

    fn slot(&self, direction: Direction) -> &Arc<Slot> {
        // Every direction gets a slot in `new`
        &self.slots[&direction]
    }

    /// Return the cached pipeline for `direction`, initializing it on first use.
    ///
    /// A failed initialization leaves no pipeline behind; the next call starts
    /// again from construction. Dropping the returned future mid-initialization
    /// leaves the slot `Uninitialized`.
    pub async fn load(&self, direction: Direction) -> Result<PipelineHandle> {
        let slot = self.slot(direction);

        if let Some(pipeline) = slot.ready().await {
            return Ok(pipeline);
        }

        let _guard = slot.init_lock.lock().await;

        // Another caller may have finished while we waited for the lock
        if let Some(pipeline) = slot.ready().await {
            return Ok(pipeline);
        }

        *slot.state.write().await = LoadState::Initializing;
        let initializing = InitializingGuard::new(Arc::clone(slot), direction);
        info!("Loading translation pipeline for {}", direction);
        let started = Instant::now();

        match self.initialize(direction).await {
            Ok(pipeline) => {
                info!("Pipeline for {} ready in {:.2}s", direction, started.elapsed().as_secs_f64());
                *slot.state.write().await = LoadState::Ready {
                    pipeline: Arc::clone(&pipeline),
                    loaded_at: Utc::now(),
                };
                initializing.commit();
                Ok(pipeline)
            }
            Err((stage, e)) => {
                error!("Pipeline for {} failed during {}: {}", direction, stage, e);
                let message = e.to_string();
                *slot.state.write().await = LoadState::Failed {
                    stage,
                    error: message.clone(),
                    failed_at: Utc::now(),
                };
                initializing.commit();
                Err(BilingualError::PipelineLoad { direction, stage, message })
            }
        }
    }

    async fn initialize(
        &self,
        direction: Direction,
    ) -> std::result::Result<PipelineHandle, (LoadStage, BilingualError)> {
        let mut pipeline = self
            .factory
            .create(direction)
            .map_err(|e| (LoadStage::Construct, e))?;

        pipeline
            .setup_resources()
            .await
            .map_err(|e| (LoadStage::SetupResources, e))?;
        pipeline
            .load_data()
            .await
            .map_err(|e| (LoadStage::LoadData, e))?;
        pipeline
            .load_model()
            .await
            .map_err(|e| (LoadStage::LoadModel, e))?;

        Ok(Arc::from(pipeline))
    }

    /// Current state of the slot for `direction`
    pub async fn status(&self, direction: Direction) -> LoadStatus {
        match &*self.slot(direction).state.read().await {
            LoadState::Uninitialized => LoadStatus::Uninitialized,
            LoadState::Initializing => LoadStatus::Initializing,
            LoadState::Ready { loaded_at, .. } => LoadStatus::Ready { loaded_at: *loaded_at },
            LoadState::Failed { stage, error, failed_at } => LoadStatus::Failed {
                stage: *stage,
                error: error.clone(),
                failed_at: *failed_at,
            },
        }
    }

    /// Status of every direction, in selector order
    pub async fn statuses(&self) -> Vec<(Direction, LoadStatus)> {
        let mut statuses = Vec::with_capacity(Direction::ALL.len());
        for direction in Direction::ALL {
            statuses.push((direction, self.status(direction).await));
        }
        statuses
    }

    /// Drop the cached pipeline so the next `load` re-initializes it.
    /// Handles already given out stay usable until dropped.
    pub async fn invalidate(&self, direction: Direction) {
        let slot = self.slot(direction);
        let _guard = slot.init_lock.lock().await;
        *slot.state.write().await = LoadState::Uninitialized;
        info!("Invalidated cached pipeline for {}", direction);
    }

    /// Invalidate and load again
    pub async fn reload(&self, direction: Direction) -> Result<PipelineHandle> {
        self.invalidate(direction).await;
        self.load(direction).await
    }
}
