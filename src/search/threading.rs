//! Threading primitives for root-parallel search.
//!
//! The root position's moves are spread over a bounded rayon pool. Workers
//! share nothing mutable except the atomics in [`SharedSearchState`].

use std::sync::{
    atomic::{AtomicBool, AtomicU64, Ordering},
    Arc,
};
use std::time::{Duration, Instant};

use rayon::{ThreadPool, ThreadPoolBuilder};

use crate::errors::{ChessError, ChessResult};

/// Search execution model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadingModel {
    /// Every root move searched in turn on the calling thread.
    SingleThreaded,
    /// Root moves distributed over a worker pool, one owned child each.
    RootSplit,
}

/// Threading configuration owned by the engine instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThreadingConfig {
    pub model: ThreadingModel,
    pub requested_threads: usize,
}

impl Default for ThreadingConfig {
    fn default() -> Self {
        Self {
            model: ThreadingModel::SingleThreaded,
            requested_threads: 1,
        }
    }
}

impl ThreadingConfig {
    pub fn root_split(threads: usize) -> Self {
        Self {
            model: ThreadingModel::RootSplit,
            requested_threads: threads,
        }
    }

    #[inline]
    pub fn normalized_threads(self) -> usize {
        self.requested_threads.max(1)
    }

    #[inline]
    pub fn is_parallel(self) -> bool {
        self.model == ThreadingModel::RootSplit && self.normalized_threads() > 1
    }

    /// A pool sized to this config, or `None` for single-threaded search.
    pub fn build_pool(self) -> ChessResult<Option<ThreadPool>> {
        if !self.is_parallel() {
            return Ok(None);
        }
        ThreadPoolBuilder::new()
            .num_threads(self.normalized_threads())
            .thread_name(|index| format!("amsel-search-{index}"))
            .build()
            .map(Some)
            .map_err(|e| ChessError::ThreadPool(e.to_string()))
    }
}

/// Node and time limits of one search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchLimits {
    pub node_budget: Option<u64>,
    pub time_budget_ms: Option<u64>,
}

/// Shared cancellation and accounting state for one search.
#[derive(Debug)]
pub struct SharedSearchState {
    stop: AtomicBool,
    nodes_visited: AtomicU64,
    node_budget: Option<u64>,
    started_at: Instant,
    deadline: Option<Instant>,
}

impl SharedSearchState {
    pub fn new(limits: SearchLimits) -> Arc<Self> {
        let started_at = Instant::now();
        Arc::new(Self {
            stop: AtomicBool::new(false),
            nodes_visited: AtomicU64::new(0),
            node_budget: limits.node_budget,
            started_at,
            deadline: limits
                .time_budget_ms
                .map(|ms| started_at + Duration::from_millis(ms)),
        })
    }

    pub fn unlimited() -> Arc<Self> {
        Self::new(SearchLimits::default())
    }

    #[inline]
    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    #[inline]
    pub fn should_stop(&self) -> bool {
        self.stop.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn nodes(&self) -> u64 {
        self.nodes_visited.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Counts one node and checks every budget. Returns false once the search
    /// has to stop; the stop flag then stays raised for all workers.
    #[inline]
    pub fn enter_node(&self) -> bool {
        if self.should_stop() {
            return false;
        }
        let visited = self.nodes_visited.fetch_add(1, Ordering::Relaxed) + 1;
        let over_nodes = self.node_budget.is_some_and(|budget| visited > budget);
        let over_time = self.deadline.is_some_and(|deadline| Instant::now() >= deadline);
        if over_nodes || over_time {
            self.request_stop();
            return false;
        }
        true
    }
}
