//! # Update Scheduler
//!
//! Spreads the re-meshing that follows a re-center over several frames.
//!
//! A re-center produces two lists: chunks on the leading plane ("new") and
//! chunks right behind it ("surrounding"). Each frame the area does at most one
//! thing: mesh one batch of surrounding chunks, else one batch of new chunks,
//! else look for a chunk boundary crossing. The scheduler is the explicit
//! state machine behind that rule.
//!
//! ## Batching
//!
//! A list of `len` entries is drained in `ceil(len / CHUNK_UPDATES_PER_FRAME)`
//! batches. Batches count down: batch `k` covers list indices
//! `[3(k - 1), min(3k, len))`, so the last entries are meshed first.

use std::ops::Range;

use log::debug;

/// Maximum number of chunk meshes rebuilt per frame while draining.
pub const CHUNK_UPDATES_PER_FRAME: usize = 3;

/// Which update list a batch is drawn from.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum UpdateList {
    /// Chunks whose neighborhood changed
    Surrounding,
    /// Chunks that received fresh terrain
    New,
}

/// What the area should do this frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FrameWork {
    /// Re-mesh the entries of `list` within `batch_range(batch, len)`.
    Remesh {
        /// The list to drain
        list: UpdateList,
        /// Batch number, counting down to 1
        batch: usize,
    },
    /// No pending meshing; check whether the viewer changed chunks.
    DetectCrossing,
}

/// The scheduler state.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum SchedulerState {
    /// Nothing pending.
    #[default]
    Idle,
    /// Draining the surrounding list; the new list follows.
    DrainingSurrounding {
        /// Surrounding batches left, including the current one
        remaining: usize,
        /// Batches of the new list to drain afterwards
        new_batches: usize,
    },
    /// Draining the new list.
    DrainingNew {
        /// New batches left, including the current one
        remaining: usize,
    },
}

/// Number of batches needed to drain a list of `len` entries.
pub fn batch_count(len: usize) -> usize {
    len.div_ceil(CHUNK_UPDATES_PER_FRAME)
}

/// List indices covered by batch `batch` of a list of `len` entries.
pub fn batch_range(batch: usize, len: usize) -> Range<usize> {
    debug_assert!(batch >= 1, "batches are numbered from 1");
    let start = (CHUNK_UPDATES_PER_FRAME * (batch - 1)).min(len);
    let end = (CHUNK_UPDATES_PER_FRAME * batch).min(len);
    start..end
}

impl SchedulerState {
    /// The state right after a re-center produced lists of the given lengths.
    pub fn armed(new_len: usize, surrounding_len: usize) -> Self {
        let new_batches = batch_count(new_len);
        let surrounding_batches = batch_count(surrounding_len);

        if surrounding_batches > 0 {
            SchedulerState::DrainingSurrounding {
                remaining: surrounding_batches,
                new_batches,
            }
        } else if new_batches > 0 {
            SchedulerState::DrainingNew {
                remaining: new_batches,
            }
        } else {
            SchedulerState::Idle
        }
    }

    /// Pure transition: the work for this frame and the following state.
    pub fn transition(self) -> (FrameWork, SchedulerState) {
        match self {
            SchedulerState::Idle => (FrameWork::DetectCrossing, SchedulerState::Idle),
            SchedulerState::DrainingSurrounding {
                remaining,
                new_batches,
            } => {
                let next = if remaining > 1 {
                    SchedulerState::DrainingSurrounding {
                        remaining: remaining - 1,
                        new_batches,
                    }
                } else if new_batches > 0 {
                    SchedulerState::DrainingNew {
                        remaining: new_batches,
                    }
                } else {
                    SchedulerState::Idle
                };
                (
                    FrameWork::Remesh {
                        list: UpdateList::Surrounding,
                        batch: remaining,
                    },
                    next,
                )
            }
            SchedulerState::DrainingNew { remaining } => {
                let next = if remaining > 1 {
                    SchedulerState::DrainingNew {
                        remaining: remaining - 1,
                    }
                } else {
                    SchedulerState::Idle
                };
                (
                    FrameWork::Remesh {
                        list: UpdateList::New,
                        batch: remaining,
                    },
                    next,
                )
            }
        }
    }

    /// Whether no meshing is pending.
    pub fn is_idle(&self) -> bool {
        matches!(self, SchedulerState::Idle)
    }
}

/// Owns the scheduler state and logs phase changes.
#[derive(Debug, Default)]
pub struct UpdateScheduler {
    state: SchedulerState,
}

impl UpdateScheduler {
    /// Current state.
    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Arms the scheduler after a re-center.
    pub fn arm(&mut self, new_len: usize, surrounding_len: usize) {
        self.state = SchedulerState::armed(new_len, surrounding_len);
        debug!(
            "Scheduler armed with {} new and {} surrounding chunks: {:?}",
            new_len, surrounding_len, self.state
        );
    }

    /// Returns the work for this frame and advances the state.
    pub fn advance(&mut self) -> FrameWork {
        let (work, next) = self.state.transition();
        if std::mem::discriminant(&next) != std::mem::discriminant(&self.state) {
            debug!("Scheduler phase {:?} -> {:?}", self.state, next);
        }
        self.state = next;
        work
    }

    /// Drops any pending meshing.
    pub fn reset(&mut self) {
        self.state = SchedulerState::Idle;
    }
}
