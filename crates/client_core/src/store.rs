//! Session store: the single authoritative UI state.
//!
//! Every action takes the write lock once, mutates, releases, then bumps the
//! watch revision. Readers clone a [`SessionSnapshot`]; nets sit behind an
//! `Arc` so snapshots stay cheap.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use lwv_shared::{
    domain::{NetsRevision, PrimitiveId, SelectionEpoch},
    geometry::Net,
    protocol::{Settings, SettingsPatch, VariationStats},
};
use tokio::sync::watch;
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionSnapshot {
    pub nets: Arc<Vec<Net>>,
    /// Bumped on every net replacement; drives view re-fitting.
    pub nets_revision: NetsRevision,
    pub selected: Option<PrimitiveId>,
    /// Bumped whenever stats for the current selection become stale.
    pub selection_epoch: SelectionEpoch,
    pub settings: Settings,
    pub stats: Option<VariationStats>,
    pub loading: bool,
}

/// What happens to the selection when nets are replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionPolicy {
    Clear,
    Keep,
}

/// Proof that a stats fetch was issued for a given selection. Only the store
/// hands these out, and only a ticket that still matches the current
/// selection can write stats.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsTicket {
    primitive_id: PrimitiveId,
    epoch: SelectionEpoch,
}

impl StatsTicket {
    pub fn primitive_id(&self) -> &PrimitiveId {
        &self.primitive_id
    }

    pub fn epoch(&self) -> SelectionEpoch {
        self.epoch
    }
}

#[derive(Clone)]
pub struct SessionStore {
    state: Arc<RwLock<SessionSnapshot>>,
    revision: Arc<watch::Sender<u64>>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("revision", &*self.revision.borrow())
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    pub fn new(settings: Settings) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            state: Arc::new(RwLock::new(SessionSnapshot {
                settings,
                ..SessionSnapshot::default()
            })),
            revision: Arc::new(revision),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, SessionSnapshot> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionSnapshot> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn notify(&self) {
        self.revision.send_modify(|revision| *revision = revision.wrapping_add(1));
    }

    /// Receiver that observes a new value after every applied action.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.read().clone()
    }

    pub fn settings(&self) -> Settings {
        self.read().settings
    }

    pub fn selected(&self) -> Option<PrimitiveId> {
        self.read().selected.clone()
    }

    pub fn nets_revision(&self) -> NetsRevision {
        self.read().nets_revision
    }

    /// Replaces the whole net collection. Stats are always invalidated.
    pub fn replace_nets(&self, nets: Vec<Net>, policy: SelectionPolicy) {
        {
            let mut state = self.write();
            state.nets = Arc::new(nets);
            state.nets_revision = state.nets_revision.next();
            state.selection_epoch = state.selection_epoch.next();
            state.stats = None;
            if policy == SelectionPolicy::Clear {
                state.selected = None;
            }
            debug!(
                nets = state.nets.len(),
                revision = state.nets_revision.0,
                "store: nets replaced"
            );
        }
        self.notify();
    }

    /// Changes the selection and clears stats in the same step. Returns a
    /// ticket for fetching the new selection's stats, or `None` when nothing
    /// is selected or the selection did not change.
    pub fn select_primitive(&self, id: Option<PrimitiveId>) -> Option<StatsTicket> {
        let ticket = {
            let mut state = self.write();
            if state.selected == id {
                return None;
            }
            state.selected = id;
            state.selection_epoch = state.selection_epoch.next();
            state.stats = None;
            state.selected.clone().map(|primitive_id| StatsTicket {
                primitive_id,
                epoch: state.selection_epoch,
            })
        };
        self.notify();
        ticket
    }

    /// Ticket for the current selection without changing it.
    pub fn stats_ticket(&self) -> Option<StatsTicket> {
        let state = self.read();
        state.selected.clone().map(|primitive_id| StatsTicket {
            primitive_id,
            epoch: state.selection_epoch,
        })
    }

    pub fn is_current(&self, ticket: &StatsTicket) -> bool {
        let state = self.read();
        state.selection_epoch == ticket.epoch
            && state.selected.as_ref() == Some(&ticket.primitive_id)
    }

    pub fn update_settings(&self, patch: &SettingsPatch) -> Settings {
        let settings = {
            let mut state = self.write();
            state.settings = state.settings.merged(patch);
            state.settings
        };
        self.notify();
        settings
    }

    /// Stores stats fetched under `ticket`. A stale ticket leaves the store
    /// untouched and returns `false`.
    pub fn set_stats(&self, ticket: &StatsTicket, stats: Option<VariationStats>) -> bool {
        {
            let mut state = self.write();
            let current = state.selection_epoch == ticket.epoch
                && state.selected.as_ref() == Some(&ticket.primitive_id);
            if !current {
                return false;
            }
            state.stats = stats;
        }
        self.notify();
        true
    }

    pub fn clear_stats(&self) {
        self.write().stats = None;
        self.notify();
    }

    pub fn set_loading(&self, loading: bool) {
        {
            let mut state = self.write();
            if state.loading == loading {
                return;
            }
            state.loading = loading;
        }
        self.notify();
    }
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
