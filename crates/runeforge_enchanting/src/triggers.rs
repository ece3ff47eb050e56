//! # Trigger Dispatch
//!
//! Host events are classified into a closed set of [`TriggerKind`]s and
//! routed to handlers registered per (kind, enchantment id).
//!
//! ```text
//! HostEvent ──classify──> TriggerKind ──┬─> handler(kind, "lifesteal")  if stored
//!                                       └─> handler(kind, "thorns")     if stored
//! ```
//!
//! Handlers run in registration order, and only for enchantments present
//! in the decoded set passed to [`TriggerDispatcher::dispatch`].

use std::collections::BTreeMap;
use std::sync::Arc;

use runeforge_shared::events::{HostEvent, HostEventType};

use crate::catalog::EnchantmentCatalog;
use crate::error::EffectError;
use crate::session::SessionStore;

/// When an enchantment reacts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TriggerKind {
    /// Holder struck something.
    OnHit,
    /// Holder killed something.
    OnKill,
    /// Holder took damage.
    OnDamaged,
    /// Periodic, while equipped.
    Passive,
}

impl TriggerKind {
    /// Classifies a host event.
    #[must_use]
    pub const fn from_event(event: &HostEvent) -> Self {
        match event.event_type() {
            HostEventType::EntityHit => Self::OnHit,
            HostEventType::EntityKilled => Self::OnKill,
            HostEventType::EntityDamaged => Self::OnDamaged,
            HostEventType::Tick => Self::Passive,
        }
    }
}

/// What a handler sees.
pub struct TriggerContext<'a> {
    /// The host event.
    pub event: &'a HostEvent,
    /// Enchantment id the handler was registered for.
    pub id: &'a str,
    /// Stored level on the holder's item.
    pub level: u32,
    /// Per-entity session state.
    pub sessions: &'a SessionStore,
}

type Handler = Box<dyn Fn(&TriggerContext<'_>) + Send + Sync>;

struct Registration {
    kind: TriggerKind,
    id: String,
    handler: Handler,
}

/// Routes host events to enchantment handlers.
pub struct TriggerDispatcher {
    catalog: Arc<EnchantmentCatalog>,
    sessions: Arc<SessionStore>,
    handlers: Vec<Registration>,
}

impl TriggerDispatcher {
    /// Creates a dispatcher with no handlers.
    #[must_use]
    pub fn new(catalog: Arc<EnchantmentCatalog>, sessions: Arc<SessionStore>) -> Self {
        Self {
            catalog,
            sessions,
            handlers: Vec::new(),
        }
    }

    /// Registers a handler.
    ///
    /// # Errors
    ///
    /// [`EffectError::UnknownEnchantment`] if `id` is not in the catalog.
    pub fn register<F>(&mut self, kind: TriggerKind, id: impl Into<String>, handler: F) -> Result<(), EffectError>
    where
        F: Fn(&TriggerContext<'_>) + Send + Sync + 'static,
    {
        let id = id.into();
        if !self.catalog.contains(&id) {
            return Err(EffectError::UnknownEnchantment(id));
        }
        self.handlers.push(Registration {
            kind,
            id,
            handler: Box::new(handler),
        });
        Ok(())
    }

    /// Runs every handler matching the event kind whose enchantment is in
    /// `decoded`. Returns how many ran.
    pub fn dispatch(&self, event: &HostEvent, decoded: &BTreeMap<String, u32>) -> usize {
        let kind = TriggerKind::from_event(event);
        let mut ran = 0;
        for registration in self.handlers.iter().filter(|r| r.kind == kind) {
            let Some(&level) = decoded.get(&registration.id) else {
                continue;
            };
            let context = TriggerContext {
                event,
                id: &registration.id,
                level,
                sessions: &self.sessions,
            };
            (registration.handler)(&context);
            ran += 1;
        }
        if ran > 0 {
            tracing::debug!(?kind, holder = event.holder(), ran, "trigger handlers dispatched");
        }
        ran
    }

    /// Session store shared with handlers.
    #[must_use]
    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    /// Number of registered handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// True if no handlers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
