//! Host combat/interaction events.
//!
//! The host translates its own listener callbacks into these events and
//! hands them to the engine's trigger dispatcher. The engine never
//! subscribes to host callbacks directly.

use serde::{Deserialize, Serialize};

/// Identity of a living entity in the host world.
pub type EntityId = u64;

/// Event type discriminator
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HostEventType {
    /// An entity struck another entity
    EntityHit = 0,
    /// An entity killed another entity
    EntityKilled = 1,
    /// An entity took damage
    EntityDamaged = 2,
    /// Periodic server tick for passive effects
    Tick = 3,
}

/// Events raised by the host that may trigger enchantment effects.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum HostEvent {
    /// An attacker struck a target
    EntityHit {
        /// Attacking entity (the one wielding the enchanted item)
        attacker: EntityId,
        /// Entity that was struck
        target: EntityId,
        /// Raw damage before enchantment effects
        damage: f64,
        /// Server tick
        tick: u64,
    },

    /// An attacker killed a target
    EntityKilled {
        /// Killing entity
        killer: EntityId,
        /// Entity that died
        victim: EntityId,
        /// Server tick
        tick: u64,
    },

    /// An entity took damage from some source
    EntityDamaged {
        /// Entity that took damage (the one wearing the enchanted item)
        victim: EntityId,
        /// Damaging entity (None = environment)
        source: Option<EntityId>,
        /// Raw damage before reductions
        damage: f64,
        /// Server tick
        tick: u64,
    },

    /// Periodic tick for an equipped entity
    Tick {
        /// Entity being ticked
        entity: EntityId,
        /// Server tick
        tick: u64,
    },
}

impl HostEvent {
    /// Returns the event type
    #[must_use]
    pub const fn event_type(&self) -> HostEventType {
        match self {
            Self::EntityHit { .. } => HostEventType::EntityHit,
            Self::EntityKilled { .. } => HostEventType::EntityKilled,
            Self::EntityDamaged { .. } => HostEventType::EntityDamaged,
            Self::Tick { .. } => HostEventType::Tick,
        }
    }

    /// The entity whose equipment reacts to this event.
    #[must_use]
    pub const fn holder(&self) -> EntityId {
        match self {
            Self::EntityHit { attacker, .. } => *attacker,
            Self::EntityKilled { killer, .. } => *killer,
            Self::EntityDamaged { victim, .. } => *victim,
            Self::Tick { entity, .. } => *entity,
        }
    }

    /// Server tick at which the event happened.
    #[must_use]
    pub const fn tick(&self) -> u64 {
        match self {
            Self::EntityHit { tick, .. }
            | Self::EntityKilled { tick, .. }
            | Self::EntityDamaged { tick, .. }
            | Self::Tick { tick, .. } => *tick,
        }
    }

    /// Raw damage carried by the event (0 for non-damage events).
    #[must_use]
    pub const fn damage(&self) -> f64 {
        match self {
            Self::EntityHit { damage, .. } | Self::EntityDamaged { damage, .. } => *damage,
            Self::EntityKilled { .. } | Self::Tick { .. } => 0.0,
        }
    }
}
