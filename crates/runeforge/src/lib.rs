//! # RUNEFORGE
//!
//! Host-facing integration for the enchanting engine.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                        RUNEFORGE                             │
//! ├──────────────────────────────────────────────────────────────┤
//! │                                                              │
//! │  ┌──────────────────┐     ┌──────────────┐     ┌──────────┐  │
//! │  │ runeforge_       │────>│   events     │────>│  host    │  │
//! │  │ enchanting       │     │  (channels)  │     │ adapter  │  │
//! │  │  • catalog       │     └──────────────┘     └──────────┘  │
//! │  │  • power scan    │                                        │
//! │  │  • selection     │     ┌──────────────┐                   │
//! │  │  • store         │<────│     sim      │ (enchant_sim)     │
//! │  └──────────────────┘     └──────────────┘                   │
//! │                                                              │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - `events`: bounded channels carrying engine and host events
//! - `sim`: offline roll simulation behind the `enchant_sim` binary

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod events;
pub mod sim;

pub use runeforge_enchanting as enchanting;
pub use runeforge_shared as shared;

pub use events::{EventBus, EventReceiver, EventSender, ForgeEvent};
pub use sim::{Simulation, SimulationReport};
