//! Skill-backend half of the bridge
//!
//! This module turns voice-platform requests into client directives:
//! - `composer` builds exactly one directive set per recognized request
//! - `purchase` owns the two-turn purchase-confirmation handshake
//! - `session` holds the per-session state the handshake spans
//! - `store` defines the persistence and commerce collaborators

mod composer;
mod purchase;
mod session;
mod store;

pub use composer::{DirectiveComposer, SkillSettings};
pub use purchase::{handle_confirmation_intent, CONFIRMATION_QUESTION};
pub use session::{PurchaseState, SessionState};
pub use store::{EntitlementStore, MemoryPersistence, PersistenceStore, StaticCatalog};
