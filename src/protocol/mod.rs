//! Wire model shared by both halves of the bridge
//!
//! This module defines:
//! - `Message`, the multiplexed frame exchanged between the game client and
//!   the skill backend (any subset of keys may co-occur in one frame)
//! - the voice-platform request envelope the backend is invoked with
//! - the directives the backend hands back to the hosting layer

mod directive;
mod envelope;
mod message;

pub use directive::{
    ConnectionRequest, DeliverMessage, Directive, Product, ProductRef, PurchasePayload,
    ResourceRequest, SessionDisposition, SkillResponse, StartApplication, StartConfiguration,
    StartData, Transformer, TransformerKind,
};
pub use envelope::{
    ClientMessageRequest, ConnectionResponse, ConnectionResult, DeviceCapabilities, Intent,
    IntentRequest, LaunchRequest, Request, RequestEnvelope, ResolutionAuthority, Resolutions,
    ResolvedName, SessionEndedRequest, Slot, SlotValue,
};
pub use message::{Message, TransformEntry};
