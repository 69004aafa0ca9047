pub mod backend;
pub mod channel;
pub mod client;
pub mod config;
pub mod http;
pub mod nlu;
pub mod protocol;

pub use backend::{
    DirectiveComposer, MemoryPersistence, PurchaseState, SessionState, SkillSettings,
    StaticCatalog,
};
pub use channel::{DeliveryStatus, MessageChannel, NatsChannel};
pub use client::{ClientEvent, ClientHost, EventBus, InboundRouter, Outbox, PersistentData};
pub use config::Config;
pub use http::{create_router, AppState};
pub use protocol::{Directive, Message, Request, RequestEnvelope, SkillResponse};
