use super::message::Message;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A backend-issued instruction consumed by the client-hosting layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Directive {
    /// Launch the game client on the device
    StartApplication(StartApplication),

    /// Deliver a message frame to the running client
    DeliverMessage(DeliverMessage),

    /// Hand the session over to the commerce store
    ConnectionRequest(ConnectionRequest),
}

/// Launch directive carrying everything the client needs at start-up.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartApplication {
    pub data: StartData,
    pub request: ResourceRequest,
    pub configuration: StartConfiguration,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub transformers: Vec<Transformer>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartData {
    /// The player's save data, loaded from durable storage
    pub persistent_data: Value,

    /// Current commerce catalog with per-product entitlement flags
    pub entitlements: Vec<Product>,

    pub locale: String,

    /// Present when this launch is a return from the commerce store
    #[serde(skip_serializing_if = "Option::is_none")]
    pub purchase_result: Option<String>,

    /// Seed text for wake-word discovery; a text-to-hint transformer
    /// rewrites it before delivery
    pub hint: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceRequest {
    pub uri: String,
    pub method: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartConfiguration {
    pub timeout_in_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeliverMessage {
    pub message: Message,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub transformers: Vec<Transformer>,
}

/// Request to open the commerce store purchase flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionRequest {
    pub name: String,
    pub payload: PurchasePayload,
    /// Correlates the eventual connection-response turn with this request
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchasePayload {
    pub product: ProductRef,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRef {
    pub product_id: String,
}

impl ConnectionRequest {
    /// A "Buy" request for one product, with a fresh correlation token.
    pub fn buy(product_id: String) -> Self {
        Self {
            name: "Buy".to_string(),
            payload: PurchasePayload {
                product: ProductRef { product_id },
            },
            token: uuid::Uuid::new_v4().to_string(),
        }
    }
}

/// One transformation applied by the platform while delivering a directive.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transformer {
    /// Dotted path to the input text inside the directive payload
    pub input_path: String,

    pub transformer: TransformerKind,

    /// Name of the output field written next to the input, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TransformerKind {
    /// Rewrite text into a spoken-hint phrase, e.g. `Try "<wake word>, hello"`
    TextToHint,

    /// Synthesize speech audio and publish a fetchable url for it
    SsmlToSpeech,
}

/// One commerce catalog product.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub product_id: String,
    pub name: String,
    /// Whether this player currently owns the product
    pub entitled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

/// What the backend wants to happen to the session after this turn.
///
/// `Unspecified` defers to the platform default (session stays up, mic
/// closed); the platform's actual default should be confirmed per target,
/// the wire form simply omits the flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionDisposition {
    /// Terminate the session
    End,
    /// Keep the session and open the microphone
    OpenMicrophone,
    /// Neither forced end nor forced open
    #[default]
    Unspecified,
}

impl SessionDisposition {
    pub fn should_end_session(self) -> Option<bool> {
        match self {
            SessionDisposition::End => Some(true),
            SessionDisposition::OpenMicrophone => Some(false),
            SessionDisposition::Unspecified => None,
        }
    }
}

/// The composed outcome of one backend turn.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SkillResponse {
    /// Text spoken through the platform's native audio path
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speech: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub directives: Vec<Directive>,

    /// `None` leaves session continuation to the platform default
    #[serde(skip_serializing_if = "Option::is_none")]
    pub should_end_session: Option<bool>,
}

impl SkillResponse {
    pub fn empty() -> Self {
        Self::default()
    }
}
