use super::purchase::{self, CONFIRMATION_QUESTION};
use super::session::{PurchaseState, SessionState};
use super::store::{EntitlementStore, PersistenceStore};
use crate::protocol::{
    DeliverMessage, Directive, Message, Request, RequestEnvelope, ResourceRequest,
    SessionDisposition, SkillResponse, StartApplication, StartConfiguration, StartData,
    Transformer, TransformerKind,
};
use anyhow::{Context, Result};
use chrono::Utc;
use std::sync::Arc;
use tracing::{error, info};

const INCOMPATIBLE_DEVICE_SPEECH: &str =
    "Unfortunately this game and this device are not compatible. \
     Please try again on a device with a screen.";

const GOODBYE_SPEECH: &str = "Goodbye!";

const APOLOGY_SPEECH: &str = "Sorry, there was an error. Please try again.";

/// How long the device keeps the game alive without interaction.
const START_TIMEOUT_SECONDS: u64 = 600;

/// Knobs the composer needs from configuration.
#[derive(Debug, Clone)]
pub struct SkillSettings {
    /// Where the hosting layer loads the game client from
    pub game_url: String,

    /// Seed text for the wake-word discovery hint
    pub hint: String,
}

/// Composes exactly one outbound directive set per recognized request.
///
/// One voice-platform turn runs one composer pass to completion; the
/// hosting platform serializes turns per session, so there is no
/// concurrent access to the same session state.
pub struct DirectiveComposer {
    persistence: Arc<dyn PersistenceStore>,
    entitlements: Arc<dyn EntitlementStore>,
    settings: SkillSettings,
}

impl DirectiveComposer {
    pub fn new(
        persistence: Arc<dyn PersistenceStore>,
        entitlements: Arc<dyn EntitlementStore>,
        settings: SkillSettings,
    ) -> Self {
        Self {
            persistence,
            entitlements,
            settings,
        }
    }

    /// Run one turn, catching any composition error.
    ///
    /// No error is fatal: a failed turn surfaces a generic apology with
    /// unspecified continuation, so the user can retry the same turn.
    pub async fn handle_turn(
        &self,
        envelope: &RequestEnvelope,
        session: &mut SessionState,
    ) -> SkillResponse {
        match self.dispatch(envelope, session).await {
            Ok(response) => response,
            Err(e) => {
                error!("Turn failed: {:#}", e);
                SkillResponse {
                    speech: Some(APOLOGY_SPEECH.to_string()),
                    directives: Vec::new(),
                    should_end_session: None,
                }
            }
        }
    }

    async fn dispatch(
        &self,
        envelope: &RequestEnvelope,
        session: &mut SessionState,
    ) -> Result<SkillResponse> {
        match &envelope.request {
            Request::Launch(_) => self.handle_launch(envelope, None).await,

            // returning from the commerce store behaves like a launch,
            // with the store's verdict passed along
            Request::ConnectionResponse(response) => {
                self.handle_launch(envelope, response.payload.purchase_result.clone())
                    .await
            }

            Request::Intent(intent_request) => {
                let name = intent_request.intent.name.as_str();

                if session.awaiting_purchase_confirmation() {
                    return Ok(purchase::handle_confirmation_intent(session, name));
                }

                // store guidelines require quitting on any stop intent;
                // cancel is a generic intent and passes through to the game
                if name.ends_with("StopIntent") {
                    return Ok(SkillResponse {
                        speech: Some(GOODBYE_SPEECH.to_string()),
                        directives: Vec::new(),
                        should_end_session: Some(true),
                    });
                }

                // game logic lives in the client; forward the request verbatim
                let mut message = Message::default();
                message.request = Some(envelope.request.to_raw());

                Ok(SkillResponse {
                    speech: None,
                    directives: vec![Directive::DeliverMessage(DeliverMessage {
                        message,
                        transformers: Vec::new(),
                    })],
                    should_end_session: None,
                })
            }

            // the client on device has already been torn down by now
            Request::SessionEnded(ended) => {
                info!("Session ended: {:?}", ended.reason);
                Ok(SkillResponse::empty())
            }

            Request::ClientMessage(client_message) => {
                self.process_client_message(envelope, &client_message.message, session)
                    .await
            }
        }
    }

    /// Launch (or relaunch after a store round-trip): collate save data and
    /// entitlements, then start the game client on the device.
    async fn handle_launch(
        &self,
        envelope: &RequestEnvelope,
        purchase_result: Option<String>,
    ) -> Result<SkillResponse> {
        // fast exit, this skill won't support devices without screens
        if !envelope.device.html {
            return Ok(SkillResponse {
                speech: Some(INCOMPATIBLE_DEVICE_SPEECH.to_string()),
                directives: Vec::new(),
                should_end_session: Some(true),
            });
        }

        // no ordering dependency between the two fetches
        let (persisted, catalog) = futures::join!(
            self.persistence.load(&envelope.player_id),
            self.entitlements.get_entitlements(&envelope.locale),
        );

        let persistent_data = persisted
            .context("Failed to load player data")?
            .unwrap_or_else(|| serde_json::json!({}));

        // entitlement failure is not worth blocking the launch over
        let entitlements = match catalog {
            Ok(products) => products,
            Err(e) => {
                error!(
                    "Failed to fetch entitlements, launching without them: {:#}",
                    e
                );
                Vec::new()
            }
        };

        let directive = Directive::StartApplication(StartApplication {
            data: StartData {
                persistent_data,
                entitlements,
                locale: envelope.locale.clone(),
                purchase_result,
                hint: self.settings.hint.clone(),
            },
            request: ResourceRequest {
                uri: self.settings.game_url.clone(),
                method: "GET".to_string(),
            },
            configuration: StartConfiguration {
                timeout_in_seconds: START_TIMEOUT_SECONDS,
            },
            transformers: vec![Transformer {
                input_path: "hint".to_string(),
                transformer: TransformerKind::TextToHint,
                output_name: None,
            }],
        });

        Ok(SkillResponse {
            speech: None,
            directives: vec![directive],
            should_end_session: None,
        })
    }

    /// Process one batched flush from the client.
    ///
    /// Every present key is decoded independently; many unrelated signals
    /// travel in the same frame.
    async fn process_client_message(
        &self,
        envelope: &RequestEnvelope,
        message: &Message,
        session: &mut SessionState,
    ) -> Result<SkillResponse> {
        let mut speech: Vec<String> = Vec::new();
        let mut disposition = SessionDisposition::Unspecified;
        let mut deliver: Option<DeliverMessage> = None;

        if let Some(sent_at) = message.time {
            // latency echo: speak out how stale the frame was on arrival
            let arrived_at = envelope
                .timestamp
                .unwrap_or_else(|| Utc::now().timestamp_millis());
            let lag = arrived_at.saturating_sub(sent_at);

            if lag > 1000 {
                speech.push(format!("sent {} seconds ago,", lag / 1000));
            } else {
                speech.push(format!("sent {} milliseconds ago,", lag));
            }
        }

        if let Some(text) = &message.speech {
            speech.push(text.clone());
        }

        if let Some(transform) = &message.transform {
            // answer each synthesis request with a transformer that maps
            // the entry's text to a fetchable url
            let transformers = transform
                .keys()
                .map(|key| Transformer {
                    input_path: format!("transformed.{}.text", key),
                    transformer: TransformerKind::SsmlToSpeech,
                    output_name: Some("url".to_string()),
                })
                .collect();

            let mut reply = Message::default();
            reply.transformed = Some(transform.clone());

            deliver = Some(DeliverMessage {
                message: reply,
                transformers,
            });
        }

        if message.end_session == Some(true) {
            disposition = SessionDisposition::End;
        } else if message.prompt == Some(true) {
            disposition = SessionDisposition::OpenMicrophone;
        }

        if let Some(data) = &message.persistent_data {
            // the invocation dies once the response is produced, so this
            // write has to finish here
            self.persistence
                .save(&envelope.player_id, data)
                .await
                .context("Failed to save player data")?;
        }

        let mut client_will_quit = disposition == SessionDisposition::End;

        if let Some(product_id) = &message.start_purchase {
            // a store connection cannot be launched from this request type,
            // so bounce the customer through a verbal confirmation first;
            // the client is torn down for speech purposes even though the
            // platform session stays nominally open for the answer
            speech.clear();
            speech.push(CONFIRMATION_QUESTION.to_string());
            client_will_quit = true;
            disposition = SessionDisposition::OpenMicrophone;
            session.purchase = PurchaseState::AwaitingConfirmation {
                product_id: product_id.clone(),
            };
        }

        let mut response = SkillResponse {
            speech: if speech.is_empty() {
                None
            } else {
                Some(speech.join(" "))
            },
            directives: Vec::new(),
            should_end_session: disposition.should_end_session(),
        };

        if let Some(deliver) = deliver {
            if client_will_quit {
                // directives cannot reach a torn-down client
                error!(
                    "Cannot deliver a message while quitting; dropping {:?}",
                    deliver.message
                );
            } else {
                response.directives.push(Directive::DeliverMessage(deliver));
            }
        }

        Ok(response)
    }
}
