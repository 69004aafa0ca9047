use super::session::{PurchaseState, SessionState};
use crate::protocol::{ConnectionRequest, Directive, SkillResponse};
use tracing::info;

/// Asked when a client message requests a purchase; answered on the next turn.
pub const CONFIRMATION_QUESTION: &str = "Would you like to open the store?";

const CONFIRMATION_REPROMPT: &str = "I didn't get that. Do you want to open the store?";

/// How an intent answers the pending confirmation question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Confirmation {
    Affirmative,
    Negative,
    Unrecognized,
}

/// Classify by intent-name suffix so platform prefixes don't leak in here.
fn classify(intent_name: &str) -> Confirmation {
    if intent_name.ends_with("YesIntent") {
        Confirmation::Affirmative
    } else if intent_name.ends_with("NoIntent") || intent_name.ends_with("CancelIntent") {
        Confirmation::Negative
    } else {
        Confirmation::Unrecognized
    }
}

/// Handle the intent turn that answers the confirmation question.
///
/// Affirmative clears the pending state and dispatches the commerce
/// connection request; negative clears it with an empty acknowledgment;
/// anything else keeps the state, re-prompts, and forces the microphone
/// open so the ambiguous turn can be retried.
pub fn handle_confirmation_intent(session: &mut SessionState, intent_name: &str) -> SkillResponse {
    let PurchaseState::AwaitingConfirmation { product_id } = session.purchase.clone() else {
        return SkillResponse::empty();
    };

    match classify(intent_name) {
        Confirmation::Affirmative => {
            info!("Purchase confirmed, requesting store connection for {}", product_id);
            session.purchase = PurchaseState::Idle;

            SkillResponse {
                speech: None,
                directives: vec![Directive::ConnectionRequest(ConnectionRequest::buy(
                    product_id,
                ))],
                should_end_session: None,
            }
        }
        Confirmation::Negative => {
            info!("Purchase declined for {}", product_id);
            session.purchase = PurchaseState::Idle;
            SkillResponse::empty()
        }
        Confirmation::Unrecognized => SkillResponse {
            speech: Some(CONFIRMATION_REPROMPT.to_string()),
            directives: Vec::new(),
            should_end_session: Some(false),
        },
    }
}
