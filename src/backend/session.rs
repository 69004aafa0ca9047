/// Where the purchase-confirmation handshake stands for one session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PurchaseState {
    /// No purchase pending
    #[default]
    Idle,

    /// The confirmation question has been asked; the next intent turn
    /// belongs to the purchase handler, not the generic passthrough
    AwaitingConfirmation { product_id: String },
}

/// Backend state scoped to one voice-platform session.
///
/// Created implicitly on the first turn that writes to it; destroyed when
/// the session ends.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    pub purchase: PurchaseState,
}

impl SessionState {
    pub fn awaiting_purchase_confirmation(&self) -> bool {
        matches!(self.purchase, PurchaseState::AwaitingConfirmation { .. })
    }
}
