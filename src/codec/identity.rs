//! Resolution of states and actions to durable identities.

use std::sync::Arc;

use crate::{
    Result,
    codec::{ActionEncoding, StateEncoding},
    identifiers::{ActionId, StateId},
    model::{Action, CardCatalog, State},
    ports::SharedStore,
};

/// Encodes values against a card catalog and interns them in a store.
///
/// Cloning is cheap; clones share the store and the catalog.
#[derive(Clone)]
pub struct IdentityCodec {
    store: SharedStore,
    catalog: Arc<CardCatalog>,
}

impl IdentityCodec {
    pub fn new(store: SharedStore, catalog: Arc<CardCatalog>) -> Self {
        Self { store, catalog }
    }

    pub fn catalog(&self) -> &CardCatalog {
        &self.catalog
    }

    /// Identity of `state`, allocated on first sight.
    ///
    /// # Errors
    ///
    /// Encoding errors from [`StateEncoding::encode`], or a store error if a
    /// new identity cannot be recorded.
    pub fn state_id(&self, state: &State) -> Result<StateId> {
        let encoding = StateEncoding::encode(state, &self.catalog)?;
        self.store.intern_state(&encoding)
    }

    /// Identity of `action`, allocated on first sight.
    pub fn action_id(&self, action: &Action) -> Result<ActionId> {
        let encoding = ActionEncoding::encode(action, &self.catalog)?;
        self.store.intern_action(&encoding)
    }

    pub fn state_encoding(&self, id: StateId) -> Result<Option<StateEncoding>> {
        self.store.state_encoding(id)
    }

    /// The action behind `id`, or `None` if the identity was never allocated.
    pub fn action(&self, id: ActionId) -> Result<Option<Action>> {
        self.store
            .action_encoding(id)?
            .map(|encoding| encoding.decode())
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        adapters::InMemoryStore,
        identifiers::CardId,
        model::{ExternalView, GlobalView, InternalView, Status, Target},
        ports::IdentityStore,
    };

    fn codec() -> IdentityCodec {
        IdentityCodec::new(
            Arc::new(InMemoryStore::new()),
            Arc::new(CardCatalog::standard()),
        )
    }

    fn state(hand: &[u32], own_health: u32) -> State {
        let view = |health| ExternalView {
            health,
            max_health: 10,
            resource: 1,
            max_resource: 3,
            hand_size: 2,
            draw_pile: 4,
        };
        State {
            global: GlobalView { turn: 2 },
            internal: InternalView {
                hand: hand.iter().copied().map(CardId::new).collect(),
                status: Status::Ready,
            },
            own: view(own_health),
            left: view(9),
            right: view(8),
        }
    }

    #[test]
    fn test_reordered_hand_shares_identity() {
        let codec = codec();
        let a = codec.state_id(&state(&[0, 2], 10)).unwrap();
        let b = codec.state_id(&state(&[2, 0], 10)).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, codec.state_id(&state(&[0, 2], 7)).unwrap());
    }

    #[test]
    fn test_action_roundtrips_through_identity() {
        let codec = codec();
        let heal = Action::Play {
            card: CardId::new(2),
            target: Some(Target::Own),
        };
        let id = codec.action_id(&heal).unwrap();
        assert_eq!(codec.action_id(&heal).unwrap(), id);
        assert_eq!(codec.action(id).unwrap(), Some(heal));
        assert_eq!(codec.action(ActionId::new(id.value() + 10)).unwrap(), None);
    }

    #[test]
    fn test_unknown_card_allocates_nothing() {
        let store = Arc::new(InMemoryStore::new());
        let codec = IdentityCodec::new(store.clone(), Arc::new(CardCatalog::standard()));
        let bogus = Action::Play {
            card: CardId::new(77),
            target: None,
        };
        assert!(codec.action_id(&bogus).unwrap_err().is_encoding());
        assert!(codec.state_id(&state(&[77], 10)).unwrap_err().is_encoding());
        assert_eq!(store.action_count(), 0);
        assert_eq!(store.state_count(), 0);
    }
}
