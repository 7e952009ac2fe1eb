//! Cart store

use std::num::NonZeroU32;

use rusty_money::iso::Currency;
use tokio::sync::watch;
use tracing::debug;

use crate::cart::{
    action::CartAction,
    items::{CartLineItem, LineItemId, NewLineItem},
    state::{CartState, reduce},
};

/// Holds the session cart and publishes every committed state to subscribers.
#[derive(Debug)]
pub struct CartStore {
    state: watch::Sender<CartState>,
}

impl CartStore {
    /// Create a store holding an empty cart in the given currency.
    pub fn new(currency: &'static Currency) -> Self {
        Self::with_state(CartState::new(currency))
    }

    /// Create a store starting from an existing state.
    pub fn with_state(state: CartState) -> Self {
        let (state, _receiver) = watch::channel(state);

        Self { state }
    }

    /// Apply an action to the cart.
    ///
    /// Subscribers are only woken when the state actually changed. Returns
    /// whether it did.
    pub fn dispatch(&self, action: CartAction) -> bool {
        let name = action.name();

        let changed = self.state.send_if_modified(|state| {
            let next = reduce(state.clone(), action);

            if next == *state {
                false
            } else {
                *state = next;
                true
            }
        });

        let state = self.state.borrow();

        if changed {
            debug!(
                action = name,
                lines = state.items().len(),
                item_count = state.item_count(),
                total = %state.total(),
                is_open = state.is_open(),
                "cart updated"
            );
        } else {
            debug!(action = name, "cart action ignored");
        }

        changed
    }

    /// Observe committed states.
    pub fn subscribe(&self) -> watch::Receiver<CartState> {
        self.state.subscribe()
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> CartState {
        self.state.borrow().clone()
    }

    /// Quantity of a line, if present.
    pub fn quantity(&self, id: &LineItemId) -> Option<NonZeroU32> {
        self.state.borrow().item(id).map(CartLineItem::quantity)
    }

    /// Add one unit of `item`.
    pub fn add_item(&self, item: NewLineItem) -> bool {
        self.dispatch(CartAction::AddItem(item))
    }

    /// Remove a line.
    pub fn remove_item(&self, id: LineItemId) -> bool {
        self.dispatch(CartAction::RemoveItem(id))
    }

    /// Set a line's quantity; zero or less removes it.
    pub fn set_quantity(&self, id: LineItemId, quantity: i64) -> bool {
        self.dispatch(CartAction::UpdateQuantity { id, quantity })
    }

    /// Add one unit to an existing line.
    pub fn increment(&self, id: LineItemId) -> bool {
        let Some(current) = self.quantity(&id) else {
            return false;
        };

        self.set_quantity(id, i64::from(current.get()).saturating_add(1))
    }

    /// Take one unit off an existing line, never going below one.
    pub fn decrement(&self, id: LineItemId) -> bool {
        let Some(current) = self.quantity(&id) else {
            return false;
        };

        let next = current.get().saturating_sub(1).max(1);

        self.set_quantity(id, i64::from(next))
    }

    /// Empty the cart.
    pub fn clear(&self) -> bool {
        self.dispatch(CartAction::ClearCart)
    }
}
