//! Cart state and transitions

use std::num::NonZeroU32;

use rusty_money::{Money, iso::Currency};

use crate::cart::{
    action::CartAction,
    items::{CartLineItem, LineItemId},
};

/// Cart contents plus the totals derived from them.
///
/// `item_count` and `total` are never set directly; every transition that
/// touches the lines recomputes them.
#[derive(Debug, Clone, PartialEq)]
pub struct CartState {
    items: Vec<CartLineItem>,
    item_count: u64,
    total: Money<'static, Currency>,
    is_open: bool,
    currency: &'static Currency,
}

impl CartState {
    /// Create an empty, closed cart in the given currency.
    pub fn new(currency: &'static Currency) -> Self {
        Self {
            items: Vec::new(),
            item_count: 0,
            total: Money::from_minor(0, currency),
            is_open: false,
            currency,
        }
    }

    /// Lines in the order they were first added
    pub fn items(&self) -> &[CartLineItem] {
        &self.items
    }

    /// Find a line by identity.
    pub fn item(&self, id: &LineItemId) -> Option<&CartLineItem> {
        self.items.iter().find(|line| line.has_id(id))
    }

    /// Sum of quantities across all lines
    pub fn item_count(&self) -> u64 {
        self.item_count
    }

    /// Sum of price × quantity across all lines
    pub fn total(&self) -> Money<'static, Currency> {
        self.total
    }

    /// Whether the cart drawer is showing
    pub fn is_open(&self) -> bool {
        self.is_open
    }

    /// Cart currency
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Check if the cart has no lines.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn recompute(&mut self) {
        self.item_count = self.items.iter().fold(0_u64, |count, line| {
            count.saturating_add(u64::from(line.quantity().get()))
        });

        let total_minor = self
            .items
            .iter()
            .fold(0_i64, |total, line| total.saturating_add(line.subtotal_minor()));

        self.total = Money::from_minor(total_minor, self.currency);
    }
}

/// Apply `action` to `state`, producing the next state.
///
/// Transitions never fail: unknown line ids and items priced in a foreign
/// currency leave the state unchanged.
pub fn reduce(mut state: CartState, action: CartAction) -> CartState {
    match action {
        CartAction::AddItem(item) => {
            if item.price.currency() != state.currency {
                return state;
            }

            if let Some(line) = state.items.iter_mut().find(|line| line.holds(&item)) {
                line.increment();
            } else {
                state.items.push(CartLineItem::new(item));
            }
        }
        CartAction::RemoveItem(id) => {
            state.items.retain(|line| !line.has_id(&id));
        }
        CartAction::UpdateQuantity { id, quantity } => {
            let clamped = u32::try_from(quantity.max(0)).unwrap_or(u32::MAX);

            match NonZeroU32::new(clamped) {
                Some(quantity) => {
                    if let Some(line) = state.items.iter_mut().find(|line| line.has_id(&id)) {
                        line.set_quantity(quantity);
                    }
                }
                None => state.items.retain(|line| !line.has_id(&id)),
            }
        }
        CartAction::ClearCart => state.items.clear(),
        CartAction::ToggleCart => {
            state.is_open = !state.is_open;
            return state;
        }
        CartAction::OpenCart => {
            state.is_open = true;
            return state;
        }
        CartAction::CloseCart => {
            state.is_open = false;
            return state;
        }
    }

    state.recompute();
    state
}
