//! Cart actions

use crate::cart::items::{LineItemId, NewLineItem};

/// The closed set of transitions a cart accepts.
#[derive(Debug, Clone, PartialEq)]
pub enum CartAction {
    /// Add one unit of an item, merging with an existing line of the same identity.
    AddItem(NewLineItem),

    /// Remove a line entirely.
    RemoveItem(LineItemId),

    /// Set a line's quantity. Zero or less removes the line.
    UpdateQuantity {
        /// Line to update
        id: LineItemId,

        /// New absolute quantity
        quantity: i64,
    },

    /// Remove every line.
    ClearCart,

    /// Flip the cart drawer visibility.
    ToggleCart,

    /// Show the cart drawer.
    OpenCart,

    /// Hide the cart drawer.
    CloseCart,
}

impl CartAction {
    /// Short action name, used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::AddItem(_) => "add_item",
            Self::RemoveItem(_) => "remove_item",
            Self::UpdateQuantity { .. } => "update_quantity",
            Self::ClearCart => "clear_cart",
            Self::ToggleCart => "toggle_cart",
            Self::OpenCart => "open_cart",
            Self::CloseCart => "close_cart",
        }
    }
}
