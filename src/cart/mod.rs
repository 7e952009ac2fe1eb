//! Cart
//!
//! The session shopping cart. [`reduce`] is the pure transition function over
//! [`CartState`]; [`CartStore`] owns the live state, applies dispatched
//! [`CartAction`]s and notifies subscribers of each committed change.

pub mod action;
pub mod items;
pub mod state;
pub mod store;

pub use action::CartAction;
pub use items::{CartLineItem, LineItemId, NewLineItem};
pub use state::{CartState, reduce};
pub use store::CartStore;
