//! Veneer
//!
//! Storefront building blocks for the Veneer wood-panel & paint shop: the
//! session shopping cart, the product price table, and bilingual
//! (English/Vietnamese) translation loading.

pub mod cart;
pub mod catalog;
pub mod config;
pub mod i18n;
pub mod observability;
pub mod prelude;
