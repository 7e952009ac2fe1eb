//! Cart line items

use std::{fmt, num::NonZeroU32};

use rusty_money::{Money, iso::Currency};

/// Identity of a cart line.
///
/// The same product in a different finish or size is a different line.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LineItemId {
    /// Base product id
    pub product_id: String,

    /// Selected finish
    pub finish: String,

    /// Selected size
    pub size: String,
}

impl LineItemId {
    /// Create a new line item identity.
    pub fn new(
        product_id: impl Into<String>,
        finish: impl Into<String>,
        size: impl Into<String>,
    ) -> Self {
        Self {
            product_id: product_id.into(),
            finish: finish.into(),
            size: size.into(),
        }
    }
}

impl fmt::Display for LineItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.product_id, self.finish, self.size)
    }
}

/// A line item without a quantity, as handed to the cart when adding.
#[derive(Debug, Clone, PartialEq)]
pub struct NewLineItem {
    /// Base product id
    pub product_id: String,

    /// Display name
    pub name: String,

    /// Product code
    pub code: String,

    /// Product category
    pub category: String,

    /// Image path
    pub image: String,

    /// Swatch colour, for paints
    pub hex: Option<String>,

    /// Unit price at the moment the item was added
    pub price: Money<'static, Currency>,

    /// Selected size
    pub size: String,

    /// Selected finish
    pub finish: String,
}

impl NewLineItem {
    /// The identity this item would occupy in a cart.
    pub fn id(&self) -> LineItemId {
        LineItemId::new(&self.product_id, &self.finish, &self.size)
    }

    /// Whether this item has the given identity.
    pub fn has_id(&self, id: &LineItemId) -> bool {
        self.product_id == id.product_id && self.finish == id.finish && self.size == id.size
    }

    fn same_identity(&self, other: &NewLineItem) -> bool {
        self.product_id == other.product_id
            && self.finish == other.finish
            && self.size == other.size
    }
}

/// A line in the cart: a snapshot of the added item plus its quantity.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLineItem {
    item: NewLineItem,
    quantity: NonZeroU32,
}

impl CartLineItem {
    /// Creates a line holding a single unit of `item`.
    pub(crate) fn new(item: NewLineItem) -> Self {
        Self {
            item,
            quantity: NonZeroU32::MIN,
        }
    }

    /// The line identity
    pub fn id(&self) -> LineItemId {
        self.item.id()
    }

    /// Whether this line has the given identity.
    pub fn has_id(&self, id: &LineItemId) -> bool {
        self.item.has_id(id)
    }

    pub(crate) fn holds(&self, item: &NewLineItem) -> bool {
        self.item.same_identity(item)
    }

    /// Descriptive details captured when the line was first added
    pub fn details(&self) -> &NewLineItem {
        &self.item
    }

    /// Unit price snapshot
    pub fn price(&self) -> &Money<'static, Currency> {
        &self.item.price
    }

    /// Number of units on this line
    pub fn quantity(&self) -> NonZeroU32 {
        self.quantity
    }

    pub(crate) fn set_quantity(&mut self, quantity: NonZeroU32) {
        self.quantity = quantity;
    }

    pub(crate) fn increment(&mut self) {
        self.quantity = self.quantity.saturating_add(1);
    }

    /// Line subtotal in minor units (unit price × quantity), saturating.
    pub fn subtotal_minor(&self) -> i64 {
        self.item
            .price
            .to_minor_units()
            .saturating_mul(i64::from(self.quantity.get()))
    }

    /// Line subtotal (unit price × quantity).
    pub fn subtotal(&self) -> Money<'static, Currency> {
        Money::from_minor(self.subtotal_minor(), self.item.price.currency())
    }
}
