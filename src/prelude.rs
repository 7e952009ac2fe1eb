//! Veneer prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{CartAction, CartLineItem, CartState, CartStore, LineItemId, NewLineItem, reduce},
    catalog::{Catalog, CatalogError, PriceTable, Product},
    i18n::{
        Clock, Dictionary, DictionaryFetcher, I18nContext, LoadOutcome, LoadStatus,
        LoaderSettings, Locale, LocaleChange, LocaleController, Namespace, PreferenceStore,
        RetryPolicy,
    },
};
