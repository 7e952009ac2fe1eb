//! Catalog
//!
//! Products and the size/finish price table, loaded from a YAML document:
//!
//! ```yaml
//! sizes:
//!   "1 Gallon": "1"
//!   "5 Gallon": "4.5"
//! finishes:
//!   Eggshell: "0 USD"
//!   Satin: "2.50 USD"
//! products:
//!   WD-OAK:
//!     name: Golden Oak
//!     code: WD-101
//!     category: wood
//!     image: /images/wd-101.jpg
//!     hex: "#B8860B"
//!     price: "30.00 USD"
//! ```

use std::{fs, path::Path};

use rustc_hash::FxHashMap;
use rusty_money::{Money, iso::Currency};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::cart::NewLineItem;

pub mod pricing;

pub use pricing::{PriceTable, parse_currency, parse_multiplier, parse_price};

/// Catalog loading and pricing errors
#[derive(Debug, Error)]
pub enum CatalogError {
    /// IO error reading the catalog file
    #[error("Failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Invalid size multiplier
    #[error("Invalid size multiplier: {0}")]
    InvalidMultiplier(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Currency mismatch between prices
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// Catalog has no products, so its currency is unknown
    #[error("Catalog has no products; currency unknown")]
    NoProducts,

    /// Product not found
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Size not in the price table
    #[error("Unknown size: {0}")]
    UnknownSize(String),

    /// Finish not in the price table
    #[error("Unknown finish: {0}")]
    UnknownFinish(String),

    /// Price arithmetic overflowed
    #[error("Price does not fit in minor units")]
    PriceOverflow,
}

/// A sellable product
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    /// Product id
    pub id: String,

    /// Display name
    pub name: String,

    /// Product code
    pub code: String,

    /// Product category
    pub category: String,

    /// Image path
    pub image: String,

    /// Swatch colour
    pub hex: Option<String>,

    /// Price before size and finish adjustments
    pub base_price: Money<'static, Currency>,
}

/// Catalog document as written in YAML
#[derive(Debug, Deserialize)]
struct CatalogFixture {
    #[serde(default)]
    sizes: FxHashMap<String, String>,

    #[serde(default)]
    finishes: FxHashMap<String, String>,

    products: FxHashMap<String, ProductFixture>,
}

#[derive(Debug, Deserialize)]
struct ProductFixture {
    name: String,
    code: String,
    category: String,
    #[serde(default)]
    image: String,
    hex: Option<String>,
    price: String,
}

/// Products plus the price table, all in a single currency.
#[derive(Debug, Clone)]
pub struct Catalog {
    products: FxHashMap<String, Product>,
    prices: PriceTable,
    currency: &'static Currency,
}

impl Catalog {
    /// Load a catalog from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if prices
    /// are malformed or in mixed currencies.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;

        debug!(path = %path.display(), "loading catalog");

        Self::from_yaml_str(&contents)
    }

    /// Parse a catalog from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is invalid, prices are malformed or in
    /// mixed currencies, or there are no products.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, CatalogError> {
        let fixture: CatalogFixture = serde_norway::from_str(yaml)?;

        let mut currency: Option<&'static Currency> = None;
        let mut products = FxHashMap::default();

        for (id, product) in fixture.products {
            let base_price = parse_price(&product.price)?;
            check_currency(&mut currency, base_price.currency())?;

            products.insert(
                id.clone(),
                Product {
                    id,
                    name: product.name,
                    code: product.code,
                    category: product.category,
                    image: product.image,
                    hex: product.hex,
                    base_price,
                },
            );
        }

        let currency = currency.ok_or(CatalogError::NoProducts)?;

        let mut prices = PriceTable::new();

        for (size, multiplier) in fixture.sizes {
            prices = prices.with_size(size, parse_multiplier(&multiplier)?);
        }

        for (finish, surcharge) in fixture.finishes {
            let surcharge = parse_price(&surcharge)?;
            check_currency(&mut Some(currency), surcharge.currency())?;
            prices = prices.with_finish(finish, surcharge);
        }

        Ok(Self {
            products,
            prices,
            currency,
        })
    }

    /// Look up a product by id.
    pub fn product(&self, id: &str) -> Option<&Product> {
        self.products.get(id)
    }

    /// All products, in no particular order
    pub fn products(&self) -> impl Iterator<Item = &Product> {
        self.products.values()
    }

    /// The size/finish price table
    pub fn price_table(&self) -> &PriceTable {
        &self.prices
    }

    /// Catalog currency
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Build the payload for adding `product_id` in `size` and `finish` to a
    /// cart, snapshotting the current unit price.
    ///
    /// # Errors
    ///
    /// Returns an error if the product is unknown or the selection cannot be priced.
    pub fn line_item(
        &self,
        product_id: &str,
        size: &str,
        finish: &str,
    ) -> Result<NewLineItem, CatalogError> {
        let product = self
            .product(product_id)
            .ok_or_else(|| CatalogError::ProductNotFound(product_id.to_string()))?;

        let price = self.prices.unit_price(product.base_price, size, finish)?;

        Ok(NewLineItem {
            product_id: product.id.clone(),
            name: product.name.clone(),
            code: product.code.clone(),
            category: product.category.clone(),
            image: product.image.clone(),
            hex: product.hex.clone(),
            price,
            size: size.to_string(),
            finish: finish.to_string(),
        })
    }
}

fn check_currency(
    expected: &mut Option<&'static Currency>,
    found: &'static Currency,
) -> Result<(), CatalogError> {
    match expected {
        Some(existing) if *existing != found => Err(CatalogError::CurrencyMismatch(
            existing.iso_alpha_code.to_string(),
            found.iso_alpha_code.to_string(),
        )),
        Some(_) => Ok(()),
        None => {
            *expected = Some(found);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso;
    use testresult::TestResult;

    use super::*;

    const CATALOG: &str = r##"
sizes:
  "1 Gallon": "1"
  "5 Gallon": "4.5"
finishes:
  Eggshell: "0 USD"
  Satin: "2.50 USD"
products:
  A:
    name: Golden Oak
    code: WD-101
    category: wood
    image: /images/wd-101.jpg
    hex: "#B8860B"
    price: "30.00 USD"
  B:
    name: Linen White
    code: PT-220
    category: paint
    price: "18.50 USD"
"##;

    #[test]
    fn loads_products_and_price_table() -> TestResult {
        let catalog = Catalog::from_yaml_str(CATALOG)?;

        assert_eq!(catalog.currency(), iso::USD);
        assert_eq!(catalog.products().count(), 2);
        assert_eq!(
            catalog.product("A").map(|product| product.name.as_str()),
            Some("Golden Oak")
        );
        assert_eq!(
            catalog.product("B").and_then(|product| product.hex.clone()),
            None
        );
        assert!(catalog.price_table().size_multiplier("5 Gallon").is_some());

        Ok(())
    }

    #[test]
    fn line_item_snapshots_unit_price() -> TestResult {
        let catalog = Catalog::from_yaml_str(CATALOG)?;

        let item = catalog.line_item("A", "5 Gallon", "Satin")?;

        assert_eq!(item.id().to_string(), "A-Satin-5 Gallon");
        assert_eq!(item.code, "WD-101");
        assert_eq!(item.price, Money::from_minor(13_750, iso::USD));

        Ok(())
    }

    #[test]
    fn line_item_unknown_product() -> TestResult {
        let catalog = Catalog::from_yaml_str(CATALOG)?;

        let result = catalog.line_item("Z", "1 Gallon", "Satin");

        assert!(matches!(result, Err(CatalogError::ProductNotFound(id)) if id == "Z"));

        Ok(())
    }

    #[test]
    fn mixed_currencies_are_rejected() {
        let yaml = r#"
products:
  A: { name: Oak, code: A, category: wood, price: "30.00 USD" }
  B: { name: Teak, code: B, category: wood, price: "700000 VND" }
"#;

        assert!(matches!(
            Catalog::from_yaml_str(yaml),
            Err(CatalogError::CurrencyMismatch(_, _))
        ));
    }

    #[test]
    fn surcharge_currency_must_match_products() {
        let yaml = r#"
finishes:
  Satin: "5000 VND"
products:
  A: { name: Oak, code: A, category: wood, price: "30.00 USD" }
"#;

        assert!(matches!(
            Catalog::from_yaml_str(yaml),
            Err(CatalogError::CurrencyMismatch(_, _))
        ));
    }

    #[test]
    fn empty_catalog_is_rejected() {
        assert!(matches!(
            Catalog::from_yaml_str("products: {}"),
            Err(CatalogError::NoProducts)
        ));
    }

    #[test]
    fn load_reads_file() -> TestResult {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("catalog.yml");
        fs::write(&path, CATALOG)?;

        let catalog = Catalog::load(&path)?;

        assert_eq!(catalog.products().count(), 2);

        Ok(())
    }
}
