use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier assigned to a catalog entry. Primary entries keep their own
/// identifier; entries introduced by a patch receive a fresh one.
pub type ProductId = i64;

/// Minimum number of characters a product name must carry.
pub const MIN_NAME_LEN: usize = 3;

/// Identifies which input a raw record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// The authoritative catalog.
    Primary,
    /// The supplementary source carrying updates and new entries.
    Patch,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceKind::Primary => write!(f, "primary"),
            SourceKind::Patch => write!(f, "patch"),
        }
    }
}

/// Entry of the primary catalog.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PrimaryRecord {
    pub id: ProductId,
    pub name: String,
    pub category: String,
    pub price: f64,
    pub stock: i64,
}

impl PrimaryRecord {
    /// Checks the value constraints that the JSON shape alone cannot express.
    pub fn check(&self) -> std::result::Result<(), String> {
        check_name(&self.name)?;
        check_price(self.price)?;
        check_stock(self.stock)
    }
}

/// Entry of the patch source. Every field except `product_id` is optional and
/// an absent field means "leave unchanged".
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PatchRecord {
    pub product_id: ProductId,
    pub name: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub supplier: Option<String>,
    /// Reference price used only to compute the price change.
    pub old_price: Option<f64>,
    pub price: Option<f64>,
    pub stock: Option<i64>,
}

impl PatchRecord {
    /// Drops empty strings so that they behave like missing fields.
    pub fn without_blank_fields(mut self) -> Self {
        for field in [
            &mut self.name,
            &mut self.category,
            &mut self.description,
            &mut self.supplier,
        ] {
            if field.as_deref().is_some_and(str::is_empty) {
                *field = None;
            }
        }
        self
    }

    /// Validates the values the patch supplies.
    pub fn check(&self) -> std::result::Result<(), String> {
        if let Some(name) = &self.name {
            check_name(name)?;
        }
        if let Some(price) = self.price {
            check_price(price)?;
        }
        if let Some(stock) = self.stock {
            check_stock(stock)?;
        }
        Ok(())
    }
}

/// Unified product entry produced by consolidation and persisted in the
/// snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsolidatedRecord {
    pub id: ProductId,
    pub name: String,
    pub category: String,
    pub price: f64,
    pub stock: i64,
    pub description: Option<String>,
    pub supplier: Option<String>,
    /// Signed percentage change against the reference price, rounded to two
    /// decimals.
    pub price_change_percentage: Option<f64>,
}

impl ConsolidatedRecord {
    /// Builds a record without the optional attributes.
    pub fn new(
        id: ProductId,
        name: impl Into<String>,
        category: impl Into<String>,
        price: f64,
        stock: i64,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            category: category.into(),
            price,
            stock,
            description: None,
            supplier: None,
            price_change_percentage: None,
        }
    }

    /// Checks the invariants every persisted record must satisfy.
    pub fn check(&self) -> std::result::Result<(), String> {
        check_name(&self.name)?;
        check_price(self.price)?;
        check_stock(self.stock)
    }
}

fn check_name(name: &str) -> std::result::Result<(), String> {
    if name.chars().count() < MIN_NAME_LEN {
        return Err(format!(
            "name '{name}' is shorter than {MIN_NAME_LEN} characters"
        ));
    }
    Ok(())
}

fn check_price(price: f64) -> std::result::Result<(), String> {
    if !price.is_finite() || price <= 0.0 {
        return Err(format!("price {price} must be greater than zero"));
    }
    Ok(())
}

fn check_stock(stock: i64) -> std::result::Result<(), String> {
    if stock < 0 {
        return Err(format!("stock {stock} must not be negative"));
    }
    Ok(())
}
