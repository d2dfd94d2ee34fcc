//! Product records and the documents derived from them.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Metadata mapping handed to, and returned from, the vector store.
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// A scalar specification value (wattage, colour temperature, IP rating...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SpecValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for SpecValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpecValue::Bool(b) => write!(f, "{}", b),
            SpecValue::Integer(n) => write!(f, "{}", n),
            // keeps the fractional part, so 40.0 renders as "40.0"
            SpecValue::Float(x) => write!(f, "{:?}", x),
            SpecValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for SpecValue {
    fn from(s: &str) -> Self {
        SpecValue::Text(s.to_string())
    }
}

impl From<i64> for SpecValue {
    fn from(n: i64) -> Self {
        SpecValue::Integer(n)
    }
}

impl From<f64> for SpecValue {
    fn from(x: f64) -> Self {
        SpecValue::Float(x)
    }
}

impl From<bool> for SpecValue {
    fn from(b: bool) -> Self {
        SpecValue::Bool(b)
    }
}

/// One catalogue product as exported from the ERP database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: String,
    pub sku: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: String,
    #[serde(default)]
    pub subcategory: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub specs: BTreeMap<String, SpecValue>,
    /// `None` means "contact for pricing".
    #[serde(default)]
    pub b2b_price: Option<f64>,
    #[serde(default)]
    pub retail_price: Option<f64>,
    #[serde(default)]
    pub stock: u32,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl ProductRecord {
    pub fn new(
        id: impl Into<String>,
        sku: impl Into<String>,
        name: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            sku: sku.into(),
            name: name.into(),
            description: String::new(),
            category: category.into(),
            subcategory: None,
            brand: None,
            specs: BTreeMap::new(),
            b2b_price: None,
            retail_price: None,
            stock: 0,
            tags: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_subcategory(mut self, subcategory: impl Into<String>) -> Self {
        self.subcategory = Some(subcategory.into());
        self
    }

    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = Some(brand.into());
        self
    }

    pub fn with_spec(mut self, key: impl Into<String>, value: impl Into<SpecValue>) -> Self {
        self.specs.insert(key.into(), value.into());
        self
    }

    pub fn with_b2b_price(mut self, price: f64) -> Self {
        self.b2b_price = Some(price);
        self
    }

    pub fn with_retail_price(mut self, price: f64) -> Self {
        self.retail_price = Some(price);
        self
    }

    pub fn with_stock(mut self, stock: u32) -> Self {
        self.stock = stock;
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }
}

/// The five metadata fields stored next to every indexed product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub product_id: String,
    pub sku: String,
    pub category: String,
    pub b2b_price: Option<f64>,
    pub stock: u32,
}

impl DocumentMetadata {
    pub fn to_map(&self) -> Metadata {
        let mut map = Metadata::new();
        map.insert("product_id".to_string(), self.product_id.clone().into());
        map.insert("sku".to_string(), self.sku.clone().into());
        map.insert("category".to_string(), self.category.clone().into());
        map.insert(
            "b2b_price".to_string(),
            self.b2b_price
                .and_then(serde_json::Number::from_f64)
                .map_or(serde_json::Value::Null, serde_json::Value::Number),
        );
        map.insert("stock".to_string(), self.stock.into());
        map
    }
}

/// Formatted text plus metadata, ready to hand to the vector store.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexedDocument {
    pub text: String,
    pub metadata: DocumentMetadata,
}
