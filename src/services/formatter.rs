//! Renders product records into searchable text.

use crate::models::{DocumentMetadata, IndexedDocument, ProductRecord};

const DEFAULT_SUBCATEGORY: &str = "General";
const DEFAULT_BRAND: &str = "N/A";
const NO_PRICE: &str = "Contact for pricing";

/// Format a product into the text and metadata stored in the vector store.
pub fn format_product(product: &ProductRecord) -> IndexedDocument {
    IndexedDocument {
        text: product_text(product),
        metadata: DocumentMetadata {
            product_id: product.id.clone(),
            sku: product.sku.clone(),
            category: product.category.clone(),
            b2b_price: product.b2b_price,
            stock: product.stock,
        },
    }
}

fn product_text(product: &ProductRecord) -> String {
    let specs = product
        .specs
        .iter()
        .map(|(k, v)| format!("{}: {}", k, v))
        .collect::<Vec<_>>()
        .join(", ");

    let price = product
        .b2b_price
        .map_or_else(|| NO_PRICE.to_string(), |p| format!("€{:.2}", p));

    let text = format!(
        "Product: {name}\n\
         SKU: {sku}\n\
         Category: {category} > {subcategory}\n\
         Brand: {brand}\n\
         Description: {description}\n\
         Specifications: {specs}\n\
         B2B Price: {price}\n\
         Stock: {stock} units\n\
         Tags: {tags}",
        name = product.name,
        sku = product.sku,
        category = product.category,
        subcategory = product.subcategory.as_deref().unwrap_or(DEFAULT_SUBCATEGORY),
        brand = product.brand.as_deref().unwrap_or(DEFAULT_BRAND),
        description = product.description,
        specs = specs,
        price = price,
        stock = product.stock,
        tags = product.tags.join(", "),
    );

    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bare_panel() -> ProductRecord {
        ProductRecord::new("1", "X1", "Panel", "LED")
    }

    #[test]
    fn test_defaults_for_missing_fields() {
        let doc = format_product(&bare_panel());

        assert!(doc.text.contains("Category: LED > General"));
        assert!(doc.text.contains("Brand: N/A"));
        assert!(doc.text.contains("Contact for pricing"));
        assert!(doc.text.contains("Stock: 0 units"));
        assert!(doc.text.starts_with("Product: Panel\nSKU: X1\n"));
        assert!(doc.text.ends_with("Tags:"));

        let map = doc.metadata.to_map();
        assert!(map["b2b_price"].is_null());
        assert_eq!(map["stock"], serde_json::json!(0));
        assert_eq!(map["sku"], serde_json::json!("X1"));
    }

    #[test]
    fn test_full_record() {
        let product = ProductRecord::new("42", "LP-6060-40", "LED Panel 60x60", "Panels")
            .with_subcategory("Office")
            .with_brand("Ledux")
            .with_description("Slim backlit panel")
            .with_spec("power", 40_i64)
            .with_spec("cct", "4000K")
            .with_b2b_price(24.5)
            .with_stock(120)
            .with_tags(["office", "ceiling"]);

        let doc = format_product(&product);

        assert_eq!(
            doc.text,
            "Product: LED Panel 60x60\n\
             SKU: LP-6060-40\n\
             Category: Panels > Office\n\
             Brand: Ledux\n\
             Description: Slim backlit panel\n\
             Specifications: cct: 4000K, power: 40\n\
             B2B Price: €24.50\n\
             Stock: 120 units\n\
             Tags: office, ceiling"
        );
        assert_eq!(doc.metadata.b2b_price, Some(24.5));
        assert_eq!(doc.metadata.stock, 120);
        assert_eq!(doc.metadata.product_id, "42");
    }

    #[test]
    fn test_float_specs_keep_fraction() {
        let product = bare_panel()
            .with_spec("power", 40.0_f64)
            .with_spec("lm_w", 112.5_f64);
        let doc = format_product(&product);
        assert!(doc.text.contains("Specifications: lm_w: 112.5, power: 40.0"));
    }

    #[test]
    fn test_zero_price_is_rendered() {
        let doc = format_product(&bare_panel().with_b2b_price(0.0));
        assert!(doc.text.contains("B2B Price: €0.00"));
    }

    #[test]
    fn test_retail_price_not_in_text() {
        let doc = format_product(&bare_panel().with_retail_price(99.0));
        assert!(!doc.text.contains("99"));
    }

    #[test]
    fn test_formatting_is_pure() {
        let product = bare_panel()
            .with_spec("ip", "IP44")
            .with_spec("dimmable", true)
            .with_tags(["a", "b"]);
        assert_eq!(format_product(&product), format_product(&product));
    }
}
