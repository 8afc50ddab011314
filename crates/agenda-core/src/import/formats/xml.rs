//! XML file importer

use crate::import::{
    error::{ImportError, ImportResult},
    types::{ImportConfig, ImportProgress, ImportStats},
    EntityType, FileImporter,
};
use async_trait::async_trait;
use std::path::Path;

/// XML file importer
pub struct XmlImporter;

impl XmlImporter {
    pub fn new() -> Self {
        Self
    }
}

impl Default for XmlImporter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FileImporter for XmlImporter {
    fn format(&self) -> &'static str {
        "xml"
    }

    async fn import_file(
        &self,
        _file_path: &Path,
        entity_type: EntityType,
        _config: &ImportConfig,
        progress: &(dyn Fn(ImportProgress) + Send + Sync),
    ) -> ImportResult<ImportStats> {
        progress(ImportProgress {
            stage: entity_type.to_string(),
            current: 0,
            total: 1,
            message: "XML import not yet implemented".to_string(),
        });

        // TODO: Implement XML parsing using quick-xml or similar
        Err(ImportError::Other(
            "XML import not yet implemented. Please use JSON or CSV format.".to_string(),
        ))
    }
}

/// Expected XML structures for each entity type
pub mod examples {
    /// Example product XML structure
    pub const PRODUCT_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<products>
  <product>
    <id>550e8400-e29b-41d4-a716-446655440000</id>
    <title>Premium Cotton T-Shirt</title>
    <slug>premium-cotton-t-shirt</slug>
    <description>High-quality organic cotton t-shirt</description>
    <price>29.99</price>
    <sku>TSHIRT-001</sku>
    <inventory_quantity>100</inventory_quantity>
    <status>active</status>
  </product>
</products>"#;

    /// Example customer XML structure
    pub const CUSTOMER_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<customers>
  <customer>
    <id>123e4567-e89b-12d3-a456-426614174000</id>
    <email>customer@example.com</email>
    <first_name>John</first_name>
    <last_name>Doe</last_name>
  </customer>
</customers>"#;

    /// Example order XML structure
    pub const ORDER_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<orders>
  <order>
    <id>ord-123456</id>
    <order_number>1001</order_number>
    <customer_id>123e4567-e89b-12d3-a456-426614174000</customer_id>
    <total>59.98</total>
    <status>confirmed</status>
  </order>
</orders>"#;
}
