//! Root index assembly (`index.json`)

use ssb_streams::{IndexDocument, ProductsDocument, StreamIndex};

use crate::config::{ConfigError, TreeConfig};

/// Builds the index for an aggregated catalog.
#[derive(Debug, Clone, Copy)]
pub struct IndexAssembler<'a> {
    config: &'a TreeConfig,
}

impl<'a> IndexAssembler<'a> {
    pub fn new(config: &'a TreeConfig) -> Self {
        Self { config }
    }

    /// Index whose images stream lists the visible products present in
    /// `products`, in configuration order.
    ///
    /// Products missing from the catalog are missing from the index too,
    /// so the two documents always agree.
    pub fn assemble(&self, products: &ProductsDocument) -> Result<IndexDocument, ConfigError> {
        self.config.require_catalog_settings()?;

        let names = self
            .config
            .visible_products()
            .filter(|p| products.contains(&p.name))
            .map(|p| p.name.clone())
            .collect();

        Ok(IndexDocument::with_images(StreamIndex {
            datatype: self.config.datatype.clone(),
            path: self.config.products_document_path(),
            updated: products.updated.clone(),
            products: names,
            format: Some(self.config.format.clone()),
        }))
    }
}
