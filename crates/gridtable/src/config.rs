//! Store configuration

use gridtable_core::DEFAULT_SHEET_NAME;

/// Name of the reserved table holding the store metadata
pub const METADATA_TABLE: &str = "#meta";

/// Configuration for [`Store::open`](crate::Store::open)
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StoreConfig {
    /// Application name recorded in the metadata when the store is first
    /// initialized. Default: "gridtable".
    pub application_name: String,
    /// Initial store description. Default: the application name.
    pub description: String,
    /// Sheet holding the metadata. Default: "#meta".
    pub metadata_table: String,
    /// Sheet a new grid document starts with; it becomes the metadata sheet
    /// if it is still empty. Default: "Sheet1".
    pub default_sheet_name: String,
}

impl StoreConfig {
    /// Configuration for an application, described by its own name
    pub fn new<S: Into<String>>(application_name: S) -> Self {
        let application_name = application_name.into();
        Self {
            description: application_name.clone(),
            application_name,
            ..Self::default()
        }
    }

    pub fn with_description<S: Into<String>>(mut self, description: S) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_metadata_table<S: Into<String>>(mut self, name: S) -> Self {
        self.metadata_table = name.into();
        self
    }

    pub fn with_default_sheet_name<S: Into<String>>(mut self, name: S) -> Self {
        self.default_sheet_name = name.into();
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            application_name: "gridtable".to_string(),
            description: "gridtable".to_string(),
            metadata_table: METADATA_TABLE.to_string(),
            default_sheet_name: DEFAULT_SHEET_NAME.to_string(),
        }
    }
}
