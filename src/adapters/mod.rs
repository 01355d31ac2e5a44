// Adapters layer: concrete implementations for external systems (reference data download, etc.)

pub mod geonames;
