//! Band descriptors and the per-zone sample record schema.

use std::collections::HashMap;

/// One numeric channel of a coverage's sample vectors.
///
/// Mirrors the sample-dimension metadata of a conventional raster
/// band.
#[derive(Debug, Clone, PartialEq)]
pub struct Band {
    name: String,
    unit: Option<String>,
    nodata: Option<f64>,
}

impl Band {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            unit: None,
            nodata: None,
        }
    }

    #[must_use]
    pub fn unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    #[must_use]
    pub fn nodata(mut self, value: f64) -> Self {
        self.nodata = Some(value);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn unit_name(&self) -> Option<&str> {
        self.unit.as_deref()
    }

    pub fn nodata_value(&self) -> Option<f64> {
        self.nodata
    }
}

/// Named-field description of a per-zone sample tuple, one field per
/// band.
///
/// Field order is the band order and never changes for the lifetime of
/// the coverage that built it; downstream consumers address samples by
/// field name once the schema exists.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordSchema {
    names: Vec<String>,
    fields: HashMap<String, usize>,
}

impl RecordSchema {
    pub fn from_bands(bands: &[Band]) -> Self {
        let names: Vec<String> = bands.iter().map(|band| band.name().to_string()).collect();
        let fields = names
            .iter()
            .enumerate()
            .map(|(index, name)| (name.clone(), index))
            .collect();
        Self { names, fields }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Position of the named field in a sample vector.
    pub fn field(&self, name: &str) -> Option<usize> {
        self.fields.get(name).copied()
    }
}
