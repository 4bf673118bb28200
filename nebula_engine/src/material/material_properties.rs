/// Name-keyed property values visible to every material.
///
/// The compositor publishes frame-wide state here (for instance the active
/// multisample count); shaders read it through their material blueprints.

use rustc_hash::FxHashMap;
use crate::utils::{StringId, string_id};

/// Material property id (`string_id` of the property name)
pub type MaterialPropertyId = StringId;

/// Multisample count of the workspace being executed
pub const GLOBAL_NUMBER_OF_MULTISAMPLES: MaterialPropertyId = string_id("GlobalNumberOfMultisamples");

/// Value of one material property
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MaterialPropertyValue {
    Integer(i32),
    Float(f32),
    Boolean(bool),
    Float4([f32; 4]),
}

/// Set of material property values
#[derive(Debug, Default, Clone)]
pub struct MaterialProperties {
    values: FxHashMap<MaterialPropertyId, MaterialPropertyValue>,
}

impl MaterialProperties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a property value
    pub fn set_property_by_id(&mut self, id: MaterialPropertyId, value: MaterialPropertyValue) {
        self.values.insert(id, value);
    }

    pub fn property_by_id(&self, id: MaterialPropertyId) -> Option<MaterialPropertyValue> {
        self.values.get(&id).copied()
    }

    /// Remove a property. Returns the previous value, if any.
    pub fn remove_property_by_id(&mut self, id: MaterialPropertyId) -> Option<MaterialPropertyValue> {
        self.values.remove(&id)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
#[path = "material_properties_tests.rs"]
mod tests;
