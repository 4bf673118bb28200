//! Global material properties shared between the compositor and materials

mod material_properties;

pub use material_properties::{
    MaterialProperties, MaterialPropertyId, MaterialPropertyValue,
    GLOBAL_NUMBER_OF_MULTISAMPLES,
};
