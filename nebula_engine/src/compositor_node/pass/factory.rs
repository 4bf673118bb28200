/// Pass factory: creates resource and instance passes from pass type ids.
///
/// Custom pass types are added either by registering constructors on a
/// `DefaultCompositorPassFactory`, or by implementing `CompositorPassFactory`
/// on a type that asks a wrapped default factory first and only handles its
/// own types on a miss.

use rustc_hash::FxHashMap;
use crate::engine_debug;
use super::{
    CompositorInstancePass, CompositorPassTypeId, CompositorResourcePass,
    ClearResourcePass, ClearInstancePass,
    SceneResourcePass, SceneInstancePass,
    ShadowMapResourcePass, ShadowMapInstancePass,
    ResolveMultisampleResourcePass, ResolveMultisampleInstancePass,
    CopyResourcePass, CopyInstancePass,
    GenerateMipmapsResourcePass, GenerateMipmapsInstancePass,
    ComputeResourcePass, ComputeInstancePass,
    DebugGuiResourcePass, DebugGuiInstancePass,
};

/// Creates passes by type id
///
/// Both methods return `None` for unknown types; the node loader skips the
/// payload of such passes.
pub trait CompositorPassFactory: Send + Sync {
    /// A default constructed resource pass, filled by `deserialize` afterwards
    fn create_compositor_resource_pass(
        &self,
        compositor_pass_type_id: CompositorPassTypeId,
    ) -> Option<Box<dyn CompositorResourcePass>>;

    /// The instance half of `resource_pass`
    fn create_compositor_instance_pass(
        &self,
        resource_pass: &dyn CompositorResourcePass,
    ) -> Option<Box<dyn CompositorInstancePass>>;
}

type CreateResourcePass = Box<dyn Fn() -> Box<dyn CompositorResourcePass> + Send + Sync>;
type CreateInstancePass = Box<dyn Fn(&dyn CompositorResourcePass) -> Option<Box<dyn CompositorInstancePass>> + Send + Sync>;

struct PassConstructors {
    create_resource_pass: CreateResourcePass,
    create_instance_pass: CreateInstancePass,
}

/// Registry of pass constructors, built-in pass types included
pub struct DefaultCompositorPassFactory {
    constructors: FxHashMap<CompositorPassTypeId, PassConstructors>,
}

impl DefaultCompositorPassFactory {
    /// Factory knowing every built-in pass type
    pub fn new() -> Self {
        let mut factory = Self::empty();
        factory.register_built_in(ClearResourcePass::TYPE_ID, ClearInstancePass::new);
        factory.register_built_in(SceneResourcePass::TYPE_ID, SceneInstancePass::new);
        factory.register_built_in(ShadowMapResourcePass::TYPE_ID, ShadowMapInstancePass::new);
        factory.register_built_in(ResolveMultisampleResourcePass::TYPE_ID, ResolveMultisampleInstancePass::new);
        factory.register_built_in(CopyResourcePass::TYPE_ID, CopyInstancePass::new);
        factory.register_built_in(GenerateMipmapsResourcePass::TYPE_ID, GenerateMipmapsInstancePass::new);
        factory.register_built_in(ComputeResourcePass::TYPE_ID, ComputeInstancePass::new);
        factory.register_built_in(DebugGuiResourcePass::TYPE_ID, DebugGuiInstancePass::new);
        factory
    }

    /// Factory knowing no pass type at all
    pub fn empty() -> Self {
        Self {
            constructors: FxHashMap::default(),
        }
    }

    /// Register (or replace) the constructors of a pass type
    pub fn register<R, I>(&mut self, compositor_pass_type_id: CompositorPassTypeId, create_resource_pass: R, create_instance_pass: I)
    where
        R: Fn() -> Box<dyn CompositorResourcePass> + Send + Sync + 'static,
        I: Fn(&dyn CompositorResourcePass) -> Option<Box<dyn CompositorInstancePass>> + Send + Sync + 'static,
    {
        let replaced = self.constructors.insert(compositor_pass_type_id, PassConstructors {
            create_resource_pass: Box::new(create_resource_pass),
            create_instance_pass: Box::new(create_instance_pass),
        });
        if replaced.is_some() {
            engine_debug!("nebula::CompositorPassFactory",
                "Replaced constructors of pass type {:#010x}", compositor_pass_type_id);
        }
    }

    /// Register a resource pass type built with `Default` whose instance pass is built from it
    pub fn register_built_in<R, I>(&mut self, compositor_pass_type_id: CompositorPassTypeId, create_instance_pass: fn(&R) -> I)
    where
        R: CompositorResourcePass + Default + 'static,
        I: CompositorInstancePass + 'static,
    {
        self.register(
            compositor_pass_type_id,
            || Box::new(R::default()) as Box<dyn CompositorResourcePass>,
            move |resource_pass| {
                resource_pass.as_any().downcast_ref::<R>()
                    .map(|resource_pass| Box::new(create_instance_pass(resource_pass)) as Box<dyn CompositorInstancePass>)
            },
        );
    }

    pub fn is_registered(&self, compositor_pass_type_id: CompositorPassTypeId) -> bool {
        self.constructors.contains_key(&compositor_pass_type_id)
    }

    /// Number of known pass types
    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }
}

impl Default for DefaultCompositorPassFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl CompositorPassFactory for DefaultCompositorPassFactory {
    fn create_compositor_resource_pass(
        &self,
        compositor_pass_type_id: CompositorPassTypeId,
    ) -> Option<Box<dyn CompositorResourcePass>> {
        self.constructors.get(&compositor_pass_type_id)
            .map(|constructors| (constructors.create_resource_pass)())
    }

    fn create_compositor_instance_pass(
        &self,
        resource_pass: &dyn CompositorResourcePass,
    ) -> Option<Box<dyn CompositorInstancePass>> {
        self.constructors.get(&resource_pass.compositor_pass_type_id())
            .and_then(|constructors| (constructors.create_instance_pass)(resource_pass))
    }
}

#[cfg(test)]
#[path = "factory_tests.rs"]
mod tests;
