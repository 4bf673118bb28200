/// Graphics device module - the RHI contract the compositor renders through

pub mod graphics_device;
pub mod texture;
pub mod render_pass;
pub mod render_target;
pub mod command_buffer;

pub use graphics_device::*;
pub use texture::*;
pub use render_pass::*;
pub use render_target::*;
pub use command_buffer::*;

// Mock graphics device for tests (no GPU required)
#[cfg(test)]
pub mod mock_graphics_device;
