//! Shader program cache
//!
//! Materials built from the same sources share one compiled program. The cache
//! belongs to whoever owns the drawing context and must not outlive it, since
//! the handles it stores are only meaningful to that context's device.

use std::collections::HashMap;

use crate::render::backend::{GraphicsDevice, ProgramHandle, ShaderHandle, ShaderStage};
use crate::render::ShaderError;

/// De-duplicates compiled shader stages and linked programs
#[derive(Debug, Default)]
pub struct ShaderCache {
    stages: HashMap<(ShaderStage, String), ShaderHandle>,
    programs: HashMap<(ShaderHandle, ShaderHandle), ProgramHandle>,
}

impl ShaderCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Compiled stage for `source`, compiling it on first use
    pub fn shader(
        &mut self,
        device: &mut dyn GraphicsDevice,
        stage: ShaderStage,
        source: &str,
    ) -> Result<ShaderHandle, ShaderError> {
        if let Some(handle) = self.stages.get(&(stage, source.to_string())) {
            return Ok(*handle);
        }

        let handle = device.compile_shader(stage, source).inspect_err(|e| {
            log::error!("{e}");
        })?;
        log::debug!("Compiled {stage:?} shader {handle:?}");
        self.stages.insert((stage, source.to_string()), handle);
        Ok(handle)
    }

    /// Linked program for a vertex/fragment source pair
    pub fn program(
        &mut self,
        device: &mut dyn GraphicsDevice,
        vertex_source: &str,
        fragment_source: &str,
    ) -> Result<ProgramHandle, ShaderError> {
        let vertex = self.shader(device, ShaderStage::Vertex, vertex_source)?;
        let fragment = self.shader(device, ShaderStage::Fragment, fragment_source)?;

        if let Some(program) = self.programs.get(&(vertex, fragment)) {
            return Ok(*program);
        }

        let program = device.link_program(vertex, fragment).inspect_err(|e| {
            log::error!("{e}");
        })?;
        log::debug!("Linked shader program {program:?} from {vertex:?} + {fragment:?}");
        self.programs.insert((vertex, fragment), program);
        Ok(program)
    }

    /// Number of cached stages
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Number of cached programs
    pub fn program_count(&self) -> usize {
        self.programs.len()
    }

    /// Forget every cached handle, e.g. before the owning context goes away
    pub fn clear(&mut self) {
        self.stages.clear();
        self.programs.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::backends::RecordingDevice;

    const VS: &str = "void main() { gl_Position = vec4(0.0); }";
    const FS: &str = "void main() { gl_FragColor = vec4(1.0); }";

    #[test]
    fn test_program_is_reused() {
        let mut device = RecordingDevice::new();
        let mut cache = ShaderCache::new();

        let first = cache.program(&mut device, VS, FS).unwrap();
        let second = cache.program(&mut device, VS, FS).unwrap();

        assert_eq!(first, second);
        assert_eq!(cache.stage_count(), 2);
        assert_eq!(cache.program_count(), 1);
        assert_eq!(device.program_count(), 1);
    }

    #[test]
    fn test_same_source_different_stage() {
        let mut device = RecordingDevice::new();
        let mut cache = ShaderCache::new();

        let vertex = cache.shader(&mut device, ShaderStage::Vertex, VS).unwrap();
        let fragment = cache.shader(&mut device, ShaderStage::Fragment, VS).unwrap();
        assert_ne!(vertex, fragment);
    }

    #[test]
    fn test_compile_error_is_not_cached() {
        let mut device = RecordingDevice::new();
        let mut cache = ShaderCache::new();

        let result = cache.program(&mut device, "broken", FS);
        assert!(matches!(
            result,
            Err(ShaderError::Compile { stage: ShaderStage::Vertex, .. })
        ));
        assert_eq!(cache.stage_count(), 0);
    }

    #[test]
    fn test_clear() {
        let mut device = RecordingDevice::new();
        let mut cache = ShaderCache::new();
        let first = cache.program(&mut device, VS, FS).unwrap();

        cache.clear();
        assert_eq!(cache.program_count(), 0);

        let second = cache.program(&mut device, VS, FS).unwrap();
        assert_ne!(first, second);
    }
}
