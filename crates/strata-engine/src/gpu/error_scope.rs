use crate::error::RenderError;

/// Runs `f` inside a validation error scope when `enabled`, logging whatever the
/// scope caught. The result of `f` is returned either way.
pub(crate) fn validated<T>(
    device: &wgpu::Device,
    enabled: bool,
    label: &'static str,
    f: impl FnOnce() -> T,
) -> T {
    if !enabled {
        return f();
    }

    let scope = device.push_error_scope(wgpu::ErrorFilter::Validation);
    let out = f();
    if let Some(err) = pollster::block_on(scope.pop()) {
        let err = RenderError::GpuState { label, message: err.to_string() };
        log::error!("{err}");
    }
    out
}
