use bytemuck::{Pod, Zeroable};
use winit::dpi::PhysicalSize;

use crate::animation::JuliaConstant;
use crate::view::ViewState;

/// Everything the render loop hands to the GPU for one frame.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FrameParameters<'a> {
    pub view: &'a ViewState,
    pub constant: JuliaConstant,
    pub mirror_imaginary: bool,
}

/// CPU mirror of the `FractalParams` std140 block declared by the shader
/// wrapper in `compile.rs`.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub(crate) struct FractalUniforms {
    pub screen_size: [f32; 2],
    pub screen_ratio: f32,
    pub c_re: f32,
    pub c_im: f32,
    pub zoom: f32,
    pub center: [f32; 2],
    pub itr: i32,
    pub padding: [f32; 3],
}

impl FractalUniforms {
    pub fn new(size: PhysicalSize<u32>, frame: &FrameParameters<'_>) -> Self {
        let width = size.width.max(1) as f32;
        let height = size.height.max(1) as f32;
        let view = frame.view;
        Self {
            screen_size: [width, height],
            screen_ratio: width / height,
            c_re: frame.constant.re as f32,
            c_im: frame.constant.uniform_imaginary(frame.mirror_imaginary) as f32,
            zoom: view.zoom as f32,
            center: [view.center[0] as f32, view.center[1] as f32],
            itr: i32::try_from(view.iterations).unwrap_or(i32::MAX),
            padding: [0.0; 3],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_is_std140_sized() {
        assert_eq!(std::mem::size_of::<FractalUniforms>(), 48);
        assert_eq!(std::mem::offset_of!(FractalUniforms, center), 24);
        assert_eq!(std::mem::offset_of!(FractalUniforms, itr), 32);
    }

    #[test]
    fn mirrors_real_part_into_imaginary_by_default() {
        let view = ViewState::default();
        let constant = JuliaConstant { re: 0.5, im: -0.25 };
        let size = PhysicalSize::new(640, 480);

        let mirrored = FractalUniforms::new(
            size,
            &FrameParameters {
                view: &view,
                constant,
                mirror_imaginary: true,
            },
        );
        assert_eq!(mirrored.c_re, 0.5);
        assert_eq!(mirrored.c_im, 0.5);

        let separate = FractalUniforms::new(
            size,
            &FrameParameters {
                view: &view,
                constant,
                mirror_imaginary: false,
            },
        );
        assert_eq!(separate.c_im, -0.25);
    }

    #[test]
    fn screen_values_follow_window() {
        let mut view = ViewState::default();
        view.iterations = u32::MAX;
        let uniforms = FractalUniforms::new(
            PhysicalSize::new(800, 400),
            &FrameParameters {
                view: &view,
                constant: JuliaConstant::default(),
                mirror_imaginary: true,
            },
        );
        assert_eq!(uniforms.screen_size, [800.0, 400.0]);
        assert_eq!(uniforms.screen_ratio, 2.0);
        assert_eq!(uniforms.zoom, 0.5);
        assert_eq!(uniforms.itr, i32::MAX);
    }
}
