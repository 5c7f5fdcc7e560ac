use image::RgbaImage;

use crate::rendering::domain::quad_renderer::QuadRenderer;
use crate::shared::frame::Frame;
use crate::tracking::domain::decorated_face::DecoratedFace;

/// Software compositor for axis-aligned decoration quads.
///
/// Samples the texture nearest-neighbour at each covered pixel centre and
/// blends source-over onto the RGB frame. Pixels outside the frame are
/// clipped.
pub struct CpuQuadCompositor;

impl CpuQuadCompositor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CpuQuadCompositor {
    fn default() -> Self {
        Self::new()
    }
}

fn blend(src: u8, dst: u8, alpha: u8) -> u8 {
    let a = alpha as u32;
    ((src as u32 * a + dst as u32 * (255 - a) + 127) / 255) as u8
}

/// Texel index for normalised coordinate `t` in `[0, 1)`.
fn texel(t: f64, size: u32, mirrored: bool) -> u32 {
    let t = if mirrored { 1.0 - t } else { t };
    ((t * size as f64) as u32).min(size - 1)
}

impl QuadRenderer for CpuQuadCompositor {
    fn draw_quad(
        &self,
        frame: &mut Frame,
        texture: &RgbaImage,
        face: &DecoratedFace,
    ) -> Result<(), Box<dyn std::error::Error>> {
        if frame.channels() != 3 {
            return Err(format!(
                "Expected an RGB frame, got {} channels",
                frame.channels()
            )
            .into());
        }
        if !face.has_area() || texture.width() == 0 || texture.height() == 0 {
            return Ok(());
        }

        let [(left, top), _, (right, bottom), _] = face.corners();
        let (fw, fh) = (frame.width() as f64, frame.height() as f64);
        let x_start = left.floor().max(0.0) as usize;
        let x_end = right.ceil().min(fw).max(0.0) as usize;
        let y_start = top.floor().max(0.0) as usize;
        let y_end = bottom.ceil().min(fh).max(0.0) as usize;
        let (quad_w, quad_h) = (right - left, bottom - top);

        let stride = frame.width() as usize * 3;
        let data = frame.data_mut();

        for py in y_start..y_end {
            let v = (py as f64 + 0.5 - top) / quad_h;
            if !(0.0..1.0).contains(&v) {
                continue;
            }
            let ty = texel(v, texture.height(), face.mirror_vertical);

            for px in x_start..x_end {
                let u = (px as f64 + 0.5 - left) / quad_w;
                if !(0.0..1.0).contains(&u) {
                    continue;
                }
                let tx = texel(u, texture.width(), face.mirror_horizontal);

                let [r, g, b, a] = texture.get_pixel(tx, ty).0;
                if a == 0 {
                    continue;
                }
                let offset = py * stride + px * 3;
                let pixel = &mut data[offset..offset + 3];
                pixel[0] = blend(r, pixel[0], a);
                pixel[1] = blend(g, pixel[1], a);
                pixel[2] = blend(b, pixel[2], a);
            }
        }

        Ok(())
    }
}
