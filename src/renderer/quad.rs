use std::rc::Rc;

use anyhow::{anyhow, Result};
use glow::HasContext;

use super::shader::Shader;

#[repr(C)]
#[derive(Clone, Copy, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub pos: [f32; 2],
}

// Clip-space corners, drawn as a triangle strip.
const CORNERS: [Vertex; 4] = [
    Vertex { pos: [-1.0, -1.0] },
    Vertex { pos: [1.0, -1.0] },
    Vertex { pos: [-1.0, 1.0] },
    Vertex { pos: [1.0, 1.0] },
];

/// A full-screen quad for fragment-shader previews.
pub struct Quad {
    gl: Rc<glow::Context>,
    vbo: glow::Buffer,
}

impl Quad {
    pub fn new(gl: Rc<glow::Context>) -> Result<Self> {
        let vbo = unsafe {
            let vbo = gl
                .create_buffer()
                .map_err(|e| anyhow!("Failed to create buffer: {}", e))?;
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
            gl.buffer_data_u8_slice(
                glow::ARRAY_BUFFER,
                bytemuck::cast_slice(&CORNERS),
                glow::STATIC_DRAW,
            );
            gl.bind_buffer(glow::ARRAY_BUFFER, None);
            vbo
        };

        Ok(Self { gl, vbo })
    }

    pub fn begin(&self, viewport_px: [u32; 2], clear_color: [f32; 4]) {
        let [r, g, b, a] = clear_color;
        unsafe {
            self.gl.viewport(0, 0, viewport_px[0] as i32, viewport_px[1] as i32);
            self.gl.clear_color(r, g, b, a);
            self.gl.clear(glow::COLOR_BUFFER_BIT);

            self.gl.enable(glow::BLEND);
            self.gl.blend_func(glow::SRC_ALPHA, glow::ONE_MINUS_SRC_ALPHA);
        }
    }

    /// Draws the quad with `shader`, which must already be in use.
    pub fn draw(&self, shader: &Shader) {
        unsafe {
            self.gl.bind_buffer(glow::ARRAY_BUFFER, Some(self.vbo));

            let a_pos = self.gl.get_attrib_location(shader.id(), "aPos");
            if let Some(a_pos) = a_pos {
                self.gl.enable_vertex_attrib_array(a_pos);
                self.gl.vertex_attrib_pointer_f32(
                    a_pos,
                    2,
                    glow::FLOAT,
                    false,
                    std::mem::size_of::<Vertex>() as i32,
                    0,
                );
            }

            self.gl.draw_arrays(glow::TRIANGLE_STRIP, 0, CORNERS.len() as i32);

            if let Some(a_pos) = a_pos {
                self.gl.disable_vertex_attrib_array(a_pos);
            }
            self.gl.bind_buffer(glow::ARRAY_BUFFER, None);
        }
    }
}

impl Drop for Quad {
    fn drop(&mut self) {
        unsafe {
            self.gl.delete_buffer(self.vbo);
        }
    }
}
