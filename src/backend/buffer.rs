// Vertex buffer and vertex-array objects
//
// Both wrappers own their handle exclusively and delete it on drop. Layout is
// described by the caller through a closure that runs while the vertex array
// is bound.

use std::rc::Rc;

use super::gl::GlApi;
use crate::error::{InitError, Result};

/// Static vertex data uploaded once to an ARRAY_BUFFER.
pub struct VertexBuffer<G: GlApi> {
    gl: Rc<G>,
    handle: G::Buffer,
    size_bytes: usize,
}

impl<G: GlApi> VertexBuffer<G> {
    pub fn new<T: bytemuck::Pod>(gl: &Rc<G>, data: &[T]) -> Result<Self> {
        let handle = gl
            .create_buffer()
            .map_err(|reason| InitError::ResourceCreate {
                what: "vertex buffer",
                reason,
            })?;

        let bytes: &[u8] = bytemuck::cast_slice(data);
        gl.bind_array_buffer(Some(handle));
        gl.array_buffer_data(bytes);
        gl.bind_array_buffer(None);

        log::debug!("Uploaded {} bytes to vertex buffer {:?}", bytes.len(), handle);

        Ok(Self {
            gl: Rc::clone(gl),
            handle,
            size_bytes: bytes.len(),
        })
    }

    pub fn handle(&self) -> G::Buffer {
        self.handle
    }

    pub fn size_bytes(&self) -> usize {
        self.size_bytes
    }
}

impl<G: GlApi> Drop for VertexBuffer<G> {
    fn drop(&mut self) {
        self.gl.delete_buffer(self.handle);
    }
}

/// Vertex-array object describing how buffers feed shader attributes.
pub struct VertexArray<G: GlApi> {
    gl: Rc<G>,
    handle: G::VertexArray,
}

impl<G: GlApi> VertexArray<G> {
    /// Create the array and run `configure` while it is bound.
    pub fn new<F>(gl: &Rc<G>, configure: F) -> Result<Self>
    where
        F: FnOnce(&G),
    {
        let handle = gl
            .create_vertex_array()
            .map_err(|reason| InitError::ResourceCreate {
                what: "vertex array",
                reason,
            })?;

        gl.bind_vertex_array(Some(handle));
        configure(gl.as_ref());
        gl.bind_vertex_array(None);

        Ok(Self {
            gl: Rc::clone(gl),
            handle,
        })
    }

    pub fn handle(&self) -> G::VertexArray {
        self.handle
    }
}

impl<G: GlApi> Drop for VertexArray<G> {
    fn drop(&mut self) {
        self.gl.delete_vertex_array(self.handle);
    }
}

/// Layout step for tightly packed 2D f32 positions in attribute slot 0.
pub fn describe_position_2d<G: GlApi>(gl: &G, buffer: &VertexBuffer<G>) {
    gl.bind_array_buffer(Some(buffer.handle()));
    gl.vertex_attrib_pointer_f32(0, 2, 0, 0);
    gl.enable_vertex_attrib_array(0);
    gl.bind_array_buffer(None);
}

/// Number of vertices in `float_count` floats at `floats_per_vertex` each.
pub fn vertex_count(float_count: usize, floats_per_vertex: usize) -> usize {
    if floats_per_vertex == 0 {
        return 0;
    }
    float_count / floats_per_vertex
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::testing::{Call, CountingGl, Kind};
    use glam::Vec2;

    const QUAD: [Vec2; 4] = [
        Vec2::new(-1.0, 1.0),
        Vec2::new(-1.0, -1.0),
        Vec2::new(1.0, 1.0),
        Vec2::new(1.0, -1.0),
    ];

    #[test]
    fn buffer_upload_is_bound_then_unbound() {
        let gl = Rc::new(CountingGl::new());
        let buffer = VertexBuffer::new(&gl, &QUAD).unwrap();

        assert_eq!(buffer.size_bytes(), 4 * 2 * 4);
        assert_eq!(
            gl.calls(),
            vec![
                Call::BindArrayBuffer(Some(buffer.handle())),
                Call::BufferData(32),
                Call::BindArrayBuffer(None),
            ]
        );
    }

    #[test]
    fn array_configuration_runs_while_bound() {
        let gl = Rc::new(CountingGl::new());
        let buffer = VertexBuffer::new(&gl, &QUAD).unwrap();
        gl.clear_calls();

        let array = VertexArray::new(&gl, |gl| describe_position_2d(gl, &buffer)).unwrap();

        assert_eq!(
            gl.calls(),
            vec![
                Call::BindVertexArray(Some(array.handle())),
                Call::BindArrayBuffer(Some(buffer.handle())),
                Call::AttribPointer {
                    index: 0,
                    components: 2,
                    stride: 0,
                    offset: 0
                },
                Call::EnableAttrib(0),
                Call::BindArrayBuffer(None),
                Call::BindVertexArray(None),
            ]
        );
    }

    #[test]
    fn construct_and_drop_leaks_nothing() {
        let gl = Rc::new(CountingGl::new());
        {
            let buffer = VertexBuffer::new(&gl, &QUAD).unwrap();
            let _array = VertexArray::new(&gl, |gl| describe_position_2d(gl, &buffer)).unwrap();
            assert_eq!(gl.live(Kind::Buffer), 1);
            assert_eq!(gl.live(Kind::VertexArray), 1);
        }
        assert_eq!(gl.live_total(), 0);
        assert_eq!(gl.double_releases(), 0);
    }

    #[test]
    fn vertex_count_uses_float_stride() {
        assert_eq!(vertex_count(8, 2), 4);
        assert_eq!(vertex_count(9, 3), 3);
        assert_eq!(vertex_count(8, 0), 0);
    }
}
