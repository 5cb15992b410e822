// ABOUTME: Software backend that records every GPU command instead of executing it.
// ABOUTME: Lets draw code be checked without a window or graphics driver.

use std::collections::HashMap;

use glyph_core::{Color, Mat4, Viewport};

use crate::backend::{BackendError, HandleAllocator, RenderBackend, Sampling, TextureHandle};
use crate::quad::QuadVertex;
use crate::rasterizer::GlyphBitmap;

#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    CreateTexture {
        texture: TextureHandle,
        width: u32,
        height: u32,
        sampling: Sampling,
    },
    ReleaseTexture(TextureHandle),
    BeginFrame(Viewport),
    Clear(Color),
    UseProgram,
    SetMvp(Mat4),
    BindTexture {
        unit: u32,
        texture: TextureHandle,
    },
    UploadVertices(Vec<QuadVertex>),
    DrawTriangles(u32),
    EndFrame,
}

/// Texture contents as uploaded
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedTexture {
    pub width: u32,
    pub height: u32,
    pub bytes_per_row: u32,
    pub sampling: Sampling,
    pub pixels: Vec<u8>,
}

#[derive(Debug, Default)]
pub struct RecordingBackend {
    calls: Vec<RecordedCall>,
    textures: HashMap<TextureHandle, RecordedTexture>,
    handles: HandleAllocator,
    fail_texture_uploads: bool,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following `create_texture` fail
    pub fn fail_texture_uploads(&mut self, fail: bool) {
        self.fail_texture_uploads = fail;
    }

    pub fn calls(&self) -> &[RecordedCall] {
        &self.calls
    }

    pub fn take_calls(&mut self) -> Vec<RecordedCall> {
        std::mem::take(&mut self.calls)
    }

    pub fn texture(&self, texture: TextureHandle) -> Option<&RecordedTexture> {
        self.textures.get(&texture)
    }

    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    pub fn draw_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, RecordedCall::DrawTriangles(_)))
            .count()
    }
}

impl RenderBackend for RecordingBackend {
    fn create_texture(
        &mut self,
        bitmap: &GlyphBitmap,
        sampling: Sampling,
    ) -> Result<TextureHandle, BackendError> {
        if self.fail_texture_uploads {
            return Err(BackendError::Upload("uploads disabled".to_string()));
        }

        let (width, height) = bitmap.texture_size();
        let pixels = bitmap.texture_data().to_vec();
        if pixels.len() != (bitmap.bytes_per_row() * height) as usize {
            return Err(BackendError::Upload(format!(
                "{} bytes for a {}x{} texture",
                pixels.len(),
                width,
                height
            )));
        }

        let texture = self.handles.next();
        self.textures.insert(
            texture,
            RecordedTexture {
                width,
                height,
                bytes_per_row: bitmap.bytes_per_row(),
                sampling,
                pixels,
            },
        );
        self.calls.push(RecordedCall::CreateTexture {
            texture,
            width,
            height,
            sampling,
        });
        Ok(texture)
    }

    fn release_texture(&mut self, texture: TextureHandle) -> bool {
        self.calls.push(RecordedCall::ReleaseTexture(texture));
        self.textures.remove(&texture).is_some()
    }

    fn begin_frame(&mut self, viewport: Viewport) -> Result<(), BackendError> {
        self.calls.push(RecordedCall::BeginFrame(viewport));
        Ok(())
    }

    fn clear(&mut self, color: Color) {
        self.calls.push(RecordedCall::Clear(color));
    }

    fn use_program(&mut self) {
        self.calls.push(RecordedCall::UseProgram);
    }

    fn set_mvp(&mut self, mvp: &Mat4) {
        self.calls.push(RecordedCall::SetMvp(*mvp));
    }

    fn bind_texture(&mut self, unit: u32, texture: TextureHandle) -> Result<(), BackendError> {
        if !self.textures.contains_key(&texture) {
            return Err(BackendError::UnknownTexture(texture));
        }
        self.calls.push(RecordedCall::BindTexture { unit, texture });
        Ok(())
    }

    fn upload_vertices(&mut self, vertices: &[QuadVertex]) -> Result<(), BackendError> {
        self.calls.push(RecordedCall::UploadVertices(vertices.to_vec()));
        Ok(())
    }

    fn draw_triangles(&mut self, vertex_count: u32) -> Result<(), BackendError> {
        self.calls.push(RecordedCall::DrawTriangles(vertex_count));
        Ok(())
    }

    fn end_frame(&mut self) -> Result<(), BackendError> {
        self.calls.push(RecordedCall::EndFrame);
        Ok(())
    }
}
