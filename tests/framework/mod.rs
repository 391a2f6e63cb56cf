//! Shared test support: a headless driver that records every call it receives.

use deimos::prelude::*;
use deimos::vk;

/// One call made by the frame graph against the driver, in submission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverCall {
    CreateTexture {
        texture: TextureHandle,
        format: vk::Format,
        usage: TextureUsage,
    },
    DestroyTexture(TextureHandle),
    CreateRenderTarget {
        target: RenderTargetHandle,
        attachments: AttachmentFlags,
        samples: u8,
    },
    DestroyRenderTarget(RenderTargetHandle),
}

/// Driver that hands out sequential handles and records the full call stream, so
/// tests can assert on allocation order and alloc/release balance.
#[derive(Debug, Default)]
pub struct RecordingDriver {
    next_handle: u64,
    pub calls: Vec<DriverCall>,
}

#[allow(dead_code)]
impl RecordingDriver {
    pub fn new() -> Self {
        Self::default()
    }

    fn next(&mut self) -> u64 {
        self.next_handle += 1;
        self.next_handle
    }

    /// Textures created and not yet destroyed.
    pub fn alive_textures(&self) -> usize {
        let created = self
            .calls
            .iter()
            .filter(|call| matches!(call, DriverCall::CreateTexture { .. }))
            .count();
        let destroyed = self
            .calls
            .iter()
            .filter(|call| matches!(call, DriverCall::DestroyTexture(_)))
            .count();
        created - destroyed
    }

    /// Render targets created and not yet destroyed.
    pub fn alive_render_targets(&self) -> usize {
        let created = self
            .calls
            .iter()
            .filter(|call| matches!(call, DriverCall::CreateRenderTarget { .. }))
            .count();
        let destroyed = self
            .calls
            .iter()
            .filter(|call| matches!(call, DriverCall::DestroyRenderTarget(_)))
            .count();
        created - destroyed
    }
}

impl Driver for RecordingDriver {
    fn create_texture(
        &mut self,
        _ty: vk::ImageType,
        _levels: u8,
        format: vk::Format,
        _samples: u8,
        _width: u32,
        _height: u32,
        _depth: u32,
        usage: TextureUsage,
    ) -> TextureHandle {
        let texture = TextureHandle(self.next());
        self.calls.push(DriverCall::CreateTexture {
            texture,
            format,
            usage,
        });
        texture
    }

    fn destroy_texture(&mut self, texture: TextureHandle) {
        self.calls.push(DriverCall::DestroyTexture(texture));
    }

    fn create_render_target(
        &mut self,
        attachments: AttachmentFlags,
        _width: u32,
        _height: u32,
        samples: u8,
        _format: vk::Format,
        _color: Option<TextureHandle>,
        _depth: Option<TextureHandle>,
        _stencil: Option<TextureHandle>,
    ) -> RenderTargetHandle {
        let target = RenderTargetHandle(self.next());
        self.calls.push(DriverCall::CreateRenderTarget {
            target,
            attachments,
            samples,
        });
        target
    }

    fn destroy_render_target(&mut self, target: RenderTargetHandle) {
        self.calls.push(DriverCall::DestroyRenderTarget(target));
    }
}
