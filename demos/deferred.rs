//! A deferred-shading shaped frame: depth prepass, gbuffer, lighting, tonemap,
//! present. The compiled graph is dumped to stdout in graphviz format, then
//! executed against a driver that logs every call it receives.
//!
//! Run with `RUST_LOG=info cargo run --example deferred` to see the driver calls.

use anyhow::Result;
use deimos::prelude::*;
use deimos::vk;
use log::info;

/// Stand-in backend: hands out sequential handles and logs what a real driver
/// would allocate and release.
#[derive(Default)]
struct LoggingDriver {
    next_handle: u64,
}

impl LoggingDriver {
    fn next(&mut self) -> u64 {
        self.next_handle += 1;
        self.next_handle
    }
}

impl Driver for LoggingDriver {
    fn create_texture(
        &mut self,
        _ty: vk::ImageType,
        levels: u8,
        format: vk::Format,
        _samples: u8,
        width: u32,
        height: u32,
        _depth: u32,
        usage: TextureUsage,
    ) -> TextureHandle {
        let texture = TextureHandle(self.next());
        info!(
            "create_texture {format:?} {width}x{height} levels={levels} {usage:?} -> {texture:?}"
        );
        texture
    }

    fn destroy_texture(&mut self, texture: TextureHandle) {
        info!("destroy_texture {texture:?}");
    }

    fn create_render_target(
        &mut self,
        attachments: AttachmentFlags,
        width: u32,
        height: u32,
        samples: u8,
        _format: vk::Format,
        _color: Option<TextureHandle>,
        _depth: Option<TextureHandle>,
        _stencil: Option<TextureHandle>,
    ) -> RenderTargetHandle {
        let target = RenderTargetHandle(self.next());
        info!(
            "create_render_target {attachments:?} {width}x{height} samples={samples} -> {target:?}"
        );
        target
    }

    fn destroy_render_target(&mut self, target: RenderTargetHandle) {
        info!("destroy_render_target {target:?}");
    }
}

#[derive(Copy, Clone)]
struct DepthPrepassData {
    depth: VirtualResource,
}

#[derive(Copy, Clone)]
struct GBufferData {
    albedo: VirtualResource,
    normal: VirtualResource,
}

#[derive(Copy, Clone)]
struct LightingData {
    depth: VirtualResource,
    albedo: VirtualResource,
    normal: VirtualResource,
    hdr: VirtualResource,
}

#[derive(Copy, Clone)]
struct TonemapData {
    hdr: VirtualResource,
    ldr: VirtualResource,
}

fn main() -> Result<()> {
    pretty_env_logger::init();

    let screen = |format| TextureDescriptor {
        width: 1920,
        height: 1080,
        format,
        ..Default::default()
    };

    let mut graph = FrameGraph::new();

    let depth_prepass = graph.add_pass(
        "depth prepass",
        |builder| {
            let depth = builder.create_texture("depth", screen(vk::Format::R8G8B8A8_UNORM));
            DepthPrepassData {
                depth: builder.write_flags(depth, RWFlags::DEPTH),
            }
        },
        |resources, data: &DepthPrepassData, _driver| {
            let target = resources.render_target(data.depth);
            info!("depth prepass drawing to {target:?}");
        },
    );

    let gbuffer = graph.add_pass(
        "gbuffer",
        |builder| {
            let albedo = builder.create_texture("albedo", screen(vk::Format::R8G8B8A8_UNORM));
            let normal = builder.create_texture("normal", screen(vk::Format::A2B10G10R10_UNORM_PACK32));
            GBufferData {
                albedo: builder.write(albedo),
                normal: builder.write(normal),
            }
        },
        |resources, data: &GBufferData, _driver| {
            info!(
                "gbuffer drawing to {:?} and {:?}",
                resources.render_target(data.albedo),
                resources.render_target(data.normal)
            );
        },
    );

    let lighting = graph.add_pass(
        "lighting",
        |builder| {
            let depth = builder.read_flags(depth_prepass.depth, RWFlags::DEPTH);
            let albedo = builder.read(gbuffer.albedo);
            let normal = builder.read(gbuffer.normal);
            let hdr = builder.create_texture("hdr", screen(vk::Format::R16G16B16A16_SFLOAT));
            LightingData {
                depth,
                albedo,
                normal,
                hdr: builder.write(hdr),
            }
        },
        |resources, data: &LightingData, _driver| {
            // depth is read as depth only, so the default usage resolves to the
            // depth texture
            info!(
                "lighting sampling {:?}, {:?}, {:?} into {:?}",
                resources.texture(data.depth, TextureUsage::Default),
                resources.texture(data.albedo, TextureUsage::Default),
                resources.texture(data.normal, TextureUsage::Default),
                resources.render_target(data.hdr)
            );
        },
    );

    let tonemap = graph.add_pass(
        "tonemap",
        |builder| {
            let hdr = builder.read(lighting.hdr);
            let ldr = builder.create_texture("ldr", screen(vk::Format::R8G8B8A8_UNORM));
            TonemapData {
                hdr,
                ldr: builder.write(ldr),
            }
        },
        |resources, data: &TonemapData, _driver| {
            info!(
                "tonemap sampling {:?} into {:?}",
                resources.texture(data.hdr, TextureUsage::Default),
                resources.render_target(data.ldr)
            );
        },
    );

    // never presented: compiles away together with its output
    graph.add_pass(
        "normal visualizer",
        |builder| {
            let normal = builder.read(gbuffer.normal);
            let overlay = builder.create_texture("overlay", screen(vk::Format::R8G8B8A8_UNORM));
            TonemapData {
                hdr: normal,
                ldr: builder.write(overlay),
            }
        },
        |_resources, _data: &TonemapData, _driver| {
            info!("normal visualizer should have been culled");
        },
    );

    graph.present(tonemap.ldr);

    graph.compile();
    graph.export_graphviz(&mut std::io::stdout(), false)?;

    let mut driver = LoggingDriver::default();
    graph.execute(&mut driver);
    Ok(())
}
