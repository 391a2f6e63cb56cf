use std::cell::{Cell, RefCell};
use std::rc::Rc;

use anyhow::Result;
use deimos::prelude::*;
use deimos::vk;
use layout::gv;

mod framework;

use framework::{DriverCall, RecordingDriver};

#[derive(Debug, Copy, Clone)]
struct ProducerData {
    output: VirtualResource,
}

#[derive(Debug, Copy, Clone)]
struct FilterData {
    input: VirtualResource,
    output: VirtualResource,
}

#[test]
fn cull_passes_without_consumers() {
    let mut graph = FrameGraph::new();
    let a_ran = Rc::new(Cell::new(false));
    let b_ran = Rc::new(Cell::new(false));

    let ran = a_ran.clone();
    graph.add_pass(
        "a",
        |builder| {
            let output = builder.create_texture("r0", TextureDescriptor::default());
            ProducerData {
                output: builder.write(output),
            }
        },
        move |_, _, _| ran.set(true),
    );
    let ran = b_ran.clone();
    graph.add_pass(
        "b",
        |builder| {
            let output = builder.create_texture("r1", TextureDescriptor::default());
            ProducerData {
                output: builder.write(output),
            }
        },
        move |_, _, _| ran.set(true),
    );

    let mut driver = RecordingDriver::new();
    graph.compile().execute(&mut driver);

    // nothing consumed either output: both passes culled, the driver untouched
    assert!(!a_ran.get());
    assert!(!b_ran.get());
    assert!(driver.calls.is_empty());
}

#[test]
fn present_retains_a_single_producer() {
    let mut graph = FrameGraph::new();
    let ran = Rc::new(Cell::new(false));

    let flag = ran.clone();
    let render = graph.add_pass(
        "render",
        |builder| {
            let output = builder.create_texture("backbuffer", TextureDescriptor::default());
            ProducerData {
                output: builder.write(output),
            }
        },
        move |resources, data: &ProducerData, _| {
            resources.render_target(data.output);
            flag.set(true);
        },
    );
    graph.present(render.output);

    let mut driver = RecordingDriver::new();
    graph.compile().execute(&mut driver);

    assert!(ran.get());
    // allocated right before the producer, released right after the present pass
    assert_eq!(
        driver.calls,
        vec![
            DriverCall::CreateTexture {
                texture: TextureHandle(1),
                format: vk::Format::R8G8B8A8_UNORM,
                usage: TextureUsage::ColorAttachment,
            },
            DriverCall::CreateRenderTarget {
                target: RenderTargetHandle(2),
                attachments: AttachmentFlags::COLOR,
                samples: 1,
            },
            DriverCall::DestroyTexture(TextureHandle(1)),
            DriverCall::DestroyRenderTarget(RenderTargetHandle(2)),
        ]
    );
}

#[test]
fn chained_passes_bound_resource_lifetimes() {
    let mut graph = FrameGraph::new();
    let order = Rc::new(RefCell::new(Vec::new()));

    let log = order.clone();
    let render = graph.add_pass(
        "render",
        |builder| {
            let output = builder.create_texture("scene", TextureDescriptor::default());
            ProducerData {
                output: builder.write(output),
            }
        },
        move |_, _, _| log.borrow_mut().push("render"),
    );
    let log = order.clone();
    let post = graph.add_pass(
        "post",
        |builder| {
            let input = builder.read(render.output);
            let output = builder.create_texture("ldr", TextureDescriptor::default());
            FilterData {
                input,
                output: builder.write(output),
            }
        },
        move |_, _, _| log.borrow_mut().push("post"),
    );
    graph.present(post.output);

    let mut driver = RecordingDriver::new();
    graph.compile().execute(&mut driver);

    assert_eq!(*order.borrow(), vec!["render", "post"]);
    // "scene" lives from render to post, "ldr" from post to the present pass
    assert_eq!(
        driver.calls,
        vec![
            DriverCall::CreateTexture {
                texture: TextureHandle(1),
                format: vk::Format::R8G8B8A8_UNORM,
                usage: TextureUsage::ColorAttachment,
            },
            DriverCall::CreateRenderTarget {
                target: RenderTargetHandle(2),
                attachments: AttachmentFlags::COLOR,
                samples: 1,
            },
            DriverCall::CreateTexture {
                texture: TextureHandle(3),
                format: vk::Format::R8G8B8A8_UNORM,
                usage: TextureUsage::ColorAttachment,
            },
            DriverCall::CreateRenderTarget {
                target: RenderTargetHandle(4),
                attachments: AttachmentFlags::COLOR,
                samples: 1,
            },
            DriverCall::DestroyTexture(TextureHandle(1)),
            DriverCall::DestroyRenderTarget(RenderTargetHandle(2)),
            DriverCall::DestroyTexture(TextureHandle(3)),
            DriverCall::DestroyRenderTarget(RenderTargetHandle(4)),
        ]
    );
}

#[test]
fn write_through_a_stale_handle_is_rejected() {
    let mut graph = FrameGraph::new();

    let a = graph.add_pass(
        "a",
        |builder| {
            let h0 = builder.create_texture("r0", TextureDescriptor::default());
            FilterData {
                input: h0,
                output: builder.write(h0),
            }
        },
        |_, _: &FilterData, _| {},
    );

    let b_ran = Rc::new(Cell::new(false));
    let ran = b_ran.clone();
    let b = graph.add_pass(
        "b",
        |builder| {
            // a.output holds the current version; writing through the old handle fails
            ProducerData {
                output: builder.write(a.input),
            }
        },
        move |_, _, _| ran.set(true),
    );

    assert!(!b.output.is_initialized());
    assert!(!graph.is_valid(b.output));
    assert!(!graph.is_valid(a.input));
    assert!(graph.is_valid(a.output));
    // the rejected write did not bump the version
    assert!(graph.descriptor(a.output).is_some());
    assert!(graph.descriptor(a.input).is_none());

    let mut driver = RecordingDriver::new();
    graph.compile().execute(&mut driver);

    // "a" lost its only consumer and is culled; "b" recorded no writes, so it only
    // exists for its side effects and still runs
    assert!(b_ran.get());
    assert!(driver.calls.is_empty());
}

#[test]
fn writes_rename_handles() {
    let mut graph = FrameGraph::new();

    let render = graph.add_pass(
        "render",
        |builder| {
            let output = builder.create_texture("scene", TextureDescriptor::default());
            ProducerData {
                output: builder.write(output),
            }
        },
        |_, _: &ProducerData, _| {},
    );
    let post = graph.add_pass(
        "post",
        |builder| {
            let input = builder.read(render.output);
            let output = builder.write(input);
            assert!(builder.is_valid(output));
            assert!(!builder.is_valid(input));
            FilterData { input, output }
        },
        |_, _: &FilterData, _| {},
    );
    graph.present(post.output);

    assert!(!graph.is_valid(render.output));
    assert!(!graph.is_valid(post.input));
    assert!(graph.is_valid(post.output));

    let mut driver = RecordingDriver::new();
    graph.compile().execute(&mut driver);

    assert!(!driver.calls.is_empty());
    assert_eq!(driver.alive_textures(), 0);
    assert_eq!(driver.alive_render_targets(), 0);
}

#[test]
fn moved_resources_share_one_physical_record() -> Result<()> {
    let mut graph = FrameGraph::new();
    let targets = Rc::new(RefCell::new(Vec::new()));

    let seen = targets.clone();
    let a = graph.add_pass(
        "a",
        |builder| {
            let output = builder.create_texture("r0", TextureDescriptor::default());
            ProducerData {
                output: builder.write(output),
            }
        },
        move |resources, data: &ProducerData, _| {
            seen.borrow_mut().push(resources.render_target(data.output));
        },
    );
    let seen = targets.clone();
    let b = graph.add_pass(
        "b",
        |builder| {
            let output = builder.create_texture("r1", TextureDescriptor::default());
            ProducerData {
                output: builder.write(output),
            }
        },
        move |resources, data: &ProducerData, _| {
            seen.borrow_mut().push(resources.render_target(data.output));
        },
    );

    graph.move_resource(a.output, b.output)?;
    graph.present(b.output);

    let mut driver = RecordingDriver::new();
    graph.compile().execute(&mut driver);

    // both passes resolved their own handle to the same driver target
    assert_eq!(targets.borrow().len(), 2);
    assert_eq!(targets.borrow()[0], targets.borrow()[1]);
    // the aliased-over record never allocates
    let textures = driver
        .calls
        .iter()
        .filter(|call| matches!(call, DriverCall::CreateTexture { .. }))
        .count();
    let render_targets = driver
        .calls
        .iter()
        .filter(|call| matches!(call, DriverCall::CreateRenderTarget { .. }))
        .count();
    assert_eq!(textures, 1);
    assert_eq!(render_targets, 1);
    Ok(())
}

#[test]
fn culling_is_transitive() {
    let mut graph = FrameGraph::new();
    let executed = Rc::new(Cell::new(0u32));

    let count = executed.clone();
    let a = graph.add_pass(
        "a",
        |builder| {
            let output = builder.create_texture("r0", TextureDescriptor::default());
            ProducerData {
                output: builder.write(output),
            }
        },
        move |_, _, _| count.set(count.get() + 1),
    );
    let count = executed.clone();
    let b = graph.add_pass(
        "b",
        |builder| {
            let input = builder.read(a.output);
            let output = builder.create_texture("r1", TextureDescriptor::default());
            FilterData {
                input,
                output: builder.write(output),
            }
        },
        move |_, _, _| count.set(count.get() + 1),
    );
    let count = executed.clone();
    graph.add_pass(
        "c",
        |builder| {
            let input = builder.read(b.output);
            let output = builder.create_texture("r2", TextureDescriptor::default());
            FilterData {
                input,
                output: builder.write(output),
            }
        },
        move |_, _, _| count.set(count.get() + 1),
    );

    let mut driver = RecordingDriver::new();
    graph.compile().execute(&mut driver);

    // r2 has no readers, which culls c, which dries up r1, and so on up the chain
    assert_eq!(executed.get(), 0);
    assert!(driver.calls.is_empty());
}

#[test]
fn execute_resets_the_graph() {
    let mut graph = FrameGraph::new();

    let render = graph.add_pass(
        "render",
        |builder| {
            let output = builder.create_texture("backbuffer", TextureDescriptor::default());
            ProducerData {
                output: builder.write(output),
            }
        },
        |_, _: &ProducerData, _| {},
    );
    graph.present(render.output);

    let mut driver = RecordingDriver::new();
    graph.compile().execute(&mut driver);
    assert_eq!(driver.calls.len(), 4);

    // the graph is empty again; handles from the previous frame no longer resolve
    assert!(!graph.is_valid(render.output));
    assert!(graph.descriptor(render.output).is_none());

    // and it can record a fresh frame from scratch
    let second = graph.add_pass(
        "render",
        |builder| {
            let output = builder.create_texture("backbuffer", TextureDescriptor::default());
            ProducerData {
                output: builder.write(output),
            }
        },
        |_, _: &ProducerData, _| {},
    );
    graph.present(second.output);

    let mut driver = RecordingDriver::new();
    graph.compile().execute(&mut driver);
    assert_eq!(driver.calls.len(), 4);
    assert_eq!(driver.alive_textures(), 0);
    assert_eq!(driver.alive_render_targets(), 0);
}

#[test]
fn move_resource_rejects_stale_handles() {
    let mut graph = FrameGraph::new();

    let a = graph.add_pass(
        "a",
        |builder| {
            let h0 = builder.create_texture("r0", TextureDescriptor::default());
            FilterData {
                input: h0,
                output: builder.write(h0),
            }
        },
        |_, _: &FilterData, _| {},
    );
    let b = graph.add_pass(
        "b",
        |builder| {
            let output = builder.create_texture("r1", TextureDescriptor::default());
            ProducerData {
                output: builder.write(output),
            }
        },
        |_, _: &ProducerData, _| {},
    );

    assert!(graph.move_resource(a.input, b.output).is_err());
    assert!(graph.move_resource(a.output, VirtualResource::default()).is_err());
    assert!(graph.move_resource(a.output, b.output).is_ok());
}

#[test]
fn moves_invalidated_by_later_writes_are_dropped() -> Result<()> {
    let mut graph = FrameGraph::new();
    let a_ran = Rc::new(Cell::new(false));
    let b_ran = Rc::new(Cell::new(false));

    let ran = a_ran.clone();
    let a = graph.add_pass(
        "a",
        |builder| {
            let output = builder.create_texture("r0", TextureDescriptor::default());
            ProducerData {
                output: builder.write(output),
            }
        },
        move |_, _, _| ran.set(true),
    );
    let ran = b_ran.clone();
    let b = graph.add_pass(
        "b",
        |builder| {
            let output = builder.create_texture("r1", TextureDescriptor::default());
            ProducerData {
                output: builder.write(output),
            }
        },
        move |_, _, _| ran.set(true),
    );

    // valid when recorded...
    graph.move_resource(a.output, b.output)?;

    // ...but c renames r1 afterwards, so the alias is dropped at compile time
    let c = graph.add_pass(
        "c",
        |builder| ProducerData {
            output: builder.write(b.output),
        },
        |_, _: &ProducerData, _| {},
    );
    graph.present(c.output);

    let mut driver = RecordingDriver::new();
    graph.compile().execute(&mut driver);

    // with the alias gone, nothing consumes r0 and a is culled; b still feeds c
    assert!(!a_ran.get());
    assert!(b_ran.get());
    let textures = driver
        .calls
        .iter()
        .filter(|call| matches!(call, DriverCall::CreateTexture { .. }))
        .count();
    assert_eq!(textures, 1);
    Ok(())
}

#[test]
fn descriptors_are_version_checked() {
    let mut graph = FrameGraph::new();
    let desc = TextureDescriptor {
        width: 1280,
        height: 720,
        format: vk::Format::R16G16B16A16_SFLOAT,
        ..Default::default()
    };

    let render = graph.add_pass(
        "render",
        move |builder| {
            let output = builder.create_texture("hdr", desc);
            assert_eq!(builder.descriptor(output), Some(&desc));
            ProducerData {
                output: builder.write(output),
            }
        },
        |_, _: &ProducerData, _| {},
    );

    assert_eq!(graph.descriptor(render.output), Some(&desc));
}

#[test]
fn graphviz_dump_is_well_formed() -> Result<()> {
    let mut graph = FrameGraph::new();

    let render = graph.add_pass(
        "render",
        |builder| {
            let output = builder.create_texture("scene", TextureDescriptor::default());
            ProducerData {
                output: builder.write(output),
            }
        },
        |_, _: &ProducerData, _| {},
    );
    let post = graph.add_pass(
        "post",
        |builder| {
            let input = builder.read(render.output);
            FilterData {
                input,
                output: builder.write(input),
            }
        },
        |_, _: &FilterData, _| {},
    );
    // reads the scene but feeds nothing observable: culled
    graph.add_pass(
        "debug",
        |builder| {
            let input = builder.read(render.output);
            let output = builder.create_texture("overlay", TextureDescriptor::default());
            FilterData {
                input,
                output: builder.write(output),
            }
        },
        |_, _: &FilterData, _| {},
    );
    graph.present(post.output);

    graph.compile();

    let mut dot = Vec::new();
    graph.export_graphviz(&mut dot, false)?;
    let dot = String::from_utf8(dot)?;

    assert!(dot.starts_with("digraph framegraph {"));
    assert!(dot.contains("rankdir = LR"));
    assert!(dot.contains("\"P0\""));
    assert!(dot.contains("\"R0_0\""));
    assert!(dot.contains("darkorange4"));
    assert!(dot.contains("skyblue4"));

    let mut parser = gv::DotParser::new(&dot);
    assert!(parser.process().is_ok(), "emitted dot does not parse");

    // culled passes and dead resources can be suppressed
    let mut trimmed = Vec::new();
    graph.export_graphviz(&mut trimmed, true)?;
    let trimmed = String::from_utf8(trimmed)?;
    assert!(!trimmed.contains("darkorange4"));
    assert!(!trimmed.contains("skyblue4"));

    let mut driver = RecordingDriver::new();
    graph.execute(&mut driver);
    Ok(())
}
