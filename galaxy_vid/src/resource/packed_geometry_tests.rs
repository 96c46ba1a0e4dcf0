use super::*;
use crate::context::ContextDesc;
use crate::error::Error;
use crate::graphics_device::{HeadlessGraphicsDevice, SharedDeviceLog, DeviceCall, BufferFormat};

const VERTEX: &str = "attribute vec2 aPos; attribute vec2 aUV; void main() {}";
const FRAGMENT: &str = "void main() {}";

fn context(max_quads: u32) -> (RenderContext, SharedDeviceLog) {
    let device = HeadlessGraphicsDevice::new();
    let log = device.log();
    let mut desc = ContextDesc::new(32, 32);
    desc.max_quads = Some(max_quads);
    (RenderContext::new(desc, device).unwrap(), log)
}

fn layout() -> VertexLayout {
    VertexLayout::interleaved(&[
        ("aPos", BufferFormat::R32G32_SFLOAT),
        ("aUV", BufferFormat::R32G32_SFLOAT),
    ])
}

fn packed(shape: SlotShape) -> PackedGeometry {
    let mut geometry = PackedGeometry::new(shape, 4, layout()).unwrap();
    geometry.set_buffer_count(2);
    geometry
}

// ============================================================================
// Slots
// ============================================================================

#[test]
fn test_new_rejects_stride_mismatch() {
    let result = PackedGeometry::new(SlotShape::Triangle, 8, layout());
    assert!(matches!(result, Err(Error::LayoutMismatch(_))));
}

#[test]
fn test_slot_size_follows_shape() {
    let mut triangles = packed(SlotShape::Triangle);
    let mut quads = packed(SlotShape::Quad);
    triangles.allocate();
    quads.allocate();
    assert_eq!(triangles.data().len(), 12);
    assert_eq!(quads.data().len(), 16);
}

#[test]
fn test_free_zeroes_and_recycles() {
    let mut geometry = packed(SlotShape::Triangle);
    let a = geometry.allocate();
    let b = geometry.allocate();
    geometry.slot_mut(a).unwrap().fill(1.0);
    geometry.slot_mut(b).unwrap().fill(2.0);

    geometry.free(a).unwrap();
    assert!(geometry.slot(a).unwrap().iter().all(|&f| f == 0.0));
    assert_eq!(geometry.len(), 1);
    assert_eq!(geometry.slot_count(), 2);
    assert_eq!(geometry.allocate(), a);
}

#[test]
fn test_out_of_range_slot_is_rejected() {
    let mut geometry = packed(SlotShape::Quad);
    assert!(matches!(geometry.slot_mut(0), Err(Error::InvalidResource(_))));
}

#[test]
fn test_free_out_of_range_is_rejected() {
    let mut geometry = packed(SlotShape::Triangle);
    geometry.allocate();
    assert!(matches!(geometry.free(1), Err(Error::InvalidResource(_))));
    assert!(matches!(geometry.free(u32::MAX), Err(Error::InvalidResource(_))));
    assert_eq!(geometry.len(), 1);
}

#[test]
fn test_mutations_mark_dirty() {
    let mut geometry = packed(SlotShape::Triangle);
    assert!(!geometry.is_dirty());
    geometry.allocate();
    assert!(geometry.is_dirty());
}

// ============================================================================
// Drawing
// ============================================================================

#[test]
fn test_triangles_draw_arrays() {
    let (mut ctx, log) = context(1);
    let program = Program::new(VERTEX, FRAGMENT);
    let mut geometry = packed(SlotShape::Triangle);
    geometry.allocate();
    geometry.allocate();

    geometry.draw(&mut ctx, &program).unwrap();
    assert_eq!(
        log.borrow().last_draw(),
        Some(&DeviceCall::DrawArrays { topology: PrimitiveTopology::TriangleList, first: 0, count: 6 })
    );
}

#[test]
fn test_quads_draw_shared_indices() {
    let (mut ctx, log) = context(4);
    let program = Program::new(VERTEX, FRAGMENT);
    let mut geometry = packed(SlotShape::Quad);
    geometry.allocate();
    geometry.allocate();
    geometry.allocate();

    geometry.draw(&mut ctx, &program).unwrap();
    assert_eq!(
        log.borrow().last_draw(),
        Some(&DeviceCall::DrawElements {
            topology: PrimitiveTopology::TriangleList,
            count: 18,
            index_type: IndexType::U16,
            offset: 0,
        })
    );
}

#[test]
fn test_too_many_quads() {
    let (mut ctx, log) = context(1);
    let program = Program::new(VERTEX, FRAGMENT);
    let mut geometry = packed(SlotShape::Quad);
    geometry.allocate_pair();

    assert!(matches!(geometry.draw(&mut ctx, &program), Err(Error::ResourceLimitExceeded(_))));
    assert_eq!(log.borrow().draw_count(), 0);
}

#[test]
fn test_upload_only_when_dirty() {
    let (mut ctx, log) = context(4);
    let program = Program::new(VERTEX, FRAGMENT);
    let mut geometry = packed(SlotShape::Quad);
    let slot = geometry.allocate();

    geometry.draw(&mut ctx, &program).unwrap();
    geometry.draw(&mut ctx, &program).unwrap();
    assert_eq!(geometry.upload_count_on(ctx.id()), Some(1));

    geometry.slot_mut(slot).unwrap()[0] = 5.0;
    geometry.draw(&mut ctx, &program).unwrap();
    assert_eq!(geometry.upload_count_on(ctx.id()), Some(2));
    assert_eq!(log.borrow().upload_count(BufferKind::Vertex), 2);
}

#[test]
fn test_uploads_rotate_through_ring() {
    let (mut ctx, log) = context(4);
    let program = Program::new(VERTEX, FRAGMENT);
    let mut geometry = packed(SlotShape::Triangle);
    let slot = geometry.allocate();

    let mut bound = Vec::new();
    for value in 1..=3 {
        geometry.slot_mut(slot).unwrap()[0] = value as f32;
        geometry.draw(&mut ctx, &program).unwrap();
        bound.push(log.borrow().bound_vertex_buffer().unwrap());
    }

    assert_ne!(bound[0], bound[1]);
    assert_eq!(bound[0], bound[2]);
    assert_eq!(log.borrow().buffer_floats(bound[2]).unwrap()[0], 3.0);
}

#[test]
fn test_dirty_change_reaches_every_context() {
    let (mut a, _) = context(4);
    let (mut b, _) = context(4);
    let program = Program::new(VERTEX, FRAGMENT);
    let mut geometry = packed(SlotShape::Quad);
    geometry.allocate();

    geometry.draw(&mut a, &program).unwrap();
    geometry.slot_mut(0).unwrap()[0] = 1.0;
    geometry.draw(&mut a, &program).unwrap();
    geometry.draw(&mut b, &program).unwrap();
    geometry.draw(&mut b, &program).unwrap();

    assert_eq!(geometry.upload_count_on(a.id()), Some(2));
    assert_eq!(geometry.upload_count_on(b.id()), Some(1));
}

#[test]
fn test_cleared_geometry_draws_nothing() {
    let (mut ctx, log) = context(4);
    let program = Program::new(VERTEX, FRAGMENT);
    let mut geometry = packed(SlotShape::Quad);
    geometry.allocate();
    geometry.draw(&mut ctx, &program).unwrap();

    geometry.clear();
    log.borrow_mut().clear_calls();
    geometry.draw(&mut ctx, &program).unwrap();
    assert_eq!(log.borrow().draw_count(), 0);
    assert_eq!(geometry.upload_count_on(ctx.id()), Some(2));
}

#[test]
fn test_drop_releases_ring_buffers() {
    let (mut ctx, log) = context(4);
    let program = Program::new(VERTEX, FRAGMENT);
    let mut geometry = packed(SlotShape::Triangle);
    geometry.allocate();
    geometry.draw(&mut ctx, &program).unwrap();
    assert_eq!(log.borrow().live_buffers().len(), 3);

    drop(geometry);
    assert_eq!(ctx.pending_deletions(), 2);
    ctx.after_step().unwrap();
    assert_eq!(log.borrow().live_buffers().len(), 1);
}
