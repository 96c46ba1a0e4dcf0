//! Integration tests for sharing logical resources across render contexts
//!
//! These tests verify per-context isolation, deferred destruction at frame
//! end and convergence of dirty resources on every context.
//!
//! Run with: cargo test --test context_integration_tests

mod test_utils;

use galaxy_vid::glam::Mat4;
use galaxy_vid::vid::device::{BufferKind, DeviceCall, PhysicalHandle, SharedDeviceLog};
use galaxy_vid::vid::resource::{Program, QuadGeometry, Texture};
use test_utils::{create_test_context, rect, SPRITE_FRAGMENT, SPRITE_VERTEX};

/// Textured program, texture and one quad
fn create_sprite_scene() -> (Program, Texture, QuadGeometry) {
    let texture = Texture::new(2, 2, vec![255u8; 12]).unwrap();
    let mut program = Program::new(SPRITE_VERTEX, SPRITE_FRAGMENT);
    program.set_uniform("uTex", &texture);
    program.set_uniform("uProjection", Mat4::IDENTITY);

    let mut quads = QuadGeometry::new().unwrap();
    let [a, b, c, d] = rect(0.0, 0.0, 1.0, 1.0);
    quads.add_quad2(a, b, c, d);
    (program, texture, quads)
}

fn texture_uploads(log: &SharedDeviceLog) -> usize {
    log.borrow().count(|call| matches!(call, DeviceCall::UploadTexture(..)))
}

// ============================================================================
// ISOLATION
// ============================================================================

#[test]
fn test_integration_each_context_owns_its_objects() {
    let (mut a, log_a) = create_test_context(64, 64, 16);
    let (mut b, log_b) = create_test_context(64, 64, 16);
    let (program, texture, mut quads) = create_sprite_scene();

    // Step 1: draw the same resources on both contexts
    quads.draw(&mut a, &program).unwrap();
    quads.draw(&mut b, &program).unwrap();

    // 2 shaders, 1 program, 1 texture, 2 ring buffers, 1 quad index buffer
    assert_eq!(log_a.borrow().live_object_count(), 7);
    assert_eq!(log_b.borrow().live_object_count(), 7);
    assert_eq!(a.tracked_resources(), 3);
    assert!(texture.handle_on(a.id()).is_some());
    assert!(texture.handle_on(b.id()).is_some());

    // Step 2: destroying one context releases only its own copies
    let a_id = a.id();
    drop(a);
    assert_eq!(log_a.borrow().live_object_count(), 0);
    assert!(texture.handle_on(a_id).is_none());
    assert!(program.handle_on(a_id).is_none());

    // Step 3: the other context keeps drawing without recreating anything
    log_b.borrow_mut().clear_calls();
    quads.draw(&mut b, &program).unwrap();
    assert_eq!(log_b.borrow().live_object_count(), 7);
    assert_eq!(log_b.borrow().count(|call| matches!(call, DeviceCall::CreateShader(..) | DeviceCall::CreateBuffer(..))), 0);
    assert_eq!(log_b.borrow().draw_count(), 1);
}

#[test]
fn test_integration_release_resources_keeps_context_usable() {
    let (mut ctx, log) = create_test_context(64, 64, 16);
    let (program, _texture, mut quads) = create_sprite_scene();
    quads.draw(&mut ctx, &program).unwrap();

    let released = ctx.release_resources();
    assert_eq!(released, 3);
    // Only the quad index buffer is left
    assert_eq!(log.borrow().live_object_count(), 1);
    assert_eq!(ctx.current_program(), None);

    // Drawing again rebuilds every object on the same context
    quads.draw(&mut ctx, &program).unwrap();
    assert_eq!(log.borrow().live_object_count(), 7);
    assert_eq!(log.borrow().count(|call| matches!(call, DeviceCall::LinkProgram(_))), 2);
}

// ============================================================================
// DEFERRED DESTRUCTION
// ============================================================================

#[test]
fn test_integration_dropped_resources_survive_until_frame_end() {
    let (mut ctx, log) = create_test_context(64, 64, 16);
    let (program, texture, mut quads) = create_sprite_scene();

    ctx.before_step().unwrap();
    quads.draw(&mut ctx, &program).unwrap();
    let texture_handle = texture.handle_on(ctx.id()).unwrap();
    let program_handle = program.handle_on(ctx.id()).unwrap();

    // Step 1: drop everything mid-frame, the draw above may still read it
    drop(quads);
    drop(program);
    drop(texture);
    assert_eq!(ctx.pending_deletions(), 6);
    assert_eq!(log.borrow().live_object_count(), 7);
    assert!(log.borrow().is_live(PhysicalHandle::Texture(texture_handle)));

    // Step 2: the end of the frame destroys them
    ctx.after_step().unwrap();
    assert_eq!(ctx.pending_deletions(), 0);
    assert_eq!(ctx.stats().swept, 6);
    assert!(!log.borrow().is_live(PhysicalHandle::Texture(texture_handle)));
    assert!(!log.borrow().is_live(PhysicalHandle::Program(program_handle)));
    assert_eq!(ctx.current_program(), None);
    assert_eq!(ctx.tracked_resources(), 0);

    // Programs go before their shaders
    let destroyed = log.borrow().destroyed().to_vec();
    let program_at = destroyed.iter().position(|h| matches!(h, PhysicalHandle::Program(_))).unwrap();
    let first_shader_at = destroyed.iter().position(|h| matches!(h, PhysicalHandle::Shader(_))).unwrap();
    assert!(program_at < first_shader_at);
}

// ============================================================================
// DIRTY CONVERGENCE
// ============================================================================

#[test]
fn test_integration_changes_reach_idle_contexts_once() {
    let (mut busy, busy_log) = create_test_context(64, 64, 16);
    let (mut idle, idle_log) = create_test_context(64, 64, 16);
    let (program, texture, mut quads) = create_sprite_scene();

    quads.draw(&mut busy, &program).unwrap();
    quads.draw(&mut idle, &program).unwrap();

    // Step 1: five frames of changes seen only by the busy context
    for frame in 1..=5 {
        let x = frame as f32;
        let [a, b, c, d] = rect(x, 0.0, x + 1.0, 1.0);
        quads.set_quad2(0, a, b, c, d).unwrap();
        texture.set_data(2, 2, vec![frame as u8; 12]).unwrap();

        busy.before_step().unwrap();
        quads.draw(&mut busy, &program).unwrap();
        busy.after_step().unwrap();
    }
    assert_eq!(quads.upload_count_on(busy.id()), Some(6));
    assert_eq!(texture_uploads(&busy_log), 6);

    // Step 2: the idle context catches up with a single upload of each
    quads.draw(&mut idle, &program).unwrap();
    quads.draw(&mut idle, &program).unwrap();
    assert_eq!(quads.upload_count_on(idle.id()), Some(2));
    assert_eq!(texture_uploads(&idle_log), 2);
    assert_eq!(idle_log.borrow().upload_count(BufferKind::Vertex), 2);

    // Both end up with the same vertex data
    let idle_buffer = idle_log.borrow().bound_vertex_buffer().unwrap();
    let busy_buffer = busy_log.borrow().bound_vertex_buffer().unwrap();
    assert_eq!(
        idle_log.borrow().buffer_floats(idle_buffer),
        busy_log.borrow().buffer_floats(busy_buffer)
    );
    assert_eq!(idle_log.borrow().buffer_floats(idle_buffer).unwrap()[0], 5.0);
}
