use super::*;
use crate::context::ContextDesc;
use crate::error::Error;
use crate::graphics_device::{HeadlessGraphicsDevice, SharedDeviceLog, DeviceCall};

fn context() -> (RenderContext, SharedDeviceLog) {
    let device = HeadlessGraphicsDevice::new();
    let log = device.log();
    let mut desc = ContextDesc::new(32, 32);
    desc.max_quads = Some(1);
    (RenderContext::new(desc, device).unwrap(), log)
}

fn texture_uploads(log: &SharedDeviceLog) -> usize {
    log.borrow().count(|call| matches!(call, DeviceCall::UploadTexture(..)))
}

// ============================================================================
// Image validation
// ============================================================================

#[test]
fn test_new_detects_rgb_and_rgba() {
    let rgb = Texture::new(2, 2, vec![0u8; 12]).unwrap();
    assert_eq!(rgb.format(), PixelFormat::Rgb8);

    let rgba = Texture::new(2, 2, vec![0u8; 16]).unwrap();
    assert_eq!(rgba.format(), PixelFormat::Rgba8);
}

#[test]
fn test_new_rejects_wrong_size() {
    let result = Texture::new(2, 2, vec![0u8; 10]);
    assert!(matches!(result, Err(Error::InvalidDataSize(_))));
}

#[test]
fn test_set_data_rejection_keeps_previous_image() {
    let texture = Texture::new(1, 1, vec![1, 2, 3]).unwrap();
    assert!(texture.set_data(4, 4, vec![0u8; 5]).is_err());
    assert_eq!(texture.width(), 1);
    assert_eq!(texture.image().data, vec![1, 2, 3]);
}

// ============================================================================
// Per-context upload
// ============================================================================

#[test]
fn test_bind_uploads_once_then_only_binds() {
    let (mut ctx, log) = context();
    let texture = Texture::new(1, 1, vec![255, 0, 0]).unwrap();

    texture.bind(&mut ctx, 0).unwrap();
    texture.bind(&mut ctx, 1).unwrap();

    assert_eq!(texture_uploads(&log), 1);
    let handle = texture.handle_on(ctx.id()).unwrap();
    assert_eq!(log.borrow().calls.last(), Some(&DeviceCall::BindTexture { unit: 1, texture: handle }));
    assert_eq!(log.borrow().texture_image(handle).unwrap().1, vec![255, 0, 0]);
}

#[test]
fn test_set_data_reuploads_on_every_context() {
    let (mut a, log_a) = context();
    let (mut b, log_b) = context();
    let texture = Texture::new(1, 1, vec![0, 0, 0]).unwrap();
    texture.bind(&mut a, 0).unwrap();
    texture.bind(&mut b, 0).unwrap();

    texture.set_data(1, 1, vec![0, 0, 0, 255]).unwrap();
    texture.bind(&mut a, 0).unwrap();
    texture.bind(&mut b, 0).unwrap();
    texture.bind(&mut b, 0).unwrap();

    assert_eq!(texture_uploads(&log_a), 2);
    assert_eq!(texture_uploads(&log_b), 2);
    let (upload, _) = log_b.borrow().texture_image(texture.handle_on(b.id()).unwrap()).cloned().unwrap();
    assert_eq!(upload.format, PixelFormat::Rgba8);
}

#[test]
fn test_clones_share_one_resource() {
    let (mut ctx, log) = context();
    let texture = Texture::new(1, 1, vec![0, 0, 0]).unwrap();
    let alias = texture.clone();
    assert!(alias.ptr_eq(&texture));

    texture.bind(&mut ctx, 0).unwrap();
    alias.bind(&mut ctx, 0).unwrap();
    assert_eq!(log.borrow().count(|call| matches!(call, DeviceCall::CreateTexture(_))), 1);
}

#[test]
fn test_last_clone_drop_defers_destruction() {
    let (mut ctx, log) = context();
    let texture = Texture::new(1, 1, vec![0, 0, 0]).unwrap();
    let alias = texture.clone();
    texture.bind(&mut ctx, 0).unwrap();
    let handle = texture.handle_on(ctx.id()).unwrap();

    drop(texture);
    assert_eq!(ctx.pending_deletions(), 0);

    drop(alias);
    assert_eq!(ctx.pending_deletions(), 1);
    assert!(log.borrow().is_live(handle.into()));

    ctx.after_step().unwrap();
    assert!(!log.borrow().is_live(handle.into()));
}

// ============================================================================
// Tileset
// ============================================================================

#[test]
fn test_tileset_defaults_to_one_full_tile() {
    let tileset = Tileset::new(8, 4, vec![0u8; 8 * 4 * 3], TilesetDesc::default()).unwrap();
    assert_eq!(tileset.tile_width(), 8);
    assert_eq!(tileset.tile_height(), 4);
    assert_eq!(tileset.num_tiles(), 1);
}

#[test]
fn test_tileset_counts_tiles_with_frames() {
    let desc = TilesetDesc { tile_width: 4, tile_height: 4, num_frames: 2, step: 3 };
    let tileset = Tileset::new(32, 16, vec![0u8; 32 * 16 * 4], desc).unwrap();

    assert_eq!(tileset.num_tiles_x(), 4);
    assert_eq!(tileset.num_tiles_y(), 4);
    assert_eq!(tileset.num_tiles(), 16);
    assert_eq!(tileset.step(), 3);
}

#[test]
fn test_tileset_rejects_zero_frames() {
    let desc = TilesetDesc { num_frames: 0, ..TilesetDesc::default() };
    let texture = Texture::new(1, 1, vec![0, 0, 0]).unwrap();
    assert!(matches!(Tileset::from_texture(texture, desc), Err(Error::InvalidResource(_))));
}
