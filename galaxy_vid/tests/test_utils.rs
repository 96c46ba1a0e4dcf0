#![allow(dead_code)]
//! Shared helpers for integration tests
//!
//! Every context runs on a `HeadlessGraphicsDevice`, whose call log is
//! returned alongside it so tests can observe what reached the device.

use galaxy_vid::vid::context::{ContextDesc, RenderContext};
use galaxy_vid::vid::device::{HeadlessGraphicsDevice, SharedDeviceLog};
use galaxy_vid::vid::resource::{Program, Vertex2};

/// 2D program reading `aPos` and `aUV`, sampling `uTex`
pub const SPRITE_VERTEX: &str = "
attribute vec2 aPos;
attribute vec2 aUV;
uniform mat4 uProjection;
varying highp vec2 vUV;
void main() { vUV = aUV; gl_Position = uProjection * vec4(aPos, 0.0, 1.0); }
";

pub const SPRITE_FRAGMENT: &str = "
uniform sampler2D uTex;
varying highp vec2 vUV;
void main() { gl_FragColor = texture2D(uTex, vUV); }
";

/// 3D program reading `aPos`, `aNorm` and `aUV`
pub const MESH_VERTEX: &str = "
attribute vec3 aPos;
attribute vec3 aNorm;
attribute vec2 aUV;
void main() { gl_Position = vec4(aPos, 1.0); }
";

pub const PLAIN_FRAGMENT: &str = "void main() { gl_FragColor = vec4(1.0); }";

/// Headless context of `width` x `height` indexing `max_quads` quads
pub fn create_test_context(width: u32, height: u32, max_quads: u32) -> (RenderContext, SharedDeviceLog) {
    let device = HeadlessGraphicsDevice::new();
    let log = device.log();
    let mut desc = ContextDesc::new(width, height);
    desc.max_quads = Some(max_quads);
    let context = RenderContext::new(desc, device).expect("headless context creation should succeed");
    (context, log)
}

/// Program without samplers for 2D packed quads
pub fn create_quad_program() -> Program {
    Program::new(
        "attribute vec2 aPos; attribute vec2 aUV; void main() {}",
        PLAIN_FRAGMENT,
    )
}

/// Axis-aligned quad `[x0, x1] x [y0, y1]` wound counter-clockwise
pub fn rect(x0: f32, y0: f32, x1: f32, y1: f32) -> [Vertex2; 4] {
    [
        Vertex2::new(x0, y0, 0.0, 0.0),
        Vertex2::new(x1, y0, 1.0, 0.0),
        Vertex2::new(x1, y1, 1.0, 1.0),
        Vertex2::new(x0, y1, 0.0, 1.0),
    ]
}
