//! Walkthroughs of the context against a [`RecordingDevice`], each returning
//! a few lines of journal summary for the console.

use anyhow::{bail, ensure, Context, Result};
use bytemuck::{Pod, Zeroable};
use tessera_gfx::device::{BufferUsage, Call, Capability, ErrorCode, Journal, PrimitiveType, RecordingDevice};
use tessera_gfx::{
    BlendState, Color4, ContextConfig, Disposable, GfxError, GraphicsContext, IndexBuffer, Rectangle, Shader,
    ShaderProgram, Texture, TextureParams, Vertex, VertexAttribute, VertexBuffer,
};

pub struct Scenario {
    pub name: &'static str,
    pub run: fn() -> Result<Vec<String>>,
}

pub const ALL: &[Scenario] = &[
    Scenario { name: "texture units", run: texture_units },
    Scenario { name: "state diffing", run: state_diffing },
    Scenario { name: "color key", run: color_key },
    Scenario { name: "draw a quad", run: draw_quad },
    Scenario { name: "native errors", run: native_errors },
    Scenario { name: "teardown", run: teardown },
];

fn context(config: ContextConfig) -> Result<(GraphicsContext, Journal)> {
    let device = RecordingDevice::new();
    let journal = device.journal();
    let context = GraphicsContext::new(device, config).context("creating graphics context")?;
    Ok((context, journal))
}

/// Fills an 8-unit table, hits the ceiling, frees unit 3 and takes it back.
fn texture_units() -> Result<Vec<String>> {
    let (ctx, _journal) = context(ContextConfig::default().with_texture_units(8))?;

    let mut textures = (0..8)
        .map(|_| Texture::new(&ctx, 32, 32))
        .collect::<Result<Vec<_>, _>>()
        .context("filling texture units")?;
    let units: Vec<u32> = textures.iter().map(|t| t.unit().index()).collect();

    let exhausted = match Texture::new(&ctx, 32, 32) {
        Err(err @ GfxError::TextureUnitsExhausted { .. }) => err,
        Err(other) => return Err(other).context("ninth texture"),
        Ok(_) => bail!("ninth texture should not fit in 8 units"),
    };

    textures.remove(3).dispose()?;
    let replacement = Texture::new(&ctx, 32, 32)?;
    ensure!(replacement.unit().index() == 3, "freed unit 3 was not reused");

    Ok(vec![
        format!("units handed out: {units:?}"),
        format!("ninth texture: {exhausted}"),
        format!("after disposing unit 3, next texture got unit {}", replacement.unit().index()),
    ])
}

fn state_diffing() -> Result<Vec<String>> {
    let (mut ctx, journal) = context(ContextConfig::default())?;
    let blend_calls = || journal.count(|c| matches!(c, Call::Enable(Capability::Blend) | Call::Disable(Capability::Blend)));

    let at_start = blend_calls();
    ctx.set_blend_state(BlendState::DISABLED)?;
    ctx.set_blend_state(BlendState::DISABLED)?;
    let after_same = blend_calls();
    ctx.set_blend_state(BlendState::ALPHA_BLEND)?;
    let after_change = blend_calls();
    ensure!(at_start == 1 && after_same == 1 && after_change == 2, "blend diffing misbehaved");

    journal.clear();
    ctx.set_viewport(Rectangle::new(0, 0, 400, 300))?;
    let native = journal.calls().into_iter().find_map(|c| match c {
        Call::Viewport(rect) => Some(rect),
        _ => None,
    });

    Ok(vec![
        format!("blend toggles: {at_start} at creation, {after_same} after setting DISABLED twice, {after_change} after ALPHA_BLEND"),
        format!("logical viewport (0, 0, 400, 300) reached the device as {native:?}"),
    ])
}

fn color_key() -> Result<Vec<String>> {
    let (ctx, _journal) = context(ContextConfig::default())?;
    let source: Vec<u8> = [Color4::MAGENTA, Color4::WHITE, Color4::MAGENTA, Color4::BLACK]
        .iter()
        .flat_map(|c| c.to_bytes())
        .collect();

    let params = TextureParams::default().with_color_key(Color4::MAGENTA);
    let texture = Texture::from_bytes(&ctx, &source, 2, 2, params)?;
    let pixels = texture.pixels()?;
    ensure!(pixels[0] == Color4::TRANSPARENT_BLACK && pixels[1] == Color4::WHITE, "color key not applied");

    Ok(vec![format!("uploaded pixels: {pixels:?}")])
}

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable)]
struct SpriteVertex {
    position: [f32; 2],
    uv: [f32; 2],
    color: Color4,
}

impl Vertex for SpriteVertex {
    const ATTRIBUTES: &'static [VertexAttribute] = &[
        VertexAttribute::f32(2, 0),
        VertexAttribute::f32(2, 8),
        VertexAttribute::unorm8(4, 16),
    ];
}

const SPRITE_VS: &str = "attribute vec2 position; attribute vec2 uv; void main() { gl_Position = vec4(position, 0.0, 1.0); }";
const SPRITE_FS: &str = "uniform sampler2D diffuse; void main() { gl_FragColor = vec4(1.0); }";

fn draw_quad() -> Result<Vec<String>> {
    let (mut ctx, journal) = context(ContextConfig::default())?;

    let texture = Texture::new(&ctx, 64, 64)?;
    let vs = Shader::vertex(&ctx, SPRITE_VS)?;
    let fs = Shader::fragment(&ctx, SPRITE_FS)?;
    let program = ShaderProgram::new(&ctx, vs, fs).context("linking sprite program")?;

    let vertex = |x: f32, y: f32| SpriteVertex { position: [x, y], uv: [x, y], color: Color4::WHITE };
    let vertices = VertexBuffer::new(
        &ctx,
        &[vertex(0.0, 0.0), vertex(1.0, 0.0), vertex(0.0, 1.0), vertex(1.0, 1.0)],
        BufferUsage::StaticDraw,
    )?;
    let indices = IndexBuffer::new(&ctx, &[0u16, 1, 2, 2, 1, 3], BufferUsage::StaticDraw)?;

    journal.clear();
    ctx.set_blend_state(BlendState::ALPHA_BLEND)?;
    ctx.clear(Color4::BLACK)?;
    ctx.set_shader_program(&program)?;
    program.set_sampler("diffuse", &texture)?;
    ctx.draw_indexed(PrimitiveType::Triangles, &vertices, &indices)?;

    Ok(vec![
        format!("{} native calls for one frame", journal.len()),
        format!("last call: {:?}", journal.calls().last()),
    ])
}

fn native_errors() -> Result<Vec<String>> {
    let (mut ctx, journal) = context(ContextConfig::default())?;
    journal.fail_on(|c| matches!(c, Call::Scissor(_)), ErrorCode::INVALID_VALUE);
    journal.fail_on(|c| matches!(c, Call::CreateTexture(_)), ErrorCode(0x9999));

    let scissor = ctx.set_scissor(Some(Rectangle::new(0, 0, 10, 10))).err();
    let texture = Texture::new(&ctx, 4, 4).err();
    ensure!(ctx.texture_units_in_use() == 0, "failed texture kept its unit");

    Ok([scissor, texture].into_iter().flatten().map(|err| err.to_string()).collect())
}

fn teardown() -> Result<Vec<String>> {
    let (ctx, journal) = context(ContextConfig::default())?;
    let kept = Texture::new(&ctx, 8, 8)?;
    let early = Texture::new(&ctx, 8, 8)?;
    early.dispose()?;

    let objects = ctx.live_objects();
    ctx.dispose().context("disposing context")?;
    ensure!(kept.is_disposed(), "cascade skipped a live texture");
    ensure!(journal.calls().last() == Some(&Call::Release), "device released before objects");

    let deletes = journal.count(|c| matches!(c, Call::DeleteTexture(_)));
    Ok(vec![
        format!("{objects} live object(s) at teardown"),
        format!("{deletes} texture deletes in total, device released last"),
    ])
}
