// ABOUTME: Main application entry point.
// ABOUTME: Opens the window, rasterizes one glyph, and redraws its quad until closed.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::{Window, WindowAttributes, WindowId, WindowLevel};

use glyph_core::{Config, Viewport};
use glyph_renderer::{FrameRenderer, Glyph, GlyphRasterizer, RenderContext, Sampling, WgpuBackend};

const FONT_PATH: &str = "/usr/share/fonts/truetype/lato/Lato-Medium.ttf";
const FONT_PIXEL_SIZE: u32 = 18;
const GLYPH: char = 'H';
const GLYPH_SCALE: f32 = 0.1;

/// Everything that exists once the window is up
struct Scene {
    window: Arc<Window>,
    ctx: RenderContext<WgpuBackend>,
    glyph: Glyph,
    renderer: FrameRenderer,
}

struct App {
    config: Config,
    scene: Option<Scene>,
    failure: Option<anyhow::Error>,
}

impl App {
    fn new(config: Config) -> Self {
        Self {
            config,
            scene: None,
            failure: None,
        }
    }

    fn init(&self, event_loop: &ActiveEventLoop) -> Result<Scene> {
        let settings = &self.config.window;
        let level = if settings.always_on_top {
            WindowLevel::AlwaysOnTop
        } else {
            WindowLevel::Normal
        };
        let window_attrs = WindowAttributes::default()
            .with_title(settings.title.clone())
            .with_inner_size(LogicalSize::new(settings.width, settings.height))
            .with_resizable(settings.resizable)
            .with_window_level(level);

        let window = Arc::new(
            event_loop
                .create_window(window_attrs)
                .context("Failed to create window")?,
        );

        let physical_size = window.inner_size();
        tracing::info!(
            "Window created: {}x{} physical pixels, scale factor: {}",
            physical_size.width,
            physical_size.height,
            window.scale_factor()
        );

        let backend = pollster::block_on(WgpuBackend::new(Arc::clone(&window)))
            .context("Failed to initialize GPU")?;
        let mut ctx = RenderContext::new(backend);

        let rasterizer = GlyphRasterizer::new(Sampling::from(self.config.texture_filter));
        let glyph = rasterizer
            .rasterize(&mut ctx, GLYPH, Path::new(FONT_PATH), FONT_PIXEL_SIZE)
            .with_context(|| format!("Failed to rasterize {:?}", GLYPH))?;
        let renderer = FrameRenderer::new(&glyph, GLYPH_SCALE);

        Ok(Scene {
            window,
            ctx,
            glyph,
            renderer,
        })
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        tracing::error!("{:#}", error);
        self.failure = Some(error);
        event_loop.exit();
    }

    fn redraw(&mut self) {
        let Some(scene) = &mut self.scene else {
            return;
        };

        let size = scene.window.inner_size();
        let viewport = Viewport::new(size.width, size.height);

        if let Err(e) = scene.renderer.render(&mut scene.ctx, &scene.glyph, viewport) {
            if e.is_surface_lost() {
                tracing::warn!("Surface lost, reconfiguring");
                scene.ctx.backend_mut().reconfigure();
            } else {
                tracing::error!("Render error: {}", e);
            }
        }

        scene.window.request_redraw();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.scene.is_some() {
            return;
        }

        match self.init(event_loop) {
            Ok(scene) => {
                scene.window.request_redraw();
                self.scene = Some(scene);
            }
            Err(e) => self.fail(event_loop, e),
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                tracing::info!("Close requested, exiting");
                event_loop.exit();
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state == ElementState::Pressed
                    && event.logical_key == Key::Named(NamedKey::Escape)
                {
                    tracing::info!("Escape pressed, exiting");
                    event_loop.exit();
                }
            }
            WindowEvent::Resized(new_size) => {
                if let Some(scene) = &mut self.scene {
                    scene
                        .ctx
                        .backend_mut()
                        .resize(new_size.width, new_size.height);
                }
            }
            WindowEvent::RedrawRequested => self.redraw(),
            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(scene) = &self.scene {
            tracing::info!("Rendered {} frames", scene.ctx.frames());
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    tracing::info!("Starting glyph-quad");

    let config = Config::load_or_default();
    tracing::info!(
        "Window {}x{}, texture filter {:?}",
        config.window.width,
        config.window.height,
        config.texture_filter
    );

    let event_loop = EventLoop::new().context("Failed to create event loop")?;
    let mut app = App::new(config);

    event_loop.run_app(&mut app)?;

    match app.failure.take() {
        Some(error) => Err(error),
        None => Ok(()),
    }
}
