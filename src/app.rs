use std::sync::Arc;
use std::time::Instant;

use anyhow::anyhow;
use log::{error, info, warn};
use winit::{
    application::ApplicationHandler,
    dpi::LogicalSize,
    event::{ElementState, StartCause, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use crate::{animation::Animation, error::Result, renderer::SceneRenderer};

pub struct App<A> {
    window: Option<Arc<Window>>,
    renderer: Option<SceneRenderer>,
    animation: A,
    frame: usize,
    next_tick: Instant,
    paused: bool,
    error: Option<anyhow::Error>,
}

impl<A: Animation> App<A> {
    pub fn new(animation: A) -> Self {
        Self {
            window: None,
            renderer: None,
            animation,
            frame: 0,
            next_tick: Instant::now(),
            paused: false,
            error: None,
        }
    }

    pub fn frame(&self) -> usize {
        self.frame
    }

    /// One timer tick: advance the frame, recompute, ask for a redraw.
    pub fn tick(&mut self) {
        let n_frames = self.animation.frame_count().max(1);
        self.frame = (self.frame + 1) % n_frames;
        self.animation.tick(self.frame);
        if let Some(renderer) = &mut self.renderer {
            renderer.prepare(&self.animation.scene());
        }
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn schedule(&mut self, event_loop: &ActiveEventLoop) {
        let now = Instant::now();
        self.next_tick += self.animation.interval();
        // Never queue up missed ticks.
        if self.next_tick < now {
            self.next_tick = now + self.animation.interval();
        }
        event_loop.set_control_flow(ControlFlow::WaitUntil(self.next_tick));
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        error!("{err:#}");
        self.error = Some(err);
        event_loop.exit();
    }
}

impl<A: Animation> ApplicationHandler for App<A> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        let attributes = Window::default_attributes()
            .with_title(self.animation.title())
            .with_inner_size(LogicalSize::new(1000, 600));

        let window = match event_loop.create_window(attributes) {
            Ok(window) => Arc::new(window),
            Err(err) => return self.fail(event_loop, err.into()),
        };
        let mut renderer = match pollster::block_on(SceneRenderer::new(window.clone())) {
            Ok(renderer) => renderer,
            Err(err) => return self.fail(event_loop, err),
        };

        self.animation.tick(self.frame);
        renderer.prepare(&self.animation.scene());
        self.window = Some(window.clone());
        self.renderer = Some(renderer);
        info!(
            "showing \"{}\", {} frames every {:?}",
            self.animation.title(),
            self.animation.frame_count(),
            self.animation.interval()
        );

        window.request_redraw();
        self.next_tick = Instant::now();
        self.schedule(event_loop);
    }

    fn new_events(&mut self, event_loop: &ActiveEventLoop, cause: StartCause) {
        if let StartCause::ResumeTimeReached { .. } = cause {
            if !self.paused {
                self.tick();
            }
            self.schedule(event_loop);
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                if let Some(renderer) = &mut self.renderer {
                    renderer.resize(size.width, size.height);
                    // Pixel positions depend on the surface size.
                    renderer.prepare(&self.animation.scene());
                }
                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                if let Some(renderer) = &mut self.renderer {
                    renderer.set_scale_factor(scale_factor);
                    renderer.prepare(&self.animation.scene());
                }
            }
            WindowEvent::RedrawRequested => {
                let Some(renderer) = &mut self.renderer else {
                    return;
                };
                match renderer.render() {
                    Ok(()) => {}
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        renderer.reconfigure();
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        self.fail(event_loop, anyhow!("graphics device ran out of memory"));
                    }
                    Err(err) => warn!("dropped frame {}: {err}", self.frame),
                }
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state == ElementState::Pressed {
                    match event.physical_key {
                        PhysicalKey::Code(KeyCode::Escape | KeyCode::KeyQ) => event_loop.exit(),
                        PhysicalKey::Code(KeyCode::Space) => {
                            self.paused = !self.paused;
                            info!("{}", if self.paused { "paused" } else { "resumed" });
                        }
                        _ => {}
                    }
                }
            }
            _ => {}
        }
    }
}

/// Show `animation` in a window until it is closed.
pub fn run<A: Animation>(animation: A) -> Result<()> {
    let event_loop = EventLoop::new().map_err(anyhow::Error::from)?;
    let mut app = App::new(animation);
    event_loop.run_app(&mut app).map_err(anyhow::Error::from)?;
    match app.error {
        Some(err) => Err(err.into()),
        None => Ok(()),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::wave::{Scenario, WaveAnimator};

    #[test]
    fn ticks_wrap_around_the_frame_count() {
        let mut app = App::new(WaveAnimator::new(Scenario::SingleFrequency));
        let n = Scenario::SingleFrequency.frame_count();
        for _ in 0..n - 1 {
            app.tick();
        }
        assert_eq!(app.frame(), n - 1);
        app.tick();
        assert_eq!(app.frame(), 0);
    }
}
