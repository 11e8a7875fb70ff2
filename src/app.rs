use std::sync::Arc;
use std::thread::JoinHandle;

use instant::Instant;
use winit::application::ApplicationHandler;
use winit::event::{ElementState, KeyEvent, MouseButton, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::{Window, WindowAttributes, WindowId};

use crate::config::Settings;
use crate::error::{Error, Result, SinkError};
use crate::frames::{AssetFrames, FrameCache, MonoBitmap};
use crate::pet::{ClipCatalog, Engine, Stage};
use crate::render::GpuState;
use crate::sink::{PreviewEvent, PreviewSink};
use crate::util::{CancelToken, ThreadPacer};
use crate::wake::{wake_channel, DoubleTap, Wake, WakeTrigger};

/// Where frames go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// The e-paper HAT. Without `touch` the pet wakes after every nap.
    Panel { touch: bool },
    /// A desktop window mirroring the panel.
    Preview,
}

type Frames = FrameCache<AssetFrames>;

/// Load assets, wire the selected sink, and run until interrupted.
pub fn run(mode: Mode) -> Result<()> {
    let settings = Settings::default();
    let catalog = ClipCatalog::default();

    let frames = FrameCache::preload(
        AssetFrames::new(&settings.asset_root, settings.canvas, settings.threshold),
        &catalog,
    )?;

    let cancel = CancelToken::new();
    let on_signal = cancel.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        log::info!("Interrupt received, stopping");
        on_signal.cancel();
    }) {
        log::warn!("Could not install Ctrl-C handler: {e}");
    }

    let engine = Engine::new(
        catalog,
        fastrand::Rng::new(),
        settings.frame_delay,
        settings.wake_policy,
    );

    match mode {
        Mode::Panel { touch } => run_panel(&settings, touch, engine, frames, cancel),
        Mode::Preview => run_preview(&settings, engine, frames, cancel),
    }
}

// ---------------------------------------------------------------------------
// Panel mode
// ---------------------------------------------------------------------------

#[cfg(target_os = "linux")]
fn run_panel(
    settings: &Settings,
    touch: bool,
    mut engine: Engine<fastrand::Rng>,
    frames: Frames,
    cancel: CancelToken,
) -> Result<()> {
    use crate::platform::linux;
    use crate::sink::PanelSink;
    use crate::wake::watch_touch;

    let mut sink = PanelSink::new(linux::open_panel()?);
    sink.start()?;

    let (wake, watcher) = if touch {
        watch_touch(
            linux::open_touch(),
            cancel.clone(),
            settings.double_tap_window,
            settings.touch_poll_interval,
        )
    } else {
        log::info!("Touch disabled; the pet wakes by itself after each nap");
        (Wake::Unattached, None)
    };

    let mut pacer = ThreadPacer;
    let result = {
        let mut stage = Stage {
            frames: &frames,
            sink: &mut sink,
            pacer: &mut pacer,
            cancel: &cancel,
        };
        engine.run(&mut stage, &wake)
    };

    // Leave the panel blank and unpowered whatever happened above.
    cancel.cancel();
    if let Err(e) = sink.shutdown() {
        log::error!("Panel shutdown failed: {e}");
    }
    if let Some(handle) = watcher {
        let _ = handle.join();
    }
    result
}

#[cfg(not(target_os = "linux"))]
fn run_panel(
    _settings: &Settings,
    _touch: bool,
    _engine: Engine<fastrand::Rng>,
    _frames: Frames,
    _cancel: CancelToken,
) -> Result<()> {
    Err(Error::Unsupported("e-paper display mode"))
}

// ---------------------------------------------------------------------------
// Preview mode
// ---------------------------------------------------------------------------

/// Desktop preview window. The engine runs on a worker thread and hands
/// frames over through the event loop proxy.
struct PreviewApp {
    settings: Settings,
    window: Option<Arc<Window>>,
    gpu: Option<GpuState>,
    /// Latest frame, kept so a recreated surface can show it again.
    frame: Option<MonoBitmap>,
    taps: DoubleTap,
    trigger: WakeTrigger,
    cancel: CancelToken,
    frames_shown: u64,
}

impl PreviewApp {
    fn new(settings: Settings, trigger: WakeTrigger, cancel: CancelToken) -> Self {
        Self {
            taps: DoubleTap::new(settings.double_tap_window),
            settings,
            window: None,
            gpu: None,
            frame: None,
            trigger,
            cancel,
            frames_shown: 0,
        }
    }

    fn close(&mut self, event_loop: &ActiveEventLoop) {
        self.cancel.cancel();
        event_loop.exit();
    }
}

impl ApplicationHandler<PreviewEvent> for PreviewApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let size = self.settings.preview_size();
        let attrs = WindowAttributes::default()
            .with_title("Catmagotchi Desktop Preview")
            .with_resizable(false)
            .with_inner_size(winit::dpi::PhysicalSize::new(size.x, size.y));

        let window = match event_loop.create_window(attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Failed to create preview window: {e}");
                self.close(event_loop);
                return;
            }
        };
        log::info!("Preview window created: {}x{}", size.x, size.y);

        let gpu = GpuState::new(window.clone(), self.settings.canvas);
        if let Some(frame) = &self.frame {
            gpu.update_frame(frame);
        }
        self.gpu = Some(gpu);

        event_loop.set_control_flow(ControlFlow::Wait);
        window.request_redraw();
        self.window = Some(window);
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: PreviewEvent) {
        match event {
            PreviewEvent::Frame(bitmap) => {
                if let Some(gpu) = &self.gpu {
                    gpu.update_frame(&bitmap);
                }
                self.frame = Some(bitmap);
                self.frames_shown += 1;
                if let Some(w) = &self.window {
                    w.request_redraw();
                }
            }
            PreviewEvent::Stopped => {
                log::info!("Engine finished after {} frames, closing preview", self.frames_shown);
                event_loop.exit();
            }
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
                log::info!("Close requested, exiting");
                self.close(event_loop);
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        logical_key: Key::Named(NamedKey::Escape),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => {
                log::info!("ESC pressed, exiting");
                self.close(event_loop);
            }
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button: MouseButton::Left,
                ..
            } => {
                // Double click stands in for the double tap on the HAT.
                if self.taps.tap(Instant::now()) {
                    log::info!("Double click, waking the pet");
                    self.trigger.fire();
                }
            }
            WindowEvent::Resized(new_size) => {
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(new_size.width, new_size.height);
                }
            }
            WindowEvent::RedrawRequested => {
                if let Some(gpu) = &self.gpu {
                    gpu.render();
                }
            }
            _ => {}
        }
    }
}

fn run_preview(
    settings: &Settings,
    mut engine: Engine<fastrand::Rng>,
    frames: Frames,
    cancel: CancelToken,
) -> Result<()> {
    let event_loop = EventLoop::<PreviewEvent>::with_user_event()
        .build()
        .map_err(|e| Error::Window(e.to_string()))?;
    let mut sink = PreviewSink::new(event_loop.create_proxy());
    let (trigger, signal) = wake_channel();

    let engine_cancel = cancel.clone();
    let worker: JoinHandle<Result<()>> = std::thread::Builder::new()
        .name("pet-engine".into())
        .spawn(move || {
            let wake = Wake::Signal(signal);
            let mut pacer = ThreadPacer;
            let result = {
                let mut stage = Stage {
                    frames: &frames,
                    sink: &mut sink,
                    pacer: &mut pacer,
                    cancel: &engine_cancel,
                };
                engine.run(&mut stage, &wake)
            };
            sink.finish();
            result
        })
        .map_err(|e| Error::Window(format!("spawn engine thread: {e}")))?;

    let mut app = PreviewApp::new(settings.clone(), trigger, cancel.clone());
    let loop_result = event_loop
        .run_app(&mut app)
        .map_err(|e| Error::Window(e.to_string()));

    // Window gone: stop the engine and wait for it.
    cancel.cancel();
    let engine_result = match worker.join() {
        Ok(result) => result,
        Err(_) => Err(Error::Window("engine thread panicked".into())),
    };

    loop_result?;
    match engine_result {
        // The window closing under an in-flight frame is a normal stop.
        Err(Error::Sink(SinkError::Closed)) => Ok(()),
        other => other,
    }
}
