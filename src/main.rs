use std::any::Any;
use std::env;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use log::info;
use pollster::block_on;
use thiserror::Error;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, Event, KeyboardInput, VirtualKeyCode, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::platform::run_return::EventLoopExtRunReturn;
use winit::window::WindowBuilder;

use glyphlight::app::{
    camera_params, glyph_meshes, print_final_state, shader_light_view, simulate_frames,
};
use glyphlight::{
    advance_frame, ExtrudeOptions, FontHandle, FontStatus, FrameState, InputState, KeyCode,
    MovementFlags, Renderer, Scene, SceneConfig, SceneGraph,
};

fn main() {
    env_logger::init();
    if let Err(err) = run() {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = CliOptions::parse()?;
    let config = match &options.config_path {
        Some(path) => {
            let xml = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read scene config {}", path.display()))?;
            SceneConfig::from_xml(&xml)
                .with_context(|| format!("failed to parse scene config {}", path.display()))?
        }
        None => SceneConfig::default(),
    };

    let scene = Scene::from_config(&config);
    println!(
        "Loaded scene with {} nodes ({} glyphs)",
        scene.nodes.len(),
        config.texts.len()
    );
    for node in &scene.nodes {
        println!(" - {} ({:?})", node.name, node.kind);
    }

    let graph = SceneGraph::from_scene(scene);

    if options.summary_only {
        run_headless(graph, config, &options)
    } else {
        let headless_graph = graph.clone();
        let headless_config = config.clone();
        match run_interactive(graph, config) {
            Ok(()) => Ok(()),
            Err(err) => {
                if err.downcast_ref::<WindowInitError>().is_some() {
                    eprintln!(
                        "{err}. Falling back to --summary-only mode (set DISPLAY or install X11 libs to enable rendering)."
                    );
                    run_headless(headless_graph, headless_config, &options)
                } else {
                    Err(err)
                }
            }
        }
    }
}

fn run_headless(graph: SceneGraph, config: SceneConfig, options: &CliOptions) -> Result<()> {
    if let Some(path) = &config.font_path {
        let mut handle = FontHandle::load(path.clone());
        match handle.wait() {
            FontStatus::Ready(font) => {
                let meshes =
                    glyph_meshes(font, &graph.all_nodes(), &ExtrudeOptions::default());
                for (name, mesh) in &meshes {
                    println!(
                        "Built glyph mesh for {name} ({} triangles)",
                        mesh.indices.len() / 3
                    );
                }
            }
            FontStatus::Failed => println!("Font failed to load; scene has no glyph meshes"),
            FontStatus::Pending => unreachable!("wait() never leaves the handle pending"),
        }
    }

    let flags = MovementFlags::from_held_keys(options.hold.iter().map(String::as_str));
    let mut state = FrameState::default();
    simulate_frames(&graph, &config, flags, options.frames, &mut state);
    println!("Simulated {} frame(s)", options.frames);

    print_final_state(&graph, &state);
    Ok(())
}

fn run_interactive(graph: SceneGraph, config: SceneConfig) -> Result<()> {
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(|_| {}));
    let event_loop = panic::catch_unwind(AssertUnwindSafe(EventLoop::new));
    panic::set_hook(default_hook);
    let event_loop =
        event_loop.map_err(|panic| WindowInitError::from_panic("event loop", panic))?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title("Glyphlight")
            .with_inner_size(LogicalSize::new(1280.0, 720.0))
            .build(&event_loop)
            .map_err(|err| WindowInitError::from_error("window", err))?,
    );

    let renderer = block_on(Renderer::new(Arc::clone(&window)))?;
    let font = config.font_path.clone().map(FontHandle::load);

    let mut app = AppState {
        renderer,
        graph,
        config,
        input: InputState::new(),
        font,
        frame_state: FrameState::default(),
        last_error: None,
    };

    let mut event_loop = event_loop;
    event_loop.run_return(|event, _, control_flow| {
        *control_flow = ControlFlow::Poll;
        if let Err(err) = app.process_event(&event, control_flow) {
            app.last_error = Some(err);
            control_flow.set_exit();
        }
    });

    print_final_state(&app.graph, &app.frame_state);

    if let Some(err) = app.last_error {
        return Err(err);
    }

    Ok(())
}

struct AppState {
    renderer: Renderer,
    graph: SceneGraph,
    config: SceneConfig,
    input: InputState,
    font: Option<FontHandle>,
    frame_state: FrameState,
    last_error: Option<anyhow::Error>,
}

impl AppState {
    fn process_event(&mut self, event: &Event<()>, control_flow: &mut ControlFlow) -> Result<()> {
        match event {
            Event::WindowEvent { event, window_id } if *window_id == self.renderer.window_id() => {
                match event {
                    WindowEvent::CloseRequested => {
                        control_flow.set_exit();
                    }
                    WindowEvent::Resized(size) => {
                        self.renderer.resize(*size);
                    }
                    WindowEvent::ScaleFactorChanged { new_inner_size, .. } => {
                        self.renderer.resize(**new_inner_size);
                    }
                    WindowEvent::KeyboardInput { input, .. } => {
                        self.handle_keyboard(input);
                    }
                    _ => {}
                }
            }
            Event::RedrawRequested(window_id) if *window_id == self.renderer.window_id() => {
                self.render_frame()?;
            }
            Event::MainEventsCleared => {
                self.renderer.window().request_redraw();
            }
            _ => {}
        }
        Ok(())
    }

    fn render_frame(&mut self) -> Result<()> {
        // Input, movement and the light-position copy all happen before
        // the draw call, so the shaders see this frame's cube position.
        let flags = self.input.movement_flags();
        advance_frame(&self.graph, &self.config, flags, &mut self.frame_state);

        self.attach_pending_glyphs();

        let nodes = self.graph.all_nodes();
        let camera = camera_params(&nodes, self.renderer_aspect());
        let light_view = shader_light_view(&camera, &self.frame_state);
        self.renderer
            .update_globals(&camera, light_view, self.config.ambient_intensity);

        if let Err(err) = self.renderer.render(&nodes, &camera) {
            match err {
                wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated => {
                    let size = self.renderer.window().inner_size();
                    self.renderer.resize(size);
                }
                wgpu::SurfaceError::OutOfMemory => {
                    return Err(anyhow!("GPU is out of memory"));
                }
                wgpu::SurfaceError::Timeout => {
                    info!("Surface timeout; retrying next frame");
                }
            }
        }
        Ok(())
    }

    /// Polls the font once per frame and uploads the glyph meshes the
    /// first time it reports ready. Pending and failed fonts simply leave
    /// the text nodes undrawn.
    fn attach_pending_glyphs(&mut self) {
        let Some(font) = self.font.as_mut() else {
            return;
        };
        if let FontStatus::Ready(font) = font.poll() {
            let nodes = self.graph.all_nodes();
            let missing: Vec<_> = nodes
                .iter()
                .filter(|node| {
                    node.glyph.is_some() && !self.renderer.has_text_mesh(&node.name)
                })
                .cloned()
                .collect();
            if missing.is_empty() {
                return;
            }
            for (name, mesh) in glyph_meshes(font, &missing, &ExtrudeOptions::default()) {
                self.renderer.upload_text_mesh(&name, &mesh);
            }
        }
    }

    fn renderer_aspect(&self) -> f32 {
        let size = self.renderer.window().inner_size();
        if size.height == 0 {
            1.0
        } else {
            size.width as f32 / size.height as f32
        }
    }

    fn handle_keyboard(&self, input: &KeyboardInput) {
        let Some(keycode) = input.virtual_keycode.and_then(map_keycode) else {
            return;
        };
        match input.state {
            ElementState::Pressed => self.input.set_key_down(keycode),
            ElementState::Released => self.input.set_key_up(keycode),
        }
    }
}

fn map_keycode(code: VirtualKeyCode) -> Option<KeyCode> {
    match code {
        VirtualKeyCode::W => Some(KeyCode::W),
        VirtualKeyCode::A => Some(KeyCode::A),
        VirtualKeyCode::S => Some(KeyCode::S),
        VirtualKeyCode::D => Some(KeyCode::D),
        _ => None,
    }
}

#[derive(Debug, Error)]
#[error("{message}")]
struct WindowInitError {
    message: String,
}

impl WindowInitError {
    fn from_panic(stage: &str, panic: Box<dyn Any + Send>) -> Self {
        Self {
            message: format!("failed to initialize {stage}: {}", panic_message(panic)),
        }
    }

    fn from_error(stage: &str, err: impl std::fmt::Display) -> Self {
        Self {
            message: format!("failed to initialize {stage}: {err}"),
        }
    }
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    match panic.downcast::<String>() {
        Ok(msg) => *msg,
        Err(panic) => match panic.downcast::<&'static str>() {
            Ok(msg) => (*msg).to_string(),
            Err(_) => "unknown panic".into(),
        },
    }
}

struct CliOptions {
    config_path: Option<PathBuf>,
    summary_only: bool,
    frames: u32,
    hold: Vec<String>,
}

impl CliOptions {
    fn parse() -> Result<Self> {
        let mut options = Self {
            config_path: None,
            summary_only: false,
            frames: 0,
            hold: Vec::new(),
        };
        let mut args = env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--summary-only" => options.summary_only = true,
                "--frames" => {
                    let value = args
                        .next()
                        .ok_or_else(|| anyhow!("--frames expects a count"))?;
                    options.frames = value
                        .parse()
                        .with_context(|| format!("invalid frame count {value:?}"))?;
                }
                "--hold" => {
                    let value = args
                        .next()
                        .ok_or_else(|| anyhow!("--hold expects comma-separated key names"))?;
                    options
                        .hold
                        .extend(value.split(',').map(|key| key.trim().to_string()));
                }
                other if other.starts_with("--") => {
                    return Err(anyhow!(
                        "Unknown argument: {other}. Usage: glyphlight [scene.xml] [--summary-only] [--frames N] [--hold KEYS]"
                    ));
                }
                path => {
                    if options.config_path.is_some() {
                        return Err(anyhow!("multiple scene configs given"));
                    }
                    options.config_path = Some(PathBuf::from(path));
                }
            }
        }
        Ok(options)
    }
}
