use std::rc::Rc;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use log::{info, warn};
use slime::config::Config;
use slime::preview::Preview;
use slime::wayland::egl::EglContext;
use slime::wayland::{tolerate_would_block, WaylandState};
use wayland_client::{Connection, Proxy};

const FALLBACK_SIZE: [u32; 2] = [1280, 720];

fn main() -> Result<()> {
    env_logger::init();

    let config = Config::load().unwrap_or_else(|e| {
        warn!("Using default config: {:#}", e);
        Config::default()
    });

    info!("Connecting to Wayland...");
    let conn = Connection::connect_to_env().context("connecting to the Wayland display")?;
    let display = conn.display();

    let mut event_queue = conn.new_event_queue();
    let qh = event_queue.handle();
    let _registry = display.get_registry(&qh, ());

    let mut state = WaylandState::new();
    event_queue.roundtrip(&mut state)?;

    if !state.create_layer_surface(&qh, config.layer, config.size) {
        bail!("Compositor does not support zwlr_layer_shell_v1");
    }

    while !state.configured {
        event_queue.blocking_dispatch(&mut state)?;
    }

    let mut size = surface_size(&state, &config);
    info!("Surface configured at {}x{}", size[0], size[1]);

    let mut egl = EglContext::new(display.id().as_ptr() as *mut _)?;
    if let Some(surface) = &state.surface {
        egl.attach(surface, size)?;
    }

    let gl = unsafe { glow::Context::from_loader_function(|s| egl.get_proc_address(s)) };
    let gl = Rc::new(gl);

    let mut preview = Preview::new(Rc::clone(&gl), &config)?;
    let frame_interval = config.frame_interval();

    while state.running {
        let frame_start = Instant::now();

        event_queue.flush()?;
        if let Some(guard) = event_queue.prepare_read() {
            tolerate_would_block(guard.read()).context("reading Wayland events")?;
        }
        event_queue.dispatch_pending(&mut state)?;

        let configured_size = surface_size(&state, &config);
        if configured_size != size {
            size = configured_size;
            egl.resize(size);
        }

        if std::mem::take(&mut state.reload_requested) {
            preview.reload();
        } else {
            preview.poll_reload();
        }

        egl.make_current()?;
        preview.render(size);
        egl.swap_buffers()?;

        if let Some(rest) = frame_interval.checked_sub(frame_start.elapsed()) {
            std::thread::sleep(rest);
        }
    }

    info!("Shutting down");
    Ok(())
}

fn surface_size(state: &WaylandState, config: &Config) -> [u32; 2] {
    if let Some(size) = state.surface_size {
        return size;
    }
    if !config.size.fills_output() {
        return [config.size.width, config.size.height];
    }
    state.output_size.unwrap_or(FALLBACK_SIZE)
}
