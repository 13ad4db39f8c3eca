pub mod egl;

use log::{debug, info, warn};
use wayland_client::{
    protocol::{wl_compositor, wl_keyboard, wl_output, wl_registry, wl_seat, wl_surface},
    backend::WaylandError,
    Connection, Dispatch, Proxy, QueueHandle, WEnum,
};
use wayland_protocols_wlr::layer_shell::v1::client::{zwlr_layer_shell_v1, zwlr_layer_surface_v1};

use crate::config::{Layer, Size};

// evdev key codes, as delivered by wl_keyboard without a keymap.
const KEY_ESC: u32 = 1;
const KEY_Q: u32 = 16;
const KEY_R: u32 = 19;

// `on_demand` keyboard interactivity arrived in zwlr_layer_shell_v1 version 4.
const LAYER_SHELL_ON_DEMAND_VERSION: u32 = 4;

pub struct WaylandState {
    pub running: bool,
    pub configured: bool,
    pub reload_requested: bool,
    pub compositor: Option<wl_compositor::WlCompositor>,
    pub layer_shell: Option<zwlr_layer_shell_v1::ZwlrLayerShellV1>,
    pub surface: Option<wl_surface::WlSurface>,
    pub layer_surface: Option<zwlr_layer_surface_v1::ZwlrLayerSurfaceV1>,
    pub seat: Option<wl_seat::WlSeat>,
    pub keyboard: Option<wl_keyboard::WlKeyboard>,
    pub output: Option<wl_output::WlOutput>,
    pub output_size: Option<[u32; 2]>,
    /// Size handed to us by the last layer-surface configure.
    pub surface_size: Option<[u32; 2]>,
}

impl WaylandState {
    pub fn new() -> Self {
        Self {
            running: true,
            configured: false,
            reload_requested: false,
            compositor: None,
            layer_shell: None,
            surface: None,
            layer_surface: None,
            seat: None,
            keyboard: None,
            output: None,
            output_size: None,
            surface_size: None,
        }
    }

    /// Creates the preview surface. Returns false when the compositor lacks
    /// `wl_compositor` or `zwlr_layer_shell_v1`.
    pub fn create_layer_surface(&mut self, qh: &QueueHandle<Self>, layer: Layer, size: Size) -> bool {
        let (Some(compositor), Some(layer_shell)) = (&self.compositor, &self.layer_shell) else {
            return false;
        };

        let surface = compositor.create_surface(qh, ());
        let layer_surface = layer_shell.get_layer_surface(
            &surface,
            self.output.as_ref(),
            shell_layer(layer),
            "slime".to_string(),
            qh,
            (),
        );

        if size.fills_output() {
            layer_surface.set_anchor(
                zwlr_layer_surface_v1::Anchor::Top
                    | zwlr_layer_surface_v1::Anchor::Bottom
                    | zwlr_layer_surface_v1::Anchor::Left
                    | zwlr_layer_surface_v1::Anchor::Right,
            );
            layer_surface.set_exclusive_zone(-1);
            layer_surface.set_size(0, 0);
        } else {
            layer_surface.set_exclusive_zone(0);
            layer_surface.set_size(size.width, size.height);
        }

        match keyboard_interactivity(layer_shell.version(), layer) {
            Some(mode) => layer_surface.set_keyboard_interactivity(mode),
            None => warn!(
                "zwlr_layer_shell_v1 version {} cannot give a {:?} surface keyboard focus; keys are disabled",
                layer_shell.version(),
                layer
            ),
        }

        surface.commit();

        self.surface = Some(surface);
        self.layer_surface = Some(layer_surface);
        true
    }
}

impl Default for WaylandState {
    fn default() -> Self {
        Self::new()
    }
}

/// Interactivity to request so the surface can take key presses. Before
/// version 4 only `exclusive` exists, and compositors ignore it below the
/// top layer.
pub fn keyboard_interactivity(
    shell_version: u32,
    layer: Layer,
) -> Option<zwlr_layer_surface_v1::KeyboardInteractivity> {
    if shell_version >= LAYER_SHELL_ON_DEMAND_VERSION {
        Some(zwlr_layer_surface_v1::KeyboardInteractivity::OnDemand)
    } else if matches!(layer, Layer::Top | Layer::Overlay) {
        Some(zwlr_layer_surface_v1::KeyboardInteractivity::Exclusive)
    } else {
        None
    }
}

/// Treats an empty socket as success; any other read failure is returned.
pub fn tolerate_would_block(read: Result<usize, WaylandError>) -> Result<(), WaylandError> {
    match read {
        Ok(_) => Ok(()),
        Err(WaylandError::Io(e)) if e.kind() == std::io::ErrorKind::WouldBlock => Ok(()),
        Err(e) => Err(e),
    }
}

fn shell_layer(layer: Layer) -> zwlr_layer_shell_v1::Layer {
    match layer {
        Layer::Background => zwlr_layer_shell_v1::Layer::Background,
        Layer::Bottom => zwlr_layer_shell_v1::Layer::Bottom,
        Layer::Top => zwlr_layer_shell_v1::Layer::Top,
        Layer::Overlay => zwlr_layer_shell_v1::Layer::Overlay,
    }
}

impl Dispatch<wl_registry::WlRegistry, ()> for WaylandState {
    fn event(
        state: &mut Self,
        registry: &wl_registry::WlRegistry,
        event: wl_registry::Event,
        _: &(),
        _: &Connection,
        qh: &QueueHandle<Self>,
    ) {
        if let wl_registry::Event::Global { name, interface, version } = event {
            match &interface[..] {
                "wl_compositor" => {
                    state.compositor = Some(registry.bind(name, version.min(4), qh, ()));
                }
                "zwlr_layer_shell_v1" => {
                    state.layer_shell = Some(registry.bind(name, version.min(LAYER_SHELL_ON_DEMAND_VERSION), qh, ()));
                }
                "wl_seat" => {
                    state.seat = Some(registry.bind(name, version.min(5), qh, ()));
                }
                "wl_output" => {
                    state.output = Some(registry.bind(name, version.min(2), qh, ()));
                }
                _ => {}
            }
        }
    }
}

impl Dispatch<wl_compositor::WlCompositor, ()> for WaylandState {
    fn event(_: &mut Self, _: &wl_compositor::WlCompositor, _: wl_compositor::Event, _: &(), _: &Connection, _: &QueueHandle<Self>) {}
}

impl Dispatch<wl_surface::WlSurface, ()> for WaylandState {
    fn event(_: &mut Self, _: &wl_surface::WlSurface, _: wl_surface::Event, _: &(), _: &Connection, _: &QueueHandle<Self>) {}
}

impl Dispatch<wl_seat::WlSeat, ()> for WaylandState {
    fn event(
        state: &mut Self,
        seat: &wl_seat::WlSeat,
        event: wl_seat::Event,
        _: &(),
        _: &Connection,
        qh: &QueueHandle<Self>,
    ) {
        if let wl_seat::Event::Capabilities { capabilities: WEnum::Value(caps) } = event {
            if caps.contains(wl_seat::Capability::Keyboard) && state.keyboard.is_none() {
                state.keyboard = Some(seat.get_keyboard(qh, ()));
            }
        }
    }
}

impl Dispatch<wl_keyboard::WlKeyboard, ()> for WaylandState {
    fn event(
        state: &mut Self,
        _: &wl_keyboard::WlKeyboard,
        event: wl_keyboard::Event,
        _: &(),
        _: &Connection,
        _: &QueueHandle<Self>,
    ) {
        if let wl_keyboard::Event::Key {
            key,
            state: WEnum::Value(wl_keyboard::KeyState::Pressed),
            ..
        } = event
        {
            match key {
                KEY_ESC | KEY_Q => state.running = false,
                KEY_R => state.reload_requested = true,
                _ => {}
            }
        }
    }
}

impl Dispatch<wl_output::WlOutput, ()> for WaylandState {
    fn event(
        state: &mut Self,
        _: &wl_output::WlOutput,
        event: wl_output::Event,
        _: &(),
        _: &Connection,
        _: &QueueHandle<Self>,
    ) {
        if let wl_output::Event::Mode { width, height, .. } = event {
            state.output_size = Some([width as u32, height as u32]);
        }
    }
}

impl Dispatch<zwlr_layer_shell_v1::ZwlrLayerShellV1, ()> for WaylandState {
    fn event(_: &mut Self, _: &zwlr_layer_shell_v1::ZwlrLayerShellV1, _: zwlr_layer_shell_v1::Event, _: &(), _: &Connection, _: &QueueHandle<Self>) {}
}

impl Dispatch<zwlr_layer_surface_v1::ZwlrLayerSurfaceV1, ()> for WaylandState {
    fn event(
        state: &mut Self,
        surface: &zwlr_layer_surface_v1::ZwlrLayerSurfaceV1,
        event: zwlr_layer_surface_v1::Event,
        _: &(),
        _: &Connection,
        _: &QueueHandle<Self>,
    ) {
        match event {
            zwlr_layer_surface_v1::Event::Configure { serial, width, height } => {
                debug!("Layer surface configured: {}x{} (serial {})", width, height, serial);
                surface.ack_configure(serial);
                if width > 0 && height > 0 {
                    state.surface_size = Some([width, height]);
                }
                state.configured = true;
            }
            zwlr_layer_surface_v1::Event::Closed => {
                info!("Layer surface closed by compositor");
                state.running = false;
            }
            _ => {}
        }
    }
}
