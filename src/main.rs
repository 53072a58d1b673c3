//! Orange Tree entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlCanvasElement, MouseEvent, TouchEvent, TouchList};

    use orange_tree::consts::*;
    use orange_tree::renderer::RenderState;
    use orange_tree::sim::{GameEvent, Touch};
    use orange_tree::{Director, LevelLibrary, Settings, screen_to_scene};

    /// Game instance holding all state
    struct Game {
        director: Director,
        render_state: Option<RenderState>,
        last_time: f64,
        /// Canvas size in CSS pixels
        viewport: Vec2,
        /// Mouse button held (mouse input only)
        dragging: bool,
    }

    impl Game {
        fn new(director: Director) -> Self {
            Self {
                director,
                render_state: None,
                last_time: 0.0,
                viewport: Vec2::ONE,
                dragging: false,
            }
        }

        fn to_scene(&self, x: f32, y: f32) -> Touch {
            let scene_size = self.director.scene().scene.size;
            Touch {
                location: screen_to_scene(Vec2::new(x, y), self.viewport, scene_size),
            }
        }

        /// Run simulation ticks
        fn update(&mut self, dt: f32) {
            self.director.advance(dt);
            for event in self.director.drain_events() {
                match event {
                    GameEvent::SkullDestroyed { id, .. } => log::info!("Skull {:?} down", id),
                    GameEvent::LevelRequested { level } => log::info!("Level {level} requested"),
                    other => log::debug!("{other:?}"),
                }
            }
        }

        /// Render the current frame
        fn render(&mut self) {
            if let Some(ref mut render_state) = self.render_state {
                match render_state.render_scene(self.director.scene()) {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => {
                        render_state.resize(render_state.size.0, render_state.size.1);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of memory!");
                    }
                    Err(e) => log::warn!("Render error: {:?}", e),
                }
            }
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"Logger already initialized".into());
        }

        log::info!("Orange Tree starting...");

        let Some(window) = web_sys::window() else {
            return;
        };
        let Some(document) = window.document() else {
            log::error!("No document");
            return;
        };

        // Hide loading indicator
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let Some(canvas) = document
            .get_element_by_id("canvas")
            .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
        else {
            log::error!("No #canvas element");
            return;
        };

        // Set canvas size
        let dpr = window.device_pixel_ratio();
        let client_w = canvas.client_width();
        let client_h = canvas.client_height();
        let width = (client_w as f64 * dpr) as u32;
        let height = (client_h as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        let library = match LevelLibrary::builtin() {
            Ok(library) => library,
            Err(e) => {
                log::error!("{e}");
                return;
            }
        };

        let seed = js_sys::Date::now() as u64;
        let settings = Settings::load();
        // Write back so a stored document picks up fields added since
        settings.save();
        let Some(director) = Director::new(library, settings, 1, seed) else {
            log::error!("Level 1 missing from the built-in library");
            return;
        };
        let game = Rc::new(RefCell::new(Game::new(director)));
        game.borrow_mut().viewport = Vec2::new(client_w as f32, client_h as f32);

        log::info!("Game initialized with seed: {}", seed);

        // Initialize WebGPU
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });

        match instance.create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone())) {
            Ok(surface) => {
                let adapter = instance
                    .request_adapter(&wgpu::RequestAdapterOptions {
                        power_preference: wgpu::PowerPreference::HighPerformance,
                        compatible_surface: Some(&surface),
                        force_fallback_adapter: false,
                    })
                    .await;
                match adapter {
                    Ok(adapter) => {
                        log::info!("Using adapter: {:?}", adapter.get_info().name);
                        match RenderState::new(surface, &adapter, width, height).await {
                            Ok(render_state) => game.borrow_mut().render_state = Some(render_state),
                            Err(e) => log::error!("Failed to create device: {e}"),
                        }
                    }
                    Err(e) => log::error!("Failed to get adapter: {e}"),
                }
            }
            Err(e) => log::error!("Failed to create surface: {e}"),
        }

        // Set up input handlers
        setup_input_handlers(&canvas, game.clone());

        // Start game loop
        request_animation_frame(game);

        log::info!("Orange Tree running!");
    }

    fn touch_position(canvas: &HtmlCanvasElement, list: &TouchList) -> Option<(f32, f32)> {
        let touch = list.get(0)?;
        let rect = canvas.get_bounding_client_rect();
        let x = touch.client_x() as f32 - rect.left() as f32;
        let y = touch.client_y() as f32 - rect.top() as f32;
        Some((x, y))
    }

    fn refresh_viewport(game: &mut Game, canvas: &HtmlCanvasElement) {
        game.viewport = Vec2::new(
            canvas.client_width().max(1) as f32,
            canvas.client_height().max(1) as f32,
        );
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        // Touch start
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some((x, y)) = touch_position(&canvas_clone, &event.touches()) {
                    let mut g = game.borrow_mut();
                    refresh_viewport(&mut g, &canvas_clone);
                    let touch = g.to_scene(x, y);
                    g.director.touches_began(&[touch]);
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch move
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some((x, y)) = touch_position(&canvas_clone, &event.touches()) {
                    let mut g = game.borrow_mut();
                    let touch = g.to_scene(x, y);
                    g.director.touches_moved(&[touch]);
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("touchmove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch end: the lifted finger is only in changedTouches
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some((x, y)) = touch_position(&canvas_clone, &event.changed_touches()) {
                    let mut g = game.borrow_mut();
                    let touch = g.to_scene(x, y);
                    g.director.touches_ended(&[touch]);
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("touchend", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse down
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut g = game.borrow_mut();
                refresh_viewport(&mut g, &canvas_clone);
                g.dragging = true;
                let touch = g.to_scene(event.offset_x() as f32, event.offset_y() as f32);
                g.director.touches_began(&[touch]);
            });
            let _ = canvas
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse move (only while the button is held)
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut g = game.borrow_mut();
                if !g.dragging {
                    return;
                }
                let touch = g.to_scene(event.offset_x() as f32, event.offset_y() as f32);
                g.director.touches_moved(&[touch]);
            });
            let _ = canvas
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse up
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut g = game.borrow_mut();
                if !std::mem::take(&mut g.dragging) {
                    return;
                }
                let touch = g.to_scene(event.offset_x() as f32, event.offset_y() as f32);
                g.director.touches_ended(&[touch]);
            });
            let _ = canvas
                .add_event_listener_with_callback("mouseup", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();

            // Calculate delta time
            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            g.last_time = time;

            g.update(dt);
            g.render();
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Orange Tree (native) starting...");
    log::info!("Native mode runs a scripted fling - run with `trunk serve` for the web version");

    if let Err(e) = scripted_fling() {
        log::error!("{e}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Pick an orange on level 1, pull it back and let it fly for a few seconds
#[cfg(not(target_arch = "wasm32"))]
fn scripted_fling() -> Result<(), orange_tree::AssetError> {
    use glam::Vec2;
    use orange_tree::consts::SIM_DT;
    use orange_tree::sim::{GameEvent, NodeKind, Touch};
    use orange_tree::{Director, LevelLibrary, Settings};

    let library = LevelLibrary::builtin()?;
    let Some(mut director) = Director::new(library, Settings::load(), 1, 7) else {
        log::error!("Level 1 missing from the built-in library");
        return Ok(());
    };

    let Some(tree) = director.scene().scene.first_of_kind(NodeKind::Tree) else {
        log::warn!("Level 1 has no tree");
        return Ok(());
    };
    let start = tree.position + Vec2::new(60.0, 60.0);
    let pull = start - Vec2::new(140.0, 90.0);

    director.touches_began(&[Touch { location: start }]);
    director.touches_moved(&[Touch { location: pull }]);
    director.touches_ended(&[Touch { location: pull }]);

    let skulls = |d: &Director| d.scene().scene.count_of_kind(NodeKind::Skull);
    let before = skulls(&director);
    for _ in 0..(4.0 / SIM_DT) as u32 {
        director.advance(SIM_DT);
        for event in director.drain_events() {
            match event {
                GameEvent::SkullDestroyed { id, at } => {
                    log::info!("Skull {:?} destroyed at ({:.0}, {:.0})", id, at.x, at.y)
                }
                other => log::debug!("{other:?}"),
            }
        }
    }
    log::info!("Skulls remaining: {} of {}", skulls(&director), before);
    Ok(())
}
