//! Interactive snow-crystal growth viewer built with eframe/egui.
//!
//! This module defines [`Viewer`], which owns the running [`Simulation`]
//! and implements [`eframe::App`] to paint the grid and control the run
//! through an egui UI.

use eframe::App;
use glam::Vec2;
use snow_core::{
    cell::Cell,
    driver::{Mode, Simulation},
    params::{ConfigError, Params},
};

/// Run settings staged in the UI.
///
/// Edits to these values never touch the running simulation; they are
/// applied by constructing a new run via [`Viewer::restart`], matching
/// the rule that a parameter change re-seeds the grid rather than
/// patching a run in flight.
#[derive(Clone, Copy, Debug, PartialEq)]
struct RunConfig {
    width: usize,
    height: usize,
    params: Params,
    mode: Mode,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            width: 161,
            height: 161,
            params: Params::default(),
            mode: Mode::default(),
        }
    }
}

impl RunConfig {
    fn start(&self) -> Result<Simulation, ConfigError> {
        Simulation::new(self.width, self.height, self.params, self.mode)
    }
}

/// Main application state for the interactive viewer.
///
/// The typical per-frame update is:
/// 1. Handle UI interactions / input.
/// 2. If `running` is `true` and enough time has passed, advance the
///    simulation one generation.
/// 3. Paint the committed grid snapshot.
///
/// ### Fields
/// - `sim` - The current run (grid buffers, parameters, mode).
/// - `staged` - UI-edited run settings, applied on restart only.
///
/// - `running` - Whether the simulation is currently auto-advancing.
/// - `zoom` - Pixels per grid cell.
/// - `pan` - Screen-space pan offset in pixels.
///
/// - `step_interval` - Target time step between automatic generations (seconds).
/// - `last_step_time` - Time stamp of the last step (egui time).
/// - `last_step_dt` - Actual time delta between the last two steps (for display only).
pub struct Viewer {
    sim: Simulation,
    staged: RunConfig,

    running: bool,
    zoom: f32,
    pan: egui::Vec2,

    step_interval: f64,
    last_step_time: f64,
    last_step_dt: f64,
}

impl Viewer {
    /// Creates a viewer running the default configuration: a 161x161
    /// grid with the reference parameter set and the separated
    /// (faithful) pass mode.
    pub fn new() -> Result<Self, ConfigError> {
        let staged = RunConfig::default();
        let sim = staged.start()?;

        Ok(Self {
            sim,
            staged,
            running: false,
            zoom: 4.0,
            pan: egui::vec2(0.0, 0.0),
            step_interval: 0.02,
            last_step_time: 0.0,
            last_step_dt: 0.0,
        })
    }

    /// Replaces the current run with a fresh one built from the staged
    /// settings. If the staged settings are invalid the old run is kept
    /// and the rejection is logged.
    fn restart(&mut self) {
        match self.staged.start() {
            Ok(sim) => {
                self.sim = sim;
                self.running = false;
                self.last_step_time = 0.0;
                self.last_step_dt = 0.0;
            }
            Err(err) => log::warn!("restart rejected: {err}"),
        }
    }

    /// Advances the simulation by a single generation.
    fn step_once(&mut self) {
        self.sim.step();
    }

    /// Converts a world-space position (grid units, origin at the grid
    /// center, y up) to screen-space.
    fn world_to_screen(&self, p: Vec2, rect: egui::Rect) -> egui::Pos2 {
        let center = rect.center();
        egui::pos2(
            center.x + p.x * self.zoom + self.pan.x,
            center.y - p.y * self.zoom + self.pan.y,
        )
    }

    /// Inverse of [`Viewer::world_to_screen`] up to floating rounding.
    fn screen_to_world(&self, p: egui::Pos2, rect: egui::Rect) -> Vec2 {
        let center = rect.center();
        let x = (p.x - center.x - self.pan.x) / self.zoom;
        let y = (center.y - p.y + self.pan.y) / self.zoom;
        Vec2::new(x, y)
    }

    /// Color-maps one cell.
    ///
    /// Attached ice renders as bright gray scaling with crystal mass;
    /// unattached cells mix a dim vapor floor with a blue boundary-mass
    /// tint, the same channel roles the original used.
    fn cell_color(cell: &Cell) -> egui::Color32 {
        if cell.attached {
            let t = (cell.crystal * 0.5).clamp(0.0, 1.0);
            return egui::Color32::from_gray((170.0 + 85.0 * t) as u8);
        }

        let vapor = (cell.vapor * 70.0).clamp(0.0, 70.0);
        let boundary = (cell.boundary * 90.0).clamp(0.0, 150.0);
        egui::Color32::from_rgb(
            (vapor * 0.4) as u8,
            (vapor * 0.5) as u8,
            (vapor + boundary).min(255.0) as u8,
        )
    }

    /// Helper to draw a labeled `f32` [`egui::DragValue`].
    fn labeled_drag_f32(
        ui: &mut egui::Ui,
        label: &str,
        value: &mut f32,
        range: std::ops::RangeInclusive<f32>,
        speed: f64,
    ) {
        ui.horizontal(|ui| {
            ui.label(label);
            ui.add(egui::DragValue::new(value).range(range).speed(speed));
        });
    }

    /// Helper to draw a labeled `usize` [`egui::DragValue`].
    fn labeled_drag_usize(
        ui: &mut egui::Ui,
        label: &str,
        value: &mut usize,
        range: std::ops::RangeInclusive<usize>,
    ) {
        ui.horizontal(|ui| {
            ui.label(label);
            ui.add(egui::DragValue::new(value).range(range).speed(1.0));
        });
    }

    /// Builds the top panel UI (run controls, stepping, zoom).
    fn ui_top_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui
                    .button(if self.running { "⏸ Pause" } else { "▶ Run" })
                    .clicked()
                {
                    self.running = !self.running;
                }

                ui.add(
                    egui::DragValue::new(&mut self.step_interval)
                        .prefix("dt target = ")
                        .range(0.0..=1.0)
                        .speed(0.01),
                );

                if ui.button("Step").clicked() {
                    let now = ctx.input(|i| i.time);
                    if self.last_step_time > 0.0 {
                        self.last_step_dt = now - self.last_step_time;
                    }
                    self.step_once();
                    self.last_step_time = now;
                }

                if ui.button("Restart").clicked() {
                    self.restart();
                }

                ui.separator();
                ui.add(egui::Slider::new(&mut self.zoom, 1.0..=20.0).text("Zoom"));
            });
        });
    }

    /// Builds the bottom status bar (time step, generation, growth stats).
    fn ui_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(format!("dt last = {:.3} s", self.last_step_dt));
                ui.separator();
                ui.label(format!("generation = {}", self.sim.generation()));
                ui.label(format!("attached = {}", self.sim.grid().attached_count()));
                ui.label(format!("vapor = {:.1}", self.sim.grid().total_vapor()));
                ui.separator();
                ui.label(format!("mode = {:?}", self.sim.mode()));
            });
        });
    }

    /// Builds the right-hand configuration panel for run settings.
    ///
    /// Everything here edits the staged [`RunConfig`]; nothing takes
    /// effect until Restart.
    fn ui_config_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::right("config_panel")
            .resizable(true)
            .default_width(220.0)
            .show(ctx, |ui| {
                ui.heading("Run config");
                ui.label("Applied on restart");

                ui.separator();
                ui.label("Grid");
                Self::labeled_drag_usize(ui, "width:", &mut self.staged.width, 3..=1001);
                Self::labeled_drag_usize(ui, "height:", &mut self.staged.height, 3..=1001);

                ui.separator();
                ui.label("Pass mode");
                ui.horizontal(|ui| {
                    ui.selectable_value(&mut self.staged.mode, Mode::Separated, "Separated");
                    ui.selectable_value(&mut self.staged.mode, Mode::Combined, "Combined");
                });

                ui.separator();
                ui.label("Ambient vapor");
                Self::labeled_drag_f32(ui, "rho:", &mut self.staged.params.rho, 0.0..=1.0, 0.005);

                ui.separator();
                ui.label("Attachment");
                Self::labeled_drag_f32(ui, "beta:", &mut self.staged.params.beta, 0.0..=5.0, 0.01);
                Self::labeled_drag_f32(
                    ui,
                    "alpha:",
                    &mut self.staged.params.alpha,
                    0.0..=2.0,
                    0.01,
                );
                Self::labeled_drag_f32(
                    ui,
                    "theta:",
                    &mut self.staged.params.theta,
                    0.0..=1.0,
                    0.001,
                );

                ui.separator();
                ui.label("Freezing / melting");
                Self::labeled_drag_f32(
                    ui,
                    "kappa:",
                    &mut self.staged.params.kappa,
                    0.0..=1.0,
                    0.001,
                );
                Self::labeled_drag_f32(ui, "mu:", &mut self.staged.params.mu, 0.0..=1.0, 0.001);
                Self::labeled_drag_f32(
                    ui,
                    "gamma:",
                    &mut self.staged.params.gamma,
                    0.0..=1.0,
                    0.0001,
                );

                ui.separator();
                if ui.button("Reset params to default").clicked() {
                    self.staged.params = Params::default();
                }
                if ui.button("Restart run").clicked() {
                    self.restart();
                }
            });
    }

    /// Builds the central panel where the grid is painted.
    fn ui_central_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let response = ui.allocate_response(ui.available_size(), egui::Sense::drag());
            let rect = response.rect;
            let painter = ui.painter_at(rect);

            // Pan with drag.
            if response.dragged() {
                self.pan += response.drag_delta();
            }

            // Zoom around the mouse cursor.
            let scroll = ui.ctx().input(|i| i.raw_scroll_delta.y);
            if scroll != 0.0 {
                let pointer_screen = response.hover_pos().unwrap_or(rect.center());
                let world_before = self.screen_to_world(pointer_screen, rect);

                let factor = (1.0 + scroll * 0.001).clamp(0.5, 2.0);
                self.zoom = (self.zoom * factor).clamp(1.0, 20.0);

                let screen_after = self.world_to_screen(world_before, rect);
                self.pan += pointer_screen - screen_after;
            }

            // Paint every cell as a filled square of `zoom` pixels,
            // with the grid centered on the world origin.
            let grid = self.sim.grid();
            let half = Vec2::new(grid.width() as f32, grid.height() as f32) * 0.5;
            let cell_px = egui::vec2(self.zoom, self.zoom);

            for y in 0..grid.height() {
                for x in 0..grid.width() {
                    let cell = grid.get(x as i32, y as i32);
                    // Screen-space top-left corner is the world-space
                    // upper-left corner of the cell (y axis flips).
                    let world = Vec2::new(x as f32, y as f32 + 1.0) - half;
                    let min = self.world_to_screen(world, rect);
                    let cell_rect = egui::Rect::from_min_size(min, cell_px);

                    if rect.intersects(cell_rect) {
                        painter.rect_filled(cell_rect, 0, Self::cell_color(cell));
                    }
                }
            }

            // Auto-run simulation if requested.
            if self.running {
                let now = ctx.input(|i| i.time);
                let elapsed = now - self.last_step_time;
                if elapsed >= self.step_interval {
                    if self.last_step_time > 0.0 {
                        self.last_step_dt = elapsed;
                    }
                    self.step_once();
                    self.last_step_time = now;
                }

                ctx.request_repaint();
            }
        });
    }
}

impl App for Viewer {
    /// eframe callback that builds all UI panels for each frame.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.ui_top_panel(ctx);
        self.ui_status_bar(ctx);
        self.ui_config_panel(ctx);
        self.ui_central_panel(ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_rect() -> egui::Rect {
        egui::Rect::from_min_size(egui::Pos2::new(0.0, 0.0), egui::vec2(800.0, 600.0))
    }

    #[test]
    fn world_to_screen_and_back_is_roundtrip() {
        let mut viewer = Viewer::new().expect("default config is valid");
        // Use non-trivial zoom and pan to exercise the math.
        viewer.zoom = 2.0;
        viewer.pan = egui::vec2(15.0, -7.0);
        let rect = test_rect();

        let world_points = [
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, -5.0),
            Vec2::new(-3.5, 8.25),
        ];

        let eps = 1e-4;

        for p in world_points {
            let screen = viewer.world_to_screen(p, rect);
            let back = viewer.screen_to_world(screen, rect);

            assert!(
                (back.x - p.x).abs() < eps && (back.y - p.y).abs() < eps,
                "roundtrip mismatch: p={:?}, back={:?}",
                p,
                back
            );
        }
    }

    #[test]
    fn step_once_advances_the_generation() {
        let mut viewer = Viewer::new().expect("default config is valid");
        assert_eq!(viewer.sim.generation(), 0);

        viewer.step_once();
        assert_eq!(viewer.sim.generation(), 1);
    }

    #[test]
    fn restart_applies_the_staged_settings() {
        let mut viewer = Viewer::new().expect("default config is valid");
        viewer.step_once();
        viewer.running = true;

        viewer.staged.width = 41;
        viewer.staged.height = 31;
        viewer.staged.mode = Mode::Combined;
        viewer.restart();

        assert_eq!(viewer.sim.grid().width(), 41);
        assert_eq!(viewer.sim.grid().height(), 31);
        assert_eq!(viewer.sim.mode(), Mode::Combined);
        assert_eq!(viewer.sim.generation(), 0);
        assert!(!viewer.running, "a fresh run starts paused");
    }

    #[test]
    fn invalid_staged_settings_keep_the_old_run() {
        let mut viewer = Viewer::new().expect("default config is valid");
        viewer.staged.params.rho = 2.0; // outside [0, 1]
        viewer.restart();

        // The previous run (and its valid parameters) must survive.
        assert_eq!(viewer.sim.params().rho, Params::default().rho);
    }

    #[test]
    fn attached_cells_render_brighter_than_vapor() {
        let ice = Viewer::cell_color(&Cell::seed());
        let vapor = Viewer::cell_color(&Cell::with_vapor(0.635));

        assert!(ice.r() > vapor.r());
        assert!(ice.g() > vapor.g());
    }
}
