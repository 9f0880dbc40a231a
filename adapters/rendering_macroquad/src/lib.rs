#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for TileMaze.
//!
//! Macroquad is used without default features since the editor plays no audio.

mod keymap;

pub use keymap::{KeyAction, KeyMap};

use anyhow::Result;
use glam::Vec2;
use macroquad::input::{
    is_key_down, is_key_pressed, is_key_released, is_mouse_button_down, mouse_position,
    MouseButton,
};
use std::time::Duration;
use tilemaze_core::{Cell, CellCoord, CellKind, Direction};
use tilemaze_rendering::{
    CellPalette, Color, FrameInput, Presentation, RenderingBackend, Scene, TileGridPresentation,
};

const WALL_THICKNESS: f32 = 0.4;
const DOT_RADIUS: f32 = 0.12;
const BIG_DOT_RADIUS: f32 = 0.3;
const SPAWN_INSET: f32 = 0.15;
const AGENT_RADIUS: f32 = 0.4;

/// Rendering backend implemented on top of macroquad.
#[derive(Clone, Debug, Default)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
    keymap: KeyMap,
}

impl MacroquadBackend {
    /// Returns a backend that requests the platform's default swap interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the backend to request a specific swap interval from the platform.
    #[must_use]
    pub fn with_swap_interval(mut self, swap_interval: Option<i32>) -> Self {
        self.swap_interval = swap_interval;
        self
    }

    /// Configures the backend to either synchronise presentation with the display refresh rate
    /// or render as fast as possible.
    #[must_use]
    pub fn with_vsync(self, enabled: bool) -> Self {
        let swap_interval = if enabled { Some(1) } else { Some(0) };
        self.with_swap_interval(swap_interval)
    }

    /// Replaces the key bindings used to translate keyboard input.
    #[must_use]
    pub fn with_keymap(mut self, keymap: KeyMap) -> Self {
        self.keymap = keymap;
        self
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static,
    {
        let Self {
            swap_interval,
            keymap,
        } = self;

        let Presentation {
            window_title,
            clear_color,
            scene,
        } = presentation;

        let mut config = macroquad::window::Conf {
            window_title,
            window_width: 960,
            window_height: 960,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        macroquad::Window::from_config(config, async move {
            let mut scene = scene;
            let background = to_macroquad_color(clear_color);

            loop {
                macroquad::window::clear_background(background);

                let screen_width = macroquad::window::screen_width();
                let screen_height = macroquad::window::screen_height();

                let dt_seconds = macroquad::time::get_frame_time();
                let frame_dt = Duration::from_secs_f32(dt_seconds.max(0.0));
                let metrics_before = SceneMetrics::from_scene(&scene, screen_width, screen_height);
                let frame_input = gather_frame_input(&scene, &metrics_before, &keymap);
                let quit_requested = frame_input.quit_requested;

                update_scene(frame_dt, frame_input, &mut scene);

                let metrics = SceneMetrics::from_scene(&scene, screen_width, screen_height);
                if scene.wireframe {
                    draw_tile_grid(
                        &metrics,
                        &scene.tile_grid,
                        to_macroquad_color(scene.tile_grid.line_color),
                    );
                }
                for cell in &scene.cells {
                    let origin = metrics.cell_origin(cell.cell);
                    draw_cell(
                        cell.contents,
                        origin,
                        metrics.cell_step,
                        &scene.palette,
                        scene.wireframe,
                    );
                }
                draw_agent(&scene, &metrics);
                draw_brush_preview(&scene, &metrics);

                if quit_requested {
                    break;
                }

                macroquad::window::next_frame().await;
            }
        });

        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct SceneMetrics {
    scale: f32,
    offset: Vec2,
    cell_step: f32,
}

impl SceneMetrics {
    fn from_scene(scene: &Scene, screen_width: f32, screen_height: f32) -> Self {
        let tile_grid = scene.tile_grid;
        let world_width = tile_grid.width();
        let world_height = scene.total_height();
        let scale = if world_width <= f32::EPSILON || world_height <= f32::EPSILON {
            1.0
        } else {
            (screen_width / world_width).min(screen_height / world_height)
        };

        let offset = Vec2::new(
            ((screen_width - world_width * scale) * 0.5).max(0.0),
            ((screen_height - world_height * scale) * 0.5).max(0.0),
        );

        Self {
            scale,
            offset,
            cell_step: tile_grid.cell_length * scale,
        }
    }

    fn cell_origin(&self, cell: CellCoord) -> Vec2 {
        self.offset + Vec2::new(cell.column() as f32, cell.row() as f32) * self.cell_step
    }

    fn position_to_screen(&self, position_in_cells: Vec2) -> Vec2 {
        self.offset + position_in_cells * self.cell_step
    }

    fn cell_under_cursor(
        &self,
        tile_grid: &TileGridPresentation,
        cursor: Vec2,
    ) -> Option<CellCoord> {
        if self.scale <= f32::EPSILON {
            return None;
        }
        tile_grid.cell_at((cursor - self.offset) / self.scale)
    }
}

fn gather_frame_input(scene: &Scene, metrics: &SceneMetrics, keymap: &KeyMap) -> FrameInput {
    let mut pressed = Vec::new();
    let mut released = Vec::new();
    for (key, action) in keymap.bindings() {
        let (was_pressed, was_released) =
            key_transitions(is_key_pressed(key), is_key_released(key), is_key_down(key));
        if was_pressed {
            pressed.push(action);
        }
        if was_released {
            released.push(action);
        }
    }

    let (cursor_x, cursor_y) = mouse_position();
    gather_frame_input_from_observations(
        scene,
        metrics,
        Vec2::new(cursor_x, cursor_y),
        &pressed,
        &released,
        is_mouse_button_down(MouseButton::Left),
        is_mouse_button_down(MouseButton::Right),
    )
}

/// Press and release transitions to report for one key this frame.
///
/// Both flags together mean a tap, unless the key is still down, in which
/// case it was released and pressed again and only the press counts.
fn key_transitions(pressed: bool, released: bool, down: bool) -> (bool, bool) {
    if pressed && released && down {
        (true, false)
    } else {
        (pressed, released)
    }
}

/// Presses are recorded before releases so a tap within one frame cancels
/// itself downstream.
fn gather_frame_input_from_observations(
    scene: &Scene,
    metrics: &SceneMetrics,
    cursor_position: Vec2,
    pressed: &[KeyAction],
    released: &[KeyAction],
    paint_held: bool,
    erase_held: bool,
) -> FrameInput {
    let mut input = FrameInput::default();
    for action in pressed {
        action.apply_press(&mut input);
    }
    for action in released {
        action.apply_release(&mut input);
    }

    let hovered = metrics.cell_under_cursor(&scene.tile_grid, cursor_position);
    if paint_held {
        input.paint_cell = hovered;
    }
    if erase_held {
        input.erase_cell = hovered;
    }

    input
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Segment {
    x: f32,
    y: f32,
    width: f32,
    height: f32,
}

/// Rectangles forming a wall: a centred block plus an arm towards every
/// connected side.
fn wall_segments(cell: Cell, origin: Vec2, step: f32) -> Vec<Segment> {
    let thickness = step * WALL_THICKNESS;
    let half = step * 0.5;
    let centre = origin + Vec2::splat(half);
    let inner = centre - Vec2::splat(thickness * 0.5);

    let mut segments = vec![Segment {
        x: inner.x,
        y: inner.y,
        width: thickness,
        height: thickness,
    }];
    for direction in cell.flags().directions() {
        let arm = match direction {
            Direction::Up => Segment {
                x: inner.x,
                y: origin.y,
                width: thickness,
                height: half,
            },
            Direction::Down => Segment {
                x: inner.x,
                y: centre.y,
                width: thickness,
                height: half,
            },
            Direction::Left => Segment {
                x: origin.x,
                y: inner.y,
                width: half,
                height: thickness,
            },
            Direction::Right => Segment {
                x: centre.x,
                y: inner.y,
                width: half,
                height: thickness,
            },
        };
        segments.push(arm);
    }
    segments
}

fn draw_tile_grid(
    metrics: &SceneMetrics,
    tile_grid: &TileGridPresentation,
    grid_color: macroquad::color::Color,
) {
    let width = tile_grid.columns as f32 * metrics.cell_step;
    let height = tile_grid.rows as f32 * metrics.cell_step;

    for column in 0..=tile_grid.columns {
        let x = metrics.offset.x + column as f32 * metrics.cell_step;
        macroquad::shapes::draw_line(
            x,
            metrics.offset.y,
            x,
            metrics.offset.y + height,
            1.0,
            grid_color,
        );
    }

    for row in 0..=tile_grid.rows {
        let y = metrics.offset.y + row as f32 * metrics.cell_step;
        macroquad::shapes::draw_line(
            metrics.offset.x,
            y,
            metrics.offset.x + width,
            y,
            1.0,
            grid_color,
        );
    }
}

fn draw_cell(cell: Cell, origin: Vec2, step: f32, palette: &CellPalette, wireframe: bool) {
    if step <= f32::EPSILON {
        return;
    }
    let Some(color) = palette.color_for(cell.kind()) else {
        return;
    };
    let color = to_macroquad_color(color);
    let centre = origin + Vec2::splat(step * 0.5);

    match cell.kind() {
        CellKind::Blank => {}
        CellKind::Wall => {
            for segment in wall_segments(cell, origin, step) {
                if wireframe {
                    macroquad::shapes::draw_rectangle_lines(
                        segment.x,
                        segment.y,
                        segment.width,
                        segment.height,
                        1.0,
                        color,
                    );
                } else {
                    macroquad::shapes::draw_rectangle(
                        segment.x,
                        segment.y,
                        segment.width,
                        segment.height,
                        color,
                    );
                }
            }
        }
        CellKind::Dot | CellKind::DotBig => {
            let scale = if cell.kind() == CellKind::Dot {
                DOT_RADIUS
            } else {
                BIG_DOT_RADIUS
            };
            let radius = scale * step;
            if wireframe {
                macroquad::shapes::draw_circle_lines(centre.x, centre.y, radius, 1.0, color);
            } else {
                macroquad::shapes::draw_circle(centre.x, centre.y, radius, color);
            }
        }
        CellKind::PlayerSpawn => {
            let inset = step * SPAWN_INSET;
            let side = step - inset * 2.0;
            if wireframe {
                macroquad::shapes::draw_rectangle_lines(
                    origin.x + inset,
                    origin.y + inset,
                    side,
                    side,
                    1.0,
                    color,
                );
            } else {
                macroquad::shapes::draw_rectangle(
                    origin.x + inset,
                    origin.y + inset,
                    side,
                    side,
                    color,
                );
            }
        }
        CellKind::PlayerMarker => {
            let inset = step * SPAWN_INSET;
            let side = step - inset * 2.0;
            macroquad::shapes::draw_rectangle_lines(
                origin.x + inset,
                origin.y + inset,
                side,
                side,
                2.0,
                color,
            );
        }
    }
}

fn draw_agent(scene: &Scene, metrics: &SceneMetrics) {
    if metrics.cell_step <= f32::EPSILON {
        return;
    }

    let centre = metrics.position_to_screen(scene.agent.position + Vec2::splat(0.5));
    let radius = AGENT_RADIUS * metrics.cell_step;
    let color = to_macroquad_color(scene.palette.agent);
    if scene.wireframe {
        macroquad::shapes::draw_circle_lines(centre.x, centre.y, radius, 1.0, color);
    } else {
        macroquad::shapes::draw_circle(centre.x, centre.y, radius, color);
    }
}

fn draw_brush_preview(scene: &Scene, metrics: &SceneMetrics) {
    let preview_row = scene.tile_grid.rows as f32 + 0.5;
    let origin = metrics.position_to_screen(Vec2::new(0.5, preview_row));
    let outline = to_macroquad_color(scene.tile_grid.line_color.lighten(0.4));

    macroquad::shapes::draw_rectangle_lines(
        origin.x,
        origin.y,
        metrics.cell_step,
        metrics.cell_step,
        1.0,
        outline,
    );
    draw_cell(
        scene.brush,
        origin,
        metrics.cell_step,
        &scene.palette,
        scene.wireframe,
    );

    let label = brush_label(scene.brush);
    let _ = macroquad::text::draw_text(
        &label,
        origin.x + metrics.cell_step * 1.5,
        origin.y + metrics.cell_step * 0.75,
        metrics.cell_step.max(8.0),
        outline,
    );
}

fn brush_label(brush: Cell) -> String {
    match brush.kind() {
        CellKind::Blank => "brush: blank".to_owned(),
        CellKind::Wall if brush.is_auto_wall() => "brush: auto wall".to_owned(),
        CellKind::Wall => format!("brush: wall {:04b}", brush.flags().bits()),
        CellKind::Dot => "brush: dot".to_owned(),
        CellKind::DotBig => "brush: big dot".to_owned(),
        CellKind::PlayerSpawn => "brush: spawn".to_owned(),
        CellKind::PlayerMarker => "brush: marker".to_owned(),
    }
}

fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}
