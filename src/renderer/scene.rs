//! Camera-following scene recording
//!
//! Produces an ordered list of draw commands for one frame. The camera is locked
//! onto the car (no smoothing, no zoom). Nothing here mutates simulation state.
//!
//! Recording mirrors a 2D canvas: `save`/`restore` bracket transform and glow
//! changes, and every command captures the transform in effect when it was issued.

use glam::{Affine2, Vec2};

use super::vertex::colors;
use crate::consts::{CAR_LENGTH, CAR_WIDTH, GRID_SPACING};
use crate::session::Session;
use crate::sim::{VehicleColor, VehicleState, WorldModel};

/// Grid line width
const GRID_LINE_WIDTH: f32 = 1.0;
/// World border line width; obstacle outlines share it
const BORDER_WIDTH: f32 = 20.0;
/// Body corner radius
const BODY_CORNER_RADIUS: f32 = 5.0;
/// Light glow radius
const LIGHT_GLOW_BLUR: f32 = 15.0;

/// Render target size in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }
}

/// Axis-aligned rectangle in the coordinates of the current transform
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            min: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    pub fn max(&self) -> Vec2 {
        self.min + self.size
    }

    pub fn center(&self) -> Vec2 {
        self.min + self.size * 0.5
    }

    /// Grow by `by` on every side
    pub fn inflate(&self, by: f32) -> Self {
        Self {
            min: self.min - Vec2::splat(by),
            size: self.size + Vec2::splat(2.0 * by),
        }
    }
}

/// Soft halo drawn behind a shape
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glow {
    pub color: [f32; 4],
    pub blur: f32,
}

/// Scene layers, back to front
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Layer {
    Background,
    Grid,
    Border,
    Obstacles,
    Body,
    Windows,
    Headlights,
    Taillights,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    FillRect(Rect),
    FillRoundedRect { rect: Rect, radius: f32 },
    /// Outline centered on the rectangle edge
    StrokeRect { rect: Rect, width: f32 },
    Line { from: Vec2, to: Vec2, width: f32 },
}

/// One recorded draw call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawCommand {
    pub layer: Layer,
    pub shape: Shape,
    pub color: [f32; 4],
    pub glow: Option<Glow>,
    /// Local-to-screen transform captured at record time
    pub transform: Affine2,
}

#[derive(Debug, Clone, Copy)]
struct SavedState {
    transform: Affine2,
    glow: Option<Glow>,
}

/// Draw-command recorder with canvas-style state
#[derive(Debug, Clone)]
pub struct Canvas {
    transform: Affine2,
    glow: Option<Glow>,
    layer: Layer,
    stack: Vec<SavedState>,
    commands: Vec<DrawCommand>,
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            transform: Affine2::IDENTITY,
            glow: None,
            layer: Layer::Background,
            stack: Vec::new(),
            commands: Vec::new(),
        }
    }
}

impl Canvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn save(&mut self) {
        self.stack.push(SavedState {
            transform: self.transform,
            glow: self.glow,
        });
    }

    /// Pop the last saved state. An unmatched restore is ignored.
    pub fn restore(&mut self) {
        if let Some(saved) = self.stack.pop() {
            self.transform = saved.transform;
            self.glow = saved.glow;
        }
    }

    pub fn translate(&mut self, offset: Vec2) {
        self.transform = self.transform * Affine2::from_translation(offset);
    }

    pub fn rotate(&mut self, angle: f32) {
        self.transform = self.transform * Affine2::from_angle(angle);
    }

    pub fn set_glow(&mut self, glow: Option<Glow>) {
        self.glow = glow;
    }

    pub fn set_layer(&mut self, layer: Layer) {
        self.layer = layer;
    }

    /// Saved-state depth
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn transform(&self) -> Affine2 {
        self.transform
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn finish(self) -> Vec<DrawCommand> {
        self.commands
    }

    fn push(&mut self, shape: Shape, color: [f32; 4]) {
        self.commands.push(DrawCommand {
            layer: self.layer,
            shape,
            color,
            glow: self.glow,
            transform: self.transform,
        });
    }

    pub fn fill_rect(&mut self, rect: Rect, color: [f32; 4]) {
        self.push(Shape::FillRect(rect), color);
    }

    pub fn fill_rounded_rect(&mut self, rect: Rect, radius: f32, color: [f32; 4]) {
        self.push(Shape::FillRoundedRect { rect, radius }, color);
    }

    pub fn stroke_rect(&mut self, rect: Rect, width: f32, color: [f32; 4]) {
        self.push(Shape::StrokeRect { rect, width }, color);
    }

    pub fn line(&mut self, from: Vec2, to: Vec2, width: f32, color: [f32; 4]) {
        self.push(Shape::Line { from, to, width }, color);
    }
}

/// Body paint for a color tag
pub fn body_color(color: VehicleColor) -> [f32; 4] {
    match color {
        VehicleColor::Primary => colors::CAR_PRIMARY,
        VehicleColor::Secondary => colors::CAR_SECONDARY,
    }
}

/// Translation that puts the car at the viewport center
pub fn camera_offset(vehicle: &VehicleState, viewport: Viewport) -> Vec2 {
    viewport.center() - vehicle.pos
}

/// Record a full frame
pub fn draw_frame(vehicle: &VehicleState, world: &WorldModel, viewport: Viewport) -> Vec<DrawCommand> {
    let mut canvas = Canvas::new();
    draw_scene(&mut canvas, vehicle, world, viewport);
    canvas.finish()
}

/// Frame for the live run, or `None` when no run is being driven
pub fn frame_for(session: &Session, world: &WorldModel, viewport: Viewport) -> Option<Vec<DrawCommand>> {
    session
        .is_playing()
        .then(|| draw_frame(session.vehicle(), world, viewport))
}

/// Record a full frame into an existing canvas. Transform and glow are restored on return.
pub fn draw_scene(canvas: &mut Canvas, vehicle: &VehicleState, world: &WorldModel, viewport: Viewport) {
    canvas.set_layer(Layer::Background);
    canvas.fill_rect(
        Rect::new(0.0, 0.0, viewport.width, viewport.height),
        colors::BACKGROUND,
    );

    canvas.save();
    canvas.translate(camera_offset(vehicle, viewport));

    draw_grid(canvas, world.side);

    canvas.set_layer(Layer::Border);
    canvas.stroke_rect(
        Rect::new(0.0, 0.0, world.side, world.side),
        BORDER_WIDTH,
        colors::WORLD_BORDER,
    );

    canvas.set_layer(Layer::Obstacles);
    for obstacle in &world.obstacles {
        let rect = Rect {
            min: obstacle.pos,
            size: obstacle.size(),
        };
        canvas.fill_rect(rect, colors::OBSTACLE_FILL);
        canvas.stroke_rect(rect, BORDER_WIDTH, colors::OBSTACLE_OUTLINE);
    }

    draw_vehicle(canvas, vehicle);

    canvas.restore();
}

fn draw_grid(canvas: &mut Canvas, side: f32) {
    canvas.set_layer(Layer::Grid);
    let lines = (side / GRID_SPACING).floor() as u32;
    for i in 0..=lines {
        let x = i as f32 * GRID_SPACING;
        canvas.line(Vec2::new(x, 0.0), Vec2::new(x, side), GRID_LINE_WIDTH, colors::GRID);
    }
    for i in 0..=lines {
        let y = i as f32 * GRID_SPACING;
        canvas.line(Vec2::new(0.0, y), Vec2::new(side, y), GRID_LINE_WIDTH, colors::GRID);
    }
}

/// Car body, cabin and lights in car-local space (+x is forward)
fn draw_vehicle(canvas: &mut Canvas, vehicle: &VehicleState) {
    let half_len = CAR_LENGTH / 2.0;
    let half_wid = CAR_WIDTH / 2.0;

    canvas.save();
    canvas.translate(vehicle.pos);
    canvas.rotate(vehicle.angle);

    canvas.set_layer(Layer::Body);
    canvas.fill_rounded_rect(
        Rect::new(-half_len, -half_wid, CAR_LENGTH, CAR_WIDTH),
        BODY_CORNER_RADIUS,
        body_color(vehicle.color),
    );

    canvas.set_layer(Layer::Windows);
    // Windshield, rear window
    canvas.fill_rect(Rect::new(0.0, -half_wid + 4.0, 15.0, CAR_WIDTH - 8.0), colors::WINDOW);
    canvas.fill_rect(Rect::new(-15.0, -half_wid + 4.0, 10.0, CAR_WIDTH - 8.0), colors::WINDOW);

    canvas.set_layer(Layer::Headlights);
    canvas.set_glow(Some(Glow {
        color: colors::HEADLIGHT_GLOW,
        blur: LIGHT_GLOW_BLUR,
    }));
    canvas.fill_rect(Rect::new(half_len - 2.0, -half_wid + 5.0, 4.0, 6.0), colors::HEADLIGHT);
    canvas.fill_rect(Rect::new(half_len - 2.0, half_wid - 11.0, 4.0, 6.0), colors::HEADLIGHT);

    canvas.set_layer(Layer::Taillights);
    canvas.set_glow(Some(Glow {
        color: colors::TAILLIGHT_GLOW,
        blur: LIGHT_GLOW_BLUR,
    }));
    canvas.fill_rect(Rect::new(-half_len - 2.0, -half_wid + 5.0, 4.0, 6.0), colors::TAILLIGHT);
    canvas.fill_rect(Rect::new(-half_len - 2.0, half_wid - 11.0, 4.0, 6.0), colors::TAILLIGHT);

    canvas.restore();
}
