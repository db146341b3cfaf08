//! Draw capability
//!
//! The simulation never talks to a window. It paints through `Renderer`, and
//! whatever sits behind it (canvas, terminal, test recorder) is the host's
//! business.

/// Immediate-mode drawing surface
pub trait Renderer {
    fn clear(&mut self);
    fn draw_line(&mut self, x0: f64, y0: f64, x1: f64, y1: f64);
    fn draw_circle(&mut self, x: f64, y: f64, r: f64);
    /// Show everything drawn since the last `clear`
    fn present(&mut self);
}

/// Discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn clear(&mut self) {}
    fn draw_line(&mut self, _x0: f64, _y0: f64, _x1: f64, _y1: f64) {}
    fn draw_circle(&mut self, _x: f64, _y: f64, _r: f64) {}
    fn present(&mut self) {}
}

/// One recorded draw call
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawCommand {
    Line { x0: f64, y0: f64, x1: f64, y1: f64 },
    Circle { x: f64, y: f64, r: f64 },
}

/// Keeps the draw calls of the last presented frame
#[derive(Debug, Default, Clone)]
pub struct RecordingRenderer {
    pending: Vec<DrawCommand>,
    pub last_frame: Vec<DrawCommand>,
    pub frames: u64,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn circles(&self) -> impl Iterator<Item = &DrawCommand> {
        self.last_frame
            .iter()
            .filter(|c| matches!(c, DrawCommand::Circle { .. }))
    }

    pub fn lines(&self) -> impl Iterator<Item = &DrawCommand> {
        self.last_frame
            .iter()
            .filter(|c| matches!(c, DrawCommand::Line { .. }))
    }
}

impl Renderer for RecordingRenderer {
    fn clear(&mut self) {
        self.pending.clear();
    }

    fn draw_line(&mut self, x0: f64, y0: f64, x1: f64, y1: f64) {
        self.pending.push(DrawCommand::Line { x0, y0, x1, y1 });
    }

    fn draw_circle(&mut self, x: f64, y: f64, r: f64) {
        self.pending.push(DrawCommand::Circle { x, y, r });
    }

    fn present(&mut self) {
        self.last_frame = std::mem::take(&mut self.pending);
        self.frames += 1;
    }
}

/// Summarizes each frame through the `log` facade
#[derive(Debug, Default, Clone)]
pub struct LogRenderer {
    lines: usize,
    circles: Vec<(f64, f64, f64)>,
    frames: u64,
}

impl LogRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Renderer for LogRenderer {
    fn clear(&mut self) {
        self.lines = 0;
        self.circles.clear();
    }

    fn draw_line(&mut self, _x0: f64, _y0: f64, _x1: f64, _y1: f64) {
        self.lines += 1;
    }

    fn draw_circle(&mut self, x: f64, y: f64, r: f64) {
        self.circles.push((x, y, r));
    }

    fn present(&mut self) {
        self.frames += 1;
        log::debug!(
            "frame {}: {} lines, balls {:?}",
            self.frames,
            self.lines,
            self.circles
                .iter()
                .map(|(x, y, _)| format!("({x:.1}, {y:.1})"))
                .collect::<Vec<_>>()
        );
    }
}
