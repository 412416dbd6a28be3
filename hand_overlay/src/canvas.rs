//! Software pixel buffer and drawing primitives.
//!
//! A [`Canvas`] is the ARGB frame handed to `minifb`.  Panels draw through a
//! [`Viewport`]: panel-local signed coordinates, clipped to the panel's
//! rectangle, so nothing one panel draws can bleed into its neighbour.

use crate::layout::Rect;

// ════════════════════════════════════════════════════════════════════════════
// Canvas
// ════════════════════════════════════════════════════════════════════════════

pub struct Canvas {
    buf:    Vec<u32>,
    width:  usize,
    height: usize,
}

impl Canvas {
    pub fn new(width: usize, height: usize) -> Self {
        Canvas { buf: vec![0xFF000000; width * height], width, height }
    }

    pub fn width(&self) -> usize { self.width }
    pub fn height(&self) -> usize { self.height }
    pub fn pixels(&self) -> &[u32] { &self.buf }

    pub fn pixel(&self, x: usize, y: usize) -> Option<u32> {
        if x < self.width && y < self.height { Some(self.buf[y * self.width + x]) } else { None }
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        self.width  = width;
        self.height = height;
        self.buf.resize(width * height, 0xFF000000);
    }

    pub fn clear(&mut self, color: u32) {
        self.buf.fill(color);
    }

    /// Drawing handle for `rect`, clipped to the canvas.
    pub fn view(&mut self, rect: Rect) -> Viewport<'_> {
        let x = rect.x.min(self.width);
        let y = rect.y.min(self.height);
        let rect = Rect::new(
            x,
            y,
            rect.w.min(self.width - x),
            rect.h.min(self.height - y),
        );
        Viewport { canvas: self, rect }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Viewport
// ════════════════════════════════════════════════════════════════════════════

pub struct Viewport<'a> {
    canvas: &'a mut Canvas,
    rect:   Rect,
}

impl Viewport<'_> {
    pub fn width(&self) -> usize { self.rect.w }
    pub fn height(&self) -> usize { self.rect.h }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as usize >= self.rect.w || y as usize >= self.rect.h {
            return None;
        }
        Some((self.rect.y + y as usize) * self.canvas.width + self.rect.x + x as usize)
    }

    pub fn set_pixel(&mut self, x: i32, y: i32, color: u32) {
        if let Some(i) = self.index(x, y) {
            self.canvas.buf[i] = color;
        }
    }

    /// Mix `color` over the existing pixel with opacity `alpha`.
    pub fn blend_pixel(&mut self, x: i32, y: i32, color: u32, alpha: f32) {
        if let Some(i) = self.index(x, y) {
            self.canvas.buf[i] = blend(self.canvas.buf[i], color, alpha);
        }
    }

    pub fn fill(&mut self, color: u32) {
        let (w, h) = (self.rect.w as i32, self.rect.h as i32);
        self.fill_rect(0, 0, w, h, color);
    }

    pub fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: u32) {
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = (x + w).min(self.rect.w as i32);
        let y1 = (y + h).min(self.rect.h as i32);
        for row in y0..y1 {
            for col in x0..x1 {
                self.set_pixel(col, row, color);
            }
        }
    }

    pub fn border(&mut self, x: i32, y: i32, w: i32, h: i32, color: u32) {
        if w <= 0 || h <= 0 {
            return;
        }
        for col in x..x + w {
            self.set_pixel(col, y, color);
            self.set_pixel(col, y + h - 1, color);
        }
        for row in y..y + h {
            self.set_pixel(x, row, color);
            self.set_pixel(x + w - 1, row, color);
        }
    }

    /// Bresenham line, one pixel wide.
    pub fn line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: u32) {
        for (x, y) in bresenham(x0, y0, x1, y1) {
            self.set_pixel(x, y, color);
        }
    }

    /// Line of `width` pixels, stamped with discs along the Bresenham path.
    pub fn thick_line(&mut self, from: (f32, f32), to: (f32, f32), width: f32, color: u32) {
        let r = (width / 2.0).max(0.5);
        let (x0, y0) = (from.0.round() as i32, from.1.round() as i32);
        let (x1, y1) = (to.0.round() as i32, to.1.round() as i32);
        if r < 1.0 {
            self.line(x0, y0, x1, y1, color);
            return;
        }
        for (x, y) in bresenham(x0, y0, x1, y1) {
            self.disc(x, y, r, color, 1.0);
        }
    }

    /// Thick line whose colour runs from `c0` to `c1`, drawn at `alpha`.
    pub fn gradient_line(
        &mut self,
        from:  (f32, f32),
        to:    (f32, f32),
        width: f32,
        c0:    u32,
        c1:    u32,
        alpha: f32,
    ) {
        let r = (width / 2.0).max(0.5);
        let (x0, y0) = (from.0.round() as i32, from.1.round() as i32);
        let (x1, y1) = (to.0.round() as i32, to.1.round() as i32);
        let steps = (x1 - x0).abs().max((y1 - y0).abs()).max(1) as f32;
        for (i, (x, y)) in bresenham(x0, y0, x1, y1).enumerate() {
            let color = blend(c0, c1, i as f32 / steps);
            self.disc(x, y, r, color, alpha);
        }
    }

    /// Filled circle.
    pub fn circle(&mut self, cx: f32, cy: f32, radius: f32, color: u32) {
        self.disc(cx.round() as i32, cy.round() as i32, radius, color, 1.0);
    }

    /// Filled circle blended at `alpha`.
    pub fn glow(&mut self, cx: f32, cy: f32, radius: f32, color: u32, alpha: f32) {
        self.disc(cx.round() as i32, cy.round() as i32, radius, color, alpha);
    }

    /// Circle outline `thickness` pixels wide, inside `radius`.
    pub fn ring(&mut self, cx: f32, cy: f32, radius: f32, thickness: f32, color: u32) {
        let (cx, cy) = (cx.round() as i32, cy.round() as i32);
        let outer = radius * radius;
        let inner = (radius - thickness).max(0.0).powi(2);
        let r = radius.ceil() as i32;
        for dy in -r..=r {
            for dx in -r..=r {
                let d = (dx * dx + dy * dy) as f32;
                if d <= outer && d > inner {
                    self.set_pixel(cx + dx, cy + dy, color);
                }
            }
        }
    }

    fn disc(&mut self, cx: i32, cy: i32, radius: f32, color: u32, alpha: f32) {
        let r = radius.ceil() as i32;
        let r2 = radius * radius;
        for dy in -r..=r {
            for dx in -r..=r {
                if ((dx * dx + dy * dy) as f32) <= r2 {
                    if alpha >= 1.0 {
                        self.set_pixel(cx + dx, cy + dy, color);
                    } else {
                        self.blend_pixel(cx + dx, cy + dy, color, alpha);
                    }
                }
            }
        }
    }

    /// Grid lines every `spacing` pixels, starting at the origin.
    pub fn grid(&mut self, spacing: usize, color: u32) {
        let spacing = spacing.max(1);
        let (w, h) = (self.rect.w as i32, self.rect.h as i32);
        for x in (0..w).step_by(spacing) {
            self.line(x, 0, x, h - 1, color);
        }
        for y in (0..h).step_by(spacing) {
            self.line(0, y, w - 1, y, color);
        }
    }

    /// Text in the 3×5 bitmap font, each font pixel drawn `scale`×`scale`.
    /// Returns the advance in pixels.
    pub fn text(&mut self, text: &str, x: i32, y: i32, scale: usize, color: u32) -> i32 {
        let s = scale.max(1) as i32;
        let mut cx = x;
        for ch in text.chars() {
            let glyph = char_glyph(ch);
            for (row, &bits) in glyph.iter().enumerate() {
                for col in 0..3 {
                    if bits & (1 << (2 - col)) != 0 {
                        self.fill_rect(cx + col * s, y + row as i32 * s, s, s, color);
                    }
                }
            }
            cx += 4 * s;
            if cx >= self.rect.w as i32 {
                break;
            }
        }
        cx - x
    }
}

/// Width in pixels of `text` drawn at `scale`.
pub fn text_width(text: &str, scale: usize) -> usize {
    text.chars().count() * 4 * scale.max(1)
}

fn bresenham(x0: i32, y0: i32, x1: i32, y1: i32) -> impl Iterator<Item = (i32, i32)> {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    let (mut x, mut y) = (x0, y0);
    let mut done = false;

    std::iter::from_fn(move || {
        if done {
            return None;
        }
        let p = (x, y);
        if x == x1 && y == y1 {
            done = true;
        } else {
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
        Some(p)
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Colour helpers
// ────────────────────────────────────────────────────────────────────────────

/// Alpha-blend two ARGB colors. `t` = 0.0 → all `a`, `t` = 1.0 → all `b`.
pub fn blend(a: u32, b: u32, t: f32) -> u32 {
    let t = t.clamp(0.0, 1.0);
    let lerp = |ca: u32, cb: u32| (ca as f32 * (1.0 - t) + cb as f32 * t).round() as u32;
    let (ar, ag, ab) = ((a >> 16) & 0xFF, (a >> 8) & 0xFF, a & 0xFF);
    let (br, bg, bb) = ((b >> 16) & 0xFF, (b >> 8) & 0xFF, b & 0xFF);
    0xFF000000 | (lerp(ar, br) << 16) | (lerp(ag, bg) << 8) | lerp(ab, bb)
}

// ────────────────────────────────────────────────────────────────────────────
// Minimal 3×5 bitmap font
// ────────────────────────────────────────────────────────────────────────────

/// Five rows of three bits each, MSB on the left.  Lowercase shares the
/// uppercase glyphs.
fn char_glyph(c: char) -> [u8; 5] {
    match c.to_ascii_uppercase() {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'A' => [0b111, 0b101, 0b111, 0b101, 0b101],
        'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'E' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'F' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'J' => [0b001, 0b001, 0b001, 0b101, 0b111],
        'K' => [0b101, 0b101, 0b110, 0b101, 0b101],
        'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'M' => [0b101, 0b111, 0b101, 0b101, 0b101],
        'N' => [0b111, 0b101, 0b101, 0b101, 0b101],
        'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'Q' => [0b111, 0b101, 0b101, 0b111, 0b001],
        'R' => [0b110, 0b101, 0b110, 0b101, 0b101],
        'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
        'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'V' => [0b101, 0b101, 0b101, 0b010, 0b010],
        'W' => [0b101, 0b101, 0b101, 0b111, 0b101],
        'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'Y' => [0b101, 0b101, 0b111, 0b010, 0b010],
        'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ',' => [0b000, 0b000, 0b000, 0b010, 0b100],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '=' => [0b000, 0b111, 0b000, 0b111, 0b000],
        '+' => [0b000, 0b010, 0b111, 0b010, 0b000],
        '%' => [0b101, 0b001, 0b010, 0b100, 0b101],
        '(' => [0b001, 0b010, 0b010, 0b010, 0b001],
        ')' => [0b100, 0b010, 0b010, 0b010, 0b100],
        '[' => [0b011, 0b010, 0b010, 0b010, 0b011],
        ']' => [0b110, 0b010, 0b010, 0b010, 0b110],
        '&' => [0b010, 0b101, 0b010, 0b101, 0b011],
        '!' => [0b010, 0b010, 0b010, 0b000, 0b010],
        '_' => [0b000, 0b000, 0b000, 0b000, 0b111],
        '|' => [0b010, 0b010, 0b010, 0b010, 0b010],
        ' ' => [0b000, 0b000, 0b000, 0b000, 0b000],
        _   => [0b000, 0b000, 0b010, 0b000, 0b000], // fallback dot
    }
}
