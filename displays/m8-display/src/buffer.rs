//! RGBA mirror of the device screen
//!
//! [`DisplayBuffer`] implements [`Sink`]: the session feeds it decoded draw
//! commands and the host uploads [`DisplayBuffer::pixels`] as a texture.
//! Besides drawing it tracks the background color (the color of the last
//! full-screen rect), captures the theme palette from swatch draws and
//! queues [`DisplayEvent`]s for the host.

use alloc::collections::VecDeque;
use alloc::vec;
use alloc::vec::Vec;

use m8_core::config::DisplayConfig;
use m8_core::Sink;
use m8_protocol::{HardwareModel, Key, KeyState, Rgb, SystemInfo};

use crate::geometry::{FontGeometry, FontKind, FONT_KIND_COUNT};
use crate::glyph::GlyphSheet;
use crate::theme::{SwatchTable, ThemePalette, PALETTE_SIZE};

/// Bytes per pixel in the RGBA8 store
pub const BYTES_PER_PIXEL: usize = 4;

/// Undrained events kept before the oldest are dropped
pub const MAX_PENDING_EVENTS: usize = 64;

/// Things a host usually wants to react to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayEvent {
    /// A full-screen rect changed the background color
    BackgroundChanged(Rgb),
    /// All theme swatches have been seen
    ThemeCaptured([Rgb; PALETTE_SIZE]),
    /// A device key changed state
    KeyChanged { key: Key, pressed: bool },
    /// The device reported its model, firmware and font
    SystemInfo(SystemInfo),
    /// The session dropped the connection
    Disconnected,
}

/// Row-major RGBA8 pixel store plus the state needed to render into it
#[derive(Debug, Clone)]
pub struct DisplayBuffer {
    width: u16,
    height: u16,
    pixels: Vec<u8>,
    background: Rgb,
    background_alpha: u8,
    palette: ThemePalette,
    swatches: SwatchTable,
    model: Option<HardwareModel>,
    font: FontKind,
    geometry: FontGeometry,
    glyphs: [Option<GlyphSheet>; FONT_KIND_COUNT],
    /// Width of the last non-empty waveform
    waveform_width: u16,
    keys: KeyState,
    events: VecDeque<DisplayEvent>,
    dirty: bool,
}

impl Default for DisplayBuffer {
    fn default() -> Self {
        Self::new(&DisplayConfig::default())
    }
}

impl DisplayBuffer {
    /// Buffer at the model 01 resolution, used until the device identifies
    pub fn new(config: &DisplayConfig) -> Self {
        let (width, height) = HardwareModel::Model01.resolution();
        Self::with_size(width, height, config)
    }

    /// Buffer at the resolution of `model`, with its small font geometry
    pub fn for_model(model: HardwareModel, config: &DisplayConfig) -> Self {
        let (width, height) = model.resolution();
        let mut buffer = Self::with_size(width, height, config);
        buffer.model = Some(model);
        buffer.font = FontKind::select(model, Default::default());
        buffer.geometry = *buffer.font.geometry();
        buffer
    }

    fn with_size(width: u16, height: u16, config: &DisplayConfig) -> Self {
        let mut pixels = vec![0u8; usize::from(width) * usize::from(height) * BYTES_PER_PIXEL];
        fill(&mut pixels, Rgb::BLACK, u8::MAX);
        let font = FontKind::default();
        Self {
            width,
            height,
            pixels,
            background: Rgb::BLACK,
            background_alpha: config.background_alpha,
            palette: ThemePalette::new(),
            swatches: SwatchTable::from_config(config),
            model: None,
            font,
            geometry: *font.geometry(),
            glyphs: Default::default(),
            waveform_width: 0,
            keys: KeyState::default(),
            events: VecDeque::new(),
            dirty: true,
        }
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    /// RGBA8 pixel data, `width * height * 4` bytes
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn model(&self) -> Option<HardwareModel> {
        self.model
    }

    pub fn font_kind(&self) -> FontKind {
        self.font
    }

    pub fn geometry(&self) -> &FontGeometry {
        &self.geometry
    }

    pub fn background(&self) -> Rgb {
        self.background
    }

    pub fn background_alpha(&self) -> u8 {
        self.background_alpha
    }

    /// Keys last reported by the device
    pub fn keys(&self) -> KeyState {
        self.keys
    }

    pub fn swatches(&self) -> &SwatchTable {
        &self.swatches
    }

    /// Whether pixels changed since the last [`DisplayBuffer::mark_clean`]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    /// Take every queued event, oldest first
    pub fn drain_events(&mut self) -> impl Iterator<Item = DisplayEvent> + '_ {
        self.events.drain(..)
    }

    fn push_event(&mut self, event: DisplayEvent) {
        if self.events.len() >= MAX_PENDING_EVENTS {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }

    /// Install the glyph sheet used when `kind` is the active font
    pub fn set_glyph_sheet(&mut self, kind: FontKind, sheet: GlyphSheet) {
        let (cw, ch) = sheet.cell_size();
        let geometry = kind.geometry();
        if (cw, ch) != (u16::from(geometry.char_width), u16::from(geometry.char_height)) {
            warn!(
                "glyph sheet cell {}x{} differs from font cell {}x{}",
                cw, ch, geometry.char_width, geometry.char_height
            );
        }
        self.glyphs[kind.index()] = Some(sheet);
    }

    pub fn glyph_sheet(&self, kind: FontKind) -> Option<&GlyphSheet> {
        self.glyphs[kind.index()].as_ref()
    }

    /// Captured swatch colors so far
    pub fn captured_colors(&self) -> &[Rgb] {
        self.palette.colors()
    }

    /// The 13 theme colors, or background followed by white while capture
    /// is incomplete
    pub fn theme_colors(&self) -> [Rgb; PALETTE_SIZE] {
        self.palette.resolved(self.background)
    }

    /// Forget captured swatches and start over
    pub fn reset_theme_capture(&mut self) {
        self.palette.clear();
    }

    fn alpha_for(&self, color: Rgb) -> u8 {
        if color == self.background {
            self.background_alpha
        } else {
            u8::MAX
        }
    }

    fn offset_of(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x >= i32::from(self.width) || y >= i32::from(self.height) {
            return None;
        }
        // both coordinates are non-negative and inside the buffer here
        let (x, y) = (x as usize, y as usize);
        Some((y * usize::from(self.width) + x) * BYTES_PER_PIXEL)
    }

    /// Write one pixel; out of bounds is a no-op
    pub fn set_pixel(&mut self, x: i32, y: i32, color: Rgb) {
        let alpha = self.alpha_for(color);
        if let Some(offset) = self.offset_of(x, y) {
            self.pixels[offset..offset + BYTES_PER_PIXEL]
                .copy_from_slice(&[color.r, color.g, color.b, alpha]);
            self.dirty = true;
        }
    }

    /// Color at (x, y), with coordinates clamped to the buffer
    pub fn get_pixel(&self, x: i32, y: i32) -> Rgb {
        let x = x.clamp(0, i32::from(self.width) - 1);
        let y = y.clamp(0, i32::from(self.height) - 1);
        match self.offset_of(x, y) {
            Some(offset) => Rgb::new(
                self.pixels[offset],
                self.pixels[offset + 1],
                self.pixels[offset + 2],
            ),
            None => Rgb::BLACK,
        }
    }

    /// Alpha at (x, y); out of bounds reads as zero
    pub fn get_alpha(&self, x: i32, y: i32) -> u8 {
        self.offset_of(x, y)
            .map_or(0, |offset| self.pixels[offset + 3])
    }

    /// Change the background alpha and re-apply it to background pixels
    pub fn set_background_alpha(&mut self, alpha: u8) {
        self.background_alpha = alpha;
        let bg = self.background;
        for px in self.pixels.chunks_exact_mut(BYTES_PER_PIXEL) {
            if px[0] == bg.r && px[1] == bg.g && px[2] == bg.b {
                px[3] = alpha;
            }
        }
        self.dirty = true;
    }

    /// Fill the clipped rect (x, y, w, h) with `color`
    fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, color: Rgb) {
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = x.saturating_add(w).min(i32::from(self.width));
        let y1 = y.saturating_add(h).min(i32::from(self.height));
        if x0 >= x1 || y0 >= y1 {
            return;
        }

        let alpha = self.alpha_for(color);
        let rgba = [color.r, color.g, color.b, alpha];
        for row in y0..y1 {
            let (Some(start), Some(end)) = (self.offset_of(x0, row), self.offset_of(x1 - 1, row))
            else {
                continue;
            };
            for px in self.pixels[start..end + BYTES_PER_PIXEL].chunks_exact_mut(BYTES_PER_PIXEL) {
                px.copy_from_slice(&rgba);
            }
        }
        self.dirty = true;
    }

    /// Replace this buffer with one sized for `model`
    ///
    /// Host configuration (background alpha, glyph sheets, swatch table),
    /// key state and pending events carry over; pixels, background and the
    /// captured palette start fresh.
    fn rebuild_for(&mut self, model: HardwareModel) {
        let (width, height) = model.resolution();
        let config = DisplayConfig {
            background_alpha: self.background_alpha,
            ..DisplayConfig::default()
        };
        let mut next = Self::with_size(width, height, &config);
        next.swatches = self.swatches.clone();
        next.glyphs = core::mem::take(&mut self.glyphs);
        next.keys = self.keys;
        next.events = core::mem::take(&mut self.events);
        next.waveform_width = 0;
        *self = next;
        info!("display resized to {}x{} for {}", width, height, model.name());
    }
}

fn fill(pixels: &mut [u8], color: Rgb, alpha: u8) {
    for px in pixels.chunks_exact_mut(BYTES_PER_PIXEL) {
        px.copy_from_slice(&[color.r, color.g, color.b, alpha]);
    }
}

impl Sink for DisplayBuffer {
    fn on_draw_rect(&mut self, x: u16, y: u16, w: u16, h: u16, color: Rgb) {
        let x = i32::from(x) + i32::from(self.geometry.x_offset);
        let y = i32::from(y) + i32::from(self.geometry.y_offset);
        let (w, h) = (i32::from(w), i32::from(h));

        if x <= 0 && y <= 0 && w >= i32::from(self.width) && h >= i32::from(self.height) {
            if color != self.background {
                debug!("background color {:?}", color);
                self.push_event(DisplayEvent::BackgroundChanged(color));
            }
            self.background = color;
        }

        // swatch sizes are matched before clipping
        if let (Ok(sw), Ok(sh)) = (u16::try_from(w), u16::try_from(h)) {
            if self.swatches.contains(sw, sh) && self.palette.push(color) {
                if self.palette.is_complete() {
                    debug!("theme palette captured");
                    let colors = self.theme_colors();
                    self.push_event(DisplayEvent::ThemeCaptured(colors));
                }
            }
        }

        self.fill_rect(x, y, w, h, color);
    }

    fn on_draw_char(&mut self, code: u8, x: u16, y: u16, fg: Rgb, bg: Rgb) {
        if code > 127 {
            return;
        }
        let geometry = self.geometry;
        let Some(sheet) = self.glyphs[self.font.index()].take() else {
            return;
        };

        let (cw, ch) = sheet.cell_size();
        let (x0, y0) = sheet.cell_origin(code);
        let px = i32::from(x) + i32::from(geometry.x_offset);
        let py = i32::from(y) + i32::from(geometry.y_offset) + i32::from(geometry.baseline);
        let draw_bg = fg != bg;

        for j in 0..ch {
            for i in 0..cw {
                let (dx, dy) = (px + i32::from(i), py + i32::from(j));
                if sheet.get_bit(x0 + i, y0 + j) {
                    self.set_pixel(dx, dy, fg);
                } else if draw_bg {
                    self.set_pixel(dx, dy, bg);
                }
            }
        }

        self.glyphs[self.font.index()] = Some(sheet);
    }

    fn on_draw_waveform(&mut self, x: u16, y: u16, color: Rgb, samples: &[u8]) {
        if !samples.is_empty() {
            self.waveform_width = u16::try_from(samples.len()).unwrap_or(u16::MAX);
        }
        let width = self.waveform_width;
        if width == 0 {
            return;
        }

        let max = self.geometry.waveform_max;
        let left = i32::from(x) + i32::from(self.width) - i32::from(width);
        let top = i32::from(y);
        self.fill_rect(left, top, i32::from(width), i32::from(max), self.background);

        let ceiling = max.saturating_sub(1);
        for (i, &amplitude) in samples.iter().enumerate() {
            let Ok(i) = i32::try_from(i) else {
                break;
            };
            let amplitude = amplitude.min(ceiling);
            self.set_pixel(left + i, top + i32::from(amplitude), color);
        }
    }

    fn on_key_pressed(&mut self, keys: KeyState) {
        let previous = self.keys;
        self.keys = keys;
        for (key, pressed) in keys.changes_since(previous) {
            trace!("key {:?} pressed={}", key, pressed);
            self.push_event(DisplayEvent::KeyChanged { key, pressed });
        }
    }

    fn on_system_info(&mut self, info: &SystemInfo) {
        if self.model != Some(info.model) {
            self.rebuild_for(info.model);
            self.model = Some(info.model);
        }

        let font = FontKind::select(info.model, info.font);
        if font != self.font {
            debug!("font {:?}", font);
        }
        self.font = font;
        self.geometry = *font.geometry();
        self.push_event(DisplayEvent::SystemInfo(*info));
    }

    /// Clears to opaque black whatever the background alpha is
    fn on_disconnect(&mut self) {
        fill(&mut self.pixels, Rgb::BLACK, u8::MAX);
        self.keys = KeyState::default();
        self.dirty = true;
        self.push_event(DisplayEvent::Disconnected);
    }
}
