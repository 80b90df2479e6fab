use std::{collections::HashMap, sync::Mutex};

use macroquad::prelude::*;

use crate::model::{Color as FluidColor, PuzzleState, Tube};

pub const FLUID_COLORS: [Color; 32] = [
    Color::new(1.0  , 0.0  , 0.0  , 1.0  ), //RED
    Color::new(0.0  , 0.0  , 1.0  , 1.0  ), //BLUE
    Color::new(1.0  , 1.0  , 0.0  , 1.0  ), //YELLOW
    Color::new(0.0  , 0.5  , 0.0  , 1.0  ), //GREEN
    Color::new(0.627, 0.125, 0.941, 1.0  ), //PURPLE
    Color::new(1.0  , 0.647, 0.0  , 1.0  ), //ORANGE
    Color::new(0.0  , 1.0  , 1.0  , 1.0  ), //CYAN
    Color::new(1.0  , 0.0  , 1.0  , 1.0  ), //MAGENTA
    Color::new(0.0  , 1.0  , 0.0  , 1.0  ), //LIME
    Color::new(1.0  , 0.752, 0.796, 1.0  ), //PINK
    Color::new(0.647, 0.164, 0.164, 1.0  ), //BROWN
    Color::new(0.0  , 0.0  , 0.5  , 1.0  ), //NAVY
    Color::new(0.250, 0.878, 0.815, 1.0  ), //TURQUOISE
    Color::new(0.5  , 0.5  , 0.0  , 1.0  ), //OLIVE
    Color::new(0.5  , 0.0  , 0.0  , 1.0  ), //MAROON
    Color::new(0.0  , 1.0  , 1.0  , 1.0  ), //AQUA
    Color::new(0.0  , 0.5  , 0.5  , 1.0  ), //TEAL
    Color::new(1.0  , 0.843, 0.0  , 1.0  ), //GOLD
    Color::new(0.75 , 0.75 , 0.75 , 1.0  ), //SILVER
    Color::new(1.0  , 0.498, 0.313, 1.0  ), //CORAL
    Color::new(0.933, 0.509, 0.933, 1.0  ), //VIOLET
    Color::new(0.596, 1.0  , 0.596, 1.0  ), //MINT
    Color::new(0.960, 0.960, 0.862, 1.0  ), //BEIGE
    Color::new(0.980, 0.501, 0.447, 1.0  ), //SALMON
    Color::new(0.956, 0.643, 0.376, 1.0  ), //SANDYBROWN
    Color::new(0.294, 0.0  , 0.509, 1.0  ), //INDIGO
    Color::new(0.862, 0.078, 0.235, 1.0  ), //CRIMSON
    Color::new(0.941, 0.901, 0.549, 1.0  ), //KHAKI
    Color::new(0.866, 0.627, 0.866, 1.0  ), //PLUM
    Color::new(0.823, 0.411, 0.117, 1.0  ), //CHOCOLATE
    Color::new(0.0  , 0.392, 0.0  , 1.0  ), //DARKGREEN
    Color::new(1.0  , 0.549, 0.0  , 1.0  ), //DARKORANGE
];

pub type Palette = HashMap<FluidColor, Color>;

/// Draw colors for the labels in `state`, handed out in label order. Pours
/// never change the set of labels, so every step of a solution gets the same
/// colors. Past the end of the palette the colors repeat.
pub fn fluid_palette(state: &PuzzleState) -> Palette {
    state
        .get_color_counts()
        .into_keys()
        .zip(FLUID_COLORS.iter().cycle().copied())
        .collect()
}

#[derive(Hash, PartialEq, Eq, Clone, Debug)]
struct TextCacheKey {
    text: String,
    w_px: u16,
    h_px: u16,
}
type TextMaxSize = (f32, f32, f32);

/// Font size and centering offsets that fit a text into a rect, cached per
/// rounded rect size.
pub struct CachedTextSizer {
    cache: Mutex<HashMap<TextCacheKey, TextMaxSize>>,
}

impl CachedTextSizer {
    pub fn new() -> Self {
        Self {
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn get_text_max_size(&self, text: &str, rect_width: f32, rect_height: f32) -> TextMaxSize {
        let key = TextCacheKey {
            text: text.to_string(),
            w_px: rect_width.round().clamp(0.0, u16::MAX as f32) as u16,
            h_px: rect_height.round().clamp(0.0, u16::MAX as f32) as u16,
        };
        if let Ok(cache) = self.cache.lock()
            && let Some(cached_size) = cache.get(&key)
        {
            return *cached_size;
        }

        let reference_size = 100u16;
        let dimensions = measure_text(text, None, reference_size, 1.0);
        let scale = (rect_width / dimensions.width).min(rect_height / dimensions.height);
        let optimal_size = reference_size as f32 * scale;
        let offset_x = (rect_width - dimensions.width * scale) / 2.0;
        let offset_y = (rect_height + dimensions.height * scale) / 2.0;
        let size = (optimal_size, offset_x, offset_y);

        if let Ok(mut cache) = self.cache.lock() {
            cache.insert(key, size);
        }
        size
    }
}

impl Default for CachedTextSizer {
    fn default() -> Self {
        Self::new()
    }
}

pub struct Renderer {
    cached_text_sizer: CachedTextSizer,
    x: f32,
    y: f32,
    width: f32,
    height: f32,
}

impl Renderer {
    pub fn new() -> Self {
        Self {
            cached_text_sizer: CachedTextSizer::new(),
            x: 0.0,
            y: 0.0,
            width: 800.0,
            height: 600.0,
        }
    }

    pub fn set_viewport(&mut self, x: f32, y: f32, width: f32, height: f32) -> bool {
        if self.x == x && self.y == y && self.width == width && self.height == height {
            return false;
        }
        self.x = x;
        self.y = y;
        self.width = width;
        self.height = height;
        true
    }

    pub fn autoset_viewport(&mut self) -> bool {
        let (screen_w, screen_h) = (screen_width(), screen_height());
        self.set_viewport(0.0, 0.0, screen_w, screen_h)
    }

    /// Draws one frame: a title line, the tubes of `state`, and a status line.
    pub fn render_step(&mut self, state: &PuzzleState, title: &str, status: &str) {
        clear_background(BLACK);
        let area_padding = 10.0;
        let header_height = self.height * 0.1;
        let footer_height = self.height * 0.08;
        let tube_area_height = self.height - header_height - footer_height - 2.0 * area_padding;

        self.render_text(
            title,
            Rect::new(self.x, self.y, self.width, header_height),
            WHITE,
        );
        self.render_tube_grid(
            state.get_tubes(),
            state.get_capacity(),
            &fluid_palette(state),
            6,
            Rect::new(
                self.x,
                self.y + header_height + area_padding,
                self.width,
                tube_area_height,
            ),
        );
        self.render_text(
            status,
            Rect::new(
                self.x,
                self.y + header_height + tube_area_height + 2.0 * area_padding,
                self.width,
                footer_height,
            ),
            GRAY,
        );
    }

    pub fn render_text(&self, text: &str, rect: Rect, color: Color) {
        if text.is_empty() {
            return;
        }
        let (optimal_size, x, y) = self
            .cached_text_sizer
            .get_text_max_size(text, rect.w, rect.h);
        draw_text(text, rect.x + x, rect.y + y, optimal_size, color);
    }

    pub fn render_unit(&self, unit: Option<&FluidColor>, palette: &Palette, rect: Rect) {
        match unit {
            None => {
                draw_rectangle_lines(rect.x, rect.y, rect.w, rect.h, 2.0, DARKGRAY);
            }
            Some(color) => {
                let fill = palette.get(color).copied().unwrap_or(GRAY);
                draw_rectangle(rect.x, rect.y, rect.w, rect.h, fill);
                draw_rectangle_lines(rect.x, rect.y, rect.w, rect.h, 2.0, BLACK);
                self.render_text(color.get_label(), rect, BLACK);
            }
        }
    }

    pub fn render_tube(
        &self,
        tube: &Tube,
        capacity: usize,
        palette: &Palette,
        tube_index: usize,
        rect: Rect,
    ) {
        let label_height = (rect.h * 0.15).min(30.0);
        let body = Rect::new(rect.x, rect.y, rect.w, rect.h - label_height);
        let unit_height = body.h / capacity.max(1) as f32;
        for slot in 0..capacity {
            let unit_y = body.y + body.h - (slot as f32 + 1.0) * unit_height;
            self.render_unit(
                tube.get_units().get(slot),
                palette,
                Rect::new(body.x, unit_y, body.w, unit_height),
            );
        }
        draw_rectangle_lines(body.x, body.y, body.w, body.h, 3.0, WHITE);
        self.render_text(
            &tube_index.to_string(),
            Rect::new(rect.x, body.y + body.h, rect.w, label_height),
            LIGHTGRAY,
        );
    }

    pub fn render_tube_lineup(
        &self,
        tubes: &[Tube],
        capacity: usize,
        palette: &Palette,
        start_index: usize,
        rect: Rect,
    ) {
        let tube_count = tubes.len() as f32;
        let spacing = 10.0;
        let total_spacing = spacing * (tube_count - 1.0);
        let tube_width = (rect.w - total_spacing) / tube_count;
        for (i, tube) in tubes.iter().enumerate() {
            let tube_x = rect.x + i as f32 * (tube_width + spacing);
            self.render_tube(
                tube,
                capacity,
                palette,
                start_index + i,
                Rect::new(tube_x, rect.y, tube_width, rect.h),
            );
        }
    }

    pub fn render_tube_grid(
        &self,
        tubes: &[Tube],
        capacity: usize,
        palette: &Palette,
        max_columns: usize,
        rect: Rect,
    ) {
        if tubes.is_empty() {
            return;
        }
        let rows = tubes.len().div_ceil(max_columns);
        let spacing = 10.0;
        let total_spacing_y = spacing * (rows as f32 - 1.0);
        let row_height = (rect.h - total_spacing_y) / rows as f32;

        for (row, row_tubes) in tubes.chunks(max_columns).enumerate() {
            let row_y = rect.y + row as f32 * (row_height + spacing);
            self.render_tube_lineup(
                row_tubes,
                capacity,
                palette,
                row * max_columns,
                Rect::new(rect.x, row_y, rect.w, row_height),
            );
        }
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}
