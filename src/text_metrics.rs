use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Mutex;
use ttf_parser::Face;

static FONT_CACHE: Lazy<Mutex<FontCache>> = Lazy::new(|| Mutex::new(FontCache::new()));

/// Text measurement strategy. `None` means "cannot measure here"; callers
/// fall back to [`FixedWidthMetrics`].
pub trait TextMeasure {
    fn measure(&self, text: &str, font_size: f32) -> Option<f32>;
}

/// Fixed advance per character. Always available, fully deterministic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedWidthMetrics {
    pub advance_ratio: f32,
}

impl FixedWidthMetrics {
    pub fn new(advance_ratio: f32) -> Self {
        Self { advance_ratio }
    }

    pub fn width(&self, text: &str, font_size: f32) -> f32 {
        let count = text.chars().filter(|ch| *ch != '\n').count();
        count as f32 * font_size * self.advance_ratio
    }
}

impl Default for FixedWidthMetrics {
    fn default() -> Self {
        Self::new(0.6)
    }
}

impl TextMeasure for FixedWidthMetrics {
    fn measure(&self, text: &str, font_size: f32) -> Option<f32> {
        Some(self.width(text, font_size))
    }
}

/// Glyph advances from the first installed font matching a CSS-style family
/// list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontMetrics {
    family: String,
}

impl FontMetrics {
    pub fn new(family: impl Into<String>) -> Self {
        Self {
            family: family.into(),
        }
    }
}

impl TextMeasure for FontMetrics {
    fn measure(&self, text: &str, font_size: f32) -> Option<f32> {
        if text.is_empty() || font_size <= 0.0 {
            return Some(0.0);
        }
        let mut guard = FONT_CACHE.lock().ok()?;
        guard.measure(text, font_size, &self.family)
    }
}

struct FontCache {
    db: Database,
    loaded_system_fonts: bool,
    faces: HashMap<String, Option<LoadedFace>>,
}

impl FontCache {
    fn new() -> Self {
        Self {
            db: Database::new(),
            loaded_system_fonts: false,
            faces: HashMap::new(),
        }
    }

    fn measure(&mut self, text: &str, font_size: f32, family: &str) -> Option<f32> {
        let key = family.trim().to_string();
        if !self.faces.contains_key(&key) {
            let face = self.load_face(family);
            if face.is_none() {
                tracing::debug!(family, "no installed font matches, using fixed-width metrics");
            }
            self.faces.insert(key.clone(), face);
        }
        self.faces.get(&key)?.as_ref()?.width(text, font_size)
    }

    fn load_face(&mut self, family: &str) -> Option<LoadedFace> {
        let names: Vec<String> = family
            .split(',')
            .map(|part| part.trim().trim_matches('"').trim_matches('\'').to_string())
            .filter(|part| !part.is_empty())
            .collect();
        let mut families: Vec<Family<'_>> = names
            .iter()
            .map(|name| match name.to_ascii_lowercase().as_str() {
                "serif" => Family::Serif,
                "monospace" | "ui-monospace" => Family::Monospace,
                "sans-serif" | "system-ui" | "-apple-system" | "ui-sans-serif" => {
                    Family::SansSerif
                }
                _ => Family::Name(name.as_str()),
            })
            .collect();
        if families.is_empty() {
            families.push(Family::SansSerif);
        }

        if !self.loaded_system_fonts {
            self.db.load_system_fonts();
            self.loaded_system_fonts = true;
        }

        let query = Query {
            families: &families,
            weight: Weight::NORMAL,
            stretch: Stretch::Normal,
            style: Style::Normal,
        };
        let id = self.db.query(&query)?;
        self.db
            .with_face_data(id, |data, index| LoadedFace::parse(data.to_vec(), index))
            .flatten()
    }
}

/// Owned font bytes with a precomputed ASCII advance table. Non-ASCII text
/// re-parses the face on demand.
struct LoadedFace {
    data: Vec<u8>,
    index: u32,
    units_per_em: f32,
    ascii_advances: [u16; 128],
}

impl LoadedFace {
    fn parse(data: Vec<u8>, index: u32) -> Option<Self> {
        let (units_per_em, ascii_advances) = {
            let face = Face::parse(&data, index).ok()?;
            let mut advances = [0u16; 128];
            for byte in 0u8..=127 {
                if let Some(glyph) = face.glyph_index(byte as char) {
                    advances[byte as usize] = face.glyph_hor_advance(glyph).unwrap_or(0);
                }
            }
            (face.units_per_em().max(1) as f32, advances)
        };
        Some(Self {
            data,
            index,
            units_per_em,
            ascii_advances,
        })
    }

    fn width(&self, text: &str, font_size: f32) -> Option<f32> {
        let scale = font_size / self.units_per_em;
        let missing = font_size * 0.56;
        if text.is_ascii() {
            let width = text
                .bytes()
                .filter(|byte| *byte != b'\n')
                .map(|byte| match self.ascii_advances[byte as usize] {
                    0 => missing,
                    advance => advance as f32 * scale,
                })
                .sum::<f32>();
            return Some(width);
        }
        let face = Face::parse(&self.data, self.index).ok()?;
        let width = text
            .chars()
            .filter(|ch| *ch != '\n')
            .map(|ch| {
                face.glyph_index(ch)
                    .and_then(|glyph| face.glyph_hor_advance(glyph))
                    .map(|advance| advance as f32 * scale)
                    .unwrap_or(missing)
            })
            .sum::<f32>();
        Some(width)
    }
}

/// Measures with `measurer`, falling back to `fallback` when it cannot.
pub fn measure_or_fallback(
    measurer: &dyn TextMeasure,
    fallback: &FixedWidthMetrics,
    text: &str,
    font_size: f32,
) -> f32 {
    measurer
        .measure(text, font_size)
        .filter(|width| width.is_finite() && *width >= 0.0)
        .unwrap_or_else(|| fallback.width(text, font_size))
}
