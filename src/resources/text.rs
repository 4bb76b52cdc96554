//! Label text, shaped and rasterised with cosmic-text.
//!
//! The face is embedded so labels look the same in every browser and on
//! every desktop, with no system font lookup. Glyph coverage is collected
//! into a canvas mask, so the canvas shadow glows around the letters.

use cosmic_text::{Attrs, Buffer, Family, FontSystem, Metrics, Shaping, SwashCache, Weight, fontdb};

use crate::resources::canvas::{Canvas, Paint};

const LABEL_FONT: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans-Bold.ttf");
const LABEL_FAMILY: &str = "DejaVu Sans";

/// A font system that knows only the embedded label face.
fn font_system() -> FontSystem {
    let mut db = fontdb::Database::new();
    db.load_font_data(LABEL_FONT.to_vec());
    FontSystem::new_with_locale_and_db("en-US".to_string(), db)
}

fn label_attrs() -> Attrs<'static> {
    Attrs::new().family(Family::Name(LABEL_FAMILY)).weight(Weight::BOLD)
}

/// One line of shaped text.
struct Line {
    buffer: Buffer,
    width: f32,
    /// Vertical centre of the line box, from the top of the buffer.
    middle: f32,
}

fn shape_line(font_system: &mut FontSystem, text: &str, font_size: f32) -> Line {
    let mut buffer = Buffer::new(font_system, Metrics::new(font_size, font_size * 1.2));
    buffer.set_size(font_system, None, None);
    buffer.set_text(font_system, text, &label_attrs(), Shaping::Advanced, None);
    buffer.shape_until_scroll(font_system, false);

    let (width, middle) = buffer
        .layout_runs()
        .fold((0.0f32, None), |(width, middle), run| {
            (width.max(run.line_w), middle.or(Some(run.line_top + run.line_height / 2.0)))
        });
    Line {
        buffer,
        width,
        middle: middle.unwrap_or(0.0),
    }
}

/// Fill `text` centred on `centre`, shrinking it to `max_width` when it is
/// wider. Newlines are not interpreted; labels are single words.
pub fn fill_text(canvas: &mut Canvas, text: &str, centre: (f32, f32), font_size: f32, max_width: f32, paint: &Paint) {
    let text = text.replace(['\n', '\r'], " ");
    if text.trim().is_empty() || font_size <= 0.0 {
        return;
    }

    let mut font_system = font_system();
    let mut line = shape_line(&mut font_system, &text, font_size);
    if line.width > max_width && max_width > 0.0 {
        line = shape_line(&mut font_system, &text, font_size * max_width / line.width);
    }

    let (width, height) = (canvas.width() as i32, canvas.height() as i32);
    let dx = (centre.0 - line.width / 2.0).round() as i32;
    let dy = (centre.1 - line.middle).round() as i32;
    let mut mask = vec![0.0f32; (width * height) as usize];
    let mut cache = SwashCache::new();
    line.buffer.draw(
        &mut font_system,
        &mut cache,
        cosmic_text::Color::rgb(0xFF, 0xFF, 0xFF),
        |x, y, w, h, color| {
            let coverage = color.a() as f32 / 255.0;
            for py in (y + dy).max(0)..(y + dy + h as i32).min(height) {
                for px in (x + dx).max(0)..(x + dx + w as i32).min(width) {
                    let i = (py * width + px) as usize;
                    mask[i] = mask[i].max(coverage);
                }
            }
        },
    );
    canvas.fill_mask(mask, paint);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_structures::color::Color;

    fn measure(text: &str, font_size: f32) -> f32 {
        shape_line(&mut font_system(), text, font_size).width
    }

    fn inked(canvas: &Canvas) -> Vec<(u32, u32)> {
        let mut ink = Vec::new();
        for y in 0..canvas.height() {
            for x in 0..canvas.width() {
                if canvas.pixel(x, y).a > 0.5 {
                    ink.push((x, y));
                }
            }
        }
        ink
    }

    fn render(text: &str, max_width: f32) -> Canvas {
        let mut canvas = Canvas::new(256, 256);
        fill_text(&mut canvas, text, (128.0, 128.0), 70.0, max_width, &Paint::Solid(Color::WHITE));
        canvas
    }

    #[test]
    fn lower_case_differs_from_upper_case() {
        let mixed = inked(&render("Azure", 240.0));
        let upper = inked(&render("AZURE", 240.0));
        assert!(!mixed.is_empty());
        assert_ne!(mixed, upper);
        assert!(measure("Azure", 70.0) < measure("AZURE", 70.0));
    }

    #[test]
    fn text_is_centred() {
        let ink = inked(&render("Gemini", 240.0));
        let (min_x, max_x) = ink.iter().fold((u32::MAX, 0), |(lo, hi), &(x, _)| (lo.min(x), hi.max(x)));
        let (min_y, max_y) = ink.iter().fold((u32::MAX, 0), |(lo, hi), &(_, y)| (lo.min(y), hi.max(y)));
        assert!(((min_x + max_x) as i32 / 2 - 128).abs() <= 6);
        assert!(((min_y + max_y) as i32 / 2 - 128).abs() <= 16);
    }

    #[test]
    fn wide_text_shrinks_to_fit() {
        let ink = inked(&render("Kubernetes Platform", 200.0));
        let (min_x, max_x) = ink.iter().fold((u32::MAX, 0), |(lo, hi), &(x, _)| (lo.min(x), hi.max(x)));
        assert!(max_x - min_x <= 210);
        assert!(min_x >= 16);
    }

    #[test]
    fn blank_text_leaves_the_canvas_untouched() {
        assert!(inked(&render("   ", 240.0)).is_empty());
    }
}
