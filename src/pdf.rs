use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use image::GenericImageView;
use printpdf::{
    BuiltinFont, Image, ImageTransform, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference,
};

const PAGE_W: f32 = 210.0;
const PAGE_H: f32 = 297.0;
const MARGIN: f32 = 18.0;
const PT_TO_MM: f32 = 0.3528;
const BODY_PT: f32 = 10.0;

/// Top-to-bottom flowing A4 document. Text is ASCII-only (builtin fonts).
pub struct PdfReport {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    /// Distance of the next baseline slot from the page bottom, in mm.
    cursor: f32,
    pages: usize,
}

impl PdfReport {
    pub fn new(title: &str) -> Result<Self> {
        let (doc, page, layer) = PdfDocument::new(title, Mm(PAGE_W), Mm(PAGE_H), "Layer 1");
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|err| anyhow!("load Helvetica: {err:?}"))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|err| anyhow!("load Helvetica-Bold: {err:?}"))?;
        let layer = doc.get_page(page).get_layer(layer);
        Ok(Self {
            doc,
            layer,
            regular,
            bold,
            cursor: PAGE_H - MARGIN,
            pages: 1,
        })
    }

    pub fn pages(&self) -> usize {
        self.pages
    }

    pub fn page_break(&mut self) {
        self.pages += 1;
        let (page, layer) = self.doc.add_page(
            Mm(PAGE_W),
            Mm(PAGE_H),
            format!("Layer {}", self.pages),
        );
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.cursor = PAGE_H - MARGIN;
    }

    pub fn spacer(&mut self, mm: f32) {
        self.cursor -= mm;
    }

    pub fn title(&mut self, text: &str) {
        self.line(text, 24.0, true, MARGIN);
        self.spacer(4.0);
    }

    pub fn heading(&mut self, text: &str) {
        self.spacer(3.0);
        self.line(text, 16.0, true, MARGIN);
        self.spacer(2.0);
    }

    pub fn subheading(&mut self, text: &str) {
        self.spacer(1.5);
        self.line(text, 12.5, true, MARGIN);
        self.spacer(1.0);
    }

    pub fn paragraph(&mut self, text: &str) {
        let max_chars = chars_per_line(PAGE_W - 2.0 * MARGIN, BODY_PT);
        for raw in text.lines() {
            if raw.trim().is_empty() {
                self.spacer(line_height(BODY_PT) / 2.0);
                continue;
            }
            for line in wrap_text(raw, max_chars) {
                self.line(&line, BODY_PT, false, MARGIN);
            }
        }
        self.spacer(2.0);
    }

    pub fn bullets<S: AsRef<str>>(&mut self, items: &[S]) {
        let max_chars = chars_per_line(PAGE_W - 2.0 * MARGIN - 5.0, BODY_PT);
        for item in items {
            for (idx, line) in wrap_text(item.as_ref(), max_chars).into_iter().enumerate() {
                if idx == 0 {
                    self.ensure_space(line_height(BODY_PT));
                    let y = self.cursor - line_height(BODY_PT);
                    self.layer
                        .use_text("-", BODY_PT, Mm(MARGIN), Mm(y), &self.regular);
                }
                self.line(&line, BODY_PT, false, MARGIN + 5.0);
            }
        }
        self.spacer(2.0);
    }

    /// Column widths in mm; cells are clipped to fit their column.
    pub fn table(&mut self, headers: &[&str], rows: &[Vec<String>], widths: &[f32]) {
        let header: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
        self.table_row(&header, widths, true);
        for row in rows {
            self.table_row(row, widths, false);
        }
        self.spacer(3.0);
    }

    fn table_row(&mut self, cells: &[String], widths: &[f32], bold: bool) {
        let size = 9.0;
        let h = line_height(size);
        self.ensure_space(h);
        let y = self.cursor - h;
        let mut x = MARGIN;
        for (cell, width) in cells.iter().zip(widths) {
            let text = clip(cell, chars_per_line(*width - 2.0, size));
            let font = if bold { &self.bold } else { &self.regular };
            self.layer.use_text(text, size, Mm(x), Mm(y), font);
            x += width;
        }
        self.cursor = y;
    }

    /// Embeds a PNG scaled to `width_mm`.
    pub fn image(&mut self, path: &Path, width_mm: f32) -> Result<()> {
        let img = image::open(path).with_context(|| format!("read image {}", path.display()))?;
        let (px_w, px_h) = img.dimensions();
        if px_w == 0 || px_h == 0 {
            return Err(anyhow!("empty image {}", path.display()));
        }
        let dpi = px_w as f32 * 25.4 / width_mm;
        let height_mm = px_h as f32 * 25.4 / dpi;
        self.ensure_space(height_mm);
        let y = self.cursor - height_mm;
        Image::from_dynamic_image(&img).add_to_layer(
            self.layer.clone(),
            ImageTransform {
                translate_x: Some(Mm(MARGIN)),
                translate_y: Some(Mm(y)),
                dpi: Some(dpi),
                ..Default::default()
            },
        );
        self.cursor = y - 3.0;
        Ok(())
    }

    pub fn save(self, path: &Path) -> Result<()> {
        let file =
            File::create(path).with_context(|| format!("create pdf {}", path.display()))?;
        self.doc
            .save(&mut BufWriter::new(file))
            .map_err(|err| anyhow!("write pdf {}: {err:?}", path.display()))
    }

    fn line(&mut self, text: &str, size: f32, bold: bool, x: f32) {
        let h = line_height(size);
        self.ensure_space(h);
        let y = self.cursor - h;
        let font = if bold { &self.bold } else { &self.regular };
        self.layer.use_text(ascii(text), size, Mm(x), Mm(y), font);
        self.cursor = y;
    }

    fn ensure_space(&mut self, needed: f32) {
        if self.cursor - needed < MARGIN {
            self.page_break();
        }
    }
}

fn line_height(size_pt: f32) -> f32 {
    size_pt * PT_TO_MM * 1.4
}

/// Rough Helvetica capacity: average glyph is about half an em wide.
fn chars_per_line(width_mm: f32, size_pt: f32) -> usize {
    ((width_mm / (size_pt * PT_TO_MM * 0.5)) as usize).max(1)
}

fn ascii(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_ascii() { c } else { '?' })
        .collect()
}

fn clip(text: &str, max_chars: usize) -> String {
    let text = ascii(text);
    if text.chars().count() <= max_chars {
        return text;
    }
    let keep = max_chars.saturating_sub(2);
    let mut out: String = text.chars().take(keep).collect();
    out.push_str("..");
    out
}

pub fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let needed = if current.is_empty() {
            word.len()
        } else {
            current.len() + 1 + word.len()
        };
        if needed > max_chars && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::{clip, wrap_text};

    #[test]
    fn wrap_respects_width() {
        let lines = wrap_text("alpha beta gamma delta epsilon", 11);
        assert_eq!(lines, vec!["alpha beta", "gamma delta", "epsilon"]);
        assert!(wrap_text("   ", 10).is_empty());
    }

    #[test]
    fn long_words_stay_whole() {
        let lines = wrap_text("Rajiv Gandhi International Stadium", 5);
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[2], "International");
    }

    #[test]
    fn clip_marks_truncation() {
        assert_eq!(clip("Wankhede Stadium", 8), "Wankhe..");
        assert_eq!(clip("Eden", 8), "Eden");
    }
}
