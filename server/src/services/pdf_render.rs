// foodgram_server/src/services/pdf_render.rs

//! Renders an aggregated shopping list as an A4 PDF document.

use crate::errors::AppError;
use foodgram::AggregatedLine;
use printpdf::lopdf::Document;
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference};
use tracing::{debug, error, instrument};

pub const DOCUMENT_FILENAME: &str = "shopping_cart.pdf";
pub const HEADING: &str = "Shopping list";

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 20.0;
const LINE_SPACING_MM: f32 = 10.0;
const HEADING_SIZE: f32 = 16.0;
const TEXT_SIZE: f32 = 12.0;
const LAYER: &str = "Layer 1";
// printpdf writes built-in font text in this encoding and drops what it cannot map.
const BUILTIN_ENCODING: &str = "WinAnsiEncoding";

fn builtin_font_can_render(text: &str) -> bool {
  Document::encode_text(Some(BUILTIN_ENCODING), text).len() == text.encode_utf16().count()
}

/// Without an external font every label must be WinAnsi text.
fn check_builtin_coverage(lines: &[AggregatedLine]) -> Result<(), AppError> {
  match lines.iter().find(|l| !builtin_font_can_render(&l.label)) {
    None => Ok(()),
    Some(line) => {
      error!(label = %line.label, "Shopping list label cannot be rendered with the built-in PDF font.");
      Err(AppError::Internal(format!(
        "Label '{}' needs a Unicode font; set PDF_FONT_PATH to a TTF file.",
        line.label
      )))
    }
  }
}

fn load_font(doc: &PdfDocumentReference, font: Option<&[u8]>) -> Result<IndirectFontRef, AppError> {
  let loaded = match font {
    Some(bytes) => doc.add_external_font(bytes),
    None => doc.add_builtin_font(BuiltinFont::Helvetica),
  };
  loaded.map_err(|e| {
    error!(error = %e, "Failed to load PDF font.");
    AppError::Internal(format!("PDF font could not be loaded: {}", e))
  })
}

/// One text line per aggregated line, in order, under a heading. A new page
/// starts whenever the cursor would pass the bottom margin.
#[instrument(name = "pdf_render::render_shopping_list", skip_all, fields(line_count = lines.len()), err(Display))]
pub fn render_shopping_list(lines: &[AggregatedLine], font: Option<&[u8]>) -> Result<Vec<u8>, AppError> {
  if font.is_none() {
    check_builtin_coverage(lines)?;
  }
  let (doc, first_page, first_layer) =
    PdfDocument::new(HEADING, Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), LAYER);
  let font = load_font(&doc, font)?;

  let top = PAGE_HEIGHT_MM - MARGIN_MM;
  let mut layer = doc.get_page(first_page).get_layer(first_layer);
  layer.use_text(HEADING, HEADING_SIZE, Mm(MARGIN_MM), Mm(top), &font);

  let mut y = top - LINE_SPACING_MM;
  let mut pages = 1usize;
  for line in lines {
    if y < MARGIN_MM {
      let (page, page_layer) = doc.add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), LAYER);
      layer = doc.get_page(page).get_layer(page_layer);
      y = top;
      pages += 1;
    }
    layer.use_text(line.display_line(), TEXT_SIZE, Mm(MARGIN_MM), Mm(y), &font);
    y -= LINE_SPACING_MM;
  }

  let bytes = doc.save_to_bytes().map_err(|e| {
    error!(error = %e, "Failed to serialize PDF document.");
    AppError::Internal(format!("PDF document could not be written: {}", e))
  })?;
  debug!(pages, byte_len = bytes.len(), "Shopping list document rendered.");
  Ok(bytes)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn line(label: &str, total_amount: i64) -> AggregatedLine {
    AggregatedLine {
      label: label.to_string(),
      total_amount,
    }
  }

  #[test]
  fn empty_list_still_renders_a_document() {
    let bytes = render_shopping_list(&[], None).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
  }

  #[test]
  fn long_lists_span_several_pages() {
    let lines: Vec<_> = (0..80).map(|i| line(&format!("Item {i} (g)"), i)).collect();
    let short = render_shopping_list(&lines[..2], None).unwrap();
    let long = render_shopping_list(&lines, None).unwrap();
    assert!(long.starts_with(b"%PDF"));
    assert!(long.len() > short.len());
  }

  #[test]
  fn latin_labels_fit_the_builtin_font() {
    assert!(builtin_font_can_render("Flour (g)"));
    assert!(builtin_font_can_render("Crème fraîche (ml)"));
    assert!(!builtin_font_can_render("Мука (г)"));
  }

  #[test]
  fn cyrillic_label_without_a_font_is_an_error() {
    let lines = vec![line("Flour (g)", 100), line("Мука (г)", 300)];
    match render_shopping_list(&lines, None) {
      Err(AppError::Internal(msg)) => assert!(msg.contains("Мука (г)")),
      other => panic!("expected an Internal error, got {:?}", other.map(|b| b.len())),
    }
  }
}
