//! PDF exporter. Implements `DocumentExporter` with printpdf builtin fonts.
//!
//! One PDF page per document page; the document is already paginated, so this adapter
//! only lays out what it is given. Layout is expressed in CSS pixels (96 dpi) from the
//! top-left corner and converted to PDF millimetres from the bottom-left.

use crate::domain::format::{export_file_name, format_date, format_item_price, format_total};
use crate::domain::{
    CompanyProfile, DomainError, ExportedFile, Page, PageLayout, PageSize, QuotationDocument,
};
use crate::ports::DocumentExporter;
use printpdf::{BuiltinFont, IndirectFontRef, Line, Mm, PdfDocument, PdfLayerReference, Point};
use std::io::BufWriter;
use tracing::info;

/// Characters per description line before wrapping.
const DESCRIPTION_WRAP: usize = 70;
/// Description lines shown per item.
const DESCRIPTION_MAX_LINES: usize = 3;
/// Vertical space reserved for one item row.
const ROW_HEIGHT_PX: f32 = 84.0;
/// First baseline, measured from the top margin.
const TOP_OFFSET_PX: f32 = 30.0;
/// Title, number, date and client block on the cover page.
const COVER_HEADER_PX: f32 = 166.0;
/// DESCRIPTION/SUBTOTAL header and its rule.
const TABLE_HEADER_PX: f32 = 32.0;
/// Subtotal and TOTAL rows under the last item.
const TOTALS_PX: f32 = 40.0;
/// Footer height above the bottom margin, excluding contact lines.
const FOOTER_BASE_PX: f32 = 40.0;
const FOOTER_LINE_PX: f32 = 14.0;
/// Clearance kept between the last body line and the footer.
const FOOTER_GAP_PX: f32 = 12.0;
/// Width of the SUBTOTAL column, measured from the right content edge.
const AMOUNT_COLUMN_PX: f32 = 170.0;

/// Item rows that fit between the page header and the footer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowCapacity {
    pub cover: usize,
    pub later: usize,
}

pub struct PdfExporter {
    company: CompanyProfile,
}

impl PdfExporter {
    pub fn new(company: CompanyProfile) -> Self {
        Self { company }
    }

    /// Rows per page for `size`, reserving room for the totals block on every page
    /// since any page may be the last one.
    pub fn row_capacity(&self, size: &PageSize) -> Result<RowCapacity, DomainError> {
        let valid = size.width_px.is_finite()
            && size.height_px.is_finite()
            && size.margin_px.is_finite()
            && size.margin_px >= 0.0
            && size.content_width_px() > 0.0
            && size.content_height_px() > 0.0;
        if !valid {
            return Err(DomainError::Export(format!(
                "invalid page size {}x{} px with margin {} px",
                size.width_px, size.height_px, size.margin_px
            )));
        }

        let contact_lines = self.company.contact_lines().len() as f32;
        let footer = FOOTER_BASE_PX + FOOTER_LINE_PX * contact_lines + FOOTER_GAP_PX;
        let body = size.content_height_px() - TOP_OFFSET_PX - footer - TABLE_HEADER_PX - TOTALS_PX;
        let rows = |space: f32| {
            if space <= 0.0 {
                0
            } else {
                (space / ROW_HEIGHT_PX).floor() as usize
            }
        };
        Ok(RowCapacity {
            cover: rows(body - COVER_HEADER_PX),
            later: rows(body),
        })
    }

    /// Fails when `layout` puts more items on a page than `size` can hold.
    pub fn check_layout(&self, layout: &PageLayout, size: &PageSize) -> Result<(), DomainError> {
        let capacity = self.row_capacity(size)?;
        if layout.first_page_capacity() > capacity.cover
            || layout.later_page_capacity() > capacity.later
        {
            return Err(DomainError::Export(format!(
                "page layout of {} cover / {} continuation items does not fit a {}x{} px page \
                 (at most {} / {})",
                layout.first_page_capacity(),
                layout.later_page_capacity(),
                size.width_px,
                size.height_px,
                capacity.cover,
                capacity.later
            )));
        }
        Ok(())
    }

    fn check_pages(
        &self,
        document: &QuotationDocument,
        size: &PageSize,
    ) -> Result<(), DomainError> {
        let capacity = self.row_capacity(size)?;
        for page in document.pages() {
            let limit = if page.index == 1 {
                capacity.cover
            } else {
                capacity.later
            };
            if page.items.len() > limit {
                return Err(DomainError::Export(format!(
                    "page {} has {} items, at most {} fit",
                    page.index,
                    page.items.len(),
                    limit
                )));
            }
        }
        Ok(())
    }

    fn render(&self, document: &QuotationDocument, size: &PageSize) -> Result<Vec<u8>, String> {
        let width = px_to_mm(size.width_px);
        let height = px_to_mm(size.height_px);
        let title = format!("Quotation {}", document.header().number);

        let (doc, first_page, first_layer) =
            PdfDocument::new(title.as_str(), width, height, "Layer 1");
        let fonts = Fonts {
            regular: doc
                .add_builtin_font(BuiltinFont::Helvetica)
                .map_err(|e| e.to_string())?,
            bold: doc
                .add_builtin_font(BuiltinFont::HelveticaBold)
                .map_err(|e| e.to_string())?,
        };

        let page_count = document.pages().len();
        for page in document.pages() {
            let layer = if page.index == 1 {
                doc.get_page(first_page).get_layer(first_layer)
            } else {
                let (p, l) = doc.add_page(width, height, "Layer 1");
                doc.get_page(p).get_layer(l)
            };
            let canvas = Canvas {
                layer,
                fonts: &fonts,
                size: *size,
            };
            self.render_page(&canvas, document, page, page_count);
        }

        let mut writer = BufWriter::new(Vec::<u8>::new());
        doc.save(&mut writer).map_err(|e| e.to_string())?;
        writer.into_inner().map_err(|e| e.to_string())
    }

    fn render_page(
        &self,
        canvas: &Canvas<'_>,
        document: &QuotationDocument,
        page: &Page,
        page_count: usize,
    ) {
        let margin = canvas.size.margin_px;
        let mut y = margin + TOP_OFFSET_PX;

        if page.index == 1 {
            let header = document.header();
            canvas.text("Quotation", 26.0, margin, y, true);
            canvas.text(&format!("Quotation #{}", header.number), 12.0, margin, y + 34.0, true);
            canvas.text(
                &format!("Quotation Date  {}", format_date(header.date)),
                12.0,
                margin,
                y + 56.0,
                true,
            );
            canvas.text("QUOTATION TO", 13.0, margin, y + 100.0, true);
            canvas.text(document.client_name(), 15.0, margin, y + 122.0, false);
            y += COVER_HEADER_PX;
        }

        let right = canvas.size.width_px - margin;
        canvas.text("DESCRIPTION", 11.0, margin + 12.0, y, true);
        canvas.text("SUBTOTAL", 11.0, right - AMOUNT_COLUMN_PX, y, true);
        canvas.rule(margin, right, y + 8.0);
        y += TABLE_HEADER_PX;

        for item in &page.items {
            canvas.text(&item.title, 11.0, margin + 12.0, y, true);
            canvas.text(&format_item_price(item), 11.0, right - AMOUNT_COLUMN_PX, y, false);
            let mut line_y = y + 16.0;
            for line in wrap(&item.description, DESCRIPTION_WRAP, DESCRIPTION_MAX_LINES) {
                canvas.text(&line, 9.0, margin + 12.0, line_y, false);
                line_y += 13.0;
            }
            y += ROW_HEIGHT_PX;
        }

        if page.index == page_count {
            y += 12.0;
            let label_x = right - AMOUNT_COLUMN_PX - 90.0;
            canvas.text("Subtotal", 11.0, label_x, y, false);
            canvas.text(
                &format_total(document.subtotal(), document.unit_label()),
                11.0,
                right - AMOUNT_COLUMN_PX,
                y,
                false,
            );
            y += 28.0;
            canvas.text("TOTAL", 12.0, label_x, y, true);
            canvas.text(
                &format_total(document.total(), &document.unit_label().to_uppercase()),
                12.0,
                right - AMOUNT_COLUMN_PX,
                y,
                true,
            );
        }

        self.render_footer(canvas, page.index, page_count);
    }

    fn render_footer(&self, canvas: &Canvas<'_>, index: usize, page_count: usize) {
        let margin = canvas.size.margin_px;
        let bottom = canvas.size.height_px - margin;
        let contact = self.company.contact_lines();

        let mut y = bottom - FOOTER_BASE_PX - FOOTER_LINE_PX * contact.len() as f32;
        for line in &contact {
            canvas.text(line, 9.0, margin, y, false);
            y += FOOTER_LINE_PX;
        }
        if !self.company.terms.is_empty() {
            y += 8.0;
            canvas.text("TERMS AND CONDITIONS", 9.0, margin, y, true);
            y += FOOTER_LINE_PX;
            canvas.text(&self.company.terms, 9.0, margin, y, false);
        }

        canvas.text(
            &format!("Page {} of {}", index, page_count),
            9.0,
            canvas.size.width_px - margin - 70.0,
            bottom,
            false,
        );
    }
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

/// One PDF layer plus the geometry needed to place text in pixel coordinates.
struct Canvas<'a> {
    layer: PdfLayerReference,
    fonts: &'a Fonts,
    size: PageSize,
}

impl Canvas<'_> {
    /// Place text with its baseline `top_px` pixels below the top edge.
    fn text(&self, text: &str, font_size: f32, left_px: f32, top_px: f32, bold: bool) {
        let font = if bold { &self.fonts.bold } else { &self.fonts.regular };
        self.layer.use_text(
            text,
            font_size,
            px_to_mm(left_px),
            px_to_mm(self.size.height_px - top_px),
            font,
        );
    }

    fn rule(&self, from_px: f32, to_px: f32, top_px: f32) {
        let y = px_to_mm(self.size.height_px - top_px);
        self.layer.add_line(Line {
            points: vec![
                (Point::new(px_to_mm(from_px), y), false),
                (Point::new(px_to_mm(to_px), y), false),
            ],
            is_closed: false,
        });
    }
}

fn px_to_mm(px: f32) -> Mm {
    Mm(px * 25.4 / 96.0)
}

/// Greedy word wrap. Overlong words are kept whole; extra lines are dropped with an ellipsis.
fn wrap(text: &str, width: usize, max_lines: usize) -> Vec<String> {
    let mut lines: Vec<String> = Vec::new();
    for paragraph in text.lines() {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            if !current.is_empty() && current.chars().count() + 1 + word.chars().count() > width {
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
    }

    if lines.len() > max_lines {
        lines.truncate(max_lines);
        if let Some(last) = lines.last_mut() {
            last.push_str(" ...");
        }
    }
    lines
}

#[async_trait::async_trait]
impl DocumentExporter for PdfExporter {
    async fn export(
        &self,
        document: &QuotationDocument,
        page_size: &PageSize,
    ) -> Result<ExportedFile, DomainError> {
        self.check_pages(document, page_size)?;
        let bytes = self
            .render(document, page_size)
            .map_err(DomainError::Export)?;
        let file_name = export_file_name(&document.header().number, "pdf");
        info!(
            file = %file_name,
            pages = document.pages().len(),
            bytes = bytes.len(),
            "rendered quotation PDF"
        );
        Ok(ExportedFile { file_name, bytes })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ClientSelection, LineItem, QuotationHeader, assemble};
    use chrono::NaiveDate;

    fn document_with(item_count: usize, first: usize, later: usize) -> QuotationDocument {
        let date = NaiveDate::from_ymd_opt(2024, 8, 1).unwrap();
        let header = QuotationHeader::new("KIT-0099", date).with_client(ClientSelection::Manual {
            name: "Lakeside Cafe".to_string(),
        });
        let items: Vec<LineItem> = (0..item_count)
            .map(|i| {
                LineItem::new(format!("Service {}", i), 1500.0).with_description(
                    "Design, build and deploy a responsive landing page with contact form",
                )
            })
            .collect();
        assemble(&header, &items, first, later).unwrap()
    }

    fn document(item_count: usize) -> QuotationDocument {
        document_with(item_count, 3, 5)
    }

    fn full_company() -> CompanyProfile {
        CompanyProfile {
            name: "Kathmandu IT".to_string(),
            website: "www.example.com".to_string(),
            email: "hello@example.com".to_string(),
            phone: "+977 1 5550000".to_string(),
            address: "Lalitpur, Nepal".to_string(),
            ..CompanyProfile::default()
        }
    }

    #[test]
    fn a4_fits_default_layout_with_full_footer() {
        let exporter = PdfExporter::new(full_company());
        assert_eq!(
            exporter.row_capacity(&PageSize::A4).unwrap(),
            RowCapacity { cover: 7, later: 9 }
        );
        assert!(
            exporter
                .check_layout(&PageLayout::default(), &PageSize::A4)
                .is_ok()
        );
    }

    #[test]
    fn oversized_layout_is_rejected() {
        let exporter = PdfExporter::new(full_company());
        let layout = PageLayout::new(12, 5).unwrap();
        assert!(matches!(
            exporter.check_layout(&layout, &PageSize::A4),
            Err(DomainError::Export(_))
        ));

        let short = PageSize {
            height_px: 400.0,
            ..PageSize::A4
        };
        assert!(
            exporter
                .check_layout(&PageLayout::default(), &short)
                .is_err()
        );
    }

    #[test]
    fn non_positive_page_size_is_rejected() {
        let exporter = PdfExporter::new(CompanyProfile::default());
        for size in [
            PageSize {
                width_px: 0.0,
                ..PageSize::A4
            },
            PageSize {
                height_px: -10.0,
                ..PageSize::A4
            },
            PageSize {
                margin_px: 600.0,
                ..PageSize::A4
            },
        ] {
            assert!(matches!(
                exporter.row_capacity(&size),
                Err(DomainError::Export(_))
            ));
        }
    }

    #[tokio::test]
    async fn export_refuses_pages_that_overflow() {
        let exporter = PdfExporter::new(full_company());
        let err = exporter
            .export(&document_with(12, 12, 5), &PageSize::A4)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Export(msg) if msg.contains("page 1 has 12 items")));
    }

    #[tokio::test]
    async fn exports_pdf_named_after_quotation_number() {
        let exporter = PdfExporter::new(CompanyProfile::default());
        let file = exporter.export(&document(8), &PageSize::A4).await.unwrap();
        assert_eq!(file.file_name, "Quotation_KIT-0099.pdf");
        assert!(file.bytes.starts_with(b"%PDF"));
    }

    #[tokio::test]
    async fn exports_empty_quotation_as_single_cover_page() {
        let exporter = PdfExporter::new(CompanyProfile::default());
        let file = exporter.export(&document(0), &PageSize::A4).await.unwrap();
        assert!(!file.bytes.is_empty());
    }

    #[test]
    fn wrap_breaks_on_words_and_caps_lines() {
        let lines = wrap("alpha beta gamma delta", 11, 5);
        assert_eq!(lines, ["alpha beta", "gamma delta"]);

        let capped = wrap("one\ntwo\nthree\nfour", 10, 2);
        assert_eq!(capped, ["one", "two ..."]);

        assert!(wrap("   ", 10, 3).is_empty());
    }

    #[test]
    fn a4_pixels_convert_to_a4_millimetres() {
        let Mm(w) = px_to_mm(794.0);
        let Mm(h) = px_to_mm(1123.0);
        assert!((w - 210.0).abs() < 0.2);
        assert!((h - 297.1).abs() < 0.2);
    }
}
