//! Document exporters. Implement `DocumentExporter`.

pub mod pdf_exporter;

pub use pdf_exporter::PdfExporter;
