//! Export use case: render a snapshot through the exporter and write it to the output dir.
//!
//! The exporter only ever sees an owned, immutable snapshot, so a background export is
//! unaffected by edits made after it was started.

use crate::domain::{DomainError, PageSize, QuotationDocument};
use crate::ports::DocumentExporter;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::task::JoinHandle;
use tracing::{error, info};

pub struct ExportService {
    exporter: Arc<dyn DocumentExporter>,
    output_dir: PathBuf,
    page_size: PageSize,
}

impl ExportService {
    pub fn new(
        exporter: Arc<dyn DocumentExporter>,
        output_dir: impl AsRef<Path>,
        page_size: PageSize,
    ) -> Self {
        Self {
            exporter,
            output_dir: output_dir.as_ref().to_path_buf(),
            page_size,
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Render and write the artifact. Returns the written path.
    pub async fn export(&self, document: &QuotationDocument) -> Result<PathBuf, DomainError> {
        let file = self.exporter.export(document, &self.page_size).await?;

        fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|e| DomainError::Export(format!("Failed to create output dir: {}", e)))?;
        let path = self.output_dir.join(&file.file_name);
        fs::write(&path, &file.bytes).await.map_err(|e| {
            DomainError::Export(format!("Failed to write {}: {}", path.display(), e))
        })?;

        info!(
            path = %path.display(),
            number = %document.header().number,
            pages = document.pages().len(),
            "quotation exported"
        );
        Ok(path)
    }

    /// Fire-and-forget export on a background task. Failures are logged; the handle may
    /// be awaited for the result or dropped.
    pub fn spawn_export(
        self: &Arc<Self>,
        document: QuotationDocument,
    ) -> JoinHandle<Result<PathBuf, DomainError>> {
        let service = Arc::clone(self);
        tokio::spawn(async move {
            let result = service.export(&document).await;
            if let Err(e) = &result {
                error!(number = %document.header().number, error = %e, "background export failed");
            }
            result
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        ClientSelection, ExportedFile, LineItem, LineItemStore, QuotationHeader, assemble,
    };
    use chrono::NaiveDate;
    use std::sync::Mutex;

    /// Records what it was asked to render and emits the item titles as the artifact.
    #[derive(Default)]
    struct RecordingExporter {
        seen: Mutex<Vec<QuotationDocument>>,
    }

    #[async_trait::async_trait]
    impl DocumentExporter for RecordingExporter {
        async fn export(
            &self,
            document: &QuotationDocument,
            page_size: &PageSize,
        ) -> Result<ExportedFile, DomainError> {
            assert_eq!(*page_size, PageSize::A4);
            self.seen.lock().unwrap().push(document.clone());
            let titles: Vec<&str> = document
                .pages()
                .iter()
                .flat_map(|p| p.items.iter().map(|i| i.title.as_str()))
                .collect();
            Ok(ExportedFile {
                file_name: format!("{}.txt", document.header().number),
                bytes: titles.join(",").into_bytes(),
            })
        }
    }

    struct FailingExporter;

    #[async_trait::async_trait]
    impl DocumentExporter for FailingExporter {
        async fn export(
            &self,
            _document: &QuotationDocument,
            _page_size: &PageSize,
        ) -> Result<ExportedFile, DomainError> {
            Err(DomainError::Export("renderer unavailable".to_string()))
        }
    }

    fn header() -> QuotationHeader {
        QuotationHeader::new("Q-77", NaiveDate::from_ymd_opt(2024, 4, 4).unwrap()).with_client(
            ClientSelection::Known {
                id: 1,
                name: "Acme".to_string(),
            },
        )
    }

    #[tokio::test]
    async fn export_writes_artifact_to_output_dir() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = Arc::new(RecordingExporter::default());
        let service = ExportService::new(exporter.clone(), dir.path().join("out"), PageSize::A4);

        let doc = assemble(&header(), &[LineItem::new("Website", 100.0)], 3, 5).unwrap();
        let path = service.export(&doc).await.unwrap();

        assert_eq!(path, dir.path().join("out").join("Q-77.txt"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "Website");
        assert_eq!(exporter.seen.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn background_export_uses_snapshot_taken_before_edits() {
        let dir = tempfile::tempdir().unwrap();
        let service = Arc::new(ExportService::new(
            Arc::new(RecordingExporter::default()),
            dir.path(),
            PageSize::A4,
        ));

        let mut store = LineItemStore::new();
        store.add(LineItem::new("Website", 100.0));
        let doc = assemble(&header(), store.items(), 3, 5).unwrap();
        let handle = service.spawn_export(doc);

        store.add(LineItem::new("Hosting", 50.0));

        let path = handle.await.unwrap().unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "Website");
    }

    #[tokio::test]
    async fn exporter_failure_is_surfaced() {
        let dir = tempfile::tempdir().unwrap();
        let service = Arc::new(ExportService::new(
            Arc::new(FailingExporter),
            dir.path(),
            PageSize::A4,
        ));
        let doc = assemble(&header(), &[], 3, 5).unwrap();

        let err = service.spawn_export(doc).await.unwrap().unwrap_err();
        assert!(matches!(err, DomainError::Export(_)));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
