// Batch interactor - Runs a batch file's cuts one after another

use std::sync::Arc;

use tracing::info;

use crate::adapters::yaml_batch::BatchConfig;
use crate::app::cut_interactor::{CutInteractor, CutReport, CutRequest};
use crate::error::ArchiverResult;

/// Interactor for the batch use case. Entries run strictly in order and the
/// first failure aborts the remaining ones.
pub struct BatchInteractor {
    cut_interactor: Arc<CutInteractor>,
}

impl BatchInteractor {
    pub fn new(cut_interactor: Arc<CutInteractor>) -> Self {
        Self { cut_interactor }
    }

    /// Translate every entry up front so a bad value fails before any cut
    pub fn requests(batch: &BatchConfig, check_metadata: bool) -> ArchiverResult<Vec<CutRequest>> {
        let source = batch.source();
        batch
            .cut
            .iter()
            .map(|cut| {
                let (from, to) = cut.time_strings()?;
                Ok(CutRequest {
                    input: source.clone(),
                    output: batch.output_for(cut),
                    from: Some(from),
                    to: Some(to),
                    check_metadata,
                })
            })
            .collect()
    }

    pub fn execute(&self, batch: &BatchConfig, check_metadata: bool) -> ArchiverResult<Vec<CutReport>> {
        let requests = Self::requests(batch, check_metadata)?;
        let total = requests.len();

        let mut reports = Vec::with_capacity(total);
        for (number, request) in requests.into_iter().enumerate() {
            info!(
                "Batch entry {}/{}: {}",
                number + 1,
                total,
                request.output.display()
            );
            reports.push(self.cut_interactor.execute(request)?);
        }
        Ok(reports)
    }
}
