// Subtitle interactor - Carries subtitles across a cut

use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::error::ArchiverResult;
use crate::ports::RemuxPort;

/// Exports captions to text before retiming and muxes the retimed file back
pub struct SubtitleInteractor {
    remux_port: Arc<dyn RemuxPort>,
    language: String,
}

impl SubtitleInteractor {
    pub fn new(remux_port: Arc<dyn RemuxPort>, language: impl Into<String>) -> Self {
        Self {
            remux_port,
            language: language.into(),
        }
    }

    pub fn export(&self, input: &Path, output: &Path) -> ArchiverResult<()> {
        info!("Exporting subtitles of {} to {}", input.display(), output.display());
        self.remux_port.export_subtitle(input, output)
    }

    /// `language` overrides the configured tag for this import only
    pub fn import(
        &self,
        video: &Path,
        subtitle: &Path,
        output: &Path,
        language: Option<&str>,
    ) -> ArchiverResult<()> {
        let language = language.unwrap_or(&self.language);
        info!(
            "Importing {} into {} as {} ({})",
            subtitle.display(),
            video.display(),
            output.display(),
            language
        );
        self.remux_port.import_subtitle(video, subtitle, language, output)
    }
}
