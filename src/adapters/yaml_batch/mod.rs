// YAML batch adapter - Batch cut lists

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::info;

use crate::domain::model::TimeCode;
use crate::error::{ArchiverError, ArchiverResult};

/// Batch file: one source recording and the named segments to cut from it
///
/// ```yaml
/// path: /srv/recordings
/// name: 2024-01-01-news.ts
/// cut:
///   - name: opening talk
///     from: 12.5
///     to: 340.25
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BatchConfig {
    /// Directory holding the source and receiving the outputs
    pub path: PathBuf,
    /// Source file name inside `path`
    pub name: String,
    pub cut: Vec<BatchCut>,
}

/// One named segment, bounds in seconds from the start of the recording
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BatchCut {
    pub name: String,
    pub from: f64,
    pub to: f64,
}

impl BatchConfig {
    pub fn from_yaml_str(content: &str) -> ArchiverResult<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn load(path: &Path) -> ArchiverResult<Self> {
        info!("Loading batch configuration from: {}", path.display());
        let content = std::fs::read_to_string(path).map_err(|e| {
            ArchiverError::config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_yaml_str(&content)
    }

    pub fn source(&self) -> PathBuf {
        self.path.join(&self.name)
    }

    /// `<path>/<source stem>-<cut name with spaces as dashes>.ts`
    pub fn output_for(&self, cut: &BatchCut) -> PathBuf {
        let stem = Path::new(&self.name)
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_else(|| self.name.clone());
        self.path
            .join(format!("{}-{}.ts", stem, cut.name.replace(' ', "-")))
    }
}

impl BatchCut {
    /// Bounds as `HH:MM:SS.mmm`, rounded to the millisecond
    pub fn time_strings(&self) -> ArchiverResult<(String, String)> {
        let from = TimeCode::from_secs_f64_millis(self.from)?;
        let to = TimeCode::from_secs_f64_millis(self.to)?;
        Ok((from.format(), to.format()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BATCH: &str = r#"
path: /srv/recordings
name: 2024-01-01-news.ts
cut:
  - name: opening talk
    from: 12.5
    to: 340.2506
  - name: weather
    from: 3725
    to: 3800.0004
"#;

    #[test]
    fn test_parse_batch() {
        let batch = BatchConfig::from_yaml_str(BATCH).unwrap();
        assert_eq!(batch.cut.len(), 2);
        assert_eq!(batch.source(), PathBuf::from("/srv/recordings/2024-01-01-news.ts"));
        assert_eq!(batch.cut[1].from, 3725.0);
    }

    #[test]
    fn test_output_naming() {
        let batch = BatchConfig::from_yaml_str(BATCH).unwrap();
        assert_eq!(
            batch.output_for(&batch.cut[0]),
            PathBuf::from("/srv/recordings/2024-01-01-news-opening-talk.ts")
        );
    }

    #[test]
    fn test_seconds_become_time_strings() {
        let batch = BatchConfig::from_yaml_str(BATCH).unwrap();
        assert_eq!(
            batch.cut[0].time_strings().unwrap(),
            ("00:00:12.500".to_string(), "00:05:40.251".to_string())
        );
        assert_eq!(
            batch.cut[1].time_strings().unwrap(),
            ("01:02:05.000".to_string(), "01:03:20.000".to_string())
        );
    }

    #[test]
    fn test_negative_seconds_rejected() {
        let cut = BatchCut {
            name: "x".to_string(),
            from: -1.0,
            to: 2.0,
        };
        assert!(matches!(
            cut.time_strings(),
            Err(ArchiverError::MalformedTimeString { .. })
        ));
    }

    #[test]
    fn test_out_of_range_seconds_rejected() {
        let batch = BatchConfig::from_yaml_str(
            "path: .\nname: a.ts\ncut:\n  - name: huge\n    from: 1e20\n    to: 2\n  - name: long\n    from: 0\n    to: 360000\n",
        )
        .unwrap();
        assert!(matches!(
            batch.cut[0].time_strings(),
            Err(ArchiverError::MalformedTimeString { .. })
        ));
        match batch.cut[1].time_strings() {
            Err(ArchiverError::MalformedTimeString { input }) => assert_eq!(input, "360000"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_missing_key_is_yaml_error() {
        assert!(matches!(
            BatchConfig::from_yaml_str("path: /tmp\ncut: []\n"),
            Err(ArchiverError::Yaml(_))
        ));
    }
}
