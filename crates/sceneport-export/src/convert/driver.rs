//! Parallel conversion driver
//!
//! Conversions run on a dedicated rayon pool so the number of concurrent
//! converter processes stays bounded. Results keep input order.

use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::convert::{AssetConverter, ConvertError};
use crate::error::{PipelineError, PipelineResult};
use crate::orchestrator::IntermediateFile;

/// Conversion options
#[derive(Debug, Clone, Default)]
pub struct ConversionOptions {
    /// Worker count; `None` sizes the pool to the machine
    pub jobs: Option<usize>,

    /// Leave intermediate files in place after a successful conversion
    pub keep_intermediates: bool,
}

/// One intermediate that failed to convert
#[derive(Debug)]
pub struct ConversionFailure {
    pub intermediate: PathBuf,
    pub entity: String,
    pub error: ConvertError,
}

/// Outcome of converting a batch of intermediates
#[derive(Debug, Default)]
pub struct ConversionReport {
    /// Produced assets in input order
    pub converted: Vec<PathBuf>,
    pub failures: Vec<ConversionFailure>,
}

impl ConversionReport {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Converts intermediates into `asset_dir`
pub struct ConversionDriver<'c> {
    converter: &'c dyn AssetConverter,
    asset_dir: PathBuf,
    options: ConversionOptions,
}

impl<'c> ConversionDriver<'c> {
    pub fn new(converter: &'c dyn AssetConverter, asset_dir: impl Into<PathBuf>) -> Self {
        Self {
            converter,
            asset_dir: asset_dir.into(),
            options: ConversionOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ConversionOptions) -> Self {
        self.options = options;
        self
    }

    /// Final asset path: `<asset_dir>/<model file name>.<ext>`
    pub fn asset_path(&self, file: &IntermediateFile) -> PathBuf {
        self.asset_dir
            .join(format!("{}.{}", file.target.model_file_name, self.converter.extension()))
    }

    /// Convert every intermediate.
    ///
    /// A failed conversion is recorded and the rest continue. Only setup
    /// problems (output directory, worker pool) are returned as errors.
    pub fn run(&self, files: &[IntermediateFile]) -> PipelineResult<ConversionReport> {
        fs::create_dir_all(&self.asset_dir)?;

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.options.jobs.unwrap_or(0))
            .thread_name(|i| format!("sceneport-convert-{}", i))
            .build()
            .map_err(|e| PipelineError::WorkerPool(e.to_string()))?;

        let results: Vec<(PathBuf, Result<(), ConvertError>)> = pool.install(|| {
            files
                .par_iter()
                .map(|file| {
                    let output = self.asset_path(file);
                    let result = self.convert_one(file, &output);
                    (output, result)
                })
                .collect()
        });

        let mut report = ConversionReport::default();
        for (file, (output, result)) in files.iter().zip(results) {
            match result {
                Ok(()) => report.converted.push(output),
                Err(error) => {
                    warn!(entity = %file.target.entity, intermediate = %file.path.display(), error = %error, "Conversion failed");
                    report.failures.push(ConversionFailure {
                        intermediate: file.path.clone(),
                        entity: file.target.entity.clone(),
                        error,
                    });
                }
            }
        }

        info!(
            converted = report.converted.len(),
            failed = report.failures.len(),
            dir = %self.asset_dir.display(),
            "Conversion finished"
        );
        Ok(report)
    }

    fn convert_one(&self, file: &IntermediateFile, output: &Path) -> Result<(), ConvertError> {
        debug!(input = %file.path.display(), output = %output.display(), "Converting");
        self.converter.convert(&file.path, output)?;

        if !self.options.keep_intermediates {
            file.remove();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dedup::ExportTarget;
    use parking_lot::Mutex;
    use sceneport_core::GeometryId;

    /// Copies input to output unless the input name is listed as failing
    struct CopyConverter {
        calls: Mutex<Vec<PathBuf>>,
        fail_on: Vec<String>,
    }

    impl CopyConverter {
        fn new(fail_on: &[&str]) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                fail_on: fail_on.iter().map(|s| s.to_string()).collect(),
            }
        }
    }

    impl AssetConverter for CopyConverter {
        fn extension(&self) -> &str {
            "g3db"
        }

        fn convert(&self, input: &Path, output: &Path) -> Result<(), ConvertError> {
            self.calls.lock().push(input.to_path_buf());
            let stem = input.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
            if self.fail_on.iter().any(|f| f == stem) {
                return Err(ConvertError::Other(format!("cannot convert {}", stem)));
            }
            fs::copy(input, output)?;
            Ok(())
        }
    }

    fn intermediate(dir: &Path, name: &str) -> IntermediateFile {
        let path = dir.join(format!("town_{}.obj", name));
        let companion = path.with_extension("mtl");
        fs::write(&path, name).unwrap();
        fs::write(&companion, "newmtl m").unwrap();
        IntermediateFile {
            target: ExportTarget {
                entity: name.into(),
                logical_name: name.into(),
                model_file_name: format!("town_{}", name),
                geometry: GeometryId::from(name),
                linked: Vec::new(),
                instances: 1,
            },
            path,
            companions: vec![companion],
        }
    }

    #[test]
    fn test_converts_and_removes_intermediates() {
        let scratch = tempfile::tempdir().unwrap();
        let assets = tempfile::tempdir().unwrap();
        let files = vec![intermediate(scratch.path(), "car"), intermediate(scratch.path(), "house")];
        let converter = CopyConverter::new(&[]);

        let report = ConversionDriver::new(&converter, assets.path().join("g3db"))
            .with_options(ConversionOptions {
                jobs: Some(2),
                keep_intermediates: false,
            })
            .run(&files)
            .unwrap();

        assert!(report.is_complete());
        assert_eq!(
            report.converted,
            vec![
                assets.path().join("g3db").join("town_car.g3db"),
                assets.path().join("g3db").join("town_house.g3db"),
            ]
        );
        assert_eq!(fs::read_to_string(&report.converted[1]).unwrap(), "house");
        assert!(!files[0].path.exists());
        assert!(!files[0].companions[0].exists());
        assert_eq!(converter.calls.lock().len(), 2);
    }

    #[test]
    fn test_failure_is_per_file() {
        let scratch = tempfile::tempdir().unwrap();
        let assets = tempfile::tempdir().unwrap();
        let files = vec![
            intermediate(scratch.path(), "car"),
            intermediate(scratch.path(), "house"),
            intermediate(scratch.path(), "tree"),
        ];
        let converter = CopyConverter::new(&["town_car"]);

        let report = ConversionDriver::new(&converter, assets.path()).run(&files).unwrap();

        assert_eq!(report.converted.len(), 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].entity, "car");
        // Failed intermediates are kept for inspection
        assert!(files[0].path.exists());
        assert!(!files[2].path.exists());
    }

    #[test]
    fn test_keep_intermediates() {
        let scratch = tempfile::tempdir().unwrap();
        let assets = tempfile::tempdir().unwrap();
        let files = vec![intermediate(scratch.path(), "car")];
        let converter = CopyConverter::new(&[]);

        let report = ConversionDriver::new(&converter, assets.path())
            .with_options(ConversionOptions {
                jobs: Some(1),
                keep_intermediates: true,
            })
            .run(&files)
            .unwrap();

        assert_eq!(report.converted.len(), 1);
        assert!(files[0].path.exists());
    }

    #[test]
    fn test_empty_batch() {
        let assets = tempfile::tempdir().unwrap();
        let converter = CopyConverter::new(&[]);
        let report = ConversionDriver::new(&converter, assets.path()).run(&[]).unwrap();
        assert!(report.converted.is_empty());
        assert!(report.is_complete());
    }
}
