//! Export configuration
//!
//! Loaded from YAML. Every field has a default, so a config file only needs
//! the values it changes:
//!
//! ```yaml
//! axis: y-up
//! jobs: 4
//! converter:
//!   command:
//!     program: /opt/fbx-conv/fbx-conv
//!     args: ["-f", "{input}", "{output}"]
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::classify::AxisConvention;
use crate::command::CommandSpec;
use crate::convert::CommandConverter;
use crate::error::{PipelineError, PipelineResult};
use crate::orchestrator::CommandExporter;

/// Native exporter settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExporterConfig {
    pub command: CommandSpec,
    /// Intermediate file extension
    pub extension: String,
    /// Side files the exporter writes next to the intermediate
    pub companions: Vec<String>,
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            command: CommandSpec::new(
                "blender",
                &[
                    "--background",
                    "{scene}",
                    "--python",
                    "{script}",
                    "--",
                    "{selection}",
                    "{output}",
                ],
            ),
            extension: "obj".to_string(),
            companions: vec!["mtl".to_string()],
        }
    }
}

/// Asset converter settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterConfig {
    pub command: CommandSpec,
    /// Final asset extension
    pub extension: String,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            command: CommandConverter::default_command(),
            extension: crate::convert::DEFAULT_EXTENSION.to_string(),
        }
    }
}

/// Settings for one export run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Separates a logical name from its disambiguating suffix
    pub delimiter: char,

    pub axis: AxisConvention,

    /// Root of all output; defaults to the scene file's directory
    pub output_root: Option<PathBuf>,

    /// Subdirectories of the output root
    pub manifest_dir: PathBuf,
    pub asset_dir: PathBuf,
    pub scratch_dir: PathBuf,

    pub pretty_json: bool,

    /// Write manifests for categories without records
    pub write_empty: bool,

    /// Conversion workers; unset means one per core
    pub jobs: Option<usize>,

    /// Keep intermediates after successful conversion
    pub keep_intermediates: bool,

    /// Stop after manifests and conflict checking
    pub dry_run: bool,

    pub exporter: ExporterConfig,
    pub converter: ConverterConfig,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            delimiter: sceneport_scene::DEFAULT_DELIMITER,
            axis: AxisConvention::Native,
            output_root: None,
            manifest_dir: PathBuf::from("json"),
            asset_dir: PathBuf::from("g3db"),
            scratch_dir: PathBuf::from("intermediate"),
            pretty_json: true,
            write_empty: true,
            jobs: None,
            keep_intermediates: false,
            dry_run: false,
            exporter: ExporterConfig::default(),
            converter: ConverterConfig::default(),
        }
    }
}

impl ExportConfig {
    /// Parse and validate a YAML document
    pub fn from_yaml_str(yaml: &str) -> PipelineResult<Self> {
        let config: Self =
            serde_yaml::from_str(yaml).map_err(|e| PipelineError::config(format!("invalid YAML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a YAML config file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> PipelineResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| PipelineError::config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_yaml_str(&text)
    }

    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> PipelineResult<()> {
        if self.delimiter.is_alphanumeric() || self.delimiter == '_' {
            return Err(PipelineError::config(format!(
                "delimiter '{}' would split ordinary names",
                self.delimiter
            )));
        }
        if self.jobs == Some(0) {
            return Err(PipelineError::config("jobs must be at least 1"));
        }
        if self.exporter.command.program.is_empty() {
            return Err(PipelineError::config("exporter command has no program"));
        }
        if self.converter.command.program.is_empty() {
            return Err(PipelineError::config("converter command has no program"));
        }
        for (what, ext) in [
            ("exporter", &self.exporter.extension),
            ("converter", &self.converter.extension),
        ] {
            if ext.is_empty() || ext.starts_with('.') {
                return Err(PipelineError::config(format!(
                    "{} extension must be non-empty and given without a dot",
                    what
                )));
            }
        }
        for dir in [&self.manifest_dir, &self.asset_dir, &self.scratch_dir] {
            if dir.as_os_str().is_empty() {
                return Err(PipelineError::config("output subdirectories must not be empty"));
            }
        }
        Ok(())
    }

    /// Native exporter described by the `exporter` section
    pub fn native_exporter(&self) -> CommandExporter {
        CommandExporter::new(self.exporter.command.clone(), self.exporter.extension.clone())
            .with_companions(self.exporter.companions.clone())
    }

    /// Converter described by the `converter` section
    pub fn asset_converter(&self) -> CommandConverter {
        CommandConverter::new(self.converter.command.clone(), self.converter.extension.clone())
    }

    pub fn to_yaml_string(&self) -> PipelineResult<String> {
        serde_yaml::to_string(self).map_err(|e| PipelineError::config(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ExportConfig::default();
        assert_eq!(config.delimiter, '.');
        assert_eq!(config.axis, AxisConvention::Native);
        assert_eq!(config.asset_dir, PathBuf::from("g3db"));
        assert_eq!(config.converter.command.program, "fbx-conv");
        assert_eq!(config.exporter.companions, vec!["mtl".to_string()]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_exporter_is_self_contained() {
        let command = ExportConfig::default().exporter.command;
        // The selection file is what carries the zeroed transform
        assert!(command.references("selection"));
        assert!(command.references("script"));
        assert!(command.references("output"));
    }

    #[test]
    fn test_partial_yaml() {
        let config = ExportConfig::from_yaml_str(
            "axis: y-up\njobs: 3\nconverter:\n  extension: g3dj\n",
        )
        .unwrap();

        assert_eq!(config.axis, AxisConvention::YUp);
        assert_eq!(config.jobs, Some(3));
        assert_eq!(config.converter.extension, "g3dj");
        // Untouched nested fields keep their defaults
        assert_eq!(config.converter.command.program, "fbx-conv");
        assert!(config.write_empty);
    }

    #[test]
    fn test_invalid_values() {
        assert!(ExportConfig::from_yaml_str("jobs: 0\n").is_err());
        assert!(ExportConfig::from_yaml_str("delimiter: a\n").is_err());
        assert!(ExportConfig::from_yaml_str("converter:\n  extension: .g3db\n").is_err());
        assert!(ExportConfig::from_yaml_str("axis: sideways\n").is_err());
    }

    #[test]
    fn test_yaml_round_trip() {
        let mut config = ExportConfig::default();
        config.delimiter = '/';
        config.output_root = Some(PathBuf::from("/srv/assets"));

        let parsed = ExportConfig::from_yaml_str(&config.to_yaml_string().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_builds_commands() {
        use crate::convert::AssetConverter;
        use crate::orchestrator::NativeExporter;

        let config = ExportConfig::default();
        assert_eq!(config.native_exporter().extension(), "obj");
        assert_eq!(config.native_exporter().companion_extensions(), &["mtl".to_string()]);
        assert_eq!(config.asset_converter().extension(), "g3db");
    }

    #[test]
    fn test_missing_file() {
        let err = ExportConfig::from_yaml_file("/nonexistent/sceneport.yaml").unwrap_err();
        assert!(matches!(err, PipelineError::Config(_)));
    }
}
