//! Command-line asset converter

use std::path::Path;

use crate::command::{path_arg, CommandSpec};
use crate::convert::{AssetConverter, ConvertError};

/// Program invoked by default
pub const DEFAULT_PROGRAM: &str = "fbx-conv";

/// Extension of the converted assets
pub const DEFAULT_EXTENSION: &str = "g3db";

/// Runs an external converter with `{input}` and `{output}` placeholders
#[derive(Debug, Clone)]
pub struct CommandConverter {
    command: CommandSpec,
    extension: String,
}

impl CommandConverter {
    pub fn new(command: CommandSpec, extension: impl Into<String>) -> Self {
        Self {
            command,
            extension: extension.into(),
        }
    }

    /// Default command line: `fbx-conv -f {input} {output}`
    pub fn default_command() -> CommandSpec {
        CommandSpec::new(DEFAULT_PROGRAM, &["-f", "{input}", "{output}"])
    }

    pub fn command(&self) -> &CommandSpec {
        &self.command
    }
}

impl Default for CommandConverter {
    fn default() -> Self {
        Self::new(Self::default_command(), DEFAULT_EXTENSION)
    }
}

impl AssetConverter for CommandConverter {
    fn extension(&self) -> &str {
        &self.extension
    }

    fn convert(&self, input: &Path, output: &Path) -> Result<(), ConvertError> {
        if !input.exists() {
            return Err(ConvertError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("intermediate file {} does not exist", input.display()),
            )));
        }

        self.command
            .run(&[("input", path_arg(input)), ("output", path_arg(output))])?;

        if !output.exists() {
            return Err(ConvertError::MissingOutput(output.to_path_buf()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_command() {
        let converter = CommandConverter::default();
        assert_eq!(converter.extension(), "g3db");
        assert_eq!(converter.command().program, "fbx-conv");
        assert_eq!(
            converter.command().expand(&[("input", "a.obj".into()), ("output", "b.g3db".into())]),
            vec!["-f", "a.obj", "b.g3db"]
        );
    }

    #[test]
    fn test_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let err = CommandConverter::default()
            .convert(&dir.path().join("nope.obj"), &dir.path().join("nope.g3db"))
            .unwrap_err();
        assert!(matches!(err, ConvertError::Io(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_copy_converter() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("town_car.obj");
        let output = dir.path().join("town_car.g3db");
        std::fs::write(&input, "v 0 0 0\n").unwrap();

        let converter = CommandConverter::new(CommandSpec::new("cp", &["{input}", "{output}"]), "g3db");
        converter.convert(&input, &output).unwrap();

        assert_eq!(std::fs::read_to_string(&output).unwrap(), "v 0 0 0\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_silent_converter_reports_missing_output() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("town_car.obj");
        std::fs::write(&input, "").unwrap();

        let converter = CommandConverter::new(CommandSpec::new("true", &[]), "g3db");
        let err = converter.convert(&input, &dir.path().join("town_car.g3db")).unwrap_err();
        assert!(matches!(err, ConvertError::MissingOutput(_)));
    }
}
