//! The robot program shown in the editor.
//!
//! Program text is carried around as an opaque string. Nothing here compiles or runs
//! it; the robot is driven by the fixed table in `policy`.

use crate::assets;
use crate::error::ProgramError;
use std::fs;
use std::path::Path;

const ENTRY_POINTS: [&str; 2] = ["void setup()", "void loop()"];

/// Built-in example programs, embedded under `assets/programs/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Template {
    Default,
    Basic,
    Pid,
    Advanced,
}

impl Template {
    pub fn all() -> [Template; 4] {
        [
            Template::Default,
            Template::Basic,
            Template::Pid,
            Template::Advanced,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Template::Default => "default",
            Template::Basic => "basic",
            Template::Pid => "pid",
            Template::Advanced => "advanced",
        }
    }

    fn asset_path(&self) -> String {
        format!("programs/{}.ino", self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    name: String,
    source: String,
}

impl Program {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Program {
            name: name.into(),
            source: source.into(),
        }
    }

    pub fn from_template(template: Template) -> Result<Self, ProgramError> {
        let path = template.asset_path();
        let bytes = assets::get_asset_bytes(&path)
            .ok_or_else(|| ProgramError::MissingTemplate(template.name().to_string()))?;
        let source = String::from_utf8(bytes.into_owned())
            .map_err(|_| ProgramError::InvalidEncoding(template.name().to_string()))?;
        Ok(Program::new(template.name(), source))
    }

    pub fn from_file(path: &Path) -> Result<Self, ProgramError> {
        let source = fs::read_to_string(path).map_err(|source| ProgramError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Program::new(name, source))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn line_count(&self) -> usize {
        // An empty editor still shows one line
        self.source.split('\n').count()
    }

    /// The editor's "Verify" button: both sketch entry points must be present.
    pub fn verify(&self) -> Result<(), ProgramError> {
        for entry in ENTRY_POINTS {
            if !self.source.contains(entry) {
                return Err(ProgramError::MissingEntryPoint(entry));
            }
        }
        Ok(())
    }
}
