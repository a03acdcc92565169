use std::path::PathBuf;

use thiserror::Error;

/// Failure while turning OBJ text into a mesh. Any of these aborts the load;
/// a half-built index space is never returned.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("line {line}: `{record}` record is missing field {field}")]
    MissingField {
        line: usize,
        record: &'static str,
        field: usize,
    },
    #[error("line {line}: invalid coordinate `{token}`")]
    InvalidFloat { line: usize, token: String },
    #[error("line {line}: invalid face index `{token}`")]
    InvalidIndex { line: usize, token: String },
    #[error("face corner {corner} references vertex {index}, but only {len} vertices were parsed")]
    IndexOutOfRange {
        corner: usize,
        index: usize,
        len: usize,
    },
}

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to read model {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse model: {0}")]
    Parse(#[from] ParseError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl std::fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShaderStage::Vertex => write!(f, "vertex"),
            ShaderStage::Fragment => write!(f, "fragment"),
        }
    }
}

/// Fatal to startup, there is no fallback rendering path.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphicsSetupError {
    #[error("{stage} shader failed to compile: {reason}")]
    Compile { stage: ShaderStage, reason: String },
    #[error("shader program failed to link: {0}")]
    Link(String),
    #[error("uniform `{0}` not found in shader program")]
    MissingUniform(String),
    #[error("failed to open window: {0}")]
    Window(String),
}

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("failed to write {}", path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Everything that can stop the viewer binary.
#[derive(Error, Debug)]
pub enum ViewerError {
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Graphics(#[from] GraphicsSetupError),
    #[error(transparent)]
    Capture(#[from] CaptureError),
    #[error("failed to initialise logging: {0}")]
    Logger(#[from] log::SetLoggerError),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
