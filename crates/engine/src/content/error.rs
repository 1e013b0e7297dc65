use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use super::assets::AssetError;
use super::descriptor::LayerKind;

/// One-based row and column of the offending grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridLocation {
    pub row: usize,
    pub column: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelDataErrorCode {
    ReadFile,
    EmptyGrid,
    RaggedRow,
    NonNumericCode,
    UnknownCode,
    MissingSpawn,
    DuplicateSpawn,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelDataError {
    pub code: LevelDataErrorCode,
    pub message: String,
    pub level_id: u32,
    pub layer: LayerKind,
    pub file_path: PathBuf,
    pub location: Option<GridLocation>,
}

impl fmt::Display for LevelDataError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.location {
            Some(loc) => write!(
                f,
                "{:?}: {} (level={}, layer={}, file={}, row={}, column={})",
                self.code,
                self.message,
                self.level_id,
                self.layer.name(),
                self.file_path.display(),
                loc.row,
                loc.column
            ),
            None => write!(
                f,
                "{:?}: {} (level={}, layer={}, file={})",
                self.code,
                self.message,
                self.level_id,
                self.layer.name(),
                self.file_path.display()
            ),
        }
    }
}

impl std::error::Error for LevelDataError {}

/// Grid-local failure, before the layer and file it came from are known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridError {
    pub code: LevelDataErrorCode,
    pub message: String,
    pub location: Option<GridLocation>,
}

impl GridError {
    pub(crate) fn at(
        code: LevelDataErrorCode,
        message: impl Into<String>,
        row: usize,
        column: usize,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            location: Some(GridLocation { row, column }),
        }
    }

    pub(crate) fn in_layer(
        self,
        level_id: u32,
        layer: LayerKind,
        file_path: PathBuf,
    ) -> LevelDataError {
        LevelDataError {
            code: self.code,
            message: self.message,
            level_id,
            layer,
            file_path,
            location: self.location,
        }
    }
}

/// Everything that can stop a level from loading. No partial level is
/// ever produced.
#[derive(Debug, Error)]
pub enum LevelLoadError {
    #[error(transparent)]
    Data(#[from] LevelDataError),
    #[error(transparent)]
    Asset(#[from] AssetError),
}

impl LevelLoadError {
    pub fn data_code(&self) -> Option<LevelDataErrorCode> {
        match self {
            LevelLoadError::Data(error) => Some(error.code),
            LevelLoadError::Asset(_) => None,
        }
    }
}
