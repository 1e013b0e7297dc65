use std::fs;
use std::path::{Path, PathBuf};

use scroller_engine::{EnemyDefinition, EnemyTable, EnemyTableError};
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub(crate) enum EnemyFileError {
    #[error("failed to read enemy table {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("parse enemy table {path}{}: {source}", format_json_path(.json_path))]
    Parse {
        path: PathBuf,
        json_path: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid enemy table {path}: {source}")]
    Table {
        path: PathBuf,
        #[source]
        source: EnemyTableError,
    },
}

fn format_json_path(json_path: &str) -> String {
    if json_path.is_empty() || json_path == "." {
        String::new()
    } else {
        format!(" at {json_path}")
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct EnemyFile {
    enemies: Vec<EnemyDefinition>,
}

/// Reads `enemies.json`, or falls back to the built-in table when the
/// file does not exist.
pub(crate) fn load_enemy_table(path: &Path) -> Result<EnemyTable, EnemyFileError> {
    if !path.exists() {
        let table = EnemyTable::builtin();
        info!(path = %path.display(), definitions = table.len(), "enemy_table_builtin");
        return Ok(table);
    }

    let raw = fs::read_to_string(path).map_err(|source| EnemyFileError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let table = parse_enemy_table(path, &raw)?;
    info!(path = %path.display(), definitions = table.len(), "enemy_table_loaded");
    Ok(table)
}

fn parse_enemy_table(path: &Path, raw: &str) -> Result<EnemyTable, EnemyFileError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    let file: EnemyFile =
        serde_path_to_error::deserialize(&mut deserializer).map_err(|error| {
            let json_path = error.path().to_string();
            EnemyFileError::Parse {
                path: path.to_path_buf(),
                json_path,
                source: error.into_inner(),
            }
        })?;
    EnemyTable::from_definitions(file.enemies).map_err(|source| EnemyFileError::Table {
        path: path.to_path_buf(),
        source,
    })
}
