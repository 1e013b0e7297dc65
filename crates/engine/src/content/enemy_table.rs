use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::world::Axis;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyBehavior {
    /// One image under `enemies/<code>.png`.
    Static,
    /// A frame folder under `enemies/<code>/`.
    Animated,
}

/// Speed is in pixels per tick at the reference tile size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnemyDefinition {
    pub code: i32,
    pub behavior: EnemyBehavior,
    pub axis: Axis,
    pub speed: f32,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EnemyTableError {
    #[error("enemy code {code} is defined more than once")]
    DuplicateCode { code: i32 },
    #[error("enemy code {code} is negative")]
    NegativeCode { code: i32 },
    #[error("enemy code {code} has a non-finite speed")]
    InvalidSpeed { code: i32 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnemyTable {
    by_code: BTreeMap<i32, EnemyDefinition>,
}

impl EnemyTable {
    pub fn builtin() -> Self {
        let by_code = BUILTIN_ENEMIES
            .iter()
            .map(|definition| (definition.code, *definition))
            .collect();
        Self { by_code }
    }

    pub fn from_definitions(
        definitions: impl IntoIterator<Item = EnemyDefinition>,
    ) -> Result<Self, EnemyTableError> {
        let mut by_code = BTreeMap::new();
        for definition in definitions {
            let code = definition.code;
            if code < 0 {
                return Err(EnemyTableError::NegativeCode { code });
            }
            if !definition.speed.is_finite() {
                return Err(EnemyTableError::InvalidSpeed { code });
            }
            if by_code.insert(code, definition).is_some() {
                return Err(EnemyTableError::DuplicateCode { code });
            }
        }
        Ok(Self { by_code })
    }

    pub fn get(&self, code: i32) -> Option<&EnemyDefinition> {
        self.by_code.get(&code)
    }

    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }

    pub fn definitions(&self) -> impl Iterator<Item = &EnemyDefinition> {
        self.by_code.values()
    }
}

impl Default for EnemyTable {
    fn default() -> Self {
        Self::builtin()
    }
}

const BUILTIN_ENEMIES: [EnemyDefinition; 4] = [
    EnemyDefinition {
        code: 0,
        behavior: EnemyBehavior::Static,
        axis: Axis::Horizontal,
        speed: 3.0,
    },
    EnemyDefinition {
        code: 1,
        behavior: EnemyBehavior::Animated,
        axis: Axis::Horizontal,
        speed: 2.0,
    },
    EnemyDefinition {
        code: 2,
        behavior: EnemyBehavior::Static,
        axis: Axis::Vertical,
        speed: 2.0,
    },
    EnemyDefinition {
        code: 3,
        behavior: EnemyBehavior::Animated,
        axis: Axis::Vertical,
        speed: 3.0,
    },
];
