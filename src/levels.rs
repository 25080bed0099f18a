//! Level packs and the level-index wraparound policy.
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use crate::console_interface::parse_level;
use crate::core::{Level, LevelData};
use crate::error::LevelError;

/// A requested level number as the host received it. Anything that does
/// not parse as an integer is kept as `Invalid` and resolves to level 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LevelRequest {
    Index(i64),
    Invalid,
}

impl LevelRequest {
    pub fn parse(text: &str) -> LevelRequest {
        match text.trim().parse::<i64>() {
            Ok(index) => LevelRequest::Index(index),
            Err(_) => LevelRequest::Invalid,
        }
    }
}

impl From<usize> for LevelRequest {
    fn from(index: usize) -> Self {
        i64::try_from(index)
            .map(LevelRequest::Index)
            .unwrap_or(LevelRequest::Invalid)
    }
}

impl fmt::Display for LevelRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LevelRequest::Index(index) => write!(f, "{index}"),
            LevelRequest::Invalid => write!(f, "<invalid>"),
        }
    }
}

/// Normalizes a request against a pack of `level_count` levels, numbered
/// from 1. Zero and negatives wrap to the last level; invalid input and
/// anything past the end wraps to the first.
pub fn select_level(request: LevelRequest, level_count: usize) -> usize {
    let last = level_count.max(1);
    match request {
        LevelRequest::Index(index) if index <= 0 => last,
        LevelRequest::Index(index) => match usize::try_from(index) {
            Ok(index) if index <= last => index,
            _ => 1,
        },
        LevelRequest::Invalid => 1,
    }
}

pub trait LevelSource: Send + Sync {
    fn level_count(&self) -> usize;

    /// Loads level `index`, numbered from 1.
    fn level(&self, index: usize) -> Result<Arc<Level>, LevelError>;
}

const BUILTIN_LEVELS: &[&str] = &[
    r#"
#####
#@$.#
#####
"#,
    r#"
#######
#     #
# $ $ #
#@ . .#
#######
"#,
    r#"
  ####
###  #
#@$. #
# $  #
# .  #
######
"#,
    r#"
  #######
  #  .  #
  #  $  #
### $# ###
#   @   #
###   ###
  #  .  #
  #######
"#,
];

#[derive(Clone, Debug)]
pub struct LevelPack {
    levels: Vec<Arc<Level>>,
}

impl LevelPack {
    pub fn new(levels: Vec<Level>) -> Result<LevelPack, LevelError> {
        if levels.is_empty() {
            return Err(LevelError::EmptyPack);
        }
        Ok(LevelPack {
            levels: levels.into_iter().map(Arc::new).collect(),
        })
    }

    pub fn builtin() -> Result<LevelPack, LevelError> {
        let levels = BUILTIN_LEVELS
            .iter()
            .map(|text| parse_level(text))
            .collect::<Result<Vec<_>, _>>()?;
        LevelPack::new(levels)
    }

    /// Decodes a JSON array of levels, each holding `walls`, `targets` and
    /// `boxes` as `[x, y]` pair lists plus a `player` pair.
    pub fn from_json_str(json: &str) -> Result<LevelPack, LevelError> {
        let data: Vec<LevelData> = serde_json::from_str(json)?;
        let levels = data
            .into_iter()
            .map(Level::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        LevelPack::new(levels)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<LevelPack, LevelError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| LevelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let pack = LevelPack::from_json_str(&json)?;
        tracing::info!(path = %path.display(), levels = pack.level_count(), "loaded level pack");
        Ok(pack)
    }
}

impl LevelSource for LevelPack {
    fn level_count(&self) -> usize {
        self.levels.len()
    }

    fn level(&self, index: usize) -> Result<Arc<Level>, LevelError> {
        index
            .checked_sub(1)
            .and_then(|i| self.levels.get(i))
            .cloned()
            .ok_or(LevelError::NotFound {
                index,
                count: self.levels.len(),
            })
    }
}
