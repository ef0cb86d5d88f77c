//! Database-backed enums.

use glimpse_core::post::FileType as DomainFileType;
use sea_orm::entity::prelude::*;
use sea_orm::sea_query::StringLen;
use serde::{Deserialize, Serialize};

/// Stored media kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum FileType {
    /// Still image.
    #[sea_orm(string_value = "image")]
    Image,
    /// Video clip.
    #[sea_orm(string_value = "video")]
    Video,
}

impl From<DomainFileType> for FileType {
    fn from(value: DomainFileType) -> Self {
        match value {
            DomainFileType::Image => Self::Image,
            DomainFileType::Video => Self::Video,
        }
    }
}

impl From<FileType> for DomainFileType {
    fn from(value: FileType) -> Self {
        match value {
            FileType::Image => Self::Image,
            FileType::Video => Self::Video,
        }
    }
}
