use thiserror::Error;

use crate::core::types::{BoneId, SkeletonId};

#[derive(Error, Debug)]
pub enum DismemberError {
    #[error("Skeleton not found: {0:?}")]
    SkeletonNotFound(SkeletonId),

    #[error("Bone already broken: {0}")]
    AlreadyBroken(BoneId),

    #[error("Not authoritative: {0} must be requested from the authority")]
    NotAuthority(&'static str),

    #[error("Authority channel closed")]
    ChannelClosed,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DismemberError>;
