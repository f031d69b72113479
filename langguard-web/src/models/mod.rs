//! Data models for langguard-web

pub mod media;
pub mod pipeline_result;
pub mod session;

pub use media::{AcquiredMedia, MediaInput, MediaKind, UploadedFile};
pub use pipeline_result::{ArtifactKind, LanguageRef, PipelineResult};
pub use session::SessionId;
