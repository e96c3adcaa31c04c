//! Dub audio: collaborator contracts and the dub builder.

mod builder;
mod collaborators;

pub use builder::{DubAsset, DubBuilder, DubProvenance};
pub(crate) use builder::retry_once;
pub use collaborators::{
    CollaboratorError, CollaboratorResult, MediaProber, SpeechSynthesizer, Translator,
};
