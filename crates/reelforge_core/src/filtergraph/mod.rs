//! Filter graph construction for clip renders.

mod builder;
mod encode;
mod graph;

pub use builder::{build_filter_graph, GraphSpec};
pub use encode::{audio_encode_args, video_encode_args, working_copy_args};
pub use graph::{AudioMap, FilterGraph, StageKind, FRAME_HEIGHT, FRAME_WIDTH};
