//! Transcript reading: JSONL parsing, noise classification and file discovery

mod hash;
mod message;
mod noise;
mod paths;
mod reader;

pub use hash::file_hash;
pub use message::{ContentBlock, Message, Role};
pub use noise::{classify, NoiseKind};
pub use paths::{discover_transcripts, Paths};
pub use reader::{parse_timestamp, read_transcript, ArchivedLine, Transcript, TranscriptError};
