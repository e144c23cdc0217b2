//! State entity encode/decode with path-tracked diagnostics (spec §4.6
//! "State Codec").

mod entities;
mod reader;
mod writer;

pub use entities::*;
pub use reader::Reader;
pub use writer::Writer;

use thiserror::Error;

/// One frame of the path a decoder was in when it failed.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Frame {
    Component(&'static str),
    Field(&'static str),
    Index(usize),
}

impl std::fmt::Display for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Frame::Component(name) => write!(f, "{name}"),
            Frame::Field(name) => write!(f, ".{name}"),
            Frame::Index(i) => write!(f, "[{i}]"),
        }
    }
}

/// Tracks which component/field/array-index a decoder is currently inside,
/// so a failure can be reported with a precise path (spec §4.6: "All
/// decoders accept a mutable DecodingContext that carries a stack of
/// frames").
#[derive(Debug, Clone, Default)]
pub struct DecodingContext {
    frames: Vec<Frame>,
}

impl DecodingContext {
    pub fn new() -> DecodingContext {
        DecodingContext { frames: Vec::new() }
    }

    fn path(&self) -> String {
        self.frames.iter().map(Frame::to_string).collect()
    }

    /// Run `f` with `frame` pushed onto the path stack, popping it on the way
    /// out regardless of whether `f` failed.
    fn scoped<T>(
        &mut self,
        frame: Frame,
        f: impl FnOnce(&mut Self) -> Result<T, StateCodecError>,
    ) -> Result<T, StateCodecError> {
        self.frames.push(frame);
        let result = f(self);
        self.frames.pop();
        result
    }

    pub fn component<T>(
        &mut self,
        name: &'static str,
        f: impl FnOnce(&mut Self) -> Result<T, StateCodecError>,
    ) -> Result<T, StateCodecError> {
        self.scoped(Frame::Component(name), f)
    }

    pub fn field<T>(
        &mut self,
        name: &'static str,
        f: impl FnOnce(&mut Self) -> Result<T, StateCodecError>,
    ) -> Result<T, StateCodecError> {
        self.scoped(Frame::Field(name), f)
    }

    pub fn index<T>(
        &mut self,
        i: usize,
        f: impl FnOnce(&mut Self) -> Result<T, StateCodecError>,
    ) -> Result<T, StateCodecError> {
        self.scoped(Frame::Index(i), f)
    }

    pub fn end_of_stream(&self) -> StateCodecError {
        StateCodecError {
            path: self.path(),
            kind: StateCodecErrorKind::EndOfStream,
        }
    }

    pub fn invalid_format(&self) -> StateCodecError {
        StateCodecError {
            path: self.path(),
            kind: StateCodecErrorKind::InvalidFormat,
        }
    }

    pub fn invalid_value(&self) -> StateCodecError {
        StateCodecError {
            path: self.path(),
            kind: StateCodecErrorKind::InvalidValue,
        }
    }

    pub fn invalid_state_type(&self, tag: u64) -> StateCodecError {
        StateCodecError {
            path: self.path(),
            kind: StateCodecErrorKind::InvalidStateType(tag),
        }
    }

    pub fn out_of_memory(&self) -> StateCodecError {
        StateCodecError {
            path: self.path(),
            kind: StateCodecErrorKind::OutOfMemory,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateCodecErrorKind {
    EndOfStream,
    InvalidFormat,
    InvalidValue,
    OutOfMemory,
    InvalidStateType(u64),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{path}: {kind:?}")]
pub struct StateCodecError {
    pub path: String,
    pub kind: StateCodecErrorKind,
}
