//! Decoder for Southern Islands OpenGL program binaries.
//!
//! A program binary is an ELF image whose symbol table points at one or
//! more embedded per-stage shader ELF images (symbols ending in
//! `ElfBinary_0_`). Each shader is classified by its `e_flags`, its stage
//! header is decoded from the start of `.text`, and its `.inputs`,
//! `.outputs`, `.info` and `.usageinfo` sections are decoded. Vertex
//! shaders additionally get an [`EncodingDictionary`] for an instruction
//! encoder.
//!
//! # Usage
//!
//! ```no_run
//! use sibin_opengl::{ProgramBinary, Stage};
//!
//! fn summarize(bytes: &[u8]) -> Result<(), sibin_opengl::DecodeError> {
//!     let program = ProgramBinary::create(bytes, "shader.bin")?;
//!     for shader in program.shaders_by_stage(Stage::Vertex) {
//!         let isa_len = shader.isa().map_or(0, |isa| isa.len());
//!         let _ = (shader.name(), isa_len);
//!     }
//!     Ok(())
//! }
//! ```

#![cfg_attr(not(test), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

pub mod dict;
pub mod error;
pub mod info;
pub mod io;
pub mod isa;
pub mod metadata;
pub mod options;
pub mod program;
pub mod shader;
pub mod stage;

#[cfg(test)]
pub(crate) mod testutil;

pub use dict::{EncodingDictionary, InputKind, InputRef};
pub use error::DecodeError;
pub use info::{Info, UsageInfo};
pub use io::{Input, Output};
pub use isa::IsaBuffer;
pub use metadata::{
    CommonHeader, FragmentInputSemantic, FragmentMetadata, InputSemantic, Metadata,
    OutputSemantic, ShaderFlags, UserElement, VertexMetadata,
};
pub use options::DecodeOptions;
pub use program::{ProgramBinary, SHADER_SYMBOL_SUFFIX};
pub use shader::ShaderBinary;
pub use stage::Stage;
