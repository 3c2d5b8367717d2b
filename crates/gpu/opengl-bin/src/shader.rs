//! A single embedded shader image and its decoded sections.

use alloc::string::{String, ToString};
use alloc::vec::Vec;

use sibin_core::{sb_debug, sb_warn};
use sibin_elf::{ElfFile, Section};

use crate::dict::EncodingDictionary;
use crate::error::DecodeError;
use crate::info::{Info, UsageInfo};
use crate::io::{Input, Output};
use crate::isa::IsaBuffer;
use crate::metadata::Metadata;
use crate::options::DecodeOptions;
use crate::stage::Stage;

/// One per-stage shader carved out of a program binary.
///
/// The metadata variant matches [`stage`](Self::stage) for vertex and
/// fragment shaders. Every other stage carries [`Metadata::Invalid`]. A
/// shader of [`Stage::Invalid`] carries only its ISA: no tables, no info
/// blocks and no dictionary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderBinary<'a> {
    name: String,
    elf: ElfFile<'a>,
    stage: Stage,
    isa: Option<IsaBuffer<'a>>,
    metadata: Metadata,
    inputs: Vec<Input>,
    outputs: Vec<Output>,
    info: Option<Info>,
    usage_info: Option<UsageInfo>,
    dictionary: Option<EncodingDictionary>,
}

impl<'a> ShaderBinary<'a> {
    /// Decodes an embedded shader image.
    ///
    /// # Errors
    ///
    /// [`DecodeError::NotElf`] if `buffer` is not an ELF image,
    /// [`DecodeError::MissingSection`] if a vertex or fragment shader has no
    /// `.text`, [`DecodeError::MalformedSection`] if a section it reads lies
    /// outside the image, and any error from the section decoders.
    pub fn decode(buffer: &'a [u8], name: &str, options: &DecodeOptions) -> Result<Self, DecodeError> {
        let elf = ElfFile::parse(buffer)?;
        let stage = Stage::from_flags(elf.flags());
        let text = elf.find_section_by_name(".text");

        let mut shader = Self {
            name: name.to_string(),
            elf,
            stage,
            isa: None,
            metadata: Metadata::Invalid,
            inputs: Vec::new(),
            outputs: Vec::new(),
            info: None,
            usage_info: None,
            dictionary: None,
        };

        if !stage.is_valid() {
            sb_debug!("{name}: unrecognized e_flags {:#x}, not decoding", elf.flags());
            shader.isa = text
                .and_then(|t| t.data)
                .map(|data| IsaBuffer::new(data, stage.isa_offset()));
            return Ok(shader);
        }

        let text = text.ok_or(DecodeError::MissingSection(".text"))?;
        let text = section_bytes(&text, ".text")?;
        shader.metadata = Metadata::decode(stage, text, options)?;

        let offset = stage.isa_offset();
        if text.len() < offset {
            sb_warn!(
                "{name}: .text is {} bytes, shorter than the {stage} ISA offset {offset}; ISA is empty",
                text.len()
            );
        }
        shader.isa = Some(IsaBuffer::new(text, offset));

        if let Some(sec) = elf.find_section_by_name(".inputs") {
            shader.inputs = Input::decode_table(section_bytes(&sec, ".inputs")?)?;
        }
        if let Some(sec) = elf.find_section_by_name(".outputs") {
            let data = section_bytes(&sec, ".outputs")?;
            shader.outputs = Output::decode_table(data, output_count(&sec)?)?;
        }
        if let Some(sec) = elf.find_section_by_name(".info") {
            shader.info = Some(Info::decode(section_bytes(&sec, ".info")?)?);
        }
        if let Some(sec) = elf.find_section_by_name(".usageinfo") {
            let data = section_bytes(&sec, ".usageinfo")?;
            shader.usage_info = Some(UsageInfo::decode(data, options)?);
        }

        shader.dictionary = Some(EncodingDictionary::build(&shader.metadata));

        sb_debug!(
            "{name}: {stage} shader, {} ISA bytes, {} inputs, {} outputs",
            shader.isa.map_or(0, |isa| isa.len()),
            shader.inputs.len(),
            shader.outputs.len()
        );
        Ok(shader)
    }

    /// Symbol name the shader was found under.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The embedded ELF image.
    #[must_use]
    pub fn elf(&self) -> &ElfFile<'a> {
        &self.elf
    }

    /// Pipeline stage.
    #[must_use]
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// ISA bytes, or `None` if an unrecognized shader has no `.text`.
    #[must_use]
    pub fn isa(&self) -> Option<&IsaBuffer<'a>> {
        self.isa.as_ref()
    }

    /// ISA bytes with a mutable read position.
    pub fn isa_mut(&mut self) -> Option<&mut IsaBuffer<'a>> {
        self.isa.as_mut()
    }

    /// Decoded stage header.
    #[must_use]
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// `.inputs` records, in file order.
    #[must_use]
    pub fn inputs(&self) -> &[Input] {
        &self.inputs
    }

    /// `.outputs` records, in file order.
    #[must_use]
    pub fn outputs(&self) -> &[Output] {
        &self.outputs
    }

    /// `.info` block, if present.
    #[must_use]
    pub fn info(&self) -> Option<&Info> {
        self.info.as_ref()
    }

    /// `.usageinfo` block, if present.
    #[must_use]
    pub fn usage_info(&self) -> Option<&UsageInfo> {
        self.usage_info.as_ref()
    }

    /// Encoding dictionary. `None` for [`Stage::Invalid`].
    #[must_use]
    pub fn dictionary(&self) -> Option<&EncodingDictionary> {
        self.dictionary.as_ref()
    }
}

fn section_bytes<'a>(sec: &Section<'a>, name: &'static str) -> Result<&'a [u8], DecodeError> {
    sec.data.ok_or(DecodeError::MalformedSection {
        section: name,
        reason: "section data lies outside the image",
    })
}

fn output_count(sec: &Section<'_>) -> Result<usize, DecodeError> {
    usize::try_from(sec.header.sh_entsize).map_err(|_| DecodeError::MalformedSection {
        section: ".outputs",
        reason: "record count does not fit in memory",
    })
}
