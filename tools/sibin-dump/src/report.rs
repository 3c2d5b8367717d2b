//! Human and JSON summaries of a decoded program binary.

use std::fmt;

use serde::Serialize;
use sibin_opengl::{
    EncodingDictionary, Info, Metadata, Output, ProgramBinary, ShaderBinary, UsageInfo,
};

/// Summary of a whole program binary.
#[derive(Debug, Clone, Serialize)]
pub struct ProgramReport {
    /// Program name.
    pub name: String,
    /// Number of embedded shaders.
    pub shader_count: usize,
    /// Per-shader summaries, in symbol table order.
    pub shaders: Vec<ShaderReport>,
}

/// Summary of one embedded shader.
#[derive(Debug, Clone, Serialize)]
pub struct ShaderReport {
    /// Symbol name.
    pub name: String,
    /// Stage name.
    pub stage: String,
    /// Raw `e_flags` of the embedded image.
    pub e_flags: u32,
    /// ISA location, absent if the shader has no `.text`.
    pub isa: Option<IsaReport>,
    /// Register usage from the stage header.
    pub registers: Option<RegisterReport>,
    /// Number of `.inputs` records.
    pub input_count: usize,
    /// `.outputs` records.
    pub outputs: Vec<OutputReport>,
    /// `.info` block.
    pub info: Option<InfoReport>,
    /// `.usageinfo` block.
    pub usage_info: Option<UsageReport>,
    /// Encoding dictionary.
    pub dictionary: Option<DictionaryReport>,
}

/// ISA location and leading words.
#[derive(Debug, Clone, Serialize)]
pub struct IsaReport {
    /// Offset of the ISA within `.text`.
    pub offset: usize,
    /// ISA length in bytes.
    pub len: usize,
    /// Leading 32-bit words.
    pub words: Vec<u32>,
}

/// Common header register fields.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterReport {
    /// Scalar registers.
    pub sgprs: u32,
    /// Vector registers.
    pub vgprs: u32,
    /// Header flags word.
    pub flags: u32,
    /// Number of user data elements.
    pub user_elements: usize,
}

/// One output record.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OutputReport {
    /// A named output.
    Named {
        /// Variable name.
        name: String,
        /// Data type id.
        data_type: u32,
        /// Array size.
        array_size: u32,
    },
    /// A built-in output.
    Unnamed {
        /// Output kind.
        output_type: u32,
        /// Export parameter offset.
        param_offset: u32,
        /// Array size.
        array_size: u32,
    },
}

/// `.info` counters.
#[derive(Debug, Clone, Serialize)]
pub struct InfoReport {
    /// ALU instructions.
    pub alu: u32,
    /// Fetch instructions.
    pub fetch: u32,
    /// Export instructions.
    pub export: u32,
    /// Scratch registers.
    pub scratch: u32,
}

/// `.usageinfo` masks.
#[derive(Debug, Clone, Serialize)]
pub struct UsageReport {
    /// Textures.
    pub textures: u32,
    /// Samplers.
    pub samplers: u32,
    /// Uniform buffers.
    pub uniform_buffers: u32,
    /// Storage buffers.
    pub storage_buffers: u32,
    /// Images.
    pub images: u32,
    /// Atomic counters.
    pub atomic_counters: u32,
    /// Clip distances.
    pub clip_distances: u32,
}

/// Encoding dictionary counts.
#[derive(Debug, Clone, Serialize)]
pub struct DictionaryReport {
    /// Whether the stage populates the dictionary.
    pub populated: bool,
    /// Scalar registers used.
    pub sgpr_used: u32,
    /// Vector registers used.
    pub vgpr_used: u32,
    /// User elements.
    pub user_elements: usize,
    /// Input semantic mappings.
    pub semantic_in: usize,
    /// Output semantic mappings.
    pub semantic_out: usize,
    /// Encoder inputs.
    pub inputs: usize,
}

impl ProgramReport {
    /// Build a report, keeping up to `isa_words` leading ISA words per shader.
    pub fn new(program: &ProgramBinary<'_>, isa_words: usize) -> Self {
        Self {
            name: program.name().to_string(),
            shader_count: program.len(),
            shaders: program
                .shaders()
                .iter()
                .map(|s| ShaderReport::new(s, isa_words))
                .collect(),
        }
    }
}

impl ShaderReport {
    fn new(shader: &ShaderBinary<'_>, isa_words: usize) -> Self {
        let isa = shader.isa().map(|isa| {
            let mut cursor = *isa;
            cursor.rewind();
            IsaReport {
                offset: isa.offset(),
                len: isa.len(),
                words: std::iter::from_fn(|| cursor.read_u32()).take(isa_words).collect(),
            }
        });

        Self {
            name: shader.name().to_string(),
            stage: shader.stage().to_string(),
            e_flags: shader.elf().flags(),
            isa,
            registers: registers(shader.metadata()),
            input_count: shader.inputs().len(),
            outputs: shader.outputs().iter().map(OutputReport::from).collect(),
            info: shader.info().map(InfoReport::from),
            usage_info: shader.usage_info().map(UsageReport::from),
            dictionary: shader
                .dictionary()
                .map(|d| DictionaryReport::new(d, shader)),
        }
    }
}

fn registers(metadata: &Metadata) -> Option<RegisterReport> {
    metadata.common().map(|c| RegisterReport {
        sgprs: c.sgpr_count,
        vgprs: c.vgpr_count,
        flags: c.flags.bits(),
        user_elements: c.user_elements.len(),
    })
}

impl From<&Output> for OutputReport {
    fn from(output: &Output) -> Self {
        match output {
            Output::Named {
                name,
                data_type,
                array_size,
            } => Self::Named {
                name: name.clone(),
                data_type: *data_type,
                array_size: *array_size,
            },
            Output::Unnamed {
                output_type,
                param_offset,
                array_size,
            } => Self::Unnamed {
                output_type: *output_type,
                param_offset: *param_offset,
                array_size: *array_size,
            },
        }
    }
}

impl From<&Info> for InfoReport {
    fn from(info: &Info) -> Self {
        Self {
            alu: info.alu_instruction_count,
            fetch: info.fetch_instruction_count,
            export: info.export_instruction_count,
            scratch: info.max_scratch_regs,
        }
    }
}

impl From<&UsageInfo> for UsageReport {
    fn from(usage: &UsageInfo) -> Self {
        Self {
            textures: usage.texture_mask,
            samplers: usage.sampler_mask,
            uniform_buffers: usage.uniform_buffer_mask,
            storage_buffers: usage.storage_buffer_mask,
            images: usage.image_mask,
            atomic_counters: usage.atomic_counter_mask,
            clip_distances: usage.clip_distance_mask,
        }
    }
}

impl DictionaryReport {
    fn new(dict: &EncodingDictionary, shader: &ShaderBinary<'_>) -> Self {
        Self {
            populated: EncodingDictionary::is_populated_for(shader.stage()),
            sgpr_used: dict.sgpr_used,
            vgpr_used: dict.vgpr_used,
            user_elements: dict.user_element_count(),
            semantic_in: dict.semantic_mapping_in_count(),
            semantic_out: dict.semantic_mapping_out_count(),
            inputs: dict.input_count(),
        }
    }
}

// ---------------------------------------------------------------------------
// Text rendering
// ---------------------------------------------------------------------------

impl fmt::Display for ProgramReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "program {}: {} shader(s)", self.name, self.shader_count)?;
        for (i, shader) in self.shaders.iter().enumerate() {
            write!(f, "\n[{i}] {shader}")?;
        }
        Ok(())
    }
}

impl fmt::Display for ShaderReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}  {} (e_flags {:#x})", self.name, self.stage, self.e_flags)?;

        match &self.isa {
            Some(isa) => writeln!(f, "    isa:        {} bytes at .text+{}", isa.len, isa.offset)?,
            None => writeln!(f, "    isa:        none")?,
        }
        if let Some(r) = &self.registers {
            writeln!(
                f,
                "    registers:  sgpr={} vgpr={} flags={:#x} user_elements={}",
                r.sgprs, r.vgprs, r.flags, r.user_elements
            )?;
        }
        writeln!(f, "    inputs:     {}", self.input_count)?;
        writeln!(f, "    outputs:    {}", self.outputs.len())?;
        for output in &self.outputs {
            match output {
                OutputReport::Named {
                    name,
                    data_type,
                    array_size,
                } => writeln!(f, "      {name} (type {data_type}, array {array_size})")?,
                OutputReport::Unnamed {
                    output_type,
                    param_offset,
                    array_size,
                } => writeln!(
                    f,
                    "      <unnamed> (kind {output_type}, param {param_offset}, array {array_size})"
                )?,
            }
        }
        if let Some(i) = &self.info {
            writeln!(
                f,
                "    info:       alu={} fetch={} export={} scratch={}",
                i.alu, i.fetch, i.export, i.scratch
            )?;
        }
        if let Some(u) = &self.usage_info {
            writeln!(
                f,
                "    usage:      tex={:#x} smp={:#x} ubo={:#x} ssbo={:#x} img={:#x} atomic={:#x} clip={:#x}",
                u.textures,
                u.samplers,
                u.uniform_buffers,
                u.storage_buffers,
                u.images,
                u.atomic_counters,
                u.clip_distances
            )?;
        }
        if let Some(d) = &self.dictionary {
            if d.populated {
                writeln!(
                    f,
                    "    dictionary: sgpr={} vgpr={} user={} in={} out={} inputs={}",
                    d.sgpr_used, d.vgpr_used, d.user_elements, d.semantic_in, d.semantic_out, d.inputs
                )?;
            } else {
                writeln!(f, "    dictionary: not populated for {}", self.stage)?;
            }
        }
        if let Some(isa) = self.isa.as_ref().filter(|isa| !isa.words.is_empty()) {
            write!(f, "    isa words: ")?;
            for word in &isa.words {
                write!(f, " {word:08x}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
