//! Builders for synthetic shader and program images.

use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;

use sibin_elf::{ElfClass, ElfWriter, SHT_PROGBITS};

use crate::metadata::{
    FragmentInputSemantic, FragmentMetadata, InputSemantic, OutputSemantic, UserElement,
    VertexMetadata,
};

fn put(buf: &mut [u8], offset: usize, value: u32) {
    buf[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

fn put_all(buf: &mut [u8], offset: usize, values: &[u32]) {
    for (i, &v) in values.iter().enumerate() {
        put(buf, offset + i * 4, v);
    }
}

/// Little-endian encoding of `values`.
pub(crate) fn words(values: &[u32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

/// One 28-byte `.inputs` record.
pub(crate) fn input_record(input_type: u32, vertex_offset: u32, param_offset: u32, swizzles: [u32; 4]) -> Vec<u8> {
    let mut rec = words(&[input_type, vertex_offset, param_offset]);
    rec.extend_from_slice(&words(&swizzles));
    rec
}

/// A named `.outputs` record.
pub(crate) fn named_output(name: &str, data_type: u32, array_size: u32) -> Vec<u8> {
    let mut rec = words(&[0, 0, data_type, array_size]);
    rec.extend_from_slice(name.as_bytes());
    rec.push(0);
    rec
}

/// An unnamed `.outputs` record.
pub(crate) fn unnamed_output(output_type: u32, param_offset: u32, array_size: u32) -> Vec<u8> {
    let mut rec = words(&[output_type, param_offset, 0, array_size]);
    rec.push(0);
    rec
}

// ---------------------------------------------------------------------------
// Stage headers
// ---------------------------------------------------------------------------

/// Common-prefix fields shared by both header builders.
#[derive(Default)]
struct Common {
    sgpr: u32,
    vgpr: u32,
    flags: u32,
    user_elements: Vec<UserElement>,
}

impl Common {
    fn write(&self, buf: &mut [u8], size: usize) {
        put(buf, 0, u32::try_from(size).unwrap());
        put(buf, 8, u32::try_from(self.user_elements.len()).unwrap());
        for (i, ue) in self.user_elements.iter().enumerate() {
            put_all(
                buf,
                12 + i * 16,
                &[ue.data_class, ue.api_slot, ue.start_user_reg, ue.user_reg_count],
            );
        }
        put(buf, 268, self.vgpr);
        put(buf, 272, self.sgpr);
        put(buf, 280, self.flags);
    }
}

/// Builds a 2124-byte vertex header.
#[derive(Default)]
pub(crate) struct VertexHeaderBuilder {
    common: Common,
    inputs: Vec<InputSemantic>,
    outputs: Vec<OutputSemantic>,
    pgm_rsrc2: u32,
}

impl VertexHeaderBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn registers(mut self, sgpr: u32, vgpr: u32) -> Self {
        self.common.sgpr = sgpr;
        self.common.vgpr = vgpr;
        self
    }

    pub(crate) fn flags(mut self, flags: u32) -> Self {
        self.common.flags = flags;
        self
    }

    pub(crate) fn user_element(mut self, ue: UserElement) -> Self {
        self.common.user_elements.push(ue);
        self
    }

    pub(crate) fn input_semantic(mut self, sem: InputSemantic) -> Self {
        self.inputs.push(sem);
        self
    }

    pub(crate) fn output_semantic(mut self, sem: OutputSemantic) -> Self {
        self.outputs.push(sem);
        self
    }

    pub(crate) fn pgm_rsrc2(mut self, value: u32) -> Self {
        self.pgm_rsrc2 = value;
        self
    }

    pub(crate) fn build(&self) -> Vec<u8> {
        let mut buf = vec![0u8; VertexMetadata::SIZE];
        self.common.write(&mut buf, VertexMetadata::SIZE);
        put(&mut buf, 284, u32::try_from(self.inputs.len()).unwrap());
        for (i, s) in self.inputs.iter().enumerate() {
            put_all(&mut buf, 288 + i * 16, &[s.usage, s.usage_index, s.data_vgpr, s.data_size]);
        }
        put(&mut buf, 800, u32::try_from(self.outputs.len()).unwrap());
        for (i, s) in self.outputs.iter().enumerate() {
            put_all(&mut buf, 804 + i * 12, &[s.usage, s.usage_index, s.param_index]);
        }
        put(&mut buf, 1188, self.pgm_rsrc2);
        buf
    }
}

/// Builds a 3436-byte fragment header.
#[derive(Default)]
pub(crate) struct FragmentHeaderBuilder {
    common: Common,
    inputs: Vec<FragmentInputSemantic>,
    pgm_rsrc2: u32,
}

impl FragmentHeaderBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn registers(mut self, sgpr: u32, vgpr: u32) -> Self {
        self.common.sgpr = sgpr;
        self.common.vgpr = vgpr;
        self
    }

    pub(crate) fn input_semantic(mut self, sem: FragmentInputSemantic) -> Self {
        self.inputs.push(sem);
        self
    }

    pub(crate) fn pgm_rsrc2(mut self, value: u32) -> Self {
        self.pgm_rsrc2 = value;
        self
    }

    pub(crate) fn build(&self) -> Vec<u8> {
        let mut buf = vec![0u8; FragmentMetadata::SIZE];
        self.common.write(&mut buf, FragmentMetadata::SIZE);
        put(&mut buf, 284, u32::try_from(self.inputs.len()).unwrap());
        for (i, s) in self.inputs.iter().enumerate() {
            put_all(&mut buf, 288 + i * 16, &[s.usage, s.usage_index, s.input_index, s.interp_mode]);
        }
        put(&mut buf, 928, self.pgm_rsrc2);
        buf
    }
}

// ---------------------------------------------------------------------------
// ELF images
// ---------------------------------------------------------------------------

/// Builds an embedded shader ELF with the given `e_flags`.
pub(crate) struct ShaderImage {
    writer: ElfWriter,
}

impl ShaderImage {
    pub(crate) fn new(e_flags: u32) -> Self {
        let mut writer = ElfWriter::new(ElfClass::Elf32);
        writer.flags(e_flags);
        Self { writer }
    }

    fn section(mut self, name: &str, data: &[u8], entsize: u64) -> Self {
        self.writer.section(name, SHT_PROGBITS, data, entsize);
        self
    }

    pub(crate) fn text(self, data: &[u8]) -> Self {
        self.section(".text", data, 0)
    }

    pub(crate) fn inputs(self, data: &[u8]) -> Self {
        self.section(".inputs", data, 0)
    }

    /// `.outputs` carries its record count in `sh_entsize`.
    pub(crate) fn outputs(self, data: &[u8], count: u64) -> Self {
        self.section(".outputs", data, count)
    }

    pub(crate) fn info(self, data: &[u8]) -> Self {
        self.section(".info", data, 0)
    }

    pub(crate) fn usage_info(self, data: &[u8]) -> Self {
        self.section(".usageinfo", data, 0)
    }

    pub(crate) fn build(&self) -> Vec<u8> {
        self.writer.finish()
    }
}

/// Builds a host program ELF: one `.data` section holding every embedded
/// image back to back, with one symbol per image.
#[derive(Default)]
pub(crate) struct ProgramImage {
    // (symbol name, image bytes); `None` for a symbol with no image
    entries: Vec<(String, Option<Vec<u8>>)>,
}

impl ProgramImage {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn shader(mut self, name: &str, image: &[u8]) -> Self {
        self.entries.push((name.into(), Some(image.to_vec())));
        self
    }

    /// Adds a zero-sized symbol that does not point at a shader.
    pub(crate) fn symbol(mut self, name: &str) -> Self {
        self.entries.push((name.into(), None));
        self
    }

    pub(crate) fn build(&self) -> Vec<u8> {
        let mut data = Vec::new();
        let mut spans = Vec::new();
        for (_, image) in &self.entries {
            let image = image.as_deref().unwrap_or(&[]);
            spans.push((data.len() as u64, image.len() as u64));
            data.extend_from_slice(image);
        }

        let mut w = ElfWriter::new(ElfClass::Elf32);
        let shndx = w.section(".data", SHT_PROGBITS, &data, 0);
        for ((name, _), (value, size)) in self.entries.iter().zip(spans) {
            w.symbol(name, shndx, value, size);
        }
        w.finish()
    }
}
