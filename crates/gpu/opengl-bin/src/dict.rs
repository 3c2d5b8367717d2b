//! Encoding dictionary: the stage-agnostic summary handed to an instruction
//! encoder.
//!
//! Only vertex shaders populate it. Every other stage gets an all-zero
//! dictionary with empty lists; use [`EncodingDictionary::is_populated_for`]
//! to tell the two apart.

use alloc::vec::Vec;

use crate::metadata::{InputSemantic, Metadata, OutputSemantic, UserElement, VertexMetadata};
use crate::stage::Stage;

/// Element type of an encoder input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum InputKind {
    /// Not yet determined.
    #[default]
    Unset,
    /// Signed integer components.
    Int,
    /// Unsigned integer components.
    Uint,
    /// Floating-point components.
    Float,
}

/// An encoder input slot. The dictionary only knows its position, so
/// everything except `usage_index` is left unset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct InputRef {
    /// Position of the input in the semantic table.
    pub usage_index: u32,
    /// Component type.
    pub kind: InputKind,
    /// Number of components.
    pub num_elems: u32,
    /// Whether the encoder should fetch this input.
    pub enabled: bool,
}

impl InputRef {
    /// An unset input at position `usage_index`.
    #[must_use]
    pub fn with_usage_index(usage_index: u32) -> Self {
        Self {
            usage_index,
            ..Self::default()
        }
    }
}

/// Register usage, user data and semantic mappings of one shader.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct EncodingDictionary {
    /// Scalar registers used.
    pub sgpr_used: u32,
    /// Vector registers used.
    pub vgpr_used: u32,
    /// Raw `SPI_SHADER_PGM_RSRC2_VS` word.
    pub pgm_rsrc2: u32,
    /// User data elements.
    pub user_elements: Vec<UserElement>,
    /// Input semantic mappings.
    pub semantic_mapping_in: Vec<InputSemantic>,
    /// Output semantic mappings.
    pub semantic_mapping_out: Vec<OutputSemantic>,
    /// One entry per input semantic.
    pub input_list: Vec<InputRef>,
}

impl EncodingDictionary {
    /// Builds the dictionary for a decoded header.
    #[must_use]
    pub fn build(metadata: &Metadata) -> Self {
        match metadata {
            Metadata::Vertex(vs) => Self::from_vertex(vs),
            Metadata::Fragment(_) | Metadata::Invalid => Self::default(),
        }
    }

    fn from_vertex(vs: &VertexMetadata) -> Self {
        Self {
            sgpr_used: vs.sgpr_count(),
            vgpr_used: vs.vgpr_count(),
            pgm_rsrc2: vs.pgm_rsrc2,
            user_elements: vs.common.user_elements.clone(),
            semantic_mapping_in: vs.input_semantics.clone(),
            semantic_mapping_out: vs.output_semantics.clone(),
            input_list: (0u32..)
                .take(vs.input_semantics.len())
                .map(InputRef::with_usage_index)
                .collect(),
        }
    }

    /// Returns `true` if [`build`](Self::build) fills in the dictionary for
    /// shaders of `stage`.
    #[must_use]
    pub const fn is_populated_for(stage: Stage) -> bool {
        matches!(stage, Stage::Vertex)
    }

    /// Number of user data elements.
    #[must_use]
    pub fn user_element_count(&self) -> usize {
        self.user_elements.len()
    }

    /// Number of input semantic mappings.
    #[must_use]
    pub fn semantic_mapping_in_count(&self) -> usize {
        self.semantic_mapping_in.len()
    }

    /// Number of output semantic mappings.
    #[must_use]
    pub fn semantic_mapping_out_count(&self) -> usize {
        self.semantic_mapping_out.len()
    }

    /// Number of encoder inputs.
    #[must_use]
    pub fn input_count(&self) -> usize {
        self.input_list.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::FragmentMetadata;
    use crate::options::DecodeOptions;
    use crate::testutil::{FragmentHeaderBuilder, VertexHeaderBuilder};

    fn semantic(usage: u32, data_vgpr: u32) -> InputSemantic {
        InputSemantic {
            usage,
            usage_index: 0,
            data_vgpr,
            data_size: 4,
        }
    }

    #[test]
    fn vertex_dictionary_copies_metadata() {
        let text = VertexHeaderBuilder::new()
            .registers(16, 8)
            .pgm_rsrc2(0x1234)
            .user_element(UserElement {
                data_class: 0,
                api_slot: 0,
                start_user_reg: 2,
                user_reg_count: 4,
            })
            .input_semantic(semantic(0, 4))
            .input_semantic(semantic(1, 8))
            .input_semantic(semantic(2, 12))
            .output_semantic(OutputSemantic {
                usage: 0,
                usage_index: 0,
                param_index: 0,
            })
            .build();
        let metadata = Metadata::Vertex(alloc::boxed::Box::new(VertexMetadata::decode(&text).unwrap()));

        let dict = EncodingDictionary::build(&metadata);
        assert_eq!(dict.sgpr_used, 16);
        assert_eq!(dict.vgpr_used, 8);
        assert_eq!(dict.pgm_rsrc2, 0x1234);
        assert_eq!(dict.user_element_count(), 1);
        assert_eq!(dict.user_elements[0].start_user_reg, 2);
        assert_eq!(dict.semantic_mapping_in_count(), 3);
        assert_eq!(dict.semantic_mapping_in[2].data_vgpr, 12);
        assert_eq!(dict.semantic_mapping_out_count(), 1);
        assert_eq!(dict.input_count(), 3);
        for (i, input) in (0u32..).zip(&dict.input_list) {
            assert_eq!(*input, InputRef::with_usage_index(i));
            assert_eq!(input.kind, InputKind::Unset);
            assert!(!input.enabled);
        }
    }

    #[test]
    fn non_vertex_dictionaries_are_empty() {
        let text = FragmentHeaderBuilder::new().registers(24, 12).build();
        let fs = FragmentMetadata::decode(&text, &DecodeOptions::default()).unwrap();
        let dict = EncodingDictionary::build(&Metadata::Fragment(alloc::boxed::Box::new(fs)));
        assert_eq!(dict, EncodingDictionary::default());
        assert_eq!(dict.sgpr_used, 0);
        assert_eq!(dict.input_count(), 0);

        // Geometry has no decoded header.
        assert_eq!(EncodingDictionary::build(&Metadata::Invalid), EncodingDictionary::default());
    }

    #[test]
    fn only_vertex_is_populated() {
        assert!(EncodingDictionary::is_populated_for(Stage::Vertex));
        assert!(!EncodingDictionary::is_populated_for(Stage::Fragment));
        assert!(!EncodingDictionary::is_populated_for(Stage::Geometry));
        assert!(!EncodingDictionary::is_populated_for(Stage::Invalid));
    }
}
