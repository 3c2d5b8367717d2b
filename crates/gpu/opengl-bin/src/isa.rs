//! Read cursor over a shader's ISA bytes.

use sibin_core::ByteReader;

/// The instruction bytes of a shader: the part of `.text` after the stage
/// header, with a read position.
///
/// The bytes are borrowed from the program buffer and never interpreted
/// here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IsaBuffer<'a> {
    data: &'a [u8],
    offset: usize,
    pos: usize,
}

impl<'a> IsaBuffer<'a> {
    /// Carves the ISA out of `text`, starting at `offset`.
    ///
    /// If `text` ends before `offset` the buffer is empty.
    #[must_use]
    pub fn new(text: &'a [u8], offset: usize) -> Self {
        Self {
            data: text.get(offset..).unwrap_or(&[]),
            offset,
            pos: 0,
        }
    }

    /// All ISA bytes, independent of the read position.
    #[must_use]
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Byte offset of the ISA within `.text`.
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Total ISA length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns `true` if the shader has no instruction bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Current read position, relative to the start of the ISA.
    #[must_use]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left after the read position.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Reads the next 32-bit instruction word.
    pub fn read_u32(&mut self) -> Option<u32> {
        self.read_with(ByteReader::read_u32)
    }

    /// Reads the next 64-bit instruction word.
    pub fn read_u64(&mut self) -> Option<u64> {
        self.read_with(ByteReader::read_u64)
    }

    /// Moves the read position to `pos`. Returns `None` if `pos` is past
    /// the end.
    pub fn seek(&mut self, pos: usize) -> Option<()> {
        if pos > self.data.len() {
            return None;
        }
        self.pos = pos;
        Some(())
    }

    /// Moves the read position back to the start.
    pub fn rewind(&mut self) {
        self.pos = 0;
    }

    /// Returns a cursor over the unread bytes.
    #[must_use]
    pub fn reader(&self) -> ByteReader<'a> {
        ByteReader::new(&self.data[self.pos..])
    }

    fn read_with<T>(&mut self, read: impl FnOnce(&mut ByteReader<'a>) -> Option<T>) -> Option<T> {
        let mut r = self.reader();
        let value = read(&mut r)?;
        self.pos += r.position();
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn carves_after_offset() {
        let text = [0u8, 1, 2, 3, 4, 5, 6, 7, 8, 9];
        let isa = IsaBuffer::new(&text, 4);
        assert_eq!(isa.data(), &[4, 5, 6, 7, 8, 9]);
        assert_eq!(isa.offset(), 4);
        assert_eq!(isa.len(), 6);
        assert_eq!(isa.remaining(), 6);
    }

    #[test]
    fn text_shorter_than_offset_is_empty() {
        let isa = IsaBuffer::new(&[1, 2, 3], 8);
        assert!(isa.is_empty());
        assert_eq!(isa.offset(), 8);
        assert_eq!(IsaBuffer::new(&[1, 2, 3], 3).len(), 0);
    }

    #[test]
    fn reads_advance_and_rewind() {
        let mut text = Vec::new();
        text.extend_from_slice(&0xbf81_0000u32.to_le_bytes());
        text.extend_from_slice(&0x1122_3344_5566_7788u64.to_le_bytes());
        text.extend_from_slice(&[0xaa, 0xbb]);

        let mut isa = IsaBuffer::new(&text, 0);
        assert_eq!(isa.read_u32(), Some(0xbf81_0000));
        assert_eq!(isa.read_u64(), Some(0x1122_3344_5566_7788));
        assert_eq!(isa.position(), 12);
        assert_eq!(isa.remaining(), 2);
        assert_eq!(isa.read_u32(), None);
        assert_eq!(isa.position(), 12);

        isa.rewind();
        assert_eq!(isa.remaining(), 14);
        assert_eq!(isa.seek(12), Some(()));
        assert_eq!(isa.reader().read_u16(), Some(0xbbaa));
        assert_eq!(isa.seek(15), None);
    }
}
