//! Bounds-checked little-endian byte cursor.
//!
//! Every read checks the remaining length first and returns `None` instead
//! of reading past the end, leaving the position unchanged on failure.

/// A read cursor over a borrowed byte slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    /// Creates a cursor positioned at the start of `data`.
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Returns the current byte offset.
    #[must_use]
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Returns the number of unread bytes.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Returns `true` if every byte has been consumed.
    #[must_use]
    pub fn is_at_end(&self) -> bool {
        self.pos == self.data.len()
    }

    /// Returns the whole underlying slice.
    #[must_use]
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Moves the cursor to `pos`. Returns `None` if `pos` is past the end.
    pub fn seek(&mut self, pos: usize) -> Option<()> {
        if pos > self.data.len() {
            return None;
        }
        self.pos = pos;
        Some(())
    }

    /// Advances the cursor by `n` bytes.
    pub fn skip(&mut self, n: usize) -> Option<()> {
        self.read_bytes(n).map(|_| ())
    }

    /// Returns the next byte without consuming it.
    #[must_use]
    pub fn peek_u8(&self) -> Option<u8> {
        self.data.get(self.pos).copied()
    }

    /// Reads `n` raw bytes.
    pub fn read_bytes(&mut self, n: usize) -> Option<&'a [u8]> {
        let end = self.pos.checked_add(n)?;
        let bytes = self.data.get(self.pos..end)?;
        self.pos = end;
        Some(bytes)
    }

    /// Reads a fixed-size array.
    pub fn read_array<const N: usize>(&mut self) -> Option<[u8; N]> {
        let bytes = self.read_bytes(N)?;
        bytes.try_into().ok()
    }

    /// Reads one byte.
    pub fn read_u8(&mut self) -> Option<u8> {
        self.read_array::<1>().map(|[b]| b)
    }

    /// Reads a little-endian `u16`.
    pub fn read_u16(&mut self) -> Option<u16> {
        self.read_array().map(u16::from_le_bytes)
    }

    /// Reads a little-endian `u32`.
    pub fn read_u32(&mut self) -> Option<u32> {
        self.read_array().map(u32::from_le_bytes)
    }

    /// Reads a little-endian `u64`.
    pub fn read_u64(&mut self) -> Option<u64> {
        self.read_array().map(u64::from_le_bytes)
    }

    /// Reads `N` consecutive little-endian `u32` words.
    pub fn read_u32_array<const N: usize>(&mut self) -> Option<[u32; N]> {
        let start = self.pos;
        let mut out = [0u32; N];
        for word in &mut out {
            let Some(w) = self.read_u32() else {
                self.pos = start;
                return None;
            };
            *word = w;
        }
        Some(out)
    }

    /// Reads a NUL-terminated byte string, consuming the terminator.
    ///
    /// The returned slice excludes the terminator. Returns `None` if no
    /// terminator occurs before the end of the data.
    pub fn read_cstr(&mut self) -> Option<&'a [u8]> {
        let rest = &self.data[self.pos..];
        let nul = rest.iter().position(|&b| b == 0)?;
        self.pos += nul + 1;
        Some(&rest[..nul])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_little_endian_values() {
        let data = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09];
        let mut r = ByteReader::new(&data);
        assert_eq!(r.read_u8(), Some(0x01));
        assert_eq!(r.read_u16(), Some(0x0302));
        assert_eq!(r.read_u32(), Some(0x0706_0504));
        assert_eq!(r.position(), 7);
        assert_eq!(r.remaining(), 2);
        assert_eq!(r.read_u32(), None);
        // A failed read leaves the position alone.
        assert_eq!(r.position(), 7);
    }

    #[test]
    fn reads_u64() {
        let data = 0x1122_3344_5566_7788u64.to_le_bytes();
        let mut r = ByteReader::new(&data);
        assert_eq!(r.read_u64(), Some(0x1122_3344_5566_7788));
        assert!(r.is_at_end());
    }

    #[test]
    fn word_array_is_all_or_nothing() {
        let mut data = Vec::new();
        for w in [1u32, 2, 3] {
            data.extend_from_slice(&w.to_le_bytes());
        }
        let mut r = ByteReader::new(&data);
        assert_eq!(r.read_u32_array::<4>(), None);
        assert_eq!(r.position(), 0);
        assert_eq!(r.read_u32_array::<3>(), Some([1, 2, 3]));
    }

    #[test]
    fn cstr_consumes_terminator() {
        let mut r = ByteReader::new(b"color\0\0tail");
        assert_eq!(r.read_cstr(), Some(&b"color"[..]));
        assert_eq!(r.position(), 6);
        assert_eq!(r.peek_u8(), Some(0));
        assert_eq!(r.read_cstr(), Some(&b""[..]));
        assert_eq!(r.read_cstr(), None);
        assert_eq!(r.position(), 7);
    }

    #[test]
    fn seek_and_skip_are_bounded() {
        let data = [0u8; 4];
        let mut r = ByteReader::new(&data);
        assert_eq!(r.skip(3), Some(()));
        assert_eq!(r.skip(2), None);
        assert_eq!(r.seek(4), Some(()));
        assert!(r.is_at_end());
        assert_eq!(r.seek(5), None);
        assert_eq!(r.peek_u8(), None);
    }
}
