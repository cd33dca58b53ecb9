use super::ClassParseError;

/// Big-endian cursor over a class file.
pub(super) struct ClassReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ClassReader<'a> {
    pub(super) fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub(super) fn position(&self) -> usize {
        self.pos
    }

    pub(super) fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub(super) fn read_u1(&mut self) -> Result<u8, ClassParseError> {
        let [value] = self.read_array::<1>()?;
        Ok(value)
    }

    pub(super) fn read_u2(&mut self) -> Result<u16, ClassParseError> {
        Ok(u16::from_be_bytes(self.read_array::<2>()?))
    }

    pub(super) fn read_u4(&mut self) -> Result<u32, ClassParseError> {
        Ok(u32::from_be_bytes(self.read_array::<4>()?))
    }

    pub(super) fn read_slice(&mut self, len: usize) -> Result<&'a [u8], ClassParseError> {
        if len > self.remaining() {
            return Err(ClassParseError::UnexpectedEof {
                offset: self.pos,
                needed: len,
            });
        }
        let slice = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    pub(super) fn skip(&mut self, len: usize) -> Result<(), ClassParseError> {
        self.read_slice(len).map(|_| ())
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], ClassParseError> {
        let slice = self.read_slice(N)?;
        let mut bytes = [0u8; N];
        bytes.copy_from_slice(slice);
        Ok(bytes)
    }
}
