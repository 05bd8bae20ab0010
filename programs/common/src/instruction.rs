//! Instruction data deserialization helpers
//!
//! All reads are bounds checked and fail with `InvalidInstruction`.

use pool_model::PoolError;

#[inline]
pub fn read_u8(data: &[u8], offset: usize) -> Result<u8, PoolError> {
    data.get(offset).copied().ok_or(PoolError::InvalidInstruction)
}

/// Read a u16 (little-endian)
#[inline]
pub fn read_u16(data: &[u8], offset: usize) -> Result<u16, PoolError> {
    Ok(u16::from_le_bytes(read_bytes::<2>(data, offset)?))
}

/// Read a u32 (little-endian)
#[inline]
pub fn read_u32(data: &[u8], offset: usize) -> Result<u32, PoolError> {
    Ok(u32::from_le_bytes(read_bytes::<4>(data, offset)?))
}

/// Read a u64 (little-endian)
#[inline]
pub fn read_u64(data: &[u8], offset: usize) -> Result<u64, PoolError> {
    Ok(u64::from_le_bytes(read_bytes::<8>(data, offset)?))
}

/// Read a fixed-size byte array
#[inline]
pub fn read_bytes<const N: usize>(data: &[u8], offset: usize) -> Result<[u8; N], PoolError> {
    let end = offset.checked_add(N).ok_or(PoolError::InvalidInstruction)?;
    let slice = data.get(offset..end).ok_or(PoolError::InvalidInstruction)?;
    let mut bytes = [0u8; N];
    bytes.copy_from_slice(slice);
    Ok(bytes)
}

/// Instruction data reader with tracked offset
pub struct InstructionReader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> InstructionReader<'a> {
    #[inline]
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.offset)
    }

    #[inline]
    pub fn read_u8(&mut self) -> Result<u8, PoolError> {
        let val = read_u8(self.data, self.offset)?;
        self.offset += 1;
        Ok(val)
    }

    #[inline]
    pub fn read_bool(&mut self) -> Result<bool, PoolError> {
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            _ => Err(PoolError::InvalidInstruction),
        }
    }

    #[inline]
    pub fn read_u16(&mut self) -> Result<u16, PoolError> {
        let val = read_u16(self.data, self.offset)?;
        self.offset += 2;
        Ok(val)
    }

    #[inline]
    pub fn read_u32(&mut self) -> Result<u32, PoolError> {
        let val = read_u32(self.data, self.offset)?;
        self.offset += 4;
        Ok(val)
    }

    #[inline]
    pub fn read_u64(&mut self) -> Result<u64, PoolError> {
        let val = read_u64(self.data, self.offset)?;
        self.offset += 8;
        Ok(val)
    }

    #[inline]
    pub fn read_bytes<const N: usize>(&mut self) -> Result<[u8; N], PoolError> {
        let val = read_bytes(self.data, self.offset)?;
        self.offset += N;
        Ok(val)
    }

    /// Read a 32-byte pubkey
    #[inline]
    pub fn read_pubkey(&mut self) -> Result<[u8; 32], PoolError> {
        self.read_bytes::<32>()
    }

    /// Borrow the next `len` bytes
    pub fn read_slice(&mut self, len: usize) -> Result<&'a [u8], PoolError> {
        let end = self.offset.checked_add(len).ok_or(PoolError::InvalidInstruction)?;
        let slice = self
            .data
            .get(self.offset..end)
            .ok_or(PoolError::InvalidInstruction)?;
        self.offset = end;
        Ok(slice)
    }

    /// Read a u8 length-prefixed UTF-8 string
    pub fn read_str(&mut self) -> Result<&'a str, PoolError> {
        let len = self.read_u8()? as usize;
        let bytes = self.read_slice(len)?;
        core::str::from_utf8(bytes).map_err(|_| PoolError::InvalidInstruction)
    }
}
