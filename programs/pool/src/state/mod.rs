//! Zero-copy account layouts
//!
//! Every account is `repr(C)` plain old data with explicit padding, so the
//! byte image is fully determined by the field values. That property is what
//! lets a delegation buffer be compared byte-for-byte with its entity.

pub mod delegation;
pub mod model_bridge;
pub mod pool;
pub mod provider;
pub mod receipt;

pub use delegation::*;
pub use pool::*;
pub use provider::*;
pub use receipt::*;

use pool_model::PoolError;

/// Current layout version for every account type
pub const ACCOUNT_VERSION: u8 = 1;

/// Fixed-layout account that can be viewed in place
///
/// # Safety
/// Implementors must be `repr(C)`, contain no implicit padding, and be valid
/// for every bit pattern (integers and byte arrays only).
pub unsafe trait ZeroCopy: Sized + Copy + 'static {
    /// First eight bytes of an initialized account
    const MAGIC: [u8; 8];

    const LEN: usize = core::mem::size_of::<Self>();

    fn magic(&self) -> [u8; 8];

    fn is_initialized(&self) -> bool {
        self.magic() == Self::MAGIC
    }

    fn zeroed() -> Self {
        // SAFETY: valid for all bit patterns per the trait contract
        unsafe { core::mem::zeroed() }
    }
}

/// View `data` as `&mut T` (length and alignment checked)
pub fn load_mut<T: ZeroCopy>(data: &mut [u8]) -> Result<&mut T, PoolError> {
    if data.len() < T::LEN || data.as_ptr().align_offset(core::mem::align_of::<T>()) != 0 {
        return Err(PoolError::InvalidAccount);
    }
    // SAFETY: size and alignment checked, T is plain old data
    Ok(unsafe { &mut *(data.as_mut_ptr() as *mut T) })
}

/// View `data` as `&T` (length and alignment checked)
pub fn load<T: ZeroCopy>(data: &[u8]) -> Result<&T, PoolError> {
    if data.len() < T::LEN || data.as_ptr().align_offset(core::mem::align_of::<T>()) != 0 {
        return Err(PoolError::InvalidAccount);
    }
    // SAFETY: size and alignment checked, T is plain old data
    Ok(unsafe { &*(data.as_ptr() as *const T) })
}

/// Copy an initialized `T` out of arbitrarily aligned bytes (RPC payloads)
pub fn read_from<T: ZeroCopy>(data: &[u8]) -> Option<T> {
    if data.len() < T::LEN || data[..8] != T::MAGIC {
        return None;
    }
    // SAFETY: length checked, read_unaligned tolerates any alignment
    Some(unsafe { core::ptr::read_unaligned(data.as_ptr() as *const T) })
}

/// Byte image of `value`
pub fn as_bytes<T: ZeroCopy>(value: &T) -> &[u8] {
    // SAFETY: T has no padding, every byte is initialized
    unsafe { core::slice::from_raw_parts(value as *const T as *const u8, T::LEN) }
}

/// Copy `s` into a fixed field, returning the stored length
pub fn write_str<const N: usize>(dst: &mut [u8; N], s: &str) -> Result<u8, PoolError> {
    let bytes = s.as_bytes();
    if bytes.len() > N || bytes.len() > u8::MAX as usize {
        return Err(PoolError::InvalidName);
    }
    dst.fill(0);
    dst[..bytes.len()].copy_from_slice(bytes);
    Ok(bytes.len() as u8)
}

/// Read back a string written by [`write_str`]
pub fn read_str<const N: usize>(src: &[u8; N], len: u8) -> Result<&str, PoolError> {
    let bytes = src.get(..len as usize).ok_or(PoolError::InvalidAccount)?;
    core::str::from_utf8(bytes).map_err(|_| PoolError::InvalidAccount)
}
