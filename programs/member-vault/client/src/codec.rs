//! Little-endian primitives for instruction and account data.
//!
//! Every decoder takes the buffer and a byte offset and returns the value
//! together with the offset just past it. Bounds are checked before each
//! read, so a short buffer always yields [`VaultClientError::OutOfBounds`]
//! instead of a panic.

use crate::address::Address;
use crate::error::{VaultClientError, VaultResult};

/// Borrow `needed` bytes at `offset`, or fail with `OutOfBounds`.
fn take(buf: &[u8], offset: usize, needed: usize) -> VaultResult<&[u8]> {
    let out_of_bounds = VaultClientError::OutOfBounds {
        offset,
        needed,
        len: buf.len(),
    };
    let end = offset.checked_add(needed).ok_or(out_of_bounds.clone())?;
    buf.get(offset..end).ok_or(out_of_bounds)
}

pub fn encode_u32_le(n: u32) -> [u8; 4] {
    n.to_le_bytes()
}

pub fn decode_u32_le(buf: &[u8], offset: usize) -> VaultResult<(u32, usize)> {
    let bytes = take(buf, offset, 4)?;
    let mut array = [0u8; 4];
    array.copy_from_slice(bytes);
    Ok((u32::from_le_bytes(array), offset + 4))
}

pub fn encode_u64_le(n: u64) -> [u8; 8] {
    n.to_le_bytes()
}

pub fn decode_u64_le(buf: &[u8], offset: usize) -> VaultResult<(u64, usize)> {
    let bytes = take(buf, offset, 8)?;
    let mut array = [0u8; 8];
    array.copy_from_slice(bytes);
    Ok((u64::from_le_bytes(array), offset + 8))
}

pub fn decode_u8(buf: &[u8], offset: usize) -> VaultResult<(u8, usize)> {
    let bytes = take(buf, offset, 1)?;
    Ok((bytes[0], offset + 1))
}

pub fn encode_address(address: &Address) -> [u8; 32] {
    address.to_bytes()
}

pub fn decode_address(buf: &[u8], offset: usize) -> VaultResult<(Address, usize)> {
    let bytes = take(buf, offset, Address::LEN)?;
    let mut array = [0u8; 32];
    array.copy_from_slice(bytes);
    Ok((Address::new_from_array(array), offset + Address::LEN))
}

/// `u32` length prefix followed by each encoded item.
///
/// The prefix cannot count past `u32::MAX`; items beyond that are not
/// written, so the output always decodes to its declared count.
pub fn encode_sequence<T, F, B>(items: &[T], encode_item: F) -> Vec<u8>
where
    F: Fn(&T) -> B,
    B: AsRef<[u8]>,
{
    let len = u32::try_from(items.len()).unwrap_or(u32::MAX);
    let mut out = Vec::with_capacity(4);
    out.extend_from_slice(&encode_u32_le(len));
    for item in items.iter().take(len as usize) {
        out.extend_from_slice(encode_item(item).as_ref());
    }
    out
}

/// Read a `u32` length prefix, then that many `item_size` byte items.
///
/// `item_size` must be nonzero: every item consumes input, so a forged
/// prefix runs out of buffer instead of looping.
pub fn decode_sequence<T, F>(
    buf: &[u8],
    offset: usize,
    item_size: usize,
    decode_item: F,
) -> VaultResult<(Vec<T>, usize)>
where
    F: Fn(&[u8], usize) -> VaultResult<(T, usize)>,
{
    if item_size == 0 {
        return Err(VaultClientError::ZeroItemSize);
    }
    let (len, mut offset) = decode_u32_le(buf, offset)?;
    let len = len as usize;

    // A hostile length prefix must not drive the allocation.
    let remaining = buf.len().saturating_sub(offset);
    let mut items = Vec::with_capacity(len.min(remaining / item_size));

    for _ in 0..len {
        take(buf, offset, item_size)?;
        let (item, next) = decode_item(buf, offset)?;
        items.push(item);
        offset = next;
    }
    Ok((items, offset))
}

/// Join chunks into one contiguous buffer, preserving order.
pub fn concat(chunks: &[&[u8]]) -> Vec<u8> {
    let total = chunks.iter().map(|chunk| chunk.len()).sum();
    let mut out = Vec::with_capacity(total);
    for chunk in chunks {
        out.extend_from_slice(chunk);
    }
    out
}
