//! XOR masking per RFC 6455 section 5.3.
//!
//! The mask is self-inverse: applying the same key twice restores the
//! original bytes, so the one routine serves both masking on send and
//! unmasking on receive.

/// Applies the 4-byte XOR mask to `data` in place.
pub fn apply_mask(key: [u8; 4], data: &mut [u8]) {
    #[cfg(feature = "fast-mask")]
    apply_mask_words(key, data);
    #[cfg(not(feature = "fast-mask"))]
    apply_mask_scalar(key, data);
}

fn apply_mask_scalar(key: [u8; 4], data: &mut [u8]) {
    for (i, byte) in data.iter_mut().enumerate() {
        *byte ^= key[i % 4];
    }
}

/// XORs eight bytes per step, falling back to the scalar loop for the tail.
#[cfg_attr(not(feature = "fast-mask"), allow(dead_code))]
fn apply_mask_words(key: [u8; 4], data: &mut [u8]) {
    let word = u64::from_ne_bytes([
        key[0], key[1], key[2], key[3], key[0], key[1], key[2], key[3],
    ]);

    let mut chunks = data.chunks_exact_mut(8);
    for chunk in &mut chunks {
        let masked = u64::from_ne_bytes(chunk.try_into().unwrap()) ^ word;
        chunk.copy_from_slice(&masked.to_ne_bytes());
    }
    apply_mask_scalar(key, chunks.into_remainder());
}
