/// FNV-1a 32 bit hashing and compile-time string ids.
///
/// Every structural signature (framebuffers, render target textures, render
/// passes) is derived with `fnv1a_32`, and every name used as a key in content
/// (pass types, asset formats, channels, material properties) is a `string_id`.
/// Ids are stable for a given input, both across calls and across processes.

/// 32 bit id derived from a name
pub type StringId = u32;

/// FNV-1a offset basis
pub const FNV1A_32_INITIAL_HASH: u32 = 2166136261;

/// FNV-1a prime
pub const FNV1A_32_PRIME: u32 = 16777619;

/// Continue an FNV-1a hash over `bytes`
///
/// Start with `FNV1A_32_INITIAL_HASH` and feed the returned value back in to
/// hash several fields in sequence.
pub fn fnv1a_32(bytes: &[u8], hash: u32) -> u32 {
    bytes.iter().fold(hash, |hash, &byte| {
        (hash ^ byte as u32).wrapping_mul(FNV1A_32_PRIME)
    })
}

/// Compile-time FNV-1a of a name
///
/// ```ignore
/// const SCENE_PASS: u32 = string_id("Scene");
/// ```
pub const fn string_id(name: &str) -> StringId {
    let bytes = name.as_bytes();
    let mut hash = FNV1A_32_INITIAL_HASH;
    let mut i = 0;
    while i < bytes.len() {
        hash = (hash ^ bytes[i] as u32).wrapping_mul(FNV1A_32_PRIME);
        i += 1;
    }
    hash
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "string_id_tests.rs"]
mod tests;
