//! Seed-derived value primitives.
//!
//! Everything in a profile is built from [`rolling_hash`] over `seed + suffix`,
//! so each field can be recomputed from the seed alone.

/// 32-bit rolling hash `h = h * 31 + code_unit` over UTF-16 code units,
/// wrapping as a signed 32-bit integer.
pub fn rolling_hash(input: &str) -> i32 {
    rolling_hash_with(input, 31)
}

/// Same recurrence with a different multiplier. The repo-name word pick uses 7.
pub fn rolling_hash_with(input: &str, multiplier: i32) -> i32 {
    input.encode_utf16().fold(0i32, |h, unit| {
        h.wrapping_mul(multiplier).wrapping_add(i32::from(unit))
    })
}

/// Magnitude of the hash. `i32::MIN` maps to `2^31` rather than overflowing.
pub fn hash_magnitude(input: &str) -> u32 {
    rolling_hash(input).unsigned_abs()
}

/// Eight lower-case hex digits of the hash magnitude.
pub fn hash_hex(input: &str) -> String {
    format!("{:08x}", hash_magnitude(input))
}

/// UUID-shaped string with fixed version (`4`) and variant (`8`) nibbles.
pub fn consistent_uuid(input: &str) -> String {
    let hex = hash_hex(input);
    format!(
        "{}-{}-4{}-8{}-{}{}",
        &hex[0..8],
        &hex[0..4],
        &hex[1..4],
        &hex[4..7],
        hex,
        &hex[0..4]
    )
}

/// Dash-free UUID prefix, used for serial numbers and device ids.
pub fn compact_id(input: &str, len: usize) -> String {
    let compact: String = consistent_uuid(input).chars().filter(|c| *c != '-').collect();
    compact.chars().take(len).collect()
}

/// Colon-grouped, upper-case MAC address from a 12 digit hex rendering.
pub fn mac_address(input: &str) -> String {
    let hex = format!("{:012X}", hash_magnitude(input));
    hex.as_bytes()
        .chunks(2)
        .map(|pair| String::from_utf8_lossy(pair).into_owned())
        .collect::<Vec<_>>()
        .join(":")
}

/// Twelve upper-case hex digits, used for serials keyed off the machine id.
pub fn upper_serial(input: &str) -> String {
    format!("{:012X}", hash_magnitude(input))
}

/// Deterministic pick from a fixed list.
pub fn pick<'a>(input: &str, choices: &[&'a str]) -> &'a str {
    pick_with(rolling_hash(input), choices)
}

pub fn pick_with<'a>(hash: i32, choices: &[&'a str]) -> &'a str {
    if choices.is_empty() {
        return "";
    }
    choices[hash.unsigned_abs() as usize % choices.len()]
}

/// Value in `[0, modulus)`; `modulus` of zero yields zero.
pub fn bounded(input: &str, modulus: u64) -> u64 {
    if modulus == 0 {
        return 0;
    }
    u64::from(hash_magnitude(input)) % modulus
}

/// Pseudo key material: consecutive hashes of `input-<n>` as big-endian words.
pub fn derive_bytes(input: &str, len: usize) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(len + 4);
    let mut counter = 0u32;
    while bytes.len() < len {
        let word = rolling_hash(&format!("{input}-{counter}")) as u32;
        bytes.extend_from_slice(&word.to_be_bytes());
        counter += 1;
    }
    bytes.truncate(len);
    bytes
}
