//! Lenient argument parsing
//!
//! The shell never rejects a malformed number or payload. Numbers fall back to
//! zero and are truncated to the width the command needs; payloads keep
//! whatever bytes could be decoded.

/// Integer types a parsed argument can be narrowed into
///
/// Narrowing keeps the low bits, the same as an `as` cast.
pub trait Truncate: Sized {
    fn truncate_from(value: u64) -> Self;
}

macro_rules! impl_truncate {
    ($($ty:ty),*) => {
        $(
            impl Truncate for $ty {
                #[inline]
                fn truncate_from(value: u64) -> Self {
                    value as $ty
                }
            }
        )*
    };
}

impl_truncate!(u8, u16, u32, u64, usize);

/// Parse a decimal or `0x`-prefixed hexadecimal argument
///
/// The longest valid digit prefix is used, so `12abc` is 12 and `0x1g` is 1.
/// A token without leading digits is 0. Values beyond 64 bits saturate.
pub fn parse_number<T: Truncate>(token: &str) -> T {
    T::truncate_from(parse_u64(token))
}

fn parse_u64(token: &str) -> u64 {
    let token = token.trim();
    let (digits, radix) = match token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
    {
        Some(rest) => (rest, 16),
        None => (token, 10),
    };

    digits
        .chars()
        .map_while(|c| c.to_digit(radix))
        .fold(0u64, |acc, digit| {
            acc.saturating_mul(u64::from(radix))
                .saturating_add(u64::from(digit))
        })
}

/// Parse a control transfer payload, keeping at most `max_len` bytes
///
/// A token starting with `"` is taken as ASCII: the bytes up to the closing
/// quote (optional). Anything else is hex pairs such as `0a0b0c`. Spaces are
/// ignored, each pair uses its longest valid hex prefix and a trailing odd
/// nibble is dropped.
pub fn parse_payload(token: &str, max_len: usize) -> Vec<u8> {
    if let Some(ascii) = token.strip_prefix('"') {
        let ascii = ascii.strip_suffix('"').unwrap_or(ascii);
        return ascii.bytes().take(max_len).collect();
    }

    let hex: Vec<u8> = token.bytes().filter(|b| *b != b' ').collect();
    hex.chunks_exact(2).take(max_len).map(hex_pair).collect()
}

fn hex_pair(pair: &[u8]) -> u8 {
    pair.iter()
        .map_while(|b| char::from(*b).to_digit(16))
        .fold(0u8, |acc, digit| (acc << 4) | digit as u8)
}
