//! Hex dump formatting for transfer payloads

use std::fmt::Write;

/// Format bytes as lowercase hex, 16 per line in two groups of eight
///
/// Every line, including the first, is preceded by a newline so the dump can
/// follow a label on the same output line.
pub fn hex_dump(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len() * 3 + 1);

    for (i, byte) in data.iter().enumerate() {
        if i % 16 == 0 {
            out.push('\n');
        } else if i % 8 == 0 {
            out.push_str("  ");
        } else {
            out.push(' ');
        }
        // Writing to a String cannot fail
        let _ = write!(out, "{byte:02x}");
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty() {
        assert_eq!(hex_dump(&[]), "");
    }

    #[test]
    fn test_single_byte() {
        assert_eq!(hex_dump(&[0x0f]), "\n0f");
    }

    #[test]
    fn test_group_separator() {
        let data: Vec<u8> = (0..10).collect();
        assert_eq!(hex_dump(&data), "\n00 01 02 03 04 05 06 07  08 09");
    }

    #[test]
    fn test_line_break_every_sixteen() {
        let data: Vec<u8> = (0..18).collect();
        assert_eq!(
            hex_dump(&data),
            "\n00 01 02 03 04 05 06 07  08 09 0a 0b 0c 0d 0e 0f\n10 11"
        );
    }
}
