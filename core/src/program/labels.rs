//! Loop label numbering
//!
//! Loop labels are bijective base-26 numerals over `A..=Z`:
//! 1 is "A", 26 is "Z", 27 is "AA".

/// Longest label the text format can carry
pub const MAX_LOOP_LABEL_LENGTH: usize = 2;

/// Highest loop number with a label of at most two letters ("ZZ")
pub const MAX_LOOP_NUMBER: u32 = 702;

/// Generate the label for loop number `n` (1-based). Returns an empty string for 0.
pub fn generate_loop_label(mut n: u32) -> String {
    let mut letters = Vec::new();
    while n > 0 {
        let digit = ((n - 1) % 26) as u8;
        letters.push((b'A' + digit) as char);
        n = (n - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// Parse a label produced by `generate_loop_label` back into its number.
///
/// Returns `None` if the label contains anything other than `A..=Z` or overflows.
pub fn parse_loop_label(label: &str) -> Option<u32> {
    label.chars().try_fold(0u32, |n, ch| {
        if !ch.is_ascii_uppercase() {
            return None;
        }
        let digit = ch as u32 - 'A' as u32 + 1;
        n.checked_mul(26)?.checked_add(digit)
    })
}
