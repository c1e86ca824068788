//! Source entry classification by name.

/// Object type letters following `.sr` in a source entry name.
const SOURCE_KINDS: [char; 11] = ['a', 'd', 'f', 'm', 'q', 's', 'u', 'w', 'p', 'j', 'x'];

/// Shortest source entry name, e.g. `x.srw`.
const MIN_SOURCE_NAME_LEN: usize = 5;

/// Returns true if `name` holds source text, judged by its `.sr?` suffix.
pub fn is_source_entry(name: &str) -> bool {
    let chars: Vec<char> = name.chars().collect();
    has_source_suffix(&chars)
}

/// [`is_source_entry`] for a name given as 16-bit units.
pub fn is_source_entry_wide(name: &[u16]) -> bool {
    let chars: Vec<char> = char::decode_utf16(name.iter().copied())
        .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect();
    has_source_suffix(&chars)
}

fn has_source_suffix(chars: &[char]) -> bool {
    if chars.len() < MIN_SOURCE_NAME_LEN {
        return false;
    }
    match &chars[chars.len() - 4..] {
        ['.', 's', 'r', kind] => SOURCE_KINDS.contains(kind),
        _ => false,
    }
}
