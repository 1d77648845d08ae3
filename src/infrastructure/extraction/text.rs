/// Decodes UTF-8, falling back to Latin-1 where every byte maps to one char.
pub fn decode(data: &[u8]) -> String {
    match std::str::from_utf8(data) {
        Ok(text) => text.strip_prefix('\u{feff}').unwrap_or(text).to_string(),
        Err(_) => data.iter().map(|&b| char::from(b)).collect(),
    }
}
