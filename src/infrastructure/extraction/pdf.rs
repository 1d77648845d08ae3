use lopdf::Document;

/// Extracts text page by page, one newline after each page.
pub fn extract(data: &[u8]) -> Result<String, String> {
    let doc = Document::load_mem(data).map_err(|e| format!("Error reading PDF: {e}"))?;

    let mut text = String::new();
    for page_number in doc.get_pages().keys() {
        let page = doc
            .extract_text(&[*page_number])
            .map_err(|e| format!("Error reading PDF page {page_number}: {e}"))?;
        text.push_str(&page);
        text.push('\n');
    }

    Ok(text.trim().to_string())
}
