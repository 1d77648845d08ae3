use docx_rs::{DocumentChild, ParagraphChild, RunChild};

/// Joins paragraph text with newlines. Tables and other blocks are skipped.
pub fn extract(data: &[u8]) -> Result<String, String> {
    let doc = docx_rs::read_docx(data).map_err(|e| format!("Error reading Word document: {e}"))?;

    let mut text = String::new();
    for child in &doc.document.children {
        if let DocumentChild::Paragraph(p) = child {
            push_runs(&p.children, &mut text);
            text.push('\n');
        }
    }

    Ok(text.trim().to_string())
}

/// Appends run text, descending into hyperlinks.
fn push_runs(children: &[ParagraphChild], text: &mut String) {
    for child in children {
        match child {
            ParagraphChild::Run(run) => {
                for child in &run.children {
                    if let RunChild::Text(t) = child {
                        text.push_str(&t.text);
                    }
                }
            }
            ParagraphChild::Hyperlink(link) => push_runs(&link.children, text),
            _ => {}
        }
    }
}
