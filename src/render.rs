use crate::document::{format_count, Document, RenderedFragment, OMITTED_NOTICE, SECTION_TRUNCATED_NOTICE};

fn render_header(doc: &Document, out: &mut String) {
    let h = &doc.header;
    let types = if h.project_types.is_empty() {
        "Generic".to_string()
    } else {
        h.project_types.join(", ")
    };

    // Trailing double spaces are markdown hard line breaks.
    out.push_str("# Repository Context\n\n");
    out.push_str(&format!("**Generated by:** {}  \n", h.generator));
    out.push_str(&format!("**Generated at:** {}  \n", h.generated_at));
    out.push_str(&format!("**Repository:** {}  \n", h.repo_name));
    out.push_str(&format!("**Path:** {}  \n", h.repo_path.display()));
    out.push_str(&format!("**Detected Types:** {types}\n\n"));
    out.push_str("---\n\n");
    out.push_str("This context file provides a comprehensive overview of the repository structure and contents\n");
    out.push_str("for use with AI assistants.\n\n");
}

fn render_fragment(f: &RenderedFragment, out: &mut String) {
    if let Some(heading) = &f.heading {
        out.push_str(&format!("\n### {heading}\n"));
    }
    match &f.language {
        Some(lang) => out.push_str(&format!("```{lang}\n{}\n```\n", f.text)),
        None => {
            out.push_str(&f.text);
            out.push('\n');
        }
    }
}

/// Markdown rendering. Output depends only on `doc`.
pub fn render_markdown(doc: &Document) -> String {
    let mut out = String::new();
    render_header(doc, &mut out);

    for section in &doc.sections {
        out.push_str(&format!("\n## {}\n", section.category.title()));
        for fragment in &section.fragments {
            render_fragment(fragment, &mut out);
        }
        if section.truncated {
            out.push_str(&format!("\n{SECTION_TRUNCATED_NOTICE}\n"));
        }
    }

    if doc.omitted {
        out.push_str(&format!("\n{OMITTED_NOTICE}\n"));
    }

    out.push_str(&format!(
        "\n---\n\n*Context generation complete. Total size: {} characters*\n",
        format_count(doc.emitted_size as u64)
    ));
    out
}
