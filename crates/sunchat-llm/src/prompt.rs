//! System prompt assembly for the website chat widget.

/// Fallback prompt used when no retrieved context is available. The company
/// facts are deliberately hard-coded; they change about once a year.
const COMPANY_FACTS: &str = "\
You are the website assistant for SunShield Solar & Coatings, a licensed \
solar-installation and roof-coatings contractor serving the Phoenix metro \
area.

Company facts:
- Services: residential and commercial solar installation, elastomeric and \
silicone roof coatings, free home energy audits.
- Financing: zero-down solar loans, PACE financing for qualified \
properties, and equipment leasing.
- Contact: (480) 555-0177, hello@sunshieldsolar.com. Office hours Mon-Sat \
8am-6pm.

Answer questions about our services helpfully and concisely. If a visitor \
asks something you cannot answer from these facts or general safe solar \
knowledge, say so and offer to connect them with our team.";

/// Prompt used when retrieved document context is available.
const CONTEXT_PREAMBLE: &str = "\
You are the website assistant for SunShield Solar & Coatings. Answer the \
visitor's question using ONLY the context below plus general safe \
solar-industry knowledge. If the answer is not in the context, say you are \
not sure and offer to connect the visitor with our team at (480) 555-0177.";

/// Build the system prompt, with or without retrieved context.
pub fn build_system_prompt(context: Option<&str>) -> String {
    match context {
        Some(ctx) => format!("{CONTEXT_PREAMBLE}\n\nContext:\n{ctx}"),
        None => COMPANY_FACTS.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_prompt_carries_company_facts() {
        let prompt = build_system_prompt(None);
        assert!(prompt.contains("SunShield"));
        assert!(prompt.contains("PACE financing"));
        assert!(prompt.contains("(480) 555-0177"));
    }

    #[test]
    fn context_prompt_embeds_the_context() {
        let prompt = build_system_prompt(Some("Chunk one.\n\nChunk two."));
        assert!(prompt.contains("Context:\nChunk one.\n\nChunk two."));
        assert!(prompt.contains("ONLY the context"));
    }
}
