use kindred_core::ProductRecord;

/// Prompt asking for one friendly sentence about why `recommended` suits
/// someone who viewed `source`.
pub fn build_prompt(source: &ProductRecord, recommended: &ProductRecord) -> String {
    format!(
        "You are an expert e-commerce assistant.\n\
         A user recently viewed '{}'.\n\
         We are recommending '{}'.\n\
         Explain why this is a good recommendation in one short, friendly sentence. \
         Start with \"Because you viewed...\".",
        source.name, recommended.name
    )
}
