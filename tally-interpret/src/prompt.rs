use tally_core::Category;

/// System instruction sent with every interpretation request.
pub fn system_prompt() -> String {
    let categories = Category::labels().join(", ");
    format!(
        "You read short notes about personal money movements and extract one transaction.\n\
         Reply with a single JSON object and nothing else, using exactly these keys:\n\
         {{\"description\": string, \"amount\": number, \"type\": \"income\" | \"expense\", \
         \"category_suggestion\": string, \"counterparty\": string | null}}\n\
         Rules:\n\
         - amount is a plain positive number with no currency symbol or thousands separator.\n\
         - type is \"income\" when money comes in and \"expense\" when it goes out.\n\
         - category_suggestion must be one of: {categories}.\n\
         - counterparty is the person or business involved, or null if none is named.\n\
         - description is a short summary of the transaction.\n\
         If the text does not describe a transaction, reply with null."
    )
}

/// User message wrapping the entry text.
pub fn user_prompt(text: &str) -> String {
    format!("Text: \"{}\"", text.trim())
}
