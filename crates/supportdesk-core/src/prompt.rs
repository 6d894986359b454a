//! Prompt construction for customer message triage.

/// Categories the model is asked to choose from.
pub const CATEGORIES: [&str; 7] = [
    "Complaint",
    "Refund/Return",
    "Sales Inquiry",
    "Delivery Question",
    "Account/Technical Issue",
    "General Query",
    "Spam",
];

/// Sentiments the model is asked to choose from.
pub const SENTIMENTS: [&str; 3] = ["Positive", "Neutral", "Negative"];

/// Sent as the system-role instruction alongside every prompt.
pub const SYSTEM_INSTRUCTION: &str = "You strictly respond in JSON.";

/// Render a list of values the way the template shows them: `["A", "B"]`.
fn quoted_list(values: &[&str]) -> String {
    let quoted: Vec<String> = values.iter().map(|v| format!("\"{}\"", v)).collect();
    format!("[{}]", quoted.join(", "))
}

/// Build the user-role prompt for one customer message.
///
/// The message is substituted verbatim; nothing is escaped.
pub fn build_prompt(message: &str) -> String {
    let mut prompt = String::new();

    prompt.push_str("You are a customer support AI. For the given customer message, ");
    prompt.push_str("return a STRICT JSON object with exactly these three fields:\n\n");

    prompt.push_str("1. category: one of the following:\n");
    prompt.push_str(&quoted_list(&CATEGORIES));
    prompt.push_str("\n\n");

    prompt.push_str("2. sentiment: one of:\n");
    prompt.push_str(&quoted_list(&SENTIMENTS));
    prompt.push_str("\n\n");

    prompt.push_str("3. reply: a short, professional, 1-2 sentence customer service reply ");
    prompt.push_str("appropriate for the message.\n\n");

    prompt.push_str("Return ONLY valid JSON. No explanation, no text outside the JSON.\n\n");

    prompt.push_str("Customer message: ");
    prompt.push_str(message);
    prompt.push('\n');

    prompt
}
