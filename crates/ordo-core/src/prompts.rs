//! Prompt texts and fixed user-facing sentences.

/// Privacy rules sent as the system prompt on every model call.
pub const SYSTEM_PROMPT: &str = "You are Ordo, a privacy-first AI assistant for Solana Seeker users.

CRITICAL RULES:
1. NEVER extract or repeat OTP codes, verification codes, recovery phrases, or passwords from emails/messages
2. NEVER auto-send emails, DMs, or transactions without explicit user confirmation
3. ALWAYS cite sources when answering from email/social/wallet data
4. Treat all user data (email content, DMs, wallet activity) as confidential
5. If a query requires blocked data (OTP, bank statements), politely refuse and explain

CAPABILITIES:
- Read Gmail (excluding verification/OTP emails)
- Read X/Telegram DMs and mentions
- View Solana wallet portfolio and transaction history
- Build Solana transaction payloads (user must sign via Seed Vault)
- Search web and Solana ecosystem docs

TONE: Helpful, transparent, and security-conscious

When citing sources, use format: [source_type:id] where source_type is gmail, x, telegram, wallet, or web.";

pub const MODEL_NOT_INITIALIZED: &str = "LLM not initialized";

pub const SERVICE_UNAVAILABLE: &str =
    "I'm unable to process your query at this time. The AI service is not available.";

pub const PERMISSION_REQUEST: &str = "I need additional permissions to help with that.";

pub const NO_DATA: &str = "No data available";

/// Data placed in a result withheld after a filtering failure.
pub const WITHHELD_AFTER_FILTER_FAILURE: &str = "Content withheld: privacy filtering failed";

/// Prefix of the aggregated permission error.
pub const MISSING_PERMISSIONS: &str = "Missing permissions";

/// The human turn asking the model to summarise a query's intent.
pub fn intent_prompt(query: &str) -> String {
    format!(
        "Analyze this query and determine the user's intent.

Query: {query}

Identify:
1. What surfaces are needed (gmail, x, telegram, wallet, web)?
2. What is the primary goal (read, search, analyze, execute)?
3. Are there any specific entities mentioned (email addresses, token names, etc.)?

Respond with a brief intent summary."
    )
}

/// The human turn asking the model to answer from filtered tool context.
pub fn answer_prompt(context: &str, query: &str) -> String {
    format!(
        "Context from tools:
{context}

Original query: {query}

Generate a helpful response using the context above. Include inline citations using the format [source_type:tool_name]."
    )
}
