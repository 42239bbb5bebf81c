//! Fixed prompt and answer templates for the legal assistant. The
//! wording is part of the contract: degraded turns must return these
//! texts verbatim.

pub const SYSTEM_PROMPT: &str = "Você é um assistente jurídico especializado em Direito Brasileiro.\n\
Seu papel é RESPONDER SOMENTE com base no CONTEXTO fornecido.\n\
Se a informação não estiver no contexto, diga:\n\
\"Não encontrei informações suficientes na base indexada para responder com segurança.\"\n\
\n\
Regras:\n\
- Cite o número da lei e do artigo sempre que possível.\n\
- Use linguagem formal, objetiva e respeitosa.\n\
- Organize a resposta em tópicos quando for pertinente.\n\
- Nunca invente dispositivos legais.\n\
- Sempre finalize com uma observação: \"Verifique a legislação atualizada.\"";

/// Answer for turns where recall or rerank produced nothing usable.
pub const INSUFFICIENT_BASIS: &str =
    "Não encontrei base suficiente nos materiais indexados para responder com segurança.";

/// Answer for turns degraded by an unreachable vector store or
/// embedding backend.
pub const INDEX_UNAVAILABLE: &str =
    "Não consegui consultar a base de legislação indexada no momento. \
Tente novamente em instantes.";

/// Full prompt sent to the generation backend.
pub fn build_prompt(context: &str, question: &str) -> String {
    format!(
        "{}\n\nCONTEXTO:\n{}\n\nPERGUNTA:\n{}\n\nRESPOSTA:",
        SYSTEM_PROMPT,
        context,
        question
    )
}

/// Deterministic answer used in extractive mode and as the fallback
/// when generation fails: the assembled context plus a disclaimer.
pub fn extractive_answer(context: &str) -> String {
    format!(
        "Com base nas fontes recuperadas (após rerank):\n\n{}\n\n\
Observação: informação educacional; verifique atualizações legais.",
        context
    )
}
