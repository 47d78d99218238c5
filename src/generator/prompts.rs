//! Prompt construction for the narrative generator.
//!
//! All prompt text lives here so transport implementations stay model- and
//! task-agnostic. The wording mirrors the service configuration: a mission
//! synthesis prompt, an insight-extraction prompt over a bounded corpus
//! excerpt, per-tab analysis prompts, and a dataset question prompt.

/// Analysis tabs served by the `ai-tabs` endpoint, in response order.
pub const ANALYSIS_TABS: [(&str, &str); 3] = [
    (
        "SUMMARY",
        "Provide a concise summary of recent NASA bioscience research trends.",
    ),
    (
        "OUTLIER",
        "Identify unusual or outlier research trends in NASA bioscience publications.",
    ),
    (
        "INSIGHT",
        "Provide insights or interesting patterns from NASA bioscience research data.",
    ),
];

/// Field descriptions passed alongside the mission object so the generator
/// understands unit-bearing keys.
const FIELD_TOOLTIPS: &str = "\
type: mission destination (e.g. Mars, Moon, Asteroid)
phase: mission lifecycle phase (Analysis, Planning, Execution)
objective: primary mission objective (e.g. Scientific Research, Colonization)
deltaV: total delta-v budget in km/s
duration: mission duration in days
fuel: propellant mass in kg
payload: payload mass in kg
crew: crew count (0 for robotic missions)
commsLatency: one-way communication latency in seconds
gravity: surface gravity at the destination in m/s^2
radDose: expected radiation dose in mSv/yr
power_kW: available power in kW
isru_required: whether in-situ resource utilization is required
edlDifficulty: entry-descent-landing difficulty, 1-10";

/// Build the mission synthesis prompt from the serialized mission object.
///
/// The synthesis is consumed twice: embedded for vector similarity search
/// and echoed back to the caller, so the prompt asks for a single bare
/// paragraph without commentary.
pub fn mission_summary(mission_json: &str) -> String {
    format!(
        "Summarize the following mission details into a concise paragraph suitable for \
         vector similarity search. Include type, phase, objective, context, and \
         additionalContext if available:\n\n{mission_json}\n\n\
         These are the field descriptions to help you understand the context:\n\
         {FIELD_TOOLTIPS}\n\n\
         Don't add any disclaimers or commentary. Return only the summary text."
    )
}

/// Build the insight-extraction prompt over the mission synthesis and the
/// concatenated bodies of the top-ranked documents.
///
/// Only the top-k excerpt is ever included, never the full corpus, to
/// bound token usage.
pub fn mission_insight(synthesis: &str, corpus_excerpt: &str) -> String {
    format!(
        "You are analyzing bioscience publications relevant to a planned mission.\n\n\
         Mission summary:\n{synthesis}\n\n\
         Excerpts from the most relevant publications:\n{corpus_excerpt}\n\n\
         Extract the key themes, risks, and actionable insights these publications \
         offer for the mission. Be specific and ground every point in the excerpts. \
         Return only the insight text."
    )
}

/// Build a per-tab analysis prompt over a compacted dataset summary.
pub fn tab_analysis(tab_prompt: &str, dataset_summary: &str) -> String {
    format!(
        "{tab_prompt}\n\n\
         Here is a compact summary of the data, one line per year:\n{dataset_summary}\n\n\
         Base your answer only on this data. Return only the analysis text."
    )
}

/// Build a question-answering prompt over a compacted dataset summary.
pub fn dataset_question(question: &str, dataset_summary: &str) -> String {
    format!(
        "Answer the following question using only the data below.\n\n\
         Question: {question}\n\n\
         Data, one line per year:\n{dataset_summary}\n\n\
         If the data cannot answer the question, say so. Return only the answer text."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mission_summary_embeds_mission_and_tooltips() {
        let prompt = mission_summary("{\"type\": \"Mars\"}");
        assert!(prompt.contains("{\"type\": \"Mars\"}"));
        assert!(prompt.contains("deltaV"));
        assert!(prompt.contains("Return only the summary text."));
    }

    #[test]
    fn test_mission_insight_embeds_both_inputs() {
        let prompt = mission_insight("go to mars", "paper one body");
        assert!(prompt.contains("go to mars"));
        assert!(prompt.contains("paper one body"));
    }

    #[test]
    fn test_analysis_tabs_are_fixed() {
        let names: Vec<&str> = ANALYSIS_TABS.iter().map(|(name, _)| *name).collect();
        assert_eq!(names, vec!["SUMMARY", "OUTLIER", "INSIGHT"]);
    }

    #[test]
    fn test_dataset_question_embeds_question() {
        let prompt = dataset_question("what grew fastest?", "2020 -> A: 1");
        assert!(prompt.contains("what grew fastest?"));
        assert!(prompt.contains("2020 -> A: 1"));
    }
}
