//! Prompt builders for the pipeline stages.

pub fn draft(intent: &str) -> String {
    format!(
        "Create a short CBT exercise for the following goal:\n\n{intent}\n\n\
         Output a concise, step-by-step exercise."
    )
}

pub fn redraft(intent: &str, draft: &str, flags: &[String]) -> String {
    format!(
        "The draft below was flagged for: {}.\n\n\
         Goal:\n{intent}\n\nDraft:\n{draft}\n\n\
         Rewrite the exercise so it avoids the flagged content while still \
         meeting the goal.",
        flags.join(", ")
    )
}

pub fn safety_review(draft: &str) -> String {
    format!(
        "Review the following draft for safety concerns (self-harm, medical \
         advice, instructions that could cause harm):\n\n{draft}\n\n\
         Return a short safety assessment."
    )
}

pub fn critique(draft: &str) -> String {
    format!(
        "Critique this CBT exercise for empathy, clarity and clinical \
         appropriateness:\n\n{draft}"
    )
}

pub fn revision(draft: &str, critique: &str) -> String {
    format!(
        "Revise the exercise below to improve empathy and clarity.\n\n\
         Exercise:\n{draft}\n\nCritique:\n{critique}"
    )
}

pub fn summary(intent: &str, final_text: &str) -> String {
    format!(
        "Write a 3-5 line summary of the finished exercise, suitable for a \
         clinician reviewer.\n\nGoal:\n{intent}\n\nFinal text:\n{final_text}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompts_carry_their_inputs() {
        assert!(draft("sleep better").contains("sleep better"));
        assert!(safety_review("the draft").contains("the draft"));
        assert!(critique("the draft").contains("the draft"));
        assert!(summary("goal", "text").contains("goal"));
        assert!(summary("goal", "text").contains("text"));
    }

    #[test]
    fn test_redraft_names_the_flags() {
        let flags = vec!["possible self-harm content".to_string()];
        let prompt = redraft("goal", "draft", &flags);
        assert!(prompt.contains("possible self-harm content"));
        assert!(prompt.contains("draft"));
    }
}
