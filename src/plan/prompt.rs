use serde::Serialize;

/// The five quote-form fields a visitor fills in.
#[derive(Debug, Clone)]
pub struct QuoteInput {
    pub property_size: String,
    pub cleaning_type: String,
    pub frequency: String,
    pub budget: String,
    pub specific_requirements: Option<String>,
}

/// Parsed output of a generated plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleaningPlan {
    pub cleaning_plan: String,
    pub estimated_cost: String,
    pub estimated_duration: String,
}

const PLAN_LABEL: &str = "Cleaning Plan:";
const COST_LABEL: &str = "Estimated Cost:";
const DURATION_LABEL: &str = "Estimated Duration:";

/// Build the completion prompt. The model is asked for labeled
/// sections so the reply can be parsed without a structured-output
/// API.
pub fn build_prompt(input: &QuoteInput) -> String {
    format!(
        "You are a professional cleaning service planner.\n\n\
         Based on the user's input, generate a custom cleaning plan with the \
         specific requirements and budget in mind. Provide a detailed cleaning \
         plan, the estimated cost, and the estimated duration for the service.\n\n\
         Property Size: {}\n\
         Type of Cleaning: {}\n\
         Frequency: {}\n\
         Budget: {}\n\
         Specific Requirements: {}\n\n\
         Respond using the following format:\n\
         {} [Detailed cleaning plan here]\n\
         {} [Estimated cost here]\n\
         {} [Estimated duration here]",
        input.property_size,
        input.cleaning_type,
        input.frequency,
        input.budget,
        input.specific_requirements.as_deref().unwrap_or("None"),
        PLAN_LABEL,
        COST_LABEL,
        DURATION_LABEL,
    )
}

/// Parse a labeled completion back into its three sections. Returns
/// `None` when a label is missing, out of order, or its section is
/// empty.
pub fn parse_plan(text: &str) -> Option<CleaningPlan> {
    let plan_at = text.find(PLAN_LABEL)?;
    let cost_at = text.find(COST_LABEL)?;
    let duration_at = text.find(DURATION_LABEL)?;
    if !(plan_at < cost_at && cost_at < duration_at) {
        return None;
    }

    let cleaning_plan = text[plan_at + PLAN_LABEL.len()..cost_at].trim();
    let estimated_cost = text[cost_at + COST_LABEL.len()..duration_at].trim();
    let estimated_duration = text[duration_at + DURATION_LABEL.len()..].trim();

    if cleaning_plan.is_empty() || estimated_cost.is_empty() || estimated_duration.is_empty() {
        return None;
    }

    Some(CleaningPlan {
        cleaning_plan: cleaning_plan.to_string(),
        estimated_cost: estimated_cost.to_string(),
        estimated_duration: estimated_duration.to_string(),
    })
}
