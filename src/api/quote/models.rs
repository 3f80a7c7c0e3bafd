use serde::Deserialize;
use validator::Validate;

use crate::plan::QuoteInput;

/// The public quote form.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRequest {
    #[validate(length(min = 1, max = 200, message = "Property size is required"))]
    pub property_size: String,
    #[validate(length(min = 1, max = 200, message = "Type of cleaning is required"))]
    pub type_of_cleaning: String,
    #[validate(length(min = 1, max = 200, message = "Frequency is required"))]
    pub frequency: String,
    #[validate(length(min = 1, max = 200, message = "Budget is required"))]
    pub budget: String,
    #[validate(length(max = 1000, message = "Specific requirements are too long"))]
    pub specific_requirements: Option<String>,
}

impl QuoteRequest {
    pub fn into_input(self) -> QuoteInput {
        QuoteInput {
            property_size: self.property_size,
            cleaning_type: self.type_of_cleaning,
            frequency: self.frequency,
            budget: self.budget,
            specific_requirements: self
                .specific_requirements
                .filter(|reqs| !reqs.trim().is_empty()),
        }
    }
}
