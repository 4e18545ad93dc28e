//! Follow-up Questions
//!
//! One targeted question for the first missing field, in the user's language.

use crate::slots::{Language, SlotField, SlotFrame};
use crate::validator::missing_fields;

/// Question for the first missing field, or `None` when the frame is complete
pub fn followup(frame: &SlotFrame) -> Option<String> {
    missing_fields(frame)
        .first()
        .map(|field| question(*field, frame.language))
}

/// Locale template for a single field
pub fn question(field: SlotField, language: Language) -> String {
    let template = match (language, field) {
        (Language::En, SlotField::Intent) => {
            "Would you like to know about risk, a buy opportunity, or the trend?"
        }
        (Language::En, SlotField::Subject) => "Which stock or company are you referring to?",
        (Language::En, SlotField::Capital) => {
            "How much would you like to invest (for example ₹50,000 or 5 lakh)?"
        }
        (Language::En, SlotField::Sector) => {
            "Which sector are you interested in (for example IT, banking or pharma)?"
        }
        (Language::En, SlotField::Commodity) => {
            "Which commodity do you mean (for example gold, silver or crude oil)?"
        }
        (Language::Hi, SlotField::Intent) => {
            "क्या आप जोखिम, खरीदने का मौका या ट्रेंड जानना चाहते हैं?"
        }
        (Language::Hi, SlotField::Subject) => {
            "कृपया बताइए आप किस कंपनी या स्टॉक के बारे में पूछ रहे हैं?"
        }
        (Language::Hi, SlotField::Capital) => {
            "आप कितनी राशि निवेश करना चाहते हैं (जैसे ₹50,000 या 5 लाख)?"
        }
        (Language::Hi, SlotField::Sector) => {
            "आप किस सेक्टर के बारे में जानना चाहते हैं (जैसे IT, बैंकिंग या फार्मा)?"
        }
        (Language::Hi, SlotField::Commodity) => {
            "आप किस कमोडिटी के बारे में पूछ रहे हैं (जैसे सोना, चांदी या कच्चा तेल)?"
        }
        (Language::En, other) => {
            return format!("Could you please provide the {}?", other.label(language));
        }
        (Language::Hi, other) => return format!("कृपया {} बताइए।", other.label(language)),
    };
    template.to_string()
}
