//! Classification of the provider's acknowledgement documents.
//!
//! Failed requests come back as an XML acknowledgement whose `<text>` element
//! holds a natural-language reason. The recognised phrases and the token
//! positions of the numeric limits are tied to the message format observed on
//! the live service; when the expected tokens are missing the reply is left
//! unrecognised so the caller surfaces the raw status and body.

use crate::error::ParameterKind;

const NO_DATA: &str = "No matching data found";
const DEPENDENCY_TABLES: &str = "check you request against dependency tables";
const PSR_NOT_VALID: &str = "is not valid for this area";
const DOCUMENT_LIMIT: &str = "amount of requested data exceeds allowed limit";
const OFFSET_LIMIT: &str =
    "requested data to be gathered via the offset parameter exceeds the allowed limit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Acknowledgement {
    NoData,
    InvalidParameter(ParameterKind, String),
    LimitExceeded { requested: u64, allowed: u64 },
}

/// Token positions, counted from the end of the space-split message.
struct LimitRule {
    phrase: &'static str,
    requested_from_end: usize,
    allowed_from_end: usize,
    allowed_trailing: usize,
}

const LIMIT_RULES: [LimitRule; 2] = [
    LimitRule {
        phrase: DOCUMENT_LIMIT,
        requested_from_end: 2,
        allowed_from_end: 5,
        allowed_trailing: 0,
    },
    LimitRule {
        phrase: OFFSET_LIMIT,
        requested_from_end: 9,
        allowed_from_end: 30,
        allowed_trailing: 2,
    },
];

impl LimitRule {
    fn extract(&self, text: &str) -> Option<Acknowledgement> {
        let tokens: Vec<&str> = text.split(' ').collect();
        let from_end = |n: usize| tokens.len().checked_sub(n).map(|i| tokens[i]);
        let requested = from_end(self.requested_from_end)?.parse().ok()?;
        let allowed_token = from_end(self.allowed_from_end)?;
        let cut = allowed_token.len().checked_sub(self.allowed_trailing)?;
        let allowed = allowed_token.get(..cut)?.parse().ok()?;
        Some(Acknowledgement::LimitExceeded { requested, allowed })
    }
}

/// Pull the reason text out of an acknowledgement document.
pub fn reason_text(body: &str) -> Option<String> {
    let doc = roxmltree::Document::parse(body).ok()?;
    doc.descendants()
        .find(|n| n.has_tag_name("text"))
        .map(|n| n.text().unwrap_or_default().trim().to_string())
}

/// Map a reason text onto a known acknowledgement kind.
pub fn classify(text: &str) -> Option<Acknowledgement> {
    if text.contains(NO_DATA) {
        return Some(Acknowledgement::NoData);
    }
    if text.contains(DEPENDENCY_TABLES) {
        return Some(Acknowledgement::InvalidParameter(
            ParameterKind::Business,
            text.to_string(),
        ));
    }
    if text.contains(PSR_NOT_VALID) {
        return Some(Acknowledgement::InvalidParameter(
            ParameterKind::PsrType,
            text.to_string(),
        ));
    }
    LIMIT_RULES
        .iter()
        .find(|rule| text.contains(rule.phrase))
        .and_then(|rule| rule.extract(text))
}

/// The 200-OK convention for an empty result.
pub fn signals_no_data(body: &str) -> bool {
    body.contains(NO_DATA)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify_body(body: &str) -> Option<Acknowledgement> {
        reason_text(body).as_deref().and_then(classify)
    }

    fn ack(text: &str) -> String {
        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
             <Acknowledgement_MarketDocument xmlns=\"urn:iec62325.351:tc57wg16:451-1:acknowledgementdocument:7:0\">\
             <mRID>1</mRID><Reason><code>999</code><text>{text}</text></Reason>\
             </Acknowledgement_MarketDocument>"
        )
    }

    #[test]
    fn no_data_phrase() {
        let body = ack("No matching data found for Data item Day-ahead Prices [12.1.D]");
        assert_eq!(classify_body(&body), Some(Acknowledgement::NoData));
    }

    #[test]
    fn parameter_phrases_carry_their_category() {
        let business = classify("Please check you request against dependency tables").unwrap();
        assert!(matches!(
            business,
            Acknowledgement::InvalidParameter(ParameterKind::Business, _)
        ));
        let psr = classify("PsrType B20 is not valid for this area").unwrap();
        assert!(matches!(
            psr,
            Acknowledgement::InvalidParameter(ParameterKind::PsrType, _)
        ));
    }

    #[test]
    fn document_count_limit_tokens() {
        let text = "The amount of requested data exceeds allowed limit. \
                    Max allowed: 100 documents, requested: 150 documents.";
        assert_eq!(
            classify_body(&ack(text)),
            Some(Acknowledgement::LimitExceeded {
                requested: 150,
                allowed: 100
            })
        );
    }

    #[test]
    fn offset_limit_tokens() {
        let text = "Offset capped (allowed 4800). Each page is capped accordingly. \
                    The requested data to be gathered via the offset parameter exceeds \
                    the allowed limit. Requested 5000 documents cannot be served, \
                    please narrow the window.";
        assert_eq!(
            classify(text),
            Some(Acknowledgement::LimitExceeded {
                requested: 5000,
                allowed: 4800
            })
        );
    }

    #[test]
    fn limit_phrase_without_expected_tokens_is_unrecognised() {
        assert_eq!(
            classify("The amount of requested data exceeds allowed limit."),
            None
        );
        assert_eq!(
            classify("requested data to be gathered via the offset parameter exceeds the allowed limit"),
            None
        );
    }

    #[test]
    fn unknown_or_unstructured_bodies() {
        assert_eq!(classify_body(&ack("Unauthorized. Missing or invalid security token")), None);
        assert_eq!(classify_body("<html><body>Bad Gateway</body></html>"), None);
        assert_eq!(classify_body("not xml at all"), None);
    }

    #[test]
    fn empty_success_detection() {
        assert!(signals_no_data(&ack("No matching data found for Data item")));
        assert!(!signals_no_data("<Publication_MarketDocument/>"));
    }
}
