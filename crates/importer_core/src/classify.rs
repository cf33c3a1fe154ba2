/// Body text shown by the release editor when a release event lacks a label.
/// The editor uses a typographic apostrophe; the plain one is accepted too.
pub const LABEL_MISSING_MARKERS: [&str; 2] = [
    "You haven\u{2019}t selected a label for",
    "You haven't selected a label for",
];

/// Outcome of the post-submission error scan.
///
/// `LabelMissing` carries no widgets here: the engine collects the label search
/// widgets from the live page when it acts on the classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClassification {
    None,
    LabelMissing,
    TooManyErrors(usize),
    Unknown,
}

/// Classifies the error scan from the number of error tabs and, when exactly
/// one is present, the page text shown after opening it.
pub fn classify_errors(error_count: usize, error_text: Option<&str>) -> ErrorClassification {
    match error_count {
        0 => ErrorClassification::None,
        1 => match error_text {
            Some(text) if LABEL_MISSING_MARKERS.iter().any(|m| text.contains(m)) => {
                ErrorClassification::LabelMissing
            }
            _ => ErrorClassification::Unknown,
        },
        n => ErrorClassification::TooManyErrors(n),
    }
}

/// Trimmed, lower-cased form used to compare label names.
pub fn normalize_label(text: &str) -> String {
    text.trim().to_lowercase()
}

/// What to do with a single label search widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelAction {
    /// First search result matches the pre-filled name: pick it.
    Select,
    /// Mismatch in manual mode: hand this widget to the operator.
    Escalate,
    /// Mismatch in automatic mode: drop the label from the release event.
    Remove,
    /// Nothing was pre-filled, so there is nothing to compare against.
    Skip,
}

pub fn decide_label(first_result: &str, prefilled: Option<&str>, manual: bool) -> LabelAction {
    let Some(prefilled) = prefilled else {
        return LabelAction::Skip;
    };
    let found = normalize_label(first_result);
    if !found.is_empty() && found == normalize_label(prefilled) {
        LabelAction::Select
    } else if manual {
        LabelAction::Escalate
    } else {
        LabelAction::Remove
    }
}
