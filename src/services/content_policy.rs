//! Content rules for testimonial comments. The policy is an injectable
//! object rather than a hardcoded list so handlers and tests can swap
//! rule sets without touching the moderation pipeline.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PolicyRejection {
    NoAppreciationTerm,
    BlocklistedTerm,
    NonEnglishText,
}

impl PolicyRejection {
    pub(crate) fn message(self) -> &'static str {
        match self {
            PolicyRejection::NoAppreciationTerm => {
                "Comment must describe what you appreciated about the course"
            }
            PolicyRejection::BlocklistedTerm => "Comment contains disallowed language",
            PolicyRejection::NonEnglishText => "Comment must be written in English",
        }
    }
}

pub(crate) trait ContentPolicy: Send + Sync {
    fn review(&self, text: &str) -> Result<(), PolicyRejection>;
}

const APPRECIATION_TERMS: &[&str] = &[
    "good", "great", "excellent", "amazing", "awesome", "helpful", "love", "loved", "best",
    "fantastic", "wonderful", "clear", "useful", "recommend", "recommended", "perfect", "thank",
    "thanks", "brilliant", "outstanding", "enjoyed",
];

const BLOCKLISTED_TERMS: &[&str] = &[
    "bad", "worst", "terrible", "awful", "horrible", "useless", "waste", "scam", "fraud",
    "refund", "boring", "poor", "hate", "disappointing", "disappointed",
];

/// Default policy: a testimonial must contain at least one recognized
/// appreciation term, no blocklisted negative term, and only ASCII text
/// (letters, digits, whitespace and common punctuation).
#[derive(Debug, Clone, Default)]
pub(crate) struct WordListPolicy;

impl ContentPolicy for WordListPolicy {
    fn review(&self, text: &str) -> Result<(), PolicyRejection> {
        if !text.chars().all(is_allowed_char) {
            return Err(PolicyRejection::NonEnglishText);
        }

        let words: Vec<String> = text
            .split(|ch: char| !ch.is_ascii_alphanumeric())
            .filter(|word| !word.is_empty())
            .map(|word| word.to_ascii_lowercase())
            .collect();

        if words.iter().any(|word| BLOCKLISTED_TERMS.contains(&word.as_str())) {
            return Err(PolicyRejection::BlocklistedTerm);
        }

        if !words.iter().any(|word| APPRECIATION_TERMS.contains(&word.as_str())) {
            return Err(PolicyRejection::NoAppreciationTerm);
        }

        Ok(())
    }
}

fn is_allowed_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric()
        || ch.is_ascii_whitespace()
        || matches!(ch, '.' | ',' | '!' | '?' | '\'' | '"' | '-' | '(' | ')' | ':' | ';' | '&' | '%' | '$' | '/')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appreciative_english_comment_passes() {
        let policy = WordListPolicy;
        assert!(policy.review("Great course, really helpful and clear explanations!").is_ok());
    }

    #[test]
    fn comment_without_appreciation_term_is_rejected() {
        let policy = WordListPolicy;
        assert_eq!(
            policy.review("The course covers variables and loops."),
            Err(PolicyRejection::NoAppreciationTerm)
        );
    }

    #[test]
    fn blocklisted_term_is_rejected_even_beside_praise() {
        let policy = WordListPolicy;
        assert_eq!(
            policy.review("Great content but a terrible pace."),
            Err(PolicyRejection::BlocklistedTerm)
        );
    }

    #[test]
    fn non_ascii_text_is_rejected() {
        let policy = WordListPolicy;
        assert_eq!(
            policy.review("Отличный курс, рекомендую"),
            Err(PolicyRejection::NonEnglishText)
        );
        assert_eq!(policy.review("great course 🎉"), Err(PolicyRejection::NonEnglishText));
    }

    #[test]
    fn matching_is_case_insensitive_and_word_bounded() {
        let policy = WordListPolicy;
        assert!(policy.review("EXCELLENT material, thank you.").is_ok());
        // "goodbye" must not satisfy the "good" appreciation term.
        assert_eq!(
            policy.review("Goodbye lectures, hello projects."),
            Err(PolicyRejection::NoAppreciationTerm)
        );
    }
}
