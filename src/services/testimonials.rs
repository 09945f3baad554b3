use thiserror::Error;

use crate::services::content_policy::{ContentPolicy, PolicyRejection};

pub(crate) const MIN_COMMENT_CHARS: usize = 10;
pub(crate) const MAX_COMMENT_CHARS: usize = 500;
pub(crate) const MAX_TESTIMONIALS_PER_USER: i64 = 3;
pub(crate) const MAX_PINNED: usize = 3;
pub(crate) const REQUIRED_RATING: i32 = 5;

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum TestimonialRejection {
    #[error("user is not enrolled in this course")]
    NotEnrolled,
    #[error("a 5-star rating on the course is required before posting")]
    RatingRequired,
    #[error("comment must be at least {MIN_COMMENT_CHARS} characters")]
    CommentTooShort,
    #[error("comment must be at most {MAX_COMMENT_CHARS} characters")]
    CommentTooLong,
    #[error("{}", .0.message())]
    ContentPolicy(PolicyRejection),
    #[error("limit of {MAX_TESTIMONIALS_PER_USER} testimonials per course reached")]
    QuotaExceeded,
}

pub(crate) struct SubmissionContext<'a> {
    pub(crate) enrolled: bool,
    pub(crate) rating: Option<i32>,
    pub(crate) existing_count: i64,
    pub(crate) comment: &'a str,
}

/// Full eligibility pipeline for a new testimonial, checked in a fixed
/// order so callers get the most actionable rejection first.
pub(crate) fn validate_submission(
    ctx: &SubmissionContext<'_>,
    policy: &dyn ContentPolicy,
) -> Result<(), TestimonialRejection> {
    if !ctx.enrolled {
        return Err(TestimonialRejection::NotEnrolled);
    }

    if ctx.rating != Some(REQUIRED_RATING) {
        return Err(TestimonialRejection::RatingRequired);
    }

    let length = ctx.comment.chars().count();
    if length < MIN_COMMENT_CHARS {
        return Err(TestimonialRejection::CommentTooShort);
    }
    if length > MAX_COMMENT_CHARS {
        return Err(TestimonialRejection::CommentTooLong);
    }

    policy.review(ctx.comment).map_err(TestimonialRejection::ContentPolicy)?;

    if ctx.existing_count >= MAX_TESTIMONIALS_PER_USER {
        return Err(TestimonialRejection::QuotaExceeded);
    }

    Ok(())
}

#[derive(Debug, Error, PartialEq, Eq)]
pub(crate) enum PinRejection {
    #[error("no testimonial at index {0}")]
    SourceIndexOutOfRange(usize),
    #[error("pinned list already holds {MAX_PINNED} entries")]
    PinnedFull,
    #[error("this testimonial is already pinned")]
    AlreadyPinned,
}

/// Validate pinning the course testimonial at `index` against the
/// current pinned list, given as (user_id, comment) snapshot pairs.
pub(crate) fn validate_pin(
    index: usize,
    testimonial_count: usize,
    pinned: &[(String, String)],
    candidate: (&str, &str),
) -> Result<(), PinRejection> {
    if index >= testimonial_count {
        return Err(PinRejection::SourceIndexOutOfRange(index));
    }
    if pinned.len() >= MAX_PINNED {
        return Err(PinRejection::PinnedFull);
    }
    if pinned.iter().any(|(user_id, comment)| {
        user_id == candidate.0 && comment == candidate.1
    }) {
        return Err(PinRejection::AlreadyPinned);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::content_policy::WordListPolicy;

    const GOOD_COMMENT: &str = "Excellent course, the projects were really helpful.";

    fn eligible_ctx(comment: &str) -> SubmissionContext<'_> {
        SubmissionContext { enrolled: true, rating: Some(5), existing_count: 0, comment }
    }

    #[test]
    fn eligible_submission_passes() {
        let ctx = eligible_ctx(GOOD_COMMENT);
        assert!(validate_submission(&ctx, &WordListPolicy).is_ok());
    }

    #[test]
    fn enrollment_is_checked_first() {
        let ctx = SubmissionContext { enrolled: false, ..eligible_ctx("short") };
        assert_eq!(
            validate_submission(&ctx, &WordListPolicy),
            Err(TestimonialRejection::NotEnrolled)
        );
    }

    #[test]
    fn anything_but_five_stars_is_rejected() {
        for rating in [None, Some(1), Some(4)] {
            let ctx = SubmissionContext { rating, ..eligible_ctx(GOOD_COMMENT) };
            assert_eq!(
                validate_submission(&ctx, &WordListPolicy),
                Err(TestimonialRejection::RatingRequired)
            );
        }
    }

    #[test]
    fn comment_length_bounds() {
        let ctx = eligible_ctx("great!");
        assert_eq!(
            validate_submission(&ctx, &WordListPolicy),
            Err(TestimonialRejection::CommentTooShort)
        );

        let long = format!("great {}", "a".repeat(500));
        let ctx = eligible_ctx(&long);
        assert_eq!(
            validate_submission(&ctx, &WordListPolicy),
            Err(TestimonialRejection::CommentTooLong)
        );
    }

    #[test]
    fn fourth_testimonial_hits_quota() {
        for count in 0..MAX_TESTIMONIALS_PER_USER {
            let ctx = SubmissionContext { existing_count: count, ..eligible_ctx(GOOD_COMMENT) };
            assert!(validate_submission(&ctx, &WordListPolicy).is_ok());
        }

        let ctx = SubmissionContext {
            existing_count: MAX_TESTIMONIALS_PER_USER,
            ..eligible_ctx(GOOD_COMMENT)
        };
        assert_eq!(
            validate_submission(&ctx, &WordListPolicy),
            Err(TestimonialRejection::QuotaExceeded)
        );
    }

    #[test]
    fn pin_quota_and_duplicates() {
        let pinned = vec![
            ("u1".to_string(), "loved it".to_string()),
            ("u2".to_string(), "great stuff".to_string()),
        ];

        assert!(validate_pin(0, 5, &pinned, ("u3", "excellent")).is_ok());
        assert_eq!(
            validate_pin(0, 5, &pinned, ("u1", "loved it")),
            Err(PinRejection::AlreadyPinned)
        );
        // Same user with a different comment is a distinct snapshot.
        assert!(validate_pin(0, 5, &pinned, ("u1", "another take")).is_ok());

        let full = vec![
            ("u1".to_string(), "a".to_string()),
            ("u2".to_string(), "b".to_string()),
            ("u3".to_string(), "c".to_string()),
        ];
        assert_eq!(validate_pin(0, 5, &full, ("u4", "d")), Err(PinRejection::PinnedFull));
    }

    #[test]
    fn pin_index_out_of_range() {
        assert_eq!(
            validate_pin(5, 2, &[], ("u1", "x")),
            Err(PinRejection::SourceIndexOutOfRange(5))
        );
    }
}
