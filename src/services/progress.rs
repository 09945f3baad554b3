/// Whether a user's completed count has reached the course total. An
/// empty course never counts as completed, so a course with no lectures
/// cannot fire a completion event.
pub(crate) fn completion_reached(completed: i64, total: i64) -> bool {
    total > 0 && completed >= total
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn below_threshold_is_incomplete() {
        assert!(!completion_reached(0, 3));
        assert!(!completion_reached(2, 3));
    }

    #[test]
    fn meeting_or_exceeding_total_completes() {
        assert!(completion_reached(3, 3));
        assert!(completion_reached(4, 3));
    }

    #[test]
    fn empty_course_never_completes() {
        assert!(!completion_reached(0, 0));
        assert!(!completion_reached(5, 0));
    }
}
