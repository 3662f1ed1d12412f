//! Key formats shared by the API, the workers and the session authorizer.

use uuid::Uuid;

/// Advisory list of contest ids whose submission queues drained.
pub const GRADING_QUEUE: &str = "contest:grading";

/// Pattern matching every per-contest submission queue.
pub const SUBMISSION_QUEUE_PATTERN: &str = "contest:submissions:*";

const SUBMISSION_QUEUE_PREFIX: &str = "contest:submissions:";

/// Per-contest submission list: `contest:submissions:{contest_id}`.
pub fn submission_queue(contest_id: Uuid) -> String {
    format!("{SUBMISSION_QUEUE_PREFIX}{contest_id}")
}

/// Recover the contest id from a submission queue key.
pub fn contest_id_from_queue(key: &str) -> Option<Uuid> {
    let suffix = key.strip_prefix(SUBMISSION_QUEUE_PREFIX)?;
    Uuid::parse_str(suffix).ok()
}

/// Single-active-session mirror: `active_session:{user_id}` → session id.
pub fn active_session(user_id: Uuid) -> String {
    format!("active_session:{user_id}")
}

/// Displacement marker for a superseded session, written with a short TTL.
pub fn force_logout(session_id: Uuid) -> String {
    format!("force_logout:{session_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submission_queue_key_round_trips() {
        let contest_id = Uuid::new_v4();
        let key = submission_queue(contest_id);
        assert!(key.starts_with("contest:submissions:"));
        assert_eq!(contest_id_from_queue(&key), Some(contest_id));
    }

    #[test]
    fn foreign_keys_do_not_parse_as_queues() {
        assert_eq!(contest_id_from_queue("contest:grading"), None);
        assert_eq!(contest_id_from_queue("contest:submissions:not-a-uuid"), None);
        assert_eq!(contest_id_from_queue("active_session:abc"), None);
    }

    #[test]
    fn session_keys_embed_the_ids() {
        let id = Uuid::new_v4();
        assert_eq!(active_session(id), format!("active_session:{id}"));
        assert_eq!(force_logout(id), format!("force_logout:{id}"));
    }
}
