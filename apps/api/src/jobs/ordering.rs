use crate::models::job::Job;

/// Moves job `id` to board position `to_order` and renumbers the whole board
/// `1..=N`. The target is clamped into range. Returns `None` if `id` is unknown.
pub fn reorder(mut jobs: Vec<Job>, id: &str, to_order: i64) -> Option<Vec<Job>> {
    // Stable, so equal orders keep their incoming (primary key) sequence.
    jobs.sort_by_key(|j| j.order);
    let from = jobs.iter().position(|j| j.id == id)?;
    let moving = jobs.remove(from);

    let insert_at = to_order.saturating_sub(1).clamp(0, jobs.len() as i64) as usize;
    jobs.insert(insert_at, moving);

    for (i, job) in jobs.iter_mut().enumerate() {
        job.order = i as i64 + 1;
    }
    Some(jobs)
}
