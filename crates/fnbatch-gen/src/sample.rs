use fnbatch_core::errors::{BatchError, ErrorInfo};

/// Returns the indices picked by [`evenly_distributed_subset`] for a sequence
/// of length `len` reduced to `n` entries.
///
/// The first and last index are always kept. The `n - 2` interior picks start
/// at index 1 and advance by `floor((len - 2) / (n - 2))`.
pub fn evenly_distributed_indices(len: usize, n: usize) -> Result<Vec<usize>, BatchError> {
    if len == 0 || n == 0 {
        return Err(BatchError::Sampler(
            ErrorInfo::new(
                "sampler.invalid",
                "cannot sample an empty sequence or request zero items",
            )
            .with_context("len", len.to_string())
            .with_context("n", n.to_string()),
        ));
    }
    if len <= n {
        return Ok((0..len).collect());
    }
    if n == 1 {
        return Ok(vec![0]);
    }
    let mut indices = Vec::with_capacity(n);
    indices.push(0);
    if n > 2 {
        let interval = (len - 2) / (n - 2);
        indices.extend((0..n - 2).map(|step| 1 + step * interval));
    }
    indices.push(len - 1);
    Ok(indices)
}

/// Picks `n` evenly spaced items from `items`, keeping both edges.
///
/// Sequences that already fit are returned unchanged.
pub fn evenly_distributed_subset<T: Clone>(items: &[T], n: usize) -> Result<Vec<T>, BatchError> {
    let indices = evenly_distributed_indices(items.len(), n)?;
    Ok(indices.into_iter().map(|idx| items[idx].clone()).collect())
}
