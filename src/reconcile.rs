use crate::model::Batch;

/// A confirmed backend change to apply to a local batch list.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    /// Replace the whole list with a fresh fetch.
    Reset(Vec<Batch>),
    /// A newly created record.
    Append(Batch),
    /// The backend's current copy of an existing record.
    Replace(Batch),
    Remove(String),
}

/// Return the list that results from applying `op` to `list`.
///
/// `Replace` swaps the whole record; no field of the previous local copy
/// survives. Appending an id that is already present replaces it in place,
/// and replacing or removing an unknown id leaves the list unchanged.
pub fn apply_mutation(list: &[Batch], op: Mutation) -> Vec<Batch> {
    match op {
        Mutation::Reset(batches) => batches,
        Mutation::Append(batch) => {
            let mut next = list.to_vec();
            match next.iter_mut().find(|b| b.id == batch.id) {
                Some(slot) => *slot = batch,
                None => next.push(batch),
            }
            next
        }
        Mutation::Replace(batch) => list
            .iter()
            .map(|b| if b.id == batch.id { batch.clone() } else { b.clone() })
            .collect(),
        Mutation::Remove(id) => list.iter().filter(|b| b.id != id).cloned().collect(),
    }
}
