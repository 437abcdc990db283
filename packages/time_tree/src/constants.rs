// Our locks only guard plain data and no code of ours panics while holding them.
pub(crate) const ERR_POISONED_LOCK: &str =
    "encountered poisoned lock - the guarded data can no longer be trusted";
