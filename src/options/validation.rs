use super::models::ResolvedOptions;
use crate::error::SheetError;
use crate::status::RequestState;

/// Pre-flight checks, in order. Nothing here touches the status cache.
pub fn validate(resolved: &ResolvedOptions, state: &RequestState) -> Result<(), SheetError> {
    validate_output(resolved)?;
    validate_location(resolved)?;
    validate_state(state)?;
    Ok(())
}

/// The rows need somewhere to go.
fn validate_output(resolved: &ResolvedOptions) -> Result<(), SheetError> {
    if resolved.user.target.is_none() && resolved.user.callback.is_none() {
        return Err(SheetError::NoOutput);
    }
    Ok(())
}

fn validate_location(resolved: &ResolvedOptions) -> Result<(), SheetError> {
    if resolved.request.key.is_empty() || resolved.request.gid.is_empty() {
        return Err(SheetError::MissingKeyOrGid);
    }
    Ok(())
}

/// Failed requests stay failed until reset; loaded requests have nothing left.
fn validate_state(state: &RequestState) -> Result<(), SheetError> {
    if state.failed {
        return Err(SheetError::PriorFailure);
    }
    if state.loaded {
        return Err(SheetError::AlreadyLoaded);
    }
    Ok(())
}
