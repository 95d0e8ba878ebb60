//! Guard helpers for call boundaries.
//!
//! `check_argument` rejects malformed caller input, `check_state` reports that
//! the component itself (or the system below it) is in an unexpected state.

use super::{Error, Result};

pub fn check_argument(predicate: bool, msg: impl Into<String>) -> Result<()> {
    if !predicate {
        return Err(Error::IllegalArgument(msg.into()));
    }
    Ok(())
}

pub fn check_state(predicate: bool, msg: impl Into<String>) -> Result<()> {
    if !predicate {
        return Err(Error::IllegalState(msg.into()));
    }
    Ok(())
}
