//! Authorization gate comparing required and recorded access levels.

use crate::error::{FrameworkError, FrameworkResult};
use crate::session::Session;

/// Compares a handler's required level against the level recorded in the
/// current session. Level 0 means public.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessGate;

impl AccessGate {
    /// Fails with [`FrameworkError::Forbidden`] iff `required > 0` and the
    /// session's level is below it. Reads the session fresh on every
    /// call, so a session expiring mid-flight surfaces here too.
    pub fn check(session: &mut Session, required: u32) -> FrameworkResult<()> {
        if required == 0 {
            return Ok(());
        }
        let actual = session.access_level()?;
        if required > actual {
            return Err(FrameworkError::Forbidden { required, actual });
        }
        Ok(())
    }
}
