//! Deploy-once guard.

/// Deployment state of a container object.
///
/// Transitions once from `NotDeployed` to `Deployed`; there is no reversal
/// path. The guard makes `deploy()` safe to call from multiple scenario
/// steps that each want the dependency "up".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeployState {
    #[default]
    NotDeployed,
    Deployed,
}

impl DeployState {
    /// Transition to `Deployed`. Returns `false` if already deployed, in
    /// which case the caller must skip its deployment work.
    pub fn set_deployed(&mut self) -> bool {
        if matches!(self, Self::Deployed) {
            return false;
        }
        *self = Self::Deployed;
        true
    }

    pub fn is_deployed(&self) -> bool {
        matches!(self, Self::Deployed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transitions_exactly_once() {
        let mut state = DeployState::default();
        assert!(!state.is_deployed());

        assert!(state.set_deployed());
        assert!(state.is_deployed());

        // Second and later attempts are no-ops.
        assert!(!state.set_deployed());
        assert!(!state.set_deployed());
        assert!(state.is_deployed());
    }
}
