/// Policy applied by a [`CancellationService`](crate::CancellationService).
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Config {
    /// Permit forced termination of threads on platforms that only offer it.
    ///
    /// Forced termination leaves the target's locks held and its shared state
    /// corrupted, so it must be opted into explicitly. When `false`, requests
    /// against handles with [`Semantics::Forced`](crate::Semantics::Forced) are
    /// rejected with
    /// [`Error::ForcedTerminationDisallowed`](crate::Error::ForcedTerminationDisallowed).
    pub allow_forced_termination: bool,
    /// The exit code a forcibly terminated thread reports.
    pub exit_code: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            allow_forced_termination: false,
            exit_code: 0,
        }
    }
}
