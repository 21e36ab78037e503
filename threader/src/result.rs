use super::*;

/// The outcome of a single cancellation request.
///
/// `Accepted` only means the OS registered the request; see [`Semantics`]
/// for how much that promises.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum CancellationResult {
    Accepted(Semantics),
    Rejected(Error),
}

impl CancellationResult {
    pub fn is_accepted(&self) -> bool {
        matches!(self, CancellationResult::Accepted(_))
    }

    /// The semantics the request was accepted under.
    pub fn semantics(&self) -> Option<Semantics> {
        match self {
            CancellationResult::Accepted(semantics) => Some(*semantics),
            CancellationResult::Rejected(_) => None,
        }
    }

    pub fn error(&self) -> Option<&Error> {
        match self {
            CancellationResult::Accepted(_) => None,
            CancellationResult::Rejected(e) => Some(e),
        }
    }

    /// The platform diagnostic code of a rejection, if the OS produced one.
    pub fn os_code(&self) -> Option<i32> {
        self.error().and_then(Error::os_code)
    }

    pub fn into_result(self) -> Result<Semantics, Error> {
        self.into()
    }
}

impl From<Result<Semantics, Error>> for CancellationResult {
    fn from(value: Result<Semantics, Error>) -> Self {
        match value {
            Ok(semantics) => CancellationResult::Accepted(semantics),
            Err(e) => CancellationResult::Rejected(e),
        }
    }
}

impl From<CancellationResult> for Result<Semantics, Error> {
    fn from(value: CancellationResult) -> Self {
        match value {
            CancellationResult::Accepted(semantics) => Ok(semantics),
            CancellationResult::Rejected(e) => Err(e),
        }
    }
}
