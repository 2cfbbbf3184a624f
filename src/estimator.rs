//! The estimator seam.
//!
//! An [`Estimator`] turns a [`FitRequest`] into a [`MediationFit`], drawing
//! all of its randomness from the caller's [`SimRng`]. The moderated-mediation
//! test depends only on this trait.

use crate::error::MediationError;
use crate::fit::MediationFit;
use crate::request::FitRequest;
use crate::rng::SimRng;

/// Produces mediation fits from fit requests.
pub trait Estimator {
    /// Estimator-specific failure.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Fits the mediation models described by `request`.
    fn estimate(
        &self,
        request: &FitRequest,
        rng: &mut SimRng,
    ) -> Result<MediationFit, Self::Error>;
}

impl<E: Estimator + ?Sized> Estimator for &E {
    type Error = E::Error;

    fn estimate(
        &self,
        request: &FitRequest,
        rng: &mut SimRng,
    ) -> Result<MediationFit, Self::Error> {
        (**self).estimate(request, rng)
    }
}

/// Runs `estimator`, boxing its error into [`MediationError::Estimator`].
pub(crate) fn run_estimator<E: Estimator + ?Sized>(
    estimator: &E,
    request: &FitRequest,
    rng: &mut SimRng,
) -> Result<MediationFit, MediationError> {
    estimator
        .estimate(request, rng)
        .map_err(|e| MediationError::Estimator(Box::new(e)))
}
