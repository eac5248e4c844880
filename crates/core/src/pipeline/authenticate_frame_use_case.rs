use std::time::Instant;

use crate::audit::domain::audit_sink::AuditSink;
use crate::auth::domain::authenticator::{Authenticator, Evaluation};
use crate::detection::domain::face_locator::FaceLocator;
use crate::recognition::domain::identity_oracle::IdentityOracle;
use crate::shared::frame::Frame;
use crate::shared::region::FaceRegion;

use super::pipeline_logger::PipelineLogger;

/// One located face and the decision taken for it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FaceOutcome {
    pub region: FaceRegion,
    pub evaluation: Evaluation,
}

/// Locates faces in a frame and runs each one, in detection order,
/// through the authenticator.
///
/// A frame without faces produces no outcomes and leaves the
/// authenticator untouched.
pub struct AuthenticateFrameUseCase {
    locator: Box<dyn FaceLocator>,
    oracle: Box<dyn IdentityOracle>,
}

impl AuthenticateFrameUseCase {
    pub fn new(locator: Box<dyn FaceLocator>, oracle: Box<dyn IdentityOracle>) -> Self {
        Self { locator, oracle }
    }

    pub fn execute(
        &mut self,
        frame: &Frame,
        now: Instant,
        authenticator: &mut Authenticator,
        audit: &mut dyn AuditSink,
        logger: &mut dyn PipelineLogger,
    ) -> Result<Vec<FaceOutcome>, Box<dyn std::error::Error>> {
        let t0 = Instant::now();
        let regions = self.locator.locate(frame)?;
        logger.timing("locate", elapsed_ms(t0));
        logger.metric("faces", regions.len() as f64);

        if regions.is_empty() {
            return Ok(Vec::new());
        }

        let t0 = Instant::now();
        let mut outcomes = Vec::with_capacity(regions.len());
        for region in regions {
            let evaluation =
                authenticator.evaluate(frame, &region, now, self.oracle.as_mut(), audit)?;
            outcomes.push(FaceOutcome { region, evaluation });
        }
        logger.timing("evaluate", elapsed_ms(t0));
        Ok(outcomes)
    }
}

pub(crate) fn elapsed_ms(since: Instant) -> f64 {
    since.elapsed().as_secs_f64() * 1000.0
}
