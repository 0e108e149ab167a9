/*!
 * xv6 Bootstrap
 * Reserves the data segment with a single sbrk
 */

use super::abi::Xv6Abi;
use super::target::Xv6Target;
use crate::core::SENTINEL_FAILURE;
use crate::target::{Bootstrap, BootstrapError, DataSegment, DataSegmentRequest};
use tracing::{debug, error};

impl<A: Xv6Abi> Bootstrap for Xv6Target<A> {
    /// xv6 has no fixed mappings, so the preferred base is ignored and the
    /// segment starts at the previous break.
    fn init(
        &mut self,
        argv: &[String],
        request: DataSegmentRequest,
    ) -> Result<DataSegment, BootstrapError> {
        debug!(argc = argv.len(), size = request.size, "xv6 bootstrap");

        let refused = BootstrapError::DataSegmentRefused { size: request.size };
        let increment = i32::try_from(request.size).map_err(|_| refused)?;
        let base = self.abi.sbrk(increment);
        if base == SENTINEL_FAILURE {
            error!(size = request.size, "sbrk refused the data segment");
            return Err(refused);
        }

        Ok(DataSegment {
            base: base as usize,
            size: request.size,
        })
    }
}
