//! Device position: the platform boundary behind `get_current_position`.

use super::types::{Coordinate, Position, PositionError, PositionOptions};
use async_trait::async_trait;
use std::time::Duration;
use tracing::warn;

/// Fixed time budget for a position fix.
pub const POSITION_TIMEOUT: Duration = Duration::from_secs(10);

/// A platform facility that can report the device's current coordinate.
#[async_trait]
pub trait PositionSource: Send + Sync {
    async fn locate(&self, opts: &PositionOptions) -> Result<Position, PositionError>;
}

/// A source that always reports the same coordinate (manual override).
#[derive(Debug, Clone, Copy)]
pub struct FixedPositionSource {
    coordinate: Coordinate,
}

impl FixedPositionSource {
    pub fn new(coordinate: Coordinate) -> Self {
        Self { coordinate }
    }
}

#[async_trait]
impl PositionSource for FixedPositionSource {
    async fn locate(&self, _opts: &PositionOptions) -> Result<Position, PositionError> {
        Ok(Position {
            coordinate: self.coordinate,
            accuracy_m: Some(0.0),
            fixed_at: chrono::Utc::now(),
        })
    }
}

/// Ask `source` for a high-accuracy fix, giving up after [`POSITION_TIMEOUT`].
///
/// `None` means the platform exposes no geolocation at all.
pub async fn get_current_position(
    source: Option<&dyn PositionSource>,
) -> Result<Position, PositionError> {
    get_current_position_within(source, POSITION_TIMEOUT).await
}

pub(crate) async fn get_current_position_within(
    source: Option<&dyn PositionSource>,
    timeout: Duration,
) -> Result<Position, PositionError> {
    let source = source.ok_or(PositionError::Unsupported)?;
    let opts = PositionOptions {
        high_accuracy: true,
        timeout,
    };

    match tokio::time::timeout(timeout, source.locate(&opts)).await {
        Ok(Ok(position)) => Ok(position),
        Ok(Err(e)) => {
            warn!(error = %e, "position source failed");
            Err(e)
        }
        Err(_) => {
            warn!(?timeout, "no position fix in time");
            Err(PositionError::Timeout(timeout))
        }
    }
}
