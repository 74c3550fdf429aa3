//! One-shot relocation of a captured group.
//!
//! A relocation is a sequence of external moves, one per member. The
//! per-area lock guarantees two of them never run for the same area at
//! once; it is released on every exit path by [`RelocationGuard`].

use warpzone_protocol::{AreaId, Notification, PlayerId, Recipient, Vec3};

use crate::{AreaError, AreaState, NotificationSink, Presence};

/// What a relocation did.
///
/// Partial success is normal: members whose avatar vanished between
/// capture and relocation end up in `skipped`.
#[derive(Debug, Clone, PartialEq)]
pub struct RelocationReport {
    pub area: AreaId,
    /// Where members were placed (destination plus lift).
    pub landed_at: Vec3,
    pub relocated: Vec<PlayerId>,
    pub skipped: Vec<PlayerId>,
}

/// Holds an area's relocation lock; releases it on drop.
struct RelocationGuard<'a> {
    lock: &'a mut bool,
}

impl<'a> RelocationGuard<'a> {
    fn acquire(lock: &'a mut bool) -> Option<Self> {
        if *lock {
            return None;
        }
        *lock = true;
        Some(Self { lock })
    }
}

impl Drop for RelocationGuard<'_> {
    fn drop(&mut self) {
        *self.lock = false;
    }
}

impl AreaState {
    /// Moves every member of `snapshot` to `destination`, lifted by `lift`.
    ///
    /// Each relocated member gets `HideLeaveOption` and an
    /// `ArrivalEffect`. Never queues or retries.
    ///
    /// # Errors
    /// - [`AreaError::RelocationBusy`]: a relocation for this area is in
    ///   flight. Nothing happens.
    /// - [`AreaError::DestinationUnresolved`]: `destination` is `None`.
    ///   Nobody moves; the lock is released.
    pub fn relocate<P, S>(
        &mut self,
        area: &AreaId,
        snapshot: &[PlayerId],
        destination: Option<Vec3>,
        lift: f32,
        presence: &mut P,
        sink: &mut S,
    ) -> Result<RelocationReport, AreaError>
    where
        P: Presence + ?Sized,
        S: NotificationSink + ?Sized,
    {
        let Some(_guard) = RelocationGuard::acquire(&mut self.relocating) else {
            tracing::warn!(area = %area, "relocation already in flight, dropping request");
            return Err(AreaError::RelocationBusy(area.clone()));
        };

        let Some(destination) = destination else {
            tracing::warn!(area = %area, members = snapshot.len(), "no destination, relocation aborted");
            return Err(AreaError::DestinationUnresolved(area.clone()));
        };

        let landed_at = destination.lifted(lift);
        let mut report = RelocationReport {
            area: area.clone(),
            landed_at,
            relocated: Vec::with_capacity(snapshot.len()),
            skipped: Vec::new(),
        };

        for &player_id in snapshot {
            if presence.move_to(player_id, landed_at) {
                sink.notify(Recipient::Player(player_id), Notification::HideLeaveOption);
                sink.notify(
                    Recipient::Player(player_id),
                    Notification::ArrivalEffect { player: player_id },
                );
                report.relocated.push(player_id);
            } else {
                tracing::debug!(area = %area, %player_id, "no live presence, skipped");
                report.skipped.push(player_id);
            }
        }

        tracing::info!(
            area = %area,
            relocated = report.relocated.len(),
            skipped = report.skipped.len(),
            "group relocated"
        );
        Ok(report)
    }
}
