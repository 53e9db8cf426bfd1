//! Active power-up effect arbiter
//!
//! At most one effect is live at a time. Collecting a second effect cancels
//! the first outright - no stacking, no queueing, no duration extension. The
//! multiplier queries are read-only and safe to call every frame from any
//! collaborator (hazard movement, score reporting, collection arc).

use serde::{Deserialize, Serialize};

use super::state::PowerUpKind;

/// Named multiplier channel queried by unrelated systems
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectAxis {
    /// Hazard orbit speed; 0.5 while Slowmo is active
    Speed,
    /// Collectible value at report time; 2.0 while DoublePoints is active
    Score,
    /// Collection arc width; widened while Magnet is active
    CollectRadius,
}

/// The single live effect, if any
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ActiveEffect {
    pub kind: PowerUpKind,
    pub remaining: f32,
    pub duration: f32,
}

/// Axis values applied while the matching effect is active
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EffectStrengths {
    pub slowmo_speed: f32,
    pub double_points_score: f32,
    pub magnet_collect: f32,
}

impl Default for EffectStrengths {
    fn default() -> Self {
        Self {
            slowmo_speed: 0.5,
            double_points_score: 2.0,
            magnet_collect: 2.5,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EffectArbiter {
    active: Option<ActiveEffect>,
    strengths: EffectStrengths,
}

impl EffectArbiter {
    pub fn new(strengths: EffectStrengths) -> Self {
        Self {
            active: None,
            strengths,
        }
    }

    /// Start an effect at its full duration, cancelling any live one.
    pub fn activate(&mut self, kind: PowerUpKind, duration: f32) {
        if let Some(prev) = self.active {
            log::debug!("effect {:?} cancelled by {:?}", prev.kind, kind);
        }
        self.active = Some(ActiveEffect {
            kind,
            remaining: duration,
            duration,
        });
    }

    /// Count down the live effect; expiry returns to idle.
    pub fn tick(&mut self, dt: f32) {
        if let Some(effect) = &mut self.active {
            effect.remaining -= dt;
            if effect.remaining <= 0.0 {
                self.active = None;
            }
        }
    }

    /// Shield is consumed on use (hazard contact), not timed out here.
    pub fn consume(&mut self, kind: PowerUpKind) {
        if self.is_kind_active(kind) {
            self.active = None;
        }
    }

    pub fn active(&self) -> Option<&ActiveEffect> {
        self.active.as_ref()
    }

    pub fn is_kind_active(&self, kind: PowerUpKind) -> bool {
        self.active.map(|e| e.kind == kind).unwrap_or(false)
    }

    /// Read-only multiplier for the given axis; 1.0 when no matching effect.
    pub fn multiplier(&self, axis: EffectAxis) -> f32 {
        match axis {
            EffectAxis::Speed if self.is_kind_active(PowerUpKind::Slowmo) => {
                self.strengths.slowmo_speed
            }
            EffectAxis::Score if self.is_kind_active(PowerUpKind::DoublePoints) => {
                self.strengths.double_points_score
            }
            EffectAxis::CollectRadius if self.is_kind_active(PowerUpKind::Magnet) => {
                self.strengths.magnet_collect
            }
            _ => 1.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replacement_cancels_previous() {
        // Shield then Slowmo before Shield expires: Slowmo at full duration
        let mut arb = EffectArbiter::default();
        arb.activate(PowerUpKind::Shield, 6.0);
        arb.tick(2.0);
        arb.activate(PowerUpKind::Slowmo, 4.0);

        assert!(!arb.is_kind_active(PowerUpKind::Shield));
        assert!(arb.is_kind_active(PowerUpKind::Slowmo));
        let e = arb.active().unwrap();
        assert_eq!(e.remaining, e.duration);
    }

    #[test]
    fn test_expiry_returns_to_idle() {
        let mut arb = EffectArbiter::default();
        arb.activate(PowerUpKind::Magnet, 1.0);
        arb.tick(0.6);
        assert!(arb.is_kind_active(PowerUpKind::Magnet));
        arb.tick(0.6);
        assert!(arb.active().is_none());
        assert_eq!(arb.multiplier(EffectAxis::CollectRadius), 1.0);
    }

    #[test]
    fn test_axes_are_independent() {
        let mut arb = EffectArbiter::default();
        arb.activate(PowerUpKind::Slowmo, 5.0);
        assert_eq!(arb.multiplier(EffectAxis::Speed), 0.5);
        assert_eq!(arb.multiplier(EffectAxis::Score), 1.0);
        assert_eq!(arb.multiplier(EffectAxis::CollectRadius), 1.0);

        arb.activate(PowerUpKind::DoublePoints, 5.0);
        assert_eq!(arb.multiplier(EffectAxis::Speed), 1.0);
        assert_eq!(arb.multiplier(EffectAxis::Score), 2.0);
    }

    #[test]
    fn test_shield_consumed_on_use() {
        let mut arb = EffectArbiter::default();
        arb.activate(PowerUpKind::Shield, 10.0);
        arb.consume(PowerUpKind::Shield);
        assert!(arb.active().is_none());
        // Consuming a kind that is not active is a no-op
        arb.activate(PowerUpKind::Magnet, 5.0);
        arb.consume(PowerUpKind::Shield);
        assert!(arb.is_kind_active(PowerUpKind::Magnet));
    }
}
