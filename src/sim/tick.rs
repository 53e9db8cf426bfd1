//! Session orchestration
//!
//! `Session` owns the three spawner families, every live entity, the effect
//! arbiter, and the tally for one run. The host drives it with `tick(dt)`
//! once per frame; nothing in here spins its own clock. All randomness flows
//! through the session RNG so a seed replays the whole run.

use rand::Rng;
use rand_pcg::Pcg32;
use serde::Serialize;

use crate::platform::{Host, ObjectiveKind};
use crate::tuning::{FamilyTuning, Tuning};
use crate::{arc_distance, consts, normalize_angle};

use super::effects::{EffectArbiter, EffectAxis};
use super::lifecycle::{LifecycleEvent, SpawnedEntity};
use super::placement::{self, PlacementStats};
use super::pool::BurstPool;
use super::scheduler::SpawnScheduler;
use super::state::{CollectibleKind, EntityKind, Family, PowerUpKind, RngState, SessionPhase};
use super::tally::SessionTally;

/// Startup handshake with the player-position provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Activation {
    /// start() not called yet, or torn down
    Inactive,
    /// Player reference missing at start; waiting out the backoff before the
    /// single retry
    Pending { retrying: bool },
    Active,
    /// Retry also came up empty; spawning never activates this session
    Failed,
}

/// A full play session: spawners, entities, effects, tally
pub struct Session {
    pub seed: u64,
    rng_state: RngState,
    rng: Pcg32,
    phase: SessionPhase,
    time_ticks: u64,
    tuning: Tuning,

    collectibles: SpawnScheduler,
    power_ups: SpawnScheduler,
    hazards: SpawnScheduler,

    entities: Vec<SpawnedEntity>,
    effects: EffectArbiter,
    tally: SessionTally,
    bursts: BurstPool,
    placement_stats: PlacementStats,

    activation: Activation,
    activation_backoff: f32,
    next_id: u32,
}

/// Serializable view for replay checks and host snapshots
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub phase: SessionPhase,
    pub time_ticks: u64,
    pub entities: Vec<(u32, EntityKind, f32)>,
    pub tally: SessionTally,
    pub active_effect: Option<PowerUpKind>,
}

fn scheduler_for(family: &FamilyTuning) -> SpawnScheduler {
    SpawnScheduler::new(
        family.min_interval,
        family.max_interval,
        family.initial_delay,
        family.max_on_screen,
    )
}

impl Session {
    pub fn new(seed: u64, tuning: Tuning) -> Self {
        let rng_state = RngState::new(seed);
        Self {
            seed,
            rng: rng_state.to_rng(),
            rng_state,
            phase: SessionPhase::Ready,
            time_ticks: 0,
            collectibles: scheduler_for(&tuning.collectibles),
            power_ups: scheduler_for(&tuning.power_ups),
            hazards: scheduler_for(&tuning.hazards),
            entities: Vec::new(),
            effects: EffectArbiter::default(),
            tally: SessionTally::new(),
            bursts: BurstPool::with_capacity(tuning.burst_pool),
            placement_stats: PlacementStats::default(),
            activation: Activation::Inactive,
            activation_backoff: 0.0,
            next_id: 1,
            tuning,
        }
    }

    /// Begin a run. Hard teardown of anything left from a previous session,
    /// then arm the spawners - or enter the retry path when the player
    /// reference is missing.
    pub fn start(&mut self, host: &Host<'_>) {
        self.teardown();
        self.phase = SessionPhase::Running;

        if host.player.is_some() {
            self.activate();
        } else {
            log::warn!(
                "player reference missing at session start, retrying in {}s",
                consts::REF_RETRY_BACKOFF
            );
            self.activation = Activation::Pending { retrying: false };
            self.activation_backoff = consts::REF_RETRY_BACKOFF;
        }
    }

    /// Stop spawning without ending the run (pause menus, interstitials)
    pub fn stop_spawning(&mut self) {
        self.collectibles.stop();
        self.power_ups.stop();
        self.hazards.stop();
    }

    /// End the run and settle the tally into the wallet. Safe to call more
    /// than once; settlement itself runs at most once.
    pub fn finish(&mut self, host: &mut Host<'_>) {
        self.stop_spawning();
        self.phase = SessionPhase::Ended;
        self.tally.settle(host.wallet);
    }

    /// Hard reset back to Ready: counters zeroed, live entities cleared.
    pub fn reset_session(&mut self) {
        self.teardown();
        self.phase = SessionPhase::Ready;
    }

    fn teardown(&mut self) {
        self.entities.clear();
        self.tally.reset();
        self.effects = EffectArbiter::default();
        self.bursts.clear();
        self.placement_stats = PlacementStats::default();
        self.collectibles = scheduler_for(&self.tuning.collectibles);
        self.power_ups = scheduler_for(&self.tuning.power_ups);
        self.hazards = scheduler_for(&self.tuning.hazards);
        self.activation = Activation::Inactive;
        self.activation_backoff = 0.0;
        self.time_ticks = 0;
    }

    fn activate(&mut self) {
        self.collectibles.start();
        self.power_ups.start();
        self.hazards.start();
        self.activation = Activation::Active;
        log::info!("session spawners armed (seed {})", self.seed);
    }

    /// Advance the session by one frame.
    pub fn tick(&mut self, dt: f32, host: &mut Host<'_>) {
        if self.phase != SessionPhase::Running {
            return;
        }
        self.time_ticks += 1;

        self.update_activation(dt, host);

        self.effects.tick(dt);
        self.bursts.tick(dt);

        // Age entities; expired ones leave with no reward
        let mut any_expired = false;
        for entity in &mut self.entities {
            if entity.advance(dt) == LifecycleEvent::Expired {
                any_expired = true;
            }
        }
        if any_expired {
            self.entities.retain(|e| e.age < e.lifetime);
        }

        // Hazards orbit; Slowmo halves their speed through the Speed axis
        let hazard_step =
            self.tuning.hazard_speed * self.effects.multiplier(EffectAxis::Speed) * dt;
        for entity in &mut self.entities {
            if entity.kind == EntityKind::Hazard {
                entity.angle = normalize_angle(entity.angle + hazard_step);
            }
        }

        if self.activation == Activation::Active {
            if let Some(player) = host.player {
                let player_angle = player.angle();
                self.run_spawners(dt, player_angle);
                self.run_collection(player_angle, host);
            }
        }
    }

    fn update_activation(&mut self, dt: f32, host: &Host<'_>) {
        if let Activation::Pending { retrying } = self.activation {
            self.activation_backoff -= dt;
            if self.activation_backoff > 0.0 {
                return;
            }
            if host.player.is_some() {
                self.activate();
            } else if !retrying {
                self.activation = Activation::Pending { retrying: true };
                self.activation_backoff = consts::REF_RETRY_BACKOFF;
            } else {
                log::warn!("player reference still missing after retry; spawning disabled for this session");
                self.activation = Activation::Failed;
            }
        }
    }

    fn run_spawners(&mut self, dt: f32, player_angle: f32) {
        for family in Family::ALL {
            let fired = match family {
                Family::Collectible => self.collectibles.tick(dt, &mut self.rng),
                Family::PowerUp => self.power_ups.tick(dt, &mut self.rng),
                Family::Hazard => self.hazards.tick(dt, &mut self.rng),
            };
            if fired {
                self.try_spawn(family, player_angle);
            }
        }
    }

    /// One spawn attempt: placement first, then the on-screen cap. The
    /// scheduler has already consumed the attempt either way.
    fn try_spawn(&mut self, family: Family, player_angle: f32) {
        let occupied: Vec<f32> = self
            .entities
            .iter()
            .filter(|e| e.kind.family() == family)
            .map(|e| e.angle)
            .collect();

        let tuning = match family {
            Family::Collectible => &self.tuning.collectibles,
            Family::PowerUp => &self.tuning.power_ups,
            Family::Hazard => &self.tuning.hazards,
        };

        let Some(angle) = placement::find_site(
            &mut self.rng,
            player_angle,
            &occupied,
            &tuning.placement,
            &mut self.placement_stats,
        ) else {
            return;
        };

        let cap = match family {
            Family::Collectible => self.collectibles.max_on_screen,
            Family::PowerUp => self.power_ups.max_on_screen,
            Family::Hazard => self.hazards.max_on_screen,
        };
        if occupied.len() >= cap {
            log::debug!("{family:?} at cap ({cap}), spawn suppressed");
            return;
        }

        let lifetime = tuning.lifetime;
        let fade_window = tuning.fade_window;

        let (kind, value) = match family {
            Family::Collectible => {
                let Some(row) = self.tuning.rarity.draw(&mut self.rng) else {
                    return;
                };
                (EntityKind::Collectible(row.kind), row.value)
            }
            Family::PowerUp => {
                let idx = self.rng.random_range(0..PowerUpKind::ALL.len());
                (EntityKind::PowerUp(PowerUpKind::ALL[idx]), 0)
            }
            Family::Hazard => (EntityKind::Hazard, 0),
        };

        let id = self.next_id;
        self.next_id += 1;
        self.entities
            .push(SpawnedEntity::new(id, kind, angle, value, lifetime, fade_window));
        log::debug!("spawned {kind:?} #{id} at {angle:.2} rad");
    }

    fn run_collection(&mut self, player_angle: f32, host: &mut Host<'_>) {
        let base_arc = self.tuning.collect_arc;
        let magnet_arc = base_arc * self.effects.multiplier(EffectAxis::CollectRadius);
        let score_mult = self.effects.multiplier(EffectAxis::Score);
        let track_radius = self.tuning.track_radius;
        let burst_ttl = self.tuning.burst_ttl;
        let effect_durations = self.tuning.effects.clone();

        let mut tally_changed = false;
        let mut run_over = false;

        for entity in &mut self.entities {
            if entity.age >= entity.lifetime {
                continue;
            }
            // Magnet widens the collection arc for collectibles only
            let arc = match entity.kind {
                EntityKind::Collectible(_) => magnet_arc,
                _ => base_arc,
            };
            if arc_distance(entity.angle, player_angle) > arc {
                continue;
            }
            if !entity.try_collect() {
                continue;
            }

            let pos = entity.pos(track_radius);
            match entity.kind {
                EntityKind::Collectible(kind) => {
                    // Multiplier applies at report time, so an effect picked
                    // up after this entity spawned still counts
                    let value = (entity.value as f32 * score_mult).round() as u64;
                    self.tally.record_collectible(kind, value);
                    tally_changed = true;
                    if let Some(missions) = host.missions.as_deref_mut() {
                        missions.report_progress(ObjectiveKind::Collectibles, 1);
                        if kind != CollectibleKind::Normal {
                            missions.report_progress(ObjectiveKind::RareCollectibles, 1);
                        }
                    }
                }
                EntityKind::PowerUp(kind) => {
                    let duration = match kind {
                        PowerUpKind::Shield => effect_durations.shield,
                        PowerUpKind::Slowmo => effect_durations.slowmo,
                        PowerUpKind::Magnet => effect_durations.magnet,
                        PowerUpKind::DoublePoints => effect_durations.double_points,
                    };
                    self.effects.activate(kind, duration);
                    self.tally.record_power_up(kind);
                    tally_changed = true;
                    if let Some(missions) = host.missions.as_deref_mut() {
                        missions.report_progress(ObjectiveKind::PowerUps, 1);
                    }
                }
                EntityKind::Hazard => {
                    if self.effects.is_kind_active(PowerUpKind::Shield) {
                        // Shield absorbs the hit and is spent
                        self.effects.consume(PowerUpKind::Shield);
                        log::info!("shield absorbed hazard #{}", entity.id);
                    } else {
                        run_over = true;
                    }
                }
            }

            if let Some(feedback) = host.feedback.as_deref_mut() {
                feedback.collected(entity.kind);
            }
            self.bursts.emit(pos, entity.kind, burst_ttl);
        }

        self.entities.retain(|e| !e.is_collected());

        if tally_changed {
            if let Some(hud) = host.hud.as_deref_mut() {
                hud.tally_changed(&self.tally);
            }
        }
        if run_over {
            log::info!("hazard contact at tick {}, run over", self.time_ticks);
            self.finish(host);
        }
    }

    // --- Read-only queries ---

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn time_ticks(&self) -> u64 {
        self.time_ticks
    }

    pub fn tally(&self) -> &SessionTally {
        &self.tally
    }

    pub fn effects(&self) -> &EffectArbiter {
        &self.effects
    }

    pub fn entities(&self) -> &[SpawnedEntity] {
        &self.entities
    }

    pub fn bursts(&self) -> &BurstPool {
        &self.bursts
    }

    pub fn placement_stats(&self) -> &PlacementStats {
        &self.placement_stats
    }

    pub fn rng_state(&self) -> &RngState {
        &self.rng_state
    }

    pub fn live_count(&self, family: Family) -> usize {
        self.entities
            .iter()
            .filter(|e| e.kind.family() == family)
            .count()
    }

    /// Spawning never armed because the player reference never showed up
    pub fn spawning_failed(&self) -> bool {
        self.activation == Activation::Failed
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            phase: self.phase,
            time_ticks: self.time_ticks,
            entities: self
                .entities
                .iter()
                .map(|e| (e.id, e.kind, e.angle))
                .collect(),
            tally: self.tally.clone(),
            active_effect: self.effects.active().map(|e| e.kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{FixedPlayer, RecordingHost};
    use proptest::prelude::*;

    fn fast_tuning() -> Tuning {
        let mut t = Tuning::default();
        t.collectibles.min_interval = 0.2;
        t.collectibles.max_interval = 0.4;
        t.collectibles.initial_delay = 0.0;
        t.power_ups.min_interval = 0.5;
        t.power_ups.max_interval = 1.0;
        t.power_ups.initial_delay = 0.0;
        t.hazards.min_interval = 0.5;
        t.hazards.max_interval = 1.0;
        t.hazards.initial_delay = 0.0;
        t
    }

    fn started(seed: u64, player: &FixedPlayer, wallet: &mut RecordingHost) -> Session {
        let mut session = Session::new(seed, fast_tuning());
        let h = Host {
            player: Some(player),
            wallet,
            missions: None,
            feedback: None,
            hud: None,
        };
        session.start(&h);
        session
    }

    fn run_ticks(session: &mut Session, player: &FixedPlayer, wallet: &mut RecordingHost, n: u32) {
        for _ in 0..n {
            let mut h = Host {
                player: Some(player),
                wallet,
                missions: None,
                feedback: None,
                hud: None,
            };
            session.tick(crate::consts::SIM_DT, &mut h);
        }
    }

    #[test]
    fn test_caps_hold_under_sustained_spawning() {
        let player = FixedPlayer { angle: 0.0, radius: crate::consts::TRACK_RADIUS };
        let mut wallet = RecordingHost::default();
        let mut session = started(42, &player, &mut wallet);
        let caps = (
            session.tuning.collectibles.max_on_screen,
            session.tuning.power_ups.max_on_screen,
            session.tuning.hazards.max_on_screen,
        );

        for _ in 0..3600 {
            let mut h = Host {
                player: Some(&player),
                wallet: &mut wallet,
                missions: None,
                feedback: None,
                hud: None,
            };
            session.tick(crate::consts::SIM_DT, &mut h);
            if session.phase() != SessionPhase::Running {
                break;
            }
            assert!(session.live_count(Family::Collectible) <= caps.0);
            assert!(session.live_count(Family::PowerUp) <= caps.1);
            assert!(session.live_count(Family::Hazard) <= caps.2);
        }
    }

    #[test]
    fn test_same_seed_replays_identically() {
        let player = FixedPlayer { angle: 1.2, radius: crate::consts::TRACK_RADIUS };
        let mut snaps = Vec::new();
        for _ in 0..2 {
            let mut wallet = RecordingHost::default();
            let mut session = started(777, &player, &mut wallet);
            run_ticks(&mut session, &player, &mut wallet, 1200);
            snaps.push(serde_json::to_string(&session.snapshot()).unwrap());
        }
        assert_eq!(snaps[0], snaps[1], "same seed must replay identically");
    }

    #[test]
    fn test_collection_applies_multiplier_at_report_time() {
        let player = FixedPlayer { angle: 0.0, radius: crate::consts::TRACK_RADIUS };
        let mut wallet = RecordingHost::default();
        let mut session = started(5, &player, &mut wallet);

        // Hand-place a Normal collectible (value 2) on the player, then
        // activate DoublePoints after the spawn
        session.entities.push(SpawnedEntity::new(
            99,
            EntityKind::Collectible(CollectibleKind::Normal),
            0.0,
            2,
            10.0,
            1.0,
        ));
        session.effects.activate(PowerUpKind::DoublePoints, 5.0);

        let mut h = Host {
            player: Some(&player),
            wallet: &mut wallet,
            missions: None,
            feedback: None,
            hud: None,
        };
        session.run_collection(0.0, &mut h);
        assert_eq!(session.tally().total_value, 4, "value 2 doubled at report time");
    }

    #[test]
    fn test_missing_player_retries_then_goes_inert() {
        let mut session = Session::new(1, fast_tuning());
        let mut wallet = RecordingHost::default();
        let h = Host {
            player: None,
            wallet: &mut wallet,
            missions: None,
            feedback: None,
            hud: None,
        };
        session.start(&h);
        assert!(!session.spawning_failed());

        // Two backoff windows with no player: one retry, then give up
        for _ in 0..70 {
            let mut h = Host {
                player: None,
                wallet: &mut wallet,
                missions: None,
                feedback: None,
                hud: None,
            };
            session.tick(crate::consts::SIM_DT, &mut h);
        }
        assert!(session.spawning_failed());
        assert_eq!(session.entities().len(), 0);
        // Session still ticks without panicking
        assert_eq!(session.phase(), SessionPhase::Running);
    }

    #[test]
    fn test_player_arriving_during_backoff_activates() {
        let mut session = Session::new(1, fast_tuning());
        let mut wallet = RecordingHost::default();
        let h = Host {
            player: None,
            wallet: &mut wallet,
            missions: None,
            feedback: None,
            hud: None,
        };
        session.start(&h);

        let player = FixedPlayer { angle: 0.0, radius: crate::consts::TRACK_RADIUS };
        run_ticks(&mut session, &player, &mut wallet, 600);
        assert!(!session.spawning_failed());
        assert!(
            !session.entities().is_empty() || session.tally().total_count > 0,
            "entities should spawn once the player reference appears"
        );
    }

    #[test]
    fn test_collection_notifies_all_sinks() {
        let player = FixedPlayer { angle: 0.0, radius: crate::consts::TRACK_RADIUS };
        let mut wallet = RecordingHost::default();
        let mut session = started(11, &player, &mut wallet);

        session.entities.push(SpawnedEntity::new(
            70,
            EntityKind::Collectible(CollectibleKind::Rare),
            0.0,
            10,
            10.0,
            1.0,
        ));

        let mut missions = RecordingHost::default();
        let mut feedback = RecordingHost::default();
        let mut hud = RecordingHost::default();
        let mut h = Host {
            player: Some(&player),
            wallet: &mut wallet,
            missions: Some(&mut missions),
            feedback: Some(&mut feedback),
            hud: Some(&mut hud),
        };
        session.run_collection(0.0, &mut h);

        assert_eq!(session.tally().total_value, 10);
        // Rare pickup reports on both objective channels
        assert!(missions.progress.contains(&(crate::platform::ObjectiveKind::Collectibles, 1)));
        assert!(missions.progress.contains(&(crate::platform::ObjectiveKind::RareCollectibles, 1)));
        assert_eq!(feedback.feedback, vec![EntityKind::Collectible(CollectibleKind::Rare)]);
        assert_eq!(hud.hud_updates, 1);
        assert_eq!(session.bursts().live_count(), 1);
    }

    #[test]
    fn test_hazard_contact_ends_and_settles() {
        let player = FixedPlayer { angle: 0.0, radius: crate::consts::TRACK_RADIUS };
        let mut wallet = RecordingHost::default();
        let mut session = started(9, &player, &mut wallet);

        session.tally.record_collectible(CollectibleKind::Normal, 7);
        session
            .entities
            .push(SpawnedEntity::new(50, EntityKind::Hazard, 0.0, 0, 30.0, 1.0));

        let mut h = Host {
            player: Some(&player),
            wallet: &mut wallet,
            missions: None,
            feedback: None,
            hud: None,
        };
        session.run_collection(0.0, &mut h);
        assert_eq!(session.phase(), SessionPhase::Ended);
        assert_eq!(wallet.balance, 7, "run-ending contact still settles the tally");
    }

    #[test]
    fn test_shield_absorbs_hazard() {
        let player = FixedPlayer { angle: 0.0, radius: crate::consts::TRACK_RADIUS };
        let mut wallet = RecordingHost::default();
        let mut session = started(9, &player, &mut wallet);

        session.effects.activate(PowerUpKind::Shield, 10.0);
        session
            .entities
            .push(SpawnedEntity::new(51, EntityKind::Hazard, 0.0, 0, 30.0, 1.0));

        let mut h = Host {
            player: Some(&player),
            wallet: &mut wallet,
            missions: None,
            feedback: None,
            hud: None,
        };
        session.run_collection(0.0, &mut h);
        assert_eq!(session.phase(), SessionPhase::Running);
        assert_eq!(session.live_count(Family::Hazard), 0, "hazard destroyed by shield");
        assert!(!session.effects().is_kind_active(PowerUpKind::Shield), "shield spent");
    }

    #[test]
    fn test_reset_is_hard_teardown() {
        let player = FixedPlayer { angle: 2.0, radius: crate::consts::TRACK_RADIUS };
        let mut wallet = RecordingHost::default();
        let mut session = started(3, &player, &mut wallet);
        run_ticks(&mut session, &player, &mut wallet, 1800);

        session.reset_session();
        assert_eq!(session.phase(), SessionPhase::Ready);
        assert_eq!(session.entities().len(), 0);
        assert_eq!(session.tally().total_value, 0);
        assert!(session.effects().active().is_none());
        assert_eq!(session.bursts().live_count(), 0);
    }

    #[test]
    fn test_slowmo_halves_hazard_speed() {
        let player = FixedPlayer {
            angle: std::f32::consts::PI,
            radius: crate::consts::TRACK_RADIUS,
        };
        let mut wallet = RecordingHost::default();
        let mut session = started(3, &player, &mut wallet);
        session.stop_spawning(); // isolate the hand-placed hazard

        session
            .entities
            .push(SpawnedEntity::new(60, EntityKind::Hazard, 0.0, 0, 300.0, 1.0));

        let step = |s: &mut Session, w: &mut RecordingHost| {
            let mut h = Host {
                player: Some(&player),
                wallet: w,
                missions: None,
                feedback: None,
                hud: None,
            };
            s.tick(1.0, &mut h);
        };

        step(&mut session, &mut wallet);
        let plain = session.entities()[0].angle;
        assert!((plain - session.tuning.hazard_speed).abs() < 1e-5);

        session.effects.activate(PowerUpKind::Slowmo, 10.0);
        step(&mut session, &mut wallet);
        let slowed = session.entities()[0].angle - plain;
        assert!((slowed - session.tuning.hazard_speed * 0.5).abs() < 1e-5);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]
        #[test]
        fn prop_caps_hold_for_arbitrary_seeds(seed in 0u64..1000) {
            let player = FixedPlayer { angle: 0.0, radius: crate::consts::TRACK_RADIUS };
            let mut wallet = RecordingHost::default();
            let mut session = started(seed, &player, &mut wallet);
            let caps = (
                session.tuning.collectibles.max_on_screen,
                session.tuning.power_ups.max_on_screen,
                session.tuning.hazards.max_on_screen,
            );

            for _ in 0..1200 {
                let mut h = Host {
                    player: Some(&player),
                    wallet: &mut wallet,
                    missions: None,
                    feedback: None,
                    hud: None,
                };
                session.tick(crate::consts::SIM_DT, &mut h);
                if session.phase() != SessionPhase::Running {
                    break;
                }
                prop_assert!(session.live_count(Family::Collectible) <= caps.0);
                prop_assert!(session.live_count(Family::PowerUp) <= caps.1);
                prop_assert!(session.live_count(Family::Hazard) <= caps.2);
            }
        }
    }
}
