//! Orbit Dash entry point
//!
//! Headless demo: runs one autoplay session at a fixed timestep and logs the
//! settlement. Pass a seed as the first argument to replay a specific run.

use orbit_dash::consts::{MAX_SUBSTEPS, SIM_DT};
use orbit_dash::platform::{Host, PlayerTrack};
use orbit_dash::sim::{EntityKind, Session, SessionPhase};
use orbit_dash::{Tuning, Wallet, arc_delta, normalize_angle};

/// Scripted player: chases the nearest collectible, shies away from hazards
struct AutoPlayer {
    angle: f32,
    radius: f32,
    max_speed: f32,
}

impl AutoPlayer {
    fn new(radius: f32) -> Self {
        Self {
            angle: -std::f32::consts::FRAC_PI_2,
            radius,
            max_speed: 2.4,
        }
    }

    fn steer(&mut self, session: &Session, dt: f32) {
        // Nearest hazard wins: run from it before chasing anything
        let nearest_hazard = session
            .entities()
            .iter()
            .filter(|e| e.kind == EntityKind::Hazard)
            .map(|e| arc_delta(self.angle, e.angle))
            .min_by(|a, b| a.abs().partial_cmp(&b.abs()).unwrap_or(std::cmp::Ordering::Equal));

        let step = if let Some(delta) = nearest_hazard.filter(|d| d.abs() < 0.5) {
            // Move directly away
            -delta.signum() * self.max_speed * dt
        } else if let Some(delta) = session
            .entities()
            .iter()
            .filter(|e| e.kind != EntityKind::Hazard)
            .map(|e| arc_delta(self.angle, e.angle))
            .min_by(|a, b| a.abs().partial_cmp(&b.abs()).unwrap_or(std::cmp::Ordering::Equal))
        {
            delta.clamp(-self.max_speed * dt, self.max_speed * dt)
        } else {
            // Nothing to chase; drift so the run does not stall in place
            self.max_speed * 0.25 * dt
        };

        self.angle = normalize_angle(self.angle + step);
    }
}

impl PlayerTrack for AutoPlayer {
    fn angle(&self) -> f32 {
        self.angle
    }

    fn radius(&self) -> f32 {
        self.radius
    }
}

fn main() {
    env_logger::init();

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(42);
    log::info!("Orbit Dash (headless) starting with seed {seed}");

    let tuning = Tuning::default();
    let track_radius = tuning.track_radius;
    let mut wallet = Wallet::new();
    let mut player = AutoPlayer::new(track_radius);
    let mut session = Session::new(seed, tuning);

    {
        let host = Host {
            player: Some(&player),
            wallet: &mut wallet,
            missions: None,
            feedback: None,
            hud: None,
        };
        session.start(&host);
    }

    // 90 simulated seconds, or until a hazard ends the run early
    let total_ticks = (90.0 / SIM_DT) as u32;
    let mut ticks = 0;
    while ticks < total_ticks {
        // Fixed-substep batch, mirroring a frame loop driving the sim
        for _ in 0..MAX_SUBSTEPS.min(total_ticks - ticks) {
            player.steer(&session, SIM_DT);
            let mut host = Host {
                player: Some(&player),
                wallet: &mut wallet,
                missions: None,
                feedback: None,
                hud: None,
            };
            session.tick(SIM_DT, &mut host);
            ticks += 1;
        }
        if session.phase() == SessionPhase::Ended {
            break;
        }
    }

    if session.phase() != SessionPhase::Ended {
        let mut host = Host {
            player: Some(&player),
            wallet: &mut wallet,
            missions: None,
            feedback: None,
            hud: None,
        };
        session.finish(&mut host);
    }

    let tally = session.tally();
    log::info!(
        "run over after {:.1}s: {} pickups ({} normal / {} rare / {} ultra, {} power-ups)",
        ticks as f32 * SIM_DT,
        tally.total_count,
        tally.normal,
        tally.rare,
        tally.ultra_rare,
        tally.power_ups,
    );
    let stats = session.placement_stats();
    log::info!(
        "placement: {} attempts, {} skipped, {} fallbacks",
        stats.attempts,
        stats.skipped,
        stats.fallbacks
    );
    log::info!("wallet balance: {}", wallet.balance);
}
