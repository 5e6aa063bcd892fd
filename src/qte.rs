/// Reflex-dodge challenge: `Idle -> Triggered -> (Dodged | Failed) -> Idle`.
///
/// Only an Aegis pilot can trigger it, one session at a time across the
/// whole run. While a session is open the world runs at slow-motion speed
/// and the player must type back a short random direction sequence.

use rand::Rng;
use tracing::{debug, info};

use crate::catalog::VehicleAbility;
use crate::collision::{center_distance_sq, intersects, Bounded, Rect};
use crate::combat;
use crate::constants::*;
use crate::entities::{
    Direction, Explosion, FrameEvent, GameState, PlayerId, QteResolution, QteSession, ThreatKind,
    ThreatRef,
};
use crate::input::{ControlScheme, Key};
use crate::movement::clamp_player;

const DIRECTIONS: [Direction; 4] = [
    Direction::Up,
    Direction::Left,
    Direction::Down,
    Direction::Right,
];

/// Open a session if `player` may dodge and `threat` is inside their danger
/// zone. Returns true when a session was started.
pub fn try_trigger(
    state: &mut GameState,
    player: PlayerId,
    threat: ThreatRef,
    threat_box: Rect,
    now: u64,
    rng: &mut impl Rng,
) -> bool {
    if state.loadout.vehicle.ability != VehicleAbility::Aegis || state.qte.is_some() {
        return false;
    }
    let Some(p) = state.player_mut(player) else {
        return false;
    };
    if p.dead {
        return false;
    }
    if p.cooldowns.qte.is_some_and(|t| now.saturating_sub(t) < QTE_COOLDOWN) {
        return false;
    }
    let (cx, cy) = p.center();
    let zone = Rect::centered(cx, cy, QTE_DANGER_RADIUS);
    if !intersects(&zone, &threat_box) {
        return false;
    }

    p.cooldowns.qte = Some(now);
    let sequence: Vec<Direction> = (0..QTE_SEQUENCE_LENGTH)
        .map(|_| DIRECTIONS[rng.gen_range(0..DIRECTIONS.len())])
        .collect();
    info!(?player, ?threat, ?sequence, "Reflex dodge triggered");
    state.qte = Some(QteSession {
        player,
        threat,
        sequence,
        progress: 0,
        started_at: now,
    });
    state.events.push(FrameEvent::QteStarted { player });
    true
}

/// Feed a key press to the open session. Returns true if the key was
/// consumed by the session (any movement key of the dodging player).
pub fn handle_key(state: &mut GameState, key: Key, now: u64) -> bool {
    let Some(session) = state.qte.as_mut() else {
        return false;
    };
    let Some(dir) = ControlScheme::for_player(session.player).direction_of(key) else {
        return false;
    };

    if session.sequence.get(session.progress) == Some(&dir) {
        session.progress += 1;
        debug!(progress = session.progress, "Reflex dodge input accepted");
        if session.progress >= session.sequence.len() {
            succeed(state, now);
        }
    } else {
        fail(state, QteResolution::Failed, now);
    }
    true
}

/// Resolve the session as a hit once its slow-motion window has run out.
pub fn check_timeout(state: &mut GameState, now: u64) {
    let expired = state
        .qte
        .as_ref()
        .is_some_and(|s| now > s.started_at + QTE_SLOW_MO_DURATION);
    if expired {
        fail(state, QteResolution::TimedOut, now);
    }
}

fn threat_box(state: &GameState, threat: ThreatRef) -> Option<Rect> {
    match threat.kind {
        ThreatKind::Enemy => state.enemies.iter().find(|e| e.id == threat.id).map(|e| e.bounds()),
        ThreatKind::Projectile => state
            .boss_projectiles
            .iter()
            .find(|p| p.id == threat.id)
            .map(|p| p.bounds()),
    }
}

fn remove_threat(state: &mut GameState, threat: ThreatRef) {
    match threat.kind {
        ThreatKind::Enemy => state.enemies.retain(|e| e.id != threat.id),
        ThreatKind::Projectile => state.boss_projectiles.retain(|p| p.id != threat.id),
    }
}

fn close(state: &mut GameState, player: PlayerId, resolution: QteResolution, now: u64) {
    state.qte = None;
    if let Some(p) = state.player_mut(player) {
        p.cooldowns.qte = Some(now);
    }
    info!(?player, ?resolution, "Reflex dodge resolved");
    state.events.push(FrameEvent::QteResolved { player, resolution });
}

/// The threat lands: it is destroyed and the player takes one reduced hit.
fn fail(state: &mut GameState, resolution: QteResolution, now: u64) {
    let Some(session) = state.qte.clone() else {
        return;
    };
    remove_threat(state, session.threat);
    let damage = combat::incoming_damage(state, HIT_DAMAGE);
    combat::damage_player(state, session.player, damage);
    close(state, session.player, resolution, now);
}

/// Sidestep the threat, destroy it, and pulse away nearby plain projectiles.
fn succeed(state: &mut GameState, now: u64) {
    let Some(session) = state.qte.clone() else {
        return;
    };
    let threat = threat_box(state, session.threat);

    let Some(player) = state.player_mut(session.player) else {
        state.qte = None;
        return;
    };
    match threat {
        Some(rect) if rect.x >= player.x => player.x -= QTE_DODGE_DISTANCE,
        _ => player.x += QTE_DODGE_DISTANCE,
    }
    clamp_player(player);
    let origin = player.bounds();
    let (px, py) = origin.center();

    remove_threat(state, session.threat);
    state.explosions.push(Explosion { x: px, y: py, started_at: now, glyph: '✧' });

    let r_sq = AEGIS_RETALIATION_PULSE_RADIUS * AEGIS_RETALIATION_PULSE_RADIUS;
    state.boss_projectiles.retain(|p| {
        if p.is_status() || p.health.is_some() {
            return true;
        }
        center_distance_sq(&origin, p) >= r_sq
    });

    close(state, session.player, QteResolution::Dodged, now);
}
