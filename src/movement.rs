/// Per-tick position integration.
///
/// Players move from held keys, push-forces and gravity wells, then get
/// clamped. Everything else advances along its own velocity scaled by the
/// global speed multiplier and is culled once it leaves the arena.

use crate::collision::Bounded;
use crate::constants::*;
use crate::entities::{BossKind, Direction, GameState, Player};
use crate::input::{ControlScheme, InputState};

/// Global scale for non-player movement this tick. A reflex-dodge session
/// overrides the time-slow buff.
pub fn speed_multiplier(state: &GameState) -> f32 {
    if state.qte.is_some() {
        QTE_SLOW_MO_FACTOR
    } else if state.buffs.time_slow.is_active() {
        TIME_SLOW_FACTOR
    } else {
        1.0
    }
}

/// Displacement toward `to` from `from`, `strength / d²` capped at `max`.
/// Returns zero inside one pixel and beyond `range` (when given).
pub fn attraction(
    from: (f32, f32),
    to: (f32, f32),
    strength: f32,
    max: f32,
    range: Option<f32>,
) -> (f32, f32) {
    let dx = to.0 - from.0;
    let dy = to.1 - from.1;
    let dist_sq = dx * dx + dy * dy;
    if dist_sq <= 1.0 {
        return (0.0, 0.0);
    }
    if let Some(r) = range {
        if dist_sq >= r * r {
            return (0.0, 0.0);
        }
    }
    let dist = dist_sq.sqrt();
    let force = (strength / dist_sq).min(max);
    (dx / dist * force, dy / dist * force)
}

pub fn clamp_player(player: &mut Player) {
    player.x = player.x.clamp(0.0, ARENA_WIDTH - player.w);
    player.y = player.y.clamp(0.0, ARENA_HEIGHT - player.h);
}

// ── Players ──────────────────────────────────────────────────────────────────

/// Which gravity well, if any, the current boss projects onto players.
fn player_well(state: &GameState) -> Option<((f32, f32), f32, f32, Option<f32>)> {
    let boss = state.boss.as_ref()?;
    match boss.kind {
        BossKind::Galaxy => Some((boss.center(), GALAXY_STRENGTH, GALAXY_MAX_PULL, None)),
        BossKind::BlackHole => Some((
            boss.center(),
            BLACK_HOLE_STRENGTH,
            BLACK_HOLE_MAX_PULL,
            Some(BLACK_HOLE_RANGE),
        )),
        _ => None,
    }
}

fn held(input: &InputState, controls: &ControlScheme, dir: Direction) -> bool {
    input.is_pressed(controls.key_for(dir))
}

/// Move every live player. Frozen while a reflex-dodge session runs.
pub fn move_players(state: &mut GameState, input: &InputState, now: u64) {
    if state.qte.is_some() {
        return;
    }
    let well = player_well(state);

    for player in state.players.iter_mut().filter(|p| !p.dead) {
        let controls = ControlScheme::for_player(player.id);
        let speed = if player.status.slowed.is_active() {
            PLAYER_SPEED * SLOWED_SPEED_FACTOR
        } else {
            PLAYER_SPEED
        };

        if let Some(push) = player.status.push {
            if push.is_active(now) {
                player.x += push.dx * speed * PUSH_FORCE_SCALE;
                player.y += push.dy * speed * PUSH_FORCE_SCALE;
            } else {
                player.status.push = None;
            }
        }

        if let Some((center, strength, max, range)) = well {
            let (gx, gy) = attraction(player.center(), center, strength, max, range);
            player.x += gx;
            player.y += gy;
        }

        let reversed = player.status.controls_reversed.is_active();
        let (left, right, up, down) = if reversed {
            (Direction::Right, Direction::Left, Direction::Down, Direction::Up)
        } else {
            (Direction::Left, Direction::Right, Direction::Up, Direction::Down)
        };
        if held(input, controls, left) {
            player.x -= speed;
        }
        if held(input, controls, right) {
            player.x += speed;
        }
        if held(input, controls, up) {
            player.y -= speed;
        }
        if held(input, controls, down) {
            player.y += speed;
        }

        clamp_player(player);
    }
}

// ── Passive entities ─────────────────────────────────────────────────────────

/// Advance shots, enemies, drops, boss projectiles and the drone; drop
/// anything that has left the arena, outlived its lifetime or finished
/// animating.
pub fn move_passive(state: &mut GameState, now: u64) {
    let mult = speed_multiplier(state);
    let hole = state
        .boss
        .as_ref()
        .filter(|b| b.kind == BossKind::BlackHole)
        .map(|b| b.center());

    let projectiles = std::mem::take(&mut state.projectiles);
    state.projectiles = projectiles
        .into_iter()
        .map(|mut p| {
            if let Some(center) = hole {
                let (gx, gy) = attraction(
                    p.center(),
                    center,
                    BLACK_HOLE_SHOT_STRENGTH,
                    BLACK_HOLE_MAX_PULL,
                    None,
                );
                p.x += gx;
                p.y += gy;
            }
            p.y += p.vy * mult;
            p
        })
        .filter(|p| p.y > -p.h)
        .collect();

    let enemies = std::mem::take(&mut state.enemies);
    state.enemies = enemies
        .into_iter()
        .map(|mut e| {
            e.x += e.dx.unwrap_or(0.0) * mult;
            e.y += e.dy.unwrap_or(ENEMY_SPEED) * mult;
            e
        })
        .filter(|e| e.y < ARENA_HEIGHT && e.x > -e.w && e.x < ARENA_WIDTH)
        .collect();

    let drops = std::mem::take(&mut state.drops);
    state.drops = drops
        .into_iter()
        .map(|mut d| {
            d.y += ENEMY_SPEED * DROP_FALL_FACTOR * mult;
            d
        })
        .filter(|d| d.y < ARENA_HEIGHT)
        .collect();

    let shots = std::mem::take(&mut state.boss_projectiles);
    state.boss_projectiles = shots
        .into_iter()
        .map(|mut p| {
            p.x += p.dx * mult;
            p.y += p.dy * mult;
            p
        })
        .filter(|p| {
            let alive = p.lifetime.map_or(true, |life| now <= p.created_at + life);
            let in_bounds =
                p.y < ARENA_HEIGHT && p.y > -OFFSCREEN_MARGIN && p.x < ARENA_WIDTH && p.x > -p.w;
            alive && in_bounds
        })
        .collect();

    state
        .explosions
        .retain(|x| now.saturating_sub(x.started_at) < EXPLOSION_DURATION);

    // The drone trails the first live player.
    let anchor = state.players.iter().find(|p| !p.dead);
    if let (Some(drone), Some(anchor)) = (state.drone.as_mut(), anchor) {
        let target_x = anchor.x - (DRONE_WIDTH + 10.0);
        let target_y = anchor.y;
        drone.x += (target_x - drone.x) * DRONE_FOLLOW_RATE;
        drone.y += (target_y - drone.y) * DRONE_FOLLOW_RATE;
    }
}
