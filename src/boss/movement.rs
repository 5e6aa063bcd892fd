/// Boss movement laws.

use rand::{Rng, RngCore};

use super::Context;
use crate::constants::*;
use crate::entities::Boss;

/// Sweep left and right, turning at the arena edges.
pub fn patrol(boss: &mut Boss, ctx: &Context, _rng: &mut dyn RngCore) {
    let next = boss.x + BOSS_SPEED * boss.attack.direction * ctx.speed;
    if next <= 0.0 || next >= ARENA_WIDTH - BOSS_WIDTH {
        boss.attack.direction = -boss.attack.direction;
    }
    boss.x = next.clamp(0.0, ARENA_WIDTH - BOSS_WIDTH);
}

/// Hold position. Some species teleport as part of their attack instead.
pub fn stationary(_boss: &mut Boss, _ctx: &Context, _rng: &mut dyn RngCore) {}

/// Drift horizontally toward the closest live player at half speed.
pub fn track_player(boss: &mut Boss, ctx: &Context, _rng: &mut dyn RngCore) {
    let nearest = ctx
        .players
        .iter()
        .map(|&(x, _)| x)
        .min_by(|a, b| (a - boss.x).abs().total_cmp(&(b - boss.x).abs()));
    let Some(target_x) = nearest else {
        return;
    };
    if (target_x - boss.x).abs() > PLAYER_WIDTH {
        boss.x += (target_x - boss.x).signum() * BOSS_SPEED * 0.5 * ctx.speed;
    }
}

/// Pick random points in the upper half, never close to the player, and
/// glide to each in turn.
pub fn wander(boss: &mut Boss, ctx: &Context, rng: &mut dyn RngCore) {
    let arrived = boss.attack.wander_target.map_or(true, |(tx, ty)| {
        (boss.x - tx).abs() < BOSS_SPEED && (boss.y - ty).abs() < BOSS_SPEED
    });
    if arrived {
        boss.attack.wander_target = Some(pick_wander_target(ctx, rng));
    }
    let Some((tx, ty)) = boss.attack.wander_target else {
        return;
    };
    let dx = tx - boss.x;
    let dy = ty - boss.y;
    let len = (dx * dx + dy * dy).sqrt();
    if len > BOSS_SPEED {
        boss.x += dx / len * BOSS_SPEED * ctx.speed;
        boss.y += dy / len * BOSS_SPEED * ctx.speed;
    } else {
        boss.x = tx;
        boss.y = ty;
    }
}

/// Bounded retries; the last candidate is accepted even if it is close.
fn pick_wander_target(ctx: &Context, rng: &mut dyn RngCore) -> (f32, f32) {
    let anchor = ctx.players.last().copied();
    let y_span = ARENA_HEIGHT / 2.0 - BOSS_HEIGHT - BOSS_SPAWN_Y;
    let mut candidate = (0.0, BOSS_SPAWN_Y);
    for _ in 0..32 {
        candidate = (
            rng.gen_range(0.0..ARENA_WIDTH - BOSS_WIDTH),
            BOSS_SPAWN_Y + rng.gen_range(0.0..y_span),
        );
        let far_enough = anchor.map_or(true, |(px, py)| {
            let d = ((candidate.0 - px).powi(2) + (candidate.1 - py).powi(2)).sqrt();
            d > GRANDMA_MIN_TARGET_DISTANCE
        });
        if far_enough {
            break;
        }
    }
    candidate
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{AttackState, BossKind, EntityId};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn boss_at(x: f32) -> Boss {
        Boss {
            id: EntityId(1),
            kind: BossKind::Octopus,
            x,
            y: BOSS_SPAWN_Y,
            w: BOSS_WIDTH,
            h: BOSS_HEIGHT,
            health: 10.0,
            max_health: 10.0,
            power: None,
            last_damaged: 0,
            attack: AttackState {
                direction: 1.0,
                shot_counter: 0,
                wander_target: None,
                mimic: None,
                last_shot: None,
                next_special_at: 0,
                last_taunt_request: None,
            },
            sub_entities: Vec::new(),
        }
    }

    fn ctx(players: Vec<(f32, f32)>) -> Context {
        Context { now: 0, level: 1, players, speed: 1.0 }
    }

    #[test]
    fn patrol_turns_at_right_edge() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut boss = boss_at(ARENA_WIDTH - BOSS_WIDTH - 1.0);
        patrol(&mut boss, &ctx(vec![]), &mut rng);
        assert_eq!(boss.attack.direction, -1.0);
        assert!(boss.x <= ARENA_WIDTH - BOSS_WIDTH);
    }

    #[test]
    fn wander_target_keeps_distance_from_player() {
        let mut rng = StdRng::seed_from_u64(42);
        let c = ctx(vec![(400.0, 150.0)]);
        for _ in 0..20 {
            let (tx, ty) = pick_wander_target(&c, &mut rng);
            let d = ((tx - 400.0).powi(2) + (ty - 150.0).powi(2)).sqrt();
            assert!(d > GRANDMA_MIN_TARGET_DISTANCE);
        }
    }

    #[test]
    fn tracker_ignores_small_gaps() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut boss = boss_at(300.0);
        track_player(&mut boss, &ctx(vec![(320.0, 500.0)]), &mut rng);
        assert_eq!(boss.x, 300.0);
        track_player(&mut boss, &ctx(vec![(600.0, 500.0)]), &mut rng);
        assert!(boss.x > 300.0);
    }
}
