//! Special powers, available from level 10 on. Each returns the power to
//! mark active, how long it lasts, and what it does to the world.

use rand::{Rng, RngCore};

use super::{Context, Special, SpecialEffect};
use crate::constants::*;
use crate::entities::{Boss, BossProjectile, EntityId, SpecialPower, StatusHit, StatusKind};

const S: f32 = BOSS_PROJECTILE_SPEED;

fn projectile(boss: &Boss, ctx: &Context, size: f32, dx: f32, dy: f32) -> BossProjectile {
    BossProjectile {
        id: EntityId::PENDING,
        x: boss.x + BOSS_WIDTH / 2.0 - size / 2.0,
        y: boss.y + BOSS_HEIGHT,
        w: size,
        h: size,
        dx,
        dy,
        status: None,
        created_at: ctx.now,
        lifetime: None,
        health: None,
    }
}

fn timed(power: SpecialPower, duration: u64, effects: Vec<SpecialEffect>) -> Special {
    Special { power, duration, effects }
}

/// A big slow ball of yarn that bounces off in a random direction.
pub fn yarn_ball(boss: &Boss, ctx: &Context, rng: &mut dyn RngCore) -> Special {
    let dx = if rng.gen_bool(0.5) { S * 0.6 } else { -S * 0.6 };
    let ball = BossProjectile {
        lifetime: Some(GRANDMA_YARN_DURATION),
        ..projectile(boss, ctx, 40.0, dx, S * 0.6)
    };
    timed(SpecialPower::YarnBall, GRANDMA_YARN_DURATION, vec![SpecialEffect::Shot(ball)])
}

/// Shove players sideways, away from the boss.
pub fn ground_pound(boss: &Boss, ctx: &Context, _rng: &mut dyn RngCore) -> Special {
    let bx = boss.x + BOSS_WIDTH / 2.0;
    let px = ctx
        .players
        .first()
        .map_or(bx, |&(x, _)| x + PLAYER_WIDTH / 2.0);
    let dx = if px < bx { -1.0 } else { 1.0 };
    timed(
        SpecialPower::GroundPound,
        GORILLA_POUND_DURATION,
        vec![SpecialEffect::PushPlayers { dx, dy: 0.0 }],
    )
}

/// Drive players toward the bottom of the arena.
pub fn roar(_boss: &Boss, _ctx: &Context, _rng: &mut dyn RngCore) -> Special {
    timed(
        SpecialPower::Roar,
        TREX_ROAR_DURATION,
        vec![SpecialEffect::PushPlayers { dx: 0.0, dy: 2.0 }],
    )
}

/// The breath itself is emitted every few frames by the driver; see
/// `breath_puff`.
pub fn dragon_breath(_boss: &Boss, _ctx: &Context, _rng: &mut dyn RngCore) -> Special {
    timed(SpecialPower::DragonBreath, DRAGON_BREATH_DURATION, Vec::new())
}

pub fn poison(boss: &Boss, ctx: &Context, _rng: &mut dyn RngCore) -> Special {
    let shot = BossProjectile {
        status: Some(StatusHit { kind: StatusKind::Slow, duration: SCORPION_SLOW_DURATION }),
        ..projectile(boss, ctx, BOSS_PROJECTILE_WIDTH, 0.0, S * 1.5)
    };
    timed(SpecialPower::PoisonSlow, SCORPION_SLOW_DURATION, vec![SpecialEffect::Shot(shot)])
}

/// A web aimed at a player that stuns on contact.
pub fn cocoon(boss: &Boss, ctx: &Context, rng: &mut dyn RngCore) -> Special {
    let (bx, by) = (boss.x + BOSS_WIDTH / 2.0, boss.y + BOSS_HEIGHT / 2.0);
    let (dx, dy) = ctx
        .pick_target(rng)
        .and_then(|(tx, ty)| {
            let (vx, vy) = (tx - bx, ty - by);
            let len = (vx * vx + vy * vy).sqrt();
            (len > 0.0).then(|| (vx / len * S, vy / len * S))
        })
        .unwrap_or((0.0, S));
    let web = BossProjectile {
        status: Some(StatusHit { kind: StatusKind::Stun, duration: SPIDER_COCOON_DURATION }),
        ..projectile(boss, ctx, 30.0, dx, dy)
    };
    timed(SpecialPower::Cocoon, SPIDER_COCOON_DURATION, vec![SpecialEffect::Shot(web)])
}

/// The boss fades from view; it can still be hit.
pub fn invisibility(_boss: &Boss, _ctx: &Context, _rng: &mut dyn RngCore) -> Special {
    timed(SpecialPower::Invisibility, WIZARD_INVISIBILITY_DURATION, Vec::new())
}

pub fn gust(_boss: &Boss, _ctx: &Context, rng: &mut dyn RngCore) -> Special {
    let dx = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
    timed(
        SpecialPower::Gust,
        EAGLE_GUST_DURATION,
        vec![SpecialEffect::PushPlayers { dx, dy: 0.0 }],
    )
}

pub fn hypnosis(_boss: &Boss, _ctx: &Context, _rng: &mut dyn RngCore) -> Special {
    timed(
        SpecialPower::Hypnosis,
        EYE_HYPNOSIS_DURATION,
        vec![SpecialEffect::ReverseControls],
    )
}

pub fn minions(_boss: &Boss, _ctx: &Context, _rng: &mut dyn RngCore) -> Special {
    timed(
        SpecialPower::Minions,
        WHALE_MINIONS_DURATION,
        vec![SpecialEffect::Minions(WHALE_MINION_COUNT)],
    )
}

/// Doubles the fire rate and lets player shots pass straight through.
pub fn decree(_boss: &Boss, _ctx: &Context, _rng: &mut dyn RngCore) -> Special {
    timed(SpecialPower::Decree, KING_DECREE_DURATION, Vec::new())
}

/// One short-lived puff of dragon fire, sweeping with the clock.
pub fn breath_puff(boss: &Boss, now: u64) -> BossProjectile {
    let sweep = (now as f32 * 0.001).sin() * (std::f32::consts::PI / 4.0);
    BossProjectile {
        id: EntityId::PENDING,
        x: boss.x + BOSS_WIDTH / 2.0 - 7.5,
        y: boss.y + BOSS_HEIGHT,
        w: 15.0,
        h: 15.0,
        dx: sweep.sin() * S,
        dy: sweep.cos() * S,
        status: None,
        created_at: now,
        lifetime: Some(800),
        health: None,
    }
}
