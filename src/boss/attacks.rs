//! Attack patterns. Each one is a function of the boss and the context
//! that appends projectiles to a `Volley`; a few also advance the boss's
//! own attack state (phase counters, teleports, sub-entities).
//!
//! Aimed patterns fall back to straight-down fire when no player is alive.

use std::f32::consts::{PI, TAU};

use rand::{Rng, RngCore};

use super::{behavior, Context, Volley};
use crate::constants::*;
use crate::entities::{
    Boss, BossKind, BossProjectile, EntityId, Mimic, StatusHit, StatusKind, SubEntity,
    SubEntityKind,
};

const S: f32 = BOSS_PROJECTILE_SPEED;

/// Species whose patterns the Mystery boss borrows.
pub const MIMIC_POOL: [BossKind; 20] = [
    BossKind::Octopus,
    BossKind::Shark,
    BossKind::Crab,
    BossKind::Pufferfish,
    BossKind::Lobster,
    BossKind::Shell,
    BossKind::Oyster,
    BossKind::Squid,
    BossKind::Snake,
    BossKind::Grandma,
    BossKind::Gorilla,
    BossKind::TRex,
    BossKind::Dragon,
    BossKind::Scorpion,
    BossKind::Spider,
    BossKind::Wizard,
    BossKind::Eagle,
    BossKind::Eye,
    BossKind::Whale,
    BossKind::King,
];

// ── Helpers ──────────────────────────────────────────────────────────────────

fn center(boss: &Boss) -> (f32, f32) {
    (boss.x + BOSS_WIDTH / 2.0, boss.y + BOSS_HEIGHT / 2.0)
}

/// A standard shot leaving the boss's lower edge at `x`.
fn shot(boss: &Boss, ctx: &Context, x: f32, dx: f32, dy: f32) -> BossProjectile {
    shot_at(ctx, x, boss.y + BOSS_HEIGHT, dx, dy)
}

fn shot_at(ctx: &Context, x: f32, y: f32, dx: f32, dy: f32) -> BossProjectile {
    BossProjectile {
        id: EntityId::PENDING,
        x,
        y,
        w: BOSS_PROJECTILE_WIDTH,
        h: BOSS_PROJECTILE_HEIGHT,
        dx,
        dy,
        status: None,
        created_at: ctx.now,
        lifetime: None,
        health: None,
    }
}

/// Velocity of length `speed` from `from` toward `to`.
fn aim(from: (f32, f32), to: (f32, f32), speed: f32) -> Option<(f32, f32)> {
    let dx = to.0 - from.0;
    let dy = to.1 - from.1;
    let len = (dx * dx + dy * dy).sqrt();
    (len > 0.0).then(|| (dx / len * speed, dy / len * speed))
}

fn rotate((dx, dy): (f32, f32), angle: f32) -> (f32, f32) {
    let (sin, cos) = angle.sin_cos();
    (dx * cos - dy * sin, dx * sin + dy * cos)
}

fn radial(ctx: &Context, origin: (f32, f32), count: usize, offset: f32, speed: f32) -> Vec<BossProjectile> {
    (0..count)
        .map(|i| {
            let angle = i as f32 / count as f32 * TAU + offset;
            shot_at(ctx, origin.0, origin.1, angle.cos() * speed, angle.sin() * speed)
        })
        .collect()
}

/// Stationary column of short-lived segments hanging below the boss.
fn beam_column(boss: &Boss, ctx: &Context, x: f32, dx: f32, lifetime: u64) -> Vec<BossProjectile> {
    (0..20)
        .map(|j| BossProjectile {
            lifetime: Some(lifetime),
            ..shot_at(ctx, x, boss.y + BOSS_HEIGHT + j as f32 * BOSS_PROJECTILE_HEIGHT, dx, 0.0)
        })
        .collect()
}

// ── Patterns ─────────────────────────────────────────────────────────────────

pub fn homing(boss: &mut Boss, ctx: &Context, out: &mut Volley, rng: &mut dyn RngCore) {
    let (bx, by) = center(boss);
    match ctx.pick_target(rng).and_then(|t| aim((bx, by), t, S)) {
        Some((dx, dy)) => out.shots.push(shot(boss, ctx, bx - BOSS_PROJECTILE_WIDTH / 2.0, dx, dy)),
        None => out.shots.push(shot(boss, ctx, bx, 0.0, S)),
    }
}

pub fn spread_three(boss: &mut Boss, ctx: &Context, out: &mut Volley, rng: &mut dyn RngCore) {
    let (bx, by) = center(boss);
    match ctx.pick_target(rng).and_then(|t| aim((bx, by), t, S)) {
        Some(main) => {
            for angle in [0.0, 0.4, -0.4] {
                let (dx, dy) = rotate(main, angle);
                out.shots.push(shot(boss, ctx, bx, dx, dy));
            }
        }
        None => {
            for i in -1..=1 {
                let x = bx - BOSS_PROJECTILE_WIDTH / 2.0;
                out.shots.push(shot(boss, ctx, x, i as f32 * S * 0.5, S));
            }
        }
    }
}

pub fn twin_claws(boss: &mut Boss, ctx: &Context, out: &mut Volley, rng: &mut dyn RngCore) {
    let (_, by) = center(boss);
    let claws = [boss.x + 10.0, boss.x + BOSS_WIDTH - BOSS_PROJECTILE_WIDTH - 10.0];
    let target = ctx.pick_target(rng);
    for claw in claws {
        let (dx, dy) = target.and_then(|t| aim((claw, by), t, S)).unwrap_or((0.0, S));
        out.shots.push(shot(boss, ctx, claw, dx, dy));
    }
}

pub fn spread_five(boss: &mut Boss, ctx: &Context, out: &mut Volley, rng: &mut dyn RngCore) {
    let (bx, by) = center(boss);
    let x = bx - BOSS_PROJECTILE_WIDTH / 2.0;
    match ctx.pick_target(rng).and_then(|t| aim((bx, by), t, S)) {
        Some(main) => {
            for i in -2..=2 {
                let (dx, dy) = rotate(main, i as f32 * 0.2);
                out.shots.push(shot(boss, ctx, x, dx, dy));
            }
        }
        None => out.shots.push(shot(boss, ctx, x, 0.0, S)),
    }
}

pub fn vertical_volley(boss: &mut Boss, ctx: &Context, out: &mut Volley, _rng: &mut dyn RngCore) {
    let x = boss.x + BOSS_WIDTH / 2.0 - BOSS_PROJECTILE_WIDTH / 2.0;
    for i in 0..3 {
        let y = boss.y + BOSS_HEIGHT + i as f32 * 40.0;
        out.shots.push(shot_at(ctx, x, y, 0.0, S * 1.2));
    }
}

pub fn rotating_pair(boss: &mut Boss, ctx: &Context, out: &mut Volley, _rng: &mut dyn RngCore) {
    let origin = center(boss);
    let base = boss.attack.shot_counter as f32 / 8.0 * TAU;
    for i in 0..2 {
        let angle = base + i as f32 * PI;
        out.shots.push(shot_at(ctx, origin.0, origin.1, angle.cos() * S, angle.sin() * S));
    }
    boss.attack.shot_counter += 1;
}

pub fn pearl_trio(boss: &mut Boss, ctx: &Context, out: &mut Volley, _rng: &mut dyn RngCore) {
    out.shots.push(shot(boss, ctx, boss.x + BOSS_WIDTH / 2.0, 0.0, S * 0.7));
    out.shots.push(shot(boss, ctx, boss.x, 0.0, S * 1.4));
    let right = boss.x + BOSS_WIDTH - BOSS_PROJECTILE_WIDTH;
    out.shots.push(shot(boss, ctx, right, 0.0, S * 1.4));
}

pub fn radial_eight(boss: &mut Boss, ctx: &Context, out: &mut Volley, _rng: &mut dyn RngCore) {
    out.shots.extend(radial(ctx, center(boss), 8, 0.0, S));
}

pub fn sine_pair(boss: &mut Boss, ctx: &Context, out: &mut Volley, _rng: &mut dyn RngCore) {
    boss.attack.shot_counter += 1;
    let wave = (boss.attack.shot_counter as f32 * 0.3).sin() * (ARENA_WIDTH / 3.0);
    let bx = boss.x + BOSS_WIDTH / 2.0;
    out.shots.push(shot(boss, ctx, bx + wave, 0.0, S));
    out.shots.push(shot_at(ctx, bx - wave, boss.y + BOSS_HEIGHT + 30.0, 0.0, S));
}

pub fn aimed_single(boss: &mut Boss, ctx: &Context, out: &mut Volley, rng: &mut dyn RngCore) {
    let (bx, by) = center(boss);
    let (dx, dy) = ctx
        .pick_target(rng)
        .and_then(|t| aim((bx, by), t, S))
        .unwrap_or((0.0, S));
    out.shots.push(shot(boss, ctx, bx, dx, dy));
}

pub fn fan_three(boss: &mut Boss, ctx: &Context, out: &mut Volley, _rng: &mut dyn RngCore) {
    let bx = boss.x + BOSS_WIDTH / 2.0;
    for i in -1..=1 {
        let f = i as f32;
        out.shots.push(shot(boss, ctx, bx, f * S * 0.4, S * (1.0 - f.abs() * 0.2)));
    }
}

pub fn heavy_drop(boss: &mut Boss, ctx: &Context, out: &mut Volley, _rng: &mut dyn RngCore) {
    out.shots.push(shot(boss, ctx, boss.x + BOSS_WIDTH / 2.0, 0.0, S * 1.8));
}

pub fn sweeping_pair(boss: &mut Boss, ctx: &Context, out: &mut Volley, _rng: &mut dyn RngCore) {
    boss.attack.shot_counter += 1;
    let sweep = (boss.attack.shot_counter as f32 * 0.1).sin() * (PI / 2.5);
    let origin = center(boss);
    for angle in [sweep, sweep + PI] {
        out.shots.push(shot_at(ctx, origin.0, origin.1, angle.sin() * S, angle.cos() * S));
    }
}

/// Sting, pincers, tail whip, in rotation.
pub fn scorpion_cycle(boss: &mut Boss, ctx: &Context, out: &mut Volley, rng: &mut dyn RngCore) {
    boss.attack.shot_counter += 1;
    let bx = boss.x + BOSS_WIDTH / 2.0;
    match boss.attack.shot_counter % 3 {
        0 => {
            let (dx, dy) = ctx
                .pick_target(rng)
                .and_then(|t| aim(center(boss), t, S * 1.2))
                .unwrap_or((0.0, S * 1.2));
            out.shots.push(shot(boss, ctx, bx, dx, dy));
        }
        1 => {
            out.shots.push(shot(boss, ctx, boss.x, S * 0.5, S * 0.9));
            let right = boss.x + BOSS_WIDTH - BOSS_PROJECTILE_WIDTH;
            out.shots.push(shot(boss, ctx, right, -S * 0.5, S * 0.9));
        }
        _ => {
            for i in -1..=1 {
                out.shots.push(shot(boss, ctx, bx, i as f32 * S * 0.2, S * 1.5));
            }
        }
    }
}

/// A stunning web strand flanked by two angled shots.
pub fn web_trio(boss: &mut Boss, ctx: &Context, out: &mut Volley, _rng: &mut dyn RngCore) {
    let web = BossProjectile {
        status: Some(StatusHit { kind: StatusKind::Stun, duration: 500 }),
        ..shot(boss, ctx, boss.x + BOSS_WIDTH / 2.0, 0.0, S)
    };
    out.shots.push(web);
    out.shots.push(shot(boss, ctx, boss.x, -S * 0.5, S));
    let right = boss.x + BOSS_WIDTH - BOSS_PROJECTILE_WIDTH;
    out.shots.push(shot(boss, ctx, right, S * 0.5, S));
}

/// Teleport, then fan out three shots.
pub fn blink_fan(boss: &mut Boss, ctx: &Context, out: &mut Volley, rng: &mut dyn RngCore) {
    boss.x = rng.gen_range(0.0..ARENA_WIDTH - BOSS_WIDTH);
    let bx = boss.x + BOSS_WIDTH / 2.0;
    for i in -1..=1 {
        out.shots.push(shot(boss, ctx, bx, i as f32 * S * 0.5, S));
    }
}

pub fn fan_five(boss: &mut Boss, ctx: &Context, out: &mut Volley, _rng: &mut dyn RngCore) {
    let bx = boss.x + BOSS_WIDTH / 2.0;
    for i in -2..=2 {
        let f = i as f32;
        out.shots.push(shot(boss, ctx, bx, f * S * 0.3, S * (1.2 - f.abs() * 0.1)));
    }
}

pub fn beam(boss: &mut Boss, ctx: &Context, out: &mut Volley, _rng: &mut dyn RngCore) {
    let x = boss.x + BOSS_WIDTH / 2.0;
    out.shots.extend(beam_column(boss, ctx, x, 0.0, 500));
}

/// Ten drops falling from above the arena at random columns.
pub fn rain(_boss: &mut Boss, ctx: &Context, out: &mut Volley, rng: &mut dyn RngCore) {
    for _ in 0..10 {
        let x = rng.gen_range(0.0..ARENA_WIDTH);
        let y = -BOSS_PROJECTILE_HEIGHT - rng.gen_range(0.0..200.0);
        out.shots.push(shot_at(ctx, x, y, 0.0, S * 1.1));
    }
}

/// Web, fan, burst, rain, in rotation.
pub fn royal_cycle(boss: &mut Boss, ctx: &Context, out: &mut Volley, rng: &mut dyn RngCore) {
    boss.attack.shot_counter += 1;
    match boss.attack.shot_counter % 4 {
        0 => web_trio(boss, ctx, out, rng),
        1 => fan_five(boss, ctx, out, rng),
        2 => radial_eight(boss, ctx, out, rng),
        _ => rain(boss, ctx, out, rng),
    }
}

/// Teleport, then a twelve-way burst that twists a little each time.
pub fn urn_burst(boss: &mut Boss, ctx: &Context, out: &mut Volley, rng: &mut dyn RngCore) {
    boss.x = rng.gen_range(0.0..ARENA_WIDTH - BOSS_WIDTH);
    let offset = boss.attack.shot_counter as f32 * 0.1;
    out.shots.extend(radial(ctx, center(boss), 12, offset, S));
    boss.attack.shot_counter += 1;
}

/// A short-lived ring plus one heavy core shot.
pub fn ring_burst(boss: &mut Boss, ctx: &Context, out: &mut Volley, _rng: &mut dyn RngCore) {
    out.shots.extend(
        radial(ctx, center(boss), 16, 0.0, S * 0.8)
            .into_iter()
            .map(|p| BossProjectile { lifetime: Some(2000), ..p }),
    );
    let core = BossProjectile {
        w: 40.0,
        h: 40.0,
        ..shot(boss, ctx, boss.x + BOSS_WIDTH / 2.0, 0.0, S * 1.5)
    };
    out.shots.push(core);
}

/// Seven-shot spread; the arm lunges down and is pulled back by a timer.
pub fn piston_volley(boss: &mut Boss, ctx: &Context, out: &mut Volley, _rng: &mut dyn RngCore) {
    let bx = boss.x + BOSS_WIDTH / 2.0;
    for i in -3..=3 {
        out.shots.push(shot(boss, ctx, bx, i as f32 * S * 0.2, S * 1.3));
    }
    out.recoil = Some(ROBO_ARM_RECOIL);
}

/// Summon two spirits on first use; every volley they fire alongside the boss.
pub fn pack_howl(boss: &mut Boss, ctx: &Context, out: &mut Volley, _rng: &mut dyn RngCore) {
    if boss.sub_entities.is_empty() {
        for x in [boss.x - 50.0, boss.x + BOSS_WIDTH + 20.0] {
            boss.sub_entities.push(SubEntity {
                id: EntityId::PENDING,
                kind: SubEntityKind::Spirit,
                x,
                y: boss.y,
                w: WOLF_SPIRIT_SIZE,
                h: WOLF_SPIRIT_SIZE,
                health: None,
            });
        }
    }
    for spirit in &boss.sub_entities {
        out.shots.push(shot_at(ctx, spirit.x, spirit.y, 0.0, S * 0.8));
    }
    out.shots.push(shot(boss, ctx, boss.x + BOSS_WIDTH / 2.0, 0.0, S));
}

/// Usually three freezing shards; sometimes one slow breakable block.
pub fn ice_volley(boss: &mut Boss, ctx: &Context, out: &mut Volley, rng: &mut dyn RngCore) {
    let bx = boss.x + BOSS_WIDTH / 2.0;
    if rng.gen::<f32>() > 0.3 {
        for i in -1..=1 {
            out.shots.push(BossProjectile {
                status: Some(StatusHit { kind: StatusKind::Stun, duration: 2000 }),
                ..shot(boss, ctx, bx, i as f32 * S * 0.2, S)
            });
        }
    } else {
        out.shots.push(BossProjectile {
            health: Some(SHATTER_SHARD_HEALTH),
            ..shot(boss, ctx, bx, 0.0, S * 0.5)
        });
    }
}

pub fn eruption(_boss: &mut Boss, ctx: &Context, out: &mut Volley, rng: &mut dyn RngCore) {
    for _ in 0..15 {
        let x = rng.gen_range(0.0..ARENA_WIDTH);
        let y = -BOSS_PROJECTILE_HEIGHT - rng.gen_range(0.0..300.0);
        let dy = S * (1.0 + rng.gen::<f32>());
        out.shots.push(shot_at(ctx, x, y, 0.0, dy));
    }
}

/// Six arms whose angle turns with the clock.
pub fn spiral_arms(boss: &mut Boss, ctx: &Context, out: &mut Volley, _rng: &mut dyn RngCore) {
    let offset = ctx.now as f32 * 0.001;
    out.shots.extend(radial(ctx, center(boss), 6, offset, S));
}

/// Three swaying beams across the arena.
pub fn holy_beams(boss: &mut Boss, ctx: &Context, out: &mut Volley, _rng: &mut dyn RngCore) {
    for i in 0..3 {
        let x = 100.0 + i as f32 * (ARENA_WIDTH - 200.0) / 2.0;
        let sway = (ctx.now as f32 / 1000.0 + i as f32).sin() * 2.0;
        out.shots.extend(beam_column(boss, ctx, x, sway, 1000));
    }
}

/// Borrow another species' pattern for a few seconds at a time.
pub fn mimic(boss: &mut Boss, ctx: &Context, out: &mut Volley, rng: &mut dyn RngCore) {
    let expired = boss.attack.mimic.map_or(true, |m| ctx.now > m.until);
    if expired {
        let kind = MIMIC_POOL[rng.gen_range(0..MIMIC_POOL.len())];
        boss.attack.mimic = Some(Mimic { kind, until: ctx.now + MYSTERY_ATTACK_WINDOW });
    }
    if let Some(m) = boss.attack.mimic {
        (behavior(m.kind).attack)(boss, ctx, out, rng);
    }
}

/// Seed one more fragment somewhere in the arena, up to the cap.
pub fn spawn_fragment(boss: &mut Boss, _ctx: &Context, _out: &mut Volley, rng: &mut dyn RngCore) {
    let fragments = boss
        .sub_entities
        .iter()
        .filter(|s| s.kind == SubEntityKind::Fragment)
        .count();
    if fragments >= BLACK_HOLE_MAX_FRAGMENTS {
        return;
    }
    boss.sub_entities.push(SubEntity {
        id: EntityId::PENDING,
        kind: SubEntityKind::Fragment,
        x: rng.gen_range(0.0..ARENA_WIDTH),
        y: rng.gen_range(0.0..ARENA_HEIGHT - 100.0) + 100.0,
        w: BLACK_HOLE_FRAGMENT_SIZE,
        h: BLACK_HOLE_FRAGMENT_SIZE,
        health: Some(1.0),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::AttackState;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn boss(kind: BossKind) -> Boss {
        Boss {
            id: EntityId(1),
            kind,
            x: 350.0,
            y: 50.0,
            w: BOSS_WIDTH,
            h: BOSS_HEIGHT,
            health: 100.0,
            max_health: 100.0,
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
        Context { now: 1000, level: 1, players, speed: 1.0 }
    }

    #[test]
    fn homing_without_targets_fires_straight_down() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut b = boss(BossKind::Octopus);
        let mut out = Volley::default();
        homing(&mut b, &ctx(vec![]), &mut out, &mut rng);
        assert_eq!(out.shots.len(), 1);
        assert_eq!(out.shots[0].dx, 0.0);
        assert_eq!(out.shots[0].dy, S);
    }

    #[test]
    fn homing_aims_at_the_player() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut b = boss(BossKind::Octopus);
        let mut out = Volley::default();
        homing(&mut b, &ctx(vec![(375.0, 500.0)]), &mut out, &mut rng);
        let s = &out.shots[0];
        assert!(s.dx.abs() < 1e-4);
        assert!((s.dy - S).abs() < 1e-4);
    }

    #[test]
    fn fragments_are_capped() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut b = boss(BossKind::BlackHole);
        let mut out = Volley::default();
        for _ in 0..10 {
            spawn_fragment(&mut b, &ctx(vec![]), &mut out, &mut rng);
        }
        assert_eq!(b.sub_entities.len(), BLACK_HOLE_MAX_FRAGMENTS);
        assert!(out.shots.is_empty());
    }

    #[test]
    fn wolf_summons_two_spirits_once() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut b = boss(BossKind::Wolf);
        let mut out = Volley::default();
        pack_howl(&mut b, &ctx(vec![]), &mut out, &mut rng);
        pack_howl(&mut b, &ctx(vec![]), &mut out, &mut rng);
        assert_eq!(b.sub_entities.len(), 2);
        assert_eq!(out.shots.len(), 6);
    }

    #[test]
    fn mystery_holds_its_pick_for_the_window() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut b = boss(BossKind::Mystery);
        let mut out = Volley::default();
        mimic(&mut b, &ctx(vec![(100.0, 500.0)]), &mut out, &mut rng);
        let first = b.attack.mimic.map(|m| m.kind);
        let later = Context { now: 1000 + MYSTERY_ATTACK_WINDOW, ..ctx(vec![(100.0, 500.0)]) };
        mimic(&mut b, &later, &mut out, &mut rng);
        assert_eq!(b.attack.mimic.map(|m| m.kind), first);
        assert!(MIMIC_POOL.contains(&first.unwrap()));
    }

    #[test]
    fn robo_arm_requests_recoil() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut b = boss(BossKind::RoboArm);
        let mut out = Volley::default();
        piston_volley(&mut b, &ctx(vec![]), &mut out, &mut rng);
        assert_eq!(out.shots.len(), 7);
        assert_eq!(out.recoil, Some(ROBO_ARM_RECOIL));
    }
}
