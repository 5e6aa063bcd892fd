/// Weapon discharge, hit resolution, damage and loot.
///
/// Every overlap test goes through `collision::intersects`; there is no
/// spatial index, the scans are pairwise over a few hundred entities.

use std::collections::HashSet;

use rand::Rng;
use tracing::{debug, info};

use crate::catalog::VehicleAbility;
use crate::collision::{intersects, Bounded, Rect};
use crate::constants::*;
use crate::entities::{
    BossKind, BossProjectile, DropItem, DropKind, EntityId, Explosion, FrameEvent, GameState,
    PlayerId, Projectile, ProjectileKind, SpecialPower, StatusHit, StatusKind, SubEntityKind,
    ThreatKind, ThreatRef, WeaponSelection,
};
use crate::input::{ControlScheme, InputState};
use crate::qte;
use crate::timers::Expiry;

// ── Scaling ──────────────────────────────────────────────────────────────────

/// Outgoing damage multiplier for a given player level.
pub fn damage_bonus(player_level: u32) -> f32 {
    1.0 + player_level.saturating_sub(1) as f32 * DAMAGE_BONUS_PER_LEVEL
}

/// What a nominal hit costs the player after the vehicle's reduction.
pub fn incoming_damage(state: &GameState, nominal: f32) -> f32 {
    nominal * (1.0 - state.loadout.vehicle.damage_reduction)
}

/// Gold rush doubles, the Aegis hull adds its bonus on top.
pub fn currency_multiplier(state: &GameState) -> f32 {
    let rush = if state.buffs.gold_rush.is_active() { 2.0 } else { 1.0 };
    let hull = if state.loadout.vehicle.ability == VehicleAbility::Aegis {
        AEGIS_CURRENCY_BONUS
    } else {
        1.0
    };
    rush * hull
}

fn is_aegis(state: &GameState) -> bool {
    state.loadout.vehicle.ability == VehicleAbility::Aegis
}

/// True when more than `cooldown` ms have passed since `last`.
fn ready(last: Option<u64>, now: u64, cooldown: f32) -> bool {
    last.map_or(true, |t| now.saturating_sub(t) as f32 > cooldown)
}

pub fn bomb_cooldown(state: &GameState) -> f32 {
    let hull = if is_aegis(state) { AEGIS_BOMB_COOLDOWN_FACTOR } else { 1.0 };
    BOMB_COOLDOWN as f32 * hull / fire_rate(state)
}

pub fn gun_cooldown(state: &GameState) -> f32 {
    GUN_COOLDOWN as f32 / fire_rate(state)
}

fn fire_rate(state: &GameState) -> f32 {
    if state.buffs.rapid_fire.is_active() {
        2.0
    } else {
        1.0
    }
}

// ── Firing ───────────────────────────────────────────────────────────────────

/// Discharge the selected weapon of one player if its cooldown, ammo and
/// status allow. Returns whether a shot was created.
pub fn try_fire(state: &mut GameState, id: PlayerId, now: u64) -> bool {
    let Some(player) = state.player(id) else {
        return false;
    };
    if player.dead || player.status.stunned.is_active() {
        return false;
    }
    let (px, py, weapon, ammo, last) =
        (player.x, player.y, player.weapon, player.ammo, player.cooldowns.weapon);
    let bonus = damage_bonus(state.player_level);

    let shot = match weapon {
        WeaponSelection::Bomb => {
            if !ready(last, now, bomb_cooldown(state)) {
                return false;
            }
            Projectile {
                id: EntityId::PENDING,
                owner: id,
                kind: ProjectileKind::Bomb,
                x: px + PLAYER_WIDTH / 2.0 - BOMB_WIDTH / 2.0,
                y: py,
                w: BOMB_WIDTH,
                h: BOMB_HEIGHT,
                damage: state.loadout.bomb.damage * bonus,
                vy: -BOMB_SPEED,
                glyph: state.loadout.bomb.glyph,
            }
        }
        WeaponSelection::Gun => {
            let Some(gun) = state.loadout.gun.as_ref() else {
                return false;
            };
            if ammo == 0 || !ready(last, now, gun_cooldown(state)) {
                return false;
            }
            Projectile {
                id: EntityId::PENDING,
                owner: id,
                kind: ProjectileKind::Bullet,
                x: px + PLAYER_WIDTH / 2.0 - BULLET_WIDTH / 2.0,
                y: py,
                w: BULLET_WIDTH,
                h: BULLET_HEIGHT,
                damage: gun.damage * bonus,
                vy: -BULLET_SPEED,
                glyph: gun.glyph,
            }
        }
    };

    let shot = Projectile { id: state.alloc_id(), ..shot };
    let kind = shot.kind;
    state.projectiles.push(shot);
    if let Some(player) = state.player_mut(id) {
        player.cooldowns.weapon = Some(now);
        if kind == ProjectileKind::Bullet {
            player.ammo = player.ammo.saturating_sub(1);
        }
    }
    state.events.push(FrameEvent::WeaponFired { player: id, kind });
    true
}

/// Fire for every player holding their fire key. No firing during a
/// reflex-dodge session.
pub fn fire_weapons(state: &mut GameState, input: &InputState, now: u64) {
    if state.qte.is_some() {
        return;
    }
    let shooters: Vec<PlayerId> = state
        .players
        .iter()
        .filter(|p| input.is_pressed(ControlScheme::for_player(p.id).fire))
        .map(|p| p.id)
        .collect();
    for id in shooters {
        try_fire(state, id, now);
    }
}

fn flank_shot(owner: PlayerId, x: f32, y: f32, damage: f32, glyph: char) -> Projectile {
    Projectile {
        id: EntityId::PENDING,
        owner,
        kind: ProjectileKind::Bullet,
        x,
        y,
        w: BULLET_WIDTH,
        h: BULLET_HEIGHT,
        damage,
        vy: -BULLET_SPEED,
        glyph,
    }
}

/// Vehicle auto-weapons and the wingman drone.
pub fn fire_passives(state: &mut GameState, now: u64) {
    let bonus = damage_bonus(state.player_level);
    let ability = state.loadout.vehicle.ability;
    let drone_owner = state.first_live_player().map_or(PlayerId::One, |p| p.id);
    let mut shots = Vec::new();

    for player in state.players.iter_mut().filter(|p| !p.dead) {
        match ability {
            VehicleAbility::SideCannons => {
                if ready(
                    player.cooldowns.side_cannon,
                    now,
                    BATTLESHIP_SIDE_CANNON_COOLDOWN as f32,
                ) {
                    player.cooldowns.side_cannon = Some(now);
                    let y = player.y + PLAYER_HEIGHT / 2.0;
                    let dmg = BATTLESHIP_SIDE_CANNON_DAMAGE * bonus;
                    shots.push(flank_shot(player.id, player.x, y, dmg, '•'));
                    shots.push(flank_shot(
                        player.id,
                        player.x + PLAYER_WIDTH - BULLET_WIDTH,
                        y,
                        dmg,
                        '•',
                    ));
                }
            }
            VehicleAbility::Aegis => {
                if ready(player.cooldowns.laser, now, AEGIS_LASER_COOLDOWN as f32) {
                    player.cooldowns.laser = Some(now);
                    let y = player.y + PLAYER_HEIGHT / 4.0;
                    let dmg = AEGIS_LASER_DAMAGE * bonus;
                    shots.push(flank_shot(player.id, player.x, y, dmg, '⚡'));
                    shots.push(flank_shot(
                        player.id,
                        player.x + PLAYER_WIDTH - BULLET_WIDTH,
                        y,
                        dmg,
                        '⚡',
                    ));
                }
            }
            VehicleAbility::None => {}
        }
    }

    if let Some(drone) = state.drone.as_mut() {
        if ready(drone.last_fire, now, DRONE_FIRE_COOLDOWN as f32) {
            drone.last_fire = Some(now);
            shots.push(Projectile {
                id: EntityId::PENDING,
                owner: drone_owner,
                kind: ProjectileKind::DroneBullet,
                x: drone.x + DRONE_WIDTH / 2.0 - BULLET_WIDTH / 2.0,
                y: drone.y,
                w: BULLET_WIDTH,
                h: BULLET_HEIGHT,
                damage: DRONE_DAMAGE * bonus,
                vy: -BULLET_SPEED,
                glyph: '•',
            });
        }
    }

    for shot in shots {
        let id = state.alloc_id();
        state.projectiles.push(Projectile { id, ..shot });
    }
}

// ── Damage to players ────────────────────────────────────────────────────────

/// Subtract already-reduced damage, clamping HP at zero.
pub fn damage_player(state: &mut GameState, id: PlayerId, amount: f32) {
    if amount <= 0.0 {
        return;
    }
    if let Some(player) = state.player_mut(id) {
        if player.dead {
            return;
        }
        player.hp = (player.hp - amount).max(0.0);
        state.events.push(FrameEvent::PlayerDamaged { player: id, amount });
    }
}

fn apply_status(state: &mut GameState, id: PlayerId, hit: StatusHit, now: u64) {
    let Some(player) = state.players.get_mut(id.index()) else {
        return;
    };
    match hit.kind {
        StatusKind::Stun => {
            player
                .status
                .stunned
                .activate(&mut state.timers, now, hit.duration, Expiry::Stun(id))
        }
        StatusKind::Slow => {
            player
                .status
                .slowed
                .activate(&mut state.timers, now, hit.duration, Expiry::Slow(id))
        }
    }
    state.events.push(FrameEvent::PlayerStatus { player: id, kind: hit.kind });
}

/// Body contact with enemies, boss projectiles and the boss itself. A
/// threat entering an Aegis pilot's danger zone may open a reflex-dodge
/// session instead of hitting. Skipped entirely while invincible.
pub fn resolve_threats(state: &mut GameState, now: u64, rng: &mut impl Rng) {
    if state.buffs.invincible.is_active() {
        return;
    }
    let held = state.qte.as_ref().map(|s| s.threat.id);
    let hit = incoming_damage(state, HIT_DAMAGE);
    let mut damage = vec![0.0f32; state.players.len()];
    let mut enemies_hit: HashSet<EntityId> = HashSet::new();
    let mut shots_hit: HashSet<EntityId> = HashSet::new();

    let enemy_boxes: Vec<(EntityId, Rect)> =
        state.enemies.iter().map(|e| (e.id, e.bounds())).collect();
    for (id, rect) in enemy_boxes {
        if held == Some(id) {
            continue;
        }
        let threat = ThreatRef { id, kind: ThreatKind::Enemy };
        for i in 0..state.players.len() {
            let pid = state.players[i].id;
            if state.players[i].dead {
                continue;
            }
            if qte::try_trigger(state, pid, threat, rect, now, rng) {
                break;
            }
            if intersects(&state.players[i], &rect) {
                damage[i] += hit;
                enemies_hit.insert(id);
                state.explosions.push(Explosion { x: rect.x, y: rect.y, started_at: now, glyph: '*' });
            }
        }
    }

    let shot_boxes: Vec<(EntityId, Rect, Option<StatusHit>)> = state
        .boss_projectiles
        .iter()
        .map(|p| (p.id, p.bounds(), p.status))
        .collect();
    for (id, rect, status) in shot_boxes {
        if held == Some(id) {
            continue;
        }
        let threat = ThreatRef { id, kind: ThreatKind::Projectile };
        for i in 0..state.players.len() {
            let pid = state.players[i].id;
            if state.players[i].dead {
                continue;
            }
            if qte::try_trigger(state, pid, threat, rect, now, rng) {
                break;
            }
            if intersects(&state.players[i], &rect) {
                shots_hit.insert(id);
                match status {
                    Some(effect) => apply_status(state, pid, effect, now),
                    None => damage[i] += hit,
                }
            }
        }
    }

    if let Some(boss) = state.boss.as_ref() {
        for (i, player) in state.players.iter().enumerate() {
            if !player.dead && intersects(player, boss) {
                damage[i] += hit * 2.0;
            }
        }
    }

    for (i, amount) in damage.into_iter().enumerate() {
        let pid = state.players[i].id;
        damage_player(state, pid, amount);
    }
    if !enemies_hit.is_empty() {
        state.enemies.retain(|e| !enemies_hit.contains(&e.id));
    }
    if !shots_hit.is_empty() {
        state.boss_projectiles.retain(|p| !shots_hit.contains(&p.id));
    }
}

// ── Pickups ──────────────────────────────────────────────────────────────────

/// First live player to touch a drop takes it. Ammo is only collectable
/// with a gun equipped and never exceeds its capacity.
pub fn pickup_drops(state: &mut GameState) {
    let max_ammo = state.loadout.gun.as_ref().map(|g| g.max_ammo);
    let drops = std::mem::take(&mut state.drops);
    let mut kept = Vec::with_capacity(drops.len());

    for drop in drops {
        if drop.kind == DropKind::Ammo && max_ammo.is_none() {
            kept.push(drop);
            continue;
        }
        let taker = state
            .players
            .iter_mut()
            .find(|p| !p.dead && intersects(&**p, &drop));
        let Some(player) = taker else {
            kept.push(drop);
            continue;
        };
        match drop.kind {
            DropKind::Ammo => {
                let cap = max_ammo.unwrap_or(0);
                player.ammo = (player.ammo + drop.amount as u32).min(cap);
            }
            DropKind::Currency => state.run_currency += drop.amount,
        }
        let pid = player.id;
        state.events.push(FrameEvent::Pickup { player: pid, kind: drop.kind, amount: drop.amount });
    }
    state.drops = kept;
}

// ── Player shots vs targets ──────────────────────────────────────────────────

fn currency_drop(state: &mut GameState, x: f32, y: f32, amount: f32) {
    let id = state.alloc_id();
    state.drops.push(DropItem {
        id,
        kind: DropKind::Currency,
        x,
        y,
        w: CURRENCY_DROP_WIDTH,
        h: CURRENCY_DROP_HEIGHT,
        amount,
    });
}

fn award_score(state: &mut GameState, to: PlayerId, points: u32) {
    if let Some(player) = state.player_mut(to) {
        player.score += points;
    }
}

/// Eight stun shards flying out from a shattered ice block.
fn shatter(state: &mut GameState, x: f32, y: f32, now: u64) {
    for i in 0..SHATTER_FRAGMENT_COUNT {
        let angle = i as f32 / SHATTER_FRAGMENT_COUNT as f32 * std::f32::consts::TAU;
        let id = state.alloc_id();
        state.boss_projectiles.push(BossProjectile {
            id,
            x,
            y,
            w: BOSS_PROJECTILE_WIDTH,
            h: BOSS_PROJECTILE_HEIGHT,
            dx: angle.cos() * BOSS_PROJECTILE_SPEED * 0.8,
            dy: angle.sin() * BOSS_PROJECTILE_SPEED * 0.8,
            status: Some(StatusHit { kind: StatusKind::Stun, duration: SHATTER_STUN_MS }),
            created_at: now,
            lifetime: None,
            health: None,
        });
    }
}

/// Resolve every player shot against, in order: wave enemies, the boss,
/// the boss's sub-entities, breakable boss projectiles. A shot is spent on
/// its first match; shots never pierce.
pub fn resolve_player_shots(state: &mut GameState, now: u64, rng: &mut impl Rng) {
    let shots = std::mem::take(&mut state.projectiles);
    let mut survivors = Vec::with_capacity(shots.len());
    let mut killed: HashSet<EntityId> = HashSet::new();

    for shot in shots {
        // Wave enemies and minions.
        let target = state
            .enemies
            .iter_mut()
            .find(|e| !killed.contains(&e.id) && intersects(&**e, &shot));
        if let Some(enemy) = target {
            let dead = match enemy.health.as_mut() {
                Some(hp) => {
                    *hp -= shot.damage;
                    *hp <= 0.0
                }
                None => true,
            };
            if dead {
                killed.insert(enemy.id);
                let (x, y) = (enemy.x, enemy.y);
                award_score(state, shot.owner, ENEMY_SCORE);
                state.run_xp += ENEMY_XP_DROP;
                let amount = ENEMY_CURRENCY_DROP * currency_multiplier(state);
                currency_drop(state, x, y, amount);
                state.explosions.push(Explosion { x, y, started_at: now, glyph: '*' });
                state.events.push(FrameEvent::EnemyKilled { by: shot.owner });
            }
            continue;
        }

        if hit_boss(state, &shot, now, rng) {
            continue;
        }

        if let Some(boss) = state.boss.as_mut() {
            let sub = boss.sub_entities.iter_mut().find(|s| intersects(&**s, &shot));
            if let Some(sub) = sub {
                if let Some(hp) = sub.health.as_mut() {
                    *hp -= shot.damage;
                }
                continue;
            }
        }

        let block = state
            .boss_projectiles
            .iter_mut()
            .find(|p| p.is_breakable() && intersects(&**p, &shot));
        if let Some(block) = block {
            let hp = block.health.unwrap_or(0.0) - shot.damage;
            block.health = Some(hp);
            if hp <= 0.0 {
                let (bid, x, y) = (block.id, block.x, block.y);
                state.boss_projectiles.retain(|p| p.id != bid);
                state.explosions.push(Explosion { x, y, started_at: now, glyph: '❄' });
                shatter(state, x, y, now);
                debug!("Ice shard shattered");
            }
            continue;
        }

        survivors.push(shot);
    }

    if !killed.is_empty() {
        state.enemies.retain(|e| !killed.contains(&e.id));
    }
    state.projectiles.extend(survivors);
}

/// Returns true when the shot is spent on the boss. Shots pass straight
/// through a boss under its Decree.
fn hit_boss(state: &mut GameState, shot: &Projectile, now: u64, rng: &mut impl Rng) -> bool {
    let Some(boss) = state.boss.as_mut() else {
        return false;
    };
    if !intersects(&*boss, shot) || boss.power_active(SpecialPower::Decree) {
        return false;
    }
    let mut dealt = shot.damage;
    if boss.kind == BossKind::BlackHole {
        dealt *= BLACK_HOLE_DIRECT_DAMAGE_MODIFIER;
    }
    boss.health = (boss.health - dealt).max(0.0);
    boss.last_damaged = now;
    let (bx, by) = (boss.x, boss.y);

    award_score(state, shot.owner, BOSS_HIT_SCORE);
    state.events.push(FrameEvent::BossDamaged { amount: dealt });
    if rng.gen_bool(AMMO_DROP_CHANCE_ON_BOSS_HIT) {
        let id = state.alloc_id();
        state.drops.push(DropItem {
            id,
            kind: DropKind::Ammo,
            x: bx + rng.gen_range(0.0..BOSS_WIDTH),
            y: by + BOSS_HEIGHT,
            w: AMMO_DROP_WIDTH,
            h: AMMO_DROP_HEIGHT,
            amount: AMMO_DROP_BASE_AMOUNT as f32,
        });
    }
    true
}

// ── Sub-entity bookkeeping ───────────────────────────────────────────────────

/// Shot-down black-hole fragments drift back into the core and hurt it on
/// arrival.
pub fn return_fragments(state: &mut GameState, now: u64) {
    let Some(boss) = state.boss.as_mut() else {
        return;
    };
    let (cx, cy) = boss.center();
    let mut arrivals = Vec::new();
    boss.sub_entities.retain_mut(|frag| {
        if frag.kind != SubEntityKind::Fragment || frag.health.map_or(true, |h| h > 0.0) {
            return true;
        }
        let dx = cx - frag.x;
        let dy = cy - frag.y;
        let len = (dx * dx + dy * dy).sqrt().max(f32::EPSILON);
        frag.x += dx / len * FRAGMENT_RETURN_SPEED;
        frag.y += dy / len * FRAGMENT_RETURN_SPEED;
        if len < FRAGMENT_ARRIVAL_DISTANCE {
            arrivals.push((frag.x, frag.y));
            false
        } else {
            true
        }
    });
    for (x, y) in arrivals {
        boss.health = (boss.health - FRAGMENT_CORE_DAMAGE).max(0.0);
        state.explosions.push(Explosion { x, y, started_at: now, glyph: '✦' });
        state.events.push(FrameEvent::BossDamaged { amount: FRAGMENT_CORE_DAMAGE });
    }
}

// ── Deaths & consumables ─────────────────────────────────────────────────────

/// Mark players at zero HP as dead and park them off the arena.
pub fn check_player_deaths(state: &mut GameState, now: u64) {
    let mut died = Vec::new();
    for player in state.players.iter_mut() {
        if player.hp <= 0.0 && !player.dead {
            player.dead = true;
            state.explosions.push(Explosion { x: player.x, y: player.y, started_at: now, glyph: '☠' });
            player.x = DEAD_PLAYER_X;
            player.status.clear(&mut state.timers);
            died.push(player.id);
        }
    }
    for id in died {
        info!(player = ?id, "Player destroyed");
        state.events.push(FrameEvent::PlayerDied { player: id });
    }
}

/// Destroy every enemy on screen. Rewards are split ceil/floor between two
/// players so the total is conserved.
pub fn nuke(state: &mut GameState, now: u64) {
    let killed = std::mem::take(&mut state.enemies);
    let count = killed.len() as u32;
    if count == 0 {
        return;
    }
    if state.multiplayer {
        award_score(state, PlayerId::One, count.div_ceil(2) * ENEMY_SCORE);
        award_score(state, PlayerId::Two, count / 2 * ENEMY_SCORE);
    } else {
        award_score(state, PlayerId::One, count * ENEMY_SCORE);
    }
    state.run_xp += count * ENEMY_XP_DROP;
    let amount = ENEMY_CURRENCY_DROP * currency_multiplier(state);
    for enemy in killed {
        let x = enemy.x + enemy.w / 2.0;
        let y = enemy.y + enemy.h / 2.0;
        currency_drop(state, x, y, amount);
        state.explosions.push(Explosion { x, y, started_at: now, glyph: '*' });
    }
    info!(count, "Nuke cleared the wave");
}
