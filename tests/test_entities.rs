use std::sync::Arc;

use boat_blitz::boss::{behavior, BEHAVIORS};
use boat_blitz::catalog::Catalog;
use boat_blitz::collision::{center_distance_sq, intersects, Bounded, Rect};
use boat_blitz::compute::init_run;
use boat_blitz::config::RunConfig;
use boat_blitz::constants::*;
use boat_blitz::entities::*;

use rand::rngs::StdRng;
use rand::SeedableRng;

fn make_state() -> GameState {
    let catalog = Arc::new(Catalog::embedded().unwrap());
    init_run(catalog, &RunConfig::default(), 0, &mut StdRng::seed_from_u64(42)).unwrap()
}

#[test]
fn boss_kind_table_is_in_campaign_order() {
    assert_eq!(BossKind::ALL.len(), BossKind::COUNT);
    assert_eq!(BEHAVIORS.len(), BossKind::COUNT);
    for (i, kind) in BossKind::ALL.iter().enumerate() {
        assert_eq!(kind.index(), i);
        assert!(!kind.name().is_empty());
    }
    assert_eq!(BossKind::ALL[0], BossKind::Octopus);
    assert_eq!(BossKind::ALL[BossKind::COUNT - 1], BossKind::BlackHole);
}

#[test]
fn fast_species_are_the_quick_shooters() {
    let fast: Vec<BossKind> = BossKind::ALL
        .iter()
        .copied()
        .filter(|k| behavior(*k).fast)
        .collect();
    assert_eq!(
        fast,
        vec![BossKind::Grandma, BossKind::King, BossKind::Angel, BossKind::Mystery]
    );
}

#[test]
fn specials_belong_to_the_middle_of_the_campaign() {
    for kind in BossKind::ALL {
        let has_special = behavior(kind).special.is_some();
        let expected = (BossKind::Grandma.index()..=BossKind::King.index()).contains(&kind.index());
        assert_eq!(has_special, expected, "{:?}", kind);
    }
}

#[test]
fn game_state_clone_is_independent() {
    let original = make_state();
    let mut cloned = original.clone();
    cloned.players[0].hp = 1.0;
    cloned.enemies.clear();
    cloned.level = 7;

    assert_eq!(original.players[0].hp, PLAYER_BASE_HP);
    assert_eq!(original.enemies.len(), 8);
    assert_eq!(original.level, 1);
    assert!(Arc::ptr_eq(&original.catalog, &cloned.catalog));
}

#[test]
fn alloc_id_is_monotonic() {
    let mut s = make_state();
    let a = s.alloc_id();
    let b = s.alloc_id();
    assert!(b > a);
    assert_ne!(a, EntityId::PENDING);
}

#[test]
fn player_lookup_by_id() {
    let mut s = make_state();
    assert!(s.player(PlayerId::One).is_some());
    assert!(s.player(PlayerId::Two).is_none());
    s.player_mut(PlayerId::One).unwrap().dead = true;
    assert_eq!(s.live_players().count(), 0);
}

#[test]
fn bounds_follow_position_and_size() {
    let s = make_state();
    let p = &s.players[0];
    assert_eq!(p.bounds(), Rect::new(p.x, p.y, PLAYER_WIDTH, PLAYER_HEIGHT));
    assert_eq!(p.center(), (p.x + 25.0, p.y + 25.0));
}

#[test]
fn touching_edges_do_not_intersect() {
    let a = Rect::new(0.0, 0.0, 10.0, 10.0);
    assert!(!intersects(&a, &Rect::new(10.0, 0.0, 10.0, 10.0)));
    assert!(!intersects(&a, &Rect::new(0.0, 10.0, 10.0, 10.0)));
    assert!(intersects(&a, &Rect::new(9.5, 9.5, 10.0, 10.0)));
    assert_eq!(center_distance_sq(&a, &Rect::new(3.0, 4.0, 10.0, 10.0)), 25.0);
}

#[test]
fn breakable_and_status_projectiles() {
    let base = BossProjectile {
        id: EntityId(1),
        x: 0.0,
        y: 0.0,
        w: BOSS_PROJECTILE_WIDTH,
        h: BOSS_PROJECTILE_HEIGHT,
        dx: 0.0,
        dy: BOSS_PROJECTILE_SPEED,
        status: None,
        created_at: 0,
        lifetime: None,
        health: None,
    };
    assert!(!base.is_status());
    assert!(!base.is_breakable());

    let shard = BossProjectile { health: Some(SHATTER_SHARD_HEALTH), ..base.clone() };
    assert!(shard.is_breakable());
    let spent = BossProjectile { health: Some(0.0), ..base.clone() };
    assert!(!spent.is_breakable());

    let web = BossProjectile {
        status: Some(StatusHit { kind: StatusKind::Stun, duration: 1500 }),
        ..base
    };
    assert!(web.is_status());
}

#[test]
fn power_active_checks_the_running_power() {
    let mut s = make_state();
    s.enemies.clear();
    boat_blitz::boss::spawn_if_cleared(&mut s, 0, &mut StdRng::seed_from_u64(42));
    let boss = s.boss.as_mut().unwrap();
    assert!(!boss.power_active(SpecialPower::Decree));
    boss.power = Some(ActivePower { power: SpecialPower::Decree, started_at: 0, ends_at: 10 });
    assert!(boss.power_active(SpecialPower::Decree));
    assert!(!boss.power_active(SpecialPower::Roar));
}
