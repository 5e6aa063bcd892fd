/// Buff/debuff timer model.
///
/// Every timed effect is an `(active, expiry)` pair plus the handle of the
/// timer that will clear it. Timers live in a single `TimerQueue` owned by
/// the game state; the driver drains due timers once per tick and applies
/// their `Expiry`. Re-activating an effect cancels its previous timer, and a
/// level reset cancels every timer, so a stale expiry can never clear a flag
/// that was set later.

use crate::entities::PlayerId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

/// What happens when a timer fires.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Expiry {
    Invincibility,
    RapidFire,
    TimeSlow,
    GoldRush,
    Stun(PlayerId),
    Slow(PlayerId),
    ControlsReversed(PlayerId),
    /// Undo a temporary vertical displacement of the boss.
    BossRecoil { dy: f32 },
}

#[derive(Clone, Debug)]
struct Pending {
    id: TimerId,
    due: u64,
    expiry: Expiry,
}

/// Cancellable one-shot timers keyed on the game clock.
#[derive(Clone, Debug, Default)]
pub struct TimerQueue {
    next_id: u64,
    pending: Vec<Pending>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, due: u64, expiry: Expiry) -> TimerId {
        self.next_id += 1;
        let id = TimerId(self.next_id);
        self.pending.push(Pending { id, due, expiry });
        id
    }

    /// Returns false if the timer already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| p.id != id);
        self.pending.len() != before
    }

    pub fn cancel_all(&mut self) {
        self.pending.clear();
    }

    /// Remove and return every expiry due at or before `now`, earliest first.
    pub fn drain_due(&mut self, now: u64) -> Vec<Expiry> {
        let (mut due, rest): (Vec<Pending>, Vec<Pending>) =
            self.pending.drain(..).partition(|p| p.due <= now);
        self.pending = rest;
        due.sort_by_key(|p| (p.due, p.id.0));
        due.into_iter().map(|p| p.expiry).collect()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

/// A time-boxed status flag.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TimedEffect {
    expires_at: Option<u64>,
    timer: Option<TimerId>,
}

impl TimedEffect {
    pub fn is_active(&self) -> bool {
        self.expires_at.is_some()
    }

    pub fn expires_at(&self) -> Option<u64> {
        self.expires_at
    }

    /// Milliseconds left, for countdown readouts.
    pub fn remaining(&self, now: u64) -> u64 {
        self.expires_at.map_or(0, |end| end.saturating_sub(now))
    }

    /// Switch the effect on for `duration` ms, replacing any earlier window.
    pub fn activate(&mut self, timers: &mut TimerQueue, now: u64, duration: u64, expiry: Expiry) {
        if let Some(old) = self.timer.take() {
            timers.cancel(old);
        }
        let end = now + duration;
        self.expires_at = Some(end);
        self.timer = Some(timers.schedule(end, expiry));
    }

    /// Switch the effect off early and cancel its timer.
    pub fn clear(&mut self, timers: &mut TimerQueue) {
        if let Some(old) = self.timer.take() {
            timers.cancel(old);
        }
        self.expires_at = None;
    }

    /// Called when the effect's own timer fires.
    pub fn expire(&mut self) {
        self.expires_at = None;
        self.timer = None;
    }
}

/// Run-wide buffs granted by consumables.
#[derive(Clone, Debug, Default)]
pub struct GlobalBuffs {
    pub invincible: TimedEffect,
    pub rapid_fire: TimedEffect,
    pub time_slow: TimedEffect,
    pub gold_rush: TimedEffect,
}

impl GlobalBuffs {
    pub fn clear(&mut self, timers: &mut TimerQueue) {
        self.invincible.clear(timers);
        self.rapid_fire.clear(timers);
        self.time_slow.clear(timers);
        self.gold_rush.clear(timers);
    }
}

/// A displacement applied every tick until `ends_at`, independent of input.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PushForce {
    pub dx: f32,
    pub dy: f32,
    pub ends_at: u64,
}

impl PushForce {
    pub fn is_active(&self, now: u64) -> bool {
        now < self.ends_at
    }
}

/// Debuffs a boss can inflict on one player.
#[derive(Clone, Debug, Default)]
pub struct PlayerStatus {
    pub stunned: TimedEffect,
    pub slowed: TimedEffect,
    pub controls_reversed: TimedEffect,
    /// At most one push-force at a time; a new one replaces the old.
    pub push: Option<PushForce>,
}

impl PlayerStatus {
    pub fn clear(&mut self, timers: &mut TimerQueue) {
        self.stunned.clear(timers);
        self.slowed.clear(timers);
        self.controls_reversed.clear(timers);
        self.push = None;
    }
}
