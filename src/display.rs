/// Terminal rendering. All crossterm drawing for the arena, HUD and overlays.
///
/// Each function receives a mutable writer and an immutable view of the
/// game state. No game logic is performed; this module only scales arena
/// coordinates onto the terminal grid and translates state into terminal
/// commands.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal,
    QueueableCommand,
};
use boat_blitz::constants::{ARENA_HEIGHT, ARENA_WIDTH};
use boat_blitz::entities::{
    Direction, DropKind, GameState, GameStatus, PlayerId, ProjectileKind, RunOutcome, StatusKind,
    SubEntityKind, WeaponSelection,
};
use boat_blitz::hud::HudView;

// ── Colour palette ────────────────────────────────────────────────────────────

const C_BORDER: Color = Color::DarkBlue;
const C_HUD_SCORE: Color = Color::Yellow;
const C_HUD_HP: Color = Color::Red;
const C_PLAYER_ONE: Color = Color::White;
const C_PLAYER_TWO: Color = Color::Cyan;
const C_ENEMY: Color = Color::Green;
const C_BOSS: Color = Color::Red;
const C_BOSS_FADED: Color = Color::DarkGrey;
const C_SHOT: Color = Color::Cyan;
const C_BOSS_SHOT: Color = Color::Magenta;
const C_STATUS_SHOT: Color = Color::Blue;
const C_DROP_AMMO: Color = Color::White;
const C_DROP_CURRENCY: Color = Color::Yellow;
const C_EXPLOSION: Color = Color::DarkYellow;
const C_HINT: Color = Color::DarkGrey;
const C_BUFF: Color = Color::Yellow;
const C_TAUNT: Color = Color::Magenta;

/// Terminal geometry of the playfield, inside the border.
#[derive(Clone, Copy)]
struct Grid {
    width: u16,
    height: u16,
}

impl Grid {
    fn from_terminal() -> std::io::Result<Self> {
        let (width, height) = terminal::size()?;
        Ok(Self { width, height })
    }

    /// Arena pixel position to a terminal cell inside the border, or `None`
    /// when it falls outside the visible field.
    fn cell(&self, x: f32, y: f32) -> Option<(u16, u16)> {
        if !(0.0..ARENA_WIDTH).contains(&x) || !(0.0..ARENA_HEIGHT).contains(&y) {
            return None;
        }
        let cols = self.width.saturating_sub(2) as f32;
        let rows = self.height.saturating_sub(4) as f32;
        let col = 1 + (x / ARENA_WIDTH * cols) as u16;
        let row = 2 + (y / ARENA_HEIGHT * rows) as u16;
        Some((col, row))
    }
}

fn put<W: Write>(out: &mut W, grid: &Grid, x: f32, y: f32, color: Color, glyph: char) -> std::io::Result<()> {
    if let Some((col, row)) = grid.cell(x, y) {
        out.queue(cursor::MoveTo(col, row))?;
        out.queue(style::SetForegroundColor(color))?;
        out.queue(Print(glyph))?;
    }
    Ok(())
}

fn centered<W: Write>(out: &mut W, grid: &Grid, row: u16, color: Color, text: &str) -> std::io::Result<()> {
    let col = (grid.width / 2).saturating_sub(text.chars().count() as u16 / 2);
    out.queue(cursor::MoveTo(col, row))?;
    out.queue(style::SetForegroundColor(color))?;
    out.queue(Print(text))?;
    Ok(())
}

// ── Public entry point ────────────────────────────────────────────────────────

/// Render one complete frame.
pub fn render<W: Write>(
    out: &mut W,
    state: &GameState,
    hud: &HudView,
    show_controls: bool,
    paused: bool,
) -> std::io::Result<()> {
    let grid = Grid::from_terminal()?;
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    draw_border(out, &grid)?;
    draw_hud(out, &grid, hud)?;
    draw_entities(out, &grid, state)?;
    draw_boss(out, &grid, state, hud)?;
    draw_players(out, &grid, state)?;

    if let Some(taunt) = &hud.taunt {
        centered(out, &grid, 2, C_TAUNT, &format!("“{}”", taunt))?;
    }
    if hud.dodge.is_some() {
        draw_dodge_prompt(out, &grid, hud)?;
    }
    if show_controls {
        draw_controls_hint(out, &grid, state.multiplayer)?;
    }
    if paused {
        draw_pause(out, &grid)?;
    }
    if let (GameStatus::GameOver | GameStatus::Victory, Some(outcome)) =
        (state.status, state.outcome.as_ref())
    {
        draw_outcome(out, &grid, outcome)?;
    }

    // Park cursor in a harmless spot and flush
    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, grid.height.saturating_sub(1)))?;
    out.flush()?;
    Ok(())
}

// ── Border ────────────────────────────────────────────────────────────────────

fn draw_border<W: Write>(out: &mut W, grid: &Grid) -> std::io::Result<()> {
    let w = grid.width as usize;
    let h = grid.height;

    out.queue(style::SetForegroundColor(C_BORDER))?;
    out.queue(cursor::MoveTo(0, 1))?;
    out.queue(Print(format!("┌{}┐", "─".repeat(w.saturating_sub(2)))))?;
    out.queue(cursor::MoveTo(0, h.saturating_sub(2)))?;
    out.queue(Print(format!("└{}┘", "─".repeat(w.saturating_sub(2)))))?;

    for row in 2..h.saturating_sub(2) {
        out.queue(cursor::MoveTo(0, row))?;
        out.queue(Print("│"))?;
        out.queue(cursor::MoveTo(grid.width.saturating_sub(1), row))?;
        out.queue(Print("│"))?;
    }
    Ok(())
}

// ── HUD (row 0) ───────────────────────────────────────────────────────────────

fn weapon_tag(weapon: WeaponSelection, ammo: Option<u32>) -> String {
    match (weapon, ammo) {
        (WeaponSelection::Gun, Some(ammo)) => format!("GUN {:>3}", ammo),
        _ => "BOMB".to_string(),
    }
}

fn draw_hud<W: Write>(out: &mut W, grid: &Grid, hud: &HudView) -> std::io::Result<()> {
    // Left: scores, HP, weapons
    out.queue(cursor::MoveTo(1, 0))?;
    for p in &hud.players {
        let label = match p.id {
            PlayerId::One => "P1",
            PlayerId::Two => "P2",
        };
        out.queue(style::SetForegroundColor(C_HUD_SCORE))?;
        out.queue(Print(format!("{} {:>6} ", label, p.score)))?;
        out.queue(style::SetForegroundColor(C_HUD_HP))?;
        if p.dead {
            out.queue(Print("✖ "))?;
        } else {
            out.queue(Print(format!("♥{:>3.0}/{:<3.0} ", p.hp, p.max_hp)))?;
        }
        out.queue(style::SetForegroundColor(C_HINT))?;
        out.queue(Print(format!("[{}] ", weapon_tag(p.weapon, p.ammo))))?;
    }

    // Centre: level
    let level_str = format!("[ LEVEL {}/{} ]", hud.level, hud.final_level);
    centered(out, grid, 0, Color::Green, &level_str)?;

    // Right: buffs, consumable, currency
    let mut right = String::new();
    for (tag, secs) in [
        ("SHIELD", hud.buffs.invincible),
        ("RAPID", hud.buffs.rapid_fire),
        ("SLOW", hud.buffs.time_slow),
        ("GOLD", hud.buffs.gold_rush),
    ] {
        if secs > 0 {
            right.push_str(&format!("[{} {:>2}s] ", tag, secs));
        }
    }
    if let Some((name, glyph)) = &hud.consumable {
        right.push_str(&format!("{} {} x{} ", glyph, name, hud.consumables_left));
    }
    right.push_str(&format!("${} Lv{} XP{}", hud.currency, hud.player_level, hud.xp));
    let rx = grid.width.saturating_sub(right.chars().count() as u16 + 1);
    out.queue(cursor::MoveTo(rx, 0))?;
    out.queue(style::SetForegroundColor(C_BUFF))?;
    out.queue(Print(&right))?;
    Ok(())
}

// ── Entities ──────────────────────────────────────────────────────────────────

fn draw_entities<W: Write>(out: &mut W, grid: &Grid, state: &GameState) -> std::io::Result<()> {
    for enemy in &state.enemies {
        put(out, grid, enemy.x, enemy.y, C_ENEMY, enemy.glyph)?;
    }
    for drop in &state.drops {
        let (color, glyph) = match drop.kind {
            DropKind::Ammo => (C_DROP_AMMO, '≡'),
            DropKind::Currency => (C_DROP_CURRENCY, '$'),
        };
        put(out, grid, drop.x, drop.y, color, glyph)?;
    }
    for shot in &state.projectiles {
        let color = match shot.kind {
            ProjectileKind::Bomb => C_HUD_SCORE,
            ProjectileKind::Bullet | ProjectileKind::DroneBullet => C_SHOT,
        };
        put(out, grid, shot.x, shot.y, color, shot.glyph)?;
    }
    for shot in &state.boss_projectiles {
        let (color, glyph) = match shot.status.map(|s| s.kind) {
            Some(StatusKind::Stun) => (C_STATUS_SHOT, '✱'),
            Some(StatusKind::Slow) => (C_STATUS_SHOT, '~'),
            None if shot.health.is_some() => (C_STATUS_SHOT, '◆'),
            None => (C_BOSS_SHOT, '●'),
        };
        put(out, grid, shot.x, shot.y, color, glyph)?;
    }
    for boom in &state.explosions {
        put(out, grid, boom.x, boom.y, C_EXPLOSION, boom.glyph)?;
    }
    if let Some(drone) = &state.drone {
        put(out, grid, drone.x, drone.y, C_PLAYER_ONE, '⌂')?;
    }
    Ok(())
}

fn draw_boss<W: Write>(out: &mut W, grid: &Grid, state: &GameState, hud: &HudView) -> std::io::Result<()> {
    let (Some(boss), Some(info)) = (state.boss.as_ref(), hud.boss.as_ref()) else {
        return Ok(());
    };
    let color = if info.invisible { C_BOSS_FADED } else { C_BOSS };

    // A filled block across the boss's footprint, name on the top edge.
    let step_x = ARENA_WIDTH / grid.width.max(1) as f32;
    let step_y = ARENA_HEIGHT / grid.height.max(1) as f32;
    let mut y = boss.y;
    while y < boss.y + boss.h {
        let mut x = boss.x;
        while x < boss.x + boss.w {
            put(out, grid, x, y, color, '▓')?;
            x += step_x;
        }
        y += step_y;
    }
    if let Some((col, row)) = grid.cell(boss.x, boss.y) {
        out.queue(cursor::MoveTo(col, row))?;
        out.queue(style::SetForegroundColor(Color::White))?;
        out.queue(Print(info.name))?;
    }
    for sub in &boss.sub_entities {
        let glyph = match sub.kind {
            SubEntityKind::Spirit => 'ᴥ',
            SubEntityKind::Fragment => '◇',
        };
        put(out, grid, sub.x, sub.y, color, glyph)?;
    }

    // Boss health bar on the top border
    let bar_width = grid.width.saturating_sub(4) as usize / 2;
    let filled = (info.fraction * bar_width as f32).round() as usize;
    let bar = format!("{}{}", "█".repeat(filled), "░".repeat(bar_width.saturating_sub(filled)));
    centered(out, grid, 1, C_BOSS, &bar)?;
    Ok(())
}

fn draw_players<W: Write>(out: &mut W, grid: &Grid, state: &GameState) -> std::io::Result<()> {
    let glyph = state.loadout.vehicle.glyph;
    for player in state.live_players() {
        let color = if player.status.stunned.is_active() {
            C_STATUS_SHOT
        } else {
            match player.id {
                PlayerId::One => C_PLAYER_ONE,
                PlayerId::Two => C_PLAYER_TWO,
            }
        };
        let (cx, cy) = (player.x + player.w / 2.0, player.y + player.h / 2.0);
        put(out, grid, cx, cy, color, glyph)?;
    }
    Ok(())
}

// ── Overlays ──────────────────────────────────────────────────────────────────

fn arrow(dir: Direction) -> char {
    match dir {
        Direction::Up => '↑',
        Direction::Down => '↓',
        Direction::Left => '←',
        Direction::Right => '→',
    }
}

fn draw_dodge_prompt<W: Write>(out: &mut W, grid: &Grid, hud: &HudView) -> std::io::Result<()> {
    let Some(prompt) = &hud.dodge else {
        return Ok(());
    };
    let row = grid.height / 2;
    centered(out, grid, row.saturating_sub(1), Color::Yellow, "!! DODGE !!")?;
    let keys: String = prompt
        .sequence
        .iter()
        .enumerate()
        .map(|(i, d)| if i < prompt.progress { '·' } else { arrow(*d) })
        .flat_map(|c| [c, ' '])
        .collect();
    centered(out, grid, row, Color::White, keys.trim_end())
}

fn draw_controls_hint<W: Write>(out: &mut W, grid: &Grid, multiplayer: bool) -> std::io::Result<()> {
    let hint = if multiplayer {
        "P1 WASD/SPACE/Q   P2 ARROWS / . /   E : Item   ESC : Pause"
    } else {
        "WASD : Move   SPACE : Fire   Q : Swap   E : Item   ESC : Pause"
    };
    out.queue(cursor::MoveTo(1, grid.height.saturating_sub(1)))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print(hint))?;
    Ok(())
}

fn draw_pause<W: Write>(out: &mut W, grid: &Grid) -> std::io::Result<()> {
    let row = (grid.height / 2).saturating_sub(1);
    centered(out, grid, row, Color::Cyan, "╔══════════════╗")?;
    centered(out, grid, row + 1, Color::Cyan, "║    PAUSED    ║")?;
    centered(out, grid, row + 2, Color::Cyan, "╚══════════════╝")?;
    centered(out, grid, row + 3, Color::White, "ESC - Resume  M - Menu")
}

fn draw_outcome<W: Write>(out: &mut W, grid: &Grid, outcome: &RunOutcome) -> std::io::Result<()> {
    let (title, color) = if outcome.won {
        ("║     VICTORY!       ║", Color::Green)
    } else {
        ("║    GAME  OVER      ║", Color::Red)
    };
    let lines: [(&str, Color); 3] = [
        ("╔════════════════════╗", color),
        (title, color),
        ("╚════════════════════╝", color),
    ];

    let start_row = (grid.height / 2).saturating_sub(4);
    for (i, (msg, color)) in lines.iter().enumerate() {
        centered(out, grid, start_row + i as u16, *color, msg)?;
    }

    let mut row = start_row + lines.len() as u16;
    for (i, score) in outcome.scores.iter().enumerate() {
        centered(out, grid, row, Color::Yellow, &format!("P{} Score: {:>6}", i + 1, score))?;
        row += 1;
    }
    let summary = format!(
        "XP +{}   Currency +{}   Items left {}",
        outcome.xp_earned, outcome.currency_earned, outcome.consumables_left
    );
    centered(out, grid, row, Color::DarkGrey, &summary)?;
    centered(out, grid, row + 1, Color::White, "R - Back to Menu  Q - Quit")
}
