//! Board occupancy counts and per-player display style

use sha2::{Digest, Sha256};

use crate::types::{Entry, PlayerSummary, GRID_SIZE};

const PLAYER_COLORS: &[&str] = &[
    "#E53935", "#1E88E5", "#43A047", "#FB8C00", "#8E24AA", "#00ACC1", "#FDD835", "#6D4C41",
    "#D81B60", "#3949AB", "#7CB342", "#F4511E",
];

const PLAYER_EMOJIS: &[&str] = &[
    "🏈", "🏆", "🔥", "⭐", "🎉", "🍕", "🌭", "🍺", "🦅", "🐻", "🦁", "🐯", "🐬", "🚀", "💪", "🎯",
];

/// Stable palette index for a name; the same name always lands on the same slot
fn palette_index(name: &str, len: usize) -> usize {
    let digest = Sha256::digest(name.as_bytes());
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest[..8]);
    (u64::from_be_bytes(prefix) % len as u64) as usize
}

pub fn get_player_color(name: &str) -> &'static str {
    PLAYER_COLORS[palette_index(name, PLAYER_COLORS.len())]
}

pub fn get_player_emoji(name: &str) -> &'static str {
    PLAYER_EMOJIS[palette_index(name, PLAYER_EMOJIS.len())]
}

/// Emoji and color for a player: whatever their first square used, else derived from the name
pub fn player_style(entries: &[Entry], name: &str) -> (String, String) {
    match entries.iter().find(|e| e.player_name == name) {
        Some(first) => (first.player_emoji.clone(), first.player_color.clone()),
        None => (
            get_player_emoji(name).to_string(),
            get_player_color(name).to_string(),
        ),
    }
}

pub fn count_claimed(entries: &[Entry]) -> usize {
    entries.len()
}

pub fn is_board_full(entries: &[Entry]) -> bool {
    count_claimed(entries) == GRID_SIZE * GRID_SIZE
}

/// Squares held by `player_name` (exact, case-sensitive match)
pub fn count_player_squares(entries: &[Entry], player_name: &str) -> usize {
    entries
        .iter()
        .filter(|e| e.player_name == player_name)
        .count()
}

/// One summary per distinct player, in order of their first claim
pub fn get_unique_players(entries: &[Entry]) -> Vec<PlayerSummary> {
    let mut players: Vec<PlayerSummary> = Vec::new();

    for entry in entries {
        match players.iter_mut().find(|p| p.name == entry.player_name) {
            Some(player) => player.count += 1,
            None => players.push(PlayerSummary {
                name: entry.player_name.clone(),
                emoji: entry.player_emoji.clone(),
                color: entry.player_color.clone(),
                count: 1,
            }),
        }
    }

    players
}
