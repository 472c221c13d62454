//! Game catalog
//!
//! Static table mapping a game id to its metadata and factory.

pub mod flappy;
pub mod invaders;

use serde::Serialize;

use crate::error::{ArcadeError, Result};
use crate::sim::{Game, GameContext};

/// Display information shown by the hub
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GameMetadata {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub version: &'static str,
    pub author: &'static str,
    /// Control hint for the start screen
    pub controls: &'static str,
}

/// Builds a fresh simulation instance
pub type GameFactory = fn(GameContext) -> Box<dyn Game>;

/// Builds an instance from JSON tuning overrides
pub type TunedFactory = fn(GameContext, &str) -> Result<Box<dyn Game>>;

#[derive(Clone, Copy)]
pub struct GameEntry {
    pub meta: GameMetadata,
    pub factory: GameFactory,
    pub tuned: TunedFactory,
}

impl std::fmt::Debug for GameEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameEntry").field("meta", &self.meta).finish_non_exhaustive()
    }
}

pub static GAMES: &[GameEntry] = &[
    GameEntry {
        meta: GameMetadata {
            id: "flappy-bird",
            name: "FLAPPY PIXEL",
            description: "DODGE THE PIPES!",
            version: "1.0.0",
            author: "PERNGANUAN CORP",
            controls: "TAP OR SPACE TO FLY",
        },
        factory: flappy::create,
        tuned: flappy::create_tuned,
    },
    GameEntry {
        meta: GameMetadata {
            id: "space-invaders",
            name: "CLAUDE INVADERS",
            description: "DEBUG THE BUGS!",
            version: "1.0.0",
            author: "PERNGANUAN CORP",
            controls: "ARROW KEYS TO MOVE / SPACE TO SHOOT",
        },
        factory: invaders::create,
        tuned: invaders::create_tuned,
    },
];

/// Id of the game opened when none is requested
pub const DEFAULT_GAME: &str = "flappy-bird";

pub fn get_game(id: &str) -> Option<&'static GameEntry> {
    GAMES.iter().find(|g| g.meta.id == id)
}

pub fn list() -> impl Iterator<Item = &'static GameMetadata> {
    GAMES.iter().map(|g| &g.meta)
}

/// Non-empty value of `key` in a page query such as `?game=space-invaders`
pub fn query_param<'a>(query: &'a str, key: &str) -> Option<&'a str> {
    query
        .trim_start_matches('?')
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v)
        .filter(|v| !v.is_empty())
}

/// Game id requested by the page query
pub fn requested_id(query: &str) -> Option<&str> {
    query_param(query, "game")
}

/// Instantiate a game by id
pub fn create(id: &str, ctx: GameContext) -> Result<Box<dyn Game>> {
    let entry = get_game(id).ok_or_else(|| ArcadeError::UnknownGame(id.to_string()))?;
    log::info!("Creating {} ({}x{}, seed {})", entry.meta.name, ctx.width, ctx.height, ctx.seed);
    Ok((entry.factory)(ctx))
}

/// Instantiate a game by id with JSON tuning overrides
pub fn create_tuned(id: &str, ctx: GameContext, json: &str) -> Result<Box<dyn Game>> {
    let entry = get_game(id).ok_or_else(|| ArcadeError::UnknownGame(id.to_string()))?;
    let game = (entry.tuned)(ctx, json)?;
    log::info!("Creating {} with tuning overrides", entry.meta.name);
    Ok(game)
}
