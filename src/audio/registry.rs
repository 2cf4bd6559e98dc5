//! Player registry
//!
//! Owns every player on the page and enforces the single-playing-instance
//! rule: when one element reports that it started playing, all of its
//! siblings are paused.

use super::media::MediaEvent;
use super::player::Player;

#[derive(Default)]
pub struct PlayerRegistry {
    players: Vec<Player>,
}

impl PlayerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            players: Vec::new(),
        }
    }

    /// Register a player; returns its index
    pub fn add(&mut self, player: Player) -> usize {
        self.players.push(player);
        self.players.len() - 1
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Player> {
        self.players.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Player> {
        self.players.get_mut(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.players.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Player> {
        self.players.iter()
    }

    /// Toggle playback on one player; missing index is a silent no-op
    pub fn toggle(&mut self, index: usize) {
        if let Some(player) = self.players.get_mut(index) {
            player.toggle_playback();
        }
    }

    /// Drain every element's notifications and apply mutual exclusion.
    /// Returns true when anything changed.
    pub fn drain_all(&mut self) -> bool {
        let mut changed = false;
        let mut started: Option<usize> = None;

        for (index, player) in self.players.iter_mut().enumerate() {
            let events = player.drain();
            if !events.is_empty() {
                changed = true;
            }
            if events.contains(&MediaEvent::Started) {
                started = Some(index);
            }
        }

        if let Some(winner) = started {
            self.pause_all_except(winner);
        }

        changed
    }

    fn pause_all_except(&mut self, winner: usize) {
        for (index, player) in self.players.iter_mut().enumerate() {
            if index != winner && player.is_playing() {
                player.pause();
            }
        }
    }

    /// Number of players currently playing
    #[must_use]
    pub fn playing_count(&self) -> usize {
        self.players.iter().filter(|p| p.is_playing()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::media::ScriptedMedia;

    fn registry_with(count: usize) -> PlayerRegistry {
        let mut registry = PlayerRegistry::new();
        for i in 0..count {
            registry.add(Player::new(
                format!("Recording {}", i + 1),
                Box::new(ScriptedMedia::new(120.0)),
            ));
        }
        registry
    }

    #[test]
    fn starting_one_player_pauses_the_others() {
        let mut registry = registry_with(3);

        registry.toggle(0);
        registry.drain_all();
        assert!(registry.get(0).unwrap().is_playing());

        registry.toggle(1);
        registry.drain_all();

        assert!(!registry.get(0).unwrap().is_playing());
        assert!(registry.get(1).unwrap().is_playing());
        assert!(!registry.get(2).unwrap().is_playing());
        assert_eq!(registry.playing_count(), 1);
    }

    #[test]
    fn at_most_one_instance_plays_across_rapid_switches() {
        let mut registry = registry_with(4);

        for index in 0..4 {
            registry.toggle(index);
            registry.drain_all();
            assert_eq!(registry.playing_count(), 1);
            assert!(registry.get(index).unwrap().is_playing());
        }
    }

    #[test]
    fn toggling_the_playing_player_just_pauses_it() {
        let mut registry = registry_with(2);

        registry.toggle(0);
        registry.drain_all();
        registry.toggle(0);
        registry.drain_all();

        assert_eq!(registry.playing_count(), 0);
    }

    #[test]
    fn out_of_range_toggle_is_a_noop() {
        let mut registry = registry_with(1);
        registry.toggle(9);
        registry.drain_all();
        assert_eq!(registry.playing_count(), 0);
    }
}
