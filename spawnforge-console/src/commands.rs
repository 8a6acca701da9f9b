//! Scene commands

use crate::console::Console;
use spawnforge_core::{Host, Scene};

/// What scene commands need from the host
pub trait SceneAccess {
    /// Play `clip` on every assembled actor with an animation driver
    ///
    /// Returns the number of actors the clip was played on.
    fn play_animation(&mut self, clip: &str) -> usize;
}

impl SceneAccess for Scene {
    fn play_animation(&mut self, clip: &str) -> usize {
        let mut played = 0;
        for instance in self.iter_mut().filter(|i| i.is_ready()) {
            if let Some(driver) = instance.animation_driver_mut() {
                driver.play(clip);
                played += 1;
            }
        }
        played
    }
}

impl SceneAccess for Host {
    fn play_animation(&mut self, clip: &str) -> usize {
        self.scene_mut().play_animation(clip)
    }
}

/// Register `playanimation <name>`
pub fn register_scene_commands<C: SceneAccess + 'static>(console: &mut Console<C>) {
    console.register(
        "playanimation",
        "play an animation clip on every actor",
        |scene: &mut C, clip, log| {
            if clip.is_empty() {
                log.send("Usage: playanimation <AnimationName>");
                return;
            }

            match scene.play_animation(clip) {
                0 => log.send("No animation driver found on any actor."),
                played => log.send(format!(
                    "Played animation '{clip}' on {played} actor(s)."
                )),
            }
        },
    );
}
