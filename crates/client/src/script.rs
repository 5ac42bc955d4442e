//! Demo script played by the terminal client.
//!
//! ```text
//! arrival → gate → courtyard → crossroads ─forest→ forest ─on→ river → bridge → tower → end
//!                                         └─cave──→ cave ──────↗
//! ```

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use scene_core::{Action, ActionBehavior, ActionConfig, ActionContext, ExitMap, HookError, Scene};
use tracing::debug;

use crate::config::PlayerConfig;

/// One narrated step.
#[derive(Clone, Debug)]
pub struct Beat {
    pub name: String,
    pub line: String,
    pub exits: ExitMap,
}

impl Beat {
    fn new(name: &str, line: &str) -> Self {
        Self {
            name: name.to_owned(),
            line: line.to_owned(),
            exits: ExitMap::new(),
        }
    }

    fn exit(mut self, label: &str, target: &str) -> Self {
        self.exits.insert(label, target);
        self
    }
}

/// Ordered beats plus a name index, shared between the scene builder and the
/// event printer.
#[derive(Clone, Debug)]
pub struct Script {
    beats: Arc<Vec<Beat>>,
    index: Arc<HashMap<String, usize>>,
}

impl Script {
    pub fn new(beats: Vec<Beat>) -> Self {
        let mut index = HashMap::new();
        for (position, beat) in beats.iter().enumerate() {
            index.entry(beat.name.clone()).or_insert(position);
        }
        Self {
            beats: Arc::new(beats),
            index: Arc::new(index),
        }
    }

    pub fn demo() -> Self {
        Self::new(vec![
            Beat::new("arrival", "The coach drops you at the edge of town."),
            Beat::new("gate", "The gatekeeper waves you through without a word."),
            Beat::new("courtyard", "Market stalls, shouting, the smell of bread."),
            Beat::new("crossroads", "A signpost: FOREST one way, CAVE the other.")
                .exit("forest", "forest")
                .exit("cave", "cave"),
            Beat::new("forest", "Birdsong. The path bends toward running water.")
                .exit("on", "river"),
            Beat::new("cave", "Dripping stone. Something glitters, then goes dark."),
            Beat::new("river", "The river is loud here and the bridge is close."),
            Beat::new("bridge", "Halfway across you look back once."),
            Beat::new("tower", "The tower door is open. It always was."),
            Beat::new("end", "You climb the stairs."),
        ])
    }

    pub fn beats(&self) -> &[Beat] {
        &self.beats
    }

    pub fn beat(&self, name: &str) -> Option<&Beat> {
        self.index.get(name).map(|&position| &self.beats[position])
    }

    pub fn line(&self, name: &str) -> Option<&str> {
        self.beat(name).map(|beat| beat.line.as_str())
    }

    /// Exit labels of a beat, empty when it does not branch.
    pub fn labels(&self, name: &str) -> Vec<&str> {
        self.beat(name)
            .map(|beat| beat.exits.labels().collect())
            .unwrap_or_default()
    }

    /// Builds a playable scene, one [`Narration`] per beat.
    pub fn scene(&self, config: &PlayerConfig) -> Scene {
        let mut scene = Scene::new();
        for beat in self.beats.iter() {
            let narration = Narration {
                hold: (config.auto_advance && beat.exits.is_empty()).then_some(config.step_delay),
            };
            scene.push(
                ActionConfig::new(beat.name.clone()).with_exits(beat.exits.clone()),
                narration,
            );
        }
        scene
    }
}

/// Behaviour of a narrated beat.
///
/// Branch points always wait for the reader; other beats end on their own
/// after the step delay when auto-advance is on.
struct Narration {
    hold: Option<Duration>,
}

impl ActionBehavior for Narration {
    fn on_enter(&mut self, ctx: &mut ActionContext<'_>) {
        if let Some(delay) = self.hold {
            ctx.end_after(delay);
        }
    }

    fn on_exit(&mut self, action: &Action) -> Result<(), HookError> {
        debug!(beat = %action.name(), exit = ?action.selected_exit(), "beat finished");
        Ok(())
    }
}
