use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::*;
use crate::{AutoAdvance, Passive};

#[derive(Clone, Default)]
struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    fn record(&self, entry: String) {
        self.0.lock().unwrap().push(entry);
    }

    fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

/// Logs hook calls; optionally ends itself right away.
struct Recorder {
    journal: Journal,
    auto: bool,
}

impl ActionBehavior for Recorder {
    fn on_enter(&mut self, ctx: &mut ActionContext<'_>) {
        self.journal.record(format!("enter:{}", ctx.name()));
        if self.auto {
            ctx.end();
        }
    }

    fn on_exit(&mut self, action: &Action) -> Result<(), HookError> {
        self.journal.record(format!("exit:{}", action.name()));
        Ok(())
    }
}

struct FailingExit;

impl ActionBehavior for FailingExit {
    fn on_exit(&mut self, _action: &Action) -> Result<(), HookError> {
        Err(HookError::failed("cleanup exploded"))
    }
}

struct PanickingExit;

impl ActionBehavior for PanickingExit {
    fn on_exit(&mut self, _action: &Action) -> Result<(), HookError> {
        panic!("cleanup panicked");
    }
}

fn passive(names: &[&str]) -> Scene {
    let mut scene = Scene::new();
    for name in names {
        scene.push(ActionConfig::new(*name), Passive);
    }
    scene.drain_events();
    scene
}

fn history(scene: &Scene) -> Vec<&str> {
    scene.history_names().collect()
}

fn state_of(scene: &Scene, name: &str) -> ActionState {
    scene.get_action(name).unwrap().state()
}

#[test]
fn linear_scene_visits_every_action_then_ends() {
    let journal = Journal::default();
    let mut scene = Scene::new();
    for name in ["a", "b", "c"] {
        scene.push(
            ActionConfig::new(name),
            Recorder {
                journal: journal.clone(),
                auto: true,
            },
        );
    }

    scene.run(0);

    assert!(scene.is_ended());
    assert_eq!(
        journal.entries(),
        vec!["enter:a", "exit:a", "enter:b", "exit:b", "enter:c", "exit:c"]
    );
    assert_eq!(scene.drain_events().last(), Some(&SceneEvent::SceneEnded));
}

#[test]
fn pass_next_walks_positions_in_order() {
    let mut scene = passive(&["a", "b", "c", "d"]);
    scene.run(0);

    let mut visited = vec![scene.progress()];
    while !scene.is_ended() {
        scene.pass_next();
        if !scene.is_ended() {
            visited.push(scene.progress());
        }
    }

    assert_eq!(visited, vec![0, 1, 2, 3]);
    assert_eq!(history(&scene), vec!["a", "b", "c"]);
}

#[test]
fn first_run_records_no_history() {
    let mut scene = passive(&["a", "b"]);
    scene.run(0);

    assert!(scene.history().is_empty());
    assert_eq!(scene.current().map(Action::name), Some("a"));
    assert_eq!(state_of(&scene, "a"), ActionState::Started);
}

#[test]
fn empty_scene_ends_on_first_run() {
    let mut scene = Scene::new();
    scene.run(0);
    assert!(scene.is_ended());
}

#[test]
fn run_after_end_is_noop() {
    let mut scene = passive(&["a"]);
    scene.run(0);
    scene.pass_next();
    assert!(scene.is_ended());
    scene.drain_events();

    scene.run(0);

    assert!(scene.drain_events().is_empty());
    assert_eq!(state_of(&scene, "a"), ActionState::Ended);
}

#[test]
fn goto_prev_then_pass_next_returns_to_successor() {
    let mut scene = passive(&["a", "b", "c", "d"]);
    scene.run(0);
    scene.pass_next();
    scene.pass_next();
    assert_eq!(scene.progress(), 2);

    scene.goto_prev();
    assert_eq!(scene.progress(), 1);
    assert_eq!(history(&scene), vec!["a"]);
    assert!(!scene.is_rollback_pending());

    scene.pass_next();
    assert_eq!(scene.progress(), 2);
    assert_eq!(history(&scene), vec!["a", "b"]);
}

#[test]
fn goto_prev_at_start_is_noop() {
    let mut scene = passive(&["a", "b"]);
    scene.run(0);

    scene.goto_prev();

    assert_eq!(scene.progress(), 0);
    assert_eq!(state_of(&scene, "a"), ActionState::Started);
}

#[test]
fn goto_prev_without_history_keeps_current() {
    let mut scene = passive(&["a", "b", "c"]);
    scene.run(2);

    scene.goto_prev();

    assert_eq!(scene.progress(), 2);
    assert_eq!(state_of(&scene, "c"), ActionState::Started);
}

#[test]
fn jump_to_visited_action_truncates_history() {
    let mut scene = passive(&["a", "b", "c", "d", "e"]);
    scene.run(0);
    for _ in 0..3 {
        scene.pass_next();
    }
    assert_eq!(history(&scene), vec!["a", "b", "c"]);

    assert!(scene.jump_to(1));

    assert_eq!(scene.progress(), 1);
    assert_eq!(scene.max_progress(), 3);
    assert_eq!(history(&scene), vec!["a"]);
    assert_eq!(state_of(&scene, "d"), ActionState::Ended);
    assert_eq!(state_of(&scene, "b"), ActionState::Started);
}

#[test]
fn jump_forward_within_ceiling_records_current() {
    let mut scene = passive(&["a", "b", "c", "d", "e"]);
    scene.run(0);
    for _ in 0..3 {
        scene.pass_next();
    }
    scene.jump_to(1);

    assert!(scene.jump_to(3));

    assert_eq!(scene.progress(), 3);
    assert_eq!(history(&scene), vec!["a", "b"]);
}

#[test]
fn jump_beyond_max_progress_changes_nothing() {
    let mut scene = passive(&["a", "b", "c", "d"]);
    scene.run(0);
    scene.pass_next();
    let generation = scene.generation();
    assert!(scene.is_reachable(1));
    assert!(!scene.is_reachable(3));
    assert!(!scene.is_reachable(42));

    assert!(!scene.jump_to(3));
    assert!(!scene.jump_to(42));

    assert_eq!(scene.progress(), 1);
    assert_eq!(history(&scene), vec!["a"]);
    assert!(!scene.is_ended());
    assert_eq!(scene.generation(), generation);
    assert_eq!(state_of(&scene, "b"), ActionState::Started);
}

#[test]
fn jump_to_current_restarts_without_history_entry() {
    let mut scene = passive(&["a", "b", "c"]);
    scene.run(0);
    scene.pass_next();

    assert!(scene.jump_to(1));

    assert_eq!(scene.progress(), 1);
    assert_eq!(history(&scene), vec!["a"]);
    assert_eq!(state_of(&scene, "b"), ActionState::Started);
}

#[test]
fn jump_to_unknown_name_is_noop() {
    let mut scene = passive(&["a", "b"]);
    scene.run(0);

    assert!(!scene.jump_to_action("missing"));
    assert_eq!(scene.progress(), 0);
}

#[test]
fn count_is_memoized_between_topology_changes() {
    let mut scene = passive(&["a", "b", "c", "d"]);

    assert_eq!(scene.count(), 4);
    assert_eq!(scene.count(), 4);
    assert_eq!(scene.length.walks(), 1);

    scene.run(0);
    scene.pass_next();
    assert_eq!(scene.count(), 4);
    assert_eq!(scene.length.walks(), 1);

    let a = scene.action_id("a").unwrap();
    scene.set_exits(a, ExitMap::new().with("skip", "c"));
    assert!(!scene.is_length_valid());
}

#[test]
fn changing_exits_recomputes_length() {
    let mut scene = passive(&["a", "b", "c", "d"]);
    assert_eq!(scene.count(), 4);

    let a = scene.action_id("a").unwrap();
    scene.set_exits(a, ExitMap::new().with("skip", "c"));

    assert_eq!(scene.count(), 3);
    assert_eq!(scene.length.walks(), 2);
}

#[test]
fn adding_action_invalidates_length() {
    let mut scene = passive(&["a", "b"]);
    assert_eq!(scene.count(), 2);

    scene.push(ActionConfig::new("c"), Passive);

    assert!(!scene.is_length_valid());
    assert_eq!(scene.count(), 3);
}

#[test]
fn looping_default_path_is_cut_at_first_revisit() {
    let mut scene = passive(&["a", "b", "c"]);
    let b = scene.action_id("b").unwrap();
    scene.set_exits(b, ExitMap::new().with("again", "a"));

    assert_eq!(scene.count(), 2);
}

#[test]
fn unresolved_exit_falls_through_to_next_position() {
    let mut scene = Scene::new();
    scene.push(ActionConfig::new("a").with_exit("go", "nowhere"), Passive);
    scene.push(ActionConfig::new("b"), Passive);
    scene.run(0);

    scene.pass_next();

    assert_eq!(scene.progress(), 1);
}

#[test]
fn failing_exit_hook_does_not_block_advance() {
    let mut scene = Scene::new();
    scene.push(ActionConfig::new("a"), FailingExit);
    scene.push(ActionConfig::new("b"), Passive);
    scene.run(0);
    scene.drain_events();

    scene.pass_next();

    assert_eq!(scene.progress(), 1);
    assert_eq!(state_of(&scene, "a"), ActionState::Ended);
    assert_eq!(state_of(&scene, "b"), ActionState::Started);
    assert!(scene.drain_events().iter().any(|event| matches!(
        event,
        SceneEvent::HookFailed { name, reason, .. } if name == "a" && reason == "cleanup exploded"
    )));
}

#[test]
fn panicking_exit_hook_does_not_block_advance() {
    let mut scene = Scene::new();
    scene.push(ActionConfig::new("a"), PanickingExit);
    scene.push(ActionConfig::new("b"), Passive);
    scene.run(0);

    scene.pass_next();

    assert_eq!(scene.progress(), 1);
    assert_eq!(state_of(&scene, "b"), ActionState::Started);
}

#[test]
fn begin_delay_defers_start() {
    let mut scene = Scene::new();
    let a = scene.push(
        ActionConfig::new("a").with_begin_delay(Duration::from_millis(100)),
        Passive,
    );
    scene.run(0);

    assert_eq!(state_of(&scene, "a"), ActionState::Init);
    let deferred = scene.take_deferred();
    assert_eq!(
        deferred,
        vec![Deferred {
            delay: Duration::from_millis(100),
            generation: scene.generation(),
            kind: DeferredKind::Start(a),
        }]
    );

    assert!(scene.fire(deferred[0].clone()));
    assert_eq!(state_of(&scene, "a"), ActionState::Started);
}

#[test]
fn stale_start_is_dropped_after_rollback() {
    let mut scene = Scene::new();
    scene.push(ActionConfig::new("a"), Passive);
    scene.push(
        ActionConfig::new("b").with_begin_delay(Duration::from_millis(100)),
        Passive,
    );
    scene.run(0);
    scene.pass_next();
    let pending = scene.take_deferred();
    assert_eq!(pending.len(), 1);

    scene.goto_prev();

    assert!(!scene.fire(pending[0].clone()));
    assert_eq!(scene.progress(), 0);
    assert_ne!(state_of(&scene, "b"), ActionState::Started);
}

#[test]
fn delayed_start_is_dropped_once_action_ended() {
    let journal = Journal::default();
    let mut scene = Scene::new();
    scene.push(
        ActionConfig::new("a")
            .with_begin_delay(Duration::from_millis(100))
            .with_end_delay(Duration::from_millis(500)),
        Recorder {
            journal: journal.clone(),
            auto: false,
        },
    );
    scene.push(ActionConfig::new("b"), Passive);
    scene.run(0);
    let start = scene.take_deferred();

    scene.pass_next();

    assert!(!scene.fire(start[0].clone()));
    assert_eq!(state_of(&scene, "a"), ActionState::Ended);
    assert_eq!(journal.entries(), vec!["exit:a"]);
}

#[test]
fn delayed_start_is_dropped_after_suppressed_end() {
    let mut scene = Scene::new();
    let a = scene.push(
        ActionConfig::new("a").with_begin_delay(Duration::from_millis(100)),
        Passive,
    );
    scene.push(ActionConfig::new("b"), Passive);
    scene.run(0);
    let start = scene.take_deferred();

    scene.end_action(a, EndOptions::suppressed());

    assert!(!scene.fire(start[0].clone()));
    assert_eq!(state_of(&scene, "a"), ActionState::Ended);
}

#[test]
fn delayed_advance_follows_insertions() {
    let mut scene = Scene::new();
    scene.push(
        ActionConfig::new("a").with_end_delay(Duration::from_millis(200)),
        Passive,
    );
    scene.push(ActionConfig::new("b"), Passive);
    scene.push(ActionConfig::new("c"), Passive);
    scene.run(0);
    scene.pass_next();
    let advance = scene.take_deferred();

    scene.insert(0, ActionConfig::new("prologue"), Passive);

    assert!(scene.fire(advance[0].clone()));
    assert_eq!(scene.current().map(Action::name), Some("b"));
    assert_eq!(scene.progress(), 2);
    assert_eq!(history(&scene), vec!["a"]);
}

#[test]
fn end_delay_defers_advance() {
    let mut scene = Scene::new();
    scene.push(
        ActionConfig::new("a").with_end_delay(Duration::from_millis(200)),
        Passive,
    );
    scene.push(ActionConfig::new("b"), Passive);
    scene.run(0);

    scene.pass_next();
    assert_eq!(scene.progress(), 0);
    assert_eq!(state_of(&scene, "a"), ActionState::Ended);

    let pending = scene.take_deferred();
    assert_eq!(pending[0].kind, DeferredKind::Advance { from: scene.action_id("a").unwrap() });
    assert!(scene.fire(pending[0].clone()));
    assert_eq!(scene.progress(), 1);
}

#[test]
fn timed_end_requested_by_hook() {
    let mut scene = Scene::new();
    scene.push(ActionConfig::new("a"), AutoAdvance::new(Duration::from_millis(50)));
    scene.push(ActionConfig::new("b"), Passive);
    scene.run(0);
    assert_eq!(state_of(&scene, "a"), ActionState::Started);

    let pending = scene.take_deferred();
    assert!(scene.fire(pending[0].clone()));

    assert_eq!(scene.progress(), 1);
}

#[test]
fn stale_timed_end_is_dropped_after_manual_advance() {
    let mut scene = Scene::new();
    scene.push(ActionConfig::new("a"), AutoAdvance::new(Duration::from_millis(50)));
    scene.push(ActionConfig::new("b"), Passive);
    scene.push(ActionConfig::new("c"), Passive);
    scene.run(0);
    let pending = scene.take_deferred();

    scene.pass_next();

    assert!(!scene.fire(pending[0].clone()));
    assert_eq!(scene.progress(), 1);
    assert_eq!(state_of(&scene, "b"), ActionState::Started);
}

#[test]
fn completion_of_inactive_action_is_ignored() {
    let mut scene = passive(&["a", "b", "c"]);
    scene.run(0);
    scene.pass_next();
    let c = scene.action_id("c").unwrap();

    scene.end_action(c, EndOptions::advance());

    assert_eq!(scene.progress(), 1);
    assert_eq!(state_of(&scene, "b"), ActionState::Started);
}

#[test]
fn ending_twice_advances_once() {
    let mut scene = passive(&["a", "b", "c"]);
    scene.run(0);
    let a = scene.action_id("a").unwrap();

    scene.end_action(a, EndOptions::advance());
    scene.end_action(a, EndOptions::advance());

    assert_eq!(scene.progress(), 1);
}

#[test]
fn chosen_exit_is_selected_and_invalidates_length() {
    let mut scene = Scene::new();
    scene.push(
        ActionConfig::new("fork")
            .with_exit("left", "l")
            .with_exit("right", "r"),
        Passive,
    );
    scene.push(ActionConfig::new("l"), Passive);
    scene.push(ActionConfig::new("r"), Passive);
    scene.run(0);
    scene.count();

    scene.end_action_named("fork", EndOptions::advance().with_exit("right"));

    assert_eq!(scene.progress(), 2);
    assert_eq!(scene.get_action("fork").unwrap().selected_exit(), Some("right"));
    assert!(!scene.is_length_valid());
}

#[test]
fn suppressed_end_does_not_advance() {
    let mut scene = passive(&["a", "b"]);
    scene.run(0);

    scene.end_action_named("a", EndOptions::suppressed());

    assert_eq!(scene.progress(), 0);
    assert_eq!(state_of(&scene, "a"), ActionState::Ended);
}

#[test]
fn quit_runs_exit_hook_and_ends_scene() {
    let journal = Journal::default();
    let mut scene = Scene::new();
    scene.push(
        ActionConfig::new("a"),
        Recorder {
            journal: journal.clone(),
            auto: false,
        },
    );
    scene.run(0);
    scene.drain_events();

    scene.quit();

    assert!(scene.is_ended());
    assert_eq!(journal.entries(), vec!["enter:a", "exit:a"]);
    // Quitting bypasses the ended notification.
    assert_eq!(scene.drain_events(), vec![SceneEvent::SceneEnded]);
}

#[test]
fn reset_clears_playback_state() {
    let mut scene = passive(&["a", "b", "c"]);
    scene.run(0);
    scene.pass_next();
    scene.pass_next();
    scene.pass_next();
    assert!(scene.is_ended());

    scene.reset();

    assert!(!scene.is_ended());
    assert_eq!(scene.progress(), 0);
    assert_eq!(scene.max_progress(), 0);
    assert!(scene.history().is_empty());
    assert!(scene.current().is_none());
    assert!(!scene.is_length_valid());
    assert!(scene.actions().all(|action| action.state() == ActionState::Init));

    scene.run(0);
    assert!(scene.history().is_empty());
}

#[test]
fn insert_before_current_shifts_positions() {
    let mut scene = passive(&["a", "b", "c"]);
    scene.run(0);
    scene.pass_next();

    scene.insert(0, ActionConfig::new("z"), Passive);

    assert_eq!(scene.progress(), 2);
    assert_eq!(scene.max_progress(), 2);
    assert_eq!(scene.action_index("b"), Some(2));
    assert_eq!(scene.current().map(Action::name), Some("b"));
    assert_eq!(history(&scene), vec!["a"]);
}

#[test]
fn first_inserted_name_wins() {
    let mut scene = Scene::new();
    let first = scene.push(ActionConfig::new("dup"), Passive);
    scene.push(ActionConfig::new("dup"), Passive);

    assert_eq!(scene.action_id("dup"), Some(first));
    assert_eq!(scene.action_index("dup"), Some(0));
}

#[test]
fn events_follow_lifecycle_order() {
    let mut scene = Scene::new();
    let a = scene.push(ActionConfig::new("a"), AutoAdvance::immediate());
    assert_eq!(
        scene.drain_events(),
        vec![SceneEvent::ActionAdded {
            id: a,
            name: "a".into(),
            position: 0
        }]
    );

    scene.run(0);

    assert_eq!(
        scene.drain_events(),
        vec![
            SceneEvent::ActionStarted {
                id: a,
                name: "a".into(),
                position: 0
            },
            SceneEvent::ActionEnded {
                id: a,
                name: "a".into()
            },
            SceneEvent::SceneEnded,
        ]
    );
}

#[test]
fn snapshot_reflects_playback() {
    let mut scene = passive(&["a", "b", "c"]);
    scene.run(0);
    scene.pass_next();

    let snapshot = scene.snapshot();

    assert_eq!(snapshot.progress, 1);
    assert_eq!(snapshot.current.as_deref(), Some("b"));
    assert_eq!(snapshot.history, vec!["a".to_owned()]);
    assert_eq!(snapshot.predicted_length, 3);
    assert_eq!(snapshot.action("a").unwrap().state, ActionState::Ended);
}
