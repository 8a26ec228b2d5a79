// Copyright 2025 Sushanth (https://github.com/sushanthpy)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

mod support;

use external_hooks_admin::{
    AdminError, ApplyOutcome, MonitorConfig, Notice, SettingsSyncController, SyncState,
};
use external_hooks_core::codec::decode;
use external_hooks_core::{
    FieldErrors, FieldValue, FormLifecycle, HookKind, KindSettings, LoadPolicy, TabState,
    TriggerSet,
};
use std::sync::Arc;
use std::time::Duration;
use support::{form, state, MockApi, RecordingView, SaveScript};

fn controller(
    api: MockApi,
    apply_existing: bool,
) -> SettingsSyncController<MockApi, RecordingView> {
    let view = RecordingView::default();
    SettingsSyncController::new(Arc::new(api), form(apply_existing), view)
        .with_monitor_config(MonitorConfig {
            poll_interval: Duration::from_millis(200),
            max_attempts: Some(50),
            max_consecutive_failures: Some(5),
        })
}

fn kind(name: &str) -> HookKind {
    HookKind::new(name)
}

fn threshold_error() -> FieldErrors {
    let mut errors = FieldErrors::new();
    errors.insert("threshold".into(), vec!["must be positive".into()]);
    errors
}

#[tokio::test(start_paused = true)]
async fn test_rejected_kind_blocks_apply() {
    let api = Arc::new(
        MockApi::new().with_save("post-receive", SaveScript::Reject(threshold_error())),
    );
    let mut controller =
        SettingsSyncController::new(Arc::clone(&api), form(true), RecordingView::default());

    let report = controller.submit().await.unwrap();

    assert!(!report.is_success());
    assert_eq!(report.rejected_kinds().collect::<Vec<_>>(), vec![&kind("post-receive")]);
    assert!(report.apply.is_none());
    assert_eq!(api.trigger_calls(), 0);
    assert_eq!(api.poll_calls(), 0);

    let form = controller.form();
    let rejected = form.pane(&kind("post-receive")).unwrap();
    assert_eq!(rejected.tab(), TabState::Error);
    assert_eq!(rejected.error_text("threshold"), Some("must be positive"));
    assert_eq!(form.pane(&kind("pre-receive")).unwrap().tab(), TabState::Ok);

    assert_eq!(controller.view().notices, vec![Notice::validation_failed()]);
    assert_eq!(controller.state(), SyncState::PartiallyRejected);
}

#[tokio::test(start_paused = true)]
async fn test_successful_save_runs_apply_once() {
    let api = Arc::new(
        MockApi::new()
            .with_state(state(false, false, 0, 0))
            .with_state(state(true, false, 1, 3))
            .with_state(state(true, true, 3, 3)),
    );
    let mut controller =
        SettingsSyncController::new(Arc::clone(&api), form(true), RecordingView::default());

    let report = controller.submit().await.unwrap();

    assert!(report.is_success());
    assert_eq!(api.trigger_calls(), 1);
    assert_eq!(api.poll_calls(), 3);
    assert!(matches!(report.apply, Some(ApplyOutcome::Finished(s)) if s.total == 3));

    let view = controller.view();
    assert_eq!(
        view.progress_texts(),
        vec![
            "Initializing…",
            "Initializing…",
            "Configuring hook 1 of 3…",
            "3 hooks were updated."
        ]
    );
    assert_eq!(view.notices, vec![Notice::saved()]);
    assert_eq!(view.success_count(), 1);
    assert_eq!(controller.state(), SyncState::Saved);
}

#[tokio::test]
async fn test_save_without_apply_shows_banner() {
    let mut controller = controller(MockApi::new(), true);

    let report = controller.save(false).await.unwrap();

    assert!(report.is_success());
    assert!(report.apply.is_none());
    assert_eq!(controller.view().notices, vec![Notice::saved()]);
    assert!(controller.view().progress.is_empty());
}

#[tokio::test]
async fn test_transport_failure_counts_as_failed_kind() {
    let api = MockApi::new().with_save("pre-receive", SaveScript::Fail(503));
    let mut controller = controller(api, true);

    let report = controller.submit().await.unwrap();

    assert!(!report.is_success());
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].kind, kind("pre-receive"));
    assert!(report.apply.is_none());

    let pane = controller.form().pane(&kind("pre-receive")).unwrap();
    assert_eq!(pane.tab(), TabState::Error);
    assert_eq!(pane.error_slots().count(), 0);
    assert_eq!(pane.lifecycle(), &FormLifecycle::failed());

    let notices = &controller.view().notices;
    assert_eq!(notices.len(), 1);
    assert!(notices[0].text().starts_with("Settings could not be saved: "));
    assert_eq!(controller.state(), SyncState::Failed);
}

#[tokio::test]
async fn test_loader_is_always_cleared() {
    let api = MockApi::new().with_save("pre-receive", SaveScript::Fail(500));
    let mut controller = controller(api, false);

    controller.save(false).await.unwrap();

    assert_eq!(controller.view().loading, vec![true, false]);
    assert!(!controller.form().inputs_disabled());
}

#[tokio::test]
async fn test_resave_replaces_error_text() {
    let mut controller = controller(
        MockApi::new().with_save("post-receive", SaveScript::Reject(threshold_error())),
        false,
    );

    controller.save(false).await.unwrap();
    let first = controller.form().pane(&kind("post-receive")).unwrap().clone();
    controller.save(false).await.unwrap();
    let second = controller.form().pane(&kind("post-receive")).unwrap();

    assert_eq!(&first, second);
    assert_eq!(second.error_text("threshold"), Some("must be positive"));
}

#[tokio::test]
async fn test_accepted_disabled_kind_has_neutral_tab() {
    let mut controller = controller(MockApi::new(), false);
    controller
        .form_mut()
        .pane_mut(&kind("pre-receive"))
        .unwrap()
        .set_checked("pre-receive.enabled", false);

    controller.save(false).await.unwrap();

    let pane = controller.form().pane(&kind("pre-receive")).unwrap();
    assert_eq!(pane.tab(), TabState::Neutral);
    assert_eq!(pane.lifecycle(), &FormLifecycle::Ok { enabled: false });
}

fn loaded_settings(exe: &str) -> KindSettings {
    let mut settings = KindSettings::new();
    settings.insert("enabled".into(), FieldValue::Bool(false));
    settings.insert("exe".into(), FieldValue::from(exe));
    settings
}

#[tokio::test]
async fn test_load_renders_every_kind() {
    let api = MockApi::new()
        .with_hook("pre-receive", loaded_settings("/opt/pre.sh"))
        .with_hook("post-receive", loaded_settings("/opt/post.sh"));
    let mut controller = controller(api, false);

    let report = controller.load().await.unwrap();

    assert!(report.is_complete());
    assert!(report.rendered);
    let settings = decode(controller.form(), &kind("post-receive")).unwrap();
    assert_eq!(settings["exe"], FieldValue::from("/opt/post.sh"));
    assert!(controller
        .form()
        .pane(&kind("post-receive"))
        .unwrap()
        .settings_disabled());
    assert_eq!(controller.state(), SyncState::Idle);
    assert!(controller.view().notices.is_empty());
}

#[tokio::test]
async fn test_load_resets_lifecycle() {
    let api = MockApi::new().with_save("post-receive", SaveScript::Reject(threshold_error()));
    let mut controller = controller(api, false);

    controller.save(false).await.unwrap();
    controller.load().await.unwrap();

    let pane = controller.form().pane(&kind("post-receive")).unwrap();
    assert_eq!(pane.lifecycle(), &FormLifecycle::Unknown);
    assert_eq!(pane.tab(), TabState::Neutral);
    assert_eq!(pane.error_slots().count(), 0);
}

#[tokio::test]
async fn test_load_all_or_nothing_renders_nothing_on_failure() {
    let api = MockApi::new()
        .with_hook("pre-receive", loaded_settings("/opt/pre.sh"))
        .with_hook_failure("post-receive", 500);
    let mut controller = controller(api, false);
    let before = controller.form().clone();

    let report = controller.load().await.unwrap();

    assert!(!report.rendered);
    assert_eq!(report.loaded, vec![kind("pre-receive")]);
    assert_eq!(report.failed[0].kind, kind("post-receive"));
    assert_eq!(controller.form().to_layout(), before.to_layout());
    assert_eq!(controller.state(), SyncState::Failed);
    assert_eq!(controller.view().loading, vec![true, false]);
    assert!(controller.view().notices[0].is_error());
}

#[tokio::test]
async fn test_load_partial_keeps_successful_kinds() {
    let api = MockApi::new()
        .with_hook("pre-receive", loaded_settings("/opt/pre.sh"))
        .with_hook_failure("post-receive", 500);
    let mut controller = controller(api, false).with_load_policy(LoadPolicy::Partial);

    let report = controller.load().await.unwrap();

    assert!(report.rendered);
    let pre = decode(controller.form(), &kind("pre-receive")).unwrap();
    assert_eq!(pre["exe"], FieldValue::from("/opt/pre.sh"));
    let post = decode(controller.form(), &kind("post-receive")).unwrap();
    assert_eq!(post["exe"], FieldValue::from("hook.sh"));
}

#[tokio::test(start_paused = true)]
async fn test_apply_trigger_failure_is_reported() {
    let mut controller = controller(MockApi::new().with_trigger_failure(401), true);

    let err = controller.submit().await.unwrap_err();

    assert!(matches!(err, AdminError::Transport(_)));
    assert_eq!(controller.state(), SyncState::Failed);
    assert_eq!(controller.view().loading, vec![true, false]);
    assert_eq!(controller.view().success_count(), 0);
    assert!(controller.view().notices[0]
        .text()
        .starts_with("Settings could not be applied: "));
}

#[tokio::test(start_paused = true)]
async fn test_cancelled_apply_shows_no_success_banner() {
    let mut controller = controller(MockApi::new().with_state(state(true, false, 0, 4)), false);
    controller.cancellation_token().cancel();

    let outcome = controller.apply().await.unwrap();

    assert_eq!(outcome, ApplyOutcome::Cancelled { last: None });
    assert_eq!(controller.view().notices, vec![Notice::apply_cancelled()]);
    assert_eq!(controller.state(), SyncState::Failed);
}

#[tokio::test]
async fn test_trigger_form_round_trip() {
    let mut defaults = TriggerSet::new();
    defaults.insert("post-receive", "pr-merge");
    let api = Arc::new(MockApi::new().with_defaults(defaults.clone()));
    let mut controller =
        SettingsSyncController::new(Arc::clone(&api), form(false), RecordingView::default());

    let stored = controller.load_triggers().await.unwrap();
    assert!(stored.is_empty());
    assert!(controller.form().trigger_fields().iter().all(|t| !t.checked));

    controller.load_trigger_defaults().await.unwrap();
    let report = controller.save_triggers(false).await.unwrap();

    assert_eq!(report.triggers, defaults);
    assert_eq!(api.updated_triggers.lock().as_slice(), &[defaults]);
    assert_eq!(controller.view().notices, vec![Notice::saved()]);
    assert_eq!(api.trigger_calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_save_triggers_with_apply() {
    let api = Arc::new(MockApi::new().with_state(state(true, true, 0, 0)));
    let mut controller =
        SettingsSyncController::new(Arc::clone(&api), form(false), RecordingView::default());

    let report = controller.save_triggers(true).await.unwrap();

    assert!(report.triggers.contains("pre-receive", "repo-push"));
    assert!(matches!(report.apply, Some(ApplyOutcome::Finished(_))));
    assert_eq!(
        controller.view().progress_texts().last(),
        Some(&"No existing hooks to update.")
    );
    assert_eq!(controller.view().notices, vec![Notice::saved()]);
}

#[tokio::test(start_paused = true)]
async fn test_save_requests_are_in_flight_together() {
    // Both kinds must be waiting before either request is answered.
    let api = Arc::new(MockApi::new().with_rendezvous(2));
    let mut controller =
        SettingsSyncController::new(Arc::clone(&api), form(false), RecordingView::default());

    let report = tokio::time::timeout(Duration::from_secs(5), controller.save(false))
        .await
        .expect("saves were not issued concurrently")
        .unwrap();

    assert!(report.is_success());
    assert_eq!(api.saved.lock().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_load_requests_are_in_flight_together() {
    let api = MockApi::new()
        .with_hook("pre-receive", loaded_settings("/opt/pre.sh"))
        .with_hook("post-receive", loaded_settings("/opt/post.sh"))
        .with_rendezvous(2);
    let mut controller = controller(api, false);

    let report = tokio::time::timeout(Duration::from_secs(5), controller.load())
        .await
        .expect("loads were not issued concurrently")
        .unwrap();

    assert!(report.is_complete());
    assert_eq!(controller.state(), SyncState::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_dropped_save_restores_loader() {
    // A third party never arrives, so the save never completes.
    let mut controller = controller(MockApi::new().with_rendezvous(3), false);

    let stalled = tokio::time::timeout(Duration::from_secs(1), controller.save(false)).await;

    assert!(stalled.is_err());
    assert_eq!(controller.view().loading, vec![true, false]);
    assert!(!controller.form().inputs_disabled());
    assert!(controller.view().notices.is_empty());

    // The next operation starts cleanly from the interrupted one.
    controller.load_triggers().await.unwrap();
    assert_eq!(controller.state(), SyncState::Idle);
    assert_eq!(controller.view().loading, vec![true, false, true, false]);
}

#[tokio::test(start_paused = true)]
async fn test_unavailable_job_state_fails_the_apply() {
    let api = MockApi::new()
        .with_state(state(true, false, 0, 2))
        .with_poll_failure(401)
        .with_poll_failure(401)
        .with_poll_failure(401)
        .with_poll_failure(401)
        .with_poll_failure(401);
    let mut controller = controller(api, false);

    let err = controller.apply().await.unwrap_err();

    assert!(matches!(err, AdminError::Transport(_)));
    assert_eq!(controller.state(), SyncState::Failed);
    assert_eq!(controller.view().loading, vec![true, false]);
    assert!(controller.view().notices[0]
        .text()
        .starts_with("Settings could not be applied: "));
}
