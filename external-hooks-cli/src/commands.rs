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

use crate::views::{pane_summary, TerminalView};
use anyhow::{bail, Context, Result};
use external_hooks_admin::{
    ApplyOutcome, ApplyProgressMonitor, MonitorConfig, SettingsSyncController,
};
use external_hooks_client::{HookSettingsApi, HookSettingsClient};
use external_hooks_core::codec::decode_document;
use external_hooks_core::{PanelConfig, SaveOutcome, SettingsForm, TriggerSet, TriggerSettings};
use std::io::Stdout;
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

type Controller = SettingsSyncController<HookSettingsClient, TerminalView<Stdout>>;

/// Everything a command needs to talk to the server.
pub struct Session {
    pub config: PanelConfig,
    pub client: Arc<HookSettingsClient>,
}

impl Session {
    fn controller(&self, form: SettingsForm) -> Controller {
        SettingsSyncController::new(Arc::clone(&self.client), form, TerminalView::stdout())
            .with_monitor_config(MonitorConfig::from(&self.config.apply))
            .with_load_policy(self.config.load_policy)
    }
}

fn read_form(path: &Path) -> Result<SettingsForm> {
    SettingsForm::from_file(path).with_context(|| format!("Failed to read form {:?}", path))
}

fn write_form(form: &SettingsForm, path: &Path) -> Result<()> {
    form.write_to(path)
        .with_context(|| format!("Failed to write form {:?}", path))?;
    println!("✓ Form written to {:?}", path);
    Ok(())
}

/// Cancel `token` on Ctrl-C.
fn cancel_on_ctrl_c(token: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupted, stopping");
            token.cancel();
        }
    });
}

fn print_triggers(triggers: &TriggerSet) -> Result<()> {
    let body = TriggerSettings {
        triggers: triggers.clone(),
    };
    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}

pub async fn load(session: &Session, form_path: &Path, write: bool) -> Result<()> {
    let mut controller = session.controller(read_form(form_path)?);
    let report = controller.load().await?;

    println!(
        "{}",
        serde_json::to_string_pretty(&decode_document(controller.form()))?
    );

    if !report.is_complete() {
        let kinds: Vec<String> = report.failed.iter().map(|f| f.kind.to_string()).collect();
        bail!("Failed to load {}", kinds.join(", "));
    }

    if write {
        write_form(controller.form(), form_path)?;
    }
    Ok(())
}

pub async fn save(session: &Session, form_path: &Path, apply: bool) -> Result<()> {
    let mut form = read_form(form_path)?;
    if apply {
        form.set_apply_existing(true);
    }

    let mut controller = session.controller(form);
    cancel_on_ctrl_c(controller.cancellation_token());
    let report = controller.submit().await?;

    for line in pane_summary(controller.form()) {
        println!("{line}");
    }
    for outcome in report.outcomes.values() {
        if let SaveOutcome::Rejected { form_errors, .. } = outcome {
            for message in form_errors {
                println!("    {message}");
            }
        }
    }

    if !report.is_success() {
        bail!("{}", report.notice);
    }
    if let Some(outcome) = &report.apply {
        ensure_finished(outcome)?;
    }
    Ok(())
}

pub async fn apply(session: &Session) -> Result<()> {
    let monitor = ApplyProgressMonitor::new(
        Arc::clone(&session.client),
        MonitorConfig::from(&session.config.apply),
    );
    let cancel = CancellationToken::new();
    cancel_on_ctrl_c(cancel.clone());

    let mut view = TerminalView::stdout();
    let outcome = monitor.run(&mut view, &cancel).await?;
    ensure_finished(&outcome)
}

pub async fn triggers_show(session: &Session, form_path: Option<&Path>) -> Result<()> {
    match form_path {
        Some(path) => {
            let mut controller = session.controller(read_form(path)?);
            let triggers = controller.load_triggers().await?;
            print_triggers(&triggers)?;
            write_form(controller.form(), path)
        }
        None => print_triggers(&session.client.get_settings().await?),
    }
}

pub async fn triggers_defaults(session: &Session, form_path: Option<&Path>) -> Result<()> {
    match form_path {
        Some(path) => {
            let mut controller = session.controller(read_form(path)?);
            let triggers = controller.load_trigger_defaults().await?;
            print_triggers(&triggers)?;
            write_form(controller.form(), path)
        }
        None => print_triggers(&session.client.get_settings_defaults().await?),
    }
}

pub async fn triggers_save(session: &Session, form_path: &Path, apply: bool) -> Result<()> {
    let mut controller = session.controller(read_form(form_path)?);
    cancel_on_ctrl_c(controller.cancellation_token());

    let report = controller.save_triggers(apply).await?;
    tracing::info!(triggers = report.triggers.len(), "Trigger settings saved");

    if let Some(outcome) = &report.apply {
        ensure_finished(outcome)?;
    }
    Ok(())
}

fn ensure_finished(outcome: &ApplyOutcome) -> Result<()> {
    match outcome {
        ApplyOutcome::Finished(_) => Ok(()),
        ApplyOutcome::Cancelled { .. } => bail!("Apply job was cancelled"),
        ApplyOutcome::Exhausted { attempts, .. } => {
            bail!("Apply job did not finish after {attempts} polls")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_form_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("form.toml");
        std::fs::write(
            &path,
            r#"
apply_existing = true

[[pane]]
kind = "post-receive"

[[pane.field]]
name = "post-receive.exe"
type = "text"
value = "notify.sh"
"#,
        )
        .unwrap();

        let form = read_form(&path).unwrap();
        write_form(&form, &path).unwrap();

        assert_eq!(read_form(&path).unwrap().to_layout(), form.to_layout());
    }

    #[test]
    fn test_read_form_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_form(&dir.path().join("missing.toml")).unwrap_err();
        assert!(err.to_string().contains("missing.toml"));
    }

    #[test]
    fn test_unfinished_apply_is_an_error() {
        assert!(ensure_finished(&ApplyOutcome::Cancelled { last: None }).is_err());
        assert!(ensure_finished(&ApplyOutcome::Exhausted {
            attempts: 3,
            last: None
        })
        .is_err());
    }
}
