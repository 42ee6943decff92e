//! End-to-end orchestration scenarios driven by real `sh` scripts.
#![cfg(unix)]

use std::fs;
use std::path::{Path, PathBuf};

use omniforge::config::ExecutionPolicy;
use omniforge::registry::PhaseRegistry;
use omniforge::requirements::DependencyChecker;
use omniforge::runner::report::phase_line;
use omniforge::runner::{ExecutionRun, PhaseOrchestrator, PhaseStatus, RunOptions};
use omniforge::state::{ExecutionStateStore, ScriptStatus};
use omniforge::steps::{ScriptExecutor, ScriptState};
use tempfile::TempDir;

const TWO_PHASES: &str = r#"
0:
  name: foundation
  scripts: [a.sh, b.sh]
1:
  name: database
  scripts: [c.sh]
"#;

struct Project {
    temp: TempDir,
}

impl Project {
    /// A project whose scripts each append their key to `calls.log`.
    fn new(catalog: &str, exit_codes: &[(&str, i32)]) -> Self {
        let temp = TempDir::new().unwrap();
        let scripts = temp.path().join("scripts");
        fs::create_dir_all(&scripts).unwrap();
        fs::write(temp.path().join("catalog.yml"), catalog).unwrap();
        let project = Self { temp };
        for (key, code) in exit_codes {
            project.write_script(key, *code);
        }
        project
    }

    fn write_script(&self, key: &str, code: i32) {
        let body = format!("echo {} >> \"$OMNIFORGE_PROJECT_ROOT/calls.log\"\nexit {}\n", key, code);
        fs::write(self.temp.path().join("scripts").join(key), body).unwrap();
    }

    fn root(&self) -> &Path {
        self.temp.path()
    }

    fn state_path(&self) -> PathBuf {
        self.root().join(".omniforge/state.jsonl")
    }

    fn registry(&self) -> PhaseRegistry {
        let content = fs::read_to_string(self.root().join("catalog.yml")).unwrap();
        let mapping: serde_yaml::Mapping = serde_yaml::from_str(&content).unwrap();
        PhaseRegistry::from_mapping(&mapping, 30)
    }

    fn run(&self, options: &RunOptions) -> ExecutionRun {
        self.run_with_checker(options, DependencyChecker::new(Vec::new()))
    }

    fn run_with_checker(&self, options: &RunOptions, checker: DependencyChecker) -> ExecutionRun {
        let state = ExecutionStateStore::open(self.state_path()).unwrap();
        let mut orchestrator = PhaseOrchestrator::new(
            self.registry(),
            state,
            ScriptExecutor::new("sh", self.root()),
            self.root(),
            "scripts",
        )
        .with_checker(checker);
        orchestrator.run(options).unwrap()
    }

    /// Keys in the order their scripts actually ran.
    fn calls(&self) -> Vec<String> {
        fs::read_to_string(self.root().join("calls.log"))
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    fn clear_calls(&self) {
        let _ = fs::remove_file(self.root().join("calls.log"));
    }

    fn state(&self) -> ExecutionStateStore {
        ExecutionStateStore::snapshot(self.state_path()).unwrap()
    }
}

fn policy(policy: ExecutionPolicy) -> RunOptions {
    RunOptions {
        policy,
        ..Default::default()
    }
}

fn succeeded(store: &ExecutionStateStore) -> Vec<String> {
    store
        .list_completed()
        .into_iter()
        .map(|(key, _)| key.to_string())
        .collect()
}

#[test]
fn second_run_skips_everything() {
    let project = Project::new(TWO_PHASES, &[("a.sh", 0), ("b.sh", 0), ("c.sh", 0)]);

    let first = project.run(&RunOptions::default());
    assert!(first.success());
    assert_eq!(project.calls(), ["a.sh", "b.sh", "c.sh"]);

    project.clear_calls();
    let second = project.run(&RunOptions::default());

    assert!(second.success());
    assert!(project.calls().is_empty());
    assert_eq!(
        second.keys_in_state(ScriptState::Skipped),
        ["a.sh", "b.sh", "c.sh"]
    );
}

#[test]
fn resume_reattempts_only_the_failed_script() {
    let project = Project::new(TWO_PHASES, &[("a.sh", 0), ("b.sh", 1), ("c.sh", 0)]);

    let first = project.run(&policy(ExecutionPolicy::FailFast));
    assert!(!first.success());

    project.write_script("b.sh", 0);
    project.clear_calls();
    let second = project.run(&RunOptions::default());

    assert!(second.success());
    assert_eq!(project.calls(), ["b.sh", "c.sh"]);
    assert_eq!(second.keys_in_state(ScriptState::Skipped), ["a.sh"]);
}

#[test]
fn force_reruns_everything_and_refreshes_timestamps() {
    let project = Project::new(TWO_PHASES, &[("a.sh", 0), ("b.sh", 0), ("c.sh", 0)]);
    project.run(&RunOptions::default());
    let before = project.state().entry("a.sh").unwrap().timestamp;

    std::thread::sleep(std::time::Duration::from_millis(20));
    project.clear_calls();
    let forced = project.run(&RunOptions {
        force: true,
        ..Default::default()
    });

    assert!(forced.success());
    assert_eq!(project.calls(), ["a.sh", "b.sh", "c.sh"]);
    assert!(project.state().entry("a.sh").unwrap().timestamp > before);
}

#[test]
fn strict_phase_with_missing_dependency_runs_nothing() {
    let catalog = r#"
0:
  name: tooling
  prereq_mode: strict
  dependencies: [omniforge-missing-tool]
  scripts: [a.sh]
"#;
    let project = Project::new(catalog, &[("a.sh", 0)]);

    let run = project.run(&RunOptions::default());

    assert!(!run.success());
    assert!(project.calls().is_empty());
    assert_eq!(
        run.phase(0).unwrap().status,
        PhaseStatus::CompletedWithErrors
    );
    assert!(run.errors()[0].contains("omniforge-missing-tool"));
}

#[test]
fn warn_phase_with_missing_dependency_still_runs() {
    let catalog = r#"
0:
  name: tooling
  dependencies: [omniforge-missing-tool]
  scripts: [a.sh]
"#;
    let project = Project::new(catalog, &[("a.sh", 0)]);

    let run = project.run(&RunOptions::default());

    assert!(run.success());
    assert_eq!(project.calls(), ["a.sh"]);
    assert!(run
        .summary()
        .warnings
        .iter()
        .any(|w| w.contains("omniforge-missing-tool")));
}

#[test]
fn dependency_found_on_injected_path() {
    use std::os::unix::fs::PermissionsExt;

    let catalog = r#"
0:
  prereq_mode: strict
  dependencies: [forge-tool]
  scripts: [a.sh]
"#;
    let project = Project::new(catalog, &[("a.sh", 0)]);
    let bin = project.root().join("bin");
    fs::create_dir_all(&bin).unwrap();
    let tool = bin.join("forge-tool");
    fs::write(&tool, "#!/bin/sh\n").unwrap();
    fs::set_permissions(&tool, fs::Permissions::from_mode(0o755)).unwrap();

    let run = project.run_with_checker(&RunOptions::default(), DependencyChecker::new(vec![bin]));

    assert!(run.success());
    assert_eq!(project.calls(), ["a.sh"]);
}

#[test]
fn continue_policy_aggregates_failures() {
    let project = Project::new(TWO_PHASES, &[("a.sh", 0), ("b.sh", 1), ("c.sh", 0)]);

    let run = project.run(&policy(ExecutionPolicy::Continue));

    assert!(!run.success());
    let summary = run.summary();
    assert_eq!(phase_line(&summary.per_phase[0]), "Phase 0: ok=1 fail=1 skip=0");
    assert_eq!(phase_line(&summary.per_phase[1]), "Phase 1: ok=1 fail=0 skip=0");
    assert_eq!(summary.failed_scripts.len(), 1);
    assert_eq!(summary.failed_scripts[0].result.key, "b.sh");

    let state = project.state();
    assert_eq!(succeeded(&state), ["a.sh", "c.sh"]);
    assert_eq!(state.entry("b.sh").unwrap().status, ScriptStatus::Failed);
}

#[test]
fn fail_fast_stops_before_next_phase() {
    let project = Project::new(TWO_PHASES, &[("a.sh", 0), ("b.sh", 1), ("c.sh", 0)]);

    let run = project.run(&policy(ExecutionPolicy::FailFast));

    assert!(!run.success());
    assert!(run.is_aborted());
    assert_eq!(project.calls(), ["a.sh", "b.sh"]);
    assert!(run.phase(1).is_none());
    assert_eq!(succeeded(&project.state()), ["a.sh"]);
}

#[test]
fn dry_run_spawns_nothing_but_records_success() {
    let project = Project::new(TWO_PHASES, &[("a.sh", 0), ("b.sh", 1), ("c.sh", 0)]);

    let run = project.run(&RunOptions {
        dry_run: true,
        ..Default::default()
    });

    assert!(run.success());
    assert!(project.calls().is_empty());
    // Preview currently persists completion, so a later live run skips
    // these scripts until they are reset.
    assert_eq!(succeeded(&project.state()), ["a.sh", "b.sh", "c.sh"]);
}

#[test]
fn dry_run_can_leave_state_untouched() {
    let project = Project::new(TWO_PHASES, &[("a.sh", 0), ("b.sh", 0), ("c.sh", 0)]);

    let run = project.run(&RunOptions {
        dry_run: true,
        dry_run_records_state: false,
        ..Default::default()
    });

    assert!(run.success());
    assert!(project.calls().is_empty());
    assert_eq!(project.state().count(), 0);
}

#[test]
fn missing_script_file_fails_the_phase() {
    let project = Project::new(TWO_PHASES, &[("a.sh", 0), ("c.sh", 0)]);

    let run = project.run(&policy(ExecutionPolicy::Continue));

    assert!(!run.success());
    let failed = &run.summary().failed_scripts[0];
    assert_eq!(failed.result.key, "b.sh");
    assert!(failed.result.error.as_deref().unwrap().contains("not found"));
}

#[test]
fn single_phase_filter() {
    let project = Project::new(TWO_PHASES, &[("a.sh", 0), ("b.sh", 0), ("c.sh", 0)]);

    let run = project.run(&RunOptions {
        phase_filter: Some(1),
        ..Default::default()
    });

    assert!(run.success());
    assert_eq!(project.calls(), ["c.sh"]);
    assert_eq!(run.phases().len(), 1);
}

const GATED_FIRST: &str = r#"
0:
  name: tooling
  prereq_mode: strict
  dependencies: [omniforge-missing-tool]
  scripts: [a.sh]
1:
  name: database
  scripts: [c.sh]
"#;

#[test]
fn strict_block_under_continue_still_runs_later_phases() {
    let project = Project::new(GATED_FIRST, &[("a.sh", 0), ("c.sh", 0)]);

    let run = project.run(&policy(ExecutionPolicy::Continue));

    assert!(!run.success());
    assert!(!run.is_aborted());
    assert_eq!(project.calls(), ["c.sh"]);
    let database = run.phase(1).unwrap();
    assert_eq!((database.ok, database.fail), (1, 0));
    assert_eq!(succeeded(&project.state()), ["c.sh"]);
}

#[test]
fn strict_block_under_fail_fast_stops_the_run() {
    let project = Project::new(GATED_FIRST, &[("a.sh", 0), ("c.sh", 0)]);

    let run = project.run(&policy(ExecutionPolicy::FailFast));

    assert!(!run.success());
    assert!(run.is_aborted());
    assert!(project.calls().is_empty());
    assert!(run.phase(1).is_none());
    assert_eq!(project.state().count(), 0);
}

#[test]
fn timed_out_script_is_recorded_as_failed() {
    let catalog = r#"
0:
  name: slow
  timeout: 1
  scripts: [slow.sh]
1:
  name: database
  scripts: [c.sh]
"#;
    let project = Project::new(catalog, &[("c.sh", 0)]);
    fs::write(project.root().join("scripts/slow.sh"), "sleep 30\n").unwrap();

    let run = project.run(&policy(ExecutionPolicy::Continue));

    assert!(!run.success());
    let failed = &run.summary().failed_scripts[0];
    assert_eq!(failed.result.key, "slow.sh");
    assert_eq!(failed.result.exit_code, Some(124));
    assert!(run
        .errors()
        .iter()
        .any(|e| e.contains("slow.sh: timed out after 1s (exit code 124)")));

    let state = project.state();
    assert_eq!(state.entry("slow.sh").unwrap().status, ScriptStatus::Failed);
    assert!(state.has_succeeded("c.sh"));
}

#[test]
fn huge_phase_timeout_runs_without_deadline() {
    let catalog = r#"
0:
  timeout: 18446744073709551615
  scripts: [a.sh]
"#;
    let project = Project::new(catalog, &[("a.sh", 0)]);

    let run = project.run(&RunOptions::default());

    assert!(run.success());
    assert_eq!(project.calls(), ["a.sh"]);
}
