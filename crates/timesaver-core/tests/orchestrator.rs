use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use tempfile::TempDir;
use timesaver_core::orchestrator::{
    NoProgress, Orchestrator, Progress, Stage, HELLO_WORLD_FILE, HELLO_WORLD_SOURCE,
};
use timesaver_core::policy::{TEST_PLACEHOLDER, TYPESCRIPT_INIT, TYPESCRIPT_INSTALL};
use timesaver_core::{CommandRunner, ProjectRequest, ScaffoldError, Settings, Technology};

/// Stands in for npm/npx: records every call and fakes what the real tools write
#[derive(Default)]
struct FakeRunner {
    calls: Mutex<Vec<(String, PathBuf)>>,
    fail_on: Option<&'static str>,
    scaffold_delay: Option<Duration>,
    scaffold_creates_nothing: bool,
}

impl FakeRunner {
    fn calls(&self) -> Vec<(String, PathBuf)> {
        self.calls.lock().unwrap().clone()
    }

    fn commands(&self) -> Vec<String> {
        self.calls().into_iter().map(|(cmd, _)| cmd).collect()
    }
}

fn write_generated_project(dir: &Path, with_tsconfig: bool) {
    std::fs::create_dir_all(dir.join("src")).unwrap();
    std::fs::write(dir.join("src/main.js"), "").unwrap();
    if with_tsconfig {
        std::fs::write(dir.join("tsconfig.json"), "{}").unwrap();
    }
    let name = dir.file_name().unwrap().to_str().unwrap();
    std::fs::write(
        dir.join("package.json"),
        format!(
            r#"{{"name": "{}", "private": true, "version": "0.0.0", "scripts": {{"dev": "vite", "build": "vite build"}}}}"#,
            name
        ),
    )
    .unwrap();
}

impl CommandRunner for FakeRunner {
    async fn run(&self, command_line: &str, cwd: &Path) -> timesaver_core::Result<String> {
        self.calls
            .lock()
            .unwrap()
            .push((command_line.to_string(), cwd.to_path_buf()));

        if self.fail_on.is_some_and(|needle| command_line.contains(needle)) {
            return Err(ScaffoldError::Command {
                command: command_line.to_string(),
                code: Some(1),
                message: "npm ERR! simulated failure".to_string(),
            });
        }

        if command_line == TYPESCRIPT_INSTALL {
            std::fs::create_dir_all(cwd.join("node_modules/typescript")).unwrap();
            std::fs::write(cwd.join("node_modules/typescript/package.json"), "{}").unwrap();
            return Ok("added 1 package\n".to_string());
        }

        if command_line == TYPESCRIPT_INIT {
            assert!(
                !cwd.join("tsconfig.json").exists(),
                "tsc --init must not run over an existing tsconfig.json"
            );
            std::fs::write(cwd.join("tsconfig.json"), "{}").unwrap();
            return Ok("Created a new tsconfig.json\n".to_string());
        }

        let folder = command_line
            .split_whitespace()
            .find(|w| w.starts_with("my-") && w.ends_with("-app"))
            .expect("scaffold command names its output folder");
        if self.scaffold_creates_nothing {
            return Ok(String::new());
        }

        let target = cwd.join(folder);
        let with_tsconfig = command_line.contains("-ts") || command_line.contains("@angular/cli");
        match self.scaffold_delay {
            Some(delay) => {
                tokio::spawn(async move {
                    tokio::time::sleep(delay).await;
                    write_generated_project(&target, with_tsconfig);
                });
            }
            None => write_generated_project(&target, with_tsconfig),
        }
        Ok(format!("Scaffolding project in {}...\n", folder))
    }
}

#[derive(Default)]
struct RecordingProgress {
    events: Mutex<Vec<String>>,
}

impl Progress for RecordingProgress {
    fn stage_started(&self, stage: Stage) {
        self.events.lock().unwrap().push(format!("start {:?}", stage));
    }

    fn stage_finished(&self, stage: Stage) {
        self.events.lock().unwrap().push(format!("done {:?}", stage));
    }

    fn stage_failed(&self, stage: Stage, _error: &ScaffoldError) {
        self.events.lock().unwrap().push(format!("fail {:?}", stage));
    }
}

fn settings_in(tmp: &TempDir) -> Settings {
    Settings {
        working_root: tmp.path().join("Project"),
        poll_interval_ms: 10,
        await_timeout_secs: 5,
        strict_stderr: false,
    }
}

fn read_manifest(path: &Path) -> Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

#[tokio::test]
async fn bare_typescript_writes_entry_file_and_no_manifest() {
    let tmp = TempDir::new().unwrap();
    let settings = settings_in(&tmp);
    let root = settings.working_root.clone();
    std::fs::create_dir_all(&root).unwrap();
    std::fs::write(root.join("stale.txt"), "left over").unwrap();

    let runner = FakeRunner::default();
    let orchestrator = Orchestrator::new(runner, &settings);
    let request = ProjectRequest::new("demo", Technology::Typescript, "", "").unwrap();
    let progress = RecordingProgress::default();

    let outcome = orchestrator.run(&request, &progress).await.unwrap();

    assert_eq!(
        outcome.stages,
        vec![
            Stage::DirectoryReset,
            Stage::ToolchainInstalled,
            Stage::MinimalSourceWritten
        ]
    );
    assert_eq!(outcome.project_dir, root.join("demo"));
    assert_eq!(outcome.doc_url, "https://www.typescriptlang.org/docs/");
    assert!(!root.join("stale.txt").exists());
    assert_eq!(
        std::fs::read_to_string(root.join("demo").join(HELLO_WORLD_FILE)).unwrap(),
        HELLO_WORLD_SOURCE
    );
    assert_eq!(HELLO_WORLD_SOURCE, "console.log(\"Hello, world!\");");
    assert!(!root.join("demo/package.json").exists());
    assert_eq!(outcome.file_count, 1);
}

#[tokio::test]
async fn bare_typescript_installs_toolchain_in_working_root() {
    let tmp = TempDir::new().unwrap();
    let settings = settings_in(&tmp);
    let runner = FakeRunner::default();
    let orchestrator = Orchestrator::new(runner, &settings);
    let request = ProjectRequest::new("demo", Technology::Typescript, "", "").unwrap();

    orchestrator
        .run(&request, &NoProgress)
        .await
        .unwrap();

    let root = settings.working_root.clone();
    let calls = orchestrator.runner().calls();
    assert_eq!(
        calls,
        vec![
            (TYPESCRIPT_INSTALL.to_string(), root.clone()),
            (TYPESCRIPT_INIT.to_string(), root.clone()),
        ]
    );
    assert!(root.join("tsconfig.json").exists());
}

#[tokio::test]
async fn bare_typescript_refuses_name_taken_by_toolchain() {
    let tmp = TempDir::new().unwrap();
    let settings = settings_in(&tmp);
    let orchestrator = Orchestrator::new(FakeRunner::default(), &settings);
    let request = ProjectRequest::new("node_modules", Technology::Typescript, "", "").unwrap();
    let progress = RecordingProgress::default();

    let err = orchestrator.run(&request, &progress).await.unwrap_err();

    let root = orchestrator.working_root();
    match err {
        ScaffoldError::Filesystem { path, source } => {
            assert_eq!(path, root.join("node_modules"));
            assert_eq!(source.kind(), std::io::ErrorKind::AlreadyExists);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!root.join("node_modules").join(HELLO_WORLD_FILE).exists());
    assert_eq!(
        progress.events.lock().unwrap().last().map(String::as_str),
        Some("fail MinimalSourceWritten")
    );
}

#[tokio::test]
async fn react_ts_is_scaffolded_renamed_and_patched() {
    let tmp = TempDir::new().unwrap();
    let settings = settings_in(&tmp);
    let root = settings.working_root.clone();
    let orchestrator = Orchestrator::new(FakeRunner::default(), &settings);
    let request = ProjectRequest::new("shop", Technology::ReactTs, "Al", "2.0.0").unwrap();
    let progress = RecordingProgress::default();

    let outcome = orchestrator.run(&request, &progress).await.unwrap();

    assert_eq!(
        outcome.stages,
        vec![
            Stage::DirectoryReset,
            Stage::ScaffoldInvoked,
            Stage::OutputDirectoryAwaited,
            Stage::TypescriptInstalled,
            Stage::Renamed,
            Stage::ManifestPatched,
        ]
    );

    let calls = orchestrator.runner().calls();
    assert_eq!(
        calls[0],
        (
            "npm create vite@latest my-react-app -- --template react-ts".to_string(),
            root.clone()
        )
    );
    // The template ships a tsconfig.json, so only the install runs
    assert_eq!(
        calls[1],
        (TYPESCRIPT_INSTALL.to_string(), root.join("my-react-app"))
    );
    assert_eq!(calls.len(), 2);

    assert!(!root.join("my-react-app").exists());
    assert_eq!(outcome.project_dir, root.join("shop"));

    let manifest = read_manifest(&root.join("shop/package.json"));
    assert_eq!(manifest["name"], "shop");
    assert_eq!(manifest["version"], "2.0.0");
    assert_eq!(manifest["author"], "Al");
    assert_eq!(manifest["type"], "module");
    assert_eq!(manifest["scripts"]["run"], "tsc index.ts");
    assert_eq!(manifest["scripts"]["build"], "tsc && node dist/index.js");
    assert_eq!(manifest["scripts"]["test"], TEST_PLACEHOLDER);
    assert_eq!(manifest["scripts"]["dev"], "vite");
    assert_eq!(manifest["private"], true);

    let events = progress.events.lock().unwrap().clone();
    assert_eq!(events.first().map(String::as_str), Some("start DirectoryReset"));
    assert_eq!(events.last().map(String::as_str), Some("done ManifestPatched"));
    assert_eq!(events.len(), 12);
}

#[tokio::test]
async fn plain_vue_skips_typescript_install() {
    let tmp = TempDir::new().unwrap();
    let settings = settings_in(&tmp);
    let root = settings.working_root.clone();
    let orchestrator = Orchestrator::new(FakeRunner::default(), &settings);
    let request = ProjectRequest::new("site", Technology::Vue, "", "").unwrap();

    let outcome = orchestrator
        .run(&request, &RecordingProgress::default())
        .await
        .unwrap();

    assert!(!outcome.stages.contains(&Stage::TypescriptInstalled));
    assert_eq!(
        orchestrator.runner().commands(),
        vec!["npm create vite@latest my-vue-app -- --template vue".to_string()]
    );

    let manifest = read_manifest(&root.join("site/package.json"));
    assert_eq!(manifest["type"], "commonjs");
    assert_eq!(manifest["version"], "1.0.0");
    assert_eq!(manifest["author"], "");
    assert_eq!(manifest["scripts"]["run"], "npm run dev");
    assert_eq!(manifest["scripts"]["build"], "npm run build");
}

#[tokio::test]
async fn angular_ts_runs_install_inside_generated_project() {
    let tmp = TempDir::new().unwrap();
    let settings = settings_in(&tmp);
    let root = settings.working_root.clone();
    let orchestrator = Orchestrator::new(FakeRunner::default(), &settings);
    let request = ProjectRequest::new("portal", Technology::AngularTs, "Team", "0.1.0").unwrap();

    let outcome = orchestrator
        .run(&request, &RecordingProgress::default())
        .await
        .unwrap();

    let calls = orchestrator.runner().calls();
    assert!(calls[0].0.contains("@angular/cli"));
    assert_eq!(calls[1].1, root.join("my-angular-app"));
    assert_eq!(outcome.project_dir, root.join("portal"));
    // node_modules is left out of the count
    assert_eq!(outcome.file_count, 3);
}

#[tokio::test]
async fn waits_for_scaffolder_output_that_appears_late() {
    let tmp = TempDir::new().unwrap();
    let settings = settings_in(&tmp);
    let root = settings.working_root.clone();
    let runner = FakeRunner {
        scaffold_delay: Some(Duration::from_millis(150)),
        ..FakeRunner::default()
    };
    let orchestrator = Orchestrator::new(runner, &settings);
    let request = ProjectRequest::new("shop", Technology::React, "", "").unwrap();

    orchestrator
        .run(&request, &RecordingProgress::default())
        .await
        .unwrap();

    let manifest = read_manifest(&root.join("shop/package.json"));
    assert_eq!(manifest["name"], "shop");
    assert_eq!(manifest["scripts"]["run"], "npm start");
}

#[tokio::test]
async fn failing_scaffolder_aborts_before_any_later_stage() {
    let tmp = TempDir::new().unwrap();
    let settings = settings_in(&tmp);
    let root = settings.working_root.clone();
    let runner = FakeRunner {
        fail_on: Some("vite"),
        ..FakeRunner::default()
    };
    let orchestrator = Orchestrator::new(runner, &settings);
    let request = ProjectRequest::new("shop", Technology::ReactTs, "Al", "2.0.0").unwrap();
    let progress = RecordingProgress::default();

    let err = orchestrator.run(&request, &progress).await.unwrap_err();

    assert!(matches!(err, ScaffoldError::Command { code: Some(1), .. }));
    assert_eq!(
        progress.events.lock().unwrap().clone(),
        vec![
            "start DirectoryReset",
            "done DirectoryReset",
            "start ScaffoldInvoked",
            "fail ScaffoldInvoked",
        ]
    );
    assert_eq!(orchestrator.runner().calls().len(), 1);
    assert!(root.is_dir());
    assert!(!root.join("shop").exists());
    assert!(!root.join("my-react-app").exists());
}

#[tokio::test]
async fn failing_typescript_install_leaves_generated_folder_unrenamed() {
    let tmp = TempDir::new().unwrap();
    let settings = settings_in(&tmp);
    let root = settings.working_root.clone();
    let runner = FakeRunner {
        fail_on: Some(TYPESCRIPT_INSTALL),
        ..FakeRunner::default()
    };
    let orchestrator = Orchestrator::new(runner, &settings);
    let request = ProjectRequest::new("app", Technology::VueTs, "", "").unwrap();

    let err = orchestrator
        .run(&request, &RecordingProgress::default())
        .await
        .unwrap_err();

    assert!(matches!(err, ScaffoldError::Command { .. }));
    assert!(root.join("my-vue-app/package.json").exists());
    assert!(!root.join("app").exists());
    let untouched = read_manifest(&root.join("my-vue-app/package.json"));
    assert_eq!(untouched["name"], "my-vue-app");
}

#[tokio::test]
async fn missing_scaffolder_output_times_out() {
    let tmp = TempDir::new().unwrap();
    let mut settings = settings_in(&tmp);
    settings.await_timeout_secs = 0;
    let runner = FakeRunner {
        scaffold_creates_nothing: true,
        ..FakeRunner::default()
    };
    let orchestrator = Orchestrator::new(runner, &settings);
    let request = ProjectRequest::new("shop", Technology::React, "", "").unwrap();

    let err = orchestrator
        .run(&request, &RecordingProgress::default())
        .await
        .unwrap_err();

    match err {
        ScaffoldError::Timeout { path, .. } => {
            assert_eq!(path, settings.working_root.join("my-react-app"));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn name_matching_generated_folder_skips_rename() {
    let tmp = TempDir::new().unwrap();
    let settings = settings_in(&tmp);
    let root = settings.working_root.clone();
    let orchestrator = Orchestrator::new(FakeRunner::default(), &settings);
    let request = ProjectRequest::new("my-react-app", Technology::React, "", "").unwrap();

    let outcome = orchestrator
        .run(&request, &RecordingProgress::default())
        .await
        .unwrap();

    assert!(outcome.stages.contains(&Stage::Renamed));
    assert_eq!(outcome.project_dir, root.join("my-react-app"));
    assert_eq!(
        read_manifest(&root.join("my-react-app/package.json"))["name"],
        "my-react-app"
    );
}

#[tokio::test]
async fn repeated_runs_start_from_a_clean_root() {
    let tmp = TempDir::new().unwrap();
    let settings = settings_in(&tmp);
    let root = settings.working_root.clone();
    let request = ProjectRequest::new("shop", Technology::React, "", "").unwrap();

    for _ in 0..2 {
        let orchestrator = Orchestrator::new(FakeRunner::default(), &settings);
        orchestrator
            .run(&request, &RecordingProgress::default())
            .await
            .unwrap();
    }

    let entries: Vec<_> = std::fs::read_dir(&root)
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(entries, vec![std::ffi::OsString::from("shop")]);
}
