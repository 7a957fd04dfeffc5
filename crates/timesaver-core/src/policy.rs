//! Technology policy table
//!
//! Maps each [`Technology`] to the scaffolder it delegates to, the folder that
//! scaffolder produces, and the manifest fields written afterwards. Scaffolders
//! pick their own output folder name, which is why the orchestrator has to wait
//! for that folder and rename it.

use crate::request::Technology;
use colored::Colorize;

/// Installs the TypeScript compiler into the current project
pub const TYPESCRIPT_INSTALL: &str = "npm install typescript --save-dev";

/// Writes a default `tsconfig.json`; exits non-zero if one already exists
pub const TYPESCRIPT_INIT: &str = "npx tsc --init";

/// Placeholder `test` script, always written
pub const TEST_PLACEHOLDER: &str = "echo \"Error: no test specified\" && exit 1";

/// Manifest file every scaffolder in the table produces
pub const MANIFEST_FILE: &str = "package.json";

const TS_RUN: &str = "tsc index.ts";
const TS_BUILD: &str = "tsc && node dist/index.js";
const ANGULAR_NEW: &str = "npx --yes @angular/cli@latest new my-angular-app --defaults --skip-git";

/// Module system recorded in the manifest's `type` field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModuleType {
    Module,
    CommonJs,
}

impl ModuleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModuleType::Module => "module",
            ModuleType::CommonJs => "commonjs",
        }
    }
}

/// Commands and manifest templates for one technology
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyRow {
    pub tech: Technology,
    /// Scaffolder invocation; `None` when the project is assembled locally
    pub scaffold_command: Option<&'static str>,
    pub needs_typescript_install: bool,
    /// Folder the scaffolder creates under the working root
    pub generated_folder: Option<&'static str>,
    pub module_type: ModuleType,
    pub run_script: &'static str,
    pub build_script: &'static str,
    pub doc_url: &'static str,
}

impl PolicyRow {
    /// Every external command this row implies, in execution order
    pub fn setup_commands(&self) -> Vec<&'static str> {
        let mut commands: Vec<&'static str> = self.scaffold_command.into_iter().collect();
        if self.needs_typescript_install {
            commands.push(TYPESCRIPT_INSTALL);
            commands.push(TYPESCRIPT_INIT);
        }
        commands
    }
}

static POLICY_TABLE: [PolicyRow; 7] = [
    PolicyRow {
        tech: Technology::Typescript,
        scaffold_command: None,
        needs_typescript_install: true,
        generated_folder: None,
        module_type: ModuleType::Module,
        run_script: TS_RUN,
        build_script: TS_BUILD,
        doc_url: "https://www.typescriptlang.org/docs/",
    },
    PolicyRow {
        tech: Technology::React,
        scaffold_command: Some("npm create vite@latest my-react-app -- --template react"),
        needs_typescript_install: false,
        generated_folder: Some("my-react-app"),
        module_type: ModuleType::CommonJs,
        run_script: "npm start",
        build_script: "npm run build",
        doc_url: "https://react.dev/learn",
    },
    PolicyRow {
        tech: Technology::ReactTs,
        scaffold_command: Some("npm create vite@latest my-react-app -- --template react-ts"),
        needs_typescript_install: true,
        generated_folder: Some("my-react-app"),
        module_type: ModuleType::Module,
        run_script: TS_RUN,
        build_script: TS_BUILD,
        doc_url: "https://react.dev/learn/typescript",
    },
    PolicyRow {
        tech: Technology::Vue,
        scaffold_command: Some("npm create vite@latest my-vue-app -- --template vue"),
        needs_typescript_install: false,
        generated_folder: Some("my-vue-app"),
        module_type: ModuleType::CommonJs,
        run_script: "npm run dev",
        build_script: "npm run build",
        doc_url: "https://vuejs.org/guide/introduction.html",
    },
    PolicyRow {
        tech: Technology::VueTs,
        scaffold_command: Some("npm create vite@latest my-vue-app -- --template vue-ts"),
        needs_typescript_install: true,
        generated_folder: Some("my-vue-app"),
        module_type: ModuleType::Module,
        run_script: TS_RUN,
        build_script: TS_BUILD,
        doc_url: "https://vuejs.org/guide/typescript/overview.html",
    },
    PolicyRow {
        tech: Technology::Angular,
        scaffold_command: Some(ANGULAR_NEW),
        needs_typescript_install: false,
        generated_folder: Some("my-angular-app"),
        module_type: ModuleType::CommonJs,
        run_script: "ng serve",
        build_script: "ng build",
        doc_url: "https://angular.dev/overview",
    },
    PolicyRow {
        tech: Technology::AngularTs,
        scaffold_command: Some(ANGULAR_NEW),
        needs_typescript_install: true,
        generated_folder: Some("my-angular-app"),
        module_type: ModuleType::Module,
        run_script: TS_RUN,
        build_script: TS_BUILD,
        doc_url: "https://angular.dev/overview",
    },
];

/// Look up the policy row for a technology
pub fn policy_for(tech: Technology) -> &'static PolicyRow {
    POLICY_TABLE
        .iter()
        .find(|row| row.tech == tech)
        .unwrap_or_else(|| unreachable!("policy table covers every technology"))
}

/// The whole table, in menu order
pub fn policy_table() -> &'static [PolicyRow] {
    &POLICY_TABLE
}

/// Technology-to-documentation table printed by `timesaver list`
pub fn render_technology_table() -> String {
    let width = Technology::ALL
        .iter()
        .map(|t| t.key().len())
        .max()
        .unwrap_or(0);

    let mut out = format!("{}\n\n", "# Technologies Documentation".bold());
    for row in policy_table() {
        out.push_str(&format!(
            "  {} : {}\n",
            format!("{:<width$}", row.tech.key(), width = width).white().bold(),
            row.doc_url.bright_blue()
        ));
    }
    out
}
