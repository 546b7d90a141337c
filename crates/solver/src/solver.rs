use std::io::Write;
use std::process::{Command, Stdio};

use jmmcheck_smtlib::command::Command as SmtCmd;
use jmmcheck_smtlib::script::Script;

use crate::config::{SolverConfig, SolverKind};
use crate::error::SolverError;
use crate::parser::parse_solver_output;
use crate::result::SolverResult;

/// SMT solver run as a subprocess (Z3, CVC5 or Yices).
///
/// Each query spawns a fresh process and pipes SMT-LIB2 text to its stdin.
#[derive(Debug)]
pub struct CliSolver {
    config: SolverConfig,
}

impl CliSolver {
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    /// Auto-detected Z3 with default settings.
    pub fn with_default_config() -> Result<Self, SolverError> {
        Self::with_default_config_for(SolverKind::Z3)
    }

    /// Auto-detected solver of the given kind with default settings.
    pub fn with_default_config_for(kind: SolverKind) -> Result<Self, SolverError> {
        Ok(Self::new(SolverConfig::auto_detect_for(kind)?))
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Check satisfiability of a script.
    ///
    /// `(check-sat)` and `(get-model)` are appended when the script lacks them.
    pub fn check_sat(&self, script: &Script) -> Result<SolverResult, SolverError> {
        let mut smtlib = script.to_string();
        smtlib.push('\n');
        if !script.has_check_sat() {
            smtlib.push_str(&format!("{}\n", SmtCmd::CheckSat));
        }
        if !script.has_get_model() {
            smtlib.push_str(&format!("{}\n", SmtCmd::GetModel));
        }
        self.check_sat_raw(&smtlib)
    }

    /// Check satisfiability of hand-written SMT-LIB2 text.
    pub fn check_sat_raw(&self, smtlib: &str) -> Result<SolverResult, SolverError> {
        self.config.validate()?;
        let kind = self.config.kind;
        let args = self.config.build_args();

        tracing::debug!(
            solver = %kind,
            path = %self.config.solver_path.display(),
            bytes = smtlib.len(),
            "spawning solver"
        );

        let mut child = Command::new(&self.config.solver_path)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| SolverError::ProcessError(format!("Failed to start {kind}: {e}")))?;

        {
            let stdin = child.stdin.as_mut().ok_or_else(|| {
                SolverError::ProcessError(format!("Failed to open {kind} stdin"))
            })?;
            stdin.write_all(smtlib.as_bytes()).map_err(|e| {
                SolverError::ProcessError(format!("Failed to write to {kind} stdin: {e}"))
            })?;
        }

        let output = child
            .wait_with_output()
            .map_err(|e| SolverError::ProcessError(format!("Failed to wait for {kind}: {e}")))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);

        if stdout.trim() == "timeout" {
            return Ok(SolverResult::Unknown("timeout".to_string()));
        }

        let result = parse_solver_output(&stdout, &stderr);
        match &result {
            Ok(r) => tracing::debug!(
                solver = %kind,
                sat = r.is_sat(),
                unsat = r.is_unsat(),
                "solver finished"
            ),
            Err(e) => tracing::debug!(solver = %kind, error = %e, "solver failed"),
        }
        result
    }
}
