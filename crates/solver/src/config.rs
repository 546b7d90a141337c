//! Which solver binary to run and how to invoke it.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::SolverError;

/// Environment variable selecting the solver kind for [`SolverConfig::from_env`].
pub const ENV_SOLVER: &str = "JMMCHECK_SOLVER";
/// Environment variable holding the solver timeout in milliseconds.
pub const ENV_TIMEOUT_MS: &str = "JMMCHECK_SOLVER_TIMEOUT_MS";

/// Install prefixes searched after `PATH`.
const FALLBACK_DIRS: [&str; 3] = ["/opt/homebrew/bin", "/usr/local/bin", "/usr/bin"];

/// Supported SMT solvers. All of them read SMT-LIB2 from stdin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SolverKind {
    Z3,
    Cvc5,
    Yices,
}

impl SolverKind {
    /// Every supported solver, in detection preference order.
    pub const ALL: [SolverKind; 3] = [SolverKind::Z3, SolverKind::Cvc5, SolverKind::Yices];

    pub fn binary_name(self) -> &'static str {
        match self {
            SolverKind::Z3 => "z3",
            SolverKind::Cvc5 => "cvc5",
            SolverKind::Yices => "yices-smt2",
        }
    }

    /// Arguments that make the solver read a script from stdin and print models.
    pub fn stdin_args(self) -> Vec<String> {
        let args: &[&str] = match self {
            SolverKind::Z3 => &["-in"],
            SolverKind::Cvc5 => &["--lang", "smt2", "--produce-models", "--incremental"],
            SolverKind::Yices => &["--incremental"],
        };
        args.iter().map(|a| a.to_string()).collect()
    }

    /// Timeout flag; `None` when `timeout_ms` is zero. Yices takes seconds.
    pub fn timeout_arg(self, timeout_ms: u64) -> Option<String> {
        (timeout_ms > 0).then(|| match self {
            SolverKind::Z3 => format!("-t:{timeout_ms}"),
            SolverKind::Cvc5 => format!("--tlimit={timeout_ms}"),
            SolverKind::Yices => format!("--timeout={}", timeout_ms.div_ceil(1000)),
        })
    }

    /// First executable named [`binary_name`](Self::binary_name) on `PATH`
    /// or in a common install prefix.
    fn locate(self) -> Option<PathBuf> {
        let path_dirs = std::env::var_os("PATH")
            .map(|p| std::env::split_paths(&p).collect::<Vec<_>>())
            .unwrap_or_default();
        path_dirs
            .into_iter()
            .chain(FALLBACK_DIRS.iter().map(PathBuf::from))
            .map(|dir| dir.join(self.binary_name()))
            .find(|candidate| candidate.is_file())
    }
}

impl fmt::Display for SolverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SolverKind::Z3 => "Z3",
            SolverKind::Cvc5 => "CVC5",
            SolverKind::Yices => "Yices",
        };
        f.write_str(name)
    }
}

impl FromStr for SolverKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "z3" => Ok(SolverKind::Z3),
            "cvc5" => Ok(SolverKind::Cvc5),
            "yices" | "yices2" | "yices-smt2" => Ok(SolverKind::Yices),
            _ => Err(format!(
                "unknown solver `{s}` (expected one of: z3, cvc5, yices)"
            )),
        }
    }
}

/// How to run one solver process.
#[derive(Debug, Clone)]
pub struct SolverConfig {
    pub kind: SolverKind,
    pub solver_path: PathBuf,
    /// Milliseconds; 0 disables the limit.
    pub timeout_ms: u64,
    pub extra_args: Vec<String>,
}

impl SolverConfig {
    pub fn new(kind: SolverKind, solver_path: impl Into<PathBuf>) -> Self {
        Self {
            kind,
            solver_path: solver_path.into(),
            timeout_ms: 0,
            extra_args: Vec::new(),
        }
    }

    pub fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_extra_args(mut self, args: Vec<String>) -> Self {
        self.extra_args = args;
        self
    }

    /// Find the binary of `kind` on this host.
    pub fn auto_detect_for(kind: SolverKind) -> Result<Self, SolverError> {
        kind.locate()
            .map(|path| Self::new(kind, path))
            .ok_or_else(|| SolverError::NotFound(kind, PathBuf::from(kind.binary_name())))
    }

    /// Find Z3, the default solver for legality problems.
    pub fn auto_detect() -> Result<Self, SolverError> {
        Self::auto_detect_for(SolverKind::Z3)
    }

    /// The first installed solver, in the order of [`SolverKind::ALL`].
    pub fn auto_detect_any() -> Result<Self, SolverError> {
        SolverKind::ALL
            .into_iter()
            .find_map(|kind| Self::auto_detect_for(kind).ok())
            .ok_or_else(|| {
                SolverError::NotFound(SolverKind::Z3, PathBuf::from(SolverKind::Z3.binary_name()))
            })
    }

    /// `JMMCHECK_SOLVER` picks the kind (default Z3) and
    /// `JMMCHECK_SOLVER_TIMEOUT_MS` the timeout; the binary is auto-detected.
    pub fn from_env() -> Result<Self, SolverError> {
        let kind = match std::env::var(ENV_SOLVER) {
            Ok(name) => name.parse().map_err(SolverError::ProcessError)?,
            Err(_) => SolverKind::Z3,
        };
        let mut config = Self::auto_detect_for(kind)?;
        if let Ok(ms) = std::env::var(ENV_TIMEOUT_MS) {
            config.timeout_ms = ms.trim().parse().map_err(|_| {
                SolverError::ProcessError(format!("invalid {ENV_TIMEOUT_MS} value: {ms}"))
            })?;
        }
        Ok(config)
    }

    /// Full argument list: stdin mode, timeout, then the extra arguments.
    pub fn build_args(&self) -> Vec<String> {
        let mut args = self.kind.stdin_args();
        args.extend(self.kind.timeout_arg(self.timeout_ms));
        args.extend(self.extra_args.iter().cloned());
        args
    }

    pub fn validate(&self) -> Result<(), SolverError> {
        if self.solver_path.is_file() {
            Ok(())
        } else {
            Err(SolverError::NotFound(self.kind, self.solver_path.clone()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder() {
        let config = SolverConfig::new(SolverKind::Z3, "/usr/bin/z3")
            .with_timeout(5000)
            .with_extra_args(vec!["-v:1".to_string()]);
        assert_eq!(config.solver_path, PathBuf::from("/usr/bin/z3"));
        assert_eq!(config.timeout_ms, 5000);
        assert_eq!(config.build_args(), vec!["-in", "-t:5000", "-v:1"]);
    }

    #[test]
    fn detection_is_consistent_with_validation() {
        match SolverConfig::auto_detect() {
            Ok(config) => {
                assert_eq!(config.kind, SolverKind::Z3);
                assert!(config.validate().is_ok());
            }
            Err(err) => assert!(matches!(err, SolverError::NotFound(SolverKind::Z3, _))),
        }
        if let Ok(config) = SolverConfig::auto_detect_any() {
            assert!(SolverKind::ALL.contains(&config.kind));
        }
    }

    #[test]
    fn missing_binary_fails_validation() {
        let config = SolverConfig::new(SolverKind::Cvc5, "/nonexistent/cvc5");
        assert_eq!(
            config.validate(),
            Err(SolverError::NotFound(SolverKind::Cvc5, PathBuf::from("/nonexistent/cvc5")))
        );
    }

    #[test]
    fn kind_names_round_trip() {
        for kind in SolverKind::ALL {
            assert_eq!(kind.binary_name().parse::<SolverKind>(), Ok(kind));
            assert_eq!(kind.to_string().parse::<SolverKind>(), Ok(kind));
        }
        assert_eq!("yices2".parse::<SolverKind>(), Ok(SolverKind::Yices));
        assert!("boolector".parse::<SolverKind>().is_err());
    }

    #[test]
    fn per_solver_arguments() {
        assert_eq!(SolverKind::Z3.timeout_arg(0), None);
        assert_eq!(SolverKind::Cvc5.timeout_arg(250).as_deref(), Some("--tlimit=250"));
        // Yices rounds up to whole seconds
        assert_eq!(SolverKind::Yices.timeout_arg(1500).as_deref(), Some("--timeout=2"));

        let cvc5 = SolverConfig::new(SolverKind::Cvc5, "/usr/bin/cvc5").build_args();
        assert!(cvc5.contains(&"--produce-models".to_string()));
        let yices = SolverConfig::new(SolverKind::Yices, "/usr/bin/yices-smt2").build_args();
        assert_eq!(yices, vec!["--incremental"]);
    }
}
