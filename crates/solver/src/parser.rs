use crate::error::SolverError;
use crate::model::Model;
use crate::result::SolverResult;

/// Parse solver stdout into a `SolverResult`.
///
/// The first non-empty line is `sat`, `unsat` or `unknown`; after `sat`
/// the remaining text holds the `(get-model)` answer.
pub fn parse_solver_output(stdout: &str, stderr: &str) -> Result<SolverResult, SolverError> {
    let stdout = stdout.trim();

    if stdout.is_empty() {
        if stderr.contains("timeout") {
            return Ok(SolverResult::Unknown("timeout".to_string()));
        }
        return Err(SolverError::ParseError(format!(
            "Empty solver output. stderr: {stderr}"
        )));
    }

    let first_line = stdout
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("");

    match first_line {
        "unsat" => Ok(SolverResult::Unsat),
        "sat" => Ok(SolverResult::Sat(parse_model(stdout)?)),
        "unknown" => Ok(SolverResult::Unknown(extract_unknown_reason(stdout, stderr))),
        "timeout" => Ok(SolverResult::Unknown("timeout".to_string())),
        _ if first_line.starts_with("(error") => Err(SolverError::ProcessError(
            first_line.trim_start_matches("(error").trim_end_matches(')').trim().to_string(),
        )),
        _ => Err(SolverError::ParseError(format!(
            "Unexpected solver output: {first_line}"
        ))),
    }
}

fn extract_unknown_reason(stdout: &str, stderr: &str) -> String {
    let after_unknown = stdout
        .lines()
        .skip_while(|line| line.trim() != "unknown")
        .skip(1)
        .map(str::trim)
        .find(|line| !line.is_empty());

    if let Some(reason) = after_unknown {
        reason
            .trim_start_matches('(')
            .trim_end_matches(')')
            .to_string()
    } else if !stderr.trim().is_empty() {
        stderr.trim().to_string()
    } else {
        "unknown".to_string()
    }
}

/// Collect every nullary `define-fun` of the model block.
///
/// Both `(model (define-fun ...))` and the bare `((define-fun ...))` layouts
/// are accepted.
fn parse_model(output: &str) -> Result<Option<Model>, SolverError> {
    let mut assignments = Vec::new();
    let mut pos = 0;

    while let Some(offset) = output[pos..].find("(define-fun ") {
        let start = pos + offset;
        let end = find_sexp_end(output, start).ok_or_else(|| {
            SolverError::ParseError("unbalanced parentheses in model".to_string())
        })?;
        // Body excludes `(define-fun ` and the closing `)`
        let body = &output[start + "(define-fun ".len()..end - 1];
        if let Some(pair) = parse_define_fun(body) {
            assignments.push(pair);
        }
        pos = end;
    }

    if assignments.is_empty() {
        Ok(None)
    } else {
        Ok(Some(Model::with_assignments(assignments)))
    }
}

/// Index just past the `)` matching the `(` at `start`.
fn find_sexp_end(input: &str, start: usize) -> Option<usize> {
    let bytes = input.as_bytes();
    if bytes.get(start) != Some(&b'(') {
        return None;
    }
    let mut depth = 0usize;
    for (i, b) in bytes.iter().enumerate().skip(start) {
        match b {
            b'(' => depth += 1,
            b')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
    }
    None
}

/// Parse `name () Sort value`; functions with parameters yield `None`.
fn parse_define_fun(input: &str) -> Option<(String, String)> {
    let normalized = input.split_whitespace().collect::<Vec<_>>().join(" ");
    let (name, rest) = normalized.split_once(' ')?;
    let rest = rest.trim_start().strip_prefix("()")?.trim_start();
    let (_sort, value) = rest.split_once(' ')?;
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    Some((name.to_string(), value.to_string()))
}
