//! The `run` command: load a JSON syntax tree and evaluate it.

use std::io::BufRead;
use std::str::FromStr;
use std::time::Duration;

use sable_diagnostic::emitter::{
    ColorMode, DiagnosticEmitter, SourceFile, TerminalEmitter, Verbosity,
};
use sable_diagnostic::span_utils::span_to_line_col;
use sable_eval::{
    stdout_handler, EvalError, EvalResult, LanguageLevel, Machine, MachineConfig, Run,
    SharedPrintHandler, SpanBreakpoints, Suspended, Value,
};
use sable_ir::Ast;

use super::read_file;
use crate::{eval_error_to_diagnostic, init_tracing, load_ast};

/// Flags accepted by `sable run`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunOptions {
    pub max_depth: Option<usize>,
    pub steps: Option<u64>,
    pub timeout: Option<Duration>,
    /// Host-language semantics instead of runtime type checks.
    pub native: bool,
    pub verbose: bool,
    /// Statement start offsets to pause at.
    pub breakpoints: Vec<u32>,
    pub trace_tree: bool,
    /// The source file the tree was parsed from, for `line:col` locations.
    pub source: Option<String>,
}

impl RunOptions {
    pub fn machine_config(&self) -> MachineConfig {
        let mut config = MachineConfig::default();
        if let Some(depth) = self.max_depth {
            config.max_call_depth = depth;
        }
        config.step_limit = self.steps;
        config.time_limit = self.timeout;
        if self.native {
            config.language = LanguageLevel::Native;
        }
        config
    }
}

/// What to do at a breakpoint.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PauseAction {
    Continue,
    Abort,
}

/// Parse the arguments after `run`: the tree path and any flags, as
/// `--flag value` or `--flag=value`.
pub fn parse_run_args(args: &[String]) -> Result<(String, RunOptions), String> {
    let mut options = RunOptions::default();
    let mut path = None;
    let mut rest = args.iter();

    while let Some(arg) = rest.next() {
        let (flag, inline) = match arg.split_once('=') {
            Some((flag, value)) if flag.starts_with("--") => (flag, Some(value)),
            _ => (arg.as_str(), None),
        };
        let mut value = || -> Result<String, String> {
            match inline {
                Some(value) => Ok(value.to_string()),
                None => rest
                    .next()
                    .cloned()
                    .ok_or_else(|| format!("{flag} expects a value")),
            }
        };
        match flag {
            "--native" => options.native = true,
            "--verbose" | "-v" => options.verbose = true,
            "--trace-tree" => options.trace_tree = true,
            "--max-depth" => options.max_depth = Some(number(flag, &value()?)?),
            "--steps" => options.steps = Some(number(flag, &value()?)?),
            "--timeout-ms" => {
                options.timeout = Some(Duration::from_millis(number(flag, &value()?)?));
            }
            "--break" => options.breakpoints.push(number(flag, &value()?)?),
            "--source" => options.source = Some(value()?),
            _ if flag.starts_with('-') => return Err(format!("unknown option '{flag}'")),
            _ if path.is_none() => path = Some(arg.clone()),
            _ => return Err(format!("unexpected argument '{arg}'")),
        }
    }

    let path = path.ok_or_else(|| "missing syntax tree path".to_string())?;
    Ok((path, options))
}

fn number<T: FromStr>(flag: &str, value: &str) -> Result<T, String> {
    value
        .parse()
        .map_err(|_| format!("{flag} expects a non-negative integer, got '{value}'"))
}

/// Evaluate `ast`, asking `on_pause` what to do at every breakpoint.
///
/// Returns `Ok(None)` when `on_pause` aborts the run.
pub fn evaluate(
    ast: &Ast,
    options: &RunOptions,
    print: SharedPrintHandler,
    mut on_pause: impl FnMut(&Suspended<'_>) -> PauseAction,
) -> EvalResult<Option<Value>> {
    let mut builder = Machine::builder()
        .config(options.machine_config())
        .print_handler(print);
    if !options.breakpoints.is_empty() {
        builder = builder.breakpoints(SpanBreakpoints::new(options.breakpoints.iter().copied()));
    }

    let mut run = builder.build(ast).start()?;
    loop {
        match run {
            Run::Finished(value) => return Ok(Some(value)),
            Run::Paused(suspended) => match on_pause(&suspended) {
                PauseAction::Continue => run = suspended.resume()?,
                PauseAction::Abort => {
                    tracing::debug!(node = ?suspended.node(), "run aborted at breakpoint");
                    return Ok(None);
                }
            },
        }
    }
}

/// Run a syntax tree file, printing the result or a diagnostic.
pub fn run_file(path: &str, options: &RunOptions) {
    init_tracing(options.trace_tree);

    let json = read_file(path);
    let ast = match load_ast(&json) {
        Ok(ast) => ast,
        Err(e) => {
            eprintln!("error: {path}: {e}");
            std::process::exit(1);
        }
    };
    let source = options
        .source
        .as_deref()
        .map(|source_path| SourceFile::new(source_path, read_file(source_path)));

    let result = evaluate(&ast, options, stdout_handler(), |suspended| {
        prompt(suspended, source.as_ref())
    });
    match result {
        Ok(Some(value)) => println!("{}", value.stringify()),
        Ok(None) => {}
        Err(err) => {
            report(&err, options.verbose, source);
            std::process::exit(1);
        }
    }
}

/// Print where execution stopped and wait for `c` (continue) or `q` (quit).
/// End of input continues.
fn prompt(suspended: &Suspended<'_>, source: Option<&SourceFile>) -> PauseAction {
    let span = suspended.span();
    let location = match source {
        Some(source) => {
            let (line, col) = span_to_line_col(&source.text, span);
            format!("{}:{line}:{col}", source.path)
        }
        None => format!("offset {span}"),
    };
    eprintln!("paused at {location} (c: continue, q: quit)");

    let mut stdin = std::io::stdin().lock();
    let mut line = String::new();
    loop {
        line.clear();
        match stdin.read_line(&mut line) {
            Ok(0) | Err(_) => return PauseAction::Continue,
            Ok(_) => match line.trim() {
                "c" | "continue" => return PauseAction::Continue,
                "q" | "quit" => return PauseAction::Abort,
                _ => eprintln!("type c to continue or q to quit"),
            },
        }
    }
}

fn report(err: &EvalError, verbose: bool, source: Option<SourceFile>) {
    let is_tty = std::io::IsTerminal::is_terminal(&std::io::stderr());
    let verbosity = if verbose {
        Verbosity::Verbose
    } else {
        Verbosity::Terse
    };
    let mut emitter = TerminalEmitter::stderr(ColorMode::Auto, is_tty).verbosity(verbosity);
    if let Some(source) = source {
        emitter = emitter.source(source);
    }
    emitter.emit(&eval_error_to_diagnostic(err));
    emitter.flush();
}
