//! Purpose: Hold top-level CLI command dispatch for `qcoerce`.
//! Exports: `dispatch_command`.
//! Role: Keep `main.rs` focused on parse/bootstrap and delegate command execution.
//! Invariants: Output is validated against the chosen undefined mode before anything is printed.
//! Invariants: Helpers in `main.rs` remain the source of emission and error formatting.

use super::*;

use query_coerce::json::{parse, to_json_with};
use query_coerce::{coerce, query};

pub(super) fn dispatch_command(command: Command, color_mode: ColorMode) -> Result<RunOutcome, Error> {
    match command {
        Command::Completion { shell } => {
            let mut cmd = Cli::command();
            clap_complete::aot::generate(shell, &mut cmd, "qcoerce", &mut io::stdout());
            Ok(RunOutcome::ok())
        }
        Command::Version => {
            emit_version_output(color_mode);
            Ok(RunOutcome::ok())
        }
        Command::Coerce {
            input,
            json,
            policy,
            undefined,
            pretty,
        } => {
            let raw = match input {
                Some(input) => input,
                None => read_stdin()?,
            };
            let tree = if json {
                let document: Value = parse::from_str(&raw, "coerce --json")?;
                from_json(document)
            } else {
                query::decode(&query_component(&raw)?)
            };
            let coerced = coerce(&tree, &Policy::from(policy))?;
            let mode = UndefinedMode::from(undefined);
            let rendered = to_json_with(&coerced, mode)
                .map_err(|err| err.with_hint("Use --undefined stringify or --undefined null."))?;
            emit_coerced(&coerced, &rendered, mode, pretty, color_mode);
            Ok(RunOutcome::ok())
        }
        Command::Serve {
            bind,
            allow_non_loopback,
            policy,
        } => {
            let bind = bind.parse().map_err(|err| {
                Error::new(ErrorKind::Usage)
                    .with_message(format!("invalid --bind address: {bind}"))
                    .with_hint("Use host:port, for example 127.0.0.1:9780.")
                    .with_source(err)
            })?;
            let config = serve::ServeConfig {
                bind,
                allow_non_loopback,
                policy: policy.into(),
            };
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()
                .map_err(|err| {
                    Error::new(ErrorKind::Internal)
                        .with_message("failed to start runtime")
                        .with_source(err)
                })?;
            runtime.block_on(serve::serve(config))?;
            Ok(RunOutcome::ok())
        }
    }
}
