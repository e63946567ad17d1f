use super::TraceArgs;
use crate::prompts::{build_trace, read_trace, write_trace, TraceSpec};
use eyre::WrapErr;
use tracing::info;

pub fn execute(args: TraceArgs) -> eyre::Result<()> {
    let prompts = read_trace(&args.input)
        .wrap_err_with(|| format!("failed to read trace {}", args.input.display()))?;

    let spec = TraceSpec {
        n_unique: args.unique,
        repeats: args.repeats,
        total: args.total,
        seed: args.seed,
    };
    let trace = build_trace(&prompts, &spec)?;
    write_trace(&args.output, &trace)?;

    info!(
        count = trace.len(),
        unique = spec.n_unique,
        path = %args.output.display(),
        "saved repeated trace"
    );
    Ok(())
}
