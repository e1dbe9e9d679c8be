//! sasplus: goal-relevance scoping for finite-domain (SAS+) planning tasks.

use std::path::PathBuf;

use argh::FromArgs;

use sasplus_opt::{scope, IterationStats, ScopingOptions, ScopingReport};
use sasplus_utils::{OutputFile, SasResult};

#[derive(FromArgs)]
#[argh(help_triggers("-h", "--help"))]
/// Scope a SAS+ planning task down to what the goal actually depends on.
pub struct Opts {
    /// input SAS+ file
    #[argh(positional)]
    pub file: PathBuf,

    /// write the scoped task next to the input under a `_scoped` suffix
    #[argh(switch, long = "write-scoped")]
    pub write_scoped: bool,

    /// write the scoped task to this path instead (or `-`/`<err>`/`<null>`);
    /// implies `--write-scoped`
    #[argh(option, long = "output", short = 'o')]
    pub output: Option<OutputFile>,

    /// disable action merging
    #[argh(switch, long = "disable-merging")]
    pub disable_merging: bool,

    /// disable the causal-link filter
    #[argh(switch, long = "disable-causal-links")]
    pub disable_causal_links: bool,

    /// operate at variable granularity instead of fact granularity
    #[argh(switch, long = "variables-only")]
    pub variables_only: bool,

    /// disable the forward reachability pass
    #[argh(switch, long = "disable-forward-pass")]
    pub disable_forward_pass: bool,

    /// disable looping backward/forward to a fixed point
    #[argh(switch, long = "disable-loop")]
    pub disable_loop: bool,
}

impl Opts {
    fn scoping_options(&self) -> ScopingOptions {
        ScopingOptions {
            causal_links: !self.disable_causal_links,
            merging: !self.disable_merging,
            fact_based: !self.variables_only,
            forward_pass: !self.disable_forward_pass,
            loop_: !self.disable_loop,
            write_output_file: self.write_scoped && self.output.is_none(),
        }
    }
}

fn print_report(report: &ScopingReport) {
    for (i, stats) in report.iterations.iter().enumerate() {
        let IterationStats {
            variables_before,
            variables_after,
            facts_before,
            facts_after,
            operators_before,
            operators_after,
            merge_attempts,
        } = stats;
        println!(
            "iteration {}: {variables_before} -> {variables_after} variables, \
             {facts_before} -> {facts_after} facts, {operators_before} -> {operators_after} \
             operators, {merge_attempts} merge attempts",
            i + 1,
        );
    }
    if report.trivially_solved {
        println!("goal already satisfied in the initial state; task trivially solved");
    } else if report.infeasible {
        println!("goal unreachable; task is infeasible");
    }
    println!("total merge attempts: {}", report.total_merge_attempts());
}

fn run(opts: &Opts) -> SasResult<()> {
    let options = opts.scoping_options();

    let report = match &opts.output {
        None => sasplus_opt::scope_sas_file(&opts.file, options)?,
        Some(out) => {
            let text = std::fs::read_to_string(&opts.file)?;
            let sas_file = sasplus_frontend::parse(&text)?;
            let task = sasplus_frontend::to_task(&sas_file)?;
            let (scoped, report) = scope(&task, options)?;
            let scoped_file = sasplus_frontend::from_task(&scoped);
            use std::io::Write;
            out.get_write()?.write_all(sasplus_frontend::emit(&scoped_file).as_bytes())?;
            report
        }
    };

    print_report(&report);
    Ok(())
}

fn main() -> SasResult<()> {
    env_logger::Builder::new()
        .format_timestamp(None)
        .parse_default_env()
        .target(env_logger::Target::Stderr)
        .init();

    let opts: Opts = argh::from_env();
    run(&opts)
}
