use std::collections::BTreeMap;
use std::env;
use std::time::Instant;

use markov_filter::{Hmm, HmmBuilder};
use sysinfo::{get_current_pid, ProcessRefreshKind, System};

fn main() {
    let options = match Options::parse(env::args().skip(1)) {
        Ok(opts) => opts,
        Err(err) => {
            eprintln!("hmm_probe: {err}");
            Options::print_help();
            std::process::exit(2);
        }
    };

    let hmm = match demo_hmm() {
        Ok(hmm) => hmm,
        Err(err) => {
            eprintln!("hmm_probe: {err}");
            std::process::exit(1);
        }
    };

    eprintln!("\n{}", "=".repeat(80));
    eprintln!("HMM inference probe");
    eprintln!("{}", "=".repeat(80));
    eprintln!("  verify limit: {}", options.verify_limit);
    eprintln!("  status: 'passed' = matches baseline, 'not_checked' = above verify limit");
    eprintln!();

    let mut sys = System::new();
    let mut measurements = Vec::new();

    eprintln!("[1/3] Forward and backward filtering...");
    measurements.extend(run_filters(&hmm, &options, &mut sys));
    eprintln!();

    eprintln!("[2/3] Smoothing sweep...");
    measurements.extend(run_smoothing(&hmm, &options, &mut sys));
    eprintln!();

    eprintln!("[3/3] Viterbi decoding...");
    measurements.extend(run_viterbi(&hmm, &options, &mut sys));
    eprintln!();

    print_summary(&measurements);

    if let Err(err) = options.format.write(&measurements) {
        eprintln!("hmm_probe output error: {err}");
        std::process::exit(1);
    }
}

struct Options {
    format: OutputFormat,
    verify_limit: usize,
}

impl Options {
    fn parse<I, T>(mut args: I) -> Result<Self, String>
    where
        I: Iterator<Item = T>,
        T: Into<String>,
    {
        let mut format = OutputFormat::Csv;
        let mut verify_limit = 4096usize;

        while let Some(arg) = args.next() {
            let arg = arg.into();
            if arg == "--help" || arg == "-h" {
                Options::print_help();
                std::process::exit(0);
            } else if let Some(value) = arg.strip_prefix("--format=") {
                format = OutputFormat::from_str(value)?;
            } else if arg == "--format" {
                let value = args
                    .next()
                    .ok_or_else(|| "missing value after --format".to_string())?
                    .into();
                format = OutputFormat::from_str(&value)?;
            } else if let Some(value) = arg.strip_prefix("--verify-limit=") {
                verify_limit = parse_limit(value)?;
            } else if arg == "--verify-limit" {
                let value = args
                    .next()
                    .ok_or_else(|| "missing value after --verify-limit".to_string())?
                    .into();
                verify_limit = parse_limit(&value)?;
            } else {
                return Err(format!("unrecognized argument '{arg}'"));
            }
        }

        Ok(Self {
            format,
            verify_limit,
        })
    }

    fn print_help() {
        println!(
            "\
Usage: cargo run --bin hmm_probe [-- <options>]

Options:
  --format <csv|table|json>     Output format (default: csv)
  --verify-limit <N>            Longest observation sequence checked against a baseline (default: 4096)
  -h, --help                    Print this help message
"
        );
    }
}

fn parse_limit(value: &str) -> Result<usize, String> {
    value
        .parse::<usize>()
        .map_err(|_| "verify limit must be a positive integer".to_string())
}

#[derive(Copy, Clone)]
enum OutputFormat {
    Csv,
    Table,
    Json,
}

impl OutputFormat {
    fn from_str(value: &str) -> Result<Self, String> {
        match value {
            "csv" => Ok(Self::Csv),
            "table" => Ok(Self::Table),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown format '{other}'")),
        }
    }

    fn write(self, measurements: &[Measurement]) -> Result<(), String> {
        match self {
            OutputFormat::Csv => write_csv(measurements),
            OutputFormat::Table => write_table(measurements),
            OutputFormat::Json => write_json(measurements),
        }
    }
}

struct Measurement {
    scenario: &'static str,
    size_desc: String,
    wall_s: f64,
    rss_delta_kib: u64,
    verification_status: VerificationStatus,
    verification_detail: Option<String>,
}

#[derive(Clone, Copy)]
enum VerificationStatus {
    NotChecked,
    Passed,
    Failed,
}

impl VerificationStatus {
    fn label(&self) -> &'static str {
        match self {
            VerificationStatus::NotChecked => "not_checked",
            VerificationStatus::Passed => "passed",
            VerificationStatus::Failed => "failed",
        }
    }

    fn icon(&self) -> &'static str {
        match self {
            VerificationStatus::Passed => "✓",
            VerificationStatus::Failed => "✗",
            VerificationStatus::NotChecked => "○",
        }
    }
}

type Verification = (VerificationStatus, Option<String>);

fn run_filters(hmm: &Hmm, options: &Options, sys: &mut System) -> Vec<Measurement> {
    const LENGTHS: &[usize] = &[1024, 4096, 16384, 65536, 262144];
    LENGTHS
        .iter()
        .map(|&len| {
            eprint!("      obs_len {len}... ");
            let m = measure("filter", format!("obs_len={len}"), sys, || {
                let observations = alternating_observations(len);
                let forward = hmm.filter(&observations);
                let backward = hmm.back_filter(&observations);
                let (forward, backward) = match (forward, backward) {
                    (Ok(f), Ok(b)) => (f, b),
                    (Err(err), _) | (_, Err(err)) => {
                        return (VerificationStatus::Failed, Some(err.to_string()))
                    }
                };
                if len > options.verify_limit {
                    return (VerificationStatus::NotChecked, None);
                }
                let expected_fwd = reference_forward(hmm, &observations);
                let expected_bwd = reference_backward(hmm, &observations);
                compare_filters(
                    forward.as_slice(),
                    backward.as_slice(),
                    &expected_fwd,
                    &expected_bwd,
                )
            });
            report(&m);
            m
        })
        .collect()
}

fn run_smoothing(hmm: &Hmm, options: &Options, sys: &mut System) -> Vec<Measurement> {
    const LENGTHS: &[usize] = &[64, 256, 1024, 2048];
    LENGTHS
        .iter()
        .map(|&len| {
            eprint!("      obs_len {len}... ");
            let m = measure("smooth_all", format!("obs_len={len}"), sys, || {
                let observations = alternating_observations(len);
                let all = match hmm.smooth_all(&observations) {
                    Ok(all) => all,
                    Err(err) => return (VerificationStatus::Failed, Some(err.to_string())),
                };
                if len > options.verify_limit {
                    return (VerificationStatus::NotChecked, None);
                }
                let worst = all
                    .iter()
                    .map(|d| (d.sum() - 1.0).abs())
                    .fold(0.0f64, f64::max);
                if all.len() == len + 1 && worst <= 1e-9 {
                    (VerificationStatus::Passed, None)
                } else {
                    (
                        VerificationStatus::Failed,
                        Some(format!("count={}, worst sum err={worst:e}", all.len())),
                    )
                }
            });
            report(&m);
            m
        })
        .collect()
}

fn run_viterbi(hmm: &Hmm, options: &Options, sys: &mut System) -> Vec<Measurement> {
    const LENGTHS: &[usize] = &[64, 256, 1024, 4096, 16384, 65536];
    LENGTHS
        .iter()
        .map(|&len| {
            eprint!("      obs_len {len}... ");
            let m = measure("viterbi", format!("obs_len={len}"), sys, || {
                let observations = alternating_observations(len);
                let path = match hmm.viterbi(&observations) {
                    Ok(path) => path,
                    Err(err) => return (VerificationStatus::Failed, Some(err.to_string())),
                };
                if len > options.verify_limit {
                    return (VerificationStatus::NotChecked, None);
                }
                let baseline = viterbi_baseline(hmm, &observations);
                let logp = path_log_probability(hmm, &path, &observations);
                if path.len() == len && (logp - baseline).abs() <= 1e-6 * baseline.abs().max(1.0) {
                    (VerificationStatus::Passed, None)
                } else {
                    (
                        VerificationStatus::Failed,
                        Some(format!(
                            "baseline logp={baseline:.6}, got={logp:.6}, path_len={}",
                            path.len()
                        )),
                    )
                }
            });
            report(&m);
            m
        })
        .collect()
}

fn report(m: &Measurement) {
    eprintln!(
        "{} time={:.3}s, rss_delta={} KiB, status={}",
        m.verification_status.icon(),
        m.wall_s,
        m.rss_delta_kib,
        m.verification_status.label()
    );
}

fn print_summary(measurements: &[Measurement]) {
    eprintln!("{}", "=".repeat(80));
    eprintln!("Summary");
    eprintln!("{}", "=".repeat(80));

    let mut by_scenario: BTreeMap<&str, Vec<&Measurement>> = BTreeMap::new();
    for m in measurements {
        by_scenario.entry(m.scenario).or_default().push(m);
    }
    for (scenario, ms) in &by_scenario {
        let failed = ms
            .iter()
            .filter(|m| matches!(m.verification_status, VerificationStatus::Failed))
            .count();
        let max_time = ms.iter().map(|m| m.wall_s).fold(0.0, f64::max);
        let max_mem = ms.iter().map(|m| m.rss_delta_kib).max().unwrap_or(0);
        eprintln!(
            "  {scenario}: runs={}, failed={failed}, max_time={max_time:.3}s, max_rss_delta={max_mem} KiB",
            ms.len()
        );
        for m in ms {
            if let Some(detail) = &m.verification_detail {
                eprintln!("    ✗ {}: {detail}", m.size_desc);
            }
        }
    }
    eprintln!();
}

fn measure<F>(scenario: &'static str, size_desc: String, sys: &mut System, compute: F) -> Measurement
where
    F: FnOnce() -> Verification,
{
    let before = rss_kib(sys);
    let start = Instant::now();
    let (status, detail) = compute();
    let duration = start.elapsed();
    let after = rss_kib(sys);

    Measurement {
        scenario,
        size_desc,
        wall_s: duration.as_secs_f64(),
        rss_delta_kib: after.saturating_sub(before),
        verification_status: status,
        verification_detail: detail,
    }
}

fn write_csv(measurements: &[Measurement]) -> Result<(), String> {
    println!("scenario,size_desc,wall_s,rss_delta_kib,verification_status,verification_detail");
    for m in measurements {
        let detail = m
            .verification_detail
            .as_ref()
            .map(|s| s.replace('"', "'"))
            .unwrap_or_default();
        println!(
            "{},{},{:.3},{},{},\"{}\"",
            m.scenario,
            m.size_desc,
            m.wall_s,
            m.rss_delta_kib,
            m.verification_status.label(),
            detail
        );
    }
    Ok(())
}

fn write_table(measurements: &[Measurement]) -> Result<(), String> {
    let col1 = measurements
        .iter()
        .map(|m| m.scenario.len())
        .fold("scenario".len(), usize::max);
    let col2 = measurements
        .iter()
        .map(|m| m.size_desc.len())
        .fold("size".len(), usize::max);

    println!(
        "{:<col1$}  {:<col2$}  {:>10}  {:>14}  {:>12}  detail",
        "scenario", "size", "wall_s", "rss_delta_kib", "status"
    );
    println!(
        "{:-<col1$}  {:-<col2$}  {:-<10}  {:-<14}  {:-<12}  {:-<6}",
        "", "", "", "", "", ""
    );
    for m in measurements {
        println!(
            "{:<col1$}  {:<col2$}  {:>10.3}  {:>14}  {:>12}  {}",
            m.scenario,
            m.size_desc,
            m.wall_s,
            m.rss_delta_kib,
            m.verification_status.label(),
            m.verification_detail.as_deref().unwrap_or("")
        );
    }
    Ok(())
}

fn write_json(measurements: &[Measurement]) -> Result<(), String> {
    println!("[");
    for (idx, m) in measurements.iter().enumerate() {
        let detail = match &m.verification_detail {
            Some(d) => format!("\"{}\"", d.replace('"', "'")),
            None => "null".to_string(),
        };
        println!(
            "  {{\"scenario\":\"{}\",\"size\":\"{}\",\"wall_s\":{:.3},\"rss_delta_kib\":{},\"verification\":{{\"status\":\"{}\",\"detail\":{}}}}}{}",
            m.scenario,
            m.size_desc,
            m.wall_s,
            m.rss_delta_kib,
            m.verification_status.label(),
            detail,
            if idx + 1 == measurements.len() { "" } else { "," }
        );
    }
    println!("]");
    Ok(())
}

fn rss_kib(sys: &mut System) -> u64 {
    sys.refresh_processes_specifics(ProcessRefreshKind::new());
    if let Some(process) = get_current_pid().ok().and_then(|pid| sys.process(pid)) {
        process.memory() / 1024
    } else {
        0
    }
}

fn demo_hmm() -> markov_filter::Result<Hmm> {
    HmmBuilder::new()
        .with_transition(vec![vec![0.9, 0.1], vec![0.2, 0.8]])
        .with_sensor(vec![vec![0.8, 0.2], vec![0.3, 0.7]])
        .require_stochastic(1e-12)
        .build()
}

fn alternating_observations(len: usize) -> Vec<usize> {
    (0..len).map(|i| (i / 3) % 2).collect()
}

fn max_abs_diff(a: &[f64], b: &[f64]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| (x - y).abs())
        .fold(0.0, f64::max)
}

fn compare_filters(
    forward: &[f64],
    backward: &[f64],
    expected_fwd: &[f64],
    expected_bwd: &[f64],
) -> Verification {
    let fwd_err = max_abs_diff(forward, expected_fwd);
    let bwd_err = max_abs_diff(backward, expected_bwd);
    if forward.len() == expected_fwd.len()
        && backward.len() == expected_bwd.len()
        && fwd_err <= 1e-9
        && bwd_err <= 1e-9
    {
        (VerificationStatus::Passed, None)
    } else {
        (
            VerificationStatus::Failed,
            Some(format!("forward err={fwd_err:e}, backward err={bwd_err:e}")),
        )
    }
}

/// Rescale only once every entry drops below this.
const UNDERFLOW_GUARD: f64 = 1e-200;

fn rescale(v: &mut [f64]) {
    let total: f64 = v.iter().sum();
    for x in v.iter_mut() {
        *x /= total;
    }
}

/// Forward recursion over raw matrix entries, rescaled only near underflow.
fn reference_forward(hmm: &Hmm, obs: &[usize]) -> Vec<f64> {
    let (t, s) = (hmm.transition(), hmm.sensor());
    let n = hmm.n_states();
    let mut alpha = vec![1.0 / n as f64; n];
    for &e in obs {
        alpha = (0..n)
            .map(|i| (0..n).map(|j| t[j][i] * alpha[j]).sum::<f64>() * s[i][e])
            .collect();
        if alpha.iter().all(|&v| v < UNDERFLOW_GUARD) {
            rescale(&mut alpha);
        }
    }
    rescale(&mut alpha);
    alpha
}

/// Backward recursion over raw matrix entries, rescaled only near underflow.
fn reference_backward(hmm: &Hmm, obs: &[usize]) -> Vec<f64> {
    let (t, s) = (hmm.transition(), hmm.sensor());
    let n = hmm.n_states();
    let mut beta = vec![1.0 / n as f64; n];
    for &e in obs.iter().rev() {
        beta = (0..n)
            .map(|i| (0..n).map(|j| t[i][j] * beta[j] * s[j][e]).sum())
            .collect();
        if beta.iter().all(|&v| v < UNDERFLOW_GUARD) {
            rescale(&mut beta);
        }
    }
    rescale(&mut beta);
    beta
}

/// Log-probability of `path` under a flat prior, without any rescaling.
fn path_log_probability(hmm: &Hmm, path: &[usize], obs: &[usize]) -> f64 {
    let (t, s) = (hmm.transition(), hmm.sensor());
    let n = hmm.n_states() as f64;
    let mut logp = -n.ln();
    for (k, (&state, &sym)) in path.iter().zip(obs).enumerate() {
        if k > 0 {
            logp += t[path[k - 1]][state].ln();
        }
        logp += s[state][sym].ln();
    }
    logp
}

/// Best-path log-probability from a log-space full-table Viterbi.
fn viterbi_baseline(hmm: &Hmm, obs: &[usize]) -> f64 {
    if obs.is_empty() {
        return 0.0;
    }
    let (t, s) = (hmm.transition(), hmm.sensor());
    let n = hmm.n_states();
    let mut prev: Vec<f64> = (0..n)
        .map(|state| -(n as f64).ln() + s[state][obs[0]].ln())
        .collect();
    for &sym in &obs[1..] {
        prev = (0..n)
            .map(|to| {
                let best = (0..n)
                    .map(|from| prev[from] + t[from][to].ln())
                    .fold(f64::NEG_INFINITY, f64::max);
                best + s[to][sym].ln()
            })
            .collect();
    }
    prev.into_iter().fold(f64::NEG_INFINITY, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_recursions_agree_with_filters() {
        let hmm = demo_hmm().unwrap();
        for len in [0, 1, 5, 2000] {
            let obs = alternating_observations(len);
            let forward = hmm.filter(&obs).unwrap();
            let backward = hmm.back_filter(&obs).unwrap();
            let (status, detail) = compare_filters(
                forward.as_slice(),
                backward.as_slice(),
                &reference_forward(&hmm, &obs),
                &reference_backward(&hmm, &obs),
            );
            assert!(
                matches!(status, VerificationStatus::Passed),
                "len={len}: {detail:?}"
            );
        }
    }

    #[test]
    fn filter_check_flags_wrong_beliefs() {
        let hmm = demo_hmm().unwrap();
        let obs = alternating_observations(12);
        let forward = hmm.filter(&obs).unwrap();
        let backward = hmm.back_filter(&obs).unwrap();
        let expected_fwd = reference_forward(&hmm, &obs);
        let expected_bwd = reference_backward(&hmm, &obs);

        let (status, _) = compare_filters(
            &[0.5, 0.5],
            backward.as_slice(),
            &expected_fwd,
            &expected_bwd,
        );
        assert!(matches!(status, VerificationStatus::Failed));

        // Swapping the directions must not pass either.
        let (status, detail) = compare_filters(
            backward.as_slice(),
            forward.as_slice(),
            &expected_fwd,
            &expected_bwd,
        );
        assert!(matches!(status, VerificationStatus::Failed));
        assert!(detail.is_some());
    }

    #[test]
    fn viterbi_path_reaches_baseline() {
        let hmm = demo_hmm().unwrap();
        let obs = alternating_observations(30);
        let path = hmm.viterbi(&obs).unwrap();
        let baseline = viterbi_baseline(&hmm, &obs);
        assert!((path_log_probability(&hmm, &path, &obs) - baseline).abs() < 1e-9);
    }
}
