use std::fmt::Write as _;

use prngbench_core::{NormalSample, ScaleRange, Sequence};
use serde::Serialize;

use super::{GeneratorArgs, fail, parse_range};

pub struct GenerateCommandConfig<'a> {
    pub generator: &'a GeneratorArgs,
    pub lower: Option<f64>,
    pub upper: Option<f64>,
    pub normal_mean: Option<f64>,
    pub normal_std: Option<f64>,
    pub format: &'a str,
    pub output_path: Option<&'a str>,
}

pub fn run(config: GenerateCommandConfig<'_>) {
    let range = parse_range(config.lower, config.upper).unwrap_or_else(|e| fail(e));
    let normal_params = match (config.normal_mean, config.normal_std) {
        (None, None) => None,
        (mean, std) => Some((mean.unwrap_or(0.0), std.unwrap_or(1.0))),
    };

    let sequence = build(config.generator, range).unwrap_or_else(|e| fail(e));
    let normal = normal_params.map(|(mean, std_dev)| {
        prngbench_core::normal(&sequence.values(), mean, std_dev).unwrap_or_else(|e| fail(e))
    });

    let rendered = match config.format {
        "csv" => render_csv(&sequence),
        "json" => render_json(&sequence, normal.as_deref()).unwrap_or_else(|e| fail(e)),
        _ => render_table(&sequence, normal.as_deref()),
    };

    match config.output_path {
        Some(path) => {
            if let Err(e) = std::fs::write(path, &rendered) {
                fail(format!("failed to write {path}: {e}"));
            }
            println!("Wrote {} values to {path}", sequence.len());
        }
        None => print!("{rendered}"),
    }

    if let Some(degeneracy) = sequence.degeneracy {
        eprintln!(
            "Notice: sequence stopped after {} of {} values: {degeneracy}",
            sequence.len(),
            sequence.requested
        );
    }
}

/// Generate from CLI flags, optionally scaling into `range`.
pub fn build(args: &GeneratorArgs, range: Option<ScaleRange>) -> Result<Sequence, String> {
    let params = args.to_parameters()?;
    let mut sequence = prngbench_core::generate(&params, args.count).map_err(|e| e.to_string())?;
    if let Some(range) = range {
        sequence.scale_into(range).map_err(|e| e.to_string())?;
    }
    Ok(sequence)
}

pub fn render_table(sequence: &Sequence, normal: Option<&[NormalSample]>) -> String {
    let traced = sequence.records.iter().any(|r| r.trace.is_some());
    let scaled = sequence.records.iter().any(|r| r.ni.is_some());

    let mut out = String::new();
    let mut header = format!("{:>6} {:>20}", "i", "Xi");
    if traced {
        let _ = write!(header, " {:>26} {:>6} {:>8}", "Xi^2", "digits", "extract");
    }
    let _ = write!(header, " {:>8}", "Ri");
    if scaled {
        let _ = write!(header, " {:>12}", "Ni");
    }
    let _ = writeln!(out, "{header}");
    let _ = writeln!(out, "{}", "-".repeat(header.len()));

    for r in &sequence.records {
        let _ = write!(out, "{:>6} {:>20}", r.index, r.xi);
        if traced {
            match r.trace {
                Some(t) => {
                    let _ = write!(out, " {:>26} {:>6} {:>8}", t.square, t.digits, t.extracted);
                }
                None => {
                    let _ = write!(out, " {:>26} {:>6} {:>8}", "", "", "");
                }
            }
        }
        let _ = write!(out, " {:>8.5}", r.ri);
        if let Some(ni) = r.ni {
            let _ = write!(out, " {ni:>12.5}");
        }
        out.push('\n');
    }

    if let Some(samples) = normal {
        let _ = writeln!(out, "\n{:>6} {:>12} {:>12}", "i", "Z", "value");
        for s in samples {
            let _ = writeln!(out, "{:>6} {:>12.5} {:>12.5}", s.index, s.z, s.value);
        }
    }
    out
}

pub fn render_csv(sequence: &Sequence) -> String {
    let scaled = sequence.records.iter().any(|r| r.ni.is_some());
    let mut out = String::from(if scaled { "i,xi,ri,ni\n" } else { "i,xi,ri\n" });
    for r in &sequence.records {
        let _ = write!(out, "{},{},{}", r.index, r.xi, r.ri);
        if let Some(ni) = r.ni {
            let _ = write!(out, ",{ni}");
        }
        out.push('\n');
    }
    out
}

#[derive(Serialize)]
struct GenerateOutput<'a> {
    sequence: &'a Sequence,
    #[serde(skip_serializing_if = "Option::is_none")]
    normal: Option<&'a [NormalSample]>,
}

pub fn render_json(
    sequence: &Sequence,
    normal: Option<&[NormalSample]>,
) -> Result<String, serde_json::Error> {
    let mut json = serde_json::to_string_pretty(&GenerateOutput { sequence, normal })?;
    json.push('\n');
    Ok(json)
}
