//! Word error rate report for a transcription against its reference.
//!
//! Usage: `cargo run --example wer_report -- [tokenizer]` where `tokenizer` is one of
//! `simple` (default), `whitespace`, `character`. Set `RUST_LOG=debug` to see the
//! library's tracing events.

use tokedit::{levenshtein_text, Heatmap, Operation, TokenizerConfig, TokenizerKind};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let kind: TokenizerKind = match std::env::args().nth(1) {
        Some(name) => name.parse()?,
        None => TokenizerKind::default(),
    };
    let config = TokenizerConfig::new().with_kind(kind).lowercase(true);

    let reference = "The quick brown fox jumps over the lazy dog.";
    let hypothesis = "the quick brown fox jumped over a lazy dog";

    let res = levenshtein_text(reference, hypothesis, &config)?;
    let c = res.counters();

    println!("tokenizer : {kind}");
    println!("reference : {reference}");
    println!("hypothesis: {hypothesis}");
    println!();
    println!("distance  : {}", res.distance());
    println!(
        "S={} I={} D={} C={}  WER={:.3}",
        c.substitutions,
        c.insertions,
        c.deletions,
        c.correct,
        res.error_rate()
    );
    println!();

    for step in res.alignment() {
        let r = step.reference.map_or("-", |i| res.reference()[i].as_str());
        let h = step.hypothesis.map_or("-", |j| res.hypothesis()[j].as_str());
        let tag = match step.operation {
            Operation::Correct => ' ',
            Operation::Substitution => 'S',
            Operation::Insertion => 'I',
            Operation::Deletion => 'D',
        };
        println!("  {tag} {r:>10} | {h}");
    }
    println!();

    print!("{}", Heatmap::new(&res).with_shading(true));
    Ok(())
}
