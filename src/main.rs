use std::path::PathBuf;

use clap::Parser;
use exam_session::Exam;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// JSON file with the exam definition and its questions
    #[arg(short, long)]
    exam: PathBuf,

    /// JSON file used to persist attempt records and history
    #[arg(short, long, default_value = "results.json")]
    store: PathBuf,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let exam = Exam::from_json(&args.exam).expect("Failed to load exam");

    if let Err(e) = exam.run(&args.store).await {
        eprintln!("Error running exam: {}", e);
        std::process::exit(1);
    }
}
