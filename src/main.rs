mod arxiv;
mod classify;
mod config;
mod digest;
mod filter;
mod history;
mod llm;
mod report;

use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::{Local, NaiveTime, Utc};
use clap::Parser;
use dotenvy::dotenv;
use rand::seq::SliceRandom;
use rand::Rng;
use reqwest::blocking::Client;

use arxiv::Candidate;
use config::Config;
use llm::LlmClient;
use report::ReportRecord;

const HISTORY_FILENAME: &str = "paper_history.md";
const SOCIAL_POST_FILENAME: &str = "social_post.md";
const COVER_TEXT_FILENAME: &str = "cover_text.txt";
const SINGLE_REPORT_DIR: &str = "single_paper_reports";

/// Candidate pool cap before the per-paper classification calls.
const DOWNSAMPLE_CAP: usize = 20;
/// Classification stops early once this many relevant papers are collected.
const MAX_RELEVANT: usize = 50;
/// Crude self-imposed rate limit between classification calls.
const CLASSIFY_DELAY: Duration = Duration::from_secs(1);

const EMPTY_REPORT: &str = "# 📚 ArXiv Blockchain Paper Daily\n\nNo recommendation today.\n";
const NONE_RELEVANT_REPORT: &str =
    "# 📚 ArXiv Blockchain Paper Daily\n\nNo blockchain paper made the cut today.\n";

#[derive(Parser)]
#[command(name = "paper-daily", version, about = "Daily blockchain paper digest generator")]
struct Cli {
    /// YAML config file; missing fields fall back to the environment, then defaults.
    #[arg(long, default_value = "paper_daily.yml")]
    config: PathBuf,
    /// Keep running and execute the daily pipeline at the configured time.
    #[arg(long, conflicts_with = "arxiv_id")]
    schedule: bool,
    /// Generate a report for one paper given an arXiv id or abs URL.
    #[arg(long, value_name = "ID_OR_URL")]
    arxiv_id: Option<String>,
}

fn main() -> Result<()> {
    dotenv().ok();
    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;

    if let Some(id_or_url) = cli.arxiv_id.as_deref() {
        run_single(&config, id_or_url, Path::new("."))
    } else if cli.schedule {
        run_schedule(&config)
    } else {
        run_daily(&config, Path::new("."))
    }
}

fn http_client() -> Result<Client> {
    Client::builder()
        .user_agent("paper-daily/0.1")
        .build()
        .context("build http client")
}

fn run_daily(config: &Config, out_dir: &Path) -> Result<()> {
    println!("starting daily blockchain paper run...");
    let client = http_client()?;
    let llm = LlmClient::new(config)?;
    let candidates = arxiv::recent_candidates(&client, config, Utc::now());
    daily_report(config, &llm, candidates, &mut rand::thread_rng(), out_dir)
}

/// The Mode-A pipeline after retrieval: downsample, classify with a fixed
/// inter-call delay, select, digest, then write the report/history/social/
/// cover quartet. The two zero-result cases write a placeholder report and
/// end the run without touching the other files.
fn daily_report(
    config: &Config,
    llm: &LlmClient,
    candidates: Vec<Candidate>,
    rng: &mut impl Rng,
    out_dir: &Path,
) -> Result<()> {
    let report_path = out_dir.join(&config.output_filename);

    if candidates.is_empty() {
        println!("no candidate papers in the lookback window");
        fs::write(&report_path, EMPTY_REPORT)
            .with_context(|| format!("write report {}", report_path.display()))?;
        println!("placeholder report written to '{}'", report_path.display());
        return Ok(());
    }

    let pool = downsample(candidates, DOWNSAMPLE_CAP, rng);
    let total = pool.len();
    let mut relevant = Vec::new();
    for (i, paper) in pool.into_iter().enumerate() {
        if relevant.len() >= MAX_RELEVANT {
            break;
        }
        println!("classifying {}/{}: {}", i + 1, total, paper.title);
        if classify::is_relevant(llm, &paper.title, &paper.abstract_text) {
            println!(
                "relevant ({}/{}): {}",
                relevant.len() + 1,
                MAX_RELEVANT,
                paper.title
            );
            relevant.push(paper);
        }
        thread::sleep(CLASSIFY_DELAY);
    }

    if relevant.is_empty() {
        println!("no blockchain-related papers after classification");
        fs::write(&report_path, NONE_RELEVANT_REPORT)
            .with_context(|| format!("write report {}", report_path.display()))?;
        println!("placeholder report written to '{}'", report_path.display());
        return Ok(());
    }

    println!("{} relevant papers, selecting the best...", relevant.len());
    let selected = classify::select_best(llm, &relevant)?.clone();
    println!("selected: {}", selected.title);

    let record = build_record(llm, selected);
    let today = Local::now().date_naive();

    fs::write(&report_path, report::render_daily(&record, today))
        .with_context(|| format!("write report {}", report_path.display()))?;
    println!("report written to '{}'", report_path.display());

    let history_path = out_dir.join(HISTORY_FILENAME);
    history::append(&history_path, &record, today)?;
    println!("history appended to '{}'", history_path.display());

    let social_path = out_dir.join(SOCIAL_POST_FILENAME);
    fs::write(&social_path, report::render_social(&record))
        .with_context(|| format!("write social post {}", social_path.display()))?;
    println!("social post written to '{}'", social_path.display());

    let cover_path = out_dir.join(COVER_TEXT_FILENAME);
    fs::write(&cover_path, report::cover_text(&record))
        .with_context(|| format!("write cover text {}", cover_path.display()))?;
    println!("cover text written to '{}'", cover_path.display());

    Ok(())
}

/// Uniform random sample without replacement once the pool exceeds `cap`.
/// The random source is injected so tests can seed it.
fn downsample(mut pool: Vec<Candidate>, cap: usize, rng: &mut impl Rng) -> Vec<Candidate> {
    if pool.len() <= cap {
        return pool;
    }
    println!(
        "downsampling {} candidates to {} before classification",
        pool.len(),
        cap
    );
    pool.shuffle(rng);
    pool.truncate(cap);
    pool
}

/// Merges one candidate with its generated digest into the final record.
/// Venue comes from the arXiv comment; the metadata carries no affiliations,
/// so a fixed stand-in is used when there are authors at all.
fn build_record(llm: &LlmClient, paper: Candidate) -> ReportRecord {
    let venue = paper.comment.clone().filter(|c| !c.trim().is_empty());
    if let Some(venue) = venue.as_deref() {
        if filter::is_top_venue(venue) {
            println!("published at a CCF-A venue: {venue}");
        }
    }
    let digest = digest::generate(llm, &paper.title, &paper.abstract_text, &paper.link);
    let affiliation = (!paper.authors.is_empty()).then(|| "Unknown affiliation".to_string());
    ReportRecord {
        title: paper.title,
        authors: paper.authors,
        link: paper.link,
        published: paper.published,
        summary: digest.summary,
        insights: digest.insights,
        recommendation: digest.recommendation,
        venue,
        affiliation,
    }
}

/// Mode B: one specific paper, no classification or selection; the output
/// triad goes into a per-paper subdirectory with identifier-derived names.
fn run_single(config: &Config, id_or_url: &str, out_dir: &Path) -> Result<()> {
    println!("processing paper '{id_or_url}'...");
    let Some(id) = arxiv::extract_arxiv_id(id_or_url) else {
        eprintln!("warning: could not extract an arXiv id from '{id_or_url}'");
        return Ok(());
    };

    let client = http_client()?;
    let llm = LlmClient::new(config)?;
    let paper = match arxiv::fetch_by_id(&client, &id) {
        Ok(Some(paper)) => paper,
        Ok(None) => {
            eprintln!("warning: no paper found for id '{id}'");
            return Ok(());
        }
        Err(err) => {
            eprintln!("warning: fetching '{id}' failed: {err:#}");
            return Ok(());
        }
    };
    println!("fetched: {}", paper.title);
    println!("link: {}", paper.link);

    let record = build_record(&llm, paper);
    let today = Local::now().date_naive();
    let dir = out_dir.join(SINGLE_REPORT_DIR);
    fs::create_dir_all(&dir).with_context(|| format!("create directory {}", dir.display()))?;

    let report_path = dir.join(format!("paper_{id}.md"));
    fs::write(&report_path, report::render_daily(&record, today))
        .with_context(|| format!("write report {}", report_path.display()))?;
    println!("report written to '{}'", report_path.display());

    let social_path = dir.join(format!("paper_{id}_social.md"));
    fs::write(&social_path, report::render_social(&record))
        .with_context(|| format!("write social post {}", social_path.display()))?;
    println!("social post written to '{}'", social_path.display());

    let cover_path = dir.join(format!("paper_{id}_cover.txt"));
    fs::write(&cover_path, report::cover_text(&record))
        .with_context(|| format!("write cover text {}", cover_path.display()))?;
    println!("cover text written to '{}'", cover_path.display());

    Ok(())
}

/// Minute-granularity polling loop; at most one daily run per calendar day,
/// fired once the local time passes the configured mark.
fn run_schedule(config: &Config) -> Result<()> {
    let target = NaiveTime::parse_from_str(&config.schedule_time, "%H:%M")
        .with_context(|| format!("parse schedule time '{}'", config.schedule_time))?;
    println!("daily run scheduled at {} local time", config.schedule_time);

    let mut last_run = None;
    loop {
        let now = Local::now();
        let today = now.date_naive();
        if now.time() >= target && last_run != Some(today) {
            if let Err(err) = run_daily(config, Path::new(".")) {
                eprintln!("warning: daily run failed: {err:#}");
            }
            last_run = Some(today);
        }
        thread::sleep(Duration::from_secs(60));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn pool(n: usize) -> Vec<Candidate> {
        (0..n)
            .map(|i| Candidate {
                title: format!("paper {i}"),
                abstract_text: "An abstract.".to_string(),
                authors: vec!["A. Author".to_string()],
                link: format!("http://arxiv.org/abs/2507.{i:05}v1"),
                published: Utc.with_ymd_and_hms(2026, 7, 1, 0, 0, 0).unwrap(),
                comment: None,
            })
            .collect()
    }

    #[test]
    fn empty_candidate_pool_writes_placeholder_and_no_history() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        let llm = LlmClient::new(&config).unwrap();
        let mut rng = StdRng::seed_from_u64(7);

        daily_report(&config, &llm, Vec::new(), &mut rng, dir.path()).unwrap();

        let report = fs::read_to_string(dir.path().join(&config.output_filename)).unwrap();
        assert_eq!(report, EMPTY_REPORT);
        assert!(!dir.path().join(HISTORY_FILENAME).exists());
        assert!(!dir.path().join(SOCIAL_POST_FILENAME).exists());
        assert!(!dir.path().join(COVER_TEXT_FILENAME).exists());
    }

    #[test]
    fn downsample_only_kicks_in_above_the_cap() {
        let mut rng = StdRng::seed_from_u64(1);
        let kept = downsample(pool(5), DOWNSAMPLE_CAP, &mut rng);
        assert_eq!(kept.len(), 5);

        let sampled = downsample(pool(40), DOWNSAMPLE_CAP, &mut rng);
        assert_eq!(sampled.len(), DOWNSAMPLE_CAP);
    }

    #[test]
    fn downsample_is_reproducible_with_a_seeded_source() {
        let titles =
            |papers: &[Candidate]| -> Vec<String> { papers.iter().map(|p| p.title.clone()).collect() };
        let a = downsample(pool(40), DOWNSAMPLE_CAP, &mut StdRng::seed_from_u64(42));
        let b = downsample(pool(40), DOWNSAMPLE_CAP, &mut StdRng::seed_from_u64(42));
        assert_eq!(titles(&a), titles(&b));
    }
}
