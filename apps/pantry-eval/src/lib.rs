use std::{
	collections::{BTreeMap, HashMap, HashSet},
	fs, io,
	path::{Path, PathBuf},
	time::Instant,
};

use clap::Parser;
use color_eyre::eyre;
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use pantry_config::Config;
use pantry_service::{SearchEngine, SearchRequest, Source, Strategy};
use pantry_storage::models::ItemKind;

#[derive(Debug, Parser)]
#[command(
	version = pantry_cli::VERSION,
	rename_all = "kebab",
	styles = pantry_cli::styles(),
)]
pub struct Args {
	#[arg(long, short = 'c', value_name = "FILE")]
	pub config: PathBuf,
	/// Run a single ad-hoc query instead of a dataset.
	#[arg(long, short = 'q', value_name = "TEXT", required_unless_present = "dataset")]
	pub query: Option<String>,
	#[arg(long, short = 'd', value_name = "FILE", conflicts_with = "query")]
	pub dataset: Option<PathBuf>,
	#[arg(long, short = 'l', value_name = "N")]
	pub limit: Option<u32>,
	#[arg(long = "exclude", short = 'x', value_name = "TERM")]
	pub exclude: Vec<String>,
	#[arg(long = "hint", value_name = "KEY=VALUE", value_parser = parse_hint)]
	pub hints: Vec<(String, String)>,
	#[arg(long, value_name = "KIND", value_parser = parse_kind)]
	pub kind: Option<ItemKind>,
}

#[derive(Debug, Deserialize)]
struct EvalDataset {
	name: Option<String>,
	defaults: Option<EvalDefaults>,
	queries: Vec<EvalQuery>,
}

#[derive(Debug, Default, Deserialize, Clone)]
struct EvalDefaults {
	limit: Option<u32>,
	excluded_terms: Option<Vec<String>>,
	hints: Option<HashMap<String, String>>,
	kind: Option<ItemKind>,
}

#[derive(Debug, Default, Deserialize)]
struct EvalQuery {
	id: Option<String>,
	query: String,
	limit: Option<u32>,
	excluded_terms: Option<Vec<String>>,
	hints: Option<HashMap<String, String>>,
	kind: Option<ItemKind>,
	#[serde(default)]
	expected_ids: Vec<String>,
	expected_strategy: Option<Strategy>,
}

#[derive(Debug, Serialize)]
struct EvalOutput {
	dataset: EvalDatasetInfo,
	settings: EvalSettings,
	summary: EvalSummary,
	queries: Vec<QueryReport>,
}

#[derive(Debug, Serialize)]
struct EvalDatasetInfo {
	name: String,
	query_count: usize,
}

#[derive(Debug, Serialize)]
struct EvalSettings {
	config_path: String,
	backend: String,
	default_limit: u32,
	candidate_k: u32,
}

#[derive(Debug, Serialize)]
struct EvalSummary {
	hit_rate_at_k: f64,
	mean_rr: f64,
	#[serde(skip_serializing_if = "Option::is_none")]
	strategy_accuracy: Option<f64>,
	strategies: BTreeMap<String, usize>,
	degraded_queries: usize,
	latency_ms_p50: f64,
	latency_ms_p95: f64,
}

#[derive(Debug, Serialize)]
struct QueryReport {
	id: String,
	query: String,
	request_id: Uuid,
	strategy: Strategy,
	#[serde(skip_serializing_if = "Option::is_none")]
	expected_strategy: Option<Strategy>,
	message: String,
	#[serde(skip_serializing_if = "Vec::is_empty")]
	degraded: Vec<Source>,
	expected_ids: Vec<String>,
	retrieved_ids: Vec<String>,
	hit: bool,
	rr: f64,
	latency_ms: f64,
}

struct MergedQuery {
	id: String,
	expected_ids: Vec<String>,
	expected_strategy: Option<Strategy>,
	request: SearchRequest,
}

#[derive(Debug, PartialEq)]
struct Metrics {
	hit: bool,
	rr: f64,
}

pub async fn run(args: Args) -> color_eyre::Result<()> {
	let cfg = pantry_config::load(&args.config)?;
	let filter = EnvFilter::new(cfg.service.log_level.clone());

	tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).init();

	let dataset = match (&args.dataset, &args.query) {
		(Some(path), _) => load_dataset(path)?,
		(None, Some(query)) => EvalDataset {
			name: Some("ad-hoc".to_string()),
			defaults: None,
			queries: vec![EvalQuery { query: query.clone(), ..Default::default() }],
		},
		(None, None) => return Err(eyre::eyre!("Either --query or --dataset is required.")),
	};
	let output = eval_config(&args.config, cfg, &dataset, &args).await?;
	let json = serde_json::to_string_pretty(&output)?;

	println!("{json}");

	Ok(())
}

fn load_dataset(path: &Path) -> color_eyre::Result<EvalDataset> {
	let raw = fs::read_to_string(path)?;
	let dataset: EvalDataset = serde_json::from_str(&raw)?;

	if dataset.queries.is_empty() {
		return Err(eyre::eyre!("Dataset must include at least one query."));
	}

	Ok(dataset)
}

async fn eval_config(
	config_path: &Path,
	cfg: Config,
	dataset: &EvalDataset,
	args: &Args,
) -> color_eyre::Result<EvalOutput> {
	let settings = EvalSettings {
		config_path: config_path.display().to_string(),
		backend: cfg.storage.backend.clone(),
		default_limit: args.limit.unwrap_or(cfg.search.default_limit),
		candidate_k: cfg.search.candidate_k,
	};
	let store = pantry_service::open_store(&cfg).await?;
	let engine = SearchEngine::new(cfg, store);
	let defaults = dataset.defaults.clone().unwrap_or_default();
	let mut reports = Vec::with_capacity(dataset.queries.len());
	let mut latencies_ms = Vec::with_capacity(dataset.queries.len());

	for (index, query) in dataset.queries.iter().enumerate() {
		let merged = merge_query(index, query, &defaults, args);
		let report = run_query(&engine, merged).await?;

		latencies_ms.push(report.latency_ms);
		reports.push(report);
	}

	let summary = summarize(&reports, &latencies_ms);

	Ok(EvalOutput {
		dataset: EvalDatasetInfo {
			name: dataset.name.clone().unwrap_or_else(|| "dataset".to_string()),
			query_count: dataset.queries.len(),
		},
		settings,
		summary,
		queries: reports,
	})
}

async fn run_query(engine: &SearchEngine, merged: MergedQuery) -> color_eyre::Result<QueryReport> {
	let query = merged.request.query.clone();
	let started = Instant::now();
	let result = engine.search(merged.request).await?;
	let latency_ms = started.elapsed().as_secs_f64() * 1_000.0;
	let retrieved_ids: Vec<String> =
		result.candidates.iter().map(|candidate| candidate.item.id.clone()).collect();
	let expected: HashSet<&str> = merged.expected_ids.iter().map(String::as_str).collect();
	let metrics = compute_metrics(&retrieved_ids, &expected);

	tracing::debug!(
		id = %merged.id,
		strategy = result.strategy_used.as_str(),
		latency_ms,
		"Query evaluated."
	);

	Ok(QueryReport {
		id: merged.id,
		query,
		request_id: result.request_id,
		strategy: result.strategy_used,
		expected_strategy: merged.expected_strategy,
		message: result.message,
		degraded: result.degraded,
		expected_ids: merged.expected_ids,
		retrieved_ids,
		hit: metrics.hit,
		rr: metrics.rr,
		latency_ms,
	})
}

/// Per-query fields win over command-line flags, which win over dataset defaults. Excluded terms
/// given on the command line are always added.
fn merge_query(
	index: usize,
	query: &EvalQuery,
	defaults: &EvalDefaults,
	args: &Args,
) -> MergedQuery {
	let mut excluded_terms = query
		.excluded_terms
		.clone()
		.or_else(|| defaults.excluded_terms.clone())
		.unwrap_or_default();

	excluded_terms.extend(args.exclude.iter().cloned());

	let mut hints = defaults.hints.clone().unwrap_or_default();

	hints.extend(args.hints.iter().cloned());
	hints.extend(query.hints.clone().unwrap_or_default());

	MergedQuery {
		id: query.id.clone().unwrap_or_else(|| format!("q{}", index + 1)),
		expected_ids: query.expected_ids.clone(),
		expected_strategy: query.expected_strategy,
		request: SearchRequest {
			query: query.query.clone(),
			excluded_terms,
			limit: query.limit.or(args.limit).or(defaults.limit),
			hints,
			kind: query.kind.or(args.kind).or(defaults.kind),
		},
	}
}

fn compute_metrics(retrieved: &[String], expected: &HashSet<&str>) -> Metrics {
	let first_hit = retrieved.iter().position(|id| expected.contains(id.as_str()));

	match first_hit {
		Some(idx) => Metrics { hit: true, rr: 1.0 / (idx + 1) as f64 },
		None => Metrics { hit: false, rr: 0.0 },
	}
}

fn summarize(reports: &[QueryReport], latencies_ms: &[f64]) -> EvalSummary {
	let labeled: Vec<&QueryReport> =
		reports.iter().filter(|report| !report.expected_ids.is_empty()).collect();
	let count = labeled.len().max(1) as f64;
	let hit_rate_at_k = labeled.iter().filter(|report| report.hit).count() as f64 / count;
	let mean_rr = labeled.iter().map(|report| report.rr).sum::<f64>() / count;
	let with_strategy: Vec<&QueryReport> =
		reports.iter().filter(|report| report.expected_strategy.is_some()).collect();
	let strategy_accuracy = (!with_strategy.is_empty()).then(|| {
		let matched = with_strategy
			.iter()
			.filter(|report| report.expected_strategy == Some(report.strategy))
			.count();

		matched as f64 / with_strategy.len() as f64
	});
	let mut strategies = BTreeMap::new();

	for report in reports {
		*strategies.entry(report.strategy.as_str().to_string()).or_insert(0) += 1;
	}

	let mut sorted = latencies_ms.to_vec();

	sorted.sort_by(|a, b| a.total_cmp(b));

	EvalSummary {
		hit_rate_at_k,
		mean_rr,
		strategy_accuracy,
		strategies,
		degraded_queries: reports.iter().filter(|report| !report.degraded.is_empty()).count(),
		latency_ms_p50: percentile(&sorted, 0.50),
		latency_ms_p95: percentile(&sorted, 0.95),
	}
}

fn percentile(values: &[f64], percentile: f64) -> f64 {
	if values.is_empty() {
		return 0.0;
	}

	let clamped = percentile.clamp(0.0, 1.0);
	let pos = clamped * (values.len() as f64 - 1.0);
	let lower = pos.floor() as usize;
	let upper = pos.ceil() as usize;

	if lower == upper {
		values[lower]
	} else {
		let weight = pos - lower as f64;

		values[lower] * (1.0 - weight) + values[upper] * weight
	}
}

fn parse_hint(raw: &str) -> Result<(String, String), String> {
	let Some((key, value)) = raw.split_once('=') else {
		return Err(format!("Expected KEY=VALUE, got {raw:?}."));
	};
	let key = key.trim();

	if key.is_empty() {
		return Err("Hint key must be non-empty.".to_string());
	}

	Ok((key.to_string(), value.trim().to_string()))
}

fn parse_kind(raw: &str) -> Result<ItemKind, String> {
	ItemKind::parse(raw).ok_or_else(|| format!("Unknown item kind {raw:?}. Use recipe or venue."))
}
