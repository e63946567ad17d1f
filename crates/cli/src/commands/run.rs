use super::RunArgs;
use crate::prompts::load_prompts;
use eyre::WrapErr;
use semcache_config::{BenchConfig, CliOverrides};
use semcache_core::RunTag;
use semcache_eviction::{Clock, SystemClock};
use semcache_gateway::report::{write_policy_csv, write_summary_json};
use semcache_gateway::{
    InMemoryBackend, MetricsReporter, ModelEndpoint, MultiPolicyGateway, OllamaClient,
    PolicyRunner, SyntheticModel, SyntheticSettings,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

impl RunArgs {
    pub fn overrides(&self) -> CliOverrides {
        let synthetic = match (self.synthetic, self.live) {
            (true, _) => Some(true),
            (false, true) => Some(false),
            (false, false) => None,
        };
        CliOverrides {
            byte_budget: self.budget,
            model_name: self.model.clone(),
            endpoint: self.endpoint.clone(),
            model_timeout_secs: self.timeout,
            synthetic,
            prompt_file: self.prompts.clone(),
            number_of_prompts: self.num_prompts,
            output_dir: self.output_dir.clone(),
        }
    }
}

pub fn build_runners(config: &BenchConfig, clock: Arc<dyn Clock>) -> Vec<PolicyRunner> {
    config
        .policies
        .iter()
        .map(|spec| {
            PolicyRunner::new(
                spec.name.as_str(),
                spec.run_tag.as_str(),
                spec.kind.build(config.byte_budget, Arc::clone(&clock)),
            )
        })
        .collect()
}

pub fn build_model(config: &BenchConfig) -> eyre::Result<Box<dyn ModelEndpoint>> {
    if config.synthetic.enabled {
        let settings = SyntheticSettings {
            sizes: config.synthetic.sizes.clone(),
            latency_map_ms: config.synthetic.latency_map_ms.clone(),
            fallback_sleep_ms: config.synthetic.fallback_sleep_ms,
        };
        Ok(Box::new(SyntheticModel::new(settings)?))
    } else {
        let client = OllamaClient::new(
            &config.endpoint,
            config.model_name.as_str(),
            config.model_timeout(),
        )?;
        Ok(Box::new(client))
    }
}

pub async fn execute(config: BenchConfig, write_summary: bool) -> eyre::Result<()> {
    config.validate()?;
    debug!(source = ?config.source, "resolved configuration");

    let prompts = load_prompts(&config.prompt_file, config.number_of_prompts)
        .wrap_err("failed to load prompts")?;
    if prompts.is_empty() {
        warn!("prompt stream is empty, reports will have no rows");
    }

    let runners = build_runners(&config, Arc::new(SystemClock));
    let model = build_model(&config)?;
    let mut backend = InMemoryBackend::new(config.similarity_max_distance);
    for spec in &config.policies {
        backend.reset(&RunTag::from(spec.run_tag.as_str()));
    }
    let similarity_max_distance = backend.similarity_max_distance();
    let mut gateway = MultiPolicyGateway::new(backend, model, runners)?;

    info!(
        prompts = prompts.len(),
        byte_budget = config.byte_budget,
        policies = config.policies.len(),
        synthetic = config.synthetic.enabled,
        similarity_max_distance,
        "starting run"
    );

    let interrupted = Arc::new(AtomicBool::new(false));
    {
        let interrupted = Arc::clone(&interrupted);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                interrupted.store(true, Ordering::SeqCst);
            }
        });
    }

    let started = Instant::now();
    let mut processed = 0u64;
    for (i, prompt) in prompts.iter().enumerate() {
        if interrupted.load(Ordering::SeqCst) {
            warn!(processed, "interrupted, writing partial reports");
            break;
        }

        match gateway.ask(prompt).await {
            Ok(outcome) => {
                processed += 1;
                debug!(
                    n = i + 1,
                    total = prompts.len(),
                    cached = outcome.served_from_cache,
                    model_called = outcome.model_called,
                    model_ms = outcome.model_ms,
                    "prompt resolved"
                );
            }
            Err(e) if e.is_transient() => {
                warn!(n = i + 1, error = %e, "model call failed, skipping prompt");
            }
            Err(e) => return Err(e.into()),
        }
    }
    let wall_ms = started.elapsed().as_secs_f64() * 1000.0;

    let skipped = gateway.skipped();
    let model_calls = gateway.model_calls();
    let runners = gateway.into_runners();
    let summary = MetricsReporter::summarize_run(&runners, processed, skipped, wall_ms);

    info!(
        requests = summary.requests,
        skipped = summary.skipped,
        model_calls,
        duration_s = wall_ms / 1000.0,
        throughput_rps = summary.overall_throughput,
        "run complete"
    );
    for policy in &summary.policies {
        info!("{policy}");
    }

    for runner in &runners {
        write_policy_csv(&config.output_dir, runner)?;
    }
    if write_summary {
        write_summary_json(&config.output_dir.join("summary.json"), &summary)?;
    }

    Ok(())
}
