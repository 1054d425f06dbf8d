//! nocctl - CLI client for the NOC daemon

mod cli;

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use noc_common::{DiagnoseResponse, HealthResponse, Inference, WorkOrderDetail, WorkOrderPage};
use owo_colors::OwoColorize;

const DEFAULT_URL: &str = "http://127.0.0.1:7868";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let base_url = cli
        .server
        .or_else(|| std::env::var("NOCD_URL").ok())
        .unwrap_or_else(|| DEFAULT_URL.to_string());
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Diagnose {
            work_order_id,
            step,
            error_index,
            json,
        } => {
            let url = format!("{}/v1/diagnose", base_url);
            let query = [
                ("work_order_id", work_order_id),
                ("target_step", step.to_string()),
                ("error_index", error_index.to_string()),
            ];
            let response: DiagnoseResponse = get_json(&client, &url, &query).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&response)?);
                return Ok(());
            }
            if !response.success {
                bail!("diagnosis failed: {}", response.error);
            }
            if response.data.is_empty() {
                println!("{}", "no applicable rule set (unknown or unclassifiable work order)".yellow());
                return Ok(());
            }
            render_inferences(&response.data);
        }

        Commands::WorkOrders {
            page,
            size,
            keyword,
            json,
        } => {
            let url = format!("{}/v1/work-orders", base_url);
            let query = [
                ("page", page.to_string()),
                ("size", size.to_string()),
                ("keyword", keyword),
            ];
            let listing: WorkOrderPage = get_json(&client, &url, &query).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&listing)?);
                return Ok(());
            }
            render_listing(&listing);
        }

        Commands::Show { work_order_id, json } => {
            let url = work_order_url(&base_url, &work_order_id)?;
            let detail: WorkOrderDetail = get_json(&client, url.as_str(), &[]).await?;

            if json {
                println!("{}", serde_json::to_string_pretty(&detail)?);
                return Ok(());
            }
            render_detail(&detail);
        }

        Commands::Health => {
            let url = format!("{}/v1/health", base_url);
            let health: HealthResponse = get_json(&client, &url, &[]).await?;
            println!(
                "{} nocd v{} up {}s, rule sets: {}",
                "●".green(),
                health.version,
                health.uptime_secs,
                health.rule_sets.join(", ")
            );
        }
    }

    Ok(())
}

/// Build the detail URL with the id as a percent-encoded path segment,
/// so ids containing spaces or URL metacharacters survive intact.
fn work_order_url(base_url: &str, work_order_id: &str) -> Result<reqwest::Url> {
    let mut url = reqwest::Url::parse(base_url)
        .with_context(|| format!("invalid daemon URL: {}", base_url))?;
    url.path_segments_mut()
        .map_err(|_| anyhow!("invalid daemon URL: {}", base_url))?
        .pop_if_empty()
        .extend(["v1", "work-orders", work_order_id]);
    Ok(url)
}

async fn get_json<T: serde::de::DeserializeOwned>(
    client: &reqwest::Client,
    url: &str,
    query: &[(&str, String)],
) -> Result<T> {
    let response = client
        .get(url)
        .query(query)
        .send()
        .await
        .with_context(|| format!("daemon unreachable at {}", url))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        bail!("daemon returned {}: {}", status, body);
    }

    response.json().await.context("invalid response body")
}

fn render_inferences(inferences: &[Inference]) {
    for (index, inference) in inferences.iter().enumerate() {
        println!("{} {}", format!("[{}]", index + 1).bold(), inference.description);
        for state in &inference.current_states {
            println!("    {}", state.dimmed());
        }
        if inference.conclusion.is_empty() {
            println!("    {}", "正常".green());
        } else {
            println!(
                "    {} {} ({})",
                "结论:".bold(),
                inference.conclusion.red(),
                inference.solution_code
            );
            if !inference.solution_content.is_empty() {
                println!("    {} {}", "处理:".bold(), inference.solution_content);
            }
        }
    }
}

fn render_listing(listing: &WorkOrderPage) {
    println!(
        "{} work orders (page {}/{}, {} total)",
        listing.items.len(),
        listing.page,
        listing.total_pages.max(1),
        listing.total
    );
    for order in &listing.items {
        println!(
            "  {}  {}  {}",
            order.work_order_id.bold(),
            order.gj00008.as_deref().unwrap_or("-"),
            order.created_time.as_deref().unwrap_or("-").dimmed()
        );
    }
}

fn render_detail(detail: &WorkOrderDetail) {
    let order = &detail.order;
    println!("{}", order.work_order_id.bold());
    let fields = [
        ("告警标准名", order.gj00008.as_deref()),
        ("所属机房", order.gj00010.as_deref()),
        ("设备厂家", order.gj00011.as_deref()),
        ("告警对象", order.gj00014.as_deref()),
        ("网络分类", order.gj00017.as_deref()),
        ("网元名称", order.ne_name.as_deref()),
        ("创建时间", order.created_time.as_deref()),
        ("工单状态", order.order_status.as_deref()),
    ];
    for (label, value) in fields {
        if let Some(value) = value {
            println!("  {}: {}", label.dimmed(), value);
        }
    }

    match &detail.parsed_details {
        Some(parsed) => {
            println!("  {}:", "详情".dimmed());
            for (key, value) in parsed {
                match value.as_str() {
                    Some(text) => println!("    {}: {}", key, text),
                    None => println!("    {}: {}", key, value),
                }
            }
        }
        None => {
            if let Some(raw) = order.details.as_deref() {
                println!("  {}: {}", "详情".dimmed(), raw);
            }
        }
    }
}
